use serde::Serialize;

use crate::authz::AuthzMode;
use crate::errors::AppError;
use crate::guard::RouteGuard;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub mode: AuthzMode,
    pub guard: RouteGuard,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset or blank keys
    /// take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mode = match get("AUTHZ_MODE") {
            Some(value) => value.parse::<AuthzMode>()?,
            None => AuthzMode::default(),
        };

        let mut guard = RouteGuard::default();
        if let Some(name) = get("SESSION_COOKIE") {
            guard = guard.with_session_cookie(name.trim());
        }
        if let Some(path) = get("LOGIN_PATH") {
            guard = guard.with_login_path(require_absolute("LOGIN_PATH", path)?);
        }
        if let Some(path) = get("HOME_PATH") {
            guard = guard.with_home_path(require_absolute("HOME_PATH", path)?);
        }
        if let Some(prefixes) = get("PROTECTED_PREFIXES") {
            let prefixes = prefixes
                .split(',')
                .map(str::trim)
                .filter(|prefix| !prefix.is_empty())
                .map(|prefix| require_absolute("PROTECTED_PREFIXES", prefix.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            guard = guard.with_protected_prefixes(prefixes);
        }

        if guard.login_path.trim_end_matches('/') == guard.home_path.trim_end_matches('/') {
            return Err(AppError::configuration(format!(
                "LOGIN_PATH and HOME_PATH must differ (both {:?})",
                guard.login_path
            )));
        }

        Ok(Self { mode, guard })
    }
}

fn require_absolute(key: &str, path: String) -> Result<String, AppError> {
    let path = path.trim().to_string();
    if path.starts_with('/') {
        Ok(path)
    } else {
        Err(AppError::configuration(format!("{key} must start with '/' (got {path:?})")))
    }
}

/// Loads `.env` from the working directory, falling back to the crate-local
/// `.env`.
pub fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}
