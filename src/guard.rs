//! Cookie-based route protection for the dashboard pages.
//!
//! A request for a protected page without a session cookie is sent to the
//! login page; a request for the login page that already carries a session
//! is sent home. Whether the cookie is valid is not checked here.
//!
//! The login page is always reachable without a session and the home page is
//! always reachable with one, so no configuration can produce a redirect loop.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

pub const DEFAULT_SESSION_COOKIE: &str = "token";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteGuard {
    pub session_cookie: String,
    pub login_path: String,
    pub home_path: String,
    pub protected_prefixes: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            protected_prefixes: vec![DEFAULT_HOME_PATH.to_string()],
        }
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    pub fn with_protected_prefixes(mut self, prefixes: impl IntoIterator<Item = String>) -> Self {
        self.protected_prefixes = prefixes.into_iter().collect();
        self
    }

    /// Segment-wise prefix match: `/dashboard` covers `/dashboard/x` but not
    /// `/dashboardx`.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
    }

    pub fn check(&self, path: &str, cookie_header: Option<&str>) -> GuardDecision {
        let has_session = cookie_header
            .and_then(|header| cookie_value(header, &self.session_cookie))
            .is_some();

        if has_session {
            if same_path(path, &self.login_path) && !same_path(path, &self.home_path) {
                GuardDecision::RedirectToHome
            } else {
                GuardDecision::Allow
            }
        } else if self.is_protected(path) && !same_path(path, &self.login_path) {
            GuardDecision::RedirectToLogin
        } else {
            GuardDecision::Allow
        }
    }

    pub fn check_headers(&self, path: &str, headers: &HeaderMap) -> GuardDecision {
        let cookies: Vec<&str> = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        if cookies.is_empty() {
            self.check(path, None)
        } else {
            self.check(path, Some(&cookies.join("; ")))
        }
    }
}

/// `/login` and `/login/` are the same page; `/` is the root.
fn same_path(path: &str, other: &str) -> bool {
    path.trim_end_matches('/') == other.trim_end_matches('/')
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// First non-empty value of cookie `name` in a `Cookie` header. Empty
/// entries (`token=`) are skipped, so `token=; token=abc` yields `abc`.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .find(|value| !value.is_empty())
}

/// axum middleware applying a [`RouteGuard`].
///
/// ```ignore
/// let app = Router::new()
///     .route("/dashboard", get(dashboard))
///     .layer(middleware::from_fn_with_state(Arc::new(guard), route_guard));
/// ```
pub async fn route_guard(State(guard): State<Arc<RouteGuard>>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    match guard.check_headers(&path, request.headers()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectToLogin => {
            tracing::debug!(%path, "no session cookie, redirecting to login");
            Redirect::to(&guard.login_path).into_response()
        }
        GuardDecision::RedirectToHome => {
            tracing::debug!(%path, "session present, redirecting home");
            Redirect::to(&guard.home_path).into_response()
        }
    }
}
