//! Authorization module - Policy Evaluator and Enforcement
//!
//! This module implements the dashboard's access policy:
//! - Role -> resource -> action table with `manage` subsumption
//! - Per-role visibility scopes and their application to record sets
//! - Override layers in front of the compiled-in tables
//! - Configurable enforcement modes (off/advisory/strict)
//!
//! Every lookup fails closed: unknown roles, resources and actions deny.

mod enforcer;
mod evaluator;
mod model;
mod policy;
mod principal;
mod scope;

pub use enforcer::Enforcer;
pub use evaluator::{LayeredPolicyEvaluator, PolicyEvaluator, PolicyOverrides, StaticPolicyEvaluator};
pub use model::{Action, ActionSet, Resource, Role, Scope};
pub use policy::{PolicyDefinition, PolicyTable, RolePolicy, ScopeTable, CANONICAL_POLICY};
pub use principal::Principal;
pub use scope::{visible_to, Scoped, VisibilityFilter};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Whether `role` may perform `action` on `resource` under the compiled-in
/// policy. Never fails; unrecognised input denies.
pub fn has_permission(role: &str, resource: &str, action: &str) -> bool {
    StaticPolicyEvaluator::canonical().has_permission(role, resource, action)
}

/// Visibility scope for `role` under the compiled-in policy; unknown roles
/// get [`Scope::None`].
pub fn get_scope(role: &str) -> Scope {
    StaticPolicyEvaluator::canonical().get_scope(role)
}

/// Authorization enforcement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthzMode {
    /// No permission checks (development mode)
    Off,
    /// Log denials but allow requests (testing mode)
    Advisory,
    /// Enforce 403 on denied requests (production mode)
    #[default]
    Strict,
}

impl AuthzMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthzMode::Off => "off",
            AuthzMode::Advisory => "advisory",
            AuthzMode::Strict => "strict",
        }
    }
}

impl fmt::Display for AuthzMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthzMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(AuthzMode::Off),
            "advisory" => Ok(AuthzMode::Advisory),
            "strict" => Ok(AuthzMode::Strict),
            other => Err(AppError::configuration(format!(
                "AUTHZ_MODE must be off, advisory or strict (got {other:?})"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_strict() {
        assert_eq!(AuthzMode::default(), AuthzMode::Strict);
    }

    #[test]
    fn mode_parse_rejects_unknown() {
        assert_eq!("Advisory".parse::<AuthzMode>().unwrap(), AuthzMode::Advisory);
        assert!("lenient".parse::<AuthzMode>().is_err());
    }

    #[test]
    fn free_functions_use_canonical_tables() {
        assert!(has_permission("Owner", "employees", "delete"));
        assert_eq!(get_scope("Admin"), Scope::Department);
    }
}
