use super::evaluator::{PolicyEvaluator, StaticPolicyEvaluator};
use super::model::{Action, Resource};
use super::principal::Principal;
use super::scope::{Scoped, VisibilityFilter};
use super::AuthzMode;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::events::{publish_decision, AccessDecision, EventBus};

/// Applies an evaluator's decisions according to the enforcement mode.
///
/// The evaluator stays pure; logging and audit events happen here.
#[derive(Debug, Clone)]
pub struct Enforcer<E = StaticPolicyEvaluator> {
    evaluator: E,
    mode: AuthzMode,
    event_bus: Option<EventBus>,
}

impl Enforcer<StaticPolicyEvaluator> {
    /// Strict enforcer over the compiled-in tables.
    pub fn canonical() -> Self {
        Self::new(StaticPolicyEvaluator::canonical(), AuthzMode::Strict)
    }

    /// Enforcer over the compiled-in tables in the configured mode.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(StaticPolicyEvaluator::canonical(), config.mode)
    }
}

impl<E: PolicyEvaluator> Enforcer<E> {
    pub fn new(evaluator: E, mode: AuthzMode) -> Self {
        Self {
            evaluator,
            mode,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn mode(&self) -> AuthzMode {
        self.mode
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Returns `Forbidden` when the policy denies and the mode is strict.
    pub fn authorize(&self, principal: &Principal, resource: Resource, action: Action) -> AppResult<()> {
        if self.mode == AuthzMode::Off {
            return Ok(());
        }

        let allowed = principal
            .role
            .is_some_and(|role| self.evaluator.allows(role, resource, action));
        let permitted = allowed || self.mode == AuthzMode::Advisory;

        let role = principal.role.map(|r| r.as_str()).unwrap_or("none");
        if allowed {
            tracing::debug!(
                user_id = %principal.user_id,
                role,
                resource = %resource,
                action = %action,
                "permission granted"
            );
        } else if permitted {
            tracing::warn!(
                user_id = %principal.user_id,
                role,
                resource = %resource,
                action = %action,
                "permission denied (advisory, request allowed)"
            );
        } else {
            tracing::info!(
                user_id = %principal.user_id,
                role,
                resource = %resource,
                action = %action,
                "permission denied"
            );
        }

        if let Some(bus) = &self.event_bus {
            let decision = AccessDecision {
                role: principal.role,
                resource,
                action,
                allowed,
                mode: self.mode,
                permitted,
            };
            publish_decision(bus, Some(principal.user_id), decision);
        }

        if permitted {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("{resource}.{action}")))
        }
    }

    /// Visibility filter for the principal; unfiltered when checks are off.
    pub fn filter_for(&self, principal: &Principal) -> VisibilityFilter {
        match self.mode {
            AuthzMode::Off => VisibilityFilter::All,
            AuthzMode::Advisory | AuthzMode::Strict => {
                VisibilityFilter::for_principal(&self.evaluator, principal)
            }
        }
    }

    pub fn visible<R: Scoped>(&self, principal: &Principal, records: Vec<R>) -> Vec<R> {
        let filter = self.filter_for(principal);
        let total = records.len();
        let visible = filter.apply(records);
        tracing::debug!(
            user_id = %principal.user_id,
            total,
            visible = visible.len(),
            "applied visibility filter"
        );
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::Role;
    use uuid::Uuid;

    #[test]
    fn strict_mode_forbids_denied_action() {
        let enforcer = Enforcer::canonical();
        let principal = Principal::new(Uuid::new_v4()).with_role(Role::Employee);

        let err = enforcer
            .authorize(&principal, Resource::Employees, Action::Delete)
            .unwrap_err();
        assert_eq!(err, AppError::forbidden("employees.delete"));
        assert!(enforcer
            .authorize(&principal, Resource::Employees, Action::Read)
            .is_ok());
    }

    #[test]
    fn advisory_mode_lets_denials_through() {
        let enforcer = Enforcer::new(StaticPolicyEvaluator::canonical(), AuthzMode::Advisory);
        let principal = Principal::new(Uuid::new_v4()).with_role(Role::Admin);
        assert!(enforcer
            .authorize(&principal, Resource::Salaries, Action::Read)
            .is_ok());
    }

    #[test]
    fn principal_without_role_is_forbidden() {
        let enforcer = Enforcer::canonical();
        let principal = Principal::new(Uuid::new_v4()).with_role_name("ghost");
        assert!(enforcer
            .authorize(&principal, Resource::Announcements, Action::Read)
            .is_err());
    }

    #[test]
    fn from_config_uses_configured_mode() {
        let principal = Principal::new(Uuid::new_v4()).with_role(Role::Admin);
        let lookup = |mode: &'static str| {
            move |key: &str| (key == "AUTHZ_MODE").then(|| mode.to_string())
        };

        let config = AppConfig::from_lookup(lookup("advisory")).unwrap();
        let enforcer = Enforcer::from_config(&config);
        assert_eq!(enforcer.mode(), AuthzMode::Advisory);
        assert!(enforcer
            .authorize(&principal, Resource::Salaries, Action::Read)
            .is_ok());

        let config = AppConfig::from_lookup(lookup("strict")).unwrap();
        let enforcer = Enforcer::from_config(&config);
        assert!(enforcer
            .authorize(&principal, Resource::Salaries, Action::Read)
            .is_err());

        let config = AppConfig::from_lookup(|_: &str| None).unwrap();
        assert_eq!(Enforcer::from_config(&config).mode(), AuthzMode::Strict);
    }

    #[test]
    fn off_mode_skips_filtering() {
        let enforcer = Enforcer::new(StaticPolicyEvaluator::canonical(), AuthzMode::Off);
        let principal = Principal::new(Uuid::new_v4());
        assert_eq!(enforcer.filter_for(&principal), VisibilityFilter::All);
    }
}
