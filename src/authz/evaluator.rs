use super::model::{Action, ActionSet, Resource, Role, Scope};
use super::policy::{PolicyTable, ScopeTable};

/// Policy evaluator trait for pluggable authorization logic.
///
/// Implementations are pure lookups: no I/O, no interior mutability. The
/// string-keyed methods never fail; anything unrecognised is a deny.
pub trait PolicyEvaluator: Send + Sync {
    /// Whether `role` may perform `action` on `resource`.
    fn allows(&self, role: Role, resource: Resource, action: Action) -> bool;

    /// Visibility scope applied when `role` lists or reads records.
    fn scope(&self, role: Role) -> Scope;

    /// String boundary for [`PolicyEvaluator::allows`]. Names must match the
    /// wire spelling exactly (`"Owner"`, `"sub_departments"`, `"read"`).
    fn has_permission(&self, role: &str, resource: &str, action: &str) -> bool {
        let (Some(role), Some(resource), Some(action)) = (
            Role::from_name(role),
            Resource::from_name(resource),
            Action::from_name(action),
        ) else {
            return false;
        };
        self.allows(role, resource, action)
    }

    /// String boundary for [`PolicyEvaluator::scope`]; unknown roles see nothing.
    fn get_scope(&self, role: &str) -> Scope {
        match Role::from_name(role) {
            Some(role) => self.scope(role),
            None => Scope::None,
        }
    }
}

impl<E: PolicyEvaluator + ?Sized> PolicyEvaluator for &E {
    fn allows(&self, role: Role, resource: Resource, action: Action) -> bool {
        (**self).allows(role, resource, action)
    }

    fn scope(&self, role: Role) -> Scope {
        (**self).scope(role)
    }
}

// =============================================================================
// STATIC EVALUATOR
// =============================================================================

/// Evaluator over process-wide policy and scope tables.
#[derive(Debug, Clone, Copy)]
pub struct StaticPolicyEvaluator {
    policy: &'static PolicyTable,
    scopes: &'static ScopeTable,
}

impl StaticPolicyEvaluator {
    /// Evaluator over the compiled-in dashboard tables.
    pub fn canonical() -> Self {
        Self {
            policy: PolicyTable::canonical(),
            scopes: ScopeTable::canonical(),
        }
    }

    pub fn from_tables(policy: &'static PolicyTable, scopes: &'static ScopeTable) -> Self {
        Self { policy, scopes }
    }

    pub fn policy(&self) -> &'static PolicyTable {
        self.policy
    }

    pub fn scopes(&self) -> &'static ScopeTable {
        self.scopes
    }
}

impl Default for StaticPolicyEvaluator {
    fn default() -> Self {
        Self::canonical()
    }
}

impl PolicyEvaluator for StaticPolicyEvaluator {
    fn allows(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.policy.allows(role, resource, action)
    }

    fn scope(&self, role: Role) -> Scope {
        self.scopes.scope_for(role)
    }
}

// =============================================================================
// LAYERED EVALUATOR
// =============================================================================

/// Explicit replacements consulted before a base evaluator.
///
/// An override for a (role, resource) pair replaces the base grant for that
/// pair entirely, so it can widen or narrow access. Pairs without an override
/// fall through to the base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyOverrides {
    grants: [[Option<ActionSet>; Resource::COUNT]; Role::COUNT],
    scopes: [Option<Scope>; Role::COUNT],
}

impl PolicyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, role: Role, resource: Resource, actions: &[Action]) -> Self {
        self.grants[role.index()][resource.index()] = Some(ActionSet::of(actions));
        self
    }

    pub fn revoke(mut self, role: Role, resource: Resource) -> Self {
        self.grants[role.index()][resource.index()] = Some(ActionSet::EMPTY);
        self
    }

    pub fn scope(mut self, role: Role, scope: Scope) -> Self {
        self.scopes[role.index()] = Some(scope);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.iter().all(Option::is_none)
            && self.grants.iter().flatten().all(Option::is_none)
    }

    fn grant_for(&self, role: Role, resource: Resource) -> Option<ActionSet> {
        self.grants[role.index()][resource.index()]
    }

    fn scope_for(&self, role: Role) -> Option<Scope> {
        self.scopes[role.index()]
    }
}

/// Overrides layered in front of a base evaluator. The base is never touched.
#[derive(Debug, Clone)]
pub struct LayeredPolicyEvaluator<E> {
    base: E,
    overrides: PolicyOverrides,
}

impl<E: PolicyEvaluator> LayeredPolicyEvaluator<E> {
    pub fn new(base: E, overrides: PolicyOverrides) -> Self {
        Self { base, overrides }
    }

    pub fn base(&self) -> &E {
        &self.base
    }
}

impl<E: PolicyEvaluator> PolicyEvaluator for LayeredPolicyEvaluator<E> {
    fn allows(&self, role: Role, resource: Resource, action: Action) -> bool {
        match self.overrides.grant_for(role, resource) {
            Some(actions) => actions.contains(action),
            None => self.base.allows(role, resource, action),
        }
    }

    fn scope(&self, role: Role) -> Scope {
        self.overrides
            .scope_for(role)
            .unwrap_or_else(|| self.base.scope(role))
    }
}
