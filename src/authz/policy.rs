use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

use super::model::{Action, ActionSet, Resource, Role, Scope};

/// Static policy definition: per role, the resources it holds actions on.
/// A resource missing from a role's list grants nothing.
pub type PolicyDefinition = [(Role, &'static [(Resource, &'static [Action])])];

const CRUD: &[Action] = &Action::CRUD;
const READ: &[Action] = &[Action::Read];

/// The dashboard's compiled-in permission table.
pub const CANONICAL_POLICY: &PolicyDefinition = &[
    (
        Role::Owner,
        &[
            (Resource::Employees, CRUD),
            (Resource::Departments, CRUD),
            (Resource::SubDepartments, CRUD),
            (Resource::Resources, CRUD),
            (Resource::Tasks, CRUD),
            (Resource::Announcements, CRUD),
            (Resource::PerformanceMetrics, CRUD),
            (Resource::AuditLogs, READ),
            (Resource::Salaries, CRUD),
            (Resource::CompanySettings, &[Action::Read, Action::Update]),
        ],
    ),
    (
        Role::Admin,
        &[
            (Resource::Employees, CRUD),
            (Resource::Departments, &[Action::Read, Action::Update]),
            (Resource::SubDepartments, CRUD),
            (Resource::Resources, CRUD),
            (Resource::Tasks, CRUD),
            (Resource::Announcements, CRUD),
            (
                Resource::PerformanceMetrics,
                &[Action::Create, Action::Read, Action::Update],
            ),
            (Resource::AuditLogs, READ),
        ],
    ),
    (
        Role::Employee,
        &[
            (Resource::Employees, READ),
            (Resource::Departments, READ),
            (Resource::SubDepartments, READ),
            (Resource::Resources, READ),
            (Resource::Tasks, &[Action::Read, Action::Update]),
            (Resource::Announcements, READ),
            (Resource::PerformanceMetrics, READ),
        ],
    ),
];

// =============================================================================
// POLICY TABLE
// =============================================================================

/// Role -> resource -> allowed actions. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    grants: [[ActionSet; Resource::COUNT]; Role::COUNT],
}

impl PolicyTable {
    /// Builds a table from a definition; repeated entries for the same pair
    /// are merged.
    pub fn from_definition(definition: &PolicyDefinition) -> Self {
        let mut grants = [[ActionSet::EMPTY; Resource::COUNT]; Role::COUNT];
        for (role, entries) in definition {
            for (resource, actions) in entries.iter() {
                let cell = &mut grants[role.index()][resource.index()];
                *cell = cell.union(ActionSet::of(actions));
            }
        }
        Self { grants }
    }

    pub fn canonical() -> &'static PolicyTable {
        static TABLE: OnceLock<PolicyTable> = OnceLock::new();
        TABLE.get_or_init(|| PolicyTable::from_definition(CANONICAL_POLICY))
    }

    pub fn actions(&self, role: Role, resource: Resource) -> ActionSet {
        self.grants[role.index()][resource.index()]
    }

    pub fn allows(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.actions(role, resource).contains(action)
    }

    /// Resources the role holds at least one action on, in declaration order.
    pub fn entries(&self, role: Role) -> impl Iterator<Item = (Resource, ActionSet)> + '_ {
        Resource::ALL
            .into_iter()
            .map(move |resource| (resource, self.actions(role, resource)))
            .filter(|(_, actions)| !actions.is_empty())
    }
}

// =============================================================================
// SCOPE TABLE
// =============================================================================

const fn canonical_scope(role: Role) -> Scope {
    match role {
        Role::Owner => Scope::Global,
        Role::Admin => Scope::Department,
        Role::Employee => Scope::SelfAndDepartment,
    }
}

/// Role -> visibility scope. Every role resolves to exactly one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTable {
    scopes: [Scope; Role::COUNT],
}

impl ScopeTable {
    pub fn from_fn(scope_of: impl Fn(Role) -> Scope) -> Self {
        Self {
            scopes: Role::ALL.map(scope_of),
        }
    }

    pub fn canonical() -> &'static ScopeTable {
        static TABLE: ScopeTable = ScopeTable {
            scopes: [
                canonical_scope(Role::Owner),
                canonical_scope(Role::Admin),
                canonical_scope(Role::Employee),
            ],
        };
        &TABLE
    }

    pub fn scope_for(&self, role: Role) -> Scope {
        self.scopes[role.index()]
    }
}

// =============================================================================
// SERIALIZED VIEW
// =============================================================================

/// One role's slice of the policy, for dumps and admin tooling.
#[derive(Debug, Serialize)]
pub struct RolePolicy {
    pub role: Role,
    pub scope: Scope,
    pub resources: BTreeMap<Resource, ActionSet>,
}

impl RolePolicy {
    pub fn describe(policy: &PolicyTable, scopes: &ScopeTable, role: Role) -> Self {
        Self {
            role,
            scope: scopes.scope_for(role),
            resources: policy.entries(role).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_resource_grants_nothing() {
        let table = PolicyTable::canonical();
        assert!(table.actions(Role::Admin, Resource::Salaries).is_empty());
        assert!(table.actions(Role::Employee, Resource::AuditLogs).is_empty());
    }

    #[test]
    fn repeated_entries_are_merged() {
        let definition: &PolicyDefinition = &[
            (Role::Employee, &[(Resource::Tasks, &[Action::Read])]),
            (Role::Employee, &[(Resource::Tasks, &[Action::Update])]),
        ];
        let table = PolicyTable::from_definition(definition);
        assert!(table.allows(Role::Employee, Resource::Tasks, Action::Read));
        assert!(table.allows(Role::Employee, Resource::Tasks, Action::Update));
        assert!(!table.allows(Role::Employee, Resource::Tasks, Action::Delete));
    }

    #[test]
    fn entries_skip_empty_cells() {
        let table = PolicyTable::canonical();
        let admin: Vec<Resource> = table.entries(Role::Admin).map(|(r, _)| r).collect();
        assert!(!admin.contains(&Resource::Salaries));
        assert!(!admin.contains(&Resource::CompanySettings));
        assert_eq!(admin.len(), 8);
    }

    #[test]
    fn scope_table_from_fn_covers_every_role() {
        let table = ScopeTable::from_fn(|_| Scope::None);
        for role in Role::ALL {
            assert_eq!(table.scope_for(role), Scope::None);
        }
    }

    #[test]
    fn role_policy_serializes_as_map() {
        let view = RolePolicy::describe(
            PolicyTable::canonical(),
            ScopeTable::canonical(),
            Role::Employee,
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["scope"], "self-and-department");
        assert_eq!(json["resources"]["tasks"], serde_json::json!(["read", "update"]));
        assert!(json["resources"].get("salaries").is_none());
    }
}
