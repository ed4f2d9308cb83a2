use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::errors::AppError;

// =============================================================================
// ROLE
// =============================================================================

/// Identity class governing default access. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Admin,
    Employee,
}

impl Role {
    pub const COUNT: usize = 3;
    pub const ALL: [Role; Role::COUNT] = [Role::Owner, Role::Admin, Role::Employee];

    pub const fn index(self) -> usize {
        match self {
            Role::Owner => 0,
            Role::Admin => 1,
            Role::Employee => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Admin => "Admin",
            Role::Employee => "Employee",
        }
    }

    /// Exact name lookup; anything but an exact variant name is "no role".
    pub fn from_name(value: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == value)
    }

    /// Case-insensitive, whitespace-trimming lookup for operator tooling.
    /// Never used on the authorization path.
    pub fn parse_loose(value: &str) -> Option<Role> {
        let value = value.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s).ok_or_else(|| AppError::bad_request(format!("unknown role: {s:?}")))
    }
}

// =============================================================================
// RESOURCE
// =============================================================================

/// Protected category of domain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Employees,
    Departments,
    SubDepartments,
    Resources,
    Tasks,
    Announcements,
    PerformanceMetrics,
    AuditLogs,
    Salaries,
    CompanySettings,
}

impl Resource {
    pub const COUNT: usize = 10;
    pub const ALL: [Resource; Resource::COUNT] = [
        Resource::Employees,
        Resource::Departments,
        Resource::SubDepartments,
        Resource::Resources,
        Resource::Tasks,
        Resource::Announcements,
        Resource::PerformanceMetrics,
        Resource::AuditLogs,
        Resource::Salaries,
        Resource::CompanySettings,
    ];

    pub const fn index(self) -> usize {
        match self {
            Resource::Employees => 0,
            Resource::Departments => 1,
            Resource::SubDepartments => 2,
            Resource::Resources => 3,
            Resource::Tasks => 4,
            Resource::Announcements => 5,
            Resource::PerformanceMetrics => 6,
            Resource::AuditLogs => 7,
            Resource::Salaries => 8,
            Resource::CompanySettings => 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Employees => "employees",
            Resource::Departments => "departments",
            Resource::SubDepartments => "sub_departments",
            Resource::Resources => "resources",
            Resource::Tasks => "tasks",
            Resource::Announcements => "announcements",
            Resource::PerformanceMetrics => "performance_metrics",
            Resource::AuditLogs => "audit_logs",
            Resource::Salaries => "salaries",
            Resource::CompanySettings => "company_settings",
        }
    }

    pub fn from_name(value: &str) -> Option<Resource> {
        Resource::ALL.into_iter().find(|resource| resource.as_str() == value)
    }

    /// Also accepts any case, surrounding whitespace and kebab-case
    /// (`Sub-Departments`). For operator tooling only.
    pub fn parse_loose(value: &str) -> Option<Resource> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Resource::from_name(&normalized)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    /// Only the exact snake_case wire name is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::from_name(s).ok_or_else(|| AppError::bad_request(format!("unknown resource: {s:?}")))
    }
}

// =============================================================================
// ACTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    /// Implies every other action on the same resource.
    Manage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    pub const CRUD: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];

    const fn bit(self) -> u8 {
        match self {
            Action::Create => 1 << 0,
            Action::Read => 1 << 1,
            Action::Update => 1 << 2,
            Action::Delete => 1 << 3,
            Action::Manage => 1 << 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }

    pub fn from_name(value: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|action| action.as_str() == value)
    }

    /// Case-insensitive, whitespace-trimming lookup for operator tooling.
    pub fn parse_loose(value: &str) -> Option<Action> {
        let value = value.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::from_name(s).ok_or_else(|| AppError::bad_request(format!("unknown action: {s:?}")))
    }
}

// =============================================================================
// ACTION SET
// =============================================================================

const CRUD_BITS: u8 = 0b0_1111;
const MANAGE_BIT: u8 = 0b1_0000;

/// Set of allowed actions for one (role, resource) pair.
///
/// `manage` and the full create/read/update/delete set are interchangeable:
/// a set holding either answers `true` for all five actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);
    pub const CRUD: ActionSet = ActionSet(CRUD_BITS);
    pub const MANAGE: ActionSet = ActionSet(MANAGE_BIT);

    pub const fn of(actions: &[Action]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < actions.len() {
            bits |= actions[i].bit();
            i += 1;
        }
        ActionSet(bits)
    }

    pub const fn with(self, action: Action) -> Self {
        ActionSet(self.0 | action.bit())
    }

    pub const fn union(self, other: ActionSet) -> Self {
        ActionSet(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    const fn is_full(self) -> bool {
        self.0 & MANAGE_BIT != 0 || self.0 & CRUD_BITS == CRUD_BITS
    }

    pub const fn contains(self, action: Action) -> bool {
        if self.is_full() {
            return true;
        }
        self.0 & action.bit() != 0
    }

    /// Effective actions, with `manage` expanded and listed last when held.
    pub fn iter(self) -> impl Iterator<Item = Action> {
        Action::ALL.into_iter().filter(move |action| self.contains(*action))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        iter.into_iter().fold(ActionSet::EMPTY, ActionSet::with)
    }
}

impl Serialize for ActionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

// =============================================================================
// SCOPE
// =============================================================================

/// Breadth of records a role may see when listing or reading a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    Global,
    Department,
    SelfAndDepartment,
    None,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Department => "department",
            Scope::SelfAndDepartment => "self-and-department",
            Scope::None => "none",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AppError;

    /// Also accepts the dashboard's legacy `"self && department"` label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Scope::Global),
            "department" => Ok(Scope::Department),
            "self-and-department" | "self_and_department" | "self && department" => {
                Ok(Scope::SelfAndDepartment)
            }
            "none" => Ok(Scope::None),
            other => Err(AppError::bad_request(format!("unknown scope: {other}"))),
        }
    }
}
