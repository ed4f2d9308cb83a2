//! Applying a [`Scope`] to record sets.
//!
//! The evaluator only names a scope; this module turns it into a concrete
//! filter for one caller and applies it.

use serde::Serialize;
use uuid::Uuid;

use super::evaluator::PolicyEvaluator;
use super::model::Scope;
use super::principal::Principal;

/// Records that can be filtered by visibility scope.
pub trait Scoped {
    /// The user who owns the record, if any.
    fn owner_id(&self) -> Option<Uuid>;

    /// The department the record belongs to, if any.
    fn department_id(&self) -> Option<Uuid>;
}

impl<T: Scoped + ?Sized> Scoped for &T {
    fn owner_id(&self) -> Option<Uuid> {
        (**self).owner_id()
    }

    fn department_id(&self) -> Option<Uuid> {
        (**self).department_id()
    }
}

/// A scope resolved against one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisibilityFilter {
    All,
    Department {
        department_id: Uuid,
    },
    /// Union: the caller's own records plus their department's.
    OwnerOrDepartment {
        owner_id: Uuid,
        department_id: Option<Uuid>,
    },
    Nothing,
}

impl VisibilityFilter {
    pub fn resolve(scope: Scope, principal: &Principal) -> Self {
        match scope {
            Scope::Global => VisibilityFilter::All,
            Scope::Department => match principal.department_id {
                Some(department_id) => VisibilityFilter::Department { department_id },
                // Department scope without a department sees nothing.
                None => VisibilityFilter::Nothing,
            },
            Scope::SelfAndDepartment => VisibilityFilter::OwnerOrDepartment {
                owner_id: principal.user_id,
                department_id: principal.department_id,
            },
            Scope::None => VisibilityFilter::Nothing,
        }
    }

    /// Resolves the principal's scope through `evaluator`; no role means
    /// [`Scope::None`].
    pub fn for_principal<E: PolicyEvaluator + ?Sized>(evaluator: &E, principal: &Principal) -> Self {
        let scope = principal
            .role
            .map(|role| evaluator.scope(role))
            .unwrap_or(Scope::None);
        Self::resolve(scope, principal)
    }

    pub fn admits<R: Scoped + ?Sized>(&self, record: &R) -> bool {
        match self {
            VisibilityFilter::All => true,
            VisibilityFilter::Department { department_id } => {
                record.department_id() == Some(*department_id)
            }
            VisibilityFilter::OwnerOrDepartment {
                owner_id,
                department_id,
            } => {
                record.owner_id() == Some(*owner_id)
                    || department_id.is_some_and(|dept| record.department_id() == Some(dept))
            }
            VisibilityFilter::Nothing => false,
        }
    }

    pub fn apply<R: Scoped>(&self, records: Vec<R>) -> Vec<R> {
        match self {
            VisibilityFilter::All => records,
            VisibilityFilter::Nothing => Vec::new(),
            _ => records.into_iter().filter(|record| self.admits(record)).collect(),
        }
    }
}

/// Scope lookup and filtering in one call.
pub fn visible_to<E, R>(evaluator: &E, principal: &Principal, records: Vec<R>) -> Vec<R>
where
    E: PolicyEvaluator + ?Sized,
    R: Scoped,
{
    VisibilityFilter::for_principal(evaluator, principal).apply(records)
}
