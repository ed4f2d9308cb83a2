use uuid::Uuid;

use super::model::Role;

/// Principal represents the authenticated caller as seen by the policy layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    /// `None` when the session carried no recognised role.
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
}

impl Principal {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: None,
            department_id: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Takes the raw role string from the session. Anything other than an
    /// exact role name leaves the principal without a role.
    pub fn with_role_name(mut self, role: &str) -> Self {
        self.role = Role::from_name(role);
        self
    }

    pub fn with_department(mut self, department_id: Uuid) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_name_leaves_no_role() {
        let principal = Principal::new(Uuid::new_v4()).with_role_name("superuser");
        assert_eq!(principal.role, None);

        let principal = Principal::new(Uuid::new_v4()).with_role_name("admin");
        assert_eq!(principal.role, None);
    }

    #[test]
    fn role_name_is_parsed() {
        let dept = Uuid::new_v4();
        let principal = Principal::new(Uuid::new_v4())
            .with_role_name("Admin")
            .with_department(dept);
        assert!(principal.has_role(Role::Admin));
        assert_eq!(principal.department_id, Some(dept));
    }
}
