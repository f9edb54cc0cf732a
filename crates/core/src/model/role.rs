use serde::{Deserialize, Serialize};

/// Capability level of the signed-in caller, as reported by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Instructor,
    SchoolAdmin,
    SysAdmin,
}

impl Role {
    /// Whether this role may mutate a student's training progress.
    ///
    /// Only school and system administrators may add, edit, remove, or
    /// toggle requirements, milestones, and stages. The same check is
    /// assumed to be enforced server-side; this gate exists so
    /// unauthorized attempts never reach the remote store.
    #[must_use]
    pub fn can_manage_training(&self) -> bool {
        matches!(self, Role::SchoolAdmin | Role::SysAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_manage_training() {
        assert!(Role::SchoolAdmin.can_manage_training());
        assert!(Role::SysAdmin.can_manage_training());
    }

    #[test]
    fn non_admins_do_not() {
        assert!(!Role::Instructor.can_manage_training());
        assert!(!Role::Student.can_manage_training());
    }

    #[test]
    fn role_wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SchoolAdmin).unwrap(),
            "\"school_admin\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"sys_admin\"").unwrap(),
            Role::SysAdmin
        );
    }
}
