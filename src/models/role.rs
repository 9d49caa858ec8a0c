use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role in the four-tier hierarchy. Ordered from lowest to highest
/// privilege; a higher role can do everything a lower role can.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer = 0,
    Staff = 1,
    Manager = 2,
    Admin = 3,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "staff" => Some(Self::Staff),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Staff => "staff",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// External group name this role maps to.
    pub fn group_name(&self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Staff => "Staff",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
        }
    }

    /// Hierarchy check: Admin implies Manager implies Staff implies Viewer.
    pub fn implies(&self, other: Role) -> bool {
        *self >= other
    }
}

/// Authenticated identity resolved from the JWT claims by the auth
/// middleware and stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
    pub groups: Vec<String>,
}

impl AuthUser {
    /// True when any group membership (or the superuser override)
    /// grants at least `role`.
    pub fn has_role(&self, role: Role) -> bool {
        if self.is_superuser {
            return true;
        }
        self.groups
            .iter()
            .filter_map(|g| Role::parse(g))
            .any(|r| r.implies(role))
    }

    /// Admin or Manager skip the approval timer entirely.
    pub fn can_bypass_approval(&self) -> bool {
        self.has_role(Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_groups(groups: &[&str]) -> AuthUser {
        AuthUser {
            id: 1,
            username: "test".to_string(),
            is_superuser: false,
            groups: groups.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Admin.implies(Role::Viewer));
        assert!(Role::Admin.implies(Role::Manager));
        assert!(Role::Manager.implies(Role::Staff));
        assert!(Role::Staff.implies(Role::Viewer));
        assert!(!Role::Viewer.implies(Role::Staff));
        assert!(!Role::Staff.implies(Role::Manager));
        assert!(!Role::Manager.implies(Role::Admin));
    }

    #[test]
    fn test_group_membership_resolution() {
        let manager = user_with_groups(&["Manager"]);
        assert!(manager.has_role(Role::Viewer));
        assert!(manager.has_role(Role::Staff));
        assert!(manager.has_role(Role::Manager));
        assert!(!manager.has_role(Role::Admin));
        assert!(manager.can_bypass_approval());

        let staff = user_with_groups(&["Staff"]);
        assert!(staff.has_role(Role::Staff));
        assert!(!staff.can_bypass_approval());

        let nobody = user_with_groups(&[]);
        assert!(!nobody.has_role(Role::Viewer));
    }

    #[test]
    fn test_superuser_override() {
        let mut su = user_with_groups(&[]);
        su.is_superuser = true;
        assert!(su.has_role(Role::Admin));
    }

    #[test]
    fn test_unknown_groups_ignored() {
        let user = user_with_groups(&["Accounting", "Viewer"]);
        assert!(user.has_role(Role::Viewer));
        assert!(!user.has_role(Role::Staff));
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("viewer"), Some(Role::Viewer));
        assert_eq!(Role::parse("root"), None);
    }
}
