//! Organization scoping of console data

use serde::Serialize;

use crate::backend::AuthUser;
use crate::model::{Equipment, Organization, Role, Station, User};

/// Records a signed-in admin may see and manage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "organizationId", rename_all = "camelCase")]
pub enum Scope {
    /// Everything.
    Global,
    /// Only records of one organization.
    Organization(String),
    /// A local admin with no organization assigned sees nothing.
    Unassigned,
}

impl Scope {
    pub fn for_profile(profile: &User) -> Self {
        match profile.role {
            Role::GlobalAdmin => Self::Global,
            _ => match &profile.organization_id {
                Some(organization_id) => Self::Organization(organization_id.clone()),
                None => Self::Unassigned,
            },
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }

    pub fn organization_id(&self) -> Option<&str> {
        match self {
            Self::Organization(organization_id) => Some(organization_id),
            _ => None,
        }
    }

    /// Whether a record owned by `organization_id` is visible.
    pub fn allows(&self, organization_id: Option<&str>) -> bool {
        match self {
            Self::Global => true,
            Self::Organization(own) => organization_id == Some(own.as_str()),
            Self::Unassigned => false,
        }
    }

    pub fn retain<T: Scoped>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_global() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| self.allows(item.owner()))
            .collect()
    }

    /// Roles this scope may hand out when creating or editing a user.
    pub fn can_assign(&self, role: &Role) -> bool {
        self.is_global() || *role != Role::GlobalAdmin
    }
}

/// A record that belongs to an organization.
pub trait Scoped {
    fn owner(&self) -> Option<&str>;
}

impl Scoped for Organization {
    fn owner(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Scoped for Station {
    fn owner(&self) -> Option<&str> {
        Some(&self.organization_id)
    }
}

impl Scoped for Equipment {
    fn owner(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }
}

impl Scoped for User {
    fn owner(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }
}

/// The authorized admin behind a console.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub auth: AuthUser,
    pub profile: User,
}

impl Principal {
    pub fn new(auth: AuthUser, profile: User) -> Self {
        Self { auth, profile }
    }

    pub fn role(&self) -> &Role {
        &self.profile.role
    }

    pub fn scope(&self) -> Scope {
        Scope::for_profile(&self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, role: Role, organization_id: Option<&str>) -> User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "authId": format!("auth-{}", id),
            "email": format!("{}@fixit.test", id),
            "role": role,
            "organizationId": organization_id,
            "active": true
        }))
        .unwrap()
    }

    #[test]
    fn test_local_admin_sees_only_own_users() {
        let admin = user("admin", Role::LocalAdmin, Some("org-x"));
        let users = vec![
            user("a", Role::Tech, Some("org-x")),
            user("b", Role::Tech, Some("org-y")),
            user("c", Role::User, None),
            admin.clone(),
        ];

        let visible = Scope::for_profile(&admin).retain(users);
        assert_eq!(visible.len(), 2);
        assert!(visible
            .iter()
            .all(|u| u.organization_id.as_deref() == Some("org-x")));
    }

    #[test]
    fn test_global_admin_sees_everything() {
        let admin = user("root", Role::GlobalAdmin, None);
        let users = vec![
            user("a", Role::Tech, Some("org-x")),
            user("b", Role::Tech, Some("org-y")),
            user("c", Role::User, None),
        ];
        assert_eq!(Scope::for_profile(&admin).retain(users).len(), 3);
    }

    #[test]
    fn test_unassigned_local_admin_sees_nothing() {
        let scope = Scope::for_profile(&user("lost", Role::LocalAdmin, None));
        assert_eq!(scope, Scope::Unassigned);
        assert!(!scope.allows(None));
        assert!(!scope.allows(Some("org-x")));
    }

    #[test]
    fn test_local_admin_cannot_grant_global_admin() {
        let scope = Scope::Organization("org-x".to_string());
        assert!(!scope.can_assign(&Role::GlobalAdmin));
        assert!(scope.can_assign(&Role::LocalAdmin));
        assert!(Scope::Global.can_assign(&Role::GlobalAdmin));
    }
}
