//! User profile façade

use std::sync::Arc;

use tracing::debug;

use super::{acknowledge, respond, CollectionClient, ServiceResponse};
use crate::backend::DocumentStore;
use crate::model::{NewUser, User, UserFields};
use crate::Error;

#[derive(Clone)]
pub struct UserService {
    users: CollectionClient<User>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: CollectionClient::new(store),
        }
    }

    pub async fn get_all_users(&self) -> ServiceResponse<Vec<User>> {
        respond("getAllUsers", self.users.all().await)
    }

    pub async fn get_user_by_id(&self, id: &str) -> ServiceResponse<User> {
        respond("getUserById", self.users.by_id(id).await)
    }

    /// The profile linked to an auth identity. The first match wins.
    pub async fn get_user_by_auth_id(&self, auth_id: &str) -> ServiceResponse<User> {
        debug!(auth_id, "Looking up profile by authId");
        let result = self.users.by_field("authId", auth_id).await.and_then(|users| {
            users
                .into_iter()
                .next()
                .ok_or_else(|| Error::NotFound(format!("User not found with authId: {}", auth_id)))
        });
        respond("getUserByAuthId", result)
    }

    pub async fn create_user(&self, user: &NewUser) -> ServiceResponse<User> {
        match self.users.create(user).await {
            Ok(created) => ServiceResponse::created(created.id.clone(), created),
            Err(err) => respond("createUser", Err(err)),
        }
    }

    pub async fn update_user(&self, id: &str, fields: &UserFields) -> ServiceResponse<()> {
        acknowledge("updateUser", self.users.update(id, fields).await)
    }

    pub async fn delete_user(&self, id: &str) -> ServiceResponse<()> {
        acknowledge("deleteUser", self.users.delete(id).await)
    }

    pub async fn get_users_by_organization(&self, organization_id: &str) -> ServiceResponse<Vec<User>> {
        respond(
            "getUsersByOrganization",
            self.users.by_field("organizationId", organization_id).await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend};
    use crate::model::Role;

    fn service(backend: &MemoryBackend) -> UserService {
        UserService::new(backend.connect().store)
    }

    #[tokio::test]
    async fn test_create_and_find_by_auth_id() {
        let backend = MemoryBackend::new();
        let users = service(&backend);

        let created = users
            .create_user(&NewUser::new(
                "uid-1",
                UserFields::new("tech@acme.test", Role::Tech).with_organization("org-1"),
            ))
            .await;
        assert!(created.success);
        let id = created.id.clone().unwrap();

        let found = users.get_user_by_auth_id("uid-1").await;
        assert_eq!(found.data.map(|u| u.id), Some(id));
    }

    #[tokio::test]
    async fn test_unknown_auth_id_message() {
        let backend = MemoryBackend::new();
        let response = service(&backend).get_user_by_auth_id("ghost").await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("User not found with authId: ghost")
        );
    }

    #[tokio::test]
    async fn test_rejected_create_is_failure_not_panic() {
        let backend = MemoryBackend::new();
        backend.set_reject_writes(true);
        let response = service(&backend)
            .create_user(&NewUser::new("uid-1", UserFields::new("a@b.test", Role::User)))
            .await;
        assert!(!response.success);
        assert!(response.id.is_none());
        assert_eq!(
            response.error.as_deref(),
            Some("Missing or insufficient permissions.")
        );
    }

    #[tokio::test]
    async fn test_users_by_organization() {
        let backend = MemoryBackend::new();
        let users = service(&backend);
        for (uid, org) in [("u1", "org-1"), ("u2", "org-2"), ("u3", "org-1")] {
            users
                .create_user(&NewUser::new(
                    uid,
                    UserFields::new(format!("{}@acme.test", uid), Role::Tech).with_organization(org),
                ))
                .await;
        }

        let scoped = users.get_users_by_organization("org-1").await.data.unwrap();
        assert_eq!(scoped.len(), 2);
        assert!(scoped
            .iter()
            .all(|u| u.organization_id.as_deref() == Some("org-1")));
    }

    #[tokio::test]
    async fn test_update_missing_user_fails() {
        let backend = MemoryBackend::new();
        let response = service(&backend)
            .update_user("ghost", &UserFields::new("a@b.test", Role::User))
            .await;
        assert!(!response.success);
    }
}
