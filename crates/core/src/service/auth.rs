//! Identity façade

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::{acknowledge, respond, ServiceResponse};
use crate::backend::{AuthClient, AuthState, AuthUser};

#[derive(Clone)]
pub struct AuthService {
    client: Arc<dyn AuthClient>,
}

impl AuthService {
    pub fn new(client: Arc<dyn AuthClient>) -> Self {
        Self { client }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResponse<AuthUser> {
        let response = respond("signIn", self.client.sign_in(email, password).await);
        if let Some(user) = &response.data {
            info!(email = %user.email, "Sign-in succeeded");
        }
        response
    }

    pub async fn sign_out(&self) -> ServiceResponse<()> {
        acknowledge("signOut", self.client.sign_out().await)
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.client.current_user()
    }

    /// Auth-state notifications for this connection. Dropping the receiver
    /// unsubscribes.
    pub fn on_auth_state_changed(&self) -> watch::Receiver<AuthState> {
        self.client.subscribe()
    }

    pub async fn create_auth_user(&self, email: &str, password: &str) -> ServiceResponse<AuthUser> {
        respond("createAuthUser", self.client.sign_up(email, password).await)
    }

    pub async fn delete_auth_user(&self, user: &AuthUser) -> ServiceResponse<()> {
        acknowledge("deleteAuthUser", self.client.delete_user(user).await)
    }
}
