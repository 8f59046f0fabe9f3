//! Identity Toolkit client

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use super::{auth_error_code, expiry_from, read_error, IdToken, Session};
use crate::backend::{AuthClient, AuthState, AuthUser};
use crate::{Error, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

impl PasswordResponse {
    fn into_token(self) -> IdToken {
        IdToken {
            expires_at: expiry_from(&self.expires_in),
            uid: self.local_id,
            email: self.email,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        }
    }
}

pub(super) struct FirebaseAuthClient {
    session: Arc<Session>,
    state: watch::Sender<AuthState>,
}

impl FirebaseAuthClient {
    pub(super) fn new(session: Arc<Session>, state: watch::Sender<AuthState>) -> Self {
        Self { session, state }
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> Result<IdToken> {
        let response = self
            .session
            .http
            .post(self.session.config.identity_url(method))
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Failed to reach identity service: {}", e)))?;

        if !response.status().is_success() {
            let (status, message) = read_error(response).await;
            debug!(method, %status, %message, "Identity call failed");
            return Err(Error::auth(auth_error_code(&message), message));
        }

        let body: PasswordResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse identity response: {}", e)))?;
        let mut token = body.into_token();
        if token.email.is_empty() {
            token.email = email.to_string();
        }
        Ok(token)
    }
}

#[async_trait]
impl AuthClient for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let token = self
            .password_call("accounts:signInWithPassword", email, password)
            .await?;
        let user = AuthUser {
            uid: token.uid.clone(),
            email: token.email.clone(),
        };
        *self.session.tokens.write().await = Some(token);
        self.state.send_replace(AuthState::SignedIn(user.clone()));
        info!(uid = %user.uid, "Signed in");
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let token = self.password_call("accounts:signUp", email, password).await?;
        info!(uid = %token.uid, "Created identity");
        Ok(AuthUser {
            uid: token.uid,
            email: token.email,
        })
    }

    async fn sign_out(&self) -> Result<()> {
        *self.session.tokens.write().await = None;
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().user().cloned()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    async fn delete_user(&self, user: &AuthUser) -> Result<()> {
        if !self
            .current_user()
            .is_some_and(|current| current.uid == user.uid)
        {
            return Err(Error::PermissionDenied(
                "Only the signed-in user can be deleted from a client session".to_string(),
            ));
        }
        let id_token = self.session.bearer().await?.ok_or(Error::NotSignedIn)?;

        let response = self
            .session
            .http
            .post(self.session.config.identity_url("accounts:delete"))
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Failed to reach identity service: {}", e)))?;
        if !response.status().is_success() {
            let (_, message) = read_error(response).await;
            return Err(Error::auth(auth_error_code(&message), message));
        }

        self.sign_out().await?;
        info!(uid = %user.uid, "Deleted identity");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_request_shape() {
        let body = serde_json::to_value(PasswordRequest {
            email: "a@b.test",
            password: "secret1",
            return_secure_token: true,
        })
        .unwrap();
        assert_eq!(body["returnSecureToken"], true);
        assert_eq!(body["email"], "a@b.test");
    }

    #[test]
    fn test_password_response_into_token() {
        let body: PasswordResponse = serde_json::from_value(serde_json::json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-1",
            "email": "a@b.test",
            "idToken": "id",
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }))
        .unwrap();
        let token = body.into_token();
        assert_eq!(token.uid, "uid-1");
        assert!(!token.needs_refresh());
    }
}
