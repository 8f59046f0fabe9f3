//! Firebase backend over the public REST APIs
//!
//! Identity comes from the Identity Toolkit API, documents from the
//! Firestore REST API. A connection keeps the signed-in user's ID token and
//! attaches it to every Firestore request so security rules apply as they
//! would for the web SDK.

mod auth;
mod firestore;
pub mod value;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::debug;

use self::auth::FirebaseAuthClient;
use self::firestore::FirestoreStore;
use super::{AuthState, Backend, Connection};
use crate::error::AuthErrorCode;
use crate::{Error, Result};

const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1";
const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_DATABASE: &str = "(default)";
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

fn default_identity_endpoint() -> String {
    DEFAULT_IDENTITY_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_firestore_endpoint() -> String {
    DEFAULT_FIRESTORE_ENDPOINT.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

/// The project's web configuration object, plus endpoint overrides for
/// pointing at the local emulators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default = "default_identity_endpoint")]
    pub identity_endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_firestore_endpoint")]
    pub firestore_endpoint: String,
    #[serde(default = "default_database")]
    pub database_id: String,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_domain: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            identity_endpoint: default_identity_endpoint(),
            token_endpoint: default_token_endpoint(),
            firestore_endpoint: default_firestore_endpoint(),
            database_id: default_database(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("Firebase apiKey is empty".to_string()));
        }
        if self.project_id.trim().is_empty() {
            return Err(Error::Config("Firebase projectId is empty".to_string()));
        }
        Ok(())
    }

    /// Identity Toolkit method URL, e.g. `accounts:signInWithPassword`.
    fn identity_url(&self, method: &str) -> String {
        format!(
            "{}/{}?key={}",
            self.identity_endpoint.trim_end_matches('/'),
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    fn token_url(&self) -> String {
        format!(
            "{}/token?key={}",
            self.token_endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.api_key)
        )
    }

    /// Resource name prefix of all documents in the database.
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/{}",
            self.firestore_endpoint.trim_end_matches('/'),
            self.documents_root()
        )
    }
}

/// Tokens of the signed-in user of one connection.
#[derive(Debug, Clone)]
struct IdToken {
    uid: String,
    email: String,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl IdToken {
    fn needs_refresh(&self) -> bool {
        Utc::now() + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Credentials shared by the auth client and the document store of one
/// connection.
struct Session {
    http: Client,
    config: Arc<FirebaseConfig>,
    tokens: RwLock<Option<IdToken>>,
}

impl Session {
    /// The current ID token, refreshed first if it is about to expire.
    async fn bearer(&self) -> Result<Option<String>> {
        let current = self.tokens.read().await.clone();
        let Some(token) = current else {
            return Ok(None);
        };
        if !token.needs_refresh() {
            return Ok(Some(token.id_token));
        }

        debug!(uid = %token.uid, "Refreshing ID token");
        let response = self
            .http
            .post(self.config.token_url())
            .json(&serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": token.refresh_token,
            }))
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Failed to refresh token: {}", e)))?;
        if !response.status().is_success() {
            let (_, message) = read_error(response).await;
            *self.tokens.write().await = None;
            return Err(Error::auth(auth_error_code(&message), message));
        }
        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse token response: {}", e)))?;

        let renewed = IdToken {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: expiry_from(&refreshed.expires_in),
            ..token
        };
        let bearer = renewed.id_token.clone();
        *self.tokens.write().await = Some(renewed);
        Ok(Some(bearer))
    }
}

/// Backend talking to a Firebase project.
#[derive(Clone)]
pub struct FirebaseBackend {
    http: Client,
    config: Arc<FirebaseConfig>,
}

impl FirebaseBackend {
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        config.validate()?;
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }
}

impl Backend for FirebaseBackend {
    fn name(&self) -> &'static str {
        "firebase"
    }

    fn connect(&self) -> Connection {
        let session = Arc::new(Session {
            http: self.http.clone(),
            config: Arc::clone(&self.config),
            tokens: RwLock::new(None),
        });
        let (state, _) = watch::channel(AuthState::SignedOut);
        Connection {
            auth: Arc::new(FirebaseAuthClient::new(Arc::clone(&session), state)),
            store: Arc::new(FirestoreStore::new(session)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Status and message of a failed REST call.
async fn read_error(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let envelope: ErrorEnvelope = serde_json::from_str(&text).unwrap_or_default();
    let message = if envelope.error.message.is_empty() {
        format!("HTTP {}", status)
    } else {
        envelope.error.message
    };
    (status, message)
}

/// Map an Identity Toolkit error message such as
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
fn auth_error_code(message: &str) -> AuthErrorCode {
    let key = message
        .split(|ch: char| ch == ' ' || ch == ':')
        .next()
        .unwrap_or_default();
    match key {
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
        "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
        "USER_DISABLED" => AuthErrorCode::UserDisabled,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => AuthErrorCode::InvalidCredential,
        "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
        "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" => {
            AuthErrorCode::RequiresRecentLogin
        }
        _ => AuthErrorCode::Other,
    }
}

/// Map a failed Firestore call onto the crate's error kinds.
fn store_error(status: StatusCode, message: String) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Error::PermissionDenied(message),
        _ => Error::Backend(message),
    }
}

fn expiry_from(expires_in: &str) -> DateTime<Utc> {
    let seconds = expires_in.trim().parse::<i64>().unwrap_or(3600);
    Utc::now() + Duration::seconds(seconds)
}
