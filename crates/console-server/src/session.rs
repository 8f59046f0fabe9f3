//! Console sessions and the bearer tokens that name them
//!
//! Each signed-in browser gets its own backend connection, so the auth state
//! of one admin never leaks into another. The token's subject is the session
//! id; the session itself lives in [`crate::state::AppState`].

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use fixit_core::backend::Connection;
use fixit_core::console::{AdminConsole, Principal};
use fixit_core::service::Services;

pub const SESSION_TTL_HOURS: i64 = 12;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to sign session token: {0}")]
    Sign(jsonwebtoken::errors::Error),

    #[error("Invalid session token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("Session token has a malformed subject")]
    MalformedSubject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

impl SessionClaims {
    pub fn session_id(&self) -> Result<Uuid, SessionError> {
        Uuid::parse_str(&self.sub).map_err(|_| SessionError::MalformedSubject)
    }
}

fn session_validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation
}

pub fn issue_session_jwt(
    secret: &str,
    session_id: Uuid,
    email: &str,
    ttl_hours: i64,
) -> Result<(String, usize), SessionError> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = SessionClaims {
        sub: session_id.to_string(),
        email: email.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(|token| (token, exp))
    .map_err(SessionError::Sign)
}

pub fn verify_session_jwt(secret: &str, token: &str) -> Result<SessionClaims, SessionError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &session_validation(),
    )
    .map(|decoded| decoded.claims)
    .map_err(SessionError::Invalid)
}

/// One browser's connection plus the console opened on it.
pub struct ConsoleSession {
    services: Services,
    console: Option<AdminConsole>,
}

impl ConsoleSession {
    pub fn new(connection: &Connection) -> Self {
        Self {
            services: Services::new(connection),
            console: None,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn console(&self) -> Option<&AdminConsole> {
        self.console.as_ref()
    }

    pub fn console_mut(&mut self) -> Option<&mut AdminConsole> {
        self.console.as_mut()
    }

    /// Replace the console with a fresh one for `principal`.
    pub fn open(&mut self, principal: Principal) -> &mut AdminConsole {
        self.console
            .insert(AdminConsole::new(principal, self.services.clone()))
    }

    pub fn close(&mut self) {
        self.console = None;
    }
}
