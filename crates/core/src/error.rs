//! Error types for the core library

use thiserror::Error;

/// Authentication failure classes reported by the identity backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    RequiresRecentLogin,
    Other,
}

impl AuthErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserDisabled => "auth/user-disabled",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::RequiresRecentLogin => "auth/requires-recent-login",
            Self::Other => "auth/internal-error",
        }
    }

    /// Message shown on the sign-in form for this failure.
    pub fn login_message(self) -> &'static str {
        match self {
            Self::InvalidEmail => "Invalid email address.",
            Self::UserDisabled => "This account has been disabled.",
            Self::UserNotFound => "No account found with this email.",
            Self::WrongPassword => "Incorrect password.",
            Self::InvalidCredential => "Invalid email or password.",
            _ => "Login failed. Please try again.",
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication failed ({code}): {message}")]
    Auth {
        code: AuthErrorCode,
        message: String,
    },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn auth(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self::Auth {
            code,
            message: message.into(),
        }
    }

    /// The bare message, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(message)
            | Self::PermissionDenied(message)
            | Self::InvalidInput(message)
            | Self::Storage(message)
            | Self::Backend(message)
            | Self::Config(message)
            | Self::Auth { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Auth error code, if this is an authentication failure.
    pub fn auth_code(&self) -> Option<AuthErrorCode> {
        match self {
            Self::Auth { code, .. } => Some(*code),
            _ => None,
        }
    }
}
