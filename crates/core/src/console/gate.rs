//! Auth gate in front of the admin console
//!
//! Waits for the connection's first resolved auth state, bounded by a fixed
//! timeout, then loads the caller's profile and checks the role. Profiles
//! that are missing or not admin are signed out again.

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{info, warn};

use super::scope::Principal;
use crate::backend::AuthState;
use crate::model::Role;
use crate::service::{AuthService, UserService};

pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown while the gate is still checking.
pub const CHECKING_MESSAGE: &str = "Verifying authentication...";

/// Where the gate ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum GateOutcome {
    TimedOut,
    Unauthenticated,
    ProfileMissing { error: String },
    AccessDenied { role: Role },
    Failed { error: String },
    Authorized { principal: Principal },
}

impl GateOutcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authorized { principal } => Some(principal),
            _ => None,
        }
    }

    pub fn into_principal(self) -> Option<Principal> {
        match self {
            Self::Authorized { principal } => Some(principal),
            _ => None,
        }
    }

    /// Text for the auth wall.
    pub fn message(&self) -> String {
        match self {
            Self::TimedOut => "Authentication timeout. Please refresh.".to_string(),
            Self::Unauthenticated => {
                "You must be signed in to access the admin console.".to_string()
            }
            Self::ProfileMissing { error } => format!("User document not found: {}", error),
            Self::AccessDenied { role } => format!("Access denied. Your role: {}", role),
            Self::Failed { error } => format!("Error: {}", error),
            Self::Authorized { principal } => format!("Signed in as {}", principal.auth.email),
        }
    }

    /// Whether the wall offers a way to the sign-in page.
    pub fn offers_sign_in(&self) -> bool {
        !matches!(self, Self::AccessDenied { .. } | Self::Authorized { .. })
    }
}

pub struct AuthGate {
    auth: AuthService,
    users: UserService,
    timeout: Duration,
}

impl AuthGate {
    pub fn new(auth: AuthService, users: UserService) -> Self {
        Self {
            auth,
            users,
            timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn check(&self) -> GateOutcome {
        let mut changes = self.auth.on_auth_state_changed();
        let waited = timeout(self.timeout, async {
            changes
                .wait_for(AuthState::is_resolved)
                .await
                .map(|state| state.clone())
        })
        .await;

        let state = match waited {
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs_f64(), "Auth check timed out");
                return GateOutcome::TimedOut;
            }
            Ok(Err(_)) => {
                return GateOutcome::Failed {
                    error: "Auth state channel closed".to_string(),
                };
            }
            Ok(Ok(state)) => state,
        };

        let AuthState::SignedIn(user) = state else {
            return GateOutcome::Unauthenticated;
        };

        let profile = self.users.get_user_by_auth_id(&user.uid).await;
        let profile = match profile.into_result() {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                self.auth.sign_out().await;
                return GateOutcome::ProfileMissing {
                    error: "empty response".to_string(),
                };
            }
            Err(error) => {
                warn!(uid = %user.uid, %error, "No profile for signed-in user");
                self.auth.sign_out().await;
                return GateOutcome::ProfileMissing { error };
            }
        };

        if !profile.role.is_admin() {
            warn!(email = %user.email, role = %profile.role, "Console access denied");
            self.auth.sign_out().await;
            return GateOutcome::AccessDenied { role: profile.role };
        }

        info!(email = %user.email, role = %profile.role, "Console access granted");
        GateOutcome::Authorized {
            principal: Principal::new(user, profile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{to_fields, Backend, MemoryBackend};
    use crate::model::{Collection, NewUser, UserFields};
    use crate::service::Services;

    async fn seed(backend: &MemoryBackend, email: &str, role: Role) {
        let account = backend.create_account(email, "secret1").await.unwrap();
        let profile = NewUser::new(account.uid, UserFields::new(email, role));
        backend
            .insert_document(Collection::Users, to_fields(&profile).unwrap())
            .await
            .unwrap();
    }

    fn gate(services: &Services) -> AuthGate {
        AuthGate::new(services.auth.clone(), services.users.clone())
    }

    #[tokio::test]
    async fn test_signed_out_must_sign_in() {
        let backend = MemoryBackend::new();
        let services = Services::new(&backend.connect());

        let outcome = gate(&services).check().await;
        assert_eq!(outcome, GateOutcome::Unauthenticated);
        assert_eq!(
            outcome.message(),
            "You must be signed in to access the admin console."
        );
        assert!(outcome.offers_sign_in());
    }

    #[tokio::test]
    async fn test_unresolved_state_times_out() {
        let backend = MemoryBackend::new();
        backend.set_defer_auth(true);
        let services = Services::new(&backend.connect());

        let outcome = gate(&services)
            .with_timeout(Duration::from_millis(50))
            .check()
            .await;
        assert_eq!(outcome, GateOutcome::TimedOut);
        assert_eq!(outcome.message(), "Authentication timeout. Please refresh.");
    }

    #[tokio::test]
    async fn test_tech_is_denied_and_signed_out() {
        let backend = MemoryBackend::new();
        seed(&backend, "tech@fixit.test", Role::Tech).await;
        let services = Services::new(&backend.connect());
        services.auth.sign_in("tech@fixit.test", "secret1").await;

        let outcome = gate(&services).check().await;
        assert_eq!(outcome, GateOutcome::AccessDenied { role: Role::Tech });
        assert_eq!(outcome.message(), "Access denied. Your role: tech");
        assert!(!outcome.offers_sign_in());
        assert!(services.auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_role_is_denied() {
        let backend = MemoryBackend::new();
        let account = backend.create_account("old@fixit.test", "secret1").await.unwrap();
        let serde_json::Value::Object(fields) = serde_json::json!({
            "authId": account.uid,
            "email": "old@fixit.test",
            "role": "admin"
        }) else {
            unreachable!()
        };
        backend.insert_document(Collection::Users, fields).await.unwrap();
        let services = Services::new(&backend.connect());
        services.auth.sign_in("old@fixit.test", "secret1").await;

        let outcome = gate(&services).check().await;
        assert_eq!(
            outcome,
            GateOutcome::AccessDenied {
                role: Role::Other("admin".to_string())
            }
        );
        assert_eq!(outcome.message(), "Access denied. Your role: admin");
        assert!(services.auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_missing_profile_signs_out() {
        let backend = MemoryBackend::new();
        backend.create_account("ghost@fixit.test", "secret1").await.unwrap();
        let services = Services::new(&backend.connect());
        services.auth.sign_in("ghost@fixit.test", "secret1").await;

        let outcome = gate(&services).check().await;
        assert!(matches!(outcome, GateOutcome::ProfileMissing { .. }));
        assert!(outcome.message().starts_with("User document not found: User not found with authId:"));
        assert!(services.auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_admin_is_authorized() {
        let backend = MemoryBackend::new();
        seed(&backend, "local@fixit.test", Role::LocalAdmin).await;
        let services = Services::new(&backend.connect());
        services.auth.sign_in("local@fixit.test", "secret1").await;

        let outcome = gate(&services).check().await;
        let principal = outcome.principal().unwrap();
        assert_eq!(principal.role(), &Role::LocalAdmin);
        assert_eq!(principal.auth.email, "local@fixit.test");
        assert!(services.auth.current_user().is_some());
    }

    #[tokio::test]
    async fn test_sign_in_during_wait_resolves_gate() {
        let backend = MemoryBackend::new();
        backend.set_defer_auth(true);
        seed(&backend, "root@fixit.test", Role::GlobalAdmin).await;
        let services = Services::new(&backend.connect());

        let auth = services.auth.clone();
        let signer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            auth.sign_in("root@fixit.test", "secret1").await
        });

        let outcome = gate(&services).with_timeout(Duration::from_secs(5)).check().await;
        assert!(signer.await.unwrap().success);
        assert!(outcome.is_authorized());
    }
}
