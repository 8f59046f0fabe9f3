//! Backend configuration from the environment
//!
//! | Variable | Default |
//! |---|---|
//! | `FIXIT_BACKEND` | `memory` |
//! | `FIXIT_DATA_DIR` | unset (memory backend is not persisted) |
//! | `FIXIT_FIREBASE_CONFIG` | path to the web config JSON |
//! | `FIXIT_FIREBASE_API_KEY`, `FIXIT_FIREBASE_PROJECT_ID` | used when no config file is given |
//! | `FIXIT_AUTH_TIMEOUT_SECS` | `10` |
//! | `FIXIT_BOOTSTRAP_ADMIN` | `email:password`, memory backend only |

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::backend::firebase::{FirebaseBackend, FirebaseConfig};
use crate::backend::{to_fields, Backend, MemoryBackend};
use crate::console::DEFAULT_AUTH_TIMEOUT;
use crate::error::AuthErrorCode;
use crate::model::{Collection, NewUser, Role, UserFields};
use crate::{Error, Result};

const BACKEND_STATE_FILE: &str = "backend.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Firebase,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "memory" | "local" => Ok(Self::Memory),
            "firebase" => Ok(Self::Firebase),
            other => Err(Error::Config(format!("Unknown backend '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl FromStr for BootstrapAdmin {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let (email, password) = value.split_once(':').ok_or_else(|| {
            Error::Config("FIXIT_BOOTSTRAP_ADMIN must look like email:password".to_string())
        })?;
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::Config(
                "FIXIT_BOOTSTRAP_ADMIN needs both email and password".to_string(),
            ));
        }
        Ok(Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendKind,
    pub data_dir: Option<PathBuf>,
    pub firebase: Option<FirebaseConfig>,
    pub auth_timeout: Duration,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            data_dir: None,
            firebase: None,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            bootstrap_admin: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let backend = match var("FIXIT_BACKEND") {
            Some(raw) => raw.parse()?,
            None => BackendKind::Memory,
        };

        let auth_timeout = match var("FIXIT_AUTH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("FIXIT_AUTH_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_AUTH_TIMEOUT,
        };

        let firebase = match backend {
            BackendKind::Memory => None,
            BackendKind::Firebase => Some(firebase_config(&var)?),
        };

        Ok(Self {
            backend,
            data_dir: var("FIXIT_DATA_DIR").map(PathBuf::from),
            firebase,
            auth_timeout,
            bootstrap_admin: var("FIXIT_BOOTSTRAP_ADMIN")
                .map(|raw| raw.parse())
                .transpose()?,
        })
    }

    pub async fn build_backend(&self) -> Result<Arc<dyn Backend>> {
        match self.backend {
            BackendKind::Firebase => {
                let config = self.firebase.clone().ok_or_else(|| {
                    Error::Config("Firebase backend selected without a config".to_string())
                })?;
                if self.bootstrap_admin.is_some() {
                    warn!("FIXIT_BOOTSTRAP_ADMIN is ignored with the firebase backend");
                }
                info!(project_id = %config.project_id, "Using Firebase backend");
                Ok(Arc::new(FirebaseBackend::new(config)?))
            }
            BackendKind::Memory => {
                let backend = match &self.data_dir {
                    Some(dir) => MemoryBackend::open(dir.join(BACKEND_STATE_FILE)).await?,
                    None => {
                        info!("Using in-memory backend without persistence");
                        MemoryBackend::new()
                    }
                };
                if let Some(admin) = &self.bootstrap_admin {
                    bootstrap_admin(&backend, admin).await?;
                }
                Ok(Arc::new(backend))
            }
        }
    }
}

fn firebase_config<F>(var: &F) -> Result<FirebaseConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = var("FIXIT_FIREBASE_CONFIG") {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path, e)))?;
        let config: FirebaseConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path, e)))?;
        config.validate()?;
        return Ok(config);
    }

    match (var("FIXIT_FIREBASE_API_KEY"), var("FIXIT_FIREBASE_PROJECT_ID")) {
        (Some(api_key), Some(project_id)) => Ok(FirebaseConfig::new(api_key, project_id)),
        _ => Err(Error::Config(
            "Set FIXIT_FIREBASE_CONFIG or FIXIT_FIREBASE_API_KEY and FIXIT_FIREBASE_PROJECT_ID"
                .to_string(),
        )),
    }
}

/// Make sure a global admin account with a profile exists.
async fn bootstrap_admin(backend: &MemoryBackend, admin: &BootstrapAdmin) -> Result<()> {
    let account = match backend.create_account(&admin.email, &admin.password).await {
        Ok(account) => account,
        Err(err) if err.auth_code() == Some(AuthErrorCode::EmailAlreadyInUse) => {
            info!(email = %admin.email, "Bootstrap admin already exists");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let profile = NewUser::new(
        account.uid,
        UserFields::new(account.email.clone(), Role::GlobalAdmin).with_name("Administrator"),
    );
    let mut fields = to_fields(&profile)?;
    fields.insert("active".to_string(), serde_json::Value::Bool(true));
    backend.insert_document(Collection::Users, fields).await?;
    info!(email = %account.email, "Created bootstrap admin");
    Ok(())
}
