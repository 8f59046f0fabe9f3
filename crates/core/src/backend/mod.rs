//! Remote backend abstraction
//!
//! The admin console talks to a managed backend that provides two things:
//! identity (sign-in, sign-up, auth-state notifications) and a document
//! store organised in flat collections. Both sides sit behind traits so the
//! service façade works the same against the in-memory backend used in
//! tests and local runs, and against the Firebase REST APIs.

pub mod firebase;
mod memory;

pub use memory::MemoryBackend;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::model::{Collection, Entity};
use crate::{Error, Result};

/// Raw document fields, keyed by camelCase field name.
pub type Fields = serde_json::Map<String, Value>;

/// Field names the store maintains itself.
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

/// A stored document: its id plus its field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode into a typed entity. The document id wins over any `id` field.
    pub fn into_entity<T: Entity>(self) -> Result<T> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Serialize a value into a document field map.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::InvalidInput(format!(
            "Expected an object for document fields, got {}",
            other
        ))),
    }
}

/// Document store operations, one remote call each.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>>;

    /// A single document, `None` if it does not exist.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    /// Documents whose `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>>;

    /// Add a document under a store-assigned id. `createdAt` and `updatedAt`
    /// are set by the store.
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document>;

    /// Merge `fields` into an existing document and refresh `updatedAt`.
    /// Fails with [`Error::NotFound`] when the document does not exist.
    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<()>;

    /// Remove a document. Removing a missing document is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}

/// An authenticated identity as reported by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

/// Observable authentication state of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The backend has not reported yet.
    Unknown,
    SignedOut,
    SignedIn(AuthUser),
}

impl AuthState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Identity operations for one connection.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Create a new identity. The current session is left untouched.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    async fn sign_out(&self) -> Result<()>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Auth-state notifications. The receiver holds the latest state.
    fn subscribe(&self) -> watch::Receiver<AuthState>;

    async fn delete_user(&self, user: &AuthUser) -> Result<()>;
}

/// One client connection to the backend, the equivalent of an initialised
/// app handle in a single page.
#[derive(Clone)]
pub struct Connection {
    pub auth: Arc<dyn AuthClient>,
    pub store: Arc<dyn DocumentStore>,
}

/// A backend that hands out independent connections.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn connect(&self) -> Connection;
}
