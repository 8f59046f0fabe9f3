//! In-memory backend with optional JSON file persistence
//!
//! Stands in for the managed backend in tests and local runs. Documents and
//! accounts live behind one `RwLock`; every `connect()` gets its own auth
//! session so two consoles can be signed in as different users.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use super::{
    AuthClient, AuthState, AuthUser, Backend, Connection, Document, DocumentStore, Fields,
    CREATED_AT, UPDATED_AT,
};
use crate::error::AuthErrorCode;
use crate::model::Collection;
use crate::{Error, Result};

const DOCUMENT_ID_LEN: usize = 20;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    uid: String,
    email: String,
    password_hash: String,
    #[serde(default)]
    disabled: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<Collection, BTreeMap<String, Fields>>,
    accounts: HashMap<String, Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDocument {
    collection: Collection,
    id: String,
    fields: Fields,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredMemoryState {
    documents: Vec<StoredDocument>,
    accounts: Vec<Account>,
}

impl From<StoredMemoryState> for MemoryState {
    fn from(value: StoredMemoryState) -> Self {
        let mut collections: HashMap<Collection, BTreeMap<String, Fields>> = HashMap::new();
        for document in value.documents {
            collections
                .entry(document.collection)
                .or_default()
                .insert(document.id, document.fields);
        }
        Self {
            collections,
            accounts: value
                .accounts
                .into_iter()
                .map(|account| (account.uid.clone(), account))
                .collect(),
        }
    }
}

impl From<&MemoryState> for StoredMemoryState {
    fn from(value: &MemoryState) -> Self {
        let mut documents = Vec::new();
        for collection in Collection::ALL {
            if let Some(items) = value.collections.get(&collection) {
                documents.extend(items.iter().map(|(id, fields)| StoredDocument {
                    collection,
                    id: id.clone(),
                    fields: fields.clone(),
                }));
            }
        }
        let mut accounts: Vec<Account> = value.accounts.values().cloned().collect();
        accounts.sort_by(|left, right| left.email.cmp(&right.email));
        Self {
            documents,
            accounts,
        }
    }
}

struct Shared {
    state: RwLock<MemoryState>,
    file_path: Option<PathBuf>,
    reject_writes: AtomicBool,
    defer_auth: AtomicBool,
}

impl Shared {
    async fn persist(&self, state: &MemoryState) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        persist_state(path, state).await
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(Error::PermissionDenied(
                "Missing or insufficient permissions.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Thread-safe in-memory backend.
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// A backend that keeps everything in memory.
    pub fn new() -> Self {
        Self::with_state(MemoryState::default(), None)
    }

    /// A backend persisted to `file_path`, loading existing state if present.
    pub async fn open(file_path: PathBuf) -> Result<Self> {
        let state = load_state(&file_path).await?;
        info!(path = %file_path.display(), "Opened local backend state");
        Ok(Self::with_state(state, Some(file_path)))
    }

    fn with_state(state: MemoryState, file_path: Option<PathBuf>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                file_path,
                reject_writes: AtomicBool::new(false),
                defer_auth: AtomicBool::new(false),
            }),
        }
    }

    /// Make every document write fail with a permission error.
    pub fn set_reject_writes(&self, reject: bool) {
        self.shared.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Keep new connections in [`AuthState::Unknown`] until they sign in,
    /// as a backend that never answers the initial auth check would.
    pub fn set_defer_auth(&self, defer: bool) {
        self.shared.defer_auth.store(defer, Ordering::SeqCst);
    }

    /// Register an identity directly, without going through a connection.
    pub async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser> {
        create_account(&self.shared, email, password).await
    }

    pub async fn set_account_disabled(&self, uid: &str, disabled: bool) -> Result<()> {
        let mut state = self.shared.state.write().await;
        let account = state
            .accounts
            .get_mut(uid)
            .ok_or_else(|| Error::auth(AuthErrorCode::UserNotFound, "No such account"))?;
        account.disabled = disabled;
        self.shared.persist(&state).await
    }

    /// Insert a document directly, bypassing the write switch.
    pub async fn insert_document(&self, collection: Collection, fields: Fields) -> Result<Document> {
        insert_document(&self.shared, collection, fields).await
    }

    pub async fn document_count(&self, collection: Collection) -> usize {
        let state = self.shared.state.read().await;
        state
            .collections
            .get(&collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub async fn account_count(&self) -> usize {
        self.shared.state.read().await.accounts.len()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn connect(&self) -> Connection {
        let initial = if self.shared.defer_auth.load(Ordering::SeqCst) {
            AuthState::Unknown
        } else {
            AuthState::SignedOut
        };
        let (state, _) = watch::channel(initial);
        Connection {
            auth: Arc::new(MemoryAuthClient {
                shared: Arc::clone(&self.shared),
                state,
            }),
            store: Arc::new(MemoryDocumentStore {
                shared: Arc::clone(&self.shared),
            }),
        }
    }
}

struct MemoryDocumentStore {
    shared: Arc<Shared>,
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        let state = self.shared.state.read().await;
        Ok(state
            .collections
            .get(&collection)
            .map(|items| {
                items
                    .iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let state = self.shared.state.read().await;
        Ok(state
            .collections
            .get(&collection)
            .and_then(|items| items.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let state = self.shared.state.read().await;
        Ok(state
            .collections
            .get(&collection)
            .map(|items| {
                items
                    .iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document> {
        self.shared.check_writable()?;
        insert_document(&self.shared, collection, fields).await
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
        self.shared.check_writable()?;
        let mut state = self.shared.state.write().await;
        let existing = state
            .collections
            .get_mut(&collection)
            .and_then(|items| items.get_mut(id))
            .ok_or_else(|| {
                Error::NotFound(format!("No document to update: {}/{}", collection, id))
            })?;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        existing.insert(UPDATED_AT.to_string(), Value::String(timestamp_now()));
        debug!(%collection, id, "Updated document");
        self.shared.persist(&state).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.shared.check_writable()?;
        let mut state = self.shared.state.write().await;
        let removed = state
            .collections
            .get_mut(&collection)
            .and_then(|items| items.remove(id))
            .is_some();
        if removed {
            debug!(%collection, id, "Deleted document");
            self.shared.persist(&state).await?;
        }
        Ok(())
    }
}

struct MemoryAuthClient {
    shared: Arc<Shared>,
    state: watch::Sender<AuthState>,
}

#[async_trait]
impl AuthClient for MemoryAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let normalized = normalize_email(email)?;
        let user = {
            let state = self.shared.state.read().await;
            let account = state
                .accounts
                .values()
                .find(|account| account.email == normalized)
                .ok_or_else(|| {
                    Error::auth(AuthErrorCode::UserNotFound, "There is no user record for this email")
                })?;
            if account.disabled {
                return Err(Error::auth(
                    AuthErrorCode::UserDisabled,
                    "The user account has been disabled",
                ));
            }
            if !verify_password(&account.password_hash, password) {
                return Err(Error::auth(
                    AuthErrorCode::WrongPassword,
                    "The password is invalid",
                ));
            }
            AuthUser {
                uid: account.uid.clone(),
                email: account.email.clone(),
            }
        };
        self.state.send_replace(AuthState::SignedIn(user.clone()));
        debug!(uid = %user.uid, "Signed in");
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        create_account(&self.shared, email, password).await
    }

    async fn sign_out(&self) -> Result<()> {
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
        let mut state = self.shared.state.write().await;
        if state.accounts.remove(&user.uid).is_none() {
            return Err(Error::auth(
                AuthErrorCode::UserNotFound,
                "There is no user record for this identifier",
            ));
        }
        self.shared.persist(&state).await?;
        drop(state);

        if self
            .current_user()
            .is_some_and(|current| current.uid == user.uid)
        {
            self.state.send_replace(AuthState::SignedOut);
        }
        Ok(())
    }
}

async fn create_account(shared: &Shared, email: &str, password: &str) -> Result<AuthUser> {
    let normalized = normalize_email(email)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::auth(
            AuthErrorCode::WeakPassword,
            "Password should be at least 6 characters",
        ));
    }

    let mut state = shared.state.write().await;
    if state
        .accounts
        .values()
        .any(|account| account.email == normalized)
    {
        return Err(Error::auth(
            AuthErrorCode::EmailAlreadyInUse,
            "The email address is already in use by another account",
        ));
    }

    let account = Account {
        uid: generate_id(28),
        email: normalized,
        password_hash: hash_password(password),
        disabled: false,
        created_at: Utc::now(),
    };
    let user = AuthUser {
        uid: account.uid.clone(),
        email: account.email.clone(),
    };
    state.accounts.insert(account.uid.clone(), account);
    shared.persist(&state).await?;
    debug!(uid = %user.uid, "Created account");
    Ok(user)
}

async fn insert_document(shared: &Shared, collection: Collection, mut fields: Fields) -> Result<Document> {
    let now = Value::String(timestamp_now());
    fields.insert(CREATED_AT.to_string(), now.clone());
    fields.insert(UPDATED_AT.to_string(), now);

    let mut state = shared.state.write().await;
    let items = state.collections.entry(collection).or_default();
    let mut id = generate_id(DOCUMENT_ID_LEN);
    while items.contains_key(&id) {
        id = generate_id(DOCUMENT_ID_LEN);
    }
    items.insert(id.clone(), fields.clone());
    shared.persist(&state).await?;
    debug!(%collection, %id, "Created document");
    Ok(Document::new(id, fields))
}

async fn load_state(path: &Path) -> Result<MemoryState> {
    if !path.exists() {
        return Ok(MemoryState::default());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| Error::Storage(format!("Failed to read backend state: {}", err)))?;
    if content.trim().is_empty() {
        return Ok(MemoryState::default());
    }
    let stored: StoredMemoryState = serde_json::from_str(&content)
        .map_err(|err| Error::Storage(format!("Failed to parse backend state: {}", err)))?;
    Ok(stored.into())
}

async fn persist_state(path: &Path, state: &MemoryState) -> Result<()> {
    let content = serde_json::to_string_pretty(&StoredMemoryState::from(state))
        .map_err(|err| Error::Storage(format!("Failed to serialize backend state: {}", err)))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| Error::Storage(format!("Failed to create directory: {}", err)))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|err| Error::Storage(format!("Failed to write backend state: {}", err)))?;
    Ok(())
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn generate_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn normalize_email(email: &str) -> Result<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(Error::auth(
            AuthErrorCode::InvalidEmail,
            "The email address is badly formatted",
        ));
    }
    Ok(normalized)
}

fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!(
        "v1${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let (Some("v1"), Some(encoded_salt), Some(encoded_digest)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let (Ok(salt), Ok(expected_digest)) = (
        URL_SAFE_NO_PAD.decode(encoded_salt),
        URL_SAFE_NO_PAD.decode(encoded_digest),
    ) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    expected_digest == hasher.finalize().as_slice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let backend = MemoryBackend::new();
        let conn = backend.connect();

        let doc = conn
            .store
            .create(Collection::Organizations, fields(json!({ "name": "Acme" })))
            .await
            .unwrap();

        assert_eq!(doc.id.len(), DOCUMENT_ID_LEN);
        assert!(doc.fields.contains_key(CREATED_AT));
        assert!(doc.fields.contains_key(UPDATED_AT));

        let fetched = conn
            .store
            .get(Collection::Organizations, &doc.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.fields["name"], "Acme");
    }

    #[tokio::test]
    async fn test_update_merges_and_requires_existing() {
        let backend = MemoryBackend::new();
        let conn = backend.connect();
        let doc = conn
            .store
            .create(
                Collection::Stations,
                fields(json!({ "name": "North", "code": "N1" })),
            )
            .await
            .unwrap();

        conn.store
            .update(Collection::Stations, &doc.id, fields(json!({ "name": "North Yard" })))
            .await
            .unwrap();
        let updated = conn
            .store
            .get(Collection::Stations, &doc.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.fields["name"], "North Yard");
        assert_eq!(updated.fields["code"], "N1");

        let missing = conn
            .store
            .update(Collection::Stations, "nope", Fields::new())
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = MemoryBackend::new();
        let conn = backend.connect();
        let doc = backend
            .insert_document(Collection::Equipment, fields(json!({ "equipmentId": "E-1" })))
            .await
            .unwrap();

        conn.store.delete(Collection::Equipment, &doc.id).await.unwrap();
        conn.store.delete(Collection::Equipment, &doc.id).await.unwrap();
        assert_eq!(backend.document_count(Collection::Equipment).await, 0);
    }

    #[tokio::test]
    async fn test_find_by_field_matches_equality() {
        let backend = MemoryBackend::new();
        let conn = backend.connect();
        for (name, org) in [("A", "o1"), ("B", "o2"), ("C", "o1")] {
            backend
                .insert_document(
                    Collection::Stations,
                    fields(json!({ "name": name, "organizationId": org })),
                )
                .await
                .unwrap();
        }

        let found = conn
            .store
            .find_by_field(Collection::Stations, "organizationId", &json!("o1"))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_writes() {
        let backend = MemoryBackend::new();
        let conn = backend.connect();
        backend.set_reject_writes(true);

        let result = conn
            .store
            .create(Collection::Users, fields(json!({ "email": "x@y.test" })))
            .await;
        assert!(matches!(result, Err(Error::PermissionDenied(_))));
        assert_eq!(backend.document_count(Collection::Users).await, 0);
    }

    #[tokio::test]
    async fn test_sign_in_flow_and_state_notifications() {
        let backend = MemoryBackend::new();
        backend
            .create_account("Admin@Acme.test", "secret-pw")
            .await
            .unwrap();
        let conn = backend.connect();
        let rx = conn.auth.subscribe();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);

        let wrong = conn.auth.sign_in("admin@acme.test", "nope").await.unwrap_err();
        assert_eq!(wrong.auth_code(), Some(AuthErrorCode::WrongPassword));

        let missing = conn.auth.sign_in("ghost@acme.test", "x").await.unwrap_err();
        assert_eq!(missing.auth_code(), Some(AuthErrorCode::UserNotFound));

        let user = conn.auth.sign_in("admin@acme.test", "secret-pw").await.unwrap();
        assert_eq!(user.email, "admin@acme.test");
        assert_eq!(conn.auth.current_user(), Some(user.clone()));
        assert_eq!(*rx.borrow(), AuthState::SignedIn(user));

        conn.auth.sign_out().await.unwrap();
        assert!(conn.auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_keeps_current_session() {
        let backend = MemoryBackend::new();
        backend.create_account("admin@acme.test", "secret-pw").await.unwrap();
        let conn = backend.connect();
        let admin = conn.auth.sign_in("admin@acme.test", "secret-pw").await.unwrap();

        let created = conn.auth.sign_up("tech@acme.test", "tech-pw").await.unwrap();
        assert_ne!(created.uid, admin.uid);
        assert_eq!(conn.auth.current_user(), Some(admin));

        let duplicate = conn.auth.sign_up("tech@acme.test", "tech-pw").await.unwrap_err();
        assert_eq!(duplicate.auth_code(), Some(AuthErrorCode::EmailAlreadyInUse));

        let weak = conn.auth.sign_up("new@acme.test", "123").await.unwrap_err();
        assert_eq!(weak.auth_code(), Some(AuthErrorCode::WeakPassword));
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_sign_in() {
        let backend = MemoryBackend::new();
        let user = backend.create_account("old@acme.test", "secret-pw").await.unwrap();
        backend.set_account_disabled(&user.uid, true).await.unwrap();

        let err = backend
            .connect()
            .auth
            .sign_in("old@acme.test", "secret-pw")
            .await
            .unwrap_err();
        assert_eq!(err.auth_code(), Some(AuthErrorCode::UserDisabled));
    }

    #[tokio::test]
    async fn test_deferred_auth_starts_unknown() {
        let backend = MemoryBackend::new();
        backend.set_defer_auth(true);
        let conn = backend.connect();
        assert_eq!(*conn.auth.subscribe().borrow(), AuthState::Unknown);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backend.json");

        let doc_id = {
            let backend = MemoryBackend::open(path.clone()).await.unwrap();
            backend.create_account("admin@acme.test", "secret-pw").await.unwrap();
            backend
                .insert_document(Collection::Organizations, fields(json!({ "name": "Acme" })))
                .await
                .unwrap()
                .id
        };

        let backend = MemoryBackend::open(path).await.unwrap();
        assert_eq!(backend.account_count().await, 1);
        let doc = backend
            .connect()
            .store
            .get(Collection::Organizations, &doc_id)
            .await
            .unwrap();
        assert!(doc.is_some());
        backend
            .connect()
            .auth
            .sign_in("admin@acme.test", "secret-pw")
            .await
            .unwrap();
    }
}
