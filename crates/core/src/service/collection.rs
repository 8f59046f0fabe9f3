//! Typed access to one document collection

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{to_fields, Document, DocumentStore};
use crate::model::Entity;
use crate::{Error, Result};

/// Decodes documents of `T::COLLECTION` into `T`.
pub struct CollectionClient<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionClient<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> CollectionClient<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        let documents = self.store.list(T::COLLECTION).await?;
        decode_all(documents)
    }

    /// The entity with this id, or `"<Entity> not found"`.
    pub async fn by_id(&self, id: &str) -> Result<T> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(document) => document.into_entity(),
            None => Err(Error::NotFound(format!("{} not found", T::LABEL))),
        }
    }

    pub async fn by_field(&self, field: &str, value: impl Into<Value>) -> Result<Vec<T>> {
        let documents = self
            .store
            .find_by_field(T::COLLECTION, field, &value.into())
            .await?;
        decode_all(documents)
    }

    /// Number of stored documents whose `field` equals `value`, counted
    /// without decoding so malformed records still count.
    pub async fn count_by_field(&self, field: &str, value: impl Into<Value>) -> Result<usize> {
        let documents = self
            .store
            .find_by_field(T::COLLECTION, field, &value.into())
            .await?;
        Ok(documents.len())
    }

    /// Write a new document marked active and return it as stored.
    pub async fn create<F: Serialize>(&self, fields: &F) -> Result<T> {
        let mut fields = to_fields(fields)?;
        fields.insert("active".to_string(), Value::Bool(true));
        let document = self.store.create(T::COLLECTION, fields).await?;
        debug!(collection = %T::COLLECTION, id = %document.id, "Created {}", T::LABEL);
        document.into_entity()
    }

    /// Overwrite the editable fields of an existing document.
    pub async fn update<F: Serialize>(&self, id: &str, fields: &F) -> Result<()> {
        let fields = to_fields(fields)?;
        self.store.update(T::COLLECTION, id, fields).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(T::COLLECTION, id).await
    }
}

/// Decode each document on its own. One malformed record is logged and
/// skipped rather than failing the whole list.
fn decode_all<T: Entity>(documents: Vec<Document>) -> Result<Vec<T>> {
    let mut entities = Vec::with_capacity(documents.len());
    for document in documents {
        let id = document.id.clone();
        match document.into_entity() {
            Ok(entity) => entities.push(entity),
            Err(err) => {
                warn!(collection = %T::COLLECTION, %id, error = %err, "Skipping undecodable document")
            }
        }
    }
    Ok(entities)
}
