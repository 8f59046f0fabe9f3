//! Firestore REST document store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::value::{decode_fields, encode_fields, encode_timestamp, encode_value};
use super::{read_error, store_error, Session};
use crate::backend::{Document, DocumentStore, Fields, CREATED_AT, UPDATED_AT};
use crate::model::Collection;
use crate::{Error, Result};

const PAGE_SIZE: u32 = 300;

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

impl RawDocument {
    fn into_document(self) -> Result<Document> {
        let fields = match &self.fields {
            Some(fields) => decode_fields(fields)?,
            None => Fields::new(),
        };
        Ok(Document::new(document_id(&self.name), fields))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    document: Option<RawDocument>,
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn query_body(collection: Collection, field: &str, value: &Value) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection.as_str() }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value),
                }
            }
        }
    })
}

/// Query string for a partial update. Only the listed fields plus
/// `updatedAt` are written and the call fails if the document does not exist.
fn update_query(fields: &Fields) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = fields
        .keys()
        .filter(|key| key.as_str() != UPDATED_AT)
        .map(|key| ("updateMask.fieldPaths", key.clone()))
        .collect();
    query.push(("updateMask.fieldPaths", UPDATED_AT.to_string()));
    query.push(("currentDocument.exists", "true".to_string()));
    query
}

fn with_timestamps(fields: &Fields, created: bool) -> Value {
    let mut encoded = encode_fields(fields);
    if let Value::Object(map) = &mut encoded {
        let now = Utc::now();
        if created {
            map.insert(CREATED_AT.to_string(), encode_timestamp(now));
        }
        map.insert(UPDATED_AT.to_string(), encode_timestamp(now));
    }
    encoded
}

pub(super) struct FirestoreStore {
    session: Arc<Session>,
}

impl FirestoreStore {
    pub(super) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.session.config.documents_url(), collection.as_str())
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.session.bearer().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Failed to reach Firestore: {}", e)))?;
        if response.status().is_success() {
            return Ok(response);
        }
        let (status, message) = read_error(response).await;
        debug!(%status, %message, "Firestore call failed");
        Err(store_error(status, message))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let request = self
                .session
                .http
                .get(self.collection_url(collection))
                .query(&query);
            let page: ListResponse = self
                .send(request)
                .await?
                .json()
                .await
                .map_err(|e| Error::Backend(format!("Failed to parse list response: {}", e)))?;

            for raw in page.documents {
                documents.push(raw.into_document()?);
            }
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(collection = %collection, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let request = self.session.http.get(self.document_url(collection, id));
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(Error::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        let raw: RawDocument = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse document: {}", e)))?;
        raw.into_document().map(Some)
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.session.config.documents_url());
        let request = self
            .session
            .http
            .post(url)
            .json(&query_body(collection, field, value));
        let results: Vec<QueryResult> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse query response: {}", e)))?;

        results
            .into_iter()
            .filter_map(|result| result.document)
            .map(RawDocument::into_document)
            .collect()
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document> {
        let request = self
            .session
            .http
            .post(self.collection_url(collection))
            .json(&json!({ "fields": with_timestamps(&fields, true) }));
        let raw: RawDocument = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse created document: {}", e)))?;
        let document = raw.into_document()?;
        debug!(collection = %collection, id = %document.id, "Created document");
        Ok(document)
    }

    async fn update(&self, collection: Collection, id: &str, mut fields: Fields) -> Result<()> {
        fields.remove(CREATED_AT);
        fields.remove(UPDATED_AT);

        let request = self
            .session
            .http
            .patch(self.document_url(collection, id))
            .query(&update_query(&fields))
            .json(&json!({ "fields": with_timestamps(&fields, false) }));
        match self.send(request).await {
            Ok(_) => {}
            Err(Error::NotFound(_)) => {
                return Err(Error::NotFound(format!("{}/{}", collection, id)));
            }
            Err(err) => return Err(err),
        }
        debug!(collection = %collection, id, "Updated document");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let request = self.session.http.delete(self.document_url(collection, id));
        self.send(request).await?;
        debug!(collection = %collection, id, "Deleted document");
        Ok(())
    }
}
