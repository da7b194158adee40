//! Elasticsearch bulk client
//!
//! Sends batches to the `_bulk` endpoint as NDJSON `index` actions keyed by document id, so
//! re-submitting a document overwrites it.

use super::{IndexClient, ItemResult, ItemStatus};
use crate::config::BackendConfig;
use crate::domain::{BackendError, Batch, DocumentId, IndexerError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

const NDJSON: &str = "application/x-ndjson";
const MAX_ERROR_BODY: usize = 512;

/// Elasticsearch implementation of [`IndexClient`]
pub struct ElasticsearchClient {
    endpoint: String,
    index: String,
    client: Client,
    auth_header: Option<String>,
}

impl ElasticsearchClient {
    /// Creates a client for the configured endpoint and index
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                IndexerError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let auth_header = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{username}:{}", password.expose_secret().as_ref());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        };

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            client,
            auth_header,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_header {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        }
    }

    /// Encodes a batch as a bulk request body
    fn bulk_body(&self, batch: &Batch) -> Vec<u8> {
        let mut body = Vec::with_capacity(batch.bytes() + batch.len() * 64);

        for item in batch.items() {
            let action = json!({"index": {"_index": self.index, "_id": item.id.as_str()}});
            body.extend_from_slice(action.to_string().as_bytes());
            body.push(b'\n');
            body.extend_from_slice(&item.body);
            body.push(b'\n');
        }

        body
    }
}

#[async_trait]
impl IndexClient for ElasticsearchClient {
    async fn ensure_index(&self) -> std::result::Result<(), BackendError> {
        let url = format!("{}/{}", self.endpoint, self.index);
        let response = self
            .request(reqwest::Method::PUT, url)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(index = %self.index, "Created index");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && text.contains("resource_already_exists_exception")
        {
            tracing::debug!(index = %self.index, "Index already exists");
            return Ok(());
        }

        Err(BackendError::Status {
            status: status.as_u16(),
            message: truncate(&text),
        })
    }

    async fn submit(&self, batch: &Batch) -> std::result::Result<Vec<ItemResult>, BackendError> {
        let url = format!("{}/_bulk", self.endpoint);
        let response = self
            .request(reqwest::Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, NDJSON)
            .body(self.bulk_body(batch))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: truncate(&text),
            });
        }

        let bytes = response.bytes().await.map_err(classify)?;
        let parsed: BulkResponse = serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        if parsed.errors {
            tracing::debug!(
                sequence = batch.sequence(),
                "Bulk response reports item errors"
            );
        }

        Ok(parsed.into_results())
    }
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    items: Vec<HashMap<String, BulkResponseItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseItem {
    #[serde(rename = "_id")]
    id: Option<String>,
    status: u16,
    result: Option<String>,
    error: Option<Value>,
}

impl BulkResponse {
    fn into_results(self) -> Vec<ItemResult> {
        self.items
            .into_iter()
            .flat_map(|entry| entry.into_values())
            .filter_map(|item| {
                let id = DocumentId::new(item.id.as_deref().unwrap_or_default()).ok()?;
                Some(ItemResult::new(id, item.status()))
            })
            .collect()
    }
}

impl BulkResponseItem {
    fn status(&self) -> ItemStatus {
        if !(200..300).contains(&self.status) {
            return ItemStatus::Failed {
                status: self.status,
                reason: self.error_reason(),
            };
        }

        match self.result.as_deref() {
            Some("created") => ItemStatus::Created,
            Some("updated") => ItemStatus::Updated,
            Some("noop") => ItemStatus::Noop,
            _ if self.status == 201 => ItemStatus::Created,
            _ => ItemStatus::Updated,
        }
    }

    fn error_reason(&self) -> String {
        match &self.error {
            Some(Value::Object(error)) => {
                let kind = error.get("type").and_then(Value::as_str).unwrap_or("error");
                match error.get("reason").and_then(Value::as_str) {
                    Some(reason) => format!("{kind}: {reason}"),
                    None => kind.to_string(),
                }
            }
            Some(other) => other.to_string(),
            None => format!("status {}", self.status),
        }
    }
}

fn classify(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::ConnectionFailed(err.to_string())
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY).collect()
}
