//! Firestore REST store adapter.

use std::sync::Arc;

use async_trait::async_trait;

use mpesa_types::{AccessTokenProvider, PaymentRecord, PaymentStore, StoreError};

use crate::types::{CREATED_AT, ListDocumentsResponse, NewDocument};

/// Public Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Collection holding one document per received callback.
pub const DEFAULT_COLLECTION: &str = "mpesa_payments";

// ─────────────────────────────────────────────────────────────────────────────
// Firestore Store
// ─────────────────────────────────────────────────────────────────────────────

/// Append-only payment store backed by a Firestore collection.
pub struct FirestoreStore {
    http: reqwest::Client,
    collection_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl FirestoreStore {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        project_id: &str,
        collection: &str,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        let collection_url = format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            base_url.trim_end_matches('/'),
            project_id,
            collection
        );
        Self {
            http,
            collection_url,
            tokens,
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl PaymentStore for FirestoreStore {
    #[tracing::instrument(skip(self, record), fields(phone = %record.phone, success = record.success))]
    async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        let token = self.tokens.access_token().await?;

        let resp = self
            .http
            .post(&self.collection_url)
            .bearer_auth(token.secret())
            .json(&NewDocument::from(record))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Self::check(resp).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> Result<Vec<PaymentRecord>, StoreError> {
        let token = self.tokens.access_token().await?;
        let page_size = limit.to_string();
        let order_by = format!("{CREATED_AT} desc");

        let resp = self
            .http
            .get(&self.collection_url)
            .bearer_auth(token.secret())
            .query(&[("pageSize", page_size.as_str()), ("orderBy", order_by.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let list: ListDocumentsResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        tracing::debug!(count = list.documents.len(), "Listed payment documents");

        Ok(list
            .documents
            .into_iter()
            .take(limit)
            .map(|doc| doc.into_record())
            .collect())
    }
}
