//! In-process payment store for local runs and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use mpesa_types::{PaymentRecord, PaymentStore, StoreError};

/// Keeps records in insertion order; lists newest first.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    records: RwLock<Vec<PaymentRecord>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<PaymentRecord>, StoreError> {
        let records = self.records.read().await;
        let mut recent: Vec<PaymentRecord> = records.iter().rev().cloned().collect();
        // Stable, so same-instant records keep newest-inserted first.
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(phone: &str, success: bool, minute: i64) -> PaymentRecord {
        PaymentRecord {
            phone: phone.into(),
            amount: 100,
            success,
            result_code: Some(if success { 0 } else { 1032 }),
            result_desc: None,
            checkout_request_id: None,
            merchant_request_id: None,
            receipt_number: None,
            raw_payload: "{}".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap()
                + Duration::minutes(minute),
        }
    }

    #[tokio::test]
    async fn test_lists_newest_first() {
        let store = InMemoryPaymentStore::new();
        store.insert(&record("254700000001", true, 0)).await.unwrap();
        store.insert(&record("254700000002", false, 2)).await.unwrap();
        store.insert(&record("254700000003", true, 1)).await.unwrap();

        let phones: Vec<String> = store
            .list_recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.phone)
            .collect();
        assert_eq!(phones, ["254700000002", "254700000003", "254700000001"]);
    }

    #[tokio::test]
    async fn test_limit_and_duplicates() {
        let store = InMemoryPaymentStore::new();
        let dup = record("254700000001", true, 0);
        store.insert(&dup).await.unwrap();
        store.insert(&dup).await.unwrap();
        store.insert(&record("254700000002", true, 5)).await.unwrap();

        assert_eq!(store.len().await, 3);
        let recent = store.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].phone, "254700000002");
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemoryPaymentStore::new();
        assert!(store.is_empty().await);
        assert!(store.list_recent(50).await.unwrap().is_empty());
    }
}
