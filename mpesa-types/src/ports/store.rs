//! Payment store port.
//!
//! Adapters (Firestore, in-memory) implement this trait.

use crate::domain::PaymentRecord;
use crate::error::StoreError;

/// Append-only store of payment records.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync + 'static {
    /// Appends one record. Never deduplicates.
    async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError>;

    /// Returns at most `limit` records, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<PaymentRecord>, StoreError>;
}
