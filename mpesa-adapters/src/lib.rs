//! # M-Pesa Adapters
//!
//! Concrete outbound adapters for the payment relay:
//! the Daraja gateway and its OAuth client, Google service-account auth,
//! and the payment stores (Firestore, in-memory).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mpesa_types::{PaymentRecord, PaymentStore, StoreError};

pub mod daraja;
pub mod firestore;
pub mod google_auth;
pub mod memory;

mod types;


pub use daraja::{DEFAULT_DARAJA_BASE_URL, DarajaGateway, DarajaOAuth};
pub use firestore::{DEFAULT_COLLECTION, DEFAULT_FIRESTORE_BASE_URL, FirestoreStore};
pub use google_auth::{DATASTORE_SCOPE, ServiceAccountAuth, ServiceAccountKey};
pub use memory::InMemoryPaymentStore;

/// Builds the shared outbound HTTP client.
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// Daraja credentials and host.
#[derive(Clone)]
pub struct DarajaSettings {
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl std::fmt::Debug for DarajaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DarajaSettings")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Wires the Daraja OAuth provider into an STK push gateway.
pub fn build_gateway(settings: &DarajaSettings, http: reqwest::Client) -> DarajaGateway {
    let oauth = DarajaOAuth::new(
        http.clone(),
        &settings.base_url,
        &settings.consumer_key,
        &settings.consumer_secret,
    );
    DarajaGateway::new(http, &settings.base_url, Arc::new(oauth))
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// Which payment store backs the relay.
#[derive(Clone)]
pub enum StoreSettings {
    Firestore {
        /// Base64-encoded service-account key file.
        service_account: String,
        base_url: String,
        collection: String,
    },
    Memory,
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Firestore {
                base_url,
                collection,
                ..
            } => f
                .debug_struct("Firestore")
                .field("base_url", base_url)
                .field("collection", collection)
                .finish_non_exhaustive(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Runtime-selected payment store.
pub enum Store {
    Firestore(FirestoreStore),
    Memory(InMemoryPaymentStore),
}

/// Build a payment store from settings.
///
/// For Firestore this decodes the service-account key and loads its private
/// key up front, so bad credentials fail at startup rather than on the first
/// callback.
pub fn build_store(settings: &StoreSettings, http: reqwest::Client) -> anyhow::Result<Store> {
    match settings {
        StoreSettings::Memory => Ok(Store::Memory(InMemoryPaymentStore::new())),
        StoreSettings::Firestore {
            service_account,
            base_url,
            collection,
        } => {
            let key = ServiceAccountKey::from_base64(service_account)?;
            let auth = ServiceAccountAuth::new(http.clone(), key, DATASTORE_SCOPE)?;
            let project_id = auth.project_id().to_string();
            tracing::info!(project = %project_id, collection = %collection, "Using Firestore payment store");
            Ok(Store::Firestore(FirestoreStore::new(
                http,
                base_url,
                &project_id,
                collection,
                Arc::new(auth),
            )))
        }
    }
}

#[async_trait]
impl PaymentStore for Store {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        match self {
            Store::Firestore(inner) => inner.insert(record).await,
            Store::Memory(inner) => inner.insert(record).await,
        }
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<PaymentRecord>, StoreError> {
        match self {
            Store::Firestore(inner) => inner.list_recent(limit).await,
            Store::Memory(inner) => inner.list_recent(limit).await,
        }
    }
}
