//! Relay Application Service
//!
//! Orchestrates the three relay operations through the gateway and store ports.
//! Contains NO infrastructure logic - validation and orchestration only.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;

use mpesa_types::{
    AppError, CallbackAck, CallbackOutcome, Msisdn, PAYBILL_TRANSACTION_TYPE, PaymentGateway,
    PaymentRecord, PaymentStatusResponse, PaymentStore, StkPushDescriptor, StkTimestamp,
    ValidationError, derive_password,
};

pub const DEFAULT_ACCOUNT_REFERENCE: &str = "Youth Registration";
pub const DEFAULT_TRANSACTION_DESC: &str = "Membership Payment";
pub const DEFAULT_STATUS_PAGE_SIZE: usize = 50;

/// Merchant settings injected into the relay at construction.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Pay-bill business shortcode
    pub shortcode: String,
    /// Lipa Na M-Pesa passkey
    pub passkey: String,
    /// Public URL the gateway posts results to
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
    /// How many recent records a status check scans
    pub status_page_size: usize,
}

impl RelayConfig {
    pub fn new(
        shortcode: impl Into<String>,
        passkey: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            shortcode: shortcode.into(),
            passkey: passkey.into(),
            callback_url: callback_url.into(),
            account_reference: DEFAULT_ACCOUNT_REFERENCE.into(),
            transaction_desc: DEFAULT_TRANSACTION_DESC.into(),
            status_page_size: DEFAULT_STATUS_PAGE_SIZE,
        }
    }
}

/// Application service for the relay.
///
/// Generic over the gateway and store ports so adapters are injected at
/// compile time. Holds no mutable state: every call is independent.
pub struct RelayService<G: PaymentGateway, S: PaymentStore> {
    config: RelayConfig,
    gateway: G,
    store: Arc<S>,
}

impl<G: PaymentGateway, S: PaymentStore> RelayService<G, S> {
    /// Creates a new relay service.
    pub fn new(config: RelayConfig, gateway: G, store: S) -> Self {
        Self {
            config,
            gateway,
            store: Arc::new(store),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Initiation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validates the request and asks the gateway to prompt the customer.
    ///
    /// Returns the gateway's acknowledgment body unmodified.
    #[tracing::instrument(skip(self))]
    pub async fn initiate_payment(
        &self,
        phone: Option<&str>,
        amount: Option<i64>,
    ) -> Result<serde_json::Value, AppError> {
        let phone = Msisdn::parse(phone.unwrap_or_default())?;
        let amount = match amount {
            Some(amount) if amount >= 1 => amount,
            _ => return Err(ValidationError::NonPositiveAmount.into()),
        };

        let descriptor = self.build_descriptor(phone, amount, StkTimestamp::now());

        match self.gateway.stk_push(&descriptor).await {
            Ok(ack) => {
                tracing::info!(response = %ack, "STK push accepted by gateway");
                Ok(ack)
            }
            Err(e) => {
                tracing::error!(error = %e, "STK push failed");
                Err(e.into())
            }
        }
    }

    /// Builds the gateway descriptor for a validated request.
    pub fn build_descriptor(
        &self,
        phone: Msisdn,
        amount: i64,
        timestamp: StkTimestamp,
    ) -> StkPushDescriptor {
        StkPushDescriptor {
            shortcode: self.config.shortcode.clone(),
            password: derive_password(&self.config.shortcode, &self.config.passkey, &timestamp),
            timestamp,
            transaction_type: PAYBILL_TRANSACTION_TYPE,
            amount,
            phone,
            callback_url: self.config.callback_url.clone(),
            account_reference: self.config.account_reference.clone(),
            transaction_desc: self.config.transaction_desc.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Callback ingestion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Acknowledges a gateway callback and persists it in the background.
    ///
    /// The acknowledgment is built before the store is touched; the write runs
    /// on a detached task whose outcome only shows up in the logs.
    pub fn ingest_callback(&self, raw_body: String) -> CallbackAck {
        let received_at = Utc::now();
        let store = Arc::clone(&self.store);

        tokio::spawn(
            async move {
                let outcome = match CallbackOutcome::parse(&raw_body) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(error = %e, body = %raw_body, "Discarding unreadable callback");
                        return;
                    }
                };

                let record = PaymentRecord::from_callback(outcome, raw_body, received_at);
                match store.insert(&record).await {
                    Ok(()) => tracing::info!(
                        phone = %record.phone,
                        amount = record.amount,
                        success = record.success,
                        "Stored payment callback"
                    ),
                    Err(e) => tracing::error!(
                        error = %e,
                        phone = %record.phone,
                        "Failed to store payment callback"
                    ),
                }
            }
            .instrument(tracing::info_span!("persist_callback")),
        );

        CallbackAck::accepted()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────────

    /// Reports whether `phone` has a successful payment among recent records.
    ///
    /// Degrades to `paid: false` on a missing phone or any store failure.
    #[tracing::instrument(skip(self))]
    pub async fn check_status(&self, phone: Option<&str>) -> PaymentStatusResponse {
        let phone = match phone {
            Some(phone) if !phone.is_empty() => phone,
            _ => return PaymentStatusResponse { paid: false },
        };

        match self.store.list_recent(self.config.status_page_size).await {
            Ok(records) => PaymentStatusResponse {
                paid: records.iter().any(|r| r.confirms_payment_from(phone)),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Status check degraded to unpaid");
                PaymentStatusResponse { paid: false }
            }
        }
    }
}
