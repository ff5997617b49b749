//! Payment record domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::callback::CallbackOutcome;

/// The outcome of one gateway callback, as persisted.
///
/// Records are append-only. Duplicate deliveries of the same callback are
/// stored as separate records; readers must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub phone: String,
    pub amount: i64,
    pub success: bool,
    pub result_code: Option<i64>,
    pub result_desc: Option<String>,
    pub checkout_request_id: Option<String>,
    pub merchant_request_id: Option<String>,
    pub receipt_number: Option<String>,
    /// Verbatim callback body, kept for audit.
    pub raw_payload: String,
    /// When the callback was received, not when the customer paid.
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Builds a record from a parsed callback and the body it came from.
    pub fn from_callback(
        outcome: CallbackOutcome,
        raw_payload: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            success: outcome.is_success(),
            phone: outcome.phone,
            amount: outcome.amount,
            result_code: outcome.result_code,
            result_desc: outcome.result_desc,
            checkout_request_id: outcome.checkout_request_id,
            merchant_request_id: outcome.merchant_request_id,
            receipt_number: outcome.receipt_number,
            raw_payload: raw_payload.into(),
            created_at: received_at,
        }
    }

    /// Whether this record proves a successful payment from `phone`.
    pub fn confirms_payment_from(&self, phone: &str) -> bool {
        self.success && self.phone == phone
    }
}
