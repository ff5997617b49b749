//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// ─────────────────────────────────────────────────────────────────────────────
// STK push
// ─────────────────────────────────────────────────────────────────────────────

/// Request to prompt a customer's phone for payment.
///
/// Both fields are optional on the wire so that a missing field is reported
/// through the same validation messages as a malformed one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StkPushRequest {
    /// Customer phone number in `2547XXXXXXXX` format
    #[schema(value_type = Option<String>, example = "254712345678")]
    #[serde(default, deserialize_with = "phone_text")]
    pub phone: Option<String>,
    /// Amount in whole shillings
    #[schema(example = 100)]
    #[serde(default)]
    pub amount: Option<i64>,
}

/// Reads `phone` as text whatever its JSON type, so a number or any other
/// shape reaches phone validation instead of failing the body decode.
fn phone_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Callback
// ─────────────────────────────────────────────────────────────────────────────

/// Acknowledgment returned to the gateway for every callback delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CallbackAck {
    #[serde(rename = "ResultCode")]
    #[schema(example = 0)]
    pub result_code: i32,
    #[serde(rename = "ResultDesc")]
    #[schema(example = "Accepted")]
    pub result_desc: String,
}

impl CallbackAck {
    pub fn accepted() -> Self {
        Self {
            result_code: 0,
            result_desc: "Accepted".into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment status
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for the payment status check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CheckPaymentQuery {
    #[schema(example = "254712345678")]
    pub phone: Option<String>,
}

/// Whether a phone number has a successful payment on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentStatusResponse {
    pub paid: bool,
}
