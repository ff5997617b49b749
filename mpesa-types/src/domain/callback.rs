//! Tolerant parser for Daraja STK callback bodies.
//!
//! Daraja posts a loosely shaped document:
//!
//! ```json
//! { "Body": { "stkCallback": {
//!     "MerchantRequestID": "29115-34620561-1",
//!     "CheckoutRequestID": "ws_CO_191220191020363925",
//!     "ResultCode": 0,
//!     "ResultDesc": "The service request is processed successfully.",
//!     "CallbackMetadata": { "Item": [
//!         { "Name": "Amount", "Value": 1.00 },
//!         { "Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV" },
//!         { "Name": "PhoneNumber", "Value": 254708374149 }
//!     ] }
//! } } }
//! ```
//!
//! Failed payments carry no `CallbackMetadata` at all, and item values change
//! type between sandbox and production, so every field is optional here and
//! absence maps to a fixed default.

use serde_json::Value;

/// Error raised when a callback body cannot be read at all.
#[derive(Debug, thiserror::Error)]
pub enum CallbackParseError {
    #[error("callback body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("callback body is not a JSON object")]
    NotAnObject,
}

/// Typed view of one STK callback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallbackOutcome {
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    /// `None` when the callback carried no usable `ResultCode`.
    pub result_code: Option<i64>,
    pub result_desc: Option<String>,
    /// `PhoneNumber` item, or `""` when absent.
    pub phone: String,
    /// `Amount` item in whole units, or `0` when absent.
    pub amount: i64,
    pub receipt_number: Option<String>,
}

impl CallbackOutcome {
    /// Parses a raw callback body.
    pub fn parse(raw: &str) -> Result<Self, CallbackParseError> {
        let body: Value = serde_json::from_str(raw)?;
        if !body.is_object() {
            return Err(CallbackParseError::NotAnObject);
        }

        let Some(stk) = body.pointer("/Body/stkCallback") else {
            return Ok(Self::default());
        };

        let items = stk
            .pointer("/CallbackMetadata/Item")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(Self {
            merchant_request_id: stk.get("MerchantRequestID").and_then(text),
            checkout_request_id: stk.get("CheckoutRequestID").and_then(text),
            result_code: stk.get("ResultCode").and_then(exact_integer),
            result_desc: stk.get("ResultDesc").and_then(text),
            phone: item(items, "PhoneNumber").and_then(text).unwrap_or_default(),
            amount: item(items, "Amount").and_then(integer).unwrap_or(0),
            receipt_number: item(items, "MpesaReceiptNumber").and_then(text),
        })
    }

    /// A payment succeeded iff the gateway reported result code zero.
    pub fn is_success(&self) -> bool {
        self.result_code == Some(0)
    }
}

/// First item whose `Name` equals `name`; order in the list is not significant.
fn item<'a>(items: &'a [Value], name: &str) -> Option<&'a Value> {
    items
        .iter()
        .find(|i| i.get("Name").and_then(Value::as_str) == Some(name))
        .and_then(|i| i.get("Value"))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => u.to_string(),
            (None, Some(i)) => i.to_string(),
            _ => n.to_string(),
        }),
        _ => None,
    }
}

/// Whole numbers only; a fractional code is unusable, never rounded to zero.
fn exact_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Amounts arrive as `1`, `1.00` or `"1"`; the fraction is dropped.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}
