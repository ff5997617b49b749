//! Firestore REST document types and their mapping to payment records.
//!
//! Firestore wraps every field in a typed value object
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...). Writing goes
//! through [`FirestoreValue`]; reading is done leniently from raw JSON so a
//! document with unexpected or missing fields still decodes.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mpesa_types::PaymentRecord;

// ─────────────────────────────────────────────────────────────────────────────
// Field names
// ─────────────────────────────────────────────────────────────────────────────

pub const PHONE: &str = "phone";
pub const AMOUNT: &str = "amount";
pub const SUCCESS: &str = "success";
pub const RESULT_CODE: &str = "resultCode";
pub const RESULT_DESC: &str = "resultDesc";
pub const CHECKOUT_REQUEST_ID: &str = "checkoutRequestId";
pub const MERCHANT_REQUEST_ID: &str = "merchantRequestId";
pub const RECEIPT_NUMBER: &str = "receiptNumber";
pub const RAW_PAYLOAD: &str = "rawPayload";
pub const CREATED_AT: &str = "createdAt";

// ─────────────────────────────────────────────────────────────────────────────
// Write side
// ─────────────────────────────────────────────────────────────────────────────

/// One typed Firestore value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    StringValue(String),
    /// Firestore encodes 64-bit integers as decimal strings.
    IntegerValue(String),
    BooleanValue(bool),
    TimestampValue(String),
}

/// Body of a document create request.
#[derive(Debug, Serialize)]
pub struct NewDocument {
    pub fields: BTreeMap<&'static str, FirestoreValue>,
}

impl From<&PaymentRecord> for NewDocument {
    fn from(record: &PaymentRecord) -> Self {
        use FirestoreValue::*;

        let mut fields = BTreeMap::new();
        fields.insert(PHONE, StringValue(record.phone.clone()));
        fields.insert(AMOUNT, IntegerValue(record.amount.to_string()));
        fields.insert(SUCCESS, BooleanValue(record.success));
        fields.insert(RAW_PAYLOAD, StringValue(record.raw_payload.clone()));
        fields.insert(
            CREATED_AT,
            TimestampValue(record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );

        if let Some(code) = record.result_code {
            fields.insert(RESULT_CODE, IntegerValue(code.to_string()));
        }
        let optional = [
            (RESULT_DESC, &record.result_desc),
            (CHECKOUT_REQUEST_ID, &record.checkout_request_id),
            (MERCHANT_REQUEST_ID, &record.merchant_request_id),
            (RECEIPT_NUMBER, &record.receipt_number),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.insert(name, StringValue(value.clone()));
            }
        }

        Self { fields }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read side
// ─────────────────────────────────────────────────────────────────────────────

/// Response of a `documents.list` call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    /// Absent entirely when the collection is empty.
    #[serde(default)]
    pub documents: Vec<StoredDocument>,
}

/// A document as returned by Firestore.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
}

impl StoredDocument {
    fn string(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)?
            .get("stringValue")?
            .as_str()
            .map(str::to_string)
    }

    fn integer(&self, name: &str) -> Option<i64> {
        let value = self.fields.get(name)?;
        match value.get("integerValue")? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    fn boolean(&self, name: &str) -> Option<bool> {
        self.fields.get(name)?.get("booleanValue")?.as_bool()
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let raw = self.fields.get(name)?.get("timestampValue")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Decodes the document. Missing fields fall back to values that can
    /// never confirm a payment.
    pub fn into_record(self) -> PaymentRecord {
        let created_at = self
            .timestamp(CREATED_AT)
            .or(self.create_time)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        PaymentRecord {
            phone: self.string(PHONE).unwrap_or_default(),
            amount: self.integer(AMOUNT).unwrap_or(0),
            success: self.boolean(SUCCESS).unwrap_or(false),
            result_code: self.integer(RESULT_CODE),
            result_desc: self.string(RESULT_DESC),
            checkout_request_id: self.string(CHECKOUT_REQUEST_ID),
            merchant_request_id: self.string(MERCHANT_REQUEST_ID),
            receipt_number: self.string(RECEIPT_NUMBER),
            raw_payload: self.string(RAW_PAYLOAD).unwrap_or_default(),
            created_at,
        }
    }
}
