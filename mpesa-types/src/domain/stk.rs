//! STK push request descriptor and Lipa Na M-Pesa password derivation.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fmt;

use super::msisdn::Msisdn;

/// Daraja transaction type for pay-bill collections.
pub const PAYBILL_TRANSACTION_TYPE: &str = "CustomerPayBillOnline";

/// Fourteen-character `YYYYMMDDHHMMSS` timestamp used by Daraja.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StkTimestamp(String);

impl StkTimestamp {
    /// The current wall-clock second in the server's local time zone.
    pub fn now() -> Self {
        Self::from_local(&Local::now())
    }

    pub fn from_local<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self::from_naive(&at.naive_local())
    }

    pub fn from_naive(at: &NaiveDateTime) -> Self {
        Self(at.format("%Y%m%d%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StkTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the STK push password: `base64(shortcode ++ passkey ++ timestamp)`.
///
/// Daraja recomputes this on its side, so the concatenation order and the
/// standard (padded) alphabet must not change.
pub fn derive_password(shortcode: &str, passkey: &str, timestamp: &StkTimestamp) -> String {
    let mut raw = String::with_capacity(shortcode.len() + passkey.len() + 14);
    raw.push_str(shortcode);
    raw.push_str(passkey);
    raw.push_str(timestamp.as_str());
    STANDARD.encode(raw.as_bytes())
}

/// Everything the gateway needs to prompt a customer's phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StkPushDescriptor {
    pub shortcode: String,
    pub password: String,
    pub timestamp: StkTimestamp,
    pub transaction_type: &'static str,
    pub amount: i64,
    /// The paying customer; sent as both `PartyA` and `PhoneNumber`.
    pub phone: Msisdn,
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_timestamp_is_zero_padded() {
        let ts = StkTimestamp::from_naive(&at(9, 5, 3));
        assert_eq!(ts.as_str(), "20240307090503");
        assert_eq!(ts.as_str().len(), 14);
    }

    #[test]
    fn test_password_matches_daraja_sandbox_example() {
        let ts = StkTimestamp::from_naive(&at(9, 5, 3));
        let password = derive_password("174379", "passkey", &ts);

        let decoded = STANDARD.decode(&password).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "174379passkey20240307090503"
        );
    }

    #[test]
    fn test_password_is_deterministic_within_a_second() {
        let ts = StkTimestamp::from_naive(&at(12, 0, 0));
        assert_eq!(
            derive_password("600000", "secret", &ts),
            derive_password("600000", "secret", &ts.clone())
        );
    }

    #[test]
    fn test_password_changes_across_seconds() {
        let a = StkTimestamp::from_naive(&at(12, 0, 0));
        let b = StkTimestamp::from_naive(&at(12, 0, 1));
        assert_ne!(
            derive_password("600000", "secret", &a),
            derive_password("600000", "secret", &b)
        );
    }

    #[test]
    fn test_known_encoding() {
        let ts = StkTimestamp::from_naive(&at(0, 0, 0));
        // base64("1ab20240307000000")
        assert_eq!(
            derive_password("1", "ab", &ts),
            "MWFiMjAyNDAzMDcwMDAwMDA="
        );
    }
}
