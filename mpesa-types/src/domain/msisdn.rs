//! Kenyan mobile subscriber number.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

const PREFIX: &str = "2547";
const LEN: usize = 12;

/// A Safaricom MSISDN in local international form: `2547` followed by 8 digits.
///
/// The only way to obtain one is through [`Msisdn::parse`], so holding an
/// `Msisdn` means the number already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Msisdn(String);

impl Msisdn {
    /// Validates `raw` against `^2547\d{8}$`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let valid = raw.len() == LEN
            && raw.starts_with(PREFIX)
            && raw.bytes().all(|b| b.is_ascii_digit());

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidPhone)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Msisdn {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Msisdn> for String {
    fn from(value: Msisdn) -> Self {
        value.0
    }
}

impl AsRef<str> for Msisdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
