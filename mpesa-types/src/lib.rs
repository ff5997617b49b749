//! # M-Pesa Types
//!
//! Domain types and port traits for the M-Pesa payment relay.
//! This crate has no IO dependencies: only data structures, validation
//! rules, and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - MSISDN validation, STK push descriptor and password,
//!   callback parsing, payment records
//! - `ports/` - Traits the outbound adapters implement
//! - `dto/` - Request and response bodies of the HTTP surface
//! - `error/` - Validation, upstream and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CallbackOutcome, CallbackParseError, Msisdn, PAYBILL_TRANSACTION_TYPE, PaymentRecord,
    StkPushDescriptor, StkTimestamp, derive_password,
};
pub use dto::*;
pub use error::{AppError, GatewayError, StoreError, TokenError, ValidationError};
pub use ports::{AccessToken, AccessTokenProvider, PaymentGateway, PaymentStore};
