//! Domain models for the payment relay.

pub mod callback;
pub mod msisdn;
pub mod payment;
pub mod stk;

pub use callback::{CallbackOutcome, CallbackParseError};
pub use msisdn::Msisdn;
pub use payment::PaymentRecord;
pub use stk::{PAYBILL_TRANSACTION_TYPE, StkPushDescriptor, StkTimestamp, derive_password};
