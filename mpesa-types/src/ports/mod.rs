//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod gateway;
mod store;
mod token;

pub use gateway::PaymentGateway;
pub use store::PaymentStore;
pub use token::{AccessToken, AccessTokenProvider};
