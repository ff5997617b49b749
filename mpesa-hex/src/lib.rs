//! # M-Pesa Hex
//!
//! Application service layer and HTTP adapter for the payment relay.
//!
//! ## Architecture
//!
//! - `service/` - Relay service (validation and orchestration)
//! - `inbound/` - HTTP adapter (Axum server, CORS)
//! - `openapi/` - Generated API description
//!
//! The service is generic over `G: PaymentGateway` and `S: PaymentStore`,
//! allowing different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::{RelayConfig, RelayService};
