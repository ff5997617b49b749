//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the relay service.

mod cors;
mod handlers;
mod server;

pub use cors::{DEFAULT_ALLOWED_ORIGIN, OriginError, parse_origins};
pub use handlers::{ApiError, AppState};
pub use server::HttpServer;
