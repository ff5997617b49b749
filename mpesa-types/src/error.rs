//! Error types for the payment relay.

/// Request validation failures (user-correctable).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid phone format")]
    InvalidPhone,

    #[error("amount must be positive")]
    NonPositiveAmount,
}

/// Bearer-token acquisition failures.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("token request failed: {0}")]
    Transport(String),

    #[error("token endpoint returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("token response missing access_token")]
    MissingToken,
}

/// Payment gateway failures during STK push initiation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway authentication failed: {0}")]
    Auth(#[from] TokenError),

    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("gateway returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Document store failures. Never surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store authentication failed: {0}")]
    Auth(#[from] TokenError),

    #[error("store request failed: {0}")]
    Transport(String),

    #[error("store rejected request with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("store returned an unreadable response: {0}")]
    Decode(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(_: GatewayError) -> Self {
        // Upstream details stay in the logs.
        AppError::Internal("payment gateway request failed".into())
    }
}
