//! Credential provider port.

use crate::error::TokenError;

/// A short-lived bearer token for an upstream API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Port trait for bearer-token acquisition.
///
/// Each implementation is bound to one set of credentials and scopes at
/// construction. Callers ask for a token right before every upstream call;
/// implementations are not required to cache.
#[async_trait::async_trait]
pub trait AccessTokenProvider: Send + Sync + 'static {
    async fn access_token(&self) -> Result<AccessToken, TokenError>;
}
