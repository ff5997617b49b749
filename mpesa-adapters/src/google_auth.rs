//! Google service-account token provider (OAuth 2.0 JWT bearer grant).

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use mpesa_types::{AccessToken, AccessTokenProvider, TokenError};

/// OAuth scope granting Firestore read/write.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account key file the relay uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Decodes a key file that was base64-encoded into a single env var.
    pub fn from_base64(encoded: &str) -> Result<Self, TokenError> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| TokenError::InvalidCredentials(format!("not base64: {e}")))?;
        serde_json::from_slice(&raw)
            .map_err(|e| TokenError::InvalidCredentials(format!("not a service-account key: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchanges a signed service-account assertion for an access token.
pub struct ServiceAccountAuth {
    http: reqwest::Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    scope: String,
}

impl ServiceAccountAuth {
    /// Fails fast when the private key is not a valid RSA PEM.
    pub fn new(
        http: reqwest::Client,
        key: ServiceAccountKey,
        scope: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| TokenError::InvalidCredentials(format!("private key: {e}")))?;
        Ok(Self {
            http,
            key,
            signing_key,
            scope: scope.into(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    fn signed_assertion(&self, issued_at: i64) -> Result<String, TokenError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| TokenError::InvalidCredentials(format!("signing failed: {e}")))
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    #[tracing::instrument(skip(self), fields(client = %self.key.client_email))]
    async fn access_token(&self) -> Result<AccessToken, TokenError> {
        let assertion = self.signed_assertion(Utc::now().timestamp())?;

        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| TokenError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TokenError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| TokenError::Transport(e.to_string()))?;

        body.access_token
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
            .ok_or(TokenError::MissingToken)
    }
}
