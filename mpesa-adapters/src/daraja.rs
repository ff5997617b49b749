//! Safaricom Daraja adapters: OAuth client-credentials and STK push.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mpesa_types::{
    AccessToken, AccessTokenProvider, GatewayError, PaymentGateway, StkPushDescriptor, TokenError,
};

/// Daraja sandbox host.
pub const DEFAULT_DARAJA_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

const OAUTH_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";

// ─────────────────────────────────────────────────────────────────────────────
// OAuth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OAuthResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Client-credentials token provider for Daraja.
pub struct DarajaOAuth {
    http: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl DarajaOAuth {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for DarajaOAuth {
    #[tracing::instrument(skip(self))]
    async fn access_token(&self) -> Result<AccessToken, TokenError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, OAUTH_PATH))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
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

        let body: OAuthResponse = resp
            .json()
            .await
            .map_err(|e| TokenError::Transport(e.to_string()))?;

        body.access_token
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
            .ok_or(TokenError::MissingToken)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// STK push
// ─────────────────────────────────────────────────────────────────────────────

/// Daraja's wire format for `processrequest`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StkPushBody<'a> {
    business_short_code: &'a str,
    password: &'a str,
    timestamp: &'a str,
    transaction_type: &'a str,
    amount: i64,
    party_a: &'a str,
    party_b: &'a str,
    phone_number: &'a str,
    #[serde(rename = "CallBackURL")]
    callback_url: &'a str,
    account_reference: &'a str,
    transaction_desc: &'a str,
}

impl<'a> From<&'a StkPushDescriptor> for StkPushBody<'a> {
    fn from(d: &'a StkPushDescriptor) -> Self {
        Self {
            business_short_code: &d.shortcode,
            password: &d.password,
            timestamp: d.timestamp.as_str(),
            transaction_type: d.transaction_type,
            amount: d.amount,
            party_a: d.phone.as_ref(),
            party_b: &d.shortcode,
            phone_number: d.phone.as_ref(),
            callback_url: &d.callback_url,
            account_reference: &d.account_reference,
            transaction_desc: &d.transaction_desc,
        }
    }
}

/// STK push gateway backed by Daraja.
pub struct DarajaGateway {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl DarajaGateway {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl PaymentGateway for DarajaGateway {
    #[tracing::instrument(skip(self, descriptor), fields(amount = descriptor.amount))]
    async fn stk_push(
        &self,
        descriptor: &StkPushDescriptor,
    ) -> Result<serde_json::Value, GatewayError> {
        let token = self.tokens.access_token().await?;

        let resp = self
            .http
            .post(format!("{}{}", self.base_url, STK_PUSH_PATH))
            .bearer_auth(token.secret())
            .json(&StkPushBody::from(descriptor))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        // Daraja reports rejections (bad shortcode, invalid number) as JSON
        // with a 4xx status; those bodies go back to the caller unchanged.
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Gateway answered with non-success status");
        }

        serde_json::from_str(&text).map_err(|e| {
            GatewayError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpesa_types::{Msisdn, PAYBILL_TRANSACTION_TYPE, StkTimestamp};
    use serde_json::json;

    #[test]
    fn test_wire_body_uses_daraja_field_names() {
        let descriptor = StkPushDescriptor {
            shortcode: "174379".into(),
            password: "cGFzcw==".into(),
            timestamp: StkTimestamp::from_naive(
                &chrono::NaiveDate::from_ymd_opt(2024, 3, 7)
                    .unwrap()
                    .and_hms_opt(9, 5, 3)
                    .unwrap(),
            ),
            transaction_type: PAYBILL_TRANSACTION_TYPE,
            amount: 100,
            phone: Msisdn::parse("254712345678").unwrap(),
            callback_url: "https://relay.example/callback".into(),
            account_reference: "Youth Registration".into(),
            transaction_desc: "Membership Payment".into(),
        };

        let body = serde_json::to_value(StkPushBody::from(&descriptor)).unwrap();
        assert_eq!(
            body,
            json!({
                "BusinessShortCode": "174379",
                "Password": "cGFzcw==",
                "Timestamp": "20240307090503",
                "TransactionType": "CustomerPayBillOnline",
                "Amount": 100,
                "PartyA": "254712345678",
                "PartyB": "174379",
                "PhoneNumber": "254712345678",
                "CallBackURL": "https://relay.example/callback",
                "AccountReference": "Youth Registration",
                "TransactionDesc": "Membership Payment"
            })
        );
    }
}
