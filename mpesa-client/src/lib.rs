//! # M-Pesa Relay Client SDK
//!
//! A typed Rust client for the relay's HTTP API.

use std::time::Duration;

use mpesa_types::{CallbackAck, PaymentStatusResponse, StkPushRequest};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Relay API client.
pub struct RelayClient {
    base_url: String,
    http: Client,
}

impl RelayClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Prompts `phone` to pay `amount`. Returns the gateway's answer as-is.
    pub async fn stk_push(&self, phone: &str, amount: i64) -> Result<Value, ClientError> {
        let req = StkPushRequest {
            phone: Some(phone.to_string()),
            amount: Some(amount),
        };
        self.post("/stkpush", &req).await
    }

    /// Asks whether `phone` has a successful payment on record.
    pub async fn check_payment(&self, phone: &str) -> Result<PaymentStatusResponse, ClientError> {
        let resp = self
            .http
            .get(format!("{}/check-payment", self.base_url))
            .query(&[("phone", phone)])
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Polls [`check_payment`](Self::check_payment) until it reports paid.
    ///
    /// Returns `false` once `timeout` elapses without a confirmation.
    pub async fn wait_until_paid(
        &self,
        phone: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<bool, ClientError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.check_payment(phone).await?.paid {
                return Ok(true);
            }
            if tokio::time::Instant::now() + interval > deadline {
                return Ok(false);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Posts a callback document the way the gateway would.
    pub async fn send_callback(&self, body: &Value) -> Result<CallbackAck, ClientError> {
        self.post("/callback", body).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Builds an STK callback document shaped like the ones Daraja delivers.
///
/// A zero `result_code` produces a completed payment with metadata; anything
/// else produces a failed attempt without it.
pub fn simulated_callback(phone: &str, amount: i64, result_code: i64) -> Value {
    let now = chrono::Local::now();
    let suffix = now.format("%Y%m%d%H%M%S").to_string();

    let mut callback = json!({
        "MerchantRequestID": format!("sim-{suffix}"),
        "CheckoutRequestID": format!("ws_CO_{suffix}"),
        "ResultCode": result_code,
        "ResultDesc": if result_code == 0 {
            "The service request is processed successfully."
        } else {
            "Request cancelled by user"
        },
    });

    if result_code == 0 {
        let transaction_date: i64 = suffix.parse().unwrap_or_default();
        callback["CallbackMetadata"] = json!({
            "Item": [
                { "Name": "Amount", "Value": amount },
                { "Name": "MpesaReceiptNumber", "Value": format!("SIM{}", &suffix[4..]) },
                { "Name": "TransactionDate", "Value": transaction_date },
                { "Name": "PhoneNumber", "Value": phone.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(phone)) }
            ]
        });
    }

    json!({ "Body": { "stkCallback": callback } })
}
