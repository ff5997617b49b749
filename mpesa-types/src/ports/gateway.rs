//! Payment gateway port.

use crate::domain::StkPushDescriptor;
use crate::error::GatewayError;

/// Port trait for the push-payment gateway.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Submits an STK push and returns the gateway's acknowledgment body as-is.
    ///
    /// The final result arrives later, out of band, on the descriptor's
    /// callback URL.
    async fn stk_push(
        &self,
        descriptor: &StkPushDescriptor,
    ) -> Result<serde_json::Value, GatewayError>;
}
