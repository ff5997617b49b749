//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use mpesa_types::dto::{CallbackAck, CheckPaymentQuery, PaymentStatusResponse, StkPushRequest};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Prompt a customer's phone for payment
#[utoipa::path(
    post,
    path = "/stkpush",
    tag = "payments",
    request_body = StkPushRequest,
    responses(
        (status = 200, description = "Gateway acknowledgment, passed through unmodified", body = inline(serde_json::Value),
            example = json!({
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResponseCode": "0",
                "ResponseDescription": "Success. Request accepted for processing",
                "CustomerMessage": "Success. Request accepted for processing"
            })),
        (status = 400, description = "Invalid phone or amount", body = inline(serde_json::Value),
            example = json!({"error": "invalid phone format", "code": 400})),
        (status = 500, description = "Payment gateway unavailable", body = inline(serde_json::Value),
            example = json!({"error": "payment gateway request failed", "code": 500}))
    )
)]
async fn stk_push() {}

/// Receive the gateway's result callback
#[utoipa::path(
    post,
    path = "/callback",
    tag = "payments",
    request_body(content = inline(serde_json::Value), description = "Daraja STK callback document"),
    responses(
        (status = 200, description = "Always acknowledged; persistence happens afterwards", body = CallbackAck)
    )
)]
async fn callback() {}

/// Check whether a phone number has a successful payment
#[utoipa::path(
    get,
    path = "/check-payment",
    tag = "payments",
    params(
        ("phone" = Option<String>, Query, description = "Phone number in 2547XXXXXXXX format")
    ),
    responses(
        (status = 200, description = "Payment status; unpaid when unknown or on store errors", body = PaymentStatusResponse)
    )
)]
async fn check_payment() {}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "M-Pesa Payment Relay",
        description = "Initiates STK push payments, ingests gateway callbacks, and answers payment status polls."
    ),
    paths(health, stk_push, callback, check_payment),
    components(schemas(StkPushRequest, CallbackAck, CheckPaymentQuery, PaymentStatusResponse)),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "STK push, callback, and status operations"),
    )
)]
pub struct ApiDoc;
