//! HTTP request handlers.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use mpesa_types::{
    AppError, CallbackAck, CheckPaymentQuery, PaymentGateway, PaymentStatusResponse, PaymentStore,
    StkPushRequest,
};

use crate::RelayService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<G: PaymentGateway, S: PaymentStore> {
    pub service: RelayService<G, S>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serves the generated OpenAPI document.
pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Prompt a customer's phone for payment.
#[tracing::instrument(skip_all)]
pub async fn stk_push<G: PaymentGateway, S: PaymentStore>(
    State(state): State<Arc<AppState<G, S>>>,
    payload: Result<Json<StkPushRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let ack = state
        .service
        .initiate_payment(req.phone.as_deref(), req.amount)
        .await?;
    Ok(Json(ack))
}

/// Receive a gateway result callback.
///
/// The body is read as raw bytes so that nothing about its shape can turn
/// into a non-200 answer; the gateway only ever sees the fixed ack.
#[tracing::instrument(skip_all, fields(bytes = body.len()))]
pub async fn callback<G: PaymentGateway, S: PaymentStore>(
    State(state): State<Arc<AppState<G, S>>>,
    body: Bytes,
) -> Json<CallbackAck> {
    tracing::info!("📥 M-Pesa callback received");
    Json(state.service.ingest_callback(body_text(&body)))
}

/// Decodes the callback body. Invalid UTF-8 is replaced and logged, since
/// the stored payload is then no longer byte-for-byte what was received.
fn body_text(body: &[u8]) -> String {
    match String::from_utf8_lossy(body) {
        Cow::Borrowed(text) => text.to_owned(),
        Cow::Owned(text) => {
            tracing::warn!(bytes = body.len(), "Callback body is not valid UTF-8");
            text
        }
    }
}

/// Poll whether a phone number has paid.
#[tracing::instrument(skip_all)]
pub async fn check_payment<G: PaymentGateway, S: PaymentStore>(
    State(state): State<Arc<AppState<G, S>>>,
    query: Result<Query<CheckPaymentQuery>, QueryRejection>,
) -> Json<PaymentStatusResponse> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    Json(state.service.check_status(query.phone.as_deref()).await)
}
