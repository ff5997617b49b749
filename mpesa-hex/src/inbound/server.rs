//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use mpesa_types::{PaymentGateway, PaymentStore};

use super::cors::{DEFAULT_ALLOWED_ORIGIN, cors_layer};
use super::handlers::{self, AppState};
use crate::RelayService;

/// HTTP Server for the relay API.
pub struct HttpServer<G: PaymentGateway, S: PaymentStore> {
    state: Arc<AppState<G, S>>,
    allowed_origins: Vec<HeaderValue>,
}

impl<G: PaymentGateway, S: PaymentStore> HttpServer<G, S> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: RelayService<G, S>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            allowed_origins: vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)],
        }
    }

    /// Replaces the browser origins allowed to call the API.
    pub fn with_allowed_origins(mut self, origins: Vec<HeaderValue>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/openapi.json", get(handlers::openapi))
            .route("/stkpush", post(handlers::stk_push::<G, S>))
            .route("/callback", post(handlers::callback::<G, S>))
            .route("/check-payment", get(handlers::check_payment::<G, S>))
            .layer(cors_layer(self.allowed_origins.clone()))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
