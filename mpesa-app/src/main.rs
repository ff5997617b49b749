//! # M-Pesa Relay Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the gateway and store adapters
//! - Create the relay service
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpesa_adapters::{build_gateway, build_store, http_client};
use mpesa_hex::{RelayService, inbound::HttpServer};

/// Builds an OTLP span exporter when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
fn init_tracer() -> anyhow::Result<Option<(sdktrace::Tracer, sdktrace::SdkTracerProvider)>> {
    if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_none() {
        return Ok(None);
    }

    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok(Some((provider.tracer("mpesa-relay"), provider)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let otel = init_tracer()?;
    let (telemetry, otel_provider) = match otel {
        Some((tracer, provider)) => (
            Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Some(provider),
        ),
        None => (None, None),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mpesa_app=debug,mpesa_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting M-Pesa relay on port {}", config.port);
    tracing::info!("Using Daraja at {}", config.daraja.base_url);
    tracing::info!("Payment store: {:?}", config.store);

    // Build adapters
    let http = http_client(config.http_timeout)?;
    let gateway = build_gateway(&config.daraja, http.clone());
    let store = build_store(&config.store, http)?;

    // Create the relay service
    let service = RelayService::new(config.relay, gateway, store);

    // Create and run the HTTP server
    let server = HttpServer::new(service).with_allowed_origins(config.allowed_origins);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
