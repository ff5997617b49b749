//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::{Context, anyhow};
use axum::http::HeaderValue;

use mpesa_adapters::{
    DEFAULT_COLLECTION, DEFAULT_DARAJA_BASE_URL, DEFAULT_FIRESTORE_BASE_URL, DarajaSettings,
    StoreSettings,
};
use mpesa_hex::RelayConfig;
use mpesa_hex::inbound::{DEFAULT_ALLOWED_ORIGIN, parse_origins};

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub relay: RelayConfig,
    pub daraja: DarajaSettings,
    pub store: StoreSettings,
    pub allowed_origins: Vec<HeaderValue>,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| anyhow!("{name} environment variable is required"))
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid PORT: {raw}"))?,
            None => 3000,
        };

        let mut relay = RelayConfig::new(
            require("DARAJA_SHORTCODE")?,
            require("DARAJA_PASSKEY")?,
            require("CALLBACK_URL")?,
        );
        if let Some(reference) = get("ACCOUNT_REFERENCE") {
            relay.account_reference = reference;
        }
        if let Some(desc) = get("TRANSACTION_DESC") {
            relay.transaction_desc = desc;
        }
        if let Some(raw) = get("STATUS_PAGE_SIZE") {
            relay.status_page_size = raw
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .ok_or_else(|| anyhow!("invalid STATUS_PAGE_SIZE: {raw}"))?;
        }

        let daraja = DarajaSettings {
            base_url: get("DARAJA_BASE_URL").unwrap_or_else(|| DEFAULT_DARAJA_BASE_URL.into()),
            consumer_key: require("DARAJA_CONSUMER_KEY")?,
            consumer_secret: require("DARAJA_CONSUMER_SECRET")?,
        };

        let store = match get("PAYMENT_STORE").as_deref().unwrap_or("firestore") {
            "firestore" => StoreSettings::Firestore {
                service_account: require("FIREBASE_SERVICE_ACCOUNT")?,
                base_url: get("FIRESTORE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.into()),
                collection: get("FIRESTORE_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.into()),
            },
            "memory" => StoreSettings::Memory,
            other => anyhow::bail!("unknown PAYMENT_STORE: {other} (expected firestore or memory)"),
        };

        let allowed_origins = parse_origins(
            &get("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.into()),
        )
        .context("invalid ALLOWED_ORIGINS")?;

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid HTTP_TIMEOUT_SECS: {raw}"))?,
            ),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            port,
            relay,
            daraja,
            store,
            allowed_origins,
            http_timeout,
        })
    }
}
