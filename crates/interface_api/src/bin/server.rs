//! Claim Intake - API Server Binary
//!
//! This binary starts the HTTP API server that accepts accident claim
//! submissions.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_PORT=8080 COMPUTER_VISION_KEY=... COSMOS_ENDPOINT=https://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_JSON` - Emit JSON log lines (default: false)
//! * `API_BODY_LIMIT_BYTES` - Maximum request body (default: 25 MiB)
//! * `API_LEGACY_ERROR_STATUS` - Answer every failure with 500 (default: false)
//! * `API_CAPTION_TIMEOUT_MS`, `API_STORE_TIMEOUT_MS`, `API_NOTIFY_TIMEOUT_MS` - Per-call limits
//! * `API_MAX_CONCURRENT_CAPTIONS` - Captioning calls in flight per submission (default: 4)
//! * `API_SECRET_PREFIX` - Prefix for secret variables
//!
//! # Secrets
//!
//! Resolved once at startup; `COMPUTER-VISION-KEY` is read from
//! `COMPUTER_VISION_KEY`.
//!
//! * `COMPUTER-VISION-KEY`, `COMPUTER-VISION-ENDPOINT`
//! * `COSMOS-ENDPOINT`, `COSMOS-KEY`, `COSMOS-DB-NAME`, `COSMOS-CONTAINER-NAME`
//! * `LOGIC-APP-WEBHOOK-URL` (optional; notifications are disabled without it)

use std::net::SocketAddr;

use anyhow::Context;
use core_kernel::EnvSecretProvider;
use interface_api::bootstrap::build_intake_service;
use interface_api::{config::ApiConfig, create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, resolves secrets, builds the
/// remote service adapters and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - A required secret is missing or empty
/// - An adapter rejects its endpoint or credential
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    config.validate().context("invalid API configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        legacy_error_status = config.legacy_error_status,
        "Starting claim intake API server"
    );

    let secrets = match &config.secret_prefix {
        Some(prefix) => EnvSecretProvider::with_prefix(prefix.clone()),
        None => EnvSecretProvider::new(),
    };
    let intake = build_intake_service(&config, &secrets)
        .await
        .context("failed to assemble the claim intake service")?;

    let app = create_router(AppState::new(intake, config.clone()));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads configuration from `API_*` variables, falling back to defaults.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|err| {
        eprintln!("Invalid API configuration ({err}), using defaults");
        ApiConfig::default()
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
/// * `json` - Emit one JSON object per event instead of text lines
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
