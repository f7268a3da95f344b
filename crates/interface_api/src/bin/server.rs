//! Marketplace Treasury - API Server Binary
//!
//! Starts the HTTP API for the settlement and invoice lifecycle engine.
//!
//! # Usage
//!
//! ```bash
//! # Run with configuration from the environment / .env
//! cargo run --bin treasury-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error
//! * `API_COMMISSION_RATE_PERCENT` - Marketplace commission rate
//! * `API_RESCHEDULE_POLICY` - `in_place` or `new_record`
//! * `GATEWAY_AUTH_URL` - E-invoicing authority token endpoint (required)
//! * `GATEWAY_SALES_URL` - Document submission endpoint (required)
//! * `GATEWAY_CLIENT_ID` / `GATEWAY_USERNAME` / `GATEWAY_PASSWORD` -
//!   Service account for the credential exchange (required)
//! * `GATEWAY_BRANCH_ID` - Optional branch sent on submissions
//! * `GATEWAY_TIMEOUT_SECS` - Per-request timeout (default: 30)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_gateway::{GatewayClient, GatewayConfig};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Marketplace Treasury API Server"
    );

    // Fail fast on incomplete gateway configuration
    let gateway_config = GatewayConfig::from_env().context("gateway configuration")?;
    let gateway = Arc::new(GatewayClient::new(gateway_config)?);

    let state = AppState::new(gateway, config.clone());
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables, falling back to
/// defaults for anything unset.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| ApiConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080),
        log_level: std::env::var("API_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string()),
        commission_rate_percent: std::env::var("API_COMMISSION_RATE_PERCENT")
            .ok()
            .and_then(|r| r.parse().ok())
            .unwrap_or_else(|| ApiConfig::default().commission_rate_percent),
        reschedule_policy: std::env::var("API_RESCHEDULE_POLICY")
            .unwrap_or_else(|_| "new_record".to_string()),
    })
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), enabling graceful
/// shutdown so in-flight transitions complete before the process exits.
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
