//! HTTP API Layer
//!
//! The narrow interface the marketplace web front end consumes, built on
//! Axum. Routing, rendering and authentication live in the web shell;
//! this crate only exposes the treasury engine's operations and read
//! model.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, config::ApiConfig};
//!
//! let state = AppState::new(gateway, ApiConfig::default());
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_invoicing::{InvoiceGateway, InvoiceLifecycle, VoucherLedger};
use domain_settlement::{CashInStore, CashOutStore, SettlementService};
use infra_store::{InMemoryCashInStore, InMemoryCashOutStore, InMemoryVoucherLedger};

use crate::config::ApiConfig;
use crate::handlers::{health, invoices, kpis, settlement};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<InvoiceLifecycle>,
    pub settlement: Arc<SettlementService>,
    pub ledger: Arc<dyn VoucherLedger>,
    pub cash_in: Arc<dyn CashInStore>,
    pub cash_out: Arc<dyn CashOutStore>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the engine together: in-memory stores, the injected gateway,
    /// and the two services on top of them
    pub fn new(gateway: Arc<dyn InvoiceGateway>, config: ApiConfig) -> Self {
        let ledger = Arc::new(InMemoryVoucherLedger::new());
        let cash_in = Arc::new(InMemoryCashInStore::new());
        let cash_out = Arc::new(InMemoryCashOutStore::new());

        let lifecycle = Arc::new(InvoiceLifecycle::new(gateway, ledger.clone()));
        let settlement = Arc::new(SettlementService::new(
            cash_in.clone(),
            cash_out.clone(),
            config.reschedule_policy(),
        ));

        Self {
            lifecycle,
            settlement,
            ledger,
            cash_in,
            cash_out,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no business state involved)
    let public_routes = Router::new().route("/health", get(health::health_check));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/", post(invoices::emit_invoice))
        .route("/", get(invoices::list_invoices))
        .route("/:id", get(invoices::get_invoice))
        .route("/:id/retry", post(invoices::retry_invoice))
        .route("/:id/cdr", post(invoices::record_cdr));

    // Cash-in routes
    let cash_in_routes = Router::new()
        .route("/", post(settlement::create_cash_in))
        .route("/", get(settlement::list_cash_in))
        .route("/:id/action", post(settlement::decide_cash_in));

    // Cash-out routes
    let cash_out_routes = Router::new()
        .route("/", post(settlement::create_cash_out))
        .route("/", get(settlement::list_cash_out))
        .route("/:id/action", post(settlement::advance_cash_out))
        .route("/:id/dispute", post(settlement::dispute_cash_out))
        .route("/:id/resolve", post(settlement::resolve_cash_out_dispute));

    // KPI routes
    let kpi_routes = Router::new()
        .route("/invoices", get(kpis::invoice_dashboard))
        .route("/settlement", get(kpis::settlement_dashboard));

    let api_routes = Router::new()
        .nest("/invoices", invoice_routes)
        .nest("/cash-in", cash_in_routes)
        .nest("/cash-out", cash_out_routes)
        .nest("/kpis", kpi_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
