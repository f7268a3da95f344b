//! KPI handlers
//!
//! Thin read-side endpoints: load current collections, hand them to the
//! analytics projections, return the figures. Nothing here writes.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ports::QueryScope, Currency, Money, Rate};
use domain_analytics::{
    invoice_kpis, net_monthly_profit, settlement_kpis, top_payers, InvoiceKpis, SettlementKpis,
    TopPayer,
};
use domain_invoicing::VoucherLedger;
use domain_settlement::{CashInStore, CashOutStore};

use crate::{error::ApiError, AppState};

const TOP_PAYERS_LIMIT: usize = 5;

fn default_currency() -> Currency {
    Currency::PEN
}

#[derive(Debug, Deserialize)]
pub struct KpiParams {
    #[serde(default = "default_currency")]
    pub currency: Currency,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceKpiResponse {
    #[serde(flatten)]
    pub kpis: InvoiceKpis,
    pub top_payers: Vec<TopPayer>,
}

/// Invoice-side dashboard figures
pub async fn invoice_dashboard(
    State(state): State<AppState>,
    Query(params): Query<KpiParams>,
) -> Result<Json<InvoiceKpiResponse>, ApiError> {
    let vouchers = state.ledger.list(QueryScope::All, None).await?;

    Ok(Json(InvoiceKpiResponse {
        kpis: invoice_kpis(&vouchers, params.currency),
        top_payers: top_payers(&vouchers, params.currency, TOP_PAYERS_LIMIT),
    }))
}

#[derive(Debug, Serialize)]
pub struct SettlementKpiResponse {
    #[serde(flatten)]
    pub kpis: SettlementKpis,
    pub net_monthly_profit: Money,
}

/// Settlement-side dashboard figures
pub async fn settlement_dashboard(
    State(state): State<AppState>,
    Query(params): Query<KpiParams>,
) -> Result<Json<SettlementKpiResponse>, ApiError> {
    let cash_in = state.cash_in.list().await?;
    let cash_out = state.cash_out.list().await?;

    let now = Utc::now();
    let year = params.year.unwrap_or_else(|| now.year());
    let month = params.month.unwrap_or_else(|| now.month());
    let rate = Rate::from_percentage(state.config.commission_rate_percent);

    Ok(Json(SettlementKpiResponse {
        kpis: settlement_kpis(&cash_in, &cash_out),
        net_monthly_profit: net_monthly_profit(&cash_in, params.currency, year, month, rate),
    }))
}
