//! Invoicing handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ports::QueryScope, Actor, SellerId, VoucherId};
use domain_invoicing::{Voucher, VoucherLedger};

use crate::dto::invoices::{
    EmitInvoiceRequest, ListInvoicesParams, RecordCdrRequest, RetryInvoiceRequest,
};
use crate::dto::actor_or_system;
use crate::{error::ApiError, AppState};

/// Emits a new voucher through the e-invoicing gateway
pub async fn emit_invoice(
    State(state): State<AppState>,
    Json(request): Json<EmitInvoiceRequest>,
) -> Result<(StatusCode, Json<Voucher>), ApiError> {
    request.validate()?;

    let draft = request.into_draft();
    let actor = Actor::seller(draft.seller_id.to_string(), draft.seller_name.clone());
    let voucher = state.lifecycle.emit(draft, actor).await?;

    Ok((StatusCode::CREATED, Json(voucher)))
}

/// Lists vouchers, seller-scoped or admin-global
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListInvoicesParams>,
) -> Result<Json<Vec<Voucher>>, ApiError> {
    let scope = match params.seller_id {
        Some(seller_id) => QueryScope::Seller(SellerId::from(seller_id)),
        None => QueryScope::All,
    };

    let vouchers = state.ledger.list(scope, params.search.as_deref()).await?;
    Ok(Json(vouchers))
}

/// Fetches one voucher with its full timeline
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Voucher>, ApiError> {
    let voucher = state.ledger.get(VoucherId::from(id)).await?;
    Ok(Json(voucher))
}

/// Resubmits an observed or rejected voucher
pub async fn retry_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<RetryInvoiceRequest>>,
) -> Result<Json<Voucher>, ApiError> {
    let Json(request) = request.unwrap_or_default();
    let actor = actor_or_system(request.actor);

    let voucher = state.lifecycle.retry(VoucherId::from(id), actor).await?;
    Ok(Json(voucher))
}

/// Records the authority's confirmation receipt
pub async fn record_cdr(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordCdrRequest>,
) -> Result<Json<Voucher>, ApiError> {
    let actor = actor_or_system(request.actor);
    let reason = request
        .reason
        .unwrap_or_else(|| "confirmation receipt received".to_string());

    let voucher = state
        .lifecycle
        .record_cdr(
            VoucherId::from(id),
            request.outcome,
            actor,
            reason,
            request.receipt,
        )
        .await?;
    Ok(Json(voucher))
}
