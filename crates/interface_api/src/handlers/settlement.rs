//! Settlement handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Actor, CashInId, CashOutId, SellerId};
use domain_settlement::{CashInPayment, CashInStore, CashOutPayment, CashOutStore};

use crate::dto::settlement::{
    CashInActionRequest, CashOutActionRequest, CreateCashInRequest, CreateCashOutRequest,
    DisputeRequest, ListCashOutParams, ResolveDisputeRequest,
};
use crate::dto::actor_or_system;
use crate::{error::ApiError, AppState};

/// Registers an uploaded proof of payment
pub async fn create_cash_in(
    State(state): State<AppState>,
    Json(request): Json<CreateCashInRequest>,
) -> Result<(StatusCode, Json<CashInPayment>), ApiError> {
    request.validate()?;

    let payment = state
        .settlement
        .register_cash_in(request.into_payment()?)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Lists all cash-in records
pub async fn list_cash_in(
    State(state): State<AppState>,
) -> Result<Json<Vec<CashInPayment>>, ApiError> {
    Ok(Json(state.cash_in.list().await?))
}

/// Applies a back-office decision to a pending cash-in record
pub async fn decide_cash_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CashInActionRequest>,
) -> Result<Json<CashInPayment>, ApiError> {
    let actor = actor_or_system(request.actor);
    let payment = state
        .settlement
        .apply_cash_in(
            CashInId::from(id),
            request.action,
            actor,
            request.reason.as_deref(),
        )
        .await?;
    Ok(Json(payment))
}

/// Schedules a payout inside a liquidation window
pub async fn create_cash_out(
    State(state): State<AppState>,
    Json(request): Json<CreateCashOutRequest>,
) -> Result<(StatusCode, Json<CashOutPayment>), ApiError> {
    request.validate()?;

    let payment = state
        .settlement
        .register_cash_out(request.into_payment()?)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Lists payouts, optionally scoped to one seller
pub async fn list_cash_out(
    State(state): State<AppState>,
    Query(params): Query<ListCashOutParams>,
) -> Result<Json<Vec<CashOutPayment>>, ApiError> {
    let payments = match params.seller_id {
        Some(seller_id) => state.cash_out.by_seller(SellerId::from(seller_id)).await?,
        None => state.cash_out.list().await?,
    };
    Ok(Json(payments))
}

/// Result of driving a payout forward
#[derive(Debug, Serialize)]
pub struct CashOutAdvanceResponse {
    pub payment: CashOutPayment,
    /// Present when a failed payout was rescheduled as a new record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<CashOutPayment>,
}

/// Drives a payout forward (process, pay, fail, reschedule)
pub async fn advance_cash_out(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CashOutActionRequest>,
) -> Result<Json<CashOutAdvanceResponse>, ApiError> {
    let actor = actor_or_system(request.actor);
    let (payment, replacement) = state
        .settlement
        .advance_cash_out(
            CashOutId::from(id),
            request.action,
            actor,
            request.reason.as_deref(),
        )
        .await?;
    Ok(Json(CashOutAdvanceResponse {
        payment,
        replacement,
    }))
}

/// Seller contests a paid payout
pub async fn dispute_cash_out(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DisputeRequest>,
) -> Result<Json<CashOutPayment>, ApiError> {
    request.validate()?;

    let payment = state
        .settlement
        .dispute_cash_out(CashOutId::from(id), Actor::from(request.actor), &request.reason)
        .await?;
    Ok(Json(payment))
}

/// Manual resolution of a disputed payout
pub async fn resolve_cash_out_dispute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveDisputeRequest>,
) -> Result<Json<CashOutPayment>, ApiError> {
    request.validate()?;

    let actor = actor_or_system(request.actor);
    let payment = state
        .settlement
        .resolve_cash_out_dispute(CashOutId::from(id), request.outcome, actor, &request.reason)
        .await?;
    Ok(Json(payment))
}
