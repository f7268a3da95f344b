//! API error handling
//!
//! Maps domain errors onto HTTP statuses: validation failures are
//! caller-correctable 4xx, illegal transitions are conflicts, gateway
//! failures surface as 502/504 so the UI can offer the retry affordance.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_invoicing::InvoiceError;
use domain_settlement::SettlementError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// True when retrying the same request may succeed
    pub retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, retryable) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", false),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", false),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict", false),
            ApiError::GatewayTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "gateway_timeout", true),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "bad_gateway", true),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", false),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

fn from_port_error(err: PortError) -> ApiError {
    match &err {
        PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
        PortError::Conflict { .. } => ApiError::Conflict(err.to_string()),
        PortError::Timeout { .. } => ApiError::GatewayTimeout(err.to_string()),
        PortError::Connection { .. } | PortError::Unauthorized { .. } => {
            ApiError::BadGateway(err.to_string())
        }
        PortError::Upstream { status, .. } => {
            if *status >= 500 {
                ApiError::BadGateway(err.to_string())
            } else {
                // The authority rejected the document itself
                ApiError::BadRequest(err.to_string())
            }
        }
        _ => ApiError::Internal(err.to_string()),
    }
}

impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::VoucherNotFound(_) => ApiError::NotFound(err.to_string()),
            InvoiceError::MissingField(_) | InvoiceError::NonPositiveAmount => {
                ApiError::Validation(err.to_string())
            }
            InvoiceError::InvalidStatusTransition { .. } => ApiError::Conflict(err.to_string()),
            InvoiceError::Gateway(port) => from_port_error(port),
            InvoiceError::Ledger(port) => from_port_error(port),
            InvoiceError::Timeline(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::PaymentNotFound(_) => ApiError::NotFound(err.to_string()),
            SettlementError::InvalidStatusTransition { .. } => ApiError::Conflict(err.to_string()),
            SettlementError::MissingReason(_)
            | SettlementError::NonPositiveAmount
            | SettlementError::CommissionExceedsAmount { .. }
            | SettlementError::Money(_)
            | SettlementError::Period(_) => ApiError::Validation(err.to_string()),
            SettlementError::ActorNotAllowed { .. } => ApiError::Forbidden(err.to_string()),
            SettlementError::ConservationViolation { .. } => ApiError::Internal(err.to_string()),
            SettlementError::Timeline(_) => ApiError::Internal(err.to_string()),
            SettlementError::Store(port) => from_port_error(port),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        from_port_error(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
