//! Invoicing domain errors

use core_kernel::{timeline::TimelineError, PortError};
use thiserror::Error;

/// Errors that can occur in the invoicing domain
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    /// Caller-correctable; the gateway is never contacted
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Emission requires a strictly positive amount")]
    NonPositiveAmount,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// The external authority rejected, errored or timed out
    #[error("Gateway error: {0}")]
    Gateway(PortError),

    #[error("Ledger error: {0}")]
    Ledger(PortError),

    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}

impl InvoiceError {
    /// Maps a ledger port failure, folding NotFound into the domain variant
    pub fn from_ledger(err: PortError, id: impl std::fmt::Display) -> Self {
        if err.is_not_found() {
            InvoiceError::VoucherNotFound(id.to_string())
        } else {
            InvoiceError::Ledger(err)
        }
    }

    /// Returns true when a retry of the same document is sensible
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvoiceError::Gateway(e) if e.is_transient())
    }
}
