//! Settlement domain errors

use core_kernel::{money::MoneyError, period::PeriodError, timeline::TimelineError, PortError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the settlement domain
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// The action demands a reason and none was given
    #[error("Action {0} requires a reason")]
    MissingReason(&'static str),

    #[error("Actor role {role} may not perform {action}")]
    ActorNotAllowed { action: String, role: String },

    /// `net_amount = amount - commission` does not hold
    #[error("Money conservation violated: amount={amount}, commission={commission}, net={net}")]
    ConservationViolation {
        amount: Decimal,
        commission: Decimal,
        net: Decimal,
    },

    #[error("Payout requires a strictly positive amount")]
    NonPositiveAmount,

    #[error("Commission {commission} exceeds payout amount {amount}")]
    CommissionExceedsAmount { commission: Decimal, amount: Decimal },

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Period error: {0}")]
    Period(#[from] PeriodError),

    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    #[error("Store error: {0}")]
    Store(PortError),
}

impl SettlementError {
    /// Maps a store port failure, folding NotFound into the domain variant
    pub fn from_store(err: PortError, id: impl std::fmt::Display) -> Self {
        if err.is_not_found() {
            SettlementError::PaymentNotFound(id.to_string())
        } else {
            SettlementError::Store(err)
        }
    }
}
