//! Settlement Domain
//!
//! This crate implements both sides of the marketplace money flow:
//! cash-in (buyer payments awaiting validation) and cash-out (seller
//! payouts net of commission, scheduled inside liquidation windows).
//!
//! # Lifecycles
//!
//! ```text
//! Cash-in:  PendingValidation -> Validated | Rejected | Expired | Canceled
//!
//! Cash-out: Scheduled -> Processing -> Paid -> Disputed -> Paid | Failed
//!                                   -> Failed --reschedule--> Scheduled
//! ```

pub mod cash_in;
pub mod cash_out;
pub mod error;
pub mod ports;
pub mod service;

pub use cash_in::{CashInAction, CashInPayment, CashInStatus, OrderHierarchy, PayerDetails};
pub use cash_out::{
    CashOutAction, CashOutPayment, CashOutStatus, DisputeOutcome, PayeeDetails, ReschedulePolicy,
};
pub use error::SettlementError;
pub use ports::{CashInStore, CashOutStore};
pub use service::SettlementService;
