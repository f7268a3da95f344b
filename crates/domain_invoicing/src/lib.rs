//! Invoicing Domain
//!
//! This crate implements the lifecycle of tax-authority-facing electronic
//! documents (vouchers) from draft through submission to the e-invoicing
//! gateway and the authority's confirmation receipt.
//!
//! # Voucher Lifecycle
//!
//! ```text
//! Draft -> SentWaitCdr -> Accepted
//!                      -> Observed --retry--> SentWaitCdr
//!                      -> Rejected --retry--> SentWaitCdr
//! ```

pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod voucher;

pub use error::InvoiceError;
pub use lifecycle::{CdrOutcome, InvoiceLifecycle};
pub use ports::{InvoiceGateway, SalesDocument, VoucherLedger};
pub use voucher::{Voucher, VoucherDraft, VoucherStatus, VoucherType};
