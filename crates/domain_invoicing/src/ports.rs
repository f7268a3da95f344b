//! Invoicing ports
//!
//! The lifecycle service talks to the outside world through these traits.
//! `infra_gateway` provides the HTTP adapter for `InvoiceGateway`;
//! `infra_store` provides the keyed repository behind `VoucherLedger`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ports::QueryScope, DomainPort, PortError, VoucherId};

use crate::voucher::{Voucher, VoucherStatus};

/// The wire payload submitted to the e-invoicing authority
///
/// Flat on purpose: this is the provider's shape, not the domain's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDocument {
    pub document_type: String,
    pub series: String,
    pub number: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_tax_id: Option<String>,
    pub total: Decimal,
    pub currency: String,
    pub order_reference: String,
}

impl SalesDocument {
    /// Builds the submission payload from a voucher
    pub fn from_voucher(voucher: &Voucher) -> Self {
        Self {
            document_type: voucher.voucher_type.to_string(),
            series: voucher.series.clone(),
            number: voucher.number.clone(),
            customer_name: voucher.customer_name.clone(),
            customer_tax_id: voucher.customer_tax_id.clone(),
            total: voucher.amount.amount(),
            currency: voucher.amount.currency().code().to_string(),
            order_reference: voucher.order_id.clone(),
        }
    }
}

/// Network-facing port to the external e-invoicing authority
///
/// Implementations never retry internally; retry policy belongs to the
/// lifecycle state machine, which classifies failures via
/// `PortError::is_transient`.
#[async_trait]
pub trait InvoiceGateway: DomainPort {
    /// Submits a document and returns the provider's response verbatim
    async fn submit(&self, document: &SalesDocument) -> Result<serde_json::Value, PortError>;
}

/// Append-only store of emitted vouchers
///
/// One instance per process; every mutation is immediately visible to both
/// seller-scoped and admin-global readers.
#[async_trait]
pub trait VoucherLedger: DomainPort {
    /// Appends a newly emitted voucher
    async fn append(&self, voucher: Voucher) -> Result<(), PortError>;

    /// Fetches one voucher by id
    async fn get(&self, id: VoucherId) -> Result<Voucher, PortError>;

    /// Lists vouchers in a scope, newest first, optionally filtered by a
    /// free-text search over customer name, series, number, tax id and
    /// order id
    async fn list(&self, scope: QueryScope, search: Option<&str>)
        -> Result<Vec<Voucher>, PortError>;

    /// Replaces a voucher only if its stored status still matches
    /// `expected`; fails with `PortError::Conflict` otherwise
    ///
    /// This compare-and-swap is what serializes concurrent transitions on
    /// one voucher.
    async fn compare_and_update(
        &self,
        expected: VoucherStatus,
        voucher: Voucher,
    ) -> Result<(), PortError>;
}
