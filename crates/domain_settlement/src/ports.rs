//! Settlement ports
//!
//! Repositories for the two settlement collections. `infra_store` provides
//! the keyed in-memory adapters.

use async_trait::async_trait;

use core_kernel::{CashInId, CashOutId, DomainPort, PortError, SellerId};

use crate::cash_in::{CashInPayment, CashInStatus};
use crate::cash_out::{CashOutPayment, CashOutStatus};

/// Store of buyer payments awaiting validation
#[async_trait]
pub trait CashInStore: DomainPort {
    async fn append(&self, payment: CashInPayment) -> Result<(), PortError>;

    async fn get(&self, id: CashInId) -> Result<CashInPayment, PortError>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<CashInPayment>, PortError>;

    /// Records currently in `status`
    async fn by_status(&self, status: CashInStatus) -> Result<Vec<CashInPayment>, PortError>;

    /// Replaces a record only if its stored status still matches `expected`
    async fn compare_and_update(
        &self,
        expected: CashInStatus,
        payment: CashInPayment,
    ) -> Result<(), PortError>;
}

/// Store of seller payouts
#[async_trait]
pub trait CashOutStore: DomainPort {
    async fn append(&self, payment: CashOutPayment) -> Result<(), PortError>;

    async fn get(&self, id: CashOutId) -> Result<CashOutPayment, PortError>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<CashOutPayment>, PortError>;

    /// Records currently in `status`
    async fn by_status(&self, status: CashOutStatus) -> Result<Vec<CashOutPayment>, PortError>;

    /// One seller's payouts, newest first
    async fn by_seller(&self, seller_id: SellerId) -> Result<Vec<CashOutPayment>, PortError>;

    /// Replaces a record only if its stored status still matches `expected`
    async fn compare_and_update(
        &self,
        expected: CashOutStatus,
        payment: CashOutPayment,
    ) -> Result<(), PortError>;
}
