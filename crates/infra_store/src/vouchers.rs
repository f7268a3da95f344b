//! Voucher ledger repository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{ports::QueryScope, DomainPort, PortError, SellerId, VoucherId};
use domain_invoicing::{Voucher, VoucherLedger, VoucherStatus};

#[derive(Default)]
struct Inner {
    records: HashMap<VoucherId, Voucher>,
    by_seller: HashMap<SellerId, Vec<VoucherId>>,
    by_status: HashMap<VoucherStatus, HashSet<VoucherId>>,
}

impl Inner {
    fn collect(&self, ids: impl Iterator<Item = VoucherId>, search: Option<&str>) -> Vec<Voucher> {
        let mut vouchers: Vec<Voucher> = ids
            .filter_map(|id| self.records.get(&id))
            .filter(|v| search.map_or(true, |q| v.matches_search(q)))
            .cloned()
            .collect();
        // v7 ids are time-ordered, so this is newest-first
        vouchers.sort_by(|a, b| b.id.as_uuid().cmp(a.id.as_uuid()));
        vouchers
    }
}

/// Append-only, id-keyed voucher store
///
/// Both the seller-scoped and the admin-global view read the same records;
/// the seller index only narrows which ids are visited.
#[derive(Default)]
pub struct InMemoryVoucherLedger {
    inner: RwLock<Inner>,
}

impl InMemoryVoucherLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored vouchers
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl DomainPort for InMemoryVoucherLedger {}

#[async_trait]
impl VoucherLedger for InMemoryVoucherLedger {
    async fn append(&self, voucher: Voucher) -> Result<(), PortError> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&voucher.id) {
            return Err(PortError::conflict(format!(
                "voucher {} already exists",
                voucher.id
            )));
        }

        inner
            .by_seller
            .entry(voucher.seller_id)
            .or_default()
            .push(voucher.id);
        inner
            .by_status
            .entry(voucher.status)
            .or_default()
            .insert(voucher.id);
        debug!(voucher_id = %voucher.id, status = %voucher.status, "voucher appended");
        inner.records.insert(voucher.id, voucher);
        Ok(())
    }

    async fn get(&self, id: VoucherId) -> Result<Voucher, PortError> {
        self.inner
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Voucher", id))
    }

    async fn list(
        &self,
        scope: QueryScope,
        search: Option<&str>,
    ) -> Result<Vec<Voucher>, PortError> {
        let inner = self.inner.read().await;
        let vouchers = match scope {
            QueryScope::Seller(seller_id) => {
                let ids = inner.by_seller.get(&seller_id).cloned().unwrap_or_default();
                inner.collect(ids.into_iter(), search)
            }
            QueryScope::All => {
                let ids: Vec<VoucherId> = inner.records.keys().copied().collect();
                inner.collect(ids.into_iter(), search)
            }
        };
        Ok(vouchers)
    }

    async fn compare_and_update(
        &self,
        expected: VoucherStatus,
        voucher: Voucher,
    ) -> Result<(), PortError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .records
            .get(&voucher.id)
            .ok_or_else(|| PortError::not_found("Voucher", voucher.id))?;

        if current.status != expected {
            return Err(PortError::conflict(format!(
                "voucher {} moved from {expected} to {}",
                voucher.id, current.status
            )));
        }

        if let Some(ids) = inner.by_status.get_mut(&expected) {
            ids.remove(&voucher.id);
        }
        inner
            .by_status
            .entry(voucher.status)
            .or_default()
            .insert(voucher.id);
        debug!(voucher_id = %voucher.id, from = %expected, to = %voucher.status, "voucher updated");
        inner.records.insert(voucher.id, voucher);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Actor, Currency, Money};
    use domain_invoicing::{VoucherDraft, VoucherType};
    use rust_decimal_macros::dec;

    fn voucher_for(seller_id: SellerId, number: &str) -> Voucher {
        let mut voucher = Voucher::draft(
            VoucherDraft {
                seller_id,
                seller_name: "Comercial Andina".to_string(),
                voucher_type: VoucherType::Boleta,
                customer_name: "Rosa Quispe".to_string(),
                customer_tax_id: None,
                series: "B001".to_string(),
                number: number.to_string(),
                amount: Money::new(dec!(120.00), Currency::PEN),
                order_id: format!("ORD-{number}"),
            },
            Actor::system(),
        )
        .unwrap();
        voucher
            .record_transition(VoucherStatus::SentWaitCdr, Actor::system(), "submitted", None)
            .unwrap();
        voucher
    }

    #[tokio::test]
    async fn append_and_get_round_trip() {
        let ledger = InMemoryVoucherLedger::new();
        let voucher = voucher_for(SellerId::new_v7(), "00000001");

        ledger.append(voucher.clone()).await.unwrap();
        let stored = ledger.get(voucher.id).await.unwrap();

        assert_eq!(stored.id, voucher.id);
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_append_is_a_conflict() {
        let ledger = InMemoryVoucherLedger::new();
        let voucher = voucher_for(SellerId::new_v7(), "00000001");

        ledger.append(voucher.clone()).await.unwrap();
        let result = ledger.append(voucher).await;

        assert!(matches!(result, Err(PortError::Conflict { .. })));
    }

    #[tokio::test]
    async fn seller_scope_uses_the_seller_index() {
        let ledger = InMemoryVoucherLedger::new();
        let mine = SellerId::new_v7();
        let other = SellerId::new_v7();

        ledger.append(voucher_for(mine, "00000001")).await.unwrap();
        ledger.append(voucher_for(mine, "00000002")).await.unwrap();
        ledger.append(voucher_for(other, "00000003")).await.unwrap();

        let scoped = ledger.list(QueryScope::Seller(mine), None).await.unwrap();
        let global = ledger.list(QueryScope::All, None).await.unwrap();

        assert_eq!(scoped.len(), 2);
        assert_eq!(global.len(), 3);
        assert!(scoped.iter().all(|v| v.seller_id == mine));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let ledger = InMemoryVoucherLedger::new();
        let seller = SellerId::new_v7();
        let first = voucher_for(seller, "00000001");
        let second = voucher_for(seller, "00000002");

        ledger.append(first.clone()).await.unwrap();
        ledger.append(second.clone()).await.unwrap();

        let listed = ledger.list(QueryScope::All, None).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn search_filters_within_the_scope() {
        let ledger = InMemoryVoucherLedger::new();
        let seller = SellerId::new_v7();
        ledger.append(voucher_for(seller, "00000001")).await.unwrap();
        ledger.append(voucher_for(seller, "00000777")).await.unwrap();

        let hits = ledger
            .list(QueryScope::Seller(seller), Some("777"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].number, "00000777");
    }

    #[tokio::test]
    async fn stale_cas_loses_and_leaves_the_record_alone() {
        let ledger = InMemoryVoucherLedger::new();
        let mut voucher = voucher_for(SellerId::new_v7(), "00000001");
        ledger.append(voucher.clone()).await.unwrap();

        // Winner applies the confirmation receipt
        let mut winner = voucher.clone();
        winner
            .record_transition(VoucherStatus::Accepted, Actor::system(), "cdr", None)
            .unwrap();
        ledger
            .compare_and_update(VoucherStatus::SentWaitCdr, winner)
            .await
            .unwrap();

        // Loser still thinks the voucher is waiting
        voucher
            .record_transition(VoucherStatus::Rejected, Actor::system(), "cdr", None)
            .unwrap();
        let result = ledger
            .compare_and_update(VoucherStatus::SentWaitCdr, voucher.clone())
            .await;

        assert!(matches!(result, Err(PortError::Conflict { .. })));
        let stored = ledger.get(voucher.id).await.unwrap();
        assert_eq!(stored.status, VoucherStatus::Accepted);
    }
}
