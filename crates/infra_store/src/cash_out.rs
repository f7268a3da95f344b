//! Cash-out repository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{CashOutId, DomainPort, PortError, SellerId};
use domain_settlement::{CashOutPayment, CashOutStatus, CashOutStore};

#[derive(Default)]
struct Inner {
    records: HashMap<CashOutId, CashOutPayment>,
    by_seller: HashMap<SellerId, Vec<CashOutId>>,
    by_status: HashMap<CashOutStatus, HashSet<CashOutId>>,
}

fn newest_first(payments: &mut [CashOutPayment]) {
    payments.sort_by(|a, b| b.id.as_uuid().cmp(a.id.as_uuid()));
}

/// Id-keyed store of seller payouts with seller and status indexes
#[derive(Default)]
pub struct InMemoryCashOutStore {
    inner: RwLock<Inner>,
}

impl InMemoryCashOutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryCashOutStore {}

#[async_trait]
impl CashOutStore for InMemoryCashOutStore {
    async fn append(&self, payment: CashOutPayment) -> Result<(), PortError> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&payment.id) {
            return Err(PortError::conflict(format!(
                "cash-out {} already exists",
                payment.id
            )));
        }
        inner
            .by_seller
            .entry(payment.seller.id)
            .or_default()
            .push(payment.id);
        inner
            .by_status
            .entry(payment.status)
            .or_default()
            .insert(payment.id);
        inner.records.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: CashOutId) -> Result<CashOutPayment, PortError> {
        self.inner
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("CashOutPayment", id))
    }

    async fn list(&self) -> Result<Vec<CashOutPayment>, PortError> {
        let inner = self.inner.read().await;
        let mut payments: Vec<CashOutPayment> = inner.records.values().cloned().collect();
        newest_first(&mut payments);
        Ok(payments)
    }

    async fn by_status(&self, status: CashOutStatus) -> Result<Vec<CashOutPayment>, PortError> {
        let inner = self.inner.read().await;
        let mut payments: Vec<CashOutPayment> = inner
            .by_status
            .get(&status)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.records.get(id))
            .cloned()
            .collect();
        newest_first(&mut payments);
        Ok(payments)
    }

    async fn by_seller(&self, seller_id: SellerId) -> Result<Vec<CashOutPayment>, PortError> {
        let inner = self.inner.read().await;
        let mut payments: Vec<CashOutPayment> = inner
            .by_seller
            .get(&seller_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.records.get(id))
            .cloned()
            .collect();
        newest_first(&mut payments);
        Ok(payments)
    }

    async fn compare_and_update(
        &self,
        expected: CashOutStatus,
        payment: CashOutPayment,
    ) -> Result<(), PortError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .records
            .get(&payment.id)
            .ok_or_else(|| PortError::not_found("CashOutPayment", payment.id))?;

        if current.status != expected {
            return Err(PortError::conflict(format!(
                "cash-out {} moved from {expected} to {}",
                payment.id, current.status
            )));
        }

        if let Some(ids) = inner.by_status.get_mut(&expected) {
            ids.remove(&payment.id);
        }
        inner
            .by_status
            .entry(payment.status)
            .or_default()
            .insert(payment.id);
        inner.records.insert(payment.id, payment);
        Ok(())
    }
}
