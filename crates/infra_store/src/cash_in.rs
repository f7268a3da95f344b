//! Cash-in repository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{CashInId, DomainPort, PortError};
use domain_settlement::{CashInPayment, CashInStatus, CashInStore};

#[derive(Default)]
struct Inner {
    records: HashMap<CashInId, CashInPayment>,
    by_status: HashMap<CashInStatus, HashSet<CashInId>>,
}

fn newest_first(payments: &mut [CashInPayment]) {
    payments.sort_by(|a, b| b.id.as_uuid().cmp(a.id.as_uuid()));
}

/// Id-keyed store of buyer payments with a status index
#[derive(Default)]
pub struct InMemoryCashInStore {
    inner: RwLock<Inner>,
}

impl InMemoryCashInStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryCashInStore {}

#[async_trait]
impl CashInStore for InMemoryCashInStore {
    async fn append(&self, payment: CashInPayment) -> Result<(), PortError> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&payment.id) {
            return Err(PortError::conflict(format!(
                "cash-in {} already exists",
                payment.id
            )));
        }
        inner
            .by_status
            .entry(payment.status)
            .or_default()
            .insert(payment.id);
        inner.records.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: CashInId) -> Result<CashInPayment, PortError> {
        self.inner
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("CashInPayment", id))
    }

    async fn list(&self) -> Result<Vec<CashInPayment>, PortError> {
        let inner = self.inner.read().await;
        let mut payments: Vec<CashInPayment> = inner.records.values().cloned().collect();
        newest_first(&mut payments);
        Ok(payments)
    }

    async fn by_status(&self, status: CashInStatus) -> Result<Vec<CashInPayment>, PortError> {
        let inner = self.inner.read().await;
        let mut payments: Vec<CashInPayment> = inner
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

    async fn compare_and_update(
        &self,
        expected: CashInStatus,
        payment: CashInPayment,
    ) -> Result<(), PortError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .records
            .get(&payment.id)
            .ok_or_else(|| PortError::not_found("CashInPayment", payment.id))?;

        if current.status != expected {
            return Err(PortError::conflict(format!(
                "cash-in {} moved from {expected} to {}",
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
