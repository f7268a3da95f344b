//! Settlement application service
//!
//! Orchestrates the cash-in and cash-out state machines over their stores.
//! Every operation loads the record, applies the transition in memory and
//! persists it with a compare-and-swap on the pre-transition status, so
//! concurrent transitions on one record serialize: the loser of a race
//! gets `PortError::Conflict` instead of overwriting the winner.

use std::sync::Arc;

use tracing::info;

use core_kernel::{Actor, CashInId, CashOutId};

use crate::cash_in::{CashInAction, CashInPayment};
use crate::cash_out::{CashOutAction, CashOutPayment, DisputeOutcome, ReschedulePolicy};
use crate::error::SettlementError;
use crate::ports::{CashInStore, CashOutStore};

/// The settlement service
///
/// The reschedule policy is fixed per instance; see `ReschedulePolicy` for
/// the two documented behaviors.
pub struct SettlementService {
    cash_in: Arc<dyn CashInStore>,
    cash_out: Arc<dyn CashOutStore>,
    reschedule_policy: ReschedulePolicy,
}

impl SettlementService {
    pub fn new(
        cash_in: Arc<dyn CashInStore>,
        cash_out: Arc<dyn CashOutStore>,
        reschedule_policy: ReschedulePolicy,
    ) -> Self {
        Self {
            cash_in,
            cash_out,
            reschedule_policy,
        }
    }

    /// Registers a freshly uploaded buyer payment
    pub async fn register_cash_in(
        &self,
        payment: CashInPayment,
    ) -> Result<CashInPayment, SettlementError> {
        self.cash_in
            .append(payment.clone())
            .await
            .map_err(SettlementError::Store)?;
        info!(payment_id = %payment.id, order = %payment.reference_id, "cash-in registered");
        Ok(payment)
    }

    /// Applies a back-office decision to a pending cash-in record
    pub async fn apply_cash_in(
        &self,
        id: CashInId,
        action: CashInAction,
        actor: Actor,
        reason: Option<&str>,
    ) -> Result<CashInPayment, SettlementError> {
        let mut payment = self
            .cash_in
            .get(id)
            .await
            .map_err(|e| SettlementError::from_store(e, id))?;

        let from = payment.status;
        payment.apply(action, actor, reason)?;

        self.cash_in
            .compare_and_update(from, payment.clone())
            .await
            .map_err(SettlementError::Store)?;

        info!(payment_id = %id, action = action.name(), status = %payment.status, "cash-in decided");
        Ok(payment)
    }

    /// Schedules a payout
    pub async fn register_cash_out(
        &self,
        payment: CashOutPayment,
    ) -> Result<CashOutPayment, SettlementError> {
        payment.verify_conservation()?;
        self.cash_out
            .append(payment.clone())
            .await
            .map_err(SettlementError::Store)?;
        info!(payment_id = %payment.id, batch = %payment.reference_id, "cash-out scheduled");
        Ok(payment)
    }

    /// Drives a payout forward
    ///
    /// A reschedule under `ReschedulePolicy::NewRecord` appends the
    /// replacement record to the store and returns it alongside the
    /// (still failed) original.
    pub async fn advance_cash_out(
        &self,
        id: CashOutId,
        action: CashOutAction,
        actor: Actor,
        reason: Option<&str>,
    ) -> Result<(CashOutPayment, Option<CashOutPayment>), SettlementError> {
        let mut payment = self
            .cash_out
            .get(id)
            .await
            .map_err(|e| SettlementError::from_store(e, id))?;

        let from = payment.status;
        let replacement = payment.advance(action, actor, reason, self.reschedule_policy)?;

        self.cash_out
            .compare_and_update(from, payment.clone())
            .await
            .map_err(SettlementError::Store)?;

        if let Some(replacement) = &replacement {
            self.cash_out
                .append(replacement.clone())
                .await
                .map_err(SettlementError::Store)?;
        }

        info!(payment_id = %id, action = action.name(), status = %payment.status, "cash-out advanced");
        Ok((payment, replacement))
    }

    /// Seller contests a paid payout
    pub async fn dispute_cash_out(
        &self,
        id: CashOutId,
        actor: Actor,
        reason: &str,
    ) -> Result<CashOutPayment, SettlementError> {
        let mut payment = self
            .cash_out
            .get(id)
            .await
            .map_err(|e| SettlementError::from_store(e, id))?;

        let from = payment.status;
        payment.dispute(actor, reason)?;

        self.cash_out
            .compare_and_update(from, payment.clone())
            .await
            .map_err(SettlementError::Store)?;

        info!(payment_id = %id, "cash-out disputed");
        Ok(payment)
    }

    /// Manual resolution of a disputed payout
    pub async fn resolve_cash_out_dispute(
        &self,
        id: CashOutId,
        outcome: DisputeOutcome,
        actor: Actor,
        reason: &str,
    ) -> Result<CashOutPayment, SettlementError> {
        let mut payment = self
            .cash_out
            .get(id)
            .await
            .map_err(|e| SettlementError::from_store(e, id))?;

        let from = payment.status;
        payment.resolve_dispute(outcome, actor, reason)?;

        self.cash_out
            .compare_and_update(from, payment.clone())
            .await
            .map_err(SettlementError::Store)?;

        info!(payment_id = %id, outcome = ?outcome, "cash-out dispute resolved");
        Ok(payment)
    }
}
