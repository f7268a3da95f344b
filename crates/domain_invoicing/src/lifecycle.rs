//! Invoice lifecycle state machine
//!
//! Drives a voucher through emission, the authority's confirmation receipt
//! and manual resubmission. Every operation is atomic with respect to the
//! ledger: the state change, its audit event and persistence happen
//! together or not at all.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::{Actor, VoucherId};

use crate::error::InvoiceError;
use crate::ports::{InvoiceGateway, SalesDocument, VoucherLedger};
use crate::voucher::{Voucher, VoucherDraft, VoucherStatus};

/// Outcome carried by the authority's confirmation receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CdrOutcome {
    Accepted,
    Observed,
    Rejected,
}

impl From<CdrOutcome> for VoucherStatus {
    fn from(outcome: CdrOutcome) -> Self {
        match outcome {
            CdrOutcome::Accepted => VoucherStatus::Accepted,
            CdrOutcome::Observed => VoucherStatus::Observed,
            CdrOutcome::Rejected => VoucherStatus::Rejected,
        }
    }
}

/// The invoice lifecycle service
///
/// Gateway and ledger are injected so tests can run against stubs and a
/// process can host several tenants with independent stores.
pub struct InvoiceLifecycle {
    gateway: Arc<dyn InvoiceGateway>,
    ledger: Arc<dyn VoucherLedger>,
}

impl InvoiceLifecycle {
    pub fn new(gateway: Arc<dyn InvoiceGateway>, ledger: Arc<dyn VoucherLedger>) -> Self {
        Self { gateway, ledger }
    }

    /// Emits a new voucher: validate, submit, persist
    ///
    /// The only transition allowed from Draft. Field validation happens
    /// before any gateway call; if the gateway fails the voucher is not
    /// persisted and no partial record exists.
    pub async fn emit(&self, draft: VoucherDraft, actor: Actor) -> Result<Voucher, InvoiceError> {
        let mut voucher = Voucher::draft(draft, actor.clone())?;
        let document = SalesDocument::from_voucher(&voucher);

        let response = self
            .gateway
            .submit(&document)
            .await
            .map_err(InvoiceError::Gateway)?;

        voucher.provider_response = Some(response.clone());
        voucher.record_transition(
            VoucherStatus::SentWaitCdr,
            actor,
            "submitted to e-invoicing authority",
            Some(response),
        )?;

        self.ledger
            .append(voucher.clone())
            .await
            .map_err(InvoiceError::Ledger)?;

        info!(
            voucher_id = %voucher.id,
            document = %voucher.document_ref(),
            seller_id = %voucher.seller_id,
            "voucher emitted"
        );
        Ok(voucher)
    }

    /// Resubmits an observed or rejected voucher with its original payload
    ///
    /// Appends a new audit event regardless of outcome: on success the
    /// voucher re-enters SentWaitCdr; on gateway failure the status stays
    /// put and the failed attempt is recorded. Any other starting state is
    /// an `InvalidStatusTransition`.
    pub async fn retry(&self, id: VoucherId, actor: Actor) -> Result<Voucher, InvoiceError> {
        let mut voucher = self
            .ledger
            .get(id)
            .await
            .map_err(|e| InvoiceError::from_ledger(e, id))?;

        let from = voucher.status;
        if !from.is_retryable() {
            return Err(InvoiceError::InvalidStatusTransition {
                from: from.to_string(),
                to: VoucherStatus::SentWaitCdr.to_string(),
            });
        }

        let document = SalesDocument::from_voucher(&voucher);
        match self.gateway.submit(&document).await {
            Ok(response) => {
                voucher.provider_response = Some(response.clone());
                voucher.record_transition(
                    VoucherStatus::SentWaitCdr,
                    actor,
                    "resubmitted to e-invoicing authority",
                    Some(response),
                )?;
                self.ledger
                    .compare_and_update(from, voucher.clone())
                    .await
                    .map_err(InvoiceError::Ledger)?;

                info!(voucher_id = %voucher.id, from = %from, "voucher resubmitted");
                Ok(voucher)
            }
            Err(err) => {
                warn!(voucher_id = %voucher.id, error = %err, "resubmission failed");
                voucher.record_attempt(actor, format!("resubmission failed: {err}"), None)?;
                self.ledger
                    .compare_and_update(from, voucher)
                    .await
                    .map_err(InvoiceError::Ledger)?;
                Err(InvoiceError::Gateway(err))
            }
        }
    }

    /// Applies the authority's confirmation receipt to a waiting voucher
    pub async fn record_cdr(
        &self,
        id: VoucherId,
        outcome: CdrOutcome,
        actor: Actor,
        reason: impl Into<String>,
        receipt: Option<serde_json::Value>,
    ) -> Result<Voucher, InvoiceError> {
        let mut voucher = self
            .ledger
            .get(id)
            .await
            .map_err(|e| InvoiceError::from_ledger(e, id))?;

        let from = voucher.status;
        voucher.record_transition(outcome.into(), actor, reason, receipt)?;

        self.ledger
            .compare_and_update(from, voucher.clone())
            .await
            .map_err(InvoiceError::Ledger)?;

        info!(voucher_id = %voucher.id, outcome = ?outcome, "confirmation receipt recorded");
        Ok(voucher)
    }
}
