//! Voucher aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Actor, Money, SellerId, Timeline, TimelineEvent, VoucherId};

use crate::error::InvoiceError;

/// Kind of tax document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    Factura,
    Boleta,
    NotaCredito,
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoucherType::Factura => write!(f, "FACTURA"),
            VoucherType::Boleta => write!(f, "BOLETA"),
            VoucherType::NotaCredito => write!(f, "NOTA_CREDITO"),
        }
    }
}

/// Voucher status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    /// Drafted by a seller, not yet submitted
    Draft,
    /// Submitted, waiting for the authority's confirmation receipt
    SentWaitCdr,
    /// Confirmed valid by the authority (terminal)
    Accepted,
    /// Accepted with observations; may be corrected and resubmitted
    Observed,
    /// Rejected by the authority; may be resubmitted
    Rejected,
}

impl VoucherStatus {
    /// Checks if a transition is valid
    pub fn can_transition_to(&self, target: VoucherStatus) -> bool {
        use VoucherStatus::*;
        matches!(
            (self, target),
            (Draft, SentWaitCdr)
                | (SentWaitCdr, Accepted)
                | (SentWaitCdr, Observed)
                | (SentWaitCdr, Rejected)
                | (Observed, SentWaitCdr)
                | (Rejected, SentWaitCdr)
        )
    }

    /// Accepted documents never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, VoucherStatus::Accepted)
    }

    /// Only observed and rejected documents may be resubmitted
    pub fn is_retryable(&self) -> bool {
        matches!(self, VoucherStatus::Observed | VoucherStatus::Rejected)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoucherStatus::Draft => write!(f, "DRAFT"),
            VoucherStatus::SentWaitCdr => write!(f, "SENT_WAIT_CDR"),
            VoucherStatus::Accepted => write!(f, "ACCEPTED"),
            VoucherStatus::Observed => write!(f, "OBSERVED"),
            VoucherStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// The seller-submitted payload an emission starts from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherDraft {
    pub seller_id: SellerId,
    pub seller_name: String,
    pub voucher_type: VoucherType,
    pub customer_name: String,
    pub customer_tax_id: Option<String>,
    pub series: String,
    pub number: String,
    pub amount: Money,
    pub order_id: String,
}

/// A tax document and its full audit history
///
/// Vouchers are never deleted; superseded documents remain for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: VoucherId,
    pub series: String,
    pub number: String,
    pub voucher_type: VoucherType,
    pub customer_name: String,
    pub customer_tax_id: Option<String>,
    pub order_id: String,
    pub amount: Money,
    pub emission_date: DateTime<Utc>,
    pub status: VoucherStatus,
    pub history: Timeline<VoucherStatus>,
    pub seller_id: SellerId,
    pub seller_name: String,
    pub created_at: DateTime<Utc>,
    /// Last raw provider response, kept verbatim for audit
    pub provider_response: Option<serde_json::Value>,
}

impl Voucher {
    /// Creates a draft voucher from a seller payload
    ///
    /// Validates the required fields before anything touches the gateway:
    /// `customer_name` must be non-empty, `series` and `number` present,
    /// and the amount strictly positive.
    pub fn draft(draft: VoucherDraft, actor: Actor) -> Result<Self, InvoiceError> {
        if draft.customer_name.trim().is_empty() {
            return Err(InvoiceError::MissingField("customer_name"));
        }
        if draft.series.trim().is_empty() {
            return Err(InvoiceError::MissingField("series"));
        }
        if draft.number.trim().is_empty() {
            return Err(InvoiceError::MissingField("number"));
        }
        if draft.order_id.trim().is_empty() {
            return Err(InvoiceError::MissingField("order_id"));
        }
        if !draft.amount.is_positive() {
            return Err(InvoiceError::NonPositiveAmount);
        }

        let now = Utc::now();
        let history = Timeline::start(TimelineEvent::initial(
            VoucherStatus::Draft,
            actor,
            "voucher drafted",
        ))?;

        Ok(Self {
            id: VoucherId::new_v7(),
            series: draft.series,
            number: draft.number,
            voucher_type: draft.voucher_type,
            customer_name: draft.customer_name,
            customer_tax_id: draft.customer_tax_id,
            order_id: draft.order_id,
            amount: draft.amount,
            emission_date: now,
            status: VoucherStatus::Draft,
            history,
            seller_id: draft.seller_id,
            seller_name: draft.seller_name,
            created_at: now,
            provider_response: None,
        })
    }

    /// Human-readable document reference, e.g. `F001-00000214`
    pub fn document_ref(&self) -> String {
        format!("{}-{}", self.series, self.number)
    }

    /// Applies a legal status transition and appends its audit event
    pub fn record_transition(
        &mut self,
        new_status: VoucherStatus,
        actor: Actor,
        reason: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), InvoiceError> {
        if !self.status.can_transition_to(new_status) {
            return Err(InvoiceError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let mut event = TimelineEvent::transition(self.status, new_status, actor, reason);
        if let Some(metadata) = metadata {
            event = event.with_metadata(metadata);
        }
        self.history.record(event)?;
        self.status = new_status;
        Ok(())
    }

    /// Records an attempt that did not change the document's status
    ///
    /// Used when a resubmission fails at the transport layer: the authority
    /// never saw the document, the status stays put, but the attempt must
    /// still leave an audit trace.
    pub fn record_attempt(
        &mut self,
        actor: Actor,
        reason: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), InvoiceError> {
        let mut event = TimelineEvent::transition(self.status, self.status, actor, reason);
        if let Some(metadata) = metadata {
            event = event.with_metadata(metadata);
        }
        self.history.record(event)?;
        Ok(())
    }

    /// Free-text filter over the fields an operator searches by
    pub fn matches_search(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.customer_name.to_lowercase().contains(&q)
            || self.series.to_lowercase().contains(&q)
            || self.number.to_lowercase().contains(&q)
            || self.order_id.to_lowercase().contains(&q)
            || self
                .customer_tax_id
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn sample_draft() -> VoucherDraft {
        VoucherDraft {
            seller_id: SellerId::new_v7(),
            seller_name: "Comercial Andina".to_string(),
            voucher_type: VoucherType::Factura,
            customer_name: "ACME".to_string(),
            customer_tax_id: Some("20100066603".to_string()),
            series: "F001".to_string(),
            number: "00000214".to_string(),
            amount: Money::new(dec!(1250.80), Currency::PEN),
            order_id: "ORD-9410".to_string(),
        }
    }

    #[test]
    fn test_draft_starts_with_one_history_event() {
        let voucher = Voucher::draft(sample_draft(), Actor::system()).unwrap();

        assert_eq!(voucher.status, VoucherStatus::Draft);
        assert_eq!(voucher.history.len(), 1);
        assert_eq!(voucher.history.current_status(), VoucherStatus::Draft);
        assert_eq!(voucher.document_ref(), "F001-00000214");
    }

    #[test]
    fn test_draft_rejects_empty_customer_name() {
        let mut draft = sample_draft();
        draft.customer_name = "   ".to_string();

        let result = Voucher::draft(draft, Actor::system());
        assert!(matches!(result, Err(InvoiceError::MissingField("customer_name"))));
    }

    #[test]
    fn test_draft_rejects_non_positive_amount() {
        let mut draft = sample_draft();
        draft.amount = Money::zero(Currency::PEN);

        let result = Voucher::draft(draft, Actor::system());
        assert!(matches!(result, Err(InvoiceError::NonPositiveAmount)));
    }

    #[test]
    fn test_record_transition_keeps_history_and_status_in_step() {
        let mut voucher = Voucher::draft(sample_draft(), Actor::system()).unwrap();

        voucher
            .record_transition(VoucherStatus::SentWaitCdr, Actor::system(), "submitted", None)
            .unwrap();

        assert_eq!(voucher.status, VoucherStatus::SentWaitCdr);
        assert_eq!(voucher.history.len(), 2);
        assert_eq!(voucher.history.current_status(), voucher.status);
    }

    #[test]
    fn test_illegal_transition_is_rejected() {
        let mut voucher = Voucher::draft(sample_draft(), Actor::system()).unwrap();

        // Draft cannot jump straight to Accepted
        let result =
            voucher.record_transition(VoucherStatus::Accepted, Actor::system(), "skip", None);

        assert!(matches!(
            result,
            Err(InvoiceError::InvalidStatusTransition { .. })
        ));
        assert_eq!(voucher.status, VoucherStatus::Draft);
        assert_eq!(voucher.history.len(), 1);
    }

    #[test]
    fn test_accepted_is_terminal() {
        assert!(VoucherStatus::Accepted.is_terminal());
        assert!(!VoucherStatus::Accepted.is_retryable());
        assert!(VoucherStatus::Observed.is_retryable());
        assert!(VoucherStatus::Rejected.is_retryable());
    }

    #[test]
    fn test_search_matches_tax_id_and_series() {
        let voucher = Voucher::draft(sample_draft(), Actor::system()).unwrap();

        assert!(voucher.matches_search("f001"));
        assert!(voucher.matches_search("20100066603"));
        assert!(voucher.matches_search("acme"));
        assert!(voucher.matches_search("ORD-9410"));
        assert!(!voucher.matches_search("no-such-thing"));
    }

    #[test]
    fn test_status_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&VoucherStatus::SentWaitCdr).unwrap();
        assert_eq!(json, "\"SENT_WAIT_CDR\"");
        let json = serde_json::to_string(&VoucherType::NotaCredito).unwrap();
        assert_eq!(json, "\"NOTA_CREDITO\"");
    }
}
