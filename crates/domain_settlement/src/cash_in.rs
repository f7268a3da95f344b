//! Cash-in aggregate
//!
//! A cash-in record tracks money coming from a buyer: created when the
//! proof of payment is uploaded, then validated or discarded by the back
//! office. A single transition leaves the pending state and all four
//! outcomes are terminal, which is what prevents double-crediting a
//! seller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Actor, ActorRole, CashInId, CustomerId, Money, Timeline, TimelineEvent};

use crate::error::SettlementError;

/// Cash-in status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashInStatus {
    /// Proof of payment uploaded, awaiting back-office review
    PendingValidation,
    /// Money recognized; downstream invoice emission is triggered
    Validated,
    /// Proof rejected by the back office
    Rejected,
    /// Review window elapsed without a decision
    Expired,
    /// Withdrawn before review
    Canceled,
}

impl CashInStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CashInStatus::PendingValidation)
    }
}

impl fmt::Display for CashInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashInStatus::PendingValidation => write!(f, "PENDING_VALIDATION"),
            CashInStatus::Validated => write!(f, "VALIDATED"),
            CashInStatus::Rejected => write!(f, "REJECTED"),
            CashInStatus::Expired => write!(f, "EXPIRED"),
            CashInStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// The single decision applied to a pending cash-in record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashInAction {
    Validate,
    Reject,
    Expire,
    Cancel,
}

impl CashInAction {
    /// The terminal status this action lands on
    pub fn target(&self) -> CashInStatus {
        match self {
            CashInAction::Validate => CashInStatus::Validated,
            CashInAction::Reject => CashInStatus::Rejected,
            CashInAction::Expire => CashInStatus::Expired,
            CashInAction::Cancel => CashInStatus::Canceled,
        }
    }

    /// Rejections must always say why
    pub fn requires_reason(&self) -> bool {
        matches!(self, CashInAction::Reject)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CashInAction::Validate => "VALIDATE",
            CashInAction::Reject => "REJECT",
            CashInAction::Expire => "EXPIRE",
            CashInAction::Cancel => "CANCEL",
        }
    }
}

/// The buyer the money came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerDetails {
    pub id: CustomerId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

/// Denormalized placement of the order inside the marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHierarchy {
    pub company: String,
    pub seller: String,
    pub customer: String,
}

/// Money coming from a buyer into the marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashInPayment {
    pub id: CashInId,
    /// The order this payment settles
    pub reference_id: String,
    pub amount: Money,
    pub customer: PayerDetails,
    /// Proof of payment uploaded by the buyer
    pub voucher_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_document_url: Option<String>,
    pub order_hierarchy: OrderHierarchy,
    pub status: CashInStatus,
    pub timeline: Timeline<CashInStatus>,
    pub created_at: DateTime<Utc>,
}

impl CashInPayment {
    /// Creates a pending record from an uploaded proof of payment
    pub fn pending(
        reference_id: impl Into<String>,
        amount: Money,
        customer: PayerDetails,
        voucher_url: impl Into<String>,
        order_hierarchy: OrderHierarchy,
    ) -> Result<Self, SettlementError> {
        let timeline = Timeline::start(TimelineEvent::initial(
            CashInStatus::PendingValidation,
            Actor::system(),
            "proof of payment uploaded",
        ))?;

        Ok(Self {
            id: CashInId::new_v7(),
            reference_id: reference_id.into(),
            amount,
            customer,
            voucher_url: voucher_url.into(),
            invoice_document_url: None,
            order_hierarchy,
            status: CashInStatus::PendingValidation,
            timeline,
            created_at: Utc::now(),
        })
    }

    /// Applies the back-office decision
    ///
    /// Legal only from PendingValidation; calling this on a record already
    /// in a terminal state is an error, never a silent success. Validation
    /// and rejection are back-office decisions, so a seller actor may not
    /// perform them.
    pub fn apply(
        &mut self,
        action: CashInAction,
        actor: Actor,
        reason: Option<&str>,
    ) -> Result<(), SettlementError> {
        let target = action.target();
        if self.status.is_terminal() {
            return Err(SettlementError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }

        if matches!(action, CashInAction::Validate | CashInAction::Reject)
            && actor.role == ActorRole::Seller
        {
            return Err(SettlementError::ActorNotAllowed {
                action: action.name().to_string(),
                role: actor.role.to_string(),
            });
        }

        let reason = match reason {
            Some(r) if !r.trim().is_empty() => r.to_string(),
            _ if action.requires_reason() => {
                return Err(SettlementError::MissingReason(action.name()));
            }
            _ => format!("{} by {}", action.name(), actor.role),
        };

        self.timeline
            .record(TimelineEvent::transition(self.status, target, actor, reason))?;
        self.status = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn sample() -> CashInPayment {
        CashInPayment::pending(
            "ORD-3301",
            Money::new(dec!(480.00), Currency::PEN),
            PayerDetails {
                id: CustomerId::new_v7(),
                name: "Rosa Quispe".to_string(),
                tax_id: None,
            },
            "https://files.example/proof-3301.pdf",
            OrderHierarchy {
                company: "Marketplace SAC".to_string(),
                seller: "Comercial Andina".to_string(),
                customer: "Rosa Quispe".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_pending_record_starts_with_one_event() {
        let payment = sample();
        assert_eq!(payment.status, CashInStatus::PendingValidation);
        assert_eq!(payment.timeline.len(), 1);
        assert!(!payment.status.is_terminal());
    }

    #[test]
    fn test_validate_moves_to_terminal_validated() {
        let mut payment = sample();
        payment
            .apply(CashInAction::Validate, Actor::admin("adm-1", "Marta"), None)
            .unwrap();

        assert_eq!(payment.status, CashInStatus::Validated);
        assert!(payment.status.is_terminal());
        assert_eq!(payment.timeline.len(), 2);
    }

    #[test]
    fn test_reject_requires_a_reason() {
        let mut payment = sample();
        let result = payment.apply(CashInAction::Reject, Actor::admin("adm-1", "Marta"), None);

        assert!(matches!(result, Err(SettlementError::MissingReason("REJECT"))));
        assert_eq!(payment.status, CashInStatus::PendingValidation);
    }

    #[test]
    fn test_reject_stores_the_reason() {
        let mut payment = sample();
        payment
            .apply(
                CashInAction::Reject,
                Actor::admin("adm-1", "Marta"),
                Some("voucher ilegible"),
            )
            .unwrap();

        assert_eq!(payment.status, CashInStatus::Rejected);
        assert_eq!(payment.timeline.last().reason, "voucher ilegible");
    }

    #[test]
    fn test_terminal_records_reject_further_decisions() {
        let mut payment = sample();
        payment
            .apply(CashInAction::Validate, Actor::system(), None)
            .unwrap();
        let snapshot_len = payment.timeline.len();

        let result = payment.apply(CashInAction::Validate, Actor::system(), None);

        assert!(matches!(
            result,
            Err(SettlementError::InvalidStatusTransition { .. })
        ));
        assert_eq!(payment.status, CashInStatus::Validated);
        assert_eq!(payment.timeline.len(), snapshot_len);
    }

    #[test]
    fn test_seller_may_not_validate() {
        let mut payment = sample();
        let result = payment.apply(
            CashInAction::Validate,
            Actor::seller("sel-9", "Comercial Andina"),
            None,
        );

        assert!(matches!(result, Err(SettlementError::ActorNotAllowed { .. })));
        assert_eq!(payment.status, CashInStatus::PendingValidation);
    }

    #[test]
    fn test_expire_and_cancel_are_terminal_outcomes() {
        let mut a = sample();
        a.apply(CashInAction::Expire, Actor::system(), None).unwrap();
        assert_eq!(a.status, CashInStatus::Expired);

        let mut b = sample();
        b.apply(CashInAction::Cancel, Actor::system(), Some("buyer withdrew"))
            .unwrap();
        assert_eq!(b.status, CashInStatus::Canceled);
    }
}
