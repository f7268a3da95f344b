//! Cash-out aggregate
//!
//! A cash-out record tracks money leaving the marketplace toward a seller,
//! net of commission. Records are created inside a liquidation window and
//! move `Scheduled -> Processing -> Paid | Failed`; a paid record can be
//! disputed by the seller and a dispute is resolved manually back into
//! Paid or Failed.
//!
//! The money-conservation invariant `net_amount = amount - commission` is
//! checked at creation and again before every transition into Paid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    Actor, ActorRole, CashOutId, LiquidationPeriod, Money, SellerId, Timeline, TimelineEvent,
};

use crate::error::SettlementError;

/// Cash-out status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashOutStatus {
    /// Created inside a liquidation window, not yet picked up
    Scheduled,
    /// Disbursement in flight
    Processing,
    /// Money delivered to the seller (terminal unless disputed)
    Paid,
    /// Disbursement failed; eligible for reschedule
    Failed,
    /// Seller contests a paid record; requires manual resolution
    Disputed,
}

impl CashOutStatus {
    /// Checks if a transition is valid
    pub fn can_transition_to(&self, target: CashOutStatus) -> bool {
        use CashOutStatus::*;
        matches!(
            (self, target),
            (Scheduled, Processing)
                | (Scheduled, Paid)
                | (Scheduled, Failed)
                | (Processing, Paid)
                | (Processing, Failed)
                | (Failed, Scheduled)
                | (Paid, Disputed)
                | (Disputed, Paid)
                | (Disputed, Failed)
        )
    }

    /// Open records still count toward the payout backlog
    pub fn is_open(&self) -> bool {
        matches!(self, CashOutStatus::Scheduled | CashOutStatus::Processing)
    }
}

impl fmt::Display for CashOutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashOutStatus::Scheduled => write!(f, "SCHEDULED"),
            CashOutStatus::Processing => write!(f, "PROCESSING"),
            CashOutStatus::Paid => write!(f, "PAID"),
            CashOutStatus::Failed => write!(f, "FAILED"),
            CashOutStatus::Disputed => write!(f, "DISPUTED"),
        }
    }
}

/// Actions that drive a payout forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashOutAction {
    /// Pick the payout up for disbursement
    Process,
    Pay,
    Fail,
    /// Put a failed payout back into a (new) liquidation window
    Reschedule,
}

impl CashOutAction {
    pub fn name(&self) -> &'static str {
        match self {
            CashOutAction::Process => "PROCESS",
            CashOutAction::Pay => "PAY",
            CashOutAction::Fail => "FAIL",
            CashOutAction::Reschedule => "RESCHEDULE",
        }
    }
}

/// How `Reschedule` re-enters the Scheduled state
///
/// `InPlace` mutates the failed record back to Scheduled in the next
/// liquidation window. `NewRecord` keeps the failed record as-is for audit
/// continuity and emits a fresh Scheduled record referencing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReschedulePolicy {
    InPlace,
    NewRecord,
}

/// Resolution of a disputed payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeOutcome {
    Paid,
    Failed,
}

/// The seller the money goes to, with disbursement coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeDetails {
    pub id: SellerId,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    /// Interbank account code, when the transfer crosses banks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cci: Option<String>,
}

/// Money paid from the marketplace out to a seller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashOutPayment {
    pub id: CashOutId,
    /// The settlement batch this payout belongs to
    pub reference_id: String,
    pub amount: Money,
    pub seller: PayeeDetails,
    pub commission: Money,
    pub net_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disbursement_voucher_url: Option<String>,
    pub liquidation_period: LiquidationPeriod,
    pub status: CashOutStatus,
    pub timeline: Timeline<CashOutStatus>,
    /// Set when this record replaces a failed payout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescheduled_from: Option<CashOutId>,
    pub created_at: DateTime<Utc>,
}

impl CashOutPayment {
    /// Schedules a payout inside a liquidation window
    ///
    /// Computes `net_amount` from amount and commission, which makes the
    /// conservation invariant hold by construction.
    pub fn scheduled(
        reference_id: impl Into<String>,
        amount: Money,
        commission: Money,
        seller: PayeeDetails,
        liquidation_period: LiquidationPeriod,
    ) -> Result<Self, SettlementError> {
        if !amount.is_positive() {
            return Err(SettlementError::NonPositiveAmount);
        }
        if commission.is_negative() {
            return Err(SettlementError::Money(
                core_kernel::MoneyError::InvalidAmount("negative commission".to_string()),
            ));
        }
        let net_amount = amount.checked_sub(&commission)?;
        if net_amount.is_negative() {
            return Err(SettlementError::CommissionExceedsAmount {
                commission: commission.amount(),
                amount: amount.amount(),
            });
        }

        let timeline = Timeline::start(TimelineEvent::initial(
            CashOutStatus::Scheduled,
            Actor::system(),
            "payout scheduled for liquidation window",
        ))?;

        Ok(Self {
            id: CashOutId::new_v7(),
            reference_id: reference_id.into(),
            amount,
            seller,
            commission,
            net_amount,
            disbursement_voucher_url: None,
            liquidation_period,
            status: CashOutStatus::Scheduled,
            timeline,
            rescheduled_from: None,
            created_at: Utc::now(),
        })
    }

    /// Verifies `net_amount = amount - commission` in one currency
    pub fn verify_conservation(&self) -> Result<(), SettlementError> {
        let expected = self.amount.checked_sub(&self.commission)?;
        if expected != self.net_amount {
            return Err(SettlementError::ConservationViolation {
                amount: self.amount.amount(),
                commission: self.commission.amount(),
                net: self.net_amount.amount(),
            });
        }
        Ok(())
    }

    /// Attaches the proof of disbursement
    pub fn attach_disbursement_voucher(&mut self, url: impl Into<String>) {
        self.disbursement_voucher_url = Some(url.into());
    }

    /// Drives the payout forward
    ///
    /// Returns the replacement record when the action is `Reschedule` under
    /// `ReschedulePolicy::NewRecord`; `None` otherwise. Transitions into
    /// Paid fail closed if money conservation does not hold.
    pub fn advance(
        &mut self,
        action: CashOutAction,
        actor: Actor,
        reason: Option<&str>,
        policy: ReschedulePolicy,
    ) -> Result<Option<CashOutPayment>, SettlementError> {
        match action {
            CashOutAction::Process => {
                self.transition(CashOutStatus::Processing, actor, reason, "disbursement started")?;
                Ok(None)
            }
            CashOutAction::Pay => {
                self.check_transition(CashOutStatus::Paid)?;
                self.verify_conservation()?;
                self.transition(CashOutStatus::Paid, actor, reason, "disbursement completed")?;
                Ok(None)
            }
            CashOutAction::Fail => {
                self.transition(CashOutStatus::Failed, actor, reason, "disbursement failed")?;
                Ok(None)
            }
            CashOutAction::Reschedule => self.reschedule(actor, reason, policy),
        }
    }

    /// Seller contests a paid payout
    ///
    /// Does not itself resolve anything; the record stays Disputed until a
    /// manual `resolve_dispute` call.
    pub fn dispute(&mut self, actor: Actor, reason: &str) -> Result<(), SettlementError> {
        if reason.trim().is_empty() {
            return Err(SettlementError::MissingReason("DISPUTE"));
        }
        if actor.role != ActorRole::Seller {
            return Err(SettlementError::ActorNotAllowed {
                action: "DISPUTE".to_string(),
                role: actor.role.to_string(),
            });
        }
        self.transition(CashOutStatus::Disputed, actor, Some(reason), "")?;
        Ok(())
    }

    /// Manual resolution of a disputed payout
    ///
    /// Re-enters Paid (conservation re-checked) or Failed. Resolution is a
    /// back-office decision, so a seller actor may not perform it.
    pub fn resolve_dispute(
        &mut self,
        outcome: DisputeOutcome,
        actor: Actor,
        reason: &str,
    ) -> Result<(), SettlementError> {
        if reason.trim().is_empty() {
            return Err(SettlementError::MissingReason("RESOLVE_DISPUTE"));
        }
        if actor.role == ActorRole::Seller {
            return Err(SettlementError::ActorNotAllowed {
                action: "RESOLVE_DISPUTE".to_string(),
                role: actor.role.to_string(),
            });
        }

        let target = match outcome {
            DisputeOutcome::Paid => CashOutStatus::Paid,
            DisputeOutcome::Failed => CashOutStatus::Failed,
        };
        self.check_transition(target)?;
        if target == CashOutStatus::Paid {
            self.verify_conservation()?;
        }
        self.transition(target, actor, Some(reason), "")?;
        Ok(())
    }

    fn reschedule(
        &mut self,
        actor: Actor,
        reason: Option<&str>,
        policy: ReschedulePolicy,
    ) -> Result<Option<CashOutPayment>, SettlementError> {
        self.check_transition(CashOutStatus::Scheduled)?;

        match policy {
            ReschedulePolicy::InPlace => {
                self.liquidation_period = self.liquidation_period.next();
                self.transition(
                    CashOutStatus::Scheduled,
                    actor,
                    reason,
                    "payout rescheduled into next liquidation window",
                )?;
                Ok(None)
            }
            ReschedulePolicy::NewRecord => {
                let mut replacement = CashOutPayment::scheduled(
                    self.reference_id.clone(),
                    self.amount,
                    self.commission,
                    self.seller.clone(),
                    self.liquidation_period.next(),
                )?;
                replacement.rescheduled_from = Some(self.id);

                // The failed record keeps its status; the handover is audited
                // on both sides.
                let note = format!("payout rescheduled as {}", replacement.id);
                self.timeline.record(TimelineEvent::transition(
                    self.status,
                    self.status,
                    actor,
                    reason.filter(|r| !r.trim().is_empty()).unwrap_or(&note),
                ))?;
                Ok(Some(replacement))
            }
        }
    }

    fn check_transition(&self, target: CashOutStatus) -> Result<(), SettlementError> {
        if !self.status.can_transition_to(target) {
            return Err(SettlementError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    fn transition(
        &mut self,
        target: CashOutStatus,
        actor: Actor,
        reason: Option<&str>,
        default_reason: &str,
    ) -> Result<(), SettlementError> {
        self.check_transition(target)?;
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(default_reason)
            .to_string();
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

    fn window() -> LiquidationPeriod {
        LiquidationPeriod::of_days(Utc::now(), 14).unwrap()
    }

    fn payee() -> PayeeDetails {
        PayeeDetails {
            id: SellerId::new_v7(),
            name: "Comercial Andina".to_string(),
            bank_name: "BCP".to_string(),
            account_number: "19412345678012".to_string(),
            cci: Some("00219411234567801254".to_string()),
        }
    }

    fn scheduled() -> CashOutPayment {
        CashOutPayment::scheduled(
            "BATCH-2026-02-A",
            Money::new(dec!(1000.00), Currency::PEN),
            Money::new(dec!(80.00), Currency::PEN),
            payee(),
            window(),
        )
        .unwrap()
    }

    #[test]
    fn test_net_amount_holds_at_creation() {
        let payout = scheduled();
        assert_eq!(payout.net_amount.amount(), dec!(920.00));
        payout.verify_conservation().unwrap();
        assert_eq!(payout.timeline.len(), 1);
    }

    #[test]
    fn test_commission_may_not_exceed_amount() {
        let result = CashOutPayment::scheduled(
            "BATCH-X",
            Money::new(dec!(100.00), Currency::PEN),
            Money::new(dec!(150.00), Currency::PEN),
            payee(),
            window(),
        );
        assert!(matches!(
            result,
            Err(SettlementError::CommissionExceedsAmount { .. })
        ));
    }

    #[test]
    fn test_cross_currency_commission_is_rejected() {
        let result = CashOutPayment::scheduled(
            "BATCH-X",
            Money::new(dec!(100.00), Currency::PEN),
            Money::new(dec!(8.00), Currency::USD),
            payee(),
            window(),
        );
        assert!(matches!(result, Err(SettlementError::Money(_))));
    }

    #[test]
    fn test_full_happy_path_to_paid() {
        let mut payout = scheduled();

        payout
            .advance(CashOutAction::Process, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();
        assert_eq!(payout.status, CashOutStatus::Processing);

        payout
            .advance(CashOutAction::Pay, Actor::admin("adm-1", "Marta"), None, ReschedulePolicy::InPlace)
            .unwrap();
        assert_eq!(payout.status, CashOutStatus::Paid);
        assert_eq!(payout.timeline.len(), 3);
        assert!(payout.timeline.is_chained());
    }

    #[test]
    fn test_pay_straight_from_scheduled_is_legal() {
        let mut payout = scheduled();
        payout
            .advance(CashOutAction::Pay, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();
        assert_eq!(payout.status, CashOutStatus::Paid);
    }

    #[test]
    fn test_pay_fails_closed_on_conservation_violation() {
        let mut payout = scheduled();
        // Corrupt the stored net amount the way a buggy migration would
        payout.net_amount = Money::new(dec!(999.99), Currency::PEN);

        let result = payout.advance(
            CashOutAction::Pay,
            Actor::system(),
            None,
            ReschedulePolicy::InPlace,
        );

        assert!(matches!(
            result,
            Err(SettlementError::ConservationViolation { .. })
        ));
        // No transition happened
        assert_eq!(payout.status, CashOutStatus::Scheduled);
        assert_eq!(payout.timeline.len(), 1);
    }

    #[test]
    fn test_reschedule_is_only_legal_from_failed() {
        let mut payout = scheduled();
        let result = payout.advance(
            CashOutAction::Reschedule,
            Actor::system(),
            None,
            ReschedulePolicy::InPlace,
        );
        assert!(matches!(
            result,
            Err(SettlementError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_reschedule_in_place_moves_the_window() {
        let mut payout = scheduled();
        let original_window = payout.liquidation_period;
        payout
            .advance(CashOutAction::Fail, Actor::system(), Some("cuenta invalida"), ReschedulePolicy::InPlace)
            .unwrap();

        let replacement = payout
            .advance(CashOutAction::Reschedule, Actor::admin("adm-1", "Marta"), None, ReschedulePolicy::InPlace)
            .unwrap();

        assert!(replacement.is_none());
        assert_eq!(payout.status, CashOutStatus::Scheduled);
        assert_eq!(payout.liquidation_period.start, original_window.end);
    }

    #[test]
    fn test_reschedule_new_record_links_back_to_the_failed_payout() {
        let mut payout = scheduled();
        payout
            .advance(CashOutAction::Fail, Actor::system(), None, ReschedulePolicy::NewRecord)
            .unwrap();
        let events_before = payout.timeline.len();

        let replacement = payout
            .advance(CashOutAction::Reschedule, Actor::admin("adm-1", "Marta"), None, ReschedulePolicy::NewRecord)
            .unwrap()
            .expect("a replacement record");

        // Original stays failed for audit; replacement starts fresh
        assert_eq!(payout.status, CashOutStatus::Failed);
        assert_eq!(payout.timeline.len(), events_before + 1);
        assert_eq!(replacement.status, CashOutStatus::Scheduled);
        assert_eq!(replacement.rescheduled_from, Some(payout.id));
        assert_eq!(replacement.net_amount, payout.net_amount);
    }

    #[test]
    fn test_dispute_only_from_paid_with_reason() {
        let mut payout = scheduled();
        payout
            .advance(CashOutAction::Pay, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();

        let seller = Actor::seller("sel-1", "Comercial Andina");
        assert!(matches!(
            payout.dispute(seller.clone(), "  "),
            Err(SettlementError::MissingReason("DISPUTE"))
        ));

        payout.dispute(seller, "monto no coincide").unwrap();
        assert_eq!(payout.status, CashOutStatus::Disputed);

        let last = payout.timeline.last();
        assert_eq!(last.previous_status, Some(CashOutStatus::Paid));
        assert_eq!(last.new_status, CashOutStatus::Disputed);
        assert_eq!(last.reason, "monto no coincide");
    }

    #[test]
    fn test_dispute_from_scheduled_is_illegal() {
        let mut payout = scheduled();
        let result = payout.dispute(Actor::seller("sel-1", "Comercial Andina"), "temprano");
        assert!(matches!(
            result,
            Err(SettlementError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_only_the_seller_can_dispute() {
        let mut payout = scheduled();
        payout
            .advance(CashOutAction::Pay, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();

        let result = payout.dispute(Actor::admin("adm-1", "Marta"), "monto no coincide");
        assert!(matches!(result, Err(SettlementError::ActorNotAllowed { .. })));
    }

    #[test]
    fn test_dispute_resolution_re_enters_paid_or_failed() {
        let mut payout = scheduled();
        payout
            .advance(CashOutAction::Pay, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();
        payout
            .dispute(Actor::seller("sel-1", "Comercial Andina"), "monto no coincide")
            .unwrap();

        payout
            .resolve_dispute(
                DisputeOutcome::Paid,
                Actor::admin("adm-1", "Marta"),
                "montos verificados contra el banco",
            )
            .unwrap();
        assert_eq!(payout.status, CashOutStatus::Paid);
        assert!(payout.timeline.is_chained());
    }

    #[test]
    fn test_resolution_by_seller_is_not_allowed() {
        let mut payout = scheduled();
        payout
            .advance(CashOutAction::Pay, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();
        payout
            .dispute(Actor::seller("sel-1", "Comercial Andina"), "monto no coincide")
            .unwrap();

        let result = payout.resolve_dispute(
            DisputeOutcome::Failed,
            Actor::seller("sel-1", "Comercial Andina"),
            "quiero que falle",
        );
        assert!(matches!(result, Err(SettlementError::ActorNotAllowed { .. })));
    }

    #[test]
    fn test_conservation_holds_after_every_transition() {
        let mut payout = scheduled();
        payout
            .advance(CashOutAction::Process, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();
        payout.verify_conservation().unwrap();
        payout
            .advance(CashOutAction::Pay, Actor::system(), None, ReschedulePolicy::InPlace)
            .unwrap();
        payout.verify_conservation().unwrap();
        assert_eq!(
            payout.net_amount.amount(),
            payout.amount.amount() - payout.commission.amount()
        );
    }
}
