//! Custom Test Assertions
//!
//! Domain-aware assertion helpers with more useful failure messages than
//! bare `assert_eq!`.

use std::fmt::Debug;

use core_kernel::{Money, Timeline};
use domain_settlement::CashOutPayment;

/// Asserts that two Money values match in amount and currency
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts the append-only audit chain over a whole timeline
///
/// Every event's `previous_status` must equal the `new_status` of the
/// event before it, and the last event must match `current`.
pub fn assert_timeline_chained<S>(timeline: &Timeline<S>, current: S)
where
    S: Copy + PartialEq + Debug,
{
    assert!(
        timeline.is_chained(),
        "Timeline chain broken: {:?}",
        timeline
            .events()
            .iter()
            .map(|e| (e.previous_status, e.new_status))
            .collect::<Vec<_>>()
    );
    assert_eq!(
        timeline.current_status(),
        current,
        "Timeline head {:?} does not match record status {:?}",
        timeline.current_status(),
        current
    );
}

/// Asserts the cash-out money conservation invariant
pub fn assert_conservation(payout: &CashOutPayment) {
    assert_eq!(
        payout.net_amount.amount(),
        payout.amount.amount() - payout.commission.amount(),
        "net_amount != amount - commission for payout {}",
        payout.id
    );
    payout
        .verify_conservation()
        .expect("conservation invariant violated");
}
