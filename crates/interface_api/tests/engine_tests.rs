//! Engine wiring tests
//!
//! Exercises the assembled AppState below the HTTP layer: services and
//! stores wired exactly as the server builds them, driven with domain
//! fixtures instead of JSON.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{ports::QueryScope, SellerId, VoucherId};
use domain_invoicing::{VoucherLedger, VoucherStatus};
use domain_settlement::{
    CashInAction, CashInStore, CashOutAction, CashOutStatus, CashOutStore, DisputeOutcome,
};
use interface_api::{config::ApiConfig, AppState};
use test_utils::{
    assert_conservation, assert_money_eq, assert_timeline_chained, pending_cash_in,
    scheduled_cash_out, voucher_draft, voucher_in_status, ActorFixtures, MoneyFixtures,
    StubGateway, StubGatewayMode,
};

fn engine() -> (Arc<StubGateway>, AppState) {
    let gateway = Arc::new(StubGateway::succeeding());
    let state = AppState::new(gateway.clone(), ApiConfig::default());
    (gateway, state)
}

#[tokio::test]
async fn emission_lands_in_the_shared_ledger() {
    let (_gateway, state) = engine();
    let seller_id = SellerId::new_v7();

    let voucher = state
        .lifecycle
        .emit(voucher_draft(seller_id), ActorFixtures::seller(seller_id))
        .await
        .unwrap();

    assert_timeline_chained(&voucher.history, VoucherStatus::SentWaitCdr);
    assert_money_eq(&voucher.amount, &MoneyFixtures::order_total());

    let scoped = state
        .ledger
        .list(QueryScope::Seller(seller_id), None)
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].id, voucher.id);
}

#[tokio::test]
async fn seeded_rejected_voucher_retries_through_the_lifecycle() {
    let (gateway, state) = engine();
    let seller_id = SellerId::new_v7();

    let rejected = voucher_in_status(seller_id, VoucherStatus::Rejected);
    state.ledger.append(rejected.clone()).await.unwrap();

    // First attempt times out; the trail records it and the status holds
    gateway.set_mode(StubGatewayMode::FailTimeout);
    state
        .lifecycle
        .retry(rejected.id, ActorFixtures::back_office())
        .await
        .unwrap_err();

    gateway.set_mode(StubGatewayMode::Succeed);
    let retried = state
        .lifecycle
        .retry(rejected.id, ActorFixtures::back_office())
        .await
        .unwrap();

    assert_timeline_chained(&retried.history, VoucherStatus::SentWaitCdr);
    assert_eq!(retried.history.len(), rejected.history.len() + 2);
}

#[tokio::test]
async fn unknown_voucher_stays_unknown_through_the_wiring() {
    let (_gateway, state) = engine();
    let result = state
        .lifecycle
        .retry(VoucherId::new_v7(), ActorFixtures::back_office())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn cash_in_decision_flows_through_service_and_store() {
    let (_gateway, state) = engine();

    let payment = state
        .settlement
        .register_cash_in(pending_cash_in())
        .await
        .unwrap();

    let decided = state
        .settlement
        .apply_cash_in(
            payment.id,
            CashInAction::Validate,
            ActorFixtures::back_office(),
            None,
        )
        .await
        .unwrap();

    assert_timeline_chained(&decided.timeline, decided.status);
    let stored = state.cash_in.get(payment.id).await.unwrap();
    assert_eq!(stored.status, decided.status);
}

#[tokio::test]
async fn payout_keeps_conservation_through_the_full_lifecycle() {
    let (_gateway, state) = engine();
    let seller_id = SellerId::new_v7();

    let payout = state
        .settlement
        .register_cash_out(scheduled_cash_out(seller_id))
        .await
        .unwrap();
    assert_conservation(&payout);
    assert_money_eq(&payout.net_amount, &MoneyFixtures::pen(dec!(920.00)));

    state
        .settlement
        .advance_cash_out(payout.id, CashOutAction::Pay, ActorFixtures::back_office(), None)
        .await
        .unwrap();
    let disputed = state
        .settlement
        .dispute_cash_out(
            payout.id,
            ActorFixtures::seller(seller_id),
            "monto no coincide",
        )
        .await
        .unwrap();
    assert_eq!(disputed.status, CashOutStatus::Disputed);
    assert_conservation(&disputed);

    let resolved = state
        .settlement
        .resolve_cash_out_dispute(
            payout.id,
            DisputeOutcome::Paid,
            ActorFixtures::back_office(),
            "montos verificados contra el banco",
        )
        .await
        .unwrap();

    assert_eq!(resolved.status, CashOutStatus::Paid);
    assert_conservation(&resolved);
    assert_timeline_chained(&resolved.timeline, CashOutStatus::Paid);

    let mine = state.cash_out.by_seller(seller_id).await.unwrap();
    assert_eq!(mine.len(), 1);
}
