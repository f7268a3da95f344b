//! Test Data Fixtures
//!
//! Pre-built entities with sensible defaults so tests only spell out what
//! they actually care about.

use chrono::Utc;
use rust_decimal_macros::dec;

use core_kernel::{
    Actor, Currency, CustomerId, LiquidationPeriod, Money, SellerId,
};
use domain_invoicing::{Voucher, VoucherDraft, VoucherStatus, VoucherType};
use domain_settlement::{
    CashInPayment, CashOutPayment, OrderHierarchy, PayeeDetails, PayerDetails,
};

/// Common money values
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn pen(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::PEN)
    }

    pub fn order_total() -> Money {
        Money::new(dec!(1250.80), Currency::PEN)
    }

    pub fn payout_gross() -> Money {
        Money::new(dec!(1000.00), Currency::PEN)
    }

    pub fn payout_commission() -> Money {
        Money::new(dec!(80.00), Currency::PEN)
    }
}

/// Common actors
pub struct ActorFixtures;

impl ActorFixtures {
    pub fn back_office() -> Actor {
        Actor::admin("adm-1", "Marta Salas")
    }

    pub fn seller(id: SellerId) -> Actor {
        Actor::seller(id.to_string(), "Comercial Andina")
    }
}

/// A voucher draft ready for emission
pub fn voucher_draft(seller_id: SellerId) -> VoucherDraft {
    VoucherDraft {
        seller_id,
        seller_name: "Comercial Andina".to_string(),
        voucher_type: VoucherType::Factura,
        customer_name: "ACME".to_string(),
        customer_tax_id: Some("20100066603".to_string()),
        series: "F001".to_string(),
        number: "00000214".to_string(),
        amount: MoneyFixtures::order_total(),
        order_id: "ORD-9410".to_string(),
    }
}

/// A voucher walked into the given status through legal transitions
pub fn voucher_in_status(seller_id: SellerId, status: VoucherStatus) -> Voucher {
    let mut voucher = Voucher::draft(voucher_draft(seller_id), Actor::system())
        .expect("fixture draft is valid");

    if status != VoucherStatus::Draft {
        voucher
            .record_transition(VoucherStatus::SentWaitCdr, Actor::system(), "submitted", None)
            .expect("legal transition");
    }
    if matches!(
        status,
        VoucherStatus::Accepted | VoucherStatus::Observed | VoucherStatus::Rejected
    ) {
        voucher
            .record_transition(status, Actor::system(), "cdr received", None)
            .expect("legal transition");
    }
    voucher
}

/// A pending buyer payment
pub fn pending_cash_in() -> CashInPayment {
    CashInPayment::pending(
        "ORD-9410",
        MoneyFixtures::order_total(),
        PayerDetails {
            id: CustomerId::new_v7(),
            name: "Rosa Quispe".to_string(),
            tax_id: Some("10456789012".to_string()),
        },
        "https://files.example/proof-9410.pdf",
        OrderHierarchy {
            company: "Marketplace SAC".to_string(),
            seller: "Comercial Andina".to_string(),
            customer: "Rosa Quispe".to_string(),
        },
    )
    .expect("fixture cash-in is valid")
}

/// A payout scheduled in a two-week window starting now
pub fn scheduled_cash_out(seller_id: SellerId) -> CashOutPayment {
    CashOutPayment::scheduled(
        "BATCH-2026-02-A",
        MoneyFixtures::payout_gross(),
        MoneyFixtures::payout_commission(),
        PayeeDetails {
            id: seller_id,
            name: "Comercial Andina".to_string(),
            bank_name: "BCP".to_string(),
            account_number: "19412345678012".to_string(),
            cci: Some("00219411234567801254".to_string()),
        },
        LiquidationPeriod::of_days(Utc::now(), 14).expect("fixture window is valid"),
    )
    .expect("fixture cash-out is valid")
}
