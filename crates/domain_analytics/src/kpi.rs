//! KPI projections
//!
//! Money totals are computed for one reporting currency at a time: the
//! marketplace keeps PEN and USD books separate and no conversion exists,
//! so records denominated in another currency contribute to counts but
//! never to totals.

use std::collections::HashMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::{Currency, Money, Rate};
use domain_invoicing::{Voucher, VoucherStatus};
use domain_settlement::{CashInPayment, CashInStatus, CashOutPayment, CashOutStatus};

/// Invoice-side dashboard figures
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceKpis {
    /// Sum of accepted vouchers in the reporting currency
    pub total_accepted: Money,
    pub counts_by_status: HashMap<VoucherStatus, usize>,
    /// accepted / total, zero when the ledger is empty
    pub success_rate: Decimal,
}

/// Computes the invoice KPIs over the current ledger contents
pub fn invoice_kpis(vouchers: &[Voucher], currency: Currency) -> InvoiceKpis {
    let mut counts_by_status: HashMap<VoucherStatus, usize> = HashMap::new();
    let mut total_accepted = Money::zero(currency);
    let mut accepted = 0usize;

    for voucher in vouchers {
        *counts_by_status.entry(voucher.status).or_default() += 1;
        if voucher.status == VoucherStatus::Accepted {
            accepted += 1;
            if voucher.amount.currency() == currency {
                total_accepted = total_accepted + voucher.amount;
            }
        }
    }

    let success_rate = if vouchers.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(accepted as u64) / Decimal::from(vouchers.len() as u64)
    };

    InvoiceKpis {
        total_accepted,
        counts_by_status,
        success_rate,
    }
}

/// A customer ranked by accepted invoice volume
#[derive(Debug, Clone, Serialize)]
pub struct TopPayer {
    pub customer_name: String,
    pub total: Money,
    pub vouchers: usize,
}

/// Ranks customers by the total amount of their accepted vouchers
///
/// Customers are keyed by tax id when present, otherwise by name.
pub fn top_payers(vouchers: &[Voucher], currency: Currency, limit: usize) -> Vec<TopPayer> {
    let mut by_customer: HashMap<String, TopPayer> = HashMap::new();

    for voucher in vouchers {
        if voucher.status != VoucherStatus::Accepted || voucher.amount.currency() != currency {
            continue;
        }
        let key = voucher
            .customer_tax_id
            .clone()
            .unwrap_or_else(|| voucher.customer_name.clone());

        let entry = by_customer.entry(key).or_insert_with(|| TopPayer {
            customer_name: voucher.customer_name.clone(),
            total: Money::zero(currency),
            vouchers: 0,
        });
        entry.total = entry.total + voucher.amount;
        entry.vouchers += 1;
    }

    let mut ranking: Vec<TopPayer> = by_customer.into_values().collect();
    ranking.sort_by(|a, b| b.total.amount().cmp(&a.total.amount()));
    ranking.truncate(limit);
    ranking
}

/// Settlement-side dashboard figures
#[derive(Debug, Clone, Serialize)]
pub struct SettlementKpis {
    /// Buyer payments awaiting a back-office decision
    pub pending_cash_in: usize,
    /// Payouts still scheduled or in flight
    pub open_cash_out: usize,
    /// Paid payouts the seller is contesting
    pub disputed_cash_out: usize,
}

/// Computes the settlement KPIs over the current collections
pub fn settlement_kpis(cash_in: &[CashInPayment], cash_out: &[CashOutPayment]) -> SettlementKpis {
    SettlementKpis {
        pending_cash_in: cash_in
            .iter()
            .filter(|p| p.status == CashInStatus::PendingValidation)
            .count(),
        open_cash_out: cash_out.iter().filter(|p| p.status.is_open()).count(),
        disputed_cash_out: cash_out
            .iter()
            .filter(|p| p.status == CashOutStatus::Disputed)
            .count(),
    }
}

/// Net profit for one calendar month: validated revenue times the
/// marketplace commission rate
pub fn net_monthly_profit(
    cash_in: &[CashInPayment],
    currency: Currency,
    year: i32,
    month: u32,
    commission_rate: Rate,
) -> Money {
    let revenue = cash_in
        .iter()
        .filter(|p| p.status == CashInStatus::Validated)
        .filter(|p| p.amount.currency() == currency)
        .filter(|p| p.created_at.year() == year && p.created_at.month() == month)
        .fold(Money::zero(currency), |acc, p| acc + p.amount);

    commission_rate.apply(&revenue).round_to_currency()
}
