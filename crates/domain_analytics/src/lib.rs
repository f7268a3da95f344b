//! Analytics Domain
//!
//! Pure read-side projections over the voucher ledger and the settlement
//! collections. Everything here is recomputed on demand from persisted
//! state, holds no source of truth of its own, and is never written back.

pub mod kpi;

pub use kpi::{
    invoice_kpis, net_monthly_profit, settlement_kpis, top_payers, InvoiceKpis, SettlementKpis,
    TopPayer,
};
