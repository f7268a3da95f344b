//! Invoicing DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, Money, SellerId};
use domain_invoicing::{CdrOutcome, VoucherDraft, VoucherType};

use super::ActorDto;

fn default_currency() -> Currency {
    Currency::PEN
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmitInvoiceRequest {
    pub seller_id: Uuid,
    #[validate(length(min = 1))]
    pub seller_name: String,
    pub voucher_type: VoucherType,
    #[validate(length(min = 1))]
    pub customer_name: String,
    pub customer_tax_id: Option<String>,
    #[validate(length(min = 1))]
    pub series: String,
    #[validate(length(min = 1))]
    pub number: String,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: Currency,
    #[validate(length(min = 1))]
    pub order_id: String,
}

impl EmitInvoiceRequest {
    pub fn into_draft(self) -> VoucherDraft {
        VoucherDraft {
            seller_id: SellerId::from(self.seller_id),
            seller_name: self.seller_name,
            voucher_type: self.voucher_type,
            customer_name: self.customer_name,
            customer_tax_id: self.customer_tax_id,
            series: self.series,
            number: self.number,
            amount: Money::new(self.amount, self.currency),
            order_id: self.order_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RetryInvoiceRequest {
    pub actor: Option<ActorDto>,
}

#[derive(Debug, Deserialize)]
pub struct RecordCdrRequest {
    pub outcome: CdrOutcome,
    pub reason: Option<String>,
    /// Raw confirmation receipt, stored verbatim for audit
    pub receipt: Option<serde_json::Value>,
    pub actor: Option<ActorDto>,
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesParams {
    /// Restricts the listing to one seller; admins omit it to see all
    pub seller_id: Option<Uuid>,
    pub search: Option<String>,
}
