//! Settlement DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, CustomerId, LiquidationPeriod, Money, SellerId};
use domain_settlement::{
    CashInAction, CashInPayment, CashOutAction, CashOutPayment, DisputeOutcome, OrderHierarchy,
    PayeeDetails, PayerDetails, SettlementError,
};

use super::ActorDto;

fn default_currency() -> Currency {
    Currency::PEN
}

#[derive(Debug, Deserialize)]
pub struct OrderHierarchyDto {
    pub company: String,
    pub seller: String,
    pub customer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCashInRequest {
    /// The order this payment settles
    #[validate(length(min = 1))]
    pub reference_id: String,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: Currency,
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub customer_name: String,
    pub customer_tax_id: Option<String>,
    #[validate(length(min = 1))]
    pub voucher_url: String,
    pub order_hierarchy: OrderHierarchyDto,
}

impl CreateCashInRequest {
    pub fn into_payment(self) -> Result<CashInPayment, SettlementError> {
        CashInPayment::pending(
            self.reference_id,
            Money::new(self.amount, self.currency),
            PayerDetails {
                id: self
                    .customer_id
                    .map(CustomerId::from)
                    .unwrap_or_else(CustomerId::new_v7),
                name: self.customer_name,
                tax_id: self.customer_tax_id,
            },
            self.voucher_url,
            OrderHierarchy {
                company: self.order_hierarchy.company,
                seller: self.order_hierarchy.seller,
                customer: self.order_hierarchy.customer,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct CashInActionRequest {
    pub action: CashInAction,
    pub reason: Option<String>,
    pub actor: Option<ActorDto>,
}

#[derive(Debug, Deserialize)]
pub struct PayeeDto {
    pub id: Uuid,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub cci: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCashOutRequest {
    /// The settlement batch this payout belongs to
    #[validate(length(min = 1))]
    pub reference_id: String,
    pub amount: Decimal,
    pub commission: Decimal,
    #[serde(default = "default_currency")]
    pub currency: Currency,
    pub seller: PayeeDto,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl CreateCashOutRequest {
    pub fn into_payment(self) -> Result<CashOutPayment, SettlementError> {
        let period = LiquidationPeriod::new(self.period_start, self.period_end)?;
        CashOutPayment::scheduled(
            self.reference_id,
            Money::new(self.amount, self.currency),
            Money::new(self.commission, self.currency),
            PayeeDetails {
                id: SellerId::from(self.seller.id),
                name: self.seller.name,
                bank_name: self.seller.bank_name,
                account_number: self.seller.account_number,
                cci: self.seller.cci,
            },
            period,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct CashOutActionRequest {
    pub action: CashOutAction,
    pub reason: Option<String>,
    pub actor: Option<ActorDto>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DisputeRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    /// The disputing seller; disputes are always seller-initiated
    pub actor: ActorDto,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResolveDisputeRequest {
    pub outcome: DisputeOutcome,
    #[validate(length(min = 1))]
    pub reason: String,
    pub actor: Option<ActorDto>,
}

#[derive(Debug, Deserialize)]
pub struct ListCashOutParams {
    pub seller_id: Option<Uuid>,
}
