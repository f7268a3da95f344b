//! Core Kernel - Foundational types for the marketplace treasury engine
//!
//! This crate provides the building blocks shared by every domain module:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - The append-only audit timeline recorded on every state transition
//! - Liquidation period temporal types
//! - Port infrastructure for repository and gateway adapters

pub mod error;
pub mod identifiers;
pub mod money;
pub mod period;
pub mod ports;
pub mod timeline;

pub use error::CoreError;
pub use identifiers::{CashInId, CashOutId, CustomerId, EventId, SellerId, VoucherId};
pub use money::{Currency, Money, MoneyError, Rate};
pub use period::{LiquidationPeriod, PeriodError};
pub use ports::{DomainPort, PortError};
pub use timeline::{Actor, ActorRole, Timeline, TimelineEvent};
