//! In-Memory Keyed Storage
//!
//! Process-lifetime repositories implementing the domain store ports.
//! Records live in id-keyed maps with secondary indexes on seller and
//! status, so scoped queries never scan the whole collection. Updates go
//! through a compare-and-swap on the record's current status, which is
//! what serializes concurrent transitions on one record; operations on
//! different records proceed in parallel under the shared lock's readers.

pub mod cash_in;
pub mod cash_out;
pub mod vouchers;

pub use cash_in::InMemoryCashInStore;
pub use cash_out::InMemoryCashOutStore;
pub use vouchers::InMemoryVoucherLedger;
