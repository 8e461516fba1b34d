//! Account ledger domain models and the transaction observer contract.

pub mod account;
pub mod interest;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod observer;
pub mod transaction;

pub use account::{Account, AccountId, AccountKind};
pub use interest::interest_rate;
pub use ledger::Ledger;
pub use observer::{LogEntry, TransactionLog, TransactionObserver};
pub use transaction::{Transaction, TransactionKind};
