use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::AccountId;

/// Error type that captures the failure modes of the command engine and store.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("invalid amount `{0}`: must be greater than zero")]
    InvalidAmount(Decimal),
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
    #[error("account `{0}` not found")]
    AccountNotFound(AccountId),
    #[error("cannot undo: {0}")]
    UndoInvalid(String),
    #[error("store is corrupt: {0}")]
    CorruptStore(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
