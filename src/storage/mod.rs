//! Durable full-snapshot persistence for the account ledger.

pub mod json_backend;

pub use json_backend::JsonStore;

use crate::errors::BankError;
use crate::ledger::Ledger;

/// Outcome of a load, including anything worth surfacing to the user.
#[derive(Debug)]
pub struct LoadReport {
    pub ledger: Ledger,
    pub warnings: Vec<String>,
}

/// Trait that abstracts interaction with the persistence layer.
pub trait StorageBackend {
    /// Loads the persisted snapshot. A missing store yields a fresh empty
    /// ledger; an unreadable one fails with `CorruptStore`.
    fn load(&self) -> Result<Ledger, BankError>;

    /// Overwrites the entire store with the given snapshot, atomically.
    fn save(&self, ledger: &Ledger) -> Result<(), BankError>;

    /// Like `load`, but degrades a corrupt store to an empty registry with a
    /// warning instead of failing startup. Integrity drift between balances
    /// and histories is reported the same way.
    fn load_or_default(&self) -> Result<LoadReport, BankError> {
        let (ledger, mut warnings) = match self.load() {
            Ok(ledger) => (ledger, Vec::new()),
            Err(BankError::CorruptStore(reason)) => (
                Ledger::new(),
                vec![format!("could not load store ({reason}); starting fresh")],
            ),
            Err(err) => return Err(err),
        };
        warnings.extend(ledger.integrity_warnings());
        Ok(LoadReport { ledger, warnings })
    }
}
