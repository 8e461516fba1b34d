use std::cell::RefCell;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::account::AccountId;
use super::transaction::{Transaction, TransactionKind};

/// Receives a callback synchronously after each mutation commits in memory,
/// before the mutating call returns. Implementations must not fail the
/// originating operation.
pub trait TransactionObserver {
    fn on_transaction(&self, account_id: &AccountId, transaction: &Transaction);
}

/// Immutable record kept by the transaction log for every notification.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Append-only audit log. Notifications arrive in commit order; a failure to
/// append is recorded as a warning and never rolls back the mutation.
#[derive(Debug, Default)]
pub struct TransactionLog {
    entries: RefCell<Vec<LogEntry>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl TransactionObserver for TransactionLog {
    fn on_transaction(&self, account_id: &AccountId, transaction: &Transaction) {
        tracing::info!(
            account = %account_id,
            kind = transaction.kind.label(),
            amount = %transaction.amount,
            "transaction committed"
        );
        match self.entries.try_borrow_mut() {
            Ok(mut entries) => entries.push(LogEntry {
                account_id: account_id.clone(),
                kind: transaction.kind,
                amount: transaction.amount,
                timestamp: transaction.timestamp,
            }),
            Err(_) => {
                tracing::warn!(account = %account_id, "transaction log busy, entry dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::{Account, AccountKind};
    use rust_decimal_macros::dec;
    use std::rc::Rc;

    #[test]
    fn log_receives_notifications_in_commit_order() {
        let log = Rc::new(TransactionLog::new());
        let mut account = Account::new(AccountId::new("AC-0001"), "Ada", AccountKind::Checking);
        account.attach(log.clone());

        account.deposit(dec!(100)).unwrap();
        account.withdraw(dec!(40)).unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, TransactionKind::Deposit);
        assert_eq!(entries[0].amount, dec!(100));
        assert_eq!(entries[1].kind, TransactionKind::Withdraw);
        assert_eq!(entries[1].amount, dec!(40));
    }

    #[test]
    fn failed_operations_are_not_logged() {
        let log = Rc::new(TransactionLog::new());
        let mut account = Account::new(AccountId::new("AC-0001"), "Ada", AccountKind::Savings);
        account.attach(log.clone());

        assert!(account.withdraw(dec!(10)).is_err());
        assert!(log.is_empty());
    }
}
