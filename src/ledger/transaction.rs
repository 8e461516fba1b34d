use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::AccountId;

/// Classifies a ledger entry. Transfer legs carry the counterparty account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    TransferOut,
    TransferIn,
    Interest,
}

impl TransactionKind {
    /// Debit kinds reduce the balance and validate against available funds.
    pub fn is_debit(self) -> bool {
        matches!(self, TransactionKind::Withdraw | TransactionKind::TransferOut)
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::TransferOut => "transfer-out",
            TransactionKind::TransferIn => "transfer-in",
            TransactionKind::Interest => "interest",
        }
    }
}

/// A single committed mutation. Immutable once appended; insertion order is
/// chronological order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<AccountId>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            kind,
            amount,
            timestamp: Utc::now(),
            counterparty: None,
        }
    }

    /// Tags the entry with the other side of a transfer.
    pub fn with_counterparty(mut self, counterparty: AccountId) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    /// The amount as it applies to the balance: positive for credits,
    /// negative for debits.
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_debit() {
            -self.amount
        } else {
            self.amount
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn debit_kinds_are_negative_signed() {
        let txn = Transaction::new(TransactionKind::Withdraw, dec!(25));
        assert_eq!(txn.signed_amount(), dec!(-25));
        let txn = Transaction::new(TransactionKind::TransferOut, dec!(10));
        assert_eq!(txn.signed_amount(), dec!(-10));
    }

    #[test]
    fn credit_kinds_are_positive_signed() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::TransferIn,
            TransactionKind::Interest,
        ] {
            let txn = Transaction::new(kind, dec!(12.50));
            assert_eq!(txn.signed_amount(), dec!(12.50));
        }
    }
}
