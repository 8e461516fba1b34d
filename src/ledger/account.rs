use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::BankError;

use super::interest::interest_rate;
use super::observer::TransactionObserver;
use super::transaction::{Transaction, TransactionKind};

/// Unique account identifier, allocated by the session directory and
/// immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enumerates the supported account categories. Fixed at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Savings,
    Checking,
    Loan,
}

impl AccountKind {
    pub fn label(self) -> &'static str {
        match self {
            AccountKind::Savings => "savings",
            AccountKind::Checking => "checking",
            AccountKind::Loan => "loan",
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "savings" => Ok(AccountKind::Savings),
            "checking" => Ok(AccountKind::Checking),
            "loan" => Ok(AccountKind::Loan),
            other => Err(format!("unknown account kind `{other}`")),
        }
    }
}

/// A bank account: balance plus its append-only transaction history.
///
/// Every committed mutation notifies the attached observers in attach order,
/// synchronously, before the mutating call returns. Observers are not part of
/// the persisted state; the session re-attaches them after load.
#[derive(Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(skip)]
    observers: Vec<Rc<dyn TransactionObserver>>,
}

impl Account {
    /// Creates an account with a zero balance and empty history.
    pub fn new(id: AccountId, owner: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id,
            owner: owner.into(),
            kind,
            balance: Decimal::ZERO,
            transactions: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Subscribes an observer to this account's committed mutations.
    pub fn attach(&mut self, observer: Rc<dyn TransactionObserver>) {
        self.observers.push(observer);
    }

    /// Credits the balance. Fails with `InvalidAmount` when `amount <= 0`.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), BankError> {
        self.apply(TransactionKind::Deposit, amount, None)
    }

    /// Debits the balance. Fails with `InvalidAmount` when `amount <= 0` and
    /// with `InsufficientFunds` when the balance does not cover `amount`.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), BankError> {
        self.apply(TransactionKind::Withdraw, amount, None)
    }

    pub(crate) fn transfer_out(&mut self, amount: Decimal, to: AccountId) -> Result<(), BankError> {
        self.apply(TransactionKind::TransferOut, amount, Some(to))
    }

    pub(crate) fn transfer_in(&mut self, amount: Decimal, from: AccountId) -> Result<(), BankError> {
        self.apply(TransactionKind::TransferIn, amount, Some(from))
    }

    /// Applies the category's interest rate to the current balance and
    /// returns the credited amount. A zero computation records nothing.
    pub fn apply_interest(&mut self) -> Decimal {
        let interest = (self.balance * interest_rate(self.kind)).round_dp(2);
        if interest > Decimal::ZERO {
            self.commit(TransactionKind::Interest, interest, None);
        }
        interest
    }

    /// Sum of the signed transaction history. Equals `balance` by invariant.
    pub fn history_sum(&self) -> Decimal {
        self.transactions
            .iter()
            .map(Transaction::signed_amount)
            .sum()
    }

    pub fn is_consistent(&self) -> bool {
        self.balance == self.history_sum()
    }

    fn apply(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
        counterparty: Option<AccountId>,
    ) -> Result<(), BankError> {
        if amount <= Decimal::ZERO {
            return Err(BankError::InvalidAmount(amount));
        }
        if kind.is_debit() && amount > self.balance {
            return Err(BankError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.commit(kind, amount, counterparty);
        Ok(())
    }

    // Validation has already passed; mutate, append, then notify.
    fn commit(&mut self, kind: TransactionKind, amount: Decimal, counterparty: Option<AccountId>) {
        let mut transaction = Transaction::new(kind, amount);
        if let Some(counterparty) = counterparty {
            transaction = transaction.with_counterparty(counterparty);
        }
        self.balance += transaction.signed_amount();
        self.transactions.push(transaction.clone());
        for observer in &self.observers {
            observer.on_transaction(&self.id, &transaction);
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("balance", &self.balance)
            .field("transactions", &self.transactions)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.owner == other.owner
            && self.kind == other.kind
            && self.balance == other.balance
            && self.transactions == other.transactions
    }
}
