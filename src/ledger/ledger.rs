use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{Account, AccountId};

const CURRENT_SCHEMA_VERSION: u8 = 1;
const ACCOUNT_ID_PREFIX: &str = "AC-";

/// The full registry of accounts, serialized whole on every save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    pub id: Uuid,
    #[serde(default)]
    pub accounts: Vec<Account>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            accounts: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| &account.id == id)
    }

    pub fn account_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| &account.id == id)
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.account(id).is_some()
    }

    /// Inserts the account, replacing any existing record with the same id.
    pub fn upsert(&mut self, account: Account) -> AccountId {
        let id = account.id.clone();
        match self.account_mut(&id) {
            Some(existing) => *existing = account,
            None => self.accounts.push(account),
        }
        self.touch();
        id
    }

    /// Allocates the next sequential account identifier (`AC-0001`, ...).
    pub fn next_account_id(&self) -> AccountId {
        let max = self
            .accounts
            .iter()
            .filter_map(|account| {
                account
                    .id
                    .as_str()
                    .strip_prefix(ACCOUNT_ID_PREFIX)?
                    .parse::<u32>()
                    .ok()
            })
            .max()
            .unwrap_or(0);
        AccountId::new(format!("{}{:04}", ACCOUNT_ID_PREFIX, max + 1))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Flags accounts whose balance disagrees with their transaction history.
    pub fn integrity_warnings(&self) -> Vec<String> {
        self.accounts
            .iter()
            .filter(|account| !account.is_consistent())
            .map(|account| {
                format!(
                    "account {} balance {} does not match history sum {}",
                    account.id,
                    account.balance,
                    account.history_sum()
                )
            })
            .collect()
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::AccountKind;
    use rust_decimal_macros::dec;

    #[test]
    fn ids_are_allocated_sequentially() {
        let mut ledger = Ledger::new();
        let first = ledger.next_account_id();
        assert_eq!(first.as_str(), "AC-0001");
        ledger.upsert(Account::new(first, "Ada", AccountKind::Savings));
        assert_eq!(ledger.next_account_id().as_str(), "AC-0002");
    }

    #[test]
    fn allocation_skips_past_the_highest_existing_id() {
        let mut ledger = Ledger::new();
        ledger.upsert(Account::new(
            AccountId::new("AC-0007"),
            "Grace",
            AccountKind::Checking,
        ));
        assert_eq!(ledger.next_account_id().as_str(), "AC-0008");
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut ledger = Ledger::new();
        let id = AccountId::new("AC-0001");
        ledger.upsert(Account::new(id.clone(), "Ada", AccountKind::Savings));
        let mut updated = Account::new(id.clone(), "Ada Lovelace", AccountKind::Savings);
        updated.deposit(dec!(10)).unwrap();
        ledger.upsert(updated);
        assert_eq!(ledger.account_count(), 1);
        assert_eq!(ledger.account(&id).unwrap().owner, "Ada Lovelace");
    }

    #[test]
    fn integrity_warnings_catch_balance_drift() {
        let mut ledger = Ledger::new();
        let id = AccountId::new("AC-0001");
        let mut account = Account::new(id, "Ada", AccountKind::Checking);
        account.deposit(dec!(100)).unwrap();
        account.balance = dec!(150); // simulate a corrupted snapshot
        ledger.upsert(account);
        let warnings = ledger.integrity_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("AC-0001"));
    }
}
