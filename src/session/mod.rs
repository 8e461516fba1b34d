//! Session facade: owns the live registry, the current selection, and the
//! undo history, and keeps the store in sync after every mutating command.

use std::rc::Rc;

use rust_decimal::Decimal;

use crate::commands::{Command, UndoStack};
use crate::errors::BankError;
use crate::ledger::{Account, AccountId, AccountKind, Ledger, TransactionLog};
use crate::storage::StorageBackend;

pub struct Session {
    ledger: Ledger,
    storage: Box<dyn StorageBackend>,
    log: Rc<TransactionLog>,
    undo: UndoStack,
    selected: Option<AccountId>,
}

impl Session {
    /// Loads the registry from the store (exactly once per session) and
    /// subscribes the transaction log to every account.
    pub fn open(storage: Box<dyn StorageBackend>) -> Result<Self, BankError> {
        let report = storage.load_or_default()?;
        for warning in &report.warnings {
            tracing::warn!("{warning}");
        }
        let log = Rc::new(TransactionLog::new());
        let mut ledger = report.ledger;
        for account in &mut ledger.accounts {
            account.attach(log.clone());
        }
        Ok(Self {
            ledger,
            storage,
            log,
            undo: UndoStack::new(),
            selected: None,
        })
    }

    /// Allocates the next account id, constructs the account, subscribes the
    /// log, and persists the new registry.
    pub fn create_account(
        &mut self,
        owner: impl Into<String>,
        kind: AccountKind,
    ) -> Result<AccountId, BankError> {
        let id = self.ledger.next_account_id();
        let mut account = Account::new(id.clone(), owner, kind);
        account.attach(self.log.clone());
        self.ledger.upsert(account);
        self.save()?;
        Ok(id)
    }

    pub fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<(), BankError> {
        self.run(Command::Deposit { account, amount })
    }

    pub fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<(), BankError> {
        self.run(Command::Withdraw { account, amount })
    }

    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<(), BankError> {
        self.run(Command::Transfer { from, to, amount })
    }

    /// Pops and reverses the most recent command, then persists. The popped
    /// entry is consumed even when its undo fails; `Ok(None)` means the stack
    /// was empty.
    pub fn undo_last(&mut self) -> Result<Option<Command>, BankError> {
        let had_commands = !self.undo.is_empty();
        let outcome = self.undo.undo_last(&mut self.ledger);
        if had_commands {
            // Compensating entries (even partial ones behind a failed undo)
            // are part of durable history.
            self.save()?;
        }
        outcome
    }

    /// Applies interest directly to the account. Interest is not a command
    /// and never enters the undo history.
    pub fn apply_interest(&mut self, id: &AccountId) -> Result<Decimal, BankError> {
        let account = self
            .ledger
            .account_mut(id)
            .ok_or_else(|| BankError::AccountNotFound(id.clone()))?;
        let interest = account.apply_interest();
        self.save()?;
        Ok(interest)
    }

    /// Swaps the current selection to an existing account.
    pub fn select(&mut self, id: &AccountId) -> Result<(), BankError> {
        if !self.ledger.contains(id) {
            return Err(BankError::AccountNotFound(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn selected(&self) -> Option<&AccountId> {
        self.selected.as_ref()
    }

    pub fn account(&self, id: &AccountId) -> Result<&Account, BankError> {
        self.ledger
            .account(id)
            .ok_or_else(|| BankError::AccountNotFound(id.clone()))
    }

    pub fn accounts(&self) -> &[Account] {
        &self.ledger.accounts
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Writes the full snapshot to the store.
    pub fn save(&mut self) -> Result<(), BankError> {
        self.ledger.touch();
        self.storage.save(&self.ledger)
    }

    fn run(&mut self, command: Command) -> Result<(), BankError> {
        command.execute(&mut self.ledger)?;
        self.undo.push(command);
        self.save()
    }
}
