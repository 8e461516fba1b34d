//! The transaction command engine: each user-requested operation is a
//! reversible unit executed against the ledger, with a global LIFO undo
//! history of everything that committed.

use std::fmt;

use rust_decimal::Decimal;

use crate::errors::BankError;
use crate::ledger::{AccountId, Ledger};

/// One requested operation, stored by value with enough state to reverse it.
/// Accounts are referenced by id and resolved through the ledger at
/// execute/undo time, so undo always operates on current account identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Deposit {
        account: AccountId,
        amount: Decimal,
    },
    Withdraw {
        account: AccountId,
        amount: Decimal,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
}

impl Command {
    pub fn execute(&self, ledger: &mut Ledger) -> Result<(), BankError> {
        match self {
            Command::Deposit { account, amount } => {
                let account = ledger
                    .account_mut(account)
                    .ok_or_else(|| BankError::AccountNotFound(account.clone()))?;
                account.deposit(*amount)
            }
            Command::Withdraw { account, amount } => {
                let account = ledger
                    .account_mut(account)
                    .ok_or_else(|| BankError::AccountNotFound(account.clone()))?;
                account.withdraw(*amount)
            }
            Command::Transfer { from, to, amount } => {
                let source = ledger
                    .account_mut(from)
                    .ok_or_else(|| BankError::AccountNotFound(from.clone()))?;
                source.transfer_out(*amount, to.clone())?;
                match ledger.account_mut(to) {
                    Some(destination) => destination.transfer_in(*amount, from.clone()),
                    None => {
                        // Roll the withdraw back so a missing destination
                        // leaves the source untouched.
                        if let Some(source) = ledger.account_mut(from) {
                            source.deposit(*amount)?;
                        }
                        Err(BankError::AccountNotFound(to.clone()))
                    }
                }
            }
        }
    }

    /// Reverses a previously executed command by appending compensating
    /// transactions; history is never truncated. Fails closed with
    /// `UndoInvalid` when intervening operations broke the required invariant.
    pub fn undo(&self, ledger: &mut Ledger) -> Result<(), BankError> {
        match self {
            Command::Deposit { account, amount } => {
                let account = ledger
                    .account_mut(account)
                    .ok_or_else(|| undo_invalid(BankError::AccountNotFound(account.clone())))?;
                account.withdraw(*amount).map_err(undo_invalid)
            }
            Command::Withdraw { account, amount } => {
                let account = ledger
                    .account_mut(account)
                    .ok_or_else(|| undo_invalid(BankError::AccountNotFound(account.clone())))?;
                account.deposit(*amount).map_err(undo_invalid)
            }
            Command::Transfer { from, to, amount } => {
                let destination = ledger
                    .account_mut(to)
                    .ok_or_else(|| undo_invalid(BankError::AccountNotFound(to.clone())))?;
                destination
                    .transfer_out(*amount, from.clone())
                    .map_err(undo_invalid)?;
                match ledger.account_mut(from) {
                    Some(source) => source
                        .transfer_in(*amount, to.clone())
                        .map_err(undo_invalid),
                    None => {
                        if let Some(destination) = ledger.account_mut(to) {
                            destination.deposit(*amount).map_err(undo_invalid)?;
                        }
                        Err(undo_invalid(BankError::AccountNotFound(from.clone())))
                    }
                }
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Deposit { account, amount } => {
                write!(f, "deposit of {amount} into {account}")
            }
            Command::Withdraw { account, amount } => {
                write!(f, "withdrawal of {amount} from {account}")
            }
            Command::Transfer { from, to, amount } => {
                write!(f, "transfer of {amount} from {from} to {to}")
            }
        }
    }
}

fn undo_invalid(source: BankError) -> BankError {
    match source {
        BankError::UndoInvalid(_) => source,
        other => BankError::UndoInvalid(other.to_string()),
    }
}

/// Last-in-first-out history of successfully executed commands, one stack per
/// session. Only commands whose `execute` succeeded are ever pushed.
#[derive(Debug, Default)]
pub struct UndoStack {
    commands: Vec<Command>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Pops and reverses the most recent command. The stack entry is consumed
    /// whether or not the undo succeeds; a failed undo surfaces its error.
    /// Returns `Ok(None)` when there is nothing to undo.
    pub fn undo_last(&mut self, ledger: &mut Ledger) -> Result<Option<Command>, BankError> {
        let Some(command) = self.commands.pop() else {
            return Ok(None);
        };
        command.undo(ledger)?;
        Ok(Some(command))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Account, AccountKind, TransactionKind};
    use rust_decimal_macros::dec;

    fn ledger_with(balances: &[(&str, Decimal)]) -> Ledger {
        let mut ledger = Ledger::new();
        for (id, balance) in balances {
            let mut account = Account::new(AccountId::new(*id), "Owner", AccountKind::Checking);
            if *balance > Decimal::ZERO {
                account.deposit(*balance).unwrap();
            }
            ledger.upsert(account);
        }
        ledger
    }

    fn id(raw: &str) -> AccountId {
        AccountId::new(raw)
    }

    #[test]
    fn deposit_then_undo_restores_balance_with_compensating_entry() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100))]);
        let command = Command::Deposit {
            account: id("AC-0001"),
            amount: dec!(25),
        };
        command.execute(&mut ledger).unwrap();
        assert_eq!(ledger.account(&id("AC-0001")).unwrap().balance, dec!(125));

        command.undo(&mut ledger).unwrap();
        let account = ledger.account(&id("AC-0001")).unwrap();
        assert_eq!(account.balance, dec!(100));
        // History is append-only: the undo adds a Withdraw, it erases nothing.
        assert_eq!(account.transactions.len(), 3);
        assert_eq!(
            account.transactions.last().unwrap().kind,
            TransactionKind::Withdraw
        );
        assert!(account.is_consistent());
    }

    #[test]
    fn failed_withdraw_is_reported_and_records_nothing() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(40))]);
        let command = Command::Withdraw {
            account: id("AC-0001"),
            amount: dec!(60),
        };
        let err = command.execute(&mut ledger).unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));
        let account = ledger.account(&id("AC-0001")).unwrap();
        assert_eq!(account.balance, dec!(40));
        assert_eq!(account.transactions.len(), 1);
    }

    #[test]
    fn transfer_moves_funds_and_tags_counterparties() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100)), ("AC-0002", dec!(10))]);
        let command = Command::Transfer {
            from: id("AC-0001"),
            to: id("AC-0002"),
            amount: dec!(30),
        };
        command.execute(&mut ledger).unwrap();

        let source = ledger.account(&id("AC-0001")).unwrap();
        assert_eq!(source.balance, dec!(70));
        let leg = source.transactions.last().unwrap();
        assert_eq!(leg.kind, TransactionKind::TransferOut);
        assert_eq!(leg.counterparty.as_ref().unwrap().as_str(), "AC-0002");

        let destination = ledger.account(&id("AC-0002")).unwrap();
        assert_eq!(destination.balance, dec!(40));
        let leg = destination.transactions.last().unwrap();
        assert_eq!(leg.kind, TransactionKind::TransferIn);
        assert_eq!(leg.counterparty.as_ref().unwrap().as_str(), "AC-0001");
    }

    #[test]
    fn transfer_exceeding_balance_leaves_both_sides_untouched() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100)), ("AC-0002", Decimal::ZERO)]);
        let command = Command::Transfer {
            from: id("AC-0001"),
            to: id("AC-0002"),
            amount: dec!(150),
        };
        let err = command.execute(&mut ledger).unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));

        let source = ledger.account(&id("AC-0001")).unwrap();
        assert_eq!(source.balance, dec!(100));
        assert_eq!(source.transactions.len(), 1);
        let destination = ledger.account(&id("AC-0002")).unwrap();
        assert_eq!(destination.balance, Decimal::ZERO);
        assert!(destination.transactions.is_empty());
    }

    #[test]
    fn transfer_to_missing_account_compensates_the_source() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100))]);
        let command = Command::Transfer {
            from: id("AC-0001"),
            to: id("AC-9999"),
            amount: dec!(30),
        };
        let err = command.execute(&mut ledger).unwrap_err();
        assert!(matches!(err, BankError::AccountNotFound(_)));

        let source = ledger.account(&id("AC-0001")).unwrap();
        assert_eq!(source.balance, dec!(100));
        assert!(source.is_consistent());
    }

    #[test]
    fn transfer_undo_reverses_both_legs() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100)), ("AC-0002", dec!(10))]);
        let command = Command::Transfer {
            from: id("AC-0001"),
            to: id("AC-0002"),
            amount: dec!(30),
        };
        command.execute(&mut ledger).unwrap();
        command.undo(&mut ledger).unwrap();

        assert_eq!(ledger.account(&id("AC-0001")).unwrap().balance, dec!(100));
        assert_eq!(ledger.account(&id("AC-0002")).unwrap().balance, dec!(10));
    }

    #[test]
    fn transfer_undo_fails_closed_when_destination_spent_the_funds() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100)), ("AC-0002", Decimal::ZERO)]);
        let command = Command::Transfer {
            from: id("AC-0001"),
            to: id("AC-0002"),
            amount: dec!(30),
        };
        command.execute(&mut ledger).unwrap();
        ledger
            .account_mut(&id("AC-0002"))
            .unwrap()
            .withdraw(dec!(25))
            .unwrap();

        let err = command.undo(&mut ledger).unwrap_err();
        assert!(matches!(err, BankError::UndoInvalid(_)));
        // Nothing moved: the first leg's validation failed up front.
        assert_eq!(ledger.account(&id("AC-0001")).unwrap().balance, dec!(70));
        assert_eq!(ledger.account(&id("AC-0002")).unwrap().balance, dec!(5));
    }

    #[test]
    fn undo_of_deposit_fails_closed_after_funds_were_spent() {
        let mut ledger = ledger_with(&[("AC-0001", Decimal::ZERO)]);
        let deposit = Command::Deposit {
            account: id("AC-0001"),
            amount: dec!(50),
        };
        deposit.execute(&mut ledger).unwrap();
        ledger
            .account_mut(&id("AC-0001"))
            .unwrap()
            .withdraw(dec!(40))
            .unwrap();

        let err = deposit.undo(&mut ledger).unwrap_err();
        assert!(matches!(err, BankError::UndoInvalid(_)));
    }

    #[test]
    fn undo_stack_is_lifo_and_restores_the_starting_balance() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100))]);
        let mut stack = UndoStack::new();

        for command in [
            Command::Deposit {
                account: id("AC-0001"),
                amount: dec!(10),
            },
            Command::Withdraw {
                account: id("AC-0001"),
                amount: dec!(5),
            },
        ] {
            command.execute(&mut ledger).unwrap();
            stack.push(command);
        }
        assert_eq!(ledger.account(&id("AC-0001")).unwrap().balance, dec!(105));

        let first = stack.undo_last(&mut ledger).unwrap().unwrap();
        assert!(matches!(first, Command::Withdraw { .. }));
        let second = stack.undo_last(&mut ledger).unwrap().unwrap();
        assert!(matches!(second, Command::Deposit { .. }));

        let account = ledger.account(&id("AC-0001")).unwrap();
        assert_eq!(account.balance, dec!(100));
        assert!(account.is_consistent());
        assert!(stack.is_empty());
    }

    #[test]
    fn empty_stack_undo_is_a_noop() {
        let mut ledger = ledger_with(&[("AC-0001", dec!(100))]);
        let mut stack = UndoStack::new();
        assert!(stack.undo_last(&mut ledger).unwrap().is_none());
    }

    #[test]
    fn failed_undo_consumes_the_stack_entry() {
        let mut ledger = ledger_with(&[("AC-0001", Decimal::ZERO)]);
        let mut stack = UndoStack::new();
        let deposit = Command::Deposit {
            account: id("AC-0001"),
            amount: dec!(50),
        };
        deposit.execute(&mut ledger).unwrap();
        stack.push(deposit);
        ledger
            .account_mut(&id("AC-0001"))
            .unwrap()
            .withdraw(dec!(50))
            .unwrap();

        assert!(stack.undo_last(&mut ledger).is_err());
        assert!(stack.is_empty());
        // The entry is gone; a second undo finds nothing.
        assert!(stack.undo_last(&mut ledger).unwrap().is_none());
    }
}
