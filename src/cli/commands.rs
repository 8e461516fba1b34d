use std::str::FromStr;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use strsim::levenshtein;
use thiserror::Error;

use crate::errors::BankError;
use crate::ledger::{AccountId, AccountKind, Transaction};

use super::output;
use super::shell::{LoopControl, ShellContext};

const SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Error)]
pub(crate) enum CommandError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Bank(#[from] BankError),
}

pub(crate) type CommandResult = Result<LoopControl, CommandError>;

pub(crate) struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub(crate) static COMMANDS: Lazy<Vec<CommandSpec>> = Lazy::new(|| {
    vec![
        CommandSpec {
            name: "create",
            usage: "create <owner> <savings|checking|loan>",
            summary: "Open a new account for the given owner.",
        },
        CommandSpec {
            name: "deposit",
            usage: "deposit [account] <amount>",
            summary: "Deposit into an account (defaults to the selection).",
        },
        CommandSpec {
            name: "withdraw",
            usage: "withdraw [account] <amount>",
            summary: "Withdraw from an account (defaults to the selection).",
        },
        CommandSpec {
            name: "transfer",
            usage: "transfer <from> <to> <amount>",
            summary: "Move funds between two accounts, atomically.",
        },
        CommandSpec {
            name: "interest",
            usage: "interest [account]",
            summary: "Apply the category's interest rate.",
        },
        CommandSpec {
            name: "undo",
            usage: "undo",
            summary: "Reverse the most recent deposit, withdrawal, or transfer.",
        },
        CommandSpec {
            name: "select",
            usage: "select <account>",
            summary: "Make an account the default target.",
        },
        CommandSpec {
            name: "show",
            usage: "show [account]",
            summary: "Display one account's details.",
        },
        CommandSpec {
            name: "history",
            usage: "history [account]",
            summary: "List an account's transactions in order.",
        },
        CommandSpec {
            name: "list",
            usage: "list",
            summary: "List all accounts.",
        },
        CommandSpec {
            name: "help",
            usage: "help",
            summary: "Show this summary.",
        },
        CommandSpec {
            name: "exit",
            usage: "exit",
            summary: "Save and leave the shell.",
        },
    ]
});

pub(crate) fn command_names() -> Vec<&'static str> {
    COMMANDS.iter().map(|spec| spec.name).collect()
}

pub(crate) fn dispatch(context: &mut ShellContext, command: &str, args: &[&str]) -> CommandResult {
    match command {
        "create" => create(context, args),
        "deposit" => deposit(context, args),
        "withdraw" => withdraw(context, args),
        "transfer" => transfer(context, args),
        "interest" => interest(context, args),
        "undo" => undo(context),
        "select" => select(context, args),
        "show" => show(context, args),
        "history" => history(context, args),
        "list" => list(context),
        "help" => help(),
        "exit" | "quit" => Ok(LoopControl::Exit),
        unknown => {
            output::error(format!("Unknown command `{unknown}`."));
            suggest(unknown);
            Ok(LoopControl::Continue)
        }
    }
}

fn suggest(input: &str) {
    let mut candidates: Vec<(usize, &'static str)> = COMMANDS
        .iter()
        .map(|spec| (levenshtein(spec.name, input), spec.name))
        .collect();
    candidates.sort_by_key(|(distance, _)| *distance);
    if let Some((distance, best)) = candidates.first() {
        if *distance <= SUGGESTION_DISTANCE {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }
}

fn create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [owner, kind] = expect_args("create", args)?;
    let kind = AccountKind::from_str(kind).map_err(CommandError::Usage)?;
    let id = context.session.create_account(owner, kind)?;
    context.session.select(&id)?;
    output::success(format!(
        "Created {} account {} for {} (now selected).",
        kind.label(),
        id,
        owner
    ));
    Ok(LoopControl::Continue)
}

fn deposit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (id, amount) = account_and_amount(context, "deposit", args)?;
    context.session.deposit(id.clone(), amount)?;
    let balance = context.session.account(&id)?.balance;
    output::success(format!("Deposited {amount} into {id}. Balance: {balance}."));
    Ok(LoopControl::Continue)
}

fn withdraw(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (id, amount) = account_and_amount(context, "withdraw", args)?;
    context.session.withdraw(id.clone(), amount)?;
    let balance = context.session.account(&id)?.balance;
    output::success(format!("Withdrew {amount} from {id}. Balance: {balance}."));
    Ok(LoopControl::Continue)
}

fn transfer(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [from, to, amount] = expect_args("transfer", args)?;
    let from = AccountId::new(from);
    let to = AccountId::new(to);
    let amount = parse_amount(amount)?;
    context.session.transfer(from.clone(), to.clone(), amount)?;
    output::success(format!("Transferred {amount} from {from} to {to}."));
    Ok(LoopControl::Continue)
}

fn interest(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = optional_account(context, args, 0)?;
    let interest = context.session.apply_interest(&id)?;
    if interest.is_zero() {
        output::info(format!("No interest applied to {id} (zero balance)."));
    } else {
        let balance = context.session.account(&id)?.balance;
        output::success(format!(
            "Interest of {interest} applied to {id}. Balance: {balance}."
        ));
    }
    Ok(LoopControl::Continue)
}

fn undo(context: &mut ShellContext) -> CommandResult {
    match context.session.undo_last()? {
        Some(command) => output::success(format!("Undid {command}.")),
        None => output::info("Nothing to undo."),
    }
    Ok(LoopControl::Continue)
}

fn select(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = expect_args("select", args)?;
    let id = AccountId::new(id);
    context.session.select(&id)?;
    output::success(format!("Selected {id}."));
    Ok(LoopControl::Continue)
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = optional_account(context, args, 0)?;
    let account = context.session.account(&id)?;
    output::line(format!("Account:  {}", account.id));
    output::line(format!("Owner:    {}", account.owner));
    output::line(format!("Kind:     {}", account.kind.label()));
    output::line(format!("Balance:  {}", account.balance));
    output::line(format!("Entries:  {}", account.transactions.len()));
    Ok(LoopControl::Continue)
}

fn history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = optional_account(context, args, 0)?;
    let account = context.session.account(&id)?;
    if account.transactions.is_empty() {
        output::info(format!("No transactions on {id}."));
        return Ok(LoopControl::Continue);
    }
    for transaction in &account.transactions {
        output::line(render_transaction(transaction));
    }
    Ok(LoopControl::Continue)
}

fn list(context: &mut ShellContext) -> CommandResult {
    if context.session.accounts().is_empty() {
        output::info("No accounts yet. Use `create` to open one.");
        return Ok(LoopControl::Continue);
    }
    for account in context.session.accounts() {
        output::line(format!(
            "{:<8}  {:<20}  {:<8}  {:>12}",
            account.id.as_str(),
            account.owner,
            account.kind.label(),
            account.balance.to_string()
        ));
    }
    Ok(LoopControl::Continue)
}

fn help() -> CommandResult {
    for spec in COMMANDS.iter() {
        output::line(format!("{:<40}  {}", spec.usage, spec.summary));
    }
    Ok(LoopControl::Continue)
}

fn render_transaction(transaction: &Transaction) -> String {
    let counterparty = transaction
        .counterparty
        .as_ref()
        .map(|id| format!("  ({})", id))
        .unwrap_or_default();
    format!(
        "{}  {:<12}  {:>12}{}",
        transaction.timestamp.format("%Y-%m-%d %H:%M:%S"),
        transaction.kind.label(),
        transaction.signed_amount().to_string(),
        counterparty
    )
}

fn account_and_amount(
    context: &ShellContext,
    name: &str,
    args: &[&str],
) -> Result<(AccountId, Decimal), CommandError> {
    match *args {
        [amount] => Ok((selected(context)?, parse_amount(amount)?)),
        [id, amount] => Ok((AccountId::new(id), parse_amount(amount)?)),
        _ => Err(usage(name)),
    }
}

fn optional_account(
    context: &ShellContext,
    args: &[&str],
    index: usize,
) -> Result<AccountId, CommandError> {
    match args.get(index) {
        Some(id) => Ok(AccountId::new(*id)),
        None => selected(context),
    }
}

fn selected(context: &ShellContext) -> Result<AccountId, CommandError> {
    context.session.selected().cloned().ok_or_else(|| {
        CommandError::Usage("no account selected; pass an account id or use `select`".into())
    })
}

fn parse_amount(raw: &str) -> Result<Decimal, CommandError> {
    Decimal::from_str(raw)
        .map_err(|_| CommandError::Usage(format!("`{raw}` is not a valid amount")))
}

fn expect_args<'a, const N: usize>(
    name: &str,
    args: &[&'a str],
) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args.to_vec()).map_err(|_| usage(name))
}

fn usage(name: &str) -> CommandError {
    let usage = COMMANDS
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.usage)
        .unwrap_or(name);
    CommandError::Usage(format!("usage: {usage}"))
}
