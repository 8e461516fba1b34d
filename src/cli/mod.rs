//! Console shell over the session: line commands in, rendered results out.
//! The shell only parses primitives and formats output; every rule lives in
//! the core.

mod commands;
mod output;
mod shell;

pub use shell::run_cli;

use thiserror::Error;

use crate::errors::BankError;

/// Fatal shell errors; command-level failures are reported and the loop
/// continues.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("dialog error: {0}")]
    Dialog(#[from] dialoguer::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
