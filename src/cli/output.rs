use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "SUCCESS",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = format!("{}: {}", label(kind), message);
    let styled = match kind {
        MessageKind::Info => formatted.normal(),
        MessageKind::Success => formatted.bright_green(),
        MessageKind::Warning => formatted.bright_yellow(),
        MessageKind::Error => formatted.bright_red(),
    };
    println!("{}", styled);
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

/// Raw line without a label, for tabular listings.
pub fn line(message: impl fmt::Display) {
    println!("{}", message);
}
