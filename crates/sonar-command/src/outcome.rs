//! Terminal states of a dispatch.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::Messages;

/// Audience restriction that a caller failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    PlayersOnly,
    ConsoleOnly,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Audience::PlayersOnly => write!(f, "players only"),
            Audience::ConsoleOnly => write!(f, "console only"),
        }
    }
}

/// Expected, user-facing reasons an invocation did not run.
///
/// Each maps to one templated message; none of them is a failure of the
/// dispatcher itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("command on cooldown ({0:?} left)")]
    Cooldown(Duration),

    #[error("missing permission {0}")]
    NoPermission(String),

    #[error("subcommand is {0}")]
    WrongAudience(Audience),

    #[error("incorrect usage: {name} ({arguments})")]
    UsageError { name: String, arguments: String },
}

impl Rejection {
    /// Lines sent to the caller for this rejection.
    ///
    /// A cooldown produces two lines: the notice and the time left.
    pub fn render(&self, messages: &Messages) -> Vec<String> {
        match self {
            Rejection::Cooldown(remaining) => vec![
                messages.cooldown.clone(),
                messages.cooldown_left(*remaining),
            ],
            Rejection::NoPermission(permission) => vec![messages.no_permission(permission)],
            Rejection::WrongAudience(Audience::PlayersOnly) => vec![messages.players_only.clone()],
            Rejection::WrongAudience(Audience::ConsoleOnly) => vec![messages.console_only.clone()],
            Rejection::UsageError { name, arguments } => {
                vec![messages.incorrect_usage(&format!("{} ({})", name, arguments))]
            }
        }
    }
}

/// What a single dispatch ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The subcommand ran and returned `Ok`.
    Executed { subcommand: String },
    /// No subcommand matched; the help listing was sent.
    Help,
    /// The invocation was turned away before execution.
    Rejected(Rejection),
    /// The subcommand ran and returned an error.
    Failed { subcommand: String, error: String },
}

impl DispatchOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, DispatchOutcome::Executed { .. })
    }

    pub fn is_help(&self) -> bool {
        matches!(self, DispatchOutcome::Help)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DispatchOutcome::Rejected(r) => Some(r),
            _ => None,
        }
    }
}
