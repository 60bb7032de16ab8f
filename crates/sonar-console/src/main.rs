//! Interactive console for the Sonar command dispatcher.
//!
//! Reads one invocation per line from stdin. A line is either the arguments
//! to `/sonar` (the leading `/sonar` is optional) or `tab ...` to ask for
//! completions of the tokens that follow.

mod demo;
mod source;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sonar_command::{CommandConfig, Dispatcher, InvocationSource};
use tracing_subscriber::EnvFilter;

use crate::source::{ConsoleSource, OutputMode};

#[derive(Parser, Debug)]
#[command(name = "sonar-console", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Act as a player with this name instead of the console
    #[arg(long)]
    player: Option<String>,

    /// Permission granted to the player (repeatable, "*" grants all)
    #[arg(long = "grant", value_name = "PERMISSION")]
    grants: Vec<String>,

    /// Override the cooldown window in milliseconds
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputMode::Text)]
    output: OutputMode,
}

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Dispatch(Vec<String>),
    Complete(Vec<String>),
    Quit,
    Blank,
}

fn parse_line(input: &str, command: &str) -> Line {
    let trimmed = input.trim_start();
    if trimmed.trim().is_empty() {
        return Line::Blank;
    }
    if matches!(trimmed.trim(), "quit" | "exit") {
        return Line::Quit;
    }

    if let Some(rest) = trimmed.strip_prefix("tab") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Line::Complete(completion_tokens(rest));
        }
    }

    let mut tokens: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
    let prefix = format!("/{}", command);
    if tokens
        .first()
        .is_some_and(|t| t.eq_ignore_ascii_case(&prefix) || t.eq_ignore_ascii_case(command))
    {
        tokens.remove(0);
    }
    Line::Dispatch(tokens)
}

// A trailing space means the caller started a new, still empty token
fn completion_tokens(rest: &str) -> Vec<String> {
    let mut tokens: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
    if rest.ends_with(char::is_whitespace) && !tokens.is_empty() {
        tokens.push(String::new());
    }
    tokens
}

/// Runs one parsed line. Returns false once the session should end.
///
/// Invocations from callers without the command permission get the
/// no-permission message and never reach the dispatcher.
fn handle_line(dispatcher: &Dispatcher, source: &dyn InvocationSource, line: Line) -> bool {
    match line {
        Line::Dispatch(arguments) => {
            if !dispatcher.has_permission(source) {
                let config = dispatcher.config();
                tracing::debug!(caller = %source.id(), "missing command permission");
                source.send_message(&config.messages.no_permission(&config.command_permission));
                return true;
            }
            let outcome = dispatcher.dispatch(source, &arguments);
            tracing::debug!(?outcome, "dispatch finished");
        }
        Line::Complete(tokens) => {
            let suggestions = dispatcher.suggest(source, &tokens);
            source.send_message(&suggestions.join(" "));
        }
        Line::Quit => return false,
        Line::Blank => {}
    }
    true
}

fn load_config(cli: &Cli) -> anyhow::Result<CommandConfig> {
    let mut config = match &cli.config {
        Some(path) => CommandConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CommandConfig::default(),
    };
    if let Some(ms) = cli.cooldown_ms {
        config.cooldown_ms = ms;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let command = config.command.clone();

    let dispatcher = Dispatcher::builder()
        .catalog(demo::catalog()?)
        .config(config)
        .build()?;

    let source = match &cli.player {
        Some(name) => ConsoleSource::player(name, cli.grants.clone(), cli.output),
        None => ConsoleSource::console(cli.output),
    };

    tracing::info!(caller = %source.id(), command = %command, "console ready");

    for line in std::io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        if !handle_line(&dispatcher, &source, parse_line(&line, &command)) {
            break;
        }
    }

    Ok(())
}
