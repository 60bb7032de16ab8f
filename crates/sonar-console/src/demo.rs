//! Demo subcommands wired into the console.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use sonar_command::{
    Catalog, CatalogError, CommandInvocation, FnSubcommand, Subcommand, SubcommandDescriptor,
};

/// In-memory address blacklist.
#[derive(Debug, Default)]
pub struct Blacklist {
    entries: Mutex<BTreeSet<String>>,
}

impl Subcommand for Blacklist {
    fn execute(&self, invocation: &CommandInvocation<'_>) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("blacklist lock poisoned"))?;

        match invocation.argument(1).map(str::to_ascii_lowercase).as_deref() {
            Some("add") => {
                let Some(address) = invocation.argument(2) else {
                    invocation.incorrect_usage();
                    return Ok(());
                };
                if entries.insert(address.to_string()) {
                    invocation.reply(&format!("Added {} to the blacklist.", address));
                } else {
                    invocation.reply(&format!("{} is already blacklisted.", address));
                }
            }
            Some("remove") => {
                let Some(address) = invocation.argument(2) else {
                    invocation.incorrect_usage();
                    return Ok(());
                };
                if entries.remove(address) {
                    invocation.reply(&format!("Removed {} from the blacklist.", address));
                } else {
                    invocation.reply(&format!("{} is not blacklisted.", address));
                }
            }
            Some("clear") => {
                let removed = entries.len();
                entries.clear();
                invocation.reply(&format!("Cleared {} blacklist entries.", removed));
            }
            Some("size") => {
                invocation.reply(&format!("The blacklist holds {} entries.", entries.len()));
            }
            Some(_) | None => invocation.incorrect_usage(),
        }
        Ok(())
    }
}

/// Verbose mode, toggled per executor.
#[derive(Debug, Default)]
pub struct Verbose {
    enabled: Mutex<HashSet<String>>,
}

impl Subcommand for Verbose {
    fn execute(&self, invocation: &CommandInvocation<'_>) -> anyhow::Result<()> {
        let mut enabled = self
            .enabled
            .lock()
            .map_err(|_| anyhow!("verbose lock poisoned"))?;

        let name = invocation.executor_name();
        let state = if enabled.remove(name) {
            "disabled"
        } else {
            enabled.insert(name.to_string());
            "enabled"
        };
        invocation.reply(&format!("Verbose mode {} for {}.", state, name));
        Ok(())
    }
}

/// The catalog the console runs with.
pub fn catalog() -> Result<Catalog, CatalogError> {
    let reloads = AtomicUsize::new(0);

    Catalog::builder()
        .register(
            SubcommandDescriptor::new("reload")
                .alias("rl")
                .description("Reload the configuration"),
            FnSubcommand::new(move |invocation: &CommandInvocation<'_>| {
                let count = reloads.fetch_add(1, Ordering::Relaxed) + 1;
                invocation.reply(&format!("Reloaded configuration ({} times).", count));
                Ok(())
            }),
        )
        .register(
            SubcommandDescriptor::new("verbose")
                .alias("v")
                .description("Toggle verbose action bar")
                .only_players(),
            Verbose::default(),
        )
        .register(
            SubcommandDescriptor::new("blacklist")
                .aliases(["bl", "deny"])
                .description("Manage blacklisted addresses")
                .arguments(["add", "remove", "clear", "size"]),
            Blacklist::default(),
        )
        .register(
            SubcommandDescriptor::new("statistics")
                .alias("stats")
                .description("Show session statistics")
                .only_console(),
            FnSubcommand::new(|invocation: &CommandInvocation<'_>| {
                invocation.reply("Verified players: 0");
                invocation.reply("Queued logins: 0");
                Ok(())
            }),
        )
        .build()
}
