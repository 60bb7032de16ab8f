//! The top-level dispatcher.
//!
//! One [`Dispatcher`] owns every piece of state the command needs: the
//! catalog, the configuration, the cooldown store and both lazy caches.
//! Share it behind an `Arc`; every method takes `&self`.
//!
//! Per invocation:
//!
//! ```text
//! cooldown check ──cooling──→ cooldown messages
//!      │
//!   resolve ──no match──→ help listing
//!      │
//!  authorize ──rejected──→ one templated message
//!      │
//!   execute
//! ```
//!
//! Tab completion skips the cooldown and the resolver entirely.

use std::sync::Arc;

use crate::caller::InvocationSource;
use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::completion::CompletionCache;
use crate::config::{CommandConfig, ConfigError};
use crate::cooldown::{Admission, Cooldowns};
use crate::help::{HelpCache, HelpLine};
use crate::invocation::CommandInvocation;
use crate::outcome::{DispatchOutcome, Rejection};
use crate::resolve::{authorize, resolve};

pub struct Dispatcher {
    catalog: Catalog,
    config: CommandConfig,
    cooldowns: Cooldowns,
    help: HelpCache,
    completions: CompletionCache,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Runs one invocation to a terminal state.
    ///
    /// Exactly one observable effect happens per call: cooldown messages, a
    /// rejection message, the help listing, or the subcommand itself.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        source: &dyn InvocationSource,
        arguments: &[S],
    ) -> DispatchOutcome {
        let caller = source.id();

        if let Admission::Cooling(remaining) = self.cooldowns.check_and_record(&caller) {
            return self.reject(source, Rejection::Cooldown(remaining));
        }

        let arguments: Vec<String> = arguments.iter().map(|a| a.as_ref().to_string()).collect();

        let Some(entry) = resolve(&self.catalog, arguments.as_slice()) else {
            tracing::debug!(caller = %caller, "no subcommand matched, sending help");
            self.send_help(source);
            return DispatchOutcome::Help;
        };

        let descriptor = entry.descriptor();
        if let Err(rejection) = authorize(descriptor, source, arguments.len()) {
            return self.reject(source, rejection);
        }

        let invocation =
            CommandInvocation::new(source, descriptor, &arguments, &self.config.messages);

        tracing::info!(
            caller = %caller,
            executor = invocation.executor_name(),
            subcommand = descriptor.name(),
            "executing subcommand"
        );

        match entry.execute(&invocation) {
            Ok(()) => DispatchOutcome::Executed {
                subcommand: descriptor.name().to_string(),
            },
            Err(err) => {
                tracing::error!(
                    caller = %caller,
                    subcommand = descriptor.name(),
                    error = %format!("{:#}", err),
                    "subcommand failed"
                );
                source.send_message(&self.config.messages.command_failed);
                DispatchOutcome::Failed {
                    subcommand: descriptor.name().to_string(),
                    error: err.to_string(),
                }
            }
        }
    }

    /// Tab completion for the tokens typed so far.
    ///
    /// Callers without the command permission get nothing.
    pub fn suggest<S: AsRef<str>>(&self, source: &dyn InvocationSource, tokens: &[S]) -> Vec<String> {
        if !self.has_permission(source) {
            return Vec::new();
        }
        self.completions.suggest(&self.catalog, tokens)
    }

    /// Whether `source` may use the command family at all.
    pub fn has_permission(&self, source: &dyn InvocationSource) -> bool {
        source.has_permission(&self.config.command_permission)
    }

    pub fn help_lines(&self) -> &[HelpLine] {
        self.help.lines(&self.catalog, &self.config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    fn send_help(&self, source: &dyn InvocationSource) {
        for line in self.help_lines() {
            source.send_line(line);
        }
    }

    fn reject(&self, source: &dyn InvocationSource, rejection: Rejection) -> DispatchOutcome {
        tracing::debug!(caller = %source.id(), reason = %rejection, "invocation rejected");
        for line in rejection.render(&self.config.messages) {
            source.send_message(&line);
        }
        DispatchOutcome::Rejected(rejection)
    }
}

/// Builder for [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    catalog: Option<Catalog>,
    config: Option<CommandConfig>,
    clock: Option<Arc<dyn Clock>>,
}

impl DispatcherBuilder {
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn config(mut self, config: CommandConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the time source used for cooldowns.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Dispatcher, ConfigError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cooldowns = Cooldowns::with_clock(config.cooldown(), clock);

        Ok(Dispatcher {
            catalog: self.catalog.unwrap_or_default(),
            config,
            cooldowns,
            help: HelpCache::new(),
            completions: CompletionCache::new(),
        })
    }
}
