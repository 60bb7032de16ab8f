//! Command dispatch for the Sonar proxy command.
//!
//! `sonar-command` owns everything between "a caller typed `/sonar ...`" and
//! "a subcommand ran": per-caller cooldowns, subcommand lookup by name or
//! alias, permission and audience checks, the cached help listing and tab
//! completion. Subcommand logic, message transport and permission storage
//! belong to the host and come in through traits.
//!
//! # Features
//!
//! - **Cooldowns**: per-caller window with self-expiring entries; the console
//!   is exempt
//! - **Resolution**: case-insensitive names and aliases, first match in
//!   catalog order
//! - **Checks**: permission, then audience, then argument count
//! - **Lazy caches**: help listing and completion index built once, safely
//!   under concurrent first use
//!
//! # Usage
//!
//! ```rust
//! use sonar_command::{
//!     Catalog, CommandInvocation, Dispatcher, DispatchOutcome, FnSubcommand, MockSource,
//!     SubcommandDescriptor,
//! };
//!
//! let catalog = Catalog::builder()
//!     .register(
//!         SubcommandDescriptor::new("reload").alias("rl"),
//!         FnSubcommand::new(|invocation: &CommandInvocation<'_>| {
//!             invocation.reply("Reloaded.");
//!             Ok(())
//!         }),
//!     )
//!     .build()?;
//!
//! let dispatcher = Dispatcher::builder().catalog(catalog).build()?;
//!
//! let console = MockSource::console();
//! assert!(dispatcher.dispatch(&console, &["RL"]).is_executed());
//! assert_eq!(dispatcher.dispatch::<&str>(&console, &[]), DispatchOutcome::Help);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod caller;
mod catalog;
mod clock;
mod completion;
mod config;
mod cooldown;
mod dispatch;
mod help;
mod invocation;
mod outcome;
mod resolve;

pub use caller::{CallerClass, CallerId, InvocationSource, MockSource, CONSOLE_NAME};

pub use catalog::{
    ArgumentSpec, Catalog, CatalogBuilder, CatalogError, FnSubcommand, Registered, Subcommand,
    SubcommandDescriptor, PERMISSION_PREFIX,
};

pub use clock::{Clock, ManualClock, SystemClock};

pub use completion::CompletionCache;

pub use config::{format_seconds, CommandConfig, ConfigError, Messages, Platform};

pub use cooldown::{Admission, Cooldowns};

pub use dispatch::{Dispatcher, DispatcherBuilder};

pub use help::{ClickAction, HelpCache, HelpLine};

pub use invocation::CommandInvocation;

pub use outcome::{Audience, DispatchOutcome, Rejection};

pub use resolve::{authorize, resolve};
