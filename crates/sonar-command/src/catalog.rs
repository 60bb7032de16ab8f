//! Subcommand descriptors and the catalog that holds them.
//!
//! The catalog is built once at startup and is read-only afterwards. Order
//! matters: it decides which descriptor wins a lookup and the order of the
//! help listing and completions.
//!
//! ```rust
//! use sonar_command::{Catalog, CommandInvocation, FnSubcommand, SubcommandDescriptor};
//!
//! let catalog = Catalog::builder()
//!     .register(
//!         SubcommandDescriptor::new("reload")
//!             .alias("rl")
//!             .description("Reload the configuration"),
//!         FnSubcommand::new(|invocation: &CommandInvocation<'_>| {
//!             invocation.reply("Reloaded.");
//!             Ok(())
//!         }),
//!     )
//!     .build()?;
//!
//! assert_eq!(catalog.len(), 1);
//! # Ok::<(), sonar_command::CatalogError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::invocation::CommandInvocation;

/// Prefix for derived subcommand permissions.
pub const PERMISSION_PREFIX: &str = "sonar.";

/// A named argument a subcommand accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Static metadata describing one subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcommandDescriptor {
    name: String,
    aliases: Vec<String>,
    description: String,
    permission: String,
    only_players: bool,
    only_console: bool,
    arguments: Vec<ArgumentSpec>,
}

impl SubcommandDescriptor {
    /// Creates a descriptor with permission `sonar.<name>`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            permission: format!("{}{}", PERMISSION_PREFIX, name),
            name,
            aliases: Vec::new(),
            description: String::new(),
            only_players: false,
            only_console: false,
            arguments: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Overrides the derived permission token.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    pub fn only_players(mut self) -> Self {
        self.only_players = true;
        self
    }

    pub fn only_console(mut self) -> Self {
        self.only_console = true;
        self
    }

    pub fn argument(mut self, name: impl Into<String>) -> Self {
        self.arguments.push(ArgumentSpec::new(name));
        self
    }

    pub fn arguments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments
            .extend(names.into_iter().map(ArgumentSpec::new));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_list(&self) -> &[String] {
        &self.aliases
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn permission_token(&self) -> &str {
        &self.permission
    }

    pub fn is_only_players(&self) -> bool {
        self.only_players
    }

    pub fn is_only_console(&self) -> bool {
        self.only_console
    }

    pub fn argument_specs(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    /// Names of the declared arguments, in declaration order.
    pub fn argument_names(&self) -> Vec<String> {
        self.arguments.iter().map(|a| a.name.clone()).collect()
    }

    /// `"No aliases."` or the aliases joined with `", "`.
    pub fn aliases_summary(&self) -> String {
        if self.aliases.is_empty() {
            "No aliases.".to_string()
        } else {
            self.aliases.join(", ")
        }
    }

    /// Argument names joined with `", "`. Empty when there are none.
    pub fn arguments_summary(&self) -> String {
        self.arguments
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Usage string substituted into the incorrect-usage template.
    pub fn usage(&self) -> String {
        format!("{} ({})", self.name, self.arguments_summary())
    }

    /// Case-insensitive match against the name and every alias.
    pub fn matches(&self, label: &str) -> bool {
        self.labels().any(|own| same_label(own, label))
    }

    fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Execution logic of a subcommand.
///
/// Implementations are shared across threads and may be called concurrently.
pub trait Subcommand: Send + Sync {
    fn execute(&self, invocation: &CommandInvocation<'_>) -> anyhow::Result<()>;
}

/// Wraps a closure as a [`Subcommand`].
pub struct FnSubcommand<F> {
    f: F,
}

impl<F> FnSubcommand<F>
where
    F: Fn(&CommandInvocation<'_>) -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Subcommand for FnSubcommand<F>
where
    F: Fn(&CommandInvocation<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn execute(&self, invocation: &CommandInvocation<'_>) -> anyhow::Result<()> {
        (self.f)(invocation)
    }
}

/// A descriptor paired with its execution logic.
#[derive(Clone)]
pub struct Registered {
    descriptor: SubcommandDescriptor,
    handler: Arc<dyn Subcommand>,
}

impl Registered {
    pub fn descriptor(&self) -> &SubcommandDescriptor {
        &self.descriptor
    }

    pub fn execute(&self, invocation: &CommandInvocation<'_>) -> anyhow::Result<()> {
        self.handler.execute(invocation)
    }
}

impl fmt::Debug for Registered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registered")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Errors detected while building a [`Catalog`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("subcommand name must not be empty")]
    EmptyName,

    /// A name or alias is claimed by two subcommands (case-insensitive).
    #[error("'{label}' is used by both '{first}' and '{second}'")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("subcommand '{0}' cannot be both players-only and console-only")]
    ConflictingAudience(String),
}

/// Ordered, immutable collection of subcommands.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Registered>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// An empty catalog. Every invocation falls through to help.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &SubcommandDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// First entry in catalog order whose name or alias matches `label`.
    pub fn find(&self, label: &str) -> Option<&Registered> {
        self.entries.iter().find(|e| e.descriptor.matches(label))
    }
}

/// Case-folded form of a name or alias, used as a lookup key.
///
/// Folds every Unicode letter, not just ASCII, so `Ärger` and `ärger` are
/// the same label.
pub(crate) fn fold_label(label: &str) -> String {
    label.chars().flat_map(char::to_lowercase).collect()
}

/// Compares two labels under [`fold_label`] without allocating.
pub(crate) fn same_label(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Builder for [`Catalog`]. Validation happens in [`CatalogBuilder::build`].
#[derive(Default)]
pub struct CatalogBuilder {
    entries: Vec<Registered>,
}

impl CatalogBuilder {
    pub fn register<S>(mut self, descriptor: SubcommandDescriptor, subcommand: S) -> Self
    where
        S: Subcommand + 'static,
    {
        self.entries.push(Registered {
            descriptor,
            handler: Arc::new(subcommand),
        });
        self
    }

    /// Registers a subcommand that is already behind an `Arc`.
    pub fn register_shared(
        mut self,
        descriptor: SubcommandDescriptor,
        subcommand: Arc<dyn Subcommand>,
    ) -> Self {
        self.entries.push(Registered {
            descriptor,
            handler: subcommand,
        });
        self
    }

    /// Validates and freezes the catalog.
    ///
    /// Rejects empty names, conflicting audience flags and any name or alias
    /// claimed twice, compared case-insensitively.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        if let Err(err) = validate(&self.entries) {
            tracing::warn!(error = %err, "rejecting subcommand catalog");
            return Err(err);
        }
        Ok(Catalog {
            entries: self.entries,
        })
    }
}

fn validate(entries: &[Registered]) -> Result<(), CatalogError> {
    let mut owners: HashMap<String, &str> = HashMap::new();

    for entry in entries {
        let descriptor = &entry.descriptor;
        if descriptor.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if descriptor.only_players && descriptor.only_console {
            return Err(CatalogError::ConflictingAudience(descriptor.name.clone()));
        }
        for label in descriptor.labels() {
            let key = fold_label(label);
            if let Some(first) = owners.get(&key) {
                return Err(CatalogError::DuplicateLabel {
                    label: label.to_string(),
                    first: first.to_string(),
                    second: descriptor.name.clone(),
                });
            }
            owners.insert(key, descriptor.name.as_str());
        }
    }

    Ok(())
}
