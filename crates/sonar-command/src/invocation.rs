//! The per-call context handed to a subcommand.

use crate::caller::InvocationSource;
use crate::catalog::SubcommandDescriptor;
use crate::config::Messages;

/// Everything a subcommand needs to run one invocation.
///
/// Created by the dispatcher after every check has passed and dropped when
/// the subcommand returns. `arguments` holds the raw tokens, including the
/// subcommand label at index 0.
pub struct CommandInvocation<'a> {
    executor_name: String,
    source: &'a dyn InvocationSource,
    descriptor: &'a SubcommandDescriptor,
    arguments: &'a [String],
    messages: &'a Messages,
}

impl<'a> CommandInvocation<'a> {
    pub fn new(
        source: &'a dyn InvocationSource,
        descriptor: &'a SubcommandDescriptor,
        arguments: &'a [String],
        messages: &'a Messages,
    ) -> Self {
        Self {
            executor_name: source.executor_name(),
            source,
            descriptor,
            arguments,
            messages,
        }
    }

    /// `"Console"` for the console, the caller's display name otherwise.
    pub fn executor_name(&self) -> &str {
        &self.executor_name
    }

    pub fn source(&self) -> &'a dyn InvocationSource {
        self.source
    }

    pub fn descriptor(&self) -> &'a SubcommandDescriptor {
        self.descriptor
    }

    pub fn arguments(&self) -> &'a [String] {
        self.arguments
    }

    /// Token at `index`, counting the subcommand label as 0.
    pub fn argument(&self, index: usize) -> Option<&'a str> {
        self.arguments.get(index).map(String::as_str)
    }

    /// Sends a line back to the caller.
    pub fn reply(&self, message: &str) {
        self.source.send_message(message);
    }

    /// Sends the incorrect-usage message for this subcommand.
    ///
    /// For subcommands that validate their own arguments past the first one.
    pub fn incorrect_usage(&self) {
        self.reply(&self.messages.incorrect_usage(&self.descriptor.usage()));
    }
}
