//! Caller identity and the host-side source abstraction.
//!
//! [`CallerId`] is the key the dispatcher uses for rate limiting. It is a
//! closed set of variants, so the caller class ([`CallerClass`]) falls out of
//! the identity itself instead of being inspected at runtime.
//!
//! [`InvocationSource`] is what the host hands the dispatcher for every call:
//! identity, display name, a permission predicate and an output sink.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Mutex;

use uuid::Uuid;

use crate::help::HelpLine;

/// Executor name reported for console invocations.
pub const CONSOLE_NAME: &str = "Console";

/// Identifies who issued an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallerId {
    /// The proxy console. Exempt from cooldowns.
    Console,
    /// An online player, keyed by their unique id.
    Player(Uuid),
    /// Any other remote source, keyed by its connection address.
    Connection(SocketAddr),
}

impl CallerId {
    /// Returns the class of this caller.
    pub fn class(&self) -> CallerClass {
        match self {
            CallerId::Console => CallerClass::Console,
            CallerId::Player(_) => CallerClass::Player,
            CallerId::Connection(_) => CallerClass::Other,
        }
    }

    /// Returns true for the console.
    pub fn is_console(&self) -> bool {
        matches!(self, CallerId::Console)
    }

    /// Returns true for players.
    pub fn is_player(&self) -> bool {
        matches!(self, CallerId::Player(_))
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerId::Console => write!(f, "console"),
            CallerId::Player(id) => write!(f, "player:{}", id),
            CallerId::Connection(addr) => write!(f, "connection:{}", addr),
        }
    }
}

/// The audience class of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerClass {
    Console,
    Player,
    Other,
}

/// A caller as seen by the dispatcher.
///
/// Implemented by the host's transport layer. Implementations must be cheap
/// to call repeatedly; the dispatcher never caches their answers.
pub trait InvocationSource: Send + Sync {
    /// Stable identity of this caller.
    fn id(&self) -> CallerId;

    /// Human readable name (usually the player's username).
    fn display_name(&self) -> String;

    /// Whether this caller holds the given permission token.
    fn has_permission(&self, permission: &str) -> bool;

    /// Delivers one line of output to the caller.
    fn send_message(&self, message: &str);

    /// Delivers one help line. Transports that support hover and click
    /// metadata override this; the default sends the plain text.
    fn send_line(&self, line: &HelpLine) {
        self.send_message(&line.text);
    }

    /// Name passed to subcommands as the executor.
    ///
    /// Console invocations always report [`CONSOLE_NAME`].
    fn executor_name(&self) -> String {
        if self.id().is_console() {
            CONSOLE_NAME.to_string()
        } else {
            self.display_name()
        }
    }
}

/// In-memory source for tests and embedding.
///
/// Records every message sent to it and answers permission checks from a
/// fixed grant list. `"*"` grants everything.
#[derive(Debug)]
pub struct MockSource {
    id: CallerId,
    name: String,
    grants: Vec<String>,
    messages: Mutex<Vec<String>>,
}

impl MockSource {
    /// Creates the console source. The console holds every permission.
    pub fn console() -> Self {
        Self::new(CallerId::Console, CONSOLE_NAME).grant("*")
    }

    /// Creates a player source with a fresh random id.
    pub fn player(name: impl Into<String>) -> Self {
        Self::new(CallerId::Player(Uuid::new_v4()), name)
    }

    /// Creates a source with an explicit identity and no permissions.
    pub fn new(id: CallerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            grants: Vec::new(),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Adds a permission grant.
    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.grants.push(permission.into());
        self
    }

    /// Returns a copy of everything sent so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Drains the recorded messages.
    pub fn take_messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|mut m| std::mem::take(&mut *m))
            .unwrap_or_default()
    }
}

impl InvocationSource for MockSource {
    fn id(&self) -> CallerId {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.grants.iter().any(|g| g == "*" || g == permission)
    }

    fn send_message(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
