//! Stdout-backed invocation source.

use std::io::Write;

use clap::ValueEnum;
use serde_json::json;
use sonar_command::{CallerId, HelpLine, InvocationSource, CONSOLE_NAME};
use uuid::Uuid;

/// How lines are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    /// Plain text, one message per line
    #[default]
    Text,
    /// One JSON object per line, help lines keep hover and click metadata
    Json,
}

/// The caller typing into this console.
#[derive(Debug)]
pub struct ConsoleSource {
    id: CallerId,
    name: String,
    grants: Vec<String>,
    mode: OutputMode,
}

impl ConsoleSource {
    /// The proxy console, holding every permission.
    pub fn console(mode: OutputMode) -> Self {
        Self {
            id: CallerId::Console,
            name: CONSOLE_NAME.to_string(),
            grants: vec!["*".to_string()],
            mode,
        }
    }

    /// A simulated player with an explicit grant list.
    pub fn player(name: impl Into<String>, grants: Vec<String>, mode: OutputMode) -> Self {
        Self {
            id: CallerId::Player(Uuid::new_v4()),
            name: name.into(),
            grants,
            mode,
        }
    }

    fn emit(&self, line: String) {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{}", line) {
            tracing::warn!(error = %err, "failed to write to stdout");
        }
    }
}

impl InvocationSource for ConsoleSource {
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
        match self.mode {
            OutputMode::Text => self.emit(message.to_string()),
            OutputMode::Json => self.emit(json!({ "message": message }).to_string()),
        }
    }

    fn send_line(&self, line: &HelpLine) {
        match self.mode {
            OutputMode::Text => self.emit(line.text.clone()),
            OutputMode::Json => match serde_json::to_string(line) {
                Ok(encoded) => self.emit(encoded),
                Err(err) => tracing::warn!(error = %err, "failed to encode help line"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_has_everything() {
        let source = ConsoleSource::console(OutputMode::Text);
        assert!(source.has_permission("sonar.reload"));
        assert_eq!(source.executor_name(), "Console");
    }

    #[test]
    fn test_player_grants() {
        let source = ConsoleSource::player(
            "Notch",
            vec!["sonar.command".to_string()],
            OutputMode::Json,
        );
        assert!(source.id().is_player());
        assert!(source.has_permission("sonar.command"));
        assert!(!source.has_permission("sonar.reload"));
        assert_eq!(source.executor_name(), "Notch");
    }
}
