//! Host configuration: cooldown window, permission, help header and the
//! message templates the dispatcher fills in.
//!
//! Configuration is plain YAML. Every key is optional; omitted keys keep
//! their defaults.
//!
//! ```yaml
//! cooldown-ms: 750
//! platform: bungeecord
//! messages:
//!   no-permission: "Missing %permission%."
//! ```
//!
//! Templates are opaque strings with placeholders:
//!
//! | Template          | Placeholder    |
//! |-------------------|----------------|
//! | `cooldown-left`   | `%time-left%`  |
//! | `no-permission`   | `%permission%` |
//! | `incorrect-usage` | `%usage%`      |

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TIME_LEFT_PLACEHOLDER: &str = "%time-left%";
pub const PERMISSION_PLACEHOLDER: &str = "%permission%";
pub const USAGE_PLACEHOLDER: &str = "%usage%";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("cooldown-ms must be greater than zero")]
    InvalidCooldown,
}

/// Proxy platform shown in the help header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Velocity,
    Bungeecord,
    Bukkit,
}

impl Platform {
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Velocity => "Velocity",
            Platform::Bungeecord => "BungeeCord",
            Platform::Bukkit => "Bukkit",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Message templates sent to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Messages {
    pub cooldown: String,
    pub cooldown_left: String,
    pub no_permission: String,
    pub players_only: String,
    pub console_only: String,
    pub incorrect_usage: String,
    pub command_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            cooldown: "Please wait before executing this command again.".into(),
            cooldown_left: "You can execute this command again in %time-left% seconds.".into(),
            no_permission: "You do not have permission to execute this subcommand. (%permission%)"
                .into(),
            players_only: "You can only execute this command as a player.".into(),
            console_only:
                "For security reasons, you can only execute this command through console.".into(),
            incorrect_usage: "Usage: /sonar %usage%".into(),
            command_failed: "An error occurred while executing this command.".into(),
        }
    }
}

impl Messages {
    pub fn cooldown_left(&self, remaining: Duration) -> String {
        fill(&self.cooldown_left, TIME_LEFT_PLACEHOLDER, &format_seconds(remaining))
    }

    pub fn no_permission(&self, permission: &str) -> String {
        fill(&self.no_permission, PERMISSION_PLACEHOLDER, permission)
    }

    pub fn incorrect_usage(&self, usage: &str) -> String {
        fill(&self.incorrect_usage, USAGE_PLACEHOLDER, usage)
    }
}

/// Everything the dispatcher takes from the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CommandConfig {
    /// Root command label, used in help lines (`/sonar ...`).
    pub command: String,
    /// Permission required to use the command family at all.
    pub command_permission: String,
    /// Minimum time between accepted invocations of one caller.
    pub cooldown_ms: u64,
    pub version: String,
    pub platform: Platform,
    pub support_url: String,
    pub messages: Messages,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            command: "sonar".into(),
            command_permission: "sonar.command".into(),
            cooldown_ms: 500,
            version: env!("CARGO_PKG_VERSION").into(),
            platform: Platform::default(),
            support_url: "https://jonesdev.xyz/discord/".into(),
            messages: Messages::default(),
        }
    }
}

impl CommandConfig {
    /// Parses configuration from a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CommandConfig = if source.trim().is_empty() {
            CommandConfig::default()
        } else {
            serde_yaml::from_str(source)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cooldown_ms == 0 {
            return Err(ConfigError::InvalidCooldown);
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

fn fill(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(placeholder, value)
}

/// Formats a duration as seconds with at most two decimals.
///
/// Rounds to the nearest hundredth with halves going up, drops trailing
/// zeros and keeps the leading zero: `500ms` is `"0.5"`, `125ms` is
/// `"0.13"`, `2s` is `"2"`.
pub fn format_seconds(duration: Duration) -> String {
    let hundredths = (duration.as_secs_f64() * 100.0).round() as u64;
    let whole = hundredths / 100;
    let fraction = hundredths % 100;

    if fraction == 0 {
        whole.to_string()
    } else if fraction % 10 == 0 {
        format!("{}.{}", whole, fraction / 10)
    } else {
        format!("{}.{:02}", whole, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CommandConfig::default();
        assert_eq!(config.cooldown(), Duration::from_millis(500));
        assert_eq!(config.command_permission, "sonar.command");
        assert_eq!(config.platform, Platform::Velocity);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(Duration::from_millis(500)), "0.5");
        assert_eq!(format_seconds(Duration::from_millis(120)), "0.12");
        assert_eq!(format_seconds(Duration::from_millis(123)), "0.12");
        assert_eq!(format_seconds(Duration::from_millis(126)), "0.13");
        // halves round up, not to even
        assert_eq!(format_seconds(Duration::from_millis(125)), "0.13");
        assert_eq!(format_seconds(Duration::from_millis(5)), "0.01");
        assert_eq!(format_seconds(Duration::from_millis(2000)), "2");
        assert_eq!(format_seconds(Duration::from_millis(1)), "0");
        assert_eq!(format_seconds(Duration::from_millis(1050)), "1.05");
    }

    #[test]
    fn test_templates() {
        let messages = Messages::default();
        assert_eq!(
            messages.cooldown_left(Duration::from_millis(250)),
            "You can execute this command again in 0.25 seconds."
        );
        assert!(messages.no_permission("sonar.reload").contains("(sonar.reload)"));
        assert_eq!(messages.incorrect_usage("verbose (on)"), "Usage: /sonar verbose (on)");
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
cooldown-ms: 750
platform: bungeecord
messages:
  no-permission: "Missing %permission%."
"#;
        let config = CommandConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.cooldown(), Duration::from_millis(750));
        assert_eq!(config.platform, Platform::Bungeecord);
        assert_eq!(config.messages.no_permission("sonar.x"), "Missing sonar.x.");
        // untouched keys keep defaults
        assert_eq!(config.messages.players_only, Messages::default().players_only);
        assert_eq!(config.command, "sonar");
    }

    #[test]
    fn test_from_yaml_empty_is_default() {
        let config = CommandConfig::from_yaml_str("").unwrap();
        assert_eq!(config, CommandConfig::default());
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let err = CommandConfig::from_yaml_str("cooldown-ms: 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCooldown));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = CommandConfig::from_yaml_str("cooldown-ms: [not, a, number]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "command: antibot").unwrap();
        writeln!(file, "support-url: https://example.com/help").unwrap();

        let config = CommandConfig::from_path(file.path()).unwrap();
        assert_eq!(config.command, "antibot");
        assert_eq!(config.support_url, "https://example.com/help");
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandConfig::from_path(dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("missing.yml"));
    }
}
