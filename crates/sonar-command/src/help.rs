//! The cached help listing shown for `/sonar` without a known subcommand.
//!
//! The listing depends only on the catalog and the configuration, both of
//! which are fixed once the dispatcher exists, so it is built on first use
//! and reused for the lifetime of the [`HelpCache`]. There is no
//! invalidation path.

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::catalog::{Catalog, SubcommandDescriptor};
use crate::config::CommandConfig;

const CHECK_MARK: &str = "✔";
const CROSS_MARK: &str = "✗";

/// What happens when a caller clicks a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ClickAction {
    OpenUrl(String),
    SuggestCommand(String),
}

/// One line of the help listing.
///
/// `hover` and `click` are passed through to the transport as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HelpLine {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<ClickAction>,
}

impl HelpLine {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_hover(mut self, hover: impl Into<String>) -> Self {
        self.hover = Some(hover.into());
        self
    }

    pub fn with_click(mut self, click: ClickAction) -> Self {
        self.click = Some(click);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.hover.is_none() && self.click.is_none()
    }
}

/// Lazily built, immutable help listing.
#[derive(Debug, Default)]
pub struct HelpCache {
    lines: OnceCell<Vec<HelpLine>>,
}

impl HelpCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the listing, building it on first call.
    ///
    /// Concurrent first callers block until the single build finishes and
    /// then all observe the same slice.
    pub fn lines(&self, catalog: &Catalog, config: &CommandConfig) -> &[HelpLine] {
        self.lines.get_or_init(|| {
            let lines = build_help(catalog, config);
            tracing::debug!(lines = lines.len(), "built help listing");
            lines
        })
    }

    pub fn is_built(&self) -> bool {
        self.lines.get().is_some()
    }
}

fn build_help(catalog: &Catalog, config: &CommandConfig) -> Vec<HelpLine> {
    let mut lines = Vec::with_capacity(catalog.len() + 6);

    lines.push(HelpLine::empty());
    lines.push(HelpLine::text(format!(
        " Running Sonar {} on {}",
        config.version,
        config.platform.display_name()
    )));
    lines.push(HelpLine::empty());
    lines.push(
        HelpLine::text(format!(" Need help? {}", config.support_url))
            .with_hover("Click to open Discord")
            .with_click(ClickAction::OpenUrl(config.support_url.clone())),
    );
    lines.push(HelpLine::empty());

    for descriptor in catalog.descriptors() {
        lines.push(subcommand_line(&config.command, descriptor));
    }

    lines.push(HelpLine::empty());
    lines
}

fn subcommand_line(command: &str, descriptor: &SubcommandDescriptor) -> HelpLine {
    let hover = format!(
        "Only players: {}\nRequire console: {}\nPermission: {}\nAliases: {}",
        mark(descriptor.is_only_players()),
        mark(descriptor.is_only_console()),
        descriptor.permission_token(),
        descriptor.aliases_summary(),
    );

    HelpLine::text(format!(
        " ▪ /{} {} {}",
        command,
        descriptor.name(),
        descriptor.description_text()
    ))
    .with_hover(hover)
    .with_click(ClickAction::SuggestCommand(format!(
        "/{} {} ",
        command,
        descriptor.name()
    )))
}

fn mark(flag: bool) -> &'static str {
    if flag {
        CHECK_MARK
    } else {
        CROSS_MARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FnSubcommand;
    use crate::invocation::CommandInvocation;
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::builder()
            .register(
                SubcommandDescriptor::new("reload")
                    .alias("rl")
                    .description("Reload the configuration"),
                FnSubcommand::new(|_: &CommandInvocation<'_>| Ok(())),
            )
            .register(
                SubcommandDescriptor::new("verbose")
                    .description("Toggle the action bar")
                    .only_players(),
                FnSubcommand::new(|_: &CommandInvocation<'_>| Ok(())),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_layout() {
        let config = CommandConfig {
            version: "2.1.0".into(),
            ..CommandConfig::default()
        };
        let cache = HelpCache::new();
        let lines = cache.lines(&catalog(), &config);

        assert_eq!(lines.len(), 8);
        assert!(lines[0].is_empty());
        assert_eq!(lines[1].text, " Running Sonar 2.1.0 on Velocity");
        assert!(lines[2].is_empty());
        assert_eq!(
            lines[3].click,
            Some(ClickAction::OpenUrl("https://jonesdev.xyz/discord/".into()))
        );
        assert!(lines[4].is_empty());
        assert_eq!(lines[5].text, " ▪ /sonar reload Reload the configuration");
        assert_eq!(lines[6].text, " ▪ /sonar verbose Toggle the action bar");
        assert!(lines[7].is_empty());
    }

    #[test]
    fn test_subcommand_hover() {
        let cache = HelpCache::new();
        let lines = cache.lines(&catalog(), &CommandConfig::default());

        assert_eq!(
            lines[5].hover.as_deref(),
            Some("Only players: ✗\nRequire console: ✗\nPermission: sonar.reload\nAliases: rl")
        );
        assert_eq!(
            lines[6].hover.as_deref(),
            Some("Only players: ✔\nRequire console: ✗\nPermission: sonar.verbose\nAliases: No aliases.")
        );
        assert_eq!(
            lines[6].click,
            Some(ClickAction::SuggestCommand("/sonar verbose ".into()))
        );
    }

    #[test]
    fn test_empty_catalog_still_builds_once() {
        let cache = HelpCache::new();
        assert!(!cache.is_built());

        let first = cache.lines(&Catalog::empty(), &CommandConfig::default());
        assert_eq!(first.len(), 6);
        assert!(cache.is_built());

        let second = cache.lines(&catalog(), &CommandConfig::default());
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let cache = Arc::new(HelpCache::new());
        let catalog = Arc::new(catalog());
        let config = Arc::new(CommandConfig::default());

        let addresses: Vec<usize> = (0..8)
            .map(|_| {
                let (cache, catalog, config) = (cache.clone(), catalog.clone(), config.clone());
                std::thread::spawn(move || cache.lines(&catalog, &config).as_ptr() as usize)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.lines(&catalog, &config).len(), 8);
    }

    #[test]
    fn test_help_line_serializes() {
        let line = HelpLine::text("x").with_click(ClickAction::OpenUrl("https://a".into()));
        let yaml = serde_yaml::to_string(&line).unwrap();
        assert!(yaml.contains("open_url"));
        assert!(yaml.contains("https://a"));
        assert!(!yaml.contains("hover"));
    }
}
