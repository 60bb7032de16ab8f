//! Matching an invocation to a subcommand and checking whether the caller
//! may run it.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! ```text
//! permission (skipped for console-only subcommands)
//!   → audience (players-only / console-only)
//!   → argument count
//! ```

use crate::caller::{CallerClass, InvocationSource};
use crate::catalog::{Catalog, Registered, SubcommandDescriptor};
use crate::outcome::{Audience, Rejection};

/// Finds the subcommand named by the first token.
///
/// Returns `None` for an empty token list. Names and aliases compare
/// case-insensitively; the first catalog entry that matches wins.
pub fn resolve<'c, S: AsRef<str>>(catalog: &'c Catalog, arguments: &[S]) -> Option<&'c Registered> {
    let label = arguments.first()?;
    catalog.find(label.as_ref())
}

/// Checks the caller and the supplied token count against `descriptor`.
///
/// `supplied` counts every token, including the subcommand label itself.
pub fn authorize(
    descriptor: &SubcommandDescriptor,
    source: &dyn InvocationSource,
    supplied: usize,
) -> Result<(), Rejection> {
    if !descriptor.is_only_console() && !source.has_permission(descriptor.permission_token()) {
        return Err(Rejection::NoPermission(
            descriptor.permission_token().to_string(),
        ));
    }

    let class = source.id().class();
    if descriptor.is_only_players() && class != CallerClass::Player {
        return Err(Rejection::WrongAudience(Audience::PlayersOnly));
    }
    if descriptor.is_only_console() && class != CallerClass::Console {
        return Err(Rejection::WrongAudience(Audience::ConsoleOnly));
    }

    if !descriptor.argument_specs().is_empty() && supplied <= 1 {
        return Err(Rejection::UsageError {
            name: descriptor.name().to_string(),
            arguments: descriptor.arguments_summary(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::{CallerId, MockSource};
    use crate::catalog::FnSubcommand;
    use crate::invocation::CommandInvocation;

    fn catalog() -> Catalog {
        Catalog::builder()
            .register(
                SubcommandDescriptor::new("reload").alias("rl"),
                FnSubcommand::new(|_: &CommandInvocation<'_>| Ok(())),
            )
            .register(
                SubcommandDescriptor::new("blacklist")
                    .alias("bl")
                    .arguments(["add", "remove"]),
                FnSubcommand::new(|_: &CommandInvocation<'_>| Ok(())),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_empty_is_none() {
        assert!(resolve::<&str>(&catalog(), &[]).is_none());
    }

    #[test]
    fn test_resolve_name_and_alias() {
        let catalog = catalog();
        for label in ["blacklist", "BLACKLIST", "BlackList", "bl", "BL"] {
            let found = resolve(&catalog, &[label]).unwrap();
            assert_eq!(found.descriptor().name(), "blacklist", "label {}", label);
        }
        assert!(resolve(&catalog, &["stats"]).is_none());
    }

    #[test]
    fn test_permission_checked_first() {
        // fails permission, audience and usage at once; permission is reported
        let descriptor = SubcommandDescriptor::new("verbose")
            .only_players()
            .argument("on");
        let source = MockSource::new(
            CallerId::Connection("10.0.0.1:1234".parse().unwrap()),
            "remote",
        );

        assert_eq!(
            authorize(&descriptor, &source, 1),
            Err(Rejection::NoPermission("sonar.verbose".into()))
        );
    }

    #[test]
    fn test_console_only_skips_permission() {
        let descriptor = SubcommandDescriptor::new("dump").only_console();
        let player = MockSource::player("Alex");

        assert_eq!(
            authorize(&descriptor, &player, 1),
            Err(Rejection::WrongAudience(Audience::ConsoleOnly))
        );
        let console = MockSource::new(CallerId::Console, "Console");
        assert_eq!(authorize(&descriptor, &console, 1), Ok(()));
    }

    #[test]
    fn test_players_only() {
        let descriptor = SubcommandDescriptor::new("verbose").only_players();

        assert_eq!(
            authorize(&descriptor, &MockSource::console(), 1),
            Err(Rejection::WrongAudience(Audience::PlayersOnly))
        );
        let player = MockSource::player("Alex").grant("sonar.verbose");
        assert_eq!(authorize(&descriptor, &player, 1), Ok(()));
    }

    #[test]
    fn test_connection_fails_both_audiences() {
        let remote = MockSource::new(
            CallerId::Connection("10.0.0.9:25565".parse().unwrap()),
            "remote",
        )
        .grant("*");

        let players_only = SubcommandDescriptor::new("verbose").only_players();
        assert_eq!(
            authorize(&players_only, &remote, 1),
            Err(Rejection::WrongAudience(Audience::PlayersOnly))
        );

        let console_only = SubcommandDescriptor::new("dump").only_console();
        assert_eq!(
            authorize(&console_only, &remote, 1),
            Err(Rejection::WrongAudience(Audience::ConsoleOnly))
        );

        let open = SubcommandDescriptor::new("reload");
        assert_eq!(authorize(&open, &remote, 1), Ok(()));
    }

    #[test]
    fn test_usage_requires_a_token_past_the_label() {
        let descriptor = SubcommandDescriptor::new("blacklist").arguments(["add", "remove"]);
        let console = MockSource::console();

        assert_eq!(
            authorize(&descriptor, &console, 1),
            Err(Rejection::UsageError {
                name: "blacklist".into(),
                arguments: "add, remove".into(),
            })
        );
        assert_eq!(authorize(&descriptor, &console, 2), Ok(()));
    }
}
