//! Tab completion for the command line front end.
//!
//! Two lookup structures are derived from the catalog on first use: the
//! flat list of subcommand labels, and a map from subcommand name to its
//! argument names. Both live for as long as the [`CompletionCache`].

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::catalog::{fold_label, Catalog};

#[derive(Debug, Default)]
pub struct CompletionCache {
    labels: OnceCell<Vec<String>>,
    arguments: OnceCell<HashMap<String, Vec<String>>>,
}

impl CompletionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggestions for the tokens typed so far.
    ///
    /// - 0 or 1 tokens: every subcommand name followed by its aliases
    /// - 2 tokens: argument names of the subcommand named by the first token
    /// - more: nothing
    pub fn suggest<S: AsRef<str>>(&self, catalog: &Catalog, tokens: &[S]) -> Vec<String> {
        match tokens {
            [] | [_] => self.labels(catalog).to_vec(),
            [name, _] => self
                .arguments(catalog)
                .get(&fold_label(name.as_ref()))
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// All names and aliases, catalog order then alias order.
    pub fn labels(&self, catalog: &Catalog) -> &[String] {
        self.labels.get_or_init(|| {
            catalog
                .descriptors()
                .flat_map(|d| {
                    std::iter::once(d.name().to_string()).chain(d.alias_list().iter().cloned())
                })
                .collect()
        })
    }

    /// Lowercased subcommand name to argument names.
    pub fn arguments(&self, catalog: &Catalog) -> &HashMap<String, Vec<String>> {
        self.arguments.get_or_init(|| {
            catalog
                .descriptors()
                .map(|d| (fold_label(d.name()), d.argument_names()))
                .collect()
        })
    }

    pub fn is_built(&self) -> bool {
        self.labels.get().is_some() && self.arguments.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FnSubcommand, SubcommandDescriptor};
    use crate::invocation::CommandInvocation;
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::builder()
            .register(
                SubcommandDescriptor::new("blacklist")
                    .aliases(["bl", "deny"])
                    .arguments(["add", "remove", "clear", "size"]),
                FnSubcommand::new(|_: &CommandInvocation<'_>| Ok(())),
            )
            .register(
                SubcommandDescriptor::new("reload").alias("rl"),
                FnSubcommand::new(|_: &CommandInvocation<'_>| Ok(())),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_labels_for_zero_and_one_token() {
        let cache = CompletionCache::new();
        let catalog = catalog();
        let expected = vec!["blacklist", "bl", "deny", "reload", "rl"];

        assert_eq!(cache.suggest::<&str>(&catalog, &[]), expected);
        assert_eq!(cache.suggest(&catalog, &["bla"]), expected);
    }

    #[test]
    fn test_arguments_for_two_tokens() {
        let cache = CompletionCache::new();
        let catalog = catalog();

        assert_eq!(
            cache.suggest(&catalog, &["BLACKLIST", ""]),
            vec!["add", "remove", "clear", "size"]
        );
        assert!(cache.suggest(&catalog, &["reload", ""]).is_empty());
        assert!(cache.suggest(&catalog, &["unknown", ""]).is_empty());
    }

    #[test]
    fn test_nothing_for_three_tokens() {
        let cache = CompletionCache::new();
        assert!(cache
            .suggest(&catalog(), &["blacklist", "add", "1.2.3.4"])
            .is_empty());
    }

    #[test]
    fn test_built_lazily_and_kept() {
        let cache = CompletionCache::new();
        assert!(!cache.is_built());

        let first = cache.labels(&catalog()).as_ptr();
        cache.arguments(&catalog());
        assert!(cache.is_built());

        // a later, different catalog does not rebuild
        assert_eq!(cache.labels(&Catalog::empty()).as_ptr(), first);
        assert_eq!(cache.labels(&Catalog::empty()).len(), 5);
    }

    #[test]
    fn test_empty_catalog() {
        let cache = CompletionCache::new();
        assert!(cache.suggest::<&str>(&Catalog::empty(), &[]).is_empty());
        assert!(cache.suggest(&Catalog::empty(), &["x", ""]).is_empty());
    }

    #[test]
    fn test_concurrent_first_access() {
        let cache = Arc::new(CompletionCache::new());
        let catalog = Arc::new(catalog());

        let results: Vec<(usize, usize)> = (0..8)
            .map(|_| {
                let (cache, catalog) = (cache.clone(), catalog.clone());
                std::thread::spawn(move || {
                    let labels = cache.labels(&catalog).as_ptr() as usize;
                    let arguments = cache.arguments(&catalog) as *const _ as usize;
                    (labels, arguments)
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
