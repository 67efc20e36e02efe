// ABOUTME: Name-to-factory table for extension hooks.
// ABOUTME: Populated once at startup; lookups of unknown names are configuration errors.

use std::collections::BTreeMap;
use std::fmt;

use super::ExtensionHook;
use super::builtin::{ComposerInstall, DoctrineMigrations, SCRIPT_PREFIX, ScriptHook};
use crate::deploy::DeployError;

/// Builds a fresh hook instance.
pub type HookFactory = fn() -> Box<dyn ExtensionHook>;

/// Registry of hook factories keyed by the name used in `processes`.
#[derive(Default)]
pub struct HookRegistry {
    factories: BTreeMap<String, HookFactory>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HookRegistry {
    /// Registry containing the hooks shipped with releaser.
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        registry.register(DoctrineMigrations::NAME, || Box::new(DoctrineMigrations));
        registry.register(ComposerInstall::NAME, || Box::new(ComposerInstall));
        registry
    }

    /// Add or replace a factory.
    pub fn register(&mut self, name: &str, factory: HookFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name) || name.starts_with(SCRIPT_PREFIX)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate the hook registered under `name`.
    ///
    /// `script:<path>` names resolve to a [`ScriptHook`] without registration.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn ExtensionHook>, DeployError> {
        let name = name.trim();
        if let Some(script) = name.strip_prefix(SCRIPT_PREFIX) {
            return ScriptHook::new(script).map(|hook| Box::new(hook) as Box<dyn ExtensionHook>);
        }

        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| {
                let known: Vec<_> = self.names().collect();
                DeployError::config_error(format!(
                    "unknown hook '{name}' (known: {}, or {SCRIPT_PREFIX}<path>)",
                    known.join(", ")
                ))
            })
    }

    /// Resolve every name, failing before any instance is returned.
    pub fn resolve_all(
        &self,
        names: &[String],
    ) -> Result<Vec<Box<dyn ExtensionHook>>, DeployError> {
        names.iter().map(|name| self.resolve(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::DeployErrorKind;

    #[test]
    fn builtins_are_registered() {
        let registry = HookRegistry::with_builtins();
        assert!(registry.contains("doctrine-migrations"));
        assert!(registry.contains("composer-install"));
        assert!(registry.contains("script:bin/warmup"));
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn unknown_name_is_configuration_error() {
        let registry = HookRegistry::with_builtins();
        let err = registry.resolve("AppBundle\\CacheWarm").err().unwrap();
        assert_eq!(err.kind(), DeployErrorKind::Configuration);
        assert!(err.to_string().contains("unknown hook"));
    }

    #[test]
    fn resolve_all_fails_if_any_name_is_unknown() {
        let registry = HookRegistry::with_builtins();
        let names = vec!["composer-install".to_string(), "missing".to_string()];
        assert!(registry.resolve_all(&names).is_err());
    }

    #[test]
    fn resolve_all_keeps_order() {
        let registry = HookRegistry::with_builtins();
        let names = vec![
            "doctrine-migrations".to_string(),
            "composer-install".to_string(),
        ];
        let hooks = registry.resolve_all(&names).unwrap();
        let resolved: Vec<_> = hooks.iter().map(|h| h.name().to_string()).collect();
        assert_eq!(resolved, names);
    }
}
