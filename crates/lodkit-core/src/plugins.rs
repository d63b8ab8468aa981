//! Typed plugin registry.
//!
//! Plugins are named capabilities resolved at startup. A configuration maps
//! plugin names to entries; each entry names the registered `module` that
//! builds it. Unknown modules and entries without a module are rejected up
//! front, so a misconfigured runtime fails before serving anything.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{Error, Result};

/// One configured plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Name of the registered capability that builds this plugin.
    #[serde(default)]
    pub module: Option<String>,
    /// Route prefixes the plugin is mounted on.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Load order; entries without one load last.
    #[serde(default)]
    pub order: Option<i32>,
    /// Plugin-specific configuration passed to the factory.
    #[serde(default)]
    pub config: JsonValue,
}

impl PluginEntry {
    /// Entry for the given module.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            ..Default::default()
        }
    }

    /// Set the load order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Add a mount path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Set the plugin configuration.
    pub fn with_config(mut self, config: JsonValue) -> Self {
        self.config = config;
        self
    }
}

/// Plugin configuration: name → entry. A `None` entry disables that plugin.
pub type PluginsConfig = BTreeMap<String, Option<PluginEntry>>;

/// Builds a plugin instance from its configuration entry.
pub type PluginFactory<P> = Arc<dyn Fn(&PluginEntry) -> Result<P> + Send + Sync>;

/// A plugin built from configuration.
#[derive(Debug, Clone)]
pub struct LoadedPlugin<P> {
    /// Configured plugin name.
    pub name: String,
    /// The entry it was built from.
    pub entry: PluginEntry,
    /// The built instance.
    pub instance: P,
}

/// Registry mapping module names to factories.
pub struct PluginRegistry<P> {
    factories: HashMap<String, PluginFactory<P>>,
}

impl<P> PluginRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory. Replaces any existing factory with the same name.
    pub fn register<F>(&mut self, module: impl Into<String>, factory: F)
    where
        F: Fn(&PluginEntry) -> Result<P> + Send + Sync + 'static,
    {
        let module = module.into();
        debug!(subsystem = "plugins", module = %module, "Registered plugin module");
        self.factories.insert(module, Arc::new(factory));
    }

    /// Check whether a module is registered.
    pub fn has_module(&self, module: &str) -> bool {
        self.factories.contains_key(module)
    }

    /// List registered module names, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check a configuration without building anything.
    pub fn validate(&self, plugins: &PluginsConfig) -> Result<()> {
        for (name, entry) in plugins {
            if let Some(entry) = entry {
                self.factory_for(name, entry)?;
            }
        }
        Ok(())
    }

    /// Build every enabled plugin, ordered by `order` then name.
    pub fn load(&self, plugins: &PluginsConfig) -> Result<Vec<LoadedPlugin<P>>> {
        let mut enabled: Vec<(&String, &PluginEntry)> = plugins
            .iter()
            .filter_map(|(name, entry)| entry.as_ref().map(|e| (name, e)))
            .collect();
        enabled.sort_by(|(a_name, a), (b_name, b)| {
            compare_order(a.order, b.order).then_with(|| a_name.cmp(b_name))
        });

        let mut loaded = Vec::with_capacity(enabled.len());
        for (name, entry) in enabled {
            let factory = self.factory_for(name, entry)?;
            let instance = factory(entry)?;
            debug!(subsystem = "plugins", plugin = %name, "Loaded plugin");
            loaded.push(LoadedPlugin {
                name: name.clone(),
                entry: entry.clone(),
                instance,
            });
        }
        Ok(loaded)
    }

    fn factory_for(&self, name: &str, entry: &PluginEntry) -> Result<&PluginFactory<P>> {
        let module = entry
            .module
            .as_deref()
            .ok_or_else(|| Error::Config(format!("plugin '{}' has no module configured", name)))?;
        self.factories.get(module).ok_or_else(|| {
            Error::Config(format!(
                "plugin '{}' references unknown module '{}'",
                name, module
            ))
        })
    }
}

impl<P> Default for PluginRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_order(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PluginRegistry<String> {
        let mut registry = PluginRegistry::new();
        registry.register("health", |_| Ok("health".to_string()));
        registry.register("static", |entry: &PluginEntry| {
            let dir = entry
                .config
                .get("directory")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::Config("static plugin needs a directory".into()))?;
            Ok(format!("static:{}", dir))
        });
        registry
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry: PluginRegistry<()> = PluginRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(!registry.has_module("health"));
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.has_module("health"));
        assert_eq!(registry.modules(), vec!["health", "static"]);
    }

    #[test]
    fn test_load_skips_disabled_entries() {
        let mut plugins = PluginsConfig::new();
        plugins.insert("health".into(), Some(PluginEntry::new("health")));
        plugins.insert("locals".into(), None);

        let loaded = registry().load(&plugins).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "health");
        assert_eq!(loaded[0].instance, "health");
    }

    #[test]
    fn test_load_rejects_missing_module() {
        let mut plugins = PluginsConfig::new();
        plugins.insert("broken".into(), Some(PluginEntry::default()));

        let err = registry().load(&plugins).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: plugin 'broken' has no module configured"
        );
    }

    #[test]
    fn test_validate_rejects_unknown_module() {
        let mut plugins = PluginsConfig::new();
        plugins.insert("x".into(), Some(PluginEntry::new("does-not-exist")));

        let err = registry().validate(&plugins).unwrap_err();
        assert!(err.to_string().contains("unknown module 'does-not-exist'"));
    }

    #[test]
    fn test_load_orders_by_order_then_name() {
        let mut plugins = PluginsConfig::new();
        plugins.insert("zeta".into(), Some(PluginEntry::new("health")));
        plugins.insert("alpha".into(), Some(PluginEntry::new("health")));
        plugins.insert("late".into(), Some(PluginEntry::new("health").with_order(11)));
        plugins.insert("early".into(), Some(PluginEntry::new("health").with_order(1)));

        let names: Vec<String> = registry()
            .load(&plugins)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["early", "late", "alpha", "zeta"]);
    }

    #[test]
    fn test_factory_receives_entry_config() {
        let mut plugins = PluginsConfig::new();
        plugins.insert(
            "templateStaticFiles".into(),
            Some(
                PluginEntry::new("static")
                    .with_path("/static/core")
                    .with_config(serde_json::json!({ "directory": "/srv/static" })),
            ),
        );

        let loaded = registry().load(&plugins).unwrap();
        assert_eq!(loaded[0].instance, "static:/srv/static");
        assert_eq!(loaded[0].entry.paths, vec!["/static/core"]);
    }

    #[test]
    fn test_factory_error_propagates() {
        let mut plugins = PluginsConfig::new();
        plugins.insert("files".into(), Some(PluginEntry::new("static")));

        assert!(registry().load(&plugins).is_err());
    }

    #[test]
    fn test_entry_deserializes_from_json() {
        let plugins: PluginsConfig = serde_json::from_value(serde_json::json!({
            "health": { "module": "health" },
            "locals": null,
            "files": { "module": "static", "paths": ["/static"], "order": 3,
                       "config": { "directory": "public" } }
        }))
        .unwrap();

        assert_eq!(plugins.len(), 3);
        assert!(plugins["locals"].is_none());
        let files = plugins["files"].as_ref().unwrap();
        assert_eq!(files.order, Some(3));
        assert_eq!(files.paths, vec!["/static"]);
    }
}
