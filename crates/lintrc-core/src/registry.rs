//! External collaborators: preset registries and rule catalog providers
//!
//! The engine never reads files or consults a global rule table on its own;
//! it is handed a [`PresetRegistry`] to resolve preset refs and a
//! [`RuleCatalogProvider`] to answer which rule names the declared plugins
//! supply. Both are explicit instances threaded through every call.

use crate::document::ConfigDocument;
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Backing store resolving preset refs to raw documents
///
/// Loading may involve I/O and is async so a resolution can be cancelled
/// mid-load; implementations must not expose partially parsed documents.
#[async_trait]
pub trait PresetRegistry: Send + Sync {
    /// Resolve a preset ref to its document
    async fn load(&self, preset: &str) -> Result<ConfigDocument>;
}

/// Registry over a fixed set of documents, for embedding and tests
#[derive(Debug, Default, Clone)]
pub struct InMemoryPresetRegistry {
    docs: HashMap<String, ConfigDocument>,
}

impl InMemoryPresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under a preset ref
    pub fn insert(&mut self, preset: impl Into<String>, doc: ConfigDocument) {
        self.docs.insert(preset.into(), doc);
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with_preset(mut self, preset: impl Into<String>, doc: ConfigDocument) -> Self {
        self.insert(preset, doc);
        self
    }
}

#[async_trait]
impl PresetRegistry for InMemoryPresetRegistry {
    async fn load(&self, preset: &str) -> Result<ConfigDocument> {
        self.docs
            .get(preset)
            .cloned()
            .ok_or_else(|| ConfigError::unknown_preset(preset, "<registry>"))
    }
}

/// Registry backed by a directory of `<ref>.json` / `<ref>.yaml` documents
///
/// This is the serialization boundary: the engine itself only ever sees
/// parsed [`ConfigDocument`] values.
#[derive(Debug, Clone)]
pub struct FsPresetRegistry {
    root: PathBuf,
}

impl FsPresetRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, preset: &str) -> [PathBuf; 3] {
        [
            self.root.join(format!("{preset}.json")),
            self.root.join(format!("{preset}.yaml")),
            self.root.join(format!("{preset}.yml")),
        ]
    }

    fn parse(preset: &str, path: &Path, content: &str) -> Result<ConfigDocument> {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(content).map_err(|e| ConfigError::parse(preset, e.to_string()))
        } else {
            serde_json::from_str(content).map_err(|e| ConfigError::parse(preset, e.to_string()))
        }
    }
}

#[async_trait]
impl PresetRegistry for FsPresetRegistry {
    async fn load(&self, preset: &str) -> Result<ConfigDocument> {
        for path in self.candidates(preset) {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    tracing::debug!("loaded preset '{}' from {}", preset, path.display());
                    return Self::parse(preset, &path, &content);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ConfigError::io(path, e)),
            }
        }
        Err(ConfigError::unknown_preset(
            preset,
            self.root.display().to_string(),
        ))
    }
}

/// Arity bounds a rule declares for its options
///
/// Anything richer (per-option value validation) belongs to the catalog
/// collaborator, not the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsSchema {
    pub min_options: usize,
    pub max_options: Option<usize>,
}

impl OptionsSchema {
    /// No options permitted
    pub fn none() -> Self {
        Self {
            min_options: 0,
            max_options: Some(0),
        }
    }

    /// Up to `max` options
    pub fn at_most(max: usize) -> Self {
        Self {
            min_options: 0,
            max_options: Some(max),
        }
    }

    /// Between `min` and `max` options
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min_options: min,
            max_options: Some(max),
        }
    }

    /// Check an option list against these bounds
    pub fn check(&self, count: usize) -> std::result::Result<(), String> {
        if count < self.min_options {
            return Err(format!(
                "expects at least {} option(s), got {}",
                self.min_options, count
            ));
        }
        if let Some(max) = self.max_options
            && count > max
        {
            return Err(format!("expects at most {max} option(s), got {count}"));
        }
        Ok(())
    }
}

/// Answers which rule names the declared plugin set provides
pub trait RuleCatalogProvider: Send + Sync {
    /// Whether `rule` exists in the union of the given plugins' catalogs
    /// (or the core catalog, for bare names)
    fn is_known(&self, rule: &str, plugins: &IndexSet<String>) -> bool;

    /// The options schema a known rule declares, if any
    fn schema_for(&self, rule: &str) -> Option<OptionsSchema>;
}

/// Catalog provider over explicit rule lists
///
/// Qualified names (`namespace/rule`) resolve against the named plugin's
/// catalog, and only when that plugin is in the active set; bare names
/// resolve against the core catalog. A `null` schema means "no declared
/// option bounds".
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticRuleCatalog {
    core: HashMap<String, Option<OptionsSchema>>,
    plugins: HashMap<String, HashMap<String, Option<OptionsSchema>>>,
}

impl StaticRuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core_rule(mut self, rule: impl Into<String>, schema: Option<OptionsSchema>) -> Self {
        self.core.insert(rule.into(), schema);
        self
    }

    pub fn with_plugin_rule(
        mut self,
        plugin: impl Into<String>,
        rule: impl Into<String>,
        schema: Option<OptionsSchema>,
    ) -> Self {
        self.plugins
            .entry(plugin.into())
            .or_default()
            .insert(rule.into(), schema);
        self
    }

    // The returned plugin name is a slice of `rule`, not of `self`.
    fn lookup<'a>(&self, rule: &'a str) -> Option<(Option<&'a str>, Option<OptionsSchema>)> {
        match rule.rsplit_once('/') {
            Some((plugin, name)) => {
                let schema = self.plugins.get(plugin)?.get(name)?;
                Some((Some(plugin), *schema))
            }
            None => Some((None, *self.core.get(rule)?)),
        }
    }
}

impl RuleCatalogProvider for StaticRuleCatalog {
    fn is_known(&self, rule: &str, plugins: &IndexSet<String>) -> bool {
        match self.lookup(rule) {
            Some((Some(plugin), _)) => plugins.contains(plugin),
            Some((None, _)) => true,
            None => false,
        }
    }

    fn schema_for(&self, rule: &str) -> Option<OptionsSchema> {
        self.lookup(rule).and_then(|(_, schema)| schema)
    }
}

/// Provider that accepts every rule name and declares no schemas
///
/// Used when no catalog information is available (e.g. the CLI without a
/// catalog file); integrity checking degrades to a pass-through.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveCatalog;

impl RuleCatalogProvider for PermissiveCatalog {
    fn is_known(&self, _rule: &str, _plugins: &IndexSet<String>) -> bool {
        true
    }

    fn schema_for(&self, _rule: &str) -> Option<OptionsSchema> {
        None
    }
}
