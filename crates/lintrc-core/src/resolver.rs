//! Resolution orchestrator
//!
//! Public entry point wiring the loader, merge engine, validation pass, and
//! override resolver, with a content-addressed cache in front. Resolution
//! is all-or-nothing: any violation aborts without producing a partial
//! configuration, and the validation pass collects every violation it finds
//! so one failed resolution reports them all.

use crate::document::{EffectiveConfig, SourcedDocument};
use crate::error::{ConfigError, Result};
use crate::loader::PresetLoader;
use crate::merge::{MergedConfig, merge_documents};
use crate::overrides::apply_overrides;
use crate::pattern::Matcher;
use crate::registry::{PresetRegistry, RuleCatalogProvider};
use dashmap::DashMap;
use indexmap::IndexSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    root: String,
    path: PathBuf,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    chain_hash: u64,
    config: Arc<EffectiveConfig>,
}

/// Resolves effective configurations against a preset registry and a rule
/// catalog provider
///
/// Safe to share across tasks: documents are immutable once loaded, the
/// cache supports concurrent readers, and a racing recomputation for the
/// same key is idempotent (last insert wins).
pub struct ConfigResolver {
    registry: Arc<dyn PresetRegistry>,
    catalog: Arc<dyn RuleCatalogProvider>,
    cache: DashMap<CacheKey, CacheEntry>,
}

impl ConfigResolver {
    pub fn new(registry: Arc<dyn PresetRegistry>, catalog: Arc<dyn RuleCatalogProvider>) -> Self {
        Self {
            registry,
            catalog,
            cache: DashMap::new(),
        }
    }

    /// Compute (or serve from cache) the effective configuration for one
    /// target path under the given root preset
    pub async fn resolve(&self, root_ref: &str, target_path: &Path) -> Result<Arc<EffectiveConfig>> {
        let chain = self.extends_chain(root_ref).await?;
        let chain_hash = hash_chain(&chain);
        let key = CacheKey {
            root: root_ref.to_string(),
            path: target_path.to_path_buf(),
        };

        // Content-addressed: an edit anywhere in the chain changes the hash,
        // while unrelated document edits leave entries valid.
        if let Some(entry) = self.cache.get(&key)
            && entry.chain_hash == chain_hash
        {
            tracing::debug!("cache hit for ({root_ref}, {})", target_path.display());
            return Ok(entry.config.clone());
        }

        let merged = merge_documents(&chain)?;
        self.validate(&chain, &merged)?;
        let effective = Arc::new(apply_overrides(&merged, target_path)?);

        self.cache.insert(
            key,
            CacheEntry {
                chain_hash,
                config: effective.clone(),
            },
        );
        Ok(effective)
    }

    /// The flattened extends chain for a root preset, root document last
    pub async fn extends_chain(&self, root_ref: &str) -> Result<Vec<SourcedDocument>> {
        PresetLoader::new(self.registry.as_ref())
            .flatten(root_ref)
            .await
    }

    /// Drop all cached effective configurations
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Check referential integrity of every configured rule name, option
    /// arity against declared schemas, and override pattern syntax.
    /// Violations are collected across the whole chain before failing.
    fn validate(&self, chain: &[SourcedDocument], merged: &MergedConfig) -> Result<()> {
        let mut violations = Vec::new();

        // Rule names resolve against the union of plugins reachable from the
        // root, not just the plugins of the document declaring the rule.
        let reachable = &merged.base.plugins;

        for sourced in chain {
            let provenance = describe(&sourced.source, sourced.depth);
            self.check_rules(&sourced.doc.rules, reachable, &provenance, &mut violations);

            for block in &sourced.doc.overrides {
                let mut scoped = reachable.clone();
                scoped.extend(block.plugins.iter().cloned());
                self.check_rules(&block.rules, &scoped, &provenance, &mut violations);

                for pattern in &block.patterns {
                    if let Err(e) = Matcher::compile(pattern, &sourced.source) {
                        violations.push(e);
                    }
                }
            }
        }

        match violations.len() {
            0 => Ok(()),
            1 => Err(violations.remove(0)),
            _ => Err(ConfigError::Invalid { violations }),
        }
    }

    fn check_rules(
        &self,
        rules: &crate::document::RuleCatalog,
        plugins: &IndexSet<String>,
        provenance: &str,
        violations: &mut Vec<ConfigError>,
    ) {
        for (name, entry) in rules {
            if !self.catalog.is_known(name, plugins) {
                violations.push(ConfigError::unknown_rule(name, provenance));
                continue;
            }
            if let Some(schema) = self.catalog.schema_for(name)
                && let Err(message) = schema.check(entry.options.len())
            {
                violations.push(ConfigError::option_schema(name, provenance, message));
            }
        }
    }
}

fn describe(source: &str, depth: usize) -> String {
    if depth == 0 {
        source.to_string()
    } else {
        format!("{source} (extends depth {depth})")
    }
}

fn hash_chain(chain: &[SourcedDocument]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for sourced in chain {
        sourced.source.hash(&mut hasher);
        sourced.depth.hash(&mut hasher);
        // Plain data with string keys; serialization cannot fail, and map
        // order is insertion order, so the text form is deterministic.
        serde_json::to_string(&sourced.doc)
            .unwrap_or_default()
            .hash(&mut hasher);
    }
    hasher.finish()
}
