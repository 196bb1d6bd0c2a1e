//! Document merging
//!
//! Folds an ordered document sequence into one configuration, later
//! documents taking precedence field by field: set union for `plugins` and
//! `env`, recursive key-wise merge for `settings`, whole-entry replacement
//! for `rules`, and append for `overrides` (which are carried forward
//! unmerged for path-conditional application). The fold is associative, so
//! merging a pre-merged prefix with further documents equals merging the
//! whole sequence at once.

use crate::document::{EffectiveConfig, OverrideBlock, RuleCatalog, Settings, SourcedDocument};
use crate::error::{ConfigError, Result};
use indexmap::IndexSet;
use serde_json::Value;
use std::collections::HashMap;

/// Which document last wrote each dotted settings key path; consulted when
/// a later document collides with the value so the error can name both
/// contributors
pub(crate) type SettingsOrigins = HashMap<String, String>;

/// An override block carried forward with the document it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedOverride {
    pub source: String,
    pub block: OverrideBlock,
}

/// Result of folding an extends chain: the merged base configuration plus
/// every override block, in declaration order across all documents (root
/// document's blocks last, so they apply with highest precedence)
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub base: EffectiveConfig,
    pub overrides: Vec<SourcedOverride>,
    pub(crate) settings_origins: SettingsOrigins,
}

/// Fold an ordered document sequence, later documents winning
pub fn merge_documents(documents: &[SourcedDocument]) -> Result<MergedConfig> {
    let mut base = EffectiveConfig::default();
    let mut overrides = Vec::new();
    let mut settings_origins = SettingsOrigins::new();

    for sourced in documents {
        let doc = &sourced.doc;
        merge_fields(
            &mut base,
            &doc.plugins,
            &doc.settings,
            &doc.env,
            &doc.rules,
            &sourced.source,
            &mut settings_origins,
        )?;
        overrides.extend(doc.overrides.iter().map(|block| SourcedOverride {
            source: sourced.source.clone(),
            block: block.clone(),
        }));
    }

    Ok(MergedConfig {
        base,
        overrides,
        settings_origins,
    })
}

/// Merge one document's (or override partial's) fields onto `base`,
/// incoming values winning per field strategy
pub(crate) fn merge_fields(
    base: &mut EffectiveConfig,
    plugins: &IndexSet<String>,
    settings: &Settings,
    env: &IndexSet<String>,
    rules: &RuleCatalog,
    source: &str,
    origins: &mut SettingsOrigins,
) -> Result<()> {
    base.plugins.extend(plugins.iter().cloned());
    base.env.extend(env.iter().cloned());
    merge_settings(&mut base.settings, settings, "", source, origins)?;
    for (name, entry) in rules {
        // Replace-by-key: severity and options move together, never mixed
        // element-wise with an earlier entry.
        base.rules.insert(name.clone(), entry.clone());
    }
    Ok(())
}

fn merge_settings(
    target: &mut Settings,
    incoming: &Settings,
    path: &str,
    source: &str,
    origins: &mut SettingsOrigins,
) -> Result<()> {
    for (key, value) in incoming {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_settings(existing, nested, &key_path, source, origins)?;
            }
            (Some(Value::Object(_)), scalar) => {
                return Err(type_conflict(
                    key_path,
                    origins,
                    source,
                    format!("cannot replace a mapping with a {}", json_kind(scalar)),
                ));
            }
            (Some(existing), Value::Object(_)) => {
                return Err(type_conflict(
                    key_path,
                    origins,
                    source,
                    format!("cannot merge a mapping into a {}", json_kind(existing)),
                ));
            }
            (Some(existing), value) => {
                *existing = value.clone();
                origins.insert(key_path, source.to_string());
            }
            (None, value) => {
                target.insert(key.clone(), value.clone());
                origins.insert(key_path, source.to_string());
            }
        }
    }
    Ok(())
}

fn type_conflict(
    key_path: String,
    origins: &SettingsOrigins,
    later: &str,
    message: String,
) -> ConfigError {
    ConfigError::MergeTypeConflict {
        earlier: origin_of(origins, &key_path).unwrap_or(later).to_string(),
        later: later.to_string(),
        key_path,
        message,
    }
}

/// The document that wrote `key_path`, falling back to the nearest
/// ancestor path for values inserted as part of a whole subtree
fn origin_of<'a>(origins: &'a SettingsOrigins, key_path: &str) -> Option<&'a str> {
    let mut path = key_path;
    loop {
        if let Some(source) = origins.get(path) {
            return Some(source.as_str());
        }
        match path.rsplit_once('.') {
            Some((parent, _)) => path = parent,
            None => return None,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
