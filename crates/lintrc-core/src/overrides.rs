//! Path-conditional override application
//!
//! Selects the override blocks whose patterns match a target path and folds
//! their partials onto the merged base with the same field strategies as
//! the document merge. Between overrides, declaration order is the only
//! precedence: a block declared later wins over an earlier one even when
//! the earlier pattern is more specific. Specificity is surfaced as a debug
//! hint because that inversion is a recurring source of user confusion.

use crate::document::EffectiveConfig;
use crate::error::Result;
use crate::merge::{MergedConfig, merge_fields};
use crate::pattern::{Matcher, Specificity};
use std::path::Path;

/// Apply every override block matching `target_path`, in declaration
/// order, and produce the effective configuration
///
/// The merged base already carries no structural fields, so the result is
/// stripped by construction.
pub fn apply_overrides(merged: &MergedConfig, target_path: &Path) -> Result<EffectiveConfig> {
    let mut effective = merged.base.clone();
    let mut origins = merged.settings_origins.clone();
    let mut previous: Option<Specificity> = None;

    for sourced in &merged.overrides {
        let block = &sourced.block;
        let mut matched: Option<Matcher> = None;
        for pattern in &block.patterns {
            let matcher = Matcher::compile(pattern, &sourced.source)?;
            if matcher.is_match(target_path) {
                matched = Some(matcher);
                break;
            }
        }
        let Some(matcher) = matched else { continue };

        if let Some(prev) = previous
            && matcher.specificity() < prev
        {
            tracing::debug!(
                "override '{}' from '{}' is less specific than an earlier match \
                 but still takes precedence (declaration order)",
                matcher.pattern(),
                sourced.source
            );
        }
        previous = Some(matcher.specificity());

        tracing::debug!(
            "applying override '{}' from '{}' to {}",
            matcher.pattern(),
            sourced.source,
            target_path.display()
        );
        merge_fields(
            &mut effective,
            &block.plugins,
            &block.settings,
            &block.env,
            &block.rules,
            &sourced.source,
            &mut origins,
        )?;
    }

    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RuleSeverity, SourcedDocument};
    use crate::error::ErrorKind;
    use crate::merge::merge_documents;
    use serde_json::json;

    fn merged(doc: serde_json::Value) -> MergedConfig {
        let doc = SourcedDocument::new("root", 0, serde_json::from_value(doc).unwrap());
        merge_documents(std::slice::from_ref(&doc)).unwrap()
    }

    #[test]
    fn test_declaration_order_beats_specificity() {
        // The globstar block is declared after the exact-path block, so it
        // wins for src/a.ts despite being less specific.
        let config = merged(json!({
            "overrides": [
                { "patterns": ["src/a.ts"], "rules": { "r": "error" } },
                { "patterns": ["**/*.ts"], "rules": { "r": "warn" } }
            ]
        }));

        let effective = apply_overrides(&config, Path::new("src/a.ts")).unwrap();
        assert_eq!(
            effective.rules.get("r").unwrap().severity,
            RuleSeverity::Warn
        );
    }

    #[test]
    fn test_all_matching_blocks_apply() {
        let config = merged(json!({
            "rules": { "base-only": "warn" },
            "overrides": [
                { "patterns": ["**/*.ts"], "rules": { "from-first": "error" } },
                { "patterns": ["src/**"], "rules": { "from-second": "error" } }
            ]
        }));

        let effective = apply_overrides(&config, Path::new("src/a.ts")).unwrap();
        assert!(effective.rules.contains_key("base-only"));
        assert!(effective.rules.contains_key("from-first"));
        assert!(effective.rules.contains_key("from-second"));
    }

    #[test]
    fn test_non_matching_blocks_skipped() {
        let config = merged(json!({
            "rules": { "r": "warn" },
            "overrides": [
                { "patterns": ["**/*.tsx"], "rules": { "r": "error" } }
            ]
        }));

        let effective = apply_overrides(&config, Path::new("src/a.js")).unwrap();
        assert_eq!(
            effective.rules.get("r").unwrap().severity,
            RuleSeverity::Warn
        );
    }

    #[test]
    fn test_override_beats_base() {
        let config = merged(json!({
            "env": ["node"],
            "rules": { "r": ["warn", { "max": 1 }] },
            "overrides": [
                { "patterns": ["**/*.ts"], "env": ["browser"], "rules": { "r": "off" } }
            ]
        }));

        let effective = apply_overrides(&config, Path::new("a.ts")).unwrap();
        let entry = effective.rules.get("r").unwrap();
        assert_eq!(entry.severity, RuleSeverity::Off);
        assert!(entry.options.is_empty());
        let env: Vec<_> = effective.env.iter().collect();
        assert_eq!(env, vec!["node", "browser"]);
    }

    #[test]
    fn test_any_pattern_in_set_activates_block() {
        let config = merged(json!({
            "overrides": [
                { "patterns": ["**/*.tsx", "**/*.ts"], "rules": { "r": "error" } }
            ]
        }));

        let effective = apply_overrides(&config, Path::new("src/a.ts")).unwrap();
        assert!(effective.rules.contains_key("r"));
    }

    #[test]
    fn test_settings_conflict_names_both_documents() {
        let base = SourcedDocument::new(
            "base",
            1,
            serde_json::from_value(json!({
                "settings": { "parser": { "lax": true } }
            }))
            .unwrap(),
        );
        let root = SourcedDocument::new(
            "root",
            0,
            serde_json::from_value(json!({
                "overrides": [
                    { "patterns": ["**/*.ts"], "settings": { "parser": "babel" } }
                ]
            }))
            .unwrap(),
        );
        let config = merge_documents(&[base, root]).unwrap();

        let err = apply_overrides(&config, Path::new("a.ts")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MergeTypeConflict);
        let text = err.to_string();
        assert!(text.contains("'base'"));
        assert!(text.contains("'root'"));
    }

    #[test]
    fn test_bad_pattern_surfaces_with_source() {
        let config = merged(json!({
            "overrides": [
                { "patterns": ["src/{a"], "rules": { "r": "error" } }
            ]
        }));

        let err = apply_overrides(&config, Path::new("src/a.ts")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternSyntax);
        assert!(err.to_string().contains("'root'"));
    }
}
