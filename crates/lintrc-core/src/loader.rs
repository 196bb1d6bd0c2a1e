//! Extends-chain flattening
//!
//! Resolves a root preset ref into the ordered document sequence the merge
//! engine folds: depth-first pre-order over `extends`, parents emitted
//! before the documents that extend them, root last. An explicit visiting
//! stack catches cycles before any merge happens; a ref reached again
//! through a diamond is emitted once, at its first-encounter position.

use crate::document::SourcedDocument;
use crate::error::{ConfigError, Result};
use crate::registry::PresetRegistry;
use futures::future::BoxFuture;
use std::collections::HashSet;

/// Flattens extends graphs against a backing [`PresetRegistry`]
pub struct PresetLoader<'a> {
    registry: &'a dyn PresetRegistry,
}

impl<'a> PresetLoader<'a> {
    pub fn new(registry: &'a dyn PresetRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `root_ref`'s transitive extends chain, lowest precedence
    /// first, the root document last
    pub async fn flatten(&self, root_ref: &str) -> Result<Vec<SourcedDocument>> {
        let mut chain = Vec::new();
        let mut visiting = Vec::new();
        let mut resolved = HashSet::new();
        self.visit(
            root_ref.to_string(),
            root_ref.to_string(),
            0,
            &mut visiting,
            &mut resolved,
            &mut chain,
        )
        .await?;
        tracing::debug!(
            "flattened '{}' into {} document(s): {:?}",
            root_ref,
            chain.len(),
            chain.iter().map(|d| d.source.as_str()).collect::<Vec<_>>()
        );
        Ok(chain)
    }

    fn visit<'s>(
        &'s self,
        preset: String,
        referenced_by: String,
        depth: usize,
        visiting: &'s mut Vec<String>,
        resolved: &'s mut HashSet<String>,
        chain: &'s mut Vec<SourcedDocument>,
    ) -> BoxFuture<'s, Result<()>> {
        Box::pin(async move {
            if let Some(pos) = visiting.iter().position(|p| *p == preset) {
                let mut cycle: Vec<String> = visiting[pos..].to_vec();
                cycle.push(preset);
                return Err(ConfigError::cycle(&cycle));
            }
            if resolved.contains(&preset) {
                // Diamond: already emitted at its first-encounter position.
                tracing::debug!("preset '{}' already resolved, skipping", preset);
                return Ok(());
            }

            let doc = self.registry.load(&preset).await.map_err(|e| match e {
                // Rewrite the registry's placeholder referrer with the
                // document that actually pulled the ref in. The root ref has
                // no referrer, so its error passes through untouched.
                ConfigError::UnknownPreset { preset, .. } if depth > 0 => {
                    ConfigError::unknown_preset(preset, referenced_by.clone())
                }
                other => other,
            })?;

            visiting.push(preset.clone());
            for parent in &doc.extends {
                self.visit(
                    parent.clone(),
                    preset.clone(),
                    depth + 1,
                    visiting,
                    resolved,
                    chain,
                )
                .await?;
            }
            visiting.pop();

            resolved.insert(preset.clone());
            chain.push(SourcedDocument::new(preset, depth, doc));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfigDocument;
    use crate::error::ErrorKind;
    use crate::registry::InMemoryPresetRegistry;
    use serde_json::json;

    fn doc(extends: &[&str]) -> ConfigDocument {
        serde_json::from_value(json!({ "extends": extends })).unwrap()
    }

    fn sources(chain: &[SourcedDocument]) -> Vec<&str> {
        chain.iter().map(|d| d.source.as_str()).collect()
    }

    #[tokio::test]
    async fn test_linear_chain_root_last() {
        let registry = InMemoryPresetRegistry::new()
            .with_preset("root", doc(&["mid"]))
            .with_preset("mid", doc(&["base"]))
            .with_preset("base", doc(&[]));

        let chain = PresetLoader::new(&registry).flatten("root").await.unwrap();
        assert_eq!(sources(&chain), vec!["base", "mid", "root"]);
        assert_eq!(chain[0].depth, 2);
        assert_eq!(chain[2].depth, 0);
    }

    #[tokio::test]
    async fn test_multiple_extends_declaration_order() {
        let registry = InMemoryPresetRegistry::new()
            .with_preset("root", doc(&["a", "b"]))
            .with_preset("a", doc(&[]))
            .with_preset("b", doc(&[]));

        let chain = PresetLoader::new(&registry).flatten("root").await.unwrap();
        assert_eq!(sources(&chain), vec!["a", "b", "root"]);
    }

    #[tokio::test]
    async fn test_diamond_emitted_once_at_first_encounter() {
        // root -> {left, right}, both -> shared
        let registry = InMemoryPresetRegistry::new()
            .with_preset("root", doc(&["left", "right"]))
            .with_preset("left", doc(&["shared"]))
            .with_preset("right", doc(&["shared"]))
            .with_preset("shared", doc(&[]));

        let chain = PresetLoader::new(&registry).flatten("root").await.unwrap();
        assert_eq!(sources(&chain), vec!["shared", "left", "right", "root"]);
    }

    #[tokio::test]
    async fn test_cycle_detected_with_chain() {
        let registry = InMemoryPresetRegistry::new()
            .with_preset("root", doc(&["a"]))
            .with_preset("a", doc(&["b"]))
            .with_preset("b", doc(&["a"]));

        let err = PresetLoader::new(&registry)
            .flatten("root")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cycle);
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[tokio::test]
    async fn test_self_extend_is_a_cycle() {
        let registry = InMemoryPresetRegistry::new().with_preset("loop", doc(&["loop"]));

        let err = PresetLoader::new(&registry)
            .flatten("loop")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cycle);
    }

    #[tokio::test]
    async fn test_unknown_preset_names_referrer() {
        let registry = InMemoryPresetRegistry::new().with_preset("root", doc(&["ghost"]));

        let err = PresetLoader::new(&registry)
            .flatten("root")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownPreset);
        let text = err.to_string();
        assert!(text.contains("'ghost'"));
        assert!(text.contains("'root'"));
    }
}
