//! lintrc core
//!
//! Layered lint-configuration resolution engine. Given named, composable
//! configuration documents (presets extending other presets, plugin rule
//! catalogs, and glob-scoped override blocks), this crate computes the one
//! effective configuration that applies to a given target file.
//!
//! The engine consumes already-parsed [`ConfigDocument`] values from a
//! [`PresetRegistry`] and checks rule names against a
//! [`RuleCatalogProvider`]; it never walks files, parses sources, or runs
//! rules itself.
//!
//! ```no_run
//! use lintrc_core::{ConfigResolver, FsPresetRegistry, PermissiveCatalog};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> lintrc_core::Result<()> {
//! let resolver = ConfigResolver::new(
//!     Arc::new(FsPresetRegistry::new("./presets")),
//!     Arc::new(PermissiveCatalog),
//! );
//! let effective = resolver.resolve("my-app", Path::new("src/index.ts")).await?;
//! println!("{} rules in effect", effective.rules.len());
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod merge;
pub mod overrides;
pub mod pattern;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use document::{
    ConfigDocument, EffectiveConfig, OverrideBlock, RuleCatalog, RuleEntry, RuleSeverity, Settings,
    SourcedDocument,
};
pub use error::{ConfigError, ErrorKind, Result};
pub use loader::PresetLoader;
pub use merge::{MergedConfig, SourcedOverride, merge_documents};
pub use overrides::apply_overrides;
pub use pattern::{Matcher, Specificity};
pub use registry::{
    FsPresetRegistry, InMemoryPresetRegistry, OptionsSchema, PermissiveCatalog, PresetRegistry,
    RuleCatalogProvider, StaticRuleCatalog,
};
pub use resolver::ConfigResolver;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lintrc=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
