//! Configuration document model
//!
//! These are the already-parsed documents the engine resolves: presets,
//! their extends references, plugin and env declarations, rule entries,
//! and glob-scoped override blocks. Documents are immutable once loaded;
//! everything the engine produces is derived from them.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Free-form, deep-mergeable settings tree (parser options, shared plugin
/// settings, and similar)
pub type Settings = serde_json::Map<String, Value>;

/// Mapping from qualified rule name (`namespace/rule` or bare `rule`) to its
/// configured entry. Insertion-ordered so merge output is deterministic.
pub type RuleCatalog = IndexMap<String, RuleEntry>;

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    /// Report without failing
    Warn,
    /// Report and fail
    Error,
}

/// A configured rule: severity plus opaque, rule-defined options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEntry {
    pub severity: RuleSeverity,

    /// Options are opaque to the engine; they are validated against the
    /// catalog provider's schema and otherwise passed through untouched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
}

impl RuleEntry {
    /// Entry with a severity and no options
    pub fn severity(severity: RuleSeverity) -> Self {
        Self {
            severity,
            options: Vec::new(),
        }
    }

    /// Entry with severity and options
    pub fn with_options(severity: RuleSeverity, options: Vec<Value>) -> Self {
        Self { severity, options }
    }
}

/// Accepted on-disk shapes for a rule entry: a bare severity (`"error"`),
/// a tuple with leading severity (`["error", {...}]`), or the explicit
/// object form (`{"severity": "error", "options": [...]}`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleEntryRepr {
    Bare(RuleSeverity),
    Detailed {
        severity: RuleSeverity,
        #[serde(default)]
        options: Vec<Value>,
    },
    Tuple(Vec<Value>),
}

impl<'de> Deserialize<'de> for RuleEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RuleEntryRepr::deserialize(deserializer)? {
            RuleEntryRepr::Bare(severity) => Ok(RuleEntry::severity(severity)),
            RuleEntryRepr::Detailed { severity, options } => {
                Ok(RuleEntry::with_options(severity, options))
            }
            RuleEntryRepr::Tuple(values) => {
                let mut values = values.into_iter();
                let head = values.next().ok_or_else(|| {
                    serde::de::Error::custom("rule entry array must start with a severity")
                })?;
                let severity = serde_json::from_value(head)
                    .map_err(|_| serde::de::Error::custom("expected 'off', 'warn', or 'error'"))?;
                Ok(RuleEntry::with_options(severity, values.collect()))
            }
        }
    }
}

/// One named, composable configuration document
///
/// `extends` and `overrides` are structural: they drive resolution and never
/// appear in the effective output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ConfigDocument {
    /// Presets this document pulls in, lowest precedence first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,

    /// Plugins whose rule catalogs this document draws from
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub plugins: IndexSet<String>,

    /// Deep-mergeable settings tree
    #[serde(skip_serializing_if = "Settings::is_empty")]
    pub settings: Settings,

    /// Environment flags (merged by union)
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub env: IndexSet<String>,

    /// Rule configuration (merged by key replacement)
    #[serde(skip_serializing_if = "RuleCatalog::is_empty")]
    pub rules: RuleCatalog,

    /// Path-conditional partial configurations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideBlock>,
}

/// A conditional partial configuration, active only for paths matching one
/// of its patterns
///
/// The partial's fields are inlined here rather than nesting a
/// `ConfigDocument`, so `extends` and further `overrides` inside an override
/// are unrepresentable; with `deny_unknown_fields` a document attempting
/// them fails at parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OverrideBlock {
    /// Glob patterns selecting the paths this block applies to
    #[serde(alias = "files")]
    pub patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub plugins: IndexSet<String>,

    #[serde(default, skip_serializing_if = "Settings::is_empty")]
    pub settings: Settings,

    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub env: IndexSet<String>,

    #[serde(default, skip_serializing_if = "RuleCatalog::is_empty")]
    pub rules: RuleCatalog,
}

/// The fully merged, override-applied configuration for one target path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectiveConfig {
    pub plugins: IndexSet<String>,
    pub settings: Settings,
    pub env: IndexSet<String>,
    pub rules: RuleCatalog,
}

/// A loaded document together with where it came from, used for error
/// provenance and precedence bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedDocument {
    /// Preset ref this document was loaded under
    pub source: String,
    /// Distance from the root document in the extends graph (root = 0)
    pub depth: usize,
    pub doc: ConfigDocument,
}

impl SourcedDocument {
    pub fn new(source: impl Into<String>, depth: usize, doc: ConfigDocument) -> Self {
        Self {
            source: source.into(),
            depth,
            doc,
        }
    }
}
