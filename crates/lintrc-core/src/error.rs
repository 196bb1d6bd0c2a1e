//! Error types and handling for configuration resolution

use std::path::PathBuf;
use thiserror::Error;

/// Standard Result type for resolution operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main error type for configuration resolution
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The extends graph contains a cycle
    #[error("circular extends chain detected: {chain}")]
    Cycle { chain: String },

    /// A preset reference could not be resolved by the registry
    #[error("unknown preset '{preset}' (referenced by '{referenced_by}')")]
    UnknownPreset {
        preset: String,
        referenced_by: String,
    },

    /// A rule name is not provided by any reachable plugin catalog
    #[error("unknown rule '{rule}' configured in '{document}'")]
    UnknownRule { rule: String, document: String },

    /// Rule options do not satisfy the rule's declared schema
    #[error("invalid options for rule '{rule}' in '{document}': {message}")]
    OptionSchema {
        rule: String,
        document: String,
        message: String,
    },

    /// Malformed glob pattern in an override block
    #[error("invalid pattern '{pattern}' in '{document}': {message}")]
    PatternSyntax {
        pattern: String,
        document: String,
        message: String,
    },

    /// Settings merge encountered a mapping colliding with a non-mapping
    #[error("settings type conflict at '{key_path}': {message} ('{earlier}' vs '{later}')")]
    MergeTypeConflict {
        key_path: String,
        earlier: String,
        later: String,
        message: String,
    },

    /// A preset document could not be parsed
    #[error("failed to parse preset '{preset}': {message}")]
    Parse { preset: String, message: String },

    /// File system I/O errors from a backing registry
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Aggregated validation failures, collected so one resolution reports
    /// every violation found
    #[error("invalid configuration:\n{}", format_violations(.violations))]
    Invalid { violations: Vec<ConfigError> },
}

fn format_violations(violations: &[ConfigError]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Cycle,
    UnknownPreset,
    UnknownRule,
    OptionSchema,
    PatternSyntax,
    MergeTypeConflict,
    Parse,
    Io,
    Invalid,
}

impl ConfigError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Cycle { .. } => ErrorKind::Cycle,
            ConfigError::UnknownPreset { .. } => ErrorKind::UnknownPreset,
            ConfigError::UnknownRule { .. } => ErrorKind::UnknownRule,
            ConfigError::OptionSchema { .. } => ErrorKind::OptionSchema,
            ConfigError::PatternSyntax { .. } => ErrorKind::PatternSyntax,
            ConfigError::MergeTypeConflict { .. } => ErrorKind::MergeTypeConflict,
            ConfigError::Parse { .. } => ErrorKind::Parse,
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Invalid { .. } => ErrorKind::Invalid,
        }
    }

    /// Create a cycle error from the chain of preset refs that closed the loop
    pub fn cycle(chain: &[String]) -> Self {
        Self::Cycle {
            chain: chain.join(" -> "),
        }
    }

    /// Create an unknown-preset error
    pub fn unknown_preset(preset: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::UnknownPreset {
            preset: preset.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Create an unknown-rule error
    pub fn unknown_rule(rule: impl Into<String>, document: impl Into<String>) -> Self {
        Self::UnknownRule {
            rule: rule.into(),
            document: document.into(),
        }
    }

    /// Create an option-schema error
    pub fn option_schema(
        rule: impl Into<String>,
        document: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::OptionSchema {
            rule: rule.into(),
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create a pattern-syntax error
    pub fn pattern_syntax(
        pattern: impl Into<String>,
        document: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PatternSyntax {
            pattern: pattern.into(),
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create a parse error with preset context
    pub fn parse(preset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            preset: preset.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_joins_chain() {
        let err = ConfigError::cycle(&[
            "base".to_string(),
            "shared".to_string(),
            "base".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "circular extends chain detected: base -> shared -> base"
        );
        assert_eq!(err.kind(), ErrorKind::Cycle);
    }

    #[test]
    fn test_document_provenance_in_messages() {
        // Document identity is plain context on these variants, not an
        // underlying error cause.
        let err = ConfigError::unknown_rule("import/order", "standard-react");
        assert!(std::error::Error::source(&err).is_none());
        assert!(err.to_string().contains("'standard-react'"));

        let err = ConfigError::option_schema("max-lines", "base", "expects at most 1 option(s)");
        assert!(err.to_string().contains("'base'"));

        let err = ConfigError::pattern_syntax("src/{a", "app", "unmatched '{'");
        assert!(err.to_string().contains("'app'"));

        let err = ConfigError::MergeTypeConflict {
            key_path: "parser.options".to_string(),
            earlier: "base".to_string(),
            later: "app".to_string(),
            message: "cannot replace a mapping with a string".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("'base'"));
        assert!(text.contains("'app'"));
        assert!(text.contains("'parser.options'"));
    }

    #[test]
    fn test_invalid_lists_every_violation() {
        let err = ConfigError::Invalid {
            violations: vec![
                ConfigError::unknown_rule("plugin/missing", "root"),
                ConfigError::unknown_rule("other", "base"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("plugin/missing"));
        assert!(text.contains("'base'"));
        assert_eq!(text.lines().count(), 3);
    }
}
