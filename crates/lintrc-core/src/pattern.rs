//! Glob pattern compilation and path testing for override blocks
//!
//! Patterns support `*` (within one path component), `**` (across
//! components), character classes, and brace alternation `{a,b}`. Brace
//! alternation is expanded into plain glob patterns before compilation
//! since the `glob` crate does not handle braces itself.

use crate::error::{ConfigError, Result};
use glob::{MatchOptions, Pattern};
use std::path::Path;

/// Informal pattern-precision ranking: exact path > single-component
/// wildcards > globstar. This is a diagnostic hint only; override
/// precedence is always declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    /// Pattern uses `**`
    Globstar,
    /// Pattern uses wildcards but no `**`
    Wildcard,
    /// No wildcards at all
    Exact,
}

/// A compiled pattern ready for repeated path tests
#[derive(Debug, Clone)]
pub struct Matcher {
    raw: String,
    alternatives: Vec<Pattern>,
    specificity: Specificity,
    /// Patterns without a separator match against the file name alone
    basename_only: bool,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    // Keeps `*` from crossing path components; `**` still does.
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl Matcher {
    /// Compile a glob pattern; `source` names the document the pattern came
    /// from and is carried into any syntax error.
    pub fn compile(pattern: &str, source: &str) -> Result<Self> {
        let expanded = expand_braces(pattern)
            .map_err(|msg| ConfigError::pattern_syntax(pattern, source, msg))?;

        let mut alternatives = Vec::with_capacity(expanded.len());
        for alt in &expanded {
            let compiled = Pattern::new(alt)
                .map_err(|e| ConfigError::pattern_syntax(pattern, source, e.msg))?;
            alternatives.push(compiled);
        }

        Ok(Self {
            raw: pattern.to_string(),
            alternatives,
            specificity: classify(pattern),
            basename_only: !pattern.contains('/'),
        })
    }

    /// Test a path against this pattern
    pub fn is_match(&self, path: &Path) -> bool {
        let normalized = normalize_path(path);
        let candidate = if self.basename_only {
            normalized.rsplit('/').next().unwrap_or(&normalized)
        } else {
            normalized.as_str()
        };

        self.alternatives
            .iter()
            .any(|p| p.matches_with(candidate, MATCH_OPTIONS))
    }

    /// The pattern text as written
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }
}

fn classify(pattern: &str) -> Specificity {
    if pattern.contains("**") {
        Specificity::Globstar
    } else if pattern.contains(['*', '?', '[', '{']) {
        Specificity::Wildcard
    } else {
        Specificity::Exact
    }
}

/// Normalize separators to `/` and strip a leading `./`
pub fn normalize_path(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    text.strip_prefix("./").unwrap_or(&text).to_string()
}

/// Expand `{a,b}` alternation (possibly nested) into plain glob patterns
fn expand_braces(pattern: &str) -> std::result::Result<Vec<String>, String> {
    let bytes = pattern.as_bytes();
    let Some(open) = bytes.iter().position(|&b| b == b'{') else {
        return Ok(vec![pattern.to_string()]);
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            b',' if depth == 1 => splits.push(i),
            _ => {}
        }
    }
    let close = close.ok_or_else(|| "unmatched '{' in brace alternation".to_string())?;

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let body = &pattern[open + 1..close];

    let mut alternatives = Vec::new();
    let mut start = 0usize;
    for split in splits {
        let rel = split - (open + 1);
        alternatives.push(&body[start..rel]);
        start = rel + 1;
    }
    alternatives.push(&body[start..]);

    if alternatives.iter().any(|alt| alt.is_empty()) {
        return Err("empty alternative in brace group".to_string());
    }

    let mut expanded = Vec::new();
    for alt in alternatives {
        // Suffix may hold further brace groups; recurse on the recombined text.
        expanded.extend(expand_braces(&format!("{prefix}{alt}{suffix}"))?);
    }
    Ok(expanded)
}
