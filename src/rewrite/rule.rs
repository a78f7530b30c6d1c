//! Rule compilation and path rewriting.
//!
//! # Responsibilities
//! - Compile `ReplacementConfig` entries into anchored regexes
//! - Rewrite a single cookie path through the ordered rule pipeline
//! - Substitute `{{group}}` placeholders from named captures
//!
//! # Design Decisions
//! - Patterns are wrapped as `^(?:...)$` so alternations stay fully anchored
//! - Compilation is all-or-nothing: one bad pattern rejects the whole set
//! - Rules form a pipeline, every matching rule sees the previous rule's output

use std::fmt;

use regex::Regex;
use thiserror::Error;

use crate::config::ReplacementConfig;

/// Marker that enables placeholder substitution in a replacement template.
const PLACEHOLDER_OPEN: &str = "{{";

/// Which field of a rule failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternField {
    Name,
    Original,
}

impl fmt::Display for PatternField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternField::Name => write!(f, "name_regex"),
            PatternField::Original => write!(f, "original"),
        }
    }
}

/// Error returned when a rule list cannot be compiled.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule {index}: invalid {field} pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// Zero-based position of the rule in the configured list.
        index: usize,
        field: PatternField,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single compiled replacement rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    name: Option<Regex>,
    original: Regex,
    replacement: String,
}

impl CompiledRule {
    fn compile(index: usize, config: &ReplacementConfig) -> Result<Self, RuleError> {
        let name = match config.name_regex.as_deref() {
            Some(pattern) if !pattern.is_empty() => {
                Some(anchored(index, PatternField::Name, pattern)?)
            }
            _ => None,
        };
        let original = anchored(index, PatternField::Original, &config.original)?;

        Ok(Self {
            name,
            original,
            replacement: config.replacement.clone(),
        })
    }

    /// Returns true if this rule applies to a cookie with the given name.
    pub fn matches_name(&self, cookie_name: &str) -> bool {
        self.name
            .as_ref()
            .map(|re| re.is_match(cookie_name))
            .unwrap_or(true)
    }

    /// Apply this rule to `path`, returning the replacement if the path matches.
    pub fn apply(&self, path: &str) -> Option<String> {
        if !self.replacement.contains(PLACEHOLDER_OPEN) {
            return self
                .original
                .is_match(path)
                .then(|| self.replacement.clone());
        }

        let captures = self.original.captures(path)?;
        let mut rewritten = self.replacement.clone();
        for name in self.original.capture_names().flatten() {
            let captured = captures.name(name).map(|m| m.as_str()).unwrap_or("");
            rewritten = rewritten.replace(&format!("{{{{{}}}}}", name), captured);
        }
        Some(rewritten)
    }
}

// The bare pattern must compile before wrapping; otherwise an unbalanced
// `a)|(b` becomes valid inside the group and escapes the anchors.
fn anchored(index: usize, field: PatternField, pattern: &str) -> Result<Regex, RuleError> {
    let invalid = |source| RuleError::InvalidPattern {
        index,
        field,
        pattern: pattern.to_string(),
        source,
    };

    Regex::new(pattern).map_err(invalid)?;
    Regex::new(&format!("^(?:{})$", pattern)).map_err(invalid)
}

/// Ordered, immutable set of compiled rules.
///
/// Shared between requests by reference; never mutated after [`RuleSet::compile`].
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile rules in declaration order.
    ///
    /// Fails on the first invalid pattern; no partial set is returned.
    pub fn compile(configs: &[ReplacementConfig]) -> Result<Self, RuleError> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(index, config)| CompiledRule::compile(index, config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run `path` through every rule applicable to `cookie_name`.
    ///
    /// Returns `None` if no rule matched. Each matching rule sees the path
    /// produced by the previous one, so the last match decides the result.
    pub fn rewrite_path(&self, cookie_name: &str, path: &str) -> Option<String> {
        let mut current: Option<String> = None;

        for rule in &self.rules {
            if !rule.matches_name(cookie_name) {
                continue;
            }
            let input = current.as_deref().unwrap_or(path);
            if let Some(next) = rule.apply(input) {
                current = Some(next);
            }
        }

        current
    }
}
