//! Loading rule lists from JSON settings documents.

use crate::RuleDefinition;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors that prevent a rule list from being read at all.
///
/// Individual malformed entries are not errors; they are reported as [`SkippedRule`]s.
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("I/O error reading {path}: {source}")]
    /// The rules file could not be read.
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    /// The document is not valid JSON.
    Json(#[from] serde_json::Error),

    #[error("expected an array of rules or an object with a \"rules\" array")]
    /// The document is valid JSON but has the wrong shape.
    UnexpectedShape,
}

/// A rule entry that could not be deserialized.
#[derive(Debug)]
pub struct SkippedRule {
    /// Zero-based position of the entry in the rule list.
    pub index: usize,
    /// Why the entry was rejected.
    pub error: serde_json::Error,
}

/// An ordered list of rule definitions.
#[derive(Debug, Default)]
pub struct RuleSet {
    /// Rules that were read successfully, in document order.
    pub rules: Vec<RuleDefinition>,
    /// Entries that were rejected.
    pub skipped: Vec<SkippedRule>,
}

impl RuleSet {
    /// Build a rule set from already-parsed definitions.
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        Self {
            rules,
            skipped: Vec::new(),
        }
    }

    /// Parse a settings document.
    ///
    /// Accepts either a bare array (`[{...}, ...]`) or an object carrying a `rules` array
    /// (`{ "rules": [...] }`). Each entry is deserialized on its own, so one malformed rule
    /// does not hide the others.
    pub fn from_json_str(text: &str) -> Result<Self, RuleSetError> {
        let value: Value = serde_json::from_str(text)?;
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("rules") {
                Some(Value::Array(entries)) => entries,
                _ => return Err(RuleSetError::UnexpectedShape),
            },
            _ => return Err(RuleSetError::UnexpectedShape),
        };

        let mut set = RuleSet::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<RuleDefinition>(entry) {
                Ok(rule) => set.rules.push(rule),
                Err(error) => set.skipped.push(SkippedRule { index, error }),
            }
        }
        Ok(set)
    }

    /// Read and parse a settings document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuleSetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RuleSetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Returns the number of usable rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no usable rules were read.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
