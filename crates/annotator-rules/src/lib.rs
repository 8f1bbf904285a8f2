#![warn(missing_docs)]
//! `annotator-rules` - data-driven rule definitions for the regex annotator.
//!
//! This crate intentionally stays lightweight and does **not** depend on the pattern engine.
//! It provides the serializable rule records a host reads from its settings, a tolerant
//! loader for rule lists, and a small language-id table used to scope rules to documents.

mod language;
mod rule_set;

pub use language::{PLAINTEXT_LANGUAGE_ID, language_id_for_extension, language_id_for_path};
pub use rule_set::{RuleSet, RuleSetError, SkippedRule};

use serde::{Deserialize, Serialize};

/// A single user-configured annotation rule, as read from settings.
///
/// Only `name` and `pattern` are required. Everything else falls back to engine defaults
/// (all languages, global scanning, `Warning` severity, severity name as message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Stable rule identifier, reported as the diagnostic code.
    pub name: String,
    /// Language ids the rule applies to. `None` means every document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    /// Regular expression source, matched against one line at a time.
    pub pattern: String,
    /// JavaScript-style flag letters (e.g. `"gi"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
    /// Message template; may reference capture groups (`$1`, `$<name>`, `$&`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Severity name (`Error`, `Warning`, `Information`, `Hint`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl RuleDefinition {
    /// Create a rule with only a name and a pattern.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            languages: None,
            pattern: pattern.into(),
            flags: None,
            message: None,
            severity: None,
        }
    }

    /// Restrict the rule to the given language ids.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = Some(languages.into_iter().map(Into::into).collect());
        self
    }

    /// Set the regex flag letters.
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    /// Set the message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the severity name.
    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    /// Returns `true` if the rule applies to documents of `language_id`.
    pub fn applies_to(&self, language_id: &str) -> bool {
        self.languages
            .as_ref()
            .is_none_or(|langs| langs.iter().any(|l| l == language_id))
    }
}
