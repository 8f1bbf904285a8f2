use crate::workspace::{DocumentId, EditorId};
use thiserror::Error;

#[derive(Debug, Error)]
/// A rule could not be compiled. The rule does not activate; other rules are unaffected.
pub enum PatternCompilationError {
    #[error("rule '{rule}': invalid pattern: {source}")]
    /// The pattern source is not a valid regular expression.
    InvalidPattern {
        /// Rule name.
        rule: String,
        /// Error reported by the pattern engine.
        #[source]
        source: fancy_regex::Error,
    },

    #[error("rule '{rule}': unknown regex flag '{flag}'")]
    /// A flag letter is not supported.
    UnknownFlag {
        /// Rule name.
        rule: String,
        /// The offending letter.
        flag: char,
    },

    #[error("rule '{rule}': regex flag '{flag}' given more than once")]
    /// A flag letter was repeated.
    DuplicateFlag {
        /// Rule name.
        rule: String,
        /// The repeated letter.
        flag: char,
    },
}

impl PatternCompilationError {
    /// Name of the rule that failed to compile.
    pub fn rule(&self) -> &str {
        match self {
            Self::InvalidPattern { rule, .. }
            | Self::UnknownFlag { rule, .. }
            | Self::DuplicateFlag { rule, .. } => rule,
        }
    }
}

#[derive(Debug, Error)]
#[error("rule '{rule}': pattern execution failed on line {line}: {source}")]
/// The pattern engine gave up while scanning a line (e.g. the backtracking limit was hit).
///
/// The refresh that hit it is abandoned; previously published annotations stay in place.
pub struct ScanRuntimeError {
    /// Rule name.
    pub rule: String,
    /// Zero-based line that was being scanned.
    pub line: usize,
    /// Error reported by the pattern engine.
    #[source]
    pub source: fancy_regex::Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pattern did not re-match {text:?} while rendering the message")]
/// Re-applying a rule's pattern to its own matched text found nothing.
///
/// Soft failure: callers fall back to the matched text as the message.
pub struct TemplateMismatchError {
    /// The matched text that failed to re-match.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Workspace-level errors.
pub enum WorkspaceError {
    #[error("a document with uri '{0}' is already open")]
    /// A document with this uri already exists.
    UriAlreadyOpen(String),

    #[error("document {0:?} not found")]
    /// A document id was not found.
    DocumentNotFound(DocumentId),

    #[error("editor {0:?} not found")]
    /// An editor id was not found.
    EditorNotFound(EditorId),
}
