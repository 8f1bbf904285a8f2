//! Diagnostics data model.
//!
//! Diagnostics are the problems-panel side of an annotation: one entry per rule match, keyed
//! by document URI inside a rule's diagnostic collection (see [`crate::sink`]).
//! Positions are `(line, column)` pairs with columns in Unicode scalar values (`char`).

use std::fmt;

/// A zero-based `(line, column)` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in characters.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open `start..end` range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextRange {
    /// Range start (inclusive).
    pub start: Position,
    /// Range end (exclusive).
    pub end: Position,
}

impl TextRange {
    /// Create a new range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A range within a single line.
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start: Position::new(line, start_column),
            end: Position::new(line, end_column),
        }
    }

    /// Returns `true` for zero-width ranges.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Diagnostic severity levels.
///
/// Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
    /// Hint diagnostics.
    Hint,
}

impl DiagnosticSeverity {
    /// Map a configured severity name to a level.
    ///
    /// Matching is case-sensitive; anything unrecognized (or absent) is a warning.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("Error") => Self::Error,
            Some("Information") => Self::Information,
            Some("Hint") => Self::Hint,
            _ => Self::Warning,
        }
    }

    /// Canonical name, also used as the fallback message for rules without one.
    pub fn name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Information => "Information",
            Self::Hint => "Hint",
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single published diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Range of the match that produced this diagnostic.
    pub range: TextRange,
    /// Severity of the producing rule.
    pub severity: DiagnosticSeverity,
    /// Name of the producing rule.
    pub code: String,
    /// Optional diagnostic source label (the host's extension name, for example).
    pub source: Option<String>,
    /// Rendered message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_names_are_case_sensitive() {
        assert_eq!(
            DiagnosticSeverity::from_name(Some("Error")),
            DiagnosticSeverity::Error
        );
        assert_eq!(
            DiagnosticSeverity::from_name(Some("error")),
            DiagnosticSeverity::Warning
        );
        assert_eq!(
            DiagnosticSeverity::from_name(Some("Bogus")),
            DiagnosticSeverity::Warning
        );
        assert_eq!(DiagnosticSeverity::from_name(None), DiagnosticSeverity::Warning);
    }

    #[test]
    fn test_severity_name_roundtrip() {
        for severity in [
            DiagnosticSeverity::Error,
            DiagnosticSeverity::Warning,
            DiagnosticSeverity::Information,
            DiagnosticSeverity::Hint,
        ] {
            assert_eq!(DiagnosticSeverity::from_name(Some(severity.name())), severity);
            assert_eq!(severity.to_string(), severity.name());
        }
    }
}
