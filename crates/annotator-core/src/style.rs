//! Severity-driven style table.
//!
//! The engine never resolves colors. It names theme color tokens (the same token vocabulary
//! editors use for built-in squiggles) and leaves resolution to the presentation layer.

use crate::diagnostics::DiagnosticSeverity;
use std::fmt;

/// A named theme color token, e.g. `editorError.background`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThemeColor(&'static str);

impl ThemeColor {
    /// Create a token from its id.
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    /// Token id.
    pub fn id(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Foreground / background / border tokens for one severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityPalette {
    /// Foreground (used for the overview ruler marker).
    pub foreground: ThemeColor,
    /// Background tint.
    pub background: ThemeColor,
    /// Border color.
    pub border: ThemeColor,
}

const ERROR: SeverityPalette = SeverityPalette {
    foreground: ThemeColor::new("editorError.foreground"),
    background: ThemeColor::new("editorError.background"),
    border: ThemeColor::new("editorError.border"),
};

const WARNING: SeverityPalette = SeverityPalette {
    foreground: ThemeColor::new("editorWarning.foreground"),
    background: ThemeColor::new("editorWarning.background"),
    border: ThemeColor::new("editorWarning.border"),
};

const INFORMATION: SeverityPalette = SeverityPalette {
    foreground: ThemeColor::new("editorInfo.foreground"),
    background: ThemeColor::new("editorInfo.background"),
    border: ThemeColor::new("editorInfo.border"),
};

const HINT: SeverityPalette = SeverityPalette {
    foreground: ThemeColor::new("editorHint.foreground"),
    background: ThemeColor::new("editorHint.background"),
    border: ThemeColor::new("editorHint.border"),
};

impl SeverityPalette {
    /// Palette for a severity.
    pub fn for_severity(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Error => ERROR,
            DiagnosticSeverity::Warning => WARNING,
            DiagnosticSeverity::Information => INFORMATION,
            DiagnosticSeverity::Hint => HINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_tokens() {
        let info = SeverityPalette::for_severity(DiagnosticSeverity::Information);
        assert_eq!(info.background.id(), "editorInfo.background");
        assert_eq!(info.border.to_string(), "editorInfo.border");

        let warn = SeverityPalette::for_severity(DiagnosticSeverity::Warning);
        assert_eq!(warn.foreground.id(), "editorWarning.foreground");
    }
}
