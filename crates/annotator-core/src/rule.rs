//! Rule compilation and severity mapping.
//!
//! A [`CompiledRule`] is built once from a [`RuleDefinition`] and is immutable afterwards.
//! Compilation:
//!
//! - validates the JavaScript-style flag letters and turns the supported ones into inline
//!   modifiers (`(?ims)`),
//! - compiles the pattern with a bounded backtracking budget,
//! - maps the severity name to a [`DiagnosticSeverity`] and a [`SeverityPalette`],
//! - settles the effective message template (the severity name when none is configured).
//!
//! Scanning is always global; a `g` flag is accepted but changes nothing.

use crate::decorations::DecorationStyle;
use crate::diagnostics::DiagnosticSeverity;
use crate::error::PatternCompilationError;
use crate::style::SeverityPalette;
use annotator_rules::RuleDefinition;
use fancy_regex::{Regex, RegexBuilder};

/// Default backtracking budget per search.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// Engine tuning applied when compiling rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum backtracking steps per search before the scan fails with
    /// [`ScanRuntimeError`](crate::ScanRuntimeError).
    pub backtrack_limit: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

/// Parsed regex flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexFlags {
    /// `i`: case-insensitive matching.
    pub ignore_case: bool,
    /// `m`: `^`/`$` match at embedded line breaks.
    pub multi_line: bool,
    /// `s`: `.` matches line breaks.
    pub dot_all: bool,
    /// `y`: every match must start exactly where the previous one ended.
    pub sticky: bool,
    /// `u`: Unicode mode. Always on in this engine; kept for round-tripping.
    pub unicode: bool,
    /// `v`: Unicode sets mode. Treated like `u`.
    pub unicode_sets: bool,
    /// `d`: match indices. Always produced; kept for round-tripping.
    pub has_indices: bool,
}

impl RegexFlags {
    /// Parse flag letters. `None` behaves like `"g"`.
    pub fn parse(rule: &str, flags: Option<&str>) -> Result<Self, PatternCompilationError> {
        let mut parsed = Self::default();
        let mut seen = String::new();

        for flag in flags.unwrap_or("g").chars() {
            if seen.contains(flag) {
                return Err(PatternCompilationError::DuplicateFlag {
                    rule: rule.to_string(),
                    flag,
                });
            }
            seen.push(flag);

            match flag {
                'g' => {}
                'i' => parsed.ignore_case = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'y' => parsed.sticky = true,
                'u' => parsed.unicode = true,
                'v' => parsed.unicode_sets = true,
                'd' => parsed.has_indices = true,
                _ => {
                    return Err(PatternCompilationError::UnknownFlag {
                        rule: rule.to_string(),
                        flag,
                    });
                }
            }
        }

        Ok(parsed)
    }

    /// Canonical flag string. Always contains `g`.
    pub fn to_flag_string(self) -> String {
        let mut out = String::new();
        for (on, letter) in [
            (self.has_indices, 'd'),
            (true, 'g'),
            (self.ignore_case, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
            (self.unicode, 'u'),
            (self.unicode_sets, 'v'),
            (self.sticky, 'y'),
        ] {
            if on {
                out.push(letter);
            }
        }
        out
    }

    fn inline_modifiers(self) -> String {
        let mut letters = String::new();
        if self.ignore_case {
            letters.push('i');
        }
        if self.multi_line {
            letters.push('m');
        }
        if self.dot_all {
            letters.push('s');
        }

        if letters.is_empty() {
            letters
        } else {
            format!("(?{letters})")
        }
    }
}

/// A compiled, immutable annotation rule.
#[derive(Debug)]
pub struct CompiledRule {
    name: String,
    languages: Option<Vec<String>>,
    source: String,
    flags: RegexFlags,
    regex: Regex,
    has_named_groups: bool,
    severity: DiagnosticSeverity,
    message: String,
    palette: SeverityPalette,
}

impl CompiledRule {
    /// Compile a rule with default options.
    pub fn compile(definition: &RuleDefinition) -> Result<Self, PatternCompilationError> {
        Self::compile_with(definition, &CompileOptions::default())
    }

    /// Compile a rule.
    pub fn compile_with(
        definition: &RuleDefinition,
        options: &CompileOptions,
    ) -> Result<Self, PatternCompilationError> {
        let flags = RegexFlags::parse(&definition.name, definition.flags.as_deref())?;
        let effective = format!("{}{}", flags.inline_modifiers(), definition.pattern);

        let regex = RegexBuilder::new(&effective)
            .backtrack_limit(options.backtrack_limit)
            .build()
            .map_err(|source| PatternCompilationError::InvalidPattern {
                rule: definition.name.clone(),
                source,
            })?;
        let has_named_groups = regex.capture_names().any(|name| name.is_some());

        let severity = DiagnosticSeverity::from_name(definition.severity.as_deref());
        let message = definition
            .message
            .clone()
            .unwrap_or_else(|| severity.name().to_string());

        Ok(Self {
            name: definition.name.clone(),
            languages: definition.languages.clone(),
            source: definition.pattern.clone(),
            flags,
            regex,
            has_named_groups,
            severity,
            message,
            palette: SeverityPalette::for_severity(severity),
        })
    }

    /// Rule name (the diagnostic code).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Language scope, if any.
    pub fn languages(&self) -> Option<&[String]> {
        self.languages.as_deref()
    }

    /// Returns `true` if documents of `language_id` are scanned by this rule.
    pub fn applies_to(&self, language_id: &str) -> bool {
        self.languages
            .as_ref()
            .is_none_or(|langs| langs.iter().any(|l| l == language_id))
    }

    /// Pattern source as configured (without inline modifiers).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed flags.
    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    /// Severity of produced diagnostics.
    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    /// Effective message template.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity palette.
    pub fn palette(&self) -> SeverityPalette {
        self.palette
    }

    /// Decoration style this rule registers in the sink.
    pub fn decoration_style(&self) -> DecorationStyle {
        DecorationStyle::boxed(&self.palette)
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn has_named_groups(&self) -> bool {
        self.has_named_groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_defaults() {
        let rule = CompiledRule::compile(&RuleDefinition::new("r", "x").with_severity("Bogus"))
            .unwrap();
        assert_eq!(rule.severity(), DiagnosticSeverity::Warning);
        assert_eq!(rule.message(), "Warning");
        assert_eq!(
            rule.palette(),
            SeverityPalette::for_severity(DiagnosticSeverity::Warning)
        );

        let rule = CompiledRule::compile(&RuleDefinition::new("r", "x")).unwrap();
        assert_eq!(rule.severity(), DiagnosticSeverity::Warning);
    }

    #[test]
    fn test_severity_mapping_and_fallback_message() {
        for (input, expected) in [
            ("Error", DiagnosticSeverity::Error),
            ("Information", DiagnosticSeverity::Information),
            ("Hint", DiagnosticSeverity::Hint),
            ("Warning", DiagnosticSeverity::Warning),
        ] {
            let rule =
                CompiledRule::compile(&RuleDefinition::new("r", "x").with_severity(input))
                    .unwrap();
            assert_eq!(rule.severity(), expected);
            assert_eq!(rule.message(), input);
        }
    }

    #[test]
    fn test_explicit_message_wins() {
        let rule = CompiledRule::compile(
            &RuleDefinition::new("r", "x")
                .with_severity("Error")
                .with_message("custom"),
        )
        .unwrap();
        assert_eq!(rule.message(), "custom");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = CompiledRule::compile(&RuleDefinition::new("broken", "(unclosed")).unwrap_err();
        assert!(matches!(err, PatternCompilationError::InvalidPattern { .. }));
        assert_eq!(err.rule(), "broken");
    }

    #[test]
    fn test_flag_parsing() {
        let flags = RegexFlags::parse("r", Some("yig")).unwrap();
        assert!(flags.ignore_case);
        assert!(flags.sticky);
        assert!(!flags.multi_line);
        assert_eq!(flags.to_flag_string(), "giy");

        assert_eq!(RegexFlags::parse("r", None).unwrap().to_flag_string(), "g");
        assert_eq!(RegexFlags::parse("r", Some("")).unwrap().to_flag_string(), "g");
    }

    #[test]
    fn test_bad_flags() {
        let err = RegexFlags::parse("r", Some("gx")).unwrap_err();
        assert!(matches!(
            err,
            PatternCompilationError::UnknownFlag { flag: 'x', .. }
        ));

        let err = RegexFlags::parse("r", Some("ii")).unwrap_err();
        assert!(matches!(
            err,
            PatternCompilationError::DuplicateFlag { flag: 'i', .. }
        ));
    }

    #[test]
    fn test_ignore_case_flag_applies() {
        let rule =
            CompiledRule::compile(&RuleDefinition::new("r", "todo").with_flags("i")).unwrap();
        assert!(rule.regex().is_match("TODO").unwrap());
        assert_eq!(rule.source(), "todo");
    }

    #[test]
    fn test_language_scope() {
        let rule = CompiledRule::compile(
            &RuleDefinition::new("r", "x").with_languages(["rust", "toml"]),
        )
        .unwrap();
        assert!(rule.applies_to("toml"));
        assert!(!rule.applies_to("python"));
        assert_eq!(rule.languages().map(<[String]>::len), Some(2));
    }
}
