//! Line-oriented match scanning.
//!
//! The scanner applies a compiled rule to every line of a document with global-regex
//! semantics: a per-line cursor starts at column 0, each search begins at the cursor, and the
//! cursor moves to the end of each match. Zero-length matches move the cursor one character
//! further so scanning always terminates. Matches never span lines and never overlap.

use crate::diagnostics::TextRange;
use crate::document::TextDocument;
use crate::error::ScanRuntimeError;
use crate::rule::CompiledRule;
use crate::template::render_message;

/// One match of a rule on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Zero-based line index.
    pub line: usize,
    /// Start column (inclusive), in characters.
    pub start: usize,
    /// End column (exclusive), in characters.
    pub end: usize,
    /// The matched text.
    pub text: String,
    /// Rendered message.
    pub message: String,
}

impl RuleMatch {
    /// The match as a single-line range.
    pub fn range(&self) -> TextRange {
        TextRange::on_line(self.line, self.start, self.end)
    }
}

/// Scan a whole document.
///
/// Returns no matches (without looking at the text) when the rule's language scope excludes
/// the document. The result is ordered by `(line, start)`.
pub fn scan_document(
    rule: &CompiledRule,
    document: &TextDocument,
) -> Result<Vec<RuleMatch>, ScanRuntimeError> {
    let mut matches = Vec::new();
    if !rule.applies_to(document.language_id()) {
        return Ok(matches);
    }

    for (line, text) in document.lines().enumerate() {
        scan_line(rule, line, &text, &mut matches)?;
    }
    Ok(matches)
}

/// Scan a single line, appending matches to `out`.
pub fn scan_line(
    rule: &CompiledRule,
    line: usize,
    text: &str,
    out: &mut Vec<RuleMatch>,
) -> Result<(), ScanRuntimeError> {
    let regex = rule.regex();
    let sticky = rule.flags().sticky;
    let mut columns = CharColumns::new(text);
    let mut cursor = 0usize;

    while cursor <= text.len() {
        let found = regex
            .find_from_pos(text, cursor)
            .map_err(|source| ScanRuntimeError {
                rule: rule.name().to_string(),
                line,
                source,
            })?;
        let Some(m) = found else {
            break;
        };
        if sticky && m.start() != cursor {
            break;
        }

        let start = columns.column_at(m.start());
        let end = columns.column_at(m.end());
        out.push(RuleMatch {
            line,
            start,
            end,
            text: m.as_str().to_string(),
            message: render_message(rule, m.as_str()),
        });

        cursor = if m.end() > m.start() {
            m.end()
        } else {
            next_char_boundary(text, m.end())
        };
    }

    Ok(())
}

fn next_char_boundary(text: &str, byte: usize) -> usize {
    text[byte..]
        .chars()
        .next()
        .map_or(byte + 1, |c| byte + c.len_utf8())
}

/// Byte offset -> character column conversion for monotonically increasing offsets.
struct CharColumns<'a> {
    text: &'a str,
    byte: usize,
    column: usize,
}

impl<'a> CharColumns<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            column: 0,
        }
    }

    fn column_at(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.column = 0;
        }
        self.column += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotator_rules::RuleDefinition;

    fn compile(definition: RuleDefinition) -> CompiledRule {
        CompiledRule::compile(&definition).unwrap()
    }

    fn spans(rule: &CompiledRule, text: &str) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        scan_line(rule, 0, text, &mut out).unwrap();
        out.iter().map(|m| (m.start, m.end)).collect()
    }

    #[test]
    fn test_repeated_matches_on_one_line() {
        let rule = compile(RuleDefinition::new("t", "ab"));
        assert_eq!(spans(&rule, "ab ab abab"), vec![(0, 2), (3, 5), (6, 8), (8, 10)]);
    }

    #[test]
    fn test_zero_length_matches_terminate() {
        let rule = compile(RuleDefinition::new("t", "x*"));
        // Empty matches at every position, including the end of the line.
        assert_eq!(spans(&rule, "ab"), vec![(0, 0), (1, 1), (2, 2)]);

        let rule = compile(RuleDefinition::new("t", r"\d*"));
        assert_eq!(spans(&rule, "12a"), vec![(0, 2), (2, 2), (3, 3)]);

        let rule = compile(RuleDefinition::new("t", "^"));
        assert_eq!(spans(&rule, ""), vec![(0, 0)]);
    }

    #[test]
    fn test_columns_are_characters() {
        let rule = compile(RuleDefinition::new("t", "b+"));
        assert_eq!(spans(&rule, "a👋bb é b"), vec![(2, 4), (7, 8)]);

        let rule = compile(RuleDefinition::new("t", ""));
        assert_eq!(spans(&rule, "é"), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_sticky_flag_requires_contiguous_matches() {
        let rule = compile(RuleDefinition::new("t", "a").with_flags("y"));
        assert_eq!(spans(&rule, "aab a"), vec![(0, 1), (1, 2)]);
        assert!(spans(&rule, "ba").is_empty());
    }

    #[test]
    fn test_messages_are_rendered_per_match() {
        let rule = compile(
            RuleDefinition::new("t", r"(\d+)px")
                .with_message("found $1 pixels")
                .with_severity("Error"),
        );
        let mut out = Vec::new();
        scan_line(&rule, 4, "width: 10px; height: 2px", &mut out).unwrap();

        let messages: Vec<&str> = out.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(messages, vec!["found 10 pixels", "found 2 pixels"]);
        assert_eq!(out[0].range(), TextRange::on_line(4, 7, 11));
        assert_eq!(out[0].text, "10px");
    }

    #[test]
    fn test_lookbehind_sees_text_before_cursor() {
        let rule = compile(RuleDefinition::new("t", r"(?<=\$)\w+"));
        assert_eq!(spans(&rule, "$a $bc d"), vec![(1, 2), (4, 6)]);
    }

    #[test]
    fn test_language_scope_excludes_document() {
        let rule = compile(RuleDefinition::new("t", "TODO").with_languages(["rust"]));
        let doc = TextDocument::new("mem://a.py", "python", "# TODO\n");
        assert!(scan_document(&rule, &doc).unwrap().is_empty());

        let doc = TextDocument::new("mem://a.rs", "rust", "// TODO\n");
        assert_eq!(scan_document(&rule, &doc).unwrap().len(), 1);
    }

    #[test]
    fn test_backtrack_limit_is_a_runtime_error() {
        let rule = CompiledRule::compile_with(
            &RuleDefinition::new("slow", r"(a+)+\1b"),
            &crate::rule::CompileOptions { backtrack_limit: 100 },
        )
        .unwrap();
        let doc = TextDocument::new("mem://a", "plaintext", "ok\naaaaaaaaaaaaaaaaaaaaaaaaaaaa\n");

        let err = scan_document(&rule, &doc).unwrap_err();
        assert_eq!(err.rule, "slow");
        assert_eq!(err.line, 1);
    }
}
