//! Rope-backed text documents.
//!
//! A [`TextDocument`] is the snapshot the scanner reads: an ordered sequence of lines plus the
//! language id of the whole document. Lines are split on `\n`, `\r\n` and `\r`; the terminator
//! is never part of the line text.

use ropey::Rope;
use std::ops::Range;

/// An open text document.
#[derive(Debug, Clone)]
pub struct TextDocument {
    uri: String,
    language_id: String,
    version: u64,
    rope: Rope,
}

impl TextDocument {
    /// Create a document at version 0.
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>, text: &str) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version: 0,
            rope: Rope::from_str(text),
        }
    }

    /// Document identity (host-provided URI or path).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Language id of the whole document (e.g. `"rust"`).
    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    /// Content version; incremented on every text or language change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of lines. A trailing line terminator opens a final empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total length in characters (Unicode scalar values), terminators included.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Text of a single line without its terminator.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }

        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Iterate over all line texts in document order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).filter_map(|line| self.line_text(line))
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Convert a (line, column) position into a character offset, clamping out-of-range input.
    pub fn position_to_char_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let line_start = self.rope.line_to_char(line);
        let line_len = self.line_text(line).map_or(0, |t| t.chars().count());
        line_start + column.min(line_len)
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.bump_version();
    }

    /// Replace a character range with `text`. The range is clamped to the document.
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        self.bump_version();
    }

    /// Change the language id (e.g. the user picked a different language mode).
    pub fn set_language_id(&mut self, language_id: impl Into<String>) {
        self.language_id = language_id.into();
        self.bump_version();
    }

    fn bump_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }
}
