//! Inline decoration data model.
//!
//! Decorations are the in-editor side of an annotation: a highlighted range with hover text,
//! painted by the host using a [`DecorationStyle`] that the producing rule registered once.
//! They are keyed by editor, not by document: two editors on the same document carry separate
//! decoration lists.

use crate::diagnostics::TextRange;
use crate::style::{SeverityPalette, ThemeColor};

/// Handle to a decoration style registered in an [`AnnotationSink`](crate::AnnotationSink).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleHandle(pub(crate) u64);

impl StyleHandle {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    /// A solid line.
    Solid,
    /// A dashed line.
    Dashed,
    /// A dotted line.
    Dotted,
}

/// Which lane of the overview ruler (scrollbar gutter) a marker is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewRulerLane {
    /// Left third.
    Left,
    /// Center third.
    Center,
    /// Right third.
    Right,
    /// Full width.
    Full,
}

/// Presentation of a decoration, resolved to real colors by the host theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationStyle {
    /// Background tint.
    pub background: ThemeColor,
    /// Border color.
    pub border: ThemeColor,
    /// Border width in CSS pixels.
    pub border_width: u8,
    /// Border line style.
    pub border_style: BorderStyle,
    /// Overview ruler marker color.
    pub overview_ruler: ThemeColor,
    /// Overview ruler lane.
    pub overview_ruler_lane: OverviewRulerLane,
}

impl DecorationStyle {
    /// The boxed, ruler-marked style used for rule matches.
    pub fn boxed(palette: &SeverityPalette) -> Self {
        Self {
            background: palette.background,
            border: palette.border,
            border_width: 1,
            border_style: BorderStyle::Solid,
            overview_ruler: palette.foreground,
            overview_ruler_lane: OverviewRulerLane::Full,
        }
    }
}

/// A single decoration item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Anchor range.
    pub range: TextRange,
    /// Hover text (plain text).
    pub hover_message: String,
}
