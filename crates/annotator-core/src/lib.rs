#![warn(missing_docs)]
//! Annotator Core - headless regex annotation engine
//!
//! # Overview
//!
//! `annotator-core` turns a list of user-configured regex rules into editor diagnostics and
//! inline decorations, and keeps both current as documents change and the active editor
//! moves. It does not draw anything: results land in an in-memory [`AnnotationSink`] that a
//! UI layer reads (or subscribes to).
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session (activate / reload / passthroughs) │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  EventDispatcher + RuleEngine (refresh)     │  ← Event-driven refresh
//! ├─────────────────────────────────────────────┤
//! │  Scanner + Message templater                │  ← Matching
//! ├─────────────────────────────────────────────┤
//! │  Rule compiler + severity palette           │  ← Rule model
//! ├─────────────────────────────────────────────┤
//! │  Workspace (rope-backed documents, editors) │  ← Host model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use annotator_core::{DiagnosticSeverity, RuleDefinition, Session, TextRange};
//!
//! let mut session = Session::new();
//! let doc = session
//!     .open_document("file:///main.rs", "rust", "fn main() {}\n// TODO fix this\n")
//!     .unwrap();
//! session.open_editor(doc).unwrap();
//!
//! let report = session.activate(&[RuleDefinition::new("todo", "TODO")
//!     .with_severity("Information")]);
//! assert!(report.is_clean());
//!
//! let diagnostics = session.sink().diagnostics_for_uri("file:///main.rs");
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].range, TextRange::on_line(1, 3, 7));
//! assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Information);
//! assert_eq!(diagnostics[0].message, "Information");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - rope-backed text documents
//! - [`workspace`] - open documents, editors and the active editor
//! - [`rule`] - rule compilation and regex flags
//! - [`scan`] - line-oriented match scanning
//! - [`template`] - message templating
//! - [`sink`] - published diagnostics and decorations
//! - [`events`] - host events and subscriptions
//! - [`engine`] - per-rule refresh controller
//! - [`session`] - everything wired together

pub mod decorations;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod error;
pub mod events;
pub mod rule;
pub mod scan;
pub mod session;
pub mod sink;
pub mod style;
pub mod template;
pub mod workspace;

pub use annotator_rules::RuleDefinition;
pub use decorations::{BorderStyle, Decoration, DecorationStyle, OverviewRulerLane, StyleHandle};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Position, TextRange};
pub use document::TextDocument;
pub use engine::{RefreshOutcome, RefreshPhase, RuleEngine, RuleId, RuleResources};
pub use error::{
    PatternCompilationError, ScanRuntimeError, TemplateMismatchError, WorkspaceError,
};
pub use events::{EventDispatcher, EventKind, HostEvent, SubscriptionId};
pub use rule::{CompileOptions, CompiledRule, DEFAULT_BACKTRACK_LIMIT, RegexFlags};
pub use scan::{RuleMatch, scan_document, scan_line};
pub use session::{LoadReport, Session};
pub use sink::{
    AnnotationEdit, AnnotationSink, CollectionId, SinkChange, SinkChangeCallback, SinkChangeType,
};
pub use style::{SeverityPalette, ThemeColor};
pub use template::{render_message, try_render_message};
pub use workspace::{DocumentId, EditorId, Workspace};
