//! Per-rule engines and the refresh controller.
//!
//! A [`RuleEngine`] owns one [`CompiledRule`] plus the host resources created for it
//! ([`RuleResources`]). Every trigger runs a full refresh:
//!
//! ```text
//! Idle/Published --trigger--> Scanning --ok--> Published
//!                                 \--scan error--> Idle   (previous annotations kept)
//! ```
//!
//! A refresh scans the target document, builds the diagnostic and decoration lists locally,
//! and hands both to the sink in one batch. Nothing is published until the scan completed.

use crate::decorations::{Decoration, StyleHandle};
use crate::diagnostics::Diagnostic;
use crate::error::ScanRuntimeError;
use crate::events::{EventDispatcher, EventKind, HostEvent, SubscriptionId};
use crate::rule::CompiledRule;
use crate::scan::{RuleMatch, scan_document};
use crate::sink::{AnnotationEdit, AnnotationSink, CollectionId};
use crate::workspace::{DocumentId, EditorId, Workspace};
use tracing::{debug, warn};

/// Identifies a rule engine within a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub(crate) u64);

impl RuleId {
    /// Create an id for an engine driven outside a [`Session`](crate::Session).
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Where an engine is in its refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// Nothing published by the last refresh (none ran yet, it had no target, or it failed).
    Idle,
    /// A scan is running.
    Scanning,
    /// The last refresh published its results.
    Published,
}

/// Result of one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New annotations were published.
    Published {
        /// Number of diagnostics published for the document.
        diagnostics: usize,
        /// Number of editors whose decorations were replaced.
        editors: usize,
    },
    /// The scan failed; previously published annotations were left in place.
    Retained,
    /// The trigger did not resolve to anything to refresh.
    NoTarget,
}

/// Host resources owned by one rule.
///
/// [`RuleResources::release`] tears all of them down together.
#[derive(Debug)]
pub struct RuleResources {
    /// The rule's diagnostic collection.
    pub collection: CollectionId,
    /// The rule's decoration style.
    pub style: StyleHandle,
    /// The rule's event subscriptions.
    pub subscriptions: Vec<SubscriptionId>,
}

impl RuleResources {
    /// Create the collection, style and subscriptions for `rule`.
    pub fn acquire(
        id: RuleId,
        rule: &CompiledRule,
        sink: &mut AnnotationSink,
        dispatcher: &mut EventDispatcher<RuleId>,
    ) -> Self {
        let collection = sink.create_collection(rule.name());
        let style = sink.register_style(rule.decoration_style());
        let subscriptions = vec![
            dispatcher.subscribe(EventKind::DocumentChanged, id),
            dispatcher.subscribe(EventKind::ActiveEditorChanged, id),
        ];
        Self {
            collection,
            style,
            subscriptions,
        }
    }

    /// Clear and dispose the collection, release the style (dropping its decorations in every
    /// editor), and unsubscribe from every event stream.
    pub fn release(self, sink: &mut AnnotationSink, dispatcher: &mut EventDispatcher<RuleId>) {
        sink.clear_collection(self.collection);
        sink.dispose_collection(self.collection);
        sink.release_style(self.style);
        for subscription in self.subscriptions {
            dispatcher.unsubscribe(subscription);
        }
    }
}

/// One live rule.
#[derive(Debug)]
pub struct RuleEngine {
    id: RuleId,
    rule: CompiledRule,
    source: Option<String>,
    resources: Option<RuleResources>,
    phase: RefreshPhase,
    last_error: Option<ScanRuntimeError>,
}

impl RuleEngine {
    /// Create an engine and acquire its resources.
    pub fn new(
        id: RuleId,
        rule: CompiledRule,
        sink: &mut AnnotationSink,
        dispatcher: &mut EventDispatcher<RuleId>,
    ) -> Self {
        let resources = RuleResources::acquire(id, &rule, sink, dispatcher);
        Self {
            id,
            rule,
            source: None,
            resources: Some(resources),
            phase: RefreshPhase::Idle,
            last_error: None,
        }
    }

    /// Label published as the `source` of every diagnostic.
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Engine id.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// The compiled rule.
    pub fn rule(&self) -> &CompiledRule {
        &self.rule
    }

    /// Current refresh phase.
    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    /// Resources, or `None` once released.
    pub fn resources(&self) -> Option<&RuleResources> {
        self.resources.as_ref()
    }

    /// The error of the most recent failed scan, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&ScanRuntimeError> {
        self.last_error.as_ref()
    }

    /// React to a host event.
    pub fn handle(
        &mut self,
        event: &HostEvent,
        workspace: &Workspace,
        sink: &mut AnnotationSink,
    ) -> RefreshOutcome {
        match *event {
            HostEvent::DocumentChanged(document) => {
                self.refresh_document(document, workspace, sink)
            }
            HostEvent::ActiveEditorChanged(Some(editor)) => {
                self.refresh_editor(editor, workspace, sink)
            }
            HostEvent::ActiveEditorChanged(None) => RefreshOutcome::NoTarget,
        }
    }

    /// Refresh a document: its diagnostics and the decorations of every editor showing it.
    pub fn refresh_document(
        &mut self,
        document: DocumentId,
        workspace: &Workspace,
        sink: &mut AnnotationSink,
    ) -> RefreshOutcome {
        let editors = workspace.editors_for_document(document);
        self.refresh(document, &editors, workspace, sink)
    }

    /// Refresh one editor: its document's diagnostics and that editor's decorations.
    pub fn refresh_editor(
        &mut self,
        editor: EditorId,
        workspace: &Workspace,
        sink: &mut AnnotationSink,
    ) -> RefreshOutcome {
        match workspace.editor_document(editor) {
            Ok(document) => self.refresh(document, &[editor], workspace, sink),
            Err(_) => RefreshOutcome::NoTarget,
        }
    }

    fn refresh(
        &mut self,
        document: DocumentId,
        editors: &[EditorId],
        workspace: &Workspace,
        sink: &mut AnnotationSink,
    ) -> RefreshOutcome {
        let Some(resources) = self.resources.as_ref() else {
            return RefreshOutcome::NoTarget;
        };
        let Some(text_document) = workspace.document(document) else {
            self.phase = RefreshPhase::Idle;
            return RefreshOutcome::NoTarget;
        };

        self.phase = RefreshPhase::Scanning;
        let matches = match scan_document(&self.rule, text_document) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(
                    rule = self.rule.name(),
                    uri = text_document.uri(),
                    %err,
                    "scan failed; keeping previous annotations"
                );
                self.last_error = Some(err);
                self.phase = RefreshPhase::Idle;
                return RefreshOutcome::Retained;
            }
        };

        let (diagnostics, decorations) = self.build_annotations(&matches);
        let diagnostic_count = diagnostics.len();

        let mut edits = Vec::with_capacity(editors.len() + 1);
        edits.push(AnnotationEdit::ReplaceDiagnostics {
            collection: resources.collection,
            uri: text_document.uri().to_string(),
            diagnostics,
        });
        edits.extend(
            editors
                .iter()
                .map(|editor| AnnotationEdit::ReplaceDecorations {
                    editor: *editor,
                    style: resources.style,
                    decorations: decorations.clone(),
                }),
        );
        sink.apply(edits);

        debug!(
            rule = self.rule.name(),
            uri = text_document.uri(),
            version = text_document.version(),
            diagnostics = diagnostic_count,
            editors = editors.len(),
            "published annotations"
        );
        self.last_error = None;
        self.phase = RefreshPhase::Published;
        RefreshOutcome::Published {
            diagnostics: diagnostic_count,
            editors: editors.len(),
        }
    }

    fn build_annotations(&self, matches: &[RuleMatch]) -> (Vec<Diagnostic>, Vec<Decoration>) {
        let mut diagnostics = Vec::with_capacity(matches.len());
        let mut decorations = Vec::with_capacity(matches.len());
        for m in matches {
            let range = m.range();
            diagnostics.push(Diagnostic {
                range,
                severity: self.rule.severity(),
                code: self.rule.name().to_string(),
                source: self.source.clone(),
                message: m.message.clone(),
            });
            decorations.push(Decoration {
                range,
                hover_message: m.message.clone(),
            });
        }
        (diagnostics, decorations)
    }

    /// Release the engine's resources. Further triggers are ignored.
    pub fn release(
        &mut self,
        sink: &mut AnnotationSink,
        dispatcher: &mut EventDispatcher<RuleId>,
    ) {
        if let Some(resources) = self.resources.take() {
            debug!(rule = self.rule.name(), "releasing rule resources");
            resources.release(sink, dispatcher);
        }
        self.phase = RefreshPhase::Idle;
    }

    /// Returns `true` once [`RuleEngine::release`] ran.
    pub fn is_released(&self) -> bool {
        self.resources.is_none()
    }
}
