//! The annotation session: workspace, sink, dispatcher and rule engines wired together.
//!
//! A [`Session`] plays the part of the extension host. Hosts mutate documents and editors
//! through it; each mutation is turned into a [`HostEvent`] and dispatched to the engines
//! subscribed to that event stream.

use crate::engine::{RefreshOutcome, RuleEngine, RuleId};
use crate::error::{PatternCompilationError, WorkspaceError};
use crate::events::{EventDispatcher, HostEvent};
use crate::rule::{CompileOptions, CompiledRule};
use crate::sink::{AnnotationSink, SinkChange};
use crate::workspace::{DocumentId, EditorId, Workspace};
use annotator_rules::RuleDefinition;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::{debug, info, warn};

/// Result of loading a batch of rule definitions.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of the rules that were activated, in definition order.
    pub loaded: Vec<String>,
    /// Rules that failed to compile.
    pub failed: Vec<PatternCompilationError>,
}

impl LoadReport {
    /// Returns `true` if every definition compiled.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Headless annotation session.
#[derive(Debug)]
pub struct Session {
    workspace: Workspace,
    sink: AnnotationSink,
    dispatcher: EventDispatcher<RuleId>,
    engines: BTreeMap<RuleId, RuleEngine>,
    next_rule_id: u64,
    options: CompileOptions,
    diagnostic_source: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with an empty workspace and no rules.
    pub fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            sink: AnnotationSink::new(),
            dispatcher: EventDispatcher::new(),
            engines: BTreeMap::new(),
            next_rule_id: 0,
            options: CompileOptions::default(),
            diagnostic_source: None,
        }
    }

    /// Use `options` when compiling rules.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Label every published diagnostic with `source`.
    pub fn with_diagnostic_source(mut self, source: impl Into<String>) -> Self {
        self.diagnostic_source = Some(source.into());
        self
    }

    // ---- rule lifecycle ----

    /// Compile and start `definitions`.
    ///
    /// Each definition is compiled on its own; a rule that fails to compile is reported in the
    /// returned [`LoadReport`] and the rest still load. If an editor is active, every new
    /// engine refreshes it.
    pub fn activate(&mut self, definitions: &[RuleDefinition]) -> LoadReport {
        let mut report = LoadReport::default();
        let mut started = Vec::new();

        for definition in definitions {
            let rule = match CompiledRule::compile_with(definition, &self.options) {
                Ok(rule) => rule,
                Err(err) => {
                    warn!(rule = definition.name.as_str(), %err, "rule failed to compile");
                    report.failed.push(err);
                    continue;
                }
            };

            let id = RuleId(self.next_rule_id);
            self.next_rule_id = self.next_rule_id.saturating_add(1);
            let engine = RuleEngine::new(id, rule, &mut self.sink, &mut self.dispatcher)
                .with_source(self.diagnostic_source.clone());
            report.loaded.push(definition.name.clone());
            self.engines.insert(id, engine);
            started.push(id);
        }

        if let Some(editor) = self.workspace.active_editor() {
            for id in &started {
                if let Some(engine) = self.engines.get_mut(id) {
                    engine.refresh_editor(editor, &self.workspace, &mut self.sink);
                }
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "rules activated"
        );
        report
    }

    /// Release every engine and start `definitions` instead.
    pub fn reload(&mut self, definitions: &[RuleDefinition]) -> LoadReport {
        self.deactivate();
        self.activate(definitions)
    }

    /// Release every engine. No annotations remain afterwards.
    pub fn deactivate(&mut self) {
        let count = self.engines.len();
        for (_, mut engine) in std::mem::take(&mut self.engines) {
            engine.release(&mut self.sink, &mut self.dispatcher);
        }
        if count > 0 {
            debug!(count, "rules deactivated");
        }
    }

    /// Forward an event to every subscribed engine, in subscription order.
    pub fn dispatch(&mut self, event: HostEvent) -> Vec<(RuleId, RefreshOutcome)> {
        let mut outcomes = Vec::new();
        for id in self.dispatcher.listeners(&event) {
            if let Some(engine) = self.engines.get_mut(&id) {
                let outcome = engine.handle(&event, &self.workspace, &mut self.sink);
                outcomes.push((id, outcome));
            }
        }
        outcomes
    }

    // ---- host passthroughs ----

    /// Open a document. No event is sent until an editor shows it or it changes.
    pub fn open_document(
        &mut self,
        uri: impl Into<String>,
        language_id: impl Into<String>,
        text: &str,
    ) -> Result<DocumentId, WorkspaceError> {
        self.workspace.open_document(uri, language_id, text)
    }

    /// Open an editor on a document. If it became the active editor the engines refresh it.
    pub fn open_editor(&mut self, document: DocumentId) -> Result<EditorId, WorkspaceError> {
        let before = self.workspace.active_editor();
        let editor = self.workspace.open_editor(document)?;
        self.dispatch_active_change(before);
        Ok(editor)
    }

    /// Make `editor` the active editor (or clear it).
    pub fn set_active_editor(&mut self, editor: Option<EditorId>) -> Result<(), WorkspaceError> {
        self.workspace.set_active_editor(editor)?;
        self.dispatch(HostEvent::ActiveEditorChanged(editor));
        Ok(())
    }

    /// Replace a character range of a document.
    pub fn edit_document(
        &mut self,
        document: DocumentId,
        range: Range<usize>,
        text: &str,
    ) -> Result<(), WorkspaceError> {
        self.workspace.edit_document(document, range, text)?;
        self.dispatch(HostEvent::DocumentChanged(document));
        Ok(())
    }

    /// Replace a document's whole text.
    pub fn set_document_text(
        &mut self,
        document: DocumentId,
        text: &str,
    ) -> Result<(), WorkspaceError> {
        self.workspace.set_document_text(document, text)?;
        self.dispatch(HostEvent::DocumentChanged(document));
        Ok(())
    }

    /// Change a document's language id.
    pub fn set_document_language(
        &mut self,
        document: DocumentId,
        language_id: impl Into<String>,
    ) -> Result<(), WorkspaceError> {
        self.workspace.set_document_language(document, language_id)?;
        self.dispatch(HostEvent::DocumentChanged(document));
        Ok(())
    }

    /// Close an editor, dropping its decorations.
    pub fn close_editor(&mut self, editor: EditorId) -> Result<(), WorkspaceError> {
        let before = self.workspace.active_editor();
        self.workspace.close_editor(editor)?;
        self.sink.forget_editor(editor);
        self.dispatch_active_change(before);
        Ok(())
    }

    /// Close a document and its editors, dropping their annotations.
    pub fn close_document(&mut self, document: DocumentId) -> Result<(), WorkspaceError> {
        let before = self.workspace.active_editor();
        let uri = self
            .workspace
            .document(document)
            .map(|doc| doc.uri().to_string())
            .ok_or(WorkspaceError::DocumentNotFound(document))?;

        let closed = self.workspace.close_document(document)?;
        for editor in closed {
            self.sink.forget_editor(editor);
        }
        self.sink.forget_document(&uri);
        self.dispatch_active_change(before);
        Ok(())
    }

    fn dispatch_active_change(&mut self, before: Option<EditorId>) {
        let after = self.workspace.active_editor();
        if after != before {
            self.dispatch(HostEvent::ActiveEditorChanged(after));
        }
    }

    // ---- accessors ----

    /// The host model.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Published annotations.
    pub fn sink(&self) -> &AnnotationSink {
        &self.sink
    }

    /// Subscribe to sink change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SinkChange) + Send + 'static,
    {
        self.sink.subscribe(callback);
    }

    /// Number of live subscriptions across all engines.
    pub fn subscription_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Look up an engine.
    pub fn engine(&self, id: RuleId) -> Option<&RuleEngine> {
        self.engines.get(&id)
    }

    /// Live engines, in activation order.
    pub fn engines(&self) -> impl Iterator<Item = &RuleEngine> + '_ {
        self.engines.values()
    }

    /// Find a live engine by rule name.
    pub fn engine_by_name(&self, name: &str) -> Option<&RuleEngine> {
        self.engines.values().find(|engine| engine.rule().name() == name)
    }

    /// Returns the number of live engines.
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_rule_does_not_block_others() {
        let mut session = Session::new();
        let report = session.activate(&[
            RuleDefinition::new("broken", "(unclosed"),
            RuleDefinition::new("todo", "TODO"),
            RuleDefinition::new("flags", "x").with_flags("gq"),
        ]);

        assert_eq!(report.loaded, vec!["todo".to_string()]);
        let failed: Vec<&str> = report.failed.iter().map(|e| e.rule()).collect();
        assert_eq!(failed, vec!["broken", "flags"]);
        assert!(!report.is_clean());
        assert_eq!(session.engine_count(), 1);
        assert_eq!(session.subscription_count(), 2);
    }

    #[test]
    fn test_activate_refreshes_active_editor() {
        let mut session = Session::new();
        let doc = session
            .open_document("mem://a", "plaintext", "TODO\nTODO later")
            .unwrap();
        session.open_editor(doc).unwrap();

        session.activate(&[RuleDefinition::new("todo", "TODO")]);
        assert_eq!(session.sink().diagnostics_for_uri("mem://a").len(), 2);
        assert_eq!(
            session.engine_by_name("todo").map(RuleEngine::phase),
            Some(crate::engine::RefreshPhase::Published)
        );
    }

    #[test]
    fn test_no_active_editor_means_no_initial_refresh() {
        let mut session = Session::new();
        session
            .open_document("mem://a", "plaintext", "TODO")
            .unwrap();
        session.activate(&[RuleDefinition::new("todo", "TODO")]);
        assert_eq!(session.sink().diagnostic_count(), 0);
    }

    #[test]
    fn test_deactivate_releases_everything() {
        let mut session = Session::new();
        let doc = session.open_document("mem://a", "plaintext", "TODO").unwrap();
        let editor = session.open_editor(doc).unwrap();
        session.activate(&[RuleDefinition::new("todo", "TODO")]);
        assert_eq!(session.sink().decorations_for_editor(editor).count(), 1);

        session.deactivate();
        assert_eq!(session.engine_count(), 0);
        assert_eq!(session.subscription_count(), 0);
        assert_eq!(session.sink().diagnostic_count(), 0);
        assert_eq!(session.sink().collection_count(), 0);
        assert_eq!(session.sink().style_count(), 0);
        assert_eq!(session.sink().decorations_for_editor(editor).count(), 0);

        // Events after teardown reach nobody.
        session.set_document_text(doc, "TODO TODO").unwrap();
        assert_eq!(session.sink().diagnostic_count(), 0);
    }
}
