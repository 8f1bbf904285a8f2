use annotator_core::{
    AnnotationSink, BorderStyle, CompiledRule, DecorationStyle, DiagnosticSeverity,
    EventDispatcher, HostEvent, OverviewRulerLane, RefreshOutcome, RuleDefinition, RuleEngine,
    RuleId, Session, SeverityPalette, Workspace,
};
use pretty_assertions::assert_eq;

#[test]
fn test_reload_replaces_rules_without_leftovers() {
    let mut session = Session::new();
    let doc = session
        .open_document("mem://a", "plaintext", "TODO and FIXME")
        .unwrap();
    let editor = session.open_editor(doc).unwrap();

    session.activate(&[
        RuleDefinition::new("todo", "TODO"),
        RuleDefinition::new("fixme", "FIXME").with_severity("Error"),
    ]);
    assert_eq!(session.sink().diagnostic_count(), 2);
    assert_eq!(session.sink().decorations_for_editor(editor).count(), 2);

    let report = session.reload(&[RuleDefinition::new("fixme", "FIXME").with_severity("Hint")]);
    assert_eq!(report.loaded, vec!["fixme".to_string()]);
    assert_eq!(session.engine_count(), 1);
    assert_eq!(session.subscription_count(), 2);
    assert_eq!(session.sink().collection_count(), 1);
    assert_eq!(session.sink().style_count(), 1);

    let diagnostics = session.sink().diagnostics_for_uri("mem://a");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Hint);
    assert_eq!(session.sink().decorations_for_editor(editor).count(), 1);
}

#[test]
fn test_closing_drops_annotations() {
    let mut session = Session::new();
    let a = session.open_document("mem://a", "plaintext", "TODO").unwrap();
    let b = session.open_document("mem://b", "plaintext", "TODO TODO").unwrap();
    let editor_a = session.open_editor(a).unwrap();
    let editor_b = session.open_editor(b).unwrap();
    session.activate(&[RuleDefinition::new("todo", "TODO")]);
    assert_eq!(session.sink().uris_with_diagnostics(), vec!["mem://a"]);

    // Closing the active editor moves focus to `editor_b`, which gets refreshed.
    session.close_editor(editor_a).unwrap();
    assert_eq!(session.workspace().active_editor(), Some(editor_b));
    assert_eq!(session.sink().decorations_for_editor(editor_a).count(), 0);
    assert_eq!(
        session.sink().uris_with_diagnostics(),
        vec!["mem://a", "mem://b"]
    );

    session.close_document(b).unwrap();
    assert_eq!(session.workspace().active_editor(), None);
    assert_eq!(session.sink().decorations_for_editor(editor_b).count(), 0);
    assert_eq!(session.sink().uris_with_diagnostics(), vec!["mem://a"]);
}

#[test]
fn test_engine_resources_are_released_together() {
    let mut workspace = Workspace::new();
    let doc = workspace.open_document("mem://a", "plaintext", "x x").unwrap();
    let editor = workspace.open_editor(doc).unwrap();

    let mut sink = AnnotationSink::new();
    let mut dispatcher = EventDispatcher::new();
    let rule =
        CompiledRule::compile(&RuleDefinition::new("x", "x").with_severity("Error")).unwrap();
    let mut engine = RuleEngine::new(RuleId::new(7), rule, &mut sink, &mut dispatcher);

    let style = engine.resources().unwrap().style;
    let palette = SeverityPalette::for_severity(DiagnosticSeverity::Error);
    assert_eq!(
        sink.style(style),
        Some(&DecorationStyle {
            background: palette.background,
            border: palette.border,
            border_width: 1,
            border_style: BorderStyle::Solid,
            overview_ruler: palette.foreground,
            overview_ruler_lane: OverviewRulerLane::Full,
        })
    );
    assert_eq!(dispatcher.len(), 2);

    let outcome = engine.handle(
        &HostEvent::ActiveEditorChanged(Some(editor)),
        &workspace,
        &mut sink,
    );
    assert_eq!(
        outcome,
        RefreshOutcome::Published {
            diagnostics: 2,
            editors: 1
        }
    );
    assert_eq!(sink.decorations(editor, style).len(), 2);

    engine.release(&mut sink, &mut dispatcher);
    assert!(engine.is_released());
    assert!(dispatcher.is_empty());
    assert_eq!(sink.diagnostic_count(), 0);
    assert_eq!(sink.collection_count(), 0);
    assert!(sink.style(style).is_none());
    assert!(sink.decorations(editor, style).is_empty());

    // A released engine ignores triggers.
    let outcome = engine.handle(&HostEvent::DocumentChanged(doc), &workspace, &mut sink);
    assert_eq!(outcome, RefreshOutcome::NoTarget);
    assert_eq!(sink.diagnostic_count(), 0);
}
