use annotator_rules::{RuleDefinition, RuleSet, RuleSetError};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn test_settings_object_with_malformed_entries() {
    let text = r#"{
        "rules": [
            { "name": "todo", "pattern": "TODO", "severity": "Information" },
            { "name": "no-pattern" },
            { "name": "px", "pattern": "(\\d+)px", "message": "found $1 pixels", "severity": "Error" },
            "not an object"
        ]
    }"#;

    let set = RuleSet::from_json_str(text).unwrap();

    assert_eq!(
        set.rules,
        vec![
            RuleDefinition::new("todo", "TODO").with_severity("Information"),
            RuleDefinition::new("px", r"(\d+)px")
                .with_message("found $1 pixels")
                .with_severity("Error"),
        ]
    );

    let skipped: Vec<usize> = set.skipped.iter().map(|s| s.index).collect();
    assert_eq!(skipped, vec![1, 3]);
}

#[test]
fn test_from_file_roundtrips_definitions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    let rules = vec![
        RuleDefinition::new("fixme", "FIXME")
            .with_languages(["rust", "python"])
            .with_flags("i"),
    ];
    fs::write(&path, serde_json::to_string_pretty(&rules).unwrap()).unwrap();

    let set = RuleSet::from_file(&path).unwrap();
    assert_eq!(set.rules, rules);
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = RuleSet::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, RuleSetError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}
