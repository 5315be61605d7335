//! End-to-end tests for loading feature directories from disk.

mod support;

use gherkin_pilot::{LoadError, SkippableFeature, from_directory};

use support::feature_dir;

const PLAIN_SCENARIO: &str = "\n  Scenario: works\n    When I pass\n";

fn feature_text(name: &str) -> String {
    format!("Feature: {name}\n{PLAIN_SCENARIO}")
}

fn dependent_feature_text(name: &str, dependency: &str) -> String {
    format!(
        "Feature: {name}\n\n  Background:\n    Given I am run after the \"{dependency}\" feature\n{PLAIN_SCENARIO}"
    )
}

#[test]
fn features_load_in_lexical_file_order() {
    let dir = feature_dir(&[
        ("b.feature", &feature_text("Beta")),
        ("a.feature", &feature_text("Alpha")),
        ("c.feature", &feature_text("Gamma")),
    ]);
    let features = from_directory(dir.path()).unwrap_or_else(|err| panic!("load failed: {err}"));
    let names: Vec<&str> = features.iter().map(|feature| feature.name()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn dependency_markers_reorder_features() {
    let dir = feature_dir(&[
        ("a.feature", &dependent_feature_text("Second", "First")),
        ("b.feature", &feature_text("First")),
    ]);
    let features = from_directory(dir.path()).unwrap_or_else(|err| panic!("load failed: {err}"));
    let names: Vec<&str> = features.iter().map(|feature| feature.name()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(
        features.last().map(|feature| feature.depends_on.clone()),
        Some(vec!["First".to_string()])
    );
}

#[test]
fn last_tagged_feature_runs_at_the_end() {
    let dir = feature_dir(&[
        ("a.feature", &format!("@Last\n{}", feature_text("Teardown"))),
        ("b.feature", &feature_text("Work")),
    ]);
    let features = from_directory(dir.path()).unwrap_or_else(|err| panic!("load failed: {err}"));
    let names: Vec<&str> = features.iter().map(|feature| feature.name()).collect();
    assert_eq!(names, vec!["Work", "Teardown"]);
}

#[test]
fn only_tag_flags_other_features_for_skipping() {
    let dir = feature_dir(&[
        ("a.feature", &feature_text("Plain")),
        ("b.feature", &format!("@Only\n{}", feature_text("Chosen"))),
    ]);
    let features = from_directory(dir.path()).unwrap_or_else(|err| panic!("load failed: {err}"));
    let flags: Vec<(&str, bool)> = features
        .iter()
        .map(|feature| (feature.name(), feature.skip))
        .collect();
    assert_eq!(flags, vec![("Plain", true), ("Chosen", false)]);
}

#[test]
fn empty_directory_is_an_error() {
    let dir = feature_dir(&[("notes.txt", "not a feature")]);
    let result = from_directory(dir.path());
    assert!(matches!(result, Err(LoadError::NoFeaturesFound { .. })));
}

#[test]
fn unknown_dependency_is_an_error() {
    let dir = feature_dir(&[("a.feature", &dependent_feature_text("Orphan", "Ghost"))]);
    let error = match from_directory(dir.path()) {
        Err(error) => error.to_string(),
        Ok(_) => panic!("expected an unknown dependency error"),
    };
    assert!(error.contains("Orphan"));
    assert!(error.contains("Ghost"));
}

#[test]
fn invalid_gherkin_names_the_file() {
    let dir = feature_dir(&[("broken.feature", "this is not gherkin at all")]);
    let result = from_directory(dir.path());
    let Err(LoadError::Parse { path, .. }) = result else {
        panic!("expected a parse error");
    };
    assert!(path.ends_with("broken.feature"));
}

#[test]
fn missing_trailing_newline_still_parses() {
    let dir = feature_dir(&[(
        "a.feature",
        "Feature: Terse\n\n  Scenario: works\n    When I pass",
    )]);
    let features = from_directory(dir.path()).unwrap_or_else(|err| panic!("load failed: {err}"));
    assert_eq!(features.first().map(SkippableFeature::name), Some("Terse"));
}
