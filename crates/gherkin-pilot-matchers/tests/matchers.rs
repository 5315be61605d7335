//! Behavioural tests for the matcher crate's public surface.

#![expect(clippy::expect_used, reason = "tests assert matcher construction")]

use rstest::rstest;

use gherkin_pilot_matchers::{BoundArgs, NamedGroupMatcher, RegexMatcher, StepMatcher};

#[rstest]
#[case("I GET /status", Some("/status"))]
#[case("I GET /devices/42", Some("/devices/42"))]
fn regex_matcher_extracts_positional_argument(#[case] text: &str, #[case] expected: Option<&str>) {
    let matcher = RegexMatcher::new(r"^I GET (\S+)$").expect("pattern should compile");
    let args = matcher.try_match(text).expect("step text should match");
    assert_eq!(args.positional(0), expected);
}

#[test]
fn first_match_precedence_is_callers_concern() {
    // Both matchers accept the text; the crate only answers yes/no per
    // matcher. Registration order in the engine decides the winner.
    let broad = RegexMatcher::new(r"^I GET .+$").expect("pattern should compile");
    let narrow = RegexMatcher::new(r"^I GET /status$").expect("pattern should compile");
    assert!(broad.try_match("I GET /status").is_some());
    assert!(narrow.try_match("I GET /status").is_some());
}

#[test]
fn named_matcher_round_trip() {
    let matcher = NamedGroupMatcher::new(
        r"^the (?P<field>\w+) of the response should equal (?P<value>.+)$",
    )
    .expect("pattern should compile");
    let args = matcher
        .try_match("the status of the response should equal ok")
        .expect("step text should match");
    assert_eq!(args.named("field"), Some("status"));
    assert_eq!(args.named("value"), Some("ok"));
    assert_eq!(args.len(), 2);
}

#[test]
fn trait_objects_dispatch_uniformly() {
    let matchers: Vec<Box<dyn StepMatcher>> = vec![
        Box::new(RegexMatcher::new(r"^I wait$").expect("pattern should compile")),
        Box::new(
            NamedGroupMatcher::new(r"^I wait (?P<seconds>\d+) seconds$")
                .expect("pattern should compile"),
        ),
    ];
    let matched: Vec<Option<BoundArgs>> = matchers
        .iter()
        .map(|m| m.try_match("I wait 3 seconds"))
        .collect();
    assert!(matched.first().is_some_and(Option::is_none));
    assert!(
        matched
            .get(1)
            .and_then(Option::as_ref)
            .is_some_and(|args| args.named("seconds") == Some("3"))
    );
}
