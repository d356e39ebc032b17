//! Tests for error construction and display

use multihop_foundation::{Error, ErrorContext, ErrorKind, InfoType, OperatorType, RuleViolation};

#[test]
fn invalid_rule_names_the_rule_and_reason() {
    let err = Error::invalid_rule("birth-date", RuleViolation::DuplicateId);
    assert_eq!(err.to_string(), "invalid rule birth-date: rule id is already registered");
    assert!(!err.is_invariant_violation());
}

#[test]
fn incompatible_triples_display_their_signature() {
    let reason = RuleViolation::NotCompatible {
        operator: OperatorType::Compare,
        inputs: vec![InfoType::CityName],
        output: InfoType::Boolean,
    };
    assert_eq!(reason.to_string(), "COMPARE(CITY_NAME) -> BOOLEAN is not an allowed transition");
}

#[test]
fn invariant_errors_carry_context() {
    let err = Error::invariant("input refers to a later step")
        .with_context(ErrorContext::new().with_source("r3").with_step(2));
    assert!(err.is_invariant_violation());
    let ctx = err.context.unwrap();
    assert_eq!(ctx.to_string(), "at r3 (step 2)");
}

#[test]
fn config_errors_keep_their_message() {
    let err = Error::config("no seed given");
    assert_eq!(err.kind, ErrorKind::Config("no seed given".into()));
    assert_eq!(err.to_string(), "configuration error: no seed given");
}
