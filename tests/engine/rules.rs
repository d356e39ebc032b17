//! Integration tests for rule registration and lookup

use multihop_engine::{Predicate, Rule, RuleId, RuleSet};
use multihop_foundation::{CompatibilityTable, ErrorKind, InfoType as T, OperatorType as Op, RuleViolation};

use crate::support;

fn violation(rule: Rule) -> RuleViolation {
    let err = RuleSet::new(CompatibilityTable::standard()).register(rule).unwrap_err();
    match err.kind {
        ErrorKind::InvalidRule { reason, .. } => reason,
        other => panic!("expected InvalidRule, got {other:?}"),
    }
}

#[test]
fn rules_without_inputs_are_rejected() {
    let rule = Rule::new("nothing", Op::Search, Vec::new(), T::Date, "");
    assert_eq!(violation(rule), RuleViolation::NoInputs);
}

#[test]
fn transitions_outside_the_table_are_rejected() {
    let rule = Rule::new("odd", Op::Compare, [T::CityName, T::CityName], T::Boolean, "");
    assert!(matches!(violation(rule), RuleViolation::NotCompatible { .. }));
}

#[test]
fn self_loops_are_rejected() {
    let table = CompatibilityTable::new().with(Op::Lookup, &[T::CityName], T::CityName);
    let err = RuleSet::new(table)
        .register(Rule::new("twin", Op::Lookup, [T::CityName], T::CityName, ""))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::InvalidRule {
            reason: RuleViolation::SelfLoop(T::CityName),
            ..
        }
    ));
}

#[test]
fn predicates_must_address_existing_slots() {
    let rule = Rule::new("birth-date", Op::Search, [T::PersonName], T::Date, "").with_predicate(
        Predicate::TextExcludes {
            slot: 3,
            needle: "x".into(),
        },
    );
    assert_eq!(violation(rule), RuleViolation::PredicateSlot(3));
}

#[test]
fn a_failed_registration_leaves_the_set_unchanged() {
    let mut set = support::rules();
    let before = set.len();
    let dup = Rule::new("year", Op::Calculate, [T::Date], T::NumericalValue, "");
    assert!(set.register(dup).is_err());
    assert_eq!(set.len(), before);
}

#[test]
fn forward_index_respects_slot_multiplicity() {
    let set = support::rules();
    let ids = |types: &[T]| -> Vec<String> {
        set.rules_applicable_to(types.iter().copied())
            .iter()
            .map(|r| r.id.to_string())
            .collect()
    };
    assert_eq!(ids(&[T::PersonName]), ["birth-date", "birth-place"]);
    assert_eq!(ids(&[T::Date]), ["year"]);
    assert_eq!(ids(&[T::Date, T::Date]), ["duration", "year", "earlier"]);
    assert!(ids(&[T::Boolean]).is_empty());
}

#[test]
fn backward_index_lists_producers_in_registration_order() {
    let set = support::rules();
    let producers: Vec<_> = set
        .rules_producing(T::NumericalValue)
        .iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(producers, ["population", "year"]);
    assert_eq!(set.position(&RuleId::new("population")), Some(3));
}

#[test]
fn builder_registration_chains() {
    let set = RuleSet::new(CompatibilityTable::standard())
        .with_rule(Rule::new("a", Op::Search, [T::PersonName], T::Date, ""))
        .and_then(|s| s.with_rule(Rule::new("b", Op::Search, [T::EventName], T::Date, "")))
        .unwrap();
    assert_eq!(set.rules_producing(T::Date).len(), 2);
    assert!(set.get(&RuleId::new("b")).is_some());
}
