//! Tests for information and operator type names

use multihop_foundation::{ErrorKind, InfoType, OperatorType};

#[test]
fn every_info_type_round_trips_through_its_name() {
    for t in InfoType::ALL {
        assert_eq!(t.name().parse::<InfoType>().unwrap(), t);
        assert_eq!(t.to_string(), t.name());
    }
}

#[test]
fn every_operator_round_trips_through_its_name() {
    for op in OperatorType::ALL {
        assert_eq!(op.name().parse::<OperatorType>().unwrap(), op);
    }
}

#[test]
fn names_are_forgiving_about_case_and_separators() {
    assert_eq!(InfoType::from_name("person name"), Some(InfoType::PersonName));
    assert_eq!(InfoType::from_name(" duration-years "), Some(InfoType::DurationYears));
    assert_eq!(OperatorType::from_name("run_code"), Some(OperatorType::RunCode));
}

#[test]
fn unknown_names_are_errors() {
    let err = "PLANET".parse::<InfoType>().unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownInfoType("PLANET".into()));

    let err = "TELEPORT".parse::<OperatorType>().unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownOperator("TELEPORT".into()));
}

#[test]
fn phrases_read_as_prose() {
    assert_eq!(InfoType::DurationYears.phrase(), "duration years");
    assert_eq!(InfoType::Date.phrase(), "date");
}
