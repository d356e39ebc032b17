//! Tests for the compatibility table

use multihop_foundation::{CompatibilityTable, InfoType as T, OperatorType as Op};

#[test]
fn one_input_combination_can_yield_several_outputs() {
    let table = CompatibilityTable::standard();
    let outputs = table.outputs(Op::Search, &[T::PersonName]).unwrap();
    assert!(outputs.contains(&T::Date));
    assert!(outputs.contains(&T::LocationName));
}

#[test]
fn input_order_matters() {
    let table = CompatibilityTable::standard();
    assert!(table.allows(Op::Search, &[T::PersonName, T::LocationName], T::EventName));
    assert!(!table.allows(Op::Search, &[T::LocationName, T::PersonName], T::EventName));
}

#[test]
fn disallowed_combinations_have_no_outputs() {
    let table = CompatibilityTable::standard();
    assert!(table.outputs(Op::Compare, &[T::CityName]).is_none());
}

#[test]
fn custom_tables_start_empty() {
    let table = CompatibilityTable::new();
    assert!(table.is_empty());

    let table = table
        .with(Op::Lookup, &[T::ArtworkName], T::Date)
        .with(Op::Lookup, &[T::ArtworkName], T::Url);
    assert_eq!(table.len(), 2);
    let triples: Vec<_> = table.iter().collect();
    assert_eq!(triples[0], (Op::Lookup, &[T::ArtworkName][..], T::Date));
}

#[test]
fn standard_table_iterates_every_triple() {
    let table = CompatibilityTable::standard();
    assert_eq!(table.iter().count(), table.len());
    assert!(table.iter().all(|(op, inputs, out)| table.allows(op, inputs, out)));
}
