//! Tests for concrete values

use multihop_foundation::Value;

#[test]
fn floats_display_with_two_decimals() {
    assert_eq!(Value::Float(60.465_434).to_string(), "60.47");
    assert_eq!(Value::Float(330.0).to_string(), "330.0");
}

#[test]
fn dates_display_iso() {
    assert_eq!(Value::date(1452, 4, 15).unwrap().to_string(), "1452-04-15");
}

#[test]
fn conversions_pick_the_matching_variant() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(7_i64), Value::Int(7));
    assert_eq!(Value::from(String::from("Ulm")).as_text(), Some("Ulm"));
    let date = chrono::NaiveDate::from_ymd_opt(1939, 9, 1).unwrap();
    assert_eq!(Value::from(date).as_date(), Some(date));
}

#[test]
fn equality_is_by_variant_and_content() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::from("WW2"), Value::text("WW2"));
}
