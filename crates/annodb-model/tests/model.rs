//! Tests for annodb-model types.

use annodb_model::names::{is_valid_farg_name, is_valid_nominal, is_valid_quote_string};
use annodb_model::{Cell, DatabaseOptions, DbId, SystemError, TimeStamp};
use proptest::prelude::*;

#[test]
fn set_ord_rejects_values_below_one() {
    let mut cell = Cell::new(DbId::new(2));
    for bad in [0, -1, i32::MIN] {
        let err = cell.set_ord(bad).expect_err("ord < 1 must fail");
        assert_eq!(err.context(), "Cell::set_ord()");
    }
    cell.set_ord(1).expect("ord 1");
    assert_eq!(cell.ord(), 1);
    cell.set_ord(42).expect("ord 42");
    assert_eq!(cell.ord(), 42);
}

#[test]
fn options_defaults_and_builders() {
    let options = DatabaseOptions::default();
    assert_eq!(options.tps, 60);
    assert_eq!(options.name, "Undefined");
    options.validate().expect("default options are valid");

    let custom = DatabaseOptions::new().with_tps(25).with_name("coding");
    assert_eq!(custom.tps, 25);
    assert_eq!(custom.name, "coding");
}

#[test]
fn options_reject_bad_tick_rate() {
    let err = DatabaseOptions::new().with_tps(0).validate().unwrap_err();
    assert!(matches!(err, SystemError::TickRate { .. }));
    assert!(DatabaseOptions::new().with_tps(1001).validate().is_err());
}

#[test]
fn options_round_trip_through_json() {
    let options = DatabaseOptions::new()
        .with_tps(30)
        .with_description("pilot coding");
    let json = serde_json::to_string(&options).expect("serialize options");
    let round: DatabaseOptions = serde_json::from_str(&json).expect("deserialize options");
    assert_eq!(round, options);

    let partial: DatabaseOptions =
        serde_json::from_str(r#"{"tps": 1000}"#).expect("partial options");
    assert_eq!(partial.tps, 1000);
    assert_eq!(partial.name, "Undefined");
}

#[test]
fn cell_serializes() {
    let mut cell = Cell::with_comment(DbId::new(9), "looks away");
    cell.set_ord(3).expect("ord");
    let json = serde_json::to_string(&cell).expect("serialize cell");
    let round: Cell = serde_json::from_str(&json).expect("deserialize cell");
    assert_eq!(round, cell);
}

proptest! {
    #[test]
    fn tps_round_trip_through_higher_rate(ticks in 0i64..10_000_000, tps in 1u32..=100) {
        let mut ts = TimeStamp::new(tps, ticks).unwrap();
        ts.set_tps(tps * 10).unwrap();
        prop_assert_eq!(ts.ticks(), ticks * 10);
        ts.set_tps(tps).unwrap();
        prop_assert_eq!(ts.ticks(), ticks);
    }

    #[test]
    fn hmsf_fields_recompose(ticks in 0i64..1_000_000_000, tps in 1u32..=1000) {
        let ts = TimeStamp::new(tps, ticks).unwrap();
        let tps = i64::from(tps);
        let seconds = ts.hours() * 3600 + ts.minutes() * 60 + ts.seconds();
        prop_assert_eq!(seconds * tps + ts.frames(), ticks);
        prop_assert!(ts.minutes() < 60 && ts.seconds() < 60);
    }

    #[test]
    fn wrapped_names_are_farg_names(inner in "[a-zA-Z0-9_-]{1,12}") {
        let wrapped = format!("<{inner}>");
        prop_assert!(is_valid_farg_name(&wrapped));
        prop_assert!(is_valid_nominal(&inner));
    }

    #[test]
    fn quote_strings_never_hold_quotes(text in "[ -~]{0,20}") {
        prop_assert_eq!(is_valid_quote_string(&text), !text.contains('"'));
    }
}
