//! Tests for data values bound to formal arguments: subrange coercion,
//! tick-rate checks and string validation.

use annodb_core::{
    DataValue, Database, DatabaseOptions, DbId, FargType, FormalArgument, PredicateVocabElement,
    SystemError, TimeStamp, Value, VocabElement,
};
use proptest::prelude::*;

/// A database holding one predicate element `p` with the single argument
/// `farg`. Returns the argument id.
fn single_arg(farg: FormalArgument) -> (Database, DbId) {
    let mut db = Database::new(DatabaseOptions::default()).expect("database");
    let pve = PredicateVocabElement::with_fargs("p", vec![farg]).expect("pve");
    let pve_id = db.add_predicate_ve(pve).expect("add");
    let farg_id = db
        .vocab()
        .pve(pve_id)
        .expect("pve")
        .farg(0)
        .expect("farg")
        .id();
    (db, farg_id)
}

fn ts(tps: u32, ticks: i64) -> TimeStamp {
    TimeStamp::new(tps, ticks).expect("time stamp")
}

#[test]
fn integers_clamp_to_the_subrange() {
    let (db, farg_id) = single_arg(FormalArgument::integer_ranged("<n>", 0, 10).expect("farg"));
    let mut dv = DataValue::bound(db.vocab(), farg_id, Value::Int(42)).expect("bound");
    assert_eq!(dv.value(), &Value::Int(10));
    insta::assert_snapshot!(
        dv.to_db_string(),
        @"(IntDataValue (id 0) (itsFargID 2) (itsFargType INTEGER) (itsCellID 0) (itsValue 10) (subRange true) (minVal 0) (maxVal 10))"
    );
    dv.set_int(-3).expect("set");
    assert_eq!(dv.value(), &Value::Int(0));
}

#[test]
fn floats_clamp_to_the_subrange() {
    let (db, farg_id) =
        single_arg(FormalArgument::float_ranged("<f>", -1.0, 1.0).expect("farg"));
    let dv = DataValue::bound(db.vocab(), farg_id, Value::Float(2.5)).expect("bound");
    insta::assert_snapshot!(
        dv.to_db_string(),
        @"(FloatDataValue (id 0) (itsFargID 2) (itsFargType FLOAT) (itsCellID 0) (itsValue 1.0) (subRange true) (minVal -1.0) (maxVal 1.0))"
    );
}

#[test]
fn time_stamp_subrange_checks_the_tick_rate() {
    let (db, farg_id) = single_arg(
        FormalArgument::time_stamp_ranged("<t>", ts(60, 100), ts(60, 1000)).expect("farg"),
    );
    let farg = db.vocab().farg(farg_id).expect("farg");
    let check = |value: TimeStamp| farg.is_valid_value(db.vocab(), &Value::TimeStamp(value));
    assert!(!check(ts(60, 99)).expect("same rate"));
    assert!(check(ts(60, 100)).expect("same rate"));
    assert!(check(ts(60, 1000)).expect("same rate"));
    assert!(!check(ts(60, 1001)).expect("same rate"));
    let err = check(ts(30, 500)).unwrap_err();
    assert!(matches!(err, SystemError::TickRate { .. }));

    let dv = DataValue::bound(db.vocab(), farg_id, Value::TimeStamp(ts(60, 5000)))
        .expect("bound");
    assert_eq!(dv.value(), &Value::TimeStamp(ts(60, 1000)));
    assert!(DataValue::bound(db.vocab(), farg_id, Value::TimeStamp(ts(30, 5))).is_err());
}

#[test]
fn unapproved_nominals_are_reset() {
    let mut farg = FormalArgument::nominal("<who>").expect("farg");
    farg.set_sub_range(true).expect("subrange");
    farg.add_approved_nominal("alice").expect("approve");
    let (db, farg_id) = single_arg(farg);

    let alice = DataValue::bound(db.vocab(), farg_id, Value::Nominal(Some("alice".into())))
        .expect("alice");
    assert_eq!(alice.value().as_str(), Some("alice"));
    let mut bob = DataValue::bound(db.vocab(), farg_id, Value::Nominal(Some("bob".into())))
        .expect("bob");
    assert_eq!(bob.value(), &Value::Nominal(None));
    assert!(bob.is_default());
    bob.set_nominal(db.vocab(), Some("alice")).expect("set");
    assert_eq!(bob.to_string(), "alice");
}

#[test]
fn quote_strings_reject_embedded_quotes() {
    assert!(DataValue::quote_string(Some("say \"hi\"")).is_err());
    let (db, farg_id) = single_arg(FormalArgument::quote_string("<q>").expect("farg"));
    let dv = DataValue::bound(db.vocab(), farg_id, Value::QuoteString(Some("hello".into())))
        .expect("bound");
    assert_eq!(dv.to_string(), "\"hello\"");
    assert_eq!(dv.farg_type(), FargType::QuoteString);
}

#[test]
fn untyped_slots_take_anything_but_text() {
    let (db, farg_id) = single_arg(FormalArgument::untyped("<any>").expect("farg"));
    let farg = db.vocab().farg(farg_id).expect("farg");
    assert!(farg.is_valid_value(db.vocab(), &Value::Int(3)).expect("int"));
    assert!(farg.is_valid_value(db.vocab(), &Value::Float(0.5)).expect("float"));
    assert!(!farg.is_valid_value(db.vocab(), &Value::Text(Some("t".into()))).expect("text"));

    let empty = farg.construct_empty_arg(db.tps()).expect("empty");
    assert_eq!(empty.value(), &Value::Undefined("<any>".to_string()));
    assert_eq!(empty.to_string(), "<any>");
    let err = DataValue::bound(db.vocab(), farg_id, Value::Text(Some("t".into()))).unwrap_err();
    assert!(matches!(err, SystemError::TypeMismatch { .. }));
}

#[test]
fn binding_to_an_unknown_argument_fails() {
    let (db, _) = single_arg(FormalArgument::integer("<n>").expect("farg"));
    let err = DataValue::bound(db.vocab(), DbId::new(99), Value::Int(1)).unwrap_err();
    assert!(matches!(err, SystemError::NotFound { .. }));
    assert!(DataValue::bound(db.vocab(), DbId::INVALID, Value::Int(1)).is_err());
}

#[test]
fn salvage_converts_between_numeric_types() {
    let (db, int_id) = single_arg(FormalArgument::integer("<n>").expect("farg"));
    let old = DataValue::bound(db.vocab(), int_id, Value::Int(7)).expect("bound");
    let float = FormalArgument::float("<f>").expect("farg");
    let salvaged = float
        .construct_arg_with_salvage(db.tps(), Some(&old))
        .expect("salvage");
    assert_eq!(salvaged.value(), &Value::Float(7.0));

    let stamp = FormalArgument::time_stamp("<t>").expect("farg");
    let salvaged = stamp
        .construct_arg_with_salvage(db.tps(), Some(&old))
        .expect("salvage");
    assert_eq!(salvaged.value(), &Value::TimeStamp(ts(60, 7)));

    let quote = FormalArgument::quote_string("<q>").expect("farg");
    let salvaged = quote
        .construct_arg_with_salvage(db.tps(), Some(&old))
        .expect("salvage");
    assert_eq!(salvaged.value(), &Value::QuoteString(None));
}

proptest! {
    #[test]
    fn integer_coercion_lands_in_range_and_is_idempotent(
        lo in -1_000i64..1_000,
        width in 1i64..1_000,
        v in any::<i64>(),
    ) {
        let hi = lo + width;
        let (db, farg_id) =
            single_arg(FormalArgument::integer_ranged("<n>", lo, hi).expect("farg"));
        let mut dv = DataValue::bound(db.vocab(), farg_id, Value::Int(v)).expect("bound");
        let Value::Int(first) = *dv.value() else {
            panic!("integer payload expected");
        };
        prop_assert!((lo..=hi).contains(&first));
        prop_assert_eq!(first, v.clamp(lo, hi));
        dv.set_int(first).expect("set");
        prop_assert_eq!(dv.value(), &Value::Int(first));
    }
}
