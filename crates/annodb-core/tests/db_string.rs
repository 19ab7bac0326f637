//! Tests for the debug string forms of stored elements.

use annodb_core::{
    DataCell, DataValue, Database, DatabaseOptions, DbId, FormalArgument, Matrix, MatrixType,
    MatrixVocabElement, Predicate, PredicateVocabElement, TimeStamp,
};

/// Column `trial` (ids 1-7), predicate `hit` (ids 8-9) and one cell holding
/// `7` (ids 10-11).
fn fixture() -> (Database, DbId, DbId) {
    let mut db = Database::new(DatabaseOptions::default()).expect("database");
    let mve = MatrixVocabElement::with_fargs(
        "trial",
        MatrixType::Integer,
        vec![FormalArgument::integer("<val>").expect("farg")],
    )
    .expect("mve");
    let col_id = db.add_column(mve).expect("column");
    let pve = PredicateVocabElement::with_fargs(
        "hit",
        vec![FormalArgument::integer("<a>").expect("farg")],
    )
    .expect("pve");
    let pve_id = db.add_predicate_ve(pve).expect("pve");
    let mve_id = db.column(col_id).expect("column").mve_id();
    let val = Matrix::with_args(db.vocab(), mve_id, vec![DataValue::int(7)]).expect("matrix");
    let cell = DataCell::with_value(
        db.vocab(),
        col_id,
        TimeStamp::new(60, 0).expect("onset"),
        TimeStamp::new(60, 60).expect("offset"),
        val,
    )
    .expect("cell");
    let cell_id = db.append_cell(cell).expect("append");
    (db, pve_id, cell_id)
}

#[test]
fn cell_db_string() {
    let (db, _, cell_id) = fixture();
    let cell = db.cell(cell_id).expect("cell");
    insta::assert_snapshot!(
        cell.to_db_string(),
        @"(DataCell (id 10) (itsColID 7) (itsMveID 1) (itsMveType INTEGER) (ord 1) (onset (60,00:00:00:000)) (offset (60,00:00:01:000)) (val (Matrix (mveID 1) (varLen false) (argList ((IntDataValue (id 11) (itsFargID 2) (itsFargType INTEGER) (itsCellID 10) (itsValue 7) (subRange false) (minVal 0) (maxVal 0))))))))"
    );
    assert_eq!(cell.to_string(), "(1, 00:00:00:000, 00:00:01:000, (7))");
}

#[test]
fn column_list_db_string() {
    let (db, _, _) = fixture();
    insta::assert_snapshot!(
        db.columns_to_db_string(),
        @"((ColumnList) (cl_size: 1) (cl_contents: ((DataColumn (name trial) (id 7) (hidden false) (readOnly false) (itsMveID 1) (itsMveType INTEGER) (varLen false) (numCells 1) (itsCells ((DataCell (id 10) (itsColID 7) (itsMveID 1) (itsMveType INTEGER) (ord 1) (onset (60,00:00:00:000)) (offset (60,00:00:01:000)) (val (Matrix (mveID 1) (varLen false) (argList ((IntDataValue (id 11) (itsFargID 2) (itsFargType INTEGER) (itsCellID 10) (itsValue 7) (subRange false) (minVal 0) (maxVal 0)))))))))))))))"
    );
}

#[test]
fn vocab_list_db_string() {
    let (db, _, _) = fixture();
    insta::assert_snapshot!(
        db.vocab().to_db_string(),
        @"((VocabList) (vl_size: 2) (vl_contents: (((MatrixVocabElement: 1 trial) (system: false) (type: INTEGER) (varLen: false) (fArgList: ((IntFormalArg 2 <val> false -9223372036854775808 9223372036854775807))), ((PredicateVocabElement: 8 hit) (system: false) (varLen: false) (fArgList: ((IntFormalArg 9 <a> false -9223372036854775808 9223372036854775807))))))"
    );
}

#[test]
fn detached_predicate_db_string() {
    let (db, pve_id, _) = fixture();
    let pred = Predicate::with_args(db.vocab(), pve_id, vec![DataValue::int(3)]).expect("pred");
    insta::assert_snapshot!(
        pred.to_db_string(),
        @"(predicate (id 0) (predID 8) (predName hit) (varLen false) (argList ((IntDataValue (id 0) (itsFargID 9) (itsFargType INTEGER) (itsCellID 0) (itsValue 3) (subRange false) (minVal 0) (maxVal 0))))))"
    );
    assert_eq!(pred.to_string(), "hit(3)");
}

#[test]
fn index_tracks_every_element() {
    let (db, _, cell_id) = fixture();
    assert_eq!(db.index().len(), 11);
    assert_eq!(db.index().next_id(), DbId::new(12));
    let stored = db.cell(cell_id).expect("cell").val().arg(0).expect("arg").id();
    assert_eq!(stored, DbId::new(11));
}
