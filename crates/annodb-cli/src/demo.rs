//! The `demo` workflow: build a small database, edit its vocabulary and
//! capture how the stored cells follow.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use annodb_core::{
    DataCell, DataValue, Database, DatabaseOptions, DbId, FormalArgument, Matrix, MatrixType,
    MatrixVocabElement, Predicate, PredicateVocabElement, TimeStamp, VocabElement,
};
use tracing::info;

use crate::types::{ColumnSummary, DemoRun};

/// Subject, score and onset second of each `trial` row.
const TRIALS: &[(&str, i64, i64)] = &[("s01", 88, 0), ("s02", 42, 2), ("s03", 97, 4)];

/// Who and duration of each `looks` event. The second duration exceeds the
/// declared range and lands on its upper bound.
const LOOKS: &[(&str, f64)] = &[("s01", 2.5), ("s02", 700.0)];

struct Ids {
    looks: DbId,
    trial_col: DbId,
    events_col: DbId,
}

/// Reads database options from a JSON file. Missing keys take their
/// defaults; no file means all defaults.
pub fn load_options(path: Option<&Path>) -> Result<DatabaseOptions> {
    let Some(path) = path else {
        return Ok(DatabaseOptions::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let options: DatabaseOptions = serde_json::from_str(&text)
        .with_context(|| format!("parse config {}", path.display()))?;
    options
        .validate()
        .with_context(|| format!("invalid options in {}", path.display()))?;
    Ok(options)
}

pub fn run_demo(options: DatabaseOptions) -> Result<DemoRun> {
    let mut db = Database::new(options).context("invalid database options")?;
    let ids = build_schema(&mut db)?;
    populate(&mut db, &ids)?;
    let before = summarize(&db)?;
    let edits = apply_edits(&mut db, &ids)?;
    let after = summarize(&db)?;
    info!(edits = edits.len(), "demo complete");
    Ok(DemoRun {
        db,
        before,
        after,
        edits,
    })
}

fn build_schema(db: &mut Database) -> Result<Ids> {
    let looks = PredicateVocabElement::with_fargs(
        "looks",
        vec![
            FormalArgument::nominal("<who>")?,
            FormalArgument::float_ranged("<dur>", 0.0, 600.0)?,
        ],
    )?;
    let looks = db.add_predicate_ve(looks)?;

    let trial = MatrixVocabElement::with_fargs(
        "trial",
        MatrixType::Matrix,
        vec![
            FormalArgument::nominal("<subject>")?,
            FormalArgument::integer_ranged("<score>", 0, 100)?,
            FormalArgument::time_stamp("<at>")?,
        ],
    )?;
    let trial_col = db.add_column(trial)?;

    let events = MatrixVocabElement::with_fargs(
        "events",
        MatrixType::Predicate,
        vec![FormalArgument::predicate("<event>")?],
    )?;
    let events_col = db.add_column(events)?;

    Ok(Ids {
        looks,
        trial_col,
        events_col,
    })
}

fn populate(db: &mut Database, ids: &Ids) -> Result<()> {
    let tps = i64::from(db.tps());
    for &(subject, score, second) in TRIALS {
        let at = TimeStamp::new(db.tps(), second * tps)?;
        let args = vec![
            DataValue::nominal(Some(subject))?,
            DataValue::int(score),
            DataValue::time_stamp(at),
        ];
        append(db, ids.trial_col, second * tps, args)?;
    }
    for (n, &(who, dur)) in (0i64..).zip(LOOKS) {
        let event = Predicate::with_args(
            db.vocab(),
            ids.looks,
            vec![DataValue::nominal(Some(who))?, DataValue::float(dur)],
        )?;
        append(db, ids.events_col, n * tps, vec![DataValue::predicate(event)])?;
    }
    Ok(())
}

/// Appends a one-second cell starting at `onset` ticks.
fn append(db: &mut Database, col_id: DbId, onset: i64, args: Vec<DataValue>) -> Result<DbId> {
    let tps = db.tps();
    let mve_id = db
        .column(col_id)
        .with_context(|| format!("no column {col_id}"))?
        .mve_id();
    let val = Matrix::with_args(db.vocab(), mve_id, args)?;
    let cell = DataCell::with_value(
        db.vocab(),
        col_id,
        TimeStamp::new(tps, onset)?,
        TimeStamp::new(tps, onset + i64::from(tps))?,
        val,
    )?;
    Ok(db.append_cell(cell)?)
}

fn apply_edits(db: &mut Database, ids: &Ids) -> Result<Vec<String>> {
    let mut edits = Vec::new();

    let mut looks = db
        .vocab()
        .pve(ids.looks)
        .context("looks predicate missing")?
        .clone();
    looks.append_formal_arg(FormalArgument::float("<confidence>")?)?;
    db.replace_vocab_element(looks)?;
    edits.push("looks: appended <confidence>".to_string());

    let trial_id = db
        .column(ids.trial_col)
        .context("trial column missing")?
        .mve_id();
    let mut trial = db
        .vocab()
        .mve(trial_id)
        .context("trial matrix missing")?
        .clone();
    let mut score = trial.farg(1)?.clone();
    score.set_int_range(0, 50)?;
    trial.replace_formal_arg(score, 1)?;
    db.replace_vocab_element(trial.clone())?;
    edits.push("trial: narrowed <score> to [0, 50]".to_string());

    trial.set_name("trials")?;
    db.replace_vocab_element(trial)?;
    edits.push("trial: renamed to trials".to_string());

    Ok(edits)
}

pub fn summarize(db: &Database) -> Result<Vec<ColumnSummary>> {
    db.columns()
        .map(|column| -> Result<ColumnSummary> {
            let mve = db
                .vocab()
                .mve(column.mve_id())
                .with_context(|| format!("column {} has no matrix element", column.name()))?;
            Ok(ColumnSummary {
                name: column.name().to_string(),
                mtype: column.mve_type(),
                num_fargs: mve.num_fargs(),
                num_listeners: db.vocab().listeners(mve.id())?.internal().len(),
                cells: column.cells().iter().map(ToString::to_string).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_reach_the_cells() {
        let run = run_demo(DatabaseOptions::default()).unwrap();
        assert_eq!(run.edits.len(), 3);
        assert_eq!(run.before.len(), 2);

        let trial = run.after.iter().find(|c| c.name == "trials").unwrap();
        assert_eq!(trial.mtype, MatrixType::Matrix);
        assert_eq!(trial.cells.len(), 3);
        assert_eq!(trial.num_listeners, 1);
        assert!(trial.cells[0].contains("s01, 50,"));
        assert!(trial.cells[1].contains("s02, 42,"));

        let events = run.after.iter().find(|c| c.name == "events").unwrap();
        assert!(events.cells[0].contains("looks(s01, 2.500000, 0.000000)"));
        assert!(events.cells[1].contains("looks(s02, 600.000000, 0.000000)"));
        let before = run.before.iter().find(|c| c.name == "events").unwrap();
        assert!(before.cells[0].contains("looks(s01, 2.500000)"));
    }

    #[test]
    fn tick_rate_comes_from_the_options() {
        let run = run_demo(DatabaseOptions::default().with_tps(25)).unwrap();
        assert_eq!(run.db.tps(), 25);
        assert!(run.db.to_db_string().contains("(tps 25)"));
        assert!(run_demo(DatabaseOptions::default().with_tps(0)).is_err());
    }
}
