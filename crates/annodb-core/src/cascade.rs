//! Identity bookkeeping for cell values.
//!
//! Whenever a cell value changes, whether through an edit or through a
//! vocabulary cascade, the ids of everything it contains are reconciled with
//! the index: new data values and predicates get ids, vanished ones release
//! theirs, and predicates re-register with the vocabulary elements they
//! instantiate.

use std::collections::{BTreeMap, BTreeSet};

use annodb_model::{DbId, Result, SystemError};
use tracing::debug;

use crate::index::{DbIndex, ElementKind};
use crate::matrix::Matrix;
use crate::value::{DataValue, Value};
use crate::vocab_list::VocabList;

/// Ids held by one cell value.
#[derive(Debug, Default)]
pub(crate) struct LiveIds {
    values: BTreeSet<DbId>,
    /// Predicate or column-predicate id to the vocabulary element it
    /// instantiates.
    preds: BTreeMap<DbId, DbId>,
}

impl LiveIds {
    pub(crate) fn of(matrix: &Matrix) -> Self {
        let mut live = Self::default();
        live.collect(matrix.args());
        live
    }

    fn collect(&mut self, args: &[DataValue]) {
        for dv in args {
            if dv.id().is_valid() {
                self.values.insert(dv.id());
            }
            match dv.value() {
                Value::Predicate(pred) if pred.pve_id().is_valid() => {
                    if pred.id().is_valid() {
                        self.preds.insert(pred.id(), pred.pve_id());
                    }
                    self.collect(pred.args());
                }
                Value::ColPred(cp) if cp.mve_id().is_valid() => {
                    if cp.id().is_valid() {
                        self.preds.insert(cp.id(), cp.mve_id());
                    }
                    self.collect(cp.args());
                }
                _ => {}
            }
        }
    }
}

/// Assigns ids to every data value and predicate in `matrix` that lacks one
/// and stamps the cell and predicate back-references.
///
/// Ids already present must be recorded for `cell_id` with the matching
/// kind and may appear only once in the value. They are checked before any
/// new id is allocated, so a rejected value leaves the index untouched.
pub(crate) fn assign_ids(index: &mut DbIndex, matrix: &mut Matrix, cell_id: DbId) -> Result<()> {
    let mut seen = BTreeSet::new();
    check_arg_ids(index, &mut seen, matrix.args(), cell_id)?;
    assign_arg_ids(index, matrix.args_mut(), cell_id, DbId::INVALID)
}

fn check_arg_ids(
    index: &DbIndex,
    seen: &mut BTreeSet<DbId>,
    args: &[DataValue],
    cell_id: DbId,
) -> Result<()> {
    for dv in args {
        check_owner(index, seen, dv.id(), ElementKind::DataValue { cell_id })?;
        match dv.value() {
            Value::Predicate(pred) if pred.pve_id().is_valid() => {
                check_owner(index, seen, pred.id(), ElementKind::Predicate { cell_id })?;
                check_arg_ids(index, seen, pred.args(), cell_id)?;
            }
            Value::ColPred(cp) if cp.mve_id().is_valid() => {
                check_owner(index, seen, cp.id(), ElementKind::ColPred { cell_id })?;
                check_arg_ids(index, seen, cp.args(), cell_id)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_owner(
    index: &DbIndex,
    seen: &mut BTreeSet<DbId>,
    id: DbId,
    expected: ElementKind,
) -> Result<()> {
    const CONTEXT: &str = "assign_ids()";
    if !id.is_valid() {
        return Ok(());
    }
    if !seen.insert(id) {
        return Err(SystemError::invariant(
            CONTEXT,
            format!("id {id} appears twice in one cell value"),
        ));
    }
    let kind = index.require(id, CONTEXT)?;
    if kind != expected {
        return Err(SystemError::invariant(
            CONTEXT,
            format!("id {id} is recorded as {kind}, expected {expected}"),
        ));
    }
    Ok(())
}

fn assign_arg_ids(
    index: &mut DbIndex,
    args: &mut [DataValue],
    cell_id: DbId,
    pred_id: DbId,
) -> Result<()> {
    for dv in args {
        if !dv.id().is_valid() {
            dv.set_id(index.add_element(ElementKind::DataValue { cell_id })?);
        }
        dv.set_cell_id(cell_id);
        dv.set_pred_id(pred_id);
        match dv.value_mut() {
            Value::Predicate(pred) if pred.pve_id().is_valid() => {
                if !pred.id().is_valid() {
                    pred.set_id(index.add_element(ElementKind::Predicate { cell_id })?);
                }
                pred.set_cell_id(cell_id);
                let id = pred.id();
                assign_arg_ids(index, pred.args_mut(), cell_id, id)?;
            }
            Value::ColPred(cp) if cp.mve_id().is_valid() => {
                if !cp.id().is_valid() {
                    cp.set_id(index.add_element(ElementKind::ColPred { cell_id })?);
                }
                cp.set_cell_id(cell_id);
                let id = cp.id();
                assign_arg_ids(index, cp.args_mut(), cell_id, id)?;
            }
            // An empty predicate has no identity of its own.
            Value::Predicate(pred) => {
                pred.set_id(DbId::INVALID);
                pred.set_cell_id(DbId::INVALID);
            }
            Value::ColPred(cp) => {
                cp.set_id(DbId::INVALID);
                cp.set_cell_id(DbId::INVALID);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Releases the ids that `old` held and `new` no longer does, and moves
/// predicate registrations to match `new`. Registrations with `deleted_ve`
/// are dropped silently since that element's registry is going away.
pub(crate) fn reconcile(
    index: &mut DbIndex,
    vocab: &mut VocabList,
    old: &LiveIds,
    new: &LiveIds,
    deleted_ve: Option<DbId>,
) -> Result<()> {
    for id in old.values.difference(&new.values) {
        index.remove_element(*id)?;
    }
    for (pred_id, ve_id) in &old.preds {
        let kept = new.preds.get(pred_id);
        if kept == Some(ve_id) {
            continue;
        }
        if Some(*ve_id) != deleted_ve && vocab.in_vocab_list(*ve_id) {
            vocab.deregister_internal_listener(*ve_id, *pred_id)?;
        }
        if kept.is_none() {
            index.remove_element(*pred_id)?;
        }
    }
    for (pred_id, ve_id) in &new.preds {
        if old.preds.get(pred_id) != Some(ve_id) {
            vocab.register_internal_listener(*ve_id, *pred_id)?;
        }
    }
    debug!(
        released = old.values.difference(&new.values).count(),
        added = new.values.difference(&old.values).count(),
        "cell ids reconciled"
    );
    Ok(())
}
