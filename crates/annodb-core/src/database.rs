//! The database: index, vocabulary list and data columns, plus the driver
//! for every operation that has to cascade through all three.

use std::collections::BTreeMap;
use std::rc::Rc;

use annodb_model::{DatabaseOptions, DbId, Result, SystemError};
use tracing::{debug, error, info};

use crate::cascade::{LiveIds, assign_ids, reconcile};
use crate::cell::DataCell;
use crate::column::DataColumn;
use crate::index::{DbIndex, ElementKind};
use crate::vocab::{
    ExternalVocabElementListener, MatrixVocabElement, PredicateVocabElement, VeChange,
    VocabElement, VocabEntry,
};
use crate::vocab_list::VocabList;

#[derive(Debug)]
pub struct Database {
    options: DatabaseOptions,
    index: DbIndex,
    vocab: VocabList,
    columns: BTreeMap<DbId, DataColumn>,
}

impl Database {
    pub fn new(options: DatabaseOptions) -> Result<Self> {
        options.validate()?;
        info!(name = %options.name, tps = options.tps, "database created");
        Ok(Self {
            vocab: VocabList::new(options.tps),
            options,
            index: DbIndex::new(),
            columns: BTreeMap::new(),
        })
    }

    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    pub fn tps(&self) -> u32 {
        self.options.tps
    }

    pub fn index(&self) -> &DbIndex {
        &self.index
    }

    pub fn vocab(&self) -> &VocabList {
        &self.vocab
    }

    pub fn columns(&self) -> impl Iterator<Item = &DataColumn> {
        self.columns.values()
    }

    pub fn column(&self, col_id: DbId) -> Option<&DataColumn> {
        self.columns.get(&col_id)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&DataColumn> {
        self.columns.values().find(|col| col.name() == name)
    }

    pub fn cell(&self, cell_id: DbId) -> Option<&DataCell> {
        match self.index.get_element(cell_id)? {
            ElementKind::DataCell { col_id } => self.columns.get(col_id)?.cell_by_id(cell_id),
            _ => None,
        }
    }

    pub fn set_column_hidden(&mut self, col_id: DbId, hidden: bool) -> Result<()> {
        self.column_mut(col_id, "Database::set_column_hidden()")?
            .set_hidden(hidden);
        Ok(())
    }

    pub fn set_column_read_only(&mut self, col_id: DbId, read_only: bool) -> Result<()> {
        self.column_mut(col_id, "Database::set_column_read_only()")?
            .set_read_only(read_only);
        Ok(())
    }

    fn column_mut(&mut self, col_id: DbId, context: &'static str) -> Result<&mut DataColumn> {
        self.columns
            .get_mut(&col_id)
            .ok_or(SystemError::NotFound { context, id: col_id })
    }

    pub fn add_predicate_ve(&mut self, pve: PredicateVocabElement) -> Result<DbId> {
        self.vocab.add(&mut self.index, pve.into())
    }

    /// Adds a matrix vocabulary element together with its data column and
    /// returns the column id.
    pub fn add_column(&mut self, mve: MatrixVocabElement) -> Result<DbId> {
        let mve_id = self.vocab.add(&mut self.index, mve.into())?;
        let col_id = self.index.add_element(ElementKind::DataColumn)?;
        self.vocab.set_col_id(mve_id, col_id)?;
        self.vocab.register_internal_listener(mve_id, col_id)?;
        let mve = self.vocab.require_mve(mve_id, "Database::add_column()")?;
        let column = DataColumn::new(col_id, mve.name(), mve_id, mve.mtype(), mve.var_len());
        info!(col_id = %col_id, mve_id = %mve_id, name = column.name(), "column added");
        self.columns.insert(col_id, column);
        Ok(col_id)
    }

    pub fn register_external_listener(
        &mut self,
        ve_id: DbId,
        listener: Rc<dyn ExternalVocabElementListener>,
    ) -> Result<()> {
        self.vocab.register_external_listener(ve_id, listener)
    }

    pub fn deregister_external_listener(
        &mut self,
        ve_id: DbId,
        listener: &Rc<dyn ExternalVocabElementListener>,
    ) -> Result<()> {
        self.vocab.deregister_external_listener(ve_id, listener)
    }

    /// Appends `cell` to its column and returns the new cell id.
    pub fn append_cell(&mut self, cell: DataCell) -> Result<DbId> {
        let ord = self
            .columns
            .get(&cell.col_id())
            .map_or(1, |col| col.num_cells() + 1);
        self.insert_cell(cell, ord)
    }

    /// Inserts `cell` at the 1-based position `ord` of its column.
    pub fn insert_cell(&mut self, mut cell: DataCell, ord: usize) -> Result<DbId> {
        const CONTEXT: &str = "Database::insert_cell()";
        if cell.id().is_valid() {
            return Err(SystemError::invariant(CONTEXT, "cell already has an id"));
        }
        let col_id = cell.col_id();
        let column = self
            .columns
            .get(&col_id)
            .ok_or(SystemError::NotFound { context: CONTEXT, id: col_id })?;
        if column.mve_id() != cell.mve_id() {
            return Err(SystemError::invariant(
                CONTEXT,
                format!("cell of {} in column of {}", cell.mve_id(), column.mve_id()),
            ));
        }
        if ord == 0 || ord > column.num_cells() + 1 {
            return Err(SystemError::OutOfBounds {
                context: CONTEXT,
                index: ord,
                len: column.num_cells(),
            });
        }

        let cell_id = self.index.add_element(ElementKind::DataCell { col_id })?;
        cell.set_id(cell_id);
        assign_ids(&mut self.index, cell.val_mut(), cell_id)?;
        reconcile(
            &mut self.index,
            &mut self.vocab,
            &LiveIds::default(),
            &LiveIds::of(cell.val()),
            None,
        )?;
        self.column_mut(col_id, CONTEXT)?.insert_cell(cell, ord)?;
        debug!(cell_id = %cell_id, col_id = %col_id, ord, "cell inserted");
        Ok(cell_id)
    }

    /// Replaces the stored cell with the same id. Ord and column are fixed;
    /// everything else is taken from `cell`.
    pub fn replace_cell(&mut self, mut cell: DataCell) -> Result<()> {
        const CONTEXT: &str = "Database::replace_cell()";
        let cell_id = cell.id();
        let old = self
            .cell(cell_id)
            .ok_or(SystemError::NotFound { context: CONTEXT, id: cell_id })?;
        if old.col_id() != cell.col_id() || old.mve_id() != cell.mve_id() {
            return Err(SystemError::invariant(CONTEXT, "cell moved to another column"));
        }
        let old_ids = LiveIds::of(old.val());
        cell.set_ord(old.ord())?;

        assign_ids(&mut self.index, cell.val_mut(), cell_id)?;
        reconcile(
            &mut self.index,
            &mut self.vocab,
            &old_ids,
            &LiveIds::of(cell.val()),
            None,
        )?;
        let slot = self
            .column_mut(cell.col_id(), CONTEXT)?
            .cell_by_id_mut(cell_id)
            .ok_or(SystemError::NotFound { context: CONTEXT, id: cell_id })?;
        *slot = cell;
        debug!(cell_id = %cell_id, "cell replaced");
        Ok(())
    }

    pub fn remove_cell(&mut self, cell_id: DbId) -> Result<DataCell> {
        const CONTEXT: &str = "Database::remove_cell()";
        let ElementKind::DataCell { col_id } = self.index.require(cell_id, CONTEXT)? else {
            return Err(SystemError::invariant(CONTEXT, format!("{cell_id} is not a cell")));
        };
        let cell = self.column_mut(col_id, CONTEXT)?.remove_cell(cell_id)?;
        self.release_cell(&cell, None)?;
        debug!(cell_id = %cell_id, col_id = %col_id, "cell removed");
        Ok(cell)
    }

    fn release_cell(&mut self, cell: &DataCell, deleted_ve: Option<DbId>) -> Result<()> {
        reconcile(
            &mut self.index,
            &mut self.vocab,
            &LiveIds::of(cell.val()),
            &LiveIds::default(),
            deleted_ve,
        )?;
        self.index.remove_element(cell.id())?;
        Ok(())
    }

    /// Swaps in a new definition of an existing vocabulary element and
    /// carries the change through every cell that depends on it.
    pub fn replace_vocab_element(&mut self, entry: impl Into<VocabEntry>) -> Result<()> {
        let entry = entry.into();
        let ve_id = entry.as_ve().id();
        self.replace_ve_inner(entry).inspect_err(|err| {
            error!(ve_id = %ve_id, error = %err, "vocab element replacement aborted");
        })
    }

    fn replace_ve_inner(&mut self, entry: VocabEntry) -> Result<()> {
        const CONTEXT: &str = "Database::replace_vocab_element()";
        let change = self.vocab.replace(&mut self.index, entry)?;
        let ve_id = change.ve_id;

        if let Some(mve) = self.vocab.mve(ve_id) {
            let (col_id, name, var_len) = (mve.col_id(), mve.name().to_string(), mve.var_len());
            let column = self.column_mut(col_id, CONTEXT)?;
            column.set_name(&name);
            column.set_var_len(var_len);
        }

        let listeners = self.vocab.listeners(ve_id)?.internal().to_vec();
        let cells = self.affected_cells(&listeners, None)?;
        debug!(ve_id = %ve_id, cells = cells.len(), "cascading definition change");
        for (col_id, cell_id) in cells {
            self.update_cell(col_id, cell_id, None, |vocab, cell| {
                cell.val_mut().update_for_def_change(vocab, &change)
            })?;
        }

        self.notify_change(&change)
    }

    fn notify_change(&self, change: &VeChange) -> Result<()> {
        self.vocab.listeners(change.ve_id)?.notify_change(change);
        Ok(())
    }

    /// Deletes a vocabulary element. Values that instantiate it are reset;
    /// deleting a matrix also deletes its column and all of its cells.
    pub fn remove_vocab_element(&mut self, ve_id: DbId) -> Result<()> {
        self.remove_ve_inner(ve_id).inspect_err(|err| {
            error!(ve_id = %ve_id, error = %err, "vocab element deletion aborted");
        })
    }

    fn remove_ve_inner(&mut self, ve_id: DbId) -> Result<()> {
        const CONTEXT: &str = "Database::remove_vocab_element()";
        let entry = self
            .vocab
            .get(ve_id.require_valid(CONTEXT)?)
            .ok_or(SystemError::NotFound { context: CONTEXT, id: ve_id })?;
        if entry.as_ve().system() {
            return Err(SystemError::SystemElement { context: CONTEXT });
        }
        let own_col = entry.as_matrix().map(MatrixVocabElement::col_id);

        let listeners = self.vocab.listeners(ve_id)?.internal().to_vec();
        let cells = self.affected_cells(&listeners, own_col)?;
        debug!(ve_id = %ve_id, cells = cells.len(), "cascading deletion");
        for (col_id, cell_id) in cells {
            self.update_cell(col_id, cell_id, Some(ve_id), |vocab, cell| {
                cell.val_mut().update_for_deletion(vocab, ve_id)
            })?;
        }

        if let Some(col_id) = own_col {
            let column = self
                .columns
                .remove(&col_id)
                .ok_or(SystemError::NotFound { context: CONTEXT, id: col_id })?;
            for cell in column.cells() {
                self.release_cell(cell, Some(ve_id))?;
            }
            self.index.remove_element(col_id)?;
            info!(col_id = %col_id, cells = column.num_cells(), "column removed");
        }

        self.vocab.listeners(ve_id)?.notify_deletion();
        self.vocab.remove(&mut self.index, ve_id)?;
        Ok(())
    }

    /// Cells reached by a listener list, each once, in listener order. A
    /// column listener covers every cell in the column; a predicate listener
    /// covers the cell holding it. Cells of `skip_col` are left out.
    fn affected_cells(
        &self,
        listeners: &[DbId],
        skip_col: Option<DbId>,
    ) -> Result<Vec<(DbId, DbId)>> {
        const CONTEXT: &str = "Database::affected_cells()";
        let mut cells = Vec::new();
        let mut push = |col_id: DbId, cell_id: DbId| {
            if Some(col_id) != skip_col && !cells.contains(&(col_id, cell_id)) {
                cells.push((col_id, cell_id));
            }
        };
        for &listener in listeners {
            match self.index.require(listener, CONTEXT)? {
                ElementKind::DataColumn => {
                    let column = self
                        .columns
                        .get(&listener)
                        .ok_or(SystemError::NotFound { context: CONTEXT, id: listener })?;
                    for cell in column.cells() {
                        push(listener, cell.id());
                    }
                }
                ElementKind::Predicate { cell_id } | ElementKind::ColPred { cell_id } => {
                    let ElementKind::DataCell { col_id } = self.index.require(cell_id, CONTEXT)?
                    else {
                        return Err(SystemError::invariant(
                            CONTEXT,
                            format!("predicate {listener} is not held by a cell"),
                        ));
                    };
                    push(col_id, cell_id);
                }
                other => {
                    return Err(SystemError::invariant(
                        CONTEXT,
                        format!("unexpected listener {listener} ({other})"),
                    ));
                }
            }
        }
        Ok(cells)
    }

    /// Applies `update` to a cell and reconciles the ids of its value.
    fn update_cell<F>(
        &mut self,
        col_id: DbId,
        cell_id: DbId,
        deleted_ve: Option<DbId>,
        update: F,
    ) -> Result<()>
    where
        F: FnOnce(&VocabList, &mut DataCell) -> Result<()>,
    {
        const CONTEXT: &str = "Database::update_cell()";
        let cell = self
            .columns
            .get_mut(&col_id)
            .and_then(|col| col.cell_by_id_mut(cell_id))
            .ok_or(SystemError::NotFound { context: CONTEXT, id: cell_id })?;
        let old_ids = LiveIds::of(cell.val());
        update(&self.vocab, cell)?;
        assign_ids(&mut self.index, cell.val_mut(), cell_id)?;
        let new_ids = LiveIds::of(cell.val());
        reconcile(&mut self.index, &mut self.vocab, &old_ids, &new_ids, deleted_ve)?;
        debug!(cell_id = %cell_id, "cell updated by cascade");
        Ok(())
    }

    pub fn columns_to_db_string(&self) -> String {
        let contents: Vec<String> = self.columns.values().map(DataColumn::to_db_string).collect();
        format!(
            "((ColumnList) (cl_size: {}) (cl_contents: ({})))",
            self.columns.len(),
            contents.join(", ")
        )
    }

    pub fn to_db_string(&self) -> String {
        format!(
            "(Database (name {}) (tps {}) {} {})",
            self.options.name,
            self.options.tps,
            self.vocab.to_db_string(),
            self.columns_to_db_string()
        )
    }
}
