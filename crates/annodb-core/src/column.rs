//! Data columns.

use annodb_model::{DbId, MatrixType, Result, SystemError};

use crate::cell::DataCell;

/// A column of cells sharing one matrix vocabulary element. The column and
/// the element carry the same name; a cell's `ord` is its 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    id: DbId,
    name: String,
    mve_id: DbId,
    mve_type: MatrixType,
    var_len: bool,
    hidden: bool,
    read_only: bool,
    cells: Vec<DataCell>,
}

impl DataColumn {
    pub(crate) fn new(id: DbId, name: &str, mve_id: DbId, mve_type: MatrixType, var_len: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            mve_id,
            mve_type,
            var_len,
            hidden: false,
            read_only: false,
            cells: Vec::new(),
        }
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn mve_id(&self) -> DbId {
        self.mve_id
    }

    pub fn mve_type(&self) -> MatrixType {
        self.mve_type
    }

    pub fn var_len(&self) -> bool {
        self.var_len
    }

    pub(crate) fn set_var_len(&mut self, var_len: bool) {
        self.var_len = var_len;
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn cells(&self) -> &[DataCell] {
        &self.cells
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cell by 1-based ord.
    pub fn cell(&self, ord: usize) -> Result<&DataCell> {
        ord.checked_sub(1)
            .and_then(|i| self.cells.get(i))
            .ok_or(SystemError::OutOfBounds {
                context: "DataColumn::cell()",
                index: ord,
                len: self.cells.len(),
            })
    }

    pub fn cell_by_id(&self, id: DbId) -> Option<&DataCell> {
        self.cells.iter().find(|cell| cell.id() == id)
    }

    pub(crate) fn cell_by_id_mut(&mut self, id: DbId) -> Option<&mut DataCell> {
        self.cells.iter_mut().find(|cell| cell.id() == id)
    }

    /// Inserts at 1-based `ord` and renumbers the cells after it.
    pub(crate) fn insert_cell(&mut self, cell: DataCell, ord: usize) -> Result<()> {
        if ord == 0 || ord > self.cells.len() + 1 {
            return Err(SystemError::OutOfBounds {
                context: "DataColumn::insert_cell()",
                index: ord,
                len: self.cells.len(),
            });
        }
        self.cells.insert(ord - 1, cell);
        self.renumber(ord - 1)
    }

    pub(crate) fn remove_cell(&mut self, id: DbId) -> Result<DataCell> {
        let pos = self
            .cells
            .iter()
            .position(|cell| cell.id() == id)
            .ok_or(SystemError::NotFound {
                context: "DataColumn::remove_cell()",
                id,
            })?;
        let cell = self.cells.remove(pos);
        self.renumber(pos)?;
        Ok(cell)
    }

    fn renumber(&mut self, from: usize) -> Result<()> {
        for (i, cell) in self.cells.iter_mut().enumerate().skip(from) {
            let ord = i32::try_from(i + 1).map_err(|_| {
                SystemError::invariant("DataColumn::renumber()", "too many cells")
            })?;
            cell.set_ord(ord)?;
        }
        Ok(())
    }

    pub fn to_db_string(&self) -> String {
        let cells: Vec<String> = self.cells.iter().map(DataCell::to_db_string).collect();
        format!(
            "(DataColumn (name {}) (id {}) (hidden {}) (readOnly {}) (itsMveID {}) \
             (itsMveType {}) (varLen {}) (numCells {}) (itsCells ({}))))",
            self.name,
            self.id,
            self.hidden,
            self.read_only,
            self.mve_id,
            self.mve_type,
            self.var_len,
            self.cells.len(),
            cells.join(", ")
        )
    }
}
