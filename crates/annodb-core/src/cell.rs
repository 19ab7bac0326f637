//! Data cells: one row of a data column.

use std::fmt;

use annodb_model::{Cell, DbId, MatrixType, Result, SystemError, TimeStamp};

use crate::matrix::Matrix;
use crate::vocab_list::VocabList;

#[derive(Debug, Clone, PartialEq)]
pub struct DataCell {
    cell: Cell,
    mve_id: DbId,
    mve_type: MatrixType,
    onset: TimeStamp,
    offset: TimeStamp,
    val: Matrix,
}

impl DataCell {
    /// An empty cell for the column `col_id` of matrix `mve_id`. Onset and
    /// offset start at zero in the database tick rate.
    pub fn new(vocab: &VocabList, col_id: DbId, mve_id: DbId) -> Result<Self> {
        let mve = vocab.require_mve(mve_id, "DataCell::new()")?;
        Ok(Self {
            cell: Cell::new(col_id),
            mve_id,
            mve_type: mve.mtype(),
            onset: TimeStamp::zero(vocab.tps())?,
            offset: TimeStamp::zero(vocab.tps())?,
            val: Matrix::new(vocab, mve_id)?,
        })
    }

    pub fn with_value(
        vocab: &VocabList,
        col_id: DbId,
        onset: TimeStamp,
        offset: TimeStamp,
        val: Matrix,
    ) -> Result<Self> {
        let mut cell = Self::new(vocab, col_id, val.mve_id())?;
        cell.set_onset(onset)?;
        cell.set_offset(offset)?;
        cell.val = val;
        Ok(cell)
    }

    pub fn id(&self) -> DbId {
        self.cell.id()
    }

    pub(crate) fn set_id(&mut self, id: DbId) {
        self.cell.set_id(id);
    }

    pub fn col_id(&self) -> DbId {
        self.cell.col_id()
    }

    pub fn mve_id(&self) -> DbId {
        self.mve_id
    }

    pub fn mve_type(&self) -> MatrixType {
        self.mve_type
    }

    pub fn ord(&self) -> i32 {
        self.cell.ord()
    }

    pub(crate) fn set_ord(&mut self, ord: i32) -> Result<()> {
        self.cell.set_ord(ord)
    }

    pub fn comment(&self) -> Option<&str> {
        self.cell.comment()
    }

    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.cell.set_comment(comment);
    }

    pub fn selected(&self) -> bool {
        self.cell.selected()
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.cell.set_selected(selected);
    }

    pub fn onset(&self) -> TimeStamp {
        self.onset
    }

    /// Stores `onset` converted to the cell's tick rate.
    pub fn set_onset(&mut self, onset: TimeStamp) -> Result<()> {
        self.onset = onset.at_tps(self.onset.tps())?;
        Ok(())
    }

    pub fn offset(&self) -> TimeStamp {
        self.offset
    }

    pub fn set_offset(&mut self, offset: TimeStamp) -> Result<()> {
        self.offset = offset.at_tps(self.offset.tps())?;
        Ok(())
    }

    pub fn val(&self) -> &Matrix {
        &self.val
    }

    pub(crate) fn val_mut(&mut self) -> &mut Matrix {
        &mut self.val
    }

    /// Replaces the cell value. The matrix must instantiate the cell's
    /// vocabulary element.
    pub fn set_val(&mut self, val: Matrix) -> Result<()> {
        if val.mve_id() != self.mve_id {
            return Err(SystemError::invariant(
                "DataCell::set_val()",
                format!("matrix of {} in a cell of {}", val.mve_id(), self.mve_id),
            ));
        }
        self.val = val;
        Ok(())
    }

    pub fn to_db_string(&self) -> String {
        format!(
            "(DataCell (id {}) (itsColID {}) (itsMveID {}) (itsMveType {}) (ord {}) \
             (onset {}) (offset {}) (val {}))",
            self.id(),
            self.col_id(),
            self.mve_id,
            self.mve_type,
            self.ord(),
            self.onset.to_db_string(),
            self.offset.to_db_string(),
            self.val.to_db_string()
        )
    }
}

impl fmt::Display for DataCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.ord(),
            self.onset,
            self.offset,
            self.val
        )
    }
}
