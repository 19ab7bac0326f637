//! The value of a data cell: one data value per formal argument of the
//! column's matrix vocabulary element.

use std::fmt;

use annodb_model::{DbId, MatrixType, Result, SystemError};

use crate::args::{
    args_logically_equal, args_to_db_string, args_to_string, empty_args, remap_args,
    validate_arg, validate_args,
};
use crate::value::DataValue;
use crate::vocab::{VeChange, VeKind, VocabElement};
use crate::vocab_list::VocabList;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    mve_id: DbId,
    var_len: bool,
    args: Vec<DataValue>,
}

impl Matrix {
    pub fn new(vocab: &VocabList, mve_id: DbId) -> Result<Self> {
        let mve = vocab.require_mve(mve_id, "Matrix::new()")?;
        Ok(Self {
            mve_id,
            var_len: mve.var_len(),
            args: empty_args(mve.fargs(), vocab.tps())?,
        })
    }

    /// Text arguments are only legal in a text matrix.
    pub fn with_args(vocab: &VocabList, mve_id: DbId, mut args: Vec<DataValue>) -> Result<Self> {
        const CONTEXT: &str = "Matrix::with_args()";
        let mve = vocab.require_mve(mve_id, CONTEXT)?;
        validate_args(CONTEXT, mve.fargs(), &mut args, mve.mtype() == MatrixType::Text)?;
        Ok(Self {
            mve_id,
            var_len: mve.var_len(),
            args,
        })
    }

    pub fn mve_id(&self) -> DbId {
        self.mve_id
    }

    pub fn var_len(&self) -> bool {
        self.var_len
    }

    pub fn args(&self) -> &[DataValue] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [DataValue] {
        &mut self.args
    }

    pub fn num_args(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, n: usize) -> Result<&DataValue> {
        self.args.get(n).ok_or(SystemError::OutOfBounds {
            context: "Matrix::arg()",
            index: n,
            len: self.args.len(),
        })
    }

    pub fn replace_arg(&mut self, vocab: &VocabList, n: usize, mut value: DataValue) -> Result<()> {
        const CONTEXT: &str = "Matrix::replace_arg()";
        let mve = vocab.require_mve(self.mve_id, CONTEXT)?;
        let farg = mve.farg(n)?;
        let len = self.args.len();
        let slot = self.args.get_mut(n).ok_or(SystemError::OutOfBounds {
            context: CONTEXT,
            index: n,
            len,
        })?;
        validate_arg(CONTEXT, farg, &mut value, mve.mtype() == MatrixType::Text)?;
        *slot = value;
        Ok(())
    }

    pub(crate) fn update_for_def_change(
        &mut self,
        vocab: &VocabList,
        change: &VeChange,
    ) -> Result<()> {
        if change.kind == VeKind::Matrix && change.ve_id == self.mve_id {
            if change.var_len_changed {
                self.var_len = change.new_var_len;
            }
            if change.fargs.list_changed {
                let args = std::mem::take(&mut self.args);
                self.args = remap_args(
                    "Matrix::update_for_def_change()",
                    args,
                    &change.fargs,
                    vocab.tps(),
                )?;
            }
        }
        for arg in &mut self.args {
            arg.update_for_def_change(vocab, change)?;
        }
        Ok(())
    }

    pub(crate) fn update_for_deletion(&mut self, vocab: &VocabList, ve_id: DbId) -> Result<()> {
        for arg in &mut self.args {
            arg.update_for_deletion(vocab, ve_id)?;
        }
        Ok(())
    }

    pub fn logically_equal(&self, other: &Matrix) -> bool {
        self.mve_id == other.mve_id
            && self.var_len == other.var_len
            && args_logically_equal(&self.args, &other.args)
    }

    pub fn clear_ids(&mut self) {
        for arg in &mut self.args {
            arg.clear_ids();
        }
    }

    pub fn to_db_string(&self) -> String {
        format!(
            "(Matrix (mveID {}) (varLen {}) {}))",
            self.mve_id,
            self.var_len,
            args_to_db_string(Some(&self.args))
        )
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&args_to_string(&self.args))
    }
}
