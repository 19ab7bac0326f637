//! Column predicates: instances of a matrix vocabulary element's column
//! predicate argument list (`<ord>`, `<onset>`, `<offset>`, then one copy of
//! each matrix argument).

use std::fmt;

use annodb_model::{DbId, Result, SystemError};

use crate::args::{
    args_logically_equal, args_to_db_string, args_to_string, empty_args, remap_args,
    salvage_args, validate_arg, validate_args,
};
use crate::value::DataValue;
use crate::vocab::{VeChange, VeKind, VocabElement};
use crate::vocab_list::VocabList;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColPred {
    id: DbId,
    cell_id: DbId,
    mve_id: DbId,
    name: String,
    var_len: bool,
    args: Option<Vec<DataValue>>,
}

impl ColPred {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(vocab: &VocabList, mve_id: DbId) -> Result<Self> {
        if !mve_id.is_valid() {
            return Ok(Self::empty());
        }
        let mve = vocab.require_mve(mve_id, "ColPred::new()")?;
        Ok(Self {
            mve_id,
            name: mve.name().to_string(),
            var_len: mve.var_len(),
            args: Some(empty_args(mve.cp_fargs(), vocab.tps())?),
            ..Self::default()
        })
    }

    pub fn with_args(vocab: &VocabList, mve_id: DbId, mut args: Vec<DataValue>) -> Result<Self> {
        const CONTEXT: &str = "ColPred::with_args()";
        let mve = vocab.require_mve(mve_id, CONTEXT)?;
        validate_args(CONTEXT, mve.cp_fargs(), &mut args, true)?;
        Ok(Self {
            mve_id,
            name: mve.name().to_string(),
            var_len: mve.var_len(),
            args: Some(args),
            ..Self::default()
        })
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: DbId) {
        self.id = id;
    }

    pub fn cell_id(&self) -> DbId {
        self.cell_id
    }

    pub(crate) fn set_cell_id(&mut self, cell_id: DbId) {
        self.cell_id = cell_id;
    }

    pub fn mve_id(&self) -> DbId {
        self.mve_id
    }

    /// Re-targets the column predicate at another matrix element. `salvage`
    /// works as in [`Predicate::set_pve_id`](crate::Predicate::set_pve_id).
    pub fn set_mve_id(&mut self, vocab: &VocabList, mve_id: DbId, salvage: bool) -> Result<()> {
        let mut fresh = Self::new(vocab, mve_id)?;
        if salvage && mve_id.is_valid() {
            let mve = vocab.require_mve(mve_id, "ColPred::set_mve_id()")?;
            fresh.args = Some(salvage_args(mve.cp_fargs(), self.args(), vocab.tps())?);
        }
        *self = Self {
            id: self.id,
            cell_id: self.cell_id,
            ..fresh
        };
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn var_len(&self) -> bool {
        self.var_len
    }

    pub fn args(&self) -> &[DataValue] {
        self.args.as_deref().unwrap_or_default()
    }

    pub(crate) fn args_mut(&mut self) -> &mut [DataValue] {
        self.args.as_deref_mut().unwrap_or_default()
    }

    pub fn num_args(&self) -> usize {
        self.args().len()
    }

    pub fn arg(&self, n: usize) -> Result<&DataValue> {
        let args = self.args();
        args.get(n).ok_or(SystemError::OutOfBounds {
            context: "ColPred::arg()",
            index: n,
            len: args.len(),
        })
    }

    pub fn replace_arg(&mut self, vocab: &VocabList, n: usize, mut value: DataValue) -> Result<()> {
        const CONTEXT: &str = "ColPred::replace_arg()";
        let mve = vocab.require_mve(self.mve_id, CONTEXT)?;
        let len = self.num_args();
        let farg = mve.cp_fargs().get(n).ok_or(SystemError::OutOfBounds {
            context: CONTEXT,
            index: n,
            len: mve.cp_fargs().len(),
        })?;
        let slot = self.args_mut().get_mut(n).ok_or(SystemError::OutOfBounds {
            context: CONTEXT,
            index: n,
            len,
        })?;
        validate_arg(CONTEXT, farg, &mut value, true)?;
        *slot = value;
        Ok(())
    }

    pub(crate) fn update_for_def_change(
        &mut self,
        vocab: &VocabList,
        change: &VeChange,
    ) -> Result<()> {
        const CONTEXT: &str = "ColPred::update_for_def_change()";
        if change.kind == VeKind::Matrix && change.ve_id == self.mve_id {
            if change.name_changed {
                if self.name != change.old_name && self.name != change.new_name {
                    return Err(SystemError::invariant(CONTEXT, "unexpected old matrix name"));
                }
                self.name.clone_from(&change.new_name);
            }
            if change.var_len_changed {
                self.var_len = change.new_var_len;
            }
            let cp_fargs = change
                .cp_fargs
                .as_ref()
                .ok_or_else(|| SystemError::invariant(CONTEXT, "matrix change without column predicate remap"))?;
            if cp_fargs.list_changed {
                let args = self.args.take().unwrap_or_default();
                self.args = Some(remap_args(CONTEXT, args, cp_fargs, vocab.tps())?);
            }
        }
        for arg in self.args_mut() {
            arg.update_for_def_change(vocab, change)?;
        }
        Ok(())
    }

    pub(crate) fn update_for_deletion(&mut self, vocab: &VocabList, ve_id: DbId) -> Result<()> {
        if self.mve_id == ve_id {
            *self = Self {
                id: self.id,
                cell_id: self.cell_id,
                ..Self::empty()
            };
            return Ok(());
        }
        for arg in self.args_mut() {
            arg.update_for_deletion(vocab, ve_id)?;
        }
        Ok(())
    }

    pub fn logically_equal(&self, other: &ColPred) -> bool {
        self.mve_id == other.mve_id
            && self.name == other.name
            && self.var_len == other.var_len
            && args_logically_equal(self.args(), other.args())
    }

    pub fn clear_ids(&mut self) {
        self.id = DbId::INVALID;
        self.cell_id = DbId::INVALID;
        for arg in self.args_mut() {
            arg.clear_ids();
        }
    }

    pub fn detached_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.clear_ids();
        copy
    }

    pub fn to_db_string(&self) -> String {
        format!(
            "(colPred (id {}) (mveID {}) (mveName {}) (varLen {}) {}))",
            self.id,
            self.mve_id,
            self.name,
            self.var_len,
            args_to_db_string(self.args.as_deref())
        )
    }
}

impl fmt::Display for ColPred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mve_id.is_valid() {
            return f.write_str("()");
        }
        write!(f, "{}{}", self.name, args_to_string(self.args()))
    }
}
