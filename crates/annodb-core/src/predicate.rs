//! Predicates: instances of a predicate vocabulary element.

use std::fmt;

use annodb_model::{DbId, Result, SystemError};

use crate::args::{
    args_logically_equal, args_to_db_string, args_to_string, empty_args, remap_args,
    salvage_args, validate_arg, validate_args,
};
use crate::formal_arg::FormalArgument;
use crate::value::DataValue;
use crate::vocab::{VeChange, VeKind, VocabElement};
use crate::vocab_list::VocabList;

/// A predicate value: the name of a predicate vocabulary element plus one
/// data value per formal argument.
///
/// The empty predicate has an invalid `pve_id` and no argument list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    id: DbId,
    cell_id: DbId,
    pve_id: DbId,
    name: String,
    var_len: bool,
    args: Option<Vec<DataValue>>,
}

impl Predicate {
    pub fn empty() -> Self {
        Self::default()
    }

    /// An instance of `pve_id` with every argument set to its empty value.
    /// An invalid id yields the empty predicate.
    pub fn new(vocab: &VocabList, pve_id: DbId) -> Result<Self> {
        if !pve_id.is_valid() {
            return Ok(Self::empty());
        }
        let pve = vocab.require_pve(pve_id, "Predicate::new()")?;
        Ok(Self {
            pve_id,
            name: pve.name().to_string(),
            var_len: pve.var_len(),
            args: Some(empty_args(pve.fargs(), vocab.tps())?),
            ..Self::default()
        })
    }

    /// An instance of `pve_id` with the supplied arguments. Unbound arguments
    /// are bound to the matching formal argument.
    pub fn with_args(vocab: &VocabList, pve_id: DbId, mut args: Vec<DataValue>) -> Result<Self> {
        const CONTEXT: &str = "Predicate::with_args()";
        let pve = vocab.require_pve(pve_id, CONTEXT)?;
        validate_args(CONTEXT, pve.fargs(), &mut args, false)?;
        Ok(Self {
            pve_id,
            name: pve.name().to_string(),
            var_len: pve.var_len(),
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

    pub fn pve_id(&self) -> DbId {
        self.pve_id
    }

    /// Re-targets the predicate at another vocabulary element, keeping its
    /// identity. With `salvage`, argument `i` is converted into the new
    /// element's argument `i` where the payload fits; otherwise, and for
    /// positions past the old list, arguments start empty.
    pub fn set_pve_id(&mut self, vocab: &VocabList, pve_id: DbId, salvage: bool) -> Result<()> {
        let mut fresh = Self::new(vocab, pve_id)?;
        if salvage && pve_id.is_valid() {
            let pve = vocab.require_pve(pve_id, "Predicate::set_pve_id()")?;
            fresh.args = Some(salvage_args(pve.fargs(), self.args(), vocab.tps())?);
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
            context: "Predicate::arg()",
            index: n,
            len: args.len(),
        })
    }

    /// Replaces argument `n`. `value` must be unbound or bound to the
    /// formal argument at that position.
    pub fn replace_arg(&mut self, vocab: &VocabList, n: usize, mut value: DataValue) -> Result<()> {
        const CONTEXT: &str = "Predicate::replace_arg()";
        let pve = vocab.require_pve(self.pve_id, CONTEXT)?;
        let len = self.num_args();
        let farg = pve.farg(n)?;
        let slot = self.args_mut().get_mut(n).ok_or(SystemError::OutOfBounds {
            context: CONTEXT,
            index: n,
            len,
        })?;
        validate_arg(CONTEXT, farg, &mut value, false)?;
        *slot = value;
        Ok(())
    }

    /// Forwards a metadata change of formal argument `n` to its value.
    pub fn update_for_farg_change(
        &mut self,
        n: usize,
        name_changed: bool,
        sub_range_changed: bool,
        range_changed: bool,
        old: &FormalArgument,
        new: &FormalArgument,
    ) -> Result<()> {
        let len = self.num_args();
        let arg = self.args_mut().get_mut(n).ok_or(SystemError::OutOfBounds {
            context: "Predicate::update_for_farg_change()",
            index: n,
            len,
        })?;
        arg.update_for_farg_change(name_changed, sub_range_changed, range_changed, old, new)
    }

    pub(crate) fn update_for_def_change(
        &mut self,
        vocab: &VocabList,
        change: &VeChange,
    ) -> Result<()> {
        const CONTEXT: &str = "Predicate::update_for_def_change()";
        if change.kind == VeKind::Predicate && change.ve_id == self.pve_id {
            if change.name_changed {
                if self.name != change.old_name && self.name != change.new_name {
                    return Err(SystemError::invariant(CONTEXT, "unexpected old predicate name"));
                }
                self.name.clone_from(&change.new_name);
            }
            if change.var_len_changed {
                self.var_len = change.new_var_len;
            }
            if change.fargs.list_changed {
                let args = self.args.take().unwrap_or_default();
                self.args = Some(remap_args(CONTEXT, args, &change.fargs, vocab.tps())?);
            }
        }
        for arg in self.args_mut() {
            arg.update_for_def_change(vocab, change)?;
        }
        Ok(())
    }

    /// Resets the predicate when it instantiates `ve_id`, otherwise forwards
    /// the deletion to its arguments.
    pub(crate) fn update_for_deletion(&mut self, vocab: &VocabList, ve_id: DbId) -> Result<()> {
        if self.pve_id == ve_id {
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

    /// Same vocabulary element and logically equal arguments.
    pub fn logically_equal(&self, other: &Predicate) -> bool {
        self.pve_id == other.pve_id
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

    /// Deep copy without any database identity.
    pub fn detached_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.clear_ids();
        copy
    }

    pub fn to_db_string(&self) -> String {
        format!(
            "(predicate (id {}) (predID {}) (predName {}) (varLen {}) {}))",
            self.id,
            self.pve_id,
            self.name,
            self.var_len,
            args_to_db_string(self.args.as_deref())
        )
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.pve_id.is_valid() {
            return f.write_str("()");
        }
        write!(f, "{}{}", self.name, args_to_string(self.args()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DbIndex;
    use crate::vocab::PredicateVocabElement;

    #[test]
    fn empty_predicate_forms() {
        let pred = Predicate::empty();
        assert!(!pred.pve_id().is_valid());
        assert_eq!(pred.num_args(), 0);
        assert_eq!(pred.to_string(), "()");
        assert_eq!(
            pred.to_db_string(),
            "(predicate (id 0) (predID 0) (predName ) (varLen false) (argList ())))"
        );
        assert!(pred.arg(0).is_err());
    }

    #[test]
    fn invalid_id_builds_the_empty_predicate() {
        let vocab = VocabList::new(60);
        let pred = Predicate::new(&vocab, DbId::INVALID).unwrap();
        assert_eq!(pred, Predicate::empty());
        assert!(Predicate::new(&vocab, DbId::new(3)).is_err());
    }

    #[test]
    fn repeated_change_delivery_is_a_no_op() {
        let mut index = DbIndex::new();
        let mut vocab = VocabList::new(60);
        let pve = PredicateVocabElement::with_fargs(
            "hit",
            vec![FormalArgument::integer("<a>").unwrap()],
        )
        .unwrap();
        let pve_id = vocab.add(&mut index, pve.into()).unwrap();
        let mut pred = Predicate::with_args(&vocab, pve_id, vec![DataValue::int(7)]).unwrap();

        let mut edited = vocab.pve(pve_id).unwrap().clone();
        edited.append_formal_arg(FormalArgument::float("<b>").unwrap()).unwrap();
        let change = vocab.replace(&mut index, edited.into()).unwrap();

        pred.update_for_def_change(&vocab, &change).unwrap();
        let once = pred.clone();
        pred.update_for_def_change(&vocab, &change).unwrap();
        assert_eq!(pred, once);
        assert_eq!(pred.to_string(), "hit(7, 0.000000)");

        pred.update_for_deletion(&vocab, pve_id).unwrap();
        pred.update_for_deletion(&vocab, pve_id).unwrap();
        assert_eq!(pred, Predicate::empty());
    }
}
