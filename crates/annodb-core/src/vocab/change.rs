//! The change bundle broadcast when a vocabulary element is replaced.

use std::collections::BTreeMap;

use annodb_model::{DbId, Result, SystemError};

use super::VocabEntry;
use crate::formal_arg::FormalArgument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VeKind {
    Matrix,
    Predicate,
}

/// Position remap between two versions of a formal-argument list.
///
/// Arguments are matched by id. Per-argument flags are indexed by new
/// position; `deleted` is indexed by old position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgListRemap {
    pub list_changed: bool,
    /// New position to old position.
    pub n2o: Vec<Option<usize>>,
    /// Old position to new position.
    pub o2n: Vec<Option<usize>>,
    pub name_changed: Vec<bool>,
    pub sub_range_changed: Vec<bool>,
    pub range_changed: Vec<bool>,
    pub deleted: Vec<bool>,
    pub inserted: Vec<bool>,
    pub old_fargs: Vec<FormalArgument>,
    pub new_fargs: Vec<FormalArgument>,
}

impl ArgListRemap {
    pub fn compute(old: &[FormalArgument], new: &[FormalArgument]) -> Result<Self> {
        const CONTEXT: &str = "ArgListRemap::compute()";
        let mut old_pos: BTreeMap<DbId, usize> = BTreeMap::new();
        for (i, farg) in old.iter().enumerate() {
            let id = farg.id().require_valid(CONTEXT)?;
            if old_pos.insert(id, i).is_some() {
                return Err(SystemError::invariant(CONTEXT, format!("duplicate old farg id {id}")));
            }
        }

        let mut remap = Self {
            n2o: Vec::with_capacity(new.len()),
            o2n: vec![None; old.len()],
            old_fargs: old.to_vec(),
            new_fargs: new.to_vec(),
            ..Self::default()
        };
        for (j, farg) in new.iter().enumerate() {
            let id = farg.id().require_valid(CONTEXT)?;
            let i = old_pos.get(&id).copied();
            if let Some(i) = i {
                if remap.o2n[i].replace(j).is_some() {
                    return Err(SystemError::invariant(CONTEXT, format!("duplicate new farg id {id}")));
                }
                let prior = &old[i];
                if prior.farg_type() != farg.farg_type() {
                    return Err(SystemError::type_mismatch(
                        CONTEXT,
                        prior.farg_type(),
                        farg.farg_type(),
                    ));
                }
                remap.name_changed.push(prior.name() != farg.name());
                remap.sub_range_changed.push(prior.sub_range() != farg.sub_range());
                remap.range_changed.push(prior.kind() != farg.kind());
            } else {
                remap.name_changed.push(false);
                remap.sub_range_changed.push(false);
                remap.range_changed.push(false);
            }
            remap.n2o.push(i);
            remap.inserted.push(i.is_none());
        }
        remap.deleted = remap.o2n.iter().map(Option::is_none).collect();
        remap.list_changed = old.len() != new.len()
            || remap.n2o.iter().enumerate().any(|(j, i)| *i != Some(j))
            || (0..new.len()).any(|j| remap.farg_changed(j));
        Ok(remap)
    }

    /// True if the argument at new position `j` survived with changed
    /// metadata.
    pub fn farg_changed(&self, j: usize) -> bool {
        self.name_changed.get(j).copied().unwrap_or(false)
            || self.sub_range_changed.get(j).copied().unwrap_or(false)
            || self.range_changed.get(j).copied().unwrap_or(false)
    }
}

/// Everything a dependent value needs to follow a vocabulary element edit.
#[derive(Debug, Clone, PartialEq)]
pub struct VeChange {
    pub ve_id: DbId,
    pub kind: VeKind,
    pub name_changed: bool,
    pub old_name: String,
    pub new_name: String,
    pub var_len_changed: bool,
    pub old_var_len: bool,
    pub new_var_len: bool,
    pub fargs: ArgListRemap,
    /// Remap of the column predicate argument list; matrices only.
    pub cp_fargs: Option<ArgListRemap>,
}

impl VeChange {
    /// Compares two versions of the same vocabulary element.
    pub fn note(old: &VocabEntry, new: &VocabEntry) -> Result<Self> {
        const CONTEXT: &str = "VeChange::note()";
        let (old_ve, new_ve) = (old.as_ve(), new.as_ve());
        if old_ve.id() != new_ve.id() {
            return Err(SystemError::invariant(CONTEXT, "old/new id mismatch"));
        }
        let cp_fargs = match (old, new) {
            (VocabEntry::Matrix(a), VocabEntry::Matrix(b)) => {
                Some(ArgListRemap::compute(a.cp_fargs(), b.cp_fargs())?)
            }
            (VocabEntry::Predicate(_), VocabEntry::Predicate(_)) => None,
            _ => {
                return Err(SystemError::type_mismatch(
                    CONTEXT,
                    old_ve.class_name(),
                    new_ve.class_name(),
                ));
            }
        };
        Ok(Self {
            ve_id: new_ve.id(),
            kind: new_ve.kind(),
            name_changed: old_ve.name() != new_ve.name(),
            old_name: old_ve.name().to_string(),
            new_name: new_ve.name().to_string(),
            var_len_changed: old_ve.var_len() != new_ve.var_len(),
            old_var_len: old_ve.var_len(),
            new_var_len: new_ve.var_len(),
            fargs: ArgListRemap::compute(old_ve.fargs(), new_ve.fargs())?,
            cp_fargs,
        })
    }

    pub fn change_noted(&self) -> bool {
        self.name_changed
            || self.var_len_changed
            || self.fargs.list_changed
            || self.cp_fargs.as_ref().is_some_and(|cp| cp.list_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_id(mut farg: FormalArgument, id: u64) -> FormalArgument {
        farg.set_id(DbId::new(id));
        farg
    }

    #[test]
    fn delete_and_insert() {
        let old = vec![
            with_id(FormalArgument::integer("<a>").unwrap(), 2),
            with_id(FormalArgument::nominal("<b>").unwrap(), 3),
        ];
        let new = vec![
            with_id(FormalArgument::integer("<a>").unwrap(), 2),
            with_id(FormalArgument::float("<c>").unwrap(), 7),
        ];
        let remap = ArgListRemap::compute(&old, &new).unwrap();
        assert!(remap.list_changed);
        assert_eq!(remap.n2o, vec![Some(0), None]);
        assert_eq!(remap.o2n, vec![Some(0), None]);
        assert_eq!(remap.deleted, vec![false, true]);
        assert_eq!(remap.inserted, vec![false, true]);
    }

    #[test]
    fn reorder_and_rename() {
        let old = vec![
            with_id(FormalArgument::integer("<a>").unwrap(), 2),
            with_id(FormalArgument::nominal("<b>").unwrap(), 3),
        ];
        let new = vec![
            with_id(FormalArgument::nominal("<bee>").unwrap(), 3),
            with_id(FormalArgument::integer_ranged("<a>", 0, 9).unwrap(), 2),
        ];
        let remap = ArgListRemap::compute(&old, &new).unwrap();
        assert_eq!(remap.n2o, vec![Some(1), Some(0)]);
        assert_eq!(remap.name_changed, vec![true, false]);
        assert_eq!(remap.sub_range_changed, vec![false, true]);
        assert!(remap.farg_changed(1));
    }

    #[test]
    fn identical_lists_are_unchanged() {
        let old = vec![with_id(FormalArgument::untyped("<x>").unwrap(), 4)];
        let remap = ArgListRemap::compute(&old, &old).unwrap();
        assert!(!remap.list_changed);
    }

    #[test]
    fn kind_change_under_same_id_is_rejected() {
        let old = vec![with_id(FormalArgument::untyped("<x>").unwrap(), 4)];
        let new = vec![with_id(FormalArgument::integer("<x>").unwrap(), 4)];
        assert!(ArgListRemap::compute(&old, &new).is_err());
    }
}
