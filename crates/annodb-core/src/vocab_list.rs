//! The vocabulary list: owner of every canonical vocabulary element.
//!
//! Names are unique across matrices and predicates. Formal-argument ids are
//! tracked so that a bound data value can resolve its argument through
//! [`VocabList::farg`] without knowing which element declares it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use annodb_model::{DbId, Result, SystemError};
use tracing::info;

use crate::formal_arg::FormalArgument;
use crate::index::{DbIndex, ElementKind};
use crate::vocab::{
    ExternalVocabElementListener, MatrixVocabElement, PredicateVocabElement, VeChange,
    VocabElement, VocabElementListeners, VocabEntry,
};

#[derive(Debug)]
pub struct VocabList {
    tps: u32,
    entries: BTreeMap<DbId, VocabEntry>,
    names: BTreeMap<String, DbId>,
    /// Formal-argument id to declaring element id.
    farg_owner: BTreeMap<DbId, DbId>,
}

impl VocabList {
    pub fn new(tps: u32) -> Self {
        Self {
            tps,
            entries: BTreeMap::new(),
            names: BTreeMap::new(),
            farg_owner: BTreeMap::new(),
        }
    }

    /// Database tick rate.
    pub fn tps(&self) -> u32 {
        self.tps
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabEntry> {
        self.entries.values()
    }

    pub fn get(&self, id: DbId) -> Option<&VocabEntry> {
        self.entries.get(&id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&VocabEntry> {
        self.names.get(name).and_then(|id| self.entries.get(id))
    }

    pub fn mve(&self, id: DbId) -> Option<&MatrixVocabElement> {
        self.get(id).and_then(VocabEntry::as_matrix)
    }

    pub fn pve(&self, id: DbId) -> Option<&PredicateVocabElement> {
        self.get(id).and_then(VocabEntry::as_predicate)
    }

    pub fn require_mve(&self, id: DbId, context: &'static str) -> Result<&MatrixVocabElement> {
        id.require_valid(context)?;
        self.mve(id).ok_or(SystemError::NotFound { context, id })
    }

    pub fn require_pve(&self, id: DbId, context: &'static str) -> Result<&PredicateVocabElement> {
        id.require_valid(context)?;
        self.pve(id).ok_or(SystemError::NotFound { context, id })
    }

    pub fn in_vocab_list(&self, id: DbId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn in_vocab_list_by_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn matrix_in_vocab_list(&self, id: DbId) -> bool {
        self.mve(id).is_some()
    }

    pub fn pred_in_vocab_list(&self, id: DbId) -> bool {
        self.pve(id).is_some()
    }

    pub fn matrix_name_in_vocab_list(&self, name: &str) -> bool {
        self.get_by_name(name).is_some_and(|e| e.as_matrix().is_some())
    }

    pub fn pred_name_in_vocab_list(&self, name: &str) -> bool {
        self.get_by_name(name).is_some_and(|e| e.as_predicate().is_some())
    }

    /// The formal argument (or column-predicate argument) with this id.
    pub fn farg(&self, id: DbId) -> Option<&FormalArgument> {
        let owner = self.farg_owner.get(&id)?;
        self.entries
            .get(owner)?
            .all_fargs()
            .into_iter()
            .find(|farg| farg.id() == id)
    }

    pub fn listeners(&self, ve_id: DbId) -> Result<&VocabElementListeners> {
        const CONTEXT: &str = "VocabList::listeners()";
        self.get(ve_id)
            .ok_or(SystemError::NotFound { context: CONTEXT, id: ve_id })?
            .as_ve()
            .listeners()
            .ok_or_else(|| SystemError::invariant(CONTEXT, "canonical element without listeners"))
    }

    fn listeners_mut(&mut self, ve_id: DbId, context: &'static str) -> Result<&mut VocabElementListeners> {
        self.entries
            .get_mut(&ve_id)
            .ok_or(SystemError::NotFound { context, id: ve_id })?
            .as_ve_mut()
            .core_mut()
            .listeners
            .as_mut()
            .ok_or_else(|| SystemError::invariant(context, "canonical element without listeners"))
    }

    pub fn register_internal_listener(&mut self, ve_id: DbId, listener_id: DbId) -> Result<()> {
        self.listeners_mut(ve_id, "VocabList::register_internal_listener()")?
            .register_internal(listener_id)
    }

    pub fn deregister_internal_listener(&mut self, ve_id: DbId, listener_id: DbId) -> Result<()> {
        self.listeners_mut(ve_id, "VocabList::deregister_internal_listener()")?
            .deregister_internal(listener_id)
    }

    pub fn register_external_listener(
        &mut self,
        ve_id: DbId,
        listener: Rc<dyn ExternalVocabElementListener>,
    ) -> Result<()> {
        self.listeners_mut(ve_id, "VocabList::register_external_listener()")?
            .register_external(listener)
    }

    pub fn deregister_external_listener(
        &mut self,
        ve_id: DbId,
        listener: &Rc<dyn ExternalVocabElementListener>,
    ) -> Result<()> {
        self.listeners_mut(ve_id, "VocabList::deregister_external_listener()")?
            .deregister_external(listener)
    }

    /// Inserts a new element, assigning ids to it and to all of its formal
    /// arguments.
    pub(crate) fn add(&mut self, index: &mut DbIndex, mut entry: VocabEntry) -> Result<DbId> {
        const CONTEXT: &str = "VocabList::add()";
        if entry.as_ve().id().is_valid() {
            return Err(SystemError::invariant(CONTEXT, "element already has an id"));
        }
        if !entry.is_well_formed(self, true)? {
            return Err(SystemError::invariant(
                CONTEXT,
                format!("{} is not well formed or already exists", entry.as_ve().name()),
            ));
        }
        let kind = match entry {
            VocabEntry::Matrix(_) => ElementKind::MatrixVocabElement,
            VocabEntry::Predicate(_) => ElementKind::PredicateVocabElement,
        };
        let id = index.add_element(kind)?;
        entry.as_ve_mut().core_mut().id = id;
        for farg in entry.all_fargs_mut() {
            if farg.id().is_valid() {
                return Err(SystemError::invariant(CONTEXT, "formal argument already has an id"));
            }
            farg.set_id(index.add_element(ElementKind::FormalArg { ve_id: id })?);
            self.farg_owner.insert(farg.id(), id);
        }
        entry.as_ve_mut().propagate_id();
        entry.as_ve_mut().core_mut().listeners = Some(VocabElementListeners::new(id));

        let name = entry.as_ve().name().to_string();
        info!(ve_id = %id, name = %name, kind = entry.as_ve().class_name(), "vocab element added");
        self.names.insert(name, id);
        self.entries.insert(id, entry);
        Ok(id)
    }

    /// Swaps in a new version of an existing element and returns the change
    /// bundle. The listener registry moves to the new version.
    pub(crate) fn replace(&mut self, index: &mut DbIndex, mut entry: VocabEntry) -> Result<VeChange> {
        const CONTEXT: &str = "VocabList::replace()";
        let id = entry.as_ve().id().require_valid(CONTEXT)?;
        let old = self.entries.get(&id).ok_or(SystemError::NotFound { context: CONTEXT, id })?;
        match (old, &entry) {
            (VocabEntry::Matrix(prior), VocabEntry::Matrix(new)) => {
                check_farg_ids(CONTEXT, prior.fargs(), new.fargs())?;
                check_farg_ids(CONTEXT, prior.cp_fargs(), new.cp_fargs())?;
                if !new.cp_fargs_valid() {
                    return Err(SystemError::invariant(
                        CONTEXT,
                        "column predicate list does not mirror the formal arguments",
                    ));
                }
            }
            (VocabEntry::Predicate(prior), VocabEntry::Predicate(new)) => {
                check_farg_ids(CONTEXT, prior.fargs(), new.fargs())?;
            }
            _ => {
                return Err(SystemError::type_mismatch(
                    CONTEXT,
                    old.as_ve().class_name(),
                    entry.as_ve().class_name(),
                ));
            }
        }
        let (old_name, new_name) = (old.as_ve().name().to_string(), entry.as_ve().name().to_string());
        if old_name != new_name {
            if new_name.is_empty() {
                return Err(SystemError::invalid_name(CONTEXT, new_name));
            }
            if self.names.contains_key(&new_name) {
                return Err(SystemError::invariant(CONTEXT, format!("name {new_name} already in use")));
            }
            if !entry.as_ve().name_is_valid(&new_name) {
                return Err(SystemError::invalid_name(CONTEXT, new_name));
            }
        }
        if !entry.is_well_formed(self, false)? {
            return Err(SystemError::invariant(CONTEXT, format!("{new_name} is not well formed")));
        }

        for farg in entry.all_fargs_mut() {
            if !farg.id().is_valid() {
                farg.set_id(index.add_element(ElementKind::FormalArg { ve_id: id })?);
            }
        }
        entry.as_ve_mut().propagate_id();

        let Some(mut old) = self.entries.remove(&id) else {
            return Err(SystemError::NotFound { context: CONTEXT, id });
        };
        let kept: BTreeSet<DbId> = entry.all_fargs().iter().map(|farg| farg.id()).collect();
        for farg in old.all_fargs() {
            if !kept.contains(&farg.id()) {
                index.remove_element(farg.id())?;
                self.farg_owner.remove(&farg.id());
            }
        }
        for farg_id in &kept {
            self.farg_owner.insert(*farg_id, id);
        }

        let change = VeChange::note(&old, &entry)?;
        entry.as_ve_mut().core_mut().listeners = old.as_ve_mut().core_mut().listeners.take();
        self.names.remove(&old_name);
        self.names.insert(new_name, id);
        self.entries.insert(id, entry);
        info!(
            ve_id = %id,
            changed = change.change_noted(),
            "vocab element replaced"
        );
        Ok(change)
    }

    /// Removes an element and releases its ids. Returns the removed element
    /// with its listener registry still attached.
    pub(crate) fn remove(&mut self, index: &mut DbIndex, id: DbId) -> Result<VocabEntry> {
        const CONTEXT: &str = "VocabList::remove()";
        id.require_valid(CONTEXT)?;
        let entry = self.entries.remove(&id).ok_or(SystemError::NotFound { context: CONTEXT, id })?;
        index.remove_element(id)?;
        for farg in entry.all_fargs() {
            index.remove_element(farg.id())?;
            self.farg_owner.remove(&farg.id());
        }
        self.names.remove(entry.as_ve().name());
        info!(ve_id = %id, name = entry.as_ve().name(), "vocab element removed");
        Ok(entry)
    }

    /// Records the column created for a matrix.
    pub(crate) fn set_col_id(&mut self, mve_id: DbId, col_id: DbId) -> Result<()> {
        match self.entries.get_mut(&mve_id) {
            Some(VocabEntry::Matrix(mve)) => mve.set_col_id(col_id),
            _ => Err(SystemError::NotFound {
                context: "VocabList::set_col_id()",
                id: mve_id,
            }),
        }
    }

    pub fn to_db_string(&self) -> String {
        let contents: Vec<String> = self.entries.values().map(VocabEntry::to_db_string).collect();
        format!(
            "((VocabList) (vl_size: {}) (vl_contents: ({})))",
            self.entries.len(),
            contents.join(", ")
        )
    }
}

impl fmt::Display for VocabList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents: Vec<String> = self.entries.values().map(ToString::to_string).collect();
        write!(f, "((VocabList) (vl_contents: ({})))", contents.join(", "))
    }
}

/// Every valid id in `new` must match exactly one argument of the same type
/// in `old`, and may appear only once in `new`.
fn check_farg_ids(
    context: &'static str,
    old: &[FormalArgument],
    new: &[FormalArgument],
) -> Result<()> {
    let mut seen = BTreeSet::new();
    for farg in new.iter().filter(|farg| farg.id().is_valid()) {
        if !seen.insert(farg.id()) {
            return Err(SystemError::invariant(
                context,
                format!("duplicate formal argument id {}", farg.id()),
            ));
        }
        let mut matches = old.iter().filter(|prior| prior.id() == farg.id());
        let Some(prior) = matches.next() else {
            return Err(SystemError::NotFound { context, id: farg.id() });
        };
        if matches.next().is_some() {
            return Err(SystemError::invariant(context, "multiple matches for formal argument"));
        }
        if prior.farg_type() != farg.farg_type() {
            return Err(SystemError::type_mismatch(context, prior.farg_type(), farg.farg_type()));
        }
    }
    Ok(())
}
