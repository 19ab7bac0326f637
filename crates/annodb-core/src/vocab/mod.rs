//! Vocabulary elements: named schemas with an ordered formal-argument list.
//!
//! The two concrete kinds, [`MatrixVocabElement`] and
//! [`PredicateVocabElement`], share their state through [`VeCore`] and their
//! list-editing rules through the [`VocabElement`] trait. Only the copy
//! registered in the [`VocabList`](crate::vocab_list::VocabList) carries a
//! listener registry; clones never do.

mod change;
mod listeners;
mod matrix;
mod predicate;

pub use change::{ArgListRemap, VeChange, VeKind};
pub use listeners::{ExternalVocabElementListener, VocabElementListeners};
pub use matrix::MatrixVocabElement;
pub use predicate::PredicateVocabElement;

use std::fmt;

use annodb_model::{DbId, Result, SystemError};

use crate::formal_arg::FormalArgument;
use crate::vocab_list::VocabList;

/// State common to both vocabulary element kinds.
#[derive(Debug)]
pub struct VeCore {
    pub(crate) id: DbId,
    pub(crate) name: String,
    pub(crate) system: bool,
    pub(crate) var_len: bool,
    pub(crate) fargs: Vec<FormalArgument>,
    pub(crate) listeners: Option<VocabElementListeners>,
}

impl Clone for VeCore {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            system: self.system,
            var_len: self.var_len,
            fargs: self.fargs.clone(),
            listeners: None,
        }
    }
}

impl PartialEq for VeCore {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.system == other.system
            && self.var_len == other.var_len
            && self.fargs == other.fargs
    }
}

impl VeCore {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            id: DbId::INVALID,
            name: name.to_string(),
            system: false,
            var_len: false,
            fargs: Vec::new(),
            listeners: None,
        }
    }

    pub(crate) fn check_mutable(&self, context: &'static str) -> Result<()> {
        if self.system {
            return Err(SystemError::SystemElement { context });
        }
        Ok(())
    }

    /// True if no argument other than the one at `skip` is called `name`.
    pub(crate) fn name_is_unique(&self, name: &str, skip: Option<usize>) -> bool {
        self.fargs
            .iter()
            .enumerate()
            .all(|(i, farg)| Some(i) == skip || farg.name() != name)
    }

    pub(crate) fn check_index(&self, context: &'static str, n: usize, len: usize) -> Result<()> {
        if n >= len {
            return Err(SystemError::OutOfBounds {
                context,
                index: n,
                len,
            });
        }
        Ok(())
    }

    pub(crate) fn insert(
        &mut self,
        context: &'static str,
        mut farg: FormalArgument,
        n: usize,
    ) -> Result<()> {
        self.check_mutable(context)?;
        if n > self.fargs.len() {
            return Err(SystemError::OutOfBounds {
                context,
                index: n,
                len: self.fargs.len(),
            });
        }
        if !self.name_is_unique(farg.name(), None) {
            return Err(SystemError::invalid_name(context, farg.name()));
        }
        farg.set_ve_id(self.id);
        self.fargs.insert(n, farg);
        Ok(())
    }

    pub(crate) fn delete(&mut self, context: &'static str, n: usize) -> Result<FormalArgument> {
        self.check_mutable(context)?;
        self.check_index(context, n, self.fargs.len())?;
        let mut farg = self.fargs.remove(n);
        farg.set_ve_id(DbId::INVALID);
        Ok(farg)
    }

    pub(crate) fn replace(
        &mut self,
        context: &'static str,
        mut farg: FormalArgument,
        n: usize,
    ) -> Result<FormalArgument> {
        self.check_mutable(context)?;
        self.check_index(context, n, self.fargs.len())?;
        if !self.name_is_unique(farg.name(), Some(n)) {
            return Err(SystemError::invalid_name(context, farg.name()));
        }
        farg.set_ve_id(self.id);
        let mut old = std::mem::replace(&mut self.fargs[n], farg);
        old.set_ve_id(DbId::INVALID);
        Ok(old)
    }
}

/// `(a, b)` over the debug strings of `fargs`.
pub(crate) fn fargs_to_db_string(fargs: &[FormalArgument]) -> String {
    let items: Vec<String> = fargs.iter().map(FormalArgument::to_db_string).collect();
    format!("({})", items.join(", "))
}

/// `(<a>, <b>)` over the argument names.
pub(crate) fn fargs_to_string(fargs: &[FormalArgument]) -> String {
    let items: Vec<&str> = fargs.iter().map(FormalArgument::name).collect();
    format!("({})", items.join(", "))
}

/// Shared behavior of matrix and predicate vocabulary elements.
pub trait VocabElement {
    fn core(&self) -> &VeCore;

    fn core_mut(&mut self) -> &mut VeCore;

    fn kind(&self) -> VeKind;

    fn class_name(&self) -> &'static str;

    /// Lexical check for the element name.
    fn name_is_valid(&self, name: &str) -> bool;

    fn to_db_string(&self) -> String;

    /// Whether the element may be inserted (`new_ve`) into, or replace its
    /// namesake in, `vocab`. Structural problems that can only arise from a
    /// bug are errors; ordinary rule violations yield `false`.
    fn is_well_formed(&self, vocab: &VocabList, new_ve: bool) -> Result<bool>;

    fn id(&self) -> DbId {
        self.core().id
    }

    fn name(&self) -> &str {
        &self.core().name
    }

    fn system(&self) -> bool {
        self.core().system
    }

    fn var_len(&self) -> bool {
        self.core().var_len
    }

    fn fargs(&self) -> &[FormalArgument] {
        &self.core().fargs
    }

    fn num_fargs(&self) -> usize {
        self.core().fargs.len()
    }

    fn farg(&self, n: usize) -> Result<&FormalArgument> {
        let fargs = self.fargs();
        fargs.get(n).ok_or(SystemError::OutOfBounds {
            context: "VocabElement::farg()",
            index: n,
            len: fargs.len(),
        })
    }

    fn farg_by_id(&self, id: DbId) -> Option<&FormalArgument> {
        self.fargs().iter().find(|farg| farg.id() == id)
    }

    fn farg_name_is_unique(&self, name: &str) -> bool {
        self.core().name_is_unique(name, None)
    }

    fn listeners(&self) -> Option<&VocabElementListeners> {
        self.core().listeners.as_ref()
    }

    fn set_name(&mut self, name: &str) -> Result<()> {
        const CONTEXT: &str = "VocabElement::set_name()";
        self.core().check_mutable(CONTEXT)?;
        if !self.name_is_valid(name) {
            return Err(SystemError::invalid_name(CONTEXT, name));
        }
        self.core_mut().name = name.to_string();
        Ok(())
    }

    fn set_var_len(&mut self, var_len: bool) -> Result<()> {
        self.core().check_mutable("VocabElement::set_var_len()")?;
        self.core_mut().var_len = var_len;
        Ok(())
    }

    /// Marks the element as system defined. There is no way back.
    fn set_system(&mut self) -> Result<()> {
        if self.core().fargs.is_empty() {
            return Err(SystemError::invariant(
                "VocabElement::set_system()",
                "formal argument list is empty",
            ));
        }
        self.core_mut().system = true;
        Ok(())
    }

    fn append_formal_arg(&mut self, farg: FormalArgument) -> Result<()> {
        let n = self.num_fargs();
        self.insert_formal_arg(farg, n)
    }

    fn insert_formal_arg(&mut self, farg: FormalArgument, n: usize) -> Result<()> {
        self.core_mut()
            .insert("VocabElement::insert_formal_arg()", farg, n)
    }

    /// Removes and returns argument `n`, detached from this element.
    fn delete_formal_arg(&mut self, n: usize) -> Result<FormalArgument> {
        self.core_mut().delete("VocabElement::delete_formal_arg()", n)
    }

    /// Puts `farg` at position `n` and returns the argument it displaced.
    fn replace_formal_arg(&mut self, farg: FormalArgument, n: usize) -> Result<FormalArgument> {
        self.core_mut()
            .replace("VocabElement::replace_formal_arg()", farg, n)
    }

    /// Stamps the element id onto every formal argument.
    fn propagate_id(&mut self) {
        let id = self.core().id;
        for farg in &mut self.core_mut().fargs {
            farg.set_ve_id(id);
        }
    }

    fn fargs_to_db_string(&self) -> String {
        fargs_to_db_string(self.fargs())
    }

    fn fargs_to_string(&self) -> String {
        fargs_to_string(self.fargs())
    }
}

/// A vocabulary element of either kind, as stored in the vocab list.
#[derive(Debug, Clone, PartialEq)]
pub enum VocabEntry {
    Matrix(MatrixVocabElement),
    Predicate(PredicateVocabElement),
}

impl VocabEntry {
    pub fn as_ve(&self) -> &dyn VocabElement {
        match self {
            VocabEntry::Matrix(mve) => mve,
            VocabEntry::Predicate(pve) => pve,
        }
    }

    pub fn as_ve_mut(&mut self) -> &mut dyn VocabElement {
        match self {
            VocabEntry::Matrix(mve) => mve,
            VocabEntry::Predicate(pve) => pve,
        }
    }

    pub fn as_matrix(&self) -> Option<&MatrixVocabElement> {
        match self {
            VocabEntry::Matrix(mve) => Some(mve),
            VocabEntry::Predicate(_) => None,
        }
    }

    pub fn as_predicate(&self) -> Option<&PredicateVocabElement> {
        match self {
            VocabEntry::Predicate(pve) => Some(pve),
            VocabEntry::Matrix(_) => None,
        }
    }

    pub fn is_well_formed(&self, vocab: &VocabList, new_ve: bool) -> Result<bool> {
        self.as_ve().is_well_formed(vocab, new_ve)
    }

    /// Formal arguments followed, for matrices, by the column-predicate
    /// arguments.
    pub fn all_fargs(&self) -> Vec<&FormalArgument> {
        match self {
            VocabEntry::Matrix(mve) => mve.fargs().iter().chain(mve.cp_fargs()).collect(),
            VocabEntry::Predicate(pve) => pve.fargs().iter().collect(),
        }
    }

    pub(crate) fn all_fargs_mut(&mut self) -> Vec<&mut FormalArgument> {
        match self {
            VocabEntry::Matrix(mve) => mve.all_fargs_mut().collect(),
            VocabEntry::Predicate(pve) => pve.core_mut().fargs.iter_mut().collect(),
        }
    }

    pub fn to_db_string(&self) -> String {
        self.as_ve().to_db_string()
    }
}

impl fmt::Display for VocabEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabEntry::Matrix(mve) => write!(f, "{mve}"),
            VocabEntry::Predicate(pve) => write!(f, "{pve}"),
        }
    }
}

impl From<MatrixVocabElement> for VocabEntry {
    fn from(mve: MatrixVocabElement) -> Self {
        VocabEntry::Matrix(mve)
    }
}

impl From<PredicateVocabElement> for VocabEntry {
    fn from(pve: PredicateVocabElement) -> Self {
        VocabEntry::Predicate(pve)
    }
}
