use std::fmt;

use annodb_model::names::is_valid_svar_name;
use annodb_model::{DbId, FargType, MatrixType, Result, SystemError};

use super::{VeCore, VeKind, VocabElement, fargs_to_db_string, fargs_to_string};
use crate::formal_arg::FormalArgument;
use crate::vocab_list::VocabList;

/// Leading column-predicate arguments that precede the matrix arguments.
const CP_PREFIX: usize = 3;

/// Schema of a data column.
///
/// Besides its own formal arguments a matrix keeps the column-predicate
/// argument list: `<ord>`, `<onset>`, `<offset>` followed by one copy of each
/// formal argument. The two lists are edited in lock-step.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixVocabElement {
    core: VeCore,
    mtype: MatrixType,
    col_id: DbId,
    cp_fargs: Vec<FormalArgument>,
}

impl MatrixVocabElement {
    pub fn new(name: &str) -> Result<Self> {
        const CONTEXT: &str = "MatrixVocabElement::new()";
        if !is_valid_svar_name(name) {
            return Err(SystemError::invalid_name(CONTEXT, name));
        }
        Ok(Self {
            core: VeCore::new(name),
            mtype: MatrixType::Undefined,
            col_id: DbId::INVALID,
            cp_fargs: vec![
                FormalArgument::integer("<ord>")?,
                FormalArgument::time_stamp("<onset>")?,
                FormalArgument::time_stamp("<offset>")?,
            ],
        })
    }

    /// A matrix with its type set and `fargs` appended in order.
    pub fn with_fargs(name: &str, mtype: MatrixType, fargs: Vec<FormalArgument>) -> Result<Self> {
        let mut mve = Self::new(name)?;
        mve.set_type(mtype)?;
        for farg in fargs {
            mve.append_formal_arg(farg)?;
        }
        Ok(mve)
    }

    pub fn mtype(&self) -> MatrixType {
        self.mtype
    }

    /// Sets the matrix type. Allowed once.
    pub fn set_type(&mut self, mtype: MatrixType) -> Result<()> {
        const CONTEXT: &str = "MatrixVocabElement::set_type()";
        if self.mtype != MatrixType::Undefined {
            return Err(SystemError::invariant(CONTEXT, "type has already been set"));
        }
        if mtype == MatrixType::Undefined {
            return Err(SystemError::invariant(CONTEXT, "new type is UNDEFINED"));
        }
        self.mtype = mtype;
        Ok(())
    }

    pub fn col_id(&self) -> DbId {
        self.col_id
    }

    pub(crate) fn set_col_id(&mut self, col_id: DbId) -> Result<()> {
        const CONTEXT: &str = "MatrixVocabElement::set_col_id()";
        if self.mtype == MatrixType::Undefined {
            return Err(SystemError::invariant(CONTEXT, "type is UNDEFINED"));
        }
        if self.col_id.is_valid() {
            return Err(SystemError::invariant(CONTEXT, "column id already set"));
        }
        self.col_id = col_id.require_valid(CONTEXT)?;
        Ok(())
    }

    pub fn cp_fargs(&self) -> &[FormalArgument] {
        &self.cp_fargs
    }

    /// Formal arguments and column-predicate arguments, mutably.
    pub(crate) fn all_fargs_mut(&mut self) -> impl Iterator<Item = &mut FormalArgument> {
        self.core.fargs.iter_mut().chain(self.cp_fargs.iter_mut())
    }

    fn cp_name_is_unique(&self, name: &str, skip: Option<usize>) -> bool {
        self.cp_fargs
            .iter()
            .enumerate()
            .all(|(i, farg)| Some(i) == skip || farg.name() != name)
    }

    /// True if the column-predicate list mirrors the formal-argument list.
    pub fn cp_fargs_valid(&self) -> bool {
        self.cp_fargs.len() == self.core.fargs.len() + CP_PREFIX
            && self
                .core
                .fargs
                .iter()
                .zip(&self.cp_fargs[CP_PREFIX..])
                .all(|(farg, cp)| farg.is_equivalent(cp))
    }

    fn check_farg_type(&self, context: &'static str, farg: &FormalArgument) -> Result<()> {
        if !self.mtype.accepts(farg.farg_type()) {
            return Err(SystemError::type_mismatch(
                context,
                self.mtype,
                farg.farg_type(),
            ));
        }
        Ok(())
    }

    pub fn to_cp_db_string(&self) -> String {
        format!(
            "((ColumnPredicate: {} {}) (system: {}) (type: {}) (varLen: {}) (fArgList: {})",
            self.core.id,
            self.core.name,
            self.core.system,
            self.mtype,
            self.core.var_len,
            fargs_to_db_string(&self.cp_fargs)
        )
    }

    pub fn to_cp_string(&self) -> String {
        format!("{}{}", self.core.name, fargs_to_string(&self.cp_fargs))
    }
}

impl VocabElement for MatrixVocabElement {
    fn core(&self) -> &VeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VeCore {
        &mut self.core
    }

    fn kind(&self) -> VeKind {
        VeKind::Matrix
    }

    fn class_name(&self) -> &'static str {
        "MatrixVocabElement"
    }

    fn name_is_valid(&self, name: &str) -> bool {
        is_valid_svar_name(name)
    }

    fn to_db_string(&self) -> String {
        format!(
            "((MatrixVocabElement: {} {}) (system: {}) (type: {}) (varLen: {}) (fArgList: {})",
            self.core.id,
            self.core.name,
            self.core.system,
            self.mtype,
            self.core.var_len,
            fargs_to_db_string(&self.core.fargs)
        )
    }

    fn set_system(&mut self) -> Result<()> {
        const CONTEXT: &str = "MatrixVocabElement::set_system()";
        if self.mtype == MatrixType::Undefined {
            return Err(SystemError::invariant(CONTEXT, "type undefined"));
        }
        if self.core.name.is_empty() {
            return Err(SystemError::invariant(CONTEXT, "name is empty"));
        }
        if self.core.fargs.is_empty() {
            return Err(SystemError::invariant(CONTEXT, "formal argument list is empty"));
        }
        self.core.system = true;
        Ok(())
    }

    fn insert_formal_arg(&mut self, farg: FormalArgument, n: usize) -> Result<()> {
        const CONTEXT: &str = "MatrixVocabElement::insert_formal_arg()";
        self.core.check_mutable(CONTEXT)?;
        if self.mtype == MatrixType::Undefined {
            return Err(SystemError::invariant(CONTEXT, "type undefined"));
        }
        if self.mtype != MatrixType::Matrix && (!self.core.fargs.is_empty() || n != 0) {
            return Err(SystemError::invariant(
                CONTEXT,
                format!("{} matrices take exactly one argument", self.mtype),
            ));
        }
        self.check_farg_type(CONTEXT, &farg)?;
        if !self.cp_name_is_unique(farg.name(), None) {
            return Err(SystemError::invalid_name(CONTEXT, farg.name()));
        }
        let mut cp = farg.detached_copy();
        self.core.insert(CONTEXT, farg, n)?;
        cp.set_ve_id(self.core.id);
        self.cp_fargs.insert(n + CP_PREFIX, cp);
        Ok(())
    }

    fn delete_formal_arg(&mut self, n: usize) -> Result<FormalArgument> {
        const CONTEXT: &str = "MatrixVocabElement::delete_formal_arg()";
        self.core.check_mutable(CONTEXT)?;
        if self.mtype != MatrixType::Matrix {
            return Err(SystemError::invariant(
                CONTEXT,
                format!("cannot delete the argument of a {} matrix", self.mtype),
            ));
        }
        self.core.check_index(CONTEXT, n, self.core.fargs.len())?;
        if self.cp_fargs.len() != self.core.fargs.len() + CP_PREFIX {
            return Err(SystemError::invariant(CONTEXT, "column predicate list out of step"));
        }
        if !self.core.fargs[n].is_equivalent(&self.cp_fargs[n + CP_PREFIX]) {
            return Err(SystemError::invariant(
                CONTEXT,
                "argument and column predicate copy differ",
            ));
        }
        let farg = self.core.delete(CONTEXT, n)?;
        self.cp_fargs.remove(n + CP_PREFIX);
        Ok(farg)
    }

    fn replace_formal_arg(&mut self, farg: FormalArgument, n: usize) -> Result<FormalArgument> {
        const CONTEXT: &str = "MatrixVocabElement::replace_formal_arg()";
        self.core.check_mutable(CONTEXT)?;
        self.core.check_index(CONTEXT, n, self.core.fargs.len())?;
        match self.mtype.required_farg_type() {
            Some(required) if required != farg.farg_type() => {
                return Err(SystemError::type_mismatch(CONTEXT, required, farg.farg_type()));
            }
            None if farg.farg_type() == FargType::Text => {
                return Err(SystemError::type_mismatch(CONTEXT, self.mtype, FargType::Text));
            }
            _ => {}
        }
        if !self.cp_name_is_unique(farg.name(), Some(n + CP_PREFIX)) {
            return Err(SystemError::invalid_name(CONTEXT, farg.name()));
        }

        let old = &self.core.fargs[n];
        let mut cp = farg.detached_copy();
        if old.id().is_valid() && old.id() == farg.id() {
            if old.farg_type() != farg.farg_type() {
                return Err(SystemError::type_mismatch(
                    CONTEXT,
                    old.farg_type(),
                    farg.farg_type(),
                ));
            }
            cp.set_id(self.cp_fargs[n + CP_PREFIX].id());
        }
        cp.set_ve_id(self.core.id);
        let old = self.core.replace(CONTEXT, farg, n)?;
        self.cp_fargs[n + CP_PREFIX] = cp;
        Ok(old)
    }

    fn propagate_id(&mut self) {
        let id = self.core.id;
        for farg in self.all_fargs_mut() {
            farg.set_ve_id(id);
        }
    }

    fn is_well_formed(&self, vocab: &VocabList, new_ve: bool) -> Result<bool> {
        const CONTEXT: &str = "MatrixVocabElement::is_well_formed()";
        let name = self.core.name.as_str();
        if name.is_empty() || self.core.fargs.is_empty() {
            return Ok(false);
        }
        if new_ve {
            if vocab.in_vocab_list_by_name(name) {
                return Ok(false);
            }
        } else {
            match vocab.mve(self.core.id) {
                Some(existing) if existing.mtype == self.mtype => {}
                _ => return Ok(false),
            }
        }
        if !is_valid_svar_name(name) {
            return Err(SystemError::invalid_name(CONTEXT, name));
        }

        match self.mtype.required_farg_type() {
            Some(required) => Ok(self.core.fargs.len() == 1
                && self.core.fargs[0].farg_type() == required),
            None if self.mtype == MatrixType::Matrix => {
                for (i, farg) in self.core.fargs.iter().enumerate() {
                    if !self.core.name_is_unique(farg.name(), Some(i)) {
                        return Err(SystemError::invalid_name(CONTEXT, farg.name()));
                    }
                    if farg.farg_type() == FargType::Text {
                        return Err(SystemError::type_mismatch(
                            CONTEXT,
                            "non-text argument",
                            FargType::Text,
                        ));
                    }
                }
                Ok(true)
            }
            None => Err(SystemError::invariant(CONTEXT, "type undefined")),
        }
    }
}

impl fmt::Display for MatrixVocabElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.core.name, self.fargs_to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> MatrixVocabElement {
        let mut mve = MatrixVocabElement::new("trial").unwrap();
        mve.set_type(MatrixType::Matrix).unwrap();
        mve
    }

    #[test]
    fn type_is_set_once() {
        let mut mve = MatrixVocabElement::new("m").unwrap();
        assert!(mve.set_type(MatrixType::Undefined).is_err());
        assert!(mve.append_formal_arg(FormalArgument::integer("<i>").unwrap()).is_err());
        mve.set_type(MatrixType::Integer).unwrap();
        assert!(mve.set_type(MatrixType::Float).is_err());
    }

    #[test]
    fn single_argument_types() {
        let mut mve = MatrixVocabElement::new("n").unwrap();
        mve.set_type(MatrixType::Nominal).unwrap();
        assert!(mve.append_formal_arg(FormalArgument::integer("<i>").unwrap()).is_err());
        mve.append_formal_arg(FormalArgument::nominal("<n>").unwrap()).unwrap();
        assert!(mve.append_formal_arg(FormalArgument::nominal("<m>").unwrap()).is_err());
        assert!(mve.delete_formal_arg(0).is_err());
    }

    #[test]
    fn column_predicate_list_follows_edits() {
        let mut mve = matrix();
        mve.append_formal_arg(FormalArgument::integer("<a>").unwrap()).unwrap();
        mve.append_formal_arg(FormalArgument::nominal("<b>").unwrap()).unwrap();
        mve.insert_formal_arg(FormalArgument::float("<c>").unwrap(), 1).unwrap();
        assert_eq!(mve.to_cp_string(), "trial(<ord>, <onset>, <offset>, <a>, <c>, <b>)");
        assert!(mve.cp_fargs_valid());

        mve.delete_formal_arg(0).unwrap();
        mve.replace_formal_arg(FormalArgument::untyped("<z>").unwrap(), 1)
            .unwrap();
        assert_eq!(mve.to_cp_string(), "trial(<ord>, <onset>, <offset>, <c>, <z>)");
        assert_eq!(mve.fargs_to_string(), "(<c>, <z>)");
        assert!(mve.cp_fargs_valid());
    }

    #[test]
    fn matrix_rejects_text_and_reserved_names() {
        let mut mve = matrix();
        assert!(mve.append_formal_arg(FormalArgument::text("<t>").unwrap()).is_err());
        assert!(mve.append_formal_arg(FormalArgument::integer("<ord>").unwrap()).is_err());
        assert_eq!(mve.num_fargs(), 0);
    }

    #[test]
    fn system_needs_arguments() {
        let mut mve = matrix();
        assert!(mve.set_system().is_err());
        mve.append_formal_arg(FormalArgument::integer("<a>").unwrap()).unwrap();
        mve.set_system().unwrap();
        assert!(mve.set_name("other").is_err());
        assert!(mve.append_formal_arg(FormalArgument::integer("<b>").unwrap()).is_err());
        assert_eq!(mve.num_fargs(), 1);
    }

    #[test]
    fn db_string() {
        let mut mve = matrix();
        mve.append_formal_arg(FormalArgument::quote_string("<q>").unwrap()).unwrap();
        assert_eq!(
            mve.to_db_string(),
            "((MatrixVocabElement: 0 trial) (system: false) (type: MATRIX) (varLen: false) \
             (fArgList: ((QuoteStringFormalArg 0 <q>)))"
        );
    }
}
