use std::fmt;

use annodb_model::names::is_valid_pred_name;
use annodb_model::{FargType, Result, SystemError};

use super::{VeCore, VeKind, VocabElement, fargs_to_db_string};
use crate::formal_arg::FormalArgument;
use crate::vocab_list::VocabList;

/// Schema of a predicate: a name plus an argument list with no text
/// arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateVocabElement {
    core: VeCore,
}

impl PredicateVocabElement {
    pub fn new(name: &str) -> Result<Self> {
        if !is_valid_pred_name(name) {
            return Err(SystemError::invalid_name("PredicateVocabElement::new()", name));
        }
        Ok(Self {
            core: VeCore::new(name),
        })
    }

    pub fn with_fargs(name: &str, fargs: Vec<FormalArgument>) -> Result<Self> {
        let mut pve = Self::new(name)?;
        for farg in fargs {
            pve.append_formal_arg(farg)?;
        }
        Ok(pve)
    }

    fn reject_text(context: &'static str, farg: &FormalArgument) -> Result<()> {
        if farg.farg_type() == FargType::Text {
            return Err(SystemError::type_mismatch(context, "non-text argument", FargType::Text));
        }
        Ok(())
    }
}

impl VocabElement for PredicateVocabElement {
    fn core(&self) -> &VeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VeCore {
        &mut self.core
    }

    fn kind(&self) -> VeKind {
        VeKind::Predicate
    }

    fn class_name(&self) -> &'static str {
        "PredicateVocabElement"
    }

    fn name_is_valid(&self, name: &str) -> bool {
        is_valid_pred_name(name)
    }

    fn to_db_string(&self) -> String {
        format!(
            "((PredicateVocabElement: {} {}) (system: {}) (varLen: {}) (fArgList: {})",
            self.core.id,
            self.core.name,
            self.core.system,
            self.core.var_len,
            fargs_to_db_string(&self.core.fargs)
        )
    }

    fn insert_formal_arg(&mut self, farg: FormalArgument, n: usize) -> Result<()> {
        const CONTEXT: &str = "PredicateVocabElement::insert_formal_arg()";
        Self::reject_text(CONTEXT, &farg)?;
        self.core.insert(CONTEXT, farg, n)
    }

    fn replace_formal_arg(&mut self, farg: FormalArgument, n: usize) -> Result<FormalArgument> {
        const CONTEXT: &str = "PredicateVocabElement::replace_formal_arg()";
        Self::reject_text(CONTEXT, &farg)?;
        self.core.replace(CONTEXT, farg, n)
    }

    fn is_well_formed(&self, vocab: &VocabList, new_ve: bool) -> Result<bool> {
        const CONTEXT: &str = "PredicateVocabElement::is_well_formed()";
        let name = self.core.name.as_str();
        if name.is_empty() || self.core.fargs.is_empty() {
            return Ok(false);
        }
        if new_ve && vocab.in_vocab_list_by_name(name) {
            return Ok(false);
        }
        if !new_ve && vocab.pve(self.core.id).is_none() {
            return Ok(false);
        }
        if !is_valid_pred_name(name) {
            return Err(SystemError::invalid_name(CONTEXT, name));
        }
        for (i, farg) in self.core.fargs.iter().enumerate() {
            if !self.core.name_is_unique(farg.name(), Some(i)) {
                return Err(SystemError::invalid_name(CONTEXT, farg.name()));
            }
            Self::reject_text(CONTEXT, farg)?;
        }
        Ok(true)
    }
}

impl fmt::Display for PredicateVocabElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.core.name, self.fargs_to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_list_edits() {
        let mut pve = PredicateVocabElement::new("likes").unwrap();
        pve.append_formal_arg(FormalArgument::nominal("<who>").unwrap()).unwrap();
        pve.insert_formal_arg(FormalArgument::integer("<n>").unwrap(), 0).unwrap();
        assert!(pve.insert_formal_arg(FormalArgument::integer("<m>").unwrap(), 5).is_err());
        assert!(pve.append_formal_arg(FormalArgument::integer("<n>").unwrap()).is_err());
        assert!(pve.append_formal_arg(FormalArgument::text("<t>").unwrap()).is_err());
        assert_eq!(pve.fargs_to_string(), "(<n>, <who>)");

        let removed = pve.delete_formal_arg(0).unwrap();
        assert_eq!(removed.name(), "<n>");
        assert!(!removed.ve_id().is_valid());
        assert!(pve.delete_formal_arg(1).is_err());
    }

    #[test]
    fn names() {
        assert!(PredicateVocabElement::new("has space").is_err());
        let mut pve = PredicateVocabElement::new("p").unwrap();
        assert!(pve.set_name("q(").is_err());
        pve.set_name("q").unwrap();
        assert_eq!(pve.name(), "q");
    }

    #[test]
    fn system_elements_are_frozen() {
        let mut pve = PredicateVocabElement::new("sys").unwrap();
        assert!(pve.set_system().is_err());
        pve.append_formal_arg(FormalArgument::untyped("<x>").unwrap()).unwrap();
        pve.set_system().unwrap();
        let before = pve.clone();
        assert!(pve.set_name("other").is_err());
        assert!(pve.set_var_len(true).is_err());
        assert!(pve.append_formal_arg(FormalArgument::untyped("<y>").unwrap()).is_err());
        assert!(pve.insert_formal_arg(FormalArgument::untyped("<y>").unwrap(), 0).is_err());
        assert!(pve.delete_formal_arg(0).is_err());
        assert_eq!(pve, before);
    }

    #[test]
    fn db_string() {
        let pve = PredicateVocabElement::with_fargs(
            "p",
            vec![
                FormalArgument::integer_ranged("<i>", 0, 5).unwrap(),
                FormalArgument::untyped("<u>").unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(
            pve.to_db_string(),
            "((PredicateVocabElement: 0 p) (system: false) (varLen: false) \
             (fArgList: ((IntFormalArg 0 <i> true 0 5), (UnTypedFormalArg 0 <u>)))"
        );
        assert_eq!(pve.to_string(), "p(<i>, <u>)");
    }
}
