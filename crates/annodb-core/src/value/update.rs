//! Binding and cascade handling for data values.

use annodb_model::{DbId, FargType, Result, SystemError};
use tracing::{debug, warn};

use super::{DataValue, Range, Value, range_for};
use crate::formal_arg::{FargKind, FormalArgument};
use crate::vocab::VeChange;
use crate::vocab_list::VocabList;

impl DataValue {
    /// Binds this value to the formal argument `farg_id` and coerces the
    /// payload into its subrange.
    pub fn set_farg_id(&mut self, vocab: &VocabList, farg_id: DbId) -> Result<()> {
        const CONTEXT: &str = "DataValue::set_farg_id()";
        farg_id.require_valid(CONTEXT)?;
        let farg = vocab.farg(farg_id).ok_or(SystemError::NotFound {
            context: CONTEXT,
            id: farg_id,
        })?;
        self.bind(farg)
    }

    pub(crate) fn bind(&mut self, farg: &FormalArgument) -> Result<()> {
        let farg_type = farg.farg_type();
        if !self.value.fits(farg_type) {
            return Err(SystemError::type_mismatch(
                "DataValue::bind()",
                farg_type,
                self.class_name(),
            ));
        }
        self.farg_id = farg.id();
        self.farg_type = farg_type;
        if let Value::Undefined(name) = &mut self.value {
            *name = farg.name().to_string();
        }
        self.sub_range = false;
        self.range = Range::Unbounded;
        self.update_sub_range(farg)
    }

    /// Re-derives the subrange from `farg` and coerces the current payload
    /// into it.
    pub(crate) fn update_sub_range(&mut self, farg: &FormalArgument) -> Result<()> {
        const CONTEXT: &str = "DataValue::update_sub_range()";
        if !self.value.fits(farg.farg_type()) {
            return Err(SystemError::type_mismatch(
                CONTEXT,
                farg.farg_type(),
                self.class_name(),
            ));
        }
        if matches!(farg.kind(), FargKind::Untyped) {
            self.sub_range = false;
            self.range = Range::Unbounded;
            return Ok(());
        }

        self.sub_range = farg.sub_range();
        self.range = range_for(farg.kind());
        let coerced = self.coerce_with(Some(farg), self.value.clone())?;
        if coerced != self.value {
            warn!(
                farg_id = %self.farg_id,
                cell_id = %self.cell_id,
                "value outside new subrange, coerced"
            );
            self.value = coerced;
        }
        Ok(())
    }

    /// Applies a metadata change of the bound formal argument.
    ///
    /// `old` and `new` must be two versions of the argument this value is
    /// bound to. A rename updates undefined placeholders; a subrange or range
    /// change re-coerces the payload.
    pub fn update_for_farg_change(
        &mut self,
        name_changed: bool,
        sub_range_changed: bool,
        range_changed: bool,
        old: &FormalArgument,
        new: &FormalArgument,
    ) -> Result<()> {
        const CONTEXT: &str = "DataValue::update_for_farg_change()";
        if old.id() != new.id() {
            return Err(SystemError::invariant(CONTEXT, "old/new farg id mismatch"));
        }
        if old.ve_id() != new.ve_id() {
            return Err(SystemError::invariant(CONTEXT, "old/new farg ve id mismatch"));
        }
        if old.farg_type() != new.farg_type() {
            return Err(SystemError::type_mismatch(
                CONTEXT,
                old.farg_type(),
                new.farg_type(),
            ));
        }
        if self.farg_id != new.id() {
            return Err(SystemError::invariant(CONTEXT, "farg/value id mismatch"));
        }
        if self.farg_type != new.farg_type() {
            return Err(SystemError::type_mismatch(
                CONTEXT,
                new.farg_type(),
                self.farg_type,
            ));
        }

        if name_changed && let Value::Undefined(name) = &mut self.value {
            *name = new.name().to_string();
        }
        if sub_range_changed || range_changed {
            self.update_sub_range(new)?;
        }
        Ok(())
    }

    /// Forwards a vocabulary definition change to a nested predicate or
    /// column predicate.
    pub(crate) fn update_for_def_change(
        &mut self,
        vocab: &VocabList,
        change: &VeChange,
    ) -> Result<()> {
        match &mut self.value {
            Value::Predicate(pred) => pred.update_for_def_change(vocab, change),
            Value::ColPred(cp) => cp.update_for_def_change(vocab, change),
            _ => Ok(()),
        }
    }

    /// Handles deletion of the vocabulary element `ve_id`.
    ///
    /// In an untyped slot a payload that instantiates the deleted element is
    /// replaced by the slot's empty value; elsewhere the nested predicate
    /// resets itself or forwards the deletion to its own arguments.
    pub(crate) fn update_for_deletion(&mut self, vocab: &VocabList, ve_id: DbId) -> Result<()> {
        let instantiates = match &self.value {
            Value::Predicate(pred) => pred.pve_id() == ve_id,
            Value::ColPred(cp) => cp.mve_id() == ve_id,
            _ => false,
        };
        if instantiates && self.farg_type == FargType::Untyped {
            let farg = vocab.farg(self.farg_id).ok_or(SystemError::NotFound {
                context: "DataValue::update_for_deletion()",
                id: self.farg_id,
            })?;
            debug!(farg_id = %self.farg_id, %ve_id, "untyped slot reset after deletion");
            let reset = farg.construct_empty_arg(vocab.tps())?;
            *self = Self {
                id: self.id,
                cell_id: self.cell_id,
                pred_id: self.pred_id,
                ..reset
            };
            return Ok(());
        }
        match &mut self.value {
            Value::Predicate(pred) => pred.update_for_deletion(vocab, ve_id),
            Value::ColPred(cp) => cp.update_for_deletion(vocab, ve_id),
            _ => Ok(()),
        }
    }
}
