//! Formal arguments: the typed, optionally subranged slots of a vocabulary
//! element.
//!
//! Numeric and time-stamp arguments carry a closed interval; nominal and
//! predicate arguments carry an approved set. When `sub_range` is false the
//! bounds are reset to their unconstrained defaults and the approved set is
//! empty.

use std::collections::BTreeSet;
use std::fmt;

use annodb_model::format::format_double;
use annodb_model::names::{
    is_valid_farg_name, is_valid_nominal, is_valid_quote_string, is_valid_text_string,
};
use annodb_model::{DbId, FargType, Result, SystemError, TimeStamp};

use crate::col_pred::ColPred;
use crate::predicate::Predicate;
use crate::value::{DataValue, Value};
use crate::vocab_list::VocabList;

/// Type-specific part of a formal argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FargKind {
    Integer {
        sub_range: bool,
        min: i64,
        max: i64,
    },
    Float {
        sub_range: bool,
        min: f64,
        max: f64,
    },
    Nominal {
        sub_range: bool,
        approved: BTreeSet<String>,
    },
    Predicate {
        sub_range: bool,
        approved: BTreeSet<DbId>,
    },
    /// `Some((min, max))` when subranged.
    TimeStamp {
        range: Option<(TimeStamp, TimeStamp)>,
    },
    QuoteString,
    Text,
    Untyped,
    ColPredicate,
}

impl FargKind {
    pub fn farg_type(&self) -> FargType {
        match self {
            FargKind::Integer { .. } => FargType::Integer,
            FargKind::Float { .. } => FargType::Float,
            FargKind::Nominal { .. } => FargType::Nominal,
            FargKind::Predicate { .. } => FargType::Predicate,
            FargKind::TimeStamp { .. } => FargType::TimeStamp,
            FargKind::QuoteString => FargType::QuoteString,
            FargKind::Text => FargType::Text,
            FargKind::Untyped => FargType::Untyped,
            FargKind::ColPredicate => FargType::ColPredicate,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            FargKind::Integer { .. } => "IntFormalArg",
            FargKind::Float { .. } => "FloatFormalArg",
            FargKind::Nominal { .. } => "NominalFormalArg",
            FargKind::Predicate { .. } => "PredFormalArg",
            FargKind::TimeStamp { .. } => "TimeStampFormalArg",
            FargKind::QuoteString => "QuoteStringFormalArg",
            FargKind::Text => "TextStringFormalArg",
            FargKind::Untyped => "UnTypedFormalArg",
            FargKind::ColPredicate => "ColPredFormalArg",
        }
    }

    pub fn sub_range(&self) -> bool {
        match self {
            FargKind::Integer { sub_range, .. }
            | FargKind::Float { sub_range, .. }
            | FargKind::Nominal { sub_range, .. }
            | FargKind::Predicate { sub_range, .. } => *sub_range,
            FargKind::TimeStamp { range } => range.is_some(),
            FargKind::QuoteString | FargKind::Text | FargKind::Untyped | FargKind::ColPredicate => {
                false
            }
        }
    }

    fn unranged_int() -> Self {
        FargKind::Integer {
            sub_range: false,
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    fn unranged_float() -> Self {
        FargKind::Float {
            sub_range: false,
            min: -f64::MAX,
            max: f64::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormalArgument {
    id: DbId,
    name: String,
    hidden: bool,
    ve_id: DbId,
    kind: FargKind,
}

impl FormalArgument {
    fn with_kind(context: &'static str, name: &str, kind: FargKind) -> Result<Self> {
        if !is_valid_farg_name(name) {
            return Err(SystemError::invalid_name(context, name));
        }
        Ok(Self {
            id: DbId::INVALID,
            name: name.to_string(),
            hidden: false,
            ve_id: DbId::INVALID,
            kind,
        })
    }

    pub fn integer(name: &str) -> Result<Self> {
        Self::with_kind("FormalArgument::integer()", name, FargKind::unranged_int())
    }

    pub fn integer_ranged(name: &str, min: i64, max: i64) -> Result<Self> {
        let mut farg = Self::integer(name)?;
        farg.set_int_range(min, max)?;
        Ok(farg)
    }

    pub fn float(name: &str) -> Result<Self> {
        Self::with_kind("FormalArgument::float()", name, FargKind::unranged_float())
    }

    pub fn float_ranged(name: &str, min: f64, max: f64) -> Result<Self> {
        let mut farg = Self::float(name)?;
        farg.set_float_range(min, max)?;
        Ok(farg)
    }

    pub fn nominal(name: &str) -> Result<Self> {
        Self::with_kind(
            "FormalArgument::nominal()",
            name,
            FargKind::Nominal {
                sub_range: false,
                approved: BTreeSet::new(),
            },
        )
    }

    pub fn predicate(name: &str) -> Result<Self> {
        Self::with_kind(
            "FormalArgument::predicate()",
            name,
            FargKind::Predicate {
                sub_range: false,
                approved: BTreeSet::new(),
            },
        )
    }

    pub fn time_stamp(name: &str) -> Result<Self> {
        Self::with_kind(
            "FormalArgument::time_stamp()",
            name,
            FargKind::TimeStamp { range: None },
        )
    }

    pub fn time_stamp_ranged(name: &str, min: TimeStamp, max: TimeStamp) -> Result<Self> {
        let mut farg = Self::time_stamp(name)?;
        farg.set_time_stamp_range(Some(min), Some(max))?;
        Ok(farg)
    }

    pub fn quote_string(name: &str) -> Result<Self> {
        Self::with_kind("FormalArgument::quote_string()", name, FargKind::QuoteString)
    }

    pub fn text(name: &str) -> Result<Self> {
        Self::with_kind("FormalArgument::text()", name, FargKind::Text)
    }

    pub fn untyped(name: &str) -> Result<Self> {
        Self::with_kind("FormalArgument::untyped()", name, FargKind::Untyped)
    }

    pub fn col_predicate(name: &str) -> Result<Self> {
        Self::with_kind(
            "FormalArgument::col_predicate()",
            name,
            FargKind::ColPredicate,
        )
    }

    /// Detached deep copy: same kind, name and subrange, no id and no owner.
    pub fn detached_copy(&self) -> Self {
        Self {
            id: DbId::INVALID,
            ve_id: DbId::INVALID,
            ..self.clone()
        }
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: DbId) {
        self.id = id;
    }

    pub fn clear_id(&mut self) {
        self.id = DbId::INVALID;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if !is_valid_farg_name(name) {
            return Err(SystemError::invalid_name("FormalArgument::set_name()", name));
        }
        self.name = name.to_string();
        Ok(())
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Id of the vocabulary element this argument belongs to.
    pub fn ve_id(&self) -> DbId {
        self.ve_id
    }

    pub(crate) fn set_ve_id(&mut self, ve_id: DbId) {
        self.ve_id = ve_id;
    }

    pub fn kind(&self) -> &FargKind {
        &self.kind
    }

    pub fn farg_type(&self) -> FargType {
        self.kind.farg_type()
    }

    pub fn sub_range(&self) -> bool {
        self.kind.sub_range()
    }

    /// Sets the interval of an integer argument. The full `i64` range clears
    /// the subrange.
    pub fn set_int_range(&mut self, min: i64, max: i64) -> Result<()> {
        const CONTEXT: &str = "FormalArgument::set_int_range()";
        let FargKind::Integer { .. } = self.kind else {
            return Err(SystemError::type_mismatch(CONTEXT, FargType::Integer, self.farg_type()));
        };
        if min >= max {
            return Err(SystemError::invariant(CONTEXT, "min >= max"));
        }
        self.kind = if min == i64::MIN && max == i64::MAX {
            FargKind::unranged_int()
        } else {
            FargKind::Integer {
                sub_range: true,
                min,
                max,
            }
        };
        Ok(())
    }

    /// Sets the interval of a float argument. `[-f64::MAX, f64::MAX]` clears
    /// the subrange.
    pub fn set_float_range(&mut self, min: f64, max: f64) -> Result<()> {
        const CONTEXT: &str = "FormalArgument::set_float_range()";
        let FargKind::Float { .. } = self.kind else {
            return Err(SystemError::type_mismatch(CONTEXT, FargType::Float, self.farg_type()));
        };
        if min.is_nan() || max.is_nan() || min >= max {
            return Err(SystemError::invariant(CONTEXT, "min >= max"));
        }
        self.kind = if min == -f64::MAX && max == f64::MAX {
            FargKind::unranged_float()
        } else {
            FargKind::Float {
                sub_range: true,
                min,
                max,
            }
        };
        Ok(())
    }

    /// Both `None` clears the subrange; both `Some` must share a tick rate
    /// and satisfy `min < max`.
    pub fn set_time_stamp_range(
        &mut self,
        min: Option<TimeStamp>,
        max: Option<TimeStamp>,
    ) -> Result<()> {
        const CONTEXT: &str = "FormalArgument::set_time_stamp_range()";
        let FargKind::TimeStamp { .. } = self.kind else {
            return Err(SystemError::type_mismatch(
                CONTEXT,
                FargType::TimeStamp,
                self.farg_type(),
            ));
        };
        let range = match (min, max) {
            (None, None) => None,
            (Some(min), Some(max)) => {
                if min.tps() != max.tps() {
                    return Err(SystemError::tick_rate(CONTEXT, "inconsistent tick rates"));
                }
                if min.ticks() >= max.ticks() {
                    return Err(SystemError::invariant(CONTEXT, "min >= max"));
                }
                Some((min, max))
            }
            _ => return Err(SystemError::invariant(CONTEXT, "min xor max is missing")),
        };
        self.kind = FargKind::TimeStamp { range };
        Ok(())
    }

    /// Turns set-membership constraints on or off for nominal and predicate
    /// arguments. Turning them off empties the approved set.
    pub fn set_sub_range(&mut self, enabled: bool) -> Result<()> {
        match &mut self.kind {
            FargKind::Nominal {
                sub_range,
                approved,
            } => {
                *sub_range = enabled;
                if !enabled {
                    approved.clear();
                }
                Ok(())
            }
            FargKind::Predicate {
                sub_range,
                approved,
            } => {
                *sub_range = enabled;
                if !enabled {
                    approved.clear();
                }
                Ok(())
            }
            other => Err(SystemError::type_mismatch(
                "FormalArgument::set_sub_range()",
                "NOMINAL or PREDICATE",
                other.farg_type(),
            )),
        }
    }

    fn approved_nominals_mut(&mut self, context: &'static str) -> Result<&mut BTreeSet<String>> {
        match &mut self.kind {
            FargKind::Nominal {
                sub_range: true,
                approved,
            } => Ok(approved),
            FargKind::Nominal { .. } => Err(SystemError::invariant(context, "subRange is false")),
            other => Err(SystemError::type_mismatch(context, FargType::Nominal, other.farg_type())),
        }
    }

    pub fn add_approved_nominal(&mut self, nominal: &str) -> Result<()> {
        const CONTEXT: &str = "FormalArgument::add_approved_nominal()";
        let approved = self.approved_nominals_mut(CONTEXT)?;
        if !is_valid_nominal(nominal) {
            return Err(SystemError::invalid_name(CONTEXT, nominal));
        }
        if !approved.insert(nominal.to_string()) {
            return Err(SystemError::invariant(CONTEXT, "already in approved set"));
        }
        Ok(())
    }

    pub fn delete_approved_nominal(&mut self, nominal: &str) -> Result<()> {
        const CONTEXT: &str = "FormalArgument::delete_approved_nominal()";
        if !self.approved_nominals_mut(CONTEXT)?.remove(nominal) {
            return Err(SystemError::invariant(CONTEXT, "not in approved set"));
        }
        Ok(())
    }

    /// Set membership of `nominal`. Requires a subranged nominal argument.
    pub fn approved_nominal(&self, nominal: &str) -> Result<bool> {
        const CONTEXT: &str = "FormalArgument::approved_nominal()";
        match &self.kind {
            FargKind::Nominal {
                sub_range: true,
                approved,
            } => {
                if !is_valid_nominal(nominal) {
                    return Err(SystemError::invalid_name(CONTEXT, nominal));
                }
                Ok(approved.contains(nominal))
            }
            FargKind::Nominal { .. } => Err(SystemError::invariant(CONTEXT, "subRange is false")),
            other => Err(SystemError::type_mismatch(CONTEXT, FargType::Nominal, other.farg_type())),
        }
    }

    fn approved_preds_mut(&mut self, context: &'static str) -> Result<&mut BTreeSet<DbId>> {
        match &mut self.kind {
            FargKind::Predicate {
                sub_range: true,
                approved,
            } => Ok(approved),
            FargKind::Predicate { .. } => {
                Err(SystemError::invariant(context, "subRange is false"))
            }
            other => Err(SystemError::type_mismatch(
                context,
                FargType::Predicate,
                other.farg_type(),
            )),
        }
    }

    /// Approves instances of the predicate vocabulary element `pve_id`, which
    /// must already be in `vocab`.
    pub fn add_approved_pred(&mut self, vocab: &VocabList, pve_id: DbId) -> Result<()> {
        const CONTEXT: &str = "FormalArgument::add_approved_pred()";
        pve_id.require_valid(CONTEXT)?;
        if !vocab.pred_in_vocab_list(pve_id) {
            return Err(SystemError::NotFound {
                context: CONTEXT,
                id: pve_id,
            });
        }
        if !self.approved_preds_mut(CONTEXT)?.insert(pve_id) {
            return Err(SystemError::invariant(CONTEXT, "already in approved set"));
        }
        Ok(())
    }

    pub fn delete_approved_pred(&mut self, pve_id: DbId) -> Result<()> {
        const CONTEXT: &str = "FormalArgument::delete_approved_pred()";
        if !self.approved_preds_mut(CONTEXT)?.remove(&pve_id) {
            return Err(SystemError::invariant(CONTEXT, "not in approved set"));
        }
        Ok(())
    }

    pub fn approved_pred(&self, pve_id: DbId) -> Result<bool> {
        const CONTEXT: &str = "FormalArgument::approved_pred()";
        match &self.kind {
            FargKind::Predicate {
                sub_range: true,
                approved,
            } => Ok(approved.contains(&pve_id)),
            FargKind::Predicate { .. } => {
                Err(SystemError::invariant(CONTEXT, "subRange is false"))
            }
            other => Err(SystemError::type_mismatch(
                CONTEXT,
                FargType::Predicate,
                other.farg_type(),
            )),
        }
    }

    /// Whether `value` is a legal payload for this argument.
    ///
    /// Values of the wrong shape and out-of-range values yield `false`. A
    /// time stamp whose tick rate differs from a subranged argument's bounds
    /// is an error.
    pub fn is_valid_value(&self, vocab: &VocabList, value: &Value) -> Result<bool> {
        const CONTEXT: &str = "FormalArgument::is_valid_value()";
        let valid = match (&self.kind, value) {
            (
                FargKind::Integer {
                    sub_range,
                    min,
                    max,
                },
                Value::Int(v),
            ) => !sub_range || (*min..=*max).contains(v),
            (
                FargKind::Float {
                    sub_range,
                    min,
                    max,
                },
                Value::Float(v),
            ) => !sub_range || (*min <= *v && *v <= *max),
            (FargKind::Nominal { .. }, v) => match v.as_str() {
                Some(s) if is_valid_nominal(s) => !self.sub_range() || self.approved_nominal(s)?,
                _ => false,
            },
            (FargKind::QuoteString, v) => v.as_str().is_some_and(is_valid_quote_string),
            (FargKind::Text, v) => v.as_str().is_some_and(is_valid_text_string),
            (FargKind::TimeStamp { range }, Value::TimeStamp(ts)) => match range {
                None => true,
                Some((min, max)) => {
                    if ts.tps() != min.tps() || ts.tps() != max.tps() {
                        return Err(SystemError::tick_rate(CONTEXT, "TPS mismatch"));
                    }
                    min.ticks() <= ts.ticks() && ts.ticks() <= max.ticks()
                }
            },
            (
                FargKind::Predicate {
                    sub_range,
                    approved,
                },
                Value::Predicate(pred),
            ) => !sub_range || approved.contains(&pred.pve_id()),
            (FargKind::ColPredicate, Value::ColPred(_)) => true,
            (FargKind::Untyped, v) => self.untyped_accepts(vocab, v)?,
            _ => false,
        };
        Ok(valid)
    }

    fn untyped_accepts(&self, vocab: &VocabList, value: &Value) -> Result<bool> {
        let accepted = match value {
            Value::Int(_) | Value::Float(_) | Value::ColPred(_) => true,
            Value::Nominal(Some(s)) | Value::QuoteString(Some(s)) => {
                is_valid_nominal(s) || is_valid_quote_string(s)
            }
            Value::TimeStamp(ts) => ts.tps() == vocab.tps(),
            Value::Predicate(pred) => {
                if pred.pve_id().is_valid() && !vocab.pred_in_vocab_list(pred.pve_id()) {
                    return Err(SystemError::NotFound {
                        context: "FormalArgument::is_valid_value()",
                        id: pred.pve_id(),
                    });
                }
                true
            }
            Value::Undefined(name) => name == &self.name,
            Value::Nominal(None) | Value::QuoteString(None) | Value::Text(_) => false,
        };
        Ok(accepted)
    }

    /// The canonical empty value for this argument. `tps` is the database
    /// tick rate, used for the zero time stamp of unranged time-stamp
    /// arguments.
    pub fn construct_empty_arg(&self, tps: u32) -> Result<DataValue> {
        let value = match &self.kind {
            FargKind::Integer { .. } => Value::Int(0),
            FargKind::Float { .. } => Value::Float(0.0),
            FargKind::Nominal { .. } => Value::Nominal(None),
            FargKind::QuoteString => Value::QuoteString(None),
            FargKind::Text => Value::Text(None),
            FargKind::TimeStamp { range } => {
                let rate = range.map_or(tps, |(min, _)| min.tps());
                Value::TimeStamp(TimeStamp::zero(rate)?)
            }
            FargKind::Predicate { .. } => Value::Predicate(Predicate::empty()),
            FargKind::ColPredicate => Value::ColPred(ColPred::empty()),
            FargKind::Untyped => Value::Undefined(self.name.clone()),
        };
        DataValue::for_farg(self, value)
    }

    /// Builds a value for this argument, reusing `salvage` where its payload
    /// converts to this argument's type and falling back to the empty value
    /// otherwise.
    pub fn construct_arg_with_salvage(
        &self,
        tps: u32,
        salvage: Option<&DataValue>,
    ) -> Result<DataValue> {
        let Some(old) = salvage.filter(|dv| dv.farg_id().is_valid()) else {
            return self.construct_empty_arg(tps);
        };
        let salvaged = match (&self.kind, old.value()) {
            (FargKind::Integer { .. }, Value::Int(v)) => Some(Value::Int(*v)),
            (FargKind::Integer { .. }, Value::Float(v)) => Some(Value::Int(*v as i64)),
            (FargKind::Float { .. }, Value::Float(v)) => Some(Value::Float(*v)),
            (FargKind::Float { .. }, Value::Int(v)) => Some(Value::Float(*v as f64)),
            (FargKind::Nominal { .. }, Value::Nominal(v)) => Some(Value::Nominal(v.clone())),
            (FargKind::Nominal { .. }, Value::QuoteString(Some(s)) | Value::Text(Some(s)))
                if is_valid_nominal(s) =>
            {
                Some(Value::Nominal(Some(s.clone())))
            }
            (FargKind::QuoteString, Value::QuoteString(v) | Value::Nominal(v)) => {
                Some(Value::QuoteString(v.clone()))
            }
            (FargKind::QuoteString, Value::Text(Some(s))) if is_valid_quote_string(s) => {
                Some(Value::QuoteString(Some(s.clone())))
            }
            (FargKind::Text, Value::QuoteString(Some(s)) | Value::Nominal(Some(s)))
                if is_valid_text_string(s) =>
            {
                Some(Value::Text(Some(s.clone())))
            }
            (FargKind::TimeStamp { .. }, Value::Int(v)) if *v >= 0 => {
                Some(Value::TimeStamp(TimeStamp::new(tps, *v)?))
            }
            (FargKind::TimeStamp { range }, Value::TimeStamp(ts))
                if range.is_none_or(|(min, _)| min.tps() == ts.tps()) =>
            {
                Some(Value::TimeStamp(*ts))
            }
            (FargKind::Predicate { .. }, Value::Predicate(pred)) => {
                Some(Value::Predicate(pred.detached_copy()))
            }
            (FargKind::ColPredicate, Value::ColPred(cp)) => Some(Value::ColPred(cp.detached_copy())),
            (FargKind::Untyped, value) => match value {
                Value::Text(Some(s)) if is_valid_quote_string(s) => {
                    Some(Value::QuoteString(Some(s.clone())))
                }
                Value::Text(_) | Value::Undefined(_) => None,
                Value::Predicate(pred) => Some(Value::Predicate(pred.detached_copy())),
                Value::ColPred(cp) => Some(Value::ColPred(cp.detached_copy())),
                Value::TimeStamp(ts) if ts.tps() != tps => None,
                other => Some(other.clone()),
            },
            _ => None,
        };
        match salvaged {
            Some(value) => DataValue::for_farg(self, value),
            None => self.construct_empty_arg(tps),
        }
    }

    /// Same kind, name, visibility and constraints; ids and owners ignored.
    pub fn is_equivalent(&self, other: &FormalArgument) -> bool {
        self.name == other.name && self.hidden == other.hidden && self.kind == other.kind
    }

    pub fn to_db_string(&self) -> String {
        let head = format!("({} {} {}", self.kind.class_name(), self.id, self.name);
        match &self.kind {
            FargKind::Integer {
                sub_range,
                min,
                max,
            } => format!("{head} {sub_range} {min} {max})"),
            FargKind::Float {
                sub_range,
                min,
                max,
            } => format!(
                "{head} {sub_range} {} {})",
                format_double(*min),
                format_double(*max)
            ),
            FargKind::TimeStamp { range: None } => format!("{head} false null null)"),
            FargKind::TimeStamp {
                range: Some((min, max)),
            } => format!(
                "{head} true {} {})",
                min.to_db_string(),
                max.to_db_string()
            ),
            FargKind::Nominal {
                sub_range,
                approved,
            } => {
                let set = if *sub_range {
                    approved.iter().cloned().collect::<Vec<_>>().join(", ")
                } else {
                    String::new()
                };
                format!("{head} {sub_range} ({set}))")
            }
            FargKind::Predicate {
                sub_range,
                approved,
            } => {
                let set = if *sub_range {
                    approved
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                } else {
                    String::new()
                };
                format!("{head} {sub_range} ({set}))")
            }
            FargKind::QuoteString | FargKind::Text | FargKind::Untyped | FargKind::ColPredicate => {
                format!("{head})")
            }
        }
    }
}

impl fmt::Display for FormalArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
