//! Typed data values.
//!
//! A [`DataValue`] is bound to one formal argument (`farg_id`) and caches
//! that argument's type tag and subrange. The payload is a [`Value`]; its
//! variant is fixed when the data value is created.
//!
//! Out-of-range payloads are coerced rather than rejected: numbers and time
//! stamps are clamped to the nearest bound, nominals and predicates outside
//! the approved set are reset to empty. Malformed strings are errors.

mod update;

use std::fmt;
use std::mem;

use annodb_model::format::{format_double, format_double_fixed};
use annodb_model::names::{
    is_valid_farg_name, is_valid_nominal, is_valid_quote_string, is_valid_text_string,
};
use annodb_model::{DbId, FargType, Result, SystemError, TimeStamp};
use tracing::debug;

use crate::col_pred::ColPred;
use crate::formal_arg::{FargKind, FormalArgument};
use crate::predicate::Predicate;
use crate::vocab_list::VocabList;

/// Payload of a data value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Nominal(Option<String>),
    QuoteString(Option<String>),
    Text(Option<String>),
    TimeStamp(TimeStamp),
    Predicate(Predicate),
    ColPred(ColPred),
    /// Placeholder in an untyped slot; holds the slot's formal argument name.
    Undefined(String),
}

impl Value {
    pub fn class_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "IntDataValue",
            Value::Float(_) => "FloatDataValue",
            Value::Nominal(_) => "NominalDataValue",
            Value::QuoteString(_) => "QuoteStringDataValue",
            Value::Text(_) => "TextStringDataValue",
            Value::TimeStamp(_) => "TimeStampDataValue",
            Value::Predicate(_) => "PredDataValue",
            Value::ColPred(_) => "ColPredDataValue",
            Value::Undefined(_) => "UndefinedDataValue",
        }
    }

    /// The formal argument type that holds this payload natively.
    pub fn natural_farg_type(&self) -> FargType {
        match self {
            Value::Int(_) => FargType::Integer,
            Value::Float(_) => FargType::Float,
            Value::Nominal(_) => FargType::Nominal,
            Value::QuoteString(_) => FargType::QuoteString,
            Value::Text(_) => FargType::Text,
            Value::TimeStamp(_) => FargType::TimeStamp,
            Value::Predicate(_) => FargType::Predicate,
            Value::ColPred(_) => FargType::ColPredicate,
            Value::Undefined(_) => FargType::Untyped,
        }
    }

    /// True if a slot of type `farg_type` may hold this payload.
    pub fn fits(&self, farg_type: FargType) -> bool {
        match farg_type {
            FargType::Undefined => false,
            FargType::Untyped => !matches!(self, Value::Text(_)),
            other => self.natural_farg_type() == other,
        }
    }

    /// The string payload of nominal, quote-string and text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Nominal(s) | Value::QuoteString(s) | Value::Text(s) => s.as_deref(),
            _ => None,
        }
    }

    fn same_variant(&self, other: &Value) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// Maps empty strings to `None` and rejects malformed strings.
    fn normalized(self, context: &'static str) -> Result<Value> {
        fn checked(
            context: &'static str,
            value: Option<String>,
            valid: fn(&str) -> bool,
        ) -> Result<Option<String>> {
            match value {
                Some(s) if s.is_empty() => Ok(None),
                Some(s) if !valid(&s) => Err(SystemError::invalid_name(context, s)),
                other => Ok(other),
            }
        }
        Ok(match self {
            Value::Nominal(s) => Value::Nominal(checked(context, s, is_valid_nominal)?),
            Value::QuoteString(s) => {
                Value::QuoteString(checked(context, s, is_valid_quote_string)?)
            }
            Value::Text(s) => Value::Text(checked(context, s, is_valid_text_string)?),
            Value::Undefined(name) if !is_valid_farg_name(&name) => {
                return Err(SystemError::invalid_name(context, name));
            }
            other => other,
        })
    }
}

/// Interval copied from a subranged numeric or time-stamp argument.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Range {
    #[default]
    Unbounded,
    Int {
        min: i64,
        max: i64,
    },
    Float {
        min: f64,
        max: f64,
    },
    TimeStamp {
        min: TimeStamp,
        max: TimeStamp,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataValue {
    id: DbId,
    farg_id: DbId,
    farg_type: FargType,
    cell_id: DbId,
    pred_id: DbId,
    sub_range: bool,
    range: Range,
    value: Value,
}

impl DataValue {
    /// An unbound data value. Strings are validated; empty strings become
    /// the empty value.
    pub fn new(value: Value) -> Result<Self> {
        Ok(Self {
            id: DbId::INVALID,
            farg_id: DbId::INVALID,
            farg_type: FargType::Undefined,
            cell_id: DbId::INVALID,
            pred_id: DbId::INVALID,
            sub_range: false,
            range: Range::Unbounded,
            value: value.normalized("DataValue::new()")?,
        })
    }

    pub fn int(value: i64) -> Self {
        Self::unchecked(Value::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::unchecked(Value::Float(value))
    }

    pub fn time_stamp(value: TimeStamp) -> Self {
        Self::unchecked(Value::TimeStamp(value))
    }

    pub fn predicate(value: Predicate) -> Self {
        Self::unchecked(Value::Predicate(value))
    }

    pub fn col_pred(value: ColPred) -> Self {
        Self::unchecked(Value::ColPred(value))
    }

    pub fn nominal(value: Option<&str>) -> Result<Self> {
        Self::new(Value::Nominal(value.map(str::to_owned)))
    }

    pub fn quote_string(value: Option<&str>) -> Result<Self> {
        Self::new(Value::QuoteString(value.map(str::to_owned)))
    }

    pub fn text(value: Option<&str>) -> Result<Self> {
        Self::new(Value::Text(value.map(str::to_owned)))
    }

    pub fn undefined(farg_name: &str) -> Result<Self> {
        Self::new(Value::Undefined(farg_name.to_string()))
    }

    fn unchecked(value: Value) -> Self {
        Self {
            id: DbId::INVALID,
            farg_id: DbId::INVALID,
            farg_type: FargType::Undefined,
            cell_id: DbId::INVALID,
            pred_id: DbId::INVALID,
            sub_range: false,
            range: Range::Unbounded,
            value,
        }
    }

    /// A value bound to `farg_id`, with `value` coerced into its subrange.
    pub fn bound(vocab: &VocabList, farg_id: DbId, value: Value) -> Result<Self> {
        let mut dv = Self::new(value)?;
        dv.set_farg_id(vocab, farg_id)?;
        Ok(dv)
    }

    pub(crate) fn for_farg(farg: &FormalArgument, value: Value) -> Result<Self> {
        let mut dv = Self::new(value)?;
        dv.bind(farg)?;
        Ok(dv)
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

    /// Clears the id, cell and predicate back-references here and in every
    /// nested predicate.
    pub fn clear_ids(&mut self) {
        self.id = DbId::INVALID;
        self.cell_id = DbId::INVALID;
        self.pred_id = DbId::INVALID;
        match &mut self.value {
            Value::Predicate(pred) => pred.clear_ids(),
            Value::ColPred(cp) => cp.clear_ids(),
            _ => {}
        }
    }

    pub fn farg_id(&self) -> DbId {
        self.farg_id
    }

    pub fn farg_type(&self) -> FargType {
        self.farg_type
    }

    pub fn cell_id(&self) -> DbId {
        self.cell_id
    }

    pub(crate) fn set_cell_id(&mut self, cell_id: DbId) {
        self.cell_id = cell_id;
    }

    /// Id of the predicate or column predicate whose argument list holds
    /// this value, if any.
    pub fn pred_id(&self) -> DbId {
        self.pred_id
    }

    pub(crate) fn set_pred_id(&mut self, pred_id: DbId) {
        self.pred_id = pred_id;
    }

    pub fn sub_range(&self) -> bool {
        self.sub_range
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn class_name(&self) -> &'static str {
        self.value.class_name()
    }

    pub fn as_predicate(&self) -> Option<&Predicate> {
        match &self.value {
            Value::Predicate(pred) => Some(pred),
            _ => None,
        }
    }

    pub fn as_col_pred(&self) -> Option<&ColPred> {
        match &self.value {
            Value::ColPred(cp) => Some(cp),
            _ => None,
        }
    }

    /// Replaces the payload. `value` must be the same variant as the current
    /// payload; it is validated and coerced into the bound subrange.
    pub fn set_value(&mut self, vocab: &VocabList, value: Value) -> Result<()> {
        let farg = self.lookup_farg(vocab, "DataValue::set_value()")?;
        self.value = self.coerce_with(farg, value)?;
        Ok(())
    }

    pub fn set_int(&mut self, value: i64) -> Result<()> {
        self.store(Value::Int(value))
    }

    pub fn set_float(&mut self, value: f64) -> Result<()> {
        self.store(Value::Float(value))
    }

    pub fn set_time_stamp(&mut self, value: TimeStamp) -> Result<()> {
        self.store(Value::TimeStamp(value))
    }

    pub fn set_quote_string(&mut self, value: Option<&str>) -> Result<()> {
        self.store(Value::QuoteString(value.map(str::to_owned)))
    }

    pub fn set_text(&mut self, value: Option<&str>) -> Result<()> {
        self.store(Value::Text(value.map(str::to_owned)))
    }

    pub fn set_col_pred(&mut self, value: ColPred) -> Result<()> {
        self.store(Value::ColPred(value))
    }

    pub fn set_nominal(&mut self, vocab: &VocabList, value: Option<&str>) -> Result<()> {
        self.set_value(vocab, Value::Nominal(value.map(str::to_owned)))
    }

    pub fn set_predicate(&mut self, vocab: &VocabList, value: Predicate) -> Result<()> {
        self.set_value(vocab, Value::Predicate(value))
    }

    /// Setter for payloads whose coercion needs only the cached range.
    fn store(&mut self, value: Value) -> Result<()> {
        self.value = self.coerce_with(None, value)?;
        Ok(())
    }

    /// What `value` would become if stored here. Does not modify `self`.
    pub fn coerce_to_range(&self, vocab: &VocabList, value: &Value) -> Result<Value> {
        let farg = self.lookup_farg(vocab, "DataValue::coerce_to_range()")?;
        self.coerce_with(farg, value.clone())
    }

    fn lookup_farg<'v>(
        &self,
        vocab: &'v VocabList,
        context: &'static str,
    ) -> Result<Option<&'v FormalArgument>> {
        if !self.farg_id.is_valid() {
            return Ok(None);
        }
        vocab
            .farg(self.farg_id)
            .map(Some)
            .ok_or(SystemError::NotFound {
                context,
                id: self.farg_id,
            })
    }

    pub(crate) fn coerce_with(&self, farg: Option<&FormalArgument>, value: Value) -> Result<Value> {
        const CONTEXT: &str = "DataValue::coerce_to_range()";
        if !self.value.same_variant(&value) {
            return Err(SystemError::type_mismatch(
                CONTEXT,
                self.value.class_name(),
                value.class_name(),
            ));
        }
        let value = value.normalized(CONTEXT)?;
        let coerced = match (value, self.range) {
            (Value::Int(v), Range::Int { min, max }) => Value::Int(v.max(min).min(max)),
            (Value::Float(v), Range::Float { min, max }) => Value::Float(v.max(min).min(max)),
            (Value::TimeStamp(ts), Range::TimeStamp { min, max }) => {
                if ts.tps() != min.tps() {
                    return Err(SystemError::tick_rate(
                        CONTEXT,
                        format!("value tps {} != range tps {}", ts.tps(), min.tps()),
                    ));
                }
                let ticks = ts.ticks().max(min.ticks()).min(max.ticks());
                Value::TimeStamp(TimeStamp::new(ts.tps(), ticks)?)
            }
            (Value::Nominal(Some(s)), _) if self.sub_range => {
                if Self::required_farg(farg, CONTEXT)?.approved_nominal(&s)? {
                    Value::Nominal(Some(s))
                } else {
                    debug!(farg_id = %self.farg_id, nominal = %s, "nominal not approved, reset");
                    Value::Nominal(None)
                }
            }
            (Value::Predicate(pred), _) if self.sub_range => {
                if Self::required_farg(farg, CONTEXT)?.approved_pred(pred.pve_id())? {
                    Value::Predicate(pred)
                } else {
                    debug!(farg_id = %self.farg_id, pve_id = %pred.pve_id(), "predicate not approved, reset");
                    Value::Predicate(Predicate::empty())
                }
            }
            (Value::Undefined(name), _) => {
                if let Some(farg) = farg
                    && farg.name() != name
                {
                    return Err(SystemError::invariant(
                        CONTEXT,
                        format!("{name} is not the name of the bound argument"),
                    ));
                }
                Value::Undefined(name)
            }
            (other, _) => other,
        };
        Ok(coerced)
    }

    fn required_farg<'f>(
        farg: Option<&'f FormalArgument>,
        context: &'static str,
    ) -> Result<&'f FormalArgument> {
        farg.ok_or_else(|| SystemError::invariant(context, "subranged value needs its formal argument"))
    }

    /// True if the payload is the empty value of its type.
    pub fn is_default(&self) -> bool {
        match &self.value {
            Value::Int(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Nominal(s) | Value::QuoteString(s) | Value::Text(s) => s.is_none(),
            Value::TimeStamp(ts) => ts.ticks() == 0,
            Value::Predicate(pred) => !pred.pve_id().is_valid(),
            Value::ColPred(cp) => !cp.mve_id().is_valid(),
            Value::Undefined(_) => true,
        }
    }

    /// True for a nominal that names a query variable (`?name`).
    pub fn is_query_var(&self) -> bool {
        matches!(&self.value, Value::Nominal(Some(s)) if s.starts_with('?'))
    }

    /// Deep equality ignoring the id, cell and predicate back-references.
    pub fn logically_equal(&self, other: &DataValue) -> bool {
        if self.farg_id != other.farg_id
            || self.farg_type != other.farg_type
            || self.sub_range != other.sub_range
            || self.range != other.range
        {
            return false;
        }
        match (&self.value, &other.value) {
            (Value::Predicate(a), Value::Predicate(b)) => a.logically_equal(b),
            (Value::ColPred(a), Value::ColPred(b)) => a.logically_equal(b),
            (a, b) => a == b,
        }
    }

    pub fn to_db_string(&self) -> String {
        let payload = match &self.value {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => format_double(*v),
            Value::Nominal(s) | Value::QuoteString(s) | Value::Text(s) => {
                s.clone().unwrap_or_else(|| "<null>".to_string())
            }
            Value::TimeStamp(ts) => ts.to_db_string(),
            Value::Predicate(pred) if pred.pve_id().is_valid() => pred.to_db_string(),
            Value::ColPred(cp) if cp.mve_id().is_valid() => cp.to_db_string(),
            Value::Predicate(_) | Value::ColPred(_) => "()".to_string(),
            Value::Undefined(name) => name.clone(),
        };
        let mut s = format!(
            "({} (id {}) (itsFargID {}) (itsFargType {}) (itsCellID {}) (itsValue {}) (subRange {})",
            self.class_name(),
            self.id,
            self.farg_id,
            self.farg_type,
            self.cell_id,
            payload,
            self.sub_range
        );
        match (&self.value, self.range) {
            (Value::Int(_), Range::Int { min, max }) => {
                s.push_str(&format!(" (minVal {min}) (maxVal {max})"));
            }
            (Value::Int(_), _) => s.push_str(" (minVal 0) (maxVal 0)"),
            (Value::Float(_), Range::Float { min, max }) => s.push_str(&format!(
                " (minVal {}) (maxVal {})",
                format_double(min),
                format_double(max)
            )),
            (Value::Float(_), _) => s.push_str(" (minVal 0.0) (maxVal 0.0)"),
            (Value::TimeStamp(_), Range::TimeStamp { min, max }) => s.push_str(&format!(
                " (minVal {}) (maxVal {})",
                min.to_db_string(),
                max.to_db_string()
            )),
            _ => {}
        }
        s.push(')');
        s
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => f.write_str(&format_double_fixed(*v)),
            Value::Nominal(s) | Value::Text(s) => f.write_str(s.as_deref().unwrap_or("")),
            Value::QuoteString(s) => write!(f, "\"{}\"", s.as_deref().unwrap_or("")),
            Value::TimeStamp(ts) => write!(f, "{ts}"),
            Value::Predicate(pred) => write!(f, "{pred}"),
            Value::ColPred(cp) => write!(f, "{cp}"),
            Value::Undefined(name) => f.write_str(name),
        }
    }
}

/// Maps the farg kind to the cached range of a value bound to it.
fn range_for(kind: &FargKind) -> Range {
    match *kind {
        FargKind::Integer {
            sub_range: true,
            min,
            max,
        } => Range::Int { min, max },
        FargKind::Float {
            sub_range: true,
            min,
            max,
        } => Range::Float { min, max },
        FargKind::TimeStamp {
            range: Some((min, max)),
        } => Range::TimeStamp { min, max },
        _ => Range::Unbounded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_become_null() {
        let dv = DataValue::quote_string(Some("")).unwrap();
        assert_eq!(dv.value(), &Value::QuoteString(None));
        assert_eq!(dv.to_string(), "\"\"");
        let dv = DataValue::nominal(None).unwrap();
        assert!(dv.is_default());
    }

    #[test]
    fn bad_strings_are_errors() {
        assert!(DataValue::quote_string(Some("a \"bad\" string")).is_err());
        assert!(DataValue::nominal(Some(" padded")).is_err());
        assert!(DataValue::text(Some("back\u{8}space")).is_err());
        assert!(DataValue::undefined("val").is_err());
    }

    #[test]
    fn setters_keep_the_variant() {
        let mut dv = DataValue::int(3);
        dv.set_int(7).unwrap();
        assert_eq!(dv.value(), &Value::Int(7));
        let err = dv.set_float(1.0).unwrap_err();
        assert!(matches!(err, SystemError::TypeMismatch { .. }));
    }

    #[test]
    fn unbound_db_strings() {
        assert_eq!(
            DataValue::int(5).to_db_string(),
            "(IntDataValue (id 0) (itsFargID 0) (itsFargType UNDEFINED) (itsCellID 0) \
             (itsValue 5) (subRange false) (minVal 0) (maxVal 0))"
        );
        assert_eq!(
            DataValue::float(1.5).to_db_string(),
            "(FloatDataValue (id 0) (itsFargID 0) (itsFargType UNDEFINED) (itsCellID 0) \
             (itsValue 1.5) (subRange false) (minVal 0.0) (maxVal 0.0))"
        );
        assert_eq!(
            DataValue::text(None).unwrap().to_db_string(),
            "(TextStringDataValue (id 0) (itsFargID 0) (itsFargType UNDEFINED) (itsCellID 0) \
             (itsValue <null>) (subRange false))"
        );
        assert_eq!(
            DataValue::predicate(Predicate::empty()).to_db_string(),
            "(PredDataValue (id 0) (itsFargID 0) (itsFargType UNDEFINED) (itsCellID 0) \
             (itsValue ()) (subRange false))"
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(DataValue::float(2.0).to_string(), "2.000000");
        assert_eq!(DataValue::nominal(Some("x")).unwrap().to_string(), "x");
        assert_eq!(DataValue::predicate(Predicate::empty()).to_string(), "()");
    }

    #[test]
    fn query_vars() {
        assert!(DataValue::nominal(Some("?who")).unwrap().is_query_var());
        assert!(!DataValue::nominal(Some("who")).unwrap().is_query_var());
    }

    #[test]
    fn fits_untyped_except_text() {
        assert!(Value::Int(1).fits(FargType::Untyped));
        assert!(Value::Undefined("<a>".into()).fits(FargType::Untyped));
        assert!(!Value::Text(None).fits(FargType::Untyped));
        assert!(Value::Text(None).fits(FargType::Text));
        assert!(!Value::Int(1).fits(FargType::Float));
        assert!(!Value::Int(1).fits(FargType::Undefined));
    }
}
