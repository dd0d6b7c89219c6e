//! Parameter kinds, raw candidate values, and coercion into typed values.
//!
//! Every parameter write goes through [`ParameterSpec::make_value`], class
//! defaults during registry construction and instance overrides alike, so a
//! value is validated the same way no matter when it is supplied.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Closed set of kinds a parameter declaration can name.
///
/// `Counter`, `Addr` and `Tick` coerce exactly like `Int`; they are kept
/// distinct so diagnostics and registry dumps show the declared kind.
#[derive(Debug, Clone)]
pub enum ParamKind {
    Int,
    Counter,
    Addr,
    Tick,
    Bool,
    String,
    Enum(Arc<EnumSet>),
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Int => write!(f, "Int"),
            ParamKind::Counter => write!(f, "Counter"),
            ParamKind::Addr => write!(f, "Addr"),
            ParamKind::Tick => write!(f, "Tick"),
            ParamKind::Bool => write!(f, "Bool"),
            ParamKind::String => write!(f, "String"),
            ParamKind::Enum(set) => write!(f, "Enum({})", set),
        }
    }
}

/// One enum vocabulary: labels in declared order, each with its index.
///
/// Every `Enum(...)` occurrence in a declaration mints a fresh set behind its
/// own `Arc`, so two declarations with identical labels stay distinct types.
/// Identity is `Arc` pointer identity, never label comparison.
#[derive(Debug)]
pub struct EnumSet {
    variants: Vec<(String, i64)>,
}

impl EnumSet {
    /// List form: index is the position in the list.
    pub fn from_list(labels: Vec<String>) -> Self {
        let variants = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| (label, i as i64))
            .collect();
        Self { variants }
    }

    /// Map form: explicit label -> index pairs, declared order preserved.
    pub fn from_map(pairs: Vec<(String, i64)>) -> Self {
        Self { variants: pairs }
    }

    pub fn index_of(&self, label: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, i)| *i)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(l, _)| l.as_str())
    }
}

impl fmt::Display for EnumSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, label) in self.labels().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}'", label)?;
        }
        write!(f, "]")
    }
}

/// Uncoerced candidate value, as supplied by user code or parsed out of a
/// declaration default.
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    Int(i64),
    Bool(bool),
    Str(String),
    Seq(Vec<Raw>),
}

impl From<i64> for Raw {
    fn from(n: i64) -> Self {
        Raw::Int(n)
    }
}

impl From<bool> for Raw {
    fn from(b: bool) -> Self {
        Raw::Bool(b)
    }
}

impl From<&str> for Raw {
    fn from(s: &str) -> Self {
        Raw::Str(s.to_string())
    }
}

impl From<String> for Raw {
    fn from(s: String) -> Self {
        Raw::Str(s)
    }
}

impl<T: Into<Raw>> From<Vec<T>> for Raw {
    fn from(items: Vec<T>) -> Self {
        Raw::Seq(items.into_iter().map(Into::into).collect())
    }
}

/// An already coerced value is a valid candidate again; coercion through this
/// conversion is idempotent.
impl From<Value> for Raw {
    fn from(v: Value) -> Self {
        match v {
            Value::Int(n) => Raw::Int(n),
            Value::Bool(b) => Raw::Bool(b),
            Value::Str(s) => Raw::Str(s),
            Value::Enum(e) => Raw::Str(e.literal),
            Value::Vector(items) => Raw::Seq(items.into_iter().map(Raw::from).collect()),
        }
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raw::Int(n) => write!(f, "{}", n),
            Raw::Bool(b) => write!(f, "{}", b),
            Raw::Str(s) => write!(f, "'{}'", s),
            Raw::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Validated, type-correct parameter value. Immutable once stored; a
/// reassignment replaces the whole entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Enum(EnumValue),
    Vector(Vec<Value>),
}

/// An accepted enum value: the literal plus its resolved index.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub literal: String,
    pub index: i64,
}

impl fmt::Display for Value {
    /// Renders the exact token the serialized artifact carries: decimal
    /// integers, `true`/`false`, bare strings and enum literals, vectors as
    /// space-separated elements without brackets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(true) => write!(f, "true"),
            Value::Bool(false) => write!(f, "false"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Enum(e) => write!(f, "{}", e.literal),
            Value::Vector(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// A single declared parameter: kind, description, optional default (already
/// coerced), and whether values are vectors of the kind.
///
/// Owned by exactly one type's parameter table and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub kind: ParamKind,
    pub desc: String,
    pub default: Option<Value>,
    pub is_vector: bool,
}

impl ParameterSpec {
    pub fn new(kind: ParamKind, desc: impl Into<String>, is_vector: bool) -> Self {
        Self {
            kind,
            desc: desc.into(),
            default: None,
            is_vector,
        }
    }

    /// Single coercion entry point. `None` means unset and short-circuits
    /// without touching the kind. `param` names the parameter in mismatch
    /// diagnostics.
    pub fn make_value(&self, param: &str, raw: Option<Raw>) -> Result<Option<Value>> {
        match raw {
            None => Ok(None),
            Some(raw) => self.coerce(param, raw).map(Some),
        }
    }

    /// Coerce a present candidate. Vector parameters accept a scalar (wrapped
    /// into a one-element vector) or a sequence (each element coerced
    /// independently; one bad element fails the whole assignment).
    pub fn coerce(&self, param: &str, raw: Raw) -> Result<Value> {
        if self.is_vector {
            let items = match raw {
                Raw::Seq(items) => items
                    .into_iter()
                    .map(|item| coerce_scalar(&self.kind, param, item))
                    .collect::<Result<Vec<_>>>()?,
                scalar => vec![coerce_scalar(&self.kind, param, scalar)?],
            };
            Ok(Value::Vector(items))
        } else {
            coerce_scalar(&self.kind, param, raw)
        }
    }
}

fn mismatch(kind: &ParamKind, param: &str, raw: &Raw) -> Error {
    Error::TypeMismatch {
        param: param.to_string(),
        expected: kind.to_string(),
        value: raw.to_string(),
    }
}

fn coerce_scalar(kind: &ParamKind, param: &str, raw: Raw) -> Result<Value> {
    match kind {
        ParamKind::Int | ParamKind::Counter | ParamKind::Addr | ParamKind::Tick => match raw {
            Raw::Int(n) => Ok(Value::Int(n)),
            Raw::Str(ref s) => match s.trim().parse::<i64>() {
                Ok(n) => Ok(Value::Int(n)),
                Err(_) => Err(mismatch(kind, param, &raw)),
            },
            ref other => Err(mismatch(kind, param, other)),
        },
        ParamKind::Bool => match raw {
            Raw::Bool(b) => Ok(Value::Bool(b)),
            Raw::Int(0) => Ok(Value::Bool(false)),
            Raw::Int(1) => Ok(Value::Bool(true)),
            Raw::Str(ref s) => match s.to_lowercase().as_str() {
                "true" | "t" | "yes" | "y" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "n" => Ok(Value::Bool(false)),
                _ => Err(mismatch(kind, param, &raw)),
            },
            // Anything unrecognized is a mismatch, never silently unset.
            ref other => Err(mismatch(kind, param, other)),
        },
        ParamKind::String => match raw {
            Raw::Str(s) => Ok(Value::Str(s)),
            ref other => Err(mismatch(kind, param, other)),
        },
        ParamKind::Enum(set) => match raw {
            Raw::Str(ref s) => match set.index_of(s) {
                Some(index) => Ok(Value::Enum(EnumValue {
                    literal: s.clone(),
                    index,
                })),
                None => Err(mismatch(kind, param, &raw)),
            },
            ref other => Err(mismatch(kind, param, other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scalar(kind: ParamKind) -> ParameterSpec {
        ParameterSpec::new(kind, "test param", false)
    }

    fn vector(kind: ParamKind) -> ParameterSpec {
        ParameterSpec::new(kind, "test param", true)
    }

    fn rw_set() -> Arc<EnumSet> {
        Arc::new(EnumSet::from_list(vec!["ro".to_string(), "rw".to_string()]))
    }

    #[test]
    fn int_accepts_native_and_literal_strings() {
        let spec = scalar(ParamKind::Int);
        assert_eq!(spec.coerce("size", Raw::Int(64)).unwrap(), Value::Int(64));
        assert_eq!(
            spec.coerce("size", Raw::from("  -12 ")).unwrap(),
            Value::Int(-12)
        );
    }

    #[test]
    fn int_rejects_non_integers() {
        let spec = scalar(ParamKind::Tick);
        let err = spec.coerce("delay", Raw::from("soon")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        let err = spec.coerce("delay", Raw::Bool(true)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn bool_vocabulary() {
        let spec = scalar(ParamKind::Bool);
        for raw in [Raw::Bool(true), Raw::Int(1), Raw::from("Yes"), Raw::from("t")] {
            assert_eq!(spec.coerce("debug", raw).unwrap(), Value::Bool(true));
        }
        for raw in [Raw::Bool(false), Raw::Int(0), Raw::from("NO"), Raw::from("f")] {
            assert_eq!(spec.coerce("debug", raw).unwrap(), Value::Bool(false));
        }
    }

    #[test]
    fn bool_garbage_is_a_mismatch_not_unset() {
        let spec = scalar(ParamKind::Bool);
        for raw in [Raw::Int(2), Raw::from("maybe"), Raw::Seq(vec![])] {
            assert!(matches!(
                spec.coerce("debug", raw),
                Err(Error::TypeMismatch { .. })
            ));
        }
    }

    #[test]
    fn string_takes_only_strings() {
        let spec = scalar(ParamKind::String);
        assert_eq!(
            spec.coerce("label", Raw::from("cache")).unwrap(),
            Value::Str("cache".to_string())
        );
        assert!(matches!(
            spec.coerce("label", Raw::Int(3)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn enum_membership_and_index() {
        let spec = scalar(ParamKind::Enum(rw_set()));
        assert_eq!(
            spec.coerce("mode", Raw::from("rw")).unwrap(),
            Value::Enum(EnumValue {
                literal: "rw".to_string(),
                index: 1,
            })
        );
        let err = spec.coerce("mode", Raw::from("wx")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter 'mode' expects Enum(['ro', 'rw']), got 'wx'"
        );
    }

    #[test]
    fn enum_sets_with_equal_labels_are_distinct() {
        let a = rw_set();
        let b = rw_set();
        assert!(!Arc::ptr_eq(&a, &b));
        // ...but either accepts a literal present in its own vocabulary.
        assert_eq!(a.index_of("ro"), b.index_of("ro"));
    }

    #[test]
    fn enum_map_form_carries_declared_indexes() {
        let set = EnumSet::from_map(vec![("off".to_string(), 4), ("on".to_string(), 7)]);
        let spec = scalar(ParamKind::Enum(Arc::new(set)));
        assert_eq!(
            spec.coerce("power", Raw::from("on")).unwrap(),
            Value::Enum(EnumValue {
                literal: "on".to_string(),
                index: 7,
            })
        );
    }

    #[test]
    fn vector_wraps_scalar_like_single_element_sequence() {
        let spec = vector(ParamKind::Int);
        let from_scalar = spec.coerce("ports", Raw::Int(64)).unwrap();
        let from_seq = spec.coerce("ports", Raw::Seq(vec![Raw::Int(64)])).unwrap();
        assert_eq!(from_scalar, from_seq);
        assert_eq!(from_scalar, Value::Vector(vec![Value::Int(64)]));
    }

    #[test]
    fn vector_element_failure_fails_the_whole_assignment() {
        let spec = vector(ParamKind::Int);
        let raw = Raw::Seq(vec![Raw::Int(1), Raw::from("two"), Raw::Int(3)]);
        assert!(matches!(
            spec.coerce("ports", raw),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unset_short_circuits_without_coercion() {
        let spec = scalar(ParamKind::Int);
        assert_eq!(spec.make_value("size", None).unwrap(), None);
    }

    #[test]
    fn coercion_is_idempotent() {
        let cases: Vec<(ParameterSpec, Raw)> = vec![
            (scalar(ParamKind::Int), Raw::from("64")),
            (scalar(ParamKind::Bool), Raw::from("yes")),
            (scalar(ParamKind::Enum(rw_set())), Raw::from("ro")),
            (vector(ParamKind::Tick), Raw::Int(5)),
            (
                vector(ParamKind::Bool),
                Raw::Seq(vec![Raw::Int(1), Raw::from("no")]),
            ),
        ];
        for (spec, raw) in cases {
            let once = spec.coerce("p", raw).unwrap();
            let twice = spec.coerce("p", Raw::from(once.clone())).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn vector_renders_space_separated() {
        let v = Value::Vector(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(v.to_string(), "1 2 3");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
