// SPDX-License-Identifier: MPL-2.0

//! The scalar values that dimensions are constrained over.

use std::cmp::Ordering;
use std::fmt;

use crate::Parameter;

/// Any totally comparable scalar, or an unbound [`Parameter`].
///
/// `Value` is deliberately not `Ord`: ordering is delegated to a pluggable
/// [`Comparator`](crate::Comparator) because the algebra never needs to sort values, only to
/// ask `lt(a, b)` of two *concrete* values. Asking a comparator to order a `Parameter` is a
/// caller bug (the tri-valued layer in [`crate::tri`] intercepts parameters before a
/// comparator ever sees one).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A floating point scalar. Compared with [`f64::total_cmp`] so that every bit pattern,
    /// including NaN, has a well-defined place in the total order.
    Float(f64),
    /// A string scalar.
    Str(String),
    /// A timestamp, represented as milliseconds since the Unix epoch.
    Timestamp(i64),
    /// An unbound placeholder.
    Param(Parameter),
}

impl Value {
    /// `true` unless this is [`Value::Param`].
    pub fn is_concrete(&self) -> bool {
        !matches!(self, Value::Param(_))
    }

    /// The parameter this value refers to, if it is one.
    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Value::Param(p) => Some(p),
            _ => None,
        }
    }

    /// Rank used to order values of different concrete variants against each other under the
    /// natural order. Arbitrary but total and stable.
    fn type_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) => 1,
            Value::Float(_) => 2,
            Value::Timestamp(_) => 3,
            Value::Str(_) => 4,
            Value::Param(_) => 5,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int(v)
    }
}

/// Unsuffixed integer literals default to `i32`; without this impl every bare-literal call to
/// a `impl Into<Value>` parameter (`Range::equals(2, cmp())`, …) would fail to infer its
/// argument type.
impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

impl From<Parameter> for Value {
    fn from(v: Parameter) -> Value {
        Value::Param(v)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b) == Ordering::Equal,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Param(a), Value::Param(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "\"{v}\""),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::Param(p) => write!(f, "{p}"),
        }
    }
}

/// The natural order's notion of "less than" for two *concrete* values. Used as the default
/// [`Comparator`](crate::Comparator). Cross-variant comparisons fall back to [`Value::type_rank`]
/// so the relation stays total even over heterogeneous data, which is what lets an `Intersection`
/// node order bounds of unrelated incoming shapes without ever panicking.
pub(crate) fn natural_lt(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => !x & y,
        (Value::Int(x), Value::Int(y)) => x < y,
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y) == Ordering::Less,
        (Value::Str(x), Value::Str(y)) => x < y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x < y,
        (Value::Int(x), Value::Float(y)) => (*x as f64).total_cmp(y) == Ordering::Less,
        (Value::Float(x), Value::Int(y)) => x.total_cmp(&(*y as f64)) == Ordering::Less,
        _ => a.type_rank() < b.type_rank(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_equality_is_total() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(f64::NAN), Value::Float(0.0));
    }

    #[test]
    fn natural_lt_orders_mixed_numerics() {
        assert!(natural_lt(&Value::Int(1), &Value::Float(1.5)));
        assert!(!natural_lt(&Value::Float(1.5), &Value::Int(1)));
    }

    #[test]
    fn natural_lt_is_total_across_variants() {
        assert!(natural_lt(&Value::Bool(true), &Value::Str("a".into())));
    }
}
