// SPDX-License-Identifier: MPL-2.0

//! A compact, backend-agnostic wire shape distinct from this crate's in-memory
//! `Range`/`Cube`/`Query` layout — framing for transport, not a derived schema.
//!
//! Defined only for `C: Default` — [`Comparator`] itself is never serialized (there is no
//! general way to recover an arbitrary comparator from a name), so a custom comparator must be
//! re-attached by the caller after decoding. [`Range::from_json`] and friends exist only for the
//! crate's own [`NaturalOrderComparator`](query_values::NaturalOrderComparator) and other
//! `Default` comparators.

use query_values::{Parameter, Value};
use serde_json::{json, Value as Json};

use crate::cube::Cube;
use crate::error::AlgebraError;
use crate::grammar::{Constraint, Operator};
use crate::query::Query;
use crate::range::Range;
use crate::type_aliases::Map;
use query_values::Comparator;

fn value_to_json(v: &Value) -> Json {
    match v {
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Str(s) => json!(s),
        Value::Timestamp(t) => json!(t),
        Value::Param(p) => json!({ "$": p.name() }),
    }
}

fn value_from_json(json: &Json) -> Result<Value, AlgebraError> {
    match json {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                Ok(Value::Float(n.as_f64().ok_or_else(|| {
                    AlgebraError::InvalidJson(format!("number out of range: {n}"))
                })?))
            }
        }
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Object(obj) if obj.len() == 1 && obj.contains_key("$") => {
            let name = obj["$"]
                .as_str()
                .ok_or_else(|| AlgebraError::InvalidJson("parameter name must be a string".into()))?;
            Ok(Value::Param(Parameter::named(name)?))
        }
        other => Err(AlgebraError::InvalidJson(format!("not a scalar value: {other}"))),
    }
}

/// Encodes a `Between`'s lower bound (always `GreaterThan` or `GreaterThanOrEqual`): the
/// default direction (`GreaterThanOrEqual`, matching the grammar's `[a, b)` sugar) gets the
/// bare-value short form; the non-default, strict `GreaterThan` falls back to the `{">": v}`
/// object form so it isn't confused with the default on decode.
fn lower_bound_json<C: Comparator>(r: &Range<C>) -> Json {
    use crate::range::RangeKindView::*;
    match r.kind_view() {
        GreaterThanOrEqual(v) => value_to_json(v),
        GreaterThan(v) => json!({ ">": value_to_json(v) }),
        _ => unreachable!("Between's lower bound is always GreaterThan(OrEqual)"),
    }
}

/// Encodes a `Between`'s upper bound (always `LessThan` or `LessThanOrEqual`), mirroring
/// [`lower_bound_json`].
fn upper_bound_json<C: Comparator>(r: &Range<C>) -> Json {
    use crate::range::RangeKindView::*;
    match r.kind_view() {
        LessThan(v) => value_to_json(v),
        LessThanOrEqual(v) => json!({ "<=": value_to_json(v) }),
        _ => unreachable!("Between's upper bound is always LessThan(OrEqual)"),
    }
}

impl<C: Comparator> Range<C> {
    /// Inherent JSON rendering, used both by [`Range::to_json`] (for `C: Default`) and
    /// internally by `Cube`/`Query` encoding, which don't themselves require `C: Default`
    /// since they only ever re-serialize a `Range<C>` that already exists.
    pub(crate) fn to_json_inner(&self) -> Json {
        use crate::range::RangeKindView::*;
        match self.kind_view() {
            Unbounded => json!({}),
            Equals(v) => value_to_json(v),
            LessThan(v) => json!([Json::Null, value_to_json(v)]),
            LessThanOrEqual(v) => json!({ "<=": value_to_json(v) }),
            GreaterThan(v) => json!({ ">": value_to_json(v) }),
            GreaterThanOrEqual(v) => json!([value_to_json(v), Json::Null]),
            // Each side uses its own short form *relative to its position*, not the standalone
            // single-bound short form above (which would re-wrap a `GreaterThanOrEqual` side in
            // its own `[v, null]` pair and produce an undecodable doubly-nested array).
            Between(lo, hi) => json!([lower_bound_json(lo), upper_bound_json(hi)]),
            Intersection(parts) => json!({ "$and": parts.iter().map(|r| r.to_json_inner()).collect::<Vec<_>>() }),
            HasElement(inner) => json!({ "$has": inner.to_json_inner() }),
            Subquery(q) => q.to_json_inner(),
        }
    }
}

impl<C: Comparator + Default> Range<C> {
    /// Encodes this range into its JSON wire shape.
    pub fn to_json(&self) -> Json {
        self.to_json_inner()
    }

    /// Decodes a range from its JSON wire shape, using the comparator's `Default` instance.
    pub fn from_json(json: &Json) -> Result<Option<Range<C>>, AlgebraError> {
        constraint_from_json(json)?.into_range(C::default())
    }
}

impl<C: Comparator> Cube<C> {
    pub(crate) fn to_json_inner(&self) -> Json {
        Json::Object(self.iter().map(|(dim, range)| (dim.to_owned(), range.to_json_inner())).collect())
    }
}

impl<C: Comparator + Default> Cube<C> {
    /// Encodes this cube as an object mapping dimension to its range's JSON.
    pub fn to_json(&self) -> Json {
        self.to_json_inner()
    }

    /// Decodes a cube from a dimension→range JSON object.
    pub fn from_json(json: &Json) -> Result<Option<Cube<C>>, AlgebraError> {
        let Json::Object(obj) = json else {
            return Err(AlgebraError::InvalidJson("cube JSON must be an object".into()));
        };
        let mut fields = Map::default();
        for (dim, value) in obj {
            fields.insert(dim.clone(), constraint_from_json(value)?);
        }
        Cube::from_constraints(fields, C::default())
    }
}

impl<C: Comparator> Query<C> {
    pub(crate) fn to_json_inner(&self) -> Json {
        json!({ "union": self.cubes().iter().map(|c| c.to_json_inner()).collect::<Vec<_>>() })
    }
}

impl<C: Comparator + Default> Query<C> {
    /// Encodes this query as `{"union": [cube, cube, …]}`.
    pub fn to_json(&self) -> Json {
        self.to_json_inner()
    }

    /// Decodes a query from its `{"union": [...]}` JSON form.
    pub fn from_json(json: &Json) -> Result<Query<C>, AlgebraError> {
        let Json::Object(obj) = json else {
            return Err(AlgebraError::InvalidJson("query JSON must be an object".into()));
        };
        let Some(Json::Array(cubes)) = obj.get("union") else {
            return Err(AlgebraError::InvalidJson("query JSON must have a \"union\" array".into()));
        };
        let mut result = Vec::with_capacity(cubes.len());
        for cube_json in cubes {
            if let Some(cube) = Cube::from_json(cube_json)? {
                result.push(cube);
            }
        }
        Ok(Query::from_cubes(result))
    }
}

/// Decodes one side of a 2-element bound array. `null` means that side is absent (unbounded);
/// an object keyed by `op` (the non-default operator for this side) is decoded with that
/// operator; anything else is a bare value under `default_op` — the short form for whichever
/// direction the grammar's `[a, b)` sugar treats as default for this position.
fn decode_bound_side<C: Comparator>(
    j: &Json,
    op_key: &str,
    op: Operator,
    default_op: Operator,
) -> Result<Option<Constraint<C>>, AlgebraError> {
    if j.is_null() {
        return Ok(None);
    }
    if let Json::Object(obj) = j {
        if obj.len() == 1 && obj.contains_key(op_key) {
            return Ok(Some(Constraint::Op(op, value_from_json(&obj[op_key])?)));
        }
    }
    Ok(Some(Constraint::Op(default_op, value_from_json(j)?)))
}

fn constraint_from_json<C: Comparator>(json: &Json) -> Result<Constraint<C>, AlgebraError> {
    match json {
        Json::Array(items) => {
            if items.len() != 2 {
                return Err(AlgebraError::InvalidRangeArity { len: items.len() });
            }
            let lower = decode_bound_side(&items[0], ">", Operator::Gt, Operator::Ge)?;
            let upper = decode_bound_side(&items[1], "<=", Operator::Le, Operator::Lt)?;
            Ok(match (lower, upper) {
                (None, None) => Constraint::Bounds(vec![None, None]),
                (Some(lo), None) => lo,
                (None, Some(hi)) => hi,
                (Some(lo), Some(hi)) => Constraint::And(vec![lo, hi]),
            })
        }
        Json::Object(obj) if obj.contains_key("union") => {
            Ok(Constraint::SubqueryRef(Query::from_json(json)?))
        }
        Json::Object(obj) if obj.len() == 1 && obj.contains_key("$") => {
            Ok(Constraint::Scalar(value_from_json(json)?))
        }
        Json::Object(obj) if obj.len() == 1 && obj.contains_key("$has") => {
            Ok(Constraint::has(constraint_from_json(&obj["$has"])?))
        }
        Json::Object(obj) if obj.len() == 1 && obj.contains_key("$and") => {
            let Json::Array(items) = &obj["$and"] else {
                return Err(AlgebraError::InvalidJson("\"$and\" must be an array".into()));
            };
            let parts = items.iter().map(constraint_from_json).collect::<Result<Vec<_>, _>>()?;
            Ok(Constraint::And(parts))
        }
        Json::Object(obj) if obj.len() == 1 && OPERATORS.iter().any(|(k, _)| obj.contains_key(*k)) => {
            let (key, op) = OPERATORS.iter().find(|(k, _)| obj.contains_key(*k)).unwrap();
            Ok(Constraint::Op(*op, value_from_json(&obj[*key])?))
        }
        // `Range::Unbounded` encodes as `{}` (see `to_json_inner`); decode it back to the
        // half-open-both-ways bounds sugar rather than falling into the generic record branch,
        // which would otherwise turn it into a `Subquery` over an empty, vacuously-true cube.
        Json::Object(obj) if obj.is_empty() => Ok(Constraint::Bounds(vec![None, None])),
        Json::Object(obj) => {
            let mut fields = Map::default();
            for (dim, value) in obj {
                fields.insert(dim.clone(), constraint_from_json(value)?);
            }
            Ok(Constraint::Record(fields))
        }
        other => Ok(Constraint::Scalar(value_from_json(other)?)),
    }
}

const OPERATORS: [(&str, Operator); 5] = [
    ("<", Operator::Lt),
    ("<=", Operator::Le),
    (">", Operator::Gt),
    (">=", Operator::Ge),
    ("=", Operator::Eq),
];
