// SPDX-License-Identifier: MPL-2.0

//! The constraint sugar accepted when building a [`Cube`] or [`Query`] from a plain
//! dimension→constraint record, instead of constructing [`Range`]s one call at a time.
//!
//! [`Constraint`] is the Rust stand-in for the dynamically-typed object literals the sugar
//! describes: a bare scalar becomes `Equals`, a `[lower, upper]` pair becomes `Between` (or a
//! half-open bound when one side is missing), an operator-keyed single-entry form
//! (`Constraint::lt`, `::le`, …) dispatches to the matching `Range` constructor, `$has` becomes
//! `HasElement`, `$and` folds a list into an intersection, and a nested record becomes a
//! `Subquery`.

use query_values::{Comparator, Value};

use crate::cube::Cube;
use crate::error::AlgebraError;
use crate::query::Query;
use crate::range::Range;
use crate::type_aliases::Map;

/// The sugar grammar's input shape. See the module docs for the mapping to [`Range`] variants.
#[derive(Debug, Clone)]
pub enum Constraint<C: Comparator> {
    /// A bare scalar or parameter: `Equals(v)`.
    Scalar(Value),
    /// The `[lower, upper]` two-element sugar. A missing side is unbounded on that side.
    Bounds(Vec<Option<Value>>),
    /// An operator-keyed single-entry form: `{"<": v}`, `{"=": v}`, etc.
    Op(Operator, Value),
    /// `{"$has": inner}`.
    Has(Box<Constraint<C>>),
    /// `{"$and": [r1, r2, …]}`.
    And(Vec<Constraint<C>>),
    /// A nested, non-operator-keyed record: `Subquery(Query.from(record))`.
    Record(Map<Constraint<C>>),
    /// An already-built `Query`, embedded as a subquery.
    SubqueryRef(Query<C>),
}

/// The five comparison operators the `{"<op>": v}` sugar dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `=`
    Eq,
}

impl<C: Comparator> Constraint<C> {
    /// `{"<": v}`.
    pub fn lt(v: impl Into<Value>) -> Constraint<C> {
        Constraint::Op(Operator::Lt, v.into())
    }

    /// `{"<=": v}`.
    pub fn le(v: impl Into<Value>) -> Constraint<C> {
        Constraint::Op(Operator::Le, v.into())
    }

    /// `{">": v}`.
    pub fn gt(v: impl Into<Value>) -> Constraint<C> {
        Constraint::Op(Operator::Gt, v.into())
    }

    /// `{">=": v}`.
    pub fn ge(v: impl Into<Value>) -> Constraint<C> {
        Constraint::Op(Operator::Ge, v.into())
    }

    /// `[lower, upper]`, half-open on the low side, exclusive on the high side.
    pub fn between(lower: impl Into<Value>, upper: impl Into<Value>) -> Constraint<C> {
        Constraint::Bounds(vec![Some(lower.into()), Some(upper.into())])
    }

    /// `[lower,]`.
    pub fn at_least(lower: impl Into<Value>) -> Constraint<C> {
        Constraint::Bounds(vec![Some(lower.into()), None])
    }

    /// `[,upper]`.
    pub fn below(upper: impl Into<Value>) -> Constraint<C> {
        Constraint::Bounds(vec![None, Some(upper.into())])
    }

    /// `{"$has": inner}`.
    pub fn has(inner: Constraint<C>) -> Constraint<C> {
        Constraint::Has(Box::new(inner))
    }

    /// `{"$and": [r1, r2, …]}`.
    pub fn and_all(parts: impl IntoIterator<Item = Constraint<C>>) -> Constraint<C> {
        Constraint::And(parts.into_iter().collect())
    }

    /// Resolves this sugar into a [`Range`]. `Ok(None)` means the constraint is unsatisfiable
    /// (e.g. a `$and` of two disjoint ranges).
    pub fn into_range(self, comparator: C) -> Result<Option<Range<C>>, AlgebraError> {
        match self {
            Constraint::Scalar(v) => Ok(Some(Range::equals(v, comparator))),
            Constraint::Op(op, v) => Ok(Some(match op {
                Operator::Lt => Range::less_than(v, comparator),
                Operator::Le => Range::less_than_or_equal(v, comparator),
                Operator::Gt => Range::greater_than(v, comparator),
                Operator::Ge => Range::greater_than_or_equal(v, comparator),
                Operator::Eq => Range::equals(v, comparator),
            })),
            Constraint::Bounds(mut sides) => match sides.len() {
                2 => {
                    let upper = sides.pop().unwrap();
                    let lower = sides.pop().unwrap();
                    Ok(match (lower, upper) {
                        (Some(a), Some(b)) => Range::between(a, b, comparator),
                        (Some(a), None) => Some(Range::greater_than_or_equal(a, comparator)),
                        (None, Some(b)) => Some(Range::less_than(b, comparator)),
                        (None, None) => Some(Range::unbounded(comparator)),
                    })
                }
                len => Err(AlgebraError::InvalidRangeArity { len }),
            },
            Constraint::Has(inner) => match inner.into_range(comparator.clone())? {
                Some(r) => Ok(Some(Range::has_element(r, comparator))),
                None => Ok(None),
            },
            Constraint::And(parts) => {
                let mut acc = Range::unbounded(comparator.clone());
                for part in parts {
                    let Some(r) = part.into_range(comparator.clone())? else {
                        return Ok(None);
                    };
                    match acc.intersect(&r)? {
                        Some(next) => acc = next,
                        None => return Ok(None),
                    }
                }
                Ok(Some(acc))
            }
            Constraint::Record(fields) => match Cube::from_constraints(fields, comparator.clone())? {
                Some(cube) => Ok(Some(Range::subquery(Query::from_cube(cube), comparator))),
                None => Ok(None),
            },
            Constraint::SubqueryRef(q) => Ok(Some(Range::subquery(q, comparator))),
        }
    }
}

impl<C: Comparator, T: Into<Value>> From<T> for Constraint<C> {
    fn from(v: T) -> Constraint<C> {
        Constraint::Scalar(v.into())
    }
}

impl<C: Comparator> Cube<C> {
    /// Builds a cube from a dimension→sugar record. `Ok(None)` if some dimension's sugar
    /// resolves to the empty range, making the whole cube unsatisfiable.
    pub fn from_constraints(
        fields: Map<Constraint<C>>,
        comparator: C,
    ) -> Result<Option<Cube<C>>, AlgebraError> {
        let mut dimensions = Map::default();
        for (dim, constraint) in fields {
            match constraint.into_range(comparator.clone())? {
                Some(range) => {
                    dimensions.insert(dim, range);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(Cube::new(dimensions)))
    }
}

impl<C: Comparator> Query<C> {
    /// Builds a single-cube query from a dimension→sugar record.
    pub fn from_constraints(fields: Map<Constraint<C>>, comparator: C) -> Result<Query<C>, AlgebraError> {
        match Cube::from_constraints(fields, comparator)? {
            Some(cube) => Ok(Query::from_cube(cube)),
            None => Ok(Query::none()),
        }
    }

    /// Wraps a single sugar constraint in a one-dimension, one-cube query, an
    /// `equalsConstraint`-style entry point that goes through cube equality rather than an
    /// undefined bare comparison.
    pub fn equals_constraint(dimension: impl Into<String>, constraint: Constraint<C>, comparator: C) -> Result<Query<C>, AlgebraError> {
        let mut fields = Map::default();
        fields.insert(dimension.into(), constraint);
        Query::from_constraints(fields, comparator)
    }
}
