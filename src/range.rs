// SPDX-License-Identifier: MPL-2.0

//! A [`Range`] constrains a single dimension of a [`Cube`](crate::Cube).
//!
//! A `Range` is one interval-shaped constraint: a scalar comparison, a half- or fully-bounded
//! interval, a deferred conjunction of bounds that can't yet be ordered against each other
//! (see [`IntersectionRange`]), a collection-membership test, or a nested subquery. It never
//! represents a *union* of disjoint constraints on one dimension — that's what multiple cubes
//! in a [`Query`](crate::Query) are for — so every constructor here either returns a `Range`
//! outright or an `Option<Range>` where `None` spells out the empty set explicitly instead of
//! inventing an "empty" variant.

use std::fmt;

use query_values::tri::{tri_equals, tri_ge, tri_gt, tri_le, tri_lt};
use query_values::{Comparator, NaturalOrderComparator, Parameter, TriBool, Value};
use smallvec::SmallVec;

use crate::error::AlgebraError;
use crate::formatter::{Formatter, Operand};
use crate::item::Item;
use crate::query::Query;
use crate::type_aliases::Bindings;

/// One dimension's worth of constraint.
///
/// Parameterized over a [`Comparator`] so callers can plug in a different total order (case
/// folding, semantic versioning, …) without this crate knowing about it; [`NaturalOrderComparator`]
/// is the default.
#[derive(Clone)]
pub struct Range<C: Comparator = NaturalOrderComparator> {
    kind: RangeKind<C>,
    comparator: C,
}

#[derive(Clone)]
enum RangeKind<C: Comparator> {
    Unbounded,
    Equals(Value),
    LessThan(Value),
    LessThanOrEqual(Value),
    GreaterThan(Value),
    GreaterThanOrEqual(Value),
    Between(Box<Range<C>>, Box<Range<C>>),
    Intersection(IntersectionRange<C>),
    HasElement(Box<Range<C>>),
    Subquery(Query<C>),
}

/// A conjunction of bounds that reference different, as-yet-unbound parameters (or a concrete
/// bound combined with a parametric one), deferred because the bounds can't be ordered against
/// each other until a binding resolves which parameter is which.
///
/// `known` accumulates every bound whose value is concrete; `by_param` holds one accumulated
/// bound per distinct parameter name encountered. A `Range::Intersection` only ever exists with
/// at least two contributing pieces between `known` and `by_param` — fewer collapses to a plain
/// bound during construction (the boundary condition for degenerate intersections).
#[derive(Clone)]
struct IntersectionRange<C: Comparator> {
    known: Box<Range<C>>,
    by_param: SmallVec<[(Parameter, Box<Range<C>>); 2]>,
}

/// Accumulates a lower bound, an upper bound, and/or a point constraint that all reference the
/// same, fully-decidable key (either all concrete values, or all the same named parameter).
/// Because every comparison inside one accumulator is between values of that single key, the
/// tri-valued comparisons it performs are always [`TriBool::True`] or [`TriBool::False`], never
/// [`TriBool::Unknown`] — that's the whole reason [`IntersectionRange`] splits bounds into
/// separate per-parameter accumulators instead of comparing them directly.
struct ScalarAccumulator {
    point: Option<Value>,
    lower: Option<(bool, Value)>,
    upper: Option<(bool, Value)>,
}

impl ScalarAccumulator {
    fn new() -> Self {
        ScalarAccumulator { point: None, lower: None, upper: None }
    }

    /// Folds one more bound in. Returns `false` if the accumulator becomes unsatisfiable.
    fn add<C: Comparator>(&mut self, cmp: &C, kind: &RangeKind<C>) -> bool {
        match kind {
            RangeKind::Unbounded => true,
            RangeKind::Equals(v) => self.add_point(cmp, v.clone()),
            RangeKind::LessThan(v) => self.add_upper(cmp, false, v.clone()),
            RangeKind::LessThanOrEqual(v) => self.add_upper(cmp, true, v.clone()),
            RangeKind::GreaterThan(v) => self.add_lower(cmp, false, v.clone()),
            RangeKind::GreaterThanOrEqual(v) => self.add_lower(cmp, true, v.clone()),
            _ => unreachable!("IntersectionRange only ever accumulates scalar bounds"),
        }
    }

    fn add_point<C: Comparator>(&mut self, cmp: &C, v: Value) -> bool {
        if let Some(p) = &self.point {
            return tri_equals(cmp, p, &v).is_true();
        }
        if let Some((incl, lo)) = &self.lower {
            let ok = if *incl { tri_ge(cmp, &v, lo) } else { tri_gt(cmp, &v, lo) };
            if !ok.is_true() {
                return false;
            }
        }
        if let Some((incl, hi)) = &self.upper {
            let ok = if *incl { tri_le(cmp, &v, hi) } else { tri_lt(cmp, &v, hi) };
            if !ok.is_true() {
                return false;
            }
        }
        self.point = Some(v);
        self.lower = None;
        self.upper = None;
        true
    }

    fn add_lower<C: Comparator>(&mut self, cmp: &C, incl: bool, v: Value) -> bool {
        if let Some(p) = self.point.clone() {
            let ok = if incl { tri_ge(cmp, &p, &v) } else { tri_gt(cmp, &p, &v) };
            return ok.is_true();
        }
        match &self.lower {
            None => self.lower = Some((incl, v)),
            Some((existing_incl, existing_v)) => {
                if tri_equals(cmp, existing_v, &v).is_true() {
                    self.lower = Some((*existing_incl && incl, v));
                } else if tri_lt(cmp, existing_v, &v).is_true() {
                    self.lower = Some((incl, v));
                }
                // else the existing lower bound is already tighter; keep it.
            }
        }
        self.check_crossing(cmp)
    }

    fn add_upper<C: Comparator>(&mut self, cmp: &C, incl: bool, v: Value) -> bool {
        if let Some(p) = self.point.clone() {
            let ok = if incl { tri_le(cmp, &p, &v) } else { tri_lt(cmp, &p, &v) };
            return ok.is_true();
        }
        match &self.upper {
            None => self.upper = Some((incl, v)),
            Some((existing_incl, existing_v)) => {
                if tri_equals(cmp, existing_v, &v).is_true() {
                    self.upper = Some((*existing_incl && incl, v));
                } else if tri_lt(cmp, &v, existing_v).is_true() {
                    self.upper = Some((incl, v));
                }
            }
        }
        self.check_crossing(cmp)
    }

    fn check_crossing<C: Comparator>(&mut self, cmp: &C) -> bool {
        let (Some((l_incl, l_v)), Some((u_incl, u_v))) = (self.lower.clone(), self.upper.clone()) else {
            return true;
        };
        if tri_lt(cmp, &l_v, &u_v).is_true() {
            true
        } else if tri_equals(cmp, &l_v, &u_v).is_true() {
            if l_incl && u_incl {
                self.point = Some(l_v);
                self.lower = None;
                self.upper = None;
                true
            } else {
                false
            }
        } else {
            false
        }
    }

    fn into_range<C: Comparator>(self, cmp: C) -> Option<Range<C>> {
        if let Some(p) = self.point {
            return Some(Range::from_kind(RangeKind::Equals(p), cmp));
        }
        match (self.lower, self.upper) {
            (None, None) => Some(Range::from_kind(RangeKind::Unbounded, cmp)),
            (Some((incl, v)), None) => {
                let kind = if incl { RangeKind::GreaterThanOrEqual(v) } else { RangeKind::GreaterThan(v) };
                Some(Range::from_kind(kind, cmp))
            }
            (None, Some((incl, v))) => {
                let kind = if incl { RangeKind::LessThanOrEqual(v) } else { RangeKind::LessThan(v) };
                Some(Range::from_kind(kind, cmp))
            }
            (Some((l_incl, l_v)), Some((u_incl, u_v))) => {
                let lo_kind = if l_incl { RangeKind::GreaterThanOrEqual(l_v) } else { RangeKind::GreaterThan(l_v) };
                let hi_kind = if u_incl { RangeKind::LessThanOrEqual(u_v) } else { RangeKind::LessThan(u_v) };
                let lo = Range::from_kind(lo_kind, cmp.clone());
                let hi = Range::from_kind(hi_kind, cmp);
                Some(Range::from_kind(RangeKind::Between(Box::new(lo), Box::new(hi)), lo.comparator.clone()))
            }
        }
    }
}

/// Incrementally folds ranges into a `known` accumulator and one accumulator per parameter,
/// one range at a time: decompose `Between` into its two bounds, route a bound by whether its
/// value is concrete or named.
struct IntersectionBuilder<C: Comparator> {
    comparator: C,
    known: ScalarAccumulator,
    by_param: SmallVec<[(Parameter, ScalarAccumulator); 2]>,
}

impl<C: Comparator> IntersectionBuilder<C> {
    fn new(comparator: C) -> Self {
        IntersectionBuilder { comparator, known: ScalarAccumulator::new(), by_param: SmallVec::new() }
    }

    /// Folds `r` in. Returns `false` (and leaves the builder in an unspecified, discarded state)
    /// if the running intersection becomes unsatisfiable.
    fn add_range(&mut self, r: &Range<C>) -> Result<bool, AlgebraError> {
        match &r.kind {
            RangeKind::Unbounded => Ok(true),
            RangeKind::Between(lo, hi) => Ok(self.add_range(lo)? && self.add_range(hi)?),
            RangeKind::Equals(v)
            | RangeKind::LessThan(v)
            | RangeKind::LessThanOrEqual(v)
            | RangeKind::GreaterThan(v)
            | RangeKind::GreaterThanOrEqual(v) => {
                if v.is_concrete() {
                    Ok(self.known.add(&self.comparator, &r.kind))
                } else {
                    let p = v.as_parameter().expect("non-concrete value is a parameter").clone();
                    if let Some((_, acc)) = self.by_param.iter_mut().find(|(pp, _)| *pp == p) {
                        Ok(acc.add(&self.comparator, &r.kind))
                    } else {
                        let mut acc = ScalarAccumulator::new();
                        let ok = acc.add(&self.comparator, &r.kind);
                        self.by_param.push((p, acc));
                        Ok(ok)
                    }
                }
            }
            RangeKind::Intersection(inner) => {
                if !self.add_range(&inner.known)? {
                    return Ok(false);
                }
                for (_, bound) in &inner.by_param {
                    if !self.add_range(bound)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            RangeKind::HasElement(_) => Err(AlgebraError::HasElementMixedWithScalar { dimension: None }),
            RangeKind::Subquery(_) => Err(AlgebraError::SubqueryMixedWithOther { dimension: None }),
        }
    }

    fn finish(self) -> Option<Range<C>> {
        let known = self.known.into_range(self.comparator.clone())?;
        let mut parts = Vec::with_capacity(self.by_param.len());
        for (p, acc) in self.by_param {
            parts.push((p, acc.into_range(self.comparator.clone())?));
        }
        let known_is_unbounded = matches!(known.kind, RangeKind::Unbounded);
        if parts.is_empty() {
            Some(known)
        } else if known_is_unbounded && parts.len() == 1 {
            Some(parts.into_iter().next().unwrap().1)
        } else {
            let by_param = parts.into_iter().map(|(p, r)| (p, Box::new(r))).collect();
            Some(Range::from_kind(
                RangeKind::Intersection(IntersectionRange { known: Box::new(known), by_param }),
                self.comparator,
            ))
        }
    }
}

impl<C: Comparator> Range<C> {
    fn from_kind(kind: RangeKind<C>, comparator: C) -> Range<C> {
        Range { kind, comparator }
    }

    /// A range every value satisfies.
    pub fn unbounded(comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::Unbounded, comparator)
    }

    /// `dimension = value`.
    pub fn equals(value: impl Into<Value>, comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::Equals(value.into()), comparator)
    }

    /// `dimension < value`.
    pub fn less_than(value: impl Into<Value>, comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::LessThan(value.into()), comparator)
    }

    /// `dimension <= value`.
    pub fn less_than_or_equal(value: impl Into<Value>, comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::LessThanOrEqual(value.into()), comparator)
    }

    /// `dimension > value`.
    pub fn greater_than(value: impl Into<Value>, comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::GreaterThan(value.into()), comparator)
    }

    /// `dimension >= value`.
    pub fn greater_than_or_equal(value: impl Into<Value>, comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::GreaterThanOrEqual(value.into()), comparator)
    }

    /// `lower <= dimension < upper`, the grammar's default `[a, b)` two-element-array sugar.
    /// Collapses to [`Range::equals`] when `lower == upper`, and to `None` (the empty set) when
    /// the bounds cross.
    pub fn between(lower: impl Into<Value>, upper: impl Into<Value>, comparator: C) -> Option<Range<C>> {
        let lo = Range::greater_than_or_equal(lower, comparator.clone());
        let hi = Range::less_than(upper, comparator.clone());
        Range::between_bounds(lo, hi)
    }

    /// Builds a `Between` from two already-constructed single-sided bounds (`lo` must be
    /// `GreaterThan`/`GreaterThanOrEqual`, `hi` must be `LessThan`/`LessThanOrEqual`),
    /// normalizing degenerate cases the way [`IntersectionBuilder`] does.
    fn between_bounds(lo: Range<C>, hi: Range<C>) -> Option<Range<C>> {
        let mut builder = IntersectionBuilder::new(lo.comparator.clone());
        if !builder.add_range(&lo).expect("scalar bound") {
            return None;
        }
        if !builder.add_range(&hi).expect("scalar bound") {
            return None;
        }
        builder.finish()
    }

    /// Matches collections with at least one element satisfying `inner`.
    pub fn has_element(inner: Range<C>, comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::HasElement(Box::new(inner)), comparator)
    }

    /// Matches nested records satisfying `query`.
    pub fn subquery(query: Query<C>, comparator: C) -> Range<C> {
        Range::from_kind(RangeKind::Subquery(query), comparator)
    }

    /// This range's comparator.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// `true` iff this range admits every value, i.e. constrains nothing.
    pub(crate) fn is_unbounded(&self) -> bool {
        matches!(self.kind, RangeKind::Unbounded)
    }

    /// Tri-valued: does every value satisfying `other` also satisfy `self`?
    ///
    /// Errors if `self` and `other` mix a `HasElement`/`Subquery` range with an incompatible
    /// shape.
    pub fn contains(&self, other: &Range<C>) -> Result<TriBool, AlgebraError> {
        use RangeKind::*;
        match (&self.kind, &other.kind) {
            (Unbounded, _) => Ok(TriBool::True),
            (HasElement(a), HasElement(b)) => a.contains(b),
            (Subquery(q), Subquery(r)) => q.contains(r),
            (Intersection(i), _) => i.contains_range(other),
            (_, Intersection(i)) => i.contained_by(self),
            (_, Unbounded) => Ok(TriBool::False),
            (HasElement(_), _) | (_, HasElement(_)) => {
                Err(AlgebraError::HasElementMixedWithScalar { dimension: None })
            }
            (Subquery(_), _) | (_, Subquery(_)) => Err(AlgebraError::SubqueryMixedWithOther { dimension: None }),
            _ => self.scalar_contains(other),
        }
    }

    fn scalar_contains(&self, other: &Range<C>) -> Result<TriBool, AlgebraError> {
        use RangeKind::*;
        let cmp = &self.comparator;
        match &self.kind {
            Equals(a) => match &other.kind {
                Equals(b) => Ok(tri_equals(cmp, a, b)),
                _ => Ok(TriBool::False),
            },
            LessThan(a) => match &other.kind {
                Equals(b) | LessThanOrEqual(b) => Ok(tri_gt(cmp, a, b)),
                LessThan(b) => Ok(tri_ge(cmp, a, b)),
                GreaterThan(_) | GreaterThanOrEqual(_) => Ok(TriBool::False),
                Between(_, hi) => self.contains(hi),
                _ => unreachable!(),
            },
            LessThanOrEqual(a) => match &other.kind {
                Equals(b) | LessThanOrEqual(b) | LessThan(b) => Ok(tri_ge(cmp, a, b)),
                GreaterThan(_) | GreaterThanOrEqual(_) => Ok(TriBool::False),
                Between(_, hi) => self.contains(hi),
                _ => unreachable!(),
            },
            GreaterThan(a) => match &other.kind {
                Equals(b) | GreaterThanOrEqual(b) => Ok(tri_lt(cmp, a, b)),
                GreaterThan(b) => Ok(tri_le(cmp, a, b)),
                LessThan(_) | LessThanOrEqual(_) => Ok(TriBool::False),
                Between(lo, _) => self.contains(lo),
                _ => unreachable!(),
            },
            GreaterThanOrEqual(a) => match &other.kind {
                Equals(b) | GreaterThanOrEqual(b) | GreaterThan(b) => Ok(tri_le(cmp, a, b)),
                LessThan(_) | LessThanOrEqual(_) => Ok(TriBool::False),
                Between(lo, _) => self.contains(lo),
                _ => unreachable!(),
            },
            Between(lo, hi) => Ok(lo.contains(other)?.and(hi.contains(other)?)),
            _ => unreachable!("Unbounded/HasElement/Subquery/Intersection are handled in contains()"),
        }
    }

    /// Tri-valued: do `self` and `other` admit exactly the same values? Defined as mutual
    /// containment, which automatically satisfies reflexivity/antisymmetry without needing its
    /// own case analysis.
    ///
    /// This is a weaker/different notion than [`Range::equals`]: two structurally distinct
    /// ranges can be mutually containing (e.g. `Between(2, 2]` and `Equals(2)`), and two
    /// structurally identical ranges holding different, unrelated parameters are merely
    /// `Unknown`-equivalent (since containment itself is `Unknown` for them) rather than
    /// decidably unequal.
    pub fn equivalent_to(&self, other: &Range<C>) -> Result<TriBool, AlgebraError> {
        Ok(self.contains(other)?.and(other.contains(self)?))
    }

    /// Tri-valued **structural** equality: same shape, same (or tri-equal) values at every
    /// position. Unlike [`Range::equivalent_to`], this never concludes `True` by reasoning
    /// about what two differently-named parameters *might* bind to — two `Equals(Parameter)`
    /// ranges are equal only when the parameter names match, never "unknown, but plausibly
    /// the same value after binding". This is the notion `Query::find_factor` and
    /// `Cube::remove_constraint` use, so factoring decisions are fully decidable instead of
    /// drowning in `Unknown` the moment a parameter is involved (see `DESIGN.md`, source
    /// ambiguity on `Intersection.equals`).
    pub fn equals(&self, other: &Range<C>) -> Result<TriBool, AlgebraError> {
        use RangeKind::*;
        let cmp = &self.comparator;
        match (&self.kind, &other.kind) {
            (Unbounded, Unbounded) => Ok(TriBool::True),
            (Equals(a), Equals(b))
            | (LessThan(a), LessThan(b))
            | (LessThanOrEqual(a), LessThanOrEqual(b))
            | (GreaterThan(a), GreaterThan(b))
            | (GreaterThanOrEqual(a), GreaterThanOrEqual(b)) => Ok(tri_equals(cmp, a, b)),
            (Between(l1, u1), Between(l2, u2)) => Ok(l1.equals(l2)?.and(u1.equals(u2)?)),
            (HasElement(a), HasElement(b)) => a.equals(b),
            (Subquery(q), Subquery(r)) => q.equals(r),
            (Intersection(a), Intersection(b)) => a.equals(b),
            _ => Ok(TriBool::False),
        }
    }

    /// Intersects `self` and `other`. `Ok(None)` means the result is the empty set.
    pub fn intersect(&self, other: &Range<C>) -> Result<Option<Range<C>>, AlgebraError> {
        use RangeKind::*;
        match (&self.kind, &other.kind) {
            (Unbounded, _) => Ok(Some(other.clone())),
            (_, Unbounded) => Ok(Some(self.clone())),
            (HasElement(a), HasElement(b)) => match a.intersect(b)? {
                Some(r) => Ok(Some(Range::has_element(r, self.comparator.clone()))),
                None => Ok(None),
            },
            (HasElement(_), _) | (_, HasElement(_)) => {
                Err(AlgebraError::HasElementMixedWithScalar { dimension: None })
            }
            (Subquery(q), Subquery(r)) => Ok(Some(Range::subquery(q.and(r)?, self.comparator.clone()))),
            (Subquery(_), _) | (_, Subquery(_)) => Err(AlgebraError::SubqueryMixedWithOther { dimension: None }),
            _ => {
                let mut builder = IntersectionBuilder::new(self.comparator.clone());
                if !builder.add_range(self)? {
                    return Ok(None);
                }
                if !builder.add_range(other)? {
                    return Ok(None);
                }
                Ok(builder.finish())
            }
        }
    }

    /// Tri-valued: does `item` satisfy this range? Shape mismatches (e.g. a scalar range tested
    /// against a record) are an ordinary `TriBool::False`, not an error — only `Range`-vs-`Range`
    /// construction mixes kinds fatally.
    pub fn contains_item(&self, item: &Item) -> TriBool {
        use RangeKind::*;
        let cmp = &self.comparator;
        match &self.kind {
            Unbounded => TriBool::True,
            Equals(v) => item.as_scalar().map_or(TriBool::False, |iv| tri_equals(cmp, iv, v)),
            LessThan(v) => item.as_scalar().map_or(TriBool::False, |iv| tri_lt(cmp, iv, v)),
            LessThanOrEqual(v) => item.as_scalar().map_or(TriBool::False, |iv| tri_le(cmp, iv, v)),
            GreaterThan(v) => item.as_scalar().map_or(TriBool::False, |iv| tri_gt(cmp, iv, v)),
            GreaterThanOrEqual(v) => item.as_scalar().map_or(TriBool::False, |iv| tri_ge(cmp, iv, v)),
            Between(lo, hi) => lo.contains_item(item).and(hi.contains_item(item)),
            Intersection(i) => i.contains_item(item),
            HasElement(inner) => match item.as_collection() {
                Some(items) => TriBool::any(items.iter().map(|it| inner.contains_item(it))),
                None => TriBool::False,
            },
            Subquery(q) => match item.as_record() {
                Some(rec) => q.contains_item(rec),
                None => TriBool::False,
            },
        }
    }

    /// Substitutes bound parameters with the concrete values in `env`, recursively. A `None`
    /// return means the range became unsatisfiable once its parameters resolved (e.g. a
    /// `Between` whose two now-concrete bounds cross). Parameters absent from `env` are left
    /// unbound.
    pub fn bind(&self, env: &Bindings) -> Option<Range<C>> {
        use RangeKind::*;
        match &self.kind {
            Unbounded => Some(self.clone()),
            Equals(v) => Some(Range::from_kind(Equals(substitute(v, env)), self.comparator.clone())),
            LessThan(v) => Some(Range::from_kind(LessThan(substitute(v, env)), self.comparator.clone())),
            LessThanOrEqual(v) => {
                Some(Range::from_kind(LessThanOrEqual(substitute(v, env)), self.comparator.clone()))
            }
            GreaterThan(v) => Some(Range::from_kind(GreaterThan(substitute(v, env)), self.comparator.clone())),
            GreaterThanOrEqual(v) => {
                Some(Range::from_kind(GreaterThanOrEqual(substitute(v, env)), self.comparator.clone()))
            }
            Between(lo, hi) => Range::between_bounds(lo.bind(env)?, hi.bind(env)?),
            Intersection(i) => i.bind(env, &self.comparator),
            HasElement(inner) => Some(Range::has_element(inner.bind(env)?, self.comparator.clone())),
            Subquery(q) => {
                let bound = q.bind(env);
                if bound.is_empty() {
                    None
                } else {
                    Some(Range::subquery(bound, self.comparator.clone()))
                }
            }
        }
    }

    /// Renders this range's contribution to `dimension`'s expression.
    pub fn to_expression<F: Formatter>(
        &self,
        dimension: &str,
        formatter: &F,
        context: Option<&str>,
    ) -> F::Output {
        use RangeKind::*;
        match &self.kind {
            Unbounded => formatter.and_expr(Vec::new()),
            Equals(v) => formatter.oper_expr(dimension, "=", Operand::Value(v), context),
            LessThan(v) => formatter.oper_expr(dimension, "<", Operand::Value(v), context),
            LessThanOrEqual(v) => formatter.oper_expr(dimension, "<=", Operand::Value(v), context),
            GreaterThan(v) => formatter.oper_expr(dimension, ">", Operand::Value(v), context),
            GreaterThanOrEqual(v) => formatter.oper_expr(dimension, ">=", Operand::Value(v), context),
            Between(lo, hi) => formatter.and_expr(vec![
                lo.to_expression(dimension, formatter, context),
                hi.to_expression(dimension, formatter, context),
            ]),
            Intersection(i) => i.to_expression(dimension, formatter, context),
            HasElement(inner) => {
                let rendered = inner.to_expression_bare(formatter);
                formatter.has_expr(dimension, context, rendered)
            }
            Subquery(q) => {
                let nested_context = match context {
                    Some(c) => format!("{c}.{dimension}"),
                    None => dimension.to_string(),
                };
                formatter.group(q.to_expression(formatter, Some(&nested_context)))
            }
        }
    }

    /// Renders this range without a dimension name, for use as the inner constraint of a
    /// `HasElement` (whose elements aren't themselves dimensioned). Always rendered with no
    /// surrounding dotted context: the element constraint is a fresh scope, not a continuation
    /// of whatever subquery path led to the enclosing `HasElement` dimension.
    fn to_expression_bare<F: Formatter>(&self, formatter: &F) -> F::Output {
        self.to_expression("", formatter, None)
    }
}

/// A read-only, exhaustively-matchable view of a range's shape, exposed to sibling modules
/// (currently just [`crate::json`]) that need to pattern-match a `Range` without being able to
/// see `RangeKind` itself, which stays private so `Range`'s invariants (normalized `Between`,
/// at-least-two-piece `Intersection`) can only be established through its own constructors.
pub(crate) enum RangeKindView<'a, C: Comparator> {
    Unbounded,
    Equals(&'a Value),
    LessThan(&'a Value),
    LessThanOrEqual(&'a Value),
    GreaterThan(&'a Value),
    GreaterThanOrEqual(&'a Value),
    Between(&'a Range<C>, &'a Range<C>),
    /// The intersection's contributing pieces (excluding an unbounded `known`), flattened.
    Intersection(Vec<&'a Range<C>>),
    HasElement(&'a Range<C>),
    Subquery(&'a Query<C>),
}

impl<C: Comparator> Range<C> {
    pub(crate) fn kind_view(&self) -> RangeKindView<'_, C> {
        match &self.kind {
            RangeKind::Unbounded => RangeKindView::Unbounded,
            RangeKind::Equals(v) => RangeKindView::Equals(v),
            RangeKind::LessThan(v) => RangeKindView::LessThan(v),
            RangeKind::LessThanOrEqual(v) => RangeKindView::LessThanOrEqual(v),
            RangeKind::GreaterThan(v) => RangeKindView::GreaterThan(v),
            RangeKind::GreaterThanOrEqual(v) => RangeKindView::GreaterThanOrEqual(v),
            RangeKind::Between(lo, hi) => RangeKindView::Between(lo, hi),
            RangeKind::Intersection(i) => {
                let mut parts = Vec::with_capacity(1 + i.by_param.len());
                if !i.known.is_unbounded() {
                    parts.push(i.known.as_ref());
                }
                parts.extend(i.by_param.iter().map(|(_, r)| r.as_ref()));
                RangeKindView::Intersection(parts)
            }
            RangeKind::HasElement(inner) => RangeKindView::HasElement(inner),
            RangeKind::Subquery(q) => RangeKindView::Subquery(q),
        }
    }
}

fn substitute(v: &Value, env: &Bindings) -> Value {
    match v.as_parameter() {
        Some(p) => env.get(p.name()).cloned().unwrap_or_else(|| v.clone()),
        None => v.clone(),
    }
}

impl<C: Comparator> IntersectionRange<C> {
    /// Structural equality: `known` compared directly, then the `by_param` bounds compared as
    /// an order-independent set of `(parameter, Range)` pairs, not a positional/sequential
    /// comparison.
    fn equals(&self, other: &IntersectionRange<C>) -> Result<TriBool, AlgebraError> {
        if self.by_param.len() != other.by_param.len() {
            return Ok(TriBool::False);
        }
        let mut acc = self.known.equals(&other.known)?;
        if acc.is_false() {
            return Ok(acc);
        }
        for (p, bound) in &self.by_param {
            let Some((_, other_bound)) = other.by_param.iter().find(|(op, _)| op == p) else {
                return Ok(TriBool::False);
            };
            acc = acc.and(bound.equals(other_bound)?);
            if acc.is_false() {
                return Ok(acc);
            }
        }
        Ok(acc)
    }

    fn contains_range(&self, other: &Range<C>) -> Result<TriBool, AlgebraError> {
        let mut acc = self.known.contains(other)?;
        for (_, bound) in &self.by_param {
            acc = acc.and(bound.contains(other)?);
            if acc.is_false() {
                break;
            }
        }
        Ok(acc)
    }

    /// Whether `outer` (a plain, non-`Intersection` range) contains the set of values admitted
    /// by this intersection. `True` if `outer` demonstrably contains `known` or any per-param
    /// bound (sound: this intersection is narrower than each individual bound, so containing one
    /// bound containing it too).
    ///
    /// Never concludes `False`: failing to contain any single bound in isolation does not mean
    /// `outer` fails to contain their conjunction, which is narrower still — e.g. `outer=[2,8)`
    /// contains neither piece of `known=[2,∞) ∧ byParam=(-∞,$p)` in isolation, yet does contain
    /// their conjunction `[2,$p)` whenever `$p<=8`. Reporting `Unknown` here is the sound,
    /// intentionally incomplete choice for `Intersection` containment.
    fn contained_by(&self, outer: &Range<C>) -> Result<TriBool, AlgebraError> {
        let mut results = Vec::with_capacity(1 + self.by_param.len());
        results.push(outer.contains(&self.known)?);
        for (_, bound) in &self.by_param {
            results.push(outer.contains(bound)?);
        }
        if results.iter().any(|r| r.is_true()) {
            Ok(TriBool::True)
        } else {
            Ok(TriBool::Unknown)
        }
    }

    fn contains_item(&self, item: &Item) -> TriBool {
        let mut acc = self.known.contains_item(item);
        for (_, bound) in &self.by_param {
            acc = acc.and(bound.contains_item(item));
            if acc.is_false() {
                break;
            }
        }
        acc
    }

    fn bind(&self, env: &Bindings, cmp: &C) -> Option<Range<C>> {
        let mut builder = IntersectionBuilder::new(cmp.clone());
        let known = self.known.bind(env)?;
        if !builder.add_range(&known).expect("scalar bound") {
            return None;
        }
        for (_, bound) in &self.by_param {
            let bound = bound.bind(env)?;
            if !builder.add_range(&bound).expect("scalar bound") {
                return None;
            }
        }
        builder.finish()
    }

    fn to_expression<F: Formatter>(&self, dimension: &str, formatter: &F, context: Option<&str>) -> F::Output {
        let mut parts = Vec::with_capacity(1 + self.by_param.len());
        if !matches!(self.known.kind, RangeKind::Unbounded) {
            parts.push(self.known.to_expression(dimension, formatter, context));
        }
        for (_, bound) in &self.by_param {
            parts.push(bound.to_expression(dimension, formatter, context));
        }
        formatter.and_expr(parts)
    }
}

impl<C: Comparator> fmt::Display for Range<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::formatter::DefaultFormatter;
        write!(f, "{}", self.to_expression("_", &DefaultFormatter, None))
    }
}

impl<C: Comparator> fmt::Debug for Range<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range({self})")
    }
}

#[cfg(test)]
mod tests {
    use query_values::{NaturalOrderComparator, Parameter};

    use super::*;

    fn cmp() -> NaturalOrderComparator {
        NaturalOrderComparator
    }

    #[test]
    fn between_strict_lower_inclusive_upper_at_same_point_is_empty() {
        let lo = Range::greater_than(2, cmp());
        let hi = Range::less_than_or_equal(2, cmp());
        assert!(lo.intersect(&hi).unwrap().is_none());
    }

    #[test]
    fn between_inclusive_both_sides_at_same_point_collapses_to_equals() {
        let lo = Range::greater_than_or_equal(2, cmp());
        let hi = Range::less_than_or_equal(2, cmp());
        let r = lo.intersect(&hi).unwrap().unwrap();
        assert!(r.equals(&Range::equals(2, cmp())).unwrap().is_true());
    }

    #[test]
    fn less_than_and_greater_than_same_concrete_value_is_empty() {
        let r = Range::less_than(5, cmp()).intersect(&Range::greater_than(5, cmp())).unwrap();
        assert!(r.is_none());
    }

    #[test]
    fn less_than_and_greater_than_same_parameter_is_empty() {
        let p = Parameter::named("v").unwrap();
        let lt = Range::less_than(p.clone(), cmp());
        let gt = Range::greater_than(p, cmp());
        assert!(lt.intersect(&gt).unwrap().is_none());
    }

    #[test]
    fn two_same_parameter_bounds_merge_into_one_plain_bound() {
        // Two upper bounds on the same parameter combine into a single accumulator entry with
        // an `Unbounded` `known`, which `IntersectionBuilder::finish` simplifies to the tighter
        // bound directly rather than wrapping a one-piece `Intersection`.
        let p = Parameter::named("p").unwrap();
        let r = Range::less_than(p.clone(), cmp())
            .intersect(&Range::less_than_or_equal(p.clone(), cmp()))
            .unwrap()
            .unwrap();
        assert!(r.equals(&Range::less_than(p, cmp())).unwrap().is_true());
    }

    #[test]
    fn equivalent_to_and_equals_are_distinct_notions() {
        // Mutually containing but structurally different shapes: `>=2 and <=2` vs plain `=2`.
        let a = Range::greater_than_or_equal(2, cmp()).intersect(&Range::less_than_or_equal(2, cmp())).unwrap().unwrap();
        let b = Range::equals(2, cmp());
        assert!(a.equivalent_to(&b).unwrap().is_true());
        // `a` collapsed to `Equals(2)` during intersection, so this pair is in fact structurally
        // equal too; exercise a genuinely distinct-shape pair for the structural-inequality half.
        let c = Range::between(0, 4, cmp()).unwrap();
        assert!(!b.equals(&c).unwrap().is_true());
        assert!(b.equivalent_to(&c).unwrap().is_false());
    }

    #[test]
    fn contains_is_reflexive() {
        let r = Range::between(2, 6, cmp()).unwrap();
        assert!(r.contains(&r).unwrap().is_true());
        assert!(r.equals(&r).unwrap().is_true());
    }

    #[test]
    fn has_element_mixed_with_scalar_errors() {
        let has = Range::has_element(Range::equals(1, cmp()), cmp());
        let scalar = Range::equals(1, cmp());
        assert!(has.contains(&scalar).is_err());
        assert!(has.intersect(&scalar).is_err());
    }

    #[test]
    fn bind_substitutes_parameter_and_preserves_structure() {
        let p = Parameter::named("min_age").unwrap();
        let r = Range::greater_than_or_equal(p, cmp());
        let mut env = Bindings::default();
        env.insert("min_age".to_string(), Value::Int(27));
        let bound = r.bind(&env).unwrap();
        assert_eq!(bound.to_string(), "_>=27");
    }

    #[test]
    fn bind_leaves_unmentioned_parameters_unbound() {
        let p = Parameter::named("p").unwrap();
        let r = Range::equals(p.clone(), cmp());
        let bound = r.bind(&Bindings::default()).unwrap();
        assert!(bound.equals(&Range::equals(p, cmp())).unwrap().is_true());
    }

    #[test]
    fn has_element_inner_renders_without_dotted_context() {
        use crate::formatter::DefaultFormatter;
        let inner = Range::equals(5, cmp());
        let has = Range::has_element(inner, cmp());
        // Rendered as if nested under dimension "y" via a subquery context; the inner
        // constraint must not inherit that dotted path (it isn't itself dimensioned).
        let out = has.to_expression("tags", &DefaultFormatter, Some("y"));
        assert_eq!(out, "y.tags has(=5)");
    }
}
