// SPDX-License-Identifier: MPL-2.0

//! A [`Query`] is a disjunction of [`Cube`]s: its disjunctive normal form (DNF) representation.
//! An item satisfies a query iff it satisfies at least one of its cubes.

use log::trace;
use query_values::{Comparator, TriBool};

use crate::cube::Cube;
use crate::error::AlgebraError;
use crate::formatter::Formatter;
use crate::range::Range;
use crate::type_aliases::{Bindings, Record};

/// An ordered disjunction of [`Cube`]s.
///
/// Order is preserved (it affects nothing algebraically, but rendering is deterministic and
/// tests can assert on it) and duplicate or subsumed cubes are dropped as they're introduced —
/// see [`Query::or`] and [`Query::and`].
#[derive(Debug, Clone)]
pub struct Query<C: Comparator> {
    cubes: Vec<Cube<C>>,
}

impl<C: Comparator> Query<C> {
    /// A query matching nothing.
    pub fn none() -> Query<C> {
        Query { cubes: Vec::new() }
    }

    /// A query matching everything (a single unconstrained cube).
    pub fn any() -> Query<C> {
        Query { cubes: vec![Cube::any()] }
    }

    /// Wraps a single cube as a one-row disjunction.
    pub fn from_cube(cube: Cube<C>) -> Query<C> {
        Query { cubes: vec![cube] }
    }

    /// Builds a query directly from cubes, absorbing any that are subsumed by another.
    pub fn from_cubes(cubes: impl IntoIterator<Item = Cube<C>>) -> Query<C> {
        Query { cubes: absorb(cubes.into_iter().collect()) }
    }

    /// This query's cubes, in order.
    pub fn cubes(&self) -> &[Cube<C>] {
        &self.cubes
    }

    /// `true` iff this query matches nothing.
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Disjunction: every cube of `self` or `other`, with subsumed cubes absorbed.
    pub fn or(&self, other: &Query<C>) -> Query<C> {
        let mut cubes = self.cubes.clone();
        cubes.extend(other.cubes.iter().cloned());
        Query { cubes: absorb(cubes) }
    }

    /// Conjunction: the cross product of `self`'s and `other`'s cubes, each pair intersected,
    /// unsatisfiable pairs dropped, then absorbed (see "Open question: `and` canonicalization"
    /// in `DESIGN.md` for why this goes beyond the literal per-pair definition).
    pub fn and(&self, other: &Query<C>) -> Result<Query<C>, AlgebraError> {
        let mut cubes = Vec::with_capacity(self.cubes.len() * other.cubes.len());
        for a in &self.cubes {
            for b in &other.cubes {
                if let Some(c) = a.intersect(b)? {
                    cubes.push(c);
                }
            }
        }
        Ok(Query { cubes: absorb(cubes) })
    }

    /// Tri-valued, sound but not complete: `True` if every cube of `other` is contained by some
    /// cube of `self`; `False` if no cube of `self` contains any cube of `other` and neither
    /// comparison ever returned `Unknown`; `Unknown` otherwise. A precise decision would require
    /// reasoning about unions of cubes rather than single cubes, which this crate doesn't
    /// attempt — see `DESIGN.md`.
    pub fn contains(&self, other: &Query<C>) -> Result<TriBool, AlgebraError> {
        let mut acc = TriBool::True;
        for other_cube in &other.cubes {
            let mut witness = TriBool::False;
            for self_cube in &self.cubes {
                witness = witness.or(self_cube.contains(other_cube)?);
                if witness.is_true() {
                    break;
                }
            }
            acc = acc.and(witness);
            if acc.is_false() {
                break;
            }
        }
        Ok(acc)
    }

    /// Tri-valued mutual containment.
    ///
    /// Distinct from [`Query::equals`]: two queries describing different cube partitions of
    /// the same underlying set are `equivalent_to` but not `equals`.
    pub fn equivalent_to(&self, other: &Query<C>) -> Result<TriBool, AlgebraError> {
        Ok(self.contains(other)?.and(other.contains(self)?))
    }

    /// Tri-valued cube-multiset equality: every cube of `self` matches exactly one cube of
    /// `other` under [`Cube::equals`], with none left over on either side.
    ///
    /// Finding such a matching is a bipartite-matching problem in general (one cube might be
    /// structurally equal to several candidates); this uses a small backtracking search rather
    /// than a greedy one so it doesn't report a false `False` when an earlier, over-eager
    /// pairing would have blocked a later one. A pairing that can only be confirmed `Unknown`
    /// (e.g. two cubes whose ranges reference different, unrelated parameters) does not count
    /// as a match, so the overall result can undercount to `False` rather than `Unknown` in
    /// that corner case — `Query::equals` is meant for exact, decidable comparisons (dimension
    /// reordering, duplicate detection), not reasoning about queries that only become equal
    /// after binding.
    pub fn equals(&self, other: &Query<C>) -> Result<TriBool, AlgebraError> {
        if self.cubes.len() != other.cubes.len() {
            return Ok(TriBool::False);
        }
        let mut used = vec![false; other.cubes.len()];
        match_cubes(&self.cubes, &other.cubes, &mut used).map(TriBool::from)
    }

    /// Tri-valued: does `record` satisfy at least one cube?
    pub fn contains_item(&self, record: &Record) -> TriBool {
        TriBool::any(self.cubes.iter().map(|c| c.contains_item(record)))
    }

    /// A predicate closure equivalent to `|item| self.contains_item(item)`, suitable for use
    /// with an external iterator's `.filter()`. `TriBool::Unknown` (an item whose match depends
    /// on a parameter this query was never bound for) is treated as `false`: a strict filter
    /// has no third option, and excluding an undecidable item is the sound (if incomplete)
    /// choice — the same way `AlgebraError`'s emptiness case never silently becomes `true`.
    pub fn predicate(&self) -> impl Fn(&Record) -> bool + '_ {
        move |record| self.contains_item(record).is_true()
    }

    /// Binds every cube, dropping any that become unsatisfiable.
    pub fn bind(&self, env: &Bindings) -> Query<C> {
        Query { cubes: self.cubes.iter().filter_map(|c| c.bind(env)).collect() }
    }

    /// Scans every cube's dimensions, bucketing `(dimension, Range)` pairs by [`Range::equals`]
    /// (`True`), and returns the bucket with the highest occurrence count, provided that count
    /// is more than one. Ties are broken by first-seen order.
    pub fn find_factor(&self) -> Option<(String, Range<C>)> {
        struct Bucket<C: Comparator> {
            dimension: String,
            range: Range<C>,
            count: usize,
        }
        let mut buckets: Vec<Bucket<C>> = Vec::new();
        for cube in &self.cubes {
            for (dim, range) in cube.iter() {
                let existing = buckets
                    .iter_mut()
                    .find(|b| b.dimension == dim && range.equals(&b.range).unwrap_or(TriBool::False).is_true());
                match existing {
                    Some(b) => b.count += 1,
                    None => buckets.push(Bucket { dimension: dim.to_owned(), range: range.clone(), count: 1 }),
                }
            }
        }
        let mut best: Option<Bucket<C>> = None;
        for bucket in buckets.into_iter().filter(|b| b.count > 1) {
            let replace = match &best {
                Some(cur) => bucket.count > cur.count,
                None => true,
            };
            if replace {
                best = Some(bucket);
            }
        }
        best.map(|b| (b.dimension, b.range))
    }

    /// Partitions this query's cubes by whether `factor` dimension's range equals `range`:
    /// matching cubes have that dimension removed and land in `factored`; the rest land
    /// unchanged in `remainder`. Either half may be absent.
    pub fn factor(&self, dimension: &str, range: &Range<C>) -> (Option<Query<C>>, Option<Query<C>>) {
        let mut factored = Vec::new();
        let mut remainder = Vec::new();
        for cube in &self.cubes {
            match cube.remove_constraint(dimension, range) {
                Ok(reduced) => factored.push(reduced),
                Err(_) => remainder.push(cube.clone()),
            }
        }
        trace!(
            "factoring dimension {dimension:?}: {} cube(s) factored, {} left in the remainder",
            factored.len(),
            remainder.len()
        );
        let factored = (!factored.is_empty()).then(|| Query::from_cubes(factored));
        let remainder = (!remainder.is_empty()).then(|| Query { cubes: remainder });
        (factored, remainder)
    }

    /// Renders this query: a single cube renders as its own conjunction; multiple cubes first
    /// try [`Query::find_factor`] and, if a common constraint exists, render
    /// `factor and (factored)` combined via `or` with the `remainder`; otherwise fall back to a
    /// flat disjunction of every cube.
    pub fn to_expression<F: Formatter>(&self, formatter: &F, context: Option<&str>) -> F::Output {
        match self.cubes.len() {
            0 => formatter.or_expr(Vec::new()),
            1 => self.cubes[0].to_expression(formatter, context),
            _ => {
                if let Some((dimension, range)) = self.find_factor() {
                    let (factored, remainder) = self.factor(&dimension, &range);
                    if let Some(factored) = factored {
                        let combined = formatter.and_expr(vec![
                            range.to_expression(&dimension, formatter, context),
                            factored.to_expression(formatter, context),
                        ]);
                        return match remainder {
                            Some(remainder) => {
                                formatter.or_expr(vec![combined, remainder.to_expression(formatter, context)])
                            }
                            None => combined,
                        };
                    }
                }
                let parts = self.cubes.iter().map(|c| c.to_expression(formatter, context)).collect();
                formatter.or_expr(parts)
            }
        }
    }
}

/// Backtracking search for a perfect matching between `a` and `b` under [`Cube::equals`]
/// (`True`). `used` tracks which indices of `b` are already claimed by an earlier pairing in
/// the current search branch.
fn match_cubes<C: Comparator>(a: &[Cube<C>], b: &[Cube<C>], used: &mut [bool]) -> Result<bool, AlgebraError> {
    let Some((first, rest)) = a.split_first() else {
        return Ok(true);
    };
    for (i, candidate) in b.iter().enumerate() {
        if used[i] {
            continue;
        }
        if first.equals(candidate)?.is_true() {
            used[i] = true;
            if match_cubes(rest, b, used)? {
                return Ok(true);
            }
            used[i] = false;
        }
    }
    Ok(false)
}

/// Drops any cube that is contained by (i.e. redundant given) another cube in the list. A
/// comparison that errors (structurally incompatible ranges on some shared dimension) is
/// treated as "doesn't absorb" rather than propagated — absorption is a simplification pass,
/// not a validity check, and the same incompatibility would have already been caught when the
/// cubes were built.
fn absorb<C: Comparator>(cubes: Vec<Cube<C>>) -> Vec<Cube<C>> {
    let mut kept: Vec<Cube<C>> = Vec::with_capacity(cubes.len());
    'outer: for candidate in cubes {
        for existing in &kept {
            if existing.contains(&candidate).unwrap_or(TriBool::Unknown).is_true() {
                trace!("absorbing a cube subsumed by an existing one");
                continue 'outer;
            }
        }
        kept.retain(|existing| !candidate.contains(existing).unwrap_or(TriBool::Unknown).is_true());
        kept.push(candidate);
    }
    kept
}

#[cfg(test)]
mod tests {
    use query_values::NaturalOrderComparator;

    use super::*;
    use crate::formatter::DefaultFormatter;
    use crate::type_aliases::Map;

    fn cmp() -> NaturalOrderComparator {
        NaturalOrderComparator
    }

    fn cube(pairs: Vec<(&str, Range<NaturalOrderComparator>)>) -> Cube<NaturalOrderComparator> {
        let mut dims = Map::default();
        for (k, v) in pairs {
            dims.insert(k.to_string(), v);
        }
        Cube::new(dims)
    }

    #[test]
    fn or_absorbs_a_subsumed_cube() {
        // x<10 subsumes x<5 and y=2 (whenever y=2 holds, x<5 implies x<10).
        let wide = Query::from_cube(cube(vec![("x", Range::less_than(10, cmp()))]));
        let narrow = Query::from_cube(cube(vec![("x", Range::less_than(5, cmp())), ("y", Range::equals(2, cmp()))]));
        let combined = wide.or(&narrow);
        assert_eq!(combined.cubes().len(), 1);
        assert!(combined.cubes()[0].equals(&wide.cubes()[0]).unwrap().is_true());
    }

    #[test]
    fn or_keeps_disjoint_cubes_separate() {
        let a = Query::from_cube(cube(vec![("x", Range::equals(1, cmp()))]));
        let b = Query::from_cube(cube(vec![("x", Range::equals(2, cmp()))]));
        assert_eq!(a.or(&b).cubes().len(), 2);
    }

    #[test]
    fn and_drops_unsatisfiable_cross_products() {
        let a = Query::from_cubes(vec![
            cube(vec![("x", Range::equals(1, cmp()))]),
            cube(vec![("x", Range::equals(2, cmp()))]),
        ]);
        let b = Query::from_cube(cube(vec![("x", Range::equals(1, cmp()))]));
        let joined = a.and(&b).unwrap();
        assert_eq!(joined.cubes().len(), 1);
    }

    #[test]
    fn find_factor_picks_the_most_common_matching_dimension_range() {
        let x2 = Range::equals(2, cmp());
        let x3 = Range::equals(3, cmp());
        let q = Query::from_cubes(vec![
            cube(vec![("x", x2.clone()), ("y", Range::between(3, 4, cmp()).unwrap()), ("z", Range::equals(8, cmp()))]),
            cube(vec![("x", x2.clone()), ("y", Range::less_than(4, cmp())), ("z", Range::equals(7, cmp()))]),
            cube(vec![("x", x3), ("y", Range::greater_than_or_equal(3, cmp())), ("z", Range::equals(7, cmp()))]),
        ]);
        let (dimension, range) = q.find_factor().expect("two cubes share x=2");
        assert_eq!(dimension, "x");
        assert!(range.equals(&x2).unwrap().is_true());
    }

    #[test]
    fn factor_partitions_matching_and_non_matching_cubes() {
        let x2 = Range::equals(2, cmp());
        let x3 = Range::equals(3, cmp());
        let q = Query::from_cubes(vec![
            cube(vec![("x", x2.clone()), ("y", Range::between(3, 4, cmp()).unwrap()), ("z", Range::equals(8, cmp()))]),
            cube(vec![("x", x2.clone()), ("y", Range::less_than(4, cmp())), ("z", Range::equals(7, cmp()))]),
            cube(vec![("x", x3.clone()), ("y", Range::greater_than_or_equal(3, cmp())), ("z", Range::equals(7, cmp()))]),
        ]);
        let (factored, remainder) = q.factor("x", &x2);
        let factored = factored.expect("two cubes matched");
        let expected_factored = Query::from_cubes(vec![
            cube(vec![("y", Range::between(3, 4, cmp()).unwrap()), ("z", Range::equals(8, cmp()))]),
            cube(vec![("y", Range::less_than(4, cmp())), ("z", Range::equals(7, cmp()))]),
        ]);
        assert!(factored.equals(&expected_factored).unwrap().is_true());

        let remainder = remainder.expect("one cube left unmatched");
        let expected_remainder = Query::from_cube(cube(vec![
            ("x", x3),
            ("y", Range::greater_than_or_equal(3, cmp())),
            ("z", Range::equals(7, cmp())),
        ]));
        assert!(remainder.equals(&expected_remainder).unwrap().is_true());
    }

    #[test]
    fn equals_matches_cubes_regardless_of_order() {
        let a = Query::from_cubes(vec![
            cube(vec![("x", Range::equals(1, cmp()))]),
            cube(vec![("x", Range::equals(2, cmp()))]),
        ]);
        let b = Query::from_cubes(vec![
            cube(vec![("x", Range::equals(2, cmp()))]),
            cube(vec![("x", Range::equals(1, cmp()))]),
        ]);
        assert!(a.equals(&b).unwrap().is_true());
    }

    #[test]
    fn contains_is_sound_but_not_complete() {
        let whole = Query::from_cube(cube(vec![("x", Range::between(0, 10, cmp()).unwrap())]));
        let split = Query::from_cubes(vec![
            cube(vec![("x", Range::between(0, 5, cmp()).unwrap())]),
            cube(vec![("x", Range::between(5, 10, cmp()).unwrap())]),
        ]);
        assert!(whole.contains(&split).unwrap().is_true());
    }

    #[test]
    fn bind_drops_cubes_that_become_unsatisfiable() {
        let p = query_values::Parameter::named("p").unwrap();
        // x>=p and x<=3 is satisfiable while p is unbound, but binding p=10 crosses the bounds.
        let crosses_once_bound = Range::greater_than_or_equal(p, cmp())
            .intersect(&Range::less_than_or_equal(3, cmp()))
            .unwrap()
            .unwrap();
        let q = Query::from_cubes(vec![
            cube(vec![("x", crosses_once_bound)]),
            cube(vec![("x", Range::equals(1, cmp()))]),
        ]);
        let mut env = crate::type_aliases::Bindings::default();
        env.insert("p".to_string(), query_values::Value::Int(10));
        let bound = q.bind(&env);
        assert_eq!(bound.cubes().len(), 1);
        assert!(bound.cubes()[0].get("x").unwrap().equals(&Range::equals(1, cmp())).unwrap().is_true());
    }

    #[test]
    fn predicate_treats_unknown_as_excluded() {
        let p = query_values::Parameter::named("p").unwrap();
        let q = Query::from_cube(cube(vec![("x", Range::equals(p, cmp()))]));
        let mut record = Record::default();
        record.insert("x".to_string(), crate::item::Item::Scalar(query_values::Value::Int(1)));
        assert!(!(q.predicate())(&record));
    }

    #[test]
    fn to_expression_single_cube_has_no_disjunction() {
        let q = Query::from_cube(cube(vec![("x", Range::equals(1, cmp())), ("y", Range::equals(2, cmp()))]));
        assert_eq!(q.to_expression(&DefaultFormatter, None), "x=1 and y=2");
    }

    #[test]
    fn to_expression_empty_query_renders_empty() {
        assert_eq!(Query::<NaturalOrderComparator>::none().to_expression(&DefaultFormatter, None), "");
    }
}
