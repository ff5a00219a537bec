// SPDX-License-Identifier: MPL-2.0

//! A [`Cube`] is a conjunction of per-dimension [`Range`]s — one row of a [`Query`](crate::Query)'s
//! disjunctive normal form.

use query_values::{Comparator, TriBool};

use crate::error::AlgebraError;
use crate::formatter::Formatter;
use crate::range::Range;
use crate::type_aliases::{Bindings, Map, Record};

/// A conjunction of dimension constraints: an item satisfies a cube iff it satisfies every
/// dimension's [`Range`]. A dimension absent from the map is unconstrained (equivalent to
/// holding [`Range::unbounded`]), mirroring how a missing key in the constraint grammar means
/// "don't care".
#[derive(Debug, Clone)]
pub struct Cube<C: Comparator> {
    dimensions: Map<Range<C>>,
}

impl<C: Comparator> Cube<C> {
    /// Builds a cube from a dimension→range map.
    pub fn new(dimensions: Map<Range<C>>) -> Cube<C> {
        Cube { dimensions }
    }

    /// An empty cube: every dimension unconstrained, so every item satisfies it.
    pub fn any() -> Cube<C> {
        Cube { dimensions: Map::default() }
    }

    /// The range constraining `dimension`, if any.
    pub fn get(&self, dimension: &str) -> Option<&Range<C>> {
        self.dimensions.get(dimension)
    }

    /// Iterates dimensions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Range<C>)> {
        self.dimensions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of constrained dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// `true` iff no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Tri-valued: does every item satisfying `other` also satisfy `self`?
    pub fn contains(&self, other: &Cube<C>) -> Result<TriBool, AlgebraError> {
        let mut acc = TriBool::True;
        for (dim, range) in self.dimensions.iter() {
            if range.is_unbounded() {
                continue;
            }
            let contained = match other.dimensions.get(dim) {
                Some(other_range) => range.contains(other_range).map_err(|e| e.with_dimension(dim))?,
                None => TriBool::False, // other is unconstrained here but self isn't, so it isn't contained.
            };
            acc = acc.and(contained);
            if acc.is_false() {
                break;
            }
        }
        Ok(acc)
    }

    /// Tri-valued: do `self` and `other` admit exactly the same items?
    ///
    /// Distinct from [`Cube::equals`]: this is mutual containment (two differently-shaped
    /// cubes that happen to accept the same items are equivalent), while `equals` is
    /// structural (same dimension set, same `Range` at each dimension).
    pub fn equivalent_to(&self, other: &Cube<C>) -> Result<TriBool, AlgebraError> {
        Ok(self.contains(other)?.and(other.contains(self)?))
    }

    /// Tri-valued structural equality: same dimension set, and the `Range` at every shared
    /// dimension is tri-equal (see [`Range::equals`]).
    pub fn equals(&self, other: &Cube<C>) -> Result<TriBool, AlgebraError> {
        if self.dimensions.len() != other.dimensions.len() {
            return Ok(TriBool::False);
        }
        let mut acc = TriBool::True;
        for (dim, range) in self.dimensions.iter() {
            let Some(other_range) = other.dimensions.get(dim) else {
                return Ok(TriBool::False);
            };
            acc = acc.and(range.equals(other_range).map_err(|e| e.with_dimension(dim))?);
            if acc.is_false() {
                return Ok(acc);
            }
        }
        Ok(acc)
    }

    /// Intersects `self` and `other` dimension-wise. `Ok(None)` means the cube is unsatisfiable
    /// (some shared dimension's ranges don't intersect).
    pub fn intersect(&self, other: &Cube<C>) -> Result<Option<Cube<C>>, AlgebraError> {
        let mut dimensions = self.dimensions.clone();
        for (dim, other_range) in other.dimensions.iter() {
            match dimensions.get(dim) {
                Some(existing) => match existing.intersect(other_range).map_err(|e| e.with_dimension(dim))? {
                    Some(r) => {
                        dimensions.insert(dim.clone(), r);
                    }
                    None => return Ok(None),
                },
                None => {
                    dimensions.insert(dim.clone(), other_range.clone());
                }
            }
        }
        Ok(Some(Cube { dimensions }))
    }

    /// Tri-valued: does `record` satisfy every dimension of this cube?
    pub fn contains_item(&self, record: &Record) -> TriBool {
        let mut acc = TriBool::True;
        for (dim, range) in self.dimensions.iter() {
            let result = match record.get(dim) {
                Some(item) => range.contains_item(item),
                None => TriBool::False,
            };
            acc = acc.and(result);
            if acc.is_false() {
                break;
            }
        }
        acc
    }

    /// Substitutes bound parameters in every dimension. `None` if any dimension becomes
    /// unsatisfiable.
    pub fn bind(&self, env: &Bindings) -> Option<Cube<C>> {
        let mut dimensions = Map::default();
        for (dim, range) in self.dimensions.iter() {
            dimensions.insert(dim.clone(), range.bind(env)?);
        }
        Some(Cube { dimensions })
    }

    /// Returns a copy of this cube with `dimension` removed, provided this cube's range on that
    /// dimension is tri-equal to `factor`. Used by [`Query::factor`](crate::Query::factor) to
    /// pull a common constraint out of every cube in a disjunction.
    pub fn remove_constraint(&self, dimension: &str, factor: &Range<C>) -> Result<Cube<C>, AlgebraError> {
        let range = self
            .dimensions
            .get(dimension)
            .ok_or_else(|| AlgebraError::FactorMismatch { dimension: dimension.to_owned() })?;
        if !range.equals(factor).map_err(|e| e.with_dimension(dimension))?.is_true() {
            return Err(AlgebraError::FactorMismatch { dimension: dimension.to_owned() });
        }
        let mut dimensions = self.dimensions.clone();
        dimensions.shift_remove(dimension);
        Ok(Cube { dimensions })
    }

    /// Renders this cube as a conjunction of its dimensions' expressions.
    pub fn to_expression<F: Formatter>(&self, formatter: &F, context: Option<&str>) -> F::Output {
        let parts = self
            .dimensions
            .iter()
            .map(|(dim, range)| range.to_expression(dim, formatter, context))
            .collect();
        formatter.and_expr(parts)
    }
}
