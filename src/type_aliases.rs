// SPDX-License-Identifier: MPL-2.0

//! Map type used to hold both a [`Cube`](crate::Cube)'s dimension→[`Range`](crate::Range)
//! mapping and the records passed to [`Query::contains_item`](crate::Query::contains_item).
//!
//! Dimension order is not semantically significant for equality (two cubes with the same
//! dimension/range pairs are equal regardless of insertion order), but it *is* kept for
//! deterministic rendering: `toExpression` walks dimensions in insertion order.
//! [`indexmap::IndexMap`] gives us both for free, and we hash it with a fast, non-cryptographic
//! hasher rather than the default SipHash, since dimension names are trusted, programmer-supplied
//! strings rather than adversarial input.

use std::hash::BuildHasherDefault;

use query_values::Value;

use crate::item::Item;

/// Ordered, fast-hashed string-keyed map.
pub type Map<V> = indexmap::IndexMap<String, V, BuildHasherDefault<rustc_hash::FxHasher>>;

/// A flat record: the dimension values an item has, used by
/// [`Query::contains_item`](crate::Query::contains_item) and
/// [`Cube::contains_item`](crate::Cube::contains_item).
pub type Record = Map<Item>;

/// A binding environment: concrete values to substitute for named parameters, consumed by
/// `bind` on [`Range`](crate::Range), [`Cube`](crate::Cube), and [`Query`](crate::Query).
/// Parameters absent from the map are left unbound rather than treated as an error, so a query
/// can be bound incrementally as information becomes available.
pub type Bindings = Map<Value>;
