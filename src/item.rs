// SPDX-License-Identifier: MPL-2.0

//! The shape of the data a [`Query`](crate::Query) or [`Cube`](crate::Cube) is matched
//! against via `contains_item`.
//!
//! A [`Range`](crate::Range) only ever constrains a single dimension, but that dimension's
//! value at match time might be a plain scalar, a collection (for `HasElement`), or a nested
//! record (for `Subquery`). [`Item`] is the union of those three shapes — deliberately kept
//! separate from [`query_values::Value`], which is the constraint-building vocabulary, not
//! the item-matching vocabulary.

use query_values::Value;

use crate::type_aliases::Map;

/// A value an item can hold at a given dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A plain scalar, matched by scalar `Range` variants.
    Scalar(Value),
    /// A collection of items, matched by [`Range::HasElement`](crate::Range::HasElement) when
    /// at least one element satisfies the inner range.
    Collection(Vec<Item>),
    /// A nested record, matched by [`Range::Subquery`](crate::Range::Subquery).
    Record(Map<Item>),
}

impl Item {
    /// The item as a scalar, if it is one.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Item::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// The item as a collection, if it is one.
    pub fn as_collection(&self) -> Option<&[Item]> {
        match self {
            Item::Collection(v) => Some(v),
            _ => None,
        }
    }

    /// The item as a record, if it is one.
    pub fn as_record(&self) -> Option<&Map<Item>> {
        match self {
            Item::Record(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Into<Value>> From<T> for Item {
    fn from(v: T) -> Item {
        Item::Scalar(v.into())
    }
}

impl FromIterator<Item> for Item {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Item {
        Item::Collection(iter.into_iter().collect())
    }
}
