// SPDX-License-Identifier: MPL-2.0

//! Scalar value model, parameter identity, and tri-valued comparison for the `query-algebra`
//! crate.
//!
//! This is the leaf, domain-agnostic layer that the range algebra is built on top of, kept free
//! of any notion of dimensions, cubes, or queries so it can be tested (and reasoned about) in
//! isolation.
//!
//! - [`Value`]: the scalar values a dimension can be constrained to, including an unbound
//!   [`Parameter`] variant.
//! - [`Parameter`]: a named placeholder resolved later via a binding environment.
//! - [`TriBool`]: `True | False | Unknown`, the result of any comparison that might involve an
//!   unbound parameter.
//! - [`Comparator`]: the pluggable total order over concrete values; [`NaturalOrderComparator`]
//!   is the default.
//! - [`tri`]: lifts a [`Comparator`]'s `lt` into the full tri-valued `equals`/`lt`/`le`/`gt`/`ge`
//!   table.

#[cfg(any(feature = "proptest", test))]
pub mod arbitrary;
mod comparator;
mod parameter;
pub mod tri;
mod tribool;
mod value;

pub use comparator::{Comparator, NaturalOrderComparator};
pub use parameter::{InvalidParameterName, Parameter};
pub use tribool::TriBool;
pub use value::Value;
