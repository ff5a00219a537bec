// SPDX-License-Identifier: MPL-2.0

//! An abstract, backend-agnostic algebra of structured predicates over record-like data.
//!
//! `query-algebra` lets a caller build up declarative constraints over named "dimensions"
//! (record fields), compose them with `and`/`or`, simplify the result (absorption, common-factor
//! extraction), compare two constraints for containment or equality even when some values are
//! still unbound parameters, and finally render the result through a pluggable [`Formatter`] or
//! evaluate it directly against an in-memory record.
//!
//! It deliberately does *not* know how to talk to a database, infer a schema, or prove
//! satisfiability of arbitrary parameter bindings — those are jobs for a caller-supplied
//! [`Formatter`] and a caller-supplied [`Bindings`] map, respectively. What it does own is the
//! algebra: the [`Range`] lattice (including tri-valued comparisons over parametric values via
//! [`query_values::TriBool`]), per-record constraint set ([`Cube`]) intersection and containment,
//! and the query-level disjunctive normal form ([`Query`]) with absorption and factoring.
//!
//! # Model
//!
//! - A [`Range`] constrains a single dimension: "less than 5", "between 2 and 6", "has an element
//!   equal to this nested query", and so on.
//! - A [`Cube`] is a conjunction of per-dimension `Range`s — one product term.
//! - A [`Query`] is a disjunction of `Cube`s, kept in a canonical-ish DNF: cubes absorbed by a
//!   more general sibling are dropped as soon as they're introduced.
//!
//! # Basic example
//!
//! ```
//! use query_algebra::{Constraint, DefaultFormatter, Map, Query};
//! use query_values::NaturalOrderComparator;
//!
//! let mut fields: Map<Constraint<NaturalOrderComparator>> = Map::default();
//! fields.insert("age".to_string(), Constraint::at_least(21));
//! let q = Query::from_constraints(fields, NaturalOrderComparator).unwrap();
//! assert_eq!(q.to_expression(&DefaultFormatter, None), "age>=21");
//! ```
//!
//! The constraint grammar (plain dimension→value records, `[lo, hi]` bounds, `{"$has": ...}`,
//! nested records for subqueries) lives in [`grammar`] and is the ergonomic entry point most
//! callers reach for instead of building `Range`s and `Cube`s by hand.
//!
//! # Parameters
//!
//! Any [`query_values::Value`] may be an unbound [`query_values::Parameter`] instead of a
//! concrete scalar. Every comparison that touches a parameter returns
//! [`query_values::TriBool::Unknown`] rather than guessing, and stays that way until
//! [`Query::bind`] (or [`Cube::bind`]/[`Range::bind`]) supplies a concrete value.
//!
//! # JSON
//!
//! Behind the `serde` feature, [`Range`], [`Cube`], and [`Query`] each support a compact,
//! backend-agnostic JSON encoding — see the [`json`] module.

#![warn(missing_docs)]

mod cube;
mod error;
mod formatter;
mod grammar;
mod item;
#[cfg(feature = "serde")]
mod json;
mod query;
mod range;
mod type_aliases;

pub use cube::Cube;
pub use error::AlgebraError;
pub use formatter::{DefaultFormatter, Formatter, Operand};
pub use grammar::{Constraint, Operator};
pub use item::Item;
pub use query::Query;
pub use range::Range;
pub use type_aliases::{Bindings, Map, Record};
