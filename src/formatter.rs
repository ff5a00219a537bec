// SPDX-License-Identifier: MPL-2.0

//! The pluggable rendering surface a [`Query`](crate::Query) is emitted through.
//!
//! A `Formatter` knows nothing about the algebra; it only assembles already-decided pieces
//! (an `and` of sub-expressions, an `or` of sub-expressions, a single `dimension op value`
//! comparison) into whatever the target language looks like. This crate never picks a backend
//! formatter for you — that choice (SQL, Mongo, a search DSL, …) is an external collaborator;
//! [`DefaultFormatter`] is the one reference implementation, a minimal human-readable
//! expression string used by the crate's own tests.

use std::fmt;

use query_values::Value;

/// Either a plain scalar value or an already-rendered sub-expression, passed to
/// [`Formatter::oper_expr`].
///
/// A dynamically typed host language can pass `operExpr(dimension, operator, value, context)`
/// a single duck-typed `value` argument, where `value` might be a number, a string, or a
/// nested rendered expression depending on the operator. Rust needs that duck-typing made
/// explicit, so `value` becomes this small enum: a literal [`Value`] for the five comparison
/// operators, or a rendered `Output` for `has`/`contains`, whose "value" is really the inner
/// range's own rendering.
pub enum Operand<'a, O> {
    /// A literal scalar operand, used by `=`, `<`, `<=`, `>`, `>=`.
    Value(&'a Value),
    /// An already-rendered sub-expression, used by `has` and `contains`.
    Expr(O),
}

/// Supplies the three rendering primitives a [`Query`](crate::Query) is printed through, plus
/// two grouping primitives ([`Formatter::group`], [`Formatter::has_expr`]) that make the
/// `HasElement`/`Subquery` range kinds renderable without assuming `Output` is a string.
pub trait Formatter {
    /// The rendered representation: a `String` for [`DefaultFormatter`], or e.g. an AST node
    /// type for a backend-specific formatter.
    type Output;

    /// Joins sub-expressions with conjunction. Called with one item per cube dimension.
    fn and_expr(&self, parts: Vec<Self::Output>) -> Self::Output;

    /// Joins sub-expressions with disjunction. Called with one item per cube in a `Query`.
    fn or_expr(&self, parts: Vec<Self::Output>) -> Self::Output;

    /// Renders a single `dimension op value` comparison.
    ///
    /// `operator` is always one of the exact tokens `=`, `<`, `<=`, `>`, `>=`, `has`,
    /// `contains`. `context`, when present, is the dotted path of enclosing subquery
    /// dimensions (e.g. `"y.beta"`), which the default formatter joins to `dimension` with
    /// `.`.
    fn oper_expr(
        &self,
        dimension: &str,
        operator: &str,
        value: Operand<'_, Self::Output>,
        context: Option<&str>,
    ) -> Self::Output;

    /// Wraps an already-rendered expression in whatever this language uses for grouping
    /// (parentheses, for the default formatter). Used to render a nested
    /// [`Subquery`](crate::Range::Subquery).
    fn group(&self, inner: Self::Output) -> Self::Output;

    /// Renders `dimension has(inner)` for a [`HasElement`](crate::Range::HasElement) range,
    /// where `inner` is the bare (dimension-less) rendering of the element constraint.
    fn has_expr(&self, dimension: &str, context: Option<&str>, inner: Self::Output) -> Self::Output {
        self.oper_expr(dimension, "has", Operand::Expr(inner), context)
    }

    /// Renders `dimension contains(inner)`, an alternative to the dotted-context grouping
    /// [`Range::to_expression`](crate::Range::to_expression) uses for a nested
    /// [`Subquery`](crate::Range::Subquery). Not called by [`DefaultFormatter`] (whose reference
    /// rendering nests dotted dimension paths instead), but kept as part of the trait so a
    /// backend formatter that prefers a `contains(...)` clause over
    /// dotted paths has a matching primitive to implement, using the `"contains"` operator
    /// token this crate reserves for exactly that.
    fn contains_expr(&self, dimension: &str, context: Option<&str>, inner: Self::Output) -> Self::Output {
        self.oper_expr(dimension, "contains", Operand::Expr(inner), context)
    }
}

/// The reference [`Formatter`]: renders to a human-readable `String`.
///
/// Strings are double-quoted, `or` is parenthesized, `and` is a bare `" and "` join, and a
/// subquery dimension concatenates into its parent's dotted path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

fn joined_dimension(dimension: &str, context: Option<&str>) -> String {
    match context {
        Some(c) if !c.is_empty() => format!("{c}.{dimension}"),
        _ => dimension.to_string(),
    }
}

impl Formatter for DefaultFormatter {
    type Output = String;

    fn and_expr(&self, parts: Vec<String>) -> String {
        parts.join(" and ")
    }

    fn or_expr(&self, parts: Vec<String>) -> String {
        match parts.len() {
            0 => String::new(),
            1 => parts.into_iter().next().unwrap(),
            _ => format!("({})", parts.join(" or ")),
        }
    }

    fn oper_expr(
        &self,
        dimension: &str,
        operator: &str,
        value: Operand<'_, String>,
        context: Option<&str>,
    ) -> String {
        let full_dim = joined_dimension(dimension, context);
        match value {
            Operand::Value(v) => format!("{full_dim}{operator}{v}"),
            Operand::Expr(inner) => format!("{full_dim} {operator}({inner})"),
        }
    }

    fn group(&self, inner: String) -> String {
        format!("({inner})")
    }
}

impl fmt::Debug for Operand<'_, String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(v) => write!(f, "Value({v})"),
            Operand::Expr(e) => write!(f, "Expr({e})"),
        }
    }
}
