// SPDX-License-Identifier: MPL-2.0

//! `proptest` strategies for generating [`Value`]s and [`Parameter`]s.
//!
//! Kept in its own module, behind the `proptest` feature (or plain `cfg(test)` for this crate's
//! own tests), alongside the types it generates rather than in a separate test-only crate.

use proptest::prelude::*;

use crate::{Parameter, Value};

/// A handful of short, fixed parameter names, reused across strategies so that two independently
/// generated `Value`s sometimes do share a parameter — the interesting case for tri-valued
/// comparisons and `Intersection` bucketing — instead of almost never colliding the way a fully
/// random name would.
const PARAMETER_NAMES: [&str; 4] = ["p", "q", "x", "y"];

/// Generates a [`Parameter`] from a small fixed pool of names.
pub fn parameter_strategy() -> impl Strategy<Value = Parameter> {
    prop::sample::select(&PARAMETER_NAMES[..]).prop_map(|name| Parameter::named(name).unwrap())
}

/// Generates a concrete (non-parameter) [`Value`], biased toward small integers so that
/// generated bounds actually overlap often instead of almost always being disjoint.
pub fn concrete_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-8i64..8).prop_map(Value::Int),
        (-8i64..8).prop_map(|n| Value::Float(n as f64)),
        "[a-c]".prop_map(Value::Str),
    ]
}

/// Generates any [`Value`], including unbound parameters drawn from [`parameter_strategy`].
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => concrete_value_strategy(),
        1 => parameter_strategy().prop_map(Value::Param),
    ]
}
