// SPDX-License-Identifier: MPL-2.0

//! The tri-valued comparison table: `equals`/`lt`/`le`/`gt`/`ge` lifted from a concrete
//! [`Comparator`] to operate over [`Value`]s that may be unbound [`Parameter`]s.
//!
//! |  | both concrete | same parameter | one parameter, different | both parameters, different |
//! |---|---|---|---|---|
//! | equals | `lt(a,b)∧lt(b,a)` both false | true | unknown | unknown |
//! | lt | `lt(a,b)` | false | unknown | unknown |
//! | le | `¬lt(b,a)` | true | unknown | unknown |
//! | gt | `lt(b,a)` | false | unknown | unknown |
//! | ge | `¬lt(a,b)` | true | unknown | unknown |

use crate::{Comparator, TriBool, Value};

/// Classifies a pair of values for the tri-valued table: both concrete, the same parameter
/// name, or otherwise (one or both parametric, different names).
enum Pairing<'a> {
    BothConcrete,
    SameParameter,
    Indeterminate(&'a Value, &'a Value),
}

fn classify<'a>(a: &'a Value, b: &'a Value) -> Pairing<'a> {
    match (a.as_parameter(), b.as_parameter()) {
        (None, None) => Pairing::BothConcrete,
        (Some(p), Some(q)) if p == q => Pairing::SameParameter,
        _ => Pairing::Indeterminate(a, b),
    }
}

/// Tri-valued `a == b`.
pub fn tri_equals<C: Comparator>(cmp: &C, a: &Value, b: &Value) -> TriBool {
    match classify(a, b) {
        Pairing::BothConcrete => TriBool::from(!cmp.lt(a, b) && !cmp.lt(b, a)),
        Pairing::SameParameter => TriBool::True,
        Pairing::Indeterminate(..) => TriBool::Unknown,
    }
}

/// Tri-valued `a < b`.
pub fn tri_lt<C: Comparator>(cmp: &C, a: &Value, b: &Value) -> TriBool {
    match classify(a, b) {
        Pairing::BothConcrete => TriBool::from(cmp.lt(a, b)),
        Pairing::SameParameter => TriBool::False,
        Pairing::Indeterminate(..) => TriBool::Unknown,
    }
}

/// Tri-valued `a <= b`.
pub fn tri_le<C: Comparator>(cmp: &C, a: &Value, b: &Value) -> TriBool {
    match classify(a, b) {
        Pairing::BothConcrete => TriBool::from(!cmp.lt(b, a)),
        Pairing::SameParameter => TriBool::True,
        Pairing::Indeterminate(..) => TriBool::Unknown,
    }
}

/// Tri-valued `a > b`.
pub fn tri_gt<C: Comparator>(cmp: &C, a: &Value, b: &Value) -> TriBool {
    match classify(a, b) {
        Pairing::BothConcrete => TriBool::from(cmp.lt(b, a)),
        Pairing::SameParameter => TriBool::False,
        Pairing::Indeterminate(..) => TriBool::Unknown,
    }
}

/// Tri-valued `a >= b`.
pub fn tri_ge<C: Comparator>(cmp: &C, a: &Value, b: &Value) -> TriBool {
    match classify(a, b) {
        Pairing::BothConcrete => TriBool::from(!cmp.lt(a, b)),
        Pairing::SameParameter => TriBool::True,
        Pairing::Indeterminate(..) => TriBool::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{NaturalOrderComparator, Parameter};

    #[test]
    fn concrete_values_never_unknown() {
        let c = NaturalOrderComparator;
        assert_eq!(tri_lt(&c, &Value::Int(1), &Value::Int(2)), TriBool::True);
        assert_eq!(tri_equals(&c, &Value::Int(2), &Value::Int(2)), TriBool::True);
    }

    #[test]
    fn same_parameter_is_decidable() {
        let c = NaturalOrderComparator;
        let p = Value::Param(Parameter::named("p").unwrap());
        assert_eq!(tri_equals(&c, &p, &p), TriBool::True);
        assert_eq!(tri_lt(&c, &p, &p), TriBool::False);
        assert_eq!(tri_le(&c, &p, &p), TriBool::True);
    }

    #[test]
    fn different_parameters_are_unknown() {
        let c = NaturalOrderComparator;
        let p = Value::Param(Parameter::named("p").unwrap());
        let q = Value::Param(Parameter::named("q").unwrap());
        assert_eq!(tri_equals(&c, &p, &q), TriBool::Unknown);
        assert_eq!(tri_lt(&c, &p, &q), TriBool::Unknown);
    }

    #[test]
    fn one_parameter_is_unknown() {
        let c = NaturalOrderComparator;
        let p = Value::Param(Parameter::named("p").unwrap());
        assert_eq!(tri_ge(&c, &p, &Value::Int(1)), TriBool::Unknown);
        assert_eq!(tri_ge(&c, &Value::Int(1), &p), TriBool::Unknown);
    }

    proptest! {
        #[test]
        fn le_is_lt_or_equals(a in crate::arbitrary::value_strategy(), b in crate::arbitrary::value_strategy()) {
            let c = NaturalOrderComparator;
            let le = tri_le(&c, &a, &b);
            let lt_or_eq = tri_lt(&c, &a, &b).or(tri_equals(&c, &a, &b));
            prop_assert_eq!(le, lt_or_eq);
        }

        #[test]
        fn ge_is_negation_of_lt(a in crate::arbitrary::value_strategy(), b in crate::arbitrary::value_strategy()) {
            let c = NaturalOrderComparator;
            // `ge(a, b)` and `lt(a, b)` are never simultaneously true, concrete or not.
            prop_assert!(!(tri_ge(&c, &a, &b).is_true() && tri_lt(&c, &a, &b).is_true()));
        }
    }
}
