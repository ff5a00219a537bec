// SPDX-License-Identifier: MPL-2.0

//! The three-valued logic used throughout the query algebra.
//!
//! Any comparison or containment check that involves an unbound [`Parameter`](crate::Parameter)
//! cannot be decided until binding, but it also must not silently collapse to `false`: that
//! would make the engine unsound (it would discard cubes that could still match once bound).
//! [`TriBool`] keeps "unknown" distinct from both booleans so callers are forced to decide
//! how to treat it.

use std::ops::Not;

/// Result of a comparison or containment check that may involve unbound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriBool {
    /// The check holds for every possible binding.
    True,
    /// The check fails for every possible binding.
    False,
    /// The check depends on a binding that hasn't happened yet.
    Unknown,
}

impl TriBool {
    /// `true` iff this is [`TriBool::True`].
    pub fn is_true(self) -> bool {
        matches!(self, TriBool::True)
    }

    /// `true` iff this is [`TriBool::False`].
    pub fn is_false(self) -> bool {
        matches!(self, TriBool::False)
    }

    /// `true` iff this is [`TriBool::Unknown`].
    pub fn is_unknown(self) -> bool {
        matches!(self, TriBool::Unknown)
    }

    /// Three-valued conjunction: `False` dominates, then `Unknown`, then `True`.
    pub fn and(self, other: TriBool) -> TriBool {
        match (self, other) {
            (TriBool::False, _) | (_, TriBool::False) => TriBool::False,
            (TriBool::Unknown, _) | (_, TriBool::Unknown) => TriBool::Unknown,
            (TriBool::True, TriBool::True) => TriBool::True,
        }
    }

    /// Three-valued disjunction: `True` dominates, then `Unknown`, then `False`.
    pub fn or(self, other: TriBool) -> TriBool {
        match (self, other) {
            (TriBool::True, _) | (_, TriBool::True) => TriBool::True,
            (TriBool::Unknown, _) | (_, TriBool::Unknown) => TriBool::Unknown,
            (TriBool::False, TriBool::False) => TriBool::False,
        }
    }

    /// Folds an iterator of tri-bools the way a witness search does: `True` short-circuits
    /// the fold conceptually (callers typically `find` instead), `Unknown` is remembered
    /// unless a later `True` supersedes it, and an empty iterator is `False`.
    pub fn any(values: impl IntoIterator<Item = TriBool>) -> TriBool {
        let mut acc = TriBool::False;
        for v in values {
            acc = acc.or(v);
            if acc.is_true() {
                break;
            }
        }
        acc
    }

    /// Folds an iterator of tri-bools as a conjunction; an empty iterator is `True`.
    pub fn all(values: impl IntoIterator<Item = TriBool>) -> TriBool {
        let mut acc = TriBool::True;
        for v in values {
            acc = acc.and(v);
            if acc.is_false() {
                break;
            }
        }
        acc
    }
}

impl Not for TriBool {
    type Output = TriBool;

    fn not(self) -> TriBool {
        match self {
            TriBool::True => TriBool::False,
            TriBool::False => TriBool::True,
            TriBool::Unknown => TriBool::Unknown,
        }
    }
}

impl From<bool> for TriBool {
    fn from(b: bool) -> TriBool {
        if b {
            TriBool::True
        } else {
            TriBool::False
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_dominance() {
        assert_eq!(TriBool::False.and(TriBool::Unknown), TriBool::False);
        assert_eq!(TriBool::True.and(TriBool::Unknown), TriBool::Unknown);
        assert_eq!(TriBool::True.and(TriBool::True), TriBool::True);
    }

    #[test]
    fn or_dominance() {
        assert_eq!(TriBool::True.or(TriBool::Unknown), TriBool::True);
        assert_eq!(TriBool::False.or(TriBool::Unknown), TriBool::Unknown);
        assert_eq!(TriBool::False.or(TriBool::False), TriBool::False);
    }

    #[test]
    fn not_fixes_unknown() {
        assert_eq!(!TriBool::Unknown, TriBool::Unknown);
        assert_eq!(!TriBool::True, TriBool::False);
    }

    #[test]
    fn any_all_empty() {
        assert_eq!(TriBool::any(std::iter::empty()), TriBool::False);
        assert_eq!(TriBool::all(std::iter::empty()), TriBool::True);
    }
}
