//! Set algebra over ordered sets: union, intersection, difference, symmetric
//! difference, and the subset/superset predicates.
//!
//! Every function borrows its operands and returns a freshly built result, so
//! the operands are never modified. `BTreeSet` gives the results a
//! deterministic (sorted) iteration order, but nothing here depends on that
//! order.
use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// The set type the algebra works over.
pub type Set<T> = BTreeSet<T>;

/// Which operand of a binary set operation we're talking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The left-hand (`A`) operand
    First,
    /// The right-hand (`B`) operand
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

/// The only way a set operation can fail is by not being given a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SetError {
    /// An operand was absent
    #[error("invalid argument: the {0} set operand is missing")]
    MissingOperand(Side),
}

/// Returns the elements found in `a`, in `b`, or in both.
#[must_use]
pub fn union<T: Ord + Clone>(a: &Set<T>, b: &Set<T>) -> Set<T> {
    a.union(b).cloned().collect()
}

/// Returns the elements found in both `a` and `b`.
#[must_use]
pub fn intersection<T: Ord + Clone>(a: &Set<T>, b: &Set<T>) -> Set<T> {
    a.intersection(b).cloned().collect()
}

/// Returns the elements of `a` that are not in `b`.
#[must_use]
pub fn difference<T: Ord + Clone>(a: &Set<T>, b: &Set<T>) -> Set<T> {
    a.difference(b).cloned().collect()
}

/// Returns the elements found in exactly one of `a` and `b`: those in the
/// union that aren't in the intersection. Building it out of the other three
/// operations keeps all four consistent with one another.
#[must_use]
pub fn sym_difference<T: Ord + Clone>(a: &Set<T>, b: &Set<T>) -> Set<T> {
    difference(&union(a, b), &intersection(a, b))
}

/// Is every element of `a` also an element of `b`?
#[must_use]
pub fn is_subset<T: Ord>(a: &Set<T>, b: &Set<T>) -> bool {
    a.iter().all(|x| b.contains(x))
}

/// Is every element of `b` also an element of `a`?
#[must_use]
pub fn is_superset<T: Ord>(a: &Set<T>, b: &Set<T>) -> bool {
    is_subset(b, a)
}

/// Checks that both operands are present, complaining about the first one
/// missing.
pub fn require<'a, T>(
    a: Option<&'a Set<T>>,
    b: Option<&'a Set<T>>,
) -> Result<(&'a Set<T>, &'a Set<T>), SetError> {
    let a = a.ok_or(SetError::MissingOperand(Side::First))?;
    let b = b.ok_or(SetError::MissingOperand(Side::Second))?;
    Ok((a, b))
}

/// Names one of the six binary set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOp {
    /// `union(A, B)`
    Union,
    /// `intersection(A, B)`
    Intersect,
    /// `difference(A, B)`
    Diff,
    /// `sym_difference(A, B)`
    SymDiff,
    /// `is_subset(A, B)`
    Subset,
    /// `is_superset(A, B)`
    Superset,
}

/// What a `SetOp` produces: the first four operations return a set, the last
/// two a truth value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The result of `Union`, `Intersect`, `Diff` or `SymDiff`
    Set(Set<T>),
    /// The result of `Subset` or `Superset`
    Verdict(bool),
}

impl SetOp {
    /// Every operation, in the order they're listed in help text.
    pub const ALL: [SetOp; 6] = [
        SetOp::Union,
        SetOp::Intersect,
        SetOp::Diff,
        SetOp::SymDiff,
        SetOp::Subset,
        SetOp::Superset,
    ];

    /// The name used on the command line and in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SetOp::Union => "union",
            SetOp::Intersect => "intersect",
            SetOp::Diff => "diff",
            SetOp::SymDiff => "sym-diff",
            SetOp::Subset => "subset",
            SetOp::Superset => "superset",
        }
    }

    /// Applies the operation to `a` and `b`.
    #[must_use]
    pub fn apply<T: Ord + Clone>(self, a: &Set<T>, b: &Set<T>) -> Outcome<T> {
        match self {
            SetOp::Union => Outcome::Set(union(a, b)),
            SetOp::Intersect => Outcome::Set(intersection(a, b)),
            SetOp::Diff => Outcome::Set(difference(a, b)),
            SetOp::SymDiff => Outcome::Set(sym_difference(a, b)),
            SetOp::Subset => Outcome::Verdict(is_subset(a, b)),
            SetOp::Superset => Outcome::Verdict(is_superset(a, b)),
        }
    }

    /// Like `apply`, but for operands that might not be there.
    pub fn apply_checked<T: Ord + Clone>(
        self,
        a: Option<&Set<T>>,
        b: Option<&Set<T>>,
    ) -> Result<Outcome<T>, SetError> {
        let (a, b) = require(a, b)?;
        Ok(self.apply(a, b))
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use proptest::collection::btree_set;
    use proptest::prelude::*;

    fn set<T: Ord + Clone>(items: &[T]) -> Set<T> {
        items.iter().cloned().collect()
    }

    #[test]
    fn overlapping_letters() {
        let a = set(&['A', 'B', 'C', 'D']);
        let b = set(&['C', 'D', 'E', 'F']);
        assert_eq!(union(&a, &b), set(&['A', 'B', 'C', 'D', 'E', 'F']));
        assert_eq!(intersection(&a, &b), set(&['C', 'D']));
        assert_eq!(difference(&a, &b), set(&['A', 'B']));
        assert_eq!(sym_difference(&a, &b), set(&['A', 'B', 'E', 'F']));
    }

    #[test]
    fn removing_an_element_makes_a_proper_subset() {
        let a = set(&['A', 'B', 'C', 'D']);
        let mut c3 = a.clone();
        c3.remove(&'D');
        assert_eq!(c3, set(&['A', 'B', 'C']));
        assert!(is_subset(&c3, &a));
        assert!(!is_subset(&a, &c3));
        assert!(is_superset(&a, &c3));
        assert!(!is_superset(&c3, &a));
    }

    #[test]
    fn empty_operand() {
        let a: Set<u32> = Set::new();
        let b = set(&[1, 2]);
        assert_eq!(union(&a, &b), set(&[1, 2]));
        assert!(intersection(&a, &b).is_empty());
        assert!(difference(&a, &b).is_empty());
        assert_eq!(difference(&b, &a), set(&[1, 2]));
        assert!(is_subset(&a, &b));
        assert!(!is_subset(&b, &a));
    }

    #[test]
    fn same_set_as_both_operands() {
        let a = set(&['X', 'Y']);
        assert_eq!(union(&a, &a), a);
        assert_eq!(intersection(&a, &a), a);
        assert!(difference(&a, &a).is_empty());
        assert!(sym_difference(&a, &a).is_empty());
        assert!(is_subset(&a, &a) && is_superset(&a, &a));
    }

    #[test]
    fn operands_are_left_alone() {
        let a = set(&[1, 2, 3]);
        let b = set(&[3, 4]);
        for op in SetOp::ALL {
            let _ = op.apply(&a, &b);
        }
        assert_eq!(a, set(&[1, 2, 3]));
        assert_eq!(b, set(&[3, 4]));
    }

    #[test]
    fn missing_operands_are_reported_left_first() {
        let a = set(&[1]);
        assert_eq!(
            SetOp::Union.apply_checked(None, Some(&a)),
            Err(SetError::MissingOperand(Side::First))
        );
        assert_eq!(
            SetOp::Union.apply_checked(Some(&a), None),
            Err(SetError::MissingOperand(Side::Second))
        );
        assert_eq!(
            SetOp::Subset.apply_checked::<i32>(None, None),
            Err(SetError::MissingOperand(Side::First))
        );
        assert_eq!(SetOp::Superset.apply_checked(Some(&a), Some(&a)), Ok(Outcome::Verdict(true)));
    }

    #[test]
    fn error_message_names_the_operand() {
        let message = SetError::MissingOperand(Side::Second).to_string();
        assert_eq!(message, "invalid argument: the second set operand is missing");
    }

    #[test]
    fn apply_matches_the_free_functions() {
        let a = set(&["a", "b", "c"]);
        let b = set(&["b", "c", "d"]);
        assert_eq!(SetOp::Union.apply(&a, &b), Outcome::Set(union(&a, &b)));
        assert_eq!(SetOp::Intersect.apply(&a, &b), Outcome::Set(intersection(&a, &b)));
        assert_eq!(SetOp::Diff.apply(&a, &b), Outcome::Set(difference(&a, &b)));
        assert_eq!(SetOp::SymDiff.apply(&a, &b), Outcome::Set(set(&["a", "d"])));
        assert_eq!(SetOp::Subset.apply(&a, &b), Outcome::Verdict(false));
        assert_eq!(SetOp::Superset.apply(&a, &b), Outcome::Verdict(false));
    }

    fn small_set() -> impl Strategy<Value = Set<u8>> {
        btree_set(0u8..32, 0..12)
    }

    proptest! {
        #[test]
        fn union_and_intersection_commute(a in small_set(), b in small_set()) {
            prop_assert_eq!(union(&a, &b), union(&b, &a));
            prop_assert_eq!(intersection(&a, &b), intersection(&b, &a));
        }

        #[test]
        fn union_and_intersection_associate(a in small_set(), b in small_set(), c in small_set()) {
            prop_assert_eq!(union(&a, &union(&b, &c)), union(&union(&a, &b), &c));
            prop_assert_eq!(
                intersection(&a, &intersection(&b, &c)),
                intersection(&intersection(&a, &b), &c)
            );
        }

        #[test]
        fn self_difference_is_empty(a in small_set()) {
            prop_assert!(difference(&a, &a).is_empty());
            prop_assert!(sym_difference(&a, &a).is_empty());
        }

        #[test]
        fn sym_difference_commutes_and_is_in_exactly_one(a in small_set(), b in small_set()) {
            let sd = sym_difference(&a, &b);
            prop_assert_eq!(&sd, &sym_difference(&b, &a));
            for x in &sd {
                prop_assert!(a.contains(x) != b.contains(x));
            }
        }

        #[test]
        fn containment_laws(a in small_set(), b in small_set()) {
            prop_assert!(is_subset(&a, &a));
            prop_assert!(is_superset(&a, &a));
            prop_assert!(is_subset(&a, &union(&a, &b)));
            let both = intersection(&a, &b);
            prop_assert!(is_subset(&both, &a) && is_subset(&both, &b));
            prop_assert_eq!(is_superset(&a, &b), is_subset(&b, &a));
            if is_subset(&a, &b) {
                prop_assert_eq!(union(&a, &b), b.clone());
            }
        }
    }
}
