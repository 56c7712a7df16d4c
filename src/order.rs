//! Pluggable total-order relations.
//!
//! The ordered collections in this crate never compare elements directly:
//! every comparison goes through a [`TotalOrder`] relation chosen when the
//! collection is constructed and carried by every derived version. The
//! relation is the collection's *only* capability over its elements; there
//! is no dependency on hashing or reference identity.
//!
//! Most code uses [`NaturalOrder`], a zero-sized relation that delegates to
//! `Ord` and is the default type parameter of [`OrderedSet`](crate::OrderedSet)
//! and [`OrderedMap`](crate::OrderedMap). Custom orderings are supplied as
//! values: a comparison closure wrapped in [`OrderWith`], or an existing
//! relation inverted with [`Reversed`].
//!
//! # Examples
//!
//! ```rust
//! use arbors::{OrderedSet, OrderWith};
//!
//! // Order strings by length instead of lexicographically.
//! let by_length = OrderWith::new(|left: &String, right: &String| {
//!     left.len().cmp(&right.len())
//! });
//!
//! let set = OrderedSet::with_order(by_length)
//!     .insert("three".to_string())
//!     .insert("a".to_string())
//!     .insert("to".to_string());
//!
//! let ordered: Vec<&String> = set.iter().collect();
//! assert_eq!(ordered, vec!["a", "to", "three"]);
//! ```

use std::cmp::Ordering;

/// A total-order comparison capability between two values of type `A`.
///
/// Implementations must describe a total order: antisymmetric, transitive,
/// and total. Two values comparing `Ordering::Equal` are treated as the same
/// element by every collection built over the relation, which has no other
/// notion of equality.
///
/// Relations are ordinary values bound at construction time, so the same
/// collection type serves any key type with any ordering.
pub trait TotalOrder<A> {
    /// Compares `left` against `right`, returning their relative order.
    fn compare(&self, left: &A, right: &A) -> Ordering;
}

/// The natural order of a type, as defined by its `Ord` implementation.
///
/// This is the default relation for both collections and is zero-sized, so
/// carrying it in every tree version costs nothing.
///
/// # Examples
///
/// ```rust
/// use arbors::order::{NaturalOrder, TotalOrder};
/// use std::cmp::Ordering;
///
/// assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
/// assert_eq!(NaturalOrder.compare(&2, &2), Ordering::Equal);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<A: Ord> TotalOrder<A> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &A, right: &A) -> Ordering {
        left.cmp(right)
    }
}

/// A total order supplied as a comparison function value.
///
/// Wraps any `Fn(&A, &A) -> Ordering` so an ordering can be written inline
/// at the construction site. The closure must describe a total order; the
/// collections cannot detect a lawless comparison.
///
/// # Examples
///
/// ```rust
/// use arbors::{OrderedSet, OrderWith};
///
/// let descending = OrderWith::new(|left: &i32, right: &i32| right.cmp(left));
/// let set = OrderedSet::with_order(descending).insert(1).insert(3).insert(2);
///
/// let ordered: Vec<i32> = set.iter().copied().collect();
/// assert_eq!(ordered, vec![3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct OrderWith<F>(F);

impl<F> OrderWith<F> {
    /// Wraps a comparison function as a total-order relation.
    #[inline]
    pub const fn new(function: F) -> Self {
        Self(function)
    }
}

impl<A, F> TotalOrder<A> for OrderWith<F>
where
    F: Fn(&A, &A) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &A, right: &A) -> Ordering {
        (self.0)(left, right)
    }
}

/// A total order that inverts another relation.
///
/// Useful for descending collections without writing the inverted comparison
/// by hand.
///
/// # Examples
///
/// ```rust
/// use arbors::{OrderedSet, Reversed};
/// use arbors::order::NaturalOrder;
///
/// let set = OrderedSet::with_order(Reversed::new(NaturalOrder))
///     .insert(1)
///     .insert(3)
///     .insert(2);
///
/// assert_eq!(set.min(), Some(&3));
/// assert_eq!(set.max(), Some(&1));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reversed<R>(R);

impl<R> Reversed<R> {
    /// Wraps a relation, inverting every comparison it makes.
    #[inline]
    pub const fn new(inner: R) -> Self {
        Self(inner)
    }
}

impl<A, R> TotalOrder<A> for Reversed<R>
where
    R: TotalOrder<A>,
{
    #[inline]
    fn compare(&self, left: &A, right: &A) -> Ordering {
        self.0.compare(right, left)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 2, Ordering::Less)]
    #[case(2, 2, Ordering::Equal)]
    #[case(3, 2, Ordering::Greater)]
    fn test_natural_order_matches_ord(
        #[case] left: i32,
        #[case] right: i32,
        #[case] expected: Ordering,
    ) {
        assert_eq!(NaturalOrder.compare(&left, &right), expected);
    }

    #[rstest]
    fn test_order_with_delegates_to_function() {
        let by_length = OrderWith::new(|left: &&str, right: &&str| left.len().cmp(&right.len()));
        assert_eq!(by_length.compare(&"ab", &"c"), Ordering::Greater);
        assert_eq!(by_length.compare(&"ab", &"cd"), Ordering::Equal);
    }

    #[rstest]
    fn test_reversed_inverts_comparisons() {
        let reversed = Reversed::new(NaturalOrder);
        assert_eq!(reversed.compare(&1, &2), Ordering::Greater);
        assert_eq!(reversed.compare(&2, &1), Ordering::Less);
        assert_eq!(reversed.compare(&2, &2), Ordering::Equal);
    }

    #[rstest]
    fn test_double_reversed_restores_order() {
        let restored = Reversed::new(Reversed::new(NaturalOrder));
        assert_eq!(restored.compare(&1, &2), Ordering::Less);
    }
}
