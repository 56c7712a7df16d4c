//! Persistent (immutable) ordered set based on a height-balanced search tree.
//!
//! This module provides [`OrderedSet`], an immutable ordered set that uses
//! structural sharing for efficient operations.
//!
//! # Overview
//!
//! `OrderedSet` stores unique elements in a persistent AVL tree: a
//! self-balancing binary search tree whose nodes are never modified after
//! construction. Every mutating operation rebuilds only the search path and
//! returns a new set; the original remains valid and shares every untouched
//! subtree with the new version.
//!
//! - O(log N) insert and remove
//! - O(log N) contains / get
//! - O(log N) min/max and neighbor queries (floor, ceiling, predecessor, successor)
//! - O(log N + k) range queries where k is the number of results
//! - O(1) len and `is_empty`
//!
//! Elements are ordered by a pluggable [`TotalOrder`] relation bound at
//! construction time, defaulting to the element type's `Ord`. Two elements
//! comparing equal under the relation are the same element as far as the set
//! is concerned; the set depends on no other equality or hashing capability.
//!
//! # Examples
//!
//! ```rust
//! use arbors::OrderedSet;
//!
//! let set = OrderedSet::new().insert(3).insert(1).insert(2);
//!
//! // Elements are always enumerated in ascending order
//! let elements: Vec<&i32> = set.iter().collect();
//! assert_eq!(elements, vec![&1, &2, &3]);
//!
//! // Mutations return new versions; the original is untouched
//! let extended = set.insert(4);
//! assert_eq!(set.len(), 3);
//! assert_eq!(extended.len(), 4);
//! ```
//!
//! # Internal Structure
//!
//! The tree maintains the following invariants:
//! 1. Every element in a node's left subtree orders strictly before it, and
//!    every element in the right subtree strictly after it
//! 2. The heights of a node's children differ by at most one
//! 3. Every node caches the exact height and element count of its subtree
//!
//! These invariants keep the tree height, and with it every search path,
//! bounded by roughly `1.44 * log2(N + 1)`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Bound, RangeBounds};

use smallvec::SmallVec;

use crate::iter::{Iter, STACK_CAPACITY};
use crate::node::{self, InsertOutcome, Link, Node};
use crate::order::{NaturalOrder, TotalOrder};
use crate::policy::{DuplicateKeyError, DuplicatePolicy};

// =============================================================================
// OrderedSet Definition
// =============================================================================

/// A persistent (immutable) ordered set of unique elements.
///
/// `OrderedSet` is an immutable data structure that uses structural sharing
/// to efficiently support functional programming patterns: every operation
/// returns a new set and leaves the receiver untouched, with all unmodified
/// subtrees shared between versions. Because no version is ever written
/// after construction, any number of threads may read and derive new sets
/// from a shared root without synchronization (enable the `arc` feature for
/// `Send + Sync` sharing).
///
/// The element order is supplied by the `R` type parameter, a
/// [`TotalOrder`] relation bound when the set is constructed and carried by
/// every derived version. The default [`NaturalOrder`] uses the element
/// type's `Ord`.
///
/// # Time Complexity
///
/// | Operation        | Complexity                    |
/// |------------------|-------------------------------|
/// | `new`            | O(1)                          |
/// | `insert`         | O(log N)                      |
/// | `remove`         | O(log N)                      |
/// | `contains`/`get` | O(log N)                      |
/// | `min`/`max`      | O(log N)                      |
/// | `floor`/`ceiling`| O(log N)                      |
/// | `range`          | O(log N + k)                  |
/// | `union`          | O(min(n, m) · log(max(n, m))) |
/// | `len`            | O(1)                          |
/// | `is_empty`       | O(1)                          |
///
/// # Examples
///
/// ```rust
/// use arbors::OrderedSet;
///
/// let set = OrderedSet::new().insert(2).insert(1).insert(3);
/// assert!(set.contains(&2));
/// assert_eq!(set.min(), Some(&1));
/// assert_eq!(set.max(), Some(&3));
/// ```
#[derive(Clone)]
pub struct OrderedSet<A, R = NaturalOrder> {
    /// Root node of the tree
    root: Link<A>,
    /// The total-order relation the tree was built with
    order: R,
}

impl<A> OrderedSet<A> {
    /// Creates a new empty set ordered by the element type's `Ord`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = OrderedSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            order: NaturalOrder,
        }
    }
}

impl<A, R> OrderedSet<A, R> {
    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1); element counts are cached per subtree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).insert(2);
    /// assert_eq!(set.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        node::count(&self.root)
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let empty: OrderedSet<i32> = OrderedSet::new();
    /// assert!(empty.is_empty());
    /// assert!(!empty.insert(42).is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the backing tree: 0 for an empty set, 1 for a
    /// single element.
    ///
    /// The balance invariant guarantees `height <= 1.44 * log2(len + 1)`,
    /// which bounds the depth of every search path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).insert(2).insert(3);
    /// assert_eq!(set.height(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(node::height(&self.root))
    }

    /// Returns the least element, or `None` for an empty set.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(3).insert(1).insert(2);
    /// assert_eq!(set.min(), Some(&1));
    /// ```
    #[must_use]
    pub fn min(&self) -> Option<&A> {
        node::min(&self.root)
    }

    /// Returns the greatest element, or `None` for an empty set.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(3).insert(1).insert(2);
    /// assert_eq!(set.max(), Some(&3));
    /// ```
    #[must_use]
    pub fn max(&self) -> Option<&A> {
        node::max(&self.root)
    }

    /// Returns a lazy iterator over the elements in ascending order.
    ///
    /// Traversal uses an explicit stack rather than call-stack recursion, so
    /// it is restartable (a fresh call starts over) and its pace is set by
    /// the consumer. The iterator is double-ended: `rev()` consumes the set
    /// in descending order.
    ///
    /// # Complexity
    ///
    /// O(1) to create, O(N) for a full traversal, O(log N) auxiliary space.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(2).insert(3).insert(1);
    /// let ascending: Vec<i32> = set.iter().copied().collect();
    /// assert_eq!(ascending, vec![1, 2, 3]);
    ///
    /// let descending: Vec<i32> = set.iter().rev().copied().collect();
    /// assert_eq!(descending, vec![3, 2, 1]);
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> OrderedSetIterator<'_, A> {
        OrderedSetIterator {
            inner: Iter::new(&self.root),
        }
    }

    /// Folds the elements left-to-right (ascending order).
    ///
    /// # Arguments
    ///
    /// * `init` - The initial accumulator value
    /// * `function` - Combines the accumulator with each element in turn
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).insert(2).insert(3);
    /// let sum = set.fold(0, |accumulator, element| accumulator + element);
    /// assert_eq!(sum, 6);
    /// ```
    pub fn fold<B, F>(&self, init: B, function: F) -> B
    where
        F: FnMut(B, &A) -> B,
    {
        self.iter().fold(init, function)
    }

    /// Folds the elements right-to-left (descending order).
    ///
    /// # Arguments
    ///
    /// * `init` - The initial accumulator value
    /// * `function` - Combines each element with the accumulator in turn
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).insert(2).insert(3);
    /// let concatenated = set.fold_back(String::new(), |element, accumulator| {
    ///     accumulator + &element.to_string()
    /// });
    /// assert_eq!(concatenated, "321");
    /// ```
    pub fn fold_back<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(&A, B) -> B,
    {
        self.iter()
            .rev()
            .fold(init, |accumulator, element| function(element, accumulator))
    }
}

impl<A: Clone + Ord> OrderedSet<A> {
    /// Creates a set containing a single element, ordered naturally.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::singleton(42);
    /// assert_eq!(set.len(), 1);
    /// assert!(set.contains(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: A) -> Self {
        Self::new().insert(element)
    }

    /// Bulk-loads a sequence under an explicit duplicate policy.
    ///
    /// Under [`DuplicatePolicy::Reject`] the load is all-or-nothing: the
    /// first duplicate aborts with an error carrying the offending element,
    /// and no partially built set is returned.
    ///
    /// # Arguments
    ///
    /// * `iterable` - The elements to load
    /// * `policy` - Applied uniformly to every insertion
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] if `policy` is `Reject` and the
    /// sequence contains two elements comparing equal.
    ///
    /// # Complexity
    ///
    /// O(M · log M) for M input elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{DuplicatePolicy, OrderedSet};
    ///
    /// let set = OrderedSet::from_iter_with_policy([3, 1, 2], DuplicatePolicy::Reject).unwrap();
    /// assert_eq!(set.len(), 3);
    ///
    /// let rejected = OrderedSet::from_iter_with_policy([1, 1], DuplicatePolicy::Reject);
    /// assert_eq!(rejected.unwrap_err().into_key(), 1);
    /// ```
    pub fn from_iter_with_policy<I>(
        iterable: I,
        policy: DuplicatePolicy,
    ) -> Result<Self, DuplicateKeyError<A>>
    where
        I: IntoIterator<Item = A>,
    {
        Self::new().extend_with_policy(iterable, policy)
    }
}

// =============================================================================
// Core Operations
// =============================================================================

impl<A, R> OrderedSet<A, R>
where
    A: Clone,
    R: TotalOrder<A> + Clone,
{
    /// Creates a new empty set over the given total-order relation.
    ///
    /// The relation is carried by every version derived from this set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{OrderedSet, OrderWith};
    ///
    /// let descending = OrderWith::new(|left: &i32, right: &i32| right.cmp(left));
    /// let set = OrderedSet::with_order(descending).insert(1).insert(2);
    /// assert_eq!(set.min(), Some(&2));
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_order(order: R) -> Self {
        Self { root: None, order }
    }

    /// Creates a set containing a single element over the given relation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::order::NaturalOrder;
    /// use arbors::{OrderedSet, Reversed};
    ///
    /// let set = OrderedSet::singleton_with_order(42, Reversed::new(NaturalOrder));
    /// assert_eq!(set.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton_with_order(element: A, order: R) -> Self {
        Self::with_order(order).insert(element)
    }

    /// Returns `true` if an element comparing equal to `element` is present.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).insert(2);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&3));
    /// ```
    #[inline]
    #[must_use]
    pub fn contains(&self, element: &A) -> bool {
        self.get(element).is_some()
    }

    /// Returns a reference to the stored element comparing equal to
    /// `element`, or `None` if absent.
    ///
    /// The stored element may be observably different from the probe when
    /// the relation compares only part of the element (for example, ordering
    /// by one field).
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).insert(2);
    /// assert_eq!(set.get(&2), Some(&2));
    /// assert_eq!(set.get(&3), None);
    /// ```
    #[must_use]
    pub fn get(&self, element: &A) -> Option<&A> {
        node::find(&self.root, &|stored| self.order.compare(element, stored))
    }

    /// Inserts an element, keeping the stored one if an equal element is
    /// already present (idempotent insertion).
    ///
    /// When the element is already present the original set is returned
    /// unchanged and no new nodes are allocated. Otherwise only the nodes on
    /// the search path are rebuilt; everything else is shared with the
    /// receiver.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(42);
    /// assert_eq!(set.len(), 1);
    ///
    /// // Duplicate insertion is idempotent
    /// let unchanged = set.insert(42);
    /// assert_eq!(unchanged.len(), 1);
    /// ```
    #[must_use]
    pub fn insert(&self, element: A) -> Self {
        match self.insert_with_policy(element, DuplicatePolicy::Ignore) {
            Ok(inserted) => inserted,
            // Ignore never rejects; keep the original on the impossible path.
            Err(_) => self.clone(),
        }
    }

    /// Inserts an element, replacing the stored one if an equal element is
    /// already present.
    ///
    /// Useful when elements carry data the order relation does not compare,
    /// and the newest representative should win.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{OrderedSet, OrderWith};
    ///
    /// // Pairs ordered by their first component only.
    /// let by_id = OrderWith::new(|left: &(i32, &str), right: &(i32, &str)| {
    ///     left.0.cmp(&right.0)
    /// });
    ///
    /// let set = OrderedSet::with_order(by_id).insert((1, "old"));
    /// let replaced = set.replace((1, "new"));
    ///
    /// assert_eq!(replaced.get(&(1, "")), Some(&(1, "new")));
    /// assert_eq!(set.get(&(1, "")), Some(&(1, "old"))); // Original unchanged
    /// ```
    #[must_use]
    pub fn replace(&self, element: A) -> Self {
        match self.insert_with_policy(element, DuplicatePolicy::Overwrite) {
            Ok(replaced) => replaced,
            // Overwrite never rejects; keep the original on the impossible path.
            Err(_) => self.clone(),
        }
    }

    /// Inserts an element, failing if an equal element is already present.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] carrying the offered element when an
    /// equal element exists.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1);
    ///
    /// let extended = set.try_insert(2).unwrap();
    /// assert_eq!(extended.len(), 2);
    ///
    /// let error = extended.try_insert(1).unwrap_err();
    /// assert_eq!(error.into_key(), 1);
    /// ```
    pub fn try_insert(&self, element: A) -> Result<Self, DuplicateKeyError<A>> {
        self.insert_with_policy(element, DuplicatePolicy::Reject)
    }

    /// Inserts an element under an explicit duplicate policy.
    ///
    /// This is the uniform entry point behind [`insert`](Self::insert),
    /// [`replace`](Self::replace), and [`try_insert`](Self::try_insert).
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] only under [`DuplicatePolicy::Reject`]
    /// when an equal element exists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{DuplicatePolicy, OrderedSet};
    ///
    /// let set = OrderedSet::new().insert(1);
    /// let unchanged = set.insert_with_policy(1, DuplicatePolicy::Ignore).unwrap();
    /// assert_eq!(unchanged.len(), 1);
    /// ```
    pub fn insert_with_policy(
        &self,
        element: A,
        policy: DuplicatePolicy,
    ) -> Result<Self, DuplicateKeyError<A>> {
        let order = &self.order;
        match node::insert(
            &self.root,
            element,
            &|left, right| order.compare(left, right),
            policy,
        ) {
            InsertOutcome::Added(root) | InsertOutcome::Replaced(root) => {
                Ok(self.from_root(Some(root)))
            }
            InsertOutcome::Unchanged => Ok(self.clone()),
            InsertOutcome::Duplicate(element) => Err(DuplicateKeyError::new(element)),
        }
    }

    /// Inserts every element of a sequence (idempotent insertion).
    ///
    /// # Complexity
    ///
    /// O(M · log(N + M)) for M input elements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).extend([2, 3, 2]);
    /// assert_eq!(set.len(), 3);
    /// ```
    #[must_use]
    pub fn extend<I>(&self, iterable: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        iterable
            .into_iter()
            .fold(self.clone(), |accumulator, element| {
                accumulator.insert(element)
            })
    }

    /// Inserts every element of a sequence under one duplicate policy.
    ///
    /// Under [`DuplicatePolicy::Reject`] the operation is all-or-nothing:
    /// the first duplicate aborts with an error and the receiver is
    /// unaffected (as every operation leaves it).
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] if `policy` is `Reject` and any element
    /// of the sequence compares equal to a present element or to an earlier
    /// element of the sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{DuplicatePolicy, OrderedSet};
    ///
    /// let set = OrderedSet::new().insert(1);
    /// let error = set
    ///     .extend_with_policy([2, 1], DuplicatePolicy::Reject)
    ///     .unwrap_err();
    /// assert_eq!(error.into_key(), 1);
    /// assert_eq!(set.len(), 1); // Receiver untouched
    /// ```
    pub fn extend_with_policy<I>(
        &self,
        iterable: I,
        policy: DuplicatePolicy,
    ) -> Result<Self, DuplicateKeyError<A>>
    where
        I: IntoIterator<Item = A>,
    {
        let mut accumulator = self.clone();
        for element in iterable {
            accumulator = accumulator.insert_with_policy(element, policy)?;
        }
        Ok(accumulator)
    }

    /// Removes the element comparing equal to `element`, returning a new set.
    ///
    /// Removing an absent element is a no-op, not an error: the original set
    /// is returned unchanged.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(1).insert(2).insert(3);
    /// let removed = set.remove(&2);
    ///
    /// assert_eq!(removed.len(), 2);
    /// assert!(!removed.contains(&2));
    /// assert_eq!(set.len(), 3); // Original unchanged
    ///
    /// // Absent elements are ignored
    /// assert_eq!(set.remove(&9).len(), 3);
    /// ```
    #[must_use]
    pub fn remove(&self, element: &A) -> Self {
        match node::remove(&self.root, &|stored| self.order.compare(element, stored)) {
            Some(root) => self.from_root(root),
            None => self.clone(),
        }
    }

    /// Returns the element equal to `element`, or the greatest element
    /// ordering before it.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(10).insert(20).insert(30);
    /// assert_eq!(set.floor(&20), Some(&20));
    /// assert_eq!(set.floor(&25), Some(&20));
    /// assert_eq!(set.floor(&5), None);
    /// ```
    #[must_use]
    pub fn floor(&self, element: &A) -> Option<&A> {
        node::floor(&self.root, &|stored| self.order.compare(element, stored))
    }

    /// Returns the element equal to `element`, or the least element ordering
    /// after it.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(10).insert(20).insert(30);
    /// assert_eq!(set.ceiling(&20), Some(&20));
    /// assert_eq!(set.ceiling(&25), Some(&30));
    /// assert_eq!(set.ceiling(&35), None);
    /// ```
    #[must_use]
    pub fn ceiling(&self, element: &A) -> Option<&A> {
        node::ceiling(&self.root, &|stored| self.order.compare(element, stored))
    }

    /// Returns the greatest element ordering strictly before `element`.
    ///
    /// The probe element itself need not be present.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(10).insert(20).insert(30);
    /// assert_eq!(set.predecessor(&20), Some(&10));
    /// assert_eq!(set.predecessor(&25), Some(&20));
    /// assert_eq!(set.predecessor(&10), None);
    /// ```
    #[must_use]
    pub fn predecessor(&self, element: &A) -> Option<&A> {
        node::predecessor(&self.root, &|stored| self.order.compare(element, stored))
    }

    /// Returns the least element ordering strictly after `element`.
    ///
    /// The probe element itself need not be present.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().insert(10).insert(20).insert(30);
    /// assert_eq!(set.successor(&20), Some(&30));
    /// assert_eq!(set.successor(&15), Some(&20));
    /// assert_eq!(set.successor(&30), None);
    /// ```
    #[must_use]
    pub fn successor(&self, element: &A) -> Option<&A> {
        node::successor(&self.root, &|stored| self.order.compare(element, stored))
    }

    /// Returns a lazy iterator over the elements within the given bounds,
    /// in ascending order.
    ///
    /// Subtrees that cannot intersect the bounds are skipped rather than
    /// visited. An empty interval (lower bound above the upper bound) yields
    /// an empty sequence, not an error.
    ///
    /// # Complexity
    ///
    /// O(log N + k) where k is the number of elements yielded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().extend([1, 2, 3, 4, 5]);
    ///
    /// let middle: Vec<i32> = set.range(2..=4).copied().collect();
    /// assert_eq!(middle, vec![2, 3, 4]);
    ///
    /// let tail: Vec<i32> = set.range(4..).copied().collect();
    /// assert_eq!(tail, vec![4, 5]);
    ///
    /// let empty: Vec<i32> = set.range(4..=2).copied().collect();
    /// assert!(empty.is_empty());
    /// ```
    pub fn range<B>(&self, bounds: B) -> OrderedSetRangeIterator<'_, A, R>
    where
        B: RangeBounds<A>,
    {
        OrderedSetRangeIterator::new(
            &self.root,
            &self.order,
            bounds.start_bound().cloned(),
            bounds.end_bound().cloned(),
        )
    }

    /// Returns the union of two sets: every element present in either.
    ///
    /// Realized by inserting each element of the smaller set into the larger
    /// one under the ignore policy, reusing the insertion and rebalancing
    /// machinery rather than a linear sorted merge. On elements present in
    /// both sets, the larger set's representative is kept.
    ///
    /// Both sets are assumed to be ordered by equivalent relations.
    ///
    /// # Complexity
    ///
    /// O(min(n, m) · log(max(n, m)))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let odds = OrderedSet::new().extend([1, 3, 5]);
    /// let low = OrderedSet::new().extend([2, 3, 4]);
    ///
    /// let union = odds.union(&low);
    /// assert_eq!(union.len(), 5);
    /// let elements: Vec<i32> = union.iter().copied().collect();
    /// assert_eq!(elements, vec![1, 2, 3, 4, 5]);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut result = larger.clone();
        for element in smaller.iter() {
            result = result.insert(element.clone());
        }
        result
    }

    /// Returns the intersection of two sets: elements present in both.
    ///
    /// Iterates the smaller set, keeping the elements found in the larger.
    /// Both sets are assumed to be ordered by equivalent relations.
    ///
    /// # Complexity
    ///
    /// O(min(n, m) · log(max(n, m)))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let odds = OrderedSet::new().extend([1, 3, 5]);
    /// let low = OrderedSet::new().extend([2, 3, 4]);
    ///
    /// let common = odds.intersection(&low);
    /// assert_eq!(common.len(), 1);
    /// assert!(common.contains(&3));
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut result = self.cleared();
        for element in smaller.iter() {
            if larger.contains(element) {
                result = result.insert(element.clone());
            }
        }
        result
    }

    /// Returns the difference: elements of `self` not present in `other`.
    ///
    /// # Complexity
    ///
    /// O(n · log m) where n = `self.len()` and m = `other.len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let all = OrderedSet::new().extend([1, 2, 3, 4]);
    /// let even = OrderedSet::new().extend([2, 4]);
    ///
    /// let odd: Vec<i32> = all.difference(&even).iter().copied().collect();
    /// assert_eq!(odd, vec![1, 3]);
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = self.cleared();
        for element in self.iter() {
            if !other.contains(element) {
                result = result.insert(element.clone());
            }
        }
        result
    }

    /// Returns the symmetric difference: elements present in exactly one of
    /// the two sets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let left = OrderedSet::new().extend([1, 2, 3]);
    /// let right = OrderedSet::new().extend([2, 3, 4]);
    ///
    /// let exclusive: Vec<i32> = left.symmetric_difference(&right).iter().copied().collect();
    /// assert_eq!(exclusive, vec![1, 4]);
    /// ```
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let self_only = self.difference(other);
        let other_only = other.difference(self);
        self_only.union(&other_only)
    }

    /// Returns `true` if every element of `self` is present in `other`.
    ///
    /// # Complexity
    ///
    /// O(n · log m)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let subset = OrderedSet::new().extend([1, 2]);
    /// let superset = OrderedSet::new().extend([1, 2, 3]);
    ///
    /// assert!(subset.is_subset(&superset));
    /// assert!(!superset.is_subset(&subset));
    /// ```
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is present in `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let superset = OrderedSet::new().extend([1, 2, 3]);
    /// let subset = OrderedSet::new().extend([1, 2]);
    ///
    /// assert!(superset.is_superset(&subset));
    /// ```
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if `self` is a subset of `other` and the two sets are
    /// not equal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let subset = OrderedSet::new().extend([1, 2]);
    /// let superset = OrderedSet::new().extend([1, 2, 3]);
    ///
    /// assert!(subset.is_proper_subset(&superset));
    /// assert!(!subset.is_proper_subset(&subset));
    /// ```
    #[must_use]
    pub fn is_proper_subset(&self, other: &Self) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    /// Returns `true` if `self` is a superset of `other` and the two sets
    /// are not equal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let superset = OrderedSet::new().extend([1, 2, 3]);
    /// let subset = OrderedSet::new().extend([1, 2]);
    ///
    /// assert!(superset.is_proper_superset(&subset));
    /// ```
    #[must_use]
    pub fn is_proper_superset(&self, other: &Self) -> bool {
        other.is_proper_subset(self)
    }

    /// Returns `true` if the two sets have no elements in common.
    ///
    /// # Complexity
    ///
    /// O(min(n, m) · log(max(n, m)))
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let low = OrderedSet::new().extend([1, 2]);
    /// let high = OrderedSet::new().extend([3, 4]);
    ///
    /// assert!(low.is_disjoint(&high));
    /// assert!(!low.is_disjoint(&low.insert(3).difference(&high)));
    /// ```
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        !smaller.iter().any(|element| larger.contains(element))
    }

    /// Returns `true` if the two sets share at least one element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let low = OrderedSet::new().extend([1, 2, 3]);
    /// let high = OrderedSet::new().extend([3, 4]);
    ///
    /// assert!(low.overlaps(&high));
    /// ```
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.is_disjoint(other)
    }

    /// Returns `true` if the two sets contain the same elements, compared
    /// through the order relation alone.
    ///
    /// Unlike the `PartialEq` implementation this requires no equality
    /// capability from the element type: two elements are the same when they
    /// compare `Ordering::Equal`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let forward = OrderedSet::new().extend([1, 2, 3]);
    /// let backward = OrderedSet::new().extend([3, 2, 1]);
    ///
    /// assert!(forward.set_eq(&backward));
    /// assert!(!forward.set_eq(&forward.remove(&2)));
    /// ```
    #[must_use]
    pub fn set_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(left, right)| self.order.compare(left, right) == Ordering::Equal)
    }

    /// Rebuilds the set through a transformation, ordering the images by
    /// their natural order.
    ///
    /// Elements mapping to equal images collapse to one.
    ///
    /// # Complexity
    ///
    /// O(N · log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().extend([1, 2, 3]);
    /// let doubled: Vec<i32> = set.map(|element| element * 2).iter().copied().collect();
    /// assert_eq!(doubled, vec![2, 4, 6]);
    /// ```
    #[must_use]
    pub fn map<B, F>(&self, transform: F) -> OrderedSet<B>
    where
        B: Clone + Ord,
        F: FnMut(&A) -> B,
    {
        self.iter().map(transform).collect()
    }

    /// Rebuilds the set through a transformation under an explicitly
    /// supplied order relation for the image type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{OrderedSet, OrderWith};
    ///
    /// let set = OrderedSet::new().extend([1, 2, 3]);
    /// let descending = OrderWith::new(|left: &i32, right: &i32| right.cmp(left));
    ///
    /// let negated = set.map_with_order(|element| -element, descending);
    /// let elements: Vec<i32> = negated.iter().copied().collect();
    /// assert_eq!(elements, vec![-1, -2, -3]);
    /// ```
    #[must_use]
    pub fn map_with_order<B, R2, F>(&self, mut transform: F, order: R2) -> OrderedSet<B, R2>
    where
        B: Clone,
        R2: TotalOrder<B> + Clone,
        F: FnMut(&A) -> B,
    {
        let mut result = OrderedSet::with_order(order);
        for element in self.iter() {
            result = result.insert(transform(element));
        }
        result
    }

    /// Rebuilds the set retaining only the elements matching the predicate.
    ///
    /// # Complexity
    ///
    /// O(N · log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().extend([1, 2, 3, 4]);
    /// let even: Vec<i32> = set.filter(|element| element % 2 == 0).iter().copied().collect();
    /// assert_eq!(even, vec![2, 4]);
    /// ```
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&A) -> bool,
    {
        let mut result = self.cleared();
        for element in self.iter() {
            if predicate(element) {
                result = result.insert(element.clone());
            }
        }
        result
    }

    /// Splits the set into the elements matching the predicate and the rest.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedSet;
    ///
    /// let set = OrderedSet::new().extend([1, 2, 3, 4]);
    /// let (even, odd) = set.partition(|element| element % 2 == 0);
    ///
    /// assert_eq!(even.len(), 2);
    /// assert_eq!(odd.len(), 2);
    /// ```
    #[must_use]
    pub fn partition<F>(&self, mut predicate: F) -> (Self, Self)
    where
        F: FnMut(&A) -> bool,
    {
        let mut matching = self.cleared();
        let mut rest = self.cleared();

        for element in self.iter() {
            if predicate(element) {
                matching = matching.insert(element.clone());
            } else {
                rest = rest.insert(element.clone());
            }
        }

        (matching, rest)
    }

    /// Wraps a rebuilt root, validating invariants in diagnostic builds.
    fn from_root(&self, root: Link<A>) -> Self {
        let derived = Self {
            root,
            order: self.order.clone(),
        };
        node::validate(&derived.root, &|left, right| {
            derived.order.compare(left, right)
        });
        derived
    }

    /// An empty set carrying this set's order relation.
    fn cleared(&self) -> Self {
        Self {
            root: None,
            order: self.order.clone(),
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over the elements of an [`OrderedSet`] in ascending order.
pub struct OrderedSetIterator<'a, A> {
    inner: Iter<'a, A>,
}

impl<'a, A> Iterator for OrderedSetIterator<'a, A> {
    type Item = &'a A;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A> DoubleEndedIterator for OrderedSetIterator<'_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<A> ExactSizeIterator for OrderedSetIterator<'_, A> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<A> std::iter::FusedIterator for OrderedSetIterator<'_, A> {}

/// A lazy range iterator over an [`OrderedSet`], ascending within bounds.
///
/// Subtrees that cannot intersect the bounds are never descended into.
pub struct OrderedSetRangeIterator<'a, A, R> {
    stack: SmallVec<[&'a Node<A>; STACK_CAPACITY]>,
    lower: Bound<A>,
    upper: Bound<A>,
    order: &'a R,
}

impl<'a, A, R> OrderedSetRangeIterator<'a, A, R>
where
    R: TotalOrder<A>,
{
    fn new(root: &'a Link<A>, order: &'a R, lower: Bound<A>, upper: Bound<A>) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            lower,
            upper,
            order,
        };
        iterator.descend(root);
        iterator
    }

    fn below_lower(&self, element: &A) -> bool {
        match &self.lower {
            Bound::Unbounded => false,
            Bound::Included(bound) => self.order.compare(element, bound) == Ordering::Less,
            Bound::Excluded(bound) => self.order.compare(element, bound) != Ordering::Greater,
        }
    }

    fn above_upper(&self, element: &A) -> bool {
        match &self.upper {
            Bound::Unbounded => false,
            Bound::Included(bound) => self.order.compare(element, bound) == Ordering::Greater,
            Bound::Excluded(bound) => self.order.compare(element, bound) != Ordering::Less,
        }
    }

    /// Stacks the nodes of `link` that fall within the bounds, skipping any
    /// subtree that provably cannot intersect them.
    fn descend(&mut self, mut link: &'a Link<A>) {
        while let Some(node) = link.as_deref() {
            if self.below_lower(&node.element) {
                // The node and its whole left subtree are below the range.
                link = &node.right;
            } else if self.above_upper(&node.element) {
                // The node and its whole right subtree are above the range.
                link = &node.left;
            } else {
                self.stack.push(node);
                link = &node.left;
            }
        }
    }
}

impl<'a, A, R> Iterator for OrderedSetRangeIterator<'a, A, R>
where
    R: TotalOrder<A>,
{
    type Item = &'a A;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(&node.right);
        Some(&node.element)
    }
}

impl<A, R> std::iter::FusedIterator for OrderedSetRangeIterator<'_, A, R> where R: TotalOrder<A> {}

/// An owning iterator over the elements of an [`OrderedSet`].
pub struct OrderedSetIntoIterator<A> {
    elements: std::vec::IntoIter<A>,
}

impl<A> Iterator for OrderedSetIntoIterator<A> {
    type Item = A;

    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.elements.size_hint()
    }
}

impl<A> DoubleEndedIterator for OrderedSetIntoIterator<A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.elements.next_back()
    }
}

impl<A> ExactSizeIterator for OrderedSetIntoIterator<A> {
    fn len(&self) -> usize {
        self.elements.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<A, R: Default> Default for OrderedSet<A, R> {
    #[inline]
    fn default() -> Self {
        Self {
            root: None,
            order: R::default(),
        }
    }
}

impl<A: Clone + Ord> FromIterator<A> for OrderedSet<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::new().extend(iter)
    }
}

impl<A: Clone, R> IntoIterator for OrderedSet<A, R> {
    type Item = A;
    type IntoIter = OrderedSetIntoIterator<A>;

    fn into_iter(self) -> Self::IntoIter {
        let elements: Vec<A> = self.iter().cloned().collect();
        OrderedSetIntoIterator {
            elements: elements.into_iter(),
        }
    }
}

impl<'a, A, R> IntoIterator for &'a OrderedSet<A, R> {
    type Item = &'a A;
    type IntoIter = OrderedSetIterator<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<A: PartialEq, R> PartialEq for OrderedSet<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(left, right)| left == right)
    }
}

impl<A: Eq, R> Eq for OrderedSet<A, R> {}

/// Computes a hash value for this set.
///
/// The length is hashed first, then each element in ascending order, so the
/// insertion history does not affect the hash and equal sets hash equally.
impl<A: Hash, R> Hash for OrderedSet<A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<A: fmt::Debug, R> fmt::Debug for OrderedSet<A, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<A: fmt::Display, R> fmt::Display for OrderedSet<A, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// Send/Sync posture: shared `Rc` roots must stay on one thread; the `arc`
// feature switches the links to `Arc` and the set becomes shareable.
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(OrderedSet<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(OrderedSet<i32>: Send, Sync);

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<A, R> serde::Serialize for OrderedSet<A, R>
where
    A: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for element in self.iter() {
            sequence.serialize_element(element)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedSetVisitor<A, R> {
    marker: std::marker::PhantomData<(A, R)>,
}

#[cfg(feature = "serde")]
impl<A, R> OrderedSetVisitor<A, R> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, A, R> serde::de::Visitor<'de> for OrderedSetVisitor<A, R>
where
    A: serde::Deserialize<'de> + Clone,
    R: TotalOrder<A> + Clone + Default,
{
    type Value = OrderedSet<A, R>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence of set elements")
    }

    fn visit_seq<S>(self, mut access: S) -> Result<Self::Value, S::Error>
    where
        S: serde::de::SeqAccess<'de>,
    {
        let mut set = OrderedSet::with_order(R::default());
        while let Some(element) = access.next_element()? {
            set = set.insert(element);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, A, R> serde::Deserialize<'de> for OrderedSet<A, R>
where
    A: serde::Deserialize<'de> + Clone,
    R: TotalOrder<A> + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderedSetVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
