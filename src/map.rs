//! Persistent (immutable) ordered map based on a height-balanced search tree.
//!
//! This module provides [`OrderedMap`], an immutable ordered map that uses
//! structural sharing for efficient operations.
//!
//! # Overview
//!
//! `OrderedMap` is the keyed variant of the tree behind
//! [`OrderedSet`](crate::OrderedSet): each tree element is a key/value entry
//! and the order relation compares keys only, so values never participate in
//! placement. All operations return new maps without modifying the original,
//! and structural sharing keeps derivation cheap.
//!
//! - O(log N) get, insert, and remove
//! - O(log N) min/max and keyed neighbor queries
//! - O(log N + k) range queries where k is the number of results
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use arbors::OrderedMap;
//!
//! let map = OrderedMap::new()
//!     .insert(3, "three")
//!     .insert(1, "one")
//!     .insert(2, "two");
//!
//! // Entries are always in ascending key order
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! // Mutations return new versions; the original is untouched
//! let updated = map.insert(1, "ONE");
//! assert_eq!(map.get(&1), Some(&"one"));
//! assert_eq!(updated.get(&1), Some(&"ONE"));
//! ```

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
// Entry Definition
// =============================================================================

/// One key/value pair stored in the tree. Placement compares keys only.
#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// A persistent (immutable) ordered map.
///
/// `OrderedMap` shares its engine with [`OrderedSet`](crate::OrderedSet):
/// entries live in a height-balanced search tree ordered by key through a
/// pluggable [`TotalOrder`] relation (defaulting to the key type's `Ord`),
/// and every mutation rebuilds only the search path, sharing all untouched
/// subtrees with the receiver.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log N)          |
/// | `insert`       | O(log N)          |
/// | `remove`       | O(log N)          |
/// | `contains_key` | O(log N)          |
/// | `min`/`max`    | O(log N)          |
/// | `range`        | O(log N + k)      |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
///
/// # Examples
///
/// ```rust
/// use arbors::OrderedMap;
///
/// let map = OrderedMap::singleton(42, "answer");
/// assert_eq!(map.get(&42), Some(&"answer"));
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V, R = NaturalOrder> {
    /// Root node of the tree
    root: Link<Entry<K, V>>,
    /// The total-order relation over keys
    order: R,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates a new empty map ordered by the key type's `Ord`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map: OrderedMap<i32, String> = OrderedMap::new();
    /// assert!(map.is_empty());
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

impl<K, V, R> OrderedMap<K, V, R> {
    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1); entry counts are cached per subtree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one").insert(2, "two");
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        node::count(&self.root)
    }

    /// Returns `true` if the map contains no entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let empty: OrderedMap<i32, String> = OrderedMap::new();
    /// assert!(empty.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the backing tree: 0 for an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, 'a').insert(2, 'b').insert(3, 'c');
    /// assert_eq!(map.height(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(node::height(&self.root))
    }

    /// Returns the entry with the least key, or `None` for an empty map.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(3, "three").insert(1, "one");
    /// assert_eq!(map.min(), Some((&1, &"one")));
    /// ```
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        node::min(&self.root).map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the entry with the greatest key, or `None` for an empty map.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(3, "three").insert(1, "one");
    /// assert_eq!(map.max(), Some((&3, &"three")));
    /// ```
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        node::max(&self.root).map(|entry| (&entry.key, &entry.value))
    }

    /// Returns a lazy iterator over the entries in ascending key order.
    ///
    /// Traversal uses an explicit stack, so it is restartable and its pace
    /// is set by the consumer; `rev()` consumes entries in descending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(2, "two").insert(1, "one");
    /// let entries: Vec<(&i32, &&str)> = map.iter().collect();
    /// assert_eq!(entries, vec![(&1, &"one"), (&2, &"two")]);
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> OrderedMapIterator<'_, K, V> {
        OrderedMapIterator {
            inner: Iter::new(&self.root),
        }
    }

    /// Returns an iterator over the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(3, 'c').insert(1, 'a').insert(2, 'b');
    /// let keys: Vec<&i32> = map.keys().collect();
    /// assert_eq!(keys, vec![&1, &2, &3]);
    /// ```
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, 10).insert(2, 20).insert(3, 30);
    /// let sum: i32 = map.values().sum();
    /// assert_eq!(sum, 60);
    /// ```
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Folds the entries left-to-right (ascending key order).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, 10).insert(2, 20);
    /// let total = map.fold(0, |accumulator, _key, value| accumulator + value);
    /// assert_eq!(total, 30);
    /// ```
    pub fn fold<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter()
            .fold(init, |accumulator, (key, value)| {
                function(accumulator, key, value)
            })
    }

    /// Folds the entries right-to-left (descending key order).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one").insert(2, "two");
    /// let keys = map.fold_back(Vec::new(), |key, _value, mut accumulator| {
    ///     accumulator.push(*key);
    ///     accumulator
    /// });
    /// assert_eq!(keys, vec![2, 1]);
    /// ```
    pub fn fold_back<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(&K, &V, B) -> B,
    {
        self.iter()
            .rev()
            .fold(init, |accumulator, (key, value)| {
                function(key, value, accumulator)
            })
    }
}

impl<K: Clone + Ord, V: Clone> OrderedMap<K, V> {
    /// Creates a map containing a single entry, keyed naturally.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::singleton(42, "answer");
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Bulk-loads key/value pairs under an explicit duplicate policy.
    ///
    /// Under [`DuplicatePolicy::Reject`] the load is all-or-nothing: the
    /// first duplicate key aborts with an error and no partially built map
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] if `policy` is `Reject` and the
    /// sequence contains two entries with equal keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{DuplicatePolicy, OrderedMap};
    ///
    /// let rejected = OrderedMap::from_iter_with_policy(
    ///     [(1, "one"), (1, "uno")],
    ///     DuplicatePolicy::Reject,
    /// );
    /// assert_eq!(rejected.unwrap_err().into_key(), 1);
    /// ```
    pub fn from_iter_with_policy<I>(
        iterable: I,
        policy: DuplicatePolicy,
    ) -> Result<Self, DuplicateKeyError<K>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::new().extend_with_policy(iterable, policy)
    }
}

// =============================================================================
// Core Operations
// =============================================================================

impl<K, V, R> OrderedMap<K, V, R>
where
    K: Clone,
    V: Clone,
    R: TotalOrder<K> + Clone,
{
    /// Creates a new empty map over the given key order relation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{OrderedMap, OrderWith};
    ///
    /// let descending = OrderWith::new(|left: &i32, right: &i32| right.cmp(left));
    /// let map = OrderedMap::with_order(descending).insert(1, 'a').insert(2, 'b');
    /// assert_eq!(map.min(), Some((&2, &'b')));
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_order(order: R) -> Self {
        Self { root: None, order }
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one");
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|entry| &entry.value)
    }

    /// Returns the stored key/value pair for `key`.
    ///
    /// The stored key may be observably different from the probe when the
    /// relation compares only part of it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one");
    /// assert_eq!(map.get_key_value(&1), Some((&1, &"one")));
    /// ```
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find(key).map(|entry| (&entry.key, &entry.value))
    }

    /// Returns `true` if the map contains an entry for `key`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a key/value pair, replacing the value if the key is present.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let original = OrderedMap::new().insert(1, "one");
    /// let updated = original.insert(1, "ONE");
    ///
    /// assert_eq!(original.get(&1), Some(&"one")); // Original unchanged
    /// assert_eq!(updated.get(&1), Some(&"ONE"));  // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        match self.insert_with_policy(key, value, DuplicatePolicy::Overwrite) {
            Ok(inserted) => inserted,
            // Overwrite never rejects; keep the original on the impossible path.
            Err(_) => self.clone(),
        }
    }

    /// Inserts a key/value pair only if the key is absent.
    ///
    /// When the key is present the original map is returned unchanged and
    /// no new nodes are allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one");
    /// let unchanged = map.insert_if_absent(1, "uno");
    /// assert_eq!(unchanged.get(&1), Some(&"one"));
    /// ```
    #[must_use]
    pub fn insert_if_absent(&self, key: K, value: V) -> Self {
        match self.insert_with_policy(key, value, DuplicatePolicy::Ignore) {
            Ok(inserted) => inserted,
            // Ignore never rejects; keep the original on the impossible path.
            Err(_) => self.clone(),
        }
    }

    /// Inserts a key/value pair, failing if the key is already present.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] carrying the offered key when an entry
    /// with an equal key exists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one");
    /// assert!(map.try_insert(2, "two").is_ok());
    /// assert_eq!(map.try_insert(1, "uno").unwrap_err().into_key(), 1);
    /// ```
    pub fn try_insert(&self, key: K, value: V) -> Result<Self, DuplicateKeyError<K>> {
        self.insert_with_policy(key, value, DuplicatePolicy::Reject)
    }

    /// Inserts a key/value pair under an explicit duplicate policy.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] only under [`DuplicatePolicy::Reject`]
    /// when an entry with an equal key exists.
    pub fn insert_with_policy(
        &self,
        key: K,
        value: V,
        policy: DuplicatePolicy,
    ) -> Result<Self, DuplicateKeyError<K>> {
        let order = &self.order;
        match node::insert(
            &self.root,
            Entry { key, value },
            &|left: &Entry<K, V>, right: &Entry<K, V>| order.compare(&left.key, &right.key),
            policy,
        ) {
            InsertOutcome::Added(root) | InsertOutcome::Replaced(root) => {
                Ok(self.from_root(Some(root)))
            }
            InsertOutcome::Unchanged => Ok(self.clone()),
            InsertOutcome::Duplicate(entry) => Err(DuplicateKeyError::new(entry.key)),
        }
    }

    /// Inserts every pair of a sequence under one duplicate policy.
    ///
    /// Under [`DuplicatePolicy::Reject`] the operation is all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] if `policy` is `Reject` and any key of
    /// the sequence compares equal to a present key or to an earlier key of
    /// the sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::{DuplicatePolicy, OrderedMap};
    ///
    /// let map = OrderedMap::new()
    ///     .extend_with_policy([(1, 'a'), (2, 'b')], DuplicatePolicy::Reject)
    ///     .unwrap();
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn extend_with_policy<I>(
        &self,
        iterable: I,
        policy: DuplicatePolicy,
    ) -> Result<Self, DuplicateKeyError<K>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut accumulator = self.clone();
        for (key, value) in iterable {
            accumulator = accumulator.insert_with_policy(key, value, policy)?;
        }
        Ok(accumulator)
    }

    /// Removes the entry for `key`, returning a new map.
    ///
    /// Removing an absent key is a no-op, not an error.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, "one").insert(2, "two");
    /// let removed = map.remove(&1);
    ///
    /// assert_eq!(removed.get(&1), None);
    /// assert_eq!(map.len(), 2); // Original unchanged
    /// ```
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let order = &self.order;
        match node::remove(&self.root, &|entry: &Entry<K, V>| {
            order.compare(key, &entry.key)
        }) {
            Some(root) => self.from_root(root),
            None => self.clone(),
        }
    }

    /// Returns the entry for `key`, or the entry with the greatest key
    /// ordering before it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(10, 'a').insert(20, 'b');
    /// assert_eq!(map.floor(&15), Some((&10, &'a')));
    /// assert_eq!(map.floor(&5), None);
    /// ```
    #[must_use]
    pub fn floor(&self, key: &K) -> Option<(&K, &V)> {
        let order = &self.order;
        node::floor(&self.root, &|entry: &Entry<K, V>| {
            order.compare(key, &entry.key)
        })
        .map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the entry for `key`, or the entry with the least key ordering
    /// after it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(10, 'a').insert(20, 'b');
    /// assert_eq!(map.ceiling(&15), Some((&20, &'b')));
    /// assert_eq!(map.ceiling(&25), None);
    /// ```
    #[must_use]
    pub fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        let order = &self.order;
        node::ceiling(&self.root, &|entry: &Entry<K, V>| {
            order.compare(key, &entry.key)
        })
        .map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the entry with the greatest key ordering strictly before
    /// `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(10, 'a').insert(20, 'b');
    /// assert_eq!(map.predecessor(&20), Some((&10, &'a')));
    /// assert_eq!(map.predecessor(&10), None);
    /// ```
    #[must_use]
    pub fn predecessor(&self, key: &K) -> Option<(&K, &V)> {
        let order = &self.order;
        node::predecessor(&self.root, &|entry: &Entry<K, V>| {
            order.compare(key, &entry.key)
        })
        .map(|entry| (&entry.key, &entry.value))
    }

    /// Returns the entry with the least key ordering strictly after `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(10, 'a').insert(20, 'b');
    /// assert_eq!(map.successor(&10), Some((&20, &'b')));
    /// assert_eq!(map.successor(&20), None);
    /// ```
    #[must_use]
    pub fn successor(&self, key: &K) -> Option<(&K, &V)> {
        let order = &self.order;
        node::successor(&self.root, &|entry: &Entry<K, V>| {
            order.compare(key, &entry.key)
        })
        .map(|entry| (&entry.key, &entry.value))
    }

    /// Returns a lazy iterator over the entries whose keys fall within the
    /// given bounds, in ascending key order.
    ///
    /// Subtrees that cannot intersect the bounds are skipped rather than
    /// visited; an empty interval yields an empty sequence.
    ///
    /// # Complexity
    ///
    /// O(log N + k) where k is the number of entries yielded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new()
    ///     .insert(1, 'a')
    ///     .insert(2, 'b')
    ///     .insert(3, 'c')
    ///     .insert(4, 'd');
    ///
    /// let keys: Vec<i32> = map.range(2..=3).map(|(key, _)| *key).collect();
    /// assert_eq!(keys, vec![2, 3]);
    /// ```
    pub fn range<B>(&self, bounds: B) -> OrderedMapRangeIterator<'_, K, V, R>
    where
        B: RangeBounds<K>,
    {
        OrderedMapRangeIterator::new(
            &self.root,
            &self.order,
            bounds.start_bound().cloned(),
            bounds.end_bound().cloned(),
        )
    }

    /// Merges two maps, with values from `other` taking precedence on key
    /// conflicts.
    ///
    /// # Complexity
    ///
    /// O(m · log(n + m)) where m is the size of `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let base = OrderedMap::new().insert(1, "one").insert(2, "two");
    /// let overrides = OrderedMap::new().insert(2, "TWO").insert(3, "three");
    ///
    /// let merged = base.merge(&overrides);
    /// assert_eq!(merged.get(&2), Some(&"TWO"));
    /// assert_eq!(merged.len(), 3);
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, value) in other.iter() {
            result = result.insert(key.clone(), value.clone());
        }
        result
    }

    /// Merges two maps with a custom conflict resolver.
    ///
    /// When a key exists in both maps the resolver receives the key and both
    /// values and decides the merged value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let left = OrderedMap::new().insert(1, 100).insert(2, 200);
    /// let right = OrderedMap::new().insert(2, 50).insert(3, 300);
    ///
    /// let merged = left.merge_with(&right, |_key, mine, theirs| mine + theirs);
    /// assert_eq!(merged.get(&2), Some(&250));
    /// ```
    #[must_use]
    pub fn merge_with<F>(&self, other: &Self, mut resolver: F) -> Self
    where
        F: FnMut(&K, &V, &V) -> V,
    {
        let mut result = self.clone();
        for (key, other_value) in other.iter() {
            let merged_value = result.get(key).map_or_else(
                || other_value.clone(),
                |self_value| resolver(key, self_value, other_value),
            );
            result = result.insert(key.clone(), merged_value);
        }
        result
    }

    /// Applies a function to all values, keeping keys and order unchanged.
    ///
    /// # Complexity
    ///
    /// O(N · log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, 10).insert(2, 20);
    /// let doubled = map.map_values(|value| value * 2);
    /// assert_eq!(doubled.get(&1), Some(&20));
    /// assert_eq!(doubled.get(&2), Some(&40));
    /// ```
    #[must_use]
    pub fn map_values<W, F>(&self, mut transform: F) -> OrderedMap<K, W, R>
    where
        W: Clone,
        F: FnMut(&V) -> W,
    {
        let mut result = OrderedMap {
            root: None,
            order: self.order.clone(),
        };
        for (key, value) in self.iter() {
            result = result.insert(key.clone(), transform(value));
        }
        result
    }

    /// Keeps only the entries for which the predicate returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, 10).insert(2, 20).insert(3, 30);
    /// let kept = map.keep_if(|key, _value| key % 2 == 1);
    /// assert_eq!(kept.len(), 2);
    /// ```
    #[must_use]
    pub fn keep_if<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut result = self.cleared();
        for (key, value) in self.iter() {
            if predicate(key, value) {
                result = result.insert(key.clone(), value.clone());
            }
        }
        result
    }

    /// Removes the entries for which the predicate returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new().insert(1, 10).insert(2, 20).insert(3, 30);
    /// let small = map.delete_if(|_key, value| *value >= 20);
    /// assert_eq!(small.len(), 1);
    /// ```
    #[must_use]
    pub fn delete_if<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.keep_if(|key, value| !predicate(key, value))
    }

    /// Partitions the map into the entries matching the predicate and the
    /// rest.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use arbors::OrderedMap;
    ///
    /// let map = OrderedMap::new()
    ///     .insert(1, 10)
    ///     .insert(2, 20)
    ///     .insert(3, 30)
    ///     .insert(4, 40);
    /// let (even, odd) = map.partition(|key, _value| key % 2 == 0);
    /// assert_eq!(even.len(), 2);
    /// assert_eq!(odd.len(), 2);
    /// ```
    #[must_use]
    pub fn partition<F>(&self, mut predicate: F) -> (Self, Self)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut matching = self.cleared();
        let mut rest = self.cleared();

        for (key, value) in self.iter() {
            if predicate(key, value) {
                matching = matching.insert(key.clone(), value.clone());
            } else {
                rest = rest.insert(key.clone(), value.clone());
            }
        }

        (matching, rest)
    }

    /// Binary search for the entry stored under `key`.
    fn find(&self, key: &K) -> Option<&Entry<K, V>> {
        let order = &self.order;
        node::find(&self.root, &|entry: &Entry<K, V>| {
            order.compare(key, &entry.key)
        })
    }

    /// Wraps a rebuilt root, validating invariants in diagnostic builds.
    fn from_root(&self, root: Link<Entry<K, V>>) -> Self {
        let derived = Self {
            root,
            order: self.order.clone(),
        };
        node::validate(&derived.root, &|left: &Entry<K, V>, right: &Entry<K, V>| {
            derived.order.compare(&left.key, &right.key)
        });
        derived
    }

    /// An empty map carrying this map's order relation.
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

/// An iterator over the entries of an [`OrderedMap`] in ascending key order.
pub struct OrderedMapIterator<'a, K, V> {
    inner: Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for OrderedMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for OrderedMapIterator<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|entry| (&entry.key, &entry.value))
    }
}

impl<K, V> ExactSizeIterator for OrderedMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> std::iter::FusedIterator for OrderedMapIterator<'_, K, V> {}

/// A lazy range iterator over an [`OrderedMap`], ascending within key bounds.
pub struct OrderedMapRangeIterator<'a, K, V, R> {
    stack: SmallVec<[&'a Node<Entry<K, V>>; STACK_CAPACITY]>,
    lower: Bound<K>,
    upper: Bound<K>,
    order: &'a R,
}

impl<'a, K, V, R> OrderedMapRangeIterator<'a, K, V, R>
where
    R: TotalOrder<K>,
{
    fn new(root: &'a Link<Entry<K, V>>, order: &'a R, lower: Bound<K>, upper: Bound<K>) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            lower,
            upper,
            order,
        };
        iterator.descend(root);
        iterator
    }

    fn below_lower(&self, key: &K) -> bool {
        match &self.lower {
            Bound::Unbounded => false,
            Bound::Included(bound) => self.order.compare(key, bound) == Ordering::Less,
            Bound::Excluded(bound) => self.order.compare(key, bound) != Ordering::Greater,
        }
    }

    fn above_upper(&self, key: &K) -> bool {
        match &self.upper {
            Bound::Unbounded => false,
            Bound::Included(bound) => self.order.compare(key, bound) == Ordering::Greater,
            Bound::Excluded(bound) => self.order.compare(key, bound) != Ordering::Less,
        }
    }

    /// Stacks the nodes whose keys fall within the bounds, skipping any
    /// subtree that provably cannot intersect them.
    fn descend(&mut self, mut link: &'a Link<Entry<K, V>>) {
        while let Some(node) = link.as_deref() {
            if self.below_lower(&node.element.key) {
                link = &node.right;
            } else if self.above_upper(&node.element.key) {
                link = &node.left;
            } else {
                self.stack.push(node);
                link = &node.left;
            }
        }
    }
}

impl<'a, K, V, R> Iterator for OrderedMapRangeIterator<'a, K, V, R>
where
    R: TotalOrder<K>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(&node.right);
        Some((&node.element.key, &node.element.value))
    }
}

impl<K, V, R> std::iter::FusedIterator for OrderedMapRangeIterator<'_, K, V, R> where
    R: TotalOrder<K>
{
}

/// An owning iterator over the entries of an [`OrderedMap`].
pub struct OrderedMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for OrderedMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for OrderedMapIntoIterator<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for OrderedMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, R: Default> Default for OrderedMap<K, V, R> {
    #[inline]
    fn default() -> Self {
        Self {
            root: None,
            order: R::default(),
        }
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map = map.insert(key, value);
        }
        map
    }
}

impl<K: Clone, V: Clone, R> IntoIterator for OrderedMap<K, V, R> {
    type Item = (K, V);
    type IntoIter = OrderedMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        OrderedMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V, R> IntoIterator for &'a OrderedMap<K, V, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = OrderedMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, R> PartialEq for OrderedMap<K, V, R>
where
    K: Clone,
    V: Clone + PartialEq,
    R: TotalOrder<K> + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, R> Eq for OrderedMap<K, V, R>
where
    K: Clone,
    V: Clone + Eq,
    R: TotalOrder<K> + Clone,
{
}

/// Computes a hash value for this map.
///
/// The length is hashed first, then each entry in ascending key order, so
/// the insertion history does not affect the hash and equal maps hash
/// equally.
impl<K: Hash, V: Hash, R> Hash for OrderedMap<K, V, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self.iter() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Debug for OrderedMap<K, V, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, R> fmt::Display for OrderedMap<K, V, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(OrderedMap<i32, i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(OrderedMap<i32, i32>: Send, Sync);

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, R> serde::Serialize for OrderedMap<K, V, R>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<K, V, R> {
    marker: std::marker::PhantomData<(K, V, R)>,
}

#[cfg(feature = "serde")]
impl<K, V, R> OrderedMapVisitor<K, V, R> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, R> serde::de::Visitor<'de> for OrderedMapVisitor<K, V, R>
where
    K: serde::Deserialize<'de> + Clone,
    V: serde::Deserialize<'de> + Clone,
    R: TotalOrder<K> + Clone + Default,
{
    type Value = OrderedMap<K, V, R>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = OrderedMap::with_order(R::default());
        while let Some((key, value)) = access.next_entry()? {
            map = map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, R> serde::Deserialize<'de> for OrderedMap<K, V, R>
where
    K: serde::Deserialize<'de> + Clone,
    V: serde::Deserialize<'de> + Clone,
    R: TotalOrder<K> + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[rstest]
    fn test_display_empty_map() {
        let map: OrderedMap<i32, String> = OrderedMap::new();
        assert_eq!(format!("{map}"), "{}");
    }

    #[rstest]
    fn test_display_entries_in_key_order() {
        let map = OrderedMap::new()
            .insert(3, "three")
            .insert(1, "one")
            .insert(2, "two");
        assert_eq!(format!("{map}"), "{1: one, 2: two, 3: three}");
    }

    // =========================================================================
    // Construction and Basic Operations
    // =========================================================================

    #[rstest]
    fn test_new_creates_empty() {
        let map: OrderedMap<i32, String> = OrderedMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[rstest]
    fn test_singleton() {
        let map = OrderedMap::singleton(42, "answer");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&42), Some(&"answer"));
    }

    #[rstest]
    fn test_insert_and_get() {
        let map = OrderedMap::new().insert(1, "one").insert(2, "two");

        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&3), None);
    }

    #[rstest]
    fn test_insert_overwrites_and_preserves_original() {
        let original = OrderedMap::new().insert(1, "one");
        let updated = original.insert(1, "ONE");

        assert_eq!(original.get(&1), Some(&"one"));
        assert_eq!(updated.get(&1), Some(&"ONE"));
        assert_eq!(updated.len(), 1);
    }

    #[rstest]
    fn test_insert_if_absent_keeps_existing() {
        let map = OrderedMap::new().insert(1, "one");
        let unchanged = map.insert_if_absent(1, "uno");
        assert_eq!(unchanged.get(&1), Some(&"one"));
    }

    #[rstest]
    fn test_try_insert_rejects_existing_key() {
        let map = OrderedMap::new().insert(1, "one");
        assert!(map.try_insert(2, "two").is_ok());
        assert_eq!(map.try_insert(1, "uno").unwrap_err().into_key(), 1);
    }

    #[rstest]
    fn test_from_iter_with_policy_is_all_or_nothing() {
        let rejected = OrderedMap::from_iter_with_policy(
            [(1, 'a'), (2, 'b'), (1, 'c')],
            DuplicatePolicy::Reject,
        );
        assert!(rejected.is_err());

        let accepted = OrderedMap::from_iter_with_policy(
            [(1, 'a'), (2, 'b'), (1, 'c')],
            DuplicatePolicy::Ignore,
        )
        .unwrap();
        assert_eq!(accepted.get(&1), Some(&'a'));
    }

    // =========================================================================
    // Removal
    // =========================================================================

    #[rstest]
    fn test_remove() {
        let map = OrderedMap::new().insert(1, "one").insert(2, "two");
        let removed = map.remove(&1);

        assert_eq!(removed.len(), 1);
        assert_eq!(removed.get(&1), None);
        assert_eq!(removed.get(&2), Some(&"two"));
    }

    #[rstest]
    fn test_remove_absent_is_noop() {
        let map = OrderedMap::new().insert(1, "one");
        assert_eq!(map.remove(&9).len(), 1);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[rstest]
    fn test_min_max() {
        let map = OrderedMap::new()
            .insert(3, "three")
            .insert(1, "one")
            .insert(5, "five");

        assert_eq!(map.min(), Some((&1, &"one")));
        assert_eq!(map.max(), Some((&5, &"five")));
    }

    #[rstest]
    fn test_neighbor_queries() {
        let map = OrderedMap::new().insert(10, 'a').insert(20, 'b').insert(30, 'c');

        assert_eq!(map.floor(&20), Some((&20, &'b')));
        assert_eq!(map.ceiling(&25), Some((&30, &'c')));
        assert_eq!(map.predecessor(&20), Some((&10, &'a')));
        assert_eq!(map.successor(&20), Some((&30, &'c')));
    }

    #[rstest]
    fn test_keys_sorted() {
        let map = OrderedMap::new().insert(3, 'c').insert(1, 'a').insert(2, 'b');
        let keys: Vec<&i32> = map.keys().collect();
        assert_eq!(keys, vec![&1, &2, &3]);
    }

    #[rstest]
    fn test_range() {
        let map = OrderedMap::new()
            .insert(1, 'a')
            .insert(2, 'b')
            .insert(3, 'c')
            .insert(4, 'd')
            .insert(5, 'e');

        let keys: Vec<i32> = map.range(2..=4).map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![2, 3, 4]);
    }

    // =========================================================================
    // Merging and Transforms
    // =========================================================================

    #[rstest]
    fn test_merge_right_bias() {
        let base = OrderedMap::new().insert(1, "one").insert(2, "two");
        let overrides = OrderedMap::new().insert(2, "TWO").insert(3, "three");

        let merged = base.merge(&overrides);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(&2), Some(&"TWO"));
    }

    #[rstest]
    fn test_merge_with_resolver() {
        let left = OrderedMap::new().insert(1, 100).insert(2, 200);
        let right = OrderedMap::new().insert(2, 50).insert(3, 300);

        let merged = left.merge_with(&right, |_key, mine, theirs| mine.max(theirs).to_owned());
        assert_eq!(merged.get(&2), Some(&200));
        assert_eq!(merged.get(&3), Some(&300));
    }

    #[rstest]
    fn test_map_values_preserves_keys() {
        let map = OrderedMap::new().insert(1, 10).insert(2, 20);
        let doubled = map.map_values(|value| value * 2);

        assert_eq!(doubled.get(&1), Some(&20));
        assert_eq!(doubled.get(&2), Some(&40));
        assert_eq!(doubled.len(), map.len());
    }

    #[rstest]
    fn test_keep_if_and_delete_if_are_complementary() {
        let map = OrderedMap::new().insert(1, 10).insert(2, 20).insert(3, 30);

        let kept = map.keep_if(|key, _| key % 2 == 1);
        let deleted = map.delete_if(|key, _| key % 2 == 1);

        assert_eq!(kept.len(), 2);
        assert_eq!(deleted.len(), 1);
        assert_eq!(kept.merge(&deleted), map);
    }

    #[rstest]
    fn test_partition() {
        let map = OrderedMap::new()
            .insert(1, 10)
            .insert(2, 20)
            .insert(3, 30)
            .insert(4, 40);
        let (even, odd) = map.partition(|key, _| key % 2 == 0);

        assert_eq!(even.len(), 2);
        assert_eq!(odd.len(), 2);
    }

    #[rstest]
    fn test_fold_and_fold_back() {
        let map = OrderedMap::new().insert(1, 'a').insert(2, 'b').insert(3, 'c');

        let forward = map.fold(String::new(), |accumulator, _key, value| {
            format!("{accumulator}{value}")
        });
        let backward = map.fold_back(String::new(), |_key, value, accumulator| {
            format!("{accumulator}{value}")
        });

        assert_eq!(forward, "abc");
        assert_eq!(backward, "cba");
    }

    // =========================================================================
    // Standard Traits
    // =========================================================================

    #[rstest]
    fn test_eq_ignores_insertion_order() {
        let forward = OrderedMap::new().insert(1, "one").insert(2, "two");
        let backward = OrderedMap::new().insert(2, "two").insert(1, "one");
        assert_eq!(forward, backward);
    }

    #[rstest]
    fn test_from_iter() {
        let map: OrderedMap<i32, &str> = [(3, "three"), (1, "one"), (2, "two")]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1), Some(&"one"));
    }

    #[rstest]
    fn test_into_iterator_yields_owned_entries_in_key_order() {
        let map = OrderedMap::new().insert(2, 'b').insert(1, 'a');
        let entries: Vec<(i32, char)> = map.into_iter().collect();
        assert_eq!(entries, vec![(1, 'a'), (2, 'b')]);
    }

    // =========================================================================
    // Serde
    // =========================================================================

    #[cfg(feature = "serde")]
    #[rstest]
    fn test_serialize_as_sorted_map() {
        let map = OrderedMap::new().insert(2, "two").insert(1, "one");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":"one","2":"two"}"#);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn test_deserialize_round_trip() {
        let map = OrderedMap::new().insert(1, "one".to_string()).insert(2, "two".to_string());
        let json = serde_json::to_string(&map).unwrap();
        let rebuilt: OrderedMap<i32, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(rebuilt, map);
    }
}
