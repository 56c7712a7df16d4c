//! Duplicate-insertion policies and the duplicate-key error.
//!
//! Every insertion into an ordered collection must decide what happens when
//! an element comparing equal (per the collection's order relation) is
//! already present. The caller selects the behavior per call through
//! [`DuplicatePolicy`]; [`DuplicateKeyError`] is raised only under
//! [`DuplicatePolicy::Reject`] and carries the offending key back to the
//! caller.
//!
//! Bulk operations apply a single policy uniformly and are all-or-nothing
//! under `Reject`: the first duplicate aborts the operation and no partially
//! built collection is observable.

use std::fmt;

/// The caller-selected behavior when inserting a key that already exists.
///
/// "Already exists" means an element comparing `Ordering::Equal` under the
/// collection's order relation, the only notion of sameness the collections
/// have.
///
/// # Examples
///
/// ```rust
/// use arbors::{DuplicatePolicy, OrderedSet};
///
/// let set = OrderedSet::new().insert(1);
///
/// // Reject: an equal element is an error.
/// assert!(set.insert_with_policy(1, DuplicatePolicy::Reject).is_err());
///
/// // Ignore: the original collection is returned unchanged.
/// let unchanged = set.insert_with_policy(1, DuplicatePolicy::Ignore).unwrap();
/// assert_eq!(unchanged.len(), 1);
///
/// // Overwrite: the stored element is replaced by the new one.
/// let replaced = set.insert_with_policy(1, DuplicatePolicy::Overwrite).unwrap();
/// assert_eq!(replaced.len(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail the insertion with a [`DuplicateKeyError`] carrying the key.
    Reject,
    /// Keep the stored element and return the collection unchanged.
    Ignore,
    /// Replace the stored element with the newly supplied one.
    Overwrite,
}

/// Error raised when an insertion under [`DuplicatePolicy::Reject`] finds an
/// equal key already present.
///
/// Carries the offending key so the caller can recover it, for example to
/// retry under a different policy.
///
/// # Examples
///
/// ```rust
/// use arbors::OrderedSet;
///
/// let set = OrderedSet::new().insert(7);
/// let error = set.try_insert(7).unwrap_err();
/// assert_eq!(error.into_key(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeyError<T> {
    key: T,
}

impl<T> DuplicateKeyError<T> {
    /// Creates an error for the given offending key.
    pub(crate) const fn new(key: T) -> Self {
        Self { key }
    }

    /// Returns a reference to the offending key.
    #[must_use]
    pub const fn key(&self) -> &T {
        &self.key
    }

    /// Consumes the error, returning the offending key.
    #[must_use]
    pub fn into_key(self) -> T {
        self.key
    }
}

impl<T> fmt::Display for DuplicateKeyError<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "an equal key is already present and the reject policy was selected"
        )
    }
}

impl<T: fmt::Debug> std::error::Error for DuplicateKeyError<T> {}

// =============================================================================
// Tests
// =============================================================================
