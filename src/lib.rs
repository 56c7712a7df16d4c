//! # arbors
//!
//! Persistent AVL-balanced ordered collections for Rust: immutable sets and
//! maps with structural sharing.
//!
//! ## Overview
//!
//! This library provides ordered collections in the functional style: every
//! operation returns a new collection value and the original remains valid,
//! with all untouched subtrees shared between versions. The backing structure
//! is a height-balanced (AVL) binary search tree, so every version guarantees:
//!
//! - O(log N) insert, remove, and lookup
//! - O(log N) ordered neighbor queries (floor, ceiling, predecessor, successor)
//! - O(log N + k) range queries where k is the number of results
//! - O(N) ordered enumeration with O(log N) auxiliary space
//! - O(1) length and emptiness checks (element counts are cached per subtree)
//!
//! Two collections share the engine:
//!
//! - [`OrderedSet`]: a persistent ordered set of unique elements
//! - [`OrderedMap`]: a persistent ordered map, keyed entries compared by key
//!
//! Both are parameterized over a pluggable [`order::TotalOrder`] relation
//! bound at construction time, defaulting to the element type's `Ord`.
//!
//! ## Persistence
//!
//! ```rust
//! use arbors::OrderedSet;
//!
//! let versioned = OrderedSet::new().insert(1).insert(2).insert(3);
//! let extended = versioned.insert(4);
//!
//! assert_eq!(versioned.len(), 3); // Original unchanged
//! assert_eq!(extended.len(), 4); // New version
//! ```
//!
//! ## Feature Flags
//!
//! - `arc`: use `Arc` instead of `Rc` for node links, making the collections
//!   `Send + Sync` so any number of threads can read and derive new versions
//!   from a shared root without synchronization
//! - `serde`: `Serialize`/`Deserialize` implementations for both collections

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use arbors::prelude::*;
/// ```
pub mod prelude {
    pub use crate::map::{OrderedMap, OrderedMapIterator};
    pub use crate::order::{NaturalOrder, OrderWith, Reversed, TotalOrder};
    pub use crate::policy::{DuplicateKeyError, DuplicatePolicy};
    pub use crate::set::{OrderedSet, OrderedSetIterator};
}

pub mod order;
pub mod policy;

mod iter;
mod node;

pub mod map;
pub mod set;

pub use map::OrderedMap;
pub use order::{NaturalOrder, OrderWith, Reversed, TotalOrder};
pub use policy::{DuplicateKeyError, DuplicatePolicy};
pub use set::OrderedSet;
