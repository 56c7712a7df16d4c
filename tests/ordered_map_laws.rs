//! Property-based tests for `OrderedMap`.
//!
//! These tests verify that the map satisfies the expected laws and
//! invariants for arbitrary inputs.

use arbors::OrderedMap;
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

/// Strategy for generating an `OrderedMap` from a vector of key-value pairs.
fn arbitrary_map(max_size: usize) -> impl Strategy<Value = OrderedMap<i32, i32>> {
    prop::collection::vec((any::<i32>(), any::<i32>()), 0..max_size)
        .prop_map(|entries| entries.into_iter().collect::<OrderedMap<i32, i32>>())
}

// =============================================================================
// Get-Insert Laws
// =============================================================================

proptest! {
    /// Law: get after insert returns the inserted value.
    #[test]
    fn prop_get_insert_law(map in arbitrary_map(20), key: i32, value: i32) {
        let updated = map.insert(key, value);
        prop_assert_eq!(updated.get(&key), Some(&value));
    }

    /// Law: insert does not affect other keys.
    #[test]
    fn prop_get_insert_other_law(
        map in arbitrary_map(20),
        key1: i32,
        key2: i32,
        value: i32
    ) {
        prop_assume!(key1 != key2);
        let updated = map.insert(key1, value);
        prop_assert_eq!(updated.get(&key2), map.get(&key2));
    }

    /// Law: insert-if-absent never changes an existing binding.
    #[test]
    fn prop_insert_if_absent_keeps_existing(
        map in arbitrary_map(20),
        key: i32,
        value: i32
    ) {
        let updated = map.insert_if_absent(key, value);
        match map.get(&key) {
            Some(existing) => prop_assert_eq!(updated.get(&key), Some(existing)),
            None => prop_assert_eq!(updated.get(&key), Some(&value)),
        }
    }
}

// =============================================================================
// Remove Laws
// =============================================================================

proptest! {
    /// Law: get after remove returns None.
    #[test]
    fn prop_get_remove_law(map in arbitrary_map(20), key: i32) {
        let removed = map.remove(&key);
        prop_assert_eq!(removed.get(&key), None);
    }

    /// Law: remove does not affect other keys.
    #[test]
    fn prop_get_remove_other_law(map in arbitrary_map(20), key1: i32, key2: i32) {
        prop_assume!(key1 != key2);
        let removed = map.remove(&key1);
        prop_assert_eq!(removed.get(&key2), map.get(&key2));
    }
}

// =============================================================================
// Length Laws
// =============================================================================

proptest! {
    /// Law: insert of a new key increases the length by one.
    #[test]
    fn prop_insert_length_new_key(map in arbitrary_map(20), key: i32, value: i32) {
        prop_assume!(!map.contains_key(&key));
        let updated = map.insert(key, value);
        prop_assert_eq!(updated.len(), map.len() + 1);
    }

    /// Law: insert of an existing key preserves the length.
    #[test]
    fn prop_insert_length_existing_key(map in arbitrary_map(20), value: i32) {
        if let Some((key, _)) = map.min() {
            let key = *key;
            let updated = map.insert(key, value);
            prop_assert_eq!(updated.len(), map.len());
        }
    }

    /// Law: the cached length equals the number of enumerated entries.
    #[test]
    fn prop_len_matches_enumeration(map in arbitrary_map(50)) {
        prop_assert_eq!(map.len(), map.iter().count());
    }
}

// =============================================================================
// Model Conformance
// =============================================================================

proptest! {
    /// Law: the map behaves exactly like a sorted association model.
    #[test]
    fn prop_matches_model(entries in prop::collection::vec((any::<i32>(), any::<i32>()), 0..60)) {
        let map: OrderedMap<i32, i32> = entries.iter().copied().collect();
        let model: BTreeMap<i32, i32> = entries.iter().copied().collect();

        let from_map: Vec<(i32, i32)> =
            map.iter().map(|(key, value)| (*key, *value)).collect();
        let from_model: Vec<(i32, i32)> =
            model.iter().map(|(key, value)| (*key, *value)).collect();
        prop_assert_eq!(from_map, from_model);
    }

    /// Law: keys are enumerated in strictly increasing order.
    #[test]
    fn prop_keys_strictly_increasing(map in arbitrary_map(50)) {
        let keys: Vec<i32> = map.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Law: deriving new versions leaves the receiver observably unchanged.
    #[test]
    fn prop_persistence(map in arbitrary_map(30), key: i32, value: i32) {
        let before: Vec<(i32, i32)> =
            map.iter().map(|(k, v)| (*k, *v)).collect();

        let _updated = map.insert(key, value);
        let _removed = map.remove(&key);

        let after: Vec<(i32, i32)> =
            map.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
    }
}

// =============================================================================
// Merge Laws
// =============================================================================

proptest! {
    /// Law: merging with an empty map is an identity.
    #[test]
    fn prop_merge_empty_identity(map in arbitrary_map(30)) {
        let empty = OrderedMap::new();
        prop_assert_eq!(map.merge(&empty), map.clone());
        prop_assert_eq!(empty.merge(&map), map);
    }

    /// Law: on shared keys the merged value comes from the right operand.
    #[test]
    fn prop_merge_right_bias(left in arbitrary_map(30), right in arbitrary_map(30)) {
        let merged = left.merge(&right);
        for (key, value) in right.iter() {
            prop_assert_eq!(merged.get(key), Some(value));
        }
    }
}
