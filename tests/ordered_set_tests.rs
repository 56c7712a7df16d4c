//! Integration tests for `OrderedSet`.
//!
//! Exercises the public surface end to end: construction under every
//! duplicate policy, removal, ordered queries, range iteration, set algebra,
//! and the persistence guarantees of structural sharing.

use arbors::order::NaturalOrder;
use arbors::{DuplicatePolicy, OrderWith, OrderedSet, Reversed};
use rstest::rstest;

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn test_new_and_default_are_empty() {
    let explicit: OrderedSet<i32> = OrderedSet::new();
    let defaulted: OrderedSet<i32> = OrderedSet::default();

    assert!(explicit.is_empty());
    assert!(defaulted.is_empty());
    assert_eq!(explicit, defaulted);
}

#[rstest]
fn test_collect_from_iterator_drops_duplicates() {
    let set: OrderedSet<i32> = [5, 3, 5, 1, 3].into_iter().collect();
    assert_eq!(set.len(), 3);

    let elements: Vec<i32> = set.iter().copied().collect();
    assert_eq!(elements, vec![1, 3, 5]);
}

#[rstest]
fn test_bulk_load_reject_policy_is_all_or_nothing() {
    let rejected = OrderedSet::from_iter_with_policy([1, 2, 3, 2], DuplicatePolicy::Reject);

    let error = rejected.unwrap_err();
    assert_eq!(error.into_key(), 2);
}

#[rstest]
fn test_bulk_load_overwrite_policy_keeps_last() {
    let by_id =
        OrderWith::new(|left: &(i32, char), right: &(i32, char)| left.0.cmp(&right.0));
    let set = OrderedSet::with_order(by_id)
        .extend_with_policy(
            [(1, 'a'), (2, 'b'), (1, 'z')],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.get(&(1, ' ')), Some(&(1, 'z')));
}

// =============================================================================
// Shape Scenarios
// =============================================================================

#[rstest]
fn test_sequential_one_to_seven_stays_shallow() {
    let set = OrderedSet::new().extend(1..=7);

    let elements: Vec<i32> = set.iter().copied().collect();
    assert_eq!(elements, vec![1, 2, 3, 4, 5, 6, 7]);
    assert!(set.height() <= 3);
}

#[rstest]
fn test_ascending_run_of_three_rebalances() {
    let set = OrderedSet::new().insert(1).insert(2).insert(3);

    // A right-leaning chain would have height 3; the rotation flattens it.
    assert_eq!(set.height(), 2);
    assert_eq!(set.min(), Some(&1));
    assert_eq!(set.max(), Some(&3));
}

#[rstest]
fn test_large_ascending_insertion_keeps_logarithmic_height() {
    let set = OrderedSet::new().extend(0..1024);

    assert_eq!(set.len(), 1024);
    // 1.4405 * log2(1025) is a little over 14.
    assert!(set.height() <= 14, "height {} too large", set.height());
    assert!(set.contains(&0));
    assert!(set.contains(&1023));
}

// =============================================================================
// Persistence
// =============================================================================

#[rstest]
fn test_original_version_survives_derivations() {
    let original = OrderedSet::new().extend([2, 4, 6]);
    let before: Vec<i32> = original.iter().copied().collect();

    let _bigger = original.insert(5);
    let _smaller = original.remove(&4);
    let _merged = original.union(&OrderedSet::new().extend([1, 3]));

    let after: Vec<i32> = original.iter().copied().collect();
    assert_eq!(before, after);
}

#[rstest]
fn test_versions_evolve_independently() {
    let base = OrderedSet::new().extend([1, 2, 3]);
    let left_branch = base.insert(10);
    let right_branch = base.insert(20);

    assert!(left_branch.contains(&10));
    assert!(!left_branch.contains(&20));
    assert!(right_branch.contains(&20));
    assert!(!right_branch.contains(&10));
    assert_eq!(base.len(), 3);
}

// =============================================================================
// Removal
// =============================================================================

#[rstest]
fn test_remove_inner_node_keeps_order_and_balance() {
    let set = OrderedSet::new().extend([1, 2, 3, 4, 5]);
    let removed = set.remove(&3);

    let elements: Vec<i32> = removed.iter().copied().collect();
    assert_eq!(elements, vec![1, 2, 4, 5]);
    assert!(removed.height() <= 3);
}

#[rstest]
fn test_drain_by_removal_reaches_empty() {
    let mut set = OrderedSet::new().extend(1..=10);
    for element in 1..=10 {
        set = set.remove(&element);
    }
    assert!(set.is_empty());
}

// =============================================================================
// Ordered Queries
// =============================================================================

#[rstest]
#[case(25, Some(20), Some(30))]
#[case(20, Some(20), Some(20))]
#[case(5, None, Some(10))]
#[case(35, Some(30), None)]
fn test_floor_and_ceiling(
    #[case] probe: i32,
    #[case] expected_floor: Option<i32>,
    #[case] expected_ceiling: Option<i32>,
) {
    let set = OrderedSet::new().extend([10, 20, 30]);

    assert_eq!(set.floor(&probe).copied(), expected_floor);
    assert_eq!(set.ceiling(&probe).copied(), expected_ceiling);
}

#[rstest]
fn test_strict_neighbors_exclude_the_probe() {
    let set = OrderedSet::new().extend([10, 20, 30]);

    assert_eq!(set.predecessor(&20), Some(&10));
    assert_eq!(set.successor(&20), Some(&30));
    assert_eq!(set.predecessor(&10), None);
    assert_eq!(set.successor(&30), None);
}

#[rstest]
fn test_queries_on_empty_set_report_absence() {
    let set: OrderedSet<i32> = OrderedSet::new();

    assert_eq!(set.min(), None);
    assert_eq!(set.max(), None);
    assert_eq!(set.floor(&1), None);
    assert_eq!(set.ceiling(&1), None);
    assert_eq!(set.get(&1), None);
}

// =============================================================================
// Range Iteration
// =============================================================================

#[rstest]
fn test_range_inclusive_bounds() {
    let set = OrderedSet::new().extend([1, 2, 3, 4, 5]);
    let middle: Vec<i32> = set.range(2..=4).copied().collect();
    assert_eq!(middle, vec![2, 3, 4]);
}

#[rstest]
fn test_range_exclusive_and_open_bounds() {
    let set = OrderedSet::new().extend([1, 2, 3, 4, 5]);

    let half_open: Vec<i32> = set.range(2..4).copied().collect();
    assert_eq!(half_open, vec![2, 3]);

    let head: Vec<i32> = set.range(..3).copied().collect();
    assert_eq!(head, vec![1, 2]);

    let tail: Vec<i32> = set.range(4..).copied().collect();
    assert_eq!(tail, vec![4, 5]);
}

#[rstest]
fn test_range_between_stored_elements() {
    let set = OrderedSet::new().extend([10, 20, 30, 40]);
    let middle: Vec<i32> = set.range(15..=35).copied().collect();
    assert_eq!(middle, vec![20, 30]);
}

#[rstest]
fn test_inverted_range_is_empty_not_an_error() {
    let set = OrderedSet::new().extend([1, 2, 3, 4, 5]);
    assert_eq!(set.range(4..=2).count(), 0);
}

#[rstest]
fn test_range_restarts_from_fresh_calls() {
    let set = OrderedSet::new().extend(1..=9);

    let first: Vec<i32> = set.range(3..=7).copied().collect();
    let second: Vec<i32> = set.range(3..=7).copied().collect();
    assert_eq!(first, second);
}

// =============================================================================
// Set Algebra
// =============================================================================

#[rstest]
fn test_union_collapses_shared_elements() {
    let odds = OrderedSet::new().extend([1, 3, 5]);
    let low = OrderedSet::new().extend([2, 3, 4]);

    let union = odds.union(&low);
    let elements: Vec<i32> = union.iter().copied().collect();
    assert_eq!(elements, vec![1, 2, 3, 4, 5]);
    assert_eq!(union.len(), 5);
}

#[rstest]
fn test_difference() {
    let all = OrderedSet::new().extend([1, 2, 3, 4]);
    let even = OrderedSet::new().extend([2, 4]);

    let odd: Vec<i32> = all.difference(&even).iter().copied().collect();
    assert_eq!(odd, vec![1, 3]);
}

#[rstest]
fn test_intersection_keeps_only_shared() {
    let left = OrderedSet::new().extend([1, 2, 3, 4]);
    let right = OrderedSet::new().extend([3, 4, 5]);

    let shared: Vec<i32> = left.intersection(&right).iter().copied().collect();
    assert_eq!(shared, vec![3, 4]);
}

#[rstest]
fn test_symmetric_difference() {
    let left = OrderedSet::new().extend([1, 2, 3]);
    let right = OrderedSet::new().extend([2, 3, 4]);

    let exclusive: Vec<i32> = left.symmetric_difference(&right).iter().copied().collect();
    assert_eq!(exclusive, vec![1, 4]);
}

#[rstest]
fn test_operands_survive_set_algebra() {
    let left = OrderedSet::new().extend([1, 2, 3]);
    let right = OrderedSet::new().extend([2, 3, 4]);

    let _ = left.union(&right);
    let _ = left.intersection(&right);
    let _ = left.difference(&right);
    let _ = left.symmetric_difference(&right);

    assert_eq!(left.len(), 3);
    assert_eq!(right.len(), 3);
}

#[rstest]
fn test_relation_predicates() {
    let small = OrderedSet::new().extend([1, 2]);
    let large = OrderedSet::new().extend([1, 2, 3]);
    let other = OrderedSet::new().extend([8, 9]);

    assert!(small.is_subset(&large));
    assert!(large.is_superset(&small));
    assert!(small.is_proper_subset(&large));
    assert!(large.is_proper_superset(&small));
    assert!(!large.is_proper_subset(&large));
    assert!(small.is_disjoint(&other));
    assert!(small.overlaps(&large));
    assert!(large.set_eq(&large.union(&large)));
}

// =============================================================================
// Custom Order Relations
// =============================================================================

#[rstest]
fn test_order_by_length_collapses_equal_lengths() {
    let by_length =
        OrderWith::new(|left: &String, right: &String| left.len().cmp(&right.len()));

    let set = OrderedSet::with_order(by_length)
        .insert("bb".to_string())
        .insert("a".to_string())
        .insert("cc".to_string());

    // "cc" compares equal to "bb", so it is ignored.
    assert_eq!(set.len(), 2);
    let elements: Vec<&str> = set.iter().map(|element| element.as_str()).collect();
    assert_eq!(elements, vec!["a", "bb"]);
}

#[rstest]
fn test_reversed_relation_flips_every_query() {
    let set = OrderedSet::with_order(Reversed::new(NaturalOrder)).extend([1, 2, 3, 4, 5]);

    assert_eq!(set.min(), Some(&5));
    assert_eq!(set.max(), Some(&1));

    let elements: Vec<i32> = set.iter().copied().collect();
    assert_eq!(elements, vec![5, 4, 3, 2, 1]);

    // Neighbors follow the reversed order too: 2 now sits "before" 1.
    assert_eq!(set.predecessor(&2), Some(&3));
    assert_eq!(set.successor(&2), Some(&1));
}

// =============================================================================
// Enumeration and Folds
// =============================================================================

#[rstest]
fn test_iterator_is_double_ended_and_sized() {
    let set = OrderedSet::new().extend([1, 2, 3, 4]);
    let mut iterator = set.iter();

    assert_eq!(iterator.len(), 4);
    assert_eq!(iterator.next(), Some(&1));
    assert_eq!(iterator.next_back(), Some(&4));
    assert_eq!(iterator.len(), 2);

    let middle: Vec<i32> = iterator.copied().collect();
    assert_eq!(middle, vec![2, 3]);
}

#[rstest]
fn test_fold_runs_ascending_and_fold_back_descending() {
    let set = OrderedSet::new().extend([1, 2, 3]);

    let ascending = set.fold(Vec::new(), |mut accumulator, element| {
        accumulator.push(*element);
        accumulator
    });
    let descending = set.fold_back(Vec::new(), |element, mut accumulator| {
        accumulator.push(*element);
        accumulator
    });

    assert_eq!(ascending, vec![1, 2, 3]);
    assert_eq!(descending, vec![3, 2, 1]);
}

#[rstest]
fn test_map_and_filter_compose() {
    let set = OrderedSet::new().extend(1..=6);

    let transformed = set
        .filter(|element| element % 2 == 0)
        .map(|element| element * 10);

    let elements: Vec<i32> = transformed.iter().copied().collect();
    assert_eq!(elements, vec![20, 40, 60]);
}
