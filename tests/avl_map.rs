use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use catalog_index::AvlMap;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys in a range smaller than `TEST_SIZE` so that collisions happen.
fn key_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
    ]
}

/// Smallest possible node count of an AVL tree of height `h`.
fn min_avl_nodes(h: u32) -> usize {
    let (mut a, mut b) = (0usize, 1usize);
    for _ in 1..h {
        (a, b) = (b, a + b + 1);
    }
    if h == 0 { 0 } else { b }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on `AvlMap` and `BTreeMap` and asserts identical results.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut avl: AvlMap<i64, i64> = AvlMap::new();
        let mut bt: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(avl.insert(*k, *v), bt.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(avl.remove(k), bt.remove(k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(avl.get(k), bt.get(k), "get({})", k);
                }
            }
            // A tree of height h holds at least min_avl_nodes(h) entries.
            prop_assert!(min_avl_nodes(avl.height()) <= avl.len());
        }

        prop_assert!(avl.iter().eq(bt.iter()));
        prop_assert!(avl.reverse_order().eq(bt.iter().rev()));
    }

    #[test]
    fn reverse_order_is_reversed_in_order(keys in proptest::collection::vec(any::<u32>(), 0..500)) {
        let map: AvlMap<u32, u32> = keys.iter().map(|&k| (k, k / 2)).collect();
        let mut forward: Vec<_> = map.in_order().collect();
        forward.reverse();
        let backward: Vec<_> = map.reverse_order().collect();
        prop_assert_eq!(forward, backward);
    }
}

#[test]
fn sequential_inserts_stay_balanced() {
    let mut map = AvlMap::new();
    for key in 0..1023 {
        map.insert(key, ());
    }
    assert_eq!(map.height(), 10);
    assert_eq!(map.first_key_value(), Some((&0, &())));
    assert_eq!(map.last_key_value(), Some((&1022, &())));
}

#[test]
fn string_keys_can_be_looked_up_by_str() {
    let mut map = AvlMap::new();
    map.insert(String::from("Heat"), 1995);
    map.insert(String::from("Alien"), 1979);

    assert_eq!(map.get("Heat"), Some(&1995));
    assert!(map.contains_key("Alien"));
    *map.get_mut("Alien").unwrap() += 7;
    assert_eq!(map.remove_entry("Alien"), Some((String::from("Alien"), 1986)));
    assert_eq!(map.keys().collect::<Vec<_>>(), ["Heat"]);
}

#[test]
fn clone_and_clear_are_independent() {
    let mut map: AvlMap<i32, i32> = (0..50).map(|k| (k, -k)).collect();
    let snapshot = map.clone();
    map.clear();

    assert!(map.is_empty());
    assert_eq!(snapshot.len(), 50);
    assert_eq!(snapshot.values().copied().sum::<i32>(), -(0..50).sum::<i32>());
    assert_ne!(map, snapshot);
}
