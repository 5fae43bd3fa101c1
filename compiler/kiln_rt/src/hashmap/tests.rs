use pretty_assertions::assert_eq;

use super::*;

#[test]
fn make_sizes_bucket_array_from_hint() {
    assert_eq!(Hashmap::make(4, 4, 0).bucket_count(), 1);
    assert_eq!(Hashmap::make(4, 4, 8).bucket_count(), 1);
    assert_eq!(Hashmap::make(4, 4, 9).bucket_count(), 2);
    assert_eq!(Hashmap::make(4, 4, 64).bucket_count(), 8);
    assert_eq!(Hashmap::make(4, 4, 65).bucket_count(), 16);
}

#[test]
fn string_get_absent_zero_fills() {
    let map = Hashmap::make(16, 4, 0);
    let mut out = [0xaa; 4];
    assert!(!map.string_get(b"missing", &mut out));
    assert_eq!(out, [0, 0, 0, 0]);
}

#[test]
fn string_set_get_overwrite_delete() {
    let mut map = Hashmap::make(16, 2, 0);
    map.string_set(b"one", &[1, 0]);
    map.string_set(b"two", &[2, 0]);
    assert_eq!(map.len(), 2);

    let mut out = [0; 2];
    assert!(map.string_get(b"one", &mut out));
    assert_eq!(out, [1, 0]);

    map.string_set(b"one", &[9, 9]);
    assert_eq!(map.len(), 2);
    assert!(map.string_get(b"one", &mut out));
    assert_eq!(out, [9, 9]);

    map.string_delete(b"one");
    assert_eq!(map.len(), 1);
    assert!(!map.string_get(b"one", &mut out));
    assert_eq!(out, [0, 0]);

    // Absent delete is a no-op.
    map.string_delete(b"one");
    assert_eq!(map.len(), 1);
}

#[test]
fn string_keys_compare_by_content() {
    let mut map = Hashmap::make(16, 1, 0);
    let owned = String::from("key");
    map.string_set(owned.as_bytes(), &[7]);
    let mut out = [0; 1];
    assert!(map.string_get(b"key", &mut out));
    assert_eq!(out, [7]);
    assert!(!map.string_get(b"key ", &mut out));
}

#[test]
fn binary_keys_compare_by_memory() {
    let mut map = Hashmap::make(8, 4, 0);
    let k1 = 1i32.to_le_bytes().into_iter().chain(2i32.to_le_bytes()).collect::<Vec<_>>();
    let k2 = 2i32.to_le_bytes().into_iter().chain(1i32.to_le_bytes()).collect::<Vec<_>>();
    map.binary_set(&k1, &10u32.to_le_bytes());
    map.binary_set(&k2, &20u32.to_le_bytes());

    let mut out = [0; 4];
    assert!(map.binary_get(&k1, &mut out));
    assert_eq!(u32::from_le_bytes(out), 10);
    assert!(map.binary_get(&k2, &mut out));
    assert_eq!(u32::from_le_bytes(out), 20);

    map.binary_delete(&k1);
    assert!(!map.binary_get(&k1, &mut out));
    assert_eq!(out, [0; 4]);
    assert_eq!(map.len(), 1);
}

#[test]
fn overflow_buckets_hold_more_than_one_bucket() {
    // One bucket; every entry past the eighth lands in an overflow bucket.
    let mut map = Hashmap::make(8, 8, 0);
    assert_eq!(map.bucket_count(), 1);
    for i in 0u64..100 {
        map.binary_set(&i.to_le_bytes(), &(i * 3).to_le_bytes());
    }
    assert_eq!(map.len(), 100);

    let mut out = [0; 8];
    for i in 0u64..100 {
        assert!(map.binary_get(&i.to_le_bytes(), &mut out), "key {i} missing");
        assert_eq!(u64::from_le_bytes(out), i * 3);
    }

    for i in (0u64..100).step_by(2) {
        map.binary_delete(&i.to_le_bytes());
    }
    assert_eq!(map.len(), 50);
    assert!(!map.binary_get(&4u64.to_le_bytes(), &mut out));
    assert!(map.binary_get(&5u64.to_le_bytes(), &mut out));
}

#[test]
fn deleted_slot_is_reused() {
    let mut map = Hashmap::make(1, 1, 0);
    for b in 0u8..8 {
        map.binary_set(&[b], &[b]);
    }
    map.binary_delete(&[3]);
    map.binary_set(&[42], &[42]);
    assert_eq!(map.len(), 8);
    let mut out = [0; 1];
    assert!(map.binary_get(&[42], &mut out));
    assert_eq!(out, [42]);
}

#[test]
fn zero_sized_values() {
    let mut map = Hashmap::make(4, 0, 0);
    map.binary_set(&[1, 2, 3, 4], &[]);
    let mut out: [u8; 0] = [];
    assert!(map.binary_get(&[1, 2, 3, 4], &mut out));
    assert!(!map.binary_get(&[4, 3, 2, 1], &mut out));
}
