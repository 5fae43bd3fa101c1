//! The runtime hashmap.
//!
//! A map is an array of buckets, each holding [`BUCKET_SLOTS`] entries and a
//! parallel array of top-hash tags. A zero tag marks an empty slot. When every
//! slot of a bucket is taken, a new overflow bucket is chained behind it. The
//! bucket count is fixed at creation from the size hint; the map never grows
//! its bucket array.
//!
//! Keys are stored as raw bytes. String keys are variable length and compare
//! by content; binary keys are exactly `key_size` bytes and compare by memory
//! equality. A single map only ever sees one of the two key kinds, because
//! codegen picks the entry points from the key type.

use crate::{hashmap_hash, hashmap_top_hash};

/// Entries per bucket.
pub const BUCKET_SLOTS: usize = 8;

struct Slot {
    key: Box<[u8]>,
    value: Box<[u8]>,
}

#[derive(Default)]
struct Bucket {
    tophash: [u8; BUCKET_SLOTS],
    slots: [Option<Slot>; BUCKET_SLOTS],
    overflow: Option<Box<Bucket>>,
}

/// A runtime map instance. Codegen only ever holds a handle to one.
pub struct Hashmap {
    buckets: Vec<Bucket>,
    bucket_mask: u32,
    key_size: usize,
    value_size: usize,
    count: usize,
}

impl std::fmt::Debug for Hashmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hashmap")
            .field("buckets", &self.buckets.len())
            .field("key_size", &self.key_size)
            .field("value_size", &self.value_size)
            .field("count", &self.count)
            .finish()
    }
}

impl Hashmap {
    /// `hashmapMake`: a map for `key_size`/`value_size` byte entries, with
    /// room for `size_hint` entries before overflow buckets are needed.
    pub fn make(key_size: usize, value_size: usize, size_hint: usize) -> Self {
        let mut bucket_bits = 0u32;
        while (BUCKET_SLOTS << bucket_bits) < size_hint && bucket_bits < 24 {
            bucket_bits += 1;
        }
        let bucket_count = 1usize << bucket_bits;
        tracing::trace!(key_size, value_size, size_hint, bucket_count, "hashmapMake");
        Hashmap {
            buckets: std::iter::repeat_with(Bucket::default)
                .take(bucket_count)
                .collect(),
            bucket_mask: (bucket_count - 1) as u32,
            key_size,
            value_size,
            count: 0,
        }
    }

    /// `hashmapLen`: number of live entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of top-level buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    // -- String keys --

    /// `hashmapStringGet`: copy the value for `key` into `out`, or zero-fill
    /// `out` if absent. Returns the presence flag.
    pub fn string_get(&self, key: &[u8], out: &mut [u8]) -> bool {
        self.get(key, out)
    }

    /// `hashmapStringSet`: insert or overwrite.
    pub fn string_set(&mut self, key: &[u8], value: &[u8]) {
        self.set(key, value);
    }

    /// `hashmapStringDelete`: remove `key`; no-op if absent.
    pub fn string_delete(&mut self, key: &[u8]) {
        self.delete(key);
    }

    // -- Binary keys --

    /// `hashmapBinaryGet`: like [`Hashmap::string_get`] for a `key_size`-byte key.
    pub fn binary_get(&self, key: &[u8], out: &mut [u8]) -> bool {
        self.get(self.binary_key(key), out)
    }

    /// `hashmapBinarySet`: insert or overwrite a `key_size`-byte key.
    pub fn binary_set(&mut self, key: &[u8], value: &[u8]) {
        let key = self.binary_key(key).to_vec();
        self.set(&key, value);
    }

    /// `hashmapBinaryDelete`: remove a `key_size`-byte key; no-op if absent.
    pub fn binary_delete(&mut self, key: &[u8]) {
        let key = self.binary_key(key).to_vec();
        self.delete(&key);
    }

    fn binary_key<'k>(&self, key: &'k [u8]) -> &'k [u8] {
        debug_assert_eq!(key.len(), self.key_size, "binary key has wrong size");
        key.get(..self.key_size).unwrap_or(key)
    }

    // -- Shared implementation --

    fn bucket_for(&self, hash: u32) -> usize {
        (hash & self.bucket_mask) as usize
    }

    fn get(&self, key: &[u8], out: &mut [u8]) -> bool {
        let hash = hashmap_hash(key);
        let tophash = hashmap_top_hash(hash);
        let mut bucket = Some(&self.buckets[self.bucket_for(hash)]);
        while let Some(b) = bucket {
            for (i, slot) in b.slots.iter().enumerate() {
                if b.tophash[i] != tophash {
                    continue;
                }
                if let Some(slot) = slot {
                    if *slot.key == *key {
                        copy_value(out, &slot.value);
                        return true;
                    }
                }
            }
            bucket = b.overflow.as_deref();
        }
        out.fill(0);
        false
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        let hash = hashmap_hash(key);
        let tophash = hashmap_top_hash(hash);
        let value_size = self.value_size;
        let index = self.bucket_for(hash);
        let mut bucket = &mut self.buckets[index];

        // First pass: overwrite an existing entry.
        {
            let mut cursor = Some(&mut *bucket);
            while let Some(b) = cursor {
                for (i, slot) in b.slots.iter_mut().enumerate() {
                    if b.tophash[i] != tophash {
                        continue;
                    }
                    if let Some(slot) = slot {
                        if *slot.key == *key {
                            slot.value = sized_value(value, value_size);
                            return;
                        }
                    }
                }
                cursor = b.overflow.as_deref_mut();
            }
        }

        // Second pass: take the first empty slot, chaining a bucket if full.
        loop {
            if let Some(i) = bucket.tophash.iter().position(|&t| t == 0) {
                bucket.tophash[i] = tophash;
                bucket.slots[i] = Some(Slot {
                    key: key.into(),
                    value: sized_value(value, value_size),
                });
                self.count += 1;
                return;
            }
            if bucket.overflow.is_none() {
                tracing::trace!(bucket = index, "hashmap: chaining overflow bucket");
            }
            bucket = &mut **bucket.overflow.get_or_insert_with(Box::default);
        }
    }

    fn delete(&mut self, key: &[u8]) {
        let hash = hashmap_hash(key);
        let tophash = hashmap_top_hash(hash);
        let index = self.bucket_for(hash);
        let mut cursor = Some(&mut self.buckets[index]);
        while let Some(b) = cursor {
            for i in 0..BUCKET_SLOTS {
                if b.tophash[i] != tophash {
                    continue;
                }
                let matches = b.slots[i].as_ref().is_some_and(|slot| *slot.key == *key);
                if matches {
                    b.tophash[i] = 0;
                    b.slots[i] = None;
                    self.count -= 1;
                    return;
                }
            }
            cursor = b.overflow.as_deref_mut();
        }
    }
}

/// Copy a stored value into `out`, zero-filling any bytes it does not cover.
fn copy_value(out: &mut [u8], value: &[u8]) {
    let n = out.len().min(value.len());
    out[..n].copy_from_slice(&value[..n]);
    out[n..].fill(0);
}

/// `value` truncated or zero-padded to exactly `size` bytes.
fn sized_value(value: &[u8], size: usize) -> Box<[u8]> {
    debug_assert_eq!(value.len(), size, "map value has wrong size");
    let mut stored = vec![0u8; size];
    let n = size.min(value.len());
    stored[..n].copy_from_slice(&value[..n]);
    stored.into_boxed_slice()
}

#[cfg(test)]
mod tests;
