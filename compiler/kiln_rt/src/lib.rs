//! Kiln Runtime Library (`kiln_rt`)
//!
//! Runtime support for maps in AOT-compiled Kiln programs. Codegen never
//! looks inside a map: it holds an opaque handle and calls one of the entry
//! points named in [`names`], passing keys either by value (string keys) or
//! through caller-owned scratch memory (binary keys).
//!
//! # Function Categories
//!
//! - **Hashing**: [`hashmap_hash`] (FNV-1a), [`hashmap_top_hash`]
//! - **String keys**: `hashmapStringGet`, `hashmapStringSet`, `hashmapStringDelete`
//! - **Binary keys**: `hashmapBinaryGet`, `hashmapBinarySet`, `hashmapBinaryDelete`
//! - **Lifecycle**: `hashmapMake`, `hashmapLen`

mod hash;
mod hashmap;

pub use hash::{hashmap_hash, hashmap_top_hash, FNV_OFFSET_BASIS, FNV_PRIME};
pub use hashmap::{Hashmap, BUCKET_SLOTS};

/// Entry-point names, shared by codegen declarations and the runtime.
///
/// Codegen declares each of these under the `runtime.` namespace.
pub mod names {
    pub const HASHMAP_MAKE: &str = "hashmapMake";
    pub const HASHMAP_LEN: &str = "hashmapLen";
    pub const HASHMAP_STRING_GET: &str = "hashmapStringGet";
    pub const HASHMAP_STRING_SET: &str = "hashmapStringSet";
    pub const HASHMAP_STRING_DELETE: &str = "hashmapStringDelete";
    pub const HASHMAP_BINARY_GET: &str = "hashmapBinaryGet";
    pub const HASHMAP_BINARY_SET: &str = "hashmapBinarySet";
    pub const HASHMAP_BINARY_DELETE: &str = "hashmapBinaryDelete";

    /// Every entry point, in declaration order.
    pub const ALL: [&str; 8] = [
        HASHMAP_MAKE,
        HASHMAP_LEN,
        HASHMAP_STRING_GET,
        HASHMAP_STRING_SET,
        HASHMAP_STRING_DELETE,
        HASHMAP_BINARY_GET,
        HASHMAP_BINARY_SET,
        HASHMAP_BINARY_DELETE,
    ];
}
