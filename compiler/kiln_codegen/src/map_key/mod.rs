//! Map key classification.
//!
//! The runtime offers two families of map entry points: one for string keys
//! (hashed and compared by content) and one for keys that can be hashed and
//! compared as raw memory. Every other key type is rejected.

use std::fmt;

use kiln_types::{Idx, Pool, Tag, TypeFlags};

/// How the runtime handles keys of a given type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// `string` (or a named string): `hashmapString*` entry points.
    String,
    /// Memory-comparable: `hashmapBinary*` entry points, key passed by pointer.
    BinaryComparable,
    /// Neither; map operations on it are rejected with a diagnostic.
    Unsupported,
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyClass::String => f.write_str("string"),
            KeyClass::BinaryComparable => f.write_str("binary"),
            KeyClass::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// Classify a map key type.
pub fn classify_map_key(pool: &Pool, key: Idx) -> KeyClass {
    if pool.tag(pool.underlying(key)) == Tag::Str {
        KeyClass::String
    } else if is_binary_key(pool, key) {
        KeyClass::BinaryComparable
    } else {
        KeyClass::Unsupported
    }
}

/// True if equal keys of type `ty` are always equal as raw memory: no
/// strings, interfaces, floats, slices, maps or functions anywhere inline.
pub fn is_binary_key(pool: &Pool, ty: Idx) -> bool {
    // Fast reject on pre-computed presence flags.
    let flags = pool.flags(ty);
    if flags.intersects(TypeFlags::HAS_STRING | TypeFlags::HAS_DYNAMIC | TypeFlags::HAS_FLOAT) {
        return false;
    }

    let ty = pool.underlying(ty);
    match pool.tag(ty) {
        Tag::Bool | Tag::Pointer | Tag::UnsafePointer => true,
        tag if tag.is_integer() => true,
        Tag::Struct => pool
            .struct_fields(ty)
            .iter()
            .all(|field| is_binary_key(pool, field.ty)),
        Tag::Array => pool
            .array_elem(ty)
            .is_some_and(|(elem, _)| is_binary_key(pool, elem)),
        _ => false,
    }
}

/// Diagnostic text for a map operation on an unsupported key type.
pub fn unsupported_key_message(pool: &Pool, key: Idx) -> String {
    format!(
        "only strings, bools, ints, pointers or structs of bools/ints are supported as map keys, but got: {}",
        pool.display(key)
    )
}
