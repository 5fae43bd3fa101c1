//! Type kind tag.

use std::fmt;

/// Kind of a type in the pool.
///
/// Tags are closed: codegen dispatches on them with exhaustive matches.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum Tag {
    // === Primitives ===
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    /// `string`, natively `{ptr, len}`.
    Str,
    /// `unsafe.Pointer`.
    UnsafePointer,
    /// `interface{}`, natively `{typecode, value}`.
    Interface,

    // === Constructed ===
    /// `*T`.
    Pointer,
    /// `[N]T`.
    Array,
    /// `[]T`, natively `{ptr, len, cap}`.
    Slice,
    /// `map[K]V`, a runtime-owned handle.
    Map,
    /// Function value.
    Func,
    /// Struct with ordered (possibly unnamed) fields.
    Struct,
    /// Named type wrapping an underlying type.
    Named,
}

impl Tag {
    /// True for the fixed-size integer tags, including `uintptr`.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Tag::Int8
                | Tag::Int16
                | Tag::Int32
                | Tag::Int64
                | Tag::Uint8
                | Tag::Uint16
                | Tag::Uint32
                | Tag::Uint64
                | Tag::Uintptr
        )
    }

    /// True for `float32` and `float64`.
    pub const fn is_float(self) -> bool {
        matches!(self, Tag::Float32 | Tag::Float64)
    }

    /// True for tags pre-interned in every pool.
    pub const fn is_primitive(self) -> bool {
        (self as u8) <= (Tag::Interface as u8)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Bool => "bool",
            Tag::Int8 => "int8",
            Tag::Int16 => "int16",
            Tag::Int32 => "int32",
            Tag::Int64 => "int64",
            Tag::Uint8 => "uint8",
            Tag::Uint16 => "uint16",
            Tag::Uint32 => "uint32",
            Tag::Uint64 => "uint64",
            Tag::Uintptr => "uintptr",
            Tag::Float32 => "float32",
            Tag::Float64 => "float64",
            Tag::Str => "string",
            Tag::UnsafePointer => "unsafe.Pointer",
            Tag::Interface => "interface",
            Tag::Pointer => "pointer",
            Tag::Array => "array",
            Tag::Slice => "slice",
            Tag::Map => "map",
            Tag::Func => "func",
            Tag::Struct => "struct",
            Tag::Named => "named",
        };
        f.write_str(name)
    }
}
