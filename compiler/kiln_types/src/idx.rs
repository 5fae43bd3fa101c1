//! Type index handle.
//!
//! `Idx` is the only way the backend refers to a type. Primitive types are
//! pre-interned at fixed indices so they can be named as constants without
//! a pool in hand.

use std::fmt;

/// A 32-bit index into the type [`Pool`](crate::Pool).
///
/// Types are compared by index equality, not structurally.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Primitive Types (indices 0-14) ===

    /// `bool`.
    pub const BOOL: Self = Self(0);
    /// `int8`.
    pub const INT8: Self = Self(1);
    /// `int16`.
    pub const INT16: Self = Self(2);
    /// `int32`.
    pub const INT32: Self = Self(3);
    /// `int64`.
    pub const INT64: Self = Self(4);
    /// `uint8`.
    pub const UINT8: Self = Self(5);
    /// `uint16`.
    pub const UINT16: Self = Self(6);
    /// `uint32`.
    pub const UINT32: Self = Self(7);
    /// `uint64`.
    pub const UINT64: Self = Self(8);
    /// `uintptr` (pointer-sized unsigned integer).
    pub const UINTPTR: Self = Self(9);
    /// `float32`.
    pub const FLOAT32: Self = Self(10);
    /// `float64`.
    pub const FLOAT64: Self = Self(11);
    /// `string`.
    pub const STR: Self = Self(12);
    /// `unsafe.Pointer` (untyped pointer).
    pub const UNSAFE_POINTER: Self = Self(13);
    /// `interface{}` (dynamic value).
    pub const INTERFACE: Self = Self(14);

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 15;

    /// Sentinel value indicating no type.
    pub const NONE: Self = Self(u32::MAX);

    /// Create an index from a raw value.
    ///
    /// The caller must make sure the index is valid in the pool it is used with.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for pre-interned primitive types.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    /// True for the `NONE` sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Source name of a primitive type, `None` for everything else.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("bool"),
            1 => Some("int8"),
            2 => Some("int16"),
            3 => Some("int32"),
            4 => Some("int64"),
            5 => Some("uint8"),
            6 => Some("uint16"),
            7 => Some("uint32"),
            8 => Some("uint64"),
            9 => Some("uintptr"),
            10 => Some("float32"),
            11 => Some("float64"),
            12 => Some("string"),
            13 => Some("unsafe.Pointer"),
            14 => Some("interface{}"),
            _ => None,
        }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Idx::NONE");
        }
        match self.name() {
            Some(name) => write!(f, "Idx({name})"),
            None => write!(f, "Idx({})", self.0),
        }
    }
}
