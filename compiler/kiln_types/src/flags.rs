//! Pre-computed type metadata flags.
//!
//! `TypeFlags` are computed once when a type is interned, so property
//! queries never walk the type graph again.
//!
//! Presence flags propagate only through inline containment (struct fields,
//! array elements, named underlying types). A pointer to a string does not
//! contain a string: the pointee lives elsewhere.

use bitflags::bitflags;

bitflags! {
    /// Pre-computed type properties for O(1) queries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        // === Presence Flags ===

        /// Contains a `string` inline.
        const HAS_STRING = 1 << 0;
        /// Contains an interface (dynamic value) inline.
        const HAS_DYNAMIC = 1 << 1;
        /// Contains a floating point value inline.
        const HAS_FLOAT = 1 << 2;

        // === Category Flags ===

        /// Pre-interned primitive.
        const IS_PRIMITIVE = 1 << 8;
        /// Lowers to a native struct (can be flattened).
        const IS_AGGREGATE = 1 << 9;
        /// Named type.
        const IS_NAMED = 1 << 10;
    }
}

impl TypeFlags {
    /// Presence flags that a container inherits from a type it holds inline.
    pub const INHERITED: Self = Self::HAS_STRING
        .union(Self::HAS_DYNAMIC)
        .union(Self::HAS_FLOAT);

    /// The presence flags of `self` a container should inherit.
    #[inline]
    #[must_use]
    pub fn inherited(self) -> Self {
        self & Self::INHERITED
    }
}
