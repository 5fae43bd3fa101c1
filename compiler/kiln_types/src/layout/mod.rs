//! Target data layout.
//!
//! The backend never hard-codes sizes or field offsets: it asks a
//! [`LayoutOracle`]. [`TargetLayout`] is the oracle used for real targets
//! and follows natural C alignment rules:
//!
//! - Every field is placed at the next multiple of its alignment.
//! - A struct is aligned to its most-aligned field and its size is rounded
//!   up to that alignment.
//! - An empty struct has size 0 and alignment 1.
//! - An array is `len` back-to-back elements, aligned like its element.

use crate::{Idx, Pool, Tag};

/// Answers size, alignment and field-offset queries for a target.
///
/// Implementations must be pure: the same query always yields the same
/// answer, so an oracle can be shared between concurrently lowered units.
pub trait LayoutOracle: Sync {
    /// Size of a pointer in bytes.
    fn pointer_size(&self) -> u64;

    /// Allocation size of `ty` in bytes, including tail padding.
    fn size_of(&self, pool: &Pool, ty: Idx) -> u64;

    /// ABI alignment of `ty` in bytes.
    fn align_of(&self, pool: &Pool, ty: Idx) -> u64;

    /// Byte offset of native field `index` within aggregate `ty`.
    fn element_offset(&self, pool: &Pool, ty: Idx, index: usize) -> u64;
}

/// Natural-alignment layout for a target with the given pointer width.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetLayout {
    pointer_size: u64,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self::target_64()
    }
}

/// Field offsets plus overall size and alignment of an aggregate.
struct StructLayout {
    offsets: Vec<u64>,
    size: u64,
    align: u64,
}

#[inline]
fn align_to(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
    (value + align - 1) & !(align - 1)
}

impl TargetLayout {
    /// Layout for a target with `pointer_size`-byte pointers.
    pub const fn new(pointer_size: u64) -> Self {
        TargetLayout { pointer_size }
    }

    /// 64-bit target (x86-64, aarch64).
    pub const fn target_64() -> Self {
        Self::new(8)
    }

    /// 32-bit target (wasm32, armv7, most microcontrollers).
    pub const fn target_32() -> Self {
        Self::new(4)
    }

    fn struct_layout(&self, pool: &Pool, ty: Idx) -> StructLayout {
        let fields = pool.aggregate_fields(ty).unwrap_or_default();
        let mut offsets = Vec::with_capacity(fields.len());
        let mut offset = 0;
        let mut align = 1;
        for field in fields {
            let field_align = self.align_of(pool, field);
            offset = align_to(offset, field_align);
            offsets.push(offset);
            offset += self.size_of(pool, field);
            align = align.max(field_align);
        }
        StructLayout {
            offsets,
            size: align_to(offset, align),
            align,
        }
    }
}

impl LayoutOracle for TargetLayout {
    fn pointer_size(&self) -> u64 {
        self.pointer_size
    }

    fn size_of(&self, pool: &Pool, ty: Idx) -> u64 {
        let ty = pool.underlying(ty);
        match pool.tag(ty) {
            Tag::Bool | Tag::Int8 | Tag::Uint8 => 1,
            Tag::Int16 | Tag::Uint16 => 2,
            Tag::Int32 | Tag::Uint32 | Tag::Float32 => 4,
            Tag::Int64 | Tag::Uint64 | Tag::Float64 => 8,
            Tag::Uintptr | Tag::UnsafePointer | Tag::Pointer | Tag::Map | Tag::Func => {
                self.pointer_size
            }
            Tag::Array => match pool.array_elem(ty) {
                Some((elem, len)) => self.size_of(pool, elem) * len,
                None => 0,
            },
            Tag::Str | Tag::Interface | Tag::Slice | Tag::Struct | Tag::Named => {
                self.struct_layout(pool, ty).size
            }
        }
    }

    fn align_of(&self, pool: &Pool, ty: Idx) -> u64 {
        let ty = pool.underlying(ty);
        match pool.tag(ty) {
            Tag::Array => match pool.array_elem(ty) {
                Some((elem, _)) => self.align_of(pool, elem),
                None => 1,
            },
            Tag::Str | Tag::Interface | Tag::Slice | Tag::Struct | Tag::Named => {
                self.struct_layout(pool, ty).align
            }
            _ => self.size_of(pool, ty).clamp(1, 8),
        }
    }

    fn element_offset(&self, pool: &Pool, ty: Idx, index: usize) -> u64 {
        let layout = self.struct_layout(pool, ty);
        match layout.offsets.get(index) {
            Some(&offset) => offset,
            None => {
                tracing::error!(
                    ty = %pool.display(ty),
                    index,
                    fields = layout.offsets.len(),
                    "element_offset: field index out of range"
                );
                debug_assert!(false, "field index {index} out of range");
                layout.size
            }
        }
    }
}
