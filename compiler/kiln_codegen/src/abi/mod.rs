//! Aggregate flattening for the native calling convention.
//!
//! An aggregate argument whose elementary fields number at most
//! [`MAX_FIELDS_PER_PARAM`] is passed as those fields, one native argument
//! each, in declaration order (nested aggregates are walked in order). A
//! larger aggregate is passed as a single value. Elementary types, arrays
//! included, are always passed as themselves.
//!
//! ```text
//! struct{a int32; b struct{c bool; d int16}}   ->  int32, bool, int16
//! string                                       ->  unsafe.Pointer, uintptr
//! struct{a, b, c, d int8}                      ->  struct{a, b, c, d int8}
//! ```
//!
//! The functions here are type-level only. The value-level counterparts
//! (expanding a value at a call site, collapsing native parameters at
//! function entry) live on [`FunctionLowerer`](crate::FunctionLowerer) and
//! must always agree with these.

use kiln_types::{Idx, LayoutOracle, Pool};

/// Most native arguments a single aggregate may be split into.
pub const MAX_FIELDS_PER_PARAM: usize = 3;

/// Number of implicit trailing parameters every function takes: an unused
/// context pointer and a suspension-handle pointer.
pub const IMPLICIT_PARAM_COUNT: usize = 2;

/// Type of both implicit trailing parameters.
pub const IMPLICIT_PARAM_TYPE: Idx = Idx::UNSAFE_POINTER;

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Elementary field types of `ty` in declaration order, recursively.
///
/// An elementary type flattens to itself. An empty struct flattens to
/// nothing.
pub fn flatten_aggregate_type(pool: &Pool, ty: Idx) -> Vec<Idx> {
    let mut out = Vec::new();
    flatten_into(pool, ty, &mut out);
    out
}

fn flatten_into(pool: &Pool, ty: Idx, out: &mut Vec<Idx>) {
    match pool.aggregate_fields(ty) {
        Some(fields) => {
            for field in fields {
                flatten_into(pool, field, out);
            }
        }
        None => out.push(ty),
    }
}

/// Number of entries [`flatten_aggregate_type`] would return.
pub fn flattened_len(pool: &Pool, ty: Idx) -> usize {
    match pool.aggregate_fields(ty) {
        Some(fields) => fields.into_iter().map(|f| flattened_len(pool, f)).sum(),
        None => 1,
    }
}

/// Byte offset of every flattened field from the start of `ty`.
///
/// Same length and order as [`flatten_aggregate_type`].
pub fn flatten_aggregate_type_offsets<L>(pool: &Pool, layout: &L, ty: Idx) -> Vec<u64>
where
    L: LayoutOracle + ?Sized,
{
    let mut out = Vec::new();
    offsets_into(pool, layout, ty, 0, &mut out);
    out
}

fn offsets_into<L>(pool: &Pool, layout: &L, ty: Idx, base: u64, out: &mut Vec<u64>)
where
    L: LayoutOracle + ?Sized,
{
    match pool.aggregate_fields(ty) {
        Some(fields) => {
            for (i, field) in fields.into_iter().enumerate() {
                let offset = base + layout.element_offset(pool, ty, i);
                offsets_into(pool, layout, field, offset, out);
            }
        }
        None => out.push(base),
    }
}

// ---------------------------------------------------------------------------
// Formal parameters
// ---------------------------------------------------------------------------

/// True if a value of `ty` is split into its flattened fields when passed.
#[inline]
pub fn is_expanded(pool: &Pool, ty: Idx) -> bool {
    pool.is_aggregate(ty) && flattened_len(pool, ty) <= MAX_FIELDS_PER_PARAM
}

/// Native parameter types for one source parameter of type `ty`.
pub fn expand_formal_param_type(pool: &Pool, ty: Idx) -> Vec<Idx> {
    if is_expanded(pool, ty) {
        flatten_aggregate_type(pool, ty)
    } else {
        vec![ty]
    }
}

/// Byte offsets of the native parameters [`expand_formal_param_type`]
/// yields, relative to the start of the source value.
pub fn expand_formal_param_offsets<L>(pool: &Pool, layout: &L, ty: Idx) -> Vec<u64>
where
    L: LayoutOracle + ?Sized,
{
    if is_expanded(pool, ty) {
        flatten_aggregate_type_offsets(pool, layout, ty)
    } else {
        vec![0]
    }
}

/// Full native parameter list for a function with source parameters
/// `params`, implicit trailing parameters included.
pub fn native_param_types(pool: &Pool, params: &[Idx]) -> Vec<Idx> {
    let mut native: Vec<Idx> = params
        .iter()
        .flat_map(|&ty| expand_formal_param_type(pool, ty))
        .collect();
    native.extend([IMPLICIT_PARAM_TYPE; IMPLICIT_PARAM_COUNT]);
    native
}
