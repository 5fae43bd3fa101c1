//! Opaque ID newtypes and `ValueArena` for the `IrBuilder`.
//!
//! Every value a function body computes is stored once in a `ValueArena`
//! and referenced by a `Copy` handle. Each ID is a `u32` index into the
//! corresponding arena `Vec`.
//!
//! Values are immutable: an instruction that "modifies" an aggregate
//! (`insert_value`) produces a new value and leaves its input untouched.

use std::fmt;

use kiln_types::Idx;

use crate::{CodegenResult, InternalError};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

/// Opaque handle to a value stored in a `ValueArena`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(u32);

/// Opaque handle to a function in a [`FunctionTable`](crate::FunctionTable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(u32);

impl ValueId {
    /// The raw index.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl FunctionId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        FunctionId(index as u32)
    }

    /// The raw index.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// Value data
// ---------------------------------------------------------------------------

/// How a value came to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Native parameter `n` of the enclosing function.
    Param(u32),
    /// Undefined contents (the implicit context argument, fresh aggregates).
    Undef,
    /// Null pointer.
    Null,
    /// All-zero value of its type.
    Zero,
    /// Integer constant, stored as its bit pattern.
    ConstInt(u64),
    /// Boolean constant.
    ConstBool(bool),
    /// String constant.
    ConstStr(Box<str>),
    /// Result of instruction `n` of the body.
    Instr(u32),
}

/// A value and its type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueData {
    pub ty: Idx,
    pub kind: ValueKind,
}

// ---------------------------------------------------------------------------
// ValueArena
// ---------------------------------------------------------------------------

/// Stores values behind opaque IDs.
///
/// Each `push` allocates a slot and returns an ID; lookups by an ID that
/// this arena never handed out are reported as internal errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueArena {
    values: Vec<ValueData>,
}

impl ValueArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning its ID.
    #[inline]
    pub(crate) fn push(&mut self, ty: Idx, kind: ValueKind) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData { ty, kind });
        id
    }

    /// Retrieve a value by ID.
    #[inline]
    pub fn get(&self, id: ValueId) -> CodegenResult<&ValueData> {
        self.values
            .get(id.index())
            .ok_or(InternalError::UnknownValue(id))
    }

    /// Type of a value.
    #[inline]
    pub fn ty(&self, id: ValueId) -> CodegenResult<Idx> {
        self.get(id).map(|data| data.ty)
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values with their IDs, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &ValueData)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, data)| (ValueId(i as u32), data))
    }
}
