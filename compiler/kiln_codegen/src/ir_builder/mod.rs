//! ID-based instruction builder.
//!
//! `IrBuilder` records a function body as a flat list of instructions over
//! values stored in a [`ValueArena`]. Callers only ever handle opaque
//! `ValueId`s. A finished body is a [`Body`], which owns everything it
//! refers to and can be handed across threads.
//!
//! # Method Organization
//!
//! | Category | Methods |
//! |----------|---------|
//! | Constants | `undef`, `null`, `zero`, `const_int`, `const_bool`, `const_str` |
//! | Memory | `alloca`, `create_temporary_alloca`, `load`, `store`, `emit_lifetime_end` |
//! | Aggregates | `extract_value`, `insert_value` |
//! | Calls | `call`, `ret` |

mod aggregates;
mod calls;
mod constants;
mod display;
mod memory;

use kiln_types::{Idx, Pool};
use smallvec::SmallVec;

pub use memory::Scratch;

use crate::value_id::{ValueArena, ValueKind};
use crate::{CodegenResult, FunctionId, InternalError, ValueId};

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// One recorded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    /// Read field `index` of an aggregate.
    ExtractValue { agg: ValueId, index: u32 },
    /// Copy of `agg` with field `index` replaced by `value`.
    InsertValue {
        agg: ValueId,
        value: ValueId,
        index: u32,
    },
    /// Stack slot for one value of type `ty`; yields a pointer.
    Alloca { ty: Idx },
    /// Write `value` to the slot at `ptr`.
    Store { ptr: ValueId, value: ValueId },
    /// Read a `ty` from the slot at `ptr`.
    Load { ptr: ValueId, ty: Idx },
    /// The slot at `ptr` (of `size` bytes) becomes live.
    LifetimeStart { ptr: ValueId, size: u64 },
    /// The slot at `ptr` (of `size` bytes) is dead from here on.
    LifetimeEnd { ptr: ValueId, size: u64 },
    /// Direct call with already-expanded native arguments.
    Call {
        callee: FunctionId,
        args: SmallVec<[ValueId; 8]>,
    },
    /// Return from the function.
    Ret(Option<ValueId>),
}

/// An instruction and the value it defines, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inst {
    pub instr: Instr,
    pub result: Option<ValueId>,
}

/// A finished function body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    /// Every value the body refers to.
    pub values: ValueArena,
    /// Instructions in execution order.
    pub instrs: Vec<Inst>,
    /// Native parameter values, in order.
    pub params: Vec<ValueId>,
}

impl Body {
    /// Callees of every call instruction, in order.
    pub fn callees(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.instrs.iter().filter_map(|inst| match inst.instr {
            Instr::Call { callee, .. } => Some(callee),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// IrBuilder
// ---------------------------------------------------------------------------

/// Records the body of one function.
///
/// The builder reads types from a shared `Pool` but never interns new ones;
/// every type a body needs must exist before lowering starts.
pub struct IrBuilder<'p> {
    pool: &'p Pool,
    arena: ValueArena,
    instrs: Vec<Inst>,
    params: Vec<ValueId>,
    lifetime_markers: bool,
}

impl<'p> IrBuilder<'p> {
    /// Start a body whose native parameters have types `native_params`.
    pub fn new(pool: &'p Pool, native_params: &[Idx]) -> Self {
        let mut arena = ValueArena::new();
        let params = native_params
            .iter()
            .enumerate()
            .map(|(i, &ty)| arena.push(ty, ValueKind::Param(i as u32)))
            .collect();
        IrBuilder {
            pool,
            arena,
            instrs: Vec::new(),
            params,
            lifetime_markers: true,
        }
    }

    /// Enable or disable lifetime markers on temporary allocas.
    #[must_use]
    pub fn with_lifetime_markers(mut self, enabled: bool) -> Self {
        self.lifetime_markers = enabled;
        self
    }

    /// The type pool this body is built against.
    #[inline]
    pub fn pool(&self) -> &'p Pool {
        self.pool
    }

    /// Native parameter values, in order.
    pub fn params(&self) -> &[ValueId] {
        &self.params
    }

    /// Type of `value`.
    #[inline]
    pub fn type_of(&self, value: ValueId) -> CodegenResult<Idx> {
        self.arena.ty(value)
    }

    /// Instructions recorded so far.
    pub fn instrs(&self) -> &[Inst] {
        &self.instrs
    }

    /// Finish the body.
    pub fn finish(self) -> Body {
        Body {
            values: self.arena,
            instrs: self.instrs,
            params: self.params,
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Record an instruction that defines a value of type `ty`.
    fn push_value_instr(&mut self, instr: Instr, ty: Idx) -> ValueId {
        let result = self
            .arena
            .push(ty, ValueKind::Instr(self.instrs.len() as u32));
        self.instrs.push(Inst {
            instr,
            result: Some(result),
        });
        result
    }

    /// Record an instruction without a result.
    fn push_void_instr(&mut self, instr: Instr) {
        self.instrs.push(Inst {
            instr,
            result: None,
        });
    }

    /// Check that `value` belongs to this body.
    fn check(&self, value: ValueId) -> CodegenResult<()> {
        self.arena.get(value).map(|_| ())
    }

    fn not_an_aggregate(&self, ty: Idx) -> InternalError {
        InternalError::NotAnAggregate {
            ty: self.pool.display(ty),
        }
    }
}

#[cfg(test)]
mod tests;
