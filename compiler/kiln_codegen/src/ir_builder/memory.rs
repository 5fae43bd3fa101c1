//! Memory operations (alloca, load, store, lifetimes) for `IrBuilder`.

use kiln_types::{Idx, LayoutOracle};

use super::{Instr, IrBuilder};
use crate::{CodegenResult, ValueId};

/// A temporary stack slot and its size in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scratch {
    /// Pointer to the slot.
    pub ptr: ValueId,
    /// Allocation size, as passed to the lifetime markers.
    pub size: u64,
}

impl IrBuilder<'_> {
    /// Stack slot for one value of type `ty`.
    pub fn alloca(&mut self, ty: Idx) -> ValueId {
        self.push_value_instr(Instr::Alloca { ty }, Idx::UNSAFE_POINTER)
    }

    /// Stack slot whose lifetime starts here and must be ended with
    /// [`IrBuilder::emit_lifetime_end`] once its last user is emitted.
    ///
    /// The slot's contents are uninitialized.
    pub fn create_temporary_alloca(
        &mut self,
        ty: Idx,
        layout: &(impl LayoutOracle + ?Sized),
    ) -> Scratch {
        let ptr = self.alloca(ty);
        let size = layout.size_of(self.pool, ty);
        if self.lifetime_markers {
            self.push_void_instr(Instr::LifetimeStart { ptr, size });
        }
        Scratch { ptr, size }
    }

    /// End the lifetime of a temporary slot.
    pub fn emit_lifetime_end(&mut self, scratch: Scratch) {
        if self.lifetime_markers {
            self.push_void_instr(Instr::LifetimeEnd {
                ptr: scratch.ptr,
                size: scratch.size,
            });
        }
    }

    /// Write `value` to the slot at `ptr`.
    pub fn store(&mut self, value: ValueId, ptr: ValueId) -> CodegenResult<()> {
        self.check(value)?;
        self.check(ptr)?;
        self.push_void_instr(Instr::Store { ptr, value });
        Ok(())
    }

    /// Read a value of type `ty` from the slot at `ptr`.
    pub fn load(&mut self, ty: Idx, ptr: ValueId) -> CodegenResult<ValueId> {
        self.check(ptr)?;
        Ok(self.push_value_instr(Instr::Load { ptr, ty }, ty))
    }
}
