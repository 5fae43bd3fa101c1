//! Constant values for `IrBuilder`.

use kiln_types::Idx;

use super::IrBuilder;
use crate::value_id::ValueKind;
use crate::ValueId;

impl IrBuilder<'_> {
    /// Undefined value of type `ty`.
    pub fn undef(&mut self, ty: Idx) -> ValueId {
        self.arena.push(ty, ValueKind::Undef)
    }

    /// Null pointer of pointer type `ty`.
    pub fn null(&mut self, ty: Idx) -> ValueId {
        self.arena.push(ty, ValueKind::Null)
    }

    /// All-zero value of type `ty`.
    pub fn zero(&mut self, ty: Idx) -> ValueId {
        self.arena.push(ty, ValueKind::Zero)
    }

    /// Integer constant of integer type `ty`, given as its bit pattern.
    pub fn const_int(&mut self, ty: Idx, bits: u64) -> ValueId {
        debug_assert!(
            self.pool.tag(self.pool.underlying(ty)).is_integer(),
            "const_int with non-integer type"
        );
        self.arena.push(ty, ValueKind::ConstInt(bits))
    }

    /// `uintptr` constant.
    pub fn const_uintptr(&mut self, value: u64) -> ValueId {
        self.const_int(Idx::UINTPTR, value)
    }

    /// Boolean constant.
    pub fn const_bool(&mut self, value: bool) -> ValueId {
        self.arena.push(Idx::BOOL, ValueKind::ConstBool(value))
    }

    /// String constant.
    pub fn const_str(&mut self, value: &str) -> ValueId {
        self.arena.push(Idx::STR, ValueKind::ConstStr(value.into()))
    }
}
