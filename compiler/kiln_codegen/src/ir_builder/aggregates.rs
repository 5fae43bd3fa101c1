//! Aggregate operations (extract, insert) for `IrBuilder`.

use super::{Instr, IrBuilder};
use crate::{CodegenResult, InternalError, ValueId};

impl IrBuilder<'_> {
    /// Extract field `index` from an aggregate value.
    pub fn extract_value(&mut self, agg: ValueId, index: u32) -> CodegenResult<ValueId> {
        let agg_ty = self.type_of(agg)?;
        let Some(fields) = self.pool.aggregate_fields(agg_ty) else {
            return Err(self.not_an_aggregate(agg_ty));
        };
        let Some(&field_ty) = fields.get(index as usize) else {
            return Err(InternalError::FieldOutOfRange {
                ty: self.pool.display(agg_ty),
                index,
            });
        };
        Ok(self.push_value_instr(Instr::ExtractValue { agg, index }, field_ty))
    }

    /// Insert `value` into field `index` of an aggregate, yielding the new
    /// aggregate.
    pub fn insert_value(&mut self, agg: ValueId, value: ValueId, index: u32) -> CodegenResult<ValueId> {
        let agg_ty = self.type_of(agg)?;
        self.check(value)?;
        let len = self.pool.aggregate_len(agg_ty);
        if !self.pool.is_aggregate(agg_ty) {
            return Err(self.not_an_aggregate(agg_ty));
        }
        if index as usize >= len {
            return Err(InternalError::FieldOutOfRange {
                ty: self.pool.display(agg_ty),
                index,
            });
        }
        Ok(self.push_value_instr(Instr::InsertValue { agg, value, index }, agg_ty))
    }
}
