//! Expanding argument values into native arguments and collapsing native
//! parameters back into source values.
//!
//! These are the value-level twins of the type-level functions in
//! [`crate::abi`]: `expand_formal_param(v)` yields exactly as many values as
//! `expand_formal_param_type(type_of(v))` yields types, and collapsing those
//! values with the same type rebuilds `v`.

use smallvec::{smallvec, SmallVec};

use kiln_types::Idx;

use super::FunctionLowerer;
use crate::abi::{self, IMPLICIT_PARAM_COUNT};
use crate::{CodegenResult, InternalError, ValueId};

/// Native argument list of one source argument.
pub type Expanded = SmallVec<[ValueId; 4]>;

impl FunctionLowerer<'_> {
    /// Split `value` into the native arguments it is passed as.
    pub fn expand_formal_param(&mut self, value: ValueId) -> CodegenResult<Expanded> {
        let ty = self.builder.type_of(value)?;
        if !abi::is_expanded(self.pool(), ty) {
            return Ok(smallvec![value]);
        }
        let expected = abi::flattened_len(self.pool(), ty);
        let fields = self.flatten_aggregate(value)?;
        if fields.len() != expected {
            return Err(InternalError::FieldCountMismatch {
                ty: self.pool().display(ty),
                expected,
                found: fields.len(),
            });
        }
        tracing::trace!(ty = %self.pool().display(ty), fields = fields.len(), "expand formal param");
        Ok(fields)
    }

    /// Every elementary field of `value`, extracted in declaration order.
    pub fn flatten_aggregate(&mut self, value: ValueId) -> CodegenResult<Expanded> {
        let mut out = SmallVec::new();
        self.flatten_into(value, &mut out)?;
        Ok(out)
    }

    fn flatten_into(&mut self, value: ValueId, out: &mut Expanded) -> CodegenResult<()> {
        let ty = self.builder.type_of(value)?;
        if !self.pool().is_aggregate(ty) {
            out.push(value);
            return Ok(());
        }
        for index in 0..self.pool().aggregate_len(ty) {
            let field = self.builder.extract_value(value, index as u32)?;
            self.flatten_into(field, out)?;
        }
        Ok(())
    }

    /// Rebuild a value of type `ty` from exactly the native values it was
    /// expanded into.
    pub fn collapse_formal_param(&mut self, ty: Idx, fields: &[ValueId]) -> CodegenResult<ValueId> {
        let (value, rest) = self.collapse_formal_param_internal(ty, fields)?;
        if !rest.is_empty() {
            return Err(InternalError::LeftoverFields {
                ty: self.pool().display(ty),
                leftover: rest.len(),
            });
        }
        Ok(value)
    }

    /// Rebuild a value of type `ty` from a prefix of `fields`, returning it
    /// and the unconsumed remainder.
    pub fn collapse_formal_param_internal<'f>(
        &mut self,
        ty: Idx,
        fields: &'f [ValueId],
    ) -> CodegenResult<(ValueId, &'f [ValueId])> {
        if abi::is_expanded(self.pool(), ty) {
            let field_types = self.pool().aggregate_fields(ty).unwrap_or_default();
            let mut value = self.builder.undef(ty);
            let mut rest = fields;
            for (index, field_ty) in field_types.into_iter().enumerate() {
                let (field, remaining) = self.collapse_formal_param_internal(field_ty, rest)?;
                rest = remaining;
                value = self.builder.insert_value(value, field, index as u32)?;
            }
            return Ok((value, rest));
        }
        match fields.split_first() {
            Some((&first, rest)) => Ok((first, rest)),
            None => Err(InternalError::FieldsExhausted {
                ty: self.pool().display(ty),
            }),
        }
    }

    /// Source-level parameter values of the function being lowered, rebuilt
    /// from its native parameters. The implicit trailing parameters are not
    /// part of the result.
    pub fn entry_params(&mut self) -> CodegenResult<Vec<ValueId>> {
        let decl = self.decl();
        let native = self.builder.params().to_vec();
        let explicit = native.len().saturating_sub(IMPLICIT_PARAM_COUNT);

        let mut rest = &native[..explicit];
        let mut params = Vec::with_capacity(decl.params.len());
        for &ty in &decl.params {
            let (value, remaining) = self.collapse_formal_param_internal(ty, rest)?;
            rest = remaining;
            params.push(value);
        }
        if !rest.is_empty() {
            return Err(InternalError::LeftoverFields {
                ty: format!("parameters of {}", decl.name),
                leftover: rest.len(),
            });
        }
        Ok(params)
    }
}
