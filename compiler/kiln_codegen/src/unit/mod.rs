//! Unit lowering driver.
//!
//! A [`Unit`] is the body of one declared function as the front-end hands
//! it over: a straight-line list of spanned [`Op`]s whose operands refer to
//! the function's source parameters, to the results of earlier ops, or to
//! constants.
//!
//! Lowering a unit never stops at the first user error. An op whose key type
//! is rejected records a diagnostic and produces no value; every later op
//! that uses that missing value is skipped silently (it is *poisoned*), so
//! only the root cause is reported. Internal errors end the unit at once.

use rayon::prelude::*;

use kiln_diagnostic::{ErrorSet, Span};
use kiln_types::Idx;

use crate::lower::{FunctionLowerer, MapOp};
use crate::{Body, CodegenCtx, CodegenResult, FunctionId, InternalError, ValueId};

/// An op input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Source parameter `n` of the unit's function.
    Param(usize),
    /// Result of op `n` of the unit. Must precede the op using it.
    Op(usize),
    /// Integer constant of integer type `ty`, as its bit pattern.
    Int { ty: Idx, value: u64 },
    /// Boolean constant.
    Bool(bool),
    /// String constant.
    Str(String),
    /// Null pointer of pointer type `ty`.
    Null(Idx),
    /// All-zero value of type `ty`.
    Zero(Idx),
}

/// One operation of a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// A map operation.
    Map(MapOp<Operand>),
    /// Direct call of a declared function with source-level arguments.
    Call { callee: String, args: Vec<Operand> },
    /// Build an aggregate of type `ty` from its native fields.
    Aggregate { ty: Idx, fields: Vec<Operand> },
    /// Read field `index` of an aggregate.
    Extract { agg: Operand, index: u32 },
    /// Return from the function.
    Return(Option<Operand>),
}

/// The body of one declared function, before lowering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    /// Full name of the declared function.
    pub name: String,
    /// Ops in execution order.
    pub ops: Vec<(Span, Op)>,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Unit {
            name: name.into(),
            ops: Vec::new(),
        }
    }

    /// Append an op, returning the operand that refers to its result.
    pub fn push(&mut self, span: Span, op: Op) -> Operand {
        self.ops.push((span, op));
        Operand::Op(self.ops.len() - 1)
    }
}

/// A successfully lowered unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredFunction {
    pub function: FunctionId,
    pub name: String,
    pub body: Body,
}

/// Why a unit could not be lowered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    /// A compiler bug; lowering of the unit was abandoned.
    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
    /// The unit was lowered to the end, but the program has errors.
    #[error("{0}")]
    Diagnostics(ErrorSet),
}

/// What an op left behind for later ops.
#[derive(Copy, Clone, Debug)]
enum OpResult {
    Value(ValueId),
    Void,
    Poisoned,
}

/// Lower one unit.
pub fn lower_unit(ctx: CodegenCtx<'_>, unit: &Unit) -> Result<LoweredFunction, LowerError> {
    let _span = tracing::debug_span!("lower_unit", name = %unit.name).entered();

    let Some(function) = ctx.functions.get_function(&unit.name) else {
        let err = InternalError::UnknownFunction {
            name: unit.name.clone(),
        };
        tracing::error!(%err, "lowering aborted");
        return Err(err.into());
    };

    let mut lower = match FunctionLowerer::new(ctx, function) {
        Ok(lower) => lower,
        Err(err) => {
            tracing::error!(%err, "lowering aborted");
            return Err(err.into());
        }
    };
    if let Err(err) = lower_ops(&mut lower, unit) {
        tracing::error!(%err, "lowering aborted");
        return Err(err.into());
    }

    let body = lower.finish().map_err(|errors| {
        tracing::debug!(count = errors.len(), "unit has errors");
        LowerError::Diagnostics(errors)
    })?;
    tracing::debug!(instrs = body.instrs.len(), "unit lowered");
    Ok(LoweredFunction {
        function,
        name: unit.name.clone(),
        body,
    })
}

/// Lower independent units concurrently.
///
/// Results are returned in the order of `units`.
pub fn lower_units_parallel(
    ctx: CodegenCtx<'_>,
    units: &[Unit],
) -> Vec<Result<LoweredFunction, LowerError>> {
    units.par_iter().map(|unit| lower_unit(ctx, unit)).collect()
}

fn lower_ops(lower: &mut FunctionLowerer<'_>, unit: &Unit) -> CodegenResult<()> {
    let params = lower.entry_params()?;
    let mut state = UnitState {
        params,
        results: Vec::with_capacity(unit.ops.len()),
        returned: false,
    };
    for (span, op) in &unit.ops {
        let result = state.lower_op(lower, *span, op)?;
        state.results.push(result);
    }
    if !state.returned {
        lower.builder().ret(None)?;
    }
    Ok(())
}

struct UnitState {
    params: Vec<ValueId>,
    results: Vec<OpResult>,
    returned: bool,
}

impl UnitState {
    fn lower_op(&mut self, lower: &mut FunctionLowerer<'_>, span: Span, op: &Op) -> CodegenResult<OpResult> {
        match op {
            Op::Map(map_op) => {
                let resolved = map_op.clone().try_map(|o| self.resolve(lower, &o))?;
                let Ok(map_op) = resolved.try_map(|v| v.ok_or(())) else {
                    return Ok(OpResult::Poisoned);
                };
                let has_result = map_op.has_result();
                Ok(match lower.lower_map_op(map_op, span)? {
                    Some(value) => OpResult::Value(value),
                    None if has_result => OpResult::Poisoned,
                    None => OpResult::Void,
                })
            }
            Op::Call { callee, args } => {
                let Some(id) = lower.functions().get_function(callee) else {
                    return Err(InternalError::UnknownFunction {
                        name: callee.clone(),
                    });
                };
                let Some(args) = self.resolve_all(lower, args)? else {
                    return Ok(OpResult::Poisoned);
                };
                Ok(match lower.emit_call(id, &args)? {
                    Some(value) => OpResult::Value(value),
                    None => OpResult::Void,
                })
            }
            Op::Aggregate { ty, fields } => {
                let expected = lower.pool().aggregate_len(*ty);
                if !lower.pool().is_aggregate(*ty) || fields.len() != expected {
                    return Err(InternalError::AggregateArity {
                        ty: lower.pool().display(*ty),
                        expected,
                        found: fields.len(),
                    });
                }
                let Some(fields) = self.resolve_all(lower, fields)? else {
                    return Ok(OpResult::Poisoned);
                };
                let builder = lower.builder();
                let mut agg = builder.undef(*ty);
                for (index, field) in fields.into_iter().enumerate() {
                    agg = builder.insert_value(agg, field, index as u32)?;
                }
                Ok(OpResult::Value(agg))
            }
            Op::Extract { agg, index } => {
                let Some(agg) = self.resolve(lower, agg)? else {
                    return Ok(OpResult::Poisoned);
                };
                Ok(OpResult::Value(lower.builder().extract_value(agg, *index)?))
            }
            Op::Return(value) => {
                let value = match value {
                    Some(operand) => match self.resolve(lower, operand)? {
                        Some(value) => Some(value),
                        None => return Ok(OpResult::Poisoned),
                    },
                    None => None,
                };
                lower.builder().ret(value)?;
                self.returned = true;
                Ok(OpResult::Void)
            }
        }
    }

    /// The value of `operand`, or `None` if it depends on a poisoned op.
    fn resolve(&self, lower: &mut FunctionLowerer<'_>, operand: &Operand) -> CodegenResult<Option<ValueId>> {
        let builder = lower.builder();
        let value = match operand {
            Operand::Param(n) => match self.params.get(*n) {
                Some(&value) => value,
                None => {
                    return Err(InternalError::ParamOutOfRange {
                        index: *n,
                        count: self.params.len(),
                    })
                }
            },
            Operand::Op(n) => match self.results.get(*n) {
                Some(OpResult::Value(value)) => *value,
                Some(OpResult::Void) => return Err(InternalError::VoidOperand { index: *n }),
                Some(OpResult::Poisoned) => return Ok(None),
                None => {
                    return Err(InternalError::OperandOutOfRange {
                        index: *n,
                        available: self.results.len(),
                    })
                }
            },
            Operand::Int { ty, value } => builder.const_int(*ty, *value),
            Operand::Bool(value) => builder.const_bool(*value),
            Operand::Str(value) => builder.const_str(value),
            Operand::Null(ty) => builder.null(*ty),
            Operand::Zero(ty) => builder.zero(*ty),
        };
        Ok(Some(value))
    }

    /// Every operand's value, or `None` if any of them is poisoned.
    fn resolve_all(
        &self,
        lower: &mut FunctionLowerer<'_>,
        operands: &[Operand],
    ) -> CodegenResult<Option<Vec<ValueId>>> {
        let mut values = Vec::with_capacity(operands.len());
        for operand in operands {
            match self.resolve(lower, operand)? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(values))
    }
}
