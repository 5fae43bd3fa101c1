//! Call emission.
//!
//! Every call carries two implicit trailing arguments after the source
//! arguments: a context pointer (unused, left undefined) and a suspension
//! handle (always null here, since nothing lowered by this crate suspends).
//! Arguments are expanded per [`crate::abi`] before the call is recorded.

use smallvec::SmallVec;

use super::FunctionLowerer;
use crate::abi::IMPLICIT_PARAM_TYPE;
use crate::function_table::RUNTIME_PREFIX;
use crate::ir_builder::IrBuilder;
use crate::{CodegenResult, FunctionId, InternalError, ValueId};

/// The implicit trailing arguments of a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImplicitArgs {
    /// Unused context pointer (undef).
    pub context: ValueId,
    /// Suspension handle (null).
    pub handle: ValueId,
}

impl ImplicitArgs {
    pub fn new(builder: &mut IrBuilder<'_>) -> Self {
        ImplicitArgs {
            context: builder.undef(IMPLICIT_PARAM_TYPE),
            handle: builder.null(IMPLICIT_PARAM_TYPE),
        }
    }

    /// Both arguments, in call order.
    pub fn as_array(self) -> [ValueId; 2] {
        [self.context, self.handle]
    }
}

impl FunctionLowerer<'_> {
    /// Call `callee` with `args` expanded into native arguments. `args` must
    /// already include the implicit trailing arguments.
    pub fn create_call(&mut self, callee: FunctionId, args: &[ValueId]) -> CodegenResult<Option<ValueId>> {
        let decl = self.ctx.functions.require_decl(callee)?;
        let mut expanded: SmallVec<[ValueId; 8]> = SmallVec::with_capacity(args.len());
        for &arg in args {
            expanded.extend(self.expand_formal_param(arg)?);
        }
        self.builder.call(callee, decl, &expanded)
    }

    /// Call `callee` with source arguments `args`, appending the implicit
    /// trailing arguments.
    pub fn emit_call(&mut self, callee: FunctionId, args: &[ValueId]) -> CodegenResult<Option<ValueId>> {
        let implicit = ImplicitArgs::new(&mut self.builder);
        let mut all: SmallVec<[ValueId; 8]> = SmallVec::from_slice(args);
        all.extend(implicit.as_array());
        self.create_call(callee, &all)
    }

    /// Call the runtime support function `runtime.<name>`.
    ///
    /// A missing runtime function means the compiler and runtime library are
    /// out of sync; that is an internal error, not a user error.
    pub fn create_runtime_call(&mut self, name: &str, args: &[ValueId]) -> CodegenResult<Option<ValueId>> {
        let Some(callee) = self.ctx.functions.get_runtime_function(name) else {
            return Err(InternalError::MissingRuntimeFunction {
                name: format!("{RUNTIME_PREFIX}{name}"),
            });
        };
        tracing::trace!(name, args = args.len(), "runtime call");
        self.emit_call(callee, args)
    }

    /// Like [`FunctionLowerer::create_runtime_call`] for functions that
    /// always produce a result.
    pub(crate) fn create_runtime_call_value(&mut self, name: &str, args: &[ValueId]) -> CodegenResult<ValueId> {
        self.create_runtime_call(name, args)?
            .ok_or_else(|| InternalError::MissingCallResult {
                callee: format!("{RUNTIME_PREFIX}{name}"),
            })
    }
}
