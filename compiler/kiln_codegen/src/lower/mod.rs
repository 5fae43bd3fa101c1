//! Per-function lowering context.
//!
//! A `FunctionLowerer` owns the `IrBuilder` for one function body plus the
//! diagnostics collected while lowering it, and borrows everything else from
//! the shared [`CodegenCtx`]. Lowering methods return
//! [`CodegenResult`](crate::CodegenResult): `Err` is reserved for internal
//! errors, which abort the function. Problems in the user's program are
//! recorded with [`FunctionLowerer::add_error`] and lowering carries on.
//!
//! # Method Organization
//!
//! | File | Methods |
//! |------|---------|
//! | `params.rs` | `expand_formal_param`, `collapse_formal_param`, `entry_params` |
//! | `calls.rs` | `create_call`, `emit_call`, `create_runtime_call` |
//! | `map.rs` | `create_map_lookup`, `create_map_update`, `create_map_delete`, `create_make_map`, `create_map_len`, `lower_map_op` |

mod calls;
mod map;
mod params;

use kiln_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorSet, Span};
use kiln_types::{LayoutOracle, Pool};

pub use calls::ImplicitArgs;
pub use map::MapOp;

use crate::ir_builder::{Body, IrBuilder};
use crate::{CodegenCtx, CodegenResult, FunctionDecl, FunctionId, FunctionTable};

/// Lowers the body of one declared function.
pub struct FunctionLowerer<'a> {
    ctx: CodegenCtx<'a>,
    function: FunctionId,
    decl: &'a FunctionDecl,
    builder: IrBuilder<'a>,
    diagnostics: DiagnosticQueue,
}

impl<'a> FunctionLowerer<'a> {
    /// Start lowering the body of `function`.
    pub fn new(ctx: CodegenCtx<'a>, function: FunctionId) -> CodegenResult<Self> {
        let decl = ctx.functions.require_decl(function)?;
        let builder = IrBuilder::new(ctx.pool, &decl.native_params)
            .with_lifetime_markers(ctx.config.lifetime_markers);
        Ok(FunctionLowerer {
            ctx,
            function,
            decl,
            builder,
            diagnostics: DiagnosticQueue::with_config(ctx.config.diagnostics.clone()),
        })
    }

    /// The function being lowered.
    pub fn function(&self) -> FunctionId {
        self.function
    }

    /// Declaration of the function being lowered.
    pub fn decl(&self) -> &'a FunctionDecl {
        self.decl
    }

    /// Every declared function.
    pub fn functions(&self) -> &'a FunctionTable {
        self.ctx.functions
    }

    #[inline]
    pub fn pool(&self) -> &'a Pool {
        self.ctx.pool
    }

    #[inline]
    pub fn layout(&self) -> &'a dyn LayoutOracle {
        self.ctx.layout()
    }

    /// Direct access to the instruction builder.
    pub fn builder(&mut self) -> &mut IrBuilder<'a> {
        &mut self.builder
    }

    /// Record a user-facing error at `span` and keep lowering.
    pub fn add_error(&mut self, span: Span, message: String) {
        tracing::debug!(%span, %message, "lowering error");
        self.diagnostics.add(
            Diagnostic::error(ErrorCode::E5101)
                .with_message(message)
                .with_label(span, "in this map operation"),
        );
    }

    /// True if any user-facing error was recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Finish lowering: the body, or every collected error.
    pub fn finish(self) -> Result<Body, ErrorSet> {
        match self.diagnostics.into_error_set() {
            Some(errors) => Err(errors),
            None => Ok(self.builder.finish()),
        }
    }
}
