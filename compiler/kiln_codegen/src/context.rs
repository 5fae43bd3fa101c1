//! Read-only state shared by every unit of one compilation.

use kiln_types::{LayoutOracle, Pool};

use crate::{CodegenConfig, FunctionTable};

/// Shared, immutable lowering context.
///
/// Everything here is fully built before lowering starts and never mutated
/// afterwards, so one `CodegenCtx` can be handed to many threads at once.
#[derive(Copy, Clone)]
pub struct CodegenCtx<'a> {
    pub pool: &'a Pool,
    pub functions: &'a FunctionTable,
    pub config: &'a CodegenConfig,
}

impl<'a> CodegenCtx<'a> {
    pub fn new(pool: &'a Pool, functions: &'a FunctionTable, config: &'a CodegenConfig) -> Self {
        CodegenCtx {
            pool,
            functions,
            config,
        }
    }

    /// The layout oracle for the configured target.
    #[inline]
    pub fn layout(&self) -> &'a dyn LayoutOracle {
        let config: &'a CodegenConfig = self.config;
        &config.layout
    }
}
