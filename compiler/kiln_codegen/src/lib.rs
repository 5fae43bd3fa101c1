//! Aggregate argument lowering and map-operation lowering for the Kiln AOT
//! backend.
//!
//! Lowering turns a [`Unit`] (a function made of map operations, calls and a
//! return) into a recorded [`Body`] of native instructions. The pieces:
//!
//! - [`abi`]: how source values are split into native arguments. Aggregates
//!   that flatten to at most [`abi::MAX_FIELDS_PER_PARAM`] elementary fields
//!   travel as those fields; everything else travels whole.
//! - [`FunctionLowerer`]: per-function state. Expands and collapses
//!   arguments, emits runtime calls with their implicit trailing arguments,
//!   and lowers [`MapOp`]s after classifying the key type.
//! - [`lower_unit`] / [`lower_units_parallel`]: the driver.
//! - [`Evaluator`]: executes lowered bodies against the `kiln_rt` hashmap,
//!   so lowering can be tested by behaviour rather than by shape.
//!
//! # Error channels
//!
//! Internal errors ([`InternalError`]) are compiler bugs and abort the unit.
//! Problems in the user's program become
//! [`Diagnostic`](kiln_diagnostic::Diagnostic)s: they are collected, lowering
//! continues, and all of them are returned together as an
//! [`ErrorSet`](kiln_diagnostic::ErrorSet).
//!
//! # Debugging
//!
//! Enable tracing output with `RUST_LOG=kiln_codegen=debug` after calling
//! [`init_tracing`].

pub mod abi;
mod config;
mod context;
mod error;
pub mod evaluator;
mod function_table;
pub mod ir_builder;
mod lower;
pub mod map_key;
mod unit;
mod value_id;

use std::sync::Once;

pub use config::CodegenConfig;
pub use context::CodegenCtx;
pub use error::{CodegenResult, InternalError};
pub use evaluator::{EvalError, EvalStats, Evaluator, Pointer, Val};
pub use function_table::{FunctionDecl, FunctionTable, RUNTIME_PREFIX};
pub use ir_builder::{Body, Inst, Instr, IrBuilder, Scratch};
pub use lower::{FunctionLowerer, ImplicitArgs, MapOp};
pub use map_key::{classify_map_key, KeyClass};
pub use unit::{lower_unit, lower_units_parallel, LowerError, LoweredFunction, Op, Operand, Unit};
pub use value_id::{FunctionId, ValueArena, ValueData, ValueId, ValueKind};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=kiln_codegen=debug` or `RUST_LOG=kiln_codegen=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
