//! Internal compiler errors.
//!
//! Everything here is a broken invariant inside the compiler (or a runtime
//! library that is out of sync with it), never a problem in the user's
//! program. These errors abort lowering of the current unit and are never
//! turned into a [`Diagnostic`](kiln_diagnostic::Diagnostic).

use crate::{FunctionId, ValueId};

/// Result type for every fallible lowering step.
pub type CodegenResult<T> = Result<T, InternalError>;

/// A broken compiler invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    /// A runtime support function was never declared.
    #[error("trying to call non-existing function: {name}")]
    MissingRuntimeFunction { name: String },

    /// A call names a function that was never declared.
    #[error("call to undeclared function `{name}`")]
    UnknownFunction { name: String },

    /// A function handle that does not belong to the function table in use.
    #[error("unknown function id {}", .0.raw())]
    UnknownFunctionId(FunctionId),

    /// Expanding a value yielded a different number of fields than its type flattens to.
    #[error("expand_formal_param: {ty} flattens to {expected} fields but its value expanded to {found}")]
    FieldCountMismatch {
        ty: String,
        expected: usize,
        found: usize,
    },

    /// An aggregate was built from the wrong number of fields.
    #[error("aggregate {ty} has {expected} fields, but {found} were given")]
    AggregateArity {
        ty: String,
        expected: usize,
        found: usize,
    },

    /// Fields remained after collapsing a value.
    #[error("collapse_formal_param: {leftover} field(s) left over after collapsing {ty}")]
    LeftoverFields { ty: String, leftover: usize },

    /// Collapsing a value ran out of fields.
    #[error("collapse_formal_param: ran out of fields while collapsing {ty}")]
    FieldsExhausted { ty: String },

    /// A call passes the wrong number of native arguments.
    #[error("call to `{callee}` passes {found} native arguments, but it takes {expected}")]
    ArgumentCountMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    /// A call that must produce a value targets a function without a result.
    #[error("call to `{callee}` produces no value")]
    MissingCallResult { callee: String },

    /// An operand refers to an op that does not precede it.
    #[error("operand refers to op {index}, but only {available} op(s) precede it")]
    OperandOutOfRange { index: usize, available: usize },

    /// An operand refers to a source parameter that does not exist.
    #[error("operand refers to parameter {index}, but the function has {count}")]
    ParamOutOfRange { index: usize, count: usize },

    /// An operand refers to an op that produces no value.
    #[error("operand refers to op {index}, which produces no value")]
    VoidOperand { index: usize },

    /// A value handle does not belong to this function.
    #[error("unknown value {0:?}")]
    UnknownValue(ValueId),

    /// A field access on a value whose type is not an aggregate.
    #[error("{ty} is not an aggregate")]
    NotAnAggregate { ty: String },

    /// A field index past the end of an aggregate.
    #[error("field index {index} out of range for {ty}")]
    FieldOutOfRange { ty: String, index: u32 },

    /// A type that lowering needs but that the front-end never interned.
    #[error("type {ty} was not interned before lowering")]
    MissingType { ty: String },
}
