//! Diagnostics for the Kiln backend.
//!
//! Lowering reports two kinds of failure and keeps them strictly apart:
//!
//! - **User diagnostics** ([`Diagnostic`]): something in the program cannot
//!   be compiled (e.g. an unsupported map key type). These are collected,
//!   lowering carries on, and the caller receives every one of them at the
//!   end as an [`ErrorSet`].
//! - **Internal errors**: broken compiler invariants. Those never pass
//!   through this crate; codegen carries them on its own error channel.
//!
//! An `ErrorSet` is never empty. When it holds exactly one diagnostic it
//! behaves like that diagnostic, so callers that only ever expect a single
//! error and callers that report all of them share one interface.

mod diagnostic;
mod error_code;
mod error_set;
pub mod queue;
mod span;

pub use diagnostic::{Diagnostic, Label};
pub use error_code::ErrorCode;
pub use error_set::ErrorSet;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
pub use span::Span;
