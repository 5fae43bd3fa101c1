//! Type pool and target data layout for the Kiln backend.
//!
//! Every type the backend sees lives in a single interning [`Pool`] and is
//! referenced by a 32-bit [`Idx`]. Interning gives types a stable identity:
//! building the same type twice yields the same `Idx`, so equality is an
//! index comparison.
//!
//! The pool answers the structural questions codegen asks (is this an
//! aggregate, what are its native fields, what does it contain). Byte
//! layout is answered separately by a [`LayoutOracle`], which lets the same
//! pool be lowered for targets with different pointer widths.
//!
//! # Native aggregates
//!
//! Some source types are elementary at the language level but lower to a
//! small struct at the native level:
//!
//! | Type | Native fields |
//! |------|---------------|
//! | `string` | `{unsafe.Pointer, uintptr}` |
//! | `interface{}` | `{uintptr, unsafe.Pointer}` |
//! | `[]T` | `{unsafe.Pointer, uintptr, uintptr}` |
//!
//! [`Pool::aggregate_fields`] exposes that native view.

mod flags;
mod idx;
mod layout;
mod pool;
mod tag;

pub use flags::TypeFlags;
pub use idx::Idx;
pub use layout::{LayoutOracle, TargetLayout};
pub use pool::{Field, Pool};
pub use tag::Tag;
