//! Map operation lowering.
//!
//! Each operation classifies the key type first and then emits calls to the
//! matching runtime entry points:
//!
//! | Key class | Key passed as | Entry points |
//! |-----------|---------------|--------------|
//! | `String` | value (expanded to `ptr, len`) | `hashmapString{Get,Set,Delete}` |
//! | `BinaryComparable` | pointer to a scratch copy | `hashmapBinary{Get,Set,Delete}` |
//! | `Unsupported` | | none; a diagnostic is recorded |
//!
//! Values always travel through scratch slots. Every slot is allocated right
//! before use and its lifetime is ended as soon as its last user is emitted.
//! An unsupported key records one diagnostic, emits no instructions and
//! lets lowering continue; operations that would produce a value produce
//! none.

use kiln_diagnostic::Span;
use kiln_rt::names;
use kiln_types::Idx;

use super::FunctionLowerer;
use crate::map_key::{classify_map_key, unsupported_key_message, KeyClass};
use crate::{CodegenResult, InternalError, ValueId};

/// A map operation over operands of type `V`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapOp<V> {
    /// `make(map[K]V, size_hint)`.
    Make {
        key_type: Idx,
        value_type: Idx,
        size_hint: V,
    },
    /// `m[key]`, or `v, ok := m[key]` with `comma_ok`.
    Lookup {
        map: V,
        key: V,
        key_type: Idx,
        value_type: Idx,
        comma_ok: bool,
    },
    /// `m[key] = value`.
    Update {
        map: V,
        key: V,
        value: V,
        key_type: Idx,
    },
    /// `delete(m, key)`.
    Delete { map: V, key: V, key_type: Idx },
    /// `len(m)`.
    Len { map: V },
}

impl<V> MapOp<V> {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            MapOp::Make { .. } => "make",
            MapOp::Lookup { .. } => "lookup",
            MapOp::Update { .. } => "update",
            MapOp::Delete { .. } => "delete",
            MapOp::Len { .. } => "len",
        }
    }

    /// True if the operation yields a value when it succeeds.
    pub fn has_result(&self) -> bool {
        matches!(self, MapOp::Make { .. } | MapOp::Lookup { .. } | MapOp::Len { .. })
    }

    /// Convert every operand with `f`, stopping at the first error.
    pub fn try_map<W, E>(self, mut f: impl FnMut(V) -> Result<W, E>) -> Result<MapOp<W>, E> {
        Ok(match self {
            MapOp::Make {
                key_type,
                value_type,
                size_hint,
            } => MapOp::Make {
                key_type,
                value_type,
                size_hint: f(size_hint)?,
            },
            MapOp::Lookup {
                map,
                key,
                key_type,
                value_type,
                comma_ok,
            } => MapOp::Lookup {
                map: f(map)?,
                key: f(key)?,
                key_type,
                value_type,
                comma_ok,
            },
            MapOp::Update {
                map,
                key,
                value,
                key_type,
            } => MapOp::Update {
                map: f(map)?,
                key: f(key)?,
                value: f(value)?,
                key_type,
            },
            MapOp::Delete { map, key, key_type } => MapOp::Delete {
                map: f(map)?,
                key: f(key)?,
                key_type,
            },
            MapOp::Len { map } => MapOp::Len { map: f(map)? },
        })
    }
}

impl FunctionLowerer<'_> {
    /// Lower one map operation.
    ///
    /// Returns the operation's result, or `None` if it has none or its key
    /// type was rejected.
    pub fn lower_map_op(&mut self, op: MapOp<ValueId>, span: Span) -> CodegenResult<Option<ValueId>> {
        match op {
            MapOp::Make {
                key_type,
                value_type,
                size_hint,
            } => self.create_make_map(key_type, value_type, size_hint, span),
            MapOp::Lookup {
                map,
                key,
                key_type,
                value_type,
                comma_ok,
            } => self.create_map_lookup(key_type, value_type, map, key, comma_ok, span),
            MapOp::Update {
                map,
                key,
                value,
                key_type,
            } => self
                .create_map_update(key_type, map, key, value, span)
                .map(|()| None),
            MapOp::Delete { map, key, key_type } => self
                .create_map_delete(key_type, map, key, span)
                .map(|()| None),
            MapOp::Len { map } => self.create_map_len(map).map(Some),
        }
    }

    /// Classify `key_type`, recording a diagnostic if it is unsupported.
    fn map_key_class(&mut self, op: &'static str, key_type: Idx, span: Span) -> KeyClass {
        let class = classify_map_key(self.pool(), key_type);
        tracing::debug!(
            op,
            key = %self.pool().display(key_type),
            %class,
            "lowering map operation"
        );
        if class == KeyClass::Unsupported {
            let message = unsupported_key_message(self.pool(), key_type);
            self.add_error(span, message);
        }
        class
    }

    /// Look up `key` in `map`.
    ///
    /// The value slot is left uninitialized: the runtime's get zero-fills it
    /// when the key is absent. With `comma_ok` the result is a
    /// `(value, present)` tuple, otherwise the value alone.
    pub fn create_map_lookup(
        &mut self,
        key_type: Idx,
        value_type: Idx,
        map: ValueId,
        key: ValueId,
        comma_ok: bool,
        span: Span,
    ) -> CodegenResult<Option<ValueId>> {
        let class = self.map_key_class("lookup", key_type, span);
        if class == KeyClass::Unsupported {
            return Ok(None);
        }
        let tuple_type = if comma_ok {
            let Some(ty) = self.pool().find_comma_ok(value_type) else {
                return Err(InternalError::MissingType {
                    ty: format!("({}, bool)", self.pool().display(value_type)),
                });
            };
            Some(ty)
        } else {
            None
        };

        let layout = self.layout();
        let value_slot = self.builder.create_temporary_alloca(value_type, layout);
        let present = if class == KeyClass::String {
            self.create_runtime_call_value(names::HASHMAP_STRING_GET, &[map, key, value_slot.ptr])?
        } else {
            let key_slot = self.builder.create_temporary_alloca(key_type, layout);
            self.builder.store(key, key_slot.ptr)?;
            let present = self.create_runtime_call_value(
                names::HASHMAP_BINARY_GET,
                &[map, key_slot.ptr, value_slot.ptr],
            )?;
            self.builder.emit_lifetime_end(key_slot);
            present
        };

        let value = self.builder.load(value_type, value_slot.ptr)?;
        self.builder.emit_lifetime_end(value_slot);

        let Some(tuple_type) = tuple_type else {
            return Ok(Some(value));
        };
        let tuple = self.builder.undef(tuple_type);
        let tuple = self.builder.insert_value(tuple, value, 0)?;
        let tuple = self.builder.insert_value(tuple, present, 1)?;
        Ok(Some(tuple))
    }

    /// Set `map[key] = value`.
    pub fn create_map_update(
        &mut self,
        key_type: Idx,
        map: ValueId,
        key: ValueId,
        value: ValueId,
        span: Span,
    ) -> CodegenResult<()> {
        let class = self.map_key_class("update", key_type, span);
        if class == KeyClass::Unsupported {
            return Ok(());
        }

        let layout = self.layout();
        let value_type = self.builder.type_of(value)?;
        let value_slot = self.builder.create_temporary_alloca(value_type, layout);
        self.builder.store(value, value_slot.ptr)?;
        if class == KeyClass::String {
            self.create_runtime_call(names::HASHMAP_STRING_SET, &[map, key, value_slot.ptr])?;
        } else {
            let key_slot = self.builder.create_temporary_alloca(key_type, layout);
            self.builder.store(key, key_slot.ptr)?;
            self.create_runtime_call(names::HASHMAP_BINARY_SET, &[map, key_slot.ptr, value_slot.ptr])?;
            self.builder.emit_lifetime_end(key_slot);
        }
        self.builder.emit_lifetime_end(value_slot);
        Ok(())
    }

    /// Remove `key` from `map`.
    pub fn create_map_delete(
        &mut self,
        key_type: Idx,
        map: ValueId,
        key: ValueId,
        span: Span,
    ) -> CodegenResult<()> {
        match self.map_key_class("delete", key_type, span) {
            KeyClass::String => {
                self.create_runtime_call(names::HASHMAP_STRING_DELETE, &[map, key])?;
            }
            KeyClass::BinaryComparable => {
                let layout = self.layout();
                let key_slot = self.builder.create_temporary_alloca(key_type, layout);
                self.builder.store(key, key_slot.ptr)?;
                self.create_runtime_call(names::HASHMAP_BINARY_DELETE, &[map, key_slot.ptr])?;
                self.builder.emit_lifetime_end(key_slot);
            }
            KeyClass::Unsupported => {}
        }
        Ok(())
    }

    /// Create a map with room for `size_hint` entries.
    ///
    /// The key type is checked here as well, so a map that could never be
    /// used is rejected where it is made.
    pub fn create_make_map(
        &mut self,
        key_type: Idx,
        value_type: Idx,
        size_hint: ValueId,
        span: Span,
    ) -> CodegenResult<Option<ValueId>> {
        if self.map_key_class("make", key_type, span) == KeyClass::Unsupported {
            return Ok(None);
        }
        let key_size = self.layout().size_of(self.pool(), key_type);
        let value_size = self.layout().size_of(self.pool(), value_type);
        let key_size = self.builder.const_uintptr(key_size);
        let value_size = self.builder.const_uintptr(value_size);
        self.create_runtime_call_value(names::HASHMAP_MAKE, &[key_size, value_size, size_hint])
            .map(Some)
    }

    /// Number of entries in `map`.
    pub fn create_map_len(&mut self, map: ValueId) -> CodegenResult<ValueId> {
        tracing::debug!(op = "len", "lowering map operation");
        self.create_runtime_call_value(names::HASHMAP_LEN, &[map])
    }
}

#[cfg(test)]
mod tests;
