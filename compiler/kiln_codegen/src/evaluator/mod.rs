//! Evaluator for lowered bodies.
//!
//! Executes recorded instructions directly, with runtime calls dispatched
//! to the `kiln_rt` hashmap. Lowering is tested against it by behaviour:
//! a lookup after an update must find the value, an expanded argument must
//! arrive intact on the other side of a call, and so on.
//!
//! # Memory model
//!
//! Every `alloca` creates a fresh slot holding one typed [`Val`]. A slot is
//! live until a `lifetime.end` names it; loading, storing or ending a dead
//! slot is an error, which catches lifetime markers placed before the last
//! use of a slot.
//!
//! Values cross into the runtime as bytes, laid out by the configured
//! [`LayoutOracle`]. Pointers stored in those bytes are numbered through a
//! pointer table (`0` is null), so pointer-keyed maps see stable keys.
//!
//! Every runtime call is checked for the implicit trailing arguments: an
//! undefined context followed by a null handle.

mod marshal;

use std::rc::Rc;

use rustc_hash::FxHashMap;

use kiln_rt::{names, Hashmap};
use kiln_types::{Idx, LayoutOracle, Pool, Tag};

use crate::abi::{self, IMPLICIT_PARAM_COUNT};
use crate::ir_builder::{Body, Instr};
use crate::value_id::ValueKind;
use crate::{FunctionDecl, FunctionId, FunctionTable, LoweredFunction, ValueId, RUNTIME_PREFIX};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A runtime value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Val {
    /// Undefined scalar.
    Undef,
    /// Integer, boolean (`0`/`1`) or float bits.
    Int(u64),
    /// Null pointer.
    Null,
    /// Non-null pointer.
    Ptr(Pointer),
    /// Aggregate or array, one entry per native field or element.
    Agg(Vec<Val>),
}

/// What a non-null pointer points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pointer {
    /// A stack slot created by `alloca`.
    Slot(usize),
    /// Immutable bytes (string constants).
    Bytes(Rc<[u8]>),
    /// A runtime map.
    Map(usize),
    /// An address the evaluator does not model, compared by identity.
    Opaque(u64),
}

impl Val {
    /// Boolean.
    pub fn bool(value: bool) -> Val {
        Val::Int(u64::from(value))
    }

    /// String, as its native `{ptr, len}` pair.
    pub fn str(value: &str) -> Val {
        let bytes: Rc<[u8]> = value.as_bytes().into();
        let len = bytes.len() as u64;
        Val::Agg(vec![Val::Ptr(Pointer::Bytes(bytes)), Val::Int(len)])
    }

    /// Integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Val::Int(bits) => Some(*bits),
            _ => None,
        }
    }

    /// Fields, if this is an aggregate.
    pub fn fields(&self) -> Option<&[Val]> {
        match self {
            Val::Agg(fields) => Some(fields),
            _ => None,
        }
    }

    /// Contents of a string value built from constant bytes.
    pub fn as_str(&self) -> Option<&str> {
        match self.fields()? {
            [Val::Ptr(Pointer::Bytes(bytes)), Val::Int(len)] => {
                std::str::from_utf8(bytes.get(..*len as usize)?).ok()
            }
            [Val::Null, Val::Int(0)] => Some(""),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why evaluation failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("no body registered for `{name}`")]
    NoBody { name: String },

    #[error("no function named `{name}`")]
    UnknownFunction { name: String },

    #[error("function id {} is not in the table", .0.raw())]
    UnknownFunctionId(FunctionId),

    #[error("no runtime entry point named `{name}`")]
    UnknownRuntimeFunction { name: String },

    #[error("`{function}` takes {expected} arguments, but {found} were passed")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("call to `{callee}` does not end with an undefined context and a null handle")]
    ImplicitArgs { callee: String },

    #[error("value {0} used before it was computed")]
    Unevaluated(ValueId),

    #[error("value {0} does not belong to the body")]
    UnknownValue(ValueId),

    #[error("expected {expected}, found {found:?}")]
    Mismatch { expected: &'static str, found: Val },

    #[error("field {index} out of range for a value with {len} fields")]
    FieldOutOfRange { index: u32, len: usize },

    #[error("slot {slot} used by {op} after its lifetime ended")]
    DeadSlot { slot: usize, op: &'static str },

    #[error("pointer id {0} was never handed out")]
    DanglingPointer(u64),
}

pub type EvalResult<T> = Result<T, EvalError>;

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

struct Slot {
    ty: Idx,
    live: bool,
    contents: Val,
}

/// Counters collected while evaluating.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Slots created by `alloca`.
    pub slots_allocated: usize,
    /// `lifetime.end` markers executed.
    pub lifetime_ends: usize,
    /// Unprefixed names of the runtime entry points called, in order.
    pub runtime_calls: Vec<String>,
}

/// Executes lowered bodies.
pub struct Evaluator<'a> {
    pool: &'a Pool,
    functions: &'a FunctionTable,
    layout: &'a dyn LayoutOracle,
    bodies: FxHashMap<FunctionId, Rc<Body>>,
    slots: Vec<Slot>,
    maps: Vec<Hashmap>,
    pointers: Vec<Pointer>,
    stats: EvalStats,
}

impl<'a> Evaluator<'a> {
    pub fn new(pool: &'a Pool, functions: &'a FunctionTable, layout: &'a dyn LayoutOracle) -> Self {
        Evaluator {
            pool,
            functions,
            layout,
            bodies: FxHashMap::default(),
            slots: Vec::new(),
            maps: Vec::new(),
            pointers: Vec::new(),
            stats: EvalStats::default(),
        }
    }

    /// Make a lowered function callable.
    pub fn add_function(&mut self, lowered: LoweredFunction) {
        self.bodies.insert(lowered.function, Rc::new(lowered.body));
    }

    pub fn stats(&self) -> &EvalStats {
        &self.stats
    }

    /// Slots whose lifetime has not been ended.
    pub fn live_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.live).count()
    }

    /// The runtime map behind a map handle.
    pub fn map(&self, handle: &Val) -> Option<&Hashmap> {
        match handle {
            Val::Ptr(Pointer::Map(index)) => self.maps.get(*index),
            _ => None,
        }
    }

    /// Call `name` with source-level arguments.
    ///
    /// Arguments are expanded the way a call site expands them and the
    /// implicit trailing arguments are appended.
    pub fn call(&mut self, name: &str, args: &[Val]) -> EvalResult<Option<Val>> {
        let functions = self.functions;
        let Some(function) = functions.get_function(name) else {
            return Err(EvalError::UnknownFunction { name: name.to_owned() });
        };
        let decl = functions.decl(function).ok_or(EvalError::UnknownFunctionId(function))?;
        if args.len() != decl.params.len() {
            return Err(EvalError::ArgumentCount {
                function: decl.name.clone(),
                expected: decl.params.len(),
                found: args.len(),
            });
        }
        let mut native = Vec::with_capacity(decl.native_params.len());
        for (&ty, arg) in decl.params.iter().zip(args) {
            expand_val(self.pool, ty, arg.clone(), &mut native)?;
        }
        native.extend([Val::Undef, Val::Null]);
        self.call_function(function, native)
    }

    /// Call `function` with native arguments.
    pub fn call_function(&mut self, function: FunctionId, args: Vec<Val>) -> EvalResult<Option<Val>> {
        let functions = self.functions;
        let decl = functions.decl(function).ok_or(EvalError::UnknownFunctionId(function))?;
        if args.len() != decl.native_params.len() {
            return Err(EvalError::ArgumentCount {
                function: decl.name.clone(),
                expected: decl.native_params.len(),
                found: args.len(),
            });
        }
        if let Some(name) = decl.name.strip_prefix(RUNTIME_PREFIX) {
            return self.call_runtime(decl, name, args);
        }
        let Some(body) = self.bodies.get(&function).cloned() else {
            return Err(EvalError::NoBody {
                name: decl.name.clone(),
            });
        };
        tracing::trace!(name = %decl.name, "evaluate call");
        self.run(&body, args)
    }

    fn run(&mut self, body: &Body, args: Vec<Val>) -> EvalResult<Option<Val>> {
        let mut frame = Frame {
            body,
            args,
            results: vec![None; body.instrs.len()],
        };
        for (n, inst) in body.instrs.iter().enumerate() {
            let result = match &inst.instr {
                Instr::ExtractValue { agg, index } => {
                    let agg = frame.value(self.pool, *agg)?;
                    let fields = expect_agg(&agg)?;
                    Some(field(fields, *index)?.clone())
                }
                Instr::InsertValue { agg, value, index } => {
                    let mut fields = match frame.value(self.pool, *agg)? {
                        Val::Agg(fields) => fields,
                        other => return Err(mismatch("aggregate", other)),
                    };
                    let len = fields.len();
                    let Some(slot) = fields.get_mut(*index as usize) else {
                        return Err(EvalError::FieldOutOfRange { index: *index, len });
                    };
                    *slot = frame.value(self.pool, *value)?;
                    Some(Val::Agg(fields))
                }
                Instr::Alloca { ty } => {
                    self.slots.push(Slot {
                        ty: *ty,
                        live: true,
                        contents: undef_of(self.pool, *ty),
                    });
                    self.stats.slots_allocated += 1;
                    Some(Val::Ptr(Pointer::Slot(self.slots.len() - 1)))
                }
                Instr::Store { ptr, value } => {
                    let value = frame.value(self.pool, *value)?;
                    let slot = self.live_slot(&frame.value(self.pool, *ptr)?, "store")?;
                    self.slots[slot].contents = value;
                    None
                }
                Instr::Load { ptr, .. } => {
                    let slot = self.live_slot(&frame.value(self.pool, *ptr)?, "load")?;
                    Some(self.slots[slot].contents.clone())
                }
                Instr::LifetimeStart { ptr, .. } => {
                    let slot = slot_of(&frame.value(self.pool, *ptr)?)?;
                    if let Some(slot) = self.slots.get_mut(slot) {
                        slot.live = true;
                    }
                    None
                }
                Instr::LifetimeEnd { ptr, .. } => {
                    let slot = self.live_slot(&frame.value(self.pool, *ptr)?, "lifetime.end")?;
                    self.slots[slot].live = false;
                    self.stats.lifetime_ends += 1;
                    None
                }
                Instr::Call { callee, args } => {
                    let args = args
                        .iter()
                        .map(|&arg| frame.value(self.pool, arg))
                        .collect::<EvalResult<Vec<_>>>()?;
                    self.call_function(*callee, args)?
                }
                Instr::Ret(value) => {
                    return value.map(|value| frame.value(self.pool, value)).transpose();
                }
            };
            frame.results[n] = result;
        }
        Ok(None)
    }

    /// Index of the live slot `ptr` points to.
    fn live_slot(&self, ptr: &Val, op: &'static str) -> EvalResult<usize> {
        let slot = slot_of(ptr)?;
        match self.slots.get(slot) {
            Some(s) if s.live => Ok(slot),
            _ => Err(EvalError::DeadSlot { slot, op }),
        }
    }

    // -----------------------------------------------------------------------
    // Runtime entry points
    // -----------------------------------------------------------------------

    fn call_runtime(&mut self, decl: &FunctionDecl, name: &str, mut args: Vec<Val>) -> EvalResult<Option<Val>> {
        let explicit = args.len().saturating_sub(IMPLICIT_PARAM_COUNT);
        if args[explicit..] != [Val::Undef, Val::Null] {
            return Err(EvalError::ImplicitArgs {
                callee: decl.name.clone(),
            });
        }
        args.truncate(explicit);

        let mut fields = args.into_iter();
        let mut source = Vec::with_capacity(decl.params.len());
        for &ty in &decl.params {
            source.push(collapse_val(self.pool, ty, &mut fields)?);
        }
        tracing::trace!(name, "runtime call");
        self.stats.runtime_calls.push(name.to_owned());

        match (name, source.as_slice()) {
            (names::HASHMAP_MAKE, [key_size, value_size, hint]) => {
                let map = Hashmap::make(
                    expect_int(key_size)? as usize,
                    expect_int(value_size)? as usize,
                    expect_int(hint)? as usize,
                );
                self.maps.push(map);
                Ok(Some(Val::Ptr(Pointer::Map(self.maps.len() - 1))))
            }
            (names::HASHMAP_LEN, [map]) => {
                let map = self.map_index(map)?;
                Ok(Some(Val::Int(self.maps[map].len() as u64)))
            }
            (names::HASHMAP_STRING_GET, [map, key, out]) => {
                let map = self.map_index(map)?;
                let key = self.string_bytes(key)?;
                let mut buf = vec![0; self.maps[map].value_size()];
                let found = self.maps[map].string_get(&key, &mut buf);
                self.write_slot(out, &buf)?;
                Ok(Some(Val::bool(found)))
            }
            (names::HASHMAP_STRING_SET, [map, key, value]) => {
                let map = self.map_index(map)?;
                let key = self.string_bytes(key)?;
                let value = self.read_slot(value)?;
                self.maps[map].string_set(&key, &value);
                Ok(None)
            }
            (names::HASHMAP_STRING_DELETE, [map, key]) => {
                let map = self.map_index(map)?;
                let key = self.string_bytes(key)?;
                self.maps[map].string_delete(&key);
                Ok(None)
            }
            (names::HASHMAP_BINARY_GET, [map, key, out]) => {
                let map = self.map_index(map)?;
                let key = self.read_slot(key)?;
                let mut buf = vec![0; self.maps[map].value_size()];
                let found = self.maps[map].binary_get(&key, &mut buf);
                self.write_slot(out, &buf)?;
                Ok(Some(Val::bool(found)))
            }
            (names::HASHMAP_BINARY_SET, [map, key, value]) => {
                let map = self.map_index(map)?;
                let key = self.read_slot(key)?;
                let value = self.read_slot(value)?;
                self.maps[map].binary_set(&key, &value);
                Ok(None)
            }
            (names::HASHMAP_BINARY_DELETE, [map, key]) => {
                let map = self.map_index(map)?;
                let key = self.read_slot(key)?;
                self.maps[map].binary_delete(&key);
                Ok(None)
            }
            _ => Err(EvalError::UnknownRuntimeFunction {
                name: decl.name.clone(),
            }),
        }
    }

    fn map_index(&self, handle: &Val) -> EvalResult<usize> {
        match handle {
            Val::Ptr(Pointer::Map(index)) if *index < self.maps.len() => Ok(*index),
            other => Err(mismatch("map handle", other.clone())),
        }
    }

    /// Content bytes of a string value.
    fn string_bytes(&self, value: &Val) -> EvalResult<Vec<u8>> {
        let fields = expect_agg(value)?;
        let (ptr, len) = match fields {
            [ptr, len] => (ptr, expect_int(len)? as usize),
            _ => return Err(mismatch("string", value.clone())),
        };
        match ptr {
            Val::Ptr(Pointer::Bytes(bytes)) if len <= bytes.len() => Ok(bytes[..len].to_vec()),
            Val::Null | Val::Undef if len == 0 => Ok(Vec::new()),
            _ => Err(mismatch("string", value.clone())),
        }
    }

    /// Bytes of the live slot `ptr` points to.
    fn read_slot(&mut self, ptr: &Val) -> EvalResult<Vec<u8>> {
        let slot = self.live_slot(ptr, "runtime read")?;
        let ty = self.slots[slot].ty;
        let contents = self.slots[slot].contents.clone();
        self.to_bytes(ty, &contents)
    }

    /// Overwrite the live slot `ptr` points to with `bytes`.
    fn write_slot(&mut self, ptr: &Val, bytes: &[u8]) -> EvalResult<()> {
        let slot = self.live_slot(ptr, "runtime write")?;
        let value = self.from_bytes(self.slots[slot].ty, bytes)?;
        self.slots[slot].contents = value;
        Ok(())
    }
}

/// Per-call evaluation state.
struct Frame<'b> {
    body: &'b Body,
    args: Vec<Val>,
    results: Vec<Option<Val>>,
}

impl Frame<'_> {
    fn value(&self, pool: &Pool, id: ValueId) -> EvalResult<Val> {
        let data = self
            .body
            .values
            .get(id)
            .map_err(|_| EvalError::UnknownValue(id))?;
        Ok(match &data.kind {
            ValueKind::Param(n) => self
                .args
                .get(*n as usize)
                .cloned()
                .ok_or(EvalError::UnknownValue(id))?,
            ValueKind::Undef => undef_of(pool, data.ty),
            ValueKind::Null => Val::Null,
            ValueKind::Zero => zero_of(pool, data.ty),
            ValueKind::ConstInt(bits) => Val::Int(*bits),
            ValueKind::ConstBool(value) => Val::bool(*value),
            ValueKind::ConstStr(value) => Val::str(value),
            ValueKind::Instr(n) => self
                .results
                .get(*n as usize)
                .cloned()
                .flatten()
                .ok_or(EvalError::Unevaluated(id))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Undefined value of `ty`: structural for aggregates and arrays, so fields
/// can be inserted one at a time.
pub fn undef_of(pool: &Pool, ty: Idx) -> Val {
    shaped(pool, ty, &|| Val::Undef)
}

/// All-zero value of `ty`. Pointer positions hold null.
pub fn zero_of(pool: &Pool, ty: Idx) -> Val {
    if let Some(fields) = pool.aggregate_fields(ty) {
        return Val::Agg(fields.into_iter().map(|f| zero_of(pool, f)).collect());
    }
    if let Some((elem, len)) = pool.array_elem(ty) {
        return Val::Agg((0..len).map(|_| zero_of(pool, elem)).collect());
    }
    match pool.tag(pool.underlying(ty)) {
        Tag::Pointer | Tag::UnsafePointer | Tag::Map | Tag::Func => Val::Null,
        _ => Val::Int(0),
    }
}

fn shaped(pool: &Pool, ty: Idx, leaf: &dyn Fn() -> Val) -> Val {
    if let Some(fields) = pool.aggregate_fields(ty) {
        return Val::Agg(fields.into_iter().map(|f| shaped(pool, f, leaf)).collect());
    }
    if let Some((elem, len)) = pool.array_elem(ty) {
        return Val::Agg((0..len).map(|_| shaped(pool, elem, leaf)).collect());
    }
    leaf()
}

/// Split a source value into the native arguments it is passed as.
pub fn expand_val(pool: &Pool, ty: Idx, value: Val, out: &mut Vec<Val>) -> EvalResult<()> {
    if abi::is_expanded(pool, ty) {
        flatten_val(pool, ty, value, out)
    } else {
        out.push(value);
        Ok(())
    }
}

fn flatten_val(pool: &Pool, ty: Idx, value: Val, out: &mut Vec<Val>) -> EvalResult<()> {
    let Some(types) = pool.aggregate_fields(ty) else {
        out.push(value);
        return Ok(());
    };
    let fields = match value {
        Val::Agg(fields) if fields.len() == types.len() => fields,
        other => return Err(mismatch("aggregate", other)),
    };
    for (ty, field) in types.into_iter().zip(fields) {
        flatten_val(pool, ty, field, out)?;
    }
    Ok(())
}

/// Rebuild a source value of `ty` from native arguments.
pub fn collapse_val(pool: &Pool, ty: Idx, fields: &mut impl Iterator<Item = Val>) -> EvalResult<Val> {
    if abi::is_expanded(pool, ty) {
        let types = pool.aggregate_fields(ty).unwrap_or_default();
        let mut vals = Vec::with_capacity(types.len());
        for field_ty in types {
            vals.push(collapse_val(pool, field_ty, fields)?);
        }
        return Ok(Val::Agg(vals));
    }
    fields
        .next()
        .ok_or_else(|| mismatch("another native argument", Val::Undef))
}

fn slot_of(ptr: &Val) -> EvalResult<usize> {
    match ptr {
        Val::Ptr(Pointer::Slot(slot)) => Ok(*slot),
        other => Err(mismatch("slot pointer", other.clone())),
    }
}

fn expect_int(value: &Val) -> EvalResult<u64> {
    value.as_int().ok_or_else(|| mismatch("integer", value.clone()))
}

fn expect_agg(value: &Val) -> EvalResult<&[Val]> {
    value.fields().ok_or_else(|| mismatch("aggregate", value.clone()))
}

fn field(fields: &[Val], index: u32) -> EvalResult<&Val> {
    fields.get(index as usize).ok_or(EvalError::FieldOutOfRange {
        index,
        len: fields.len(),
    })
}

fn mismatch(expected: &'static str, found: Val) -> EvalError {
    EvalError::Mismatch { expected, found }
}

#[cfg(test)]
mod tests;
