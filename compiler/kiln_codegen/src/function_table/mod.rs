//! Function declarations.
//!
//! Every function a body may call is declared here before lowering starts:
//! user functions by the front-end, runtime support functions by
//! [`FunctionTable::declare_runtime`]. A declaration fixes the function's
//! native signature, computed once from its source parameter types:
//!
//! ```text
//! source:  f(k struct{a int32; b int32}, s string, big struct{4 x int8})
//! native:  f(int32, int32, unsafe.Pointer, uintptr, struct{...}, context, handle)
//! ```
//!
//! Lowering only reads the table, so it can be shared between threads.

use rustc_hash::FxHashMap;

use kiln_rt::names;
use kiln_types::{Idx, Pool};

use crate::abi::native_param_types;
use crate::{CodegenResult, FunctionId, InternalError};

/// Namespace prefix of runtime support functions.
pub const RUNTIME_PREFIX: &str = "runtime.";

/// A declared function and its native signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Full name (`runtime.hashmapBinaryGet`, `main.lookup`).
    pub name: String,
    /// Source-level parameter types.
    pub params: Vec<Idx>,
    /// Native parameter types: every source parameter expanded, followed by
    /// the implicit context and suspension-handle pointers.
    pub native_params: Vec<Idx>,
    /// Result type, `None` for functions without a result.
    pub ret: Option<Idx>,
}

/// All declared functions, by ID and by name.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    decls: Vec<FunctionDecl>,
    by_name: FxHashMap<String, FunctionId>,
}

impl FunctionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`, or return the existing declaration's ID.
    ///
    /// Re-declaring with a different signature keeps the first one.
    pub fn declare_function(
        &mut self,
        pool: &Pool,
        name: &str,
        params: &[Idx],
        ret: Option<Idx>,
    ) -> FunctionId {
        if let Some(&id) = self.by_name.get(name) {
            debug_assert_eq!(
                self.decl(id).map(|d| d.params.as_slice()),
                Some(params),
                "function {name} re-declared with a different signature"
            );
            return id;
        }
        let native_params = native_param_types(pool, params);
        tracing::trace!(name, ?params, ?native_params, "declare function");
        let id = FunctionId::from_index(self.decls.len());
        self.decls.push(FunctionDecl {
            name: name.to_owned(),
            params: params.to_vec(),
            native_params,
            ret,
        });
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Look up a function by its full name.
    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.by_name.get(name).copied()
    }

    /// Look up a runtime support function by its unprefixed name.
    pub fn get_runtime_function(&self, name: &str) -> Option<FunctionId> {
        self.get_function(&format!("{RUNTIME_PREFIX}{name}"))
    }

    /// The declaration behind `id`, `None` if `id` came from another table.
    pub fn decl(&self, id: FunctionId) -> Option<&FunctionDecl> {
        self.decls.get(id.index())
    }

    /// Like [`decl`](Self::decl), for lowering steps that treat a foreign ID
    /// as an internal error.
    pub fn require_decl(&self, id: FunctionId) -> CodegenResult<&FunctionDecl> {
        self.decl(id).ok_or(InternalError::UnknownFunctionId(id))
    }

    /// Number of declared functions.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Declare every hashmap entry point of the runtime support library.
    ///
    /// Call this once per compilation before any map operation is lowered.
    /// Map handles are passed as `unsafe.Pointer`; string keys by value,
    /// binary keys and values through pointers to caller-owned scratch.
    pub fn declare_runtime(&mut self, pool: &Pool) {
        let ptr = Idx::UNSAFE_POINTER;
        let uintptr = Idx::UINTPTR;

        let decls: [(&str, &[Idx], Option<Idx>); 8] = [
            (names::HASHMAP_MAKE, &[uintptr, uintptr, uintptr], Some(ptr)),
            (names::HASHMAP_LEN, &[ptr], Some(uintptr)),
            (names::HASHMAP_STRING_GET, &[ptr, Idx::STR, ptr], Some(Idx::BOOL)),
            (names::HASHMAP_STRING_SET, &[ptr, Idx::STR, ptr], None),
            (names::HASHMAP_STRING_DELETE, &[ptr, Idx::STR], None),
            (names::HASHMAP_BINARY_GET, &[ptr, ptr, ptr], Some(Idx::BOOL)),
            (names::HASHMAP_BINARY_SET, &[ptr, ptr, ptr], None),
            (names::HASHMAP_BINARY_DELETE, &[ptr, ptr], None),
        ];
        for (name, params, ret) in decls {
            self.declare_function(pool, &format!("{RUNTIME_PREFIX}{name}"), params, ret);
        }
    }
}
