//! Interning type pool.
//!
//! Types are stored once and referenced by [`Idx`]. Primitive types occupy
//! the first [`Idx::PRIMITIVE_COUNT`] slots in the order of their `Idx`
//! constants; constructed types are appended on first use and deduplicated
//! through a hash map keyed by their structural data.
//!
//! The pool is never mutated during lowering. Construction happens up front
//! (the front-end builds every type it needs), after which a `&Pool` can be
//! shared freely across threads.

mod format;

use rustc_hash::FxHashMap;

use crate::{Idx, Tag, TypeFlags};

/// Primitive tags in `Idx` order.
const PRIMITIVES: [Tag; Idx::PRIMITIVE_COUNT as usize] = [
    Tag::Bool,
    Tag::Int8,
    Tag::Int16,
    Tag::Int32,
    Tag::Int64,
    Tag::Uint8,
    Tag::Uint16,
    Tag::Uint32,
    Tag::Uint64,
    Tag::Uintptr,
    Tag::Float32,
    Tag::Float64,
    Tag::Str,
    Tag::UnsafePointer,
    Tag::Interface,
];

/// A struct field. Unnamed fields are used for tuples and synthesized
/// aggregates (e.g. a lookup result with its presence flag).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Option<String>,
    pub ty: Idx,
}

impl Field {
    /// A named field.
    pub fn named(name: impl Into<String>, ty: Idx) -> Self {
        Field {
            name: Some(name.into()),
            ty,
        }
    }

    /// An unnamed (positional) field.
    pub fn unnamed(ty: Idx) -> Self {
        Field { name: None, ty }
    }
}

/// Structural type data, also the interning key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum TypeData {
    Primitive(Tag),
    Pointer(Idx),
    Array { elem: Idx, len: u64 },
    Slice(Idx),
    Map { key: Idx, value: Idx },
    Func { params: Box<[Idx]>, results: Box<[Idx]> },
    Struct(Box<[Field]>),
    Named { name: Box<str>, underlying: Idx },
}

impl TypeData {
    fn tag(&self) -> Tag {
        match self {
            TypeData::Primitive(tag) => *tag,
            TypeData::Pointer(_) => Tag::Pointer,
            TypeData::Array { .. } => Tag::Array,
            TypeData::Slice(_) => Tag::Slice,
            TypeData::Map { .. } => Tag::Map,
            TypeData::Func { .. } => Tag::Func,
            TypeData::Struct(_) => Tag::Struct,
            TypeData::Named { .. } => Tag::Named,
        }
    }
}

struct Item {
    data: TypeData,
    flags: TypeFlags,
}

/// Interning storage for all types.
pub struct Pool {
    items: Vec<Item>,
    map: FxHashMap<TypeData, Idx>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a pool with all primitives pre-interned.
    pub fn new() -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(64),
            map: FxHashMap::default(),
        };
        for tag in PRIMITIVES {
            pool.intern(TypeData::Primitive(tag));
        }
        debug_assert_eq!(pool.items.len(), Idx::PRIMITIVE_COUNT as usize);
        pool
    }

    /// Number of interned types, primitives included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: primitives are pre-interned.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn intern(&mut self, data: TypeData) -> Idx {
        if let Some(&idx) = self.map.get(&data) {
            return idx;
        }
        let flags = self.compute_flags(&data);
        let idx = Idx::from_raw(self.items.len() as u32);
        self.items.push(Item {
            data: data.clone(),
            flags,
        });
        self.map.insert(data, idx);
        idx
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        match data {
            TypeData::Primitive(tag) => {
                let mut flags = TypeFlags::IS_PRIMITIVE;
                match tag {
                    Tag::Str => flags |= TypeFlags::HAS_STRING | TypeFlags::IS_AGGREGATE,
                    Tag::Interface => flags |= TypeFlags::HAS_DYNAMIC | TypeFlags::IS_AGGREGATE,
                    Tag::Float32 | Tag::Float64 => flags |= TypeFlags::HAS_FLOAT,
                    _ => {}
                }
                flags
            }
            TypeData::Pointer(_) | TypeData::Map { .. } | TypeData::Func { .. } => {
                TypeFlags::empty()
            }
            TypeData::Slice(_) => TypeFlags::IS_AGGREGATE,
            TypeData::Array { elem, .. } => self.flags(*elem).inherited(),
            TypeData::Struct(fields) => fields
                .iter()
                .fold(TypeFlags::IS_AGGREGATE, |acc, field| {
                    acc | self.flags(field.ty).inherited()
                }),
            TypeData::Named { underlying, .. } => {
                let inner = self.flags(*underlying);
                TypeFlags::IS_NAMED | inner.inherited() | (inner & TypeFlags::IS_AGGREGATE)
            }
        }
    }

    #[inline]
    fn item(&self, idx: Idx) -> &Item {
        debug_assert!(
            (idx.raw() as usize) < self.items.len(),
            "Idx {} out of bounds (pool has {} types)",
            idx.raw(),
            self.items.len()
        );
        &self.items[idx.raw() as usize]
    }

    // -- Construction --

    /// `*elem`.
    pub fn pointer(&mut self, elem: Idx) -> Idx {
        self.intern(TypeData::Pointer(elem))
    }

    /// `[len]elem`.
    pub fn array(&mut self, elem: Idx, len: u64) -> Idx {
        self.intern(TypeData::Array { elem, len })
    }

    /// `[]elem`.
    pub fn slice(&mut self, elem: Idx) -> Idx {
        self.intern(TypeData::Slice(elem))
    }

    /// `map[key]value`.
    pub fn map(&mut self, key: Idx, value: Idx) -> Idx {
        self.intern(TypeData::Map { key, value })
    }

    /// `func(params) (results)`.
    pub fn func(&mut self, params: &[Idx], results: &[Idx]) -> Idx {
        self.intern(TypeData::Func {
            params: params.into(),
            results: results.into(),
        })
    }

    /// Struct with the given fields, in declaration order.
    pub fn struct_type(&mut self, fields: &[Field]) -> Idx {
        self.intern(TypeData::Struct(fields.into()))
    }

    /// Struct with unnamed fields of the given types.
    pub fn tuple(&mut self, elems: &[Idx]) -> Idx {
        let fields: Vec<Field> = elems.iter().copied().map(Field::unnamed).collect();
        self.struct_type(&fields)
    }

    /// `(value, bool)`: the result of a comma-ok map lookup.
    pub fn comma_ok(&mut self, value: Idx) -> Idx {
        self.tuple(&[value, Idx::BOOL])
    }

    /// Named type. Names are rendered verbatim (`main.Point`).
    pub fn named(&mut self, name: &str, underlying: Idx) -> Idx {
        self.intern(TypeData::Named {
            name: name.into(),
            underlying,
        })
    }

    // -- Lookup without interning --

    /// The already-interned tuple of `elems`, if any.
    pub fn find_tuple(&self, elems: &[Idx]) -> Option<Idx> {
        let fields: Box<[Field]> = elems.iter().copied().map(Field::unnamed).collect();
        self.map.get(&TypeData::Struct(fields)).copied()
    }

    /// The already-interned comma-ok tuple for `value`, if any.
    pub fn find_comma_ok(&self, value: Idx) -> Option<Idx> {
        self.find_tuple(&[value, Idx::BOOL])
    }

    // -- Queries --

    /// Kind of `idx`.
    #[inline]
    pub fn tag(&self, idx: Idx) -> Tag {
        self.item(idx).data.tag()
    }

    /// Pre-computed flags of `idx`.
    #[inline]
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.item(idx).flags
    }

    /// Strip any number of `Named` wrappers.
    pub fn underlying(&self, mut idx: Idx) -> Idx {
        while let TypeData::Named { underlying, .. } = &self.item(idx).data {
            idx = *underlying;
        }
        idx
    }

    /// True if `idx` lowers to a native struct.
    #[inline]
    pub fn is_aggregate(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_AGGREGATE)
    }

    /// Native field types of an aggregate, in declaration order.
    ///
    /// Returns `None` for elementary types. `Named` types are transparent.
    pub fn aggregate_fields(&self, idx: Idx) -> Option<Vec<Idx>> {
        match &self.item(self.underlying(idx)).data {
            TypeData::Primitive(Tag::Str) => Some(vec![Idx::UNSAFE_POINTER, Idx::UINTPTR]),
            TypeData::Primitive(Tag::Interface) => Some(vec![Idx::UINTPTR, Idx::UNSAFE_POINTER]),
            TypeData::Slice(_) => Some(vec![Idx::UNSAFE_POINTER, Idx::UINTPTR, Idx::UINTPTR]),
            TypeData::Struct(fields) => Some(fields.iter().map(|f| f.ty).collect()),
            _ => None,
        }
    }

    /// Number of native fields of an aggregate, `0` for elementary types.
    pub fn aggregate_len(&self, idx: Idx) -> usize {
        match &self.item(self.underlying(idx)).data {
            TypeData::Primitive(Tag::Str | Tag::Interface) => 2,
            TypeData::Slice(_) => 3,
            TypeData::Struct(fields) => fields.len(),
            _ => 0,
        }
    }

    /// Declared fields of a struct (through `Named`); empty for non-structs.
    pub fn struct_fields(&self, idx: Idx) -> &[Field] {
        match &self.item(self.underlying(idx)).data {
            TypeData::Struct(fields) => &fields[..],
            _ => &[],
        }
    }

    /// Pointee of a `*T` (through `Named`).
    pub fn pointer_elem(&self, idx: Idx) -> Option<Idx> {
        match &self.item(self.underlying(idx)).data {
            TypeData::Pointer(elem) => Some(*elem),
            _ => None,
        }
    }

    /// Element type and length of a `[N]T` (through `Named`).
    pub fn array_elem(&self, idx: Idx) -> Option<(Idx, u64)> {
        match &self.item(self.underlying(idx)).data {
            TypeData::Array { elem, len } => Some((*elem, *len)),
            _ => None,
        }
    }

    /// Element type of a `[]T` (through `Named`).
    pub fn slice_elem(&self, idx: Idx) -> Option<Idx> {
        match &self.item(self.underlying(idx)).data {
            TypeData::Slice(elem) => Some(*elem),
            _ => None,
        }
    }

    /// Key and value types of a `map[K]V` (through `Named`).
    pub fn map_types(&self, idx: Idx) -> Option<(Idx, Idx)> {
        match &self.item(self.underlying(idx)).data {
            TypeData::Map { key, value } => Some((*key, *value)),
            _ => None,
        }
    }

    /// Name of a `Named` type (not looked through).
    pub fn type_name(&self, idx: Idx) -> Option<&str> {
        match &self.item(idx).data {
            TypeData::Named { name, .. } => Some(&name[..]),
            _ => None,
        }
    }
}
