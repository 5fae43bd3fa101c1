use pretty_assertions::assert_eq;

use kiln_diagnostic::ErrorCode;
use kiln_types::{Field, Pool};

use super::*;
use crate::ir_builder::{Body, Instr};
use crate::{CodegenConfig, CodegenCtx, FunctionTable};

struct Fixture {
    pool: Pool,
    table: FunctionTable,
    config: CodegenConfig,
}

impl Fixture {
    fn new(pool: Pool, params: &[Idx]) -> Self {
        let mut table = FunctionTable::new();
        table.declare_runtime(&pool);
        table.declare_function(&pool, "main.f", params, None);
        Fixture {
            pool,
            table,
            config: CodegenConfig::default(),
        }
    }

    fn lowerer(&self) -> FunctionLowerer<'_> {
        let ctx = CodegenCtx::new(&self.pool, &self.table, &self.config);
        FunctionLowerer::new(ctx, self.table.get_function("main.f").unwrap()).unwrap()
    }

    fn callee_names(&self, body: &Body) -> Vec<String> {
        body.callees()
            .map(|id| self.table.decl(id).unwrap().name.clone())
            .collect()
    }
}

fn lifetime_pairs(body: &Body) -> (usize, usize) {
    let starts = body
        .instrs
        .iter()
        .filter(|i| matches!(i.instr, Instr::LifetimeStart { .. }))
        .count();
    let ends = body
        .instrs
        .iter()
        .filter(|i| matches!(i.instr, Instr::LifetimeEnd { .. }))
        .count();
    (starts, ends)
}

#[test]
fn string_lookup_passes_key_by_value() {
    let mut pool = Pool::new();
    pool.comma_ok(Idx::INT32);
    let fx = Fixture::new(pool, &[Idx::UNSAFE_POINTER, Idx::STR]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();

    let result = lower
        .create_map_lookup(Idx::STR, Idx::INT32, p[0], p[1], true, Span::point(1))
        .unwrap()
        .unwrap();
    let tuple_ty = lower.builder().type_of(result).unwrap();
    assert_eq!(fx.pool.aggregate_fields(tuple_ty), Some(vec![Idx::INT32, Idx::BOOL]));

    let body = lower.finish().unwrap();
    assert_eq!(fx.callee_names(&body), vec!["runtime.hashmapStringGet"]);
    let Some(Instr::Call { args, .. }) = body
        .instrs
        .iter()
        .map(|i| &i.instr)
        .find(|i| matches!(i, Instr::Call { .. }))
    else {
        panic!("no call");
    };
    // map, key.ptr, key.len, value slot, context, handle
    assert_eq!(args.len(), 6);
    assert_eq!(lifetime_pairs(&body), (1, 1));
}

#[test]
fn lookup_without_comma_ok_yields_value() {
    let fx = Fixture::new(Pool::new(), &[Idx::UNSAFE_POINTER, Idx::STR]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();

    let value = lower
        .create_map_lookup(Idx::STR, Idx::FLOAT64, p[0], p[1], false, Span::point(1))
        .unwrap()
        .unwrap();
    assert_eq!(lower.builder().type_of(value), Ok(Idx::FLOAT64));
}

#[test]
fn binary_lookup_boxes_key_and_ends_both_slots() {
    let mut pool = Pool::new();
    let key = pool.tuple(&[Idx::INT32, Idx::INT32]);
    let fx = Fixture::new(pool, &[Idx::UNSAFE_POINTER, key]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();
    let before = lower.builder().instrs().len();

    lower
        .create_map_lookup(key, Idx::UINT8, p[0], p[1], false, Span::point(1))
        .unwrap()
        .unwrap();
    let body = lower.finish().unwrap();
    let ops: Vec<&Instr> = body.instrs[before..].iter().map(|i| &i.instr).collect();

    // value slot, key slot + store, call, key end, load, value end
    assert!(matches!(ops[0], Instr::Alloca { ty } if *ty == Idx::UINT8));
    assert!(matches!(ops[1], Instr::LifetimeStart { size: 1, .. }));
    assert!(matches!(ops[2], Instr::Alloca { ty } if *ty == key));
    assert!(matches!(ops[3], Instr::LifetimeStart { size: 8, .. }));
    assert!(matches!(ops[4], Instr::Store { .. }));
    assert!(matches!(ops[5], Instr::Call { .. }));
    assert!(matches!(ops[6], Instr::LifetimeEnd { size: 8, .. }));
    assert!(matches!(ops[7], Instr::Load { .. }));
    assert!(matches!(ops[8], Instr::LifetimeEnd { size: 1, .. }));
    assert_eq!(ops.len(), 9);
    assert_eq!(fx.callee_names(&body), vec!["runtime.hashmapBinaryGet"]);
}

#[test]
fn update_dispatches_on_key_class() {
    let mut pool = Pool::new();
    let key = pool.struct_type(&[Field::named("x", Idx::INT64), Field::named("y", Idx::INT64)]);
    let fx = Fixture::new(pool, &[Idx::UNSAFE_POINTER, Idx::STR, key, Idx::BOOL]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();

    lower.create_map_update(Idx::STR, p[0], p[1], p[3], Span::point(1)).unwrap();
    lower.create_map_update(key, p[0], p[2], p[3], Span::point(2)).unwrap();

    let body = lower.finish().unwrap();
    assert_eq!(
        fx.callee_names(&body),
        vec!["runtime.hashmapStringSet", "runtime.hashmapBinarySet"]
    );
    // value slot twice, key slot once
    assert_eq!(lifetime_pairs(&body), (3, 3));
}

#[test]
fn delete_dispatches_on_key_class() {
    let mut pool = Pool::new();
    let ptr = pool.pointer(Idx::INT32);
    let named = pool.named("main.Name", Idx::STR);
    let fx = Fixture::new(pool, &[Idx::UNSAFE_POINTER, named, ptr]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();

    lower.create_map_delete(named, p[0], p[1], Span::point(1)).unwrap();
    lower.create_map_delete(ptr, p[0], p[2], Span::point(2)).unwrap();

    let body = lower.finish().unwrap();
    assert_eq!(
        fx.callee_names(&body),
        vec!["runtime.hashmapStringDelete", "runtime.hashmapBinaryDelete"]
    );
    assert_eq!(lifetime_pairs(&body), (1, 1));
}

#[test]
fn make_and_len() {
    let mut pool = Pool::new();
    let key = pool.tuple(&[Idx::INT32, Idx::INT8]);
    let fx = Fixture::new(pool, &[Idx::UINTPTR]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();

    let m = lower
        .create_make_map(key, Idx::INT64, p[0], Span::point(1))
        .unwrap()
        .unwrap();
    let n = lower.create_map_len(m).unwrap();
    assert_eq!(lower.builder().type_of(n), Ok(Idx::UINTPTR));

    let body = lower.finish().unwrap();
    assert_eq!(fx.callee_names(&body), vec!["runtime.hashmapMake", "runtime.hashmapLen"]);
    let dump = body.dump(&fx.pool, &fx.table);
    // key size 8, value size 8
    assert!(dump.contains("call runtime.hashmapMake(8, 8, %0, undef, null)"), "{dump}");
}

#[test]
fn unsupported_key_records_diagnostic_and_emits_nothing() {
    let mut pool = Pool::new();
    let key = pool.struct_type(&[Field::named("id", Idx::INT32), Field::named("tag", Idx::INTERFACE)]);
    let fx = Fixture::new(pool, &[Idx::UNSAFE_POINTER, key, Idx::INT32]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();
    let before = lower.builder().instrs().len();

    let looked_up = lower
        .create_map_lookup(key, Idx::INT32, p[0], p[1], false, Span::point(10))
        .unwrap();
    assert_eq!(looked_up, None);
    assert_eq!(lower.builder().instrs().len(), before);
    assert!(lower.has_errors());

    let errors = lower.finish().unwrap_err();
    let diag = errors.as_single().unwrap();
    assert_eq!(diag.code, ErrorCode::E5101);
    assert_eq!(diag.primary_span(), Some(Span::point(10)));
    assert!(diag.message.ends_with("but got: struct{id int32; tag interface{}}"));
}

#[test]
fn every_operation_keeps_going_after_unsupported_key() {
    let fx = Fixture::new(Pool::new(), &[Idx::UNSAFE_POINTER, Idx::FLOAT32, Idx::INT8]);
    let mut config = fx.config.clone();
    config.diagnostics = kiln_diagnostic::DiagnosticConfig::unlimited();
    let ctx = CodegenCtx::new(&fx.pool, &fx.table, &config);
    let mut lower = FunctionLowerer::new(ctx, fx.table.get_function("main.f").unwrap()).unwrap();
    let p = lower.entry_params().unwrap();

    let ops = [
        MapOp::Make {
            key_type: Idx::FLOAT32,
            value_type: Idx::INT8,
            size_hint: p[2],
        },
        MapOp::Lookup {
            map: p[0],
            key: p[1],
            key_type: Idx::FLOAT32,
            value_type: Idx::INT8,
            comma_ok: true,
        },
        MapOp::Update {
            map: p[0],
            key: p[1],
            value: p[2],
            key_type: Idx::FLOAT32,
        },
        MapOp::Delete {
            map: p[0],
            key: p[1],
            key_type: Idx::FLOAT32,
        },
    ];
    for (i, op) in ops.into_iter().enumerate() {
        assert_eq!(lower.lower_map_op(op, Span::point(i as u32)).unwrap(), None);
    }
    assert_eq!(lower.finish().unwrap_err().len(), 4);
}

#[test]
fn comma_ok_type_must_be_interned() {
    let fx = Fixture::new(Pool::new(), &[Idx::UNSAFE_POINTER, Idx::STR]);
    let mut lower = fx.lowerer();
    let p = lower.entry_params().unwrap();

    assert_eq!(
        lower.create_map_lookup(Idx::STR, Idx::UINT16, p[0], p[1], true, Span::point(0)),
        Err(InternalError::MissingType {
            ty: "(uint16, bool)".into()
        })
    );
}

#[test]
fn markers_can_be_disabled() {
    let mut pool = Pool::new();
    let key = pool.tuple(&[Idx::INT32, Idx::INT32]);
    let fx = Fixture::new(pool, &[Idx::UNSAFE_POINTER, key, Idx::INT32]);
    let config = fx.config.clone().with_lifetime_markers(false);
    let ctx = CodegenCtx::new(&fx.pool, &fx.table, &config);
    let mut lower = FunctionLowerer::new(ctx, fx.table.get_function("main.f").unwrap()).unwrap();
    let p = lower.entry_params().unwrap();

    lower.create_map_update(key, p[0], p[1], p[2], Span::point(0)).unwrap();
    let body = lower.finish().unwrap();
    assert_eq!(lifetime_pairs(&body), (0, 0));
    let allocas = body
        .instrs
        .iter()
        .filter(|i| matches!(i.instr, Instr::Alloca { .. }))
        .count();
    assert_eq!(allocas, 2);
}

#[test]
fn map_op_helpers() {
    let op: MapOp<u8> = MapOp::Update {
        map: 1,
        key: 2,
        value: 3,
        key_type: Idx::INT8,
    };
    assert_eq!(op.name(), "update");
    assert!(!op.has_result());
    let mapped: Result<MapOp<u16>, ()> = op.try_map(|v| Ok(u16::from(v) * 10));
    assert_eq!(
        mapped,
        Ok(MapOp::Update {
            map: 10,
            key: 20,
            value: 30,
            key_type: Idx::INT8
        })
    );
    let failed: Result<MapOp<u8>, &str> = MapOp::Len { map: 0u8 }.try_map(|_| Err("stop"));
    assert_eq!(failed, Err("stop"));
}
