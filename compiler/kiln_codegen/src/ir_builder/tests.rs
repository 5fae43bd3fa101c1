use pretty_assertions::assert_eq;

use kiln_types::TargetLayout;

use super::*;
use crate::FunctionTable;

#[test]
fn params_are_values() {
    let pool = Pool::new();
    let builder = IrBuilder::new(&pool, &[Idx::INT32, Idx::UNSAFE_POINTER]);
    let params = builder.params().to_vec();
    assert_eq!(params.len(), 2);
    assert_eq!(builder.type_of(params[0]), Ok(Idx::INT32));
    assert_eq!(builder.type_of(params[1]), Ok(Idx::UNSAFE_POINTER));
}

#[test]
fn extract_value_types_follow_native_fields() {
    let pool = Pool::new();
    let mut builder = IrBuilder::new(&pool, &[Idx::STR]);
    let s = builder.params()[0];

    let ptr = builder.extract_value(s, 0).unwrap();
    let len = builder.extract_value(s, 1).unwrap();
    assert_eq!(builder.type_of(ptr), Ok(Idx::UNSAFE_POINTER));
    assert_eq!(builder.type_of(len), Ok(Idx::UINTPTR));
}

#[test]
fn extract_value_rejects_bad_input() {
    let pool = Pool::new();
    let mut builder = IrBuilder::new(&pool, &[Idx::INT32, Idx::STR]);
    let (int, s) = (builder.params()[0], builder.params()[1]);

    assert_eq!(
        builder.extract_value(int, 0),
        Err(InternalError::NotAnAggregate { ty: "int32".into() })
    );
    assert_eq!(
        builder.extract_value(s, 2),
        Err(InternalError::FieldOutOfRange {
            ty: "string".into(),
            index: 2
        })
    );
}

#[test]
fn insert_value_yields_new_aggregate() {
    let mut pool = Pool::new();
    let pair = pool.tuple(&[Idx::INT8, Idx::BOOL]);
    let mut builder = IrBuilder::new(&pool, &[]);

    let agg = builder.undef(pair);
    let one = builder.const_int(Idx::INT8, 1);
    let yes = builder.const_bool(true);
    let a = builder.insert_value(agg, one, 0).unwrap();
    let b = builder.insert_value(a, yes, 1).unwrap();

    assert_ne!(agg, a);
    assert_ne!(a, b);
    assert_eq!(builder.type_of(b), Ok(pair));
    assert!(builder.insert_value(b, yes, 2).is_err());
}

#[test]
fn temporary_alloca_with_and_without_markers() {
    let pool = Pool::new();
    let layout = TargetLayout::target_64();

    let mut with = IrBuilder::new(&pool, &[]);
    let scratch = with.create_temporary_alloca(Idx::INT64, &layout);
    with.emit_lifetime_end(scratch);
    assert_eq!(scratch.size, 8);
    assert_eq!(
        with.instrs().iter().map(|i| i.instr.clone()).collect::<Vec<_>>(),
        vec![
            Instr::Alloca { ty: Idx::INT64 },
            Instr::LifetimeStart { ptr: scratch.ptr, size: 8 },
            Instr::LifetimeEnd { ptr: scratch.ptr, size: 8 },
        ]
    );

    let mut without = IrBuilder::new(&pool, &[]).with_lifetime_markers(false);
    let scratch = without.create_temporary_alloca(Idx::INT64, &layout);
    without.emit_lifetime_end(scratch);
    assert_eq!(without.instrs().len(), 1);
}

#[test]
fn call_checks_native_arity() {
    let pool = Pool::new();
    let mut table = FunctionTable::new();
    let f = table.declare_function(&pool, "main.f", &[Idx::INT32], Some(Idx::BOOL));

    let mut builder = IrBuilder::new(&pool, &[Idx::INT32]);
    let x = builder.params()[0];
    let ctx = builder.undef(Idx::UNSAFE_POINTER);
    let handle = builder.null(Idx::UNSAFE_POINTER);

    let err = builder.call(f, table.decl(f).unwrap(), &[x]).unwrap_err();
    assert_eq!(
        err,
        InternalError::ArgumentCountMismatch {
            callee: "main.f".into(),
            expected: 3,
            found: 1
        }
    );

    let result = builder.call(f, table.decl(f).unwrap(), &[x, ctx, handle]).unwrap();
    assert_eq!(result.map(|r| builder.type_of(r)), Some(Ok(Idx::BOOL)));
}

#[test]
fn foreign_values_are_rejected() {
    let pool = Pool::new();
    let mut other = IrBuilder::new(&pool, &[]);
    for _ in 0..4 {
        other.const_bool(false);
    }
    let foreign = other.const_bool(true);

    let mut builder = IrBuilder::new(&pool, &[]);
    let slot = builder.alloca(Idx::BOOL);
    assert_eq!(builder.store(foreign, slot), Err(InternalError::UnknownValue(foreign)));
    assert_eq!(builder.ret(Some(foreign)), Err(InternalError::UnknownValue(foreign)));
}

#[test]
fn dump_renders_instructions() {
    let pool = Pool::new();
    let mut table = FunctionTable::new();
    table.declare_runtime(&pool);
    let len = table.get_runtime_function("hashmapLen").unwrap();

    let mut builder = IrBuilder::new(&pool, &[Idx::UNSAFE_POINTER]);
    let m = builder.params()[0];
    let ctx = builder.undef(Idx::UNSAFE_POINTER);
    let handle = builder.null(Idx::UNSAFE_POINTER);
    let n = builder.call(len, table.decl(len).unwrap(), &[m, ctx, handle]).unwrap();
    builder.ret(n).unwrap();

    let body = builder.finish();
    assert_eq!(
        body.dump(&pool, &table),
        "%3 = call runtime.hashmapLen(%0, undef, null)\nret %3\n"
    );
    assert_eq!(body.callees().collect::<Vec<_>>(), vec![len]);

    // Against a table that never declared the callee.
    assert_eq!(
        body.dump(&pool, &FunctionTable::new()),
        "%3 = call <fn#1>(%0, undef, null)\nret %3\n"
    );
}
