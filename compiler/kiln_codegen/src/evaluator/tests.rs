use pretty_assertions::assert_eq;

use kiln_types::{Field, TargetLayout};

use super::*;
use crate::IrBuilder;

fn register(eval: &mut Evaluator<'_>, table: &FunctionTable, name: &str, body: Body) {
    let function = table.get_function(name).unwrap();
    eval.add_function(LoweredFunction {
        function,
        name: name.to_owned(),
        body,
    });
}

#[test]
fn slots_hold_values_until_their_lifetime_ends() {
    let pool = Pool::new();
    let mut table = FunctionTable::new();
    table.declare_function(&pool, "main.f", &[Idx::INT32], Some(Idx::INT32));
    let layout = TargetLayout::default();

    let mut b = IrBuilder::new(&pool, &table.decl(table.get_function("main.f").unwrap()).unwrap().native_params);
    let x = b.params()[0];
    let slot = b.create_temporary_alloca(Idx::INT32, &layout);
    b.store(x, slot.ptr).unwrap();
    let y = b.load(Idx::INT32, slot.ptr).unwrap();
    b.emit_lifetime_end(slot);
    b.ret(Some(y)).unwrap();

    let mut eval = Evaluator::new(&pool, &table, &layout);
    register(&mut eval, &table, "main.f", b.finish());
    assert_eq!(eval.call("main.f", &[Val::Int(41)]), Ok(Some(Val::Int(41))));
    assert_eq!(eval.stats().slots_allocated, 1);
    assert_eq!(eval.stats().lifetime_ends, 1);
    assert_eq!(eval.live_slots(), 0);
}

#[test]
fn use_after_lifetime_end_is_caught() {
    let pool = Pool::new();
    let mut table = FunctionTable::new();
    table.declare_function(&pool, "main.f", &[], Some(Idx::INT8));
    let layout = TargetLayout::default();

    let mut b = IrBuilder::new(&pool, &table.decl(table.get_function("main.f").unwrap()).unwrap().native_params);
    let slot = b.create_temporary_alloca(Idx::INT8, &layout);
    b.emit_lifetime_end(slot);
    let y = b.load(Idx::INT8, slot.ptr).unwrap();
    b.ret(Some(y)).unwrap();

    let mut eval = Evaluator::new(&pool, &table, &layout);
    register(&mut eval, &table, "main.f", b.finish());
    assert_eq!(
        eval.call("main.f", &[]),
        Err(EvalError::DeadSlot { slot: 0, op: "load" })
    );
}

#[test]
fn runtime_calls_require_implicit_args() {
    let pool = Pool::new();
    let mut table = FunctionTable::new();
    table.declare_runtime(&pool);
    table.declare_function(&pool, "main.f", &[], None);
    let layout = TargetLayout::default();
    let make = table.get_runtime_function(names::HASHMAP_MAKE).unwrap();

    let mut b = IrBuilder::new(&pool, &table.decl(table.get_function("main.f").unwrap()).unwrap().native_params);
    let size = b.const_uintptr(4);
    let wrong = b.null(Idx::UNSAFE_POINTER);
    b.call(make, table.decl(make).unwrap(), &[size, size, size, wrong, wrong])
        .unwrap();
    b.ret(None).unwrap();

    let mut eval = Evaluator::new(&pool, &table, &layout);
    register(&mut eval, &table, "main.f", b.finish());
    assert_eq!(
        eval.call("main.f", &[]),
        Err(EvalError::ImplicitArgs {
            callee: "runtime.hashmapMake".into()
        })
    );
}

#[test]
fn calls_are_checked() {
    let pool = Pool::new();
    let mut table = FunctionTable::new();
    table.declare_function(&pool, "main.f", &[Idx::BOOL], None);
    let layout = TargetLayout::default();
    let mut eval = Evaluator::new(&pool, &table, &layout);

    assert_eq!(
        eval.call("main.g", &[]),
        Err(EvalError::UnknownFunction { name: "main.g".into() })
    );
    assert_eq!(
        eval.call("main.f", &[]),
        Err(EvalError::ArgumentCount {
            function: "main.f".into(),
            expected: 1,
            found: 0
        })
    );
    assert_eq!(
        eval.call("main.f", &[Val::bool(true)]),
        Err(EvalError::NoBody { name: "main.f".into() })
    );

    let mut other = FunctionTable::new();
    other.declare_function(&pool, "main.x", &[], None);
    let foreign = other.declare_function(&pool, "main.y", &[], None);
    assert_eq!(
        eval.call_function(foreign, Vec::new()),
        Err(EvalError::UnknownFunctionId(foreign))
    );
}

#[test]
fn values_round_trip_through_bytes() {
    let mut pool = Pool::new();
    let ptr = pool.pointer(Idx::INT64);
    let inner = pool.array(Idx::INT16, 3);
    let ty = pool.struct_type(&[
        Field::named("flag", Idx::BOOL),
        Field::named("p", ptr),
        Field::named("s", Idx::STR),
        Field::named("a", inner),
    ]);
    let table = FunctionTable::new();
    let layout = TargetLayout::target_32();
    let mut eval = Evaluator::new(&pool, &table, &layout);

    let value = Val::Agg(vec![
        Val::bool(true),
        Val::Ptr(Pointer::Opaque(0xdead)),
        Val::str("key"),
        Val::Agg(vec![Val::Int(1), Val::Int(0xffff), Val::Int(3)]),
    ]);
    let bytes = eval.to_bytes(ty, &value).unwrap();
    assert_eq!(bytes.len() as u64, layout.size_of(&pool, ty));
    assert_eq!(eval.from_bytes(ty, &bytes), Ok(value));
}

#[test]
fn equal_pointers_marshal_to_equal_bytes() {
    let pool = Pool::new();
    let table = FunctionTable::new();
    let layout = TargetLayout::default();
    let mut eval = Evaluator::new(&pool, &table, &layout);

    let a = eval.to_bytes(Idx::UNSAFE_POINTER, &Val::Ptr(Pointer::Opaque(7))).unwrap();
    let b = eval.to_bytes(Idx::UNSAFE_POINTER, &Val::Ptr(Pointer::Opaque(9))).unwrap();
    let a2 = eval.to_bytes(Idx::UNSAFE_POINTER, &Val::Ptr(Pointer::Opaque(7))).unwrap();
    assert_eq!(a, a2);
    assert_ne!(a, b);
    assert_eq!(
        eval.to_bytes(Idx::UNSAFE_POINTER, &Val::Null).unwrap(),
        vec![0; 8]
    );
}

#[test]
fn zero_and_undef_shapes() {
    let mut pool = Pool::new();
    let ty = pool.tuple(&[Idx::STR, Idx::INT8]);
    assert_eq!(
        zero_of(&pool, ty),
        Val::Agg(vec![Val::Agg(vec![Val::Null, Val::Int(0)]), Val::Int(0)])
    );
    assert_eq!(
        undef_of(&pool, ty),
        Val::Agg(vec![Val::Agg(vec![Val::Undef, Val::Undef]), Val::Undef])
    );
    assert_eq!(zero_of(&pool, Idx::STR).as_str(), Some(""));
}

#[test]
fn expand_and_collapse_values() {
    let mut pool = Pool::new();
    let inner = pool.tuple(&[Idx::INT8, Idx::INT8]);
    let outer = pool.tuple(&[inner, Idx::BOOL]);
    let value = Val::Agg(vec![Val::Agg(vec![Val::Int(1), Val::Int(2)]), Val::bool(false)]);

    let mut native = Vec::new();
    expand_val(&pool, outer, value.clone(), &mut native).unwrap();
    assert_eq!(native, vec![Val::Int(1), Val::Int(2), Val::Int(0)]);
    assert_eq!(collapse_val(&pool, outer, &mut native.into_iter()), Ok(value));
}

#[test]
fn string_values() {
    let s = Val::str("héllo");
    assert_eq!(s.as_str(), Some("héllo"));
    assert_eq!(s.fields().map(<[Val]>::len), Some(2));
    assert_eq!(Val::Int(3).as_str(), None);
}
