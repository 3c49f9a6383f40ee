use cranelift_codegen::ir::{self as clif_ir, types, AbiParam, Signature, UserFuncName};
use cranelift_codegen::isa::CallConv;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};

use super::*;
use crate::config::UndefinedUsePolicy;
use crate::storage::{Access, StorageTable};

fn scratch_function() -> clif_ir::Function {
    let mut sig = Signature::new(CallConv::SystemV);
    sig.returns.push(AbiParam::new(types::I64));
    clif_ir::Function::with_name_signature(UserFuncName::testcase("scratch"), sig)
}

#[test]
fn test_define_allocates_cell_of_defined_width() {
    let mut func = scratch_function();
    let mut fb_ctx = FunctionBuilderContext::new();
    let mut builder = FunctionBuilder::new(&mut func, &mut fb_ctx);
    let mut table = StorageTable::new(UndefinedUsePolicy::DefaultBool);

    let n = table
        .get_or_create("n", Access::Define(Type::Int), &mut builder)
        .unwrap();
    let flag = table
        .get_or_create("flag", Access::Define(Type::Bool), &mut builder)
        .unwrap();

    assert_eq!(n.ty, Type::Int);
    assert_eq!(flag.ty, Type::Bool);
    assert_ne!(n.slot, flag.slot);
    assert_eq!(builder.func.sized_stack_slots[n.slot].size, 8);
    assert_eq!(builder.func.sized_stack_slots[flag.slot].size, 1);
}

#[test]
fn test_second_access_returns_same_cell() {
    let mut func = scratch_function();
    let mut fb_ctx = FunctionBuilderContext::new();
    let mut builder = FunctionBuilder::new(&mut func, &mut fb_ctx);
    let mut table = StorageTable::new(UndefinedUsePolicy::DefaultBool);

    let first = table
        .get_or_create("x", Access::Define(Type::Int), &mut builder)
        .unwrap();
    let redefined = table
        .get_or_create("x", Access::Define(Type::Bool), &mut builder)
        .unwrap();
    let used = table.get_or_create("x", Access::Use, &mut builder).unwrap();

    assert_eq!(first, redefined);
    assert_eq!(first, used);
    assert_eq!(redefined.ty, Type::Int);
    assert_eq!(table.len(), 1);
    assert_eq!(builder.func.sized_stack_slots.len(), 1);
}

#[test]
fn test_use_before_definition_falls_back_to_bool() {
    let mut func = scratch_function();
    let mut fb_ctx = FunctionBuilderContext::new();
    let mut builder = FunctionBuilder::new(&mut func, &mut fb_ctx);
    let mut table = StorageTable::new(UndefinedUsePolicy::DefaultBool);

    let cell = table
        .get_or_create("ghost", Access::Use, &mut builder)
        .unwrap();

    assert_eq!(cell.ty, Type::Bool);
    assert_eq!(table.get("ghost"), Some(cell));
}

#[test]
fn test_reject_policy_refuses_undefined_use() {
    let mut func = scratch_function();
    let mut fb_ctx = FunctionBuilderContext::new();
    let mut builder = FunctionBuilder::new(&mut func, &mut fb_ctx);
    let mut table = StorageTable::new(UndefinedUsePolicy::Reject);

    assert!(table
        .get_or_create("ghost", Access::Use, &mut builder)
        .is_none());
    assert!(table.is_empty());
    assert!(builder.func.sized_stack_slots.is_empty());

    assert!(table
        .get_or_create("real", Access::Define(Type::Int), &mut builder)
        .is_some());
    assert!(table
        .get_or_create("real", Access::Use, &mut builder)
        .is_some());
}

#[test]
fn test_cells_keep_allocation_order() {
    let mut func = scratch_function();
    let mut fb_ctx = FunctionBuilderContext::new();
    let mut builder = FunctionBuilder::new(&mut func, &mut fb_ctx);
    let mut table = StorageTable::default();

    for name in ["c", "a", "b"] {
        table.get_or_create(name, Access::Define(Type::Int), &mut builder);
    }

    let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn test_lowered_function_reports_one_cell_per_name() {
    let lowered = lower(vec![
        konst("x", 1),
        konst("x", 2),
        konst("y", 3),
        binary(BinaryOp::Add, "x", "x", "y"),
        print("x"),
    ]);

    let names: Vec<&str> = lowered.cells.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(lowered.func.sized_stack_slots.len(), 2);
}
