/*! Tests for block reconstruction and instruction lowering.
 *
 * Lowered functions are checked structurally through the Cranelift layout (which opcodes land in
 * which block) and run through the Cranelift verifier.
 */

mod storage_tests;

use cranelift_codegen::ir::{Block, InstructionData, Opcode, StackSlot};
use cranelift_codegen::settings;

use crate::{
    codegen::{lower_function, LoweredFunction},
    config::LowerConfig,
    program::{BinaryOp, Code, Function, Instruction, Literal},
    types::Type,
};

pub(crate) fn konst(dest: &str, value: i64) -> Code {
    Instruction::Const {
        dest: dest.into(),
        ty: Type::Int,
        value: Literal::Int(value),
    }
    .into()
}

pub(crate) fn konst_bool(dest: &str, value: bool) -> Code {
    Instruction::Const {
        dest: dest.into(),
        ty: Type::Bool,
        value: Literal::Bool(value),
    }
    .into()
}

pub(crate) fn binary(op: BinaryOp, dest: &str, lhs: &str, rhs: &str) -> Code {
    Instruction::Binary {
        op,
        dest: dest.into(),
        lhs: lhs.into(),
        rhs: rhs.into(),
    }
    .into()
}

pub(crate) fn not(dest: &str, arg: &str) -> Code {
    Instruction::Not {
        dest: dest.into(),
        arg: arg.into(),
    }
    .into()
}

pub(crate) fn id(dest: &str, arg: &str) -> Code {
    Instruction::Id {
        dest: dest.into(),
        arg: arg.into(),
    }
    .into()
}

pub(crate) fn print(arg: &str) -> Code {
    Instruction::Print { arg: arg.into() }.into()
}

pub(crate) fn jmp(target: &str) -> Code {
    Instruction::Jump {
        target: target.into(),
    }
    .into()
}

pub(crate) fn br(cond: &str, then_label: &str, else_label: &str) -> Code {
    Instruction::Branch {
        cond: cond.into(),
        then_label: then_label.into(),
        else_label: else_label.into(),
    }
    .into()
}

pub(crate) fn ret() -> Code {
    Instruction::Return.into()
}

pub(crate) fn nop() -> Code {
    Instruction::Nop.into()
}

pub(crate) fn label(name: &str) -> Code {
    Code::label(name)
}

pub(crate) fn lower(instrs: Vec<Code>) -> LoweredFunction {
    lower_with(instrs, &LowerConfig::default())
}

pub(crate) fn lower_with(instrs: Vec<Code>, config: &LowerConfig) -> LoweredFunction {
    let function = Function::new("main", instrs);
    let lowered = lower_function(&function, config).unwrap();
    verify(&lowered);
    lowered
}

pub(crate) fn verify(lowered: &LoweredFunction) {
    let flags = settings::Flags::new(settings::builder());
    if let Err(errors) = cranelift_codegen::verify_function(&lowered.func, &flags) {
        panic!("verifier rejected `{}`:\n{}\n{}", lowered.name, errors, lowered.func.display());
    }
}

pub(crate) fn block_of(lowered: &LoweredFunction, name: &str) -> Block {
    lowered
        .block(name)
        .unwrap_or_else(|| panic!("no block named `{}`", name))
        .block
}

pub(crate) fn opcodes(lowered: &LoweredFunction, block: Block) -> Vec<Opcode> {
    lowered
        .func
        .layout
        .block_insts(block)
        .map(|inst| lowered.func.dfg.insts[inst].opcode())
        .collect()
}

pub(crate) fn stored_slots(lowered: &LoweredFunction, block: Block) -> Vec<StackSlot> {
    lowered
        .func
        .layout
        .block_insts(block)
        .filter_map(|inst| match lowered.func.dfg.insts[inst] {
            InstructionData::StackStore { stack_slot, .. } => Some(stack_slot),
            _ => None,
        })
        .collect()
}

/// Destination of the unconditional jump ending `block`, if it ends in one.
pub(crate) fn jump_destination(lowered: &LoweredFunction, block: Block) -> Option<Block> {
    let last = lowered.func.layout.last_inst(block)?;
    match lowered.func.dfg.insts[last] {
        InstructionData::Jump { destination, .. } => {
            Some(destination.block(&lowered.func.dfg.value_lists))
        }
        _ => None,
    }
}
