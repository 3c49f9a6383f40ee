use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::{types, InstBuilder};
use tracing::trace;

use crate::{
    block::Terminator,
    codegen::context::FunctionLoweringContext,
    program::{BinaryOp, Instruction, Literal},
    runtime::RuntimeFunction,
    types::Type,
    Result,
};

/// Lowers one instruction into the block under the cursor.
///
/// The caller guarantees that block has no terminator yet.
pub fn lower_instruction(inst: &Instruction, ctx: &mut FunctionLoweringContext) -> Result<()> {
    trace!(function = ctx.function_name(), %inst, "lowering");

    match inst {
        Instruction::Const { dest, ty, value } => {
            let value = match value {
                Literal::Int(n) => ctx.builder.ins().iconst(types::I64, *n),
                Literal::Bool(b) => ctx.builder.ins().iconst(types::I8, i64::from(*b)),
            };
            ctx.store(dest, value, *ty)?;
        }
        Instruction::Binary { op, dest, lhs, rhs } => {
            let lhs = ctx.load_as(lhs, op.operand_type())?;
            let rhs = ctx.load_as(rhs, op.operand_type())?;
            let ins = ctx.builder.ins();
            let result = match op {
                BinaryOp::Add => ins.iadd(lhs, rhs),
                BinaryOp::Sub => ins.isub(lhs, rhs),
                BinaryOp::Mul => ins.imul(lhs, rhs),
                BinaryOp::Div => ins.sdiv(lhs, rhs),
                BinaryOp::Eq => ins.icmp(IntCC::Equal, lhs, rhs),
                BinaryOp::Lt => ins.icmp(IntCC::SignedLessThan, lhs, rhs),
                BinaryOp::Gt => ins.icmp(IntCC::SignedGreaterThan, lhs, rhs),
                BinaryOp::And => ins.band(lhs, rhs),
                BinaryOp::Or => ins.bor(lhs, rhs),
            };
            ctx.store(dest, result, op.result_type())?;
        }
        Instruction::Not { dest, arg } => {
            let operand = ctx.load_as(arg, Type::Bool)?;
            // `bnot` would flip all eight bits; comparing keeps the result 0 or 1.
            let result = ctx.builder.ins().icmp_imm(IntCC::Equal, operand, 0);
            ctx.store(dest, result, Type::Bool)?;
        }
        Instruction::Id { dest, arg } => {
            let (value, ty) = ctx.load(arg)?;
            ctx.store(dest, value, ty)?;
        }
        Instruction::Jump { target } => {
            let block = ctx.target(target)?;
            ctx.builder.ins().jump(block, &[]);
            ctx.terminate(Terminator::Jump);
        }
        Instruction::Branch {
            cond,
            then_label,
            else_label,
        } => {
            let cond = ctx.load_as(cond, Type::Bool)?;
            let then_block = ctx.target(then_label)?;
            let else_block = ctx.target(else_label)?;
            ctx.builder
                .ins()
                .brif(cond, then_block, &[], else_block, &[]);
            ctx.terminate(Terminator::Branch);
        }
        Instruction::Return => ctx.return_zero(Terminator::Return),
        Instruction::Print { arg } => {
            let (value, ty) = ctx.load(arg)?;
            let print = ctx.runtime_ref(RuntimeFunction::print_for(ty));
            ctx.builder.ins().call(print, &[value]);
        }
        Instruction::Nop => {}
    }
    Ok(())
}
