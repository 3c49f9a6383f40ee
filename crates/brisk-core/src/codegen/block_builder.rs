use cranelift_frontend::FunctionBuilder;
use tracing::{debug, trace};

use crate::{
    block::{BasicBlock, BlockMap, ENTRY_BLOCK_NAME},
    codegen::{context::FunctionLoweringContext, lowering::lower_instruction},
    program::Code,
    LowerError, Result,
};

/// Pass 1: creates a block for every label, plus an unnamed entry block when the stream does not
/// open with a label.
///
/// Only labels create blocks. Creating all of them before any instruction is lowered is what
/// lets forward jumps resolve.
pub fn discover_blocks(
    function: &str,
    instrs: &[Code],
    builder: &mut FunctionBuilder,
) -> Result<BlockMap> {
    let mut blocks = BlockMap::new();

    if !matches!(instrs.first(), Some(Code::Label { .. })) {
        let mut entry = BasicBlock::new(ENTRY_BLOCK_NAME, builder.create_block());
        entry.referenced = true;
        let _ = blocks.insert(entry);
    }

    for label in instrs.iter().filter_map(Code::as_label) {
        let block = BasicBlock::new(label, builder.create_block());
        if blocks.insert(block).is_err() {
            return Err(LowerError::DuplicateLabel {
                function: function.to_string(),
                label: label.to_string(),
            });
        }
    }

    debug!(function, blocks = blocks.len(), "discovered blocks");
    Ok(blocks)
}

/// Pass 2: walks the stream with the cursor already placed in the first block.
///
/// A label closes the open block with a fallthrough jump when it has no terminator yet, then
/// moves the cursor. Instructions after a terminator and before the next label are dropped.
pub fn materialize_blocks(instrs: &[Code], ctx: &mut FunctionLoweringContext) -> Result<()> {
    for (index, code) in instrs.iter().enumerate() {
        match code {
            Code::Label { label } => {
                if index == 0 {
                    continue;
                }
                if !ctx.is_terminated() {
                    ctx.fallthrough(label)?;
                }
                ctx.switch_to(label)?;
                trace!(block = %label, "cursor moved");
            }
            Code::Instruction(inst) => {
                if ctx.is_terminated() {
                    trace!(index, %inst, "dropping instruction after terminator");
                    continue;
                }
                lower_instruction(inst, ctx)?;
            }
        }
    }
    Ok(())
}
