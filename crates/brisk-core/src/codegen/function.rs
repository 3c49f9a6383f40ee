use cranelift_codegen::ir::{self as clif_ir, types, AbiParam, Signature, UserFuncName};
use cranelift_codegen::isa::CallConv;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use tracing::debug;

use crate::{
    block::BasicBlock,
    codegen::{
        block_builder::{discover_blocks, materialize_blocks},
        context::FunctionLoweringContext,
    },
    config::LowerConfig,
    program::Function,
    storage::StorageCell,
    Result,
};

/// A function lowered to Cranelift IR, along with the source-level view of its blocks and cells.
#[derive(Debug, Clone)]
pub struct LoweredFunction {
    pub name: String,
    pub func: clif_ir::Function,
    /// Source blocks in discovery order. A prologue block, if any, is not listed.
    pub blocks: Vec<BasicBlock>,
    /// Storage cells in allocation order.
    pub cells: Vec<(String, StorageCell)>,
}

impl LoweredFunction {
    pub fn block(&self, name: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|bb| bb.name == name)
    }

    pub fn cell(&self, name: &str) -> Option<StorageCell> {
        self.cells
            .iter()
            .find(|(cell_name, _)| cell_name == name)
            .map(|(_, cell)| *cell)
    }
}

/// Signature shared by every lowered function: no parameters, an `i64` status result.
pub fn function_signature(call_conv: CallConv) -> Signature {
    let mut sig = Signature::new(call_conv);
    sig.returns.push(AbiParam::new(types::I64));
    sig
}

pub fn lower_function(function: &Function, config: &LowerConfig) -> Result<LoweredFunction> {
    debug!(
        function = %function.name,
        instructions = function.instrs.len(),
        "lowering function"
    );

    let mut func = clif_ir::Function::with_name_signature(
        UserFuncName::testcase(&function.name),
        function_signature(config.call_conv),
    );
    let mut builder_context = FunctionBuilderContext::new();
    let mut builder = FunctionBuilder::new(&mut func, &mut builder_context);

    let blocks = discover_blocks(&function.name, &function.instrs, &mut builder)?;
    let mut ctx = FunctionLoweringContext::new(&function.name, builder, blocks, config);
    ctx.enter();
    materialize_blocks(&function.instrs, &mut ctx)?;
    ctx.close_with_return();
    let (blocks, storage) = ctx.finish();

    debug!(
        function = %function.name,
        blocks = blocks.len(),
        cells = storage.len(),
        "lowered function"
    );

    Ok(LoweredFunction {
        name: function.name.clone(),
        func,
        blocks: blocks.into_blocks(),
        cells: storage.into_cells(),
    })
}
