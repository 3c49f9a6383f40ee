use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::{
    self as clif_ir, types, ExtFuncData, ExternalName, FuncRef, InstBuilder, UserExternalName,
};
use cranelift_frontend::FunctionBuilder;
use std::collections::HashMap;

use crate::{
    block::{BasicBlock, BlockMap, Terminator, ENTRY_BLOCK_NAME},
    config::LowerConfig,
    runtime::RuntimeFunction,
    storage::{Access, StorageCell, StorageTable},
    types::Type,
    LowerError, Result,
};

/// Scratch state for lowering one function: the block map, the storage table and the cursor.
///
/// The cursor is the builder's insertion point together with the name of the block it sits in,
/// so terminators can be recorded against the source block.
pub struct FunctionLoweringContext<'a> {
    function_name: &'a str,
    pub builder: FunctionBuilder<'a>,
    pub blocks: BlockMap,
    pub storage: StorageTable,
    config: &'a LowerConfig,
    current: Option<String>,
    runtime_refs: HashMap<RuntimeFunction, FuncRef>,
}

impl<'a> FunctionLoweringContext<'a> {
    pub fn new(
        function_name: &'a str,
        builder: FunctionBuilder<'a>,
        blocks: BlockMap,
        config: &'a LowerConfig,
    ) -> Self {
        Self {
            function_name,
            builder,
            blocks,
            storage: StorageTable::new(config.undefined_use),
            config,
            current: None,
            runtime_refs: HashMap::new(),
        }
    }

    pub fn function_name(&self) -> &str {
        self.function_name
    }

    pub fn current_block(&self) -> Option<&BasicBlock> {
        self.current.as_deref().and_then(|name| self.blocks.get(name))
    }

    /// True when the block under the cursor already has its terminator, or there is no block.
    pub fn is_terminated(&self) -> bool {
        self.current_block().map_or(true, BasicBlock::is_terminated)
    }

    /// Places the cursor at the start of the first block.
    ///
    /// Cranelift's entry block may not have predecessors, so a labeled first block (which a
    /// back edge may target) is entered through an unnamed prologue block.
    pub fn enter(&mut self) {
        let Some(entry) = self.blocks.entry() else {
            return;
        };
        let (name, block, labeled) = (
            entry.name.clone(),
            entry.block,
            !entry.is_synthesized_entry(),
        );

        if labeled {
            let prologue = self.builder.create_block();
            self.builder.switch_to_block(prologue);
            self.builder.ins().jump(block, &[]);
        }
        self.builder.switch_to_block(block);
        self.current = Some(name);
    }

    pub fn switch_to(&mut self, label: &str) -> Result<()> {
        let block = match self.blocks.get(label) {
            Some(bb) => bb.block,
            None => return Err(self.unknown_block(label)),
        };
        self.builder.switch_to_block(block);
        self.current = Some(label.to_string());
        Ok(())
    }

    /// Resolves a jump target and marks it referenced. The synthesized entry block has no
    /// label, so it is never a target.
    pub fn target(&mut self, label: &str) -> Result<clif_ir::Block> {
        if label == ENTRY_BLOCK_NAME {
            return Err(self.unknown_block(label));
        }
        match self.blocks.get_mut(label) {
            Some(bb) => {
                bb.referenced = true;
                Ok(bb.block)
            }
            None => Err(self.unknown_block(label)),
        }
    }

    pub fn terminate(&mut self, kind: Terminator) {
        if let Some(bb) = self
            .current
            .as_deref()
            .and_then(|name| self.blocks.get_mut(name))
        {
            bb.terminator = Some(kind);
        }
    }

    /// Closes the open block with a jump into `label`.
    pub fn fallthrough(&mut self, label: &str) -> Result<()> {
        let block = self.target(label)?;
        self.builder.ins().jump(block, &[]);
        self.terminate(Terminator::Fallthrough);
        Ok(())
    }

    pub fn return_zero(&mut self, kind: Terminator) {
        let zero = self.builder.ins().iconst(types::I64, 0);
        self.builder.ins().return_(&[zero]);
        self.terminate(kind);
    }

    /// Appends the implicit return if the open block still lacks a terminator.
    pub fn close_with_return(&mut self) {
        if !self.is_terminated() {
            self.return_zero(Terminator::ImplicitReturn);
        }
    }

    /// Loads `name` at the width of its cell.
    pub fn load(&mut self, name: &str) -> Result<(clif_ir::Value, Type)> {
        let cell = self.cell(name, Access::Use)?;
        let value = self
            .builder
            .ins()
            .stack_load(cell.ty.to_cranelift(), cell.slot, 0);
        Ok((value, cell.ty))
    }

    /// Loads `name` and converts it to `ty`.
    pub fn load_as(&mut self, name: &str, ty: Type) -> Result<clif_ir::Value> {
        let (value, from) = self.load(name)?;
        Ok(self.coerce(value, from, ty))
    }

    /// Writes `value` (of width `ty`) into the cell for `name`, allocating one of width `ty` if
    /// the name is new. An existing cell keeps its width.
    pub fn store(&mut self, name: &str, value: clif_ir::Value, ty: Type) -> Result<StorageCell> {
        let cell = self.cell(name, Access::Define(ty))?;
        let value = self.coerce(value, ty, cell.ty);
        self.builder.ins().stack_store(value, cell.slot, 0);
        Ok(cell)
    }

    /// Function reference for a runtime primitive, imported on first use.
    pub fn runtime_ref(&mut self, function: RuntimeFunction) -> FuncRef {
        if let Some(func_ref) = self.runtime_refs.get(&function) {
            return *func_ref;
        }

        let signature = self
            .builder
            .import_signature(function.signature(self.config.call_conv));
        let user_ref = self
            .builder
            .func
            .declare_imported_user_function(UserExternalName {
                namespace: RuntimeFunction::NAMESPACE,
                index: function.index(),
            });
        let func_ref = self.builder.import_function(ExtFuncData {
            name: ExternalName::user(user_ref),
            signature,
            colocated: false,
        });
        self.runtime_refs.insert(function, func_ref);
        func_ref
    }

    /// Seals and finalizes the builder, handing back the block map and storage table.
    pub fn finish(mut self) -> (BlockMap, StorageTable) {
        self.builder.seal_all_blocks();
        self.builder.finalize();
        (self.blocks, self.storage)
    }

    fn cell(&mut self, name: &str, access: Access) -> Result<StorageCell> {
        self.storage
            .get_or_create(name, access, &mut self.builder)
            .ok_or_else(|| LowerError::UndefinedVariable {
                function: self.function_name.to_string(),
                name: name.to_string(),
            })
    }

    fn coerce(&mut self, value: clif_ir::Value, from: Type, to: Type) -> clif_ir::Value {
        match (from, to) {
            (Type::Bool, Type::Int) => self.builder.ins().uextend(types::I64, value),
            (Type::Int, Type::Bool) => self.builder.ins().icmp_imm(IntCC::NotEqual, value, 0),
            _ => value,
        }
    }

    fn unknown_block(&self, label: &str) -> LowerError {
        LowerError::UnknownBlock {
            function: self.function_name.to_string(),
            label: label.to_string(),
        }
    }
}
