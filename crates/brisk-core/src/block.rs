use cranelift_codegen::ir as clif_ir;
use indexmap::IndexMap;
use std::fmt;

/// Name of the block synthesized for an unlabeled leading instruction.
pub const ENTRY_BLOCK_NAME: &str = "";

/// How a block was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Source `jmp`.
    Jump,
    /// Jump inserted because the block ran into the next label.
    Fallthrough,
    /// Source `br`.
    Branch,
    /// Source `ret`.
    Return,
    /// Return appended after the last instruction of the function.
    ImplicitReturn,
}

impl Terminator {
    pub fn is_inserted(self) -> bool {
        matches!(self, Terminator::Fallthrough | Terminator::ImplicitReturn)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub name: String,
    pub block: clif_ir::Block,
    /// Set once some jump, branch or fallthrough targets this block.
    pub referenced: bool,
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    pub fn new(name: impl Into<String>, block: clif_ir::Block) -> Self {
        Self {
            name: name.into(),
            block,
            referenced: false,
            terminator: None,
        }
    }

    pub fn is_synthesized_entry(&self) -> bool {
        self.name == ENTRY_BLOCK_NAME
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthesized_entry() {
            write!(f, "{} = <entry>", self.block)
        } else {
            write!(f, "{} = {}", self.block, self.name)
        }
    }
}

/// Blocks of one function keyed by name, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct BlockMap {
    blocks: IndexMap<String, BasicBlock>,
}

impl BlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block, handing it back if the name is already taken.
    pub fn insert(&mut self, block: BasicBlock) -> std::result::Result<(), BasicBlock> {
        if self.blocks.contains_key(&block.name) {
            return Err(block);
        }
        self.blocks.insert(block.name.clone(), block);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&BasicBlock> {
        self.blocks.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// The block execution starts in.
    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.values().next()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.values()
    }

    pub fn into_blocks(self) -> Vec<BasicBlock> {
        self.blocks.into_values().collect()
    }
}
