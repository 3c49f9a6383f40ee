/*! Core program model and lowering for Bril.
 *
 * A Bril function is a flat stream of instructions and labels. Code generators want something else:
 * named basic blocks that each end in exactly one terminator, with every variable living in a
 * known storage location. This crate rebuilds that structure and lowers each function to a
 * Cranelift IR function, one stack slot per variable, with no optimization in between.
 */

pub mod block;
pub mod codegen;
pub mod config;
pub mod program;
pub mod runtime;
pub mod storage;
pub mod types;

pub use block::{BasicBlock, BlockMap, Terminator, ENTRY_BLOCK_NAME};
pub use codegen::{lower_function, lower_program, LoweredFunction, LoweredProgram};
pub use config::{LowerConfig, UndefinedUsePolicy};
pub use program::{BinaryOp, Code, Function, Instruction, Literal, Program};
pub use runtime::RuntimeFunction;
pub use storage::{Access, StorageCell, StorageTable};
pub use types::Type;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    #[error("function `{function}`: jump target `{label}` does not name a block")]
    UnknownBlock { function: String, label: String },
    #[error("function `{function}`: label `{label}` is defined more than once")]
    DuplicateLabel { function: String, label: String },
    #[error("function `{function}`: variable `{name}` is used before it is defined")]
    UndefinedVariable { function: String, name: String },
    #[error("function `{0}` is defined more than once")]
    DuplicateFunction(String),
}

impl LowerError {
    /// Name of the function whose lowering failed.
    pub fn function(&self) -> &str {
        match self {
            LowerError::UnknownBlock { function, .. }
            | LowerError::DuplicateLabel { function, .. }
            | LowerError::UndefinedVariable { function, .. } => function,
            LowerError::DuplicateFunction(function) => function,
        }
    }
}

pub type Result<T> = std::result::Result<T, LowerError>;

#[cfg(test)]
mod tests;
