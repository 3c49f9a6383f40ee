/*! Lower Bril functions to Cranelift IR.
 *
 * Lowering runs per function in two passes. Discovery creates one Cranelift block per label so
 * every jump target is known up front; materialization walks the stream again with a cursor,
 * lowering each instruction into the open block and closing blocks that would otherwise fall
 * off their end. Every variable is a stack slot: uses load from it, definitions store to it.
 */

pub mod block_builder;
pub mod context;
pub mod function;
pub mod lowering;
pub mod program;

pub use block_builder::{discover_blocks, materialize_blocks};
pub use context::FunctionLoweringContext;
pub use function::{lower_function, LoweredFunction};
pub use lowering::lower_instruction;
pub use program::{lower_program, LoweredProgram};
