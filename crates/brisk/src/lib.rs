/*! Unified interface for lowering Bril programs.
 *
 * One import covers the whole pipeline: decoding Bril JSON, lowering it to Cranelift IR, and
 * handing the result to a backend for CLIF text, object files or in-process execution.
 */

pub use brisk_core as core;
pub use brisk_emit as emit;
pub use brisk_parser as parser;

pub use brisk_core::{
    lower_function, lower_program, BasicBlock, Instruction, LowerConfig, LowerError,
    LoweredFunction, LoweredProgram, Program, Terminator, Type, UndefinedUsePolicy,
};

pub use brisk_emit::{
    run_program, BackendConfig, ClifEmitter, EmitError, Emitter, IsaPurpose, ObjectEmitter,
    OptLevel, OutputFormat,
};

pub use brisk_parser::{parse_program, parse_slice, ParseError};

use thiserror::Error;

/// Any failure along the parse, lower, emit pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Lower(#[from] LowerError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a Bril JSON program and lowers it with `config`.
pub fn lower_json(json: &str, config: &LowerConfig) -> Result<LoweredProgram> {
    let program = parse_program(json)?;
    Ok(lower_program(&program, config)?)
}

/// Parses, lowers and serializes a Bril JSON program in one step, lowering for the calling
/// convention of the backend's target.
pub fn compile(json: &str, format: OutputFormat, config: &BackendConfig) -> Result<Vec<u8>> {
    let call_conv = brisk_emit::target_call_conv(config, IsaPurpose::Object)?;
    let lowered = lower_json(json, &LowerConfig::default().with_call_conv(call_conv))?;
    Ok(brisk_emit::emit(&lowered, format, config)?)
}
