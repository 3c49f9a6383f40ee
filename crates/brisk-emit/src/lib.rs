/*! Hand lowered Bril programs to Cranelift backends.
 *
 * A lowered program is a set of Cranelift IR functions that call two host print primitives.
 * From here it can be written out as CLIF text for reading and diffing, compiled into a
 * relocatable object file for a chosen target, or JIT-compiled and run in-process with the
 * primitives bound to the implementations in [`runtime`].
 */

pub mod clif;
pub mod config;
pub mod isa;
pub mod jit;
pub mod module;
pub mod object;
pub mod runtime;

pub use clif::ClifEmitter;
pub use config::{BackendConfig, OptLevel, OutputFormat};
pub use isa::{build_isa, IsaPurpose};
pub use jit::{run_program, JitProgram};
pub use module::define_program;
pub use object::ObjectEmitter;
pub use runtime::capture_output;

use brisk_core::LoweredProgram;
use cranelift_codegen::isa::CallConv;
use cranelift_module::ModuleError;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("host machine is not supported: {0}")]
    Host(String),

    #[error("cannot build target `{target}`: {detail}")]
    Target { target: String, detail: String },

    #[error("invalid codegen setting {0}")]
    Setting(String),

    #[error("function `{function}` failed verification:\n{report}")]
    Verifier { function: String, report: String },

    #[error("function `{function}`: {source}")]
    Module {
        function: String,
        #[source]
        source: ModuleError,
    },

    #[error("module setup failed: {0}")]
    ModuleSetup(#[source] ModuleError),

    #[error("function `{function}` uses {actual}, but the target calling convention is {expected}")]
    CallConv {
        function: String,
        expected: CallConv,
        actual: CallConv,
    },

    #[error("function `{0}` collides with a runtime symbol")]
    SymbolCollision(String),

    #[error("runtime import `{symbol}` was assigned id {actual}, expected {expected}")]
    RuntimeLayout {
        symbol: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("entry function `{0}` not found")]
    UnknownEntry(String),

    #[error("object emission failed: {0}")]
    Object(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EmitError>;

pub trait Emitter {
    fn emit<W: Write>(&self, program: &LoweredProgram, writer: &mut W) -> Result<()>;

    fn emit_to_vec(&self, program: &LoweredProgram) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.emit(program, &mut buffer)?;
        Ok(buffer)
    }

    fn emit_to_string(&self, program: &LoweredProgram) -> Result<String> {
        let buffer = self.emit_to_vec(program)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Serializes `program` in `format`.
pub fn emit(
    program: &LoweredProgram,
    format: OutputFormat,
    config: &BackendConfig,
) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Clif => ClifEmitter::new(config.verify).emit_to_vec(program),
        OutputFormat::Object => ObjectEmitter::new(config.clone()).compile(program),
    }
}

/// Default calling convention of the ISA `purpose` would build, for lowering to match it.
pub fn target_call_conv(config: &BackendConfig, purpose: IsaPurpose) -> Result<CallConv> {
    Ok(build_isa(config, purpose)?.default_call_conv())
}
