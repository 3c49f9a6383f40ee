use brisk_core::LoweredProgram;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::FuncId;
use std::collections::HashMap;
use tracing::info;

use crate::{
    config::BackendConfig,
    isa::{build_isa, IsaPurpose},
    module::define_program,
    runtime, EmitError, Result,
};

/// A lowered program compiled into executable memory on the host.
pub struct JitProgram {
    module: JITModule,
    functions: HashMap<String, FuncId>,
}

impl JitProgram {
    pub fn compile(program: &LoweredProgram, config: &BackendConfig) -> Result<Self> {
        let isa = build_isa(config, IsaPurpose::Jit)?;
        let mut builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        runtime::register_symbols(&mut builder);
        let mut module = JITModule::new(builder);

        let functions = define_program(&mut module, program, config.verify)?;
        module
            .finalize_definitions()
            .map_err(EmitError::ModuleSetup)?;

        info!(functions = functions.len(), "compiled program for the host");
        Ok(Self { module, functions })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Calls the function `name` and returns its status value.
    pub fn run(&self, name: &str) -> Result<i64> {
        let id = self
            .functions
            .get(name)
            .ok_or_else(|| EmitError::UnknownEntry(name.to_string()))?;
        let code = self.module.get_finalized_function(*id);

        // SAFETY: every lowered function has the signature `() -> i64` in the host's default
        // calling convention, which `define_program` checked against the JIT's ISA.
        let status = unsafe {
            let entry = std::mem::transmute::<*const u8, extern "C" fn() -> i64>(code);
            entry()
        };
        info!(function = name, status, "executed");
        Ok(status)
    }
}

/// Compiles `program` for the host and runs `config.entry`.
pub fn run_program(program: &LoweredProgram, config: &BackendConfig) -> Result<i64> {
    JitProgram::compile(program, config)?.run(&config.entry)
}
