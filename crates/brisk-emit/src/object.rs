use brisk_core::LoweredProgram;
use cranelift_object::{ObjectBuilder, ObjectModule};
use std::io::Write;
use tracing::info;

use crate::{
    config::BackendConfig,
    isa::{build_isa, IsaPurpose},
    module::define_program,
    EmitError, Emitter, Result,
};

/// Compiles lowered functions into a relocatable object file.
///
/// Every function is exported under its source name; the print primitives are left as
/// undefined imports (`brisk_print_int`, `brisk_print_bool`) for the linker to resolve.
#[derive(Debug, Clone)]
pub struct ObjectEmitter {
    config: BackendConfig,
}

impl ObjectEmitter {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn compile(&self, program: &LoweredProgram) -> Result<Vec<u8>> {
        let isa = build_isa(&self.config, IsaPurpose::Object)?;
        let triple = isa.triple().to_string();
        let builder = ObjectBuilder::new(isa, "brisk", cranelift_module::default_libcall_names())
            .map_err(EmitError::ModuleSetup)?;
        let mut module = ObjectModule::new(builder);
        define_program(&mut module, program, self.config.verify)?;

        let bytes = module
            .finish()
            .emit()
            .map_err(|e| EmitError::Object(e.to_string()))?;
        info!(%triple, bytes = bytes.len(), "emitted object file");
        Ok(bytes)
    }
}

impl Emitter for ObjectEmitter {
    fn emit<W: Write>(&self, program: &LoweredProgram, writer: &mut W) -> Result<()> {
        writer.write_all(&self.compile(program)?)?;
        Ok(())
    }
}
