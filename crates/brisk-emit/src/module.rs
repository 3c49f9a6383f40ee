use brisk_core::{LoweredFunction, LoweredProgram, RuntimeFunction};
use cranelift_codegen::settings::FlagsOrIsa;
use cranelift_codegen::{print_errors::pretty_verifier_error, Context};
use cranelift_module::{FuncId, Linkage, Module};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::{EmitError, Result};

/// Declares the runtime imports and then every lowered function, and defines the functions.
///
/// Runtime imports go first so that each one's `FuncId` equals its index in
/// `RuntimeFunction::ALL`, which is how lowered code names them.
pub fn define_program<M: Module>(
    module: &mut M,
    program: &LoweredProgram,
    verify: bool,
) -> Result<HashMap<String, FuncId>> {
    declare_runtime(module)?;

    let mut ids = HashMap::with_capacity(program.len());
    for function in program.iter() {
        check_call_conv(module, function)?;
        if module.get_name(&function.name).is_some() {
            return Err(EmitError::SymbolCollision(function.name.clone()));
        }
        let id = module
            .declare_function(&function.name, Linkage::Export, &function.func.signature)
            .map_err(|source| EmitError::Module {
                function: function.name.clone(),
                source,
            })?;
        ids.insert(function.name.clone(), id);
    }

    for function in program.iter() {
        if verify {
            verify_function(function, module.isa())?;
        }
        let id = ids[&function.name];
        let mut ctx = Context::for_function(function.func.clone());
        module
            .define_function(id, &mut ctx)
            .map_err(|source| EmitError::Module {
                function: function.name.clone(),
                source,
            })?;
        trace!(function = %function.name, ?id, "defined function");
    }

    debug!(functions = ids.len(), "defined program");
    Ok(ids)
}

fn declare_runtime<M: Module>(module: &mut M) -> Result<()> {
    let call_conv = module.isa().default_call_conv();
    for function in RuntimeFunction::ALL {
        let id = module
            .declare_function(
                function.symbol(),
                Linkage::Import,
                &function.signature(call_conv),
            )
            .map_err(|source| EmitError::Module {
                function: function.symbol().to_string(),
                source,
            })?;
        if id.as_u32() != function.index() {
            return Err(EmitError::RuntimeLayout {
                symbol: function.symbol(),
                expected: function.index(),
                actual: id.as_u32(),
            });
        }
    }
    Ok(())
}

fn check_call_conv<M: Module>(module: &M, function: &LoweredFunction) -> Result<()> {
    let expected = module.isa().default_call_conv();
    let actual = function.func.signature.call_conv;
    if actual != expected {
        return Err(EmitError::CallConv {
            function: function.name.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn verify_function<'a>(
    function: &LoweredFunction,
    flags_or_isa: impl Into<FlagsOrIsa<'a>>,
) -> Result<()> {
    cranelift_codegen::verify_function(&function.func, flags_or_isa).map_err(|errors| {
        EmitError::Verifier {
            function: function.name.clone(),
            report: pretty_verifier_error(&function.func, None, errors),
        }
    })
}
