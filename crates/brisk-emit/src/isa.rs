use cranelift_codegen::isa::{self, OwnedTargetIsa};
use cranelift_codegen::settings::{self, Configurable};
use target_lexicon::Triple;
use tracing::debug;

use crate::{config::BackendConfig, EmitError, Result};

/// What the ISA will be used for. The JIT needs non-PIC code for the host; object files are
/// position independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsaPurpose {
    Jit,
    Object,
}

pub fn build_isa(config: &BackendConfig, purpose: IsaPurpose) -> Result<OwnedTargetIsa> {
    let mut flag_builder = settings::builder();
    set(&mut flag_builder, "opt_level", config.opt_level.as_setting())?;
    set(
        &mut flag_builder,
        "enable_verifier",
        if config.verify { "true" } else { "false" },
    )?;
    set(&mut flag_builder, "use_colocated_libcalls", "false")?;
    set(
        &mut flag_builder,
        "is_pic",
        match purpose {
            IsaPurpose::Jit => "false",
            IsaPurpose::Object => "true",
        },
    )?;

    let target = match purpose {
        IsaPurpose::Jit => None,
        IsaPurpose::Object => config.target.as_deref(),
    };
    let isa_builder = match target {
        Some(name) => {
            let triple: Triple = name.parse().map_err(|e| EmitError::Target {
                target: name.to_string(),
                detail: format!("invalid target triple: {}", e),
            })?;
            isa::lookup(triple).map_err(|e| EmitError::Target {
                target: name.to_string(),
                detail: e.to_string(),
            })?
        }
        None => cranelift_native::builder().map_err(|e| EmitError::Host(e.to_string()))?,
    };

    let isa = isa_builder
        .finish(settings::Flags::new(flag_builder))
        .map_err(|e| EmitError::Target {
            target: target.unwrap_or("host").to_string(),
            detail: e.to_string(),
        })?;
    debug!(
        triple = %isa.triple(),
        call_conv = %isa.default_call_conv(),
        ?purpose,
        "built target ISA"
    );
    Ok(isa)
}

fn set(builder: &mut settings::Builder, name: &str, value: &str) -> Result<()> {
    builder
        .set(name, value)
        .map_err(|e| EmitError::Setting(format!("{} = {}: {}", name, value, e)))
}
