//! Host primitives that lowered code calls into.
//!
//! Lowered functions reference these as `u0:<index>` user external names. Backends must declare
//! them first, in `RuntimeFunction::ALL` order, so each index equals its module `FuncId`.

use crate::types::Type;
use cranelift_codegen::ir::{AbiParam, Signature};
use cranelift_codegen::isa::CallConv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeFunction {
    PrintInt,
    PrintBool,
}

impl RuntimeFunction {
    pub const NAMESPACE: u32 = 0;

    pub const ALL: [RuntimeFunction; 2] = [RuntimeFunction::PrintInt, RuntimeFunction::PrintBool];

    /// Print primitive for a value of the given width.
    pub fn print_for(ty: Type) -> Self {
        match ty {
            Type::Int => RuntimeFunction::PrintInt,
            Type::Bool => RuntimeFunction::PrintBool,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            RuntimeFunction::PrintInt => 0,
            RuntimeFunction::PrintBool => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            RuntimeFunction::PrintInt => "brisk_print_int",
            RuntimeFunction::PrintBool => "brisk_print_bool",
        }
    }

    pub fn param_type(self) -> Type {
        match self {
            RuntimeFunction::PrintInt => Type::Int,
            RuntimeFunction::PrintBool => Type::Bool,
        }
    }

    pub fn signature(self, call_conv: CallConv) -> Signature {
        let mut sig = Signature::new(call_conv);
        let param = AbiParam::new(self.param_type().to_cranelift());
        // Narrow arguments are zero-extended to register width at the call.
        sig.params.push(match self.param_type() {
            Type::Bool => param.uext(),
            Type::Int => param,
        });
        sig
    }
}
