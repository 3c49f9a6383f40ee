use cranelift_codegen::isa::CallConv;

/// What the storage table does when a variable is read before any definition was lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefinedUsePolicy {
    /// Allocate a boolean-width cell and carry on. Its contents are unspecified until written.
    #[default]
    DefaultBool,
    /// Fail the function with `LowerError::UndefinedVariable`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowerConfig {
    /// Calling convention for lowered functions and runtime imports. Must match the backend ISA.
    pub call_conv: CallConv,
    pub undefined_use: UndefinedUsePolicy,
}

impl LowerConfig {
    pub fn with_call_conv(mut self, call_conv: CallConv) -> Self {
        self.call_conv = call_conv;
        self
    }

    pub fn with_undefined_use(mut self, policy: UndefinedUsePolicy) -> Self {
        self.undefined_use = policy;
        self
    }
}

impl Default for LowerConfig {
    fn default() -> Self {
        Self {
            call_conv: CallConv::SystemV,
            undefined_use: UndefinedUsePolicy::DefaultBool,
        }
    }
}
