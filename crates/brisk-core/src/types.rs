use cranelift::codegen::ir::types as clif_types;
use std::fmt;

/// Value types carried by Bril variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
}

impl Type {
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int),
            "bool" => Some(Type::Bool),
            _ => None,
        }
    }

    /// Cranelift has no 1-bit integer, so booleans occupy an `i8` holding 0 or 1.
    pub fn to_cranelift(self) -> clif_types::Type {
        match self {
            Type::Int => clif_types::I64,
            Type::Bool => clif_types::I8,
        }
    }

    pub fn size_bytes(self) -> u32 {
        self.to_cranelift().bytes()
    }

    pub fn align_shift(self) -> u8 {
        self.size_bytes().trailing_zeros() as u8
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
        }
    }
}
