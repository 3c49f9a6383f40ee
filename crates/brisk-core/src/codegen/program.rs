use std::collections::HashSet;
use tracing::info;

use crate::{
    codegen::function::{lower_function, LoweredFunction},
    config::LowerConfig,
    program::Program,
    LowerError, Result,
};

/// Every function of a program, lowered, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct LoweredProgram {
    pub functions: Vec<LoweredFunction>,
}

impl LoweredProgram {
    pub fn function(&self, name: &str) -> Option<&LoweredFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoweredFunction> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Lowers all functions in order. The first failure aborts the run; nothing partial is returned.
pub fn lower_program(program: &Program, config: &LowerConfig) -> Result<LoweredProgram> {
    let mut seen = HashSet::new();
    let mut functions = Vec::with_capacity(program.functions.len());

    for function in &program.functions {
        if !seen.insert(function.name.as_str()) {
            return Err(LowerError::DuplicateFunction(function.name.clone()));
        }
        functions.push(lower_function(function, config)?);
    }

    info!(functions = functions.len(), "lowered program");
    Ok(LoweredProgram { functions })
}
