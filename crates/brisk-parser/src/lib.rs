/*! Decode Bril JSON programs into the typed program model.
 *
 * Bril's wire format is loose: every instruction is one JSON object whose meaning depends on its
 * `op` string, with optional `dest`, `type`, `args` and `value` fields. Decoding happens once,
 * here, so the lowering stage only ever sees well-formed `brisk_core::Instruction` values.
 * Anything missing or mistyped is reported with the function name and instruction index.
 */

pub mod decode;
pub mod wire;

use brisk_core::Program;
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub use decode::{decode_code, decode_function, decode_program};
pub use wire::{RawFunction, RawInstr, RawProgram};

/// Where in the input a decoding error was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub function: Option<String>,
    pub index: Option<usize>,
}

impl Location {
    pub fn program() -> Self {
        Self::default()
    }

    pub fn function(name: &str) -> Self {
        Self {
            function: Some(name.to_string()),
            index: None,
        }
    }

    pub fn instruction(function: &str, index: usize) -> Self {
        Self {
            function: Some(function.to_string()),
            index: Some(index),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.function, self.index) {
            (None, _) => write!(f, "program"),
            (Some(function), None) => write!(f, "function `{}`", function),
            (Some(function), Some(index)) => {
                write!(f, "function `{}`, instruction {}", function, index)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{location}: {message}")]
    Schema { location: Location, message: String },

    #[error("{location}: unsupported operation `{op}`")]
    UnsupportedOperation { location: Location, op: String },
}

impl ParseError {
    pub fn schema(location: Location, message: impl Into<String>) -> Self {
        ParseError::Schema {
            location,
            message: message.into(),
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::Json(_) => None,
            ParseError::Schema { location, .. }
            | ParseError::UnsupportedOperation { location, .. } => Some(location),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

pub fn parse_program(input: &str) -> Result<Program> {
    let raw: RawProgram = serde_json::from_str(input)?;
    finish(raw)
}

/// Same as [`parse_program`], for input that may not be valid UTF-8.
pub fn parse_slice(input: &[u8]) -> Result<Program> {
    let raw: RawProgram = serde_json::from_slice(input)?;
    finish(raw)
}

fn finish(raw: RawProgram) -> Result<Program> {
    let program = decode_program(raw)?;
    debug!(functions = program.functions.len(), "decoded program");
    Ok(program)
}
