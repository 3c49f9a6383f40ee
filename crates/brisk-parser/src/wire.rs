//! Serde mirror of the Bril JSON layout.
//!
//! Every field is optional here so that a missing field surfaces as a schema error naming the
//! function and instruction, rather than as a bare JSON error. Unknown fields are ignored.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProgram {
    pub functions: Option<Vec<RawFunction>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFunction {
    pub name: Option<String>,
    pub instrs: Option<Vec<RawInstr>>,
}

/// One entry of `instrs`. A label carries only `label`; everything else is an instruction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInstr {
    pub label: Option<String>,
    pub op: Option<String>,
    pub dest: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub args: Option<Vec<String>>,
    /// Jump targets in canonical Bril; the flat layout puts them in `args` instead.
    pub labels: Option<Vec<String>>,
    pub value: Option<Value>,
}
