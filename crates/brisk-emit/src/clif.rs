use brisk_core::{LoweredFunction, LoweredProgram};
use cranelift_codegen::settings;
use std::io::Write;

use crate::{module::verify_function, Emitter, Result};

/// Writes lowered functions as Cranelift IR text.
///
/// Each function is preceded by comment lines naming its source and mapping its Cranelift
/// blocks back to source labels, so the output stays readable and still parses with
/// `cranelift-reader`.
#[derive(Debug, Clone, Copy)]
pub struct ClifEmitter {
    verify: bool,
}

impl ClifEmitter {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    fn emit_function<W: Write>(&self, function: &LoweredFunction, writer: &mut W) -> Result<()> {
        if self.verify {
            let flags = settings::Flags::new(settings::builder());
            verify_function(function, &flags)?;
        }

        writeln!(writer, "; {}", function.name)?;
        for block in &function.blocks {
            writeln!(writer, "; {}", block)?;
        }
        write!(writer, "{}", function.func.display())?;
        Ok(())
    }
}

impl Default for ClifEmitter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Emitter for ClifEmitter {
    fn emit<W: Write>(&self, program: &LoweredProgram, writer: &mut W) -> Result<()> {
        writeln!(
            writer,
            "; brisk: {} function(s) lowered from Bril",
            program.len()
        )?;
        for function in program.iter() {
            writeln!(writer)?;
            self.emit_function(function, writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisk_core::{lower_program, Code, Function, Instruction, LowerConfig, Program};

    #[test]
    fn test_header_and_block_map() {
        let program = Program::new(vec![Function::new(
            "main",
            vec![
                Instruction::Nop.into(),
                Code::label("L1"),
                Instruction::Return.into(),
            ],
        )]);
        let lowered = lower_program(&program, &LowerConfig::default()).unwrap();

        let text = ClifEmitter::default().emit_to_string(&lowered).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "; brisk: 1 function(s) lowered from Bril");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "; main");
        assert_eq!(lines[3], "; block0 = <entry>");
        assert_eq!(lines[4], "; block1 = L1");
        assert!(lines[5].starts_with("function %main() -> i64"));
    }

    #[test]
    fn test_empty_program() {
        let text = ClifEmitter::default()
            .emit_to_string(&LoweredProgram::default())
            .unwrap();
        assert_eq!(text, "; brisk: 0 function(s) lowered from Bril\n");
    }
}
