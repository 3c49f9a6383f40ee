//! Host implementations of the print primitives, for programs executed in-process.
//!
//! Each call prints one decimal value per line on stdout, booleans as `1`/`0`. Inside
//! [`capture_output`] the lines are collected on the calling thread instead.

use brisk_core::RuntimeFunction;
use cranelift_jit::JITBuilder;
use std::cell::RefCell;
use std::io::{self, Write};

thread_local! {
    static CAPTURE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

pub extern "C" fn brisk_print_int(value: i64) {
    emit_line(value.to_string());
}

pub extern "C" fn brisk_print_bool(value: i8) {
    emit_line(if value != 0 { "1" } else { "0" }.to_string());
}

/// Address of the host implementation of `function`.
pub fn address(function: RuntimeFunction) -> *const u8 {
    match function {
        RuntimeFunction::PrintInt => brisk_print_int as *const u8,
        RuntimeFunction::PrintBool => brisk_print_bool as *const u8,
    }
}

/// Makes every runtime symbol resolvable by the JIT.
pub fn register_symbols(builder: &mut JITBuilder) {
    for function in RuntimeFunction::ALL {
        builder.symbol(function.symbol(), address(function));
    }
}

/// Runs `f`, returning its result together with every line printed on this thread meanwhile.
pub fn capture_output<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let previous = CAPTURE.with(|capture| capture.replace(Some(Vec::new())));
    let result = f();
    let lines = CAPTURE.with(|capture| capture.replace(previous));
    (result, lines.unwrap_or_default())
}

fn emit_line(line: String) {
    let uncaptured = CAPTURE.with(|capture| match capture.borrow_mut().as_mut() {
        Some(lines) => {
            lines.push(line);
            None
        }
        None => Some(line),
    });

    if let Some(line) = uncaptured {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
    }
}
