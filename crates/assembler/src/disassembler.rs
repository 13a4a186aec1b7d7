//! Disassembler: bytecode array → canonical assembly text.
//!
//! Output is flat text: the `.registers` line, one `.constant` line per pool
//! entry in pool order, then one instruction per line. Bytes that do not
//! decode are emitted as a single trailing `.bytes` line.

use std::fmt::Write;

use kindle_bytecode::{BytecodeArray, Value};

/// Disassemble an array into canonical assembly text.
///
/// The output reassembles to an identical array, except that NaN constants
/// come back as the canonical NaN.
pub fn disassemble(bytecode: &BytecodeArray) -> String {
    let mut out = String::new();
    let _ = writeln!(out, ".registers {}", bytecode.register_count());
    for constant in bytecode.constants() {
        let _ = writeln!(out, ".constant {}", constant_literal(*constant));
    }

    for decoded in bytecode.instructions() {
        match decoded {
            Ok(instr) => {
                let _ = writeln!(out, "{instr}");
            }
            Err(_) => {
                let consumed = decoded_len(bytecode);
                let rest: Vec<String> = bytecode.bytes()[consumed..]
                    .iter()
                    .map(|b| format!("{b:#04x}"))
                    .collect();
                let _ = writeln!(out, ".bytes {}", rest.join(" "));
                break;
            }
        }
    }

    out
}

/// Length of the prefix that decodes cleanly.
fn decoded_len(bytecode: &BytecodeArray) -> usize {
    bytecode
        .instructions()
        .map_while(Result::ok)
        .last()
        .map_or(0, |instr| instr.offset + instr.size())
}

/// Literal text the parser reads back as exactly `value`.
fn constant_literal(value: Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::TheHole => "hole".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Smi(i) => i.to_string(),
        Value::Number(n) if n.is_nan() => "nan".to_string(),
        Value::Number(n) if n.is_infinite() => {
            let literal = if n > 0.0 { "inf" } else { "-inf" };
            literal.to_string()
        }
        // Debug always writes a fraction or exponent, so the parser keeps it
        // a Number.
        Value::Number(n) => format!("{n:?}"),
    }
}
