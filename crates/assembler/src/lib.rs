//! Kindle assembler: text ↔ bytecode array translation.
//!
//! One instruction per line, `;` comments, case-insensitive mnemonics.
//! Registers are written `rN`, constant pool indices `[N]`. Directives
//! declare the register file size and the constant pool:
//!
//! ```
//! use kindle_assembler::{assemble, disassemble};
//!
//! let text = ".registers 1\n.constant 2.5\nLdaConstant [0]\nStar r0\nReturn\n";
//! let bytecode = assemble(text).unwrap();
//! assert_eq!(bytecode.bytes(), &[7, 0, 9, 0, 14]);
//! assert_eq!(disassemble(&bytecode), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(array)) == array` holds for every array within the
//! encoding limits whose constant pool holds no NaN, including arrays whose
//! bytes do not decode. NaN constants are written as `nan` and come back as
//! the canonical `f64::NAN`, so their payload and sign are not preserved.
//! The disassembler outputs canonical text; the assembler also accepts
//! non-canonical input (lowercase mnemonics, `0x` bytes, no `.registers`).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use kindle_bytecode::{BytecodeArray, BytecodeArrayBuilder};
use lexer::tokenize_line;
use parser::{parse_line, Line};

/// Assemble text into a bytecode array.
///
/// Without a `.registers` directive the register count is inferred from the
/// highest register referenced. Returns the first error encountered.
pub fn assemble(text: &str) -> Result<BytecodeArray, AsmError> {
    let mut builder = BytecodeArrayBuilder::new();
    let mut registers_declared = false;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        match parse_line(&tokens, line_num)? {
            None => {}
            Some(Line::Registers(count)) => {
                if registers_declared {
                    return Err(AsmError::DuplicateRegisters { line: line_num });
                }
                registers_declared = true;
                builder.register_count(count);
            }
            Some(Line::Constant(value)) => {
                builder.push_constant(value);
            }
            Some(Line::Bytes(bytes)) => {
                builder.raw_bytes(&bytes);
            }
            Some(Line::Instruction(opcode, operands)) => {
                builder.emit(opcode, &operands);
            }
        }
    }

    Ok(builder.build()?)
}

/// Disassemble a bytecode array into canonical assembly text.
pub fn disassemble(bytecode: &BytecodeArray) -> String {
    disassembler::disassemble(bytecode)
}
