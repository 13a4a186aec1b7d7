//! Structural pass: decodes the stream and checks that it terminates.
//!
//! Decoding stops at the first malformed instruction. A stream that cannot be
//! decoded is fatal, and passes that need the instruction list are skipped.

use crate::error::VerifyError;
use kindle_bytecode::{BytecodeArray, DecodeError, Instruction, Opcode};

/// The decoded stream, consumed by later passes.
#[derive(Debug, Clone)]
pub struct StreamContext {
    /// Every instruction decoded before any structural error.
    pub instructions: Vec<Instruction>,
    /// Whether decoding failed (callers should skip later passes).
    pub fatal: bool,
}

/// Run the structural pass.
///
/// Returns the StreamContext and any errors found.
pub fn check_structural(bytecode: &BytecodeArray) -> (StreamContext, Vec<VerifyError>) {
    let mut errors = Vec::new();
    let mut instructions = Vec::new();
    let mut fatal = false;

    for decoded in bytecode.instructions() {
        match decoded {
            Ok(instr) => instructions.push(instr),
            Err(e) => {
                errors.push(from_decode(e));
                fatal = true;
            }
        }
    }

    if !fatal && instructions.last().map(|i| i.opcode) != Some(Opcode::Return) {
        errors.push(VerifyError::MissingReturn);
    }

    (
        StreamContext {
            instructions,
            fatal,
        },
        errors,
    )
}

fn from_decode(error: DecodeError) -> VerifyError {
    match error {
        DecodeError::InvalidOpcode { offset, byte } => {
            VerifyError::InvalidOpcode { at: offset, byte }
        }
        DecodeError::TruncatedOperand { offset, opcode } => {
            VerifyError::TruncatedOperand { at: offset, opcode }
        }
    }
}
