//! Verification errors.
//!
//! Locations (`at`) are byte offsets into the instruction stream. The verifier
//! collects every error it finds, not just the first.

use kindle_bytecode::{Opcode, Register};
use thiserror::Error;

/// Errors found by static verification of a bytecode array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    // --- Structural ---
    /// Byte in opcode position does not name an opcode.
    #[error("invalid opcode {byte:#04x} at offset {at}")]
    InvalidOpcode { at: usize, byte: u8 },

    /// Stream ends inside an instruction.
    #[error("{opcode} at offset {at} is missing operand bytes")]
    TruncatedOperand { at: usize, opcode: Opcode },

    // --- Limits ---
    #[error("register count {count} exceeds limit {limit}")]
    TooManyRegisters { count: usize, limit: usize },

    #[error("constant pool of {count} entries exceeds limit {limit}")]
    TooManyConstants { count: usize, limit: usize },

    // --- Operands ---
    /// Register operand outside the register file.
    #[error("register {register} at offset {at} is outside a register file of {count}")]
    RegisterOutOfBounds {
        at: usize,
        register: Register,
        count: usize,
    },

    /// Constant operand outside the pool.
    #[error("constant [{index}] at offset {at} is outside a pool of {pool_size}")]
    ConstantOutOfBounds {
        at: usize,
        index: usize,
        pool_size: usize,
    },

    // --- Termination ---
    /// Stream is empty or its last instruction is not Return.
    #[error("bytecode does not end with Return")]
    MissingReturn,

    /// Return needs r0, but the register file is empty.
    #[error("Return at offset {at} needs r0 but the register file is empty")]
    ReturnWithoutResultRegister { at: usize },

    // --- Reachability ---
    /// Instruction after a Return can never execute.
    #[error("unreachable instruction at offset {at}")]
    UnreachableCode { at: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_structural() {
        assert_eq!(
            VerifyError::InvalidOpcode { at: 3, byte: 0xff }.to_string(),
            "invalid opcode 0xff at offset 3"
        );
        assert_eq!(
            VerifyError::TruncatedOperand {
                at: 0,
                opcode: Opcode::Star
            }
            .to_string(),
            "Star at offset 0 is missing operand bytes"
        );
    }

    #[test]
    fn display_operands() {
        assert_eq!(
            VerifyError::RegisterOutOfBounds {
                at: 2,
                register: Register::new(4),
                count: 2
            }
            .to_string(),
            "register r4 at offset 2 is outside a register file of 2"
        );
        assert_eq!(
            VerifyError::ConstantOutOfBounds {
                at: 0,
                index: 1,
                pool_size: 0
            }
            .to_string(),
            "constant [1] at offset 0 is outside a pool of 0"
        );
    }

    #[test]
    fn display_termination() {
        assert_eq!(
            VerifyError::MissingReturn.to_string(),
            "bytecode does not end with Return"
        );
        assert_eq!(
            VerifyError::UnreachableCode { at: 5 }.to_string(),
            "unreachable instruction at offset 5"
        );
    }
}
