//! Error types for the Kindle assembler.

use kindle_bytecode::EncodeError;
use thiserror::Error;

/// Errors produced while assembling text into a bytecode array.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// A line started with `.` but names no known directive.
    #[error("line {line}: unknown directive '{token}'")]
    UnknownDirective { line: usize, token: String },

    /// An opcode or directive did not have enough operands.
    #[error("line {line}: {opcode} expects {expected} operand(s)")]
    MissingOperand {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// A numeric literal could not be parsed or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A constant literal is not a value.
    #[error("line {line}: invalid constant '{token}'")]
    InvalidConstant { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// `.registers` appeared more than once.
    #[error("line {line}: register count already declared")]
    DuplicateRegisters { line: usize },

    /// The assembled array exceeds an encoding limit.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_opcode() {
        let e = AsmError::UnknownOpcode {
            line: 3,
            token: "Foo".to_string(),
        };
        assert_eq!(e.to_string(), "line 3: unknown opcode 'Foo'");
    }

    #[test]
    fn error_display_missing_operand() {
        let e = AsmError::MissingOperand {
            line: 7,
            opcode: "Star",
            expected: 1,
        };
        assert_eq!(e.to_string(), "line 7: Star expects 1 operand(s)");
    }

    #[test]
    fn error_display_invalid_constant() {
        let e = AsmError::InvalidConstant {
            line: 2,
            token: "maybe".to_string(),
        };
        assert_eq!(e.to_string(), "line 2: invalid constant 'maybe'");
    }

    #[test]
    fn error_display_encode_is_transparent() {
        let e = AsmError::from(EncodeError::TooManyRegisters {
            count: 300,
            limit: 256,
        });
        assert_eq!(e.to_string(), "register count 300 exceeds limit 256");
    }
}
