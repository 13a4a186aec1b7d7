//! Decode and encode errors for Kindle bytecode.

use crate::opcode::Opcode;
use thiserror::Error;

/// A byte that names no opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid opcode: {0:#04x}")]
pub struct UnknownOpcode(pub u8);

/// Errors that occur while decoding a bytecode stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Byte at `offset` does not name an opcode.
    #[error("invalid opcode {byte:#04x} at offset {offset}")]
    InvalidOpcode { offset: usize, byte: u8 },

    /// Stream ends before all operands of an instruction.
    #[error("{opcode} at offset {offset} is missing operand bytes")]
    TruncatedOperand { offset: usize, opcode: Opcode },
}

/// Errors produced when assembling a bytecode array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The constant pool can address at most `limit` entries.
    #[error("constant pool full ({limit} entries)")]
    ConstantPoolFull { limit: usize },

    /// The register file can hold at most `limit` registers.
    #[error("register count {count} exceeds limit {limit}")]
    TooManyRegisters { count: usize, limit: usize },
}
