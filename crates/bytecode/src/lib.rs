//! Kindle bytecode types.
//!
//! This crate provides the data the interpreter core consumes:
//!
//! - [`Opcode`]: the dense opcode enumeration that indexes dispatch tables
//! - [`OperandType`], [`Operand`], [`Register`]: operand layout and decoding
//! - [`Value`]: the accumulator/register value representation
//! - [`BytecodeArray`] and [`BytecodeArrayBuilder`]: encoded instruction streams
//! - [`DecodeError`], [`EncodeError`], [`UnknownOpcode`]

pub mod bytecode_array;
pub mod error;
pub mod opcode;
pub mod operand;
pub mod value;

pub use bytecode_array::{
    BytecodeArray, BytecodeArrayBuilder, Instruction, Instructions, MAX_CONSTANTS, MAX_REGISTERS,
};
pub use error::{DecodeError, EncodeError, UnknownOpcode};
pub use opcode::{Opcode, OPCODE_COUNT};
pub use operand::{Operand, OperandType, Register};
pub use value::Value;
