//! Operand kinds and the register newtype.

use std::fmt;

/// The kind of a single operand slot following an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    /// Signed 8-bit immediate.
    Imm8,
    /// Register index.
    Reg8,
    /// Constant pool index.
    Idx8,
}

impl OperandType {
    /// Encoded width in bytes.
    pub fn size(self) -> usize {
        match self {
            OperandType::Imm8 | OperandType::Reg8 | OperandType::Idx8 => 1,
        }
    }

    /// Decode a raw operand byte as this kind.
    pub fn decode(self, byte: u8) -> Operand {
        match self {
            OperandType::Imm8 => Operand::Imm(byte as i8),
            OperandType::Reg8 => Operand::Reg(Register::new(byte)),
            OperandType::Idx8 => Operand::Idx(byte),
        }
    }
}

/// A register in the current frame's register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(u8);

impl Register {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Index into the register file.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn to_byte(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A decoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Imm(i8),
    Reg(Register),
    Idx(u8),
}

impl Operand {
    /// Raw encoded byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Operand::Imm(v) => v as u8,
            Operand::Reg(r) => r.to_byte(),
            Operand::Idx(i) => i,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(v) => write!(f, "{v}"),
            Operand::Reg(r) => write!(f, "{r}"),
            Operand::Idx(i) => write!(f, "[{i}]"),
        }
    }
}
