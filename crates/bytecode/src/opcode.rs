//! Opcode definitions for the Kindle register machine.
//!
//! Opcodes form a dense enumeration `0..OPCODE_COUNT`. The ordinal doubles as
//! the encoded opcode byte and as the dispatch table index; nothing else should
//! read meaning into it.

use crate::error::UnknownOpcode;
use crate::operand::OperandType;

/// Identifies the operation to perform.
///
/// `#[repr(u8)]` with contiguous discriminants starting at zero: adding an
/// opcode means appending it here, to [`Opcode::ALL`] and to the match arms
/// below.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    // Load immediate
    /// Load Smi 0 into the accumulator.
    LdaZero = 0,
    /// Load an 8-bit signed literal into the accumulator as a Smi.
    LdaSmi8 = 1,
    /// Load `undefined` into the accumulator.
    LdaUndefined = 2,
    /// Load `null` into the accumulator.
    LdaNull = 3,
    /// Load the hole into the accumulator.
    LdaTheHole = 4,
    /// Load `true` into the accumulator.
    LdaTrue = 5,
    /// Load `false` into the accumulator.
    LdaFalse = 6,

    // Load constant
    /// Load constant pool entry `idx` into the accumulator.
    LdaConstant = 7,

    // Register transfer
    /// Load the accumulator from register `src`.
    Ldar = 8,
    /// Store the accumulator to register `dst`.
    Star = 9,

    // Binary arithmetic
    /// Add register `src` to the accumulator.
    Add = 10,
    /// Subtract register `src` from the accumulator.
    Sub = 11,
    /// Multiply the accumulator by register `src`.
    Mul = 12,
    /// Divide register `src` by the accumulator.
    Div = 13,

    // Control
    /// Return the value in register 0.
    Return = 14,
}

/// Number of opcodes. Also the length of every dispatch table.
pub const OPCODE_COUNT: usize = 15;

impl Opcode {
    /// All opcodes in enumeration order.
    pub const ALL: [Opcode; OPCODE_COUNT] = [
        Opcode::LdaZero,
        Opcode::LdaSmi8,
        Opcode::LdaUndefined,
        Opcode::LdaNull,
        Opcode::LdaTheHole,
        Opcode::LdaTrue,
        Opcode::LdaFalse,
        Opcode::LdaConstant,
        Opcode::Ldar,
        Opcode::Star,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Return,
    ];

    /// Position of this opcode in a dispatch table.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Operand layout that follows the opcode byte.
    pub fn operand_types(self) -> &'static [OperandType] {
        match self {
            Opcode::LdaZero
            | Opcode::LdaUndefined
            | Opcode::LdaNull
            | Opcode::LdaTheHole
            | Opcode::LdaTrue
            | Opcode::LdaFalse
            | Opcode::Return => &[],
            Opcode::LdaSmi8 => &[OperandType::Imm8],
            Opcode::LdaConstant => &[OperandType::Idx8],
            Opcode::Ldar
            | Opcode::Star
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div => &[OperandType::Reg8],
        }
    }

    /// Full encoded width in bytes: the opcode byte plus its operands.
    pub fn size(self) -> usize {
        1 + self
            .operand_types()
            .iter()
            .map(|ty| ty.size())
            .sum::<usize>()
    }

    /// Returns true for opcodes that end the current frame.
    pub fn is_terminal(self) -> bool {
        matches!(self, Opcode::Return)
    }

    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::LdaZero => "LdaZero",
            Opcode::LdaSmi8 => "LdaSmi8",
            Opcode::LdaUndefined => "LdaUndefined",
            Opcode::LdaNull => "LdaNull",
            Opcode::LdaTheHole => "LdaTheHole",
            Opcode::LdaTrue => "LdaTrue",
            Opcode::LdaFalse => "LdaFalse",
            Opcode::LdaConstant => "LdaConstant",
            Opcode::Ldar => "Ldar",
            Opcode::Star => "Star",
            Opcode::Add => "Add",
            Opcode::Sub => "Sub",
            Opcode::Mul => "Mul",
            Opcode::Div => "Div",
            Opcode::Return => "Return",
        }
    }

    /// Looks up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<u8> for Opcode {
    type Error = UnknownOpcode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Opcode::ALL
            .get(value as usize)
            .copied()
            .ok_or(UnknownOpcode(value))
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
