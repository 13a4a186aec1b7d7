//! Bytecode arrays: the encoded instruction stream of one function together
//! with its register file size and constant pool.
//!
//! Encoding is variable width:
//! ```text
//! Byte 0:    opcode (u8, dense ordinal)
//! Bytes 1..: one byte per operand, as listed by Opcode::operand_types()
//! ```

use std::fmt;

use crate::error::{DecodeError, EncodeError};
use crate::opcode::Opcode;
use crate::operand::{Operand, Register};
use crate::value::Value;

/// Largest register file a frame may request.
pub const MAX_REGISTERS: usize = 256;

/// Largest constant pool an `Idx8` operand can address.
pub const MAX_CONSTANTS: usize = 256;

/// The bytecode of one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeArray {
    bytes: Vec<u8>,
    register_count: usize,
    constants: Vec<Value>,
}

impl BytecodeArray {
    /// Wrap raw bytes without validating them. Use the verifier before
    /// executing arrays that did not come from [`BytecodeArrayBuilder`].
    pub fn new(bytes: Vec<u8>, register_count: usize, constants: Vec<Value>) -> Self {
        Self {
            bytes,
            register_count,
            constants,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the stream in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of registers a frame running this array needs.
    pub fn register_count(&self) -> usize {
        self.register_count
    }

    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    pub fn constant(&self, index: usize) -> Option<Value> {
        self.constants.get(index).copied()
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Decode the instruction stream front to back.
    ///
    /// Iteration stops after the first decode error.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            bytes: &self.bytes,
            offset: 0,
        }
    }
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Byte offset of the opcode within the stream.
    pub offset: usize,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Encoded width in bytes.
    pub fn size(&self) -> usize {
        self.opcode.size()
    }

    /// The register operand, if this instruction has one.
    pub fn register(&self) -> Option<Register> {
        self.operands.iter().find_map(|op| match op {
            Operand::Reg(r) => Some(*r),
            _ => None,
        })
    }

    /// The constant pool operand, if this instruction has one.
    pub fn constant_index(&self) -> Option<usize> {
        self.operands.iter().find_map(|op| match op {
            Operand::Idx(i) => Some(*i as usize),
            _ => None,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Iterator returned by [`BytecodeArray::instructions`].
pub struct Instructions<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl Iterator for Instructions<'_> {
    type Item = Result<Instruction, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let byte = *self.bytes.get(offset)?;

        let opcode = match Opcode::try_from(byte) {
            Ok(op) => op,
            Err(_) => {
                self.offset = self.bytes.len();
                return Some(Err(DecodeError::InvalidOpcode { offset, byte }));
            }
        };

        let end = offset + opcode.size();
        if end > self.bytes.len() {
            self.offset = self.bytes.len();
            return Some(Err(DecodeError::TruncatedOperand { offset, opcode }));
        }

        let operands = opcode
            .operand_types()
            .iter()
            .zip(&self.bytes[offset + 1..end])
            .map(|(ty, &b)| ty.decode(b))
            .collect();

        self.offset = end;
        Some(Ok(Instruction {
            offset,
            opcode,
            operands,
        }))
    }
}

/// Incrementally builds a [`BytecodeArray`].
///
/// ```
/// use kindle_bytecode::{BytecodeArrayBuilder, Register};
///
/// let r0 = Register::new(0);
/// let array = BytecodeArrayBuilder::new()
///     .lda_smi8(5)
///     .star(r0)
///     .ret()
///     .build()
///     .unwrap();
/// assert_eq!(array.bytes(), &[1, 5, 9, 0, 14]);
/// assert_eq!(array.register_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BytecodeArrayBuilder {
    bytes: Vec<u8>,
    constants: Vec<Value>,
    register_count: Option<usize>,
    highest_register: Option<Register>,
}

impl BytecodeArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the register file size instead of inferring it from the highest
    /// register referenced.
    pub fn register_count(&mut self, count: usize) -> &mut Self {
        self.register_count = Some(count);
        self
    }

    /// Append a constant to the pool without deduplication and return its index.
    pub fn push_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Append one instruction. Operands must match `opcode.operand_types()`.
    pub fn emit(&mut self, opcode: Opcode, operands: &[Operand]) -> &mut Self {
        debug_assert_eq!(
            opcode.operand_types().len(),
            operands.len(),
            "operand count mismatch for {opcode}"
        );
        self.bytes.push(opcode as u8);
        for operand in operands {
            if let Operand::Reg(r) = operand {
                self.highest_register = self.highest_register.max(Some(*r));
            }
            self.bytes.push(operand.to_byte());
        }
        self
    }

    /// Append bytes as-is, without decoding them.
    pub fn raw_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn lda_zero(&mut self) -> &mut Self {
        self.emit(Opcode::LdaZero, &[])
    }

    pub fn lda_smi8(&mut self, value: i8) -> &mut Self {
        self.emit(Opcode::LdaSmi8, &[Operand::Imm(value)])
    }

    pub fn lda_undefined(&mut self) -> &mut Self {
        self.emit(Opcode::LdaUndefined, &[])
    }

    pub fn lda_null(&mut self) -> &mut Self {
        self.emit(Opcode::LdaNull, &[])
    }

    pub fn lda_the_hole(&mut self) -> &mut Self {
        self.emit(Opcode::LdaTheHole, &[])
    }

    pub fn lda_true(&mut self) -> &mut Self {
        self.emit(Opcode::LdaTrue, &[])
    }

    pub fn lda_false(&mut self) -> &mut Self {
        self.emit(Opcode::LdaFalse, &[])
    }

    /// Load `value` through the constant pool, reusing an equal entry.
    ///
    /// Overflowing the pool is reported by [`build`](Self::build).
    pub fn lda_constant(&mut self, value: Value) -> &mut Self {
        let index = match self.constants.iter().position(|c| *c == value) {
            Some(i) => i,
            None => self.push_constant(value),
        };
        // Indices past the Idx8 range are caught in build().
        let operand = Operand::Idx(index.min(MAX_CONSTANTS - 1) as u8);
        self.emit(Opcode::LdaConstant, &[operand])
    }

    pub fn ldar(&mut self, src: Register) -> &mut Self {
        self.emit(Opcode::Ldar, &[Operand::Reg(src)])
    }

    pub fn star(&mut self, dst: Register) -> &mut Self {
        self.emit(Opcode::Star, &[Operand::Reg(dst)])
    }

    pub fn add(&mut self, src: Register) -> &mut Self {
        self.emit(Opcode::Add, &[Operand::Reg(src)])
    }

    pub fn sub(&mut self, src: Register) -> &mut Self {
        self.emit(Opcode::Sub, &[Operand::Reg(src)])
    }

    pub fn mul(&mut self, src: Register) -> &mut Self {
        self.emit(Opcode::Mul, &[Operand::Reg(src)])
    }

    pub fn div(&mut self, src: Register) -> &mut Self {
        self.emit(Opcode::Div, &[Operand::Reg(src)])
    }

    pub fn ret(&mut self) -> &mut Self {
        self.emit(Opcode::Return, &[])
    }

    /// Finish the array.
    pub fn build(&self) -> Result<BytecodeArray, EncodeError> {
        if self.constants.len() > MAX_CONSTANTS {
            return Err(EncodeError::ConstantPoolFull {
                limit: MAX_CONSTANTS,
            });
        }

        let register_count = self
            .register_count
            .unwrap_or_else(|| self.highest_register.map_or(0, |r| r.index() + 1));
        if register_count > MAX_REGISTERS {
            return Err(EncodeError::TooManyRegisters {
                count: register_count,
                limit: MAX_REGISTERS,
            });
        }

        Ok(BytecodeArray {
            bytes: self.bytes.clone(),
            register_count,
            constants: self.constants.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(i: u8) -> Register {
        Register::new(i)
    }

    #[test]
    fn empty_array() {
        let array = BytecodeArrayBuilder::new().build().unwrap();
        assert!(array.is_empty());
        assert_eq!(array.register_count(), 0);
        assert_eq!(array.instructions().count(), 0);
    }

    #[test]
    fn register_count_inferred_from_highest_register() {
        let array = BytecodeArrayBuilder::new()
            .lda_zero()
            .star(r(4))
            .ldar(r(1))
            .ret()
            .build()
            .unwrap();
        assert_eq!(array.register_count(), 5);
    }

    #[test]
    fn explicit_register_count_wins() {
        let array = BytecodeArrayBuilder::new()
            .register_count(8)
            .lda_zero()
            .star(r(0))
            .ret()
            .build()
            .unwrap();
        assert_eq!(array.register_count(), 8);
    }

    #[test]
    fn too_many_registers_rejected() {
        let err = BytecodeArrayBuilder::new()
            .register_count(300)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::TooManyRegisters {
                count: 300,
                limit: MAX_REGISTERS
            }
        );
    }

    #[test]
    fn constants_are_interned() {
        let array = BytecodeArrayBuilder::new()
            .lda_constant(Value::Number(2.5))
            .lda_constant(Value::Smi(7))
            .lda_constant(Value::Number(2.5))
            .build()
            .unwrap();
        assert_eq!(array.constants(), &[Value::Number(2.5), Value::Smi(7)]);
        let indices: Vec<_> = array
            .instructions()
            .map(|i| i.unwrap().constant_index())
            .collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn constant_pool_overflow_rejected() {
        let mut builder = BytecodeArrayBuilder::new();
        for i in 0..=MAX_CONSTANTS as i32 {
            builder.lda_constant(Value::Smi(i));
        }
        assert_eq!(
            builder.build().unwrap_err(),
            EncodeError::ConstantPoolFull {
                limit: MAX_CONSTANTS
            }
        );
    }

    #[test]
    fn decode_instructions_with_offsets() {
        let array = BytecodeArrayBuilder::new()
            .lda_smi8(-2)
            .star(r(0))
            .lda_true()
            .ret()
            .build()
            .unwrap();
        let decoded: Vec<_> = array.instructions().map(Result::unwrap).collect();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded[0].offset, 0);
        assert_eq!(decoded[0].operands, vec![Operand::Imm(-2)]);
        assert_eq!(decoded[1].offset, 2);
        assert_eq!(decoded[1].register(), Some(r(0)));
        assert_eq!(decoded[2].offset, 4);
        assert_eq!(decoded[3].offset, 5);
        assert_eq!(decoded[3].opcode, Opcode::Return);
    }

    #[test]
    fn decode_stops_at_invalid_opcode() {
        let array = BytecodeArray::new(vec![0, 0xEE, 0], 0, vec![]);
        let decoded: Vec<_> = array.instructions().collect();
        assert_eq!(decoded.len(), 2);
        assert_eq!(
            decoded[1],
            Err(DecodeError::InvalidOpcode {
                offset: 1,
                byte: 0xEE
            })
        );
    }

    #[test]
    fn decode_reports_truncated_operand() {
        let array = BytecodeArray::new(vec![Opcode::Star as u8], 1, vec![]);
        let decoded: Vec<_> = array.instructions().collect();
        assert_eq!(
            decoded,
            vec![Err(DecodeError::TruncatedOperand {
                offset: 0,
                opcode: Opcode::Star
            })]
        );
    }

    #[test]
    fn instruction_display() {
        let array = BytecodeArrayBuilder::new()
            .add(r(3))
            .lda_constant(Value::Null)
            .build()
            .unwrap();
        let text: Vec<_> = array
            .instructions()
            .map(|i| i.unwrap().to_string())
            .collect();
        assert_eq!(text, vec!["Add r3", "LdaConstant [0]"]);
    }
}
