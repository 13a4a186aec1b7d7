//! Machine state for one activation: accumulator, register file and
//! instruction cursor.
//!
//! Bytecode is trusted. An operand that points outside the register file or
//! constant pool, or a cursor that leaves the stream, is an internal
//! consistency fault and panics. Run the verifier first for untrusted input.

use kindle_bytecode::{BytecodeArray, Opcode, Register, Value};

use crate::dispatch::DispatchStats;
use crate::table::DispatchTable;

/// The state a handler operates on.
pub struct Frame<'a> {
    pub(crate) table: &'a DispatchTable,
    bytecode: &'a BytecodeArray,
    accumulator: Value,
    registers: Vec<Value>,
    cursor: usize,
    pub(crate) stats: DispatchStats,
}

impl<'a> Frame<'a> {
    /// A fresh frame at offset 0 with every register and the accumulator set
    /// to `undefined`.
    pub fn new(table: &'a DispatchTable, bytecode: &'a BytecodeArray) -> Self {
        Self {
            table,
            bytecode,
            accumulator: Value::Undefined,
            registers: vec![Value::Undefined; bytecode.register_count()],
            cursor: 0,
            stats: DispatchStats::default(),
        }
    }

    pub fn accumulator(&self) -> Value {
        self.accumulator
    }

    pub fn set_accumulator(&mut self, value: Value) {
        self.accumulator = value;
    }

    /// Read a register.
    pub fn register(&self, reg: Register) -> Value {
        match self.registers.get(reg.index()) {
            Some(v) => *v,
            None => self.fault(format_args!(
                "register {reg} outside register file of {}",
                self.registers.len()
            )),
        }
    }

    /// Write a register.
    pub fn set_register(&mut self, reg: Register, value: Value) {
        if reg.index() >= self.registers.len() {
            self.fault(format_args!(
                "register {reg} outside register file of {}",
                self.registers.len()
            ));
        }
        self.registers[reg.index()] = value;
    }

    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Byte offset of the instruction being executed.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn advance(&mut self, width: usize) {
        self.cursor += width;
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn bytecode(&self) -> &'a BytecodeArray {
        self.bytecode
    }

    /// Opcode at the cursor.
    pub fn current_opcode(&self) -> Opcode {
        let Some(byte) = self.bytecode.byte_at(self.cursor) else {
            self.fault(format_args!(
                "dispatch ran off the end of a {}-byte stream",
                self.bytecode.len()
            ))
        };
        match Opcode::try_from(byte) {
            Ok(op) => op,
            Err(e) => self.fault(format_args!("{e}")),
        }
    }

    /// Raw operand byte `i` of the current instruction.
    pub fn operand_byte(&self, i: usize) -> u8 {
        match self.bytecode.byte_at(self.cursor + 1 + i) {
            Some(b) => b,
            None => self.fault(format_args!("operand {i} is past the end of the stream")),
        }
    }

    pub fn imm8_operand(&self, i: usize) -> i8 {
        self.operand_byte(i) as i8
    }

    pub fn register_operand(&self, i: usize) -> Register {
        Register::new(self.operand_byte(i))
    }

    pub fn index_operand(&self, i: usize) -> usize {
        self.operand_byte(i) as usize
    }

    /// Constant pool entry `index`.
    pub fn constant(&self, index: usize) -> Value {
        match self.bytecode.constant(index) {
            Some(v) => v,
            None => self.fault(format_args!(
                "constant [{index}] outside pool of {}",
                self.bytecode.constants().len()
            )),
        }
    }

    #[cold]
    #[track_caller]
    fn fault(&self, detail: std::fmt::Arguments<'_>) -> ! {
        panic!(
            "internal consistency fault at offset {}: {detail}",
            self.cursor
        )
    }
}
