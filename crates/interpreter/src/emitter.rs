//! The handler emitter interface and the default function-pointer backend.

use kindle_bytecode::{Opcode, OperandType};

use crate::code_unit::{CodeUnit, HandlerFn};
use crate::error::EmissionError;

/// Which contract family a handler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerFamily {
    LoadImmediate,
    LoadConstant,
    RegisterTransfer,
    BinaryArithmetic,
    Return,
}

/// Description of one opcode's handler, handed to an emitter.
#[derive(Clone, Copy)]
pub struct HandlerSpec {
    pub opcode: Opcode,
    pub family: HandlerFamily,
    /// One-line statement of the handler's effect.
    pub summary: &'static str,
    pub body: HandlerFn,
}

impl HandlerSpec {
    /// Operands the handler decodes.
    pub fn operands(&self) -> &'static [OperandType] {
        self.opcode.operand_types()
    }
}

impl std::fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("opcode", &self.opcode)
            .field("family", &self.family)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// A backend that turns handler specs into finalized code units.
pub trait HandlerEmitter {
    /// Produce the code unit for `opcode` from `spec`.
    fn emit(&mut self, opcode: Opcode, spec: &HandlerSpec) -> Result<CodeUnit, EmissionError>;
}

impl<E: HandlerEmitter + ?Sized> HandlerEmitter for Box<E> {
    fn emit(&mut self, opcode: Opcode, spec: &HandlerSpec) -> Result<CodeUnit, EmissionError> {
        (**self).emit(opcode, spec)
    }
}

/// Finalizes a spec's body directly as the code unit.
///
/// An optional code-space budget bounds how many units it will produce;
/// emitting past it fails with [`EmissionError::CodeSpaceExhausted`].
#[derive(Debug, Default)]
pub struct DirectEmitter {
    code_space: Option<usize>,
    emitted: usize,
}

impl DirectEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An emitter that can produce at most `units` code units.
    pub fn with_code_space(units: usize) -> Self {
        Self {
            code_space: Some(units),
            emitted: 0,
        }
    }

    /// Units produced so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl HandlerEmitter for DirectEmitter {
    fn emit(&mut self, opcode: Opcode, spec: &HandlerSpec) -> Result<CodeUnit, EmissionError> {
        if spec.opcode != opcode {
            return Err(EmissionError::ContractMismatch {
                requested: opcode,
                produced: spec.opcode,
            });
        }
        if let Some(capacity) = self.code_space {
            if self.emitted >= capacity {
                return Err(EmissionError::CodeSpaceExhausted { opcode, capacity });
            }
        }
        self.emitted += 1;
        Ok(CodeUnit::new(opcode, spec.body))
    }
}
