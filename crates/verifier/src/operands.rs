//! Operand bounds: register operands must address the register file and
//! constant operands the pool. Return reads r0, so it needs a non-empty file.

use crate::error::VerifyError;
use crate::structural::StreamContext;
use kindle_bytecode::{BytecodeArray, Opcode};

/// Run the operand bounds check.
pub fn check_operands(bytecode: &BytecodeArray, ctx: &StreamContext) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let count = bytecode.register_count();
    let pool_size = bytecode.constants().len();

    for instr in &ctx.instructions {
        if let Some(register) = instr.register() {
            if register.index() >= count {
                errors.push(VerifyError::RegisterOutOfBounds {
                    at: instr.offset,
                    register,
                    count,
                });
            }
        }
        if let Some(index) = instr.constant_index() {
            if index >= pool_size {
                errors.push(VerifyError::ConstantOutOfBounds {
                    at: instr.offset,
                    index,
                    pool_size,
                });
            }
        }
        if instr.opcode == Opcode::Return && count == 0 {
            errors.push(VerifyError::ReturnWithoutResultRegister { at: instr.offset });
        }
    }

    errors
}
