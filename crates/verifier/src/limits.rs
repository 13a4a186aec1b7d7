//! Size limits of the register file and constant pool.

use crate::error::VerifyError;
use kindle_bytecode::{BytecodeArray, MAX_CONSTANTS, MAX_REGISTERS};

/// Run the limits check.
pub fn check_limits(bytecode: &BytecodeArray) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    if bytecode.register_count() > MAX_REGISTERS {
        errors.push(VerifyError::TooManyRegisters {
            count: bytecode.register_count(),
            limit: MAX_REGISTERS,
        });
    }
    if bytecode.constants().len() > MAX_CONSTANTS {
        errors.push(VerifyError::TooManyConstants {
            count: bytecode.constants().len(),
            limit: MAX_CONSTANTS,
        });
    }

    errors
}
