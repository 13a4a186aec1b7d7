//! Kindle verifier: static checks for bytecode arrays.
//!
//! The interpreter trusts its input. An out-of-range register or constant
//! operand, or a stream that runs off its end, faults inside a handler. The
//! verifier finds those problems ahead of time and reports ALL of them.
//!
//! # Usage
//!
//! ```
//! use kindle_bytecode::{BytecodeArrayBuilder, Register};
//! use kindle_verifier::verify;
//!
//! let bytecode = BytecodeArrayBuilder::new()
//!     .lda_smi8(42)
//!     .star(Register::new(0))
//!     .ret()
//!     .build()
//!     .unwrap();
//!
//! assert!(verify(&bytecode).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Limits**: register file and constant pool sizes
//! 2. **Structural**: decoding, final Return
//! 3. **Operands**: register and constant indices in bounds
//! 4. **Reachability**: dead code after Return

pub mod error;
pub mod limits;
pub mod operands;
pub mod reachability;
pub mod structural;

pub use error::VerifyError;

use kindle_bytecode::BytecodeArray;

/// Verify a bytecode array.
///
/// Returns `Ok(())` if the array passes all checks, or
/// `Err(Vec<VerifyError>)` with all errors found.
///
/// If the stream cannot be decoded, the passes that need decoded
/// instructions are skipped.
pub fn verify(bytecode: &BytecodeArray) -> Result<(), Vec<VerifyError>> {
    let mut all_errors = Vec::new();

    all_errors.extend(limits::check_limits(bytecode));

    let (ctx, structural_errors) = structural::check_structural(bytecode);
    all_errors.extend(structural_errors);

    if !ctx.fatal {
        all_errors.extend(operands::check_operands(bytecode, &ctx));
        all_errors.extend(reachability::check_reachability(&ctx));
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindle_bytecode::{BytecodeArrayBuilder, Register, Value};

    #[test]
    fn minimal_valid_array() {
        let bytecode = BytecodeArray::new(vec![0, 9, 0, 14], 1, Vec::new());
        assert!(verify(&bytecode).is_ok());
    }

    #[test]
    fn empty_array() {
        let bytecode = BytecodeArray::new(Vec::new(), 1, Vec::new());
        assert_eq!(verify(&bytecode), Err(vec![VerifyError::MissingReturn]));
    }

    #[test]
    fn builder_output_verifies() {
        let r0 = Register::new(0);
        let r1 = Register::new(1);
        let bytecode = BytecodeArrayBuilder::new()
            .lda_constant(Value::Number(1.5))
            .star(r1)
            .lda_smi8(2)
            .mul(r1)
            .star(r0)
            .ret()
            .build()
            .unwrap();
        assert!(verify(&bytecode).is_ok());
    }

    #[test]
    fn multiple_errors_collected() {
        // Ldar r3; Return; LdaZero, with no registers
        let bytecode = BytecodeArray::new(vec![8, 3, 14, 0], 0, Vec::new());
        let errors = verify(&bytecode).unwrap_err();
        assert!(errors.contains(&VerifyError::MissingReturn));
        assert!(errors.contains(&VerifyError::ReturnWithoutResultRegister { at: 2 }));
        assert!(errors.contains(&VerifyError::UnreachableCode { at: 3 }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, VerifyError::RegisterOutOfBounds { .. })));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn decode_failure_skips_dependent_passes() {
        // Ldar r9 would be out of bounds, but the stream is cut short first.
        let bytecode = BytecodeArray::new(vec![8, 9, 0xee], 1, Vec::new());
        assert_eq!(
            verify(&bytecode),
            Err(vec![VerifyError::InvalidOpcode { at: 2, byte: 0xee }])
        );
    }
}
