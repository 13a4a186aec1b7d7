//! Reachability: control only moves forward and Return is terminal, so every
//! instruction after the first Return is dead code.

use crate::error::VerifyError;
use crate::structural::StreamContext;

/// Run the reachability check. Reports each unreachable instruction.
pub fn check_reachability(ctx: &StreamContext) -> Vec<VerifyError> {
    ctx.instructions
        .iter()
        .skip_while(|instr| !instr.opcode.is_terminal())
        .skip(1)
        .map(|instr| VerifyError::UnreachableCode { at: instr.offset })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural::check_structural;
    use kindle_bytecode::BytecodeArray;

    fn ctx(bytes: Vec<u8>) -> StreamContext {
        check_structural(&BytecodeArray::new(bytes, 1, Vec::new())).0
    }

    #[test]
    fn single_trailing_return() {
        let ctx = ctx(vec![0, 9, 0, 14]);
        assert!(check_reachability(&ctx).is_empty());
    }

    #[test]
    fn code_after_return_is_unreachable() {
        // Return; LdaSmi8 1; Return
        let ctx = ctx(vec![14, 1, 1, 14]);
        assert_eq!(
            check_reachability(&ctx),
            vec![
                VerifyError::UnreachableCode { at: 1 },
                VerifyError::UnreachableCode { at: 3 },
            ]
        );
    }

    #[test]
    fn no_return_means_nothing_is_dead() {
        let ctx = ctx(vec![0, 0]);
        assert!(check_reachability(&ctx).is_empty());
    }
}
