//! Errors for table construction and execution.
//!
//! Nothing here is raised by a handler. Handlers only fault (panic) on
//! bytecode that violates the verifier's guarantees.

use kindle_bytecode::Opcode;
use kindle_verifier::VerifyError;
use thiserror::Error;

/// The emitter could not produce a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmissionError {
    /// The backend ran out of room for code units.
    #[error("code space exhausted emitting {opcode} (capacity {capacity} units)")]
    CodeSpaceExhausted { opcode: Opcode, capacity: usize },

    /// The emitter produced a unit for a different opcode than requested.
    #[error("emitter asked for {requested} but produced a handler for {produced}")]
    ContractMismatch { requested: Opcode, produced: Opcode },
}

/// Building a dispatch table failed. The table is left without any handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("dispatch table build failed: {0}")]
    Emission(#[from] EmissionError),

    /// An earlier build of this table failed; builds are never retried.
    #[error("dispatch table build previously failed: {0}")]
    PreviouslyFailed(EmissionError),
}

/// Errors surfaced by [`ExecutionContext::execute`](crate::ExecutionContext::execute).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Bytecode failed verification and was not executed.
    #[error("bytecode rejected: {}", summarize(.0))]
    Rejected(Vec<VerifyError>),

    /// There is no instruction to dispatch to.
    #[error("bytecode array is empty")]
    EmptyBytecode,
}

fn summarize(errors: &[VerifyError]) -> String {
    match errors {
        [] => "no errors reported".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
