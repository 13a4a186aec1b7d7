//! Kindle interpreter core.
//!
//! Bytecode runs on a register machine with an accumulator. Every opcode has
//! a handler compiled into a [`CodeUnit`] and stored in a [`DispatchTable`]
//! slot indexed by the opcode. Handlers chain into each other through the
//! dispatch primitives instead of returning to a central loop:
//!
//! - [`Frame::dispatch`] (Continue) advances past the current instruction and
//!   transfers to the next instruction's handler
//! - [`Frame::exit`] (Return) ends the frame with a value
//!
//! The table is populated once, by [`TableBuilder::ensure_built`]. Builds are
//! idempotent and safe to race; a failed build leaves the table empty and is
//! never retried.
//!
//! ```
//! use kindle_bytecode::{BytecodeArrayBuilder, Register, Value};
//!
//! let r0 = Register::new(0);
//! let bytecode = BytecodeArrayBuilder::new()
//!     .lda_smi8(3)
//!     .star(r0)
//!     .lda_smi8(10)
//!     .sub(r0)
//!     .star(r0)
//!     .ret()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(kindle_interpreter::run(&bytecode).unwrap(), Value::Smi(7));
//! ```

pub mod builder;
pub mod code_unit;
pub mod context;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod numeric;
pub mod placement;
pub mod table;

pub use builder::{BuildOutcome, TableBuilder};
pub use code_unit::{CodeUnit, HandlerFn};
pub use context::{BuildPolicy, Completion, ContextConfig, ExecutionContext};
pub use dispatch::{DispatchStats, Transfer};
pub use emitter::{DirectEmitter, HandlerEmitter, HandlerFamily, HandlerSpec};
pub use error::{BuildError, EmissionError, RuntimeError};
pub use frame::Frame;
pub use placement::{PinnedSlots, Region};
pub use table::DispatchTable;

use kindle_bytecode::{BytecodeArray, Value};

/// Execute `bytecode` in a fresh context with the default configuration.
pub fn run(bytecode: &BytecodeArray) -> Result<Value, RuntimeError> {
    let context = ExecutionContext::new(ContextConfig::default())?;
    Ok(context.execute(bytecode)?.value)
}
