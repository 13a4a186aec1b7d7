//! Dispatch primitives and the trampoline that drives them.
//!
//! Handlers never return to a central `match`. Each one ends with
//! [`Frame::dispatch`] (Continue), which resolves the next instruction's code
//! unit and hands it back, or [`Frame::exit`] (Return), which ends the frame.
//! The trampoline in [`Frame::run`] only invokes whatever unit it was handed.

use kindle_bytecode::Value;
use tracing::trace;

use crate::code_unit::CodeUnit;
use crate::frame::Frame;

/// The result of a dispatch primitive. Only the primitives can create one.
#[derive(Debug)]
pub struct Transfer(Next);

#[derive(Debug)]
enum Next {
    Continue(CodeUnit),
    Return(Value),
}

impl Transfer {
    /// The code unit a `Continue` transferred to.
    pub fn next_unit(&self) -> Option<CodeUnit> {
        match self.0 {
            Next::Continue(unit) => Some(unit),
            Next::Return(_) => None,
        }
    }

    /// The frame result a `Return` produced.
    pub fn returned_value(&self) -> Option<Value> {
        match self.0 {
            Next::Continue(_) => None,
            Next::Return(value) => Some(value),
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self.0, Next::Return(_))
    }
}

/// Counts of primitive invocations in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub continues: u64,
    pub returns: u64,
}

impl DispatchStats {
    /// Total primitive invocations.
    pub fn transfers(&self) -> u64 {
        self.continues + self.returns
    }
}

impl Frame<'_> {
    /// Continue: step past the current instruction and transfer to the
    /// handler of the instruction that follows.
    pub fn dispatch(&mut self) -> Transfer {
        let width = self.current_opcode().size();
        self.advance(width);
        self.stats.continues += 1;

        let next = self.current_opcode();
        trace!(offset = self.cursor(), opcode = %next, "dispatch");
        Transfer(Next::Continue(self.table.lookup(next)))
    }

    /// Return: end the frame with `value`. The cursor stays on the returning
    /// instruction.
    pub fn exit(&mut self, value: Value) -> Transfer {
        self.stats.returns += 1;
        trace!(offset = self.cursor(), %value, "frame exit");
        Transfer(Next::Return(value))
    }

    /// Execute from the cursor until a handler returns.
    pub fn run(&mut self) -> Value {
        let mut unit = self.table.lookup(self.current_opcode());
        loop {
            let before = self.stats.transfers();
            let transfer = unit.invoke(self);
            debug_assert_eq!(
                self.stats.transfers(),
                before + 1,
                "{} handler must end with exactly one dispatch primitive",
                unit.opcode()
            );
            match transfer.0 {
                Next::Continue(next) => unit = next,
                Next::Return(value) => return value,
            }
        }
    }
}
