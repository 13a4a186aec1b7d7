//! Code units: the finalized, independently invocable handler bodies stored in
//! dispatch table slots.

use std::fmt;

use kindle_bytecode::Opcode;

use crate::dispatch::Transfer;
use crate::frame::Frame;

/// Signature every handler body has.
///
/// A handler reads and writes the frame's machine state and ends by calling
/// exactly one dispatch primitive, whose [`Transfer`] it returns.
pub type HandlerFn = fn(&mut Frame<'_>) -> Transfer;

/// A finalized handler for one opcode.
///
/// Code units are plain function pointers, so they never move and can be
/// copied out of the table freely.
#[derive(Clone, Copy)]
pub struct CodeUnit {
    opcode: Opcode,
    entry: HandlerFn,
}

impl CodeUnit {
    /// Finalize `entry` as the handler for `opcode`.
    pub fn new(opcode: Opcode, entry: HandlerFn) -> Self {
        Self { opcode, entry }
    }

    /// The opcode this unit was emitted for.
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Address of the handler's machine code.
    pub fn entry_address(&self) -> usize {
        self.entry as usize
    }

    /// Run the handler against `frame`.
    #[inline]
    pub fn invoke(&self, frame: &mut Frame<'_>) -> Transfer {
        (self.entry)(frame)
    }
}

impl fmt::Debug for CodeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeUnit")
            .field("opcode", &self.opcode)
            .field("entry", &format_args!("{:#x}", self.entry_address()))
            .finish()
    }
}
