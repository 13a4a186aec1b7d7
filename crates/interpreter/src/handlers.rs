//! Handler bodies for every opcode, and the contract table that describes them
//! to an emitter.
//!
//! Each handler reads its operands relative to the cursor, updates the frame,
//! and ends with exactly one dispatch primitive.

use kindle_bytecode::{Opcode, Register, Value};

use crate::code_unit::HandlerFn;
use crate::dispatch::Transfer;
use crate::emitter::{HandlerFamily, HandlerSpec};
use crate::frame::Frame;
use crate::numeric;

/// The handler contract for `opcode`.
pub fn contract(opcode: Opcode) -> HandlerSpec {
    use HandlerFamily::*;

    let spec = |family, summary, body: HandlerFn| HandlerSpec {
        opcode,
        family,
        summary,
        body,
    };
    match opcode {
        Opcode::LdaZero => spec(LoadImmediate, "accumulator := 0", lda_zero),
        Opcode::LdaSmi8 => spec(LoadImmediate, "accumulator := <imm>", lda_smi8),
        Opcode::LdaUndefined => spec(LoadImmediate, "accumulator := undefined", lda_undefined),
        Opcode::LdaNull => spec(LoadImmediate, "accumulator := null", lda_null),
        Opcode::LdaTheHole => spec(LoadImmediate, "accumulator := the hole", lda_the_hole),
        Opcode::LdaTrue => spec(LoadImmediate, "accumulator := true", lda_true),
        Opcode::LdaFalse => spec(LoadImmediate, "accumulator := false", lda_false),
        Opcode::LdaConstant => spec(LoadConstant, "accumulator := constants[<idx>]", lda_constant),
        Opcode::Ldar => spec(RegisterTransfer, "accumulator := <src>", ldar),
        Opcode::Star => spec(RegisterTransfer, "<dst> := accumulator", star),
        Opcode::Add => spec(BinaryArithmetic, "accumulator := accumulator + <src>", add),
        Opcode::Sub => spec(BinaryArithmetic, "accumulator := accumulator - <src>", sub),
        Opcode::Mul => spec(BinaryArithmetic, "accumulator := accumulator * <src>", mul),
        Opcode::Div => spec(BinaryArithmetic, "accumulator := <src> / accumulator", div),
        Opcode::Return => spec(Return, "return r0", return_),
    }
}

// LdaZero
//
// Load literal '0' into the accumulator.
fn lda_zero(frame: &mut Frame<'_>) -> Transfer {
    frame.set_accumulator(Value::Smi(0));
    frame.dispatch()
}

// LdaSmi8 <imm8>
//
// Load an 8-bit signed integer literal into the accumulator as a Smi.
fn lda_smi8(frame: &mut Frame<'_>) -> Transfer {
    let imm = frame.imm8_operand(0);
    frame.set_accumulator(Value::Smi(imm as i32));
    frame.dispatch()
}

// LdaUndefined
fn lda_undefined(frame: &mut Frame<'_>) -> Transfer {
    frame.set_accumulator(Value::Undefined);
    frame.dispatch()
}

// LdaNull
fn lda_null(frame: &mut Frame<'_>) -> Transfer {
    frame.set_accumulator(Value::Null);
    frame.dispatch()
}

// LdaTheHole
fn lda_the_hole(frame: &mut Frame<'_>) -> Transfer {
    frame.set_accumulator(Value::TheHole);
    frame.dispatch()
}

// LdaTrue
fn lda_true(frame: &mut Frame<'_>) -> Transfer {
    frame.set_accumulator(Value::Boolean(true));
    frame.dispatch()
}

// LdaFalse
fn lda_false(frame: &mut Frame<'_>) -> Transfer {
    frame.set_accumulator(Value::Boolean(false));
    frame.dispatch()
}

// LdaConstant <idx>
//
// Load constant literal at |idx| in the constant pool into the accumulator.
fn lda_constant(frame: &mut Frame<'_>) -> Transfer {
    let idx = frame.index_operand(0);
    let value = frame.constant(idx);
    frame.set_accumulator(value);
    frame.dispatch()
}

// Ldar <src>
//
// Load accumulator with value from register <src>.
fn ldar(frame: &mut Frame<'_>) -> Transfer {
    let src = frame.register_operand(0);
    let value = frame.register(src);
    frame.set_accumulator(value);
    frame.dispatch()
}

// Star <dst>
//
// Store accumulator to register <dst>.
fn star(frame: &mut Frame<'_>) -> Transfer {
    let dst = frame.register_operand(0);
    let value = frame.accumulator();
    frame.set_register(dst, value);
    frame.dispatch()
}

// Add <src>
//
// Add register <src> to accumulator.
fn add(frame: &mut Frame<'_>) -> Transfer {
    binary_op(frame, numeric::add)
}

// Sub <src>
//
// Subtract register <src> from accumulator.
fn sub(frame: &mut Frame<'_>) -> Transfer {
    binary_op(frame, numeric::sub)
}

// Mul <src>
//
// Multiply accumulator by register <src>.
fn mul(frame: &mut Frame<'_>) -> Transfer {
    binary_op(frame, numeric::mul)
}

// Div <src>
//
// Divide register <src> by accumulator.
fn div(frame: &mut Frame<'_>) -> Transfer {
    binary_op(frame, |acc, reg| numeric::div(reg, acc))
}

fn binary_op(frame: &mut Frame<'_>, op: impl FnOnce(Value, Value) -> Value) -> Transfer {
    let src = frame.register_operand(0);
    let result = op(frame.accumulator(), frame.register(src));
    frame.set_accumulator(result);
    frame.dispatch()
}

// Return
//
// Return register 0 to the caller. Terminal.
fn return_(frame: &mut Frame<'_>) -> Transfer {
    let value = frame.register(Register::new(0));
    frame.exit(value)
}
