//! Parser for Kindle assembly tokens → directives and instructions.
//!
//! Dispatches on the first token: a directive, or an opcode whose operand
//! kinds decide what the remaining tokens must be.

use std::fmt;

use crate::error::AsmError;
use crate::lexer::Token;
use kindle_bytecode::{Opcode, Operand, OperandType, Register, Value};

/// One meaningful line of assembly.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Line {
    /// `.registers N`
    Registers(usize),
    /// `.constant <literal>`
    Constant(Value),
    /// `.bytes b0 b1 ...` raw, undecoded stream bytes.
    Bytes(Vec<u8>),
    Instruction(Opcode, Vec<Operand>),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Directive(name) => write!(f, ".{name}"),
            Token::Ident(s) | Token::Number(s) => f.write_str(s),
            Token::Register(r) => write!(f, "r{r}"),
            Token::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Parse the tokens of a single line.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Option<Line>, AsmError> {
    let Some((first, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let line = match first {
        Token::Directive(name) => parse_directive(name, args, line_num)?,
        Token::Ident(mnemonic) => {
            let opcode =
                Opcode::from_mnemonic(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
                    line: line_num,
                    token: mnemonic.clone(),
                })?;
            Line::Instruction(opcode, parse_operands(opcode, args, line_num)?)
        }
        other => return Err(unexpected(other, line_num)),
    };

    Ok(Some(line))
}

fn parse_directive(name: &str, args: &[Token], line_num: usize) -> Result<Line, AsmError> {
    match name {
        "registers" => {
            let count = match args.first() {
                Some(Token::Number(text)) => {
                    text.parse::<usize>().map_err(|_| AsmError::InvalidNumber {
                        line: line_num,
                        token: text.clone(),
                    })?
                }
                Some(other) => return Err(unexpected(other, line_num)),
                None => return Err(missing(".registers", 1, line_num)),
            };
            expect_end(&args[1..], line_num)?;
            Ok(Line::Registers(count))
        }
        "constant" => {
            let token = args
                .first()
                .ok_or_else(|| missing(".constant", 1, line_num))?;
            let value = parse_constant(token, line_num)?;
            expect_end(&args[1..], line_num)?;
            Ok(Line::Constant(value))
        }
        "bytes" => {
            if args.is_empty() {
                return Err(missing(".bytes", 1, line_num));
            }
            args.iter()
                .map(|token| parse_byte(token, line_num))
                .collect::<Result<_, _>>()
                .map(Line::Bytes)
        }
        _ => Err(AsmError::UnknownDirective {
            line: line_num,
            token: format!(".{name}"),
        }),
    }
}

fn parse_operands(
    opcode: Opcode,
    args: &[Token],
    line_num: usize,
) -> Result<Vec<Operand>, AsmError> {
    let kinds = opcode.operand_types();
    if args.len() < kinds.len() {
        return Err(missing(opcode.mnemonic(), kinds.len(), line_num));
    }

    let operands = kinds
        .iter()
        .zip(args)
        .map(|(kind, token)| match (kind, token) {
            (OperandType::Imm8, Token::Number(text)) => {
                text.parse().map(Operand::Imm).map_err(|_| AsmError::InvalidNumber {
                    line: line_num,
                    token: text.clone(),
                })
            }
            (OperandType::Reg8, Token::Register(r)) => Ok(Operand::Reg(Register::new(*r))),
            (OperandType::Idx8, Token::Index(i)) => Ok(Operand::Idx(*i)),
            (_, other) => Err(unexpected(other, line_num)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    expect_end(&args[kinds.len()..], line_num)?;
    Ok(operands)
}

/// Parse a constant pool literal.
///
/// Integers that fit an i32 are Smis. Anything written with a fraction or
/// exponent, or too large for a Smi, is a Number, so `2.0` stays a Number.
fn parse_constant(token: &Token, line_num: usize) -> Result<Value, AsmError> {
    let invalid = || AsmError::InvalidConstant {
        line: line_num,
        token: token.to_string(),
    };

    match token {
        Token::Ident(word) => match word.to_ascii_lowercase().as_str() {
            "undefined" => Ok(Value::Undefined),
            "null" => Ok(Value::Null),
            "hole" => Ok(Value::TheHole),
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            "nan" => Ok(Value::Number(f64::NAN)),
            "inf" | "infinity" => Ok(Value::Number(f64::INFINITY)),
            _ => Err(invalid()),
        },
        Token::Number(text) => {
            let integral = text.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'+');
            if integral {
                if let Ok(i) = text.parse::<i32>() {
                    return Ok(Value::Smi(i));
                }
            }
            text.parse::<f64>().map(Value::Number).map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

fn parse_byte(token: &Token, line_num: usize) -> Result<u8, AsmError> {
    let Token::Number(text) = token else {
        return Err(unexpected(token, line_num));
    };
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| AsmError::InvalidNumber {
        line: line_num,
        token: text.clone(),
    })
}

fn expect_end(rest: &[Token], line_num: usize) -> Result<(), AsmError> {
    match rest.first() {
        Some(token) => Err(unexpected(token, line_num)),
        None => Ok(()),
    }
}

fn unexpected(token: &Token, line_num: usize) -> AsmError {
    AsmError::UnexpectedToken {
        line: line_num,
        token: token.to_string(),
    }
}

fn missing(opcode: &'static str, expected: usize, line_num: usize) -> AsmError {
    AsmError::MissingOperand {
        line: line_num,
        opcode,
        expected,
    }
}
