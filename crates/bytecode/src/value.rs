//! Runtime value representation.
//!
//! Values live in the accumulator, the register file and the constant pool.

use std::fmt;

/// Runtime value representation.
#[derive(Debug, Clone, Copy)]
pub enum Value {
    /// The `undefined` singleton.
    Undefined,
    /// The `null` singleton.
    Null,
    /// Marker for uninitialized bindings. Never a user-visible result.
    TheHole,
    /// `true` / `false`.
    Boolean(bool),
    /// Small integer.
    Smi(i32),
    /// IEEE 754 double. Holds everything that does not fit a Smi, including
    /// -0, NaN and the infinities.
    Number(f64),
}

// Numbers compare by bit pattern so that Value can implement Eq. This makes
// NaN equal to itself when the bits match and keeps 0.0 distinct from -0.0,
// which is what tests of the numeric policy want to observe.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::TheHole, Value::TheHole) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Smi(a), Value::Smi(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Canonical representation of a double: a Smi when the value is integral,
    /// in i32 range and not -0; a Number otherwise.
    pub fn number(n: f64) -> Value {
        let is_negative_zero = n == 0.0 && n.is_sign_negative();
        if n.fract() == 0.0
            && n >= i32::MIN as f64
            && n <= i32::MAX as f64
            && !is_negative_zero
        {
            Value::Smi(n as i32)
        } else {
            Value::Number(n)
        }
    }

    /// Numeric conversion used by arithmetic.
    pub fn to_number(self) -> f64 {
        match self {
            Value::Undefined | Value::TheHole => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Smi(i) => i as f64,
            Value::Number(n) => n,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::TheHole => f.write_str("<hole>"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Smi(i) => write!(f, "{i}"),
            Value::Number(n) if n.is_nan() => f.write_str("NaN"),
            Value::Number(n) if n.is_infinite() => {
                if *n > 0.0 {
                    f.write_str("Infinity")
                } else {
                    f.write_str("-Infinity")
                }
            }
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}
