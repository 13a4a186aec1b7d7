//! Arithmetic on [`Value`]s.
//!
//! Two Smis stay on the integer path while the result fits; everything else
//! goes through `ToNumber` and is normalized back with [`Value::number`].
//! None of these operations fail.

use kindle_bytecode::Value;

pub fn add(lhs: Value, rhs: Value) -> Value {
    if let (Value::Smi(a), Value::Smi(b)) = (lhs, rhs) {
        if let Some(sum) = a.checked_add(b) {
            return Value::Smi(sum);
        }
        return Value::Number(a as f64 + b as f64);
    }
    Value::number(lhs.to_number() + rhs.to_number())
}

pub fn sub(lhs: Value, rhs: Value) -> Value {
    if let (Value::Smi(a), Value::Smi(b)) = (lhs, rhs) {
        if let Some(diff) = a.checked_sub(b) {
            return Value::Smi(diff);
        }
        return Value::Number(a as f64 - b as f64);
    }
    Value::number(lhs.to_number() - rhs.to_number())
}

pub fn mul(lhs: Value, rhs: Value) -> Value {
    if let (Value::Smi(a), Value::Smi(b)) = (lhs, rhs) {
        return match a.checked_mul(b) {
            // 0 * -n is -0, which a Smi cannot hold.
            Some(0) if a < 0 || b < 0 => Value::Number(-0.0),
            Some(product) => Value::Smi(product),
            None => Value::Number(a as f64 * b as f64),
        };
    }
    Value::number(lhs.to_number() * rhs.to_number())
}

/// `lhs / rhs`, always through f64.
pub fn div(lhs: Value, rhs: Value) -> Value {
    Value::number(lhs.to_number() / rhs.to_number())
}
