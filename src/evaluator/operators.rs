use crate::error::RuntimeError;
use crate::runtime::Value;
use crate::scanner::token::Punctuator;

/// Apply a binary operator to two already-evaluated operands.
pub fn binary(op: Punctuator, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let value = match op {
        Punctuator::Plus => {
            if is_stringish(left) || is_stringish(right) {
                Value::string(format!("{left}{right}"))
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        Punctuator::Minus => Value::Number(left.to_number() - right.to_number()),
        Punctuator::Star => Value::Number(left.to_number() * right.to_number()),
        Punctuator::Slash => Value::Number(left.to_number() / right.to_number()),
        Punctuator::Percent => Value::Number(left.to_number() % right.to_number()),
        Punctuator::Less => compare(left, right, |o| o.is_lt()),
        Punctuator::Greater => compare(left, right, |o| o.is_gt()),
        Punctuator::LessEqual => compare(left, right, |o| o.is_le()),
        Punctuator::GreaterEqual => compare(left, right, |o| o.is_ge()),
        Punctuator::EqualEqual => Value::Boolean(left.loose_equals(right)),
        Punctuator::BangEqual => Value::Boolean(!left.loose_equals(right)),
        other => {
            return Err(RuntimeError::malformed(format!(
                "'{other}' is not a binary operator"
            )));
        }
    };
    Ok(value)
}

pub fn unary(op: Punctuator, operand: &Value) -> Result<Value, RuntimeError> {
    match op {
        Punctuator::Bang => Ok(Value::Boolean(!operand.to_boolean())),
        Punctuator::Minus => Ok(Value::Number(-operand.to_number())),
        other => Err(RuntimeError::malformed(format!(
            "'{other}' is not a unary operator"
        ))),
    }
}

fn is_stringish(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Object(_))
}

/// Strings compare by code point; everything else numerically, where any
/// comparison involving NaN is false.
fn compare(left: &Value, right: &Value, test: fn(std::cmp::Ordering) -> bool) -> Value {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    };
    Value::Boolean(ordering.is_some_and(test))
}
