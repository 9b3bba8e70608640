//! Value comparison using `rust_decimal`.
//!
//! Integers are promoted to Decimal when compared against a Decimal. No
//! `f64` anywhere in the evaluation path.

use rust_decimal::Decimal;

use crate::types::{DecisionLogicError, Value};

/// Promote an integer to Decimal for mixed comparisons.
pub fn promote_int_to_decimal(val: i64) -> Decimal {
    Decimal::from(val)
}

/// Compare two values using the given operator.
///
/// Supports all comparison operators: =, !=, <, <=, >, >=. Text and enum
/// values support only equality, and compare with each other by spelling.
pub fn compare_values(left: &Value, right: &Value, op: &str) -> Result<bool, DecisionLogicError> {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => compare_bools(*l, *r, op),
        (Value::Int(l), Value::Int(r)) => compare_ordered(l, r, op),
        (Value::Decimal(l), Value::Decimal(r)) => compare_ordered(l, r, op),
        (Value::Int(l), Value::Decimal(r)) => compare_ordered(&promote_int_to_decimal(*l), r, op),
        (Value::Decimal(l), Value::Int(r)) => compare_ordered(l, &promote_int_to_decimal(*r), op),
        (Value::Text(l) | Value::Enum(l), Value::Text(r) | Value::Enum(r)) => {
            if op != "=" && op != "!=" {
                return Err(DecisionLogicError::TypeError {
                    message: format!(
                        "operator '{}' not defined for {}; only = and != are supported",
                        op,
                        left.type_name()
                    ),
                });
            }
            compare_ordered(l, r, op)
        }
        _ => Err(DecisionLogicError::TypeError {
            message: format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            ),
        }),
    }
}

fn invalid_operator(op: &str) -> DecisionLogicError {
    DecisionLogicError::TypeError {
        message: format!("unknown comparison operator '{}'", op),
    }
}

fn compare_bools(l: bool, r: bool, op: &str) -> Result<bool, DecisionLogicError> {
    match op {
        "=" => Ok(l == r),
        "!=" => Ok(l != r),
        "<" | "<=" | ">" | ">=" => Err(DecisionLogicError::TypeError {
            message: format!("operator '{}' not defined for Boolean", op),
        }),
        _ => Err(invalid_operator(op)),
    }
}

fn compare_ordered<T: PartialOrd + ?Sized>(l: &T, r: &T, op: &str) -> Result<bool, DecisionLogicError> {
    match op {
        "=" => Ok(l == r),
        "!=" => Ok(l != r),
        "<" => Ok(l < r),
        "<=" => Ok(l <= r),
        ">" => Ok(l > r),
        ">=" => Ok(l >= r),
        _ => Err(invalid_operator(op)),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
