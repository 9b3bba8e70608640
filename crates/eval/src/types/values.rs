//! Runtime values and JSON conversion helpers.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::DecisionLogicError;

/// Payload key naming the concrete type of a composite.
pub const DISCRIMINATOR: &str = "LGType_";

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// Concrete runtime value. Numbers use `rust_decimal::Decimal`, never `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Enum(String),
    Record {
        type_name: String,
        fields: BTreeMap<String, Value>,
    },
    List(Vec<Value>),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Integer",
            Value::Decimal(_) => "Decimal",
            Value::Text(_) => "String",
            Value::Enum(_) => "Enum",
            Value::Record { .. } => "Record",
            Value::List(_) => "List",
        }
    }

    /// Extracts a boolean or returns a type error.
    pub fn as_bool(&self) -> Result<bool, DecisionLogicError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(DecisionLogicError::TypeError {
                message: format!("expected Boolean, got {}", other.type_name()),
            }),
        }
    }
}

// ──────────────────────────────────────────────
// JSON helpers
// ──────────────────────────────────────────────

/// Return a descriptive type name for a JSON value (for error messages).
pub fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Parse a JSON number as a Decimal. Strings are rejected.
pub(crate) fn number_decimal(v: &serde_json::Value) -> Option<Decimal> {
    match v {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        _ => None,
    }
}

/// Parse a JSON number or a decimal string as rendered on the wire.
pub(crate) fn json_decimal(v: &serde_json::Value) -> Option<Decimal> {
    match v {
        serde_json::Value::String(s) => Decimal::from_str(s).ok(),
        other => number_decimal(other),
    }
}

/// Infer a literal value from plain JSON (bool, integer, decimal, string).
pub(crate) fn infer_literal(v: &serde_json::Value) -> Result<Value, String> {
    if let Some(b) = v.as_bool() {
        Ok(Value::Bool(b))
    } else if let Some(i) = v.as_i64() {
        Ok(Value::Int(i))
    } else if v.is_number() {
        number_decimal(v)
            .map(Value::Decimal)
            .ok_or_else(|| format!("unrepresentable number literal {}", v))
    } else if let Some(s) = v.as_str() {
        // Untyped strings compare equal to enum values of the same spelling.
        Ok(Value::Text(s.to_string()))
    } else {
        Err(format!("cannot infer type for literal: {}", v))
    }
}

/// Parse a literal with an explicit primitive type annotation.
pub(crate) fn typed_literal(v: &serde_json::Value, type_name: &str) -> Result<Value, String> {
    let mismatch = || format!("literal {} is not a valid {}", v, type_name);
    match type_name {
        "Boolean" => v.as_bool().map(Value::Bool).ok_or_else(mismatch),
        "Integer" => v.as_i64().map(Value::Int).ok_or_else(mismatch),
        "Decimal" => number_decimal(v).map(Value::Decimal).ok_or_else(mismatch),
        "String" => v
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(mismatch),
        // Any other annotation names an enum type.
        _ => v
            .as_str()
            .map(|s| Value::Enum(s.to_string()))
            .ok_or_else(mismatch),
    }
}

/// Convert a runtime value to its payload-shaped JSON form.
///
/// Records carry their type under the discriminator key; decimals are
/// rendered as strings to keep full precision.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::json!(i),
        Value::Decimal(d) => serde_json::Value::String(d.to_string()),
        Value::Text(t) => serde_json::Value::String(t.clone()),
        Value::Enum(e) => serde_json::Value::String(e.clone()),
        Value::Record { type_name, fields } => {
            let mut map = serde_json::Map::new();
            map.insert(
                DISCRIMINATOR.to_string(),
                serde_json::Value::String(type_name.clone()),
            );
            for (k, v) in fields {
                map.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
    }
}
