//! Deserialization from program interchange JSON into typed structs.
//!
//! The main entry point is [`from_interchange`], which takes a
//! `&serde_json::Value` and produces a [`ProgramBundle`].

use crate::types::*;

/// Errors during program interchange deserialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The bundle is missing a required top-level field.
    #[error("program missing required field: '{field}'")]
    MissingField { field: String },
    /// A construct is missing a required field or has a malformed one.
    #[error("{kind} '{id}': {message}")]
    ConstructError {
        kind: String,
        id: String,
        message: String,
    },
    /// The bundle structure is invalid.
    #[error("invalid program: {0}")]
    InvalidBundle(String),
}

/// Deserialize a program description into typed structs.
///
/// Walks the `constructs` array and dispatches on the `kind` field.
/// Unknown construct kinds are skipped for forward compatibility.
pub fn from_interchange(bundle: &serde_json::Value) -> Result<ProgramBundle, InterchangeError> {
    let id = bundle
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "id".to_string(),
        })?
        .to_string();

    if let Some(kind) = bundle.get("kind").and_then(|k| k.as_str()) {
        if kind != "Program" {
            return Err(InterchangeError::InvalidBundle(format!(
                "expected kind 'Program', got '{}'",
                kind
            )));
        }
    }

    let program_version = bundle
        .get("program_version")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let constructs_arr = bundle
        .get("constructs")
        .and_then(|c| c.as_array())
        .ok_or_else(|| InterchangeError::MissingField {
            field: "constructs".to_string(),
        })?;

    let mut constructs = Vec::with_capacity(constructs_arr.len());

    for obj in constructs_arr {
        let kind = obj.get("kind").and_then(|k| k.as_str()).unwrap_or("");

        let construct = match kind {
            "Type" => Some(ProgramConstruct::Record(parse_record(obj)?)),
            "Enum" => Some(ProgramConstruct::Enum(parse_enum(obj)?)),
            "Function" => Some(ProgramConstruct::Function(parse_function(obj)?)),
            _ => None,
        };

        if let Some(c) = construct {
            constructs.push(c);
        }
    }

    Ok(ProgramBundle {
        id,
        program_version,
        constructs,
    })
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn required_str(obj: &serde_json::Value, field: &str) -> Result<String, InterchangeError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| InterchangeError::InvalidBundle(format!("missing '{}' field", field)))
}

fn optional_str(obj: &serde_json::Value, field: &str) -> Option<String> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn construct_error(kind: &str, id: &str, message: impl Into<String>) -> InterchangeError {
    InterchangeError::ConstructError {
        kind: kind.to_string(),
        id: id.to_string(),
        message: message.into(),
    }
}

fn parse_record(obj: &serde_json::Value) -> Result<RecordConstruct, InterchangeError> {
    let id = required_str(obj, "id")?;
    let members = match obj.get("members") {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(m) => serde_json::from_value::<Vec<MemberConstruct>>(m.clone())
            .map_err(|e| construct_error("Type", &id, format!("invalid members: {}", e)))?,
    };
    let is_abstract = obj
        .get("abstract")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(RecordConstruct {
        label: optional_str(obj, "label"),
        extends: optional_str(obj, "extends"),
        is_abstract,
        members,
        id,
    })
}

fn parse_enum(obj: &serde_json::Value) -> Result<EnumConstruct, InterchangeError> {
    let id = required_str(obj, "id")?;
    let values_arr = obj
        .get("values")
        .and_then(|v| v.as_array())
        .ok_or_else(|| construct_error("Enum", &id, "missing 'values' array"))?;
    let mut values = Vec::with_capacity(values_arr.len());
    for v in values_arr {
        let s = v
            .as_str()
            .ok_or_else(|| construct_error("Enum", &id, format!("non-string value {}", v)))?;
        values.push(s.to_string());
    }

    Ok(EnumConstruct {
        label: optional_str(obj, "label"),
        values,
        id,
    })
}

fn parse_function(obj: &serde_json::Value) -> Result<FunctionConstruct, InterchangeError> {
    let id = required_str(obj, "id")?;
    let parameters = match obj.get("parameters") {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(p) => serde_json::from_value::<Vec<ParameterConstruct>>(p.clone())
            .map_err(|e| construct_error("Function", &id, format!("invalid parameters: {}", e)))?,
    };
    let result = optional_str(obj, "result")
        .ok_or_else(|| construct_error("Function", &id, "missing 'result' type"))?;
    let body = match obj.get("body") {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(nodes)) => nodes.clone(),
        Some(_) => return Err(construct_error("Function", &id, "'body' must be an array")),
    };
    let produce = obj
        .get("produce")
        .cloned()
        .ok_or_else(|| construct_error("Function", &id, "missing 'produce' expression"))?;

    Ok(FunctionConstruct {
        parameters,
        result,
        body,
        produce,
        id,
    })
}

// ── Tests ───────────────────────────────────────────────────────────
