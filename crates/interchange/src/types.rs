//! Typed structs representing the Lacuna program interchange JSON.
//!
//! A program description is a flat array of constructs (record types,
//! enumerations and decision functions). Logic trees and expressions are
//! kept as `serde_json::Value` here: the evaluator parses them into its
//! own node types once the type catalog exists.

use serde::{Deserialize, Serialize};

/// Top-level program description containing all constructs.
#[derive(Debug, Clone)]
pub struct ProgramBundle {
    /// Application identifier (e.g. "cluster-config-demo").
    pub id: String,
    /// Version of the application itself (e.g. "1.0.0").
    pub program_version: String,
    /// All constructs in declaration order.
    pub constructs: Vec<ProgramConstruct>,
}

impl ProgramBundle {
    /// Iterate over decision function constructs.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionConstruct> {
        self.constructs.iter().filter_map(|c| match c {
            ProgramConstruct::Function(f) => Some(f),
            _ => None,
        })
    }
}

/// A single construct from the program description, dispatched by kind.
#[derive(Debug, Clone)]
pub enum ProgramConstruct {
    Record(RecordConstruct),
    Enum(EnumConstruct),
    Function(FunctionConstruct),
}

// ── Record ──────────────────────────────────────────────────────────

/// One member declaration of a record type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberConstruct {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub collection: bool,
}

/// A record (composite) type. `extends` names the family base.
#[derive(Debug, Clone)]
pub struct RecordConstruct {
    pub id: String,
    pub label: Option<String>,
    pub extends: Option<String>,
    pub is_abstract: bool,
    pub members: Vec<MemberConstruct>,
}

// ── Enum ────────────────────────────────────────────────────────────

/// A closed enumeration of symbolic values.
#[derive(Debug, Clone)]
pub struct EnumConstruct {
    pub id: String,
    pub label: Option<String>,
    pub values: Vec<String>,
}

// ── Function ────────────────────────────────────────────────────────

/// A named parameter of a decision function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterConstruct {
    pub label: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A decision function construct.
#[derive(Debug, Clone)]
pub struct FunctionConstruct {
    pub id: String,
    pub parameters: Vec<ParameterConstruct>,
    /// Declared result type name.
    pub result: String,
    /// Raw logic tree: an array of logic nodes.
    pub body: Vec<serde_json::Value>,
    /// Raw result-producing expression.
    pub produce: serde_json::Value,
}
