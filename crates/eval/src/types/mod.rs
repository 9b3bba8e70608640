//! Catalog, logic tree, runtime value and outcome types for the evaluator.
//!
//! The catalog is built once from a program description and is never
//! mutated afterwards. Logic trees reference types by [`TypeId`], resolved
//! at build time, so evaluation never compares type names.

pub mod catalog;
pub mod logic;
pub mod outcome;
pub mod values;

use std::fmt;

pub use catalog::{
    Cardinality, Catalog, DecisionFunction, LookupError, MemberSpec, Parameter, Primitive,
    TypeDef, TypeId, TypeKind,
};
pub use logic::{parse_expr, parse_logic};
pub use outcome::{Completion, MissingElement, Outcome, OutcomeKind, RequirementKind};
pub use values::{json_type_name, value_to_json, Value};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors raised while building a [`Catalog`] from a program description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Interchange(#[from] lacuna_interchange::InterchangeError),
    #[error("type '{name}' is declared more than once")]
    DuplicateType { name: String },
    #[error("function '{name}' is declared more than once")]
    DuplicateFunction { name: String },
    #[error("type '{owner}' declares member '{member}' more than once")]
    DuplicateMember { owner: String, member: String },
    #[error("{context} references unknown type '{name}'")]
    UnknownTypeReference { context: String, name: String },
    #[error("type '{name}' extends '{base}', which is not a record type")]
    InvalidExtension { name: String, base: String },
    #[error("type '{name}' has a cyclic extension chain")]
    ExtensionCycle { name: String },
    #[error("enum '{name}' declares no values")]
    EmptyEnum { name: String },
    #[error("type '{owner}' member '{member}' is a collection of non-record type '{element}'")]
    ScalarCollection {
        owner: String,
        member: String,
        element: String,
    },
    #[error("function '{function}': {message}")]
    InvalidFunction { function: String, message: String },
}

/// Malformed caller input detected before any decision logic runs.
///
/// Fatal for the call; the caller must fix the payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreEvaluationError {
    #[error("unknown decision function '{name}'")]
    UnknownFunction { name: String },
    #[error("payload must be a JSON object, got {got}")]
    MalformedPayload { got: String },
    #[error("function '{function}' parameter '{parameter}' is not supplied")]
    MissingParameter { function: String, parameter: String },
    #[error("'{path}': '{tag}' is not a registered variant of '{family}'")]
    UnknownVariant {
        path: String,
        family: String,
        tag: String,
    },
    #[error("'{path}': expected {expected}, got {got}")]
    TypeMismatch {
        path: String,
        expected: String,
        got: String,
    },
    #[error("'{path}': '{value}' is not a value of enum '{enum_type}' (valid: {})", .allowed.join(", "))]
    InvalidEnumValue {
        path: String,
        enum_type: String,
        value: String,
        allowed: Vec<String>,
    },
}

/// A defect in the decision program itself, never caused by caller input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionLogicError {
    #[error("'{path}': '{root}' is neither a parameter nor a bound variable")]
    UnknownRoot { path: String, root: String },
    #[error("'{path}': type '{type_name}' declares no member '{member}'")]
    UnknownMember {
        path: String,
        type_name: String,
        member: String,
    },
    #[error("'{path}': cannot navigate through '{segment}' ({reason})")]
    NotNavigable {
        path: String,
        segment: String,
        reason: String,
    },
    #[error("type error: {message}")]
    TypeError { message: String },
    #[error("result expression reads '{path}', which the decision logic never required")]
    UnrequiredResultRead { path: String },
    #[error("result of type {got} does not conform to declared result type '{expected}'")]
    ResultTypeMismatch { expected: String, got: String },
}

// ──────────────────────────────────────────────
// Field paths
// ──────────────────────────────────────────────

/// Dotted address of a field, rooted at a parameter label or a variable
/// bound by `each` / a quantifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub root: String,
    pub members: Vec<String>,
}

impl FieldPath {
    /// Parse `"the customer request.cloudProvider"` into root and members.
    pub fn parse(s: &str) -> Result<FieldPath, String> {
        let mut parts = s.split('.');
        let root = parts.next().unwrap_or("").to_string();
        if root.is_empty() {
            return Err(format!("empty field path '{}'", s));
        }
        let members: Vec<String> = parts.map(|p| p.to_string()).collect();
        if members.iter().any(|m| m.is_empty()) {
            return Err(format!("field path '{}' has an empty segment", s));
        }
        Ok(FieldPath { root, members })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for m in &self.members {
            write!(f, ".{}", m)?;
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Expression and logic trees
// ──────────────────────────────────────────────

/// Expression nodes used by gates, quantifiers and the result producer.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Read of a field.
    FieldRef(FieldPath),
    /// Literal value.
    Literal(Value),
    /// Presence test; never records a requirement.
    Present(FieldPath),
    /// Whether the composite at `path` is `variant` or one of its descendants.
    VariantOf {
        path: FieldPath,
        variant: TypeId,
    },
    /// Number of present elements of a collection.
    Count(FieldPath),
    /// Binary comparison (`=`, `!=`, `<`, `<=`, `>`, `>=`).
    Compare {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not {
        operand: Box<Expr>,
    },
    /// Bounded existential quantification over a collection.
    Exists {
        variable: String,
        domain: FieldPath,
        body: Box<Expr>,
    },
    /// Bounded universal quantification over a collection.
    Forall {
        variable: String,
        domain: FieldPath,
        body: Box<Expr>,
    },
    /// Record construction; absent optional fields are omitted.
    Record {
        type_id: TypeId,
        fields: Vec<(String, Expr)>,
    },
    If {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

/// One node of a decision function's logic tree.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicNode {
    /// Required read: every segment of the path must be present.
    Require(FieldPath),
    /// Boolean gate.
    Gate {
        condition: Expr,
        then: Vec<LogicNode>,
        otherwise: Vec<LogicNode>,
    },
    /// Gate on a scalar value.
    Switch {
        path: FieldPath,
        cases: Vec<(Value, Vec<LogicNode>)>,
        otherwise: Vec<LogicNode>,
    },
    /// Gate on the concrete variant of a composite.
    Match {
        path: FieldPath,
        arms: Vec<(TypeId, Vec<LogicNode>)>,
        otherwise: Vec<LogicNode>,
    },
    /// Run `body` once per present element of a collection.
    Each {
        path: FieldPath,
        variable: String,
        body: Vec<LogicNode>,
    },
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
