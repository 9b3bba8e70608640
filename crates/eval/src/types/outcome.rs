//! Terminal evaluation outcomes and their wire shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::values::{value_to_json, Value};
use super::{DecisionLogicError, PreEvaluationError};

/// How a missing member is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Exactly one value expected.
    Has,
    /// At least one collection element expected.
    Includes,
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementKind::Has => write!(f, "has"),
            RequirementKind::Includes => write!(f, "includes"),
        }
    }
}

/// One missing-data diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingElement {
    /// Human-readable label of the composite owning the member.
    pub target: String,
    /// Concrete type of the target.
    pub target_type: String,
    pub member: String,
    /// Declared type of the member.
    pub member_type: String,
    pub kind: RequirementKind,
}

impl fmt::Display for MissingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {}: {}",
            self.target, self.target_type, self.kind, self.member, self.member_type
        )
    }
}

/// A concrete result with the field paths read to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub value: Value,
    pub fields_read: Vec<String>,
}

/// Terminal result of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Completion),
    /// Ordered, deduplicated diagnostics.
    MissingData(Vec<MissingElement>),
    PreEvaluationError(PreEvaluationError),
    DecisionLogicError(DecisionLogicError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Completed,
    MissingData,
    PreEvaluationError,
    DecisionLogicError,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Completed => "Completed",
            OutcomeKind::MissingData => "MissingData",
            OutcomeKind::PreEvaluationError => "PreEvaluationError",
            OutcomeKind::DecisionLogicError => "DecisionLogicError",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Completed(_) => OutcomeKind::Completed,
            Outcome::MissingData(_) => OutcomeKind::MissingData,
            Outcome::PreEvaluationError(_) => OutcomeKind::PreEvaluationError,
            Outcome::DecisionLogicError(_) => OutcomeKind::DecisionLogicError,
        }
    }

    pub fn missing(&self) -> &[MissingElement] {
        match self {
            Outcome::MissingData(elements) => elements,
            _ => &[],
        }
    }

    /// Wire form of the outcome.
    ///
    /// `MissingData` renders as `{"type":"MissingData","elements":[...]}`;
    /// errors carry their message. The fields read by a completed
    /// evaluation stay on [`Completion`] and are not rendered.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Outcome::Completed(c) => serde_json::json!({
                "type": "Completed",
                "value": value_to_json(&c.value),
            }),
            Outcome::MissingData(elements) => serde_json::json!({
                "type": "MissingData",
                "elements": elements,
            }),
            Outcome::PreEvaluationError(e) => serde_json::json!({
                "type": "PreEvaluationError",
                "message": e.to_string(),
            }),
            Outcome::DecisionLogicError(e) => serde_json::json!({
                "type": "DecisionLogicError",
                "message": e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element() -> MissingElement {
        MissingElement {
            target: "the configuration.cluster".to_string(),
            target_type: "demo.config.DedicatedCluster".to_string(),
            member: "minNumberOfNodes".to_string(),
            member_type: "Integer".to_string(),
            kind: RequirementKind::Has,
        }
    }

    #[test]
    fn missing_data_wire_shape() {
        let outcome = Outcome::MissingData(vec![element()]);
        assert_eq!(
            outcome.to_json(),
            json!({
                "type": "MissingData",
                "elements": [{
                    "target": "the configuration.cluster",
                    "targetType": "demo.config.DedicatedCluster",
                    "member": "minNumberOfNodes",
                    "memberType": "Integer",
                    "kind": "has"
                }]
            })
        );
    }

    #[test]
    fn element_parses_from_wire() {
        let parsed: MissingElement = serde_json::from_value(json!({
            "target": "the configuration.cluster",
            "targetType": "demo.config.DedicatedCluster",
            "member": "minNumberOfNodes",
            "memberType": "Integer",
            "kind": "has"
        }))
        .unwrap();
        assert_eq!(parsed, element());

        let bad: Result<MissingElement, _> = serde_json::from_value(json!({
            "target": "x", "targetType": "T", "member": "m", "memberType": "M", "kind": "contains"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn completed_wire_shape() {
        let outcome = Outcome::Completed(Completion {
            value: Value::Bool(true),
            fields_read: vec!["the customer request.cloudProvider".to_string()],
        });
        assert_eq!(outcome.kind(), OutcomeKind::Completed);
        assert_eq!(outcome.to_json()["type"], "Completed");
        assert_eq!(
            outcome.to_json(),
            json!({"type": "Completed", "value": true})
        );
        assert!(outcome.missing().is_empty());
    }

    #[test]
    fn kind_display() {
        assert_eq!(OutcomeKind::MissingData.to_string(), "MissingData");
        assert_eq!(RequirementKind::Includes.to_string(), "includes");
    }
}
