//! Exploratory sessions: evaluate, ask for what is missing, refill, repeat.
//!
//! A session owns a payload that starts with an empty object per parameter.
//! Each round evaluates it; every missing element becomes a [`Question`]
//! and the answer is injected at `target.member` before re-evaluating.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::locale::{question, Locale};
use crate::types::values::DISCRIMINATOR;
use crate::types::{
    Catalog, MissingElement, Outcome, PreEvaluationError, Primitive, RequirementKind, TypeKind,
};
use crate::{evaluate, Evaluation};

/// Errors raised while injecting an answer into a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefillError {
    #[error("target '{target}' does not exist in the payload")]
    UnknownTarget { target: String },
    #[error("target '{target}' is not an object")]
    NotAnObject { target: String },
    #[error("'{answer}' is not a valid answer for '{member}' (expected {expected})")]
    InvalidAnswer {
        member: String,
        answer: String,
        expected: String,
    },
    #[error("member type '{name}' is not in the catalog")]
    UnknownType { name: String },
}

/// A missing element together with its rendered question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub element: MissingElement,
    pub text: String,
}

/// Source of answers for a session (a terminal, a script, a test).
pub trait Prompter {
    /// Answer a question; `None` abandons the session.
    fn ask(&mut self, question: &Question) -> Option<String>;
}

/// Result of one evaluation round.
#[derive(Debug, Clone)]
pub enum Step {
    Completed(Evaluation),
    NeedsInput(Vec<Question>),
    /// Pre-evaluation or decision logic error; answering cannot fix it.
    Failed(Outcome),
}

/// How [`ExploratorySession::play`] ended.
#[derive(Debug, Clone)]
pub enum SessionEnd {
    Completed(Evaluation),
    Abandoned { pending: Vec<Question> },
    RoundLimit { rounds: usize },
    Failed(Outcome),
}

pub struct ExploratorySession<'c> {
    catalog: &'c Catalog,
    function: String,
    locale: Locale,
    payload: serde_json::Value,
}

impl<'c> ExploratorySession<'c> {
    /// Start a session with an empty object for every parameter.
    pub fn new(
        catalog: &'c Catalog,
        function: &str,
        locale: Locale,
    ) -> Result<ExploratorySession<'c>, PreEvaluationError> {
        let f = catalog
            .function(function)
            .ok_or_else(|| PreEvaluationError::UnknownFunction {
                name: function.to_string(),
            })?;
        let mut payload = serde_json::Map::new();
        for p in &f.parameters {
            payload.insert(p.label.clone(), serde_json::json!({}));
        }
        Ok(ExploratorySession {
            catalog,
            function: function.to_string(),
            locale,
            payload: serde_json::Value::Object(payload),
        })
    }

    /// Seed the session with a partial payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Evaluate the current payload once.
    pub fn step(&self) -> Step {
        let evaluation = match evaluate(self.catalog, &self.function, &self.payload, self.locale) {
            Ok(ev) => ev,
            Err(e) => return Step::Failed(Outcome::PreEvaluationError(e)),
        };
        match &evaluation.outcome {
            Outcome::Completed(_) => Step::Completed(evaluation),
            Outcome::MissingData(elements) => Step::NeedsInput(
                elements
                    .iter()
                    .map(|e| Question {
                        element: e.clone(),
                        text: question(e, self.catalog, self.locale),
                    })
                    .collect(),
            ),
            other => Step::Failed(other.clone()),
        }
    }

    /// Inject an answer for a missing element.
    pub fn supply(&mut self, element: &MissingElement, answer: &str) -> Result<(), RefillError> {
        refill(&mut self.payload, element, answer, self.catalog)
    }

    /// Run rounds until completion, abandonment, failure or `max_rounds`.
    pub fn play(&mut self, prompter: &mut dyn Prompter, max_rounds: usize) -> SessionEnd {
        for round in 0..max_rounds {
            let questions = match self.step() {
                Step::Completed(ev) => return SessionEnd::Completed(ev),
                Step::Failed(outcome) => return SessionEnd::Failed(outcome),
                Step::NeedsInput(questions) => questions,
            };
            tracing::debug!(round, pending = questions.len(), "exploratory round");
            for (i, q) in questions.iter().enumerate() {
                let Some(answer) = prompter.ask(q) else {
                    return SessionEnd::Abandoned {
                        pending: questions[i..].to_vec(),
                    };
                };
                if let Err(e) = self.supply(&q.element, &answer) {
                    // Still missing, so it is asked again next round.
                    tracing::warn!(error = %e, "answer rejected");
                }
            }
        }
        SessionEnd::RoundLimit { rounds: max_rounds }
    }
}

// ──────────────────────────────────────────────
// Refill
// ──────────────────────────────────────────────

/// Inject `answer` into `payload` at `element.target`.`element.member`.
///
/// The answer is coerced by member type. Record members take the answer
/// as a variant name; collection members get a new tagged element.
pub fn refill(
    payload: &mut serde_json::Value,
    element: &MissingElement,
    answer: &str,
    catalog: &Catalog,
) -> Result<(), RefillError> {
    let value = coerce_answer(element, answer.trim(), catalog)?;

    let mut current = payload;
    for segment in element.target.split('.') {
        current = match current {
            serde_json::Value::Object(map) => {
                map.get_mut(segment)
                    .ok_or_else(|| RefillError::UnknownTarget {
                        target: element.target.clone(),
                    })?
            }
            serde_json::Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| RefillError::UnknownTarget {
                    target: element.target.clone(),
                })?,
            _ => {
                return Err(RefillError::UnknownTarget {
                    target: element.target.clone(),
                })
            }
        };
    }

    let target = current
        .as_object_mut()
        .ok_or_else(|| RefillError::NotAnObject {
            target: element.target.clone(),
        })?;

    if element.kind == RequirementKind::Includes {
        let slot = target
            .entry(element.member.clone())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = serde_json::Value::Array(Vec::new());
        }
        if let serde_json::Value::Array(items) = slot {
            items.push(value);
        }
        return Ok(());
    }

    // Keep fields already supplied under an untagged composite.
    if let (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(tagged)) =
        (target.get_mut(&element.member), &value)
    {
        for (k, v) in tagged {
            existing.insert(k.clone(), v.clone());
        }
        return Ok(());
    }
    target.insert(element.member.clone(), value);
    Ok(())
}

fn coerce_answer(
    element: &MissingElement,
    answer: &str,
    catalog: &Catalog,
) -> Result<serde_json::Value, RefillError> {
    let def = catalog
        .resolve(&element.member_type)
        .map_err(|_| RefillError::UnknownType {
            name: element.member_type.clone(),
        })?;
    let invalid = |expected: String| RefillError::InvalidAnswer {
        member: element.member.clone(),
        answer: answer.to_string(),
        expected,
    };

    match &def.kind {
        TypeKind::Primitive(Primitive::Boolean) => {
            let yes = matches!(
                answer.to_ascii_lowercase().as_str(),
                "true" | "t" | "y" | "yes" | "oui" | "o"
            );
            Ok(serde_json::Value::Bool(yes))
        }
        TypeKind::Primitive(Primitive::Integer) => answer
            .parse::<i64>()
            .map(|i| serde_json::json!(i))
            .map_err(|_| invalid("an integer".to_string())),
        TypeKind::Primitive(Primitive::Decimal) => Decimal::from_str(answer)
            .ok()
            .and_then(|d| serde_json::from_str::<serde_json::Value>(&d.to_string()).ok())
            .ok_or_else(|| invalid("a decimal number".to_string())),
        TypeKind::Primitive(Primitive::String) => Ok(serde_json::Value::String(answer.to_string())),
        TypeKind::Enumeration(values) => values
            .iter()
            .find(|v| v.eq_ignore_ascii_case(answer))
            .map(|v| serde_json::Value::String(v.clone()))
            .ok_or_else(|| invalid(format!("one of {}", values.join(", ")))),
        TypeKind::Record => {
            let candidates = std::iter::once(def.id)
                .chain(def.variants.iter().copied())
                .map(|id| catalog.get(id))
                .filter(|d| !d.is_abstract);
            let mut names = Vec::new();
            for candidate in candidates {
                let short = candidate.name.rsplit('.').next().unwrap_or(&candidate.name);
                if candidate.name == answer
                    || short.eq_ignore_ascii_case(answer)
                    || candidate.display_name().eq_ignore_ascii_case(answer)
                {
                    let mut obj = serde_json::Map::new();
                    obj.insert(
                        DISCRIMINATOR.to_string(),
                        serde_json::Value::String(candidate.name.clone()),
                    );
                    return Ok(serde_json::Value::Object(obj));
                }
                names.push(candidate.display_name().to_string());
            }
            Err(invalid(format!("one of {}", names.join(", "))))
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
