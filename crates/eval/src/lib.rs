//! Lacuna decision evaluator -- runs typed decision functions over
//! partially-supplied payloads.
//!
//! Missing required data is not an error: evaluation walks as far as the
//! supplied values allow and reports every required fact it could not
//! find as a `MissingData` outcome. The oracle compares outcomes against
//! expected patterns for scenario runners; exploratory sessions use the
//! same entry point to ask for what is missing.

pub mod diagnostics;
pub mod evaluator;
pub mod explore;
pub mod graph;
pub mod locale;
pub mod numeric;
pub mod oracle;
pub mod types;

use rayon::prelude::*;

pub use explore::{refill, ExploratorySession, Prompter, Question, RefillError, SessionEnd, Step};
pub use locale::Locale;
pub use oracle::{has_known_value, has_missing_info, Diff, DiffEntry, Mismatch};
pub use types::{
    Catalog, CatalogError, Completion, DecisionLogicError, MissingElement, Outcome, OutcomeKind,
    PreEvaluationError, RequirementKind, Value,
};

/// Result of running a decision function over a payload.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub outcome: Outcome,
    /// Qualified name of the function's declared result type.
    pub result_type: String,
    pub locale: Locale,
}

impl Evaluation {
    /// Wire form of the evaluation.
    ///
    /// With `rich`, every missing element carries a localized question
    /// under `details.question`.
    pub fn to_json(&self, catalog: &Catalog, rich: bool) -> serde_json::Value {
        let mut json = self.outcome.to_json();
        if let Outcome::Completed(_) = self.outcome {
            json["resultType"] = serde_json::Value::String(self.result_type.clone());
        }
        if rich {
            if let Outcome::MissingData(elements) = &self.outcome {
                if let Some(items) = json.get_mut("elements").and_then(|e| e.as_array_mut()) {
                    for (item, element) in items.iter_mut().zip(elements) {
                        item["details"] = serde_json::json!({
                            "question": locale::question(element, catalog, self.locale),
                        });
                    }
                }
            }
        }
        json
    }
}

/// Evaluate a decision function over a payload keyed by parameter label.
///
/// Fails only for malformed input: an unknown function, a missing
/// parameter, an unregistered variant tag or a scalar of the wrong kind.
/// Missing business data and program defects are reported in the
/// returned outcome.
pub fn evaluate(
    catalog: &Catalog,
    function: &str,
    payload: &serde_json::Value,
    locale: Locale,
) -> Result<Evaluation, PreEvaluationError> {
    let span = tracing::debug_span!("evaluate", function = %function, locale = locale.tag());
    let _enter = span.enter();

    let f = catalog
        .function(function)
        .ok_or_else(|| PreEvaluationError::UnknownFunction {
            name: function.to_string(),
        })?;
    let graph = graph::build_graph(catalog, f, payload)?;
    let outcome = evaluator::eval_function(catalog, f, &graph);
    tracing::debug!(outcome = %outcome.kind(), "evaluation finished");

    Ok(Evaluation {
        outcome,
        result_type: catalog.type_name(f.result_type).to_string(),
        locale,
    })
}

/// Like [`evaluate`], with pre-evaluation failures folded into the outcome.
pub fn evaluate_outcome(
    catalog: &Catalog,
    function: &str,
    payload: &serde_json::Value,
    locale: Locale,
) -> Outcome {
    match evaluate(catalog, function, payload, locale) {
        Ok(ev) => ev.outcome,
        Err(e) => Outcome::PreEvaluationError(e),
    }
}

/// One entry of a batch evaluation.
#[derive(Debug, Clone)]
pub struct Request {
    pub function: String,
    pub payload: serde_json::Value,
}

/// Evaluate independent requests in parallel. Outcomes keep input order.
pub fn evaluate_batch(catalog: &Catalog, requests: &[Request], locale: Locale) -> Vec<Outcome> {
    requests
        .par_iter()
        .map(|r| evaluate_outcome(catalog, &r.function, &r.payload, locale))
        .collect()
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    const KAFKA: &str = "demo.config.configureKafkaCluster";

    fn kafka() -> Catalog {
        let program: serde_json::Value =
            serde_json::from_str(include_str!("../../../conformance/kafka/program.json")).unwrap();
        Catalog::from_interchange(&program).unwrap()
    }

    fn dedicated(nodes: Option<i64>) -> serde_json::Value {
        let mut cluster = json!({
            "LGType_": "demo.config.DedicatedCluster",
            "scaling": "Manual",
        });
        if let Some(n) = nodes {
            cluster["minNumberOfNodes"] = json!(n);
        }
        json!({
            "the customer request": {"cloudProvider": "AWS", "mustHaveDedicatedEnv": true},
            "the configuration": {"cluster": cluster}
        })
    }

    #[test]
    fn empty_payload_reports_first_fact_only() {
        let catalog = kafka();
        let payload = json!({"the customer request": {}, "the configuration": {}});
        let ev = evaluate(&catalog, KAFKA, &payload, Locale::En).unwrap();
        assert_eq!(
            ev.outcome.missing(),
            &[MissingElement {
                target: "the customer request".to_string(),
                target_type: "demo.config.CustomerRequest".to_string(),
                member: "cloudProvider".to_string(),
                member_type: "demo.config.CloudProvider".to_string(),
                kind: RequirementKind::Has,
            }]
        );
        assert_eq!(ev.result_type, "demo.config.Deployment");
    }

    #[test]
    fn completed_evaluation_carries_result_type() {
        let catalog = kafka();
        let ev = evaluate(&catalog, KAFKA, &dedicated(Some(6)), Locale::En).unwrap();
        let wire = ev.to_json(&catalog, false);
        assert_eq!(wire["type"], "Completed");
        assert_eq!(wire["resultType"], "demo.config.Deployment");
        assert_eq!(wire["value"]["minNumberOfNodes"], json!(6));
        assert_eq!(wire["value"]["cloudProvider"], "AWS");
        assert!(wire.get("fieldsRead").is_none());
    }

    #[test]
    fn completed_wire_forms_satisfy_the_oracle() {
        let catalog = kafka();
        let ev = evaluate(&catalog, KAFKA, &dedicated(Some(6)), Locale::En).unwrap();
        assert!(has_known_value(&ev.outcome, &ev.outcome.to_json(), &catalog).is_none());
        assert!(has_known_value(&ev.outcome, &ev.to_json(&catalog, false), &catalog).is_none());
        assert!(has_known_value(&ev.outcome, &ev.to_json(&catalog, true), &catalog).is_none());
    }

    #[test]
    fn rich_rendering_adds_questions() {
        let catalog = kafka();
        let ev = evaluate(&catalog, KAFKA, &dedicated(None), Locale::Fr).unwrap();
        let wire = ev.to_json(&catalog, true);
        let question = wire["elements"][0]["details"]["question"].as_str().unwrap();
        assert!(question.starts_with("Quel est le minNumberOfNodes de the configuration.cluster"));

        let plain = ev.to_json(&catalog, false);
        assert!(plain["elements"][0].get("details").is_none());
    }

    #[test]
    fn unknown_function_is_pre_evaluation_error() {
        let catalog = kafka();
        let err = evaluate(&catalog, "nope", &json!({}), Locale::En).unwrap_err();
        assert_eq!(
            err,
            PreEvaluationError::UnknownFunction {
                name: "nope".to_string()
            }
        );
        assert_eq!(
            evaluate_outcome(&catalog, "nope", &json!({}), Locale::En).kind(),
            OutcomeKind::PreEvaluationError
        );
    }

    #[test]
    fn locale_does_not_change_outcome() {
        let catalog = kafka();
        let en = evaluate_outcome(&catalog, KAFKA, &dedicated(None), Locale::En);
        let fr = evaluate_outcome(&catalog, KAFKA, &dedicated(None), Locale::Fr);
        assert_eq!(en, fr);
    }

    #[test]
    fn batch_preserves_order() {
        let catalog = kafka();
        let requests: Vec<Request> = (0..16)
            .map(|i| Request {
                function: KAFKA.to_string(),
                payload: dedicated(if i % 2 == 0 { Some(i) } else { None }),
            })
            .collect();
        let outcomes = evaluate_batch(&catalog, &requests, Locale::En);
        assert_eq!(outcomes.len(), 16);
        for (i, outcome) in outcomes.iter().enumerate() {
            let expected = if i % 2 == 0 {
                OutcomeKind::Completed
            } else {
                OutcomeKind::MissingData
            };
            assert_eq!(outcome.kind(), expected, "request {}", i);
        }
    }

    #[test]
    fn oracle_accepts_scenario_four() {
        let catalog = kafka();
        let outcome = evaluate_outcome(&catalog, KAFKA, &dedicated(None), Locale::En);
        let expected = json!({"type": "MissingData", "elements": [{
            "target": "the configuration.cluster",
            "targetType": "demo.config.DedicatedCluster",
            "member": "minNumberOfNodes",
            "memberType": "Integer",
            "kind": "has"
        }]});
        assert!(has_missing_info(&outcome, &expected, &catalog).is_none());
    }
}
