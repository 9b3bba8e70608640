use std::path::{Path, PathBuf};

use lacuna_eval::{
    evaluate_batch, has_known_value, has_missing_info, Catalog, Locale, Outcome, Request,
};
use serde::Deserialize;
use serde_json::Value;

use crate::commands::{load_catalog, read_json};
use crate::tap::Tap;

/// Scenario suite runner.
///
/// Convention:
///   <suite>/<fixture>/program.json    -- program description
///   <suite>/<fixture>/scenarios.json  -- named payloads with expectations
///
/// A suite directory that itself holds `program.json` is run as a single
/// fixture. Test names are `<fixture>/<scenario name>`.
pub struct RunResult {
    pub failed: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    name: String,
    function: String,
    #[serde(default)]
    payload: Value,
    expect: Expectation,
}

/// What a scenario expects: missing data, a known value or an error kind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Expectation {
    Missing(Value),
    Known(Value),
    Error(String),
}

pub fn run_suite(suite_dir: &Path, locale: Locale) -> RunResult {
    let mut tap = Tap::new();

    for dir in fixture_dirs(suite_dir) {
        run_fixture(&dir, locale, &mut tap);
    }

    if tap.is_empty() {
        tap.not_ok(
            suite_dir.display().to_string(),
            "no fixtures found (expected <fixture>/program.json + scenarios.json)",
        );
    }

    let failed = tap.failure_count();
    tap.finish();

    RunResult { failed }
}

fn run_fixture(dir: &Path, locale: Locale, tap: &mut Tap) {
    let fixture = dir_name(dir);

    let catalog = match load_catalog(&dir.join("program.json")) {
        Ok(c) => c,
        Err(e) => {
            tap.not_ok(format!("{}/program", fixture), e);
            return;
        }
    };

    let scenarios_path = dir.join("scenarios.json");
    let file: ScenarioFile = match read_json(&scenarios_path)
        .and_then(|v| serde_json::from_value(v).map_err(|e| e.to_string()))
    {
        Ok(f) => f,
        Err(e) => {
            tap.not_ok(
                format!("{}/scenarios", fixture),
                format!("invalid scenario file {}: {}", scenarios_path.display(), e),
            );
            return;
        }
    };

    let requests: Vec<Request> = file
        .scenarios
        .iter()
        .map(|s| Request {
            function: s.function.clone(),
            payload: s.payload.clone(),
        })
        .collect();
    let outcomes = evaluate_batch(&catalog, &requests, locale);
    tracing::debug!(fixture = %fixture, scenarios = outcomes.len(), "fixture evaluated");

    for (scenario, outcome) in file.scenarios.iter().zip(&outcomes) {
        let test_name = format!("{}/{}", fixture, scenario.name);
        match check(&catalog, outcome, &scenario.expect) {
            None => tap.ok(test_name),
            Some(diff) => tap.not_ok(
                test_name,
                format!("{}\nactual:\n{}", diff, pretty(&outcome.to_json())),
            ),
        }
    }
}

/// Compare an outcome with its expectation; `None` on a match.
fn check(catalog: &Catalog, outcome: &Outcome, expect: &Expectation) -> Option<String> {
    match expect {
        Expectation::Missing(pattern) => {
            has_missing_info(outcome, pattern, catalog).map(|d| d.to_string())
        }
        Expectation::Known(pattern) => {
            has_known_value(outcome, pattern, catalog).map(|d| d.to_string())
        }
        Expectation::Error(kind) => {
            if outcome.kind().as_str() == kind {
                None
            } else {
                Some(format!("expected {}, got {}", kind, outcome.kind()))
            }
        }
    }
}

// -- Helpers --

fn fixture_dirs(suite_dir: &Path) -> Vec<PathBuf> {
    if suite_dir.join("program.json").exists() {
        return vec![suite_dir.to_path_buf()];
    }
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(suite_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && path.join("program.json").exists() {
                results.push(path);
            }
        }
    }
    results.sort();
    results
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn pretty(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_default()
}
