//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `lacuna` binary and verify
//! exit codes, stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to conformance fixtures and test fixtures resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const KAFKA_PROGRAM: &str = "conformance/kafka/program.json";
const KAFKA: &str = "demo.config.configureKafkaCluster";

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `lacuna` binary, rooted at workspace.
fn lacuna() -> Command {
    let mut cmd = cargo_bin_cmd!("lacuna");
    cmd.current_dir(workspace_root());
    cmd.env_remove("LACUNA_LOG");
    cmd
}

fn eval_args<'a>(payload: &'a str) -> Vec<&'a str> {
    vec!["eval", KAFKA, "--program", KAFKA_PROGRAM, "--payload", payload]
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    lacuna()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Lacuna partial-data decision evaluator",
        ));
}

#[test]
fn version_exits_0() {
    lacuna()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lacuna"));
}

#[test]
fn eval_help_lists_payload_flag() {
    lacuna()
        .args(["eval", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--payload"));
}

// ──────────────────────────────────────────────
// 2. Validate subcommand
// ──────────────────────────────────────────────

#[test]
fn validate_kafka_program_exits_0() {
    lacuna()
        .args(["validate", KAFKA_PROGRAM])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_schema_violation_exits_1() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, r#"{"not": "a program"}"#).unwrap();

    lacuna()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid program"));
}

#[test]
fn validate_reports_catalog_errors() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dangling.json");
    fs::write(
        &path,
        r#"{"id": "p", "constructs": [
            {"kind": "Type", "id": "demo.A", "members": [{"name": "b", "type": "demo.Missing"}]}
        ]}"#,
    )
    .unwrap();

    lacuna()
        .args(["validate", path.to_str().unwrap(), "--output", "json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("\"valid\": false"))
        .stderr(predicate::str::contains("demo.Missing"));
}

#[test]
fn validate_without_program_exits_1() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("lacuna");
    cmd.current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no program given"));
}

// ──────────────────────────────────────────────
// 3. Test subcommand
// ──────────────────────────────────────────────

#[test]
fn test_conformance_exits_0() {
    lacuna()
        .args(["test", "conformance"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("TAP version 14"))
        .stdout(predicate::str::contains("ok 1 - kafka/"))
        .stdout(predicate::str::contains("# fail  0"));
}

#[test]
fn test_single_fixture_dir() {
    lacuna()
        .args(["test", "conformance/kafka"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kafka/dedicated cluster without node count"));
}

#[test]
fn test_failing_scenario_exits_1() {
    let tmp = TempDir::new().unwrap();
    let fixture = tmp.path().join("broken");
    fs::create_dir(&fixture).unwrap();
    fs::copy(
        workspace_root().join(KAFKA_PROGRAM),
        fixture.join("program.json"),
    )
    .unwrap();
    fs::write(
        fixture.join("scenarios.json"),
        r#"{"scenarios": [{
            "name": "wrongly expects completion",
            "function": "demo.config.configureKafkaCluster",
            "payload": {"the customer request": {}, "the configuration": {}},
            "expect": {"known": {}}
        }]}"#,
    )
    .unwrap();

    lacuna()
        .args(["test", tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("not ok 1 - broken/wrongly expects completion"))
        .stdout(predicate::str::contains("MissingData"));
}

#[test]
fn test_nonexistent_dir_exits_1() {
    lacuna()
        .args(["test", "nonexistent_suite_dir_xyz"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

// ──────────────────────────────────────────────
// 4. Eval subcommand
// ──────────────────────────────────────────────

#[test]
fn eval_complete_payload_exits_0() {
    lacuna()
        .args(eval_args("crates/cli/tests/fixtures/kafka_complete.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("completed: demo.config.Deployment"))
        .stdout(predicate::str::contains("\"minNumberOfNodes\": 6"));
}

#[test]
fn eval_missing_data_lists_elements() {
    lacuna()
        .args(eval_args("crates/cli/tests/fixtures/kafka_missing_nodes.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("missing data (1):"))
        .stdout(predicate::str::contains(
            "the configuration.cluster (demo.config.DedicatedCluster) has minNumberOfNodes: Integer",
        ));
}

#[test]
fn eval_json_output_is_wire_shape() {
    let output = lacuna()
        .args(eval_args("crates/cli/tests/fixtures/kafka_missing_nodes.json"))
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "MissingData");
    assert_eq!(
        json["elements"],
        serde_json::json!([{
            "target": "the configuration.cluster",
            "targetType": "demo.config.DedicatedCluster",
            "member": "minNumberOfNodes",
            "memberType": "Integer",
            "kind": "has"
        }])
    );
}

#[test]
fn eval_rich_french_questions() {
    lacuna()
        .args(eval_args("crates/cli/tests/fixtures/kafka_missing_nodes.json"))
        .args(["--rich", "--locale", "fr", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Quel est le minNumberOfNodes"));
}

#[test]
fn eval_unknown_variant_exits_1() {
    lacuna()
        .args(eval_args("crates/cli/tests/fixtures/kafka_unknown_variant.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("pre-evaluation error"))
        .stderr(predicate::str::contains("demo.config.HugeCluster"));
}

#[test]
fn eval_unknown_function_exits_1() {
    lacuna()
        .args([
            "eval",
            "demo.config.nope",
            "--program",
            KAFKA_PROGRAM,
            "--payload",
            "crates/cli/tests/fixtures/kafka_complete.json",
            "--output",
            "json",
        ])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"PreEvaluationError\""));
}

#[test]
fn eval_payload_from_stdin() {
    lacuna()
        .args(eval_args("-"))
        .write_stdin(r#"{"the customer request": {}, "the configuration": {}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("has cloudProvider"));
}

#[test]
fn eval_nonexistent_payload_exits_1() {
    lacuna()
        .args(eval_args("nonexistent_payload.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn eval_missing_payload_flag_exits_with_clap_error() {
    lacuna()
        .args(["eval", KAFKA, "--program", KAFKA_PROGRAM])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--payload"));
}

#[test]
fn eval_invalid_json_payload_exits_1() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, "not json at all").unwrap();

    lacuna()
        .args(eval_args(path.to_str().unwrap()))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid JSON"));
}

// ──────────────────────────────────────────────
// 5. Explore subcommand
// ──────────────────────────────────────────────

#[test]
fn explore_answers_until_completed() {
    lacuna()
        .args(["explore", KAFKA, "--program", KAFKA_PROGRAM])
        .write_stdin("aws\nyes\nDedicatedCluster\nManual\n6\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("What is the cloudProvider"))
        .stdout(predicate::str::contains("completed: demo.config.Deployment"))
        .stdout(predicate::str::contains("\"cloudProvider\": \"AWS\""));
}

#[test]
fn explore_stops_on_end_of_input_and_saves_payload() {
    let tmp = TempDir::new().unwrap();
    let saved = tmp.path().join("partial.json");

    lacuna()
        .args(["explore", KAFKA, "--program", KAFKA_PROGRAM, "--save"])
        .arg(&saved)
        .write_stdin("GCP\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("stopped with 1 open question(s)"));

    let payload: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(payload["the customer request"]["cloudProvider"], "GCP");
}

#[test]
fn explore_json_reports_status() {
    let output = lacuna()
        .args([
            "explore",
            KAFKA,
            "--program",
            KAFKA_PROGRAM,
            "--payload",
            "crates/cli/tests/fixtures/kafka_missing_nodes.json",
            "--output",
            "json",
            "--quiet",
        ])
        .write_stdin("7\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let json_start = stdout.find("{\n").unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["outcome"]["value"]["minNumberOfNodes"], 7);
}

#[test]
fn explore_round_limit_exits_1() {
    lacuna()
        .args([
            "explore",
            KAFKA,
            "--program",
            KAFKA_PROGRAM,
            "--max-rounds",
            "1",
        ])
        .write_stdin("AWS\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no completion after 1 rounds"));
}

// ──────────────────────────────────────────────
// 6. Configuration and global flags
// ──────────────────────────────────────────────

#[test]
fn config_file_supplies_program_and_locale() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("lacuna.toml");
    fs::write(
        &config,
        format!(
            "program = \"{}\"\nlocale = \"fr\"\n",
            workspace_root().join(KAFKA_PROGRAM).display()
        ),
    )
    .unwrap();

    lacuna()
        .args([
            "eval",
            KAFKA,
            "--payload",
            "crates/cli/tests/fixtures/kafka_missing_nodes.json",
            "--rich",
            "--config",
        ])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Quel est le minNumberOfNodes"));
}

#[test]
fn invalid_config_exits_1() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("lacuna.toml");
    fs::write(&config, "programme = 3\n").unwrap();

    lacuna()
        .args(["validate", KAFKA_PROGRAM, "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not parse"));
}

#[test]
fn quiet_suppresses_headers() {
    lacuna()
        .args(eval_args("crates/cli/tests/fixtures/kafka_complete.json"))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("completed:").not())
        .stdout(predicate::str::contains("\"dedicated\": true"));
}

#[test]
fn json_errors_are_objects() {
    lacuna()
        .args(eval_args("nonexistent_payload.json"))
        .args(["--output", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("{\"error\":"));
}
