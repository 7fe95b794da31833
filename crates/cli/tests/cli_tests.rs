// End-to-end tests of the simrecon binary: exit codes and the --json contract.
//
// Run with: cargo test -p simrecon-cli --test cli_tests

use std::path::PathBuf;
use std::process::{Command, Output};

fn simrecon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_simrecon"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("SIMRECON_CONFIG");
    cmd
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run(args: &[&str]) -> Output {
    simrecon().args(args).output().expect("run simrecon")
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\nstdout:\n{stdout}"))
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ===========================================================================
// simrecon extract
// ===========================================================================

#[test]
fn extract_writes_canonical_csvs_and_meta() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reference");
    let output = run(&["extract", "--document", &fixture("geneve10.tex"), "--out-dir", out.to_str().unwrap(), "--json"]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    for name in ["time_series.csv", "spatial_snapshot_1.csv", "spatial_snapshot_2.csv", "extract_meta.json"] {
        assert!(out.join(name).exists(), "{name} not written");
    }
    let csv = std::fs::read_to_string(out.join("time_series.csv")).unwrap();
    assert!(csv.starts_with("# time series\n# source: "));
    assert!(csv.contains("2.400000e2,5.194141e3,"));

    let meta = stdout_json(&output);
    assert_eq!(meta["time_series_records"], 5);
    assert_eq!(meta["time_series_file"], "time_series.csv");
    assert_eq!(meta["snapshots"].as_array().unwrap().len(), 2);
    assert_eq!(meta["report"]["duplicates"], 1);
}

#[test]
fn extract_missing_document() {
    let output = run(&["extract", "--document", "no_such.tex"]);
    assert_eq!(code(&output), 3);
    assert!(stderr(&output).contains("not found"));
}

// ===========================================================================
// simrecon validate
// ===========================================================================

#[test]
fn validate_document_reference_passes() {
    let output = run(&["validate", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation.csv"), "--json"]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    let report = stdout_json(&output);
    assert_eq!(report["outcome"]["status"], "compared");
    assert_eq!(report["outcome"]["verdict"]["passed"], true);
    assert_eq!(report["meta"]["schema"], "time_series");
    assert_eq!(report["reference"]["records"].as_array().unwrap().len(), 5);
}

#[test]
fn validate_failure_exits_one_and_names_quantity() {
    let output = run(&["validate", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation_drifted.csv")]);
    assert_eq!(code(&output), 1);
    assert!(stderr(&output).contains("validation failed: total_energy"));
}

#[test]
fn validate_disjoint_times_cannot_compare() {
    let output = run(&["validate", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation_late.csv")]);
    assert_eq!(code(&output), 4);
    assert!(stderr(&output).contains("cannot compare"));
}

#[test]
fn validate_missing_simulation() {
    let output = run(&["validate", "--reference", &fixture("geneve10.tex"), "--simulation", "missing.csv"]);
    assert_eq!(code(&output), 3);
}

#[test]
fn validate_bad_config_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("simrecon.toml");
    std::fs::write(&config, "[validation]\nquantities = [\"density\"]\n").unwrap();
    let output = run(&[
        "validate", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation.csv"),
        "--config", config.to_str().unwrap(),
    ]);
    assert_eq!(code(&output), 5);
}

#[test]
fn validate_snapshot_out_of_range_is_usage_error() {
    let output = run(&[
        "validate", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation.csv"),
        "--schema", "spatial", "--snapshot", "3",
    ]);
    assert_eq!(code(&output), 2);
}

#[test]
fn validate_against_extracted_csv() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reference");
    let output = run(&["extract", "--document", &fixture("geneve10.tex"), "--out-dir", out.to_str().unwrap()]);
    assert_eq!(code(&output), 0);

    let report_path = dir.path().join("report.json");
    let output = run(&[
        "validate", "--reference", out.join("time_series.csv").to_str().unwrap(),
        "--simulation", &fixture("simulation.csv"), "--output", report_path.to_str().unwrap(),
    ]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["outcome"]["verdict"]["summary"]["total"], 4);
}

#[test]
fn validate_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("no_such_dir").join("report.json");
    let output = run(&[
        "validate", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation.csv"),
        "--output", report_path.to_str().unwrap(),
    ]);
    assert_eq!(code(&output), 6);
}

// ===========================================================================
// simrecon check
// ===========================================================================

#[test]
fn check_reports_energy_error_at_240() {
    let output = run(&[
        "check", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation.csv"),
        "--upper-bound", "300", "--json",
    ]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    let outcome = stdout_json(&output);
    assert_eq!(outcome["status"], "passed");
    let rows = outcome["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    let at_240 = rows.iter().find(|r| r["key"] == 240.0).unwrap();
    let energy = at_240["cells"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["quantity"] == "total_energy")
        .unwrap();
    let err = energy["relative_error"].as_f64().unwrap();
    assert!((err - 0.0011).abs() < 1e-4, "relative error {err}");
}

#[test]
fn check_default_window_ignores_late_drift() {
    let output = run(&["check", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation_drifted.csv")]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
}

#[test]
fn check_drift_fails_with_full_window() {
    let output = run(&[
        "check", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation_drifted.csv"),
        "--upper-bound", "300",
    ]);
    assert_eq!(code(&output), 1);
    assert!(stderr(&output).contains("regression check failed"));
}

#[test]
fn check_tolerance_override() {
    let output = run(&[
        "check", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation_drifted.csv"),
        "--upper-bound", "300", "--tolerances", "0.5,0.5,0.5,0.5",
    ]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
}

#[test]
fn check_wrong_tolerance_count() {
    let output = run(&[
        "check", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation.csv"),
        "--tolerances", "0.1,0.1",
    ]);
    assert_eq!(code(&output), 2);
}

#[test]
fn check_no_matches_cannot_compare() {
    let output = run(&["check", "--reference", &fixture("geneve10.tex"), "--simulation", &fixture("simulation_late.csv")]);
    assert_eq!(code(&output), 4);
}
