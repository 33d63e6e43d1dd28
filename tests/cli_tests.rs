use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

fn solarsizer() -> Command {
    let mut cmd = cargo_bin_cmd!("solarsizer");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_help_lists_commands() {
    solarsizer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("optimize"))
        .stdout(predicate::str::contains("solvers"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_solvers_json_lists_backends() {
    solarsizer()
        .args(["--json", "solvers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"solvers.list\""))
        .stdout(predicate::str::contains("\"highs\""))
        .stdout(predicate::str::contains("\"microlp\""));
}

#[test]
fn test_config_validate_defaults() {
    solarsizer()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_rejects_bad_price() {
    let file = temp_file("[parameters]\npeak_price = -0.5\n");
    solarsizer()
        .args(["config", "validate", "--config"])
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("peak_price"));
}

#[test]
fn test_config_show_json_includes_parameters() {
    let file = temp_file("[solver]\nprimary = \"microlp\"\n");
    solarsizer()
        .args(["--json", "config", "show", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"primary\":\"microlp\""))
        .stdout(predicate::str::contains("\"peak_consumption\":10.0"));
}

#[test]
fn test_config_init_writes_template_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("solarsizer.toml");

    solarsizer().args(["config", "init"]).arg(&path).assert().success();
    assert!(std::fs::read_to_string(&path).unwrap().contains("[solver]"));

    solarsizer()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_optimize_rejects_malformed_sizes() {
    solarsizer()
        .args(["optimize", "--sizes", "five=0.1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not an integer"));
}

#[test]
fn test_optimize_rejects_non_numeric_size_key_in_params() {
    let file = temp_file(r#"{"solar_installation_sizes": {"big": 0.1}}"#);
    solarsizer()
        .args(["optimize", "--params"])
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not an integer"));
}

#[test]
fn test_optimize_unknown_solvers_fail() {
    solarsizer()
        .args(["optimize", "--solver", "gurobi", "--fallback", "cbc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no solver available"));
}

#[cfg(any(feature = "highs", feature = "microlp"))]
#[test]
fn test_optimize_default_json() {
    solarsizer()
        .args(["--json", "optimize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"solved\""))
        .stdout(predicate::str::contains("\"selected_size\":12"));
}

#[cfg(any(feature = "highs", feature = "microlp"))]
#[test]
fn test_optimize_human_output() {
    solarsizer()
        .args(["optimize", "--peak-consumption", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Solar capacity"))
        .stdout(predicate::str::contains("12.00 kWh"))
        .stdout(predicate::str::contains("3.00 kWh"));
}

#[cfg(any(feature = "highs", feature = "microlp"))]
#[test]
fn test_optimize_infeasible_exits_with_two() {
    let file = temp_file(r#"{"solar_installation_sizes": {"150": 0.1}}"#);
    solarsizer()
        .args(["--json", "optimize", "--params"])
        .arg(file.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"status\":\"infeasible\""));
}
