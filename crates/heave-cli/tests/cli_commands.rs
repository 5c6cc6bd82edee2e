//! Integration tests for the heave CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "#Time\tBody Pos\tBody vel (heave)\tforce (heave)";

fn heave() -> Command {
    Command::cargo_bin("heave").unwrap()
}

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/sphere_decay")
        .join(name)
}

fn trace_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .split('\n')
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// decay
// ---------------------------------------------------------------------------

#[test]
fn decay_reference_run_writes_full_trace() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("outfile").join("py_out.txt");

    heave()
        .args(["decay", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2667 samples"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.ends_with('\n'));
    let lines = trace_lines(&out);
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines.len(), 1 + 2667);
    assert_eq!(lines[1], "0.0\t-1.0");
    let last_time: f64 = lines[2667].split('\t').next().unwrap().parse().unwrap();
    assert_eq!(last_time, 2666.0 * 0.015);
}

#[test]
fn decay_default_output_is_relative_to_working_dir() {
    let dir = TempDir::new().unwrap();
    heave()
        .current_dir(dir.path())
        .args(["decay", "--end-time", "0.03"])
        .assert()
        .success();
    let lines = trace_lines(&dir.path().join("outfile/py_out.txt"));
    assert_eq!(lines.len(), 1 + 3);
}

#[test]
fn decay_full_columns() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("full.txt");
    heave()
        .args(["decay", "--end-time", "0.3", "--columns", "full", "--output"])
        .arg(&out)
        .assert()
        .success();

    let lines = trace_lines(&out);
    assert_eq!(lines[1], "0.0\t-1.0\t0.0\t0.0");
    for line in &lines[1..] {
        assert_eq!(line.split('\t').count(), 4);
    }
}

#[test]
fn decay_table_format() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("table.txt");
    heave()
        .args(["decay", "--end-time", "0.03", "--format", "table", "--output"])
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Time (s)"));
    assert_eq!(lines[1], format!("{:<10}{:>16}", "0.00", "-1.0000"));
    assert_eq!(lines.len(), 4);
}

#[test]
fn decay_profile_writes_duration() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("run").join("trace.txt");
    heave()
        .args(["decay", "--end-time", "1", "--profile", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("duration"));

    let ms = fs::read_to_string(dir.path().join("run/duration_ms.txt")).unwrap();
    assert!(ms.trim().parse::<u64>().is_ok());
}

#[test]
fn decay_with_hydro_floats() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("hydro.txt");
    heave()
        .args(["decay", "--end-time", "20", "--hydro"])
        .arg(demo("sphere.json"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let lines = trace_lines(&out);
    let heave: Vec<f64> = lines[1..]
        .iter()
        .map(|l| l.split('\t').nth(1).unwrap().parse().unwrap())
        .collect();
    assert_eq!(heave[0], -1.0);
    let max = heave.iter().copied().fold(f64::MIN, f64::max);
    let min = heave.iter().copied().fold(f64::MAX, f64::min);
    assert!(max > 0.0 && max < 1.0, "max heave {max}");
    assert!(min >= -1.0 - 1e-6, "min heave {min}");
}

#[test]
fn decay_with_regular_wave_and_fixed_step() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("wave.txt");
    heave()
        .args([
            "decay",
            "--end-time",
            "5",
            "--wave-amplitude",
            "1.0",
            "--wave-omega",
            "1.2",
            "--convolution",
            "fixed-step",
            "--columns",
            "full",
            "--hydro",
        ])
        .arg(demo("sphere.json"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let lines = trace_lines(&out);
    let force: f64 = lines[1].split('\t').nth(3).unwrap().parse().unwrap();
    assert!(force != 0.0);
}

#[test]
fn decay_wave_flags_need_hydro() {
    heave()
        .args(["decay", "--wave-amplitude", "1", "--wave-omega", "1"])
        .assert()
        .failure();
}

#[test]
fn decay_missing_hydro_file_fails() {
    let dir = TempDir::new().unwrap();
    heave()
        .args(["decay", "--hydro"])
        .arg(dir.path().join("nope.json"))
        .arg("--output")
        .arg(dir.path().join("out.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"))
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn decay_rejects_bad_timestep() {
    let dir = TempDir::new().unwrap();
    heave()
        .args(["decay", "--timestep", "0", "--output"])
        .arg(dir.path().join("out.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn unknown_log_level_fails() {
    heave()
        .args(["--log-level", "loud", "inspect"])
        .arg(demo("sphere.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log level"));
}

#[test]
fn info_logging_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    heave()
        .args(["--log-level", "info", "decay", "--end-time", "0.1", "--output"])
        .arg(dir.path().join("out.txt"))
        .assert()
        .success()
        .stderr(predicate::str::contains("body system initialized"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_two_body_scenario() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.json");
    fs::write(
        &scenario,
        r#"{
  "simulation": { "timestep": 0.01, "end_time": 0.1 },
  "bodies": [
    { "name": "float", "mass": 2.0, "position": [0, 0, 1] },
    { "name": "plate", "mass": 3.0, "velocity": [0, 0, 1] }
  ],
  "output": { "path": "out/two.txt" }
}"#,
    )
    .unwrap();

    heave()
        .current_dir(dir.path())
        .arg("run")
        .arg(&scenario)
        .assert()
        .success()
        .stdout(predicate::str::contains("float"))
        .stdout(predicate::str::contains("plate"));

    let lines = trace_lines(&dir.path().join("out/two.txt"));
    assert_eq!(lines[0], "#Time\tfloat pos\tplate pos");
    assert_eq!(lines[1], "0.0\t1.0\t0.0");
    assert_eq!(lines.len(), 1 + 11);
}

#[test]
fn run_demo_scenario_with_output_override() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("decay.txt");
    heave()
        .arg("run")
        .arg(demo("decay.json"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let lines = trace_lines(&out);
    assert_eq!(lines[0], "#Time\tbody1 pos\tbody1 vel (heave)\tbody1 force (heave)");
    assert_eq!(lines.len(), 1 + 2667);
}

#[test]
fn run_resolves_hydro_from_data_dir() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.json");
    fs::write(
        &scenario,
        r#"{
  "simulation": { "end_time": 0.15 },
  "bodies": [ { "name": "body1", "mass": 261800.0, "sphere": { "radius": 5.0 } } ],
  "hydro": { "file": "sphere.json" },
  "output": { "path": "out.txt" }
}"#,
    )
    .unwrap();

    heave()
        .current_dir(dir.path())
        .arg("run")
        .arg(&scenario)
        .assert()
        .failure()
        .stderr(predicate::str::contains("sphere.json"));

    heave()
        .current_dir(dir.path())
        .env("HEAVE_DATA_DIR", demo(""))
        .arg("run")
        .arg(&scenario)
        .assert()
        .success();
    assert_eq!(trace_lines(&dir.path().join("out.txt")).len(), 1 + 11);
}

#[test]
fn run_unknown_hydro_body_fails() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.json");
    fs::write(
        &scenario,
        format!(
            r#"{{ "bodies": [ {{ "name": "buoy", "mass": 1.0 }} ],
                 "hydro": {{ "file": "{}" }} }}"#,
            demo("sphere.json").display()
        ),
    )
    .unwrap();

    heave()
        .current_dir(dir.path())
        .arg("run")
        .arg(&scenario)
        .assert()
        .failure()
        .stderr(predicate::str::contains("buoy"));
}

#[test]
fn run_invalid_scenario_fails() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("bad.json");
    fs::write(&scenario, r#"{ "bodies": "none" }"#).unwrap();
    heave()
        .arg("run")
        .arg(&scenario)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid scenario"));
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_demo_file() {
    heave()
        .arg("inspect")
        .arg(demo("sphere.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("body1"))
        .stdout(predicate::str::contains("120"))
        .stdout(predicate::str::contains("30 frequencies"))
        .stdout(predicate::str::contains("1 bodies, 6 dofs"));
}

#[test]
fn inspect_missing_file_fails() {
    heave()
        .args(["inspect", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn inspect_rejects_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{ "simulation_parameters": { "rho": 1000.0, "g": 9.81, "w": [1.0] } }"#,
    )
    .unwrap();
    heave()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no body groups"));
}
