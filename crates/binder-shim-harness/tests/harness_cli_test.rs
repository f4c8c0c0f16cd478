//! Integration test: the harness CLI end to end.
//!
//! Run: cargo test -p binder-shim-harness --test harness_cli_test

use std::path::PathBuf;
use std::process::Command;

use binder_shim_harness::validate_log_line;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "binder-shim-harness-{name}-{}",
        std::process::id()
    ));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn harness() -> Command {
    Command::new(env!("CARGO_BIN_EXE_binder-shim-harness"))
}

#[test]
fn render_writes_headers_and_index() {
    let dir = scratch_dir("render");
    let index_path = dir.join("index.json");

    let output = harness()
        .arg("render")
        .arg("--out")
        .arg(&dir)
        .arg("--index")
        .arg(&index_path)
        .output()
        .expect("harness render should execute");
    assert!(output.status.success(), "{output:?}");

    let shim = std::fs::read_to_string(dir.join("types_workaround.h")).unwrap();
    assert!(shim.contains("#ifndef _SIZE_T_DEFINED"));
    assert!(dir.join("wrapper.h").exists());

    let index: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&index_path).unwrap()).unwrap();
    let artifacts = index["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 2);
    for artifact in artifacts {
        assert_eq!(artifact["sha256"].as_str().unwrap().len(), 64);
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn resolve_prints_declaration_set() {
    let output = harness()
        .args(["resolve", "--host", "windows", "--target", "armv7-linux-androideabi"])
        .output()
        .expect("harness resolve should execute");
    assert!(output.status.success(), "{output:?}");

    let set: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(set["target"], "armv7");
    let size_t = set["declarations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["definition"]["name"] == "size_t")
        .unwrap();
    assert_eq!(size_t["origin"], "shim");
    assert_eq!(size_t["definition"]["c_type"], "unsigned int");
}

#[test]
fn resolve_unknown_target_fails() {
    let output = harness()
        .args(["resolve", "--host", "windows", "--target", "riscv64-linux-android"])
        .output()
        .expect("harness resolve should execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("size_t"), "{stderr}");
    assert!(stderr.contains("unresolved_symbol"), "{stderr}");
}

#[test]
fn matrix_report_and_log_validate() {
    let dir = scratch_dir("matrix");
    let report_path = dir.join("matrix.json");
    let log_path = dir.join("matrix.jsonl");

    let output = harness()
        .arg("matrix")
        .arg("--output")
        .arg(&report_path)
        .arg("--log")
        .arg(&log_path)
        .output()
        .expect("harness matrix should execute");
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["total_profiles"], 12);
    assert_eq!(report["summary"]["failed"], 0);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 13);
    for (i, line) in lines.iter().enumerate() {
        let entry = validate_log_line(line, i + 1).unwrap();
        assert!(entry.trace_id.starts_with("matrix::"));
    }

    let validated = harness()
        .arg("validate-log")
        .arg("--log")
        .arg(&log_path)
        .output()
        .expect("harness validate-log should execute");
    assert!(validated.status.success(), "{validated:?}");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn validate_log_rejects_bad_lines() {
    let dir = scratch_dir("badlog");
    let log_path = dir.join("bad.jsonl");
    std::fs::write(&log_path, "{\"timestamp\":\"t\",\"level\":\"info\"}\n").unwrap();

    let output = harness()
        .arg("validate-log")
        .arg("--log")
        .arg(&log_path)
        .output()
        .expect("harness validate-log should execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("trace_id"), "{stderr}");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn plan_writes_plan_and_logs_readiness() {
    let dir = scratch_dir("plan");

    let output = harness()
        .arg("plan")
        .arg("--out")
        .arg(&dir)
        .args(["--host", "windows", "--target", "x86_64-linux-android", "--api-level", "31"])
        .output()
        .expect("harness plan should execute");
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().unwrap();
    let entry = validate_log_line(last, 1).unwrap();
    assert_eq!(entry.event, "plan_ready");
    assert_eq!(entry.target.as_deref(), Some("x86_64"));

    let plan: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("plan.json")).unwrap()).unwrap();
    assert_eq!(plan["clang_target"], "x86_64-linux-android31");
    assert!(dir.join("types_workaround.h").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn plan_aborts_before_writing_plan_for_unknown_target() {
    let dir = scratch_dir("plan-abort");

    let output = harness()
        .arg("plan")
        .arg("--out")
        .arg(&dir)
        .args(["--host", "windows", "--target", "mips-linux-android"])
        .output()
        .expect("harness plan should execute");
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let entry = validate_log_line(stdout.lines().last().unwrap(), 1).unwrap();
    assert_eq!(entry.event, "plan_aborted");
    assert_eq!(entry.symbol.as_deref(), Some("size_t"));
    assert!(!dir.join("plan.json").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}
