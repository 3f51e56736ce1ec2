use std::path::Path;
use std::process::{Command, Output};

fn run_fixlog(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fixlog"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to start fixlog")
}

fn lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect()
}

fn message(line: &str) -> &str {
    line.split_once(": ").map(|(_, m)| m).unwrap_or("")
}

fn assert_well_formed(lines: &[String]) {
    for line in lines {
        let (delta, _) = line
            .split_once(": ")
            .unwrap_or_else(|| panic!("malformed line {line:?}"));
        let digits = delta
            .strip_prefix('+')
            .unwrap_or_else(|| panic!("missing '+' in {line:?}"));
        assert!(digits.len() >= 4, "delta too narrow in {line:?}");
        assert!(digits.parse::<u64>().is_ok(), "bad delta in {line:?}");
    }
}

#[test]
fn test_short_run_logs_connection_and_fixes() {
    let output = run_fixlog(&[
        "--run-seconds",
        "1",
        "--interval-ms",
        "100",
        "--fastest-interval-ms",
        "50",
        "--tick-ms",
        "20",
    ]);
    assert!(output.status.success(), "fixlog exited with {:?}", output.status);

    let lines = lines(&output);
    assert_well_formed(&lines);
    let messages: Vec<&str> = lines.iter().map(|l| message(l)).collect();

    assert_eq!(messages[0], "Location services are available");
    assert_eq!(messages[1], "Connected");
    assert_eq!(messages[2], "Locations (starting with last known):");
    let fixes = messages[3..]
        .iter()
        .filter(|m| m.starts_with("Location[fused "))
        .count();
    assert!(fixes >= 3, "expected several fixes, got {fixes}");
}

#[test]
fn test_failed_connection_is_resolved() {
    let output = run_fixlog(&[
        "--run-seconds",
        "1",
        "--tick-ms",
        "20",
        "--fail-connect",
        "4",
        "--resolution-delay-ms",
        "100",
    ]);
    assert!(output.status.success());

    let lines = lines(&output);
    assert_well_formed(&lines);
    let messages: Vec<&str> = lines.iter().map(|l| message(l)).collect();
    assert_eq!(
        &messages[..5],
        &[
            "Location services are available",
            "Connection failed",
            "Trying to resolve the error...",
            "Resolution result code is: -1",
            "Connected",
        ]
    );
}

#[test]
fn test_unavailable_service_does_not_connect() {
    let output = run_fixlog(&["--run-seconds", "1", "--unavailable", "1"]);
    assert!(output.status.success());

    let lines = lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(message(&lines[0]), "Location services are not available");
}

#[test]
fn test_transcript_mirrors_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    let output = run_fixlog(&[
        "--run-seconds",
        "1",
        "--interval-ms",
        "200",
        "--fastest-interval-ms",
        "100",
        "--tick-ms",
        "20",
        "--transcript",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let stdout_lines = lines(&output);
    let records = read_records(&path);
    assert_eq!(records.len(), stdout_lines.len());
    for (i, (record, line)) in records.iter().zip(&stdout_lines).enumerate() {
        assert_eq!(record["sequence"].as_u64(), Some(i as u64 + 1));
        assert_eq!(record["message"].as_str(), Some(message(line)));
        let rendered = format!("+{:04}", record["delta_ms"].as_u64().unwrap());
        assert!(line.starts_with(&rendered));
    }
}

#[test]
fn test_invalid_request_fails() {
    let output = run_fixlog(&["--interval-ms", "100", "--fastest-interval-ms", "500"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fastest interval"));
}

#[test]
fn test_log_dir_gets_rolling_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_fixlog(&[
        "--run-seconds",
        "1",
        "--json-logs",
        "--log-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "fixlog exited with {:?}", output.status);

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        names.iter().any(|n| n.starts_with("fixlog.log")),
        "no rolling log file in {names:?}"
    );
}

fn read_records(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}
