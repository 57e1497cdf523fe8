use std::path::PathBuf;
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "harvestmap-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../assets")
}

#[test]
fn cli_list_metrics_writes_output() {
    let exe = env!("CARGO_BIN_EXE_harvestmap");
    let output_path = temp_path("metrics");
    let status = Command::new(exe)
        .args(["--list-metrics", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available metrics"));
    assert!(content.contains("deer-total"));
}

#[test]
fn cli_list_years_newest_first() {
    let exe = env!("CARGO_BIN_EXE_harvestmap");
    let output = Command::new(exe)
        .arg("--data-dir")
        .arg(sample_dir())
        .arg("--list-years")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let years: Vec<&str> = stdout.lines().skip(1).map(str::trim).collect();
    assert_eq!(years, vec!["2024", "2023", "2022"]);
}

#[test]
fn cli_writes_geojson_layer() {
    let exe = env!("CARGO_BIN_EXE_harvestmap");
    let output_path = temp_path("layer");
    let status = Command::new(exe)
        .arg("--data-dir")
        .arg(sample_dir())
        .args(["--metric", "moose", "--year", "2024", "--report", "geojson", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let layer: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let features = layer["features"].as_array().expect("features");
    assert_eq!(features.len(), 6);
    assert_eq!(
        features[1]["properties"]["harvest"]["tooltip"],
        "WMU 12: 28 moose harvested"
    );
}

#[test]
fn cli_json_report_includes_trend() {
    let exe = env!("CARGO_BIN_EXE_harvestmap");
    let output = Command::new(exe)
        .arg("--data-dir")
        .arg(sample_dir())
        .args(["--per-hunter", "--trend", "65", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["view"]["per_hunter"], true);
    assert_eq!(report["trend"]["y_label"], "Per Hunter");
    assert_eq!(report["trend"]["points"].as_array().map(Vec::len), Some(3));
}

#[test]
fn cli_fails_when_tables_are_missing() {
    let exe = env!("CARGO_BIN_EXE_harvestmap");
    let output = Command::new(exe)
        .arg("--data-dir")
        .arg(temp_path("missing"))
        .args(["--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load harvest data"));
}
