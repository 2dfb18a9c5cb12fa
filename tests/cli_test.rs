//! Binary-level tests
//!
//! Each test lays out a small dataset in a temp directory and runs the
//! binary with that directory as the working directory, so logs, outputs
//! and config lookups stay inside it.

use std::path::Path;
use std::process::{Command, Output};

fn xray_audit_bin() -> &'static str {
    env!("CARGO_BIN_EXE_xray-audit")
}

/// `data/train/NORMAL` with 5 images and `data/train/PNEUMONIA` with 20;
/// no `test` or `val` subset
fn setup_partial_dataset() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_images(dir.path(), "train", "NORMAL", 5);
    write_images(dir.path(), "train", "PNEUMONIA", 20);
    dir
}

fn write_images(root: &Path, subset: &str, class: &str, count: usize) {
    let class_dir = root.join("data").join(subset).join(class);
    std::fs::create_dir_all(&class_dir).unwrap();
    for i in 0..count {
        let img = image::GrayImage::from_pixel(16, 12 + i as u32, image::Luma([90]));
        img.save(class_dir.join(format!("scan_{:03}.jpg", i))).unwrap();
    }
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(xray_audit_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("XRAY_AUDIT_CONFIG")
        .output()
        .expect("Failed to run xray-audit")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("Invalid JSON ({}): {}", e, stdout))
}

#[test]
fn test_analyze_partial_dataset_json() {
    let dir = setup_partial_dataset();
    let output = run(dir.path(), &["data", "analyze", "--no-chart", "--format", "json"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = stdout_json(&output);
    let stats = &report["dataset_statistics"];
    assert_eq!(stats["train"]["NORMAL"], 5);
    assert_eq!(stats["train"]["PNEUMONIA"], 20);
    assert_eq!(stats["train"]["total"], 25);
    assert_eq!(stats["total_dataset"], 25);
    assert!(stats.get("test").is_none());
    assert!(stats.get("val").is_none());

    assert_eq!(report["image_properties"]["total_analyzed"], 25);
    assert_eq!(report["image_properties"]["unique_formats"], serde_json::json!(["JPEG"]));
    assert_eq!(report["image_properties"]["unique_color_modes"], serde_json::json!(["L"]));

    // persisted report matches stdout
    let saved = std::fs::read_to_string(dir.path().join("outputs/dataset_analysis_report.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["dataset_statistics"], report["dataset_statistics"]);
    assert!(!dir.path().join("outputs/analyse_avancee_dataset.png").exists());

    let logs: Vec<_> = std::fs::read_dir(dir.path().join("logs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("xray_audit_") && logs[0].ends_with(".log"));
}

#[test]
fn test_analyze_text_output_sections() {
    let dir = setup_partial_dataset();
    let output = run(dir.path(), &["data", "analyze", "--no-chart", "--no-emoji"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DATASET STRUCTURE VALIDATION"));
    assert!(stdout.contains("Missing folder: test"));
    assert!(stdout.contains("DATASET STATISTICS"));
    assert!(stdout.contains("NORMAL: 5 images (20.0%)"));
    assert!(stdout.contains("MACHINE LEARNING RECOMMENDATIONS"));
    assert!(stdout.contains("ANALYSIS SUMMARY"));
    assert!(!stdout.contains('✅'));
}

#[test]
fn test_validate_reports_missing_subsets() {
    let dir = setup_partial_dataset();
    let output = run(dir.path(), &["data", "validate", "--json"]);
    assert_eq!(output.status.code(), Some(0));

    let result = stdout_json(&output);
    assert_eq!(result["structure_valid"], false);
    assert_eq!(
        result["issues"],
        serde_json::json!(["Missing folder: test", "Missing folder: val"])
    );
    let warnings: Vec<String> = result["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w.as_str().unwrap().to_string())
        .collect();
    assert!(warnings.contains(&"Very few images in: train/NORMAL (5)".to_string()));
    assert!(warnings.contains(&"Class imbalance detected (ratio: 4.00:1)".to_string()));
}

#[test]
fn test_validate_fail_on_invalid_exits_1() {
    let dir = setup_partial_dataset();
    let output = run(dir.path(), &["data", "validate", "--fail-on-invalid"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--fail-on-invalid"));
}

#[test]
fn test_stats_json_only_present_subsets() {
    let dir = setup_partial_dataset();
    let output = run(dir.path(), &["data", "stats", "--json"]);
    assert_eq!(output.status.code(), Some(0));

    let stats = stdout_json(&output);
    let mut keys: Vec<&str> = stats.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["total_dataset", "train"]);
}

#[test]
fn test_weights_json() {
    let dir = setup_partial_dataset();
    let output = run(dir.path(), &["data", "weights", "--json"]);
    assert_eq!(output.status.code(), Some(0));

    let weights = stdout_json(&output);
    // 25 / (2 * 5) and 25 / (2 * 20)
    assert_eq!(weights["NORMAL"], 2.5);
    assert_eq!(weights["PNEUMONIA"], 0.625);
}

#[test]
fn test_sample_size_caps_each_folder() {
    let dir = setup_partial_dataset();
    let output = run(dir.path(), &["data", "sample", "--sample-size", "3", "--json"]);
    assert_eq!(output.status.code(), Some(0));

    let summary = stdout_json(&output);
    assert_eq!(summary["total_analyzed"], 6);
    assert_eq!(summary["avg_width"], 16.0);
}

#[test]
fn test_config_file_is_picked_up() {
    let dir = setup_partial_dataset();
    std::fs::write(
        dir.path().join("xray-audit.toml"),
        "[dataset]\npath = \"data\"\n\n[output]\noutput_dir = \"reports\"\n\n[project]\nname = \"Ward Scan Audit\"\n",
    )
    .unwrap();

    let output = run(dir.path(), &["analyze", "--no-chart", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));
    let report = stdout_json(&output);
    assert_eq!(report["metadata"]["project_name"], "Ward Scan Audit");
    assert!(dir.path().join("reports/dataset_analysis_report.json").exists());
}

#[test]
fn test_missing_explicit_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--config", "nope.toml", "stats"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Config file not found"));
}

#[test]
fn test_missing_dataset_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["nowhere", "validate", "--json"]);
    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    assert_eq!(result["structure_valid"], false);
    assert_eq!(result["issues"].as_array().unwrap().len(), 3);
}

#[test]
fn test_init_creates_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["init"]);
    assert_eq!(output.status.code(), Some(0));

    let path = dir.path().join("xray-audit.toml");
    let first = std::fs::read_to_string(&path).unwrap();
    assert!(first.contains("[dataset]"));
    // init writes no log file
    assert!(!dir.path().join("logs").exists());

    std::fs::write(&path, "# edited\n").unwrap();
    run(dir.path(), &["init"]);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");
}

#[test]
fn test_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("xray-audit "));
}
