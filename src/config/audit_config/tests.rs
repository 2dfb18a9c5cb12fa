use super::*;

#[test]
fn test_defaults_match_expected_layout() {
    let config = AuditConfig::default();
    assert_eq!(config.dataset.classes, vec!["NORMAL", "PNEUMONIA"]);
    assert_eq!(config.dataset.subsets, vec!["train", "test", "val"]);
    assert_eq!(config.dataset.sample_extensions, vec!["jpg", "jpeg"]);
    assert_eq!(config.thresholds.min_class_images, 10);
    assert_eq!(config.thresholds.min_validation_images, 100);
    assert!((config.thresholds.imbalance_ratio - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.sampling.sample_size, 100);
    assert_eq!(
        config.output.report_path(),
        PathBuf::from("outputs/dataset_analysis_report.json")
    );
    assert_eq!(
        config.output.chart_path(),
        PathBuf::from("outputs/analyse_avancee_dataset.png")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_template_parses_to_defaults() {
    let config: AuditConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
    let defaults = AuditConfig::default();
    assert_eq!(config.dataset.classes, defaults.dataset.classes);
    assert_eq!(config.dataset.count_extensions, defaults.dataset.count_extensions);
    assert_eq!(config.preprocessing.image_size, (224, 224));
    assert!(config.augmentation.horizontal_flip);
    assert!(config.project.author.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let toml_str = r#"
[dataset]
classes = ["COVID", "NORMAL", "PNEUMONIA"]

[sampling]
sample_size = 5
"#;
    let config: AuditConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.dataset.classes.len(), 3);
    assert_eq!(config.dataset.subsets, vec!["train", "test", "val"]);
    assert_eq!(config.sampling.sample_size, 5);
    assert_eq!(config.output.logs_dir, PathBuf::from("logs"));
}

#[test]
fn test_validate_rejects_duplicate_classes() {
    let mut config = AuditConfig::default();
    config.dataset.classes = vec!["NORMAL".into(), "NORMAL".into()];
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("NORMAL"), "unexpected error: {}", err);
}

#[test]
fn test_validate_rejects_empty_lists_and_bad_ratio() {
    let mut config = AuditConfig::default();
    config.dataset.subsets.clear();
    assert!(config.validate().is_err());

    let mut config = AuditConfig::default();
    config.thresholds.imbalance_ratio = 0.5;
    assert!(config.validate().is_err());

    let mut config = AuditConfig::default();
    config.thresholds.imbalance_ratio = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn test_class_index_and_sampling_gap() {
    let config = DatasetConfig::default();
    assert_eq!(config.class_index("PNEUMONIA"), Some(1));
    assert_eq!(config.class_index("COVID"), None);
    // png/bmp/tiff are counted but not sampled
    assert!(config.has_sampling_gap());

    let mut closed = DatasetConfig::default();
    closed.sample_extensions = closed.count_extensions.clone();
    assert!(!closed.has_sampling_gap());
}

#[test]
fn test_load_config_without_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (config, source) = load_config(None, dir.path()).unwrap();
    assert!(source.is_none());
    assert_eq!(config.sampling.sample_size, 100);
}

#[test]
fn test_load_config_reads_file_in_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[thresholds]\nmin_validation_images = 50\n",
    )
    .unwrap();
    let (config, source) = load_config(None, dir.path()).unwrap();
    assert_eq!(source, Some(dir.path().join(CONFIG_FILE_NAME)));
    assert_eq!(config.thresholds.min_validation_images, 50);
}

#[test]
fn test_load_config_missing_explicit_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(load_config(Some(&missing), dir.path()).is_err());
}

#[test]
fn test_load_config_invalid_toml_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "this is [[ not valid toml {{{}}}").unwrap();
    assert!(load_config(Some(&path), dir.path()).is_err());
}
