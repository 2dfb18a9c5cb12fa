//! Configuration module for xray-audit
//!
//! This module handles:
//! - Dataset layout (class and subset lists, extension sets)
//! - Validation thresholds
//! - Sampling, output and preprocessing settings
//! - Project metadata written into reports

mod audit_config;

pub use audit_config::{
    load_config,
    AugmentationConfig,
    AuditConfig,
    DatasetConfig,
    OutputConfig,
    PreprocessingConfig,
    ProjectInfo,
    SamplingConfig,
    ThresholdConfig,
    CONFIG_FILE_NAME,
    DEFAULT_CONFIG_TOML,
};
