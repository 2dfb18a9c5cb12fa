//! Audit configuration support
//!
//! Loads configuration from `xray-audit.toml` in the working directory, or
//! from an explicit `--config` path. Every section is optional; missing
//! keys fall back to the defaults below.
//!
//! # Configuration Format
//!
//! ```toml
//! # xray-audit.toml
//!
//! [dataset]
//! path = "chest_xray DataSet"
//! classes = ["NORMAL", "PNEUMONIA"]
//! subsets = ["train", "test", "val"]
//!
//! [thresholds]
//! imbalance_ratio = 2.0
//! min_validation_images = 100
//!
//! [sampling]
//! sample_size = 100
//!
//! [output]
//! output_dir = "outputs"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "xray-audit.toml";

/// Top-level configuration passed explicitly into every component
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub preprocessing: PreprocessingConfig,

    #[serde(default)]
    pub augmentation: AugmentationConfig,

    #[serde(default)]
    pub project: ProjectInfo,
}

/// Dataset layout: where it lives and which folders/extensions to expect
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Root folder containing one folder per subset
    pub path: PathBuf,

    /// Class folder names, in class-index order
    pub classes: Vec<String>,

    /// Subset folder names, in reporting order
    pub subsets: Vec<String>,

    /// Extensions counted as images (without dot, compared case-insensitively)
    pub count_extensions: Vec<String>,

    /// Extensions opened by the sampler (without dot, compared exactly)
    pub sample_extensions: Vec<String>,

    /// Subset checked for class imbalance
    pub train_subset: String,

    /// Subset checked for a too-small size
    pub validation_subset: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chest_xray DataSet"),
            classes: vec!["NORMAL".into(), "PNEUMONIA".into()],
            subsets: vec!["train".into(), "test".into(), "val".into()],
            count_extensions: ["jpg", "jpeg", "png", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sample_extensions: vec!["jpg".into(), "jpeg".into()],
            train_subset: "train".into(),
            validation_subset: "val".into(),
        }
    }
}

impl DatasetConfig {
    /// Position of a class in the configured order
    pub fn class_index(&self, class_name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == class_name)
    }

    /// True when some counted extensions are never sampled
    pub fn has_sampling_gap(&self) -> bool {
        self.count_extensions.iter().any(|c| {
            !self
                .sample_extensions
                .iter()
                .any(|s| s.eq_ignore_ascii_case(c))
        })
    }
}

/// Limits used by the structure validator
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Class folders below this count get a "very few images" warning
    pub min_class_images: usize,

    /// Max/min class ratio above which the training subset is imbalanced
    pub imbalance_ratio: f64,

    /// Validation subsets below this total get a warning
    pub min_validation_images: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_class_images: 10,
            imbalance_ratio: 2.0,
            min_validation_images: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Images opened per subset/class pair
    pub sample_size: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { sample_size: 100 }
    }
}

/// Where artifacts and run logs go
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub report_file: String,
    pub chart_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            logs_dir: PathBuf::from("logs"),
            report_file: "dataset_analysis_report.json".into(),
            chart_file: "analyse_avancee_dataset.png".into(),
        }
    }
}

impl OutputConfig {
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.chart_file)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Target (width, height) recommended for model input
    pub image_size: (u32, u32),
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            image_size: (224, 224),
        }
    }
}

/// Augmentation parameters quoted in the ML recommendations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AugmentationConfig {
    /// Degrees
    pub rotation_range: f64,
    pub width_shift_range: f64,
    pub height_shift_range: f64,
    pub zoom_range: f64,
    pub horizontal_flip: bool,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            rotation_range: 20.0,
            width_shift_range: 0.2,
            height_shift_range: 0.2,
            zoom_range: 0.2,
            horizontal_flip: true,
        }
    }
}

/// Project metadata printed in the header and stored in reports
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            name: "Chest X-Ray Pneumonia Detection".into(),
            version: "1.0.0".into(),
            description: Some(
                "Automatic pneumonia detection on chest radiographs".into(),
            ),
            author: None,
            email: None,
            location: None,
        }
    }
}

impl AuditConfig {
    /// Check the invariants every component relies on
    pub fn validate(&self) -> Result<()> {
        let ds = &self.dataset;
        if ds.classes.is_empty() {
            bail!("dataset.classes must list at least one class");
        }
        if ds.subsets.is_empty() {
            bail!("dataset.subsets must list at least one subset");
        }
        if let Some(dup) = first_duplicate(&ds.classes) {
            bail!("dataset.classes contains '{}' more than once", dup);
        }
        if let Some(dup) = first_duplicate(&ds.subsets) {
            bail!("dataset.subsets contains '{}' more than once", dup);
        }
        if ds.count_extensions.is_empty() {
            bail!("dataset.count_extensions must not be empty");
        }
        if ds.sample_extensions.is_empty() {
            bail!("dataset.sample_extensions must not be empty");
        }
        if !(self.thresholds.imbalance_ratio >= 1.0) {
            bail!(
                "thresholds.imbalance_ratio must be >= 1.0 (got {})",
                self.thresholds.imbalance_ratio
            );
        }
        if self.sampling.sample_size == 0 {
            bail!("sampling.sample_size must be at least 1");
        }
        Ok(())
    }
}

fn first_duplicate(items: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .find(|item| !seen.insert(item.as_str()))
        .map(|s| s.as_str())
}

/// Load configuration.
///
/// With an explicit path the file must exist. Without one,
/// `xray-audit.toml` in `dir` is used when present, defaults otherwise.
/// A file that fails to parse or validate is always an error.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<(AuditConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("Config file not found: {}", p.display());
            }
            Some(p.to_path_buf())
        }
        None => Some(dir.join(CONFIG_FILE_NAME)).filter(|p| p.exists()),
    };

    let config = match &path {
        Some(p) => load_toml_config(p)?,
        None => AuditConfig::default(),
    };
    config
        .validate()
        .with_context(|| match &path {
            Some(p) => format!("Invalid configuration in {}", p.display()),
            None => "Invalid default configuration".to_string(),
        })?;

    Ok((config, path))
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> Result<AuditConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: AuditConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

/// Commented template written by `xray-audit init`
pub const DEFAULT_CONFIG_TOML: &str = r#"# xray-audit configuration
# Every key is optional; the values below are the defaults.

[dataset]
# Root folder containing one folder per subset
path = "chest_xray DataSet"
# Class folders, in class-index order (weights are keyed by this order)
classes = ["NORMAL", "PNEUMONIA"]
subsets = ["train", "test", "val"]
# Counted as images (case-insensitive)
count_extensions = ["jpg", "jpeg", "png", "bmp", "tiff"]
# Opened by the property sampler (case-sensitive)
sample_extensions = ["jpg", "jpeg"]
train_subset = "train"
validation_subset = "val"

[thresholds]
min_class_images = 10
imbalance_ratio = 2.0
min_validation_images = 100

[sampling]
sample_size = 100

[output]
output_dir = "outputs"
logs_dir = "logs"
report_file = "dataset_analysis_report.json"
chart_file = "analyse_avancee_dataset.png"

[preprocessing]
image_size = [224, 224]

[augmentation]
rotation_range = 20.0
width_shift_range = 0.2
height_shift_range = 0.2
zoom_range = 0.2
horizontal_flip = true

[project]
name = "Chest X-Ray Pneumonia Detection"
version = "1.0.0"
# author = ""
# email = ""
# location = ""
"#;

#[cfg(test)]
mod tests;
