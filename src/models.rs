//! Core data models for xray-audit
//!
//! These models carry the results of one analysis run from the dataset
//! components to the reporters. They are built once and never mutated
//! afterwards.

use crate::config::ProjectInfo;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Per-class image counts for one subset that exists on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubsetStatistics {
    /// Class name -> image count, in configured class order
    #[serde(flatten)]
    pub counts: IndexMap<String, usize>,
    pub total: usize,
}

impl SubsetStatistics {
    /// Build from ordered (class, count) pairs; `total` is derived
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let counts: IndexMap<String, usize> = counts.into_iter().collect();
        let total = counts.values().sum();
        Self { counts, total }
    }

    /// Count for a class, 0 if the class is unknown
    pub fn count(&self, class_name: &str) -> usize {
        self.counts.get(class_name).copied().unwrap_or(0)
    }

    /// Share of a class in this subset, in percent
    pub fn percentage(&self, class_name: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(class_name) as f64 / self.total as f64 * 100.0
    }
}

/// Whether a configured subset folder was found
#[derive(Debug, Clone, PartialEq)]
pub enum SubsetEntry {
    Present(SubsetStatistics),
    /// The subset folder does not exist (distinct from present-but-empty)
    Absent,
}

impl SubsetEntry {
    pub fn as_present(&self) -> Option<&SubsetStatistics> {
        match self {
            SubsetEntry::Present(stats) => Some(stats),
            SubsetEntry::Absent => None,
        }
    }
}

/// Image counts for every configured subset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetStatistics {
    /// Subset name -> entry, in configured subset order
    pub subsets: IndexMap<String, SubsetEntry>,
    pub total_dataset: usize,
}

impl DatasetStatistics {
    /// Build from ordered (subset, entry) pairs; `total_dataset` is derived
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, SubsetEntry)>,
    {
        let subsets: IndexMap<String, SubsetEntry> = entries.into_iter().collect();
        let total_dataset = subsets
            .values()
            .filter_map(SubsetEntry::as_present)
            .map(|s| s.total)
            .sum();
        Self {
            subsets,
            total_dataset,
        }
    }

    /// Statistics for a subset, `None` when absent or not configured
    pub fn subset(&self, name: &str) -> Option<&SubsetStatistics> {
        self.subsets.get(name).and_then(SubsetEntry::as_present)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.subset(name).is_some()
    }

    /// Present subsets in configured order
    pub fn present_subsets(&self) -> impl Iterator<Item = (&str, &SubsetStatistics)> {
        self.subsets
            .iter()
            .filter_map(|(name, entry)| entry.as_present().map(|s| (name.as_str(), s)))
    }

    /// Names of configured subsets whose folder was missing
    pub fn absent_subsets(&self) -> impl Iterator<Item = &str> {
        self.subsets
            .iter()
            .filter(|(_, entry)| matches!(entry, SubsetEntry::Absent))
            .map(|(name, _)| name.as_str())
    }

    /// Count of a class summed over present subsets
    pub fn class_total(&self, class_name: &str) -> usize {
        self.present_subsets().map(|(_, s)| s.count(class_name)).sum()
    }

    /// Majority class, minority class and their ratio over the whole dataset.
    ///
    /// `None` unless at least two classes are configured, the minority class
    /// has images and the majority is strictly larger.
    pub fn overall_imbalance<'a>(&self, classes: &'a [String]) -> Option<(&'a str, &'a str, f64)> {
        let totals: Vec<(&str, usize)> = classes
            .iter()
            .map(|c| (c.as_str(), self.class_total(c)))
            .collect();
        let majority = totals.iter().max_by_key(|(_, n)| *n)?;
        let minority = totals.iter().min_by_key(|(_, n)| *n)?;
        if classes.len() < 2 || minority.1 == 0 || majority.1 <= minority.1 {
            return None;
        }
        Some((majority.0, minority.0, majority.1 as f64 / minority.1 as f64))
    }
}

impl Serialize for DatasetStatistics {
    /// Absent subsets are omitted; `total_dataset` sits next to the subsets
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<_> = self.present_subsets().collect();
        let mut map = serializer.serialize_map(Some(present.len() + 1))?;
        for (name, stats) in present {
            map.serialize_entry(name, stats)?;
        }
        map.serialize_entry("total_dataset", &self.total_dataset)?;
        map.end()
    }
}

/// Outcome of a structure validation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub structure_valid: bool,
    /// Missing folders; any entry makes the structure invalid
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            structure_valid: true,
            issues: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn add_issue(&mut self, issue: String) {
        self.issues.push(issue);
        self.structure_valid = false;
    }
}

/// Inverse-frequency class weights keyed by class index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassWeights(pub BTreeMap<usize, f64>);

impl ClassWeights {
    pub fn get(&self, class_index: usize) -> Option<f64> {
        self.0.get(&class_index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pair each weight with its class name, using the same class order
    /// the weights were computed with
    pub fn named<'a>(&self, classes: &'a [String]) -> Vec<(&'a str, f64)> {
        classes
            .iter()
            .enumerate()
            .filter_map(|(i, name)| self.get(i).map(|w| (name.as_str(), w)))
            .collect()
    }
}

/// Properties of the sampled images, one entry per image at the same index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageProperties {
    pub dimensions: Vec<(u32, u32)>,
    pub file_sizes: Vec<u64>,
    pub formats: Vec<String>,
    pub color_modes: Vec<String>,
}

impl ImageProperties {
    /// Record one image; all four sequences grow together
    pub fn push(&mut self, dimensions: (u32, u32), file_size: u64, format: String, color_mode: String) {
        self.dimensions.push(dimensions);
        self.file_sizes.push(file_size);
        self.formats.push(format);
        self.color_modes.push(color_mode);
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.dimensions.iter().map(|(w, _)| *w as f64).collect()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.dimensions.iter().map(|(_, h)| *h as f64).collect()
    }

    /// Width / height per image; zero-height images are skipped
    pub fn aspect_ratios(&self) -> Vec<f64> {
        self.dimensions
            .iter()
            .filter(|(_, h)| *h > 0)
            .map(|(w, h)| *w as f64 / *h as f64)
            .collect()
    }

    pub fn file_sizes_mb(&self) -> Vec<f64> {
        self.file_sizes
            .iter()
            .map(|b| *b as f64 / BYTES_PER_MB)
            .collect()
    }

    /// Aggregate view stored in the JSON report
    pub fn summary(&self) -> ImagePropertySummary {
        ImagePropertySummary {
            total_analyzed: self.len(),
            avg_width: mean(&self.widths()),
            avg_height: mean(&self.heights()),
            avg_file_size_mb: mean(&self.file_sizes_mb()),
            unique_formats: unique(&self.formats),
            unique_color_modes: unique(&self.color_modes),
        }
    }

    /// Min/max/mean figures for the console summary, `None` when empty
    pub fn dimension_stats(&self) -> Option<DimensionStats> {
        if self.is_empty() {
            return None;
        }
        let widths = self.widths();
        let heights = self.heights();
        let ratios = self.aspect_ratios();
        let sizes = self.file_sizes_mb();
        Some(DimensionStats {
            width: Range::of(&widths),
            height: Range::of(&heights),
            aspect_mean: mean(&ratios),
            aspect_std: std_dev(&ratios),
            size_mb: Range::of(&sizes),
        })
    }

    /// Pearson correlations between width, height, aspect ratio and size (MB).
    ///
    /// Indices follow [`CORRELATION_LABELS`]. A constant column correlates
    /// as 0 with the others and 1 with itself.
    pub fn correlation_matrix(&self) -> [[f64; 4]; 4] {
        let n = self.dimensions.len().min(self.file_sizes.len());
        let columns: [Vec<f64>; 4] = [
            self.dimensions[..n].iter().map(|(w, _)| *w as f64).collect(),
            self.dimensions[..n].iter().map(|(_, h)| *h as f64).collect(),
            self.dimensions[..n]
                .iter()
                .map(|(w, h)| if *h > 0 { *w as f64 / *h as f64 } else { 0.0 })
                .collect(),
            self.file_sizes[..n]
                .iter()
                .map(|b| *b as f64 / BYTES_PER_MB)
                .collect(),
        ];
        let mut matrix = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                matrix[i][j] = if i == j {
                    1.0
                } else {
                    pearson(&columns[i], &columns[j])
                };
            }
        }
        matrix
    }
}

/// Axis labels for [`ImageProperties::correlation_matrix`]
pub const CORRELATION_LABELS: [&str; 4] = ["Width", "Height", "Aspect_Ratio", "File_Size_MB"];

/// Min, max and mean of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Range {
    fn of(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            min: if min.is_finite() { min } else { 0.0 },
            max: if max.is_finite() { max } else { 0.0 },
            mean: mean(values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionStats {
    pub width: Range,
    pub height: Range,
    pub aspect_mean: f64,
    pub aspect_std: f64,
    pub size_mb: Range,
}

/// Image property aggregates written to the report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImagePropertySummary {
    pub total_analyzed: usize,
    pub avg_width: f64,
    pub avg_height: f64,
    pub avg_file_size_mb: f64,
    pub unique_formats: Vec<String>,
    pub unique_color_modes: Vec<String>,
}

/// Report header
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub analysis_date: String,
    pub project_version: String,
    pub tool_version: String,
}

/// Fixed guidance shipped with every report
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecommendations {
    pub class_imbalance: String,
    pub validation_set: String,
    pub image_preprocessing: String,
    pub augmentation: String,
}

impl Default for ReportRecommendations {
    fn default() -> Self {
        Self {
            class_imbalance: "Severe imbalance detected - use class weights or resampling".into(),
            validation_set: "Very small validation set - consider redistribution".into(),
            image_preprocessing: "Standardize image dimensions and normalize pixel values".into(),
            augmentation: "Apply data augmentation to the minority class".into(),
        }
    }
}

/// The persisted JSON document of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub dataset_statistics: DatasetStatistics,
    pub image_properties: ImagePropertySummary,
    pub recommendations: ReportRecommendations,
}

impl AnalysisReport {
    pub fn new(
        project: &ProjectInfo,
        analysis_date: String,
        stats: &DatasetStatistics,
        properties: &ImageProperties,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                project_name: project.name.clone(),
                author: project.author.clone(),
                email: project.email.clone(),
                location: project.location.clone(),
                analysis_date,
                project_version: project.version.clone(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            dataset_statistics: stats.clone(),
            image_properties: properties.summary(),
            recommendations: ReportRecommendations::default(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let (mx, my) = (mean(&xs[..n]), mean(&ys[..n]));
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return 0.0;
    }
    cov / (vx.sqrt() * vy.sqrt())
}

/// Sorted distinct values
fn unique(values: &[String]) -> Vec<String> {
    values
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
