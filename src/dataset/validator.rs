//! Dataset structure validation

use super::{DatasetResult, ImageCounter, StatisticsCollector};
use crate::config::{DatasetConfig, ThresholdConfig};
use crate::models::ValidationResult;
use std::path::Path;
use tracing::debug;

pub struct StructureValidator<'a> {
    dataset: &'a DatasetConfig,
    thresholds: &'a ThresholdConfig,
}

impl<'a> StructureValidator<'a> {
    pub fn new(dataset: &'a DatasetConfig, thresholds: &'a ThresholdConfig) -> Self {
        Self {
            dataset,
            thresholds,
        }
    }

    /// Check the subset/class grid under `root`.
    ///
    /// Missing folders are issues and make the structure invalid. Empty or
    /// sparse class folders, an imbalanced training subset and a small
    /// validation subset are warnings. Statistics are recomputed on each
    /// call.
    pub fn validate(&self, root: &Path) -> DatasetResult<ValidationResult> {
        let mut result = ValidationResult::default();
        let counter = ImageCounter::new(&self.dataset.count_extensions);

        for subset in &self.dataset.subsets {
            let subset_path = root.join(subset);
            if !subset_path.exists() {
                result.add_issue(format!("Missing folder: {}", subset));
                continue;
            }

            for class_name in &self.dataset.classes {
                let class_path = subset_path.join(class_name);
                if !class_path.exists() {
                    result.add_issue(format!("Missing class: {}/{}", subset, class_name));
                    continue;
                }

                let image_count = counter.count(&class_path)?;
                if image_count == 0 {
                    result
                        .warnings
                        .push(format!("No images in: {}/{}", subset, class_name));
                } else if image_count < self.thresholds.min_class_images {
                    result.warnings.push(format!(
                        "Very few images in: {}/{} ({})",
                        subset, class_name, image_count
                    ));
                }
            }
        }

        let stats = StatisticsCollector::new(self.dataset).collect(root)?;

        if let Some(train) = stats.subset(&self.dataset.train_subset) {
            let counts: Vec<usize> = self
                .dataset
                .classes
                .iter()
                .map(|c| train.count(c))
                .collect();
            let (min, max) = (
                counts.iter().copied().min().unwrap_or(0),
                counts.iter().copied().max().unwrap_or(0),
            );
            if counts.len() >= 2 && min > 0 {
                let ratio = max as f64 / min as f64;
                debug!("{} imbalance ratio: {:.3}", self.dataset.train_subset, ratio);
                if ratio > self.thresholds.imbalance_ratio {
                    result
                        .warnings
                        .push(format!("Class imbalance detected (ratio: {:.2}:1)", ratio));
                    result.recommendations.push(
                        "Consider rebalancing techniques (class weights, oversampling, undersampling)"
                            .to_string(),
                    );
                }
            }
        }

        if let Some(val) = stats.subset(&self.dataset.validation_subset) {
            if val.total < self.thresholds.min_validation_images {
                result
                    .warnings
                    .push(format!("Very small validation set ({} images)", val.total));
                result
                    .recommendations
                    .push("Consider redistributing the data between subsets".to_string());
            }
        }

        Ok(result)
    }
}
