//! Inverse-frequency class weights

use crate::models::{ClassWeights, DatasetStatistics};

pub struct ClassWeightCalculator<'a> {
    classes: &'a [String],
}

impl<'a> ClassWeightCalculator<'a> {
    pub fn new(classes: &'a [String]) -> Self {
        Self { classes }
    }

    /// `total / (num_classes * count)` per class index, 1.0 for empty classes.
    ///
    /// `total` is the sum of the per-class totals over present subsets.
    pub fn compute(&self, stats: &DatasetStatistics) -> ClassWeights {
        let class_counts: Vec<usize> = self
            .classes
            .iter()
            .map(|c| stats.class_total(c))
            .collect();
        let total_samples: usize = class_counts.iter().sum();
        let n_classes = self.classes.len() as f64;

        ClassWeights(
            class_counts
                .iter()
                .enumerate()
                .map(|(i, &count)| {
                    let weight = if count > 0 {
                        total_samples as f64 / (n_classes * count as f64)
                    } else {
                        1.0
                    };
                    (i, weight)
                })
                .collect(),
        )
    }
}
