//! Per-subset, per-class image counts

use super::{DatasetResult, ImageCounter};
use crate::config::DatasetConfig;
use crate::models::{DatasetStatistics, SubsetEntry, SubsetStatistics};
use std::path::Path;
use tracing::debug;

pub struct StatisticsCollector<'a> {
    config: &'a DatasetConfig,
    counter: ImageCounter<'a>,
}

impl<'a> StatisticsCollector<'a> {
    pub fn new(config: &'a DatasetConfig) -> Self {
        Self {
            config,
            counter: ImageCounter::new(&config.count_extensions),
        }
    }

    /// Count every configured subset/class folder under `root`.
    ///
    /// Subsets whose folder is missing are recorded as `Absent`; a missing
    /// class folder inside a present subset counts as 0.
    pub fn collect(&self, root: &Path) -> DatasetResult<DatasetStatistics> {
        let mut entries = Vec::with_capacity(self.config.subsets.len());

        for subset in &self.config.subsets {
            let subset_path = root.join(subset);
            if !subset_path.exists() {
                debug!("Subset folder missing: {}", subset_path.display());
                entries.push((subset.clone(), SubsetEntry::Absent));
                continue;
            }

            let mut counts = Vec::with_capacity(self.config.classes.len());
            for class_name in &self.config.classes {
                let n = self.counter.count(&subset_path.join(class_name))?;
                counts.push((class_name.clone(), n));
            }
            let stats = SubsetStatistics::from_counts(counts);
            debug!("{}: {} images", subset, stats.total);
            entries.push((subset.clone(), SubsetEntry::Present(stats)));
        }

        Ok(DatasetStatistics::from_entries(entries))
    }
}
