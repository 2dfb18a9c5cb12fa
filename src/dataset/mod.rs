//! Dataset inspection components
//!
//! Each component borrows the configuration section it needs at
//! construction and reads the dataset tree synchronously:
//! - `ImageCounter` counts images in one class folder
//! - `StatisticsCollector` aggregates counts per subset and class
//! - `StructureValidator` reports missing folders and suspicious counts
//! - `ClassWeightCalculator` derives inverse-frequency class weights
//! - `ImagePropertySampler` reads headers of a bounded image sample

mod counter;
mod sampler;
mod statistics;
mod validator;
mod weights;

pub use counter::ImageCounter;
pub use sampler::{color_mode_name, format_name, ImagePropertySampler};
pub use statistics::StatisticsCollector;
pub use validator::StructureValidator;
pub use weights::ClassWeightCalculator;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the dataset tree
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type DatasetResult<T> = Result<T, DatasetError>;

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}
