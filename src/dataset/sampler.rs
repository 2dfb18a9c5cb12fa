//! Image property sampling
//!
//! Reads image headers only; pixel data is never decoded.

use super::{DatasetError, DatasetResult};
use crate::config::DatasetConfig;
use crate::models::ImageProperties;
use image::{ColorType, ImageDecoder, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub struct ImagePropertySampler<'a> {
    config: &'a DatasetConfig,
    sample_size: usize,
}

/// Properties of one image, recorded only once every field was read
struct SampledImage {
    dimensions: (u32, u32),
    file_size: u64,
    format: String,
    color_mode: String,
}

impl<'a> ImagePropertySampler<'a> {
    pub fn new(config: &'a DatasetConfig, sample_size: usize) -> Self {
        Self {
            config,
            sample_size,
        }
    }

    /// Sample up to `sample_size` images per present subset/class folder.
    ///
    /// Files failing to open or decode are logged and skipped.
    pub fn sample(&self, root: &Path) -> DatasetResult<ImageProperties> {
        self.sample_with_progress(root, |_| {})
    }

    /// Like [`sample`](Self::sample), calling `on_file` before each file is read
    pub fn sample_with_progress<F>(&self, root: &Path, mut on_file: F) -> DatasetResult<ImageProperties>
    where
        F: FnMut(&Path),
    {
        let mut properties = ImageProperties::default();

        for subset in &self.config.subsets {
            let subset_path = root.join(subset);
            if !subset_path.exists() {
                continue;
            }

            for class_name in &self.config.classes {
                let class_path = subset_path.join(class_name);
                if !class_path.exists() {
                    continue;
                }

                let files = self.sample_files(&class_path)?;
                debug!(
                    "Sampling {} files from {}/{}",
                    files.len(),
                    subset,
                    class_name
                );

                for file in files {
                    on_file(&file);
                    match read_properties(&file) {
                        Ok(img) => properties.push(
                            img.dimensions,
                            img.file_size,
                            img.format,
                            img.color_mode,
                        ),
                        Err(e) => warn!("Skipping {}: {}", file.display(), e),
                    }
                }
            }
        }

        Ok(properties)
    }

    /// Candidate files in `dir`: grouped by sampling extension in configured
    /// order, each group sorted by file name, truncated to `sample_size`
    fn sample_files(&self, dir: &Path) -> DatasetResult<Vec<PathBuf>> {
        let mut listing = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                DatasetError::io(path, source)
            })?;
            // follows symlinks, matching what the counter sees
            if entry.path().is_file() {
                listing.push(entry.into_path());
            }
        }

        let mut files = Vec::new();
        for ext in &self.config.sample_extensions {
            files.extend(
                listing
                    .iter()
                    .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ext.as_str()))
                    .cloned(),
            );
        }
        files.truncate(self.sample_size);
        Ok(files)
    }
}

/// Header-only read of one image; the file handle is dropped on return
fn read_properties(path: &Path) -> DatasetResult<SampledImage> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| DatasetError::io(path, e))?
        .len();

    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| DatasetError::io(path, e))?;
    let format = reader.format();
    let decoder = reader.into_decoder().map_err(|e| DatasetError::Image {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(SampledImage {
        dimensions: decoder.dimensions(),
        file_size,
        format: format.map(format_name).unwrap_or_else(|| "UNKNOWN".to_string()),
        color_mode: color_mode_name(decoder.color_type()),
    })
}

/// Upper-case format name, e.g. `JPEG`, `PNG`
pub fn format_name(format: ImageFormat) -> String {
    format!("{:?}", format).to_uppercase()
}

/// Short color mode name in the usual imaging-library notation
pub fn color_mode_name(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        other => return format!("{:?}", other),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::test_support::{touch_files, write_images};

    #[test]
    fn test_reads_dimensions_format_and_mode() {
        let dir = tempfile::tempdir().unwrap();
        write_images(dir.path(), "train", "NORMAL", 2);

        let config = DatasetConfig::default();
        let props = ImagePropertySampler::new(&config, 10)
            .sample(dir.path())
            .unwrap();

        assert_eq!(props.len(), 2);
        assert_eq!(props.dimensions, vec![(8, 6), (9, 6)]);
        assert_eq!(props.formats, vec!["JPEG", "JPEG"]);
        assert_eq!(props.color_modes, vec!["RGB", "RGB"]);
        let on_disk = std::fs::metadata(dir.path().join("train/NORMAL/img_0000.jpg"))
            .unwrap()
            .len();
        assert_eq!(props.file_sizes[0], on_disk);
    }

    #[test]
    fn test_sample_size_caps_each_folder() {
        let dir = tempfile::tempdir().unwrap();
        write_images(dir.path(), "train", "NORMAL", 5);
        write_images(dir.path(), "train", "PNEUMONIA", 2);
        write_images(dir.path(), "test", "NORMAL", 4);

        let config = DatasetConfig::default();
        let props = ImagePropertySampler::new(&config, 3)
            .sample(dir.path())
            .unwrap();

        // 3 + 2 + 3
        assert_eq!(props.len(), 8);
        assert_eq!(props.file_sizes.len(), 8);
        assert_eq!(props.formats.len(), 8);
        assert_eq!(props.color_modes.len(), 8);
        // first three by name from train/NORMAL
        assert_eq!(&props.dimensions[..3], &[(8, 6), (9, 6), (10, 6)]);
    }

    #[test]
    fn test_only_sampling_extensions_are_opened() {
        let dir = tempfile::tempdir().unwrap();
        write_images(dir.path(), "train", "NORMAL", 1);
        let png = image::GrayImage::from_pixel(4, 4, image::Luma([0]));
        png.save(dir.path().join("train/NORMAL/scan.png")).unwrap();
        // case-sensitive: upper-case JPG is not sampled
        std::fs::copy(
            dir.path().join("train/NORMAL/img_0000.jpg"),
            dir.path().join("train/NORMAL/upper.JPG"),
        )
        .unwrap();

        let config = DatasetConfig::default();
        let props = ImagePropertySampler::new(&config, 10)
            .sample(dir.path())
            .unwrap();
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_jpg_files_come_before_jpeg_files() {
        let dir = tempfile::tempdir().unwrap();
        let class_dir = dir.path().join("train/NORMAL");
        std::fs::create_dir_all(&class_dir).unwrap();
        image::RgbImage::new(2, 2).save_with_format(class_dir.join("a.jpeg"), ImageFormat::Jpeg).unwrap();
        image::RgbImage::new(3, 3).save_with_format(class_dir.join("b.jpg"), ImageFormat::Jpeg).unwrap();

        let config = DatasetConfig::default();
        let props = ImagePropertySampler::new(&config, 1)
            .sample(dir.path())
            .unwrap();
        assert_eq!(props.dimensions, vec![(3, 3)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_images_are_sampled() {
        let dir = tempfile::tempdir().unwrap();
        write_images(dir.path(), "test", "NORMAL", 1);
        let class_dir = dir.path().join("train/NORMAL");
        std::fs::create_dir_all(&class_dir).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("test/NORMAL/img_0000.jpg"),
            class_dir.join("link.jpg"),
        )
        .unwrap();

        let config = DatasetConfig::default();
        let counted = crate::dataset::ImageCounter::new(&config.count_extensions)
            .count(&class_dir)
            .unwrap();
        let props = ImagePropertySampler::new(&config, 10)
            .sample(dir.path())
            .unwrap();
        assert_eq!(counted, 1);
        // train/NORMAL/link.jpg and test/NORMAL/img_0000.jpg
        assert_eq!(props.len(), 2);
        assert_eq!(props.dimensions, vec![(8, 6), (8, 6)]);
    }

    #[test]
    fn test_corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_images(dir.path(), "val", "PNEUMONIA", 2);
        touch_files(dir.path(), "val", "PNEUMONIA", 1, "jpg");

        let config = DatasetConfig::default();
        let mut seen = 0;
        let props = ImagePropertySampler::new(&config, 10)
            .sample_with_progress(dir.path(), |_| seen += 1)
            .unwrap();
        assert_eq!(seen, 3);
        assert_eq!(props.len(), 2);
        assert_eq!(props.file_sizes.len(), 2);
    }

    #[test]
    fn test_missing_folders_sample_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatasetConfig::default();
        let props = ImagePropertySampler::new(&config, 10)
            .sample(dir.path())
            .unwrap();
        assert!(props.is_empty());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(color_mode_name(ColorType::L8), "L");
        assert_eq!(color_mode_name(ColorType::Rgba8), "RGBA");
        assert_eq!(format_name(ImageFormat::Png), "PNG");
        assert_eq!(format_name(ImageFormat::Jpeg), "JPEG");
    }
}
