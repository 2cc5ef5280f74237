use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{dataset::validation_images_dir, DatasetError};

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub moved_images: usize,
    pub moved_labels: usize,
    pub remaining_train_images: usize,
}

/// Partitions a YOLO dataset's training images into a validation split.
pub trait Splitter {
    fn split(&self, data_path: &Path, ratio: f64) -> Result<SplitSummary, DatasetError>;
}

/// Moves a seeded random sample of `images/train` into `images/val`, taking
/// each image's label file from `labels/train` along with it.
#[derive(Debug, Clone)]
pub struct SeededSplitter {
    seed: u64,
}

impl SeededSplitter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for SeededSplitter {
    fn default() -> Self {
        Self::new(42)
    }
}

impl Splitter for SeededSplitter {
    fn split(&self, data_path: &Path, ratio: f64) -> Result<SplitSummary, DatasetError> {
        let train_images = data_path.join("images").join("train");
        let train_labels = data_path.join("labels").join("train");
        let val_images = validation_images_dir(data_path);
        let val_labels = data_path.join("labels").join("val");

        let mut images = list_images(&train_images)?;
        if images.is_empty() {
            return Err(DatasetError::NoTrainingImages(train_images));
        }
        // read_dir order is platform dependent
        images.sort();
        images.shuffle(&mut ChaCha8Rng::seed_from_u64(self.seed));

        let count = val_count(images.len(), ratio);
        std::fs::create_dir_all(&val_images).map_err(DatasetError::io(&val_images))?;

        let mut moved_labels = 0;
        for image in &images[..count] {
            let Some(file_name) = image.file_name() else {
                continue;
            };
            let target = val_images.join(file_name);
            std::fs::rename(image, &target).map_err(DatasetError::io(image))?;

            let Some(stem) = image.file_stem() else {
                continue;
            };
            let label_name = format!("{}.txt", stem.to_string_lossy());
            let label = train_labels.join(&label_name);
            if label.is_file() {
                std::fs::create_dir_all(&val_labels).map_err(DatasetError::io(&val_labels))?;
                let label_target = val_labels.join(&label_name);
                std::fs::rename(&label, &label_target).map_err(DatasetError::io(&label))?;
                moved_labels += 1;
            } else {
                debug!("No label for {}", image.display());
            }
        }

        let summary = SplitSummary {
            moved_images: count,
            moved_labels,
            remaining_train_images: images.len() - count,
        };
        info!(
            "Moved {} images ({} labels) to {}, {} left for training",
            summary.moved_images,
            summary.moved_labels,
            val_images.display(),
            summary.remaining_train_images
        );
        Ok(summary)
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(DatasetError::io(dir))? {
        let path = entry.map_err(DatasetError::io(dir))?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if path.is_file() && is_image {
            images.push(path);
        }
    }
    Ok(images)
}

/// At least one image goes to validation, and never more than there are.
fn val_count(total: usize, ratio: f64) -> usize {
    ((total as f64 * ratio).round() as usize).clamp(1, total)
}
