use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::DatasetError;

/// Name the dataset yaml is staged under inside the data directory.
pub const STAGED_DATA_YAML: &str = "data.yaml";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitAction {
    /// Validation images are already present; leave the dataset alone.
    AlreadySplit,
    /// Move this fraction of the training images into the validation split.
    PerformSplit(f64),
    /// No validation data and no ratio to create it with.
    Unsatisfiable,
}

impl SplitAction {
    /// Turns [`SplitAction::Unsatisfiable`] into the fatal error it stands for.
    pub fn require_satisfiable(self, data_path: &Path) -> Result<Self, DatasetError> {
        match self {
            SplitAction::Unsatisfiable => Err(DatasetError::Unsatisfiable {
                validation_dir: validation_images_dir(data_path),
            }),
            action => Ok(action),
        }
    }
}

/// `data_path/images/val`
pub fn validation_images_dir(data_path: &Path) -> PathBuf {
    data_path.join("images").join("val")
}

/// Decides what has to happen to the dataset before training can start.
///
/// Existing validation data always wins over `val_split`; an empty
/// validation directory counts as no validation data.
pub fn ensure_ready(data_path: &Path, val_split: Option<f64>) -> SplitAction {
    let val_dir = validation_images_dir(data_path);
    if has_entries(&val_dir) {
        info!(
            "Validation split already exists at {}, skipping split",
            val_dir.display()
        );
        return SplitAction::AlreadySplit;
    }

    match val_split {
        Some(ratio) => {
            info!("Performing train/validation split with ratio: {}", ratio);
            SplitAction::PerformSplit(ratio)
        }
        None => SplitAction::Unsatisfiable,
    }
}

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Copies the dataset yaml into the data directory as `data.yaml`, so the
/// engine resolves the yaml's relative paths against the dataset root.
pub fn stage_data_yaml(data_yaml_path: &Path, data_path: &Path) -> Result<PathBuf, DatasetError> {
    if !data_yaml_path.is_file() {
        return Err(DatasetError::MissingDataYaml(data_yaml_path.to_path_buf()));
    }

    std::fs::create_dir_all(data_path).map_err(DatasetError::io(data_path))?;
    let staged = data_path.join(STAGED_DATA_YAML);
    // copying a file onto itself truncates it
    if is_same_file(data_yaml_path, &staged)? {
        debug!("{} is already staged", data_yaml_path.display());
        return Ok(staged);
    }
    std::fs::copy(data_yaml_path, &staged).map_err(DatasetError::io(&staged))?;
    info!("Copied {} to {}", data_yaml_path.display(), staged.display());
    Ok(staged)
}

/// Compares resolved paths, so `./ds/data.yaml`, `ds/../ds/data.yaml` and
/// symlinks all match the file they point at.
fn is_same_file(existing: &Path, candidate: &Path) -> Result<bool, DatasetError> {
    if !candidate.exists() {
        return Ok(false);
    }
    let existing = std::fs::canonicalize(existing).map_err(DatasetError::io(existing))?;
    let candidate = std::fs::canonicalize(candidate).map_err(DatasetError::io(candidate))?;
    Ok(existing == candidate)
}
