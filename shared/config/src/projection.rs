//! Remote view of a [`Config`].
//!
//! On the remote host everything lives under one base directory: the dataset
//! is mirrored to `data/`, the dataset yaml sits next to the config, and
//! checkpoints are written to `checkpoints/`. Projection only rewrites those
//! three locations; the run id and hyperparameters carry over so the remote
//! host trains (and resumes) the same run.

use std::path::PathBuf;

use crate::Config;

pub const REMOTE_DATA_DIR: &str = "data";
pub const REMOTE_CHECKPOINTS_DIR: &str = "checkpoints";
/// Name of the projected config inside the remote base path.
pub const REMOTE_CONFIG_FILENAME: &str = "config.json";

pub fn project(config: &Config) -> Config {
    let data_yaml_path = config
        .data_yaml_path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_yaml_path.clone());

    Config {
        data_path: PathBuf::from(REMOTE_DATA_DIR),
        data_yaml_path,
        checkpoints_dir: PathBuf::from(REMOTE_CHECKPOINTS_DIR),
        ..config.clone()
    }
}
