use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read run specification {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run specification {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("run specification {path} is missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("run specification {path}: unknown model_size {value:?} (expected one of nano, small, medium)")]
    InvalidModelSize { path: PathBuf, value: String },

    #[error("run specification {path}: val_split {value} must lie in (0, 1]")]
    InvalidValSplit { path: PathBuf, value: f64 },

    #[error("run specification {path}: `{field}` must be at least 1")]
    ZeroField { path: PathBuf, field: &'static str },

    #[error("run specification {path}: checkpoint_run_id {value:?} is not a valid directory name")]
    InvalidRunId { path: PathBuf, value: String },

    #[error("failed to create run directory {path}: {source}")]
    CreateRunDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
