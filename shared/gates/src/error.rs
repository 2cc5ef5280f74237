use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("no validation data found at {validation_dir} and no val_split ratio provided in config")]
    Unsatisfiable { validation_dir: PathBuf },

    #[error("dataset configuration file not found: {0}")]
    MissingDataYaml(PathBuf),

    #[error("no training images to split in {0}")]
    NoTrainingImages(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
