use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ConfigError;

pub(crate) const DEFAULT_CHECKPOINTS_DIR: &str = "checkpoints";
pub(crate) const DEFAULT_EPOCHS: u32 = 100;
pub(crate) const DEFAULT_BATCH_SIZE: u32 = 20;
pub(crate) const DEFAULT_IMG_SIZE: u32 = 416;
pub(crate) const DEFAULT_DEVICE: &str = "cuda";

/// The run specification document exactly as written on disk.
///
/// Every key is optional at this level so that missing required keys are
/// reported as [`ConfigError::MissingField`] instead of a bare parse error.
/// This is also the format a projected config is written in before it is
/// shipped to the remote host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoints_dir: Option<PathBuf>,

    /// Reusing an earlier run's id continues training from its checkpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_run_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epochs: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_yaml_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val_split: Option<f64>,
}

impl RunSpec {
    /// Parses a run specification. `source` is only used to name the
    /// offending file in errors.
    pub fn from_json(source: &Path, json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source_err| ConfigError::Parse {
            path: source.to_path_buf(),
            source: source_err,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_keys_are_ignored() {
        let spec = RunSpec::from_json(
            Path::new("spec.json"),
            r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "notes": "x" }"#,
        )
        .unwrap();
        assert_eq!(spec.data_path, Some(PathBuf::from("ds1")));
        assert_eq!(spec.epochs, None);
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = RunSpec::from_json(Path::new("broken.json"), "{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_absent_keys_are_not_serialized() {
        let spec = RunSpec {
            data_path: Some("data".into()),
            ..Default::default()
        };
        assert_eq!(spec.to_json().unwrap(), "{\n  \"data_path\": \"data\"\n}");
    }
}
