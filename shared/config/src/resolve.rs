use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::info;

use crate::{
    run_spec::{
        DEFAULT_BATCH_SIZE, DEFAULT_CHECKPOINTS_DIR, DEFAULT_DEVICE, DEFAULT_EPOCHS,
        DEFAULT_IMG_SIZE,
    },
    ConfigError, ModelSize, RunId, RunSpec,
};

/// Directory holding the pretrained base weights, relative to the working dir.
pub const WEIGHTS_DIR: &str = "weights";

/// A fully resolved run configuration. Never mutated once built; derived
/// views (like the remote projection) are new values.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_model_path: PathBuf,
    pub model_name: String,
    pub model_size: ModelSize,
    pub checkpoints_dir: PathBuf,
    pub run_id: RunId,
    pub data_yaml_path: PathBuf,
    pub data_path: PathBuf,
    pub epochs: u32,
    pub batch_size: u32,
    pub device: String,
    pub val_split: Option<f64>,
    pub img_size: u32,
}

impl Config {
    /// `checkpoints_dir/run_id`
    pub fn run_dir(&self) -> PathBuf {
        self.checkpoints_dir.join(&self.run_id)
    }

    /// Writes this config back as a run specification that resolves to the
    /// same run id, so a host reading it continues this exact run.
    pub fn to_run_spec(&self) -> RunSpec {
        RunSpec {
            model_size: Some(self.model_size.as_str().to_string()),
            checkpoints_dir: Some(self.checkpoints_dir.clone()),
            checkpoint_run_id: Some(self.run_id.to_string()),
            epochs: Some(self.epochs),
            batch_size: Some(self.batch_size),
            img_size: Some(self.img_size),
            data_path: Some(self.data_path.clone()),
            data_yaml_path: Some(self.data_yaml_path.clone()),
            device: Some(self.device.clone()),
            val_split: self.val_split,
        }
    }
}

impl RunSpec {
    /// Validates the run spec, applies defaults and derives the run id.
    ///
    /// Pure: nothing is created on disk. `timestamp` only matters when the
    /// run spec carries no `checkpoint_run_id`.
    pub fn resolve(&self, source: &Path, timestamp: i64) -> Result<Config, ConfigError> {
        let data_path = self.data_path.clone().ok_or(ConfigError::MissingField {
            path: source.to_path_buf(),
            field: "data_path",
        })?;
        let data_yaml_path = self.data_yaml_path.clone().ok_or(ConfigError::MissingField {
            path: source.to_path_buf(),
            field: "data_yaml_path",
        })?;

        let model_size = match &self.model_size {
            Some(value) => value
                .parse::<ModelSize>()
                .map_err(|value| ConfigError::InvalidModelSize {
                    path: source.to_path_buf(),
                    value,
                })?,
            None => ModelSize::default(),
        };

        if let Some(val_split) = self.val_split {
            if !(val_split > 0.0 && val_split <= 1.0) {
                return Err(ConfigError::InvalidValSplit {
                    path: source.to_path_buf(),
                    value: val_split,
                });
            }
        }

        let epochs = self.epochs.unwrap_or(DEFAULT_EPOCHS);
        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        let img_size = self.img_size.unwrap_or(DEFAULT_IMG_SIZE);
        for (field, value) in [
            ("epochs", epochs),
            ("batch_size", batch_size),
            ("img_size", img_size),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroField {
                    path: source.to_path_buf(),
                    field,
                });
            }
        }

        // a blank id counts as "not supplied"; anything else is kept verbatim
        let supplied = self
            .checkpoint_run_id
            .as_deref()
            .filter(|id| !id.trim().is_empty());
        let run_id = match supplied {
            Some(id) => {
                let run_id = RunId::supplied(id).ok_or_else(|| ConfigError::InvalidRunId {
                    path: source.to_path_buf(),
                    value: id.to_string(),
                })?;
                info!("Resuming training from checkpoint run: {}", run_id);
                run_id
            }
            None => {
                let run_id = RunId::synthesize(
                    timestamp,
                    img_size,
                    model_size,
                    epochs,
                    batch_size,
                    &data_path.to_string_lossy(),
                );
                info!("Starting new training run: {}", run_id);
                run_id
            }
        };

        Ok(Config {
            base_model_path: Path::new(WEIGHTS_DIR).join(model_size.weights_file()),
            model_name: model_size.model_name().to_string(),
            model_size,
            checkpoints_dir: self
                .checkpoints_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKPOINTS_DIR)),
            run_id,
            data_yaml_path,
            data_path,
            epochs,
            batch_size,
            device: self
                .device
                .clone()
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
            val_split: self.val_split,
            img_size,
        })
    }
}

/// Reads and parses a run specification without touching anything else.
pub fn load_run_spec(path: &Path) -> Result<RunSpec, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    RunSpec::from_json(path, &json)
}

/// Creates `checkpoints_dir/run_id`. Succeeds if it already exists.
pub fn materialize(config: &Config) -> Result<(), ConfigError> {
    let run_dir = config.run_dir();
    std::fs::create_dir_all(&run_dir).map_err(|source| ConfigError::CreateRunDir {
        path: run_dir,
        source,
    })
}

/// Loads and validates the run specification at `path` without creating
/// anything, synthesizing a run id from the current time when none is supplied.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    load_run_spec(path)?.resolve(path, OffsetDateTime::now_utc().unix_timestamp())
}

/// Like [`load`], and also creates the run directory.
pub fn resolve(path: &Path) -> Result<Config, ConfigError> {
    resolve_at(path, OffsetDateTime::now_utc().unix_timestamp())
}

pub fn resolve_at(path: &Path, timestamp: i64) -> Result<Config, ConfigError> {
    let config = load_run_spec(path)?.resolve(path, timestamp)?;
    materialize(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SCENARIO: &str = r#"{
        "data_path": "ds1",
        "data_yaml_path": "ds1.yaml",
        "model_size": "small",
        "epochs": 50,
        "batch_size": 16,
        "img_size": 416
    }"#;

    fn spec(json: &str) -> RunSpec {
        RunSpec::from_json(Path::new("run.json"), json).unwrap()
    }

    fn write_spec(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("run.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_synthesized_run_id() {
        let config = spec(SCENARIO)
            .resolve(Path::new("run.json"), 1_700_000_000)
            .unwrap();
        assert_eq!(
            config.run_id.as_str(),
            "run_1700000000_416_small_50epochs_16batch_ds1"
        );
    }

    #[test]
    fn test_defaults() {
        let config = spec(r#"{ "data_path": "datasets/belt", "data_yaml_path": "belt.yaml" }"#)
            .resolve(Path::new("run.json"), 7)
            .unwrap();

        assert_eq!(config.model_size, ModelSize::Small);
        assert_eq!(config.model_name, "yolo11s-seg");
        assert_eq!(config.base_model_path, PathBuf::from("weights/yolo11s-seg.pt"));
        assert_eq!(config.checkpoints_dir, PathBuf::from("checkpoints"));
        assert_eq!(config.epochs, 100);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.img_size, 416);
        assert_eq!(config.device, "cuda");
        assert_eq!(config.val_split, None);
        assert_eq!(
            config.run_id.as_str(),
            "run_7_416_small_100epochs_20batch_datasets_belt"
        );
    }

    #[test]
    fn test_different_timestamps_give_different_ids() {
        let spec = spec(SCENARIO);
        let a = spec.resolve(Path::new("run.json"), 1_700_000_000).unwrap();
        let b = spec.resolve(Path::new("run.json"), 1_700_000_001).unwrap();
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn test_supplied_run_id_is_stable() {
        let spec = spec(r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoint_run_id": "run_abc" }"#);
        let a = spec.resolve(Path::new("run.json"), 1).unwrap();
        let b = spec.resolve(Path::new("run.json"), 999_999).unwrap();
        assert_eq!(a.run_id.as_str(), "run_abc");
        assert_eq!(a.run_id, b.run_id);
    }

    #[test]
    fn test_empty_run_id_counts_as_absent() {
        let config = spec(r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoint_run_id": "" }"#)
            .resolve(Path::new("run.json"), 5)
            .unwrap();
        assert!(config.run_id.as_str().starts_with("run_5_"));
    }

    #[test]
    fn test_whitespace_run_id_counts_as_absent() {
        let config = spec(r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoint_run_id": "  " }"#)
            .resolve(Path::new("run.json"), 5)
            .unwrap();
        assert!(config.run_id.as_str().starts_with("run_5_"));
    }

    #[test]
    fn test_supplied_run_id_is_kept_verbatim() {
        let config = spec(r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoint_run_id": " run_abc " }"#)
            .resolve(Path::new("run.json"), 5)
            .unwrap();
        assert_eq!(config.run_id.as_str(), " run_abc ");
    }

    #[test]
    fn test_load_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let checkpoints = dir.path().join("ckpt");
        let path = write_spec(
            &dir,
            &format!(
                r#"{{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoints_dir": {:?} }}"#,
                checkpoints
            ),
        );

        let config = load(&path).unwrap();
        assert_eq!(config.checkpoints_dir, checkpoints);
        assert!(!checkpoints.exists());
    }

    #[test]
    fn test_unsafe_run_id_rejected() {
        let err = spec(r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoint_run_id": "../escape" }"#)
            .resolve(Path::new("run.json"), 5)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRunId { .. }));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = spec(r#"{ "data_yaml_path": "ds1.yaml" }"#)
            .resolve(Path::new("run.json"), 0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "data_path", .. }));

        let err = spec(r#"{ "data_path": "ds1" }"#)
            .resolve(Path::new("run.json"), 0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "data_yaml_path", .. }));
        assert!(err.to_string().contains("run.json"));
    }

    #[test]
    fn test_unknown_model_size() {
        let err = spec(r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "model_size": "xl" }"#)
            .resolve(Path::new("run.json"), 0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidModelSize { value, .. } if value == "xl"));
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let err = spec(r#"{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "epochs": 0 }"#)
            .resolve(Path::new("run.json"), 0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroField { field: "epochs", .. }));
    }

    #[test]
    fn test_val_split_bounds() {
        for ok in ["0.2", "1.0"] {
            let json = format!(r#"{{ "data_path": "d", "data_yaml_path": "d.yaml", "val_split": {ok} }}"#);
            assert!(spec(&json).resolve(Path::new("run.json"), 0).is_ok());
        }
        for bad in ["0.0", "-0.5", "1.5"] {
            let json = format!(r#"{{ "data_path": "d", "data_yaml_path": "d.yaml", "val_split": {bad} }}"#);
            let err = spec(&json).resolve(Path::new("run.json"), 0).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValSplit { .. }));
        }
    }

    #[test]
    fn test_resolve_creates_run_dir() {
        let dir = TempDir::new().unwrap();
        let checkpoints = dir.path().join("ckpt");
        let path = write_spec(
            &dir,
            &format!(
                r#"{{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoints_dir": {:?}, "checkpoint_run_id": "run_abc" }}"#,
                checkpoints
            ),
        );

        let config = resolve_at(&path, 0).unwrap();
        assert!(checkpoints.join("run_abc").is_dir());

        // idempotent
        let again = resolve_at(&path, 0).unwrap();
        assert_eq!(config, again);
    }

    #[test]
    fn test_invalid_val_split_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let checkpoints = dir.path().join("ckpt");
        let path = write_spec(
            &dir,
            &format!(
                r#"{{ "data_path": "ds1", "data_yaml_path": "ds1.yaml", "checkpoints_dir": {:?}, "val_split": 1.5 }}"#,
                checkpoints
            ),
        );

        let err = resolve_at(&path, 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValSplit { .. }));
        assert!(!checkpoints.exists());
    }

    #[test]
    fn test_unreadable_spec_names_path() {
        let err = resolve_at(Path::new("does/not/exist.json"), 0).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[test]
    fn test_run_spec_round_trip_keeps_run_id() {
        let config = spec(SCENARIO).resolve(Path::new("run.json"), 42).unwrap();
        let reread = config
            .to_run_spec()
            .resolve(Path::new("config.json"), 43)
            .unwrap();
        assert_eq!(reread, config);
    }
}
