use run_manager::commands::sync::{CommandSync, SyncAction};
use segtrain_sync::{CopyOptions, Endpoint, Transport, TransportError};
use std::{cell::Cell, path::Path};
use tempfile::TempDir;

/// Accepts every transfer without touching the filesystem.
#[derive(Default)]
struct NoopTransport {
    copies: Cell<usize>,
}

impl Transport for NoopTransport {
    fn ensure_remote_dir(&self, _host: &str, _path: &str) -> Result<(), TransportError> {
        Ok(())
    }

    fn copy_tree(
        &self,
        _src: &Endpoint,
        _dst: &Endpoint,
        _options: &CopyOptions,
    ) -> Result<(), TransportError> {
        self.copies.set(self.copies.get() + 1);
        Ok(())
    }
}

fn command(action: SyncAction, dir: &Path) -> CommandSync {
    let config = dir.join("run.json");
    std::fs::write(
        &config,
        format!(
            r#"{{ "data_path": "ds", "data_yaml_path": "ds.yaml", "checkpoints_dir": {:?} }}"#,
            dir.join("checkpoints")
        ),
    )
    .unwrap();
    CommandSync {
        action,
        config,
        remote: "me@gpu".to_string(),
        remote_path: "~/yolo-trainer".to_string(),
        workdir: dir.join("elsewhere"),
    }
}

fn entries(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_pull_leaves_no_run_directory_behind() {
    let dir = TempDir::new().unwrap();
    let command = command(SyncAction::Pull, dir.path());
    let transport = NoopTransport::default();

    let config = command.load_config().unwrap();
    command.run(&transport, &config).unwrap();

    // checkpoints_dir exists for the pulled runs, but no run dir was made up
    assert!(dir.path().join("checkpoints").is_dir());
    assert!(entries(&dir.path().join("checkpoints")).is_empty());
    assert_eq!(transport.copies.get(), 1);
}

#[test]
fn test_loading_config_for_push_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let command = command(SyncAction::Push, dir.path());

    let config = command.load_config().unwrap();

    assert!(config.run_id.as_str().starts_with("run_"));
    assert!(!dir.path().join("checkpoints").exists());
}

#[test]
fn test_unreadable_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut command = command(SyncAction::Push, dir.path());
    command.config = dir.path().join("missing.json");

    let err = command.load_config().unwrap_err();

    assert!(format!("{err:#}").contains("missing.json"));
}
