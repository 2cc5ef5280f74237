use segtrain_config::{
    project, Config, REMOTE_CHECKPOINTS_DIR, REMOTE_CONFIG_FILENAME, REMOTE_DATA_DIR, WEIGHTS_DIR,
};
use std::{
    fmt::Display,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{CopyOptions, Endpoint, RemoteTarget, SyncError, Transport};

/// Files and directories (relative to the working directory) that make up
/// the trainer itself. Missing entries are skipped.
pub const DEFAULT_CODE_ARTIFACTS: [&str; 4] = ["Cargo.toml", "Cargo.lock", "shared", "tools"];

/// Caches written next to the dataset by the engine or tooling; never synced.
pub const TRANSIENT_EXCLUDES: [&str; 2] = ["__pycache__", "*.cache"];

const BUILD_EXCLUDES: [&str; 1] = ["target"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    CreateRemoteDirs,
    CodeArtifacts,
    Data,
    DatasetYaml,
    Weights,
    ProjectedConfig,
    CreateLocalCheckpoints,
    Checkpoints,
}

impl Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SyncStep::CreateRemoteDirs => "creating remote directories",
            SyncStep::CodeArtifacts => "syncing code files",
            SyncStep::Data => "syncing data",
            SyncStep::DatasetYaml => "syncing dataset yaml",
            SyncStep::Weights => "syncing base model weights",
            SyncStep::ProjectedConfig => "syncing remote config",
            SyncStep::CreateLocalCheckpoints => "creating local checkpoints directory",
            SyncStep::Checkpoints => "pulling checkpoints",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushReport {
    pub transferred: Vec<SyncStep>,
    pub skipped: Vec<SyncStep>,
    pub warnings: Vec<String>,
    /// Files and bytes in the local dataset at the time of the push.
    pub data_files: usize,
    pub data_bytes: u64,
    /// The config the remote host will train with.
    pub remote_config: Option<Config>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullReport {
    pub local_checkpoints_dir: PathBuf,
}

/// One push or pull against a remote target.
///
/// Steps run strictly in order. Creating the remote layout and copying the
/// code are prerequisites; a missing dataset or yaml is only a warning, but a
/// transfer that starts and fails always aborts the session.
pub struct SyncSession<T> {
    transport: T,
    target: RemoteTarget,
    workdir: PathBuf,
    code_artifacts: Vec<PathBuf>,
}

impl<T: Transport> SyncSession<T> {
    pub fn new(transport: T, target: RemoteTarget) -> Self {
        Self {
            transport,
            target,
            workdir: PathBuf::from("."),
            code_artifacts: DEFAULT_CODE_ARTIFACTS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Directory relative config paths and code artifacts are resolved against.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_code_artifacts<I, P>(mut self, artifacts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.code_artifacts = artifacts.into_iter().map(Into::into).collect();
        self
    }

    pub fn push(&self, config: &Config) -> Result<PushReport, SyncError> {
        let mut report = PushReport::default();

        self.transport
            .ensure_remote_dir(&self.target.host, &self.target.path(WEIGHTS_DIR))
            .map_err(step_failed(SyncStep::CreateRemoteDirs))?;
        report.transferred.push(SyncStep::CreateRemoteDirs);

        info!("Syncing code files...");
        let code_options = CopyOptions::default()
            .with_excludes(BUILD_EXCLUDES)
            .with_excludes(TRANSIENT_EXCLUDES);
        for artifact in &self.code_artifacts {
            let local = self.local(artifact);
            if !local.exists() {
                debug!("Code artifact {} not present, skipping", local.display());
                continue;
            }
            self.transport
                .copy_tree(&Endpoint::Local(local), &self.remote_dir(""), &code_options)
                .map_err(step_failed(SyncStep::CodeArtifacts))?;
        }
        report.transferred.push(SyncStep::CodeArtifacts);

        let data_path = self.local(&config.data_path);
        if data_path.is_dir() {
            let (files, bytes) = tree_stats(&data_path);
            info!(
                "Syncing data from {} ({} files, {} bytes)...",
                data_path.display(),
                files,
                bytes
            );
            self.transport
                .copy_tree(
                    &Endpoint::Local(data_path),
                    &self.target.endpoint(REMOTE_DATA_DIR),
                    &CopyOptions::contents()
                        .with_progress()
                        .with_excludes(TRANSIENT_EXCLUDES),
                )
                .map_err(step_failed(SyncStep::Data))?;
            report.transferred.push(SyncStep::Data);
            report.data_files = files;
            report.data_bytes = bytes;
        } else {
            let warning = format!("data_path '{}' not found locally", data_path.display());
            warn!("{}", warning);
            report.warnings.push(warning);
            report.skipped.push(SyncStep::Data);
        }

        let yaml_path = self.local(&config.data_yaml_path);
        if yaml_path.is_file() {
            info!("Syncing yaml from {}...", yaml_path.display());
            self.transport
                .copy_tree(
                    &Endpoint::Local(yaml_path),
                    &self.remote_dir(""),
                    &CopyOptions::default(),
                )
                .map_err(step_failed(SyncStep::DatasetYaml))?;
            report.transferred.push(SyncStep::DatasetYaml);
        } else {
            let warning = format!("data_yaml_path '{}' not found locally", yaml_path.display());
            warn!("{}", warning);
            report.warnings.push(warning);
            report.skipped.push(SyncStep::DatasetYaml);
        }

        // base weights may already be staged on the remote
        let weights_dir = self.workdir.join(WEIGHTS_DIR);
        if weights_dir.is_dir() {
            info!("Syncing base model weights...");
            self.transport
                .copy_tree(
                    &Endpoint::Local(weights_dir),
                    &self.target.endpoint(WEIGHTS_DIR),
                    &CopyOptions::contents().with_progress(),
                )
                .map_err(step_failed(SyncStep::Weights))?;
            report.transferred.push(SyncStep::Weights);
        } else {
            debug!("No local {} directory, skipping", weights_dir.display());
            report.skipped.push(SyncStep::Weights);
        }

        let remote_config = project(config);
        self.push_projected_config(&remote_config)?;
        report.transferred.push(SyncStep::ProjectedConfig);
        report.remote_config = Some(remote_config);

        Ok(report)
    }

    /// Writes the projected config to a process-unique temporary file,
    /// ships it as `config.json` and removes it again, whatever happens.
    fn push_projected_config(&self, remote_config: &Config) -> Result<(), SyncError> {
        let step = SyncStep::ProjectedConfig;
        let io_failed = |source: std::io::Error| SyncError::Io {
            step,
            path: self.workdir.clone(),
            source,
        };

        // dropping the file on any early return deletes it
        let mut transient = tempfile::Builder::new()
            .prefix(".remote_config.")
            .suffix(".json")
            .tempfile_in(&self.workdir)
            .map_err(io_failed)?;
        serde_json::to_writer_pretty(transient.as_file_mut(), &remote_config.to_run_spec())?;
        transient.as_file_mut().flush().map_err(io_failed)?;

        let result = self.transport.copy_tree(
            &Endpoint::Local(transient.path().to_path_buf()),
            &self.target.endpoint(REMOTE_CONFIG_FILENAME),
            &CopyOptions::default(),
        );

        let transient_path = transient.path().to_path_buf();
        if let Err(err) = transient.close() {
            warn!(
                "Failed to remove transient config {}: {}",
                transient_path.display(),
                err
            );
        }

        result.map_err(step_failed(step))
    }

    pub fn pull(&self, config: &Config) -> Result<PullReport, SyncError> {
        let checkpoints_dir = self.local(&config.checkpoints_dir);
        std::fs::create_dir_all(&checkpoints_dir).map_err(|source| SyncError::Io {
            step: SyncStep::CreateLocalCheckpoints,
            path: checkpoints_dir.clone(),
            source,
        })?;

        info!("Pulling checkpoints from remote...");
        // no deletion at the destination: checkpoints of other runs stay
        self.transport
            .copy_tree(
                &self.target.endpoint(REMOTE_CHECKPOINTS_DIR),
                &Endpoint::Local(checkpoints_dir.clone()),
                &CopyOptions::contents().with_progress(),
            )
            .map_err(step_failed(SyncStep::Checkpoints))?;

        info!("Checkpoints synced to {}/", checkpoints_dir.display());
        Ok(PullReport {
            local_checkpoints_dir: checkpoints_dir,
        })
    }

    fn local(&self, path: &Path) -> PathBuf {
        self.workdir.join(path)
    }

    /// A remote directory used as a copy destination for single entries.
    fn remote_dir(&self, relative: &str) -> Endpoint {
        let mut path = self.target.path(relative);
        if !path.ends_with('/') {
            path.push('/');
        }
        Endpoint::Remote {
            host: self.target.host.clone(),
            path,
        }
    }
}

fn step_failed(step: SyncStep) -> impl FnOnce(crate::TransportError) -> SyncError {
    move |source| SyncError::Transport { step, source }
}

fn tree_stats(root: &Path) -> (usize, u64) {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_transient(entry.file_name().to_string_lossy().as_ref()))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .fold((0, 0), |(files, bytes), entry| {
            let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
            (files + 1, bytes + len)
        })
}

fn is_transient(name: &str) -> bool {
    name == "__pycache__" || name.ends_with(".cache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_stats_skips_caches() {
        let dir = tempfile::TempDir::new().unwrap();
        let labels = dir.path().join("labels");
        std::fs::create_dir_all(labels.join("__pycache__")).unwrap();
        std::fs::write(labels.join("a.txt"), b"0 0.1 0.1").unwrap();
        std::fs::write(labels.join("train.cache"), b"cached").unwrap();
        std::fs::write(labels.join("__pycache__").join("x.pyc"), b"pyc").unwrap();

        assert_eq!(tree_stats(dir.path()), (1, 9));
    }

    #[test]
    fn test_step_names() {
        assert_eq!(SyncStep::CreateRemoteDirs.to_string(), "creating remote directories");
        assert_eq!(SyncStep::Checkpoints.to_string(), "pulling checkpoints");
    }
}
