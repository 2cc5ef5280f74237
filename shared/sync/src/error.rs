use std::{path::PathBuf, process::ExitStatus};
use thiserror::Error;

use crate::SyncStep;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to execute {program}: {source}. Is it installed and on PATH?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}")]
    Failed { command: String, status: ExitStatus },

    /// Used by non-process transports.
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{step} failed: {source}")]
    Transport {
        step: SyncStep,
        #[source]
        source: TransportError,
    },

    #[error("{step} failed at {path}: {source}")]
    Io {
        step: SyncStep,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize projected config: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SyncError {
    /// The step the session was in when it failed.
    pub fn step(&self) -> SyncStep {
        match self {
            SyncError::Transport { step, .. } | SyncError::Io { step, .. } => *step,
            SyncError::Serialize(_) => SyncStep::ProjectedConfig,
        }
    }
}
