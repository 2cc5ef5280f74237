//! Moves a training run between the local workstation and a remote GPU host.
//!
//! `push` ships code, dataset, base weights and a remote-adjusted config;
//! `pull` brings checkpoints back. The actual copying goes through a
//! [`Transport`], which in production shells out to `ssh` and `rsync`.

mod error;
mod rsync;
mod session;
mod transport;

pub use error::{SyncError, TransportError};
pub use rsync::RsyncTransport;
pub use session::{
    PullReport, PushReport, SyncSession, SyncStep, DEFAULT_CODE_ARTIFACTS, TRANSIENT_EXCLUDES,
};
pub use transport::{CopyOptions, Endpoint, RemoteTarget, Transport, DEFAULT_REMOTE_BASE_PATH};
