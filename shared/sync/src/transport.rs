use std::{fmt::Display, path::PathBuf};

use crate::TransportError;

/// Where runs are staged on the remote host unless told otherwise.
pub const DEFAULT_REMOTE_BASE_PATH: &str = "~/yolo-trainer";

/// Remote host plus the base directory all synced files live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// Anything `ssh` accepts as a destination, e.g. `user@gpu-box`.
    pub host: String,
    pub base_path: String,
}

impl RemoteTarget {
    pub fn new(host: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            base_path: base_path.into(),
        }
    }

    /// A path below the base path on the remote host.
    pub fn path(&self, relative: &str) -> String {
        if relative.is_empty() {
            return self.base_path.clone();
        }
        format!("{}/{}", self.base_path.trim_end_matches('/'), relative)
    }

    pub fn endpoint(&self, relative: &str) -> Endpoint {
        Endpoint::Remote {
            host: self.host.clone(),
            path: self.path(relative),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Local(PathBuf),
    Remote { host: String, path: String },
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Local(path) => write!(f, "{}", path.display()),
            Endpoint::Remote { host, path } => write!(f, "{host}:{path}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Copy the *contents* of the source directory into the destination
    /// directory instead of the directory itself.
    pub contents_only: bool,
    /// Glob patterns left out of the transfer.
    pub excludes: Vec<String>,
    /// Report per-file progress; only meaningful for large transfers.
    pub progress: bool,
}

impl CopyOptions {
    pub fn contents() -> Self {
        Self {
            contents_only: true,
            ..Default::default()
        }
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(excludes.into_iter().map(Into::into));
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }
}

/// Bulk copy over a remote shell.
///
/// Both operations must be idempotent and safe to re-run after an
/// interrupted attempt: a repeated `copy_tree` overwrites what is already
/// there and never deletes anything at the destination.
pub trait Transport {
    /// `mkdir -p` on the remote host.
    fn ensure_remote_dir(&self, host: &str, path: &str) -> Result<(), TransportError>;

    /// Recursively copy `src` to `dst`, preserving relative structure.
    fn copy_tree(&self, src: &Endpoint, dst: &Endpoint, options: &CopyOptions)
        -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn ensure_remote_dir(&self, host: &str, path: &str) -> Result<(), TransportError> {
        (**self).ensure_remote_dir(host, path)
    }

    fn copy_tree(
        &self,
        src: &Endpoint,
        dst: &Endpoint,
        options: &CopyOptions,
    ) -> Result<(), TransportError> {
        (**self).copy_tree(src, dst, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_paths() {
        let target = RemoteTarget::new("me@gpu", "~/yolo-trainer/");
        assert_eq!(target.path("weights"), "~/yolo-trainer/weights");
        assert_eq!(target.path(""), "~/yolo-trainer/");
        assert_eq!(
            target.endpoint("config.json").to_string(),
            "me@gpu:~/yolo-trainer/config.json"
        );
    }
}
