use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::{CopyOptions, Endpoint, Transport, TransportError};

/// [`Transport`] backed by the `ssh` and `rsync` binaries.
///
/// rsync only sends what changed and overwrites in place, so re-running an
/// interrupted transfer picks up where it left off.
#[derive(Debug, Clone)]
pub struct RsyncTransport {
    ssh: String,
    rsync: String,
}

impl RsyncTransport {
    pub fn new() -> Result<Self, TransportError> {
        let transport = Self::with_programs("ssh", "rsync");
        // Verify rsync is available before touching the remote
        let output = Command::new(&transport.rsync)
            .arg("--version")
            .output()
            .map_err(|source| TransportError::Spawn {
                program: transport.rsync.clone(),
                source,
            })?;
        debug!(
            "Using {}",
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("rsync")
        );
        Ok(transport)
    }

    pub fn with_programs(ssh: impl Into<String>, rsync: impl Into<String>) -> Self {
        Self {
            ssh: ssh.into(),
            rsync: rsync.into(),
        }
    }

    fn run(&self, program: &str, args: &[String]) -> Result<(), TransportError> {
        let command = format!("{} {}", program, args.join(" "));
        info!("  → {}", command);

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| TransportError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(TransportError::Failed { command, status });
        }
        Ok(())
    }
}

impl Transport for RsyncTransport {
    fn ensure_remote_dir(&self, host: &str, path: &str) -> Result<(), TransportError> {
        self.run(
            &self.ssh,
            &[
                host.to_string(),
                format!("mkdir -p {}", remote_shell_path(path)),
            ],
        )
    }

    fn copy_tree(
        &self,
        src: &Endpoint,
        dst: &Endpoint,
        options: &CopyOptions,
    ) -> Result<(), TransportError> {
        self.run(&self.rsync, &rsync_args(src, dst, options))
    }
}

pub(crate) fn rsync_args(src: &Endpoint, dst: &Endpoint, options: &CopyOptions) -> Vec<String> {
    let mut args = vec!["-avz".to_string()];
    if options.progress {
        args.push("--progress".to_string());
    }
    for pattern in &options.excludes {
        args.push("--exclude".to_string());
        args.push(pattern.clone());
    }
    if options.contents_only {
        // a trailing slash makes rsync copy the directory's contents
        args.push(with_trailing_slash(src.to_string()));
        args.push(with_trailing_slash(dst.to_string()));
    } else {
        args.push(src.to_string());
        args.push(dst.to_string());
    }
    args
}

fn with_trailing_slash(mut path: String) -> String {
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Quotes a path for the remote shell while keeping a leading `~/`
/// expandable.
fn remote_shell_path(path: &str) -> String {
    if path == "~" {
        return path.to_string();
    }
    let (prefix, rest) = match path.strip_prefix("~/") {
        Some(rest) => ("~/", rest),
        None => ("", path),
    };
    let is_plain = rest
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-+@%,:=".contains(c));
    if is_plain {
        format!("{prefix}{rest}")
    } else {
        format!("{prefix}'{}'", rest.replace('\'', r"'\''"))
    }
}
