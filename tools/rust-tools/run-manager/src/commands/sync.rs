use crate::commands::Command;
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use segtrain_config::{Config, REMOTE_CONFIG_FILENAME};
use segtrain_sync::{
    PushReport, RemoteTarget, RsyncTransport, SyncSession, Transport, DEFAULT_REMOTE_BASE_PATH,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncAction {
    /// Ship code, dataset, weights and the remote config to the host
    Push,
    /// Fetch checkpoints from the host
    Pull,
}

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandSync {
    #[clap(value_enum)]
    pub action: SyncAction,
    /// Run specification (JSON)
    pub config: PathBuf,
    /// Remote host, e.g. user@gpu-box
    #[clap(long, env = "SYNC_REMOTE")]
    pub remote: String,
    /// Base directory on the remote host
    #[clap(long, env = "SYNC_REMOTE_PATH", default_value = DEFAULT_REMOTE_BASE_PATH)]
    pub remote_path: String,
    /// Local directory that relative config paths and code files live in
    #[clap(long, default_value = ".")]
    pub workdir: PathBuf,
}

#[async_trait]
impl Command for CommandSync {
    async fn execute(self) -> Result<()> {
        let config = self.load_config()?;
        let transport = RsyncTransport::new()?;
        self.run(&transport, &config)
    }
}

impl CommandSync {
    /// Syncing only reads the run config; run directories are created by
    /// whichever host trains.
    pub fn load_config(&self) -> Result<Config> {
        segtrain_config::load(&self.config)
            .with_context(|| format!("Failed to load run config {}", self.config.display()))
    }

    pub fn run(&self, transport: &impl Transport, config: &Config) -> Result<()> {
        let session = SyncSession::new(
            transport,
            RemoteTarget::new(self.remote.clone(), self.remote_path.clone()),
        )
        .with_workdir(&self.workdir);

        match self.action {
            SyncAction::Push => {
                let report = session.push(config).context("Push failed")?;
                self.print_push_summary(&report);
            }
            SyncAction::Pull => {
                session.pull(config).context("Pull failed")?;
            }
        }
        Ok(())
    }

    fn print_push_summary(&self, report: &PushReport) {
        info!(
            "Synced {} steps ({} data files, {} bytes)",
            report.transferred.len(),
            report.data_files,
            report.data_bytes
        );
        for warning in &report.warnings {
            warn!("{}", warning);
        }

        println!("\nSync complete! To train on remote:");
        println!("  ssh {}", self.remote);
        println!("  cd {}", self.remote_path);
        println!(
            "  cargo run --release --bin run-manager -- train {}",
            REMOTE_CONFIG_FILENAME
        );
    }
}
