use anyhow::Result;
use async_trait::async_trait;

/// A `run-manager` subcommand.
#[async_trait]
pub trait Command {
    async fn execute(self) -> Result<()>;
}
