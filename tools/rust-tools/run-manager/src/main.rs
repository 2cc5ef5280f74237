use anyhow::Result;
use clap::{Parser, Subcommand};
use run_manager::commands::{sync::CommandSync, train::CommandTrain, Command};
use tracing::error;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "run-manager", version = VERSION)]
#[command(about = "Resolve, gate and launch YOLO segmentation training runs, locally or on a remote GPU host")]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a run locally, resuming it if it has a checkpoint
    Train(CommandTrain),

    /// Push a run to a remote host, or pull its checkpoints back
    Sync(CommandSync),

    // Prints the help, optionally as markdown. Used for docs generation.
    #[clap(hide = true)]
    PrintAllHelp {
        #[arg(long, required = true)]
        markdown: bool,
    },
}

async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Commands::Train(command) => command.execute().await,
        Commands::Sync(command) => command.execute().await,
        Commands::PrintAllHelp { markdown } => {
            assert!(markdown);
            clap_markdown::print_help_markdown::<CliArgs>();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let result = run(args).await;

    if let Err(e) = &result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
