use crate::{
    commands::Command,
    engine::{TrainRequest, TrainingEngine, YoloCli, DEFAULT_SAVE_PERIOD, DEFAULT_YOLO_BIN},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use segtrain_config::Config;
use segtrain_gates::{
    best_checkpoint, decide, ensure_ready, stage_data_yaml, DatasetError, SeededSplitter,
    SplitAction, Splitter,
};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Clone, Args)]
#[command()]
pub struct CommandTrain {
    /// Run specification (JSON)
    pub config: PathBuf,
    /// Ultralytics `yolo` executable
    #[clap(long, env = "YOLO_BIN", default_value = DEFAULT_YOLO_BIN)]
    pub engine_bin: String,
    /// Save a checkpoint every N epochs
    #[clap(long, default_value_t = DEFAULT_SAVE_PERIOD)]
    pub save_period: u32,
    /// Seed for the train/validation split
    #[clap(long, default_value_t = 42)]
    pub split_seed: u64,
}

#[async_trait]
impl Command for CommandTrain {
    async fn execute(self) -> Result<()> {
        let Self {
            config,
            engine_bin,
            save_period,
            split_seed,
        } = self;

        let config = segtrain_config::resolve(&config)
            .with_context(|| format!("Failed to load run config {}", config.display()))?;
        log_config(&config);

        let request = prepare_run(&config, &SeededSplitter::new(split_seed), save_period)?;
        run_training(&YoloCli::new(engine_bin), &config, &request).await
    }
}

/// Gets the dataset and checkpoint state ready and builds the request the
/// engine is started with.
///
/// Runs the gates in order: stage the dataset yaml, make sure a validation
/// split exists (creating it if a ratio is configured), then decide between
/// resuming and starting fresh.
pub fn prepare_run(
    config: &Config,
    splitter: &impl Splitter,
    save_period: u32,
) -> Result<TrainRequest, DatasetError> {
    let data_yaml = stage_data_yaml(&config.data_yaml_path, &config.data_path)?;

    match ensure_ready(&config.data_path, config.val_split).require_satisfiable(&config.data_path)? {
        SplitAction::PerformSplit(ratio) => {
            let summary = splitter.split(&config.data_path, ratio)?;
            info!(
                "Moved {} images and {} labels to validation, {} images left for training",
                summary.moved_images, summary.moved_labels, summary.remaining_train_images
            );
        }
        SplitAction::AlreadySplit | SplitAction::Unsatisfiable => {}
    }

    let decision = decide(&config.checkpoints_dir, &config.run_id, &config.base_model_path);

    Ok(TrainRequest {
        data_yaml,
        model_source: decision.model_source,
        epochs: config.epochs,
        batch_size: config.batch_size,
        device: config.device.clone(),
        project: config.checkpoints_dir.clone(),
        name: config.run_id.to_string(),
        resume: decision.resume,
        save_period,
        img_size: config.img_size,
    })
}

/// Runs the engine until it finishes or the user interrupts it.
///
/// On Ctrl-C the engine future is dropped, which kills the child; whatever
/// checkpoint it last saved is picked up by the next `train` of the same run.
pub async fn run_training(
    engine: &impl TrainingEngine,
    config: &Config,
    request: &TrainRequest,
) -> Result<()> {
    info!("Starting training...");
    tokio::select! {
        result = engine.train(request) => {
            result.context("Training failed")?;
        }
        _ = signal::ctrl_c() => {
            warn!("Received interrupt signal, stopping training");
            info!(
                "Resume with \"checkpoint_run_id\": \"{}\" in the run config",
                config.run_id
            );
            return Ok(());
        }
    }

    info!("Training completed!");
    match best_checkpoint(&config.checkpoints_dir, &config.run_id) {
        Some(best) => info!("Best model saved at: {}", best.display()),
        None => warn!(
            "No best checkpoint found under {}",
            config.run_dir().display()
        ),
    }
    Ok(())
}

fn log_config(config: &Config) {
    info!("Training configuration:");
    info!("  Model: {}", config.model_name);
    info!("  Run ID: {}", config.run_id);
    info!("  Data: {}", config.data_path.display());
    info!("  Epochs: {}", config.epochs);
    info!("  Batch size: {}", config.batch_size);
    info!("  Image size: {}", config.img_size);
    info!("  Device: {}", config.device);
    if let Some(val_split) = config.val_split {
        info!("  Validation split: {}", val_split);
    }
}
