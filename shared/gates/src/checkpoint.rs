use segtrain_config::RunId;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the engine's `last` checkpoint may live inside a run directory,
/// in probing order.
pub const LAST_CHECKPOINT_CANDIDATES: [&str; 2] = ["last.pt", "weights/last.pt"];

const BEST_CHECKPOINT: &str = "weights/best.pt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointDecision {
    pub resume: bool,
    /// Checkpoint to resume from, or the base model when starting fresh.
    pub model_source: PathBuf,
}

/// Decides whether the run resumes from its own `last` checkpoint or starts
/// from the base model.
///
/// An unreadable checkpoint is not detected here; loading it is the engine's
/// job and it will fail on its own.
pub fn decide(checkpoints_dir: &Path, run_id: &RunId, base_model_path: &Path) -> CheckpointDecision {
    let run_dir = checkpoints_dir.join(run_id);
    let last = LAST_CHECKPOINT_CANDIDATES
        .iter()
        .map(|candidate| run_dir.join(candidate))
        .find(|path| path.is_file());

    match last {
        Some(model_source) => {
            info!("Loading checkpoint from: {}", model_source.display());
            CheckpointDecision {
                resume: true,
                model_source,
            }
        }
        None => {
            info!("Starting from base model: {}", base_model_path.display());
            CheckpointDecision {
                resume: false,
                model_source: base_model_path.to_path_buf(),
            }
        }
    }
}

/// The engine's best weights for a run, once it has written them.
pub fn best_checkpoint(checkpoints_dir: &Path, run_id: &RunId) -> Option<PathBuf> {
    let best = checkpoints_dir.join(run_id).join(BEST_CHECKPOINT);
    best.is_file().then_some(best)
}
