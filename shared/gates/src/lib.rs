//! Pre-training decisions.
//!
//! Each gate is a pure function of what is on disk at the moment it is asked,
//! so a run that crashed and is started again picks up whatever the previous
//! attempt left behind. Nothing here caches a decision.

mod checkpoint;
mod dataset;
mod error;
mod split;

pub use checkpoint::{best_checkpoint, decide, CheckpointDecision, LAST_CHECKPOINT_CANDIDATES};
pub use dataset::{ensure_ready, stage_data_yaml, validation_images_dir, SplitAction, STAGED_DATA_YAML};
pub use error::DatasetError;
pub use split::{SeededSplitter, SplitSummary, Splitter, IMAGE_EXTENSIONS};
