//! The external trainer the run lifecycle hands off to.
//!
//! The engine owns everything about training itself: loading weights,
//! writing `last`/`best` checkpoints every `save_period` epochs and resuming
//! from its own checkpoint state. This side only decides *what* to train.

mod error;
mod yolo;

use async_trait::async_trait;
use std::path::PathBuf;

pub use error::EngineError;
pub use yolo::{YoloCli, DEFAULT_YOLO_BIN};

pub const DEFAULT_SAVE_PERIOD: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainRequest {
    pub data_yaml: PathBuf,
    /// Base weights for a fresh run, or the run's own `last` checkpoint.
    pub model_source: PathBuf,
    pub epochs: u32,
    pub batch_size: u32,
    pub device: String,
    /// Parent directory of the run directory (the checkpoints dir).
    pub project: PathBuf,
    /// Run directory name (the run id).
    pub name: String,
    pub resume: bool,
    pub save_period: u32,
    pub img_size: u32,
}

#[async_trait]
pub trait TrainingEngine {
    async fn train(&self, request: &TrainRequest) -> Result<(), EngineError>;
}
