use async_trait::async_trait;
use std::process::Stdio;
use tracing::info;

use super::{EngineError, TrainRequest, TrainingEngine};

pub const DEFAULT_YOLO_BIN: &str = "yolo";

/// Runs training through the Ultralytics `yolo` command line.
#[derive(Debug, Clone)]
pub struct YoloCli {
    program: String,
}

impl YoloCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(request: &TrainRequest) -> Vec<String> {
        let python_bool = |b: bool| if b { "True" } else { "False" };
        vec![
            "segment".to_string(),
            "train".to_string(),
            format!("model={}", request.model_source.display()),
            format!("data={}", request.data_yaml.display()),
            format!("epochs={}", request.epochs),
            format!("batch={}", request.batch_size),
            format!("device={}", request.device),
            format!("project={}", request.project.display()),
            format!("name={}", request.name),
            // the run dir is created up front; the engine must reuse it
            "exist_ok=True".to_string(),
            format!("resume={}", python_bool(request.resume)),
            "save=True".to_string(),
            format!("save_period={}", request.save_period),
            format!("imgsz={}", request.img_size),
        ]
    }
}

#[async_trait]
impl TrainingEngine for YoloCli {
    async fn train(&self, request: &TrainRequest) -> Result<(), EngineError> {
        let args = Self::args(request);
        info!("  → {} {}", self.program, args.join(" "));

        let mut child = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(|source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(EngineError::Failed { status });
        }
        Ok(())
    }
}
