use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to start training engine `{program}`: {source}. Is it installed and on PATH?")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("training engine exited with {status}")]
    Failed { status: ExitStatus },
}
