mod error;
mod model_size;
mod projection;
mod resolve;
mod run_id;
mod run_spec;

pub use error::ConfigError;
pub use model_size::ModelSize;
pub use projection::{
    project, REMOTE_CHECKPOINTS_DIR, REMOTE_CONFIG_FILENAME, REMOTE_DATA_DIR,
};
pub use resolve::{load, load_run_spec, materialize, resolve, resolve_at, Config, WEIGHTS_DIR};
pub use run_id::RunId;
pub use run_spec::RunSpec;
