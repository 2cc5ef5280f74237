use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::ModelSize;

/// Identifier of a training run. Also the name of the run's directory under
/// the checkpoints dir, so it never contains a path separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Accepts a caller-supplied id verbatim, as long as it names a single
    /// directory component.
    pub fn supplied(id: &str) -> Option<Self> {
        let is_safe = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.contains('\0');
        is_safe.then(|| Self(id.to_string()))
    }

    /// Builds a fresh id from the run's hyperparameters and dataset location.
    pub fn synthesize(
        timestamp: i64,
        img_size: u32,
        model_size: ModelSize,
        epochs: u32,
        batch_size: u32,
        data_path: &str,
    ) -> Self {
        Self(format!(
            "run_{timestamp}_{img_size}_{model_size}_{epochs}epochs_{batch_size}batch_{}",
            sanitize_path(data_path)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn sanitize_path(path: &str) -> String {
    path.replace(['/', '\\'], "_")
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for RunId {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_replaces_separators() {
        let id = RunId::synthesize(1, 640, ModelSize::Nano, 10, 8, "datasets/belt\\v2");
        assert_eq!(id.as_str(), "run_1_640_nano_10epochs_8batch_datasets_belt_v2");
    }

    #[test]
    fn test_supplied_rejects_unsafe_names() {
        assert!(RunId::supplied("run_abc").is_some());
        assert!(RunId::supplied("").is_none());
        assert!(RunId::supplied("..").is_none());
        assert!(RunId::supplied("a/b").is_none());
        assert!(RunId::supplied("a\\b").is_none());
    }
}
