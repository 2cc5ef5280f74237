use std::{fmt::Display, str::FromStr};

/// Size tier of the YOLO segmentation base model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelSize {
    Nano,
    #[default]
    Small,
    Medium,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Nano => "nano",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
        }
    }

    /// File name of the pretrained weights under the `weights/` directory.
    pub fn weights_file(&self) -> &'static str {
        match self {
            ModelSize::Nano => "yolo11n-seg.pt",
            ModelSize::Small => "yolo11s-seg.pt",
            ModelSize::Medium => "yolo11m-seg.pt",
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            ModelSize::Nano => "yolo11n-seg",
            ModelSize::Small => "yolo11s-seg",
            ModelSize::Medium => "yolo11m-seg",
        }
    }
}

impl FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nano" => Ok(ModelSize::Nano),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            other => Err(other.to_string()),
        }
    }
}

impl Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
