use thiserror::Error;

#[derive(Debug, Error)]
pub enum DroidTapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Device command `{command}` failed: {detail}")]
    DeviceCommand { command: String, detail: String },

    #[error("Cannot load image {path}: {detail}")]
    ImageLoad { path: String, detail: String },

    #[error("Display error: {0}")]
    Display(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl DroidTapError {
    pub(crate) fn image_load(path: &std::path::Path, detail: impl std::fmt::Display) -> Self {
        DroidTapError::ImageLoad {
            path: path.display().to_string(),
            detail: detail.to_string(),
        }
    }
}

pub type DroidTapResult<T> = Result<T, DroidTapError>;
