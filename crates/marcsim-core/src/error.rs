use thiserror::Error;

/// All errors that can occur in marcsim-core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid tag '{0}': tags are exactly 3 characters")]
    InvalidTag(String),

    #[error("Invalid selector '{0}': expected at least a 3-character tag")]
    InvalidSelector(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
