use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("record is missing field {tag}")]
    MissingField { tag: String },

    #[error("field has multiple subfields of {selector}")]
    AmbiguousField { selector: String },

    #[error("unknown checker: {0}")]
    UnknownChecker(String),

    #[error("unknown normalization step: {0}")]
    UnknownStep(String),

    #[error("invalid weight {weight} for checker {name}: weights must be positive and finite")]
    InvalidWeight { name: String, weight: f64 },

    #[error("strategy parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] marcsim_core::CoreError),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
