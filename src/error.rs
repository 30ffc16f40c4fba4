use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed engine configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid setup: {0}")]
    InvalidSetup(String),

    #[error("component {id}: {reason}")]
    InvalidComponent { id: String, reason: String },

    #[error("setup has no traced rays; run a trace first")]
    NoRays,

    #[error("setup generation failed: {0}")]
    Generator(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
