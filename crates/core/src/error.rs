use std::path::PathBuf;

/// Startup-fatal errors raised while resolving configuration or loading reference data.
///
/// Nothing in the per-request path returns these: an unknown symptom, an unknown diagnosis or a
/// cascade that finds no label are all ordinary outcomes, not errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read data file {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON in {path}: {source}", path = path.display())]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse YAML in {path}: {source}", path = path.display())]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid text in {table}: {source}")]
    InvalidText {
        table: &'static str,
        #[source]
        source: medassist_types::TextError,
    },
    #[error("invalid classifier artifact: {0}")]
    InvalidModel(String),
    #[error("could not locate data directory: {0}")]
    DataDirNotFound(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
