//! Data-file reading helpers.
//!
//! Reference tables are read once at startup. These helpers attach the offending path to every
//! I/O or parse failure so a startup error names the file that needs fixing.

use crate::{EngineError, EngineResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

fn read_to_string(path: &Path) -> EngineResult<String> {
    fs::read_to_string(path).map_err(|source| EngineError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and deserialises a JSON data file.
///
/// # Errors
///
/// Returns `EngineError::FileRead` if the file cannot be read, or `EngineError::JsonParse` if its
/// contents do not match `T`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| EngineError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and deserialises a YAML data file.
///
/// # Errors
///
/// Returns `EngineError::FileRead` if the file cannot be read, or `EngineError::YamlParse` if its
/// contents do not match `T`.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let contents = read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|source| EngineError::YamlParse {
        path: path.to_path_buf(),
        source,
    })
}
