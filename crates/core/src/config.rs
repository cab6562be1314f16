//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the context loader.
//! Request handling never reads environment variables.

use crate::constants::{
    DEFAULT_DATA_DIR, DISEASES_FILENAME, MODEL_FILENAME, RECOMMENDATIONS_FILENAME,
    RULES_FILENAME, SEVERITIES_FILENAME, SYMPTOM_DICTIONARY_FILENAME,
};
use crate::{EngineError, EngineResult};
use std::path::{Path, PathBuf};

/// Every file a data directory must provide.
const REQUIRED_FILES: &[&str] = &[
    SYMPTOM_DICTIONARY_FILENAME,
    MODEL_FILENAME,
    RULES_FILENAME,
    DISEASES_FILENAME,
    RECOMMENDATIONS_FILENAME,
    SEVERITIES_FILENAME,
];

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if `data_dir` is not a directory holding every
    /// reference table.
    pub fn new(data_dir: PathBuf) -> EngineResult<Self> {
        validate_data_dir(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn symptom_dictionary_path(&self) -> PathBuf {
        self.data_dir.join(SYMPTOM_DICTIONARY_FILENAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(MODEL_FILENAME)
    }

    pub fn rules_path(&self) -> PathBuf {
        self.data_dir.join(RULES_FILENAME)
    }

    pub fn diseases_path(&self) -> PathBuf {
        self.data_dir.join(DISEASES_FILENAME)
    }

    pub fn recommendations_path(&self) -> PathBuf {
        self.data_dir.join(RECOMMENDATIONS_FILENAME)
    }

    pub fn severities_path(&self) -> PathBuf {
        self.data_dir.join(SEVERITIES_FILENAME)
    }
}

/// Resolve the reference data directory without reading environment variables.
///
/// If `override_dir` is provided, it must be a directory containing the classifier artifact.
/// Otherwise this searches for `data/` relative to the current working directory and then walks
/// up from `CARGO_MANIFEST_DIR`.
///
/// # Errors
///
/// Returns `EngineError::DataDirNotFound` if no candidate directory qualifies.
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> EngineResult<PathBuf> {
    fn looks_like_data_dir(path: &Path) -> bool {
        path.is_dir() && path.join(MODEL_FILENAME).is_file()
    }

    if let Some(data_dir) = override_dir {
        if looks_like_data_dir(&data_dir) {
            return Ok(data_dir);
        }
        return Err(EngineError::DataDirNotFound(format!(
            "override {} is not a data directory (must contain {})",
            data_dir.display(),
            MODEL_FILENAME
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_DATA_DIR);
    if looks_like_data_dir(&cwd_relative) {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_DATA_DIR);
        if looks_like_data_dir(&candidate) {
            return Ok(candidate);
        }
    }

    Err(EngineError::DataDirNotFound(format!(
        "no {}/ directory containing {} found",
        DEFAULT_DATA_DIR, MODEL_FILENAME
    )))
}

/// Check that every reference table file is present in `data_dir`.
///
/// # Errors
///
/// Returns `EngineError::InvalidInput` naming the first missing file.
pub fn validate_data_dir(data_dir: &Path) -> EngineResult<()> {
    if !data_dir.is_dir() {
        return Err(EngineError::InvalidInput(format!(
            "data directory does not exist: {}",
            data_dir.display()
        )));
    }

    for file in REQUIRED_FILES {
        if !data_dir.join(file).is_file() {
            return Err(EngineError::InvalidInput(format!(
                "data directory {} is missing {}",
                data_dir.display(),
                file
            )));
        }
    }

    Ok(())
}
