//! Recommendation and severity lookup for a final diagnosis.

use crate::constants::{FALLBACK_RECOMMENDATION, FALLBACK_SEVERITY};
use crate::loader::{read_json, read_yaml};
use crate::EngineResult;
use medassist_types::DiagnosisLabel;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Recommendation text and severity label attached to a diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    pub recommendation: String,
    pub severity: String,
}

/// Static diagnosis → recommendation and diagnosis → severity tables.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentTables {
    recommendations: HashMap<DiagnosisLabel, String>,
    severities: HashMap<DiagnosisLabel, String>,
}

impl EnrichmentTables {
    pub fn new(
        recommendations: HashMap<DiagnosisLabel, String>,
        severities: HashMap<DiagnosisLabel, String>,
    ) -> Self {
        Self {
            recommendations,
            severities,
        }
    }

    /// Loads the recommendation table (JSON) and the severity table (YAML).
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if either file cannot be read or parsed.
    pub fn load(recommendations: &Path, severities: &Path) -> EngineResult<Self> {
        let tables = Self::new(read_json(recommendations)?, read_yaml(severities)?);
        tracing::info!(
            "loaded {} recommendations and {} severities",
            tables.recommendations.len(),
            tables.severities.len()
        );
        Ok(tables)
    }

    /// Looks up both texts for `diagnosis`, falling back to fixed strings on a miss.
    pub fn enrich(&self, diagnosis: &str) -> Enrichment {
        let recommendation = self
            .recommendations
            .get(diagnosis)
            .map_or(FALLBACK_RECOMMENDATION, String::as_str);
        let severity = self
            .severities
            .get(diagnosis)
            .map_or(FALLBACK_SEVERITY, String::as_str);

        Enrichment {
            recommendation: recommendation.to_owned(),
            severity: severity.to_owned(),
        }
    }
}
