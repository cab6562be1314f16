//! Constants used throughout the medassist core crate.
//!
//! Thresholds, sentinel texts, fallback texts and data filenames live here so the cascade and
//! the loaders agree on them.

/// Minimum classifier confidence (percent) for a predicted label to be tentatively accepted.
pub const ACCEPT_CONFIDENCE: f64 = 40.0;

/// Classifier confidence (percent) below which any tentative label is replaced by the
/// inconclusive sentinel.
///
/// Kept separate from [`ACCEPT_CONFIDENCE`]. Labels are only accepted at 40 or above, so the
/// [30, 40) band never downgrades an accepted label under the current values.
pub const REJECT_CONFIDENCE: f64 = 30.0;

/// Confidence (percent) assigned when a rule-based stage supplies the diagnosis.
pub const RULE_CONFIDENCE: f64 = 100.0;

/// Sentinel diagnosis text meaning "a label was computed but confidence was too low to trust".
pub const INCONCLUSIVE_DIAGNOSIS: &str =
    "Inconclusive diagnosis. An in-person medical consultation is recommended.";

/// Caller-facing message when no stage of the cascade yields a label.
pub const NO_RELIABLE_DIAGNOSIS_MESSAGE: &str =
    "A reliable diagnosis could not be determined. Please consult a doctor.";

/// Caller-facing message when extraction finds no symptoms in the input text.
pub const NO_SYMPTOMS_MESSAGE: &str = "No valid symptoms were detected.";

/// Recommendation used when a diagnosis has no entry in the recommendation table.
pub const FALLBACK_RECOMMENDATION: &str =
    "Consult a medical professional for a complete assessment.";

/// Severity label used when a diagnosis has no entry in the severity table.
pub const FALLBACK_SEVERITY: &str = "Unknown";

/// Maximum number of sessions kept in the history store before the oldest is evicted.
pub const MAX_HISTORY_SESSIONS: usize = 10_000;

/// Default directory for reference data when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Filename for the canonical → locale-form symptom dictionary.
pub const SYMPTOM_DICTIONARY_FILENAME: &str = "symptom_dictionary.json";

/// Filename for the classifier artifact.
pub const MODEL_FILENAME: &str = "model.json";

/// Filename for the ordered exact-rule table.
pub const RULES_FILENAME: &str = "rules.yaml";

/// Filename for the ordered disease-reference table.
pub const DISEASES_FILENAME: &str = "diseases.yaml";

/// Filename for the diagnosis → recommendation table.
pub const RECOMMENDATIONS_FILENAME: &str = "recommendations.json";

/// Filename for the diagnosis → severity table.
pub const SEVERITIES_FILENAME: &str = "severities.yaml";

/// Disclaimer appended to every generated report.
pub const REPORT_DISCLAIMER: &str = "This report was generated automatically by the medical \
assistant. For a definitive diagnosis, consult a healthcare professional.";
