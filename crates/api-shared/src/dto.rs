//! Request and response bodies for the diagnosis API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseReq {
    /// Free-text description of the symptoms.
    pub message: String,
    /// Existing session to record the diagnosis in; a new session is opened when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// How a diagnosis request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Diagnosed,
    NoSymptoms,
    NoReliableDiagnosis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisResultDto {
    pub diagnosis: String,
    /// Percentage in [0, 100].
    pub confidence: f64,
    pub severity: String,
    pub recommendation: String,
    /// `classifier`, `exact_rule` or `partial_rule`.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseRes {
    /// Plain-language message for the user.
    pub response: String,
    pub outcome: Outcome,
    /// Locale-form symptoms detected in the message.
    pub symptoms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DiagnosisResultDto>,
    /// Markdown report, present only for diagnosed requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryDto {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub input: String,
    pub diagnosis: String,
    pub confidence: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryRes {
    pub session_id: String,
    pub entries: Vec<HistoryEntryDto>,
}
