//! Request-scoped diagnosis pipeline.
//!
//! `DiagnosisService` wires the collaborators around the cascade: symptom extraction in front,
//! enrichment, report rendering and history recording behind. Everything it holds is shared
//! behind `Arc`, so cloning the service is cheap and every clone sees the same history.

use crate::cascade::{run_cascade, CascadeOutcome, DiagnosisSource};
use crate::constants::{NO_RELIABLE_DIAGNOSIS_MESSAGE, NO_SYMPTOMS_MESSAGE};
use crate::context::DiagnosisContext;
use crate::extraction::{KeywordExtractor, SymptomExtractor};
use crate::history::{HistoryEntry, HistoryStore};
use crate::report::{render_report, render_summary};
use chrono::Utc;
use medassist_types::{DiagnosisLabel, SymptomName};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// An enriched diagnosis. Constructed fresh per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisResult {
    pub diagnosis: DiagnosisLabel,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
    pub severity: String,
    pub recommendation: String,
    pub source: DiagnosisSource,
}

/// What a single request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosisResponse {
    /// Extraction found nothing to diagnose.
    NoSymptoms,
    /// The cascade ended in its failure state; nothing was enriched, rendered or recorded.
    NoReliableDiagnosis { symptoms: Vec<SymptomName> },
    Diagnosed {
        symptoms: Vec<SymptomName>,
        result: DiagnosisResult,
        report: String,
    },
}

impl DiagnosisResponse {
    /// Plain-language message for the caller.
    pub fn message(&self) -> String {
        match self {
            DiagnosisResponse::NoSymptoms => NO_SYMPTOMS_MESSAGE.to_owned(),
            DiagnosisResponse::NoReliableDiagnosis { .. } => {
                NO_RELIABLE_DIAGNOSIS_MESSAGE.to_owned()
            }
            DiagnosisResponse::Diagnosed { result, .. } => render_summary(result),
        }
    }
}

/// Converts raw strings into symptom names, dropping blanks and names containing commas.
pub fn parse_symptoms<I, S>(items: I) -> Vec<SymptomName>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .filter_map(|item| match SymptomName::new(item.as_ref()) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!("ignoring symptom '{}': {}", item.as_ref(), e);
                None
            }
        })
        .collect()
}

/// The diagnosis pipeline around the cascade.
#[derive(Clone)]
pub struct DiagnosisService {
    ctx: Arc<DiagnosisContext>,
    extractor: Arc<dyn SymptomExtractor>,
    history: Arc<HistoryStore>,
}

impl DiagnosisService {
    /// Creates a service using the built-in keyword extractor and an empty history store.
    pub fn new(ctx: Arc<DiagnosisContext>) -> Self {
        let extractor = KeywordExtractor::from_context(&ctx);
        tracing::info!("keyword extractor ready with {} terms", extractor.len());
        Self {
            ctx,
            extractor: Arc::new(extractor),
            history: Arc::new(HistoryStore::new()),
        }
    }

    /// Replaces the symptom extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn SymptomExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn context(&self) -> &DiagnosisContext {
        &self.ctx
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Extracts symptoms from free text, then diagnoses them.
    ///
    /// When `session` is given, a successful diagnosis is appended to that session's history.
    pub fn diagnose_text(&self, text: &str, session: Option<Uuid>) -> DiagnosisResponse {
        let symptoms = self.extractor.extract(text);
        tracing::debug!(count = symptoms.len(), "symptoms extracted");
        self.diagnose_symptoms(&symptoms, text, session)
    }

    /// Diagnoses an already-extracted list of locale-form symptoms.
    ///
    /// # Arguments
    ///
    /// * `symptoms` - Locale-form symptoms in the order they were reported
    /// * `input` - The text shown as "reported symptoms" in the report and history
    /// * `session` - History session to record a successful diagnosis in
    pub fn diagnose_symptoms(
        &self,
        symptoms: &[SymptomName],
        input: &str,
        session: Option<Uuid>,
    ) -> DiagnosisResponse {
        if symptoms.is_empty() {
            return DiagnosisResponse::NoSymptoms;
        }

        let run = run_cascade(&self.ctx, symptoms);
        let diagnosis = match run.outcome {
            CascadeOutcome::Diagnosed(diagnosis) => diagnosis,
            CascadeOutcome::NoReliableDiagnosis => {
                tracing::info!(trace = ?run.trace, "no reliable diagnosis");
                return DiagnosisResponse::NoReliableDiagnosis {
                    symptoms: symptoms.to_vec(),
                };
            }
        };

        let enrichment = self.ctx.enrichment().enrich(diagnosis.diagnosis.as_str());
        let result = DiagnosisResult {
            diagnosis: diagnosis.diagnosis,
            confidence: diagnosis.confidence,
            severity: enrichment.severity,
            recommendation: enrichment.recommendation,
            source: diagnosis.source,
        };
        tracing::info!(
            diagnosis = %result.diagnosis,
            confidence = result.confidence,
            source = ?result.source,
            "diagnosis produced"
        );

        let now = Utc::now();
        let report = render_report(&result, input, now);

        if let Some(session) = session {
            self.history.append(
                session,
                HistoryEntry {
                    timestamp: now,
                    input: input.to_owned(),
                    diagnosis: result.diagnosis.clone(),
                    confidence: result.confidence,
                    recommendation: result.recommendation.clone(),
                },
            );
        }

        DiagnosisResponse::Diagnosed {
            symptoms: symptoms.to_vec(),
            result,
            report,
        }
    }
}
