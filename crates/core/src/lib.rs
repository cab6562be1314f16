//! # medassist core
//!
//! Symptom-to-diagnosis decision engine.
//!
//! This crate contains the decision logic and the plumbing directly around it:
//! - symptom normalisation, vectorisation and the classifier adapter
//! - the exact and partial rule matchers
//! - the diagnosis cascade that reconciles them under confidence thresholds
//! - enrichment, report rendering and per-session history
//! - startup configuration and loading of the reference tables
//!
//! **No API concerns**: HTTP servers and wire types belong in `api-rest` and `api-shared`.

pub mod cascade;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod context;
pub mod enrichment;
pub mod error;
pub mod extraction;
pub mod history;
mod loader;
pub mod normalizer;
pub mod reference;
pub mod report;
pub mod rules;
pub mod service;
pub mod vectorizer;

pub use cascade::{
    diagnose, run_cascade, CascadeDiagnosis, CascadeOutcome, CascadeRun, CascadeState,
    DiagnosisSource,
};
pub use classifier::{Classification, Classifier, SoftmaxClassifier};
pub use config::{resolve_data_dir, CoreConfig};
pub use context::DiagnosisContext;
pub use error::{EngineError, EngineResult};
pub use extraction::{KeywordExtractor, SymptomExtractor};
pub use history::{HistoryEntry, HistoryStore};
pub use medassist_types::{DiagnosisLabel, SymptomName, TextError};
pub use service::{parse_symptoms, DiagnosisResponse, DiagnosisResult, DiagnosisService};
