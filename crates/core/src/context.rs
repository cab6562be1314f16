//! The immutable diagnosis context.
//!
//! Every table and the classifier are loaded once into a `DiagnosisContext`, which is then
//! shared by reference (usually behind an `Arc`) with every request. Nothing in it is mutated
//! after construction, so concurrent requests need no locking.

use crate::classifier::{Classifier, SoftmaxClassifier};
use crate::config::CoreConfig;
use crate::enrichment::EnrichmentTables;
use crate::normalizer::SymptomDictionary;
use crate::reference::DiseaseTable;
use crate::rules::RuleTable;
use crate::EngineResult;
use std::sync::Arc;

/// Process-wide read-only state consumed by the cascade.
#[derive(Debug, Clone)]
pub struct DiagnosisContext {
    dictionary: SymptomDictionary,
    classifier: Arc<dyn Classifier>,
    rules: RuleTable,
    diseases: DiseaseTable,
    enrichment: EnrichmentTables,
}

impl DiagnosisContext {
    pub fn new(
        dictionary: SymptomDictionary,
        classifier: Arc<dyn Classifier>,
        rules: RuleTable,
        diseases: DiseaseTable,
        enrichment: EnrichmentTables,
    ) -> Self {
        Self {
            dictionary,
            classifier,
            rules,
            diseases,
            enrichment,
        }
    }

    /// Loads every reference table and the classifier from the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if any file is missing, unreadable or malformed. Callers should
    /// treat this as fatal and not start serving.
    pub fn load(cfg: &CoreConfig) -> EngineResult<Self> {
        let dictionary = SymptomDictionary::load(&cfg.symptom_dictionary_path())?;
        let classifier = SoftmaxClassifier::load(&cfg.model_path())?;
        let rules = RuleTable::load(&cfg.rules_path())?;
        let diseases = DiseaseTable::load(&cfg.diseases_path())?;
        let enrichment =
            EnrichmentTables::load(&cfg.recommendations_path(), &cfg.severities_path())?;

        let unmapped = classifier
            .columns()
            .names()
            .iter()
            .filter(|column| dictionary.localize(column.as_str()).is_none())
            .count();
        if unmapped > 0 {
            tracing::warn!(
                "{} classifier columns have no locale-form entry in the symptom dictionary",
                unmapped
            );
        }

        Ok(Self::new(
            dictionary,
            Arc::new(classifier),
            rules,
            diseases,
            enrichment,
        ))
    }

    pub fn dictionary(&self) -> &SymptomDictionary {
        &self.dictionary
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn diseases(&self) -> &DiseaseTable {
        &self.diseases
    }

    pub fn enrichment(&self) -> &EnrichmentTables {
        &self.enrichment
    }
}
