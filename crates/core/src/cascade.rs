//! The diagnosis cascade.
//!
//! A fixed-order sequence of stages with confidence gating between them:
//!
//! 1. normalise locale-form symptoms and keep the ones the classifier knows,
//! 2. classify (only if something was recognised) and tentatively accept at `>= 40%`,
//! 3. downgrade to the inconclusive sentinel below `30%`,
//! 4. fall back to the exact rule table on the locale-form symptoms,
//! 5. fall back to the partial reference matcher on the locale-form symptoms,
//! 6. fail with "no reliable diagnosis", or
//! 7. succeed with `(diagnosis, confidence)`.
//!
//! There are no loops or retries. The cascade only reads from the [`DiagnosisContext`] and keeps
//! all of its working state on the stack, so it is reentrant.

use crate::constants::{
    ACCEPT_CONFIDENCE, INCONCLUSIVE_DIAGNOSIS, REJECT_CONFIDENCE, RULE_CONFIDENCE,
};
use crate::context::DiagnosisContext;
use crate::vectorizer::vectorize;
use medassist_types::{DiagnosisLabel, SymptomName};
use serde::Serialize;
use std::collections::BTreeSet;

/// States the cascade passes through, recorded in order for each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeState {
    Start,
    ClassifierEvaluated,
    Downgraded,
    RuleExactApplied,
    RulePartialApplied,
    TerminalSuccess,
    TerminalFailure,
}

/// The stage that supplied the final diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisSource {
    Classifier,
    ExactRule,
    PartialRule,
}

/// A successful cascade result, before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeDiagnosis {
    pub diagnosis: DiagnosisLabel,
    /// Percentage in `[0, 100]`.
    pub confidence: f64,
    pub source: DiagnosisSource,
}

/// Terminal outcome of the cascade.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeOutcome {
    Diagnosed(CascadeDiagnosis),
    /// No stage produced an acceptable label. Callers must not enrich, report or record this.
    NoReliableDiagnosis,
}

/// A cascade outcome together with the states visited to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeRun {
    pub outcome: CascadeOutcome,
    pub trace: Vec<CascadeState>,
}

/// Working diagnosis between stages.
#[derive(Debug, Clone, PartialEq)]
enum Tentative {
    Unset,
    Inconclusive,
    Label(DiagnosisLabel, DiagnosisSource),
}

impl Tentative {
    fn is_unresolved(&self) -> bool {
        !matches!(self, Tentative::Label(..))
    }

    /// The diagnosis text as the rule table would see it.
    fn as_text(&self) -> Option<&str> {
        match self {
            Tentative::Unset => None,
            Tentative::Inconclusive => Some(INCONCLUSIVE_DIAGNOSIS),
            Tentative::Label(label, _) => Some(label.as_str()),
        }
    }
}

struct Trace(Vec<CascadeState>);

impl Trace {
    fn enter(&mut self, state: CascadeState) {
        tracing::debug!(?state, "cascade transition");
        self.0.push(state);
    }
}

/// Runs the cascade and returns only the outcome.
pub fn diagnose(ctx: &DiagnosisContext, symptoms: &[SymptomName]) -> CascadeOutcome {
    run_cascade(ctx, symptoms).outcome
}

/// Runs the cascade over locale-form `symptoms`, recording each state visited.
pub fn run_cascade(ctx: &DiagnosisContext, symptoms: &[SymptomName]) -> CascadeRun {
    let mut trace = Trace(Vec::with_capacity(6));
    trace.enter(CascadeState::Start);

    let locale: BTreeSet<SymptomName> = symptoms.iter().cloned().collect();

    // Canonical names are only used for the classifier; the rule stages keep the locale form.
    let classifier = ctx.classifier();
    let recognized: BTreeSet<&SymptomName> = locale
        .iter()
        .filter_map(|s| ctx.dictionary().normalize(s.as_str()))
        .filter(|canonical| classifier.columns().contains(canonical.as_str()))
        .collect();

    let mut diagnosis = Tentative::Unset;
    let mut confidence = 0.0_f64;

    if !recognized.is_empty() {
        let vector = vectorize(recognized.iter().copied(), classifier.columns());
        let classification = classifier.classify(&vector);
        confidence = classification.confidence();
        trace.enter(CascadeState::ClassifierEvaluated);
        tracing::debug!(
            recognized = recognized.len(),
            label = %classification.label(),
            confidence,
            "classifier evaluated"
        );

        if confidence >= ACCEPT_CONFIDENCE {
            diagnosis = Tentative::Label(
                classification.label().clone(),
                DiagnosisSource::Classifier,
            );
        }
    }

    if confidence < REJECT_CONFIDENCE {
        diagnosis = Tentative::Inconclusive;
        trace.enter(CascadeState::Downgraded);
    }

    if diagnosis.is_unresolved() {
        if let Some(label) = ctx.rules().match_exact(&locale) {
            diagnosis = Tentative::Label(label.clone(), DiagnosisSource::ExactRule);
            confidence = RULE_CONFIDENCE;
            trace.enter(CascadeState::RuleExactApplied);
        }
    }

    let produced_by_rules = diagnosis
        .as_text()
        .is_some_and(|text| ctx.rules().produces(text));
    if diagnosis.is_unresolved() && !produced_by_rules {
        if let Some(label) = ctx.diseases().match_partial(&locale) {
            diagnosis = Tentative::Label(label.clone(), DiagnosisSource::PartialRule);
            confidence = RULE_CONFIDENCE;
            trace.enter(CascadeState::RulePartialApplied);
        }
    }

    let outcome = match diagnosis {
        Tentative::Label(diagnosis, source) => {
            trace.enter(CascadeState::TerminalSuccess);
            CascadeOutcome::Diagnosed(CascadeDiagnosis {
                diagnosis,
                confidence,
                source,
            })
        }
        Tentative::Unset | Tentative::Inconclusive => {
            trace.enter(CascadeState::TerminalFailure);
            CascadeOutcome::NoReliableDiagnosis
        }
    };

    CascadeRun {
        outcome,
        trace: trace.0,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classifier::{Classification, Classifier};
    use crate::enrichment::EnrichmentTables;
    use crate::normalizer::SymptomDictionary;
    use crate::reference::{DiseaseReference, DiseaseTable};
    use crate::rules::{Rule, RuleTable};
    use crate::vectorizer::{FeatureColumns, FeatureVector};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Classifier that returns a fixed distribution and counts how often it is called.
    #[derive(Debug)]
    pub(crate) struct ScriptedClassifier {
        columns: FeatureColumns,
        distribution: Vec<(DiagnosisLabel, f64)>,
        calls: AtomicUsize,
    }

    impl ScriptedClassifier {
        pub(crate) fn new(columns: &[&str], distribution: &[(&str, f64)]) -> Self {
            Self {
                columns: FeatureColumns::new(
                    columns.iter().map(|c| symptom(c)).collect(),
                )
                .expect("columns"),
                distribution: distribution
                    .iter()
                    .map(|(l, p)| (label(l), *p))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Classifier for ScriptedClassifier {
        fn columns(&self) -> &FeatureColumns {
            &self.columns
        }

        fn classify(&self, vector: &FeatureVector) -> Classification {
            assert_eq!(vector.len(), self.columns.len());
            self.calls.fetch_add(1, Ordering::SeqCst);
            Classification::new(self.distribution.clone()).expect("valid distribution")
        }
    }

    pub(crate) fn symptom(s: &str) -> SymptomName {
        SymptomName::new(s).expect("valid symptom")
    }

    pub(crate) fn label(s: &str) -> DiagnosisLabel {
        DiagnosisLabel::new(s).expect("valid label")
    }

    pub(crate) fn symptoms(items: &[&str]) -> Vec<SymptomName> {
        items.iter().map(|s| symptom(s)).collect()
    }

    pub(crate) fn dictionary() -> SymptomDictionary {
        SymptomDictionary::from_pairs([
            (symptom("fever"), symptom("fiebre")),
            (symptom("cough"), symptom("tos")),
            (symptom("fatigue"), symptom("cansancio")),
            (symptom("rash"), symptom("sarpullido")),
        ])
    }

    pub(crate) fn context_with(
        classifier: Arc<ScriptedClassifier>,
        rules: Vec<(&str, &str)>,
        diseases: Vec<(&str, &str)>,
    ) -> DiagnosisContext {
        let rules = rules
            .into_iter()
            .map(|(key, dx)| Rule::from_key(key, label(dx)).expect("rule"))
            .collect();
        let diseases = diseases
            .into_iter()
            .map(|(dx, key)| DiseaseReference::new(label(dx), key).expect("row"))
            .collect();
        DiagnosisContext::new(
            dictionary(),
            classifier,
            RuleTable::new(rules),
            DiseaseTable::new(diseases),
            EnrichmentTables::default(),
        )
    }

    fn diagnosed(outcome: &CascadeOutcome) -> &CascadeDiagnosis {
        match outcome {
            CascadeOutcome::Diagnosed(d) => d,
            other => panic!("expected a diagnosis, got {other:?}"),
        }
    }

    #[test]
    fn accepts_confident_classifier_label() {
        let classifier = Arc::new(ScriptedClassifier::new(
            &["cough", "fever"],
            &[("flu", 0.85), ("cold", 0.15)],
        ));
        let ctx = context_with(classifier.clone(), vec![], vec![]);

        let run = run_cascade(&ctx, &symptoms(&["fiebre", "tos"]));
        let result = diagnosed(&run.outcome);

        assert_eq!(result.diagnosis.as_str(), "flu");
        assert!((result.confidence - 85.0).abs() < 1e-9);
        assert_eq!(result.source, DiagnosisSource::Classifier);
        assert_eq!(classifier.calls(), 1);
        assert_eq!(
            run.trace,
            vec![
                CascadeState::Start,
                CascadeState::ClassifierEvaluated,
                CascadeState::TerminalSuccess
            ]
        );
    }

    #[test]
    fn accepted_classifier_label_is_final_even_when_rules_match() {
        let classifier = Arc::new(ScriptedClassifier::new(
            &["cough", "fever"],
            &[("flu", 0.85), ("cold", 0.15)],
        ));
        let ctx = context_with(
            classifier.clone(),
            vec![("fiebre, tos", "Gripe")],
            vec![("Resfriado", "tos")],
        );

        let run = run_cascade(&ctx, &symptoms(&["fiebre", "tos"]));
        let result = diagnosed(&run.outcome);

        assert_eq!(result.diagnosis.as_str(), "flu");
        assert!((result.confidence - 85.0).abs() < 1e-9);
        assert_eq!(result.source, DiagnosisSource::Classifier);
        assert!(!run.trace.contains(&CascadeState::RuleExactApplied));
        assert!(!run.trace.contains(&CascadeState::RulePartialApplied));
    }

    #[test]
    fn unrecognized_symptoms_skip_classifier() {
        // "sarpullido" normalises to "rash", which is not a classifier column.
        let classifier = Arc::new(ScriptedClassifier::new(&["fever"], &[("flu", 1.0)]));
        let ctx = context_with(classifier.clone(), vec![], vec![]);

        let run = run_cascade(&ctx, &symptoms(&["sarpullido", "mareo"]));

        assert_eq!(classifier.calls(), 0);
        assert_eq!(run.outcome, CascadeOutcome::NoReliableDiagnosis);
        assert_eq!(
            run.trace,
            vec![
                CascadeState::Start,
                CascadeState::Downgraded,
                CascadeState::TerminalFailure
            ]
        );
    }

    #[test]
    fn acceptance_threshold_is_inclusive() {
        let classifier = Arc::new(ScriptedClassifier::new(
            &["fever"],
            &[("flu", 0.40), ("cold", 0.35), ("other", 0.25)],
        ));
        let ctx = context_with(classifier, vec![], vec![]);

        let outcome = diagnose(&ctx, &symptoms(&["fiebre"]));
        let result = diagnosed(&outcome);
        assert_eq!(result.diagnosis.as_str(), "flu");
        assert!((result.confidence - 40.0).abs() < 1e-9);
    }

    #[test]
    fn band_between_thresholds_leaves_diagnosis_unset_not_inconclusive() {
        let classifier = Arc::new(ScriptedClassifier::new(
            &["fever"],
            &[("flu", 0.35), ("cold", 0.33), ("other", 0.32)],
        ));
        let ctx = context_with(classifier, vec![("fiebre", "Infección")], vec![]);

        let run = run_cascade(&ctx, &symptoms(&["fiebre"]));
        let result = diagnosed(&run.outcome);

        assert_eq!(result.diagnosis.as_str(), "Infección");
        assert_eq!(result.confidence, RULE_CONFIDENCE);
        assert!(!run.trace.contains(&CascadeState::Downgraded));
        assert!(run.trace.contains(&CascadeState::RuleExactApplied));
    }

    #[test]
    fn band_between_thresholds_without_rules_fails() {
        let classifier = Arc::new(ScriptedClassifier::new(
            &["fever"],
            &[("flu", 0.35), ("cold", 0.33), ("other", 0.32)],
        ));
        let ctx = context_with(classifier, vec![], vec![]);

        assert_eq!(
            diagnose(&ctx, &symptoms(&["fiebre"])),
            CascadeOutcome::NoReliableDiagnosis
        );
    }

    #[test]
    fn low_confidence_is_downgraded_then_rescued_by_exact_rule() {
        let classifier = Arc::new(ScriptedClassifier::new(
            &["cough", "fever"],
            &[("flu", 0.25), ("cold", 0.25), ("a", 0.25), ("b", 0.25)],
        ));
        let ctx = context_with(
            classifier,
            vec![("fiebre, tos", "Gripe")],
            vec![("Resfriado", "tos")],
        );

        let run = run_cascade(&ctx, &symptoms(&["fiebre", "tos", "cansancio"]));
        let result = diagnosed(&run.outcome);

        assert_eq!(result.diagnosis.as_str(), "Gripe");
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.source, DiagnosisSource::ExactRule);
        assert_eq!(
            run.trace,
            vec![
                CascadeState::Start,
                CascadeState::ClassifierEvaluated,
                CascadeState::Downgraded,
                CascadeState::RuleExactApplied,
                CascadeState::TerminalSuccess
            ]
        );
    }

    #[test]
    fn exact_rule_requires_full_subset() {
        let classifier = Arc::new(ScriptedClassifier::new(&["fever"], &[("flu", 0.1), ("x", 0.9)]));
        let ctx = context_with(classifier, vec![("fiebre, tos", "Gripe")], vec![]);

        // "tos" is outside this classifier's columns, so only the rule stages run.
        let outcome = diagnose(&ctx, &symptoms(&["tos"]));
        assert_eq!(outcome, CascadeOutcome::NoReliableDiagnosis);
    }

    #[test]
    fn rules_match_locale_form_not_canonical() {
        let classifier = Arc::new(ScriptedClassifier::new(&["rash"], &[("x", 1.0)]));
        let ctx = context_with(
            classifier,
            vec![("fever", "Canonical"), ("fiebre", "Locale")],
            vec![],
        );

        let outcome = diagnose(&ctx, &symptoms(&["fiebre"]));
        assert_eq!(diagnosed(&outcome).diagnosis.as_str(), "Locale");
    }

    #[test]
    fn partial_match_returns_first_overlapping_row() {
        let classifier = Arc::new(ScriptedClassifier::new(&["rash"], &[("x", 1.0)]));
        let ctx = context_with(
            classifier.clone(),
            vec![],
            vec![
                ("Resfriado", "tos, estornudos"),
                ("Gripe", "fiebre, tos, cansancio"),
            ],
        );

        let run = run_cascade(&ctx, &symptoms(&["fiebre", "tos", "cansancio"]));
        let result = diagnosed(&run.outcome);

        assert_eq!(classifier.calls(), 0);
        assert_eq!(result.diagnosis.as_str(), "Resfriado");
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.source, DiagnosisSource::PartialRule);
        assert_eq!(
            run.trace,
            vec![
                CascadeState::Start,
                CascadeState::Downgraded,
                CascadeState::RulePartialApplied,
                CascadeState::TerminalSuccess
            ]
        );
    }

    #[test]
    fn exact_rule_takes_precedence_over_partial() {
        let classifier = Arc::new(ScriptedClassifier::new(&["rash"], &[("x", 1.0)]));
        let ctx = context_with(
            classifier,
            vec![("tos", "Bronquitis")],
            vec![("Resfriado", "tos")],
        );

        let outcome = diagnose(&ctx, &symptoms(&["tos"]));
        assert_eq!(diagnosed(&outcome).diagnosis.as_str(), "Bronquitis");
    }

    #[test]
    fn partial_stage_skipped_when_rules_produce_current_value() {
        // A rule whose output is the inconclusive sentinel itself blocks the partial stage.
        let classifier = Arc::new(ScriptedClassifier::new(&["rash"], &[("x", 1.0)]));
        let ctx = context_with(
            classifier,
            vec![("sarpullido, fiebre", INCONCLUSIVE_DIAGNOSIS)],
            vec![("Resfriado", "tos")],
        );

        let run = run_cascade(&ctx, &symptoms(&["tos"]));
        assert_eq!(run.outcome, CascadeOutcome::NoReliableDiagnosis);
        assert!(!run.trace.contains(&CascadeState::RulePartialApplied));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let classifier = Arc::new(ScriptedClassifier::new(
            &["cough", "fever"],
            &[("flu", 0.6), ("cold", 0.4)],
        ));
        let ctx = context_with(classifier, vec![("tos", "Resfriado")], vec![]);
        let input = symptoms(&["tos", "fiebre", "tos"]);

        let first = run_cascade(&ctx, &input);
        let second = run_cascade(&ctx, &input);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_fails_without_classifier_call() {
        let classifier = Arc::new(ScriptedClassifier::new(&["fever"], &[("flu", 1.0)]));
        let ctx = context_with(classifier.clone(), vec![], vec![("Gripe", "fiebre")]);

        assert_eq!(diagnose(&ctx, &[]), CascadeOutcome::NoReliableDiagnosis);
        assert_eq!(classifier.calls(), 0);
    }
}
