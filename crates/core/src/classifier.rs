//! Classifier adapter.
//!
//! The cascade only sees the [`Classifier`] trait: a fixed feature vocabulary plus a single call
//! returning the top label together with the full distribution it was taken from. The shipped
//! implementation is a multinomial logistic scorer read from a JSON artifact; any other
//! pretrained model can sit behind the same trait.

use crate::loader::read_json;
use crate::vectorizer::{FeatureColumns, FeatureVector};
use crate::{EngineError, EngineResult};
use medassist_types::{DiagnosisLabel, SymptomName};
use serde::Deserialize;
use std::path::Path;

/// One classifier inference: the top label and the distribution it was taken from.
///
/// The top label is always the first class holding the maximum probability, so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    top: usize,
    distribution: Vec<(DiagnosisLabel, f64)>,
}

impl Classification {
    /// Builds a classification from a probability distribution over labels.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidModel` if the distribution is empty or contains a
    /// probability that is not a finite value in `[0, 1]`.
    pub fn new(distribution: Vec<(DiagnosisLabel, f64)>) -> EngineResult<Self> {
        if distribution.is_empty() {
            return Err(EngineError::InvalidModel(
                "probability distribution is empty".into(),
            ));
        }
        if let Some((label, p)) = distribution
            .iter()
            .find(|(_, p)| !p.is_finite() || *p < 0.0 || *p > 1.0)
        {
            return Err(EngineError::InvalidModel(format!(
                "probability {} for '{}' is outside [0, 1]",
                p, label
            )));
        }
        Ok(Self {
            top: argmax(distribution.iter().map(|(_, p)| *p)),
            distribution,
        })
    }

    /// The most likely label.
    pub fn label(&self) -> &DiagnosisLabel {
        &self.distribution[self.top].0
    }

    /// The maximum probability in the distribution.
    pub fn max_probability(&self) -> f64 {
        self.distribution[self.top].1
    }

    /// The maximum probability expressed as a percentage.
    pub fn confidence(&self) -> f64 {
        self.max_probability() * 100.0
    }

    pub fn distribution(&self) -> &[(DiagnosisLabel, f64)] {
        &self.distribution
    }
}

/// Index of the first maximum; 0 for an empty iterator.
fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (index, value) in values.enumerate() {
        if value > best.1 {
            best = (index, value);
        }
    }
    best.0
}

/// An opaque pretrained multi-class probabilistic classifier.
///
/// Implementations must be safe to share across request handlers; inference takes `&self` and
/// must not mutate model state.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// The feature vocabulary, in the column order `classify` expects.
    fn columns(&self) -> &FeatureColumns;

    /// Scores a feature vector built against [`Classifier::columns`].
    fn classify(&self, vector: &FeatureVector) -> Classification;
}

/// On-disk layout of the classifier artifact.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelArtifact {
    columns: Vec<SymptomName>,
    classes: Vec<DiagnosisLabel>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// Multinomial logistic regression: softmax over `weights · x + intercept` per class.
#[derive(Debug, Clone)]
pub struct SoftmaxClassifier {
    columns: FeatureColumns,
    classes: Vec<DiagnosisLabel>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl SoftmaxClassifier {
    /// Creates a classifier after checking that every dimension lines up.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidModel` if:
    /// - there are no classes or no columns,
    /// - a column name is duplicated,
    /// - the weight matrix is not `classes × columns`,
    /// - the intercepts are not one per class,
    /// - any coefficient is not finite.
    pub fn new(
        columns: Vec<SymptomName>,
        classes: Vec<DiagnosisLabel>,
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> EngineResult<Self> {
        if classes.is_empty() {
            return Err(EngineError::InvalidModel("model has no classes".into()));
        }
        if columns.is_empty() {
            return Err(EngineError::InvalidModel("model has no feature columns".into()));
        }
        let columns = FeatureColumns::new(columns)?;

        if weights.len() != classes.len() {
            return Err(EngineError::InvalidModel(format!(
                "expected {} weight rows, found {}",
                classes.len(),
                weights.len()
            )));
        }
        if let Some((row, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| w.len() != columns.len())
        {
            return Err(EngineError::InvalidModel(format!(
                "weight row {} has {} entries, expected {}",
                row,
                w.len(),
                columns.len()
            )));
        }
        if intercepts.len() != classes.len() {
            return Err(EngineError::InvalidModel(format!(
                "expected {} intercepts, found {}",
                classes.len(),
                intercepts.len()
            )));
        }
        let all_finite = weights
            .iter()
            .flatten()
            .chain(intercepts.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(EngineError::InvalidModel(
                "model coefficients must be finite".into(),
            ));
        }

        Ok(Self {
            columns,
            classes,
            weights,
            intercepts,
        })
    }

    /// Loads the classifier artifact from JSON.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the file cannot be read or parsed, or if the artifact is
    /// internally inconsistent (see [`SoftmaxClassifier::new`]).
    pub fn load(path: &Path) -> EngineResult<Self> {
        let artifact: ModelArtifact = read_json(path)?;
        let model = Self::new(
            artifact.columns,
            artifact.classes,
            artifact.weights,
            artifact.intercepts,
        )?;
        tracing::info!(
            "loaded classifier with {} columns and {} classes from {}",
            model.columns.len(),
            model.classes.len(),
            path.display()
        );
        Ok(model)
    }

    pub fn classes(&self) -> &[DiagnosisLabel] {
        &self.classes
    }
}

impl Classifier for SoftmaxClassifier {
    fn columns(&self) -> &FeatureColumns {
        &self.columns
    }

    fn classify(&self, vector: &FeatureVector) -> Classification {
        debug_assert_eq!(vector.len(), self.columns.len());

        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| {
                row.iter()
                    .zip(vector.as_slice())
                    .map(|(w, &x)| w * f64::from(x))
                    .sum::<f64>()
                    + intercept
            })
            .collect();

        // Shift by the max logit so exp() cannot overflow.
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        let distribution: Vec<(DiagnosisLabel, f64)> = self
            .classes
            .iter()
            .cloned()
            .zip(exps.iter().map(|e| e / total))
            .collect();

        Classification {
            top: argmax(distribution.iter().map(|(_, p)| *p)),
            distribution,
        }
    }
}
