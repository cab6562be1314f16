//! Binary feature vectors aligned to the classifier's known columns.

use crate::{EngineError, EngineResult};
use medassist_types::SymptomName;
use std::collections::HashMap;

/// The classifier's feature vocabulary, in canonical column order.
#[derive(Debug, Clone)]
pub struct FeatureColumns {
    names: Vec<SymptomName>,
    index: HashMap<SymptomName, usize>,
}

impl FeatureColumns {
    /// Creates the column set.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidModel` if the same column name appears twice, since the
    /// vector position of that symptom would be ambiguous.
    pub fn new(names: Vec<SymptomName>) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(EngineError::InvalidModel(format!(
                    "duplicate feature column '{}'",
                    name
                )));
            }
        }
        Ok(Self { names, index })
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.index.contains_key(symptom)
    }

    pub fn names(&self) -> &[SymptomName] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Fixed-length 0/1 vector, one position per known feature column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of positions set to 1.
    pub fn active(&self) -> usize {
        self.0.iter().filter(|&&v| v == 1).count()
    }
}

/// Turns a set of canonical symptom names into a feature vector.
///
/// Each position is 1 if that column's name is among `canonical`, otherwise 0. Names that are
/// not known columns are ignored. The result always has `columns.len()` positions.
pub fn vectorize<'a>(
    canonical: impl IntoIterator<Item = &'a SymptomName>,
    columns: &FeatureColumns,
) -> FeatureVector {
    let mut values = vec![0u8; columns.len()];
    for symptom in canonical {
        if let Some(&position) = columns.index.get(symptom) {
            values[position] = 1;
        }
    }
    FeatureVector(values)
}
