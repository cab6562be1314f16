//! Partial/overlap matcher over the disease-reference table.
//!
//! This is a deliberately weak fallback: it returns the first row, in table order, that shares
//! at least one symptom with the input. It does not look for the row with the largest overlap.

use crate::loader::read_yaml;
use crate::rules::parse_symptom_list;
use crate::{EngineError, EngineResult};
use medassist_types::{DiagnosisLabel, SymptomName};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// A diagnosis with its associated locale-form symptoms, lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseReference {
    diagnosis: DiagnosisLabel,
    symptoms: BTreeSet<SymptomName>,
}

impl DiseaseReference {
    /// Builds a row from a comma-separated symptom list; tokens are trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidText` if a token cannot form a symptom name.
    pub fn new(diagnosis: DiagnosisLabel, symptoms: &str) -> EngineResult<Self> {
        let symptoms = parse_symptom_list(symptoms)
            .map_err(|source| EngineError::InvalidText {
                table: "diseases",
                source,
            })?
            .iter()
            .map(SymptomName::to_lowercase)
            .collect();
        Ok(Self {
            diagnosis,
            symptoms,
        })
    }

    pub fn diagnosis(&self) -> &DiagnosisLabel {
        &self.diagnosis
    }

    pub fn symptoms(&self) -> &BTreeSet<SymptomName> {
        &self.symptoms
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceRow {
    diagnosis: DiagnosisLabel,
    symptoms: String,
}

/// Ordered disease-reference table.
#[derive(Debug, Clone, Default)]
pub struct DiseaseTable {
    rows: Vec<DiseaseReference>,
}

impl DiseaseTable {
    pub fn new(rows: Vec<DiseaseReference>) -> Self {
        Self { rows }
    }

    /// Loads the table from an ordered YAML list of `{ diagnosis, symptoms }` rows.
    ///
    /// Rows without symptoms are kept (they can never match) and logged.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw: Vec<ReferenceRow> = read_yaml(path)?;
        let mut rows = Vec::with_capacity(raw.len());
        for row in raw {
            let reference = DiseaseReference::new(row.diagnosis, &row.symptoms)?;
            if reference.symptoms.is_empty() {
                tracing::warn!("disease '{}' has no symptoms listed", reference.diagnosis);
            }
            rows.push(reference);
        }
        tracing::info!("loaded {} disease rows from {}", rows.len(), path.display());
        Ok(Self { rows })
    }

    /// Returns the diagnosis of the first row sharing any symptom with `symptoms`.
    ///
    /// The input is compared as given; only the table side is lowercased.
    pub fn match_partial(&self, symptoms: &BTreeSet<SymptomName>) -> Option<&DiagnosisLabel> {
        self.rows
            .iter()
            .find(|row| !row.symptoms.is_disjoint(symptoms))
            .map(DiseaseReference::diagnosis)
    }

    /// Every symptom mentioned by any row.
    pub fn symptom_terms(&self) -> impl Iterator<Item = &SymptomName> {
        self.rows.iter().flat_map(|row| row.symptoms.iter())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> DiagnosisLabel {
        DiagnosisLabel::new(s).expect("valid label")
    }

    fn input(items: &[&str]) -> BTreeSet<SymptomName> {
        items
            .iter()
            .map(|s| SymptomName::new(s).expect("valid symptom"))
            .collect()
    }

    #[test]
    fn first_overlapping_row_wins_over_larger_overlap() {
        let table = DiseaseTable::new(vec![
            DiseaseReference::new(label("Resfriado"), "tos, estornudos").expect("row"),
            DiseaseReference::new(label("Gripe"), "fiebre, tos, dolor muscular").expect("row"),
        ]);

        let hit = table.match_partial(&input(&["fiebre", "tos", "dolor muscular"]));
        assert_eq!(hit.map(DiagnosisLabel::as_str), Some("Resfriado"));
    }

    #[test]
    fn table_symptoms_are_lowercased_and_trimmed() {
        let table = DiseaseTable::new(vec![
            DiseaseReference::new(label("Migraña"), " Dolor de Cabeza ,Náuseas").expect("row")
        ]);
        let hit = table.match_partial(&input(&["dolor de cabeza"]));
        assert_eq!(hit.map(DiagnosisLabel::as_str), Some("Migraña"));
    }

    #[test]
    fn input_is_not_lowercased() {
        let table = DiseaseTable::new(vec![
            DiseaseReference::new(label("Gripe"), "fiebre").expect("row")
        ]);
        assert!(table.match_partial(&input(&["FIEBRE"])).is_none());
    }

    #[test]
    fn no_overlap_is_none() {
        let table = DiseaseTable::new(vec![
            DiseaseReference::new(label("Gripe"), "fiebre, tos").expect("row")
        ]);
        assert!(table.match_partial(&input(&["sarpullido"])).is_none());
        assert!(table.match_partial(&BTreeSet::new()).is_none());
    }

    #[test]
    fn load_keeps_rows_without_symptoms() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("diseases.yaml");
        std::fs::write(
            &path,
            "- diagnosis: Vacía\n  symptoms: \"\"\n- diagnosis: Gripe\n  symptoms: \"Fiebre, tos\"\n",
        )
        .expect("write");

        let table = DiseaseTable::load(&path).expect("load");
        assert_eq!(table.len(), 2);
        let hit = table.match_partial(&input(&["fiebre"])).cloned();
        assert_eq!(hit, Some(label("Gripe")));
    }
}
