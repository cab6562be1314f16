//! Exact/subset rule matcher.
//!
//! Each rule is keyed by a comma-joined list of locale-form symptoms. A rule fires when every
//! one of its symptoms is present in the input; extra input symptoms do not prevent a match.
//! Rules are held in file order and the first firing rule wins.

use crate::loader::read_yaml;
use crate::{EngineError, EngineResult};
use medassist_types::{DiagnosisLabel, SymptomName};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Splits a comma-joined rule key into trimmed symptom names.
///
/// Every token must be a symptom: a key such as `"fiebre,"` is rejected with
/// `TextError::Empty` instead of being read as `"fiebre"`.
pub fn parse_symptom_key(key: &str) -> Result<BTreeSet<SymptomName>, medassist_types::TextError> {
    key.split(',').map(SymptomName::new).collect()
}

/// Splits a comma-separated symptom list, skipping empty tokens.
///
/// Used for reference rows, where an empty token could never overlap a symptom anyway.
pub(crate) fn parse_symptom_list(
    list: &str,
) -> Result<BTreeSet<SymptomName>, medassist_types::TextError> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(SymptomName::new)
        .collect()
}

/// A single symptom-set → diagnosis rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    symptoms: BTreeSet<SymptomName>,
    diagnosis: DiagnosisLabel,
}

impl Rule {
    /// Builds a rule from its comma-joined key.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidText` if any token of the key is empty.
    pub fn from_key(key: &str, diagnosis: DiagnosisLabel) -> EngineResult<Self> {
        let symptoms = parse_symptom_key(key).map_err(|source| EngineError::InvalidText {
            table: "rules",
            source,
        })?;
        Ok(Self {
            symptoms,
            diagnosis,
        })
    }

    pub fn symptoms(&self) -> &BTreeSet<SymptomName> {
        &self.symptoms
    }

    pub fn diagnosis(&self) -> &DiagnosisLabel {
        &self.diagnosis
    }

    fn matches(&self, input: &BTreeSet<SymptomName>) -> bool {
        self.symptoms.is_subset(input)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleRow {
    symptoms: String,
    diagnosis: DiagnosisLabel,
}

/// Ordered table of exact rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Loads the rule table from an ordered YAML list of `{ symptoms, diagnosis }` rows.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the file cannot be read or parsed, or a key has an empty token.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let rows: Vec<RuleRow> = read_yaml(path)?;
        let rules = rows
            .into_iter()
            .map(|row| Rule::from_key(&row.symptoms, row.diagnosis))
            .collect::<EngineResult<Vec<_>>>()?;
        tracing::info!("loaded {} rules from {}", rules.len(), path.display());
        Ok(Self { rules })
    }

    /// Returns the diagnosis of the first rule whose symptoms are all present in `symptoms`.
    pub fn match_exact(&self, symptoms: &BTreeSet<SymptomName>) -> Option<&DiagnosisLabel> {
        self.rules
            .iter()
            .find(|rule| rule.matches(symptoms))
            .map(Rule::diagnosis)
    }

    /// Whether any rule in the table produces `diagnosis`.
    pub fn produces(&self, diagnosis: &str) -> bool {
        self.rules.iter().any(|rule| rule.diagnosis.as_str() == diagnosis)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
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

    fn table() -> RuleTable {
        RuleTable::new(vec![
            Rule::from_key("fiebre, tos", label("Gripe")).expect("rule"),
            Rule::from_key("fiebre", label("Infección")).expect("rule"),
            Rule::from_key("nauseas ,vomito", label("Gastroenteritis")).expect("rule"),
        ])
    }

    #[test]
    fn subset_matches_with_extra_symptoms() {
        let table = table();
        let hit = table.match_exact(&input(&["cansancio", "tos", "fiebre"]));
        assert_eq!(hit.map(DiagnosisLabel::as_str), Some("Gripe"));
    }

    #[test]
    fn partial_key_does_not_match() {
        let table = RuleTable::new(vec![
            Rule::from_key("fiebre, tos", label("Gripe")).expect("rule")
        ]);
        assert!(table.match_exact(&input(&["fiebre"])).is_none());
    }

    #[test]
    fn first_matching_rule_wins() {
        // Both "fiebre, tos" and "fiebre" match; the earlier row is returned.
        let hit = table().match_exact(&input(&["fiebre", "tos"])).cloned();
        assert_eq!(hit, Some(label("Gripe")));

        let hit = table().match_exact(&input(&["fiebre"])).cloned();
        assert_eq!(hit, Some(label("Infección")));
    }

    #[test]
    fn key_tokens_are_trimmed() {
        let hit = table().match_exact(&input(&["vomito", "nauseas"])).cloned();
        assert_eq!(hit, Some(label("Gastroenteritis")));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(table().match_exact(&input(&["Fiebre"])).is_none());
    }

    #[test]
    fn produces_checks_rule_outputs() {
        let table = table();
        assert!(table.produces("Gripe"));
        assert!(!table.produces("Migraña"));
    }

    #[test]
    fn rejects_key_with_empty_token() {
        for key in ["fiebre,", "fiebre,,tos", ", tos"] {
            let err = Rule::from_key(key, label("Gripe")).expect_err("should reject");
            assert!(matches!(
                err,
                EngineError::InvalidText {
                    table: "rules",
                    source: medassist_types::TextError::Empty
                }
            ));
        }
    }

    #[test]
    fn rejects_empty_key() {
        let err = Rule::from_key(" , ", label("Nada")).expect_err("should reject");
        assert!(matches!(err, EngineError::InvalidText { table: "rules", .. }));
    }

    #[test]
    fn load_preserves_file_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("rules.yaml");
        std::fs::write(
            &path,
            "- symptoms: \"tos\"\n  diagnosis: Resfriado\n- symptoms: \"tos, fiebre\"\n  diagnosis: Gripe\n",
        )
        .expect("write");

        let table = RuleTable::load(&path).expect("load");
        assert_eq!(table.len(), 2);
        let hit = table.match_exact(&input(&["tos", "fiebre"])).cloned();
        assert_eq!(hit, Some(label("Resfriado")));
    }
}
