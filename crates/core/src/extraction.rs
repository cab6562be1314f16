//! Symptom extraction from free text.
//!
//! Real extraction is an external concern; anything implementing [`SymptomExtractor`] can be
//! plugged into the diagnosis service. [`KeywordExtractor`] is the built-in fallback: it looks
//! for known locale-form symptom terms on word boundaries.

use crate::context::DiagnosisContext;
use medassist_types::SymptomName;
use std::collections::HashMap;

/// Turns free text into an ordered, deduplicated list of locale-form symptoms.
pub trait SymptomExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<SymptomName>;
}

/// Case-insensitive keyword spotter over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    /// Lowercased search term → the form emitted for it.
    terms: HashMap<String, SymptomName>,
}

impl KeywordExtractor {
    /// Builds an extractor from a vocabulary. When two terms only differ by case the first one
    /// supplied is emitted.
    pub fn new<'a>(vocabulary: impl IntoIterator<Item = &'a SymptomName>) -> Self {
        let mut terms = HashMap::new();
        for term in vocabulary {
            terms
                .entry(term.as_str().to_lowercase())
                .or_insert_with(|| term.clone());
        }
        Self { terms }
    }

    /// Builds an extractor over every locale-form symptom the context knows about: the
    /// dictionary, the rule keys and the disease-reference rows.
    pub fn from_context(ctx: &DiagnosisContext) -> Self {
        let mut dictionary: Vec<&SymptomName> = ctx.dictionary().locale_terms().collect();
        dictionary.sort();
        let rules = ctx.rules().rules().iter().flat_map(|rule| rule.symptoms());
        Self::new(
            dictionary
                .into_iter()
                .chain(rules)
                .chain(ctx.diseases().symptom_terms()),
        )
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphanumeric)
}

impl SymptomExtractor for KeywordExtractor {
    fn extract(&self, text: &str) -> Vec<SymptomName> {
        let haystack = text.to_lowercase();

        let mut hits: Vec<(usize, usize, &SymptomName)> = Vec::new();
        for (term, emitted) in &self.terms {
            for (start, _) in haystack.match_indices(term.as_str()) {
                let end = start + term.len();
                let before = haystack[..start].chars().next_back();
                let after = haystack[end..].chars().next();
                if !is_word_char(before) && !is_word_char(after) {
                    hits.push((start, end, emitted));
                }
            }
        }

        // Earliest first; at the same position the longest term wins.
        hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut found: Vec<SymptomName> = Vec::new();
        let mut covered = 0;
        for (start, end, emitted) in hits {
            if start < covered {
                continue;
            }
            covered = end;
            if !found.contains(emitted) {
                found.push(emitted.clone());
            }
        }
        found
    }
}
