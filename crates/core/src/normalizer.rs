//! Locale-form ↔ canonical symptom dictionary.
//!
//! The data file maps each canonical symptom (the classifier's vocabulary) to the user-facing
//! locale form. Normalisation runs the other way, so the table is inverted once at load time.

use crate::loader::read_json;
use crate::EngineResult;
use medassist_types::SymptomName;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

/// `(canonical, locale)` pairs in the order they appear in the data file.
struct OrderedPairs(Vec<(SymptomName, SymptomName)>);

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = OrderedPairs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of canonical to locale-form symptom names")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(pair) = map.next_entry()? {
                    pairs.push(pair);
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

/// Bidirectional symptom dictionary.
#[derive(Debug, Clone, Default)]
pub struct SymptomDictionary {
    to_locale: BTreeMap<SymptomName, SymptomName>,
    to_canonical: HashMap<SymptomName, SymptomName>,
}

impl SymptomDictionary {
    /// Builds a dictionary from `(canonical, locale)` pairs, in file order.
    ///
    /// A later pair for the same canonical name replaces its earlier locale form. When two
    /// canonical names share a locale form, the later one wins for normalisation and a warning is
    /// logged.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (SymptomName, SymptomName)>) -> Self {
        // Keeps each canonical name at its first position with its last locale form.
        let mut ordered: Vec<(SymptomName, SymptomName)> = Vec::new();
        let mut position: HashMap<SymptomName, usize> = HashMap::new();
        for (canonical, locale) in pairs {
            match position.get(&canonical) {
                Some(&index) => ordered[index].1 = locale,
                None => {
                    position.insert(canonical.clone(), ordered.len());
                    ordered.push((canonical, locale));
                }
            }
        }

        let mut to_canonical: HashMap<SymptomName, SymptomName> =
            HashMap::with_capacity(ordered.len());
        for (canonical, locale) in &ordered {
            if let Some(replaced) = to_canonical.insert(locale.clone(), canonical.clone()) {
                tracing::warn!(
                    "locale symptom '{}' maps to both '{}' and '{}'; keeping '{}'",
                    locale,
                    replaced,
                    canonical,
                    canonical
                );
            }
        }

        Self {
            to_locale: ordered.into_iter().collect(),
            to_canonical,
        }
    }

    /// Loads the dictionary from a JSON object of canonical → locale-form names.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the file cannot be read or is not a JSON object of non-empty
    /// strings.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let OrderedPairs(pairs) = read_json(path)?;
        let dictionary = Self::from_pairs(pairs);
        tracing::info!(
            "loaded {} symptom dictionary entries from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Maps a locale-form symptom to its canonical name.
    ///
    /// An unknown symptom is a valid outcome and yields `None`.
    pub fn normalize(&self, local: &str) -> Option<&SymptomName> {
        self.to_canonical.get(local)
    }

    /// Maps a canonical symptom to its locale form.
    pub fn localize(&self, canonical: &str) -> Option<&SymptomName> {
        self.to_locale.get(canonical)
    }

    /// All locale-form symptom names known to the dictionary.
    pub fn locale_terms(&self) -> impl Iterator<Item = &SymptomName> {
        self.to_canonical.keys()
    }

    pub fn len(&self) -> usize {
        self.to_locale.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_locale.is_empty()
    }
}
