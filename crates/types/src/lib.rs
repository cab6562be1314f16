//! Validated text types shared across the medassist crates.
//!
//! Symptom names and diagnosis labels arrive from data files, HTTP bodies and the command line.
//! Wrapping them in these types means every later stage can rely on the value being trimmed and
//! non-empty without re-checking it.

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
    /// A symptom name contained the rule-key separator
    #[error("symptom name cannot contain ','")]
    ContainsSeparator,
}

fn trimmed(input: &str) -> Result<&str, TextError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TextError::Empty);
    }
    Ok(trimmed)
}

/// A single symptom identifier, either locale-form or canonical.
///
/// The input is trimmed of leading and trailing whitespace during construction but its case is
/// preserved: matching against rule keys is case-sensitive, while the reference table lowercases
/// its own side explicitly via [`SymptomName::to_lowercase`].
///
/// Commas are rejected because rule keys are comma-joined symptom lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymptomName(String);

impl SymptomName {
    /// Creates a new `SymptomName` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty, or
    /// `TextError::ContainsSeparator` if it contains a comma.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = trimmed(input.as_ref())?;
        if trimmed.contains(',') {
            return Err(TextError::ContainsSeparator);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns a lowercased copy of this name.
    pub fn to_lowercase(&self) -> Self {
        Self(self.0.to_lowercase())
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A diagnosis label as it appears in the rule, reference and enrichment tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiagnosisLabel(String);

impl DiagnosisLabel {
    /// Creates a new `DiagnosisLabel`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        Ok(Self(trimmed(input.as_ref())?.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_impls {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $ty {
            type Err = TextError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::new(s)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ty::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_impls!(SymptomName);
string_impls!(DiagnosisLabel);
