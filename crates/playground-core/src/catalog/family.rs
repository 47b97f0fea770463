//! Model family detection.
//!
//! Families are inferred from opaque identifiers by substring matching,
//! which is fuzzy by nature. The policy sits behind [`FamilyMatcher`] so a
//! stricter structured catalog can replace it without touching callers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Coarse model-origin label.
///
/// `Ord` follows declaration order, which is also the matching priority.
/// Sorting *by name* uses [`ModelFamily::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Llama,
    Phi,
    Mistral,
    Gemma,
    Snowflake,
    Qwen,
    Smollm,
}

/// Known families in matching priority order.
pub const KNOWN_FAMILIES: &[ModelFamily] = &[
    ModelFamily::Llama,
    ModelFamily::Phi,
    ModelFamily::Mistral,
    ModelFamily::Gemma,
    ModelFamily::Snowflake,
    ModelFamily::Qwen,
    ModelFamily::Smollm,
];

impl ModelFamily {
    /// Lowercase key used for substring matching and lexicographic sorting.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Llama => "llama",
            Self::Phi => "phi",
            Self::Mistral => "mistral",
            Self::Gemma => "gemma",
            Self::Snowflake => "snowflake",
            Self::Qwen => "qwen",
            Self::Smollm => "smollm",
        }
    }

    /// Capitalized label for filter chips and headers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Llama => "Llama",
            Self::Phi => "Phi",
            Self::Mistral => "Mistral",
            Self::Gemma => "Gemma",
            Self::Snowflake => "Snowflake",
            Self::Qwen => "Qwen",
            Self::Smollm => "Smollm",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown family name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown model family: {0}")]
pub struct UnknownFamily(pub String);

impl FromStr for ModelFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        KNOWN_FAMILIES
            .iter()
            .copied()
            .find(|family| family.as_str() == key)
            .ok_or_else(|| UnknownFamily(s.to_string()))
    }
}

/// Policy that maps a model identifier to its family.
pub trait FamilyMatcher: Send + Sync {
    /// Resolve the family of `id`, or `None` if it has no known family.
    fn resolve(&self, id: &str) -> Option<ModelFamily>;

    /// Families this matcher can produce, in priority order.
    fn families(&self) -> &[ModelFamily];
}

/// Case-insensitive substring containment over an ordered family list.
///
/// The first family whose key occurs in the lowercased identifier wins, so
/// list order is policy: more specific or more likely families go first.
#[derive(Debug, Clone)]
pub struct OrderedContainment {
    families: Cow<'static, [ModelFamily]>,
}

impl OrderedContainment {
    /// Create a matcher over a custom priority order.
    #[must_use]
    pub fn new(families: Vec<ModelFamily>) -> Self {
        Self {
            families: Cow::Owned(families),
        }
    }

    /// Matcher over [`KNOWN_FAMILIES`].
    #[must_use]
    pub const fn known() -> Self {
        Self {
            families: Cow::Borrowed(KNOWN_FAMILIES),
        }
    }
}

impl Default for OrderedContainment {
    fn default() -> Self {
        Self::known()
    }
}

impl FamilyMatcher for OrderedContainment {
    fn resolve(&self, id: &str) -> Option<ModelFamily> {
        let lowered = id.to_lowercase();
        self.families
            .iter()
            .copied()
            .find(|family| lowered.contains(family.as_str()))
    }

    fn families(&self) -> &[ModelFamily] {
        &self.families
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_case_insensitively() {
        let matcher = OrderedContainment::default();
        assert_eq!(
            matcher.resolve("Mistral-7B-Instruct-v0.2-q4f16_1-MLC"),
            Some(ModelFamily::Mistral)
        );
        assert_eq!(
            matcher.resolve("SmolLM2-360M-Instruct-q0f16-MLC"),
            Some(ModelFamily::Smollm)
        );
        assert_eq!(
            matcher.resolve("snowflake-arctic-embed-m-q0f32-MLC-b4"),
            Some(ModelFamily::Snowflake)
        );
    }

    #[test]
    fn test_first_declared_family_wins() {
        // Contains both "llama" and "phi"; llama is declared first.
        let matcher = OrderedContainment::default();
        assert_eq!(matcher.resolve("TinyLlama-phi-merge"), Some(ModelFamily::Llama));

        let reversed = OrderedContainment::new(vec![ModelFamily::Phi, ModelFamily::Llama]);
        assert_eq!(reversed.resolve("TinyLlama-phi-merge"), Some(ModelFamily::Phi));
    }

    #[test]
    fn test_unknown_family() {
        let matcher = OrderedContainment::default();
        assert_eq!(matcher.resolve("RedPajama-INCITE-Chat-3B-v1-q4f16_1-MLC"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Qwen".parse::<ModelFamily>(), Ok(ModelFamily::Qwen));
        assert!("falcon".parse::<ModelFamily>().is_err());
    }
}
