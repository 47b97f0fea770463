//! Base-model groups of catalog variants.

use serde::{Deserialize, Serialize};

use super::family::{FamilyMatcher, ModelFamily, OrderedContainment};
use super::name::parse_name;

/// All variants sharing one display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelGroup {
    pub display_name: String,
    /// Raw identifiers, lexicographically sorted, without duplicates.
    pub variants: Vec<String>,
}

impl ModelGroup {
    /// Identifier whose family decides the group's family.
    #[must_use]
    pub fn first_variant(&self) -> Option<&str> {
        self.variants.first().map(String::as_str)
    }

    /// Family of the first variant under `matcher`.
    #[must_use]
    pub fn family_with<M: FamilyMatcher + ?Sized>(&self, matcher: &M) -> Option<ModelFamily> {
        self.first_variant().and_then(|id| matcher.resolve(id))
    }

    /// Family under [`OrderedContainment::known`].
    ///
    /// Groups built by a resolver with another matcher should be asked
    /// through [`CatalogResolver::group_family`](super::CatalogResolver::group_family).
    #[must_use]
    pub fn family(&self) -> Option<ModelFamily> {
        self.family_with(&OrderedContainment::known())
    }

    /// Single-variant groups are selected directly instead of expanded.
    #[must_use]
    pub const fn has_single_variant(&self) -> bool {
        self.variants.len() == 1
    }

    /// Whether the display name or any variant contains `term`, ignoring case.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.display_name.to_lowercase().contains(&term)
            || self
                .variants
                .iter()
                .any(|variant| variant.to_lowercase().contains(&term))
    }
}

/// Label for one variant row: its quant badge, or the raw id when it has none.
#[must_use]
pub fn variant_label(id: &str) -> String {
    parse_name(id).quant_badge.unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, variants: &[&str]) -> ModelGroup {
        ModelGroup {
            display_name: name.to_string(),
            variants: variants.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_search_matches_name_or_variant() {
        let g = group(
            "Llama 3 8B Instruct",
            &["Llama-3-8B-Instruct-q4f16_1-MLC", "Llama-3-8B-Instruct-q4f32_1-MLC"],
        );
        assert!(g.matches_search(""));
        assert!(g.matches_search("8b instruct"));
        assert!(g.matches_search("Q4F32"));
        assert!(!g.matches_search("mistral"));
    }

    #[test]
    fn test_family_follows_first_variant() {
        let g = group("Qwen2 0.5B Instruct", &["Qwen2-0.5B-Instruct-q0f16-MLC"]);
        assert_eq!(g.family(), Some(ModelFamily::Qwen));
        assert!(g.has_single_variant());
        assert_eq!(group("empty", &[]).family(), None);
    }

    #[test]
    fn test_variant_label_falls_back_to_id() {
        assert_eq!(variant_label("gemma-2-2b-it-q4f16_1-MLC"), "q4f16_1");
        assert_eq!(variant_label("phi-3-mini"), "phi-3-mini");
    }
}
