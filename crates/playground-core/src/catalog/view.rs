//! Precomputed catalog snapshot for a model picker.

use std::collections::BTreeMap;

use super::family::{FamilyMatcher, ModelFamily, OrderedContainment};
use super::group::ModelGroup;
use super::resolver::CatalogResolver;

/// Grouped catalog plus per-family counts, built once from the flat list
/// the engine reports at startup.
#[derive(Debug, Clone)]
pub struct CatalogView<M = OrderedContainment> {
    resolver: CatalogResolver<M>,
    groups: Vec<ModelGroup>,
    counts: BTreeMap<ModelFamily, usize>,
    popularity: Vec<(ModelFamily, usize)>,
    total: usize,
}

impl CatalogView {
    /// Build a view with the default family matcher.
    pub fn build<S: AsRef<str>>(ids: &[S]) -> Self {
        Self::with_resolver(CatalogResolver::new(), ids)
    }
}

impl<M: FamilyMatcher> CatalogView<M> {
    pub fn with_resolver<S: AsRef<str>>(resolver: CatalogResolver<M>, ids: &[S]) -> Self {
        let groups = resolver.group_and_sort(ids);
        let counts = resolver.count_per_family(ids);
        let popularity = resolver.families_by_popularity(ids);
        Self {
            resolver,
            groups,
            counts,
            popularity,
            total: ids.len(),
        }
    }

    /// All groups in display order.
    pub fn groups(&self) -> &[ModelGroup] {
        &self.groups
    }

    pub const fn counts(&self) -> &BTreeMap<ModelFamily, usize> {
        &self.counts
    }

    /// Families for the filter chip row, most populated first.
    pub fn families_by_popularity(&self) -> &[(ModelFamily, usize)] {
        &self.popularity
    }

    /// Number of identifiers the view was built from, familied or not.
    pub const fn total_models(&self) -> usize {
        self.total
    }

    pub fn resolver(&self) -> &CatalogResolver<M> {
        &self.resolver
    }

    pub fn search(&self, term: &str, families: &[ModelFamily]) -> Vec<ModelGroup> {
        self.resolver.filter(&self.groups, term, families)
    }

    /// Whether `id` is part of any group.
    pub fn contains(&self, id: &str) -> bool {
        self.groups
            .iter()
            .any(|group| group.variants.iter().any(|variant| variant == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_bundles_groups_and_counts() {
        let ids = vec![
            "SmolLM2-135M-Instruct-q0f16-MLC".to_string(),
            "SmolLM2-135M-Instruct-q0f32-MLC".to_string(),
            "Qwen2.5-0.5B-Instruct-q4f16_1-MLC".to_string(),
            "TinySwallow-1.5B-Instruct-q4f16_1-MLC".to_string(),
        ];
        let view = CatalogView::build(&ids);

        assert_eq!(view.total_models(), 4);
        assert_eq!(view.groups().len(), 2);
        assert_eq!(view.counts().get(&ModelFamily::Smollm), Some(&2));
        assert_eq!(view.families_by_popularity()[0], (ModelFamily::Smollm, 2));
        assert!(view.contains("Qwen2.5-0.5B-Instruct-q4f16_1-MLC"));
        assert!(!view.contains("TinySwallow-1.5B-Instruct-q4f16_1-MLC"));

        let hits = view.search("q0f32", &[]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_name, "SmolLM2 135M Instruct");
    }
}
