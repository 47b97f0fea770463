//! Grouping, sorting and filtering of the flat model catalog.

use std::collections::{BTreeMap, HashMap};

use super::family::{FamilyMatcher, ModelFamily, OrderedContainment};
use super::group::ModelGroup;
use super::name::parse_name;

/// Catalog operations parameterized over a family-matching policy.
///
/// All methods are pure: the same input always yields the same output.
#[derive(Debug, Clone, Default)]
pub struct CatalogResolver<M = OrderedContainment> {
    matcher: M,
}

impl CatalogResolver {
    /// Resolver using [`OrderedContainment`] over the known families.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            matcher: OrderedContainment::known(),
        }
    }
}

impl<M: FamilyMatcher> CatalogResolver<M> {
    pub const fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    pub const fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn resolve_family(&self, id: &str) -> Option<ModelFamily> {
        self.matcher.resolve(id)
    }

    /// Family of a group, decided by its first variant.
    pub fn group_family(&self, group: &ModelGroup) -> Option<ModelFamily> {
        group.family_with(&self.matcher)
    }

    /// Group identifiers by display name and sort the groups by family name.
    ///
    /// Identifiers without a family are dropped. Variants are sorted
    /// lexicographically and deduplicated. Groups of the same family keep
    /// the order in which their display name first appeared.
    pub fn group_and_sort<S: AsRef<str>>(&self, ids: &[S]) -> Vec<ModelGroup> {
        let mut groups: Vec<ModelGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for id in ids {
            let id = id.as_ref();
            if self.resolve_family(id).is_none() {
                continue;
            }
            let display_name = parse_name(id).display_name;
            let slot = *index.entry(display_name.clone()).or_insert_with(|| {
                groups.push(ModelGroup {
                    display_name,
                    variants: Vec::new(),
                });
                groups.len() - 1
            });
            let variants = &mut groups[slot].variants;
            if !variants.iter().any(|existing| existing == id) {
                variants.push(id.to_string());
            }
        }

        for group in &mut groups {
            group.variants.sort();
        }
        // sort_by_cached_key is stable
        groups.sort_by_cached_key(|group| self.group_family(group).map_or("", |f| f.as_str()));
        groups
    }

    /// Conjunction of the text filter and the family filter.
    ///
    /// An empty `search_term` and an empty `selected` set both pass
    /// everything, so `filter(groups, "", &[])` is the identity.
    pub fn filter(
        &self,
        groups: &[ModelGroup],
        search_term: &str,
        selected: &[ModelFamily],
    ) -> Vec<ModelGroup> {
        groups
            .iter()
            .filter(|group| group.matches_search(search_term))
            .filter(|group| {
                selected.is_empty()
                    || self
                        .group_family(group)
                        .is_some_and(|family| selected.contains(&family))
            })
            .cloned()
            .collect()
    }

    /// Number of identifiers per resolved family.
    pub fn count_per_family<S: AsRef<str>>(&self, ids: &[S]) -> BTreeMap<ModelFamily, usize> {
        let mut counts = BTreeMap::new();
        for family in ids.iter().filter_map(|id| self.resolve_family(id.as_ref())) {
            *counts.entry(family).or_insert(0) += 1;
        }
        counts
    }

    /// Every family the matcher knows, most models first.
    ///
    /// Families without models are included with a count of zero. Ties keep
    /// the matcher's priority order.
    pub fn families_by_popularity<S: AsRef<str>>(&self, ids: &[S]) -> Vec<(ModelFamily, usize)> {
        let counts = self.count_per_family(ids);
        let mut ranked: Vec<(ModelFamily, usize)> = self
            .matcher
            .families()
            .iter()
            .map(|family| (*family, counts.get(family).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Add `family` to the selection if absent, remove it if present.
pub fn toggle_family(selected: &mut Vec<ModelFamily>, family: ModelFamily) {
    if let Some(pos) = selected.iter().position(|f| *f == family) {
        selected.remove(pos);
    } else {
        selected.push(family);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &[&str] = &[
        "Phi-3-mini-4k-instruct-q4f16_1-MLC",
        "Llama-3-8B-Instruct-q4f32_1-MLC",
        "RedPajama-INCITE-Chat-3B-v1-q4f16_1-MLC",
        "Llama-3-8B-Instruct-q4f16_1-MLC",
        "gemma-2-2b-it-q4f16_1-MLC",
        "Mistral-7B-Instruct-v0.3-q4f16_1-MLC",
        "Llama-3.1-8B-Instruct-q4f16_1-MLC",
    ];

    fn names(groups: &[ModelGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.display_name.as_str()).collect()
    }

    #[test]
    fn test_groups_sorted_by_family_name() {
        let groups = CatalogResolver::new().group_and_sort(CATALOG);
        assert_eq!(
            names(&groups),
            vec![
                "gemma 2 2b it",
                "Llama 3 8B Instruct",
                "Llama 3.1 8B Instruct",
                "Mistral 7B Instruct v0.3",
                "Phi 3 mini 4k instruct",
            ]
        );
        assert_eq!(
            groups[1].variants,
            vec![
                "Llama-3-8B-Instruct-q4f16_1-MLC",
                "Llama-3-8B-Instruct-q4f32_1-MLC",
            ]
        );
    }

    #[test]
    fn test_flattened_groups_cover_familied_ids_once() {
        let mut ids: Vec<&str> = CATALOG.to_vec();
        ids.push("Llama-3-8B-Instruct-q4f16_1-MLC");
        let resolver = CatalogResolver::new();
        let groups = resolver.group_and_sort(ids.as_slice());

        let mut flattened: Vec<String> = groups.into_iter().flat_map(|g| g.variants).collect();
        flattened.sort();
        let mut expected: Vec<String> = CATALOG
            .iter()
            .filter(|id| resolver.resolve_family(id).is_some())
            .map(ToString::to_string)
            .collect();
        expected.sort();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let resolver = CatalogResolver::new();
        assert_eq!(resolver.group_and_sort(CATALOG), resolver.group_and_sort(CATALOG));
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let resolver = CatalogResolver::new();
        let groups = resolver.group_and_sort(CATALOG);
        assert_eq!(resolver.filter(&groups, "", &[]), groups);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let resolver = CatalogResolver::new();
        let groups = resolver.group_and_sort(CATALOG);

        let llama = resolver.filter(&groups, "", &[ModelFamily::Llama]);
        assert_eq!(llama.len(), 2);

        let narrowed = resolver.filter(&groups, "3.1", &[ModelFamily::Llama]);
        assert_eq!(names(&narrowed), vec!["Llama 3.1 8B Instruct"]);

        let none = resolver.filter(&groups, "3.1", &[ModelFamily::Phi]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_counts_exclude_unfamilied() {
        let counts = CatalogResolver::new().count_per_family(CATALOG);
        assert_eq!(counts.get(&ModelFamily::Llama), Some(&3));
        assert_eq!(counts.get(&ModelFamily::Qwen), None);
        assert_eq!(counts.values().sum::<usize>(), 6);
    }

    #[test]
    fn test_popularity_lists_every_family() {
        let ranked = CatalogResolver::new().families_by_popularity(CATALOG);
        assert_eq!(ranked.len(), 7);
        assert_eq!(ranked[0], (ModelFamily::Llama, 3));
        // Ties keep declaration order.
        assert_eq!(ranked[1], (ModelFamily::Phi, 1));
        assert_eq!(ranked[2], (ModelFamily::Mistral, 1));
        assert_eq!(ranked[6], (ModelFamily::Smollm, 0));
    }

    #[test]
    fn test_custom_matcher_changes_grouping() {
        struct OnlyGemma;
        impl FamilyMatcher for OnlyGemma {
            fn resolve(&self, id: &str) -> Option<ModelFamily> {
                id.starts_with("gemma").then_some(ModelFamily::Gemma)
            }
            fn families(&self) -> &[ModelFamily] {
                &[ModelFamily::Gemma]
            }
        }

        let groups = CatalogResolver::with_matcher(OnlyGemma).group_and_sort(CATALOG);
        assert_eq!(names(&groups), vec!["gemma 2 2b it"]);
    }

    #[test]
    fn test_group_family_follows_the_resolver_matcher() {
        struct EverythingIsQwen;
        impl FamilyMatcher for EverythingIsQwen {
            fn resolve(&self, _id: &str) -> Option<ModelFamily> {
                Some(ModelFamily::Qwen)
            }
            fn families(&self) -> &[ModelFamily] {
                &[ModelFamily::Qwen]
            }
        }

        let resolver = CatalogResolver::with_matcher(EverythingIsQwen);
        let ids = ["Phi-3-mini-4k-instruct-q4f16_1-MLC"];
        let groups = resolver.group_and_sort(ids.as_slice());
        assert_eq!(resolver.group_family(&groups[0]), Some(ModelFamily::Qwen));
        assert_eq!(groups[0].family_with(resolver.matcher()), Some(ModelFamily::Qwen));
        assert_eq!(groups[0].family(), Some(ModelFamily::Phi));

        let selected = resolver.filter(&groups, "", &[ModelFamily::Qwen]);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_toggle_family() {
        let mut selected = vec![ModelFamily::Qwen];
        toggle_family(&mut selected, ModelFamily::Phi);
        assert_eq!(selected, vec![ModelFamily::Qwen, ModelFamily::Phi]);
        toggle_family(&mut selected, ModelFamily::Qwen);
        assert_eq!(selected, vec![ModelFamily::Phi]);
    }
}
