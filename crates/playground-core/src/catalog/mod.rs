//! Model catalog: family detection, name parsing, grouping and filtering.
//!
//! The engine reports a flat list of opaque identifiers. This module turns
//! it into the family → base model → variant hierarchy a model picker shows.
//! Everything here is pure.
//!
//! The free functions use the default [`OrderedContainment`] policy; use a
//! [`CatalogResolver`] with a custom [`FamilyMatcher`] to change it.

mod family;
mod group;
mod name;
mod resolver;
mod view;

use std::collections::BTreeMap;

pub use family::{FamilyMatcher, KNOWN_FAMILIES, ModelFamily, OrderedContainment, UnknownFamily};
pub use group::{ModelGroup, variant_label};
pub use name::{ParsedModelName, SEPARATOR, parse_name};
pub use resolver::{CatalogResolver, toggle_family};
pub use view::CatalogView;

const DEFAULT_RESOLVER: CatalogResolver = CatalogResolver::new();

/// Family of `id` under the default policy.
#[must_use]
pub fn resolve_family(id: &str) -> Option<ModelFamily> {
    DEFAULT_RESOLVER.resolve_family(id)
}

/// See [`CatalogResolver::group_and_sort`].
#[must_use]
pub fn group_and_sort<S: AsRef<str>>(ids: &[S]) -> Vec<ModelGroup> {
    DEFAULT_RESOLVER.group_and_sort(ids)
}

/// See [`CatalogResolver::filter`].
#[must_use]
pub fn filter(groups: &[ModelGroup], search_term: &str, selected: &[ModelFamily]) -> Vec<ModelGroup> {
    DEFAULT_RESOLVER.filter(groups, search_term, selected)
}

/// See [`CatalogResolver::count_per_family`].
#[must_use]
pub fn count_per_family<S: AsRef<str>>(ids: &[S]) -> BTreeMap<ModelFamily, usize> {
    DEFAULT_RESOLVER.count_per_family(ids)
}

/// See [`CatalogResolver::families_by_popularity`].
#[must_use]
pub fn families_by_popularity<S: AsRef<str>>(ids: &[S]) -> Vec<(ModelFamily, usize)> {
    DEFAULT_RESOLVER.families_by_popularity(ids)
}
