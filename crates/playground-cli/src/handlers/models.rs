//! Models command handler.

use playground_core::{CatalogView, ModelFamily};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_chips, format_group};

/// Rows for the groups matching `search` and `families`.
pub fn catalog_lines(view: &CatalogView, search: &str, families: &[ModelFamily]) -> Vec<String> {
    let groups = view.search(search, families);
    if groups.is_empty() {
        return vec!["No models match.".to_string()];
    }
    groups.iter().flat_map(format_group).collect()
}

/// Family flags in first-seen order, without repeats.
pub fn selected_families(flags: &[ModelFamily]) -> Vec<ModelFamily> {
    let mut selected = Vec::with_capacity(flags.len());
    for family in flags {
        if !selected.contains(family) {
            selected.push(*family);
        }
    }
    selected
}

/// List the engine's catalog with family chips.
pub async fn execute(
    ctx: &CliContext,
    search: Option<&str>,
    families: &[ModelFamily],
) -> Result<(), CliError> {
    let families = selected_families(families);
    let catalog = ctx.catalog().await?;
    let view = CatalogView::build(catalog.as_slice());
    tracing::debug!(models = view.total_models(), "Catalog loaded");

    println!("{}", format_chips(view.families_by_popularity(), &families));
    println!();
    for line in catalog_lines(&view, search.unwrap_or_default(), &families) {
        println!("{line}");
    }
    Ok(())
}
