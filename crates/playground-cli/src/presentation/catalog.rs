//! Model picker rendering: family chips and grouped rows.

use playground_core::ModelFamily;
use playground_core::catalog::{ModelGroup, variant_label};

/// One chip per family, `Label (count)`, selected chips in brackets.
///
/// # Examples
///
/// ```rust
/// use playground_cli::presentation::format_chips;
/// use playground_core::ModelFamily;
///
/// let chips = [(ModelFamily::Llama, 4), (ModelFamily::Qwen, 2), (ModelFamily::Phi, 0)];
/// assert_eq!(
///     format_chips(&chips, &[ModelFamily::Qwen]),
///     "Llama (4)  [Qwen (2)]  Phi (0)"
/// );
/// ```
pub fn format_chips(popularity: &[(ModelFamily, usize)], selected: &[ModelFamily]) -> String {
    popularity
        .iter()
        .map(|(family, count)| {
            let chip = format!("{} ({count})", family.label());
            if selected.contains(family) {
                format!("[{chip}]")
            } else {
                chip
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Rows for one group.
///
/// A single-variant group is one line with its badge inline; a
/// multi-variant group is a header followed by one line per variant.
pub fn format_group(group: &ModelGroup) -> Vec<String> {
    match group.variants.as_slice() {
        [only] => vec![format!(
            "{}  [{}]  {only}",
            group.display_name,
            variant_label(only)
        )],
        variants => std::iter::once(group.display_name.clone())
            .chain(
                variants
                    .iter()
                    .map(|id| format!("  - {}  {id}", variant_label(id))),
            )
            .collect(),
    }
}
