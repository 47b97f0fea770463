//! Display-name and quantization-badge extraction.

use serde::{Deserialize, Serialize};

/// Token separator inside model identifiers.
pub const SEPARATOR: &str = "-";

/// Build marker that never appears in a badge.
const BUILD_MARKER: &str = "MLC";

/// Derived view of a model identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedModelName {
    /// Tokens before the first size/quantization marker, joined by spaces.
    pub display_name: String,
    /// Tokens from that marker on, without `MLC`, joined by `-`.
    pub quant_badge: Option<String>,
}

/// Split `id` into a display name and an optional quantization badge.
///
/// The first token starting with `q` or `b` (case-sensitive) flips the
/// parser into badge mode for the rest of the identifier. This is positional:
/// a word token such as `base` flips it as well.
///
/// ```rust
/// use playground_core::catalog::parse_name;
///
/// let parsed = parse_name("Llama-3-8B-Instruct-q4f16_1-MLC");
/// assert_eq!(parsed.display_name, "Llama 3 8B Instruct");
/// assert_eq!(parsed.quant_badge.as_deref(), Some("q4f16_1"));
/// ```
#[must_use]
pub fn parse_name(id: &str) -> ParsedModelName {
    let mut name_tokens: Vec<&str> = Vec::new();
    let mut badge_tokens: Vec<&str> = Vec::new();
    let mut in_badge = false;

    for token in id.split(SEPARATOR) {
        if in_badge || token.starts_with('q') || token.starts_with('b') {
            in_badge = true;
            if token != BUILD_MARKER {
                badge_tokens.push(token);
            }
        } else {
            name_tokens.push(token);
        }
    }

    let quant_badge = if badge_tokens.is_empty() {
        None
    } else {
        Some(badge_tokens.join(SEPARATOR))
    };

    ParsedModelName {
        display_name: name_tokens.join(" "),
        quant_badge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_excludes_build_marker() {
        let parsed = parse_name("Llama-3-8B-Instruct-q4f16_1-MLC");
        assert_eq!(parsed.display_name, "Llama 3 8B Instruct");
        assert_eq!(parsed.quant_badge.as_deref(), Some("q4f16_1"));
    }

    #[test]
    fn test_no_marker_means_no_badge() {
        let parsed = parse_name("phi-3-mini");
        assert_eq!(parsed.display_name, "phi 3 mini");
        assert_eq!(parsed.quant_badge, None);
    }

    #[test]
    fn test_trailing_tokens_join_with_separator() {
        let parsed = parse_name("snowflake-arctic-embed-m-q0f32-MLC-b32");
        assert_eq!(parsed.display_name, "snowflake arctic embed m");
        assert_eq!(parsed.quant_badge.as_deref(), Some("q0f32-b32"));
    }

    #[test]
    fn test_no_separator() {
        let parsed = parse_name("gemma");
        assert_eq!(parsed.display_name, "gemma");
        assert_eq!(parsed.quant_badge, None);
    }

    #[test]
    fn test_word_starting_with_b_flips_badge_mode() {
        // Positional rule: "base" is not a size marker but still flips the flag.
        let parsed = parse_name("Qwen2-base-1.5B-q4f16_1-MLC");
        assert_eq!(parsed.display_name, "Qwen2");
        assert_eq!(parsed.quant_badge.as_deref(), Some("base-1.5B-q4f16_1"));
    }

    #[test]
    fn test_uppercase_markers_do_not_flip() {
        let parsed = parse_name("Phi-3.5-mini-Q4");
        assert_eq!(parsed.display_name, "Phi 3.5 mini Q4");
        assert_eq!(parsed.quant_badge, None);
    }

    #[test]
    fn test_mlc_before_badge_stays_in_name() {
        let parsed = parse_name("MLC-llama-q4");
        assert_eq!(parsed.display_name, "MLC llama");
        assert_eq!(parsed.quant_badge.as_deref(), Some("q4"));
    }
}
