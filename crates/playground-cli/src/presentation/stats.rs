//! Chat statistics panel.

use playground_core::GenerationUsage;

/// Panel lines for `usage`, or `None` before the first finished generation.
///
/// # Examples
///
/// ```rust
/// use playground_cli::presentation::format_stats;
/// use playground_core::GenerationUsage;
///
/// assert!(format_stats(&GenerationUsage::default()).is_none());
///
/// let lines = format_stats(&GenerationUsage::from_raw(27, 9, 512.4, 38.5)).unwrap();
/// assert_eq!(lines[2], "Total:       36");
/// assert_eq!(lines[4], "Decoding:    39 tok/s");
/// ```
pub fn format_stats(usage: &GenerationUsage) -> Option<Vec<String>> {
    if usage.is_empty() {
        return None;
    }
    let display = usage.rounded();
    Some(vec![
        format!("{:<12} {}", "Prompt:", display.prompt_tokens),
        format!("{:<12} {}", "Completion:", display.completion_tokens),
        format!("{:<12} {}", "Total:", display.total_tokens),
        format!("{:<12} {} tok/s", "Prefill:", display.prefill_speed),
        format!("{:<12} {} tok/s", "Decoding:", display.decoding_speed),
    ])
}

/// Print the panel under a `Chat Stats` header, or a hint when empty.
pub fn print_stats(usage: &GenerationUsage) {
    match format_stats(usage) {
        Some(lines) => {
            println!("Chat Stats");
            for line in lines {
                println!("  {line}");
            }
        }
        None => println!("No statistics yet. Send a message first."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speeds_are_rounded() {
        let lines = format_stats(&GenerationUsage::from_raw(4, 2, 99.5, 20.4)).unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Prompt:      4");
        assert_eq!(lines[3], "Prefill:     100 tok/s");
        assert_eq!(lines[4], "Decoding:    20 tok/s");
    }
}
