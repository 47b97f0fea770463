//! Incremental printing of a reply that arrives as full replacements.

/// Tracks what has been printed of the current reply.
///
/// Each update carries the whole reply so far. Usually it extends what was
/// printed and only the new suffix is returned; if it does not, the reply
/// is reprinted on a fresh line.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    printed: String,
}

impl ReplyPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to write for the replacement `reply`, if any.
    pub fn advance(&mut self, reply: &str) -> Option<String> {
        if reply == self.printed {
            return None;
        }
        let out = match reply.strip_prefix(self.printed.as_str()) {
            Some(suffix) => suffix.to_string(),
            None => format!("\n{reply}"),
        };
        reply.clone_into(&mut self.printed);
        Some(out)
    }

    pub fn printed(&self) -> &str {
        &self.printed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prints_only_new_suffix() {
        let mut printer = ReplyPrinter::new();
        assert_eq!(printer.advance("Hel").as_deref(), Some("Hel"));
        assert_eq!(printer.advance("Hello").as_deref(), Some("lo"));
        assert_eq!(printer.advance("Hello"), None);
        assert_eq!(printer.printed(), "Hello");
    }

    #[test]
    fn test_divergent_reply_is_reprinted() {
        let mut printer = ReplyPrinter::new();
        printer.advance("Hello wrld");
        assert_eq!(
            printer.advance("Hello world").as_deref(),
            Some("\nHello world")
        );
    }
}
