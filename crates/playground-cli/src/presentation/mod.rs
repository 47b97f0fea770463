//! Terminal presentation helpers.
//!
//! Format-only: catalog transforms live in the core.

pub mod catalog;
pub mod stats;
pub mod stream;

pub use catalog::{format_chips, format_group};
pub use stats::{format_stats, print_stats};
pub use stream::ReplyPrinter;
