//! Terminal utilities.

pub mod input;

pub use input::LineReader;
