//! Sampling configuration handed to the engine on load.
//!
//! The engine receives temperature and nucleus sampling threshold once per
//! `reload`; every completion against that handle uses them.

use serde::{Deserialize, Serialize};

/// Fallback sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Fallback nucleus sampling threshold.
pub const DEFAULT_TOP_P: f32 = 1.0;

/// Sampling parameters for a loaded model.
///
/// # Examples
///
/// ```rust
/// use playground_core::domain::SamplingConfig;
///
/// let precise = SamplingConfig::new(0.2, 0.9);
/// assert_eq!(precise.temperature, 0.2);
///
/// let defaults = SamplingConfig::default();
/// assert_eq!(defaults.top_p, 1.0);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingConfig {
    /// Sampling temperature (0.0 - 2.0).
    ///
    /// Lower values are more deterministic, higher values more random.
    pub temperature: f32,

    /// Nucleus sampling threshold (0.0 - 1.0].
    ///
    /// Only tokens whose cumulative probability stays under this threshold
    /// are considered. `1.0` disables nucleus filtering.
    pub top_p: f32,
}

impl SamplingConfig {
    /// Create a sampling config from explicit values.
    #[must_use]
    pub const fn new(temperature: f32, top_p: f32) -> Self {
        Self { temperature, top_p }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE, DEFAULT_TOP_P)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SamplingConfig::default();
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!((config.top_p - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_serializes_with_engine_field_names() {
        let json = serde_json::to_value(SamplingConfig::new(0.5, 0.9)).unwrap();
        assert!(json.get("temperature").is_some());
        assert!(json.get("top_p").is_some());
    }
}
