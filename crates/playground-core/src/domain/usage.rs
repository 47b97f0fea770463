//! Token usage statistics for a completed generation.

use serde::{Deserialize, Serialize};

/// Usage record produced once per completed generation.
///
/// Speeds are kept as `f64` so display rounding happens once, at the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Prompt processing throughput in tokens per second.
    pub prefill_speed: f64,
    /// Token generation throughput in tokens per second.
    pub decoding_speed: f64,
}

impl GenerationUsage {
    /// Build a usage record from raw engine numbers.
    ///
    /// Negative or non-finite speeds are clamped to zero.
    #[must_use]
    pub fn from_raw(
        prompt_tokens: u64,
        completion_tokens: u64,
        prefill_speed: f64,
        decoding_speed: f64,
    ) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            prefill_speed: non_negative(prefill_speed),
            decoding_speed: non_negative(decoding_speed),
        }
    }

    /// Prompt plus completion tokens.
    #[must_use]
    pub const fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// True until the first generation has finished.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompt_tokens == 0
            && self.completion_tokens == 0
            && self.prefill_speed <= 0.0
            && self.decoding_speed <= 0.0
    }

    /// Values rounded to the nearest unit for display.
    #[must_use]
    pub fn rounded(&self) -> DisplayUsage {
        DisplayUsage {
            prompt_tokens: self.prompt_tokens,
            completion_tokens: self.completion_tokens,
            total_tokens: self.total_tokens(),
            prefill_speed: round_speed(self.prefill_speed),
            decoding_speed: round_speed(self.decoding_speed),
        }
    }
}

/// Rounded usage, ready for a stats panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub prefill_speed: u64,
    pub decoding_speed: u64,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_speed(value: f64) -> u64 {
    non_negative(value).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(GenerationUsage::default().is_empty());
        assert!(!GenerationUsage::from_raw(1, 0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn test_rounding_keeps_precision_until_display() {
        let usage = GenerationUsage::from_raw(12, 30, 245.5, 31.49);
        let shown = usage.rounded();
        assert_eq!(shown.prefill_speed, 246);
        assert_eq!(shown.decoding_speed, 31);
        assert_eq!(shown.total_tokens, 42);
    }

    #[test]
    fn test_from_raw_clamps_bad_speeds() {
        let usage = GenerationUsage::from_raw(1, 1, -3.0, f64::NAN);
        assert!(usage.prefill_speed.abs() < f64::EPSILON);
        assert!(usage.decoding_speed.abs() < f64::EPSILON);
    }
}
