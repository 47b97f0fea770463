//! Settings domain types and validation.
//!
//! Pure domain types: where the values come from (flags, environment,
//! `.env` files) is the composition root's business.

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_TEMPERATURE, DEFAULT_TOP_P, SamplingConfig};

/// Default base URL of the local inference server.
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8080";

/// Playground settings.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Sampling temperature used when loading a model.
    pub temperature: Option<f32>,

    /// Nucleus sampling threshold used when loading a model.
    pub top_p: Option<f32>,

    /// Model to load at startup. `None` means the first catalog entry.
    pub default_model: Option<String>,

    /// Base URL of the inference server.
    pub engine_url: Option<String>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: Some(DEFAULT_TOP_P),
            default_model: None,
            engine_url: Some(DEFAULT_ENGINE_URL.to_string()),
        }
    }

    #[must_use]
    pub fn effective_temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    #[must_use]
    pub fn effective_top_p(&self) -> f32 {
        self.top_p.unwrap_or(DEFAULT_TOP_P)
    }

    #[must_use]
    pub fn effective_engine_url(&self) -> &str {
        self.engine_url.as_deref().unwrap_or(DEFAULT_ENGINE_URL)
    }

    /// The configured default model, or the first entry of `catalog`.
    #[must_use]
    pub fn effective_default_model<'a>(&'a self, catalog: &'a [String]) -> Option<&'a str> {
        self.default_model
            .as_deref()
            .or_else(|| catalog.first().map(String::as_str))
    }

    /// Sampling parameters handed to `load`.
    #[must_use]
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig::new(self.effective_temperature(), self.effective_top_p())
    }

    /// Merge an update into these settings, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(temperature) = other.temperature {
            self.temperature = temperature;
        }
        if let Some(top_p) = other.top_p {
            self.top_p = top_p;
        }
        if let Some(ref model) = other.default_model {
            self.default_model.clone_from(model);
        }
        if let Some(ref url) = other.engine_url {
            self.engine_url.clone_from(url);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset the field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub temperature: Option<Option<f32>>,
    pub top_p: Option<Option<f32>>,
    pub default_model: Option<Option<String>>,
    pub engine_url: Option<Option<String>>,
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),

    #[error("Top-p must be greater than 0 and at most 1, got {0}")]
    InvalidTopP(f32),

    #[error("Engine URL cannot be empty")]
    EmptyEngineUrl,

    #[error("Default model cannot be empty")]
    EmptyDefaultModel,
}

/// Validate settings values.
///
/// # Errors
///
/// Returns the first invalid field found.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(temperature) = settings.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(SettingsError::InvalidTemperature(temperature));
    }

    if let Some(top_p) = settings.top_p
        && !(top_p > 0.0 && top_p <= 1.0)
    {
        return Err(SettingsError::InvalidTopP(top_p));
    }

    if settings
        .engine_url
        .as_ref()
        .is_some_and(|url| url.trim().is_empty())
    {
        return Err(SettingsError::EmptyEngineUrl);
    }

    if settings
        .default_model
        .as_ref()
        .is_some_and(|model| model.trim().is_empty())
    {
        return Err(SettingsError::EmptyDefaultModel);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.temperature, Some(0.7));
        assert_eq!(settings.top_p, Some(1.0));
        assert_eq!(settings.effective_engine_url(), DEFAULT_ENGINE_URL);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_effective_values_fall_back() {
        let settings = Settings::default();
        assert_eq!(settings.sampling(), SamplingConfig::default());
        assert_eq!(settings.effective_engine_url(), DEFAULT_ENGINE_URL);
    }

    #[test]
    fn test_default_model_falls_back_to_first_entry() {
        let catalog = vec![
            "Llama-3.2-1B-Instruct-q4f16_1-MLC".to_string(),
            "Phi-3.5-mini-instruct-q4f16_1-MLC".to_string(),
        ];
        let mut settings = Settings::default();
        assert_eq!(
            settings.effective_default_model(&catalog),
            Some("Llama-3.2-1B-Instruct-q4f16_1-MLC")
        );

        settings.default_model = Some("Phi-3.5-mini-instruct-q4f16_1-MLC".to_string());
        assert_eq!(
            settings.effective_default_model(&catalog),
            Some("Phi-3.5-mini-instruct-q4f16_1-MLC")
        );
        assert_eq!(Settings::default().effective_default_model(&[]), None);
    }

    #[test]
    fn test_validate_temperature() {
        let settings = Settings {
            temperature: Some(2.5),
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidTemperature(2.5))
        );

        let settings = Settings {
            temperature: Some(0.0),
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_validate_top_p() {
        for bad in [0.0, -0.1, 1.5] {
            let settings = Settings {
                top_p: Some(bad),
                ..Default::default()
            };
            assert!(validate_settings(&settings).is_err(), "top_p {bad} accepted");
        }
    }

    #[test]
    fn test_validate_empty_url() {
        let settings = Settings {
            engine_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::EmptyEngineUrl)
        );
    }

    #[test]
    fn test_merge_settings() {
        let mut settings = Settings::with_defaults();
        let update = SettingsUpdate {
            temperature: Some(Some(0.2)),
            top_p: None,
            default_model: Some(Some("gemma-2-2b-it-q4f16_1-MLC".to_string())),
            engine_url: Some(None),
        };
        settings.merge(&update);

        assert_eq!(settings.temperature, Some(0.2));
        assert_eq!(settings.top_p, Some(1.0));
        assert_eq!(
            settings.default_model.as_deref(),
            Some("gemma-2-2b-it-q4f16_1-MLC")
        );
        assert_eq!(settings.engine_url, None);
        assert_eq!(settings.effective_engine_url(), DEFAULT_ENGINE_URL);
    }
}
