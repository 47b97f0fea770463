//! CLI bootstrap - the composition root.
//!
//! The only place where the HTTP engine adapter is wired to the core.
//! Command handlers receive a [`CliContext`] and never build adapters
//! themselves.

use std::sync::Arc;

use playground_core::{
    ChatSession, EngineFactory, Settings, SettingsUpdate, validate_settings,
};
use playground_runtime::{EngineEndpoint, HttpEngineFactory};
use tracing::debug;

use crate::error::CliError;

/// Values collected from flags and the environment.
///
/// `None` keeps the built-in default.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub engine_url: Option<String>,
    pub default_model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl CliConfig {
    /// The settings update these overrides amount to.
    pub fn to_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            temperature: self.temperature.map(Some),
            top_p: self.top_p.map(Some),
            default_model: self.default_model.clone().map(Some),
            engine_url: self.engine_url.clone().map(Some),
        }
    }

    /// Built-in defaults with these overrides applied, validated.
    pub fn resolve_settings(&self) -> Result<Settings, CliError> {
        let mut settings = Settings::with_defaults();
        settings.merge(&self.to_update());
        validate_settings(&settings)?;
        Ok(settings)
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    settings: Settings,
    factory: Arc<HttpEngineFactory>,
}

impl CliContext {
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn endpoint(&self) -> &EngineEndpoint {
        self.factory.endpoint()
    }

    /// A fresh chat session over the configured engine.
    pub fn session(&self) -> ChatSession {
        ChatSession::new(Arc::clone(&self.factory) as Arc<dyn EngineFactory>)
    }

    /// The engine's flat model list, queried once.
    pub async fn catalog(&self) -> Result<Vec<String>, CliError> {
        Ok(self.factory.list_available_models().await?)
    }
}

/// Compose the CLI context from `config`.
///
/// # Errors
///
/// Returns [`CliError::Config`] for out-of-range settings or a malformed
/// engine URL, and [`CliError::Engine`] if the HTTP client cannot be built.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let settings = config.resolve_settings()?;
    let endpoint = EngineEndpoint::parse(settings.effective_engine_url())?;
    debug!(endpoint = %endpoint, "Bootstrapping CLI context");
    let factory = Arc::new(HttpEngineFactory::new(endpoint)?);
    Ok(CliContext { settings, factory })
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::DEFAULT_ENGINE_URL;

    #[test]
    fn test_defaults() {
        let ctx = bootstrap(&CliConfig::default()).unwrap();
        assert_eq!(ctx.endpoint().base_url(), DEFAULT_ENGINE_URL);
        assert_eq!(ctx.settings().sampling(), Settings::with_defaults().sampling());
        assert_eq!(ctx.settings().default_model, None);
    }

    #[test]
    fn test_overrides_apply() {
        let config = CliConfig {
            engine_url: Some("http://gpu-box:8000/".to_string()),
            default_model: Some("phi-2-q4f16_1-MLC".to_string()),
            temperature: Some(0.2),
            top_p: Some(0.9),
        };
        let ctx = bootstrap(&config).unwrap();
        assert_eq!(ctx.endpoint().base_url(), "http://gpu-box:8000");
        assert_eq!(ctx.settings().default_model.as_deref(), Some("phi-2-q4f16_1-MLC"));
        assert_eq!(ctx.settings().effective_temperature(), 0.2);
        assert_eq!(ctx.settings().effective_top_p(), 0.9);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let config = CliConfig {
            temperature: Some(3.5),
            ..CliConfig::default()
        };
        assert!(matches!(bootstrap(&config), Err(CliError::Config(_))));

        let config = CliConfig {
            engine_url: Some("ftp://host".to_string()),
            ..CliConfig::default()
        };
        let Err(err) = bootstrap(&config) else {
            panic!("expected a config error");
        };
        assert_eq!(err.exit_code(), 78);
    }
}
