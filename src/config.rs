//! Application configuration loaded from environment variables

use std::time::Duration;

use blessing_types::ProviderConfig;

use crate::error::ConfigError;

/// Simulated delivery settle delay
pub const DEFAULT_MAIL_DELAY: Duration = Duration::from_millis(3000);

/// Session-wide configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub mail_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            mail_delay: DEFAULT_MAIL_DELAY,
        }
    }
}

impl AppConfig {
    /// Create from environment variables
    ///
    /// Reads `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_TEXT_MODEL`,
    /// `GEMINI_IMAGE_MODEL`, `GEMINI_TIMEOUT_SECS`, `GEMINI_BASE_URL` and
    /// `BLESSING_MAIL_DELAY_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
            config.provider.api_key = key;
        }
        if let Some(model) = lookup("GEMINI_TEXT_MODEL") {
            config.provider.text_model = model;
        }
        if let Some(model) = lookup("GEMINI_IMAGE_MODEL") {
            config.provider.image_model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL") {
            config.provider.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("GEMINI_TIMEOUT_SECS") {
            config.provider.timeout_seconds = parse_number("GEMINI_TIMEOUT_SECS", &secs)?;
        }
        if let Some(ms) = lookup("BLESSING_MAIL_DELAY_MS") {
            config.mail_delay =
                Duration::from_millis(parse_number("BLESSING_MAIL_DELAY_MS", &ms)?);
        }

        Ok(config)
    }

    /// Set mail delay
    pub fn with_mail_delay(mut self, delay: Duration) -> Self {
        self.mail_delay = delay;
        self
    }

    /// Set provider configuration
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}
