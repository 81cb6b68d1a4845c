use std::env;
use std::time::Duration;

use crate::error::{MockupError, Result};

pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct PlaceholderConfig {
    pub base_url: String,
    pub size: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub gemini: GeminiConfig,
    pub placeholder: PlaceholderConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash-image".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 1,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url);
        let model = env::var("GEMINI_MODEL").unwrap_or(defaults.model);
        let timeout = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let max_retries = env::var("GEMINI_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_retries);

        // The key itself is not captured here; it is re-read on every request.
        GeminiConfig {
            api_key: None,
            api_key_env: defaults.api_key_env,
            base_url,
            model,
            timeout,
            max_retries,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = Some(name.into());
        self
    }

    /// Only use an injected key, never the process environment.
    pub fn without_env_key(mut self) -> Self {
        self.api_key_env = None;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Resolve the credential for the current request.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }

        let name = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        match self.api_key_env.as_deref().map(env::var) {
            Some(Ok(key)) if !key.trim().is_empty() => Ok(key),
            _ => Err(MockupError::ConfigError(format!("{} not configured", name))),
        }
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        PlaceholderConfig {
            base_url: "https://via.placeholder.com".to_string(),
            size: "1200x675".to_string(),
        }
    }
}

impl PlaceholderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        PlaceholderConfig {
            base_url: env::var("PLACEHOLDER_BASE_URL").unwrap_or(defaults.base_url),
            size: defaults.size,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            gemini: GeminiConfig::default(),
            placeholder: PlaceholderConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            port,
            gemini: GeminiConfig::from_env(),
            placeholder: PlaceholderConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_placeholder(mut self, config: PlaceholderConfig) -> Self {
        self.placeholder = config;
        self
    }
}
