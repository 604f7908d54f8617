//! Endpoint configuration.
//!
//! [`ChatConfig`] says where to send a drawing request and how. It can be
//! built in code, read from the environment, or deserialized from a client
//! payload and layered over a server default with [`ChatConfig::merge`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::{CoreError, Result};

/// Default endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Connection and sampling settings for one OpenAI-compatible endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Bearer credential. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Skip TLS certificate validation for this endpoint.
    pub accept_invalid_certs: bool,

    /// Transport timeout.
    #[serde(skip_serializing_if = "Option::is_none", with = "option_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            accept_invalid_certs: false,
            timeout: None,
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ChatConfig {
    /// Create a config with defaults and the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Read configuration from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `SKETCHFLOW_API_KEY`, else `OPENAI_API_KEY` | `api_key` |
    /// | `SKETCHFLOW_BASE_URL` | `base_url` |
    /// | `SKETCHFLOW_MODEL` | `model` |
    /// | `SKETCHFLOW_TEMPERATURE` | `temperature` |
    /// | `SKETCHFLOW_ACCEPT_INVALID_CERTS` | `accept_invalid_certs` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = var("SKETCHFLOW_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            config.api_key = key;
        }
        if let Some(url) = var("SKETCHFLOW_BASE_URL") {
            config.base_url = url;
        }
        if let Some(model) = var("SKETCHFLOW_MODEL") {
            config.model = model;
        }
        if let Some(raw) = var("SKETCHFLOW_TEMPERATURE") {
            config.temperature = raw.trim().parse().map_err(|_| {
                CoreError::configuration(format!("SKETCHFLOW_TEMPERATURE is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = var("SKETCHFLOW_ACCEPT_INVALID_CERTS") {
            config.accept_invalid_certs = parse_bool(&raw).ok_or_else(|| {
                CoreError::configuration(format!(
                    "SKETCHFLOW_ACCEPT_INVALID_CERTS is not a boolean: {raw}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    /// Allow self-signed or intercepted certificates.
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set timeout in seconds.
    #[must_use]
    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    /// A config is usable when key, URL and model are all set.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
            && !self.base_url.trim().is_empty()
            && !self.model.trim().is_empty()
    }

    /// Like [`is_valid`](Self::is_valid) but says what is missing.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(CoreError::configuration("API key is not set"));
        }
        if self.base_url.trim().is_empty() {
            return Err(CoreError::configuration("base URL is not set"));
        }
        url::Url::parse(self.base_url.trim())
            .map_err(|e| CoreError::configuration(format!("base URL is invalid: {e}")))?;
        if self.model.trim().is_empty() {
            return Err(CoreError::configuration("model is not set"));
        }
        Ok(())
    }

    /// Whether the endpoint is a local Ollama server.
    ///
    /// Ollama does not honour a forced tool choice.
    #[must_use]
    pub fn is_local_ollama(&self) -> bool {
        self.base_url.contains("localhost:11434") || self.base_url.contains("ollama")
    }

    /// Full chat completions URL.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Layer client-supplied overrides over this config.
    ///
    /// Empty strings in `overrides` count as absent.
    #[must_use]
    pub fn merge(&self, overrides: &ChatConfigOverrides) -> ChatConfig {
        let pick = |over: &Option<String>, base: &String| {
            over.as_deref()
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| base.clone(), str::to_string)
        };
        ChatConfig {
            api_key: pick(&overrides.api_key, &self.api_key),
            base_url: pick(&overrides.base_url, &self.base_url),
            model: pick(&overrides.model, &self.model),
            temperature: overrides.temperature.unwrap_or(self.temperature),
            accept_invalid_certs: self.accept_invalid_certs,
            timeout: self.timeout,
        }
    }
}

/// Partial config sent by a client alongside a request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfigOverrides {
    /// API key override.
    pub api_key: Option<String>,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Model override.
    pub model: Option<String>,
    /// Temperature override.
    pub temperature: Option<f64>,
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Serde helper for optional Duration.
mod option_duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs_f64().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<f64> = Option::deserialize(deserializer)?;
        Ok(opt.map(Duration::from_secs_f64))
    }
}
