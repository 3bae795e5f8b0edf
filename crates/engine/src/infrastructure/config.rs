//! Runtime configuration, loaded from environment variables (optionally via
//! a `.env` file) through the `config` crate, mirroring the predecessor's
//! settings-loading shape but trimmed to what the turn loop actually needs:
//! the LM transport's address/model/timeouts and the HTTP bind address.

use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bind address for the HTTP/WebSocket surface (§6).
    pub bind_address: String,

    /// Base URL of the Ollama-compatible LM transport.
    pub ollama_base_url: String,

    /// Model name requested from the transport.
    pub ollama_model: String,

    /// Timeout, in seconds, for a Director `generate_with_tools` call (§5).
    pub director_timeout_secs: u64,

    /// Timeout, in seconds, for a Narrator `generate` call (§5).
    pub narrator_timeout_secs: u64,

    /// Probability (0.0-1.0) that a failed action is additionally marked a
    /// critical failure (§4.C6, §9: configurable, not scaled by difficulty).
    pub critical_failure_probability: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            ollama_base_url: crate::infrastructure::ollama::DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: crate::infrastructure::ollama::DEFAULT_OLLAMA_MODEL.to_string(),
            director_timeout_secs: 20,
            narrator_timeout_secs: 30,
            critical_failure_probability: 0.15,
        }
    }
}

impl EngineConfig {
    /// Load from a `.env` file (if present) layered under `WRLDBLDR_`-prefixed
    /// environment variables, falling back to [`EngineConfig::default`] for
    /// anything unset.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let defaults = EngineConfig::default();
        let built = config::Config::builder()
            .set_default("bind_address", defaults.bind_address.clone())?
            .set_default("ollama_base_url", defaults.ollama_base_url.clone())?
            .set_default("ollama_model", defaults.ollama_model.clone())?
            .set_default("director_timeout_secs", defaults.director_timeout_secs)?
            .set_default("narrator_timeout_secs", defaults.narrator_timeout_secs)?
            .set_default("critical_failure_probability", defaults.critical_failure_probability)?
            .add_source(config::Environment::with_prefix("WRLDBLDR"))
            .build()?;

        built.try_deserialize()
    }

    pub fn director_timeout(&self) -> Duration {
        Duration::from_secs(self.director_timeout_secs)
    }

    pub fn narrator_timeout(&self) -> Duration {
        Duration::from_secs(self.narrator_timeout_secs)
    }
}
