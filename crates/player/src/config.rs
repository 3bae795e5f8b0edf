//! Runtime configuration, mirroring the engine's own `config`/`dotenvy`
//! loading shape, trimmed to what the terminal client needs: where the
//! engine lives and which location to enter first.

use serde::Deserialize;
use wrldbldr_domain::LocationId;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// WebSocket URL of the engine's `/ws` endpoint.
    pub engine_url: String,

    /// Location id the player enters on startup.
    pub start_location_id: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { engine_url: "ws://127.0.0.1:8787/ws".to_string(), start_location_id: "forest_1".to_string() }
    }
}

impl PlayerConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let defaults = PlayerConfig::default();
        let built = config::Config::builder()
            .set_default("engine_url", defaults.engine_url.clone())?
            .set_default("start_location_id", defaults.start_location_id.clone())?
            .add_source(config::Environment::with_prefix("WRLDBLDR_PLAYER"))
            .build()?;

        built.try_deserialize()
    }

    pub fn start_location(&self) -> LocationId {
        LocationId::from(self.start_location_id.clone())
    }
}
