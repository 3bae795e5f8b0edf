//! `wrldbldr-player` - a terminal implementation of the UI collaborator
//! (§6): connects to the engine's `/ws` endpoint, enters the configured
//! starting location, and plays out its interaction loop over stdin/stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wrldbldr_player::client::EngineClient;
use wrldbldr_player::config::PlayerConfig;
use wrldbldr_player::session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "wrldbldr_player=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PlayerConfig::from_env()?;
    tracing::info!(engine_url = %config.engine_url, start_location_id = %config.start_location_id, "starting wrldbldr player");

    let mut client = EngineClient::connect(&config.engine_url).await?;
    client.hello().await?;

    session::play_location(&mut client, config.start_location()).await?;

    Ok(())
}
