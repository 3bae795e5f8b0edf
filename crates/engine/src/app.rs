//! Application composition root (§3, §6).
//!
//! Wires the ambient configuration, the Ollama LM transport (wrapped for
//! retry resilience), the reference `GeneratorRegistry`, and the
//! deterministic in-memory world-map/inventory fakes into one `App` value
//! that the HTTP surface holds as Axum state. A fresh `TurnController` is
//! handed to each websocket connection (§4.C9, §5): mode state is
//! per-player, while the blueprint cache would in a networked deployment be
//! shared across players visiting the same world — this `App` has exactly
//! one player in mind for now (see DESIGN.md).

use std::sync::Arc;

use wrldbldr_domain::LocationId;

use crate::generators::GeneratorRegistry;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::ports::{ClockPort, FakeInventorySink, FakeWorldMap, InventorySinkPort, LlmPort, VertexInfo, WorldMapPort};
use crate::infrastructure::resilient_llm::{ResilientLlmClient, RetryConfig};
use crate::turn_controller::TurnController;

/// Holds everything a `TurnController` needs, shared read-only across
/// connections.
pub struct App {
    config: EngineConfig,
    world_map: Arc<dyn WorldMapPort>,
    inventory_sink: Arc<dyn InventorySinkPort>,
    generators: GeneratorRegistry,
    llm: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
}

impl App {
    pub fn new(config: EngineConfig) -> Self {
        let ollama = OllamaClient::new(&config.ollama_base_url, &config.ollama_model);
        let llm: Arc<dyn LlmPort> = Arc::new(ResilientLlmClient::new(Arc::new(ollama), RetryConfig::default()));

        Self {
            config,
            world_map: Arc::new(demo_world_map()),
            inventory_sink: Arc::new(FakeInventorySink::new()),
            generators: GeneratorRegistry::with_defaults(),
            llm,
            clock: Arc::new(SystemClock::new()),
        }
    }

    /// Build an `App` around an injected `LlmPort`, bypassing Ollama -
    /// used by the terminal client's local demo mode and by integration
    /// tests that exercise the HTTP surface against a fake transport.
    pub fn with_llm(config: EngineConfig, llm: Arc<dyn LlmPort>) -> Self {
        Self {
            config,
            world_map: Arc::new(demo_world_map()),
            inventory_sink: Arc::new(FakeInventorySink::new()),
            generators: GeneratorRegistry::with_defaults(),
            llm,
            clock: Arc::new(SystemClock::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn new_turn_controller(&self) -> TurnController {
        TurnController::new(
            self.world_map.clone(),
            self.inventory_sink.clone(),
            self.generators.clone(),
            self.llm.clone(),
            self.clock.clone(),
            self.config.director_timeout(),
            self.config.narrator_timeout(),
            self.config.critical_failure_probability,
        )
    }
}

/// The "single vertex" demo map referenced by §6: three vertices, one per
/// reference generator, enough to drive the terminal client without a real
/// world-map backend.
fn demo_world_map() -> FakeWorldMap {
    FakeWorldMap::new()
        .with_vertex(
            "forest_1",
            VertexInfo { biome: "forest".to_string(), location_id: Some(LocationId::from("forest_1")), noise_value: 0.2 },
        )
        .with_vertex(
            "mountain_1",
            VertexInfo { biome: "mountain".to_string(), location_id: Some(LocationId::from("mountain_1")), noise_value: 0.7 },
        )
        .with_vertex(
            "ruins_1",
            VertexInfo { biome: "ruins".to_string(), location_id: Some(LocationId::from("ruins_1")), noise_value: 0.5 },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{FinishReason, LlmError, LlmRequest, LlmResponse, ToolDefinition};
    use async_trait::async_trait;

    struct StubLlm;

    #[async_trait]
    impl LlmPort for StubLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse { content: String::new(), tool_calls: vec![], finish_reason: FinishReason::Stop, usage: None })
        }

        async fn generate_with_tools(&self, _request: LlmRequest, _tools: Vec<ToolDefinition>) -> Result<LlmResponse, LlmError> {
            Err(LlmError::RequestFailed("stub".to_string()))
        }
    }

    #[test]
    fn new_turn_controller_starts_in_world_view() {
        let app = App::with_llm(EngineConfig::default(), Arc::new(StubLlm));
        let controller = app.new_turn_controller();
        assert_eq!(controller.mode(), crate::turn_controller::TurnMode::WorldView);
    }

    #[test]
    fn demo_world_map_resolves_all_three_reference_biomes() {
        let map = demo_world_map();
        assert_eq!(map.get_vertex_info("forest_1").unwrap().biome, "forest");
        assert_eq!(map.get_vertex_info("mountain_1").unwrap().biome, "mountain");
        assert_eq!(map.get_vertex_info("ruins_1").unwrap().biome, "ruins");
    }
}
