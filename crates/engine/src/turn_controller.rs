//! C9 Turn Controller: the mode machine over `WorldView / Traveling /
//! LocationInteraction`, wiring external map events into the C8 interaction
//! loop (§4.C9).
//!
//! Grounded in the predecessor's `use_cases/movement/{can_move,enter_region,
//! exit_location}.rs` (one explicit guard function per transition) and its
//! websocket event dispatch (`api/websocket/mod.rs`) for routing inbound
//! client messages to the right phase.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wrldbldr_domain::{Blueprint, LocationId, LocationInstanceState};
use wrldbldr_shared::{ClientMessage, ServerMessage};

use crate::executor::{Director, Narrator};
use crate::generators::GeneratorRegistry;
use crate::infrastructure::error::EngineError;
use crate::infrastructure::ports::{ClockPort, InventorySinkPort, LlmPort, WorldMapPort};
use crate::interaction::{InteractionLoop, InteractionOutcome};

/// Which of the three modes the controller is currently in (§4.C9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnMode {
    WorldView,
    Traveling,
    LocationInteraction,
}

struct ActiveInteraction {
    location_id: LocationId,
    blueprint: Arc<Blueprint>,
    loop_: InteractionLoop,
}

/// Owns the blueprint/instance caches (§3 "Lifetimes": blueprints live as
/// long as their enclosing map and are exclusively owned by the turn
/// controller) and dispatches inbound `ClientMessage`s to the active
/// interaction, or starts one on `VertexArrived` (§4.C9).
pub struct TurnController {
    world_map: Arc<dyn WorldMapPort>,
    inventory_sink: Arc<dyn InventorySinkPort>,
    generators: GeneratorRegistry,
    llm: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
    director_timeout: Duration,
    narrator_timeout: Duration,
    critical_failure_probability: f64,
    blueprints: Mutex<BTreeMap<LocationId, Arc<Blueprint>>>,
    instances: Mutex<BTreeMap<LocationId, LocationInstanceState>>,
    mode: TurnMode,
    active: Option<ActiveInteraction>,
}

impl TurnController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        world_map: Arc<dyn WorldMapPort>,
        inventory_sink: Arc<dyn InventorySinkPort>,
        generators: GeneratorRegistry,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        director_timeout: Duration,
        narrator_timeout: Duration,
        critical_failure_probability: f64,
    ) -> Self {
        Self {
            world_map,
            inventory_sink,
            generators,
            llm,
            clock,
            director_timeout,
            narrator_timeout,
            critical_failure_probability,
            blueprints: Mutex::new(BTreeMap::new()),
            instances: Mutex::new(BTreeMap::new()),
            mode: TurnMode::WorldView,
            active: None,
        }
    }

    pub fn mode(&self) -> TurnMode {
        self.mode
    }

    /// Route one inbound client message to the appropriate guard/phase
    /// function, per the predecessor's websocket dispatch (§4.C9).
    ///
    /// Returns every `ServerMessage` the turn produces, in send order: a
    /// `Narration` (the Narrator's prose for the just-applied action) is
    /// always followed by the `ActionsOffered`/`InteractionEnded` that
    /// closes the turn, so `show_narration` and `show_actions` both run
    /// per §6 instead of the narration being logged and discarded.
    pub async fn handle_client_message(&mut self, message: ClientMessage) -> Result<Vec<ServerMessage>, EngineError> {
        match message {
            ClientMessage::Hello { .. } => Ok(vec![ServerMessage::Narration { text: "connected".to_string() }]),
            ClientMessage::VertexArrived { location_id } => self.enter_location(location_id).await.map(|msg| vec![msg]),
            ClientMessage::ChooseAction { choice_index } => self.choose_action(choice_index).await,
            ClientMessage::LeaveLocation => self.leave_location().await,
        }
    }

    /// Guard: a new location may only be entered from `WorldView`/`Traveling`
    /// (§4.C9 "can_move"-style guard).
    fn guard_can_enter(&self) -> Result<(), EngineError> {
        if self.mode == TurnMode::LocationInteraction {
            return Err(EngineError::InvalidTransition(
                "cannot enter a new location while an interaction is active".to_string(),
            ));
        }
        Ok(())
    }

    /// `Traveling → LocationInteraction` (§4.C9 "enter_region"): resolve the
    /// vertex through the world-map collaborator, generate-or-reuse the
    /// blueprint (C2/C3), create-or-resume the instance state, and run the
    /// first `GeneratingActions` phase.
    async fn enter_location(&mut self, vertex_key: LocationId) -> Result<ServerMessage, EngineError> {
        self.guard_can_enter()?;
        self.mode = TurnMode::Traveling;

        let vertex = self
            .world_map
            .get_vertex_info(vertex_key.as_str())
            .ok_or_else(|| EngineError::InvalidTransition(format!("no vertex info for location '{vertex_key}'")))?;

        // No concrete location authored for this vertex: fall back to
        // biome-as-location, synthesising an id from the biome and vertex key.
        let location_id = match &vertex.location_id {
            Some(location_id) => location_id.clone(),
            None => LocationId::from(format!("{}_{}", vertex.biome, vertex_key.as_str())),
        };

        let blueprint = self.blueprint_for(&location_id, &vertex.biome)?;

        let instance = {
            let mut instances = self.instances.lock().expect("instance cache poisoned");
            match instances.remove(&location_id) {
                Some(existing) => {
                    let entry = blueprint.entry_sublocations().first().cloned().cloned().unwrap_or_else(|| existing.current_sublocation_id().clone());
                    existing.re_enter(entry, self.clock.now())
                }
                None => {
                    let entry = blueprint
                        .entry_sublocations()
                        .first()
                        .cloned()
                        .cloned()
                        .ok_or_else(|| EngineError::InvalidTransition("blueprint has no entry sublocation".to_string()))?;
                    LocationInstanceState::first_visit(&blueprint, entry, self.clock.now())
                }
            }
        };

        let generator = self
            .generators
            .get(&vertex.biome)
            .ok_or_else(|| EngineError::InvalidTransition(format!("no generator registered for biome '{}'", vertex.biome)))?;

        let director = Arc::new(Director::new(self.llm.clone(), self.director_timeout));
        let narrator = Arc::new(Narrator::new(self.llm.clone(), self.narrator_timeout, self.critical_failure_probability));
        let skill_vocabulary = generator.skill_vocabulary().to_vec();

        let mut loop_ = InteractionLoop::new(
            blueprint.clone(),
            instance,
            director,
            narrator,
            self.clock.clone(),
            skill_vocabulary,
            Default::default(),
        );

        let context = generator.generate_context(&location_id);
        let choices = loop_.generate_actions(&context, "This is the first turn of this visit.", "", 4).await?;

        self.mode = TurnMode::LocationInteraction;
        self.active = Some(ActiveInteraction { location_id: location_id.clone(), blueprint, loop_ });

        Ok(ServerMessage::ActionsOffered { location_id, choices })
    }

    fn blueprint_for(&self, location_id: &LocationId, biome: &str) -> Result<Arc<Blueprint>, EngineError> {
        let mut cache = self.blueprints.lock().expect("blueprint cache poisoned");
        if let Some(existing) = cache.get(location_id) {
            return Ok(existing.clone());
        }

        let generator = self
            .generators
            .get(biome)
            .ok_or_else(|| EngineError::InvalidTransition(format!("no generator registered for biome '{biome}'")))?;

        let blueprint = Arc::new(generator.generate_blueprint(location_id)?);
        cache.insert(location_id.clone(), blueprint.clone());
        Ok(blueprint)
    }

    /// `AwaitingChoice → Executing → Applying` (§4.C8 steps 2-4), dispatched
    /// from `LocationInteraction` mode only.
    async fn choose_action(&mut self, choice_index: usize) -> Result<Vec<ServerMessage>, EngineError> {
        let active = self.active.as_mut().ok_or_else(|| EngineError::InvalidTransition("no active interaction".to_string()))?;

        let result = active.loop_.choose(choice_index, "Continuing the scene.").await?;
        let narration = result.narrative_text().to_string();

        for item in &result.consequences().gained_item {
            self.inventory_sink.grant_item(item);
        }
        for companion in &result.consequences().gained_companion {
            self.inventory_sink.grant_companion(companion);
        }
        for quest in &result.consequences().gained_quest {
            self.inventory_sink.grant_quest(quest);
        }
        for npc in &result.consequences().gained_npc {
            self.inventory_sink.grant_npc(npc);
        }

        let outcome = active.loop_.apply(false)?;
        let narration_msg = ServerMessage::Narration { text: narration.clone() };

        match outcome {
            InteractionOutcome::Continue => {
                let active = self.active.as_mut().expect("checked above");
                let choices = active.loop_.generate_actions(&narration, "", &narration, 4).await?;
                let location_id = active.location_id.clone();
                Ok(vec![narration_msg, ServerMessage::ActionsOffered { location_id, choices }])
            }
            InteractionOutcome::End => {
                let finished = self.active.take().expect("checked above");
                let ended = self.persist_and_return(finished, narration)?;
                Ok(vec![narration_msg, ended])
            }
        }
    }

    /// Explicit "leave" selection: ends the interaction regardless of the
    /// Director's offered choices (§4.C8 step 4 "designated leave action").
    async fn leave_location(&mut self) -> Result<Vec<ServerMessage>, EngineError> {
        let mut active = self.active.take().ok_or_else(|| EngineError::InvalidTransition("no active interaction".to_string()))?;

        let narration = if active.loop_.phase() == crate::interaction::InteractionPhase::AwaitingChoice {
            let result = active.loop_.leave("Leaving.").await?;
            active.loop_.apply(true)?;
            result.narrative_text().to_string()
        } else {
            "You step back and leave.".to_string()
        };

        let narration_msg = ServerMessage::Narration { text: narration.clone() };
        let ended = self.persist_and_return(active, narration)?;
        Ok(vec![narration_msg, ended])
    }

    fn persist_and_return(&mut self, finished: ActiveInteraction, narration: String) -> Result<ServerMessage, EngineError> {
        let location_id = finished.location_id;
        let instance = finished.loop_.into_instance();

        let mut instances = self.instances.lock().expect("instance cache poisoned");
        instances.insert(location_id.clone(), instance);
        drop(instances);

        self.mode = TurnMode::WorldView;
        tracing::debug!(%location_id, %narration, "interaction ended, returning to world view");
        Ok(ServerMessage::InteractionEnded { location_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::ports::{FakeInventorySink, FakeWorldMap, FinishReason, LlmError, LlmRequest, LlmResponse, ToolCall, ToolDefinition, VertexInfo};
    use async_trait::async_trait;

    struct ScriptedLlm;

    #[async_trait]
    impl LlmPort for ScriptedLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse { content: "Nothing stirs.".to_string(), tool_calls: vec![], finish_reason: FinishReason::Stop, usage: None })
        }

        async fn generate_with_tools(&self, _request: LlmRequest, _tools: Vec<ToolDefinition>) -> Result<LlmResponse, LlmError> {
            let args = serde_json::json!({
                "action_text": "Creep quietly toward the treeline",
                "success_consequences": {},
                "failure_consequences": { "kind": "none", "description": "Nothing happens." },
                "related_skill": "stealth",
                "difficulty": 1,
            });
            Ok(LlmResponse {
                content: String::new(),
                tool_calls: vec![ToolCall { name: "propose_action".to_string(), arguments: args }],
                finish_reason: FinishReason::ToolCalls,
                usage: None,
            })
        }
    }

    fn controller() -> TurnController {
        let world_map = Arc::new(FakeWorldMap::new().with_vertex(
            "v1",
            VertexInfo { biome: "forest".to_string(), location_id: Some(LocationId::from("forest_1")), noise_value: 0.2 },
        ));
        let inventory = Arc::new(FakeInventorySink::new());
        let generators = GeneratorRegistry::with_defaults();
        let llm = Arc::new(ScriptedLlm);
        let clock = Arc::new(SystemClock::new());

        TurnController::new(world_map, inventory, generators, llm, clock, Duration::from_secs(5), Duration::from_secs(5), 0.0)
    }

    #[tokio::test]
    async fn vertex_arrived_offers_actions_and_enters_location_interaction_mode() {
        let mut tc = controller();
        let response = tc
            .handle_client_message(ClientMessage::VertexArrived { location_id: LocationId::from("v1") })
            .await
            .unwrap();

        assert!(matches!(response.as_slice(), [ServerMessage::ActionsOffered { .. }]));
        assert_eq!(tc.mode(), TurnMode::LocationInteraction);
    }

    #[tokio::test]
    async fn choosing_an_action_sends_narration_before_the_next_turn_message() {
        let mut tc = controller();
        tc.handle_client_message(ClientMessage::VertexArrived { location_id: LocationId::from("v1") }).await.unwrap();

        let response = tc.handle_client_message(ClientMessage::ChooseAction { choice_index: 0 }).await.unwrap();
        assert_eq!(response.len(), 2);
        assert!(matches!(response[0], ServerMessage::Narration { .. }));
        assert!(matches!(response[1], ServerMessage::ActionsOffered { .. }) || matches!(response[1], ServerMessage::InteractionEnded { .. }));
    }

    #[tokio::test]
    async fn a_vertex_with_no_concrete_location_falls_back_to_biome_as_location() {
        let world_map = Arc::new(
            FakeWorldMap::new().with_vertex("9,3", VertexInfo { biome: "forest".to_string(), location_id: None, noise_value: 0.1 }),
        );
        let inventory = Arc::new(FakeInventorySink::new());
        let generators = GeneratorRegistry::with_defaults();
        let llm = Arc::new(ScriptedLlm);
        let clock = Arc::new(SystemClock::new());
        let mut tc = TurnController::new(world_map, inventory, generators, llm, clock, Duration::from_secs(5), Duration::from_secs(5), 0.0);

        let response = tc.handle_client_message(ClientMessage::VertexArrived { location_id: LocationId::from("9,3") }).await.unwrap();

        match response.as_slice() {
            [ServerMessage::ActionsOffered { location_id, .. }] => assert_eq!(location_id.as_str(), "forest_9,3"),
            other => panic!("expected a single ActionsOffered, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn entering_a_location_twice_without_leaving_is_rejected() {
        let mut tc = controller();
        tc.handle_client_message(ClientMessage::VertexArrived { location_id: LocationId::from("v1") }).await.unwrap();

        let second = tc.handle_client_message(ClientMessage::VertexArrived { location_id: LocationId::from("v1") }).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn leave_location_returns_to_world_view() {
        let mut tc = controller();
        tc.handle_client_message(ClientMessage::VertexArrived { location_id: LocationId::from("v1") }).await.unwrap();

        let response = tc.handle_client_message(ClientMessage::LeaveLocation).await.unwrap();
        assert_eq!(response.len(), 2);
        assert!(matches!(response[0], ServerMessage::Narration { .. }));
        assert!(matches!(response[1], ServerMessage::InteractionEnded { .. }));
        assert_eq!(tc.mode(), TurnMode::WorldView);
    }
}
