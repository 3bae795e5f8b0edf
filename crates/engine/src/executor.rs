//! C6 Action Executor: the Director and Narrator roles, two thin wrappers
//! over `Arc<dyn LlmPort>` sharing the "build prompt -> submit -> validate"
//! contract of §4.C6. Success rolls and critical-failure sampling use a
//! `SeededRng` built from `(location_id, turn_count_this_visit)` so replays
//! with identical LM outputs are reproducible.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use wrldbldr_domain::{ActionChoice, ActionResult, ConsequencePayload, LocationId, SeededRng};

use crate::constraint::ActionConstraint;
use crate::infrastructure::error::EngineError;
use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest, ToolDefinition};
use crate::schema::{to_json_schema, to_prompt_template, validate_json, ActionChoiceResponse, SuccessConsequencesResponse};

/// A candidate offered to the player: the display-facing `ActionChoice` plus
/// the structured response it was parsed from, kept around so the Narrator
/// can turn the chosen candidate's `success_consequences` into a
/// `ConsequencePayload` without re-querying the LM (§4.C6, §4.C7).
#[derive(Debug, Clone)]
pub struct ProposedAction {
    pub choice: ActionChoice,
    response: ActionChoiceResponse,
}

impl ProposedAction {
    /// The failure vocabulary member this candidate narrates on failure
    /// (§4.C4's fixed `failure_consequences.kind` choices).
    pub fn failure_kind(&self) -> crate::constraint::FailureKind {
        self.response.failure_consequences.kind
    }
}

/// Shared prompt-assembly step for both roles (§4.C6 step 1).
fn build_prompt(context_prefix: &str, recent_state_summary: &str, last_action_summary: &str, template: &str) -> String {
    format!("{context_prefix}\n\n{recent_state_summary}\n\n{last_action_summary}\n\n{template}")
}

fn action_tool(constraint: &ActionConstraint) -> ToolDefinition {
    ToolDefinition {
        name: "propose_action".to_string(),
        description: "Propose one candidate action consistent with the current location state.".to_string(),
        parameters: to_json_schema(constraint),
    }
}

/// The Director role: produces candidate `ActionChoice`s under the current
/// constraint (§4.C6, §4.C8 `GeneratingActions`).
pub struct Director {
    llm: Arc<dyn LlmPort>,
    timeout: Duration,
}

impl Director {
    pub fn new(llm: Arc<dyn LlmPort>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Request `count` candidate actions, each independently constrained and
    /// validated (§4.C8 step 1 asks for N, typically 3-6).
    pub async fn propose_actions(
        &self,
        constraint: &ActionConstraint,
        context_prefix: &str,
        recent_state_summary: &str,
        last_action_summary: &str,
        count: usize,
    ) -> Result<Vec<ProposedAction>, EngineError> {
        let mut proposals = Vec::with_capacity(count);
        for _ in 0..count {
            proposals.push(self.propose_one(constraint, context_prefix, recent_state_summary, last_action_summary).await?);
        }
        Ok(proposals)
    }

    async fn propose_one(
        &self,
        constraint: &ActionConstraint,
        context_prefix: &str,
        recent_state_summary: &str,
        last_action_summary: &str,
    ) -> Result<ProposedAction, EngineError> {
        let template = to_prompt_template(constraint);
        let prompt = build_prompt(context_prefix, recent_state_summary, last_action_summary, &template);
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)]);
        let tool = action_tool(constraint);

        let response = timeout(self.timeout, self.llm.generate_with_tools(request, vec![tool]))
            .await
            .map_err(|_| EngineError::LmTimeout)??;

        let call = response
            .tool_calls
            .first()
            .ok_or_else(|| EngineError::LmInvalidJson("no tool call in response".to_string()))?;

        let payload = serde_json::to_vec(&call.arguments).map_err(|e| EngineError::LmInvalidJson(e.to_string()))?;

        let parsed: ActionChoiceResponse = validate_json(constraint, &payload)
            .map_err(|violations| EngineError::LmSchemaViolation(format!("{violations:?}")))?;

        proposed_action_from_response(parsed)
    }
}

fn proposed_action_from_response(response: ActionChoiceResponse) -> Result<ProposedAction, EngineError> {
    let choice = ActionChoice::new(response.action_text.clone(), response.related_skill.clone(), response.difficulty)
        .map_err(|e| EngineError::LmSchemaViolation(e.to_string()))?
        .with_success_consequences(describe_success(&response.success_consequences))
        .with_failure_consequences(response.failure_consequences.description.clone());

    Ok(ProposedAction { choice, response })
}

fn describe_success(response: &SuccessConsequencesResponse) -> String {
    let mut parts = Vec::new();
    if let Some(sc) = &response.state_change {
        parts.push(format!("{} becomes {}", sc.category, sc.new_state));
    }
    if let Some(sub) = &response.sublocation_change {
        parts.push(format!("move to {sub}"));
    }
    if let Some(item) = &response.gained_item {
        parts.push(format!("gain {item}"));
    }
    if let Some(companion) = &response.gained_companion {
        parts.push(format!("gain companion {companion}"));
    }
    if let Some(quest) = &response.gained_quest {
        parts.push(format!("gain quest {quest}"));
    }
    if let Some(npc) = &response.gained_npc {
        parts.push(format!("meet {npc}"));
    }
    if parts.is_empty() {
        "the action succeeds".to_string()
    } else {
        parts.join("; ")
    }
}

fn consequences_from_response(response: &SuccessConsequencesResponse) -> ConsequencePayload {
    let mut payload = ConsequencePayload::none();
    if let Some(sub) = &response.sublocation_change {
        payload = payload.with_sublocation_change(sub.clone());
    }
    if let Some(sc) = &response.state_change {
        payload = payload.with_state_change(sc.category.clone(), sc.new_state.clone());
    }
    if let Some(item) = &response.gained_item {
        payload = payload.with_gained_item(item.clone());
    }
    if let Some(companion) = &response.gained_companion {
        payload = payload.with_gained_companion(companion.clone());
    }
    if let Some(quest) = &response.gained_quest {
        payload = payload.with_gained_quest(quest.clone());
    }
    if let Some(npc) = &response.gained_npc {
        payload = payload.with_gained_npc(npc.clone());
    }
    payload
}

/// The Narrator role: produces outcome prose for the chosen action, and owns
/// the success roll / critical-failure sampling (§4.C6).
pub struct Narrator {
    llm: Arc<dyn LlmPort>,
    timeout: Duration,
    critical_failure_probability: f64,
}

impl Narrator {
    pub fn new(llm: Arc<dyn LlmPort>, timeout: Duration, critical_failure_probability: f64) -> Self {
        Self { llm, timeout, critical_failure_probability }
    }

    /// Resolve one chosen action: roll success against `difficulty`, sample
    /// critical failure, then request prose constrained by the chosen
    /// action's own consequence slot (§4.C6, §4.C8 `Executing`).
    pub async fn execute_action(
        &self,
        location_id: &LocationId,
        turn_count_this_visit: u32,
        proposal: &ProposedAction,
        context_prefix: &str,
    ) -> Result<ActionResult, EngineError> {
        let mut rng = SeededRng::for_turn(location_id.as_str(), turn_count_this_visit as u64);

        // Critical failure is drawn independently of the success roll: a
        // uniform ~15% of all executions, not conditioned on the roll's
        // outcome (see `EngineConfig::critical_failure_probability`).
        let is_critical_failure = rng.gen_bool(self.critical_failure_probability);
        let roll = rng.roll_d6();
        let was_successful = !is_critical_failure && roll >= proposal.choice.difficulty() as u32;

        if is_critical_failure {
            let prose = self.narrate(context_prefix, &proposal.choice, false).await?;
            return Ok(ActionResult::critical_failure(prose));
        }

        let prose = self.narrate(context_prefix, &proposal.choice, was_successful).await?;
        let consequences = if was_successful {
            consequences_from_response(&proposal.response.success_consequences)
        } else {
            ConsequencePayload::none()
        };

        Ok(ActionResult::new(was_successful, prose).with_consequences(consequences))
    }

    async fn narrate(&self, context_prefix: &str, choice: &ActionChoice, was_successful: bool) -> Result<String, EngineError> {
        let outcome_hint = if was_successful {
            choice.success_consequences().unwrap_or("the action succeeds")
        } else {
            choice.failure_consequences().unwrap_or("the action fails")
        };

        let prompt = format!("{context_prefix}\n\nThe player attempted: {}\nOutcome: {outcome_hint}\n\nWrite 2-4 sentences of narration for this outcome.", choice.action_text());
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)]);

        let response = timeout(self.timeout, self.llm.generate(request)).await.map_err(|_| EngineError::LmTimeout)??;

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{FinishReason, LlmError, LlmResponse};
    use async_trait::async_trait;

    struct StubLlm {
        content: String,
        tool_call_args: Option<serde_json::Value>,
    }

    #[async_trait]
    impl LlmPort for StubLlm {
        async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse { content: self.content.clone(), tool_calls: vec![], finish_reason: FinishReason::Stop, usage: None })
        }

        async fn generate_with_tools(
            &self,
            _request: LlmRequest,
            _tools: Vec<ToolDefinition>,
        ) -> Result<LlmResponse, LlmError> {
            let tool_calls = match &self.tool_call_args {
                Some(args) => vec![crate::infrastructure::ports::ToolCall { name: "propose_action".to_string(), arguments: args.clone() }],
                None => vec![],
            };
            Ok(LlmResponse { content: String::new(), tool_calls, finish_reason: FinishReason::ToolCalls, usage: None })
        }
    }

    fn sample_constraint() -> ActionConstraint {
        crate::constraint::ActionConstraint {
            action_text_min_len: 10,
            action_text_max_len: 100,
            success_consequences: crate::constraint::SuccessConstraint::default(),
            failure_consequences: crate::constraint::FailureConstraint {
                kind_choices: crate::constraint::FAILURE_KINDS.to_vec(),
                description_max_len: 200,
            },
            related_skill_choices: vec!["stealth".to_string()],
            difficulty_min: 1,
            difficulty_max: 5,
        }
    }

    #[tokio::test]
    async fn director_converts_a_valid_tool_call_into_a_proposed_action() {
        let args = serde_json::json!({
            "action_text": "Creep quietly toward the treeline",
            "success_consequences": {},
            "failure_consequences": { "kind": "none", "description": "Nothing happens." },
            "related_skill": "stealth",
            "difficulty": 2,
        });
        let llm = Arc::new(StubLlm { content: String::new(), tool_call_args: Some(args) });
        let director = Director::new(llm, Duration::from_secs(5));

        let proposals = director
            .propose_actions(&sample_constraint(), "You stand at the forest edge.", "It is morning.", "", 1)
            .await
            .unwrap();

        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].choice.related_skill(), "stealth");
    }

    #[tokio::test]
    async fn director_surfaces_schema_violation_on_missing_tool_call() {
        let llm = Arc::new(StubLlm { content: String::new(), tool_call_args: None });
        let director = Director::new(llm, Duration::from_secs(5));

        let result = director.propose_actions(&sample_constraint(), "prefix", "state", "last", 1).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn narrator_produces_prose_for_the_chosen_action() {
        let llm = Arc::new(StubLlm { content: "The brush rustles as you pass.".to_string(), tool_call_args: None });
        let narrator = Narrator::new(llm, Duration::from_secs(5), 0.0);
        let args = serde_json::json!({
            "action_text": "Creep quietly toward the treeline",
            "success_consequences": {},
            "failure_consequences": { "kind": "none", "description": "Nothing happens." },
            "related_skill": "stealth",
            "difficulty": 1,
        });
        let response: ActionChoiceResponse = serde_json::from_value(args).unwrap();
        let proposal = proposed_action_from_response(response).unwrap();

        let result = narrator
            .execute_action(&LocationId::from("forest_1"), 0, &proposal, "You stand at the forest edge.")
            .await
            .unwrap();

        assert_eq!(result.narrative_text(), "The brush rustles as you pass.");
    }

    #[test]
    fn critical_failure_probability_is_independent_of_the_success_roll() {
        // A very high critical-failure probability should dominate regardless
        // of difficulty; this is a property of the draw order, not of timing.
        let mut rng = SeededRng::for_turn("forest_1", 0);
        let is_critical = rng.gen_bool(1.0);
        assert!(is_critical);
    }
}
