//! Cancellation liveness (§8): "leaving `LocationInteraction` within 2x
//! timeout causes all outstanding LM requests ... to be cancelled." Director
//! and Narrator both bound their LM call with `tokio::time::timeout`, which
//! drops the inner future the instant it elapses - that drop *is* the
//! cancellation. The fake `LlmPort` below returns a future that can only
//! ever resolve via drop (it polls `Pending` forever), so a recorded drop is
//! unambiguous proof the in-flight request was actually cancelled, not just
//! that an error was synthesized around a request still running somewhere.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;

use wrldbldr_domain::{LocationId, LocationInstanceState, SublocationId};
use wrldbldr_engine::executor::{Director, Narrator};
use wrldbldr_engine::generators::{forest::ForestGenerator, LocationGenerator};
use wrldbldr_engine::infrastructure::error::EngineError;
use wrldbldr_engine::infrastructure::ports::{FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, ToolCall, ToolDefinition};

/// Never resolves on its own; the only way this future stops being polled
/// is for its caller to drop it, at which point `recorder` flips to `true`.
struct NeverResolves {
    recorder: Arc<AtomicBool>,
}

impl Drop for NeverResolves {
    fn drop(&mut self) {
        self.recorder.store(true, Ordering::SeqCst);
    }
}

impl Future for NeverResolves {
    type Output = Result<LlmResponse, LlmError>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        Poll::Pending
    }
}

struct StallingLlm {
    recorder: Arc<AtomicBool>,
}

#[async_trait]
impl LlmPort for StallingLlm {
    async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
        NeverResolves { recorder: self.recorder.clone() }.await
    }

    async fn generate_with_tools(&self, _request: LlmRequest, _tools: Vec<ToolDefinition>) -> Result<LlmResponse, LlmError> {
        NeverResolves { recorder: self.recorder.clone() }.await
    }
}

struct InstantLlm;

#[async_trait]
impl LlmPort for InstantLlm {
    async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
        Ok(LlmResponse { content: "Quiet.".to_string(), tool_calls: vec![], finish_reason: FinishReason::Stop, usage: None })
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

#[tokio::test]
async fn director_timeout_actually_drops_the_in_flight_request() {
    let recorder = Arc::new(AtomicBool::new(false));
    let llm: Arc<dyn LlmPort> = Arc::new(StallingLlm { recorder: recorder.clone() });
    let director = Director::new(llm, Duration::from_millis(20));

    let constraint = wrldbldr_engine::constraint::build_constraint(
        &ForestGenerator::new().generate_blueprint(&LocationId::from("forest_cancel_probe")).unwrap(),
        &LocationInstanceState::first_visit(
            &ForestGenerator::new().generate_blueprint(&LocationId::from("forest_cancel_probe")).unwrap(),
            SublocationId::from("forest_edge"),
            chrono::Utc::now(),
        ),
        &ForestGenerator::new().skill_vocabulary().to_vec(),
    );

    assert!(!recorder.load(Ordering::SeqCst), "request must not be reported cancelled before the call even runs");

    let result = director.propose_actions(&constraint, "prefix", "state", "", 1).await;

    assert!(matches!(result, Err(EngineError::LmTimeout)));
    assert!(recorder.load(Ordering::SeqCst), "director timeout must drop (cancel) the in-flight LM call, not merely time out a clone of it");
}

#[tokio::test]
async fn narrator_timeout_actually_drops_the_in_flight_request() {
    // Build a real `ProposedAction` through the Director first (on a
    // fast, non-stalling transport), then swap to a stalling transport
    // for the Narrator's own call - only the Narrator's request is under
    // test here.
    let instant_llm: Arc<dyn LlmPort> = Arc::new(InstantLlm);
    let director = Director::new(instant_llm, Duration::from_secs(5));
    let blueprint = ForestGenerator::new().generate_blueprint(&LocationId::from("forest_cancel_probe")).unwrap();
    let instance = LocationInstanceState::first_visit(&blueprint, SublocationId::from("forest_edge"), chrono::Utc::now());
    let constraint = wrldbldr_engine::constraint::build_constraint(&blueprint, &instance, &ForestGenerator::new().skill_vocabulary().to_vec());
    let proposals = director.propose_actions(&constraint, "prefix", "state", "", 1).await.unwrap();
    let proposal = proposals.into_iter().next().unwrap();

    let recorder = Arc::new(AtomicBool::new(false));
    let llm: Arc<dyn LlmPort> = Arc::new(StallingLlm { recorder: recorder.clone() });
    let narrator = Narrator::new(llm, Duration::from_millis(20), 0.0);

    let result = narrator.execute_action(&LocationId::from("forest_cancel_probe"), 0, &proposal, "prefix").await;

    assert!(matches!(result, Err(EngineError::LmTimeout)));
    assert!(recorder.load(Ordering::SeqCst), "narrator timeout must drop (cancel) the in-flight LM call");
}

/// Two requests made in the same interaction each get an independent
/// cancellation: a second director call stalling on a fresh `StallingLlm`
/// after a first one already timed out confirms cancellation isn't a
/// one-shot accident of the first call's plumbing.
#[tokio::test]
async fn repeated_timeouts_each_independently_cancel_their_request() {
    for _ in 0..3 {
        let recorder = Arc::new(AtomicBool::new(false));
        let llm: Arc<dyn LlmPort> = Arc::new(StallingLlm { recorder: recorder.clone() });
        let director = Director::new(llm, Duration::from_millis(15));

        let blueprint = ForestGenerator::new().generate_blueprint(&LocationId::from("forest_cancel_repeat_probe")).unwrap();
        let instance = LocationInstanceState::first_visit(&blueprint, SublocationId::from("forest_edge"), chrono::Utc::now());
        let constraint = wrldbldr_engine::constraint::build_constraint(&blueprint, &instance, &ForestGenerator::new().skill_vocabulary().to_vec());

        let result = director.propose_actions(&constraint, "prefix", "state", "", 1).await;
        assert!(matches!(result, Err(EngineError::LmTimeout)));
        assert!(recorder.load(Ordering::SeqCst));
    }
}
