//! C8 Interaction Loop: drives turns within one location visit (§4.C8).
//!
//! Grounded in the predecessor's `use_cases/conversation/{start,
//! continue_conversation,end}.rs` shape: one function per phase, an
//! explicit loop owner holding the mutable session rather than a free
//! function threading state through channels.

use std::collections::BTreeSet;
use std::sync::Arc;

use wrldbldr_domain::{ActionChoice, Blueprint, LocationInstanceState, SublocationId};

use crate::constraint::{build_constraint, FailureKind};
use crate::executor::{Director, Narrator, ProposedAction};
use crate::infrastructure::error::EngineError;
use crate::infrastructure::ports::ClockPort;

/// The interaction loop's current phase (§4.C8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    GeneratingActions,
    AwaitingChoice,
    Executing,
    Applying,
    End,
}

/// Result of `InteractionLoop::apply` (§4.C8 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    Continue,
    End,
}

/// Drives one location visit's turn cycle. Owns the current
/// `LocationInstanceState` and advances it on every applied action; the
/// turn controller (C9) owns the loop itself across visits (§4.C9).
pub struct InteractionLoop {
    blueprint: Arc<Blueprint>,
    instance: LocationInstanceState,
    director: Arc<Director>,
    narrator: Arc<Narrator>,
    clock: Arc<dyn ClockPort>,
    skill_vocabulary: Vec<String>,
    terminal_sublocations: BTreeSet<SublocationId>,
    phase: InteractionPhase,
    pending: Vec<ProposedAction>,
    last_result: Option<wrldbldr_domain::ActionResult>,
}

impl InteractionLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        blueprint: Arc<Blueprint>,
        instance: LocationInstanceState,
        director: Arc<Director>,
        narrator: Arc<Narrator>,
        clock: Arc<dyn ClockPort>,
        skill_vocabulary: Vec<String>,
        terminal_sublocations: BTreeSet<SublocationId>,
    ) -> Self {
        Self {
            blueprint,
            instance,
            director,
            narrator,
            clock,
            skill_vocabulary,
            terminal_sublocations,
            phase: InteractionPhase::GeneratingActions,
            pending: Vec::new(),
            last_result: None,
        }
    }

    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    pub fn instance(&self) -> &LocationInstanceState {
        &self.instance
    }

    fn require_phase(&self, expected: InteractionPhase) -> Result<(), EngineError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition(format!("expected phase {expected:?}, was {:?}", self.phase)))
        }
    }

    /// **GeneratingActions** (§4.C8 step 1): call the Director for `count`
    /// candidate actions under the current constraint, and return their
    /// display-facing `ActionChoice`s. The last slot is always the
    /// designated "leave this location" option.
    pub async fn generate_actions(
        &mut self,
        context_prefix: &str,
        recent_state_summary: &str,
        last_action_summary: &str,
        count: usize,
    ) -> Result<Vec<ActionChoice>, EngineError> {
        self.require_phase(InteractionPhase::GeneratingActions)?;

        let constraint = build_constraint(&self.blueprint, &self.instance, &self.skill_vocabulary);
        let proposals = self
            .director
            .propose_actions(&constraint, context_prefix, recent_state_summary, last_action_summary, count)
            .await?;

        let choices = proposals.iter().map(|p| p.choice.clone()).collect();
        self.pending = proposals;
        self.phase = InteractionPhase::AwaitingChoice;
        Ok(choices)
    }

    /// **AwaitingChoice → Executing** (§4.C8 steps 2-3): resolve the
    /// player's chosen index. `index == pending.len()` selects the implicit
    /// leave option and ends the interaction without invoking the Narrator.
    pub async fn choose(&mut self, index: usize, context_prefix: &str) -> Result<wrldbldr_domain::ActionResult, EngineError> {
        self.require_phase(InteractionPhase::AwaitingChoice)?;
        self.phase = InteractionPhase::Executing;

        if index == self.pending.len() {
            let result = wrldbldr_domain::ActionResult::new(true, "You step back and leave.");
            self.last_result = Some(result.clone());
            self.phase = InteractionPhase::Applying;
            return Ok(result);
        }

        let proposal = self
            .pending
            .get(index)
            .ok_or_else(|| EngineError::InvalidTransition(format!("choice index {index} is out of range")))?
            .clone();

        let result = self
            .narrator
            .execute_action(self.instance.location_id(), self.instance.turn_count_this_visit(), &proposal, context_prefix)
            .await?;

        let result = if !result.was_successful() && !result.is_critical_failure() {
            match self.wildlife_alert_consequence(&proposal) {
                Some(consequence) => result.with_consequences(consequence),
                None => result,
            }
        } else {
            result
        };

        self.last_result = Some(result.clone());
        self.phase = InteractionPhase::Applying;
        Ok(result)
    }

    /// A `StartledWildlife` failure mechanically alarms the location's
    /// shared `wildlife_state` category (every reference generator defines
    /// `calm`/`alert` under that id), rather than relying on the LM to
    /// express it through the narrow `(kind, description)` failure slot.
    fn wildlife_alert_consequence(&self, proposal: &ProposedAction) -> Option<wrldbldr_domain::ConsequencePayload> {
        if proposal.failure_kind() != FailureKind::StartledWildlife {
            return None;
        }

        let category = self.blueprint.get_category(&wrldbldr_domain::CategoryId::from("wildlife_state"))?;
        let alert = category.get_state(&wrldbldr_domain::StateId::from("alert"))?;

        let mut prospective_active = self.instance.active_state_refs();
        prospective_active.insert(wrldbldr_domain::StateRef::new("wildlife_state", "alert"));

        alert
            .is_accessible(&prospective_active)
            .then(|| wrldbldr_domain::ConsequencePayload::none().with_state_change("wildlife_state", "alert"))
    }

    /// Select the implicit leave option regardless of how many candidates
    /// are pending; valid from `AwaitingChoice` only. Equivalent to
    /// `choose(pending.len(), ..)` but does not require the caller to know
    /// the candidate count.
    pub async fn leave(&mut self, context_prefix: &str) -> Result<wrldbldr_domain::ActionResult, EngineError> {
        let leave_index = self.pending.len();
        self.choose(leave_index, context_prefix).await
    }

    /// **Applying** (§4.C8 step 4): apply the last result through C7 and
    /// decide whether the interaction continues or ends.
    pub fn apply(&mut self, was_leave_choice: bool) -> Result<InteractionOutcome, EngineError> {
        self.require_phase(InteractionPhase::Applying)?;

        let result = self
            .last_result
            .take()
            .ok_or_else(|| EngineError::InvalidTransition("apply called with no pending result".to_string()))?;

        let is_critical_failure = result.is_critical_failure();
        let next = self.instance.apply(&result, &self.blueprint, self.clock.now())?;
        let reached_terminal = self.terminal_sublocations.contains(next.current_sublocation_id());
        self.instance = next;

        if was_leave_choice || is_critical_failure || reached_terminal {
            self.phase = InteractionPhase::End;
            Ok(InteractionOutcome::End)
        } else {
            self.phase = InteractionPhase::GeneratingActions;
            Ok(InteractionOutcome::Continue)
        }
    }

    /// Consume the loop, returning the final instance state (§4.C8 "End").
    pub fn into_instance(self) -> LocationInstanceState {
        self.instance
    }
}
