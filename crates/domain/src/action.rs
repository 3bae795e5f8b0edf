//! `ActionChoice` (Director output) and `ActionResult` (executor output),
//! plus the consequence payload an applied result may carry (§3).

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CategoryId, StateId, SublocationId};

/// A candidate action offered to the player by the Director role (§4.C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionChoice {
    action_text: String,
    success_consequences: Option<String>,
    failure_consequences: Option<String>,
    related_skill: String,
    difficulty: u8,
}

impl ActionChoice {
    /// Construct a choice, enforcing invariant 7 (text length 10-100,
    /// difficulty in 1..=5).
    pub fn new(
        action_text: impl Into<String>,
        related_skill: impl Into<String>,
        difficulty: u8,
    ) -> Result<Self, DomainError> {
        let action_text = action_text.into();
        if !(10..=100).contains(&action_text.len()) {
            return Err(DomainError::validation(format!(
                "action_text must be 10-100 characters, got {}",
                action_text.len()
            )));
        }
        if !(1..=5).contains(&difficulty) {
            return Err(DomainError::validation(format!(
                "difficulty must be in 1..=5, got {difficulty}"
            )));
        }

        Ok(Self {
            action_text,
            success_consequences: None,
            failure_consequences: None,
            related_skill: related_skill.into(),
            difficulty,
        })
    }

    pub fn with_success_consequences(mut self, text: impl Into<String>) -> Self {
        self.success_consequences = Some(text.into());
        self
    }

    pub fn with_failure_consequences(mut self, text: impl Into<String>) -> Self {
        self.failure_consequences = Some(text.into());
        self
    }

    pub fn action_text(&self) -> &str {
        &self.action_text
    }

    pub fn success_consequences(&self) -> Option<&str> {
        self.success_consequences.as_deref()
    }

    pub fn failure_consequences(&self) -> Option<&str> {
        self.failure_consequences.as_deref()
    }

    pub fn related_skill(&self) -> &str {
        &self.related_skill
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }
}

/// A single optional state-category change (the `state_changes` slot is
/// single-valued per §4.C4/§9: exactly one category may change per action).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub category: CategoryId,
    pub new_state: StateId,
}

/// Composable effects an applied `ActionResult` may carry (§4.C7). All
/// fields are optional on a single result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsequencePayload {
    pub sublocation_change: Option<SublocationId>,
    pub state_change: Option<StateChange>,
    pub gained_item: Option<String>,
    pub gained_companion: Option<String>,
    pub gained_quest: Option<String>,
    pub gained_npc: Option<String>,
}

impl ConsequencePayload {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_sublocation_change(mut self, sublocation_id: impl Into<SublocationId>) -> Self {
        self.sublocation_change = Some(sublocation_id.into());
        self
    }

    pub fn with_state_change(mut self, category: impl Into<CategoryId>, new_state: impl Into<StateId>) -> Self {
        self.state_change = Some(StateChange {
            category: category.into(),
            new_state: new_state.into(),
        });
        self
    }

    pub fn with_gained_item(mut self, item: impl Into<String>) -> Self {
        self.gained_item = Some(item.into());
        self
    }

    pub fn with_gained_companion(mut self, companion: impl Into<String>) -> Self {
        self.gained_companion = Some(companion.into());
        self
    }

    pub fn with_gained_quest(mut self, quest: impl Into<String>) -> Self {
        self.gained_quest = Some(quest.into());
        self
    }

    pub fn with_gained_npc(mut self, npc: impl Into<String>) -> Self {
        self.gained_npc = Some(npc.into());
        self
    }
}

/// The executor's output for one resolved action (§3, §4.C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    was_successful: bool,
    is_critical_failure: bool,
    narrative_text: String,
    consequences: ConsequencePayload,
}

impl ActionResult {
    pub fn new(was_successful: bool, narrative_text: impl Into<String>) -> Self {
        Self {
            was_successful,
            is_critical_failure: false,
            narrative_text: narrative_text.into(),
            consequences: ConsequencePayload::none(),
        }
    }

    pub fn critical_failure(narrative_text: impl Into<String>) -> Self {
        Self {
            was_successful: false,
            is_critical_failure: true,
            narrative_text: narrative_text.into(),
            consequences: ConsequencePayload::none(),
        }
    }

    pub fn with_consequences(mut self, consequences: ConsequencePayload) -> Self {
        self.consequences = consequences;
        self
    }

    pub fn was_successful(&self) -> bool {
        self.was_successful
    }

    pub fn is_critical_failure(&self) -> bool {
        self.is_critical_failure
    }

    pub fn narrative_text(&self) -> &str {
        &self.narrative_text
    }

    pub fn consequences(&self) -> &ConsequencePayload {
        &self.consequences
    }
}
