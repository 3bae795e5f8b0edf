//! A single named state within a `StateCategory` (e.g. `night` within
//! `time_of_day`). Not to be confused with `LocationInstanceState`, the
//! per-visit mutable envelope defined in `crate::instance`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::blueprint::state_ref::StateRef;
use crate::ids::StateId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationState {
    state_id: StateId,
    name: String,
    description: String,
    required_states: BTreeSet<StateRef>,
    forbidden_states: BTreeSet<StateRef>,
}

impl LocationState {
    pub fn new(state_id: impl Into<StateId>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            state_id: state_id.into(),
            name: name.into(),
            description: description.into(),
            required_states: BTreeSet::new(),
            forbidden_states: BTreeSet::new(),
        }
    }

    pub fn with_required_states(mut self, states: impl IntoIterator<Item = StateRef>) -> Self {
        self.required_states = states.into_iter().collect();
        self
    }

    pub fn with_forbidden_states(mut self, states: impl IntoIterator<Item = StateRef>) -> Self {
        self.forbidden_states = states.into_iter().collect();
        self
    }

    pub fn state_id(&self) -> &StateId {
        &self.state_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn required_states(&self) -> &BTreeSet<StateRef> {
        &self.required_states
    }

    pub fn forbidden_states(&self) -> &BTreeSet<StateRef> {
        &self.forbidden_states
    }

    /// Whether `active` (the full set of currently-active fully-qualified
    /// state references) satisfies this state's access gates.
    pub fn is_accessible(&self, active: &BTreeSet<StateRef>) -> bool {
        self.required_states.iter().all(|r| active.contains(r))
            && self.forbidden_states.iter().all(|r| !active.contains(r))
    }
}
