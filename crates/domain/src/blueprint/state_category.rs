//! `StateCategory`: a mutually-exclusive set of named states (e.g.
//! `time_of_day`), plus whether it tracks one active state per location or
//! one per sublocation (§3).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blueprint::location_state::LocationState;
use crate::error::DomainError;
use crate::ids::{CategoryId, StateId};

/// Whether a category's active state is tracked once per location, or once
/// per (visited) sublocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryScope {
    Location,
    Sublocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateCategory {
    category_id: CategoryId,
    name: String,
    possible_states: BTreeMap<StateId, LocationState>,
    default_state_id: StateId,
    scope: CategoryScope,
}

impl StateCategory {
    /// Construct a category. Fails if `default_state_id` is not a member of
    /// `possible_states` (a prerequisite for invariant 3).
    pub fn new(
        category_id: impl Into<CategoryId>,
        name: impl Into<String>,
        possible_states: impl IntoIterator<Item = LocationState>,
        default_state_id: impl Into<StateId>,
        scope: CategoryScope,
    ) -> Result<Self, DomainError> {
        let possible_states: BTreeMap<StateId, LocationState> = possible_states
            .into_iter()
            .map(|s| (s.state_id().clone(), s))
            .collect();
        let default_state_id = default_state_id.into();

        if !possible_states.contains_key(&default_state_id) {
            return Err(DomainError::invariant(format!(
                "default_state_id '{default_state_id}' is not a member of possible_states"
            )));
        }

        Ok(Self {
            category_id: category_id.into(),
            name: name.into(),
            possible_states,
            default_state_id,
            scope,
        })
    }

    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn possible_states(&self) -> &BTreeMap<StateId, LocationState> {
        &self.possible_states
    }

    pub fn default_state_id(&self) -> &StateId {
        &self.default_state_id
    }

    pub fn scope(&self) -> CategoryScope {
        self.scope
    }

    pub fn get_state(&self, state_id: &StateId) -> Option<&LocationState> {
        self.possible_states.get(state_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str) -> LocationState {
        LocationState::new(id, id, format!("the {id} state"))
    }

    #[test]
    fn rejects_default_not_in_possible_states() {
        let result = StateCategory::new(
            "time_of_day",
            "Time of Day",
            [state("morning"), state("night")],
            "noon",
            CategoryScope::Location,
        );
        assert!(result.is_err());
    }

    #[test]
    fn accepts_default_present_in_possible_states() {
        let category = StateCategory::new(
            "time_of_day",
            "Time of Day",
            [state("morning"), state("night")],
            "morning",
            CategoryScope::Location,
        )
        .unwrap();
        assert_eq!(category.default_state_id().as_str(), "morning");
        assert!(category.get_state(&StateId::from("night")).is_some());
    }
}
