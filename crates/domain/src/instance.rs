//! C7 Location State: the per-visit mutable envelope (`LocationInstanceState`)
//! and the pure transition function `apply` that produces a new instance
//! from an `ActionResult` rather than mutating in place (§3, §4.C7).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionResult;
use crate::blueprint::{Blueprint, CategoryScope, StateRef};
use crate::error::DomainError;
use crate::ids::{CategoryId, LocationId, StateId, SublocationId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInstanceState {
    location_id: LocationId,
    current_sublocation_id: SublocationId,
    active_states: BTreeMap<CategoryId, StateId>,
    sublocation_active_states: BTreeMap<(SublocationId, CategoryId), StateId>,
    visit_count: u32,
    turn_count_this_visit: u32,
    lifetime_turn_count: u64,
    action_history: Vec<ActionResult>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

impl LocationInstanceState {
    /// Create the envelope for a first visit: location-scoped categories
    /// seed from their `default_state_id`; sublocation-scoped categories
    /// seed from the entry sublocation's `local_states` (invariant 5).
    pub fn first_visit(blueprint: &Blueprint, entry_sublocation: SublocationId, now: DateTime<Utc>) -> Self {
        let mut active_states = BTreeMap::new();
        let mut sublocation_active_states = BTreeMap::new();

        for category in blueprint.state_categories().values() {
            match category.scope() {
                CategoryScope::Location => {
                    active_states.insert(category.category_id().clone(), category.default_state_id().clone());
                }
                CategoryScope::Sublocation => {
                    if let Some(sub) = blueprint.get_sublocation(&entry_sublocation) {
                        if let Some(state_id) = sub.local_states().get(category.category_id()) {
                            sublocation_active_states.insert(
                                (entry_sublocation.clone(), category.category_id().clone()),
                                state_id.clone(),
                            );
                        }
                    }
                }
            }
        }

        Self {
            location_id: blueprint.location_id().clone(),
            current_sublocation_id: entry_sublocation,
            active_states,
            sublocation_active_states,
            visit_count: 1,
            turn_count_this_visit: 0,
            lifetime_turn_count: 0,
            action_history: Vec::new(),
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Bump the visit counter and reset the per-visit turn counter on
    /// re-entry, preserving `active_states` and `action_history`
    /// (the "idempotence of reset" testable property, §8).
    pub fn re_enter(&self, entry_sublocation: SublocationId, now: DateTime<Utc>) -> Self {
        Self {
            current_sublocation_id: entry_sublocation,
            visit_count: self.visit_count + 1,
            turn_count_this_visit: 0,
            last_accessed_at: now,
            ..self.clone()
        }
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn current_sublocation_id(&self) -> &SublocationId {
        &self.current_sublocation_id
    }

    pub fn active_states(&self) -> &BTreeMap<CategoryId, StateId> {
        &self.active_states
    }

    pub fn sublocation_active_states(&self) -> &BTreeMap<(SublocationId, CategoryId), StateId> {
        &self.sublocation_active_states
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    pub fn turn_count_this_visit(&self) -> u32 {
        self.turn_count_this_visit
    }

    pub fn lifetime_turn_count(&self) -> u64 {
        self.lifetime_turn_count
    }

    pub fn action_history(&self) -> &[ActionResult] {
        &self.action_history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    /// The full set of fully-qualified state references currently active at
    /// `current_sublocation_id`: every location-scoped active state, plus
    /// whatever sublocation-scoped states are active for that sublocation.
    pub fn active_state_refs(&self) -> BTreeSet<StateRef> {
        let mut refs: BTreeSet<StateRef> = self
            .active_states
            .iter()
            .map(|(category, state)| StateRef::new(category.clone(), state.clone()))
            .collect();

        for ((sublocation, category), state) in &self.sublocation_active_states {
            if *sublocation == self.current_sublocation_id {
                refs.insert(StateRef::new(category.clone(), state.clone()));
            }
        }

        refs
    }

    /// Apply an `ActionResult` against `blueprint`, producing a new instance
    /// state. Every composable effect is checked against the blueprint's
    /// access gates before anything is applied; on any violation the whole
    /// transition is rejected without partial mutation (§4.C7).
    pub fn apply(&self, result: &ActionResult, blueprint: &Blueprint, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut next = self.clone();

        if let Some(target) = &result.consequences().sublocation_change {
            let target_sub = blueprint
                .get_sublocation(target)
                .ok_or_else(|| DomainError::invalid_state_transition(format!("unknown sublocation '{target}'")))?;

            if !target_sub.is_accessible(&next.active_state_refs()) {
                return Err(DomainError::invalid_state_transition(format!(
                    "sublocation '{target}' is not accessible from the current state"
                )));
            }

            next.current_sublocation_id = target.clone();
        }

        if let Some(change) = &result.consequences().state_change {
            let category = blueprint
                .get_category(&change.category)
                .ok_or_else(|| DomainError::invalid_state_transition(format!("unknown category '{}'", change.category)))?;

            let new_state = category.get_state(&change.new_state).ok_or_else(|| {
                DomainError::invalid_state_transition(format!(
                    "state '{}' is not a member of category '{}'",
                    change.new_state, change.category
                ))
            })?;

            let mut post_active = next.active_state_refs();
            post_active.insert(StateRef::new(change.category.clone(), change.new_state.clone()));

            if !new_state.is_accessible(&post_active) {
                return Err(DomainError::invalid_state_transition(format!(
                    "state '{}' is not reachable given its required/forbidden sets",
                    change.new_state
                )));
            }

            match category.scope() {
                CategoryScope::Location => {
                    next.active_states.insert(change.category.clone(), change.new_state.clone());
                }
                CategoryScope::Sublocation => {
                    next.sublocation_active_states.insert(
                        (next.current_sublocation_id.clone(), change.category.clone()),
                        change.new_state.clone(),
                    );
                }
            }
        }

        next.action_history.push(result.clone());
        next.turn_count_this_visit += 1;
        next.lifetime_turn_count += 1;
        next.last_accessed_at = now;

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{Blueprint, LocationState, StateCategory, Sublocation};
    use chrono::TimeZone;
    use std::collections::BTreeSet as Set;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn blueprint() -> Blueprint {
        let entry = Sublocation::new("forest_edge", "Forest Edge", "Where the trees begin.")
            .with_direct_connections([SublocationId::from("path_fork")]);
        let fork = Sublocation::new("path_fork", "Path Fork", "The trail splits.")
            .with_parent("forest_edge");

        let wildlife = StateCategory::new(
            "wildlife_state",
            "Wildlife State",
            [
                LocationState::new("calm", "Calm", "The woods are quiet."),
                LocationState::new("alert", "Alert", "Something rustles nearby."),
            ],
            "calm",
            CategoryScope::Location,
        )
        .unwrap();

        Blueprint::new("forest_1732012345", "forest")
            .with_sublocations([entry, fork])
            .with_connections([(
                SublocationId::from("forest_edge"),
                Set::from([SublocationId::from("path_fork")]),
            )])
            .with_state_categories([wildlife])
    }

    #[test]
    fn first_visit_seeds_defaults_and_counters() {
        let bp = blueprint();
        let state = LocationInstanceState::first_visit(&bp, SublocationId::from("forest_edge"), fixed_time());
        assert_eq!(state.visit_count(), 1);
        assert_eq!(state.turn_count_this_visit(), 0);
        assert_eq!(
            state.active_states().get(&CategoryId::from("wildlife_state")).unwrap().as_str(),
            "calm"
        );
    }

    #[test]
    fn successful_move_updates_sublocation_and_turn_count() {
        let bp = blueprint();
        let state = LocationInstanceState::first_visit(&bp, SublocationId::from("forest_edge"), fixed_time());

        let result = ActionResult::new(true, "You follow the path deeper into the woods.")
            .with_consequences(crate::action::ConsequencePayload::none().with_sublocation_change("path_fork"));

        let next = state.apply(&result, &bp, fixed_time()).unwrap();
        assert_eq!(next.current_sublocation_id().as_str(), "path_fork");
        assert_eq!(next.turn_count_this_visit(), 1);
        assert_eq!(next.active_states(), state.active_states());
    }

    #[test]
    fn failure_changes_wildlife_state() {
        let bp = blueprint();
        let state = LocationInstanceState::first_visit(&bp, SublocationId::from("forest_edge"), fixed_time());

        let result = ActionResult::new(false, "A branch snaps loudly under your foot.").with_consequences(
            crate::action::ConsequencePayload::none().with_state_change("wildlife_state", "alert"),
        );

        let next = state.apply(&result, &bp, fixed_time()).unwrap();
        assert_eq!(
            next.active_states().get(&CategoryId::from("wildlife_state")).unwrap().as_str(),
            "alert"
        );
        assert_eq!(next.turn_count_this_visit(), 2 - 1);
    }

    #[test]
    fn rejects_transition_into_inaccessible_sublocation() {
        let gated = Sublocation::new("cave", "Cave", "Dark.")
            .with_forbidden_states([StateRef::new("wildlife_state", "alert")]);
        let bp = blueprint().with_sublocations(vec![
            Sublocation::new("forest_edge", "Forest Edge", "Entry."),
            gated,
        ]);

        let mut state = LocationInstanceState::first_visit(&bp, SublocationId::from("forest_edge"), fixed_time());
        state = state
            .apply(
                &ActionResult::new(false, "Something rustles nearby, alarmingly close.")
                    .with_consequences(crate::action::ConsequencePayload::none().with_state_change("wildlife_state", "alert")),
                &bp,
                fixed_time(),
            )
            .unwrap();

        let blocked = state.apply(
            &ActionResult::new(true, "You duck into the cave entrance.")
                .with_consequences(crate::action::ConsequencePayload::none().with_sublocation_change("cave")),
            &bp,
            fixed_time(),
        );
        assert!(blocked.is_err());
    }

    #[test]
    fn re_entry_preserves_active_states_and_bumps_visit_count() {
        let bp = blueprint();
        let first = LocationInstanceState::first_visit(&bp, SublocationId::from("forest_edge"), fixed_time());
        let visited = first
            .apply(
                &ActionResult::new(false, "A branch snaps loudly under your foot.").with_consequences(
                    crate::action::ConsequencePayload::none().with_state_change("wildlife_state", "alert"),
                ),
                &bp,
                fixed_time(),
            )
            .unwrap();

        let reentered = visited.re_enter(SublocationId::from("forest_edge"), fixed_time());
        assert_eq!(reentered.visit_count(), 2);
        assert_eq!(reentered.turn_count_this_visit(), 0);
        assert_eq!(reentered.active_states(), visited.active_states());
    }
}
