//! `Sublocation`: a named interior place with access gates, a DAG-forming
//! parent pointer, and local default states for sublocation-scoped
//! categories (§3).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::blueprint::state_ref::StateRef;
use crate::ids::{CategoryId, StateId, SublocationId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sublocation {
    sublocation_id: SublocationId,
    name: String,
    description: String,
    parent_sublocation_id: Option<SublocationId>,
    direct_connections: BTreeSet<SublocationId>,
    required_states: BTreeSet<StateRef>,
    forbidden_states: BTreeSet<StateRef>,
    local_states: BTreeMap<CategoryId, StateId>,
}

impl Sublocation {
    pub fn new(sublocation_id: impl Into<SublocationId>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            sublocation_id: sublocation_id.into(),
            name: name.into(),
            description: description.into(),
            parent_sublocation_id: None,
            direct_connections: BTreeSet::new(),
            required_states: BTreeSet::new(),
            forbidden_states: BTreeSet::new(),
            local_states: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<SublocationId>) -> Self {
        self.parent_sublocation_id = Some(parent.into());
        self
    }

    pub fn with_direct_connections(mut self, connections: impl IntoIterator<Item = SublocationId>) -> Self {
        self.direct_connections = connections.into_iter().collect();
        self
    }

    pub fn with_required_states(mut self, states: impl IntoIterator<Item = StateRef>) -> Self {
        self.required_states = states.into_iter().collect();
        self
    }

    pub fn with_forbidden_states(mut self, states: impl IntoIterator<Item = StateRef>) -> Self {
        self.forbidden_states = states.into_iter().collect();
        self
    }

    pub fn with_local_states(mut self, states: impl IntoIterator<Item = (CategoryId, StateId)>) -> Self {
        self.local_states = states.into_iter().collect();
        self
    }

    pub fn sublocation_id(&self) -> &SublocationId {
        &self.sublocation_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parent_sublocation_id(&self) -> Option<&SublocationId> {
        self.parent_sublocation_id.as_ref()
    }

    pub fn direct_connections(&self) -> &BTreeSet<SublocationId> {
        &self.direct_connections
    }

    pub fn required_states(&self) -> &BTreeSet<StateRef> {
        &self.required_states
    }

    pub fn forbidden_states(&self) -> &BTreeSet<StateRef> {
        &self.forbidden_states
    }

    pub fn local_states(&self) -> &BTreeMap<CategoryId, StateId> {
        &self.local_states
    }

    /// Whether this sublocation is an entry point (`parent == none`, §3 inv. 4).
    pub fn is_entry(&self) -> bool {
        self.parent_sublocation_id.is_none()
    }

    /// Whether `active` satisfies this sublocation's access gates.
    pub fn is_accessible(&self, active: &BTreeSet<StateRef>) -> bool {
        self.required_states.iter().all(|r| active.contains(r))
            && self.forbidden_states.iter().all(|r| !active.contains(r))
    }

    /// Categories this sublocation can influence: any sublocation-scoped
    /// category it declares a local default for (§4.C4's
    /// "can influence category" predicate; location-scoped categories are
    /// always influenceable and are added by the caller).
    pub fn declared_categories(&self) -> impl Iterator<Item = &CategoryId> {
        self.local_states.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_sublocation_has_no_parent() {
        let entry = Sublocation::new("forest_edge", "Forest Edge", "Where the trees begin.");
        assert!(entry.is_entry());
    }

    #[test]
    fn non_entry_has_parent() {
        let leaf = Sublocation::new("berry_patch", "Berry Patch", "Brambles heavy with fruit.")
            .with_parent("forest_edge");
        assert!(!leaf.is_entry());
        assert_eq!(leaf.parent_sublocation_id().unwrap().as_str(), "forest_edge");
    }

    #[test]
    fn access_gates_respect_forbidden_states() {
        let cave = Sublocation::new("entrance_chamber", "Entrance Chamber", "Dark and damp.")
            .with_forbidden_states([StateRef::new("time_of_day", "night")]);

        let mut active = BTreeSet::new();
        assert!(cave.is_accessible(&active));

        active.insert(StateRef::new("time_of_day", "night"));
        assert!(!cave.is_accessible(&active));
    }
}
