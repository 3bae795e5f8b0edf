//! C1 Blueprint Model: data definitions for categorised states, hierarchical
//! sublocations, connections, and the content map.

pub mod content;
pub mod location_state;
pub mod state_category;
pub mod state_ref;
pub mod state_signature;
pub mod sublocation;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use content::LocationContent;
pub use location_state::LocationState;
pub use state_category::{CategoryScope, StateCategory};
pub use state_ref::StateRef;
pub use state_signature::StateSignature;
pub use sublocation::Sublocation;

use crate::ids::{CategoryId, LocationId, SublocationId};

/// Immutable record describing a location's interior topology (§3).
///
/// Blueprints are produced once per first visit to a vertex (C2) and then
/// cached by the turn controller; they are never persisted (§6) — only
/// regenerated from `location_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    location_id: LocationId,
    location_type: String,
    state_categories: BTreeMap<CategoryId, StateCategory>,
    sublocations: BTreeMap<SublocationId, Sublocation>,
    connections: BTreeMap<SublocationId, BTreeSet<SublocationId>>,
    content_map: BTreeMap<(SublocationId, StateSignature), LocationContent>,
}

impl Blueprint {
    pub fn new(location_id: impl Into<LocationId>, location_type: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            location_type: location_type.into(),
            state_categories: BTreeMap::new(),
            sublocations: BTreeMap::new(),
            connections: BTreeMap::new(),
            content_map: BTreeMap::new(),
        }
    }

    pub fn with_state_categories(mut self, categories: impl IntoIterator<Item = StateCategory>) -> Self {
        self.state_categories = categories
            .into_iter()
            .map(|c| (c.category_id().clone(), c))
            .collect();
        self
    }

    pub fn with_sublocations(mut self, sublocations: impl IntoIterator<Item = Sublocation>) -> Self {
        self.sublocations = sublocations
            .into_iter()
            .map(|s| (s.sublocation_id().clone(), s))
            .collect();
        self
    }

    pub fn with_connections(
        mut self,
        connections: impl IntoIterator<Item = (SublocationId, BTreeSet<SublocationId>)>,
    ) -> Self {
        self.connections = connections.into_iter().collect();
        self
    }

    pub fn with_content_map(
        mut self,
        content_map: impl IntoIterator<Item = ((SublocationId, StateSignature), LocationContent)>,
    ) -> Self {
        self.content_map = content_map.into_iter().collect();
        self
    }

    pub fn location_id(&self) -> &LocationId {
        &self.location_id
    }

    pub fn location_type(&self) -> &str {
        &self.location_type
    }

    pub fn state_categories(&self) -> &BTreeMap<CategoryId, StateCategory> {
        &self.state_categories
    }

    pub fn sublocations(&self) -> &BTreeMap<SublocationId, Sublocation> {
        &self.sublocations
    }

    pub fn connections(&self) -> &BTreeMap<SublocationId, BTreeSet<SublocationId>> {
        &self.connections
    }

    pub fn content_map(&self) -> &BTreeMap<(SublocationId, StateSignature), LocationContent> {
        &self.content_map
    }

    pub fn get_sublocation(&self, id: &SublocationId) -> Option<&Sublocation> {
        self.sublocations.get(id)
    }

    pub fn get_category(&self, id: &CategoryId) -> Option<&StateCategory> {
        self.state_categories.get(id)
    }

    /// Sublocations directly connected to `from` (the adjacency may be
    /// directed — see `connections`' doc in §3).
    pub fn connected_to(&self, from: &SublocationId) -> BTreeSet<SublocationId> {
        self.connections.get(from).cloned().unwrap_or_default()
    }

    /// Look up content for `(sublocation, signature)`, falling back through
    /// successively smaller signatures down to the sublocation-only key, per
    /// §4.C4's "State signature" rule.
    pub fn lookup_content(&self, sublocation: &SublocationId, signature: &StateSignature) -> Option<&LocationContent> {
        for candidate in signature.fallback_chain() {
            if let Some(content) = self.content_map.get(&(sublocation.clone(), candidate)) {
                return Some(content);
            }
        }
        None
    }

    /// Designated entry sublocations (`parent == none`, invariant 4).
    pub fn entry_sublocations(&self) -> Vec<&SublocationId> {
        self.sublocations
            .values()
            .filter(|s| s.is_entry())
            .map(|s| s.sublocation_id())
            .collect()
    }
}
