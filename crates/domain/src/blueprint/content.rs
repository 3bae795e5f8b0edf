//! `LocationContent`: opaque offerable identifiers keyed by sublocation and
//! state signature. The core never interprets these strings — it only
//! offers them as constraint alternatives (§3).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationContent {
    available_items: BTreeSet<String>,
    available_companions: BTreeSet<String>,
    available_quests: BTreeSet<String>,
    available_npcs: BTreeSet<String>,
    available_actions: BTreeSet<String>,
}

impl LocationContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available_items = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_companions(mut self, companions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available_companions = companions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_quests(mut self, quests: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available_quests = quests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_npcs(mut self, npcs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available_npcs = npcs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.available_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn available_items(&self) -> &BTreeSet<String> {
        &self.available_items
    }

    pub fn available_companions(&self) -> &BTreeSet<String> {
        &self.available_companions
    }

    pub fn available_quests(&self) -> &BTreeSet<String> {
        &self.available_quests
    }

    pub fn available_npcs(&self) -> &BTreeSet<String> {
        &self.available_npcs
    }

    pub fn available_actions(&self) -> &BTreeSet<String> {
        &self.available_actions
    }

    pub fn is_empty(&self) -> bool {
        self.available_items.is_empty()
            && self.available_companions.is_empty()
            && self.available_quests.is_empty()
            && self.available_npcs.is_empty()
            && self.available_actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        assert!(LocationContent::new().is_empty());
    }

    #[test]
    fn builder_populates_sets() {
        let content = LocationContent::new().with_items(["flint", "berries"]);
        assert!(!content.is_empty());
        assert!(content.available_items().contains("flint"));
    }
}
