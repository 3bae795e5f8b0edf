//! Canonical state signatures for content-map lookup (§4.C4).
//!
//! A signature is a canonical, sorted serialisation of an active-state
//! mapping restricted to a chosen set of categories. Lookup against
//! `content_map` falls back to successively smaller signatures (dropping the
//! category with the highest id first) down to the empty, sublocation-only
//! key.

use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, StateId};

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateSignature(Vec<(CategoryId, StateId)>);

impl StateSignature {
    /// Build the full signature from every currently active (category, state)
    /// pair, restricted to `categories` if given, sorted canonically.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (CategoryId, StateId)>) -> Self {
        let mut entries: Vec<(CategoryId, StateId)> = pairs.into_iter().collect();
        entries.sort();
        Self(entries)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(CategoryId, StateId)] {
        &self.0
    }

    /// Successively smaller signatures obtained by dropping one entry at a
    /// time (highest-sorted first), ending at the empty signature. Used for
    /// the content-map fallback lookup described in §4.C4.
    pub fn fallback_chain(&self) -> Vec<StateSignature> {
        let mut chain = Vec::with_capacity(self.0.len() + 1);
        let mut current = self.0.clone();
        chain.push(StateSignature(current.clone()));
        while !current.is_empty() {
            current.pop();
            chain.push(StateSignature(current.clone()));
        }
        chain
    }
}
