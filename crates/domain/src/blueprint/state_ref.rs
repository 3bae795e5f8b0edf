//! Fully-qualified state references (`category_id.state_id`).
//!
//! Used by `required_states`/`forbidden_states` on both `LocationState` and
//! `Sublocation` (§3) to express cross-category dependencies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, StateId};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    category_id: CategoryId,
    state_id: StateId,
}

impl StateRef {
    pub fn new(category_id: impl Into<CategoryId>, state_id: impl Into<StateId>) -> Self {
        Self {
            category_id: category_id.into(),
            state_id: state_id.into(),
        }
    }

    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    pub fn state_id(&self) -> &StateId {
        &self.state_id
    }

    /// Parse `"category_id.state_id"`. The category id may not itself contain
    /// a dot; the state id may (it is whatever follows the first dot).
    pub fn parse(raw: &str) -> Option<Self> {
        let (category, state) = raw.split_once('.')?;
        if category.is_empty() || state.is_empty() {
            return None;
        }
        Some(Self::new(category, state))
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category_id, self.state_id)
    }
}
