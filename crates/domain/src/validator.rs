//! C3 Blueprint Validator.
//!
//! Pure structural checks over a generated `Blueprint` (§3 invariants 1-4).
//! No I/O; a generator calls this immediately after assembly and a failure
//! is treated as a generator bug (§4.C3) rather than recovered from here.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use crate::blueprint::{Blueprint, StateRef};
use crate::ids::{CategoryId, StateId, SublocationId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("parent cycle detected starting at sublocation '{0}'")]
    ParentCycle(String),

    #[error("sublocation '{referencing}' has unresolved parent '{missing}'")]
    UnresolvedParent { referencing: String, missing: String },

    #[error("connection from '{from}' references unknown sublocation '{to}'")]
    UnresolvedConnection { from: String, to: String },

    #[error("state reference '{state_ref}' on sublocation '{sublocation}' does not resolve")]
    UnresolvedStateRef { sublocation: String, state_ref: String },

    #[error("category '{category}' default_state_id '{state}' is not a member of possible_states")]
    UnresolvedDefaultState { category: String, state: String },

    #[error("content_map key references unknown sublocation '{0}'")]
    UnresolvedContentSublocation(String),

    #[error("content_map signature for sublocation '{sublocation}' references unknown state '{category}.{state}'")]
    UnresolvedContentSignatureState { sublocation: String, category: String, state: String },

    #[error("sublocation '{sublocation}' local_states maps '{category}' to unknown state '{state}'")]
    UnresolvedLocalState { sublocation: String, category: String, state: String },

    #[error("no designated entry sublocation; the blueprint has no connected component reachable from a parentless sublocation")]
    NoReachableEntry,
}

/// Run all structural invariants over `blueprint`, returning every violation
/// found (not just the first) so generator authors get a full diagnostic.
pub fn validate(blueprint: &Blueprint) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = Vec::new();

    violations.extend(check_parent_chain(blueprint));
    violations.extend(check_references_resolve(blueprint));
    violations.extend(check_default_states_resolve(blueprint));
    violations.extend(check_connectivity(blueprint));

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Invariant 1: parent pointers resolve and form no cycles.
fn check_parent_chain(blueprint: &Blueprint) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for sub in blueprint.sublocations().values() {
        let mut seen: HashSet<SublocationId> = HashSet::new();
        seen.insert(sub.sublocation_id().clone());
        let mut current = sub.parent_sublocation_id().cloned();

        while let Some(parent_id) = current {
            let Some(parent) = blueprint.get_sublocation(&parent_id) else {
                violations.push(InvariantViolation::UnresolvedParent {
                    referencing: sub.sublocation_id().to_string(),
                    missing: parent_id.to_string(),
                });
                break;
            };

            if !seen.insert(parent_id.clone()) {
                violations.push(InvariantViolation::ParentCycle(sub.sublocation_id().to_string()));
                break;
            }

            current = parent.parent_sublocation_id().cloned();
        }
    }

    violations
}

/// Invariant 2: every id referenced in `connections`, `required_states`,
/// `forbidden_states`, `content_map` (both the sublocation key and the
/// signature's category/state pairs), and sublocation `local_states`
/// resolves within the blueprint.
fn check_references_resolve(blueprint: &Blueprint) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (from, targets) in blueprint.connections() {
        for to in targets {
            if blueprint.get_sublocation(to).is_none() {
                violations.push(InvariantViolation::UnresolvedConnection {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
    }

    for sub in blueprint.sublocations().values() {
        for state_ref in sub.required_states().iter().chain(sub.forbidden_states()) {
            if !state_ref_resolves(blueprint, state_ref) {
                violations.push(InvariantViolation::UnresolvedStateRef {
                    sublocation: sub.sublocation_id().to_string(),
                    state_ref: state_ref.to_string(),
                });
            }
        }
    }

    for category in blueprint.state_categories().values() {
        for state in category.possible_states().values() {
            for state_ref in state.required_states().iter().chain(state.forbidden_states()) {
                if !state_ref_resolves(blueprint, state_ref) {
                    violations.push(InvariantViolation::UnresolvedStateRef {
                        sublocation: format!("{}.{}", category.category_id(), state.state_id()),
                        state_ref: state_ref.to_string(),
                    });
                }
            }
        }
    }

    for (sublocation, signature) in blueprint.content_map().keys() {
        if blueprint.get_sublocation(sublocation).is_none() {
            violations.push(InvariantViolation::UnresolvedContentSublocation(
                sublocation.to_string(),
            ));
        }
        for (category_id, state_id) in signature.pairs() {
            if !category_state_resolves(blueprint, category_id, state_id) {
                violations.push(InvariantViolation::UnresolvedContentSignatureState {
                    sublocation: sublocation.to_string(),
                    category: category_id.to_string(),
                    state: state_id.to_string(),
                });
            }
        }
    }

    for sub in blueprint.sublocations().values() {
        for (category_id, state_id) in sub.local_states() {
            if !category_state_resolves(blueprint, category_id, state_id) {
                violations.push(InvariantViolation::UnresolvedLocalState {
                    sublocation: sub.sublocation_id().to_string(),
                    category: category_id.to_string(),
                    state: state_id.to_string(),
                });
            }
        }
    }

    violations
}

fn state_ref_resolves(blueprint: &Blueprint, state_ref: &StateRef) -> bool {
    category_state_resolves(blueprint, state_ref.category_id(), state_ref.state_id())
}

fn category_state_resolves(blueprint: &Blueprint, category_id: &CategoryId, state_id: &StateId) -> bool {
    blueprint
        .get_category(category_id)
        .map(|category| category.get_state(state_id).is_some())
        .unwrap_or(false)
}

/// Invariant 3: each category's `default_state_id` is a member of its own
/// `possible_states` (trivially reachable when no other state is active).
fn check_default_states_resolve(blueprint: &Blueprint) -> Vec<InvariantViolation> {
    blueprint
        .state_categories()
        .values()
        .filter(|category| category.get_state(category.default_state_id()).is_none())
        .map(|category| InvariantViolation::UnresolvedDefaultState {
            category: category.category_id().to_string(),
            state: category.default_state_id().to_string(),
        })
        .collect()
}

/// Invariant 4: the sublocation graph is connected from at least one entry.
fn check_connectivity(blueprint: &Blueprint) -> Vec<InvariantViolation> {
    if blueprint.sublocations().is_empty() {
        return Vec::new();
    }

    let entries = blueprint.entry_sublocations();
    if entries.is_empty() {
        return vec![InvariantViolation::NoReachableEntry];
    }

    let mut reachable: HashSet<SublocationId> = HashSet::new();
    let mut stack: Vec<SublocationId> = entries.into_iter().cloned().collect();

    while let Some(current) = stack.pop() {
        if !reachable.insert(current.clone()) {
            continue;
        }
        for neighbour in blueprint.connected_to(&current) {
            if !reachable.contains(&neighbour) {
                stack.push(neighbour);
            }
        }
        // Children (sublocations whose parent is `current`) are reachable too.
        for sub in blueprint.sublocations().values() {
            if sub.parent_sublocation_id() == Some(&current) && !reachable.contains(sub.sublocation_id()) {
                stack.push(sub.sublocation_id().clone());
            }
        }
    }

    let all_ids: BTreeSet<&SublocationId> = blueprint.sublocations().keys().collect();
    if all_ids.iter().all(|id| reachable.contains(*id)) {
        Vec::new()
    } else {
        vec![InvariantViolation::NoReachableEntry]
    }
}
