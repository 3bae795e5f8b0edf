//! C4 Constraint Builder: given a blueprint and the current instance state,
//! derive the tree-structured `ActionConstraint` the Director is bound to
//! (§4.C4). Grounded in the predecessor's `tool_builder.rs` style: one
//! constructor function per constraint sub-shape, composed by
//! `build_constraint`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use wrldbldr_domain::{
    Blueprint, CategoryId, CategoryScope, LocationInstanceState, StateId, StateRef, StateSignature,
    SublocationId,
};

/// A single candidate `(category, new_state)` pair a successful action may
/// apply, already filtered to states reachable from the active set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChangeOption {
    pub category: CategoryId,
    pub candidate_states: Vec<StateId>,
}

/// The `sublocation_change` sub-constraint is never fully absent: when no
/// candidate is accessible it still presents the fixed literal `"none"`, so
/// the Director is made to acknowledge there is nowhere to move rather than
/// the key silently disappearing the way the gain fields do (§4.C4).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SublocationChangeOption {
    #[default]
    None,
    Candidates(Vec<SublocationId>),
}

/// The `success_consequences` shape of §4.C4: the gain fields are optional
/// and omitted entirely (not merely empty) when the location offers no such
/// effect right now; `sublocation_change` always has a value (see
/// `SublocationChangeOption`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessConstraint {
    pub state_change: Option<StateChangeOption>,
    pub sublocation_change: SublocationChangeOption,
    pub gained_item: Option<Vec<String>>,
    pub gained_companion: Option<Vec<String>>,
    pub gained_quest: Option<Vec<String>>,
    pub gained_npc: Option<Vec<String>>,
}

/// Fixed failure-consequence vocabulary (§4.C4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Lost,
    Injured,
    StartledWildlife,
    MinorInjury,
    Damage,
    Imprisonment,
    Ejection,
    None,
}

pub const FAILURE_KINDS: &[FailureKind] = &[
    FailureKind::Lost,
    FailureKind::Injured,
    FailureKind::StartledWildlife,
    FailureKind::MinorInjury,
    FailureKind::Damage,
    FailureKind::Imprisonment,
    FailureKind::Ejection,
    FailureKind::None,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureConstraint {
    pub kind_choices: Vec<FailureKind>,
    pub description_max_len: usize,
}

/// The fixed top-level shape every candidate action must satisfy (§4.C4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConstraint {
    pub action_text_min_len: usize,
    pub action_text_max_len: usize,
    pub success_consequences: SuccessConstraint,
    pub failure_consequences: FailureConstraint,
    pub related_skill_choices: Vec<String>,
    pub difficulty_min: u8,
    pub difficulty_max: u8,
}

/// Categories a sublocation may "influence" (§4.C4): every Location-scoped
/// category, plus any Sublocation-scoped category the sublocation itself
/// declares a local state for.
fn influenceable_categories(blueprint: &Blueprint, sublocation_id: &SublocationId) -> Vec<CategoryId> {
    let mut categories: Vec<CategoryId> = Vec::new();

    for category in blueprint.state_categories().values() {
        match category.scope() {
            CategoryScope::Location => categories.push(category.category_id().clone()),
            CategoryScope::Sublocation => {
                if let Some(sub) = blueprint.get_sublocation(sublocation_id) {
                    if sub.declared_categories().any(|c| c == category.category_id()) {
                        categories.push(category.category_id().clone());
                    }
                }
            }
        }
    }

    categories
}

/// State changes reachable from the active set for one candidate category,
/// per §4.C4 ("accessible from the currently active one").
fn reachable_states_for_category(
    blueprint: &Blueprint,
    category_id: &CategoryId,
    active: &BTreeSet<StateRef>,
) -> Vec<StateId> {
    let Some(category) = blueprint.get_category(category_id) else {
        return Vec::new();
    };

    category
        .possible_states()
        .values()
        .filter(|state| {
            let mut post = active.clone();
            post.insert(StateRef::new(category_id.clone(), state.state_id().clone()));
            state.is_accessible(&post)
        })
        .map(|state| state.state_id().clone())
        .collect()
}

/// Pick the single state-change candidate category, per §4.C4's "exactly one
/// category may change per action" rule: the first influenceable category
/// (in `CategoryId` order, since `state_categories()` is a `BTreeMap`) that
/// has at least one reachable alternative state.
fn build_state_change_option(
    blueprint: &Blueprint,
    sublocation_id: &SublocationId,
    active: &BTreeSet<StateRef>,
) -> Option<StateChangeOption> {
    for category_id in influenceable_categories(blueprint, sublocation_id) {
        let candidates = reachable_states_for_category(blueprint, &category_id, active);
        if !candidates.is_empty() {
            return Some(StateChangeOption { category: category_id, candidate_states: candidates });
        }
    }
    None
}

/// Sublocation-change candidates: direct connections, children one level
/// down, and the parent one level up, filtered by accessibility (§4.C4).
/// Returns the literal-`"none"` option rather than an absent key when
/// nothing is accessible (§4.C4).
fn build_sublocation_change_option(
    blueprint: &Blueprint,
    sublocation_id: &SublocationId,
    active: &BTreeSet<StateRef>,
) -> SublocationChangeOption {
    let mut candidates: BTreeSet<SublocationId> = BTreeSet::new();

    if let Some(connected) = blueprint.connections().get(sublocation_id) {
        candidates.extend(connected.iter().cloned());
    }

    for sub in blueprint.sublocations().values() {
        if sub.parent_sublocation_id().as_ref() == Some(sublocation_id) {
            candidates.insert(sub.sublocation_id().clone());
        }
    }

    if let Some(current) = blueprint.get_sublocation(sublocation_id) {
        if let Some(parent) = current.parent_sublocation_id() {
            candidates.insert(parent.clone());
        }
    }

    let accessible: Vec<SublocationId> = candidates
        .into_iter()
        .filter(|candidate| {
            blueprint
                .get_sublocation(candidate)
                .map(|sub| sub.is_accessible(active))
                .unwrap_or(false)
        })
        .collect();

    if accessible.is_empty() {
        SublocationChangeOption::None
    } else {
        SublocationChangeOption::Candidates(accessible)
    }
}

fn state_signature_for(blueprint: &Blueprint, sublocation_id: &SublocationId, active: &BTreeSet<StateRef>) -> StateSignature {
    let declared: BTreeSet<&CategoryId> = blueprint
        .get_sublocation(sublocation_id)
        .map(|sub| sub.declared_categories().collect())
        .unwrap_or_default();

    let pairs: Vec<(CategoryId, StateId)> = active
        .iter()
        .filter(|state_ref| declared.contains(state_ref.category_id()))
        .map(|state_ref| (state_ref.category_id().clone(), state_ref.state_id().clone()))
        .collect();

    StateSignature::from_pairs(pairs)
}

/// Build the full `ActionConstraint` for the current instance state (§4.C4).
pub fn build_constraint(
    blueprint: &Blueprint,
    instance: &LocationInstanceState,
    skill_vocabulary: &[String],
) -> ActionConstraint {
    let sublocation_id = instance.current_sublocation_id().clone();
    let active = instance.active_state_refs();

    let state_change = build_state_change_option(blueprint, &sublocation_id, &active);
    let sublocation_change = build_sublocation_change_option(blueprint, &sublocation_id, &active);

    let signature = state_signature_for(blueprint, &sublocation_id, &active);
    let content = blueprint.lookup_content(&sublocation_id, &signature);

    let gained_item = content
        .filter(|c| !c.available_items().is_empty())
        .map(|c| c.available_items().iter().cloned().collect());
    let gained_companion = content
        .filter(|c| !c.available_companions().is_empty())
        .map(|c| c.available_companions().iter().cloned().collect());
    let gained_quest = content
        .filter(|c| !c.available_quests().is_empty())
        .map(|c| c.available_quests().iter().cloned().collect());
    let gained_npc = content
        .filter(|c| !c.available_npcs().is_empty())
        .map(|c| c.available_npcs().iter().cloned().collect());

    ActionConstraint {
        action_text_min_len: 10,
        action_text_max_len: 100,
        success_consequences: SuccessConstraint {
            state_change,
            sublocation_change,
            gained_item,
            gained_companion,
            gained_quest,
            gained_npc,
        },
        failure_consequences: FailureConstraint {
            kind_choices: FAILURE_KINDS.to_vec(),
            description_max_len: 200,
        },
        related_skill_choices: skill_vocabulary.to_vec(),
        difficulty_min: 1,
        difficulty_max: 5,
    }
}
