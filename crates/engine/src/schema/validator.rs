//! Validator: a pure `(json_bytes, constraint) -> Ok(parsed) | Err(violations)`
//! check that rejects any deviation the grammar would have prevented (§4.C5),
//! grounded in the predecessor's `tool_extractor.rs` (extracting/validating
//! tool-call arguments against expectations).

use serde::{Deserialize, Serialize};

use crate::constraint::{ActionConstraint, FailureKind, SublocationChangeOption};
use wrldbldr_domain::{CategoryId, StateId, SublocationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChangeResponse {
    pub category: CategoryId,
    pub new_state: StateId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessConsequencesResponse {
    pub state_change: Option<StateChangeResponse>,
    pub sublocation_change: Option<SublocationId>,
    pub gained_item: Option<String>,
    pub gained_companion: Option<String>,
    pub gained_quest: Option<String>,
    pub gained_npc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureConsequencesResponse {
    pub kind: FailureKind,
    pub description: String,
}

/// The LM's raw tool-call payload for one candidate action, prior to
/// conversion into `wrldbldr_domain::ActionChoice` (§4.C5, §4.C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionChoiceResponse {
    pub action_text: String,
    pub success_consequences: SuccessConsequencesResponse,
    pub failure_consequences: FailureConsequencesResponse,
    pub related_skill: String,
    pub difficulty: u8,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("response was not valid JSON: {0}")]
    InvalidJson(String),
    #[error("action_text length {0} is outside [{1}, {2}]")]
    ActionTextLength(usize, usize, usize),
    #[error("difficulty {0} is outside [{1}, {2}]")]
    DifficultyOutOfRange(u8, u8, u8),
    #[error("related_skill '{0}' is not one of the offered choices")]
    UnknownSkill(String),
    #[error("state_change category '{0}' was not offered by the constraint")]
    UnofferedStateChangeCategory(String),
    #[error("state_change new_state '{0}' was not among the offered candidates")]
    UnofferedStateChangeValue(String),
    #[error("state_change present but the constraint offers no state change")]
    UnexpectedStateChange,
    #[error("sublocation_change '{0}' was not among the offered candidates")]
    UnofferedSublocationChange(String),
    #[error("failure_consequences.description exceeds {0} characters")]
    FailureDescriptionTooLong(usize),
}

/// Re-check a raw JSON payload against `constraint` (§4.C5 "Validator").
pub fn validate_json(constraint: &ActionConstraint, json_bytes: &[u8]) -> Result<ActionChoiceResponse, Vec<SchemaViolation>> {
    let mut parsed: ActionChoiceResponse = match serde_json::from_slice(json_bytes) {
        Ok(value) => value,
        Err(e) => return Err(vec![SchemaViolation::InvalidJson(e.to_string())]),
    };

    let mut violations = Vec::new();

    let len = parsed.action_text.len();
    if !(constraint.action_text_min_len..=constraint.action_text_max_len).contains(&len) {
        violations.push(SchemaViolation::ActionTextLength(len, constraint.action_text_min_len, constraint.action_text_max_len));
    }

    if !(constraint.difficulty_min..=constraint.difficulty_max).contains(&parsed.difficulty) {
        violations.push(SchemaViolation::DifficultyOutOfRange(
            parsed.difficulty,
            constraint.difficulty_min,
            constraint.difficulty_max,
        ));
    }

    if !constraint.related_skill_choices.iter().any(|s| s == &parsed.related_skill) {
        violations.push(SchemaViolation::UnknownSkill(parsed.related_skill.clone()));
    }

    if parsed.failure_consequences.description.len() > constraint.failure_consequences.description_max_len {
        violations.push(SchemaViolation::FailureDescriptionTooLong(constraint.failure_consequences.description_max_len));
    }

    match (&parsed.success_consequences.state_change, &constraint.success_consequences.state_change) {
        (Some(response), Some(offered)) => {
            if response.category != offered.category {
                violations.push(SchemaViolation::UnofferedStateChangeCategory(response.category.to_string()));
            } else if !offered.candidate_states.contains(&response.new_state) {
                violations.push(SchemaViolation::UnofferedStateChangeValue(response.new_state.to_string()));
            }
        }
        (Some(_), None) => violations.push(SchemaViolation::UnexpectedStateChange),
        (None, _) => {}
    }

    match (&parsed.success_consequences.sublocation_change, &constraint.success_consequences.sublocation_change) {
        (Some(response), SublocationChangeOption::Candidates(offered)) => {
            if !offered.contains(response) {
                violations.push(SchemaViolation::UnofferedSublocationChange(response.to_string()));
            }
        }
        (Some(response), SublocationChangeOption::None) => {
            if response.as_str() != "none" {
                violations.push(SchemaViolation::UnofferedSublocationChange(response.to_string()));
            }
        }
        (None, _) => {}
    }

    if violations.is_empty() {
        // The forced literal "none" is a schema acknowledgement, not a real
        // target; scrub it back to an absent sublocation_change so downstream
        // consequence handling never treats it as one (§4.C4, §4.C6).
        if parsed.success_consequences.sublocation_change.as_ref().map(|id| id.as_str()) == Some("none") {
            parsed.success_consequences.sublocation_change = None;
        }
        Ok(parsed)
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{FailureConstraint, StateChangeOption, SuccessConstraint, FAILURE_KINDS};

    fn constraint_with_state_change() -> ActionConstraint {
        ActionConstraint {
            action_text_min_len: 10,
            action_text_max_len: 100,
            success_consequences: SuccessConstraint {
                state_change: Some(StateChangeOption {
                    category: CategoryId::from("wildlife_state"),
                    candidate_states: vec![StateId::from("alert")],
                }),
                sublocation_change: SublocationChangeOption::None,
                gained_item: None,
                gained_companion: None,
                gained_quest: None,
                gained_npc: None,
            },
            failure_consequences: FailureConstraint { kind_choices: FAILURE_KINDS.to_vec(), description_max_len: 200 },
            related_skill_choices: vec!["stealth".to_string()],
            difficulty_min: 1,
            difficulty_max: 5,
        }
    }

    fn valid_payload() -> serde_json::Value {
        serde_json::json!({
            "action_text": "Creep quietly toward the treeline",
            "success_consequences": { "state_change": { "category": "wildlife_state", "new_state": "alert" } },
            "failure_consequences": { "kind": "startled_wildlife", "description": "A twig snaps underfoot." },
            "related_skill": "stealth",
            "difficulty": 2,
        })
    }

    #[test]
    fn accepts_a_payload_within_bounds() {
        let constraint = constraint_with_state_change();
        let bytes = serde_json::to_vec(&valid_payload()).unwrap();
        assert!(validate_json(&constraint, &bytes).is_ok());
    }

    #[test]
    fn rejects_a_state_change_category_not_offered() {
        let constraint = constraint_with_state_change();
        let mut payload = valid_payload();
        payload["success_consequences"]["state_change"]["category"] = serde_json::json!("weather");
        let bytes = serde_json::to_vec(&payload).unwrap();
        let errors = validate_json(&constraint, &bytes).unwrap_err();
        assert!(errors.contains(&SchemaViolation::UnofferedStateChangeCategory("weather".to_string())));
    }

    #[test]
    fn rejects_an_unknown_skill() {
        let constraint = constraint_with_state_change();
        let mut payload = valid_payload();
        payload["related_skill"] = serde_json::json!("alchemy");
        let bytes = serde_json::to_vec(&payload).unwrap();
        let errors = validate_json(&constraint, &bytes).unwrap_err();
        assert!(errors.contains(&SchemaViolation::UnknownSkill("alchemy".to_string())));
    }

    #[test]
    fn rejects_malformed_json() {
        let constraint = constraint_with_state_change();
        let errors = validate_json(&constraint, b"not json").unwrap_err();
        assert!(matches!(errors[0], SchemaViolation::InvalidJson(_)));
    }

    #[test]
    fn accepts_the_none_literal_and_scrubs_it_to_absent() {
        let constraint = constraint_with_state_change();
        let mut payload = valid_payload();
        payload["success_consequences"]["sublocation_change"] = serde_json::json!("none");
        let bytes = serde_json::to_vec(&payload).unwrap();
        let parsed = validate_json(&constraint, &bytes).unwrap();
        assert!(parsed.success_consequences.sublocation_change.is_none());
    }

    #[test]
    fn rejects_a_real_sublocation_id_when_the_constraint_demands_the_none_literal() {
        let constraint = constraint_with_state_change();
        let mut payload = valid_payload();
        payload["success_consequences"]["sublocation_change"] = serde_json::json!("path_fork");
        let bytes = serde_json::to_vec(&payload).unwrap();
        let errors = validate_json(&constraint, &bytes).unwrap_err();
        assert!(errors.contains(&SchemaViolation::UnofferedSublocationChange("path_fork".to_string())));
    }
}
