//! Grammar: lowers an `ActionConstraint` to a JSON Schema production set,
//! the `parameters` field of the `ToolDefinition` handed to
//! `LlmPort::generate_with_tools` (§4.C5), grounded in the predecessor's
//! `tool_builder.rs` (`json!(...)`-built `ToolDefinition.parameters`).

use serde_json::{json, Value};

use crate::constraint::{ActionConstraint, SublocationChangeOption, FAILURE_KINDS};

fn failure_kind_literals() -> Vec<Value> {
    FAILURE_KINDS
        .iter()
        .map(|k| json!(serde_json::to_value(k).unwrap().as_str().unwrap().to_string()))
        .collect()
}

/// A choice field lowers to a string enum; an absent-entirely field is never
/// produced (the caller must omit the key), an optional-but-present field
/// lowers to `["null", <variant>]` via a oneOf (§4.C5).
fn optional_string_choice(choices: impl IntoIterator<Item = impl AsRef<str>>) -> Value {
    let choices: Vec<String> = choices.into_iter().map(|c| c.as_ref().to_string()).collect();
    json!({
        "oneOf": [
            { "type": "null" },
            { "type": "string", "enum": choices },
        ]
    })
}

/// The literal-`"none"` production forced when there is no accessible
/// sublocation to move to (§4.C4): unlike the gain fields, this key is never
/// simply absent.
fn none_literal() -> Value {
    json!({ "type": "string", "enum": ["none"] })
}

/// Emit the JSON Schema object for one `ActionConstraint` (§4.C5 "Grammar").
pub fn to_json_schema(constraint: &ActionConstraint) -> Value {
    let sc = &constraint.success_consequences;

    let mut success_properties = serde_json::Map::new();

    if let Some(state_change) = &sc.state_change {
        success_properties.insert(
            "state_change".to_string(),
            json!({
                "oneOf": [
                    { "type": "null" },
                    {
                        "type": "object",
                        "properties": {
                            "category": { "const": state_change.category.as_str() },
                            "new_state": {
                                "type": "string",
                                "enum": state_change.candidate_states.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                            },
                        },
                        "required": ["category", "new_state"],
                        "additionalProperties": false,
                    },
                ]
            }),
        );
    }

    let mut success_required = Vec::new();
    match &sc.sublocation_change {
        SublocationChangeOption::None => {
            success_properties.insert("sublocation_change".to_string(), none_literal());
            success_required.push(json!("sublocation_change"));
        }
        SublocationChangeOption::Candidates(options) => {
            success_properties.insert("sublocation_change".to_string(), optional_string_choice(options));
        }
    }
    if let Some(options) = &sc.gained_item {
        success_properties.insert("gained_item".to_string(), optional_string_choice(options));
    }
    if let Some(options) = &sc.gained_companion {
        success_properties.insert("gained_companion".to_string(), optional_string_choice(options));
    }
    if let Some(options) = &sc.gained_quest {
        success_properties.insert("gained_quest".to_string(), optional_string_choice(options));
    }
    if let Some(options) = &sc.gained_npc {
        success_properties.insert("gained_npc".to_string(), optional_string_choice(options));
    }

    let mut success_consequences_schema = json!({
        "type": "object",
        "properties": Value::Object(success_properties),
        "additionalProperties": false,
    });
    if !success_required.is_empty() {
        success_consequences_schema["required"] = Value::Array(success_required);
    }

    json!({
        "type": "object",
        "properties": {
            "action_text": {
                "type": "string",
                "minLength": constraint.action_text_min_len,
                "maxLength": constraint.action_text_max_len,
            },
            "success_consequences": success_consequences_schema,
            "failure_consequences": {
                "type": "object",
                "properties": {
                    "kind": { "type": "string", "enum": failure_kind_literals() },
                    "description": {
                        "type": "string",
                        "maxLength": constraint.failure_consequences.description_max_len,
                    },
                },
                "required": ["kind", "description"],
                "additionalProperties": false,
            },
            "related_skill": {
                "type": "string",
                "enum": constraint.related_skill_choices,
            },
            "difficulty": {
                "type": "integer",
                "minimum": constraint.difficulty_min,
                "maximum": constraint.difficulty_max,
            },
        },
        "required": ["action_text", "success_consequences", "failure_consequences", "related_skill", "difficulty"],
        "additionalProperties": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{FailureConstraint, SuccessConstraint};
    use wrldbldr_domain::SublocationId;

    fn sample_constraint() -> ActionConstraint {
        ActionConstraint {
            action_text_min_len: 10,
            action_text_max_len: 100,
            success_consequences: SuccessConstraint {
                state_change: None,
                sublocation_change: SublocationChangeOption::Candidates(vec![SublocationId::from("path_fork")]),
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

    #[test]
    fn emits_required_top_level_fields() {
        let schema = to_json_schema(&sample_constraint());
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "action_text"));
        assert!(required.iter().any(|v| v == "difficulty"));
    }

    #[test]
    fn omits_state_change_property_when_absent_from_constraint() {
        let schema = to_json_schema(&sample_constraint());
        assert!(schema["properties"]["success_consequences"]["properties"]
            .get("state_change")
            .is_none());
    }

    #[test]
    fn includes_sublocation_change_when_present() {
        let schema = to_json_schema(&sample_constraint());
        assert!(schema["properties"]["success_consequences"]["properties"]
            .get("sublocation_change")
            .is_some());
    }

    #[test]
    fn sublocation_change_forces_the_none_literal_and_marks_it_required() {
        let mut constraint = sample_constraint();
        constraint.success_consequences.sublocation_change = SublocationChangeOption::None;
        let schema = to_json_schema(&constraint);
        let sc_schema = &schema["properties"]["success_consequences"];
        assert_eq!(sc_schema["properties"]["sublocation_change"]["enum"], json!(["none"]));
        let required = sc_schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "sublocation_change"));
    }
}
