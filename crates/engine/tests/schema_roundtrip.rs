//! Schema roundtrip property test (§4.C5, §8): every payload the grammar's
//! JSON Schema would accept for a constraint is accepted by the validator,
//! built from real constraints derived across the three reference
//! generators rather than hand-assembled constraint fixtures.

use wrldbldr_domain::LocationId;
use wrldbldr_engine::constraint::{build_constraint, SublocationChangeOption};
use wrldbldr_engine::generators::{forest::ForestGenerator, mountain::MountainGenerator, ruins::RuinsGenerator, LocationGenerator};
use wrldbldr_engine::schema::validate_json;
use wrldbldr_domain::LocationInstanceState;

const SAMPLE_SIZE: usize = 200;

fn all_generators() -> Vec<(&'static str, std::sync::Arc<dyn LocationGenerator>)> {
    vec![
        ("forest", std::sync::Arc::new(ForestGenerator::new()) as std::sync::Arc<dyn LocationGenerator>),
        ("mountain", std::sync::Arc::new(MountainGenerator::new())),
        ("ruins", std::sync::Arc::new(RuinsGenerator::new())),
    ]
}

/// Build a minimal valid payload that a grammar-constrained LM response
/// would produce for `constraint`: pick the first offered choice everywhere
/// a choice is required, and omit every optional key the constraint omits.
fn minimal_valid_payload(constraint: &wrldbldr_engine::constraint::ActionConstraint) -> serde_json::Value {
    let mut success = serde_json::Map::new();
    if let Some(sc) = &constraint.success_consequences.state_change {
        success.insert(
            "state_change".to_string(),
            serde_json::json!({ "category": sc.category.as_str(), "new_state": sc.candidate_states[0].as_str() }),
        );
    }
    match &constraint.success_consequences.sublocation_change {
        SublocationChangeOption::None => {
            success.insert("sublocation_change".to_string(), serde_json::json!("none"));
        }
        SublocationChangeOption::Candidates(options) => {
            success.insert("sublocation_change".to_string(), serde_json::json!(options[0].as_str()));
        }
    }
    if let Some(options) = &constraint.success_consequences.gained_item {
        success.insert("gained_item".to_string(), serde_json::json!(options[0]));
    }
    if let Some(options) = &constraint.success_consequences.gained_companion {
        success.insert("gained_companion".to_string(), serde_json::json!(options[0]));
    }
    if let Some(options) = &constraint.success_consequences.gained_quest {
        success.insert("gained_quest".to_string(), serde_json::json!(options[0]));
    }
    if let Some(options) = &constraint.success_consequences.gained_npc {
        success.insert("gained_npc".to_string(), serde_json::json!(options[0]));
    }

    serde_json::json!({
        "action_text": "x".repeat(constraint.action_text_min_len.max(10)),
        "success_consequences": serde_json::Value::Object(success),
        "failure_consequences": { "kind": "none", "description": "" },
        "related_skill": constraint.related_skill_choices[0],
        "difficulty": constraint.difficulty_min,
    })
}

#[test]
fn every_grammar_minimal_payload_passes_validation_across_many_locations_and_generators() {
    for (name, generator) in all_generators() {
        for i in 0..SAMPLE_SIZE {
            let location_id = LocationId::from(format!("{name}_{i}"));
            let blueprint = generator.generate_blueprint(&location_id).expect("blueprint generation succeeds");
            let entry = blueprint.entry_sublocations().first().cloned().expect("every generated blueprint has an entry sublocation");
            let instance = LocationInstanceState::first_visit(&blueprint, entry, chrono::Utc::now());

            let constraint = build_constraint(&blueprint, &instance, generator.skill_vocabulary());
            let payload = minimal_valid_payload(&constraint);
            let bytes = serde_json::to_vec(&payload).unwrap();

            let result = validate_json(&constraint, &bytes);
            assert!(result.is_ok(), "{name}/{location_id:?}: minimal grammar-shaped payload rejected: {result:?}");
        }
    }
}

#[test]
fn validator_rejects_a_state_change_value_outside_the_offered_candidates() {
    let generator = ForestGenerator::new();
    let location_id = LocationId::from("forest_schema_probe");
    let blueprint = generator.generate_blueprint(&location_id).expect("blueprint generation succeeds");
    let entry = blueprint.entry_sublocations().first().cloned().expect("entry sublocation exists");
    let instance = LocationInstanceState::first_visit(&blueprint, entry, chrono::Utc::now());

    let constraint = build_constraint(&blueprint, &instance, generator.skill_vocabulary());
    let Some(state_change) = &constraint.success_consequences.state_change else {
        // Nothing to corrupt for this particular sublocation; the positive
        // roundtrip test above still covers it across the sample.
        return;
    };

    let mut payload = minimal_valid_payload(&constraint);
    payload["success_consequences"]["state_change"]["new_state"] = serde_json::json!("a_state_no_generator_would_ever_emit");
    let bytes = serde_json::to_vec(&payload).unwrap();

    let errors = validate_json(&constraint, &bytes).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, wrldbldr_engine::schema::SchemaViolation::UnofferedStateChangeValue(_))));
    let _ = state_change;
}

#[test]
fn validator_rejects_action_text_shorter_than_the_constraints_minimum() {
    let generator = ForestGenerator::new();
    let location_id = LocationId::from("forest_schema_probe_2");
    let blueprint = generator.generate_blueprint(&location_id).expect("blueprint generation succeeds");
    let entry = blueprint.entry_sublocations().first().cloned().expect("entry sublocation exists");
    let instance = LocationInstanceState::first_visit(&blueprint, entry, chrono::Utc::now());

    let constraint = build_constraint(&blueprint, &instance, generator.skill_vocabulary());
    let mut payload = minimal_valid_payload(&constraint);
    payload["action_text"] = serde_json::json!("short");
    let bytes = serde_json::to_vec(&payload).unwrap();

    let errors = validate_json(&constraint, &bytes).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, wrldbldr_engine::schema::SchemaViolation::ActionTextLength(..))));
}
