//! Template: the human-readable field listing shown to the LM alongside the
//! grammar (§4.C5 "Template"). Optional fields are marked "optional; use
//! null to omit" per spec.

use crate::constraint::{ActionConstraint, SublocationChangeOption};

fn choice_line(name: &str, choices: &[String]) -> String {
    format!("- {name}: one of [{}]", choices.join(", "))
}

fn optional_choice_line(name: &str, choices: &[String]) -> String {
    format!("- {name}: one of [{}] (optional; use null to omit)", choices.join(", "))
}

/// Render a human-readable skeleton of `constraint` (§4.C5 "Template").
pub fn to_prompt_template(constraint: &ActionConstraint) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "action_text: free text, {}-{} characters",
        constraint.action_text_min_len, constraint.action_text_max_len
    ));

    lines.push("success_consequences:".to_string());
    let sc = &constraint.success_consequences;
    if let Some(state_change) = &sc.state_change {
        let choices: Vec<String> = state_change.candidate_states.iter().map(|s| s.as_str().to_string()).collect();
        lines.push(format!(
            "  - state_change: {{ category: \"{}\", new_state: one of [{}] }} (optional; use null to omit)",
            state_change.category,
            choices.join(", ")
        ));
    }
    match &sc.sublocation_change {
        SublocationChangeOption::None => {
            lines.push("  - sublocation_change: the literal \"none\" (required; nowhere to move from here)".to_string());
        }
        SublocationChangeOption::Candidates(options) => {
            let choices: Vec<String> = options.iter().map(|s| s.as_str().to_string()).collect();
            lines.push(format!("  {}", optional_choice_line("sublocation_change", &choices)));
        }
    }
    if let Some(options) = &sc.gained_item {
        lines.push(format!("  {}", optional_choice_line("gained_item", options)));
    }
    if let Some(options) = &sc.gained_companion {
        lines.push(format!("  {}", optional_choice_line("gained_companion", options)));
    }
    if let Some(options) = &sc.gained_quest {
        lines.push(format!("  {}", optional_choice_line("gained_quest", options)));
    }
    if let Some(options) = &sc.gained_npc {
        lines.push(format!("  {}", optional_choice_line("gained_npc", options)));
    }

    lines.push("failure_consequences:".to_string());
    let kind_choices: Vec<String> = constraint
        .failure_consequences
        .kind_choices
        .iter()
        .map(|k| serde_json::to_value(k).unwrap().as_str().unwrap().to_string())
        .collect();
    lines.push(format!("  {}", choice_line("kind", &kind_choices)));
    lines.push(format!(
        "  - description: free text, up to {} characters",
        constraint.failure_consequences.description_max_len
    ));

    lines.push(choice_line("related_skill", &constraint.related_skill_choices));
    lines.push(format!(
        "difficulty: integer, {}-{}",
        constraint.difficulty_min, constraint.difficulty_max
    ));

    lines.join("\n")
}
