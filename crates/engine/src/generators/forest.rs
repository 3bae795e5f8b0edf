//! The reference generator (§4.C2): forest locations. Fixes the draw order
//! every implementation must reproduce — (i) top-level variant, (ii) water
//! feature, (iii) elevation, (iv) special-feature category, (v)
//! per-sublocation embellishments — so that identical location ids yield
//! byte-identical blueprints across runs and across implementations that
//! agree on the hash function (§6).

use wrldbldr_domain::{
    validate, Blueprint, CategoryScope, LocationContent, LocationId, LocationState, SeededRng,
    StateCategory, StateRef, Sublocation, SublocationId,
};

use super::LocationGenerator;
use crate::infrastructure::error::EngineError;

const SKILLS: &[&str] = &["stealth", "foraging", "tracking", "climbing"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForestVariant {
    Dense,
    Sparse,
    Mixed,
}

impl ForestVariant {
    fn from_draw(draw: u32) -> Self {
        match draw {
            0 => ForestVariant::Dense,
            1 => ForestVariant::Sparse,
            _ => ForestVariant::Mixed,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ForestVariant::Dense => "a dense stand of old-growth trees, canopy close overhead",
            ForestVariant::Sparse => "a sparse woodland, sunlight reaching freely to the forest floor",
            ForestVariant::Mixed => "a mixed forest, young saplings crowding between older trunks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialFeature {
    Ruin,
    Cave,
    Hollow,
}

impl SpecialFeature {
    fn from_draw(draw: u32) -> Self {
        match draw {
            0 => SpecialFeature::Ruin,
            1 => SpecialFeature::Cave,
            _ => SpecialFeature::Hollow,
        }
    }
}

/// The fixed draw sequence for one forest location, reconstructed
/// identically by `generate_context` and `generate_blueprint` from a fresh
/// stream seeded on `location_id` (§4.C2).
struct ForestPlan {
    variant: ForestVariant,
    has_water: bool,
    has_elevation: bool,
    special_feature: SpecialFeature,
    berry_patch_parent: usize,
    fallen_log_parent: usize,
}

fn draw_plan(location_id: &str) -> ForestPlan {
    let mut rng = SeededRng::for_location(location_id);

    // (i) top-level variant
    let variant = ForestVariant::from_draw(rng.gen_range_inclusive(0, 2));
    // (ii) presence of water feature
    let has_water = rng.gen_bool(0.5);
    // (iii) presence of elevation
    let has_elevation = rng.gen_bool(0.5);
    // (iv) special-feature category
    let special_feature = SpecialFeature::from_draw(rng.gen_range_inclusive(0, 2));
    // (v) per-sublocation embellishments: which of the four core leaves
    // hosts the berry patch and which hosts the fallen log (may coincide).
    let berry_patch_parent = rng.gen_range_inclusive(0, 3) as usize;
    let fallen_log_parent = rng.gen_range_inclusive(0, 3) as usize;

    ForestPlan { variant, has_water, has_elevation, special_feature, berry_patch_parent, fallen_log_parent }
}

fn time_of_day_category() -> StateCategory {
    StateCategory::new(
        "time_of_day",
        "Time of Day",
        [
            LocationState::new("morning", "Morning", "Dawn light filters through the canopy."),
            LocationState::new("day", "Day", "Full daylight reaches the forest floor."),
            LocationState::new("dusk", "Dusk", "Long shadows stretch between the trees."),
            LocationState::new("night", "Night", "The forest has gone dark and close."),
        ],
        "morning",
        CategoryScope::Location,
    )
    .expect("default_state_id is a member of possible_states")
}

fn weather_category() -> StateCategory {
    StateCategory::new(
        "weather",
        "Weather",
        [
            LocationState::new("clear", "Clear", "The sky is clear above the treeline."),
            LocationState::new("rain", "Rain", "Rain drums steadily on the leaves."),
            LocationState::new("fog", "Fog", "A low fog clings between the trunks."),
        ],
        "clear",
        CategoryScope::Location,
    )
    .expect("default_state_id is a member of possible_states")
}

fn wildlife_state_category() -> StateCategory {
    StateCategory::new(
        "wildlife_state",
        "Wildlife State",
        [
            LocationState::new("calm", "Calm", "The woods are quiet."),
            LocationState::new("alert", "Alert", "Something rustles nearby."),
        ],
        "calm",
        CategoryScope::Location,
    )
    .expect("default_state_id is a member of possible_states")
}

fn path_visibility_category() -> StateCategory {
    StateCategory::new(
        "path_visibility",
        "Path Visibility",
        [
            LocationState::new("clear", "Clear", "The path ahead is easy to follow."),
            LocationState::new("obscured", "Obscured", "Undergrowth has overtaken the path."),
        ],
        "clear",
        CategoryScope::Sublocation,
    )
    .expect("default_state_id is a member of possible_states")
}

/// The core skeleton every forest shares: entry plus four fixed leaves
/// forming a small DAG (§4.C2 "small core skeleton").
fn core_sublocations() -> Vec<Sublocation> {
    let entry = Sublocation::new("forest_edge", "Forest Edge", "Where the open ground gives way to trees.")
        .with_direct_connections([SublocationId::from("winding_path")])
        .with_local_states([(wrldbldr_domain::CategoryId::from("path_visibility"), wrldbldr_domain::StateId::from("clear"))]);

    let winding_path = Sublocation::new("winding_path", "Winding Path", "A trail threading between the trunks.")
        .with_parent("forest_edge")
        .with_local_states([(wrldbldr_domain::CategoryId::from("path_visibility"), wrldbldr_domain::StateId::from("clear"))]);

    let deep_grove = Sublocation::new("deep_grove", "Deep Grove", "The trees grow closer together here.")
        .with_parent("winding_path")
        .with_local_states([(wrldbldr_domain::CategoryId::from("path_visibility"), wrldbldr_domain::StateId::from("obscured"))]);

    let grove_center = Sublocation::new("grove_center", "Grove Center", "A quiet clearing at the heart of the grove.")
        .with_parent("deep_grove")
        .with_local_states([(wrldbldr_domain::CategoryId::from("path_visibility"), wrldbldr_domain::StateId::from("clear"))]);

    vec![entry, winding_path, deep_grove, grove_center]
}

pub struct ForestGenerator {
    skills: Vec<String>,
}

impl Default for ForestGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestGenerator {
    pub fn new() -> Self {
        Self { skills: SKILLS.iter().map(|s| s.to_string()).collect() }
    }
}

impl LocationGenerator for ForestGenerator {
    fn location_type(&self) -> &'static str {
        "forest"
    }

    fn generate_context(&self, location_id: &LocationId) -> String {
        let plan = draw_plan(location_id.as_str());

        let mut sentences = vec![format!("You stand at the edge of {}.", plan.variant.describe())];

        if plan.has_water {
            sentences.push("Somewhere nearby, water moves over stone.".to_string());
        }
        if plan.has_elevation {
            sentences.push("The ground rises unevenly toward a distant ridge.".to_string());
        }

        let feature_sentence = match plan.special_feature {
            SpecialFeature::Ruin => "Half-buried stonework hints at something older than the trees.",
            SpecialFeature::Cave => "A dark opening breaks the slope further in, cool air drifting out of it.",
            SpecialFeature::Hollow => "A wide, moss-floored hollow opens between the roots ahead.",
        };
        sentences.push(feature_sentence.to_string());
        sentences.push("The path forward narrows and thickens with undergrowth the deeper you go.".to_string());

        sentences.join(" ")
    }

    fn generate_blueprint(&self, location_id: &LocationId) -> Result<Blueprint, EngineError> {
        let plan = draw_plan(location_id.as_str());

        let mut sublocations = core_sublocations();

        if plan.has_water {
            sublocations.push(
                Sublocation::new("stream_bank", "Stream Bank", "A shallow stream cuts through the undergrowth.")
                    .with_parent("winding_path"),
            );
        }

        if plan.has_elevation {
            sublocations.push(
                Sublocation::new("ridge_overlook", "Ridge Overlook", "The trees thin out near a rocky rise.")
                    .with_parent("deep_grove"),
            );
        }

        let special_id = match plan.special_feature {
            SpecialFeature::Ruin => "ruin_threshold",
            SpecialFeature::Cave => "entrance_chamber",
            SpecialFeature::Hollow => "mossy_hollow",
        };
        let special_name = match plan.special_feature {
            SpecialFeature::Ruin => "Ruin Threshold",
            SpecialFeature::Cave => "Entrance Chamber",
            SpecialFeature::Hollow => "Mossy Hollow",
        };
        let special_description = match plan.special_feature {
            SpecialFeature::Ruin => "Tumbled stones, old beyond guessing.",
            SpecialFeature::Cave => "Dark and damp; the light from outside barely reaches here.",
            SpecialFeature::Hollow => "Soft moss underfoot, roots arching overhead.",
        };

        let mut special = Sublocation::new(special_id, special_name, special_description).with_parent("grove_center");
        if matches!(plan.special_feature, SpecialFeature::Cave) {
            // Forbidding disjunctively ("unless holding a light") isn't
            // expressible in the required/forbidden grammar (pure AND); the
            // cave is simply inaccessible after dark.
            special = special.with_forbidden_states([StateRef::new("time_of_day", "night")]);
        }
        sublocations.push(special);

        let leaf_candidates = ["forest_edge", "winding_path", "deep_grove", "grove_center"];
        let berry_patch_parent = leaf_candidates[plan.berry_patch_parent];
        let fallen_log_parent = leaf_candidates[plan.fallen_log_parent];

        sublocations.push(
            Sublocation::new("berry_patch", "Berry Patch", "Brambles heavy with fruit.").with_parent(berry_patch_parent),
        );
        sublocations.push(
            Sublocation::new("fallen_log", "Fallen Log", "A mossy trunk, hollowed with age.").with_parent(fallen_log_parent),
        );

        let mut connections = std::collections::BTreeMap::new();
        connections.insert(
            SublocationId::from("forest_edge"),
            std::collections::BTreeSet::from([SublocationId::from("winding_path")]),
        );
        connections.insert(
            SublocationId::from("winding_path"),
            std::collections::BTreeSet::from([SublocationId::from("deep_grove")]),
        );
        connections.insert(
            SublocationId::from("deep_grove"),
            std::collections::BTreeSet::from([SublocationId::from("grove_center")]),
        );

        let content = LocationContent::new().with_items(["flint", "dry_tinder"]).with_quests(["lost_satchel"]);

        let blueprint = Blueprint::new(location_id.clone(), "forest")
            .with_sublocations(sublocations)
            .with_connections(connections)
            .with_state_categories([
                time_of_day_category(),
                weather_category(),
                wildlife_state_category(),
                path_visibility_category(),
            ])
            .with_content_map([(
                (SublocationId::from("forest_edge"), wrldbldr_domain::StateSignature::empty()),
                content,
            )]);

        validate(&blueprint).map_err(EngineError::from)?;

        Ok(blueprint)
    }

    fn skill_vocabulary(&self) -> &[String] {
        &self.skills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_location_ids_yield_identical_blueprints() {
        let generator = ForestGenerator::new();
        let id = LocationId::from("forest_1732012345");
        let a = generator.generate_blueprint(&id).unwrap();
        let b = generator.generate_blueprint(&id).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn different_location_ids_can_diverge_in_structure() {
        let generator = ForestGenerator::new();
        let a = generator.generate_blueprint(&LocationId::from("forest_1")).unwrap();
        let b = generator.generate_blueprint(&LocationId::from("forest_2")).unwrap();
        assert!(a.sublocations().len() != b.sublocations().len() || a.connections() != b.connections());
    }

    #[test]
    fn generated_blueprint_passes_structural_validation() {
        let generator = ForestGenerator::new();
        let bp = generator.generate_blueprint(&LocationId::from("forest_42")).unwrap();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn context_and_blueprint_agree_on_the_special_feature() {
        let generator = ForestGenerator::new();
        let id = LocationId::from("forest_777");
        let plan = draw_plan(id.as_str());
        let bp = generator.generate_blueprint(&id).unwrap();

        let expected_id = match plan.special_feature {
            SpecialFeature::Ruin => "ruin_threshold",
            SpecialFeature::Cave => "entrance_chamber",
            SpecialFeature::Hollow => "mossy_hollow",
        };
        assert!(bp.get_sublocation(&SublocationId::from(expected_id)).is_some());
    }
}
