//! Mountain generator (§4.C2), following the forest reference generator's
//! fixed draw order and shared state-category vocabulary, substituted with
//! mountain-appropriate structure and content.

use std::collections::{BTreeMap, BTreeSet};

use wrldbldr_domain::{
    validate, Blueprint, CategoryId, CategoryScope, LocationContent, LocationId, LocationState,
    SeededRng, StateCategory, StateId, Sublocation, SublocationId,
};

use super::LocationGenerator;
use crate::infrastructure::error::EngineError;

const SKILLS: &[&str] = &["climbing", "tracking", "endurance", "navigation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MountainVariant {
    Scree,
    Forested,
    Snowcapped,
}

impl MountainVariant {
    fn from_draw(draw: u32) -> Self {
        match draw {
            0 => MountainVariant::Scree,
            1 => MountainVariant::Forested,
            _ => MountainVariant::Snowcapped,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            MountainVariant::Scree => "a steep scree slope, loose rock shifting underfoot",
            MountainVariant::Forested => "a forested lower slope, pines clinging to the incline",
            MountainVariant::Snowcapped => "a slope already dusted with snow at this elevation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialFeature {
    Summit,
    IceCave,
    ClimbersShelter,
}

impl SpecialFeature {
    fn from_draw(draw: u32) -> Self {
        match draw {
            0 => SpecialFeature::Summit,
            1 => SpecialFeature::IceCave,
            _ => SpecialFeature::ClimbersShelter,
        }
    }
}

struct MountainPlan {
    variant: MountainVariant,
    has_water: bool,
    has_elevation: bool,
    special_feature: SpecialFeature,
    cache_parent: usize,
}

fn draw_plan(location_id: &str) -> MountainPlan {
    let mut rng = SeededRng::for_location(location_id);

    let variant = MountainVariant::from_draw(rng.gen_range_inclusive(0, 2));
    let has_water = rng.gen_bool(0.3);
    let has_elevation = rng.gen_bool(0.8);
    let special_feature = SpecialFeature::from_draw(rng.gen_range_inclusive(0, 2));
    let cache_parent = rng.gen_range_inclusive(0, 3) as usize;

    MountainPlan { variant, has_water, has_elevation, special_feature, cache_parent }
}

fn time_of_day_category() -> StateCategory {
    StateCategory::new(
        "time_of_day",
        "Time of Day",
        [
            LocationState::new("morning", "Morning", "Pale light breaks over the ridgeline."),
            LocationState::new("day", "Day", "The sun is high and the air thin."),
            LocationState::new("dusk", "Dusk", "The temperature is already dropping."),
            LocationState::new("night", "Night", "Cold has settled fully over the slope."),
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
            LocationState::new("clear", "Clear", "Visibility stretches for miles."),
            LocationState::new("wind", "Wind", "A cutting wind scours the exposed rock."),
            LocationState::new("whiteout", "Whiteout", "Snow obscures everything past arm's reach."),
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
            LocationState::new("calm", "Calm", "No movement among the rocks."),
            LocationState::new("alert", "Alert", "A goat kicks loose scree somewhere above."),
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
            LocationState::new("clear", "Clear", "The route up is easy to pick out."),
            LocationState::new("obscured", "Obscured", "Loose rock has buried the trail markers."),
        ],
        "clear",
        CategoryScope::Sublocation,
    )
    .expect("default_state_id is a member of possible_states")
}

fn core_sublocations() -> Vec<Sublocation> {
    let trailhead = Sublocation::new("trailhead", "Trailhead", "Where the maintained trail ends and the climb begins.")
        .with_direct_connections([SublocationId::from("switchback_path")])
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("clear"))]);

    let switchback = Sublocation::new("switchback_path", "Switchback Path", "The trail doubles back on itself up the slope.")
        .with_parent("trailhead")
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("clear"))]);

    let exposed_ridge = Sublocation::new("exposed_ridge", "Exposed Ridge", "A narrow spine of rock with drops on either side.")
        .with_parent("switchback_path")
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("obscured"))]);

    let high_camp = Sublocation::new("high_camp", "High Camp", "A flat shelf of rock, sheltered from the worst of the wind.")
        .with_parent("exposed_ridge")
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("clear"))]);

    vec![trailhead, switchback, exposed_ridge, high_camp]
}

pub struct MountainGenerator {
    skills: Vec<String>,
}

impl Default for MountainGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MountainGenerator {
    pub fn new() -> Self {
        Self { skills: SKILLS.iter().map(|s| s.to_string()).collect() }
    }
}

impl LocationGenerator for MountainGenerator {
    fn location_type(&self) -> &'static str {
        "mountain"
    }

    fn generate_context(&self, location_id: &LocationId) -> String {
        let plan = draw_plan(location_id.as_str());

        let mut sentences = vec![format!("The trail climbs into {}.", plan.variant.describe())];

        if plan.has_water {
            sentences.push("Meltwater trickles across the path somewhere above.".to_string());
        }
        if plan.has_elevation {
            sentences.push("The ridge ahead rises sharply, switchbacks visible against the rock.".to_string());
        }

        let feature_sentence = match plan.special_feature {
            SpecialFeature::Summit => "Far above, the summit is just visible between passing cloud.",
            SpecialFeature::IceCave => "A blue-tinged opening marks an ice cave cut into the rock.",
            SpecialFeature::ClimbersShelter => "A weathered shelter, built by climbers long past, clings to the slope.",
        };
        sentences.push(feature_sentence.to_string());
        sentences.push("The air thins noticeably with every switchback climbed.".to_string());

        sentences.join(" ")
    }

    fn generate_blueprint(&self, location_id: &LocationId) -> Result<Blueprint, EngineError> {
        let plan = draw_plan(location_id.as_str());

        let mut sublocations = core_sublocations();

        if plan.has_water {
            sublocations.push(
                Sublocation::new("meltwater_crossing", "Meltwater Crossing", "A thin stream crosses the trail here.")
                    .with_parent("switchback_path"),
            );
        }

        if plan.has_elevation {
            sublocations.push(
                Sublocation::new("upper_scramble", "Upper Scramble", "A hand-over-hand scramble over loose rock.")
                    .with_parent("exposed_ridge"),
            );
        }

        let (special_id, special_name, special_description) = match plan.special_feature {
            SpecialFeature::Summit => ("summit", "Summit", "The highest point for miles in any direction."),
            SpecialFeature::IceCave => ("ice_cave", "Ice Cave", "Blue light filters through translucent walls of old ice."),
            SpecialFeature::ClimbersShelter => (
                "climbers_shelter",
                "Climbers' Shelter",
                "A stone hut, roof half-collapsed, still holding back the wind.",
            ),
        };
        sublocations.push(Sublocation::new(special_id, special_name, special_description).with_parent("high_camp"));

        let cache_candidates = ["trailhead", "switchback_path", "exposed_ridge", "high_camp"];
        let cache_parent = cache_candidates[plan.cache_parent];
        sublocations.push(
            Sublocation::new("supply_cache", "Supply Cache", "A weatherproof box left by an earlier party.")
                .with_parent(cache_parent),
        );

        let mut connections = BTreeMap::new();
        connections.insert(
            SublocationId::from("trailhead"),
            BTreeSet::from([SublocationId::from("switchback_path")]),
        );
        connections.insert(
            SublocationId::from("switchback_path"),
            BTreeSet::from([SublocationId::from("exposed_ridge")]),
        );
        connections.insert(
            SublocationId::from("exposed_ridge"),
            BTreeSet::from([SublocationId::from("high_camp")]),
        );

        let content = LocationContent::new().with_items(["rope", "piton"]).with_quests(["stranded_climber"]);

        let blueprint = Blueprint::new(location_id.clone(), "mountain")
            .with_sublocations(sublocations)
            .with_connections(connections)
            .with_state_categories([
                time_of_day_category(),
                weather_category(),
                wildlife_state_category(),
                path_visibility_category(),
            ])
            .with_content_map([(
                (SublocationId::from("trailhead"), wrldbldr_domain::StateSignature::empty()),
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
        let generator = MountainGenerator::new();
        let id = LocationId::from("mountain_1");
        let a = generator.generate_blueprint(&id).unwrap();
        let b = generator.generate_blueprint(&id).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn generated_blueprint_passes_structural_validation() {
        let generator = MountainGenerator::new();
        let bp = generator.generate_blueprint(&LocationId::from("mountain_99")).unwrap();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn different_location_ids_can_diverge_in_structure() {
        let generator = MountainGenerator::new();
        let a = generator.generate_blueprint(&LocationId::from("mountain_1")).unwrap();
        let b = generator.generate_blueprint(&LocationId::from("mountain_2")).unwrap();
        assert!(a.sublocations().len() != b.sublocations().len() || a.connections() != b.connections());
    }
}
