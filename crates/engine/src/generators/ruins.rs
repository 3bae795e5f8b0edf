//! Ruins generator (§4.C2), following the forest reference generator's fixed
//! draw order, substituted with ruin-appropriate structure and content.

use std::collections::{BTreeMap, BTreeSet};

use wrldbldr_domain::{
    validate, Blueprint, CategoryId, CategoryScope, LocationContent, LocationId, LocationState,
    SeededRng, StateCategory, StateId, StateRef, Sublocation, SublocationId,
};

use super::LocationGenerator;
use crate::infrastructure::error::EngineError;

const SKILLS: &[&str] = &["lore", "stealth", "lockpicking", "perception"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuinVariant {
    Collapsed,
    Overgrown,
    Intact,
}

impl RuinVariant {
    fn from_draw(draw: u32) -> Self {
        match draw {
            0 => RuinVariant::Collapsed,
            1 => RuinVariant::Overgrown,
            _ => RuinVariant::Intact,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            RuinVariant::Collapsed => "a collapsed wing of the structure, stone fallen across every passage",
            RuinVariant::Overgrown => "walls smothered in vines, the stonework barely visible beneath the growth",
            RuinVariant::Intact => "walls still mostly standing, improbably intact after so long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialFeature {
    BuriedVault,
    CollapsedTower,
    SunkenCourtyard,
}

impl SpecialFeature {
    fn from_draw(draw: u32) -> Self {
        match draw {
            0 => SpecialFeature::BuriedVault,
            1 => SpecialFeature::CollapsedTower,
            _ => SpecialFeature::SunkenCourtyard,
        }
    }
}

struct RuinsPlan {
    variant: RuinVariant,
    has_water: bool,
    has_elevation: bool,
    special_feature: SpecialFeature,
    trap_parent: usize,
}

fn draw_plan(location_id: &str) -> RuinsPlan {
    let mut rng = SeededRng::for_location(location_id);

    let variant = RuinVariant::from_draw(rng.gen_range_inclusive(0, 2));
    let has_water = rng.gen_bool(0.4);
    let has_elevation = rng.gen_bool(0.4);
    let special_feature = SpecialFeature::from_draw(rng.gen_range_inclusive(0, 2));
    let trap_parent = rng.gen_range_inclusive(0, 3) as usize;

    RuinsPlan { variant, has_water, has_elevation, special_feature, trap_parent }
}

fn time_of_day_category() -> StateCategory {
    StateCategory::new(
        "time_of_day",
        "Time of Day",
        [
            LocationState::new("morning", "Morning", "Light slants through broken archways."),
            LocationState::new("day", "Day", "Full light reaches even the inner chambers."),
            LocationState::new("dusk", "Dusk", "Shadows pool in the collapsed corridors."),
            LocationState::new("night", "Night", "Nothing reaches here but the faintest starlight."),
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
            LocationState::new("clear", "Clear", "Clear skies above the broken rooftops."),
            LocationState::new("rain", "Rain", "Rain pools in the cracked flagstones."),
            LocationState::new("fog", "Fog", "Fog drifts through the empty window frames."),
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
            LocationState::new("calm", "Calm", "No sound but settling stone."),
            LocationState::new("alert", "Alert", "Something shifts in the rubble nearby."),
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
            LocationState::new("clear", "Clear", "The way through is unobstructed."),
            LocationState::new("obscured", "Obscured", "Rubble and fallen beams choke the passage."),
        ],
        "clear",
        CategoryScope::Sublocation,
    )
    .expect("default_state_id is a member of possible_states")
}

fn core_sublocations() -> Vec<Sublocation> {
    let gatehouse = Sublocation::new("gatehouse", "Gatehouse", "The outer gate, half-collapsed but passable.")
        .with_direct_connections([SublocationId::from("main_hall")])
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("clear"))]);

    let main_hall = Sublocation::new("main_hall", "Main Hall", "A long hall, roof open to the sky in places.")
        .with_parent("gatehouse")
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("clear"))]);

    let inner_passage = Sublocation::new("inner_passage", "Inner Passage", "A narrow corridor deeper into the structure.")
        .with_parent("main_hall")
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("obscured"))]);

    let inner_sanctum = Sublocation::new("inner_sanctum", "Inner Sanctum", "The structure's innermost chamber.")
        .with_parent("inner_passage")
        .with_local_states([(CategoryId::from("path_visibility"), StateId::from("clear"))]);

    vec![gatehouse, main_hall, inner_passage, inner_sanctum]
}

pub struct RuinsGenerator {
    skills: Vec<String>,
}

impl Default for RuinsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RuinsGenerator {
    pub fn new() -> Self {
        Self { skills: SKILLS.iter().map(|s| s.to_string()).collect() }
    }
}

impl LocationGenerator for RuinsGenerator {
    fn location_type(&self) -> &'static str {
        "ruins"
    }

    fn generate_context(&self, location_id: &LocationId) -> String {
        let plan = draw_plan(location_id.as_str());

        let mut sentences = vec![format!("You step through what remains of a gate, into {}.", plan.variant.describe())];

        if plan.has_water {
            sentences.push("A cistern somewhere below still holds standing water.".to_string());
        }
        if plan.has_elevation {
            sentences.push("A half-collapsed stair climbs toward an upper level.".to_string());
        }

        let feature_sentence = match plan.special_feature {
            SpecialFeature::BuriedVault => "A sealed door, half-buried in rubble, marks a vault below.",
            SpecialFeature::CollapsedTower => "The remains of a tower lean precariously over the courtyard.",
            SpecialFeature::SunkenCourtyard => "A courtyard has sunk below the surrounding floor, flooded with silt.",
        };
        sentences.push(feature_sentence.to_string());
        sentences.push("Dust hangs in the stale air of every passage you cross.".to_string());

        sentences.join(" ")
    }

    fn generate_blueprint(&self, location_id: &LocationId) -> Result<Blueprint, EngineError> {
        let plan = draw_plan(location_id.as_str());

        let mut sublocations = core_sublocations();

        if plan.has_water {
            sublocations.push(
                Sublocation::new("flooded_cistern", "Flooded Cistern", "Dark water fills a sunken chamber.")
                    .with_parent("main_hall"),
            );
        }

        if plan.has_elevation {
            sublocations.push(
                Sublocation::new("upper_gallery", "Upper Gallery", "A walkway above the main hall, missing in places.")
                    .with_parent("inner_passage"),
            );
        }

        let (special_id, special_name, special_description) = match plan.special_feature {
            SpecialFeature::BuriedVault => ("buried_vault", "Buried Vault", "A sealed chamber, untouched for longer than anyone can say."),
            SpecialFeature::CollapsedTower => ("collapsed_tower", "Collapsed Tower", "Rubble from a fallen tower fills the space."),
            SpecialFeature::SunkenCourtyard => ("sunken_courtyard", "Sunken Courtyard", "A courtyard, sunk and silted, open to the sky."),
        };

        let mut special = Sublocation::new(special_id, special_name, special_description).with_parent("inner_sanctum");
        if matches!(plan.special_feature, SpecialFeature::BuriedVault) {
            special = special.with_required_states([StateRef::new("wildlife_state", "calm")]);
        }
        sublocations.push(special);

        let trap_candidates = ["gatehouse", "main_hall", "inner_passage", "inner_sanctum"];
        let trap_parent = trap_candidates[plan.trap_parent];
        sublocations.push(
            Sublocation::new("trapped_alcove", "Trapped Alcove", "A niche in the wall, its contents guarded by an old mechanism.")
                .with_parent(trap_parent),
        );

        let mut connections = BTreeMap::new();
        connections.insert(
            SublocationId::from("gatehouse"),
            BTreeSet::from([SublocationId::from("main_hall")]),
        );
        connections.insert(
            SublocationId::from("main_hall"),
            BTreeSet::from([SublocationId::from("inner_passage")]),
        );
        connections.insert(
            SublocationId::from("inner_passage"),
            BTreeSet::from([SublocationId::from("inner_sanctum")]),
        );

        let content = LocationContent::new().with_items(["old_coin", "rusted_key"]).with_quests(["forgotten_heir"]);

        let blueprint = Blueprint::new(location_id.clone(), "ruins")
            .with_sublocations(sublocations)
            .with_connections(connections)
            .with_state_categories([
                time_of_day_category(),
                weather_category(),
                wildlife_state_category(),
                path_visibility_category(),
            ])
            .with_content_map([(
                (SublocationId::from("gatehouse"), wrldbldr_domain::StateSignature::empty()),
                content,
            )]);

        validate(&blueprint).map_err(EngineError::from)?;

        Ok(blueprint)
    }

    fn skill_vocabulary(&self) -> &[String] {
        &self.skills
    }
}
