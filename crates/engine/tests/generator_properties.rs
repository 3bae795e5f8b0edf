//! Generator property tests (§4.C2, §8): determinism and blueprint validity
//! sampled across many location ids per reference generator.
//!
//! The sample size is a documented constant rather than a silently-shrunk
//! number: §8 calls for "1000 random ids" of coverage per generator, and
//! that's what `SAMPLE_SIZE` below actually runs.

use wrldbldr_domain::{validate, LocationId};
use wrldbldr_engine::generators::{forest::ForestGenerator, mountain::MountainGenerator, ruins::RuinsGenerator, GeneratorRegistry, LocationGenerator};

/// Number of distinct location ids sampled per generator for the
/// determinism and blueprint-validity properties below.
const SAMPLE_SIZE: usize = 1000;

fn sample_ids(prefix: &str) -> Vec<LocationId> {
    (0..SAMPLE_SIZE).map(|i| LocationId::from(format!("{prefix}_{i}"))).collect()
}

fn all_generators() -> Vec<(&'static str, std::sync::Arc<dyn LocationGenerator>)> {
    vec![
        ("forest", std::sync::Arc::new(ForestGenerator::new()) as std::sync::Arc<dyn LocationGenerator>),
        ("mountain", std::sync::Arc::new(MountainGenerator::new())),
        ("ruins", std::sync::Arc::new(RuinsGenerator::new())),
    ]
}

#[test]
fn registry_with_defaults_answers_for_all_three_reference_types() {
    let registry = GeneratorRegistry::with_defaults();
    assert!(registry.get("forest").is_some());
    assert!(registry.get("mountain").is_some());
    assert!(registry.get("ruins").is_some());
    assert!(registry.get("desert").is_none());
}

#[test]
fn generate_blueprint_is_deterministic_across_a_thousand_ids_per_generator() {
    for (name, generator) in all_generators() {
        for id in sample_ids(name) {
            let first = generator.generate_blueprint(&id).unwrap_or_else(|e| panic!("{name} failed to generate a blueprint for {id:?}: {e}"));
            let second = generator.generate_blueprint(&id).unwrap_or_else(|e| panic!("{name} failed to regenerate a blueprint for {id:?}: {e}"));

            let first_json = serde_json::to_string(&first).expect("blueprint serializes");
            let second_json = serde_json::to_string(&second).expect("blueprint serializes");
            assert_eq!(first_json, second_json, "{name} generator produced divergent blueprints for the same id {id:?}");
        }
    }
}

#[test]
fn generate_context_is_deterministic_across_a_thousand_ids_per_generator() {
    for (name, generator) in all_generators() {
        for id in sample_ids(name) {
            let first = generator.generate_context(&id);
            let second = generator.generate_context(&id);
            assert_eq!(first, second, "{name} generator produced divergent context text for the same id {id:?}");
        }
    }
}

#[test]
fn every_generated_blueprint_passes_structural_validation_across_a_thousand_ids_per_generator() {
    for (name, generator) in all_generators() {
        for id in sample_ids(name) {
            let blueprint = generator.generate_blueprint(&id).unwrap_or_else(|e| panic!("{name} failed to generate a blueprint for {id:?}: {e}"));
            if let Err(violations) = validate(&blueprint) {
                panic!("{name} generator produced an invalid blueprint for {id:?}: {violations:?}");
            }
        }
    }
}

#[test]
fn different_ids_can_diverge_in_structure_within_each_generator() {
    // A determinism guarantee doesn't mean every id yields identical
    // content - confirm the generators actually vary output across a
    // sample rather than collapsing to one fixed blueprint.
    for (name, generator) in all_generators() {
        let mut distinct_json = std::collections::BTreeSet::new();
        for id in sample_ids(name) {
            let blueprint = generator.generate_blueprint(&id).expect("blueprint generation succeeds");
            distinct_json.insert(serde_json::to_string(&blueprint).expect("blueprint serializes"));
        }
        assert!(distinct_json.len() > 1, "{name} generator produced identical blueprints for every sampled id");
    }
}

#[test]
fn skill_vocabularies_are_fixed_and_non_empty_per_generator() {
    for (name, generator) in all_generators() {
        assert!(!generator.skill_vocabulary().is_empty(), "{name} generator has an empty skill vocabulary");
        assert_eq!(generator.location_type(), name);
    }
}
