//! C2 Feature Generator: one generator per `location_type`, each producing a
//! `(context string, Blueprint)` pair deterministically from a location id
//! (§4.C2). Grounded in the predecessor's `GameSystemRegistry` pattern: a
//! small trait plus a registry keyed by a free-string discriminant, so new
//! location types plug in without touching the turn controller.

pub mod forest;
pub mod mountain;
pub mod ruins;

use std::collections::BTreeMap;
use std::sync::Arc;

use wrldbldr_domain::{Blueprint, LocationId};

use crate::infrastructure::error::EngineError;

/// Shared contract every per-biome generator implements (§4.C2).
pub trait LocationGenerator: Send + Sync {
    /// The `location_type` discriminant this generator answers for.
    fn location_type(&self) -> &'static str;

    /// 40-200 words of sensory description referencing the same generated
    /// features as `generate_blueprint`, drawn from a stream seeded
    /// identically (§4.C2).
    fn generate_context(&self, location_id: &LocationId) -> String;

    /// Assemble and validate a blueprint for `location_id`. A validation
    /// failure here is a generator bug, not a recoverable condition (§4.C2,
    /// §7): the caller surfaces `EngineError::BlueprintInvariantViolation`.
    fn generate_blueprint(&self, location_id: &LocationId) -> Result<Blueprint, EngineError>;

    /// The fixed skill vocabulary `related_skill` choices are drawn from for
    /// this location type (§4.C4).
    fn skill_vocabulary(&self) -> &[String];
}

/// Maps `location_type` to its generator (§4.C2).
#[derive(Default, Clone)]
pub struct GeneratorRegistry {
    generators: BTreeMap<&'static str, Arc<dyn LocationGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self { generators: BTreeMap::new() }
    }

    /// Build the registry with the three reference generators installed.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_generator(Arc::new(forest::ForestGenerator::new()))
            .with_generator(Arc::new(mountain::MountainGenerator::new()))
            .with_generator(Arc::new(ruins::RuinsGenerator::new()))
    }

    pub fn with_generator(mut self, generator: Arc<dyn LocationGenerator>) -> Self {
        self.generators.insert(generator.location_type(), generator);
        self
    }

    pub fn get(&self, location_type: &str) -> Option<Arc<dyn LocationGenerator>> {
        self.generators.get(location_type).cloned()
    }
}
