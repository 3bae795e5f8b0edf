//! The world-map and inventory collaborators (§6). Both are external to the
//! core turn loop by design; the core only ever reaches them through these
//! narrow trait objects.

use std::collections::BTreeMap;
use std::sync::Mutex;
use wrldbldr_domain::LocationId;

/// One cell of the world map, as the map collaborator reports it to C9.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexInfo {
    pub biome: String,
    pub location_id: Option<LocationId>,
    pub noise_value: f64,
}

/// Supplies vertex metadata to the Turn Controller (§4.C9, §6).
pub trait WorldMapPort: Send + Sync {
    fn get_vertex_info(&self, vertex: &str) -> Option<VertexInfo>;
}

/// Receives item/companion/quest ids granted by an applied success. The core
/// does not track inventory state itself (§6): it only ever calls `grant_*`.
pub trait InventorySinkPort: Send + Sync {
    fn grant_item(&self, item_id: &str);
    fn grant_companion(&self, companion_id: &str);
    fn grant_quest(&self, quest_id: &str);
    fn grant_npc(&self, npc_id: &str);
}

/// A deterministic in-memory `WorldMapPort`, for engine tests and the
/// terminal client's single-vertex demo mode (§6).
#[derive(Debug, Default)]
pub struct FakeWorldMap {
    vertices: BTreeMap<String, VertexInfo>,
}

impl FakeWorldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertex(mut self, vertex: impl Into<String>, info: VertexInfo) -> Self {
        self.vertices.insert(vertex.into(), info);
        self
    }
}

impl WorldMapPort for FakeWorldMap {
    fn get_vertex_info(&self, vertex: &str) -> Option<VertexInfo> {
        self.vertices.get(vertex).cloned()
    }
}

/// A deterministic in-memory `InventorySinkPort` that just records what it
/// was handed, for assertions in engine tests.
#[derive(Debug, Default)]
pub struct FakeInventorySink {
    granted: Mutex<Vec<String>>,
}

impl FakeInventorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granted(&self) -> Vec<String> {
        self.granted.lock().expect("inventory sink mutex poisoned").clone()
    }
}

impl InventorySinkPort for FakeInventorySink {
    fn grant_item(&self, item_id: &str) {
        self.granted.lock().expect("inventory sink mutex poisoned").push(format!("item:{item_id}"));
    }

    fn grant_companion(&self, companion_id: &str) {
        self.granted
            .lock()
            .expect("inventory sink mutex poisoned")
            .push(format!("companion:{companion_id}"));
    }

    fn grant_quest(&self, quest_id: &str) {
        self.granted.lock().expect("inventory sink mutex poisoned").push(format!("quest:{quest_id}"));
    }

    fn grant_npc(&self, npc_id: &str) {
        self.granted.lock().expect("inventory sink mutex poisoned").push(format!("npc:{npc_id}"));
    }
}
