//! External seams the core turn loop talks through (§6): the LM transport,
//! the world map, the inventory sink, and the injectable clock. Nothing in
//! `wrldbldr-domain` or the interaction/turn-controller modules reaches past
//! these traits to a concrete adapter.

mod llm;
mod testing;
mod world;

pub use llm::{
    ChatMessage, FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, MessageRole, TokenUsage,
    ToolCall, ToolDefinition,
};
pub use testing::ClockPort;

#[cfg(test)]
pub use testing::MockClockPort;

pub use world::{FakeInventorySink, FakeWorldMap, InventorySinkPort, VertexInfo, WorldMapPort};
