//! WrldBldr Engine library.
//!
//! This crate contains all server-side code for the location-driven
//! narrative engine.
//!
//! ## Structure
//!
//! - `constraint` - C4 Constraint Builder: derives what an action may offer
//! - `schema` - C5 Schema Emitter: lowers a constraint to grammar/template/validator
//! - `executor` - C6 Action Executor: Director and Narrator roles
//! - `generators` - C2 Feature Generator: per-location-type content assembly
//! - `interaction` - C8 Interaction Loop: per-visit action/outcome cycle
//! - `turn_controller` - C9 Turn Controller: world view / traveling / interacting modes
//! - `infrastructure` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod constraint;
pub mod executor;
pub mod generators;
pub mod infrastructure;
pub mod interaction;
pub mod schema;
pub mod turn_controller;

pub use app::App;
