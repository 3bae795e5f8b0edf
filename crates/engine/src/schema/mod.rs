//! C5 Schema Emitter: three artefacts derived from one `ActionConstraint`
//! (§4.C5) — a JSON Schema for the LM's tool call, a human-readable prompt
//! template, and a belt-and-braces validator for the returned payload.

pub mod grammar;
pub mod template;
pub mod validator;

pub use grammar::to_json_schema;
pub use template::to_prompt_template;
pub use validator::{validate_json, ActionChoiceResponse, SchemaViolation, SuccessConsequencesResponse};
