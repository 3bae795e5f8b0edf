extern crate self as wrldbldr_domain;

pub mod action;
pub mod blueprint;
pub mod error;
pub mod fnv;
pub mod ids;
pub mod instance;
pub mod rng;
pub mod validator;

pub use action::{ActionChoice, ActionResult, ConsequencePayload, StateChange};
pub use blueprint::{Blueprint, CategoryScope, LocationContent, LocationState, StateCategory, StateRef, StateSignature, Sublocation};
pub use error::DomainError;
pub use fnv::{fnv1a_64, hash_location_id};
pub use ids::{CategoryId, LocationId, StateId, SublocationId};
pub use instance::LocationInstanceState;
pub use rng::SeededRng;
pub use validator::{validate, InvariantViolation};
