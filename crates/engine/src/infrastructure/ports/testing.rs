// Port traits define the full contract - many methods are for future use
#![allow(dead_code)]

//! Testability port for injecting time. Randomness is not injected through a
//! port: every draw in the core flows through an explicitly-seeded
//! `wrldbldr_domain::SeededRng` instead of a global generator, so there is no
//! `RandomPort` to fake here.

use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
