//! Blueprint identifiers.
//!
//! Unlike most entity ids in this codebase's lineage, blueprint ids are not
//! `Uuid`s: they must be stable, human- or generator-authored strings so that
//! `hash(location_id)` (§6 of the determinism contract) can reproduce the same
//! seed across runs and across independent implementations.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_string_id!(LocationId);
define_string_id!(SublocationId);
define_string_id!(CategoryId);
define_string_id!(StateId);
