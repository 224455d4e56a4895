//! Shared identifier wrappers for IdeaForge.
//!
//! Newtype wrappers prevent accidentally passing a variation id where a
//! concept id is expected. All ids are UUIDv4 under the hood and serialize
//! transparently as their string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when parsing a UUID-backed identifier fails.
#[derive(Debug, Clone, Error)]
#[error("invalid {label}: {source}")]
pub struct IdParseError {
    label: &'static str,
    source: uuid::Error,
}

macro_rules! define_uuid_id {
    ($name:ident, $label:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|source| IdParseError {
                        label: $label,
                        source,
                    })
            }
        }
    };
}

define_uuid_id!(SessionId, "session ID");
define_uuid_id!(VariationId, "variation ID");
define_uuid_id!(ConceptId, "concept ID");
define_uuid_id!(IdeaId, "idea ID");
