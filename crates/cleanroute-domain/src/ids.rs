//! Newtype identifiers.
//!
//! Keeping task, cleaner, zone and run identifiers as distinct types
//! prevents an `i64` meant as a task id from silently being passed where
//! a cleaner id or a sequence number was expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! int_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

int_id!(TaskId);
int_id!(CleanerId);
int_id!(LogisticCode);
int_id!(ZoneId);

/// Sentinel zone for a coordinate that falls outside the mapped region.
/// Tasks assigned this zone are treated as singletons by Phase 1.
pub const ZONE_UNMAPPED: ZoneId = ZoneId(i64::MIN);

/// Opaque run identifier, fresh per run per spec.md §3 "Run".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
