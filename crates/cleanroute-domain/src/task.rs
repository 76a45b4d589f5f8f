//! Task and cleaner entities (spec §3 "Task", "Cleaner").

use crate::ids::{CleanerId, LogisticCode, TaskId, ZoneId};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Default cleaning duration applied at ingestion when a task omits one.
pub const DEFAULT_CLEANING_MINUTES: u32 = 60;

/// Apartment type tag. Upper-cased and trimmed at ingestion per spec §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApartmentType {
    A,
    B,
    C,
    D,
    E,
    F,
    X,
}

impl ApartmentType {
    /// Parse an apartment type tag, trimming whitespace and upper-casing first.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            "F" => Some(Self::F),
            "X" => Some(Self::X),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ApartmentType {
    /// Routes through [`ApartmentType::parse`] so a tag like `"a"` or `" B "`
    /// is normalized instead of rejected (spec.md line 103).
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ApartmentType::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid apartment type tag: {raw:?}")))
    }
}

/// A task's preferred-window priority tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Early Out.
    Eo,
    /// High Priority.
    Hp,
    /// Low Priority.
    Lp,
}

/// Cleaner role. Premium tasks require a Premium cleaner (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Standard,
    Premium,
}

/// Cleaner contract class, gating which apartment types they may clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractClass {
    A,
    B,
    C,
    OnCall,
}

impl ContractClass {
    /// Whether a cleaner on this contract may be assigned the given apartment type,
    /// per the compatibility table in spec §4.5.
    pub fn accepts(self, apt: ApartmentType) -> bool {
        match self {
            ContractClass::OnCall | ContractClass::C => true,
            ContractClass::B => matches!(apt, ApartmentType::A | ApartmentType::B),
            ContractClass::A => matches!(apt, ApartmentType::A),
        }
    }
}

/// A single cleaning task, read-only input for the duration of a run.
///
/// Invariant: for a task to be schedulable it must have coordinates and a
/// cleaning duration; both are guaranteed non-null by the time a `Task`
/// reaches the core (ingestion applies [`DEFAULT_CLEANING_MINUTES`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub logistic_code: LogisticCode,
    pub lat: f64,
    pub lon: f64,
    pub client_id: i64,
    #[serde(default, deserialize_with = "crate::coerce::deserialize_lenient_bool")]
    pub premium: bool,
    #[serde(default, deserialize_with = "crate::coerce::deserialize_lenient_bool")]
    pub straordinaria: bool,
    pub apartment_type: ApartmentType,
    pub priority: Option<Priority>,
    #[serde(default = "default_cleaning_minutes")]
    pub cleaning_minutes: u32,
    pub checkout_time: Option<NaiveTime>,
    pub checkin_time: Option<NaiveTime>,
}

fn default_cleaning_minutes() -> u32 {
    DEFAULT_CLEANING_MINUTES
}

impl Task {
    /// Coordinates as a `(lat, lon)` pair, used throughout `geo`.
    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Whether this task has the data required to be scheduled at all.
    pub fn is_schedulable(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.cleaning_minutes > 0
    }
}

/// A roster member available to be assigned tasks for the day.
///
/// Invariant: the roster Phase 2 considers is exactly the day's
/// `selected_cleaners`; ordering within the roster does not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cleaner {
    pub id: CleanerId,
    pub name: String,
    pub role: Role,
    pub contract_class: ContractClass,
    #[serde(default, deserialize_with = "crate::coerce::deserialize_lenient_bool")]
    pub can_do_straordinaria: bool,
    #[serde(default)]
    pub preferred_customers: Vec<i64>,
    #[serde(default)]
    pub accumulated_hours: f64,
    pub day_start: NaiveTime,
}

impl Cleaner {
    pub fn prefers_client(&self, client_id: i64) -> bool {
        self.preferred_customers.contains(&client_id)
    }
}

/// A coordinate-bearing task's zone assignment, computed once per run by
/// `geo::zone_of` and cached alongside the task for Phase 1's bucketing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonedTask {
    pub task_id: TaskId,
    pub zone: ZoneId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apartment_type_deserializes_case_and_whitespace_loosely() {
        assert_eq!(serde_json::from_str::<ApartmentType>("\"a\"").unwrap(), ApartmentType::A);
        assert_eq!(serde_json::from_str::<ApartmentType>("\" B \"").unwrap(), ApartmentType::B);
        assert!(serde_json::from_str::<ApartmentType>("\"Q\"").is_err());
    }

    #[test]
    fn task_premium_and_straordinaria_accept_loosely_typed_booleans() {
        let raw = serde_json::json!({
            "id": 1,
            "logistic_code": 1,
            "lat": 45.0,
            "lon": 9.0,
            "client_id": 1,
            "premium": "yes",
            "straordinaria": 1,
            "apartment_type": "A",
            "priority": null,
            "checkout_time": null,
            "checkin_time": null,
        });
        let task: Task = serde_json::from_value(raw).unwrap();
        assert!(task.premium);
        assert!(task.straordinaria);
    }

    #[test]
    fn cleaner_can_do_straordinaria_accepts_loosely_typed_booleans() {
        let raw = serde_json::json!({
            "id": 1,
            "name": "Ana",
            "role": "Standard",
            "contract_class": "C",
            "can_do_straordinaria": "true",
            "day_start": "09:00:00",
        });
        let cleaner: Cleaner = serde_json::from_value(raw).unwrap();
        assert!(cleaner.can_do_straordinaria);
    }
}
