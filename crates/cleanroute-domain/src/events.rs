//! The decision log (spec §3 "Decision event", §6 "Event type enumeration").
//!
//! Events carry no timestamp; the monotonic id assigned by the store they
//! land in is the sole ordering key (spec §9 "Decision-log ordering").
//! Within one phase, emission order is algorithm order.

use crate::ids::RunId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Phase1,
    Phase2,
    Phase3,
}

impl Phase {
    pub fn as_number(self) -> u8 {
        match self {
            Phase::Phase1 => 1,
            Phase::Phase2 => 2,
            Phase::Phase3 => 3,
        }
    }
}

/// Exhaustive for the core, per spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Phase1GroupCandidate,
    Phase1GroupSingleCreated,
    Phase1UsedFallback20,
    Phase2CleanerCandidate,
    Phase2CleanerReject,
    Phase2GroupAssigned,
    Phase2TaskDropped,
    Phase2GroupUnassignedCandidate,
    Phase3GroupScheduled,
    Phase3TaskDroppedTime,
    Phase3TaskUnassignedFinal,
    Phase3SettingsFallbackUsed,
    Phase3NoSelectedCleaners,
    Phase3NoPhase2Assignments,
}

impl EventType {
    /// The `SCREAMING_SNAKE_CASE` wire name used in persisted payloads and
    /// logs, matching spec §6 verbatim.
    pub fn code(self) -> &'static str {
        match self {
            EventType::Phase1GroupCandidate => "PHASE1_GROUP_CANDIDATE",
            EventType::Phase1GroupSingleCreated => "PHASE1_GROUP_SINGLE_CREATED",
            EventType::Phase1UsedFallback20 => "PHASE1_USED_FALLBACK_20",
            EventType::Phase2CleanerCandidate => "PHASE2_CLEANER_CANDIDATE",
            EventType::Phase2CleanerReject => "PHASE2_CLEANER_REJECT",
            EventType::Phase2GroupAssigned => "PHASE2_GROUP_ASSIGNED",
            EventType::Phase2TaskDropped => "PHASE2_TASK_DROPPED",
            EventType::Phase2GroupUnassignedCandidate => "PHASE2_GROUP_UNASSIGNED_CANDIDATE",
            EventType::Phase3GroupScheduled => "PHASE3_GROUP_SCHEDULED",
            EventType::Phase3TaskDroppedTime => "PHASE3_TASK_DROPPED_TIME",
            EventType::Phase3TaskUnassignedFinal => "PHASE3_TASK_UNASSIGNED_FINAL",
            EventType::Phase3SettingsFallbackUsed => "PHASE3_SETTINGS_FALLBACK_USED",
            EventType::Phase3NoSelectedCleaners => "PHASE3_NO_SELECTED_CLEANERS",
            EventType::Phase3NoPhase2Assignments => "PHASE3_NO_PHASE2_ASSIGNMENTS",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            EventType::Phase1GroupCandidate
            | EventType::Phase1GroupSingleCreated
            | EventType::Phase1UsedFallback20 => Phase::Phase1,
            EventType::Phase2CleanerCandidate
            | EventType::Phase2CleanerReject
            | EventType::Phase2GroupAssigned
            | EventType::Phase2TaskDropped
            | EventType::Phase2GroupUnassignedCandidate => Phase::Phase2,
            EventType::Phase3GroupScheduled
            | EventType::Phase3TaskDroppedTime
            | EventType::Phase3TaskUnassignedFinal
            | EventType::Phase3SettingsFallbackUsed
            | EventType::Phase3NoSelectedCleaners
            | EventType::Phase3NoPhase2Assignments => Phase::Phase3,
        }
    }
}

/// A single append-only decision log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub run_id: RunId,
    pub phase: Phase,
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

impl DecisionEvent {
    pub fn new(run_id: RunId, event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            run_id,
            phase: event_type.phase(),
            event_type,
            payload,
        }
    }
}
