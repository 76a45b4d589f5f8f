//! Phase 3 output types (spec §3 "ScheduleRow").

use crate::ids::{CleanerId, LogisticCode, TaskId};
use crate::task::Priority;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One scheduled task within a cleaner's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub task_id: TaskId,
    pub logistic_code: LogisticCode,
    pub cleaner_id: CleanerId,
    /// 1-based position within the cleaner's day.
    pub sequence: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub travel_from_prev_min: i64,
    pub wait_min: i64,
    pub priority: Option<Priority>,
    pub priority_penalty: i64,
    pub reasons: Vec<String>,
}

/// A task that never became part of a feasible schedule, with the reason
/// code it was dropped under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedTask {
    pub task_id: TaskId,
    pub logistic_code: LogisticCode,
    pub reason_code: String,
    pub details: serde_json::Value,
}
