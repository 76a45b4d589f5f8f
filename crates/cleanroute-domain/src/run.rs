//! Run record (spec §3 "Run", §6 "Outputs of a run").

use crate::ids::RunId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

/// Per-phase counters attached to a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tasks_loaded: u32,
    pub groups_generated: u32,
    pub groups_assigned: u32,
    pub tasks_scheduled: u32,
    pub tasks_unassigned: u32,
    pub duration_ms: u64,
}

/// A single optimizer invocation. Exactly one status update follows creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: RunId,
    pub work_date: NaiveDate,
    pub algorithm_version: String,
    pub params: serde_json::Value,
    pub status: RunStatus,
    pub summary: RunSummary,
    pub created_at: DateTime<Utc>,
}
