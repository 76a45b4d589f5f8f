//! Phase 1/2 intermediate types (spec §3 "CandidateGroup", "AssignmentCandidate").

use crate::ids::{CleanerId, TaskId, ZoneId};
use serde::{Deserialize, Serialize};

/// A Phase 1 candidate bundle of 1-4 co-visitable tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateGroup {
    /// Sorted, deduplicated task identifiers. Size 1-4.
    pub task_ids: Vec<TaskId>,
    pub seed: TaskId,
    pub zone: ZoneId,
    /// Average pairwise travel minutes, rounded to 0.1.
    pub avg_travel_min: f64,
    /// Maximum pairwise travel minutes, integer.
    pub max_travel_min: i64,
    /// Group compactness score, rounded to 0.1.
    pub score: f64,
    pub is_single: bool,
}

impl CandidateGroup {
    /// The canonical dedupe/tie-break key: the sorted task id tuple.
    pub fn canonical_key(&self) -> &[TaskId] {
        &self.task_ids
    }

    pub fn size(&self) -> usize {
        self.task_ids.len()
    }
}

/// Breakdown of the cleaner-fit scorer (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleanerScoreBreakdown {
    pub base: f64,
    pub travel_penalty: f64,
    pub load_penalty: f64,
    pub preference_bonus: f64,
}

impl CleanerScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base - self.travel_penalty - self.load_penalty + self.preference_bonus
    }
}

/// Breakdown of the group compactness scorer (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupScoreBreakdown {
    pub base: f64,
    pub avg_travel_penalty: f64,
    pub max_travel_penalty: f64,
    pub same_zone_bonus: f64,
}

impl GroupScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base - self.avg_travel_penalty - self.max_travel_penalty + self.same_zone_bonus
    }
}

/// A Phase 2 candidate: one cleaner considered for a group, with enough
/// detail to reconstruct why it scored the way it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentCandidate {
    pub cleaner_id: CleanerId,
    pub score: f64,
    pub travel_from_last_position_min: i64,
    pub current_load: u32,
    pub preference_applied: bool,
    pub breakdown: CleanerScoreBreakdown,
}
