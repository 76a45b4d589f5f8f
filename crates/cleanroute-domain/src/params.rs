//! Tuning parameters for the three phases (spec §4.4, §4.5, §4.3, §6).

use serde::{Deserialize, Serialize};

/// Phase 1 candidate group generator parameters (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase1Params {
    pub max_apts: usize,
    pub allow_fourth_if_travel_le_min: i64,
    pub neighbor_limit: usize,
    pub nearby_seed_max_min: i64,
    pub fallback_seed_max_min: i64,
    pub max_groups_total: usize,
    pub use_adjacent_zones: bool,
}

impl Default for Phase1Params {
    fn default() -> Self {
        Self {
            max_apts: 3,
            allow_fourth_if_travel_le_min: 5,
            neighbor_limit: 15,
            nearby_seed_max_min: 12,
            fallback_seed_max_min: 20,
            max_groups_total: 3000,
            use_adjacent_zones: true,
        }
    }
}

/// Cleaner-fit scoring weights (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerScoreWeights {
    pub base: f64,
    pub travel: f64,
    pub load: f64,
    pub preference_bonus: f64,
}

impl Default for CleanerScoreWeights {
    fn default() -> Self {
        Self {
            base: 100.0,
            travel: 2.0,
            load: 5.0,
            preference_bonus: 10.0,
        }
    }
}

/// Group compactness scoring weights (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupScoreWeights {
    pub base: f64,
    pub avg_travel: f64,
    pub max_travel: f64,
    pub same_zone_bonus: f64,
}

impl Default for GroupScoreWeights {
    fn default() -> Self {
        Self {
            base: 100.0,
            avg_travel: 2.0,
            max_travel: 3.0,
            same_zone_bonus: 10.0,
        }
    }
}

/// Phase 2 group-to-cleaner assigner parameters (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase2Params {
    pub max_cleaner_load: u32,
    pub cleaner_score_weights: CleanerScoreWeights,
}

impl Default for Phase2Params {
    fn default() -> Self {
        Self {
            max_cleaner_load: 6,
            cleaner_score_weights: CleanerScoreWeights::default(),
        }
    }
}

/// One priority's preferred-start-window penalty configuration (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWindow {
    /// Minutes from midnight, inclusive lower bound.
    pub start_min: i64,
    /// Minutes from midnight, inclusive upper bound. `None` means open-ended (LP).
    pub end_min: Option<i64>,
    /// Grace padding applied on both sides of the window before penalty accrues.
    pub grace_min: i64,
    pub k: f64,
    pub cap: f64,
}

/// The three priorities' windows, loaded with defaults per spec §4.3's table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWindows {
    pub eo: PriorityWindow,
    pub hp: PriorityWindow,
    pub lp: PriorityWindow,
}

impl Default for PriorityWindows {
    fn default() -> Self {
        Self {
            eo: PriorityWindow {
                start_min: 600,
                end_min: Some(659),
                grace_min: 0,
                k: 2.0,
                cap: 120.0,
            },
            hp: PriorityWindow {
                start_min: 660,
                end_min: Some(930),
                grace_min: 0,
                k: 1.0,
                cap: 90.0,
            },
            lp: PriorityWindow {
                start_min: 660,
                end_min: None,
                grace_min: 0,
                k: 1.0,
                cap: 60.0,
            },
        }
    }
}

/// Phase 3 per-cleaner scheduler parameters (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase3Params {
    pub priority_windows: PriorityWindows,
}

impl Default for Phase3Params {
    fn default() -> Self {
        Self {
            priority_windows: PriorityWindows::default(),
        }
    }
}
