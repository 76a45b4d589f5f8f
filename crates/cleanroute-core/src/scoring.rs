//! Group compactness and cleaner-fit scorers (spec §4.2).

use crate::geo::round_1dp;
use cleanroute_domain::{CleanerScoreBreakdown, CleanerScoreWeights, GroupScoreBreakdown, GroupScoreWeights};

/// Score a candidate group's compactness.
///
/// `base − avg_travel_weight·avg_travel_min − max_travel_weight·max_travel_min
/// + (same_zone_bonus if all tasks share the seed's zone)`, rounded to 0.1.
pub fn score_group(
    avg_travel_min: f64,
    max_travel_min: i64,
    same_zone: bool,
    weights: GroupScoreWeights,
) -> GroupScoreBreakdown {
    GroupScoreBreakdown {
        base: weights.base,
        avg_travel_penalty: weights.avg_travel * avg_travel_min,
        max_travel_penalty: weights.max_travel * max_travel_min as f64,
        same_zone_bonus: if same_zone { weights.same_zone_bonus } else { 0.0 },
    }
}

/// Score a cleaner's fit for a group.
///
/// `base − travel_weight·travel_from_last_position_min − load_weight·current_load
/// + (preference_bonus if any task's client is preferred)`, rounded to 0.1.
pub fn score_cleaner(
    travel_from_last_position_min: i64,
    current_load: u32,
    preference_applies: bool,
    weights: CleanerScoreWeights,
) -> CleanerScoreBreakdown {
    CleanerScoreBreakdown {
        base: weights.base,
        travel_penalty: weights.travel * travel_from_last_position_min as f64,
        load_penalty: weights.load * current_load as f64,
        preference_bonus: if preference_applies { weights.preference_bonus } else { 0.0 },
    }
}

/// Round a total score to the spec's one-decimal precision.
pub fn rounded_total(total: f64) -> f64 {
    round_1dp(total)
}
