//! Priority-window penalty computation (spec §4.3).

use cleanroute_domain::{Priority, PriorityWindow, PriorityWindows};
use serde::Serialize;

/// Reason code for an out-of-window start, or `None` when the start fell
/// inside the preferred window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PenaltyReason {
    EoOutOfPreferredStartWindow,
    HpOutOfPreferredStartWindow,
    LpBeforeMinStart,
}

impl PenaltyReason {
    pub fn code(self) -> &'static str {
        match self {
            PenaltyReason::EoOutOfPreferredStartWindow => "EO_OUT_OF_PREFERRED_START_WINDOW",
            PenaltyReason::HpOutOfPreferredStartWindow => "HP_OUT_OF_PREFERRED_START_WINDOW",
            PenaltyReason::LpBeforeMinStart => "LP_BEFORE_MIN_START",
        }
    }
}

/// The result of evaluating a scheduled start against its priority's window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyOutcome {
    pub penalty: i64,
    pub reason: Option<PenaltyReason>,
}

fn window_for(priority: Priority, windows: &PriorityWindows) -> PriorityWindow {
    match priority {
        Priority::Eo => windows.eo,
        Priority::Hp => windows.hp,
        Priority::Lp => windows.lp,
    }
}

fn reason_for(priority: Priority) -> PenaltyReason {
    match priority {
        Priority::Eo => PenaltyReason::EoOutOfPreferredStartWindow,
        Priority::Hp => PenaltyReason::HpOutOfPreferredStartWindow,
        Priority::Lp => PenaltyReason::LpBeforeMinStart,
    }
}

/// Distance from `start_min` to the nearest point of `[start-grace, end+grace]`
/// (or `[start-grace, +inf)` when `end` is absent), zero when inside.
fn distance_to_window(start_min: i64, window: &PriorityWindow) -> i64 {
    let lower = window.start_min - window.grace_min;
    match window.end_min {
        Some(end) => {
            let upper = end + window.grace_min;
            if start_min < lower {
                lower - start_min
            } else if start_min > upper {
                start_min - upper
            } else {
                0
            }
        }
        None => {
            if start_min < lower {
                lower - start_min
            } else {
                0
            }
        }
    }
}

/// Compute the penalty for a task scheduled to start at `start_min` (minutes
/// from midnight) given its priority (spec §4.3's penalty function).
pub fn compute_penalty(
    priority: Priority,
    start_min: i64,
    windows: &PriorityWindows,
) -> PenaltyOutcome {
    let window = window_for(priority, windows);
    let distance = distance_to_window(start_min, &window);
    if distance == 0 {
        return PenaltyOutcome { penalty: 0, reason: None };
    }
    let penalty = (window.k * distance as f64).min(window.cap).round() as i64;
    PenaltyOutcome {
        penalty,
        reason: Some(reason_for(priority)),
    }
}
