//! Per-cleaner permutation-based sequencing with a per-group drop cascade
//! (spec §4.6).

use crate::geo::travel_minutes;
use crate::phase2::GroupAssignment;
use crate::priority::compute_penalty;
use cleanroute_domain::{
    Cleaner, CleanerId, DecisionEvent, EventType, Phase3Params, RunId, ScheduleRow, Task, TaskId,
    UnassignedTask,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use itertools::Itertools;
use std::collections::BTreeMap;

pub struct Phase3Output {
    pub rows: Vec<ScheduleRow>,
    pub unassigned: Vec<UnassignedTask>,
    pub events: Vec<DecisionEvent>,
}

struct RowDraft {
    task_id: TaskId,
    start_min: i64,
    end_min: i64,
    travel_min: i64,
    wait_min: i64,
    priority_penalty: i64,
    reasons: Vec<String>,
}

struct SimResult {
    rows: Vec<RowDraft>,
    end_min: i64,
    total_penalty: i64,
    total_wait: i64,
    total_travel: i64,
}

fn minutes_of(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 / 60
}

/// Simulate one ordered permutation of tasks starting at `start_min` with an
/// optional preceding task (spec §4.6 "Simulation of a sequence").
fn simulate(
    order: &[TaskId],
    start_min: i64,
    previous: Option<&Task>,
    tasks: &BTreeMap<TaskId, &Task>,
    windows: &Phase3Params,
) -> Option<SimResult> {
    let mut current = start_min;
    let mut prev = previous;
    let mut rows = Vec::with_capacity(order.len());
    let mut total_penalty = 0;
    let mut total_wait = 0;
    let mut total_travel = 0;

    for &task_id in order {
        let task = tasks[&task_id];
        let travel = match prev {
            Some(p) => travel_minutes(p.coords(), task.coords()),
            None => 0,
        };
        total_travel += travel;
        let arrival = current + travel;
        let earliest_start = match task.checkout_time {
            Some(co) => arrival.max(minutes_of(co)),
            None => arrival,
        };
        let wait = earliest_start - arrival;
        total_wait += wait;
        let end = earliest_start + task.cleaning_minutes as i64;
        if let Some(checkin) = task.checkin_time {
            if end > minutes_of(checkin) {
                return None;
            }
        }

        let mut reasons = Vec::new();
        let penalty = match task.priority {
            Some(priority) => {
                let outcome = compute_penalty(priority, earliest_start, &windows.priority_windows);
                if let Some(reason) = outcome.reason {
                    reasons.push(reason.code().to_string());
                }
                outcome.penalty
            }
            None => 0,
        };
        total_penalty += penalty;

        rows.push(RowDraft {
            task_id,
            start_min: earliest_start,
            end_min: end,
            travel_min: travel,
            wait_min: wait,
            priority_penalty: penalty,
            reasons,
        });

        current = end;
        prev = Some(task);
    }

    Some(SimResult { rows, end_min: current, total_penalty, total_wait, total_travel })
}

/// Try every permutation of `task_ids`, keep the lexicographically best
/// feasible one (spec §4.6 "Group scheduling" steps 1-2).
fn best_permutation(
    task_ids: &[TaskId],
    start_min: i64,
    previous: Option<&Task>,
    tasks: &BTreeMap<TaskId, &Task>,
    windows: &Phase3Params,
) -> Option<SimResult> {
    task_ids
        .iter()
        .copied()
        .permutations(task_ids.len())
        .filter_map(|order| simulate(&order, start_min, previous, tasks, windows))
        .min_by(|a, b| {
            a.end_min
                .cmp(&b.end_min)
                .then(a.total_penalty.cmp(&b.total_penalty))
                .then(a.total_wait.cmp(&b.total_wait))
                .then(a.total_travel.cmp(&b.total_travel))
        })
}

/// Resolve a group into a feasible schedule, dropping the minimum number of
/// tasks necessary (spec §4.6 step 4, "drop cascade").
fn schedule_with_drop_cascade(
    task_ids: &[TaskId],
    start_min: i64,
    previous: Option<&Task>,
    tasks: &BTreeMap<TaskId, &Task>,
    windows: &Phase3Params,
) -> Option<(SimResult, Vec<TaskId>)> {
    if let Some(result) = best_permutation(task_ids, start_min, previous, tasks, windows) {
        return Some((result, Vec::new()));
    }
    for drop_size in 1..task_ids.len() {
        for dropped in task_ids.iter().copied().combinations(drop_size) {
            let remaining: Vec<TaskId> =
                task_ids.iter().copied().filter(|id| !dropped.contains(id)).collect();
            if let Some(result) = best_permutation(&remaining, start_min, previous, tasks, windows) {
                return Some((result, dropped));
            }
        }
    }
    None
}

/// Schedule every group assigned to one cleaner into a single ordered day.
fn schedule_cleaner_day(
    run_id: RunId,
    cleaner: &Cleaner,
    work_date: NaiveDate,
    groups: &[Vec<TaskId>],
    tasks: &BTreeMap<TaskId, &Task>,
    windows: &Phase3Params,
) -> (Vec<ScheduleRow>, Vec<UnassignedTask>, Vec<DecisionEvent>) {
    let mut rows = Vec::new();
    let mut unassigned = Vec::new();
    let mut events = Vec::new();
    let mut current_min = minutes_of(cleaner.day_start);
    let mut previous: Option<&Task> = None;
    let mut sequence: u32 = 1;

    for group in groups {
        match schedule_with_drop_cascade(group, current_min, previous, tasks, windows) {
            Some((result, dropped)) => {
                for row in &result.rows {
                    let task = tasks[&row.task_id];
                    rows.push(ScheduleRow {
                        task_id: row.task_id,
                        logistic_code: task.logistic_code,
                        cleaner_id: cleaner.id,
                        sequence,
                        start: NaiveDateTime::new(work_date, minutes_to_time(row.start_min)),
                        end: NaiveDateTime::new(work_date, minutes_to_time(row.end_min)),
                        travel_from_prev_min: row.travel_min,
                        wait_min: row.wait_min,
                        priority: task.priority,
                        priority_penalty: row.priority_penalty,
                        reasons: row.reasons.clone(),
                    });
                    sequence += 1;
                }
                for dropped_id in &dropped {
                    events.push(DecisionEvent::new(
                        run_id,
                        EventType::Phase3TaskDroppedTime,
                        serde_json::json!({
                            "task_id": dropped_id,
                            "cleaner_id": cleaner.id,
                            "group": group,
                        }),
                    ));
                    unassigned.push(UnassignedTask {
                        task_id: *dropped_id,
                        logistic_code: tasks[dropped_id].logistic_code,
                        reason_code: "TIME_WINDOW_IMPOSSIBLE".to_string(),
                        details: serde_json::json!({ "cleaner_id": cleaner.id, "group": group }),
                    });
                }
                events.push(DecisionEvent::new(
                    run_id,
                    EventType::Phase3GroupScheduled,
                    serde_json::json!({
                        "cleaner_id": cleaner.id,
                        "group": group,
                        "end_min": result.end_min,
                        "total_penalty": result.total_penalty,
                        "total_wait": result.total_wait,
                        "total_travel": result.total_travel,
                        "dropped": dropped,
                    }),
                ));
                current_min = result.end_min;
                if let Some(last_row) = result.rows.last() {
                    previous = Some(tasks[&last_row.task_id]);
                }
            }
            None => {
                // A single-task group has exactly one "permutation"; its only
                // possible failure is the checkin-time check in `simulate`
                // (spec §8 scenario 3), so that is the reason reported rather
                // than the general multi-task exhaustion reason below.
                let reason = if group.len() == 1 { "TIME_WINDOW_IMPOSSIBLE" } else { "ALL_PERMUTATIONS_FAILED" };
                for task_id in group {
                    events.push(DecisionEvent::new(
                        run_id,
                        EventType::Phase3TaskUnassignedFinal,
                        serde_json::json!({
                            "task_id": task_id,
                            "cleaner_id": cleaner.id,
                            "reason": reason,
                        }),
                    ));
                    unassigned.push(UnassignedTask {
                        task_id: *task_id,
                        logistic_code: tasks[task_id].logistic_code,
                        reason_code: reason.to_string(),
                        details: serde_json::json!({
                            "cleaner_id": cleaner.id,
                            "group": group,
                            "permutations_checked": factorial(group.len()),
                        }),
                    });
                }
            }
        }
    }

    (rows, unassigned, events)
}

fn factorial(n: usize) -> u64 {
    (1..=n as u64).product::<u64>().max(1)
}

fn minutes_to_time(minutes: i64) -> NaiveTime {
    let clamped = minutes.rem_euclid(24 * 60);
    NaiveTime::from_hms_opt((clamped / 60) as u32, (clamped % 60) as u32, 0).unwrap()
}

/// Schedule every cleaner's assigned groups into an ordered day (spec §4.7).
pub fn schedule_all(
    run_id: RunId,
    work_date: NaiveDate,
    assignments: &[GroupAssignment],
    tasks: &[Task],
    cleaners: &[Cleaner],
    params: &Phase3Params,
) -> Phase3Output {
    let task_by_id: BTreeMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let cleaner_by_id: BTreeMap<CleanerId, &Cleaner> = cleaners.iter().map(|c| (c.id, c)).collect();

    if cleaners.is_empty() {
        return Phase3Output {
            rows: Vec::new(),
            unassigned: Vec::new(),
            events: vec![DecisionEvent::new(
                run_id,
                EventType::Phase3NoSelectedCleaners,
                serde_json::json!({}),
            )],
        };
    }

    if assignments.is_empty() {
        return Phase3Output {
            rows: Vec::new(),
            unassigned: Vec::new(),
            events: vec![DecisionEvent::new(
                run_id,
                EventType::Phase3NoPhase2Assignments,
                serde_json::json!({}),
            )],
        };
    }

    let mut groups_by_cleaner: BTreeMap<CleanerId, Vec<Vec<TaskId>>> = BTreeMap::new();
    for assignment in assignments {
        groups_by_cleaner
            .entry(assignment.cleaner_id)
            .or_default()
            .push(assignment.task_ids.clone());
    }

    let mut rows = Vec::new();
    let mut unassigned = Vec::new();
    let mut events = Vec::new();

    for (cleaner_id, groups) in &groups_by_cleaner {
        let Some(cleaner) = cleaner_by_id.get(cleaner_id) else { continue };
        let (c_rows, c_unassigned, c_events) =
            schedule_cleaner_day(run_id, cleaner, work_date, groups, &task_by_id, params);
        rows.extend(c_rows);
        unassigned.extend(c_unassigned);
        events.extend(c_events);
    }

    Phase3Output { rows, unassigned, events }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanroute_domain::{ApartmentType, LogisticCode, Role, ContractClass, Priority};

    fn task(id: i64, checkout: Option<(u32, u32)>, checkin: Option<(u32, u32)>, minutes: u32) -> Task {
        Task {
            id: TaskId(id),
            logistic_code: LogisticCode(id),
            lat: 45.0 + id as f64 * 0.001,
            lon: 9.0,
            client_id: id,
            premium: false,
            straordinaria: false,
            apartment_type: ApartmentType::A,
            priority: None::<Priority>,
            cleaning_minutes: minutes,
            checkout_time: checkout.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            checkin_time: checkin.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
        }
    }

    fn cleaner() -> Cleaner {
        Cleaner {
            id: CleanerId(1),
            name: "c1".into(),
            role: Role::Standard,
            contract_class: ContractClass::C,
            can_do_straordinaria: false,
            preferred_customers: vec![],
            accumulated_hours: 0.0,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn checkin_violation_drops_sole_task() {
        let tasks = vec![task(1, None, Some((10, 0)), 90)];
        let task_map: BTreeMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
        let result = schedule_with_drop_cascade(
            &[TaskId(1)],
            9 * 60,
            None,
            &task_map,
            &Phase3Params::default(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn sole_checkin_violation_is_reported_as_time_window_impossible() {
        let c = cleaner();
        let tasks = vec![task(1, None, Some((10, 0)), 90)];
        let assignments =
            vec![GroupAssignment { cleaner_id: c.id, task_ids: vec![TaskId(1)] }];
        let output = schedule_all(
            RunId::new(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            &assignments,
            &tasks,
            &[c],
            &Phase3Params::default(),
        );
        assert!(output.rows.is_empty());
        assert_eq!(output.unassigned.len(), 1);
        assert_eq!(output.unassigned[0].reason_code, "TIME_WINDOW_IMPOSSIBLE");
    }

    #[test]
    fn two_feasible_tasks_schedule_in_sequence() {
        let c = cleaner();
        let tasks = vec![task(1, None, None, 60), task(2, None, None, 60)];
        let assignments = vec![GroupAssignment {
            cleaner_id: c.id,
            task_ids: vec![TaskId(1), TaskId(2)],
        }];
        let output = schedule_all(
            RunId::new(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            &assignments,
            &tasks,
            &[c],
            &Phase3Params::default(),
        );
        assert_eq!(output.rows.len(), 2);
        assert!(output.unassigned.is_empty());
        assert_eq!(output.rows[0].sequence, 1);
        assert_eq!(output.rows[1].sequence, 2);
        assert!(output.rows[1].start >= output.rows[0].end);
    }
}
