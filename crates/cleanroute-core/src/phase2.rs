//! Group-to-cleaner assignment with a drop-cascade retry policy (spec §4.5).

use crate::geo::travel_minutes;
use crate::scoring::{rounded_total, score_cleaner};
use cleanroute_domain::{
    ApartmentType, CandidateGroup, Cleaner, CleanerId, ContractClass, DecisionEvent, EventType,
    Phase2Params, Role, RunId, Task, TaskId,
};
use std::collections::{BTreeMap, BTreeSet};

/// A group accepted by Phase 2, possibly a proper subset of its Phase-1
/// `task_ids` after a drop cascade.
#[derive(Debug, Clone)]
pub struct GroupAssignment {
    pub cleaner_id: CleanerId,
    pub task_ids: Vec<TaskId>,
}

pub struct Phase2Output {
    pub assignments: Vec<GroupAssignment>,
    pub unassigned: Vec<(TaskId, String, serde_json::Value)>,
    pub events: Vec<DecisionEvent>,
}

fn apt_letter(apt: ApartmentType) -> &'static str {
    match apt {
        ApartmentType::A => "A",
        ApartmentType::B => "B",
        ApartmentType::C => "C",
        ApartmentType::D => "D",
        ApartmentType::E => "E",
        ApartmentType::F => "F",
        ApartmentType::X => "X",
    }
}

fn contract_letter(cc: ContractClass) -> &'static str {
    match cc {
        ContractClass::A => "A",
        ContractClass::B => "B",
        ContractClass::C => "C",
        ContractClass::OnCall => "ONCALL",
    }
}

/// Check one task's compatibility with one cleaner (spec §4.5's table).
fn task_incompatibility(cleaner: &Cleaner, task: &Task) -> Option<String> {
    if task.premium && cleaner.role != Role::Premium {
        return Some("ROLE_MISMATCH_PREMIUM_REQUIRED".to_string());
    }
    if task.straordinaria && !cleaner.can_do_straordinaria {
        return Some("CANNOT_DO_STRAORDINARIA".to_string());
    }
    if !cleaner.contract_class.accepts(task.apartment_type) {
        return Some(format!(
            "CONTRACT_APT_MISMATCH_{}_vs_{}",
            contract_letter(cleaner.contract_class),
            apt_letter(task.apartment_type)
        ));
    }
    None
}

/// First violation found across the group's tasks, if any.
fn group_incompatibility(cleaner: &Cleaner, tasks: &[&Task]) -> Option<String> {
    tasks.iter().find_map(|t| task_incompatibility(cleaner, t))
}

struct CleanerState {
    load: u32,
    last_position: Option<(f64, f64)>,
}

/// Run Phase 2 over the groups Phase 1 produced, in the order given (already
/// sorted by Phase-1 score descending).
pub fn assign_groups(
    run_id: RunId,
    groups: &[CandidateGroup],
    tasks: &[Task],
    cleaners: &[Cleaner],
    params: &Phase2Params,
) -> Phase2Output {
    let task_by_id: BTreeMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let mut events = Vec::new();
    let mut assignments = Vec::new();
    let mut unassigned = Vec::new();

    if cleaners.is_empty() {
        let all_task_ids: Vec<TaskId> = groups.iter().flat_map(|g| g.task_ids.clone()).collect();
        events.push(DecisionEvent::new(
            run_id,
            EventType::Phase2GroupUnassignedCandidate,
            serde_json::json!({ "reason": "NO_SELECTED_CLEANERS", "task_count": all_task_ids.len() }),
        ));
        for task_id in all_task_ids {
            if let Some(task) = task_by_id.get(&task_id) {
                unassigned.push((
                    task_id,
                    "NO_SELECTED_CLEANERS".to_string(),
                    serde_json::json!({ "logistic_code": task.logistic_code }),
                ));
            }
        }
        return Phase2Output { assignments, unassigned, events };
    }

    let mut states: BTreeMap<CleanerId, CleanerState> = cleaners
        .iter()
        .map(|c| (c.id, CleanerState { load: 0, last_position: None }))
        .collect();
    let mut claimed: BTreeSet<TaskId> = BTreeSet::new();

    for group in groups {
        let mut current: Vec<TaskId> =
            group.task_ids.iter().copied().filter(|id| !claimed.contains(id)).collect();
        if current.is_empty() {
            continue;
        }

        loop {
            let current_tasks: Vec<&Task> =
                current.iter().filter_map(|id| task_by_id.get(id).copied()).collect();

            let mut compatible: Vec<&Cleaner> = Vec::new();
            let mut rejections: Vec<(CleanerId, String)> = Vec::new();
            for cleaner in cleaners {
                let load = states[&cleaner.id].load;
                if load >= params.max_cleaner_load {
                    rejections.push((cleaner.id, "MAX_LOAD_REACHED".to_string()));
                    continue;
                }
                match group_incompatibility(cleaner, &current_tasks) {
                    None => compatible.push(cleaner),
                    Some(reason) => rejections.push((cleaner.id, reason)),
                }
            }

            rejections.sort_by_key(|(id, _)| *id);
            for (cleaner_id, reason) in rejections.iter().take(3) {
                events.push(DecisionEvent::new(
                    run_id,
                    EventType::Phase2CleanerReject,
                    serde_json::json!({
                        "group": current,
                        "cleaner_id": cleaner_id,
                        "reason": reason,
                    }),
                ));
            }

            if !compatible.is_empty() {
                let mut scored: Vec<(CleanerId, f64, i64, bool, cleanroute_domain::CleanerScoreBreakdown)> =
                    compatible
                        .iter()
                        .map(|cleaner| {
                            let state = &states[&cleaner.id];
                            let travel = match state.last_position {
                                Some(last) => {
                                    let target_id = current.iter().min().unwrap();
                                    let target = task_by_id[target_id];
                                    travel_minutes(last, target.coords())
                                }
                                None => 0,
                            };
                            let preference_applies = current_tasks
                                .iter()
                                .any(|t| cleaner.prefers_client(t.client_id));
                            let breakdown = score_cleaner(
                                travel,
                                state.load,
                                preference_applies,
                                params.cleaner_score_weights,
                            );
                            (cleaner.id, rounded_total(breakdown.total()), travel, preference_applies, breakdown)
                        })
                        .collect();

                scored.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1)
                        .unwrap()
                        .then_with(|| states[&a.0].load.cmp(&states[&b.0].load))
                        .then_with(|| a.0.cmp(&b.0))
                });

                for (cleaner_id, score, travel, preference_applies, breakdown) in scored.iter().take(3) {
                    events.push(DecisionEvent::new(
                        run_id,
                        EventType::Phase2CleanerCandidate,
                        serde_json::json!({
                            "group": current,
                            "cleaner_id": cleaner_id,
                            "score": score,
                            "travel_from_last_position_min": travel,
                            "current_load": states[cleaner_id].load,
                            "preference_applied": preference_applies,
                            "breakdown": breakdown,
                        }),
                    ));
                }

                let (winner, ..) = scored[0];
                let last_task_id = *current.iter().max().unwrap();
                let last_task = task_by_id[&last_task_id];
                {
                    let state = states.get_mut(&winner).unwrap();
                    state.load += current.len() as u32;
                    state.last_position = Some(last_task.coords());
                }

                events.push(DecisionEvent::new(
                    run_id,
                    EventType::Phase2GroupAssigned,
                    serde_json::json!({ "group": current, "cleaner_id": winner }),
                ));

                for id in &current {
                    claimed.insert(*id);
                }
                assignments.push(GroupAssignment { cleaner_id: winner, task_ids: current.clone() });
                break;
            }

            if current.len() > 1 {
                let mut best: Option<(TaskId, usize, usize, Vec<TaskId>)> = None;
                for &candidate in &current {
                    let subgroup: Vec<TaskId> =
                        current.iter().copied().filter(|id| *id != candidate).collect();
                    let subgroup_tasks: Vec<&Task> =
                        subgroup.iter().filter_map(|id| task_by_id.get(id).copied()).collect();
                    let accepting = cleaners
                        .iter()
                        .filter(|c| {
                            states[&c.id].load < params.max_cleaner_load
                                && group_incompatibility(c, &subgroup_tasks).is_none()
                        })
                        .count();
                    let candidate_task = task_by_id[&candidate];
                    let widely_incompatible = cleaners
                        .iter()
                        .filter(|c| task_incompatibility(c, candidate_task).is_some())
                        .count();
                    let better = match &best {
                        None => true,
                        Some((_, best_accepting, best_incompat, _)) => {
                            accepting > *best_accepting
                                || (accepting == *best_accepting && widely_incompatible > *best_incompat)
                        }
                    };
                    if better {
                        best = Some((candidate, accepting, widely_incompatible, subgroup));
                    }
                }

                let (dropped, accepting_count, widely_incompatible, subgroup) = best.unwrap();
                let reason = if widely_incompatible == cleaners.len() {
                    "LOW_CLEANER_COMPATIBILITY"
                } else {
                    "REDUCES_GROUP_COMPATIBILITY"
                };
                events.push(DecisionEvent::new(
                    run_id,
                    EventType::Phase2TaskDropped,
                    serde_json::json!({
                        "task_id": dropped,
                        "retained_subgroup": subgroup,
                        "reason": reason,
                        "cleaners_that_would_accept": accepting_count,
                    }),
                ));
                unassigned.push((
                    dropped,
                    reason.to_string(),
                    serde_json::json!({ "retained_subgroup": subgroup }),
                ));
                claimed.insert(dropped);
                current = subgroup;
                continue;
            }

            let lone = current[0];
            let lone_task = task_by_id[&lone];
            // `rejections` here all describe why cleaners turned down this
            // same lone task; any compatibility-specific reason (as opposed
            // to a load-capacity rejection) is representative.
            let reason = rejections
                .iter()
                .map(|(_, r)| r.clone())
                .find(|r| r != "MAX_LOAD_REACHED")
                .unwrap_or_else(|| "NO_COMPATIBLE_CLEANER".to_string());
            events.push(DecisionEvent::new(
                run_id,
                EventType::Phase2GroupUnassignedCandidate,
                serde_json::json!({ "task_id": lone, "reason": reason }),
            ));
            unassigned.push((
                lone,
                reason,
                serde_json::json!({ "logistic_code": lone_task.logistic_code }),
            ));
            claimed.insert(lone);
            break;
        }
    }

    Phase2Output { assignments, unassigned, events }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanroute_domain::{ApartmentType, CandidateGroup, LogisticCode, Priority};
    use chrono::NaiveTime;

    fn task(id: i64, apt: ApartmentType, premium: bool) -> Task {
        Task {
            id: TaskId(id),
            logistic_code: LogisticCode(id),
            lat: 45.0,
            lon: 9.0,
            client_id: id,
            premium,
            straordinaria: false,
            apartment_type: apt,
            priority: None::<Priority>,
            cleaning_minutes: 60,
            checkout_time: None,
            checkin_time: None,
        }
    }

    fn cleaner(id: i64, role: Role, contract: ContractClass) -> Cleaner {
        Cleaner {
            id: CleanerId(id),
            name: format!("cleaner-{id}"),
            role,
            contract_class: contract,
            can_do_straordinaria: false,
            preferred_customers: vec![],
            accumulated_hours: 0.0,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn group(ids: &[i64]) -> CandidateGroup {
        CandidateGroup {
            task_ids: ids.iter().map(|i| TaskId(*i)).collect(),
            seed: TaskId(ids[0]),
            zone: cleanroute_domain::ZoneId(0),
            avg_travel_min: 1.0,
            max_travel_min: 1,
            score: 100.0,
            is_single: ids.len() == 1,
        }
    }

    #[test]
    fn incompatible_apartment_is_unassigned() {
        let tasks = vec![task(1, ApartmentType::B, false)];
        let cleaners = vec![cleaner(1, Role::Standard, ContractClass::A)];
        let groups = vec![group(&[1])];
        let output =
            assign_groups(RunId::new(), &groups, &tasks, &cleaners, &Phase2Params::default());
        assert!(output.assignments.is_empty());
        assert_eq!(output.unassigned.len(), 1);
        assert_eq!(output.unassigned[0].1, "CONTRACT_APT_MISMATCH_A_vs_B");
    }

    #[test]
    fn compatible_group_is_assigned_whole() {
        let tasks = vec![task(1, ApartmentType::A, false), task(2, ApartmentType::A, false)];
        let cleaners = vec![cleaner(1, Role::Standard, ContractClass::C)];
        let groups = vec![group(&[1, 2])];
        let output =
            assign_groups(RunId::new(), &groups, &tasks, &cleaners, &Phase2Params::default());
        assert_eq!(output.assignments.len(), 1);
        assert_eq!(output.assignments[0].task_ids, vec![TaskId(1), TaskId(2)]);
        assert!(output.unassigned.is_empty());
    }

    #[test]
    fn premium_task_without_premium_cleaner_drops() {
        let tasks = vec![
            task(1, ApartmentType::A, false),
            task(2, ApartmentType::A, false),
            task(3, ApartmentType::A, true),
        ];
        let cleaners = vec![cleaner(1, Role::Standard, ContractClass::C)];
        let groups = vec![group(&[1, 2, 3])];
        let output =
            assign_groups(RunId::new(), &groups, &tasks, &cleaners, &Phase2Params::default());
        assert_eq!(output.assignments.len(), 1);
        assert_eq!(output.assignments[0].task_ids, vec![TaskId(1), TaskId(2)]);
        assert_eq!(output.unassigned.len(), 1);
        assert_eq!(output.unassigned[0].0, TaskId(3));
    }
}
