//! Candidate group generation (spec §4.4).

use crate::geo::{adjacent_zones, travel_minutes, zone_of};
use crate::scoring::{rounded_total, score_group};
use cleanroute_domain::{
    CandidateGroup, DecisionEvent, EventType, GroupScoreWeights, Phase1Params, RunId, Task, TaskId,
    ZoneId, ZONE_UNMAPPED,
};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

pub struct Phase1Output {
    pub groups: Vec<CandidateGroup>,
    pub events: Vec<DecisionEvent>,
}

struct RawGroup {
    task_ids: Vec<TaskId>,
    seed: TaskId,
}

fn canonical(mut ids: Vec<TaskId>) -> Vec<TaskId> {
    ids.sort();
    ids.dedup();
    ids
}

fn ranked_neighbors(
    seed: &Task,
    pool: &[&Task],
    max_travel_min: i64,
    neighbor_limit: usize,
) -> Vec<(TaskId, i64)> {
    let mut ranked: Vec<(TaskId, i64)> = pool
        .iter()
        .map(|t| (t.id, travel_minutes(seed.coords(), t.coords())))
        .filter(|(_, travel)| *travel <= max_travel_min)
        .collect();
    ranked.sort_by_key(|(id, travel)| (*travel, *id));
    ranked.truncate(neighbor_limit);
    ranked
}

/// Run Phase 1 over the full task set.
pub fn generate_candidate_groups(
    run_id: RunId,
    tasks: &[Task],
    params: &Phase1Params,
    weights: GroupScoreWeights,
) -> Phase1Output {
    let zones: BTreeMap<TaskId, ZoneId> = tasks
        .iter()
        .map(|t| (t.id, zone_of(t.lat, t.lon)))
        .collect();

    let mut by_zone: BTreeMap<ZoneId, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        by_zone.entry(zones[&task.id]).or_default().push(task);
    }

    let mut raw_groups: Vec<RawGroup> = Vec::new();
    let mut events: Vec<DecisionEvent> = Vec::new();

    for seed in tasks {
        let seed_zone = zones[&seed.id];
        if seed_zone == ZONE_UNMAPPED {
            raw_groups.push(RawGroup { task_ids: vec![seed.id], seed: seed.id });
            events.push(DecisionEvent::new(
                run_id,
                EventType::Phase1GroupSingleCreated,
                serde_json::json!({ "seed": seed.id, "reason": "UNMAPPED_ZONE" }),
            ));
            continue;
        }

        let mut pool: Vec<&Task> = by_zone.get(&seed_zone).cloned().unwrap_or_default();
        pool.retain(|t| t.id != seed.id);
        if params.use_adjacent_zones {
            for neighbor_zone in adjacent_zones(seed_zone) {
                if let Some(tasks_in_zone) = by_zone.get(&neighbor_zone) {
                    for t in tasks_in_zone {
                        if !pool.iter().any(|p| p.id == t.id) {
                            pool.push(t);
                        }
                    }
                }
            }
        }

        let mut ranked = ranked_neighbors(seed, &pool, params.nearby_seed_max_min, params.neighbor_limit);
        if ranked.is_empty() {
            let fallback_ranked =
                ranked_neighbors(seed, &pool, params.fallback_seed_max_min, params.neighbor_limit);
            // The widened radius was consulted; PHASE1_USED_FALLBACK_20 fires
            // regardless of whether it found anything (spec §4.4 step 1c).
            events.push(DecisionEvent::new(
                run_id,
                EventType::Phase1UsedFallback20,
                serde_json::json!({
                    "seed": seed.id,
                    "fallback_seed_max_min": params.fallback_seed_max_min,
                }),
            ));
            if fallback_ranked.is_empty() {
                raw_groups.push(RawGroup { task_ids: vec![seed.id], seed: seed.id });
                events.push(DecisionEvent::new(
                    run_id,
                    EventType::Phase1GroupSingleCreated,
                    serde_json::json!({ "seed": seed.id, "reason": "NO_NEIGHBORS_IN_EITHER_RADIUS" }),
                ));
                continue;
            }
            ranked = fallback_ranked;
        }

        let neighbor_ids: Vec<TaskId> = ranked.iter().map(|(id, _)| *id).collect();
        let task_by_id: BTreeMap<TaskId, &Task> =
            pool.iter().map(|t| (t.id, *t)).chain(std::iter::once((seed.id, seed))).collect();

        // Pairs.
        for &a in &neighbor_ids {
            raw_groups.push(RawGroup { task_ids: canonical(vec![seed.id, a]), seed: seed.id });
        }

        // Triples, each with an optional fourth member (spec §4.4 step 1d:
        // the quadruple exception is governed purely by travel distance, not
        // by `max_apts`, which documents the normal 3-task cap).
        for combo in neighbor_ids.iter().combinations(2) {
            let (a, b) = (*combo[0], *combo[1]);
            let triple = canonical(vec![seed.id, a, b]);
            raw_groups.push(RawGroup { task_ids: triple.clone(), seed: seed.id });

            // Quadruples: try every remaining neighbor as the fourth member.
            for &c in &neighbor_ids {
                if triple.contains(&c) {
                    continue;
                }
                let min_travel_to_existing = triple
                    .iter()
                    .filter_map(|&member| {
                        let member_task = task_by_id.get(&member)?;
                        let c_task = task_by_id.get(&c)?;
                        Some(travel_minutes(member_task.coords(), c_task.coords()))
                    })
                    .min();
                if let Some(min_travel) = min_travel_to_existing {
                    if min_travel <= params.allow_fourth_if_travel_le_min {
                        let quad = canonical(vec![seed.id, a, b, c]);
                        raw_groups.push(RawGroup { task_ids: quad, seed: seed.id });
                    }
                }
            }
        }
    }

    // Dedupe by canonical key, keeping the first seed encountered.
    let mut seen: BTreeSet<Vec<TaskId>> = BTreeSet::new();
    let mut deduped: Vec<RawGroup> = Vec::new();
    for group in raw_groups {
        if seen.insert(group.task_ids.clone()) {
            deduped.push(group);
        }
    }

    let task_by_id: BTreeMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let mut scored: Vec<CandidateGroup> = deduped
        .into_iter()
        .map(|group| build_candidate_group(group, &task_by_id, &zones, weights))
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap()
            .then_with(|| a.task_ids.cmp(&b.task_ids))
    });
    scored.truncate(params.max_groups_total);

    for group in &scored {
        let event_type = if group.is_single {
            EventType::Phase1GroupSingleCreated
        } else {
            EventType::Phase1GroupCandidate
        };
        if event_type == EventType::Phase1GroupCandidate {
            events.push(DecisionEvent::new(
                run_id,
                event_type,
                serde_json::json!({
                    "task_ids": group.task_ids,
                    "seed": group.seed,
                    "avg_travel_min": group.avg_travel_min,
                    "max_travel_min": group.max_travel_min,
                    "score": group.score,
                }),
            ));
        }
    }

    Phase1Output { groups: scored, events }
}

fn build_candidate_group(
    raw: RawGroup,
    task_by_id: &BTreeMap<TaskId, &Task>,
    zones: &BTreeMap<TaskId, ZoneId>,
    weights: GroupScoreWeights,
) -> CandidateGroup {
    let ids = raw.task_ids;
    let is_single = ids.len() == 1;

    let (avg_travel_min, max_travel_min) = if is_single {
        (0.0, 0)
    } else {
        let mut pairwise = Vec::new();
        for pair in ids.iter().combinations(2) {
            let a = task_by_id[pair[0]];
            let b = task_by_id[pair[1]];
            pairwise.push(travel_minutes(a.coords(), b.coords()));
        }
        let sum: i64 = pairwise.iter().sum();
        let avg = sum as f64 / pairwise.len() as f64;
        let max = *pairwise.iter().max().unwrap();
        (avg, max)
    };

    let seed_zone = zones[&raw.seed];
    let same_zone = ids.iter().all(|id| zones[id] == seed_zone);

    let breakdown = score_group(avg_travel_min, max_travel_min, same_zone, weights);
    let score = rounded_total(breakdown.total());

    CandidateGroup {
        task_ids: ids,
        seed: raw.seed,
        zone: seed_zone,
        avg_travel_min: crate::geo::round_1dp(avg_travel_min),
        max_travel_min,
        score,
        is_single,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanroute_domain::{ApartmentType, LogisticCode};
    use chrono::NaiveTime;

    fn task(id: i64, lat: f64, lon: f64) -> Task {
        Task {
            id: TaskId(id),
            logistic_code: LogisticCode(id),
            lat,
            lon,
            client_id: id,
            premium: false,
            straordinaria: false,
            apartment_type: ApartmentType::A,
            priority: None,
            cleaning_minutes: 60,
            checkout_time: None,
            checkin_time: Some(NaiveTime::from_hms_opt(23, 0, 0).unwrap()),
        }
    }

    #[test]
    fn same_building_pair_emits_one_candidate() {
        let tasks = vec![task(1, 45.464, 9.19), task(2, 45.464, 9.19)];
        let output = generate_candidate_groups(
            RunId::new(),
            &tasks,
            &Phase1Params::default(),
            GroupScoreWeights::default(),
        );
        let pairs: Vec<_> = output.groups.iter().filter(|g| g.size() == 2).collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].task_ids, vec![TaskId(1), TaskId(2)]);
        assert_eq!(pairs[0].score, 105.0);
    }

    #[test]
    fn groups_are_sorted_ascending_and_deduped() {
        let tasks = vec![task(1, 45.464, 9.19), task(2, 45.4641, 9.1901)];
        let output = generate_candidate_groups(
            RunId::new(),
            &tasks,
            &Phase1Params::default(),
            GroupScoreWeights::default(),
        );
        for group in &output.groups {
            let mut sorted = group.task_ids.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted, group.task_ids);
        }
    }

    #[test]
    fn isolated_seed_falls_back_to_singleton() {
        let tasks = vec![task(1, 45.464, 9.19)];
        let output = generate_candidate_groups(
            RunId::new(),
            &tasks,
            &Phase1Params::default(),
            GroupScoreWeights::default(),
        );
        assert_eq!(output.groups.len(), 1);
        assert!(output.groups[0].is_single);
        assert!(output
            .events
            .iter()
            .any(|e| e.event_type == EventType::Phase1UsedFallback20));
        assert!(output.events.iter().any(|e| e.event_type
            == EventType::Phase1GroupSingleCreated
            && e.payload["reason"] == "NO_NEIGHBORS_IN_EITHER_RADIUS"));
    }

    /// Spec §8 scenario 6: the widened radius is consulted and this time
    /// finds a neighbor the narrow radius missed; PHASE1_USED_FALLBACK_20
    /// must still fire (it marks that the widened set was consulted, not
    /// that it came back empty).
    #[test]
    fn fallback_radius_finds_neighbor_missed_by_nearby_radius() {
        let tasks = vec![task(1, 45.464, 9.19), task(2, 45.4781, 9.19)];
        let mut params = Phase1Params::default();
        params.nearby_seed_max_min = 2;

        let output = generate_candidate_groups(RunId::new(), &tasks, &params, GroupScoreWeights::default());

        assert!(output
            .events
            .iter()
            .any(|e| e.event_type == EventType::Phase1UsedFallback20));
        assert!(!output
            .events
            .iter()
            .any(|e| e.event_type == EventType::Phase1GroupSingleCreated));
        let pairs: Vec<_> = output.groups.iter().filter(|g| g.size() == 2).collect();
        assert_eq!(pairs.len(), 1);
    }
}
