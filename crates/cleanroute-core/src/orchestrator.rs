//! Run lifecycle: creates the run record, invokes the three phases in
//! order, batches decision events, and updates run status (spec §4.7).

use crate::error::OptimizerError;
use crate::ports::{DecisionSink, RunStore};
use crate::{phase1, phase2, phase3};
use chrono::NaiveDate;
use cleanroute_domain::{
    Cleaner, DecisionEvent, EventType, GroupScoreWeights, Phase, Phase1Params, Phase2Params,
    Phase3Params, RunId, RunStatus, RunSummary, ScheduleRow, Task, UnassignedTask,
};

/// Maximum decision events persisted per `emit_batch` call (spec §4.7).
const DECISION_BATCH_SIZE: usize = 500;

pub struct OptimizerInputs {
    pub work_date: NaiveDate,
    pub algorithm_version: String,
    pub tasks: Vec<Task>,
    pub cleaners: Vec<Cleaner>,
    pub phase1_params: Phase1Params,
    pub phase2_params: Phase2Params,
    pub phase3_params: Phase3Params,
    pub group_score_weights: GroupScoreWeights,
    /// Priority-window settings keys the caller had to fall back to a
    /// documented default for (spec §4.3); surfaced here rather than loaded
    /// by the orchestrator itself, since env/config access belongs to the
    /// caller, not the core.
    pub defaulted_priority_window_keys: Vec<String>,
}

pub struct RunResult {
    pub run_id: RunId,
    pub status: RunStatus,
    pub summary: RunSummary,
    pub schedule: Vec<ScheduleRow>,
    pub unassigned: Vec<UnassignedTask>,
}

async fn emit_in_batches<S: DecisionSink + ?Sized>(
    sink: &S,
    events: &[DecisionEvent],
) -> anyhow::Result<()> {
    for batch in events.chunks(DECISION_BATCH_SIZE) {
        sink.emit_batch(batch).await?;
    }
    Ok(())
}

/// Run the full pipeline once, end to end.
#[tracing::instrument(skip(sink, store, inputs), fields(work_date = %inputs.work_date))]
pub async fn run_optimizer<S, R>(
    sink: &S,
    store: &R,
    inputs: OptimizerInputs,
) -> Result<RunResult, OptimizerError>
where
    S: DecisionSink + ?Sized,
    R: RunStore + ?Sized,
{
    let started_at = std::time::Instant::now();
    let params_snapshot = serde_json::json!({
        "phase1": inputs.phase1_params,
        "phase2": inputs.phase2_params,
        "phase3": inputs.phase3_params,
    });

    let run_id = store
        .create_run(inputs.work_date, &inputs.algorithm_version, params_snapshot)
        .await
        .map_err(|e| OptimizerError::StoreFailure(RunId::new(), e))?;

    match run_phases(sink, run_id, &inputs).await {
        Ok((schedule, unassigned, summary_counts)) => {
            let summary = RunSummary {
                duration_ms: started_at.elapsed().as_millis() as u64,
                ..summary_counts
            };
            store
                .complete_run(run_id, RunStatus::Success, summary)
                .await
                .map_err(|e| OptimizerError::StoreFailure(run_id, e))?;
            tracing::info!(run_id = %run_id, tasks_unassigned = summary.tasks_unassigned, "run completed");
            Ok(RunResult { run_id, status: RunStatus::Success, summary, schedule, unassigned })
        }
        Err((phase, message)) => {
            let summary = RunSummary { duration_ms: started_at.elapsed().as_millis() as u64, ..Default::default() };
            store
                .complete_run(run_id, RunStatus::Failed, summary)
                .await
                .map_err(|e| OptimizerError::StoreFailure(run_id, e))?;
            tracing::error!(run_id = %run_id, phase = ?phase, %message, "run failed");
            Err(OptimizerError::PhaseFault { run_id, phase: phase.as_number(), message })
        }
    }
}

/// Invoke Phase 1, 2 and 3 in order, batching each phase's events as soon as
/// it completes. Returns the failed phase and error message of the first
/// phase-level fault, if any (spec §7 kind (c): "unexpected exception during
/// a phase").
async fn run_phases<S: DecisionSink + ?Sized>(
    sink: &S,
    run_id: RunId,
    inputs: &OptimizerInputs,
) -> Result<(Vec<ScheduleRow>, Vec<UnassignedTask>, RunSummary), (Phase, String)> {
    if !inputs.defaulted_priority_window_keys.is_empty() {
        let event = DecisionEvent::new(
            run_id,
            EventType::Phase3SettingsFallbackUsed,
            serde_json::json!({ "defaulted_keys": inputs.defaulted_priority_window_keys }),
        );
        emit_in_batches(sink, std::slice::from_ref(&event))
            .await
            .map_err(|e| (Phase::Phase3, format!("settings-fallback event write failed: {e}")))?;
    }

    let phase1_output = phase1::generate_candidate_groups(
        run_id,
        &inputs.tasks,
        &inputs.phase1_params,
        inputs.group_score_weights,
    );
    emit_in_batches(sink, &phase1_output.events)
        .await
        .map_err(|e| (Phase::Phase1, format!("phase 1 decision log write failed: {e}")))?;

    let phase2_output = phase2::assign_groups(
        run_id,
        &phase1_output.groups,
        &inputs.tasks,
        &inputs.cleaners,
        &inputs.phase2_params,
    );
    emit_in_batches(sink, &phase2_output.events)
        .await
        .map_err(|e| (Phase::Phase2, format!("phase 2 decision log write failed: {e}")))?;

    let phase3_output = phase3::schedule_all(
        run_id,
        inputs.work_date,
        &phase2_output.assignments,
        &inputs.tasks,
        &inputs.cleaners,
        &inputs.phase3_params,
    );
    emit_in_batches(sink, &phase3_output.events)
        .await
        .map_err(|e| (Phase::Phase3, format!("phase 3 decision log write failed: {e}")))?;

    let logistic_code_by_task = inputs
        .tasks
        .iter()
        .map(|t| (t.id, t.logistic_code))
        .collect::<std::collections::BTreeMap<_, _>>();

    let mut unassigned: Vec<UnassignedTask> = phase2_output
        .unassigned
        .into_iter()
        .map(|(task_id, reason_code, details)| UnassignedTask {
            task_id,
            logistic_code: logistic_code_by_task
                .get(&task_id)
                .copied()
                .unwrap_or(cleanroute_domain::LogisticCode(0)),
            reason_code,
            details,
        })
        .collect();
    unassigned.extend(phase3_output.unassigned);

    let summary = RunSummary {
        tasks_loaded: inputs.tasks.len() as u32,
        groups_generated: phase1_output.groups.len() as u32,
        groups_assigned: phase2_output.assignments.len() as u32,
        tasks_scheduled: phase3_output.rows.len() as u32,
        tasks_unassigned: unassigned.len() as u32,
        duration_ms: 0,
    };

    Ok((phase3_output.rows, unassigned, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{CollectingDecisionSink, InMemoryRunStore};

    #[tokio::test]
    async fn defaulted_priority_window_keys_emits_fallback_event() {
        let sink = CollectingDecisionSink::new();
        let store = InMemoryRunStore::new();
        let inputs = OptimizerInputs {
            work_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            algorithm_version: "cleanroute-test".to_string(),
            tasks: vec![],
            cleaners: vec![],
            phase1_params: Phase1Params::default(),
            phase2_params: Phase2Params::default(),
            phase3_params: Phase3Params::default(),
            group_score_weights: GroupScoreWeights::default(),
            defaulted_priority_window_keys: vec!["EO_START_MIN".to_string()],
        };

        run_optimizer(&sink, &store, inputs).await.expect("run succeeds");

        let events = sink.events();
        assert!(events.iter().any(|e| e.event_type == EventType::Phase3SettingsFallbackUsed));
    }

    #[tokio::test]
    async fn no_defaulted_keys_emits_no_fallback_event() {
        let sink = CollectingDecisionSink::new();
        let store = InMemoryRunStore::new();
        let inputs = OptimizerInputs {
            work_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            algorithm_version: "cleanroute-test".to_string(),
            tasks: vec![],
            cleaners: vec![],
            phase1_params: Phase1Params::default(),
            phase2_params: Phase2Params::default(),
            phase3_params: Phase3Params::default(),
            group_score_weights: GroupScoreWeights::default(),
            defaulted_priority_window_keys: vec![],
        };

        run_optimizer(&sink, &store, inputs).await.expect("run succeeds");

        let events = sink.events();
        assert!(!events.iter().any(|e| e.event_type == EventType::Phase3SettingsFallbackUsed));
    }
}
