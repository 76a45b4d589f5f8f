//! HTTP handlers for the run lifecycle plus health/readiness (ambient
//! addition; grounded on the teacher's `health`/`ready` handlers).

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use cleanroute_config::load_priority_windows;
use cleanroute_core::{run_optimizer, OptimizerInputs};
use cleanroute_domain::{
    Cleaner, GroupScoreWeights, Phase1Params, Phase2Params, Phase3Params, RunId, Task,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RunRequest {
    pub work_date: NaiveDate,
    #[validate(length(min = 1, message = "tasks must not be empty"))]
    pub tasks: Vec<Task>,
    pub cleaners: Vec<Cleaner>,
    #[serde(default)]
    pub phase1_params: Phase1Params,
    #[serde(default)]
    pub phase2_params: Phase2Params,
    /// Absent means "use process-wide priority-window settings" (spec §4.3);
    /// present overrides them entirely for this request.
    #[serde(default)]
    pub phase3_params: Option<Phase3Params>,
    #[serde(default)]
    pub group_score_weights: GroupScoreWeights,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: RunId,
    pub status: cleanroute_domain::RunStatus,
    pub summary: cleanroute_domain::RunSummary,
    pub schedule: Vec<cleanroute_domain::ScheduleRow>,
    pub unassigned: Vec<cleanroute_domain::UnassignedTask>,
}

/// `POST /v1/runs`: runs the optimizer once, end to end, and persists the
/// resulting schedule/unassigned lists once the run completes (spec §4.7).
#[tracing::instrument(skip(state, body), fields(work_date = %body.work_date, tasks = body.tasks.len()))]
pub async fn create_run(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunRequest>,
) -> Result<Json<RunResponse>, ApiError> {
    body.validate().map_err(|e| ApiError::bad_request(e.to_string()))?;
    cleanroute_domain::validate_ingest(&body.tasks, &body.cleaners)?;

    let (phase3_params, defaulted_priority_window_keys) = match body.phase3_params {
        Some(params) => (params, Vec::new()),
        None => {
            let loaded = load_priority_windows();
            (Phase3Params { priority_windows: loaded.windows }, loaded.defaulted_keys)
        }
    };

    let inputs = OptimizerInputs {
        work_date: body.work_date,
        algorithm_version: state.config.algorithm_version.clone(),
        tasks: body.tasks,
        cleaners: body.cleaners,
        phase1_params: body.phase1_params,
        phase2_params: body.phase2_params,
        phase3_params,
        group_score_weights: body.group_score_weights,
        defaulted_priority_window_keys,
    };

    let result = run_optimizer(&state.store, &state.store, inputs).await?;

    state.store.insert_assignments(result.run_id, &result.schedule).await?;
    state.store.insert_unassigned(result.run_id, &result.unassigned).await?;

    Ok(Json(RunResponse {
        run_id: result.run_id,
        status: result.status,
        summary: result.summary,
        schedule: result.schedule,
        unassigned: result.unassigned,
    }))
}

/// `GET /v1/runs/{run_id}`: fetch a run's lifecycle record (spec §3 "Run").
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<uuid::Uuid>,
) -> Result<Json<cleanroute_domain::Run>, ApiError> {
    use cleanroute_core::RunStore;
    let run_id = RunId(run_id);
    state
        .store
        .get_run(run_id)
        .await
        .map_err(ApiError::from)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no run {run_id}")))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", uptime_seconds: state.start_time.elapsed().as_secs() })
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: bool,
}

pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let database_ok = state.store.ping().await.is_ok();
    Json(ReadyResponse { status: if database_ok { "ok" } else { "degraded" }, database: database_ok })
}
