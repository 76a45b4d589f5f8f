//! Postgres-backed `DecisionSink`/`RunStore` (spec §6 "Persisted state
//! layout"). Modeled on the teacher's `SyncRepository`: a `PgPool`-holding
//! struct with one method per operation, each wrapped in its own
//! transaction where more than one statement is involved.

use crate::StorageError;
use async_trait::async_trait;
use chrono::NaiveDate;
use cleanroute_core::ports::{DecisionSink, RunStore};
use cleanroute_domain::{DecisionEvent, Run, RunId, RunStatus, RunSummary, ScheduleRow, UnassignedTask};
use sqlx::{PgPool, Row};

/// A `PgPool`-backed adapter implementing both optimizer ports plus the
/// assignment/unassigned writers the orchestrator's caller uses once a run
/// completes.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)
    }

    /// Cheap connectivity check for `/v1/ready`.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(StorageError::Query)?;
        Ok(())
    }

    /// Persist the final schedule, batched in groups of up to 500 rows
    /// (spec §4.7).
    pub async fn insert_assignments(&self, run_id: RunId, rows: &[ScheduleRow]) -> Result<(), StorageError> {
        for batch in rows.chunks(500) {
            let mut tx = self.pool.begin().await.map_err(StorageError::Query)?;
            for row in batch {
                sqlx::query(
                    "INSERT INTO optimizer_assignment \
                     (run_id, cleaner_id, task_id, logistic_code, sequence, start_time, end_time, travel_minutes_from_prev, reasons) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                )
                .bind(run_id.0)
                .bind(row.cleaner_id.0)
                .bind(row.task_id.0)
                .bind(row.logistic_code.0)
                .bind(row.sequence as i32)
                .bind(row.start)
                .bind(row.end)
                .bind(row.travel_from_prev_min)
                .bind(&row.reasons)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::Query)?;
            }
            tx.commit().await.map_err(StorageError::Query)?;
        }
        Ok(())
    }

    pub async fn insert_unassigned(&self, run_id: RunId, tasks: &[UnassignedTask]) -> Result<(), StorageError> {
        for batch in tasks.chunks(500) {
            let mut tx = self.pool.begin().await.map_err(StorageError::Query)?;
            for task in batch {
                sqlx::query(
                    "INSERT INTO optimizer_unassigned (run_id, task_id, logistic_code, reason_code, details_json) \
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(run_id.0)
                .bind(task.task_id.0)
                .bind(task.logistic_code.0)
                .bind(&task.reason_code)
                .bind(&task.details)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::Query)?;
            }
            tx.commit().await.map_err(StorageError::Query)?;
        }
        Ok(())
    }
}

#[async_trait]
impl DecisionSink for PostgresStore {
    async fn emit_batch(&self, events: &[DecisionEvent]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for event in events {
            sqlx::query(
                "INSERT INTO optimizer_decision (run_id, phase, event_type, payload_json) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(event.run_id.0)
            .bind(event.phase.as_number() as i16)
            .bind(event.event_type.code())
            .bind(&event.payload)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl RunStore for PostgresStore {
    async fn create_run(
        &self,
        work_date: NaiveDate,
        algorithm_version: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<RunId> {
        let run_id = RunId::new();
        sqlx::query(
            // `complete_run` overwrites this once the orchestrator finishes;
            // a row stuck here after a crash mid-run must read as partial,
            // not as a zero-valued success.
            "INSERT INTO optimizer_run (run_id, work_date, algorithm_version, params_json, status) \
             VALUES ($1, $2, $3, $4, 'partial')",
        )
        .bind(run_id.0)
        .bind(work_date)
        .bind(algorithm_version)
        .bind(&params)
        .execute(&self.pool)
        .await?;
        Ok(run_id)
    }

    async fn complete_run(&self, run_id: RunId, status: RunStatus, summary: RunSummary) -> anyhow::Result<()> {
        let status_str = match status {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        };
        sqlx::query("UPDATE optimizer_run SET status = $1, summary_json = $2 WHERE run_id = $3")
            .bind(status_str)
            .bind(serde_json::to_value(summary)?)
            .bind(run_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_run(&self, run_id: RunId) -> anyhow::Result<Option<Run>> {
        let row = sqlx::query(
            "SELECT run_id, work_date, algorithm_version, params_json, status, summary_json, created_at \
             FROM optimizer_run WHERE run_id = $1",
        )
        .bind(run_id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let status_str: String = row.try_get("status")?;
        let status = match status_str.as_str() {
            "success" => RunStatus::Success,
            "partial" => RunStatus::Partial,
            _ => RunStatus::Failed,
        };
        Ok(Some(Run {
            run_id: RunId(row.try_get("run_id")?),
            work_date: row.try_get("work_date")?,
            algorithm_version: row.try_get("algorithm_version")?,
            params: row.try_get("params_json")?,
            status,
            summary: serde_json::from_value(row.try_get("summary_json")?)?,
            created_at: row.try_get("created_at")?,
        }))
    }
}
