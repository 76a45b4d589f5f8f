//! Ports the orchestrator depends on, implemented by `cleanroute-storage`
//! (spec §6 "Persisted state layout"). Modeled on the teacher's
//! `ContentRepository`/`UserRepository` split: the core names the
//! capability it needs, storage supplies it.

use async_trait::async_trait;
use chrono::NaiveDate;
use cleanroute_domain::{DecisionEvent, Run, RunId, RunStatus, RunSummary};

/// Sink for the append-only decision log (spec §3 "Decision event").
#[async_trait]
pub trait DecisionSink: Send + Sync {
    /// Persist one batch of events, in the order given. Implementations must
    /// preserve relative order within a batch; batches themselves may be
    /// pipelined so long as a single run's events land in emission order.
    async fn emit_batch(&self, events: &[DecisionEvent]) -> anyhow::Result<()>;
}

/// Sink for run lifecycle records (spec §3 "Run").
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn create_run(
        &self,
        work_date: NaiveDate,
        algorithm_version: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<RunId>;

    /// Exactly one call per run, after its creation (spec §3 invariant).
    async fn complete_run(
        &self,
        run_id: RunId,
        status: RunStatus,
        summary: RunSummary,
    ) -> anyhow::Result<()>;

    async fn get_run(&self, run_id: RunId) -> anyhow::Result<Option<Run>>;
}
