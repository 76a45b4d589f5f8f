//! In-process `DecisionSink` implementations (spec §5: "no internal
//! parallelism... within a phase"). Modeled on the teacher's
//! `NullEventSink`/`LoggingEventSink`/`CollectingEventSink` trio
//! (`scheduler_v2::events`), adapted to the async, batch-oriented port this
//! crate exposes.

use crate::ports::{DecisionSink, RunStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use cleanroute_domain::{DecisionEvent, Run, RunId, RunStatus, RunSummary};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Discards every event. Useful for benchmarking the phases in isolation.
#[derive(Debug, Default)]
pub struct NullDecisionSink;

#[async_trait]
impl DecisionSink for NullDecisionSink {
    async fn emit_batch(&self, _events: &[DecisionEvent]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Emits every event via `tracing` at debug level, for local runs that don't
/// need a persisted audit trail.
#[derive(Debug, Default)]
pub struct TracingDecisionSink;

#[async_trait]
impl DecisionSink for TracingDecisionSink {
    async fn emit_batch(&self, events: &[DecisionEvent]) -> anyhow::Result<()> {
        for event in events {
            tracing::debug!(
                run_id = %event.run_id,
                phase = ?event.phase,
                event_type = event.event_type.code(),
                payload = %event.payload,
                "decision_event"
            );
        }
        Ok(())
    }
}

/// Collects every event in memory, for test assertions.
#[derive(Debug, Default)]
pub struct CollectingDecisionSink {
    events: Mutex<Vec<DecisionEvent>>,
}

impl CollectingDecisionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_with_code(&self, code: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type.code() == code)
            .count()
    }
}

#[async_trait]
impl DecisionSink for CollectingDecisionSink {
    async fn emit_batch(&self, events: &[DecisionEvent]) -> anyhow::Result<()> {
        self.events.lock().unwrap().extend_from_slice(events);
        Ok(())
    }
}

/// In-memory `RunStore`, for local CLI runs and tests with no database.
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    runs: Mutex<BTreeMap<RunId, Run>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn create_run(
        &self,
        work_date: NaiveDate,
        algorithm_version: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<RunId> {
        let run_id = RunId::new();
        let run = Run {
            run_id,
            work_date,
            algorithm_version: algorithm_version.to_string(),
            params,
            // `complete_run` overwrites this once the orchestrator finishes;
            // a row stuck here after a crash mid-run must read as partial,
            // not as a zero-valued success.
            status: RunStatus::Partial,
            summary: RunSummary::default(),
            created_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
        };
        self.runs.lock().unwrap().insert(run_id, run);
        Ok(run_id)
    }

    async fn complete_run(&self, run_id: RunId, status: RunStatus, summary: RunSummary) -> anyhow::Result<()> {
        let mut runs = self.runs.lock().unwrap();
        let run = runs
            .get_mut(&run_id)
            .ok_or_else(|| anyhow::anyhow!("unknown run {run_id}"))?;
        run.status = status;
        run.summary = summary;
        Ok(())
    }

    async fn get_run(&self, run_id: RunId) -> anyhow::Result<Option<Run>> {
        Ok(self.runs.lock().unwrap().get(&run_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanroute_domain::{EventType, RunId};
    use serde_json::json;

    #[tokio::test]
    async fn collecting_sink_retains_events() {
        let sink = CollectingDecisionSink::new();
        let run_id = RunId::new();
        let event = DecisionEvent::new(run_id, EventType::Phase1GroupSingleCreated, json!({}));
        sink.emit_batch(std::slice::from_ref(&event)).await.unwrap();
        assert_eq!(sink.events().len(), 1);
        assert_eq!(sink.count_with_code("PHASE1_GROUP_SINGLE_CREATED"), 1);
    }

    #[tokio::test]
    async fn null_sink_drops_everything() {
        let sink = NullDecisionSink;
        let run_id = RunId::new();
        let event = DecisionEvent::new(run_id, EventType::Phase1GroupSingleCreated, json!({}));
        sink.emit_batch(std::slice::from_ref(&event)).await.unwrap();
    }
}
