//! Core error types (spec §7 "Error Handling Design").

use cleanroute_domain::RunId;
use thiserror::Error;

/// A phase-level fault: an unexpected condition that aborts the current run
/// (spec §7 kind (c)). Compatibility rejects, drop cascades, and time-window
/// violations are NOT errors — they are recorded as decision events and the
/// phase continues; see `priority`, `phase2`, `phase3`.
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("run {run_id}: phase {phase} failed: {message}")]
    PhaseFault {
        run_id: RunId,
        phase: u8,
        message: String,
    },

    #[error("run {0}: decision sink failed")]
    SinkFailure(RunId, #[source] anyhow::Error),

    #[error("run {0}: run store failed")]
    StoreFailure(RunId, #[source] anyhow::Error),
}
