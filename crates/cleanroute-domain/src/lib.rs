//! Pure data types shared by every `cleanroute-*` crate: identifiers, the
//! `Task`/`Cleaner` inputs, Phase 1-3 intermediate and output shapes, the
//! decision event log, run records, and tuning parameters.
//!
//! This crate has no I/O and no async; it exists so `cleanroute-core`,
//! `cleanroute-storage`, `cleanroute-api` and `cleanroute-cli` can agree on
//! wire and domain shapes without depending on each other.

pub mod coerce;
pub mod errors;
pub mod events;
pub mod group;
pub mod ids;
pub mod params;
pub mod run;
pub mod schedule;
pub mod task;

pub use coerce::{coerce_bool, deserialize_lenient_bool};
pub use errors::{validate_ingest, IngestError};
pub use events::{DecisionEvent, EventType, Phase};
pub use group::{AssignmentCandidate, CandidateGroup, CleanerScoreBreakdown, GroupScoreBreakdown};
pub use ids::{CleanerId, LogisticCode, RunId, TaskId, ZoneId, ZONE_UNMAPPED};
pub use params::{
    CleanerScoreWeights, GroupScoreWeights, Phase1Params, Phase2Params, Phase3Params,
    PriorityWindow, PriorityWindows,
};
pub use run::{Run, RunStatus, RunSummary};
pub use schedule::{ScheduleRow, UnassignedTask};
pub use task::{ApartmentType, Cleaner, ContractClass, Priority, Role, Task, ZonedTask};
