//! The three-phase cleaning-task optimizer: geography, scoring, priority
//! windows, and the Phase 1-3 algorithms, plus the ports the orchestrator
//! uses to persist a run (spec §2 "System Overview").

pub mod error;
pub mod geo;
pub mod orchestrator;
pub mod phase1;
pub mod phase2;
pub mod phase3;
pub mod ports;
pub mod priority;
pub mod scoring;
pub mod sinks;

pub use error::OptimizerError;
pub use orchestrator::{run_optimizer, OptimizerInputs};
pub use ports::{DecisionSink, RunStore};
pub use sinks::{CollectingDecisionSink, InMemoryRunStore, NullDecisionSink, TracingDecisionSink};
