//! Ingestion-time validation errors (spec §9 "Input validation").
//!
//! These cover malformed input data, not scheduling infeasibility; a task
//! the core cannot place lands in `unassigned_tasks` instead of failing the
//! run (spec §4.7 "A run never fails because tasks could not be scheduled").
//!
//! Apartment-type tags are validated earlier, at deserialization (see
//! `ApartmentType`'s `Deserialize` impl, which routes through
//! `ApartmentType::parse` and rejects anything else outright) — by the time
//! a `Task` exists its tag is already one of the seven valid ones, so there
//! is no corresponding variant here.

use crate::ids::TaskId;
use crate::task::{Cleaner, Task};
use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("task {0}: coordinates ({1}, {2}) are not finite")]
    NonFiniteCoordinates(TaskId, f64, f64),

    #[error("task {0}: cleaning_minutes must be positive, got {1}")]
    NonPositiveCleaningMinutes(TaskId, i64),

    #[error("duplicate task id {0} in input batch")]
    DuplicateTaskId(TaskId),

    #[error("cleaner roster is empty")]
    EmptyRoster,
}

/// Ingestion-boundary checks (spec §9): non-finite coordinates,
/// non-positive cleaning duration, duplicate task ids, and an empty
/// cleaner roster. Called once per run before any phase runs.
pub fn validate_ingest(tasks: &[Task], cleaners: &[Cleaner]) -> Result<(), IngestError> {
    if cleaners.is_empty() {
        return Err(IngestError::EmptyRoster);
    }

    let mut seen = BTreeSet::new();
    for task in tasks {
        if !seen.insert(task.id) {
            return Err(IngestError::DuplicateTaskId(task.id));
        }
        if !task.is_schedulable() {
            if !task.lat.is_finite() || !task.lon.is_finite() {
                return Err(IngestError::NonFiniteCoordinates(task.id, task.lat, task.lon));
            }
            return Err(IngestError::NonPositiveCleaningMinutes(
                task.id,
                task.cleaning_minutes as i64,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CleanerId;
    use crate::task::{ApartmentType, ContractClass, Role};
    use chrono::NaiveTime;

    fn task(id: i64, lat: f64, lon: f64, cleaning_minutes: u32) -> Task {
        Task {
            id: TaskId(id),
            logistic_code: crate::ids::LogisticCode(id),
            lat,
            lon,
            client_id: id,
            premium: false,
            straordinaria: false,
            apartment_type: ApartmentType::A,
            priority: None,
            cleaning_minutes,
            checkout_time: None,
            checkin_time: None,
        }
    }

    fn cleaner(id: i64) -> Cleaner {
        Cleaner {
            id: CleanerId(id),
            name: "Ana".to_string(),
            role: Role::Standard,
            contract_class: ContractClass::C,
            can_do_straordinaria: false,
            preferred_customers: vec![],
            accumulated_hours: 0.0,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn accepts_a_well_formed_batch() {
        assert!(validate_ingest(&[task(1, 45.0, 9.0, 60)], &[cleaner(1)]).is_ok());
    }

    #[test]
    fn rejects_empty_roster() {
        assert!(matches!(validate_ingest(&[task(1, 45.0, 9.0, 60)], &[]), Err(IngestError::EmptyRoster)));
    }

    #[test]
    fn rejects_duplicate_task_ids() {
        let tasks = vec![task(1, 45.0, 9.0, 60), task(1, 45.1, 9.1, 60)];
        assert!(matches!(
            validate_ingest(&tasks, &[cleaner(1)]),
            Err(IngestError::DuplicateTaskId(TaskId(1)))
        ));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let tasks = vec![task(1, f64::NAN, 9.0, 60)];
        assert!(matches!(
            validate_ingest(&tasks, &[cleaner(1)]),
            Err(IngestError::NonFiniteCoordinates(TaskId(1), _, _))
        ));
    }

    #[test]
    fn rejects_non_positive_cleaning_minutes() {
        let tasks = vec![task(1, 45.0, 9.0, 0)];
        assert!(matches!(
            validate_ingest(&tasks, &[cleaner(1)]),
            Err(IngestError::NonPositiveCleaningMinutes(TaskId(1), 0))
        ));
    }
}
