//! Workout session lifecycle.

use crate::snapshot::build_session_snapshots;
use crate::types::{Exercise, SessionStatus, WorkoutPlan, WorkoutSession};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Start a session from a plan, freezing the plan name and its exercises
///
/// The single in-progress session rule is not checked here; that belongs to
/// whoever stores sessions (see [`crate::store::Library::start_session`]).
pub fn start_session(
    plan: &WorkoutPlan,
    exercises_by_id: &HashMap<Uuid, Exercise>,
    now: DateTime<Utc>,
) -> Result<WorkoutSession> {
    if plan.exercises.is_empty() {
        return Err(Error::EmptyPlan(plan.name.clone()));
    }

    let exercises = build_session_snapshots(&plan.exercises, exercises_by_id)?;

    let session = WorkoutSession {
        id: Uuid::new_v4(),
        plan_id: plan.id,
        plan_name_at_time: plan.name.clone(),
        status: SessionStatus::InProgress,
        started_at: now,
        completed_at: None,
        exercises,
    };

    tracing::info!(
        "Started session {} from plan '{}' with {} exercises",
        session.id,
        plan.name,
        session.exercises.len()
    );
    Ok(session)
}

impl WorkoutSession {
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    /// Mark the session completed
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status == SessionStatus::Completed {
            return Err(Error::SessionState(format!(
                "session {} is already completed",
                self.id
            )));
        }

        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
        tracing::info!("Completed session {}", self.id);
        Ok(())
    }

    /// Planned duration in seconds, where every snapshot has enough data
    ///
    /// Sums sets x (set time + rest between sets) per exercise. Entries
    /// without sets or a set time are skipped.
    pub fn estimated_duration_seconds(&self) -> i64 {
        self.exercises
            .iter()
            .filter_map(|e| {
                let sets = i64::from(e.planned_sets?);
                let set_time = e
                    .planned_estimated_set_time_seconds
                    .or(e.planned_duration_seconds)?;
                let rest = i64::from(e.planned_rest_seconds.unwrap_or(0));
                Some(sets * (i64::from(set_time) + rest))
            })
            .sum()
    }
}
