//! Session snapshot builder.
//!
//! Flattens a plan's exercises into the ordered, frozen list a workout
//! session runs through:
//! - Sort by section (Warm-up, Main Workout, Cool-down), then `section_order`
//! - Number positions 1..=n across all sections
//! - Resolve planned values: plan override first, then the exercise template
//! - Copy title/type/part so later template edits never leak into history

use crate::types::{ExerciseSource, ExerciseTemplate, PlanExercise, SessionExercise};
use crate::{Error, Exercise, Result};
use std::collections::HashMap;
use uuid::Uuid;

/// Build session snapshots with fresh random ids
///
/// Fails with [`Error::MissingExercise`] if any library reference is absent
/// from `exercises_by_id`; no snapshots are returned in that case.
pub fn build_session_snapshots(
    plan_exercises: &[PlanExercise],
    exercises_by_id: &HashMap<Uuid, Exercise>,
) -> Result<Vec<SessionExercise>> {
    build_session_snapshots_with_ids(plan_exercises, exercises_by_id, Uuid::new_v4)
}

/// Build session snapshots, taking snapshot ids from `next_id`
///
/// Output is fully determined by the inputs and the ids `next_id` yields.
pub fn build_session_snapshots_with_ids<F>(
    plan_exercises: &[PlanExercise],
    exercises_by_id: &HashMap<Uuid, Exercise>,
    mut next_id: F,
) -> Result<Vec<SessionExercise>>
where
    F: FnMut() -> Uuid,
{
    let mut ordered: Vec<&PlanExercise> = plan_exercises.iter().collect();
    // Stable sort keeps input order for (invalid) duplicate slots
    ordered.sort_by_key(|entry| (entry.section_type.precedence(), entry.section_order));

    // Resolve every template before building anything: all or nothing
    let resolved = ordered
        .into_iter()
        .map(|entry| resolve_template(entry, exercises_by_id).map(|t| (entry, t)))
        .collect::<Result<Vec<_>>>()?;

    let snapshots: Vec<SessionExercise> = resolved
        .into_iter()
        .enumerate()
        .map(|(index, (entry, template))| SessionExercise {
            id: next_id(),
            position: index as u32 + 1,
            exercise_id: entry.exercise_id(),
            section_type: entry.section_type,
            exercise_title_at_time: template.title.clone(),
            exercise_type_at_time: template.exercise_type,
            exercise_part_at_time: template.part,
            exercise_is_unilateral_at_time: template.is_unilateral,
            planned_sets: entry.planned_sets.or(template.series),
            planned_reps: entry.planned_reps.or(template.reps),
            planned_duration_seconds: entry
                .planned_duration_seconds
                .or(template.duration_seconds),
            planned_rest_seconds: entry
                .planned_rest_seconds
                .or(template.rest_in_between_seconds)
                .or(template.rest_after_series_seconds),
            planned_rest_after_series_seconds: entry
                .planned_rest_after_series_seconds
                .or(template.rest_after_series_seconds),
            planned_estimated_set_time_seconds: entry
                .planned_estimated_set_time_seconds
                .or(template.estimated_set_time_seconds),
        })
        .collect();

    tracing::debug!("Built {} session snapshots", snapshots.len());
    Ok(snapshots)
}

fn resolve_template<'a>(
    entry: &'a PlanExercise,
    exercises_by_id: &'a HashMap<Uuid, Exercise>,
) -> Result<&'a ExerciseTemplate> {
    match &entry.exercise {
        ExerciseSource::Library { exercise_id } => exercises_by_id
            .get(exercise_id)
            .map(|exercise| &exercise.template)
            .ok_or_else(|| {
                tracing::error!(
                    "Plan entry {} #{} references unknown exercise {}",
                    entry.section_type,
                    entry.section_order,
                    exercise_id
                );
                Error::MissingExercise {
                    exercise_id: *exercise_id,
                }
            }),
        ExerciseSource::Inline(template) => Ok(template),
    }
}
