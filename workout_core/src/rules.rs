//! Business-rule validation for exercises and workout plans.
//!
//! Every validator returns the full list of violation messages in a fixed
//! order. An empty list means the record is valid. Checks never stop at the
//! first failure; callers show all messages at once and map them back to
//! form fields by substring.

use crate::types::{
    ExerciseDraft, ExerciseSource, ExerciseTemplate, Field, PlanDraft, PlanExercise,
    MAX_NAME_CHARS,
};
use std::collections::HashSet;
use uuid::Uuid;

pub const MSG_REPS_XOR_DURATION: &str = "Exactly one of reps or duration_seconds must be provided";
pub const MSG_REST_REQUIRED: &str =
    "At least one of rest_in_between_seconds or rest_after_series_seconds must be provided";
pub const MSG_SERIES_POSITIVE: &str = "series must be greater than zero";
pub const MSG_REST_IN_BETWEEN_NON_NEGATIVE: &str =
    "rest_in_between_seconds must be greater than or equal to zero";
pub const MSG_REST_AFTER_SERIES_NON_NEGATIVE: &str =
    "rest_after_series_seconds must be greater than or equal to zero";

pub const MSG_TITLE_REQUIRED: &str = "title is required";
pub const MSG_TITLE_TOO_LONG: &str = "title must be at most 120 characters";
pub const MSG_SERIES_REQUIRED: &str = "series is required";
pub const MSG_REPS_POSITIVE: &str = "reps must be greater than zero";
pub const MSG_DURATION_POSITIVE: &str = "duration_seconds must be greater than zero";
pub const MSG_ESTIMATED_SET_TIME_NON_NEGATIVE: &str =
    "estimated_set_time_seconds must be greater than or equal to zero";

pub const MSG_PLAN_NAME_REQUIRED: &str = "Plan name is required";
pub const MSG_PLAN_NAME_TOO_LONG: &str = "Plan name must be at most 120 characters";

/// The fields the exercise business rules look at
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct RuleCandidate {
    #[serde(default)]
    pub reps: Field<i32>,
    #[serde(default)]
    pub duration_seconds: Field<i32>,
    #[serde(default)]
    pub series: Field<i32>,
    #[serde(default)]
    pub rest_in_between_seconds: Field<i32>,
    #[serde(default)]
    pub rest_after_series_seconds: Field<i32>,
}

impl From<&ExerciseDraft> for RuleCandidate {
    fn from(draft: &ExerciseDraft) -> Self {
        Self {
            reps: draft.reps,
            duration_seconds: draft.duration_seconds,
            series: draft.series,
            rest_in_between_seconds: draft.rest_in_between_seconds,
            rest_after_series_seconds: draft.rest_after_series_seconds,
        }
    }
}

impl From<&ExerciseTemplate> for RuleCandidate {
    fn from(template: &ExerciseTemplate) -> Self {
        Self {
            reps: template.reps.into(),
            duration_seconds: template.duration_seconds.into(),
            series: template.series.into(),
            rest_in_between_seconds: template.rest_in_between_seconds.into(),
            rest_after_series_seconds: template.rest_after_series_seconds.into(),
        }
    }
}

/// Check the five exercise business rules, in order
///
/// 1. exactly one of reps / duration_seconds
/// 2. at least one rest field (`0` counts)
/// 3. series > 0, skipped when series is absent or null
/// 4. rest_in_between_seconds >= 0 when present
/// 5. rest_after_series_seconds >= 0 when present
pub fn validate_exercise_business_rules(candidate: &RuleCandidate) -> Vec<String> {
    let mut errors = Vec::new();

    if candidate.reps.is_present() == candidate.duration_seconds.is_present() {
        errors.push(MSG_REPS_XOR_DURATION.to_string());
    }

    if !candidate.rest_in_between_seconds.is_present()
        && !candidate.rest_after_series_seconds.is_present()
    {
        errors.push(MSG_REST_REQUIRED.to_string());
    }

    if let Some(&series) = candidate.series.value() {
        if series <= 0 {
            errors.push(MSG_SERIES_POSITIVE.to_string());
        }
    }

    if let Some(&rest) = candidate.rest_in_between_seconds.value() {
        if rest < 0 {
            errors.push(MSG_REST_IN_BETWEEN_NON_NEGATIVE.to_string());
        }
    }

    if let Some(&rest) = candidate.rest_after_series_seconds.value() {
        if rest < 0 {
            errors.push(MSG_REST_AFTER_SERIES_NON_NEGATIVE.to_string());
        }
    }

    errors
}

/// Validate a new exercise: field checks followed by the business rules
pub fn validate_exercise_draft(draft: &ExerciseDraft) -> Vec<String> {
    validate_exercise_fields(
        &draft.title,
        &RuleCandidate::from(draft),
        draft.estimated_set_time_seconds,
    )
}

/// Validate a stored or merged exercise definition
pub fn validate_exercise_template(template: &ExerciseTemplate) -> Vec<String> {
    validate_exercise_fields(
        &template.title,
        &RuleCandidate::from(template),
        template.estimated_set_time_seconds.into(),
    )
}

fn validate_exercise_fields(
    title: &str,
    candidate: &RuleCandidate,
    estimated_set_time_seconds: Field<i32>,
) -> Vec<String> {
    let mut errors = Vec::new();

    let title = title.trim();
    if title.is_empty() {
        errors.push(MSG_TITLE_REQUIRED.to_string());
    } else if title.chars().count() > MAX_NAME_CHARS {
        errors.push(MSG_TITLE_TOO_LONG.to_string());
    }

    if !candidate.series.is_present() {
        errors.push(MSG_SERIES_REQUIRED.to_string());
    }

    errors.extend(validate_exercise_business_rules(candidate));

    if matches!(candidate.reps.value(), Some(&reps) if reps <= 0) {
        errors.push(MSG_REPS_POSITIVE.to_string());
    }
    if matches!(candidate.duration_seconds.value(), Some(&d) if d <= 0) {
        errors.push(MSG_DURATION_POSITIVE.to_string());
    }
    if matches!(estimated_set_time_seconds.value(), Some(&t) if t < 0) {
        errors.push(MSG_ESTIMATED_SET_TIME_NON_NEGATIVE.to_string());
    }

    errors
}

/// Validate a new workout plan
///
/// `exercise_exists` answers whether a library id is known. Messages about a
/// single entry are prefixed with its section and order, e.g.
/// `Warm-up #2: planned_reps must be greater than zero`.
pub fn validate_plan_draft<F>(draft: &PlanDraft, exercise_exists: F) -> Vec<String>
where
    F: Fn(Uuid) -> bool,
{
    let mut errors = Vec::new();

    let name = draft.name.trim();
    if name.is_empty() {
        errors.push(MSG_PLAN_NAME_REQUIRED.to_string());
    } else if name.chars().count() > MAX_NAME_CHARS {
        errors.push(MSG_PLAN_NAME_TOO_LONG.to_string());
    }

    let mut seen_slots = HashSet::new();
    for entry in &draft.exercises {
        let label = format!("{} #{}", entry.section_type, entry.section_order);

        if entry.section_order <= 0 {
            errors.push(format!("{}: section_order must be greater than zero", label));
        } else if !seen_slots.insert((entry.section_type, entry.section_order)) {
            errors.push(format!(
                "{}: section_order is already used in this section",
                label
            ));
        }

        for message in validate_planned_values(entry) {
            errors.push(format!("{}: {}", label, message));
        }

        match &entry.exercise {
            ExerciseSource::Library { exercise_id } => {
                if !exercise_exists(*exercise_id) {
                    errors.push(format!(
                        "{}: exercise {} does not exist in the library",
                        label, exercise_id
                    ));
                }
            }
            ExerciseSource::Inline(template) => {
                for message in validate_exercise_template(template) {
                    errors.push(format!("{}: {}", label, message));
                }
            }
        }
    }

    errors
}

fn validate_planned_values(entry: &PlanExercise) -> Vec<String> {
    let mut errors = Vec::new();

    let positive = [
        ("planned_sets", entry.planned_sets),
        ("planned_reps", entry.planned_reps),
        ("planned_duration_seconds", entry.planned_duration_seconds),
    ];
    for (name, value) in positive {
        if matches!(value, Some(v) if v <= 0) {
            errors.push(format!("{} must be greater than zero", name));
        }
    }

    let non_negative = [
        ("planned_rest_seconds", entry.planned_rest_seconds),
        (
            "planned_rest_after_series_seconds",
            entry.planned_rest_after_series_seconds,
        ),
        (
            "planned_estimated_set_time_seconds",
            entry.planned_estimated_set_time_seconds,
        ),
    ];
    for (name, value) in non_negative {
        if matches!(value, Some(v) if v < 0) {
            errors.push(format!("{} must be greater than or equal to zero", name));
        }
    }

    errors
}
