//! Core domain types for the workout planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise templates in the user's library
//! - Workout plans and their ordered sections
//! - Workout sessions and their frozen exercise snapshots
//! - The tri-state `Field` used for validation input and patches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Maximum length of exercise titles and plan names, in characters
pub const MAX_NAME_CHARS: usize = 120;

// ============================================================================
// Tri-state field
// ============================================================================

/// An input value that can be absent, explicitly null, or set.
///
/// Absent and null are different: a patch with an absent field keeps the
/// stored value while an explicit null clears it. `0` is always a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field<T> {
    NotProvided,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::NotProvided
    }
}

impl<T> Field<T> {
    pub fn is_not_provided(&self) -> bool {
        matches!(self, Field::NotProvided)
    }

    /// True only for `Value`; null and not-provided both count as absent
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Null | Field::NotProvided => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Null | Field::NotProvided => None,
        }
    }
}

impl<T: Clone> Field<T> {
    /// Apply this field as a patch onto a stored optional value
    pub fn apply_to(&self, target: &mut Option<T>) {
        match self {
            Field::NotProvided => {}
            Field::Null => *target = None,
            Field::Value(v) => *target = Some(v.clone()),
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}

// Absent keys never reach this impl; `#[serde(default)]` on the containing
// field turns them into `NotProvided`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Null | Field::NotProvided => serializer.serialize_none(),
        }
    }
}

// ============================================================================
// Exercise classification
// ============================================================================

/// Plan section an exercise belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExerciseType {
    #[serde(rename = "Warm-up")]
    WarmUp,
    #[serde(rename = "Main Workout")]
    MainWorkout,
    #[serde(rename = "Cool-down")]
    CoolDown,
}

impl ExerciseType {
    /// Section precedence within a plan: Warm-up 1, Main Workout 2, Cool-down 3
    pub fn precedence(self) -> u8 {
        match self {
            ExerciseType::WarmUp => 1,
            ExerciseType::MainWorkout => 2,
            ExerciseType::CoolDown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExerciseType::WarmUp => "Warm-up",
            ExerciseType::MainWorkout => "Main Workout",
            ExerciseType::CoolDown => "Cool-down",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Body part targeted by an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Legs,
    Core,
    Back,
    Arms,
    Chest,
    Glutes,
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Difficulty level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExerciseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

// ============================================================================
// Exercise library
// ============================================================================

/// The user-editable definition of an exercise.
///
/// Shared by library exercises and inline plan entries; every snapshot is
/// resolved from one of these.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTemplate {
    pub title: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub part: BodyPart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ExerciseLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub series: Option<i32>,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub duration_seconds: Option<i32>,
    #[serde(default)]
    pub rest_in_between_seconds: Option<i32>,
    #[serde(default)]
    pub rest_after_series_seconds: Option<i32>,
    #[serde(default)]
    pub estimated_set_time_seconds: Option<i32>,
    #[serde(default)]
    pub is_unilateral: bool,
}

impl ExerciseTemplate {
    /// Apply a partial update in place
    pub fn apply_patch(&mut self, patch: &ExercisePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(exercise_type) = patch.exercise_type {
            self.exercise_type = exercise_type;
        }
        if let Some(part) = patch.part {
            self.part = part;
        }
        if let Some(is_unilateral) = patch.is_unilateral {
            self.is_unilateral = is_unilateral;
        }
        patch.level.apply_to(&mut self.level);
        patch.details.apply_to(&mut self.details);
        patch.series.apply_to(&mut self.series);
        patch.reps.apply_to(&mut self.reps);
        patch.duration_seconds.apply_to(&mut self.duration_seconds);
        patch
            .rest_in_between_seconds
            .apply_to(&mut self.rest_in_between_seconds);
        patch
            .rest_after_series_seconds
            .apply_to(&mut self.rest_after_series_seconds);
        patch
            .estimated_set_time_seconds
            .apply_to(&mut self.estimated_set_time_seconds);
    }
}

/// A stored exercise in the user's library
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    #[serde(flatten)]
    pub template: ExerciseTemplate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub part: BodyPart,
    #[serde(default)]
    pub level: Option<ExerciseLevel>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub series: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub reps: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub duration_seconds: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub rest_in_between_seconds: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub rest_after_series_seconds: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub estimated_set_time_seconds: Field<i32>,
    #[serde(default)]
    pub is_unilateral: bool,
}

impl ExerciseDraft {
    pub fn into_template(self) -> ExerciseTemplate {
        ExerciseTemplate {
            title: self.title.trim().to_string(),
            exercise_type: self.exercise_type,
            part: self.part,
            level: self.level,
            details: self.details,
            series: self.series.into_option(),
            reps: self.reps.into_option(),
            duration_seconds: self.duration_seconds.into_option(),
            rest_in_between_seconds: self.rest_in_between_seconds.into_option(),
            rest_after_series_seconds: self.rest_after_series_seconds.into_option(),
            estimated_set_time_seconds: self.estimated_set_time_seconds.into_option(),
            is_unilateral: self.is_unilateral,
        }
    }
}

/// Partial update of an exercise
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExercisePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub exercise_type: Option<ExerciseType>,
    #[serde(default)]
    pub part: Option<BodyPart>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub level: Field<ExerciseLevel>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub details: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub series: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub reps: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub duration_seconds: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub rest_in_between_seconds: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub rest_after_series_seconds: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_not_provided")]
    pub estimated_set_time_seconds: Field<i32>,
    #[serde(default)]
    pub is_unilateral: Option<bool>,
}

// ============================================================================
// Workout plans
// ============================================================================

/// Where a plan entry gets its exercise definition from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ExerciseSource {
    /// Reference into the exercise library
    Library { exercise_id: Uuid },
    /// Definition carried by the plan itself
    Inline(ExerciseTemplate),
}

/// One exercise slot in a workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlanExercise {
    pub exercise: ExerciseSource,
    pub section_type: ExerciseType,
    pub section_order: i32,
    #[serde(default)]
    pub planned_sets: Option<i32>,
    #[serde(default)]
    pub planned_reps: Option<i32>,
    #[serde(default)]
    pub planned_duration_seconds: Option<i32>,
    #[serde(default)]
    pub planned_rest_seconds: Option<i32>,
    #[serde(default)]
    pub planned_rest_after_series_seconds: Option<i32>,
    #[serde(default)]
    pub planned_estimated_set_time_seconds: Option<i32>,
}

impl PlanExercise {
    /// Library-backed entry with no planned overrides
    pub fn library(exercise_id: Uuid, section_type: ExerciseType, section_order: i32) -> Self {
        Self::with_source(
            ExerciseSource::Library { exercise_id },
            section_type,
            section_order,
        )
    }

    /// Inline entry with no planned overrides
    pub fn inline(
        template: ExerciseTemplate,
        section_type: ExerciseType,
        section_order: i32,
    ) -> Self {
        Self::with_source(ExerciseSource::Inline(template), section_type, section_order)
    }

    fn with_source(exercise: ExerciseSource, section_type: ExerciseType, section_order: i32) -> Self {
        Self {
            exercise,
            section_type,
            section_order,
            planned_sets: None,
            planned_reps: None,
            planned_duration_seconds: None,
            planned_rest_seconds: None,
            planned_rest_after_series_seconds: None,
            planned_estimated_set_time_seconds: None,
        }
    }

    /// Library id this entry points at, if any
    pub fn exercise_id(&self) -> Option<Uuid> {
        match &self.exercise {
            ExerciseSource::Library { exercise_id } => Some(*exercise_id),
            ExerciseSource::Inline(_) => None,
        }
    }
}

/// A stored workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<BodyPart>,
    pub exercises: Vec<PlanExercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a workout plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub part: Option<BodyPart>,
    #[serde(default)]
    pub exercises: Vec<PlanExercise>,
}

// ============================================================================
// Sessions
// ============================================================================

/// Lifecycle status of a workout session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// Frozen copy of one plan entry, taken when a session starts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionExercise {
    pub id: Uuid,
    /// 1-based, continuous across all sections
    pub position: u32,
    #[serde(default)]
    pub exercise_id: Option<Uuid>,
    pub section_type: ExerciseType,
    pub exercise_title_at_time: String,
    pub exercise_type_at_time: ExerciseType,
    pub exercise_part_at_time: BodyPart,
    #[serde(default)]
    pub exercise_is_unilateral_at_time: bool,
    pub planned_sets: Option<i32>,
    pub planned_reps: Option<i32>,
    pub planned_duration_seconds: Option<i32>,
    pub planned_rest_seconds: Option<i32>,
    #[serde(default)]
    pub planned_rest_after_series_seconds: Option<i32>,
    #[serde(default)]
    pub planned_estimated_set_time_seconds: Option<i32>,
}

/// A workout session started from a plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub plan_name_at_time: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises: Vec<SessionExercise>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Field::is_not_provided")]
        reps: Field<i32>,
    }

    #[test]
    fn test_field_distinguishes_absent_null_and_value() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"reps": null}"#).unwrap();
        let zero: Probe = serde_json::from_str(r#"{"reps": 0}"#).unwrap();

        assert_eq!(absent.reps, Field::NotProvided);
        assert_eq!(null.reps, Field::Null);
        assert_eq!(zero.reps, Field::Value(0));
        assert!(zero.reps.is_present());
        assert!(!null.reps.is_present());
    }

    #[test]
    fn test_field_serialization_skips_not_provided() {
        let json = serde_json::to_string(&Probe {
            reps: Field::NotProvided,
        })
        .unwrap();
        assert_eq!(json, "{}");

        let json = serde_json::to_string(&Probe { reps: Field::Null }).unwrap();
        assert_eq!(json, r#"{"reps":null}"#);
    }

    #[test]
    fn test_exercise_type_labels() {
        let json = serde_json::to_string(&ExerciseType::MainWorkout).unwrap();
        assert_eq!(json, "\"Main Workout\"");

        let parsed: ExerciseType = serde_json::from_str("\"Warm-up\"").unwrap();
        assert_eq!(parsed, ExerciseType::WarmUp);
        assert_eq!(ExerciseType::CoolDown.to_string(), "Cool-down");
    }

    #[test]
    fn test_section_precedence() {
        assert!(ExerciseType::WarmUp.precedence() < ExerciseType::MainWorkout.precedence());
        assert!(ExerciseType::MainWorkout.precedence() < ExerciseType::CoolDown.precedence());
    }

    #[test]
    fn test_apply_patch_keeps_clears_and_sets() {
        let mut template = ExerciseTemplate {
            title: "Squat".into(),
            exercise_type: ExerciseType::MainWorkout,
            part: BodyPart::Legs,
            level: Some(ExerciseLevel::Beginner),
            details: None,
            series: Some(3),
            reps: Some(10),
            duration_seconds: None,
            rest_in_between_seconds: Some(60),
            rest_after_series_seconds: Some(90),
            estimated_set_time_seconds: None,
            is_unilateral: false,
        };

        let patch: ExercisePatch = serde_json::from_str(
            r#"{"reps": null, "duration_seconds": 45, "title": "Wall Sit"}"#,
        )
        .unwrap();
        template.apply_patch(&patch);

        assert_eq!(template.title, "Wall Sit");
        assert_eq!(template.reps, None);
        assert_eq!(template.duration_seconds, Some(45));
        // untouched fields survive
        assert_eq!(template.series, Some(3));
        assert_eq!(template.rest_after_series_seconds, Some(90));
        assert_eq!(template.level, Some(ExerciseLevel::Beginner));
    }

    #[test]
    fn test_plan_exercise_source_tagging() {
        let json = r#"{
            "exercise": {"source": "library", "exercise_id": "00000000-0000-0000-0000-000000000001"},
            "section_type": "Main Workout",
            "section_order": 1,
            "planned_reps": 12
        }"#;
        let entry: PlanExercise = serde_json::from_str(json).unwrap();
        assert_eq!(entry.exercise_id(), Some(Uuid::from_u128(1)));
        assert_eq!(entry.planned_reps, Some(12));
        assert_eq!(entry.planned_sets, None);
    }

    #[test]
    fn test_exercise_flattens_template() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000002",
            "title": "Plank",
            "type": "Cool-down",
            "part": "Core",
            "series": 2,
            "duration_seconds": 30,
            "rest_after_series_seconds": 0,
            "created_at": "2024-01-15T10:30:00Z",
            "updated_at": "2024-01-15T10:30:00Z"
        }"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.template.title, "Plank");
        assert_eq!(exercise.template.exercise_type, ExerciseType::CoolDown);
        assert_eq!(exercise.template.rest_after_series_seconds, Some(0));
        assert_eq!(exercise.template.reps, None);
    }
}
