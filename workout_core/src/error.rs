//! Error types for the workout_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more business-rule or field violations.
    ///
    /// Carries every message the validator produced, in rule order.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A plan references an exercise that is not in the supplied lookup.
    ///
    /// This is an internal consistency failure, never a user-correctable one.
    #[error("Plan references missing exercise {exercise_id}")]
    MissingExercise { exercise_id: Uuid },

    /// Exercise title collides with an existing one after normalization
    #[error("An exercise titled '{0}' already exists")]
    DuplicateTitle(String),

    /// Record lookup failed
    #[error("Not found: {0}")]
    NotFound(String),

    /// Another session is still in progress
    #[error("Session {0} is already in progress")]
    SessionInProgress(Uuid),

    /// No session is in progress
    #[error("No session in progress")]
    NoActiveSession,

    /// Illegal session status transition
    #[error("Session state error: {0}")]
    SessionState(String),

    /// Plan has nothing to snapshot
    #[error("Plan '{0}' has no exercises")]
    EmptyPlan(String),

    /// Exercise is still referenced by a plan
    #[error("Exercise '{0}' is used by a workout plan")]
    ExerciseInUse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
