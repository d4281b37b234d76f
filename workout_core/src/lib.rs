#![forbid(unsafe_code)]

//! Core domain model and business logic for the liftplan workout planner.
//!
//! This crate provides:
//! - Domain types (exercises, plans, sessions, session snapshots)
//! - Title normalization for deduplication and lookup
//! - Business-rule validation
//! - Session snapshot construction
//! - Persistence (library store, session log, CSV rollup)

pub mod types;
pub mod error;
pub mod normalize;
pub mod rules;
pub mod snapshot;
pub mod session;
pub mod config;
pub mod logging;
pub mod store;
pub mod wal;
pub mod rollup;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use normalize::{normalize_title, normalize_title_for_db_lookup};
pub use rules::{
    validate_exercise_business_rules, validate_exercise_draft, validate_exercise_template,
    validate_plan_draft, RuleCandidate,
};
pub use snapshot::{build_session_snapshots, build_session_snapshots_with_ids};
pub use session::start_session;
pub use config::Config;
pub use store::Library;
pub use wal::{JsonlSink, SessionSink};
