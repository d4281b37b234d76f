//! Append-only log of completed workout sessions.
//!
//! One frozen session per JSONL line. Only completed sessions belong here:
//! the in-progress session lives in the library file until it finishes, and
//! the CSV rollup reads this log as the finished history.

use crate::types::SessionStatus;
use crate::{Error, Result, WorkoutSession};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Where completed sessions go once they leave the library
pub trait SessionSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()>;
}

/// JSONL session log, locked exclusively per append
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn check_completed(session: &WorkoutSession) -> Result<()> {
        if session.status != SessionStatus::Completed || session.completed_at.is_none() {
            return Err(Error::SessionState(format!(
                "only completed sessions can be logged, session {} is {:?}",
                session.id, session.status
            )));
        }
        Ok(())
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()> {
        Self::check_completed(session)?;
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!(
            "Logged session {} ('{}', {} exercises)",
            session.id,
            session.plan_name_at_time,
            session.exercises.len()
        );
        Ok(())
    }
}

/// Read the completed sessions from a session log
///
/// Malformed lines and entries that never completed are skipped with a
/// warning rather than failing the whole read.
pub fn read_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSession>(&line) {
            Ok(session) if session.status == SessionStatus::Completed => sessions.push(session),
            Ok(session) => {
                tracing::warn!(
                    "Skipping session {} at line {}: status is {:?}",
                    session.id,
                    line_num + 1,
                    session.status
                );
            }
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} completed sessions from {:?}", sessions.len(), path);
    Ok(sessions)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{BodyPart, ExerciseType, SessionExercise, SessionStatus};
    use chrono::Utc;
    use uuid::Uuid;

    pub(crate) fn completed_session(plan_name: &str, exercise_count: u32) -> WorkoutSession {
        let exercises = (1..=exercise_count)
            .map(|position| SessionExercise {
                id: Uuid::new_v4(),
                position,
                exercise_id: Some(Uuid::new_v4()),
                section_type: ExerciseType::MainWorkout,
                exercise_title_at_time: format!("Exercise {}", position),
                exercise_type_at_time: ExerciseType::MainWorkout,
                exercise_part_at_time: BodyPart::Chest,
                exercise_is_unilateral_at_time: false,
                planned_sets: Some(3),
                planned_reps: Some(8),
                planned_duration_seconds: None,
                planned_rest_seconds: Some(90),
                planned_rest_after_series_seconds: None,
                planned_estimated_set_time_seconds: None,
            })
            .collect();

        WorkoutSession {
            id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            plan_name_at_time: plan_name.into(),
            status: SessionStatus::Completed,
            started_at: Utc::now(),
            completed_at: Some(Utc::now()),
            exercises,
        }
    }

    #[test]
    fn test_append_and_read_single_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");

        let session = completed_session("Push", 2);

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&session).unwrap();

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0], session);
    }

    #[test]
    fn test_append_multiple_sessions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");

        let mut sink = JsonlSink::new(&wal_path);
        for _ in 0..5 {
            sink.append(&completed_session("Pull", 1)).unwrap();
        }

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 5);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&completed_session("Legs", 1)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
            writeln!(file, "{{ not a session").unwrap();
        }
        sink.append(&completed_session("Legs", 1)).unwrap();

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_append_rejects_in_progress_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("wal/sessions.wal");

        let mut session = completed_session("Push", 1);
        session.status = SessionStatus::InProgress;
        session.completed_at = None;

        let err = JsonlSink::new(&wal_path).append(&session).unwrap_err();
        assert!(matches!(err, Error::SessionState(_)));
        assert!(!wal_path.exists());
    }

    #[test]
    fn test_append_rejects_completed_status_without_timestamp() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");

        let mut session = completed_session("Pull", 1);
        session.completed_at = None;

        let err = JsonlSink::new(&wal_path).append(&session).unwrap_err();
        assert!(matches!(err, Error::SessionState(_)));
        assert!(read_sessions(&wal_path).unwrap().is_empty());
    }

    #[test]
    fn test_read_skips_sessions_that_never_completed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&completed_session("Legs", 2)).unwrap();

        let mut stray = completed_session("Legs", 2);
        stray.status = SessionStatus::InProgress;
        stray.completed_at = None;
        {
            let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
            writeln!(file, "{}", serde_json::to_string(&stray).unwrap()).unwrap();
        }

        let sessions = read_sessions(&wal_path).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].status, SessionStatus::Completed);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sessions = read_sessions(&temp_dir.path().join("nonexistent.wal")).unwrap();
        assert!(sessions.is_empty());
    }
}
