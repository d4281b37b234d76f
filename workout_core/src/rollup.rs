//! CSV rollup of the session log.
//!
//! Converts logged sessions into a flat CSV history, one row per session
//! exercise, then archives the log so the next rollup starts clean.

use crate::{Result, WorkoutSession};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    session_id: String,
    plan_name: &'a str,
    started_at: String,
    completed_at: Option<String>,
    position: u32,
    section: &'static str,
    exercise_title: &'a str,
    exercise_part: String,
    planned_sets: Option<i32>,
    planned_reps: Option<i32>,
    planned_duration_seconds: Option<i32>,
    planned_rest_seconds: Option<i32>,
}

fn rows(session: &WorkoutSession) -> impl Iterator<Item = CsvRow<'_>> {
    session.exercises.iter().map(move |e| CsvRow {
        session_id: session.id.to_string(),
        plan_name: &session.plan_name_at_time,
        started_at: session.started_at.to_rfc3339(),
        completed_at: session.completed_at.map(|t| t.to_rfc3339()),
        position: e.position,
        section: e.section_type.label(),
        exercise_title: &e.exercise_title_at_time,
        exercise_part: e.exercise_part_at_time.to_string(),
        planned_sets: e.planned_sets,
        planned_reps: e.planned_reps,
        planned_duration_seconds: e.planned_duration_seconds,
        planned_rest_seconds: e.planned_rest_seconds,
    })
}

/// Roll up logged sessions into CSV and archive the log
///
/// This function:
/// 1. Reads all sessions from the log
/// 2. Appends their exercises to the CSV (headers only on a new file)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to `.wal.processed`
/// 5. Returns the number of sessions processed
///
/// The CSV is fsynced before the log is renamed, and the log is renamed
/// rather than deleted so it can be recovered by hand.
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let sessions = crate::wal::read_sessions(wal_path)?;

    if sessions.is_empty() {
        tracing::info!("No sessions in log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    let mut row_count = 0;
    for session in &sessions {
        for row in rows(session) {
            writer.serialize(row)?;
            row_count += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!(
        "Wrote {} sessions ({} exercise rows) to CSV",
        sessions.len(),
        row_count
    );

    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived session log to {:?}", processed_path);

    Ok(sessions.len())
}

/// Remove archived `.processed` logs in `dir`
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed session log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed session logs", count);
    }

    Ok(count)
}
