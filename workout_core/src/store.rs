//! Local library store with file locking.
//!
//! Holds the exercise library, workout plans and the active session in one
//! JSON file. Plays the repository role for the CLI: it owns the duplicate
//! title check and the single in-progress session rule that the pure
//! validators leave to the persistence layer.

use crate::normalize::{normalize_title, normalize_title_for_db_lookup};
use crate::rules::{validate_exercise_draft, validate_exercise_template, validate_plan_draft};
use crate::session::start_session;
use crate::types::{
    Exercise, ExerciseDraft, ExercisePatch, PlanDraft, WorkoutPlan, WorkoutSession,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Everything the user has stored
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Library {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub plans: Vec<WorkoutPlan>,
    /// At most one session is in progress at a time
    #[serde(default)]
    pub active_session: Option<WorkoutSession>,
}

impl Library {
    /// Load the library from a file with shared locking
    ///
    /// Returns an empty library if the file doesn't exist. A file that can't
    /// be opened, locked or read is an error, so a later save never replaces
    /// data that was merely unreadable. A file that reads but doesn't parse is
    /// moved aside to `<name>.corrupt` and an empty library is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No library file found, starting with an empty library");
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        if let Err(e) = read {
            tracing::error!("Failed to read library file {:?}: {}", path, e);
            return Err(e.into());
        }

        match serde_json::from_str::<Library>(&contents) {
            Ok(library) => {
                tracing::debug!(
                    "Loaded library from {:?} ({} exercises, {} plans)",
                    path,
                    library.exercises.len(),
                    library.plans.len()
                );
                Ok(library)
            }
            Err(e) => {
                let backup = path.with_extension("json.corrupt");
                tracing::warn!(
                    "Failed to parse library file {:?}: {}. Moved to {:?}, using empty library.",
                    path,
                    e,
                    backup
                );
                std::fs::rename(path, &backup)?;
                Ok(Self::default())
            }
        }
    }

    /// Save the library atomically (temp file, fsync, rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "library path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved library to {:?}", path);
        Ok(())
    }

    /// Load, modify, and save back; nothing is written if `f` fails
    ///
    /// Holds an exclusive lock on `<name>.lock` for the whole cycle so
    /// concurrent writers serialize instead of losing updates.
    pub fn update<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut Library) -> Result<T>,
    {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path.with_extension("json.lock"))?;
        lock.lock_exclusive()?;

        let result = Self::load(path).and_then(|mut library| {
            let out = f(&mut library)?;
            library.save(path)?;
            Ok(out)
        });

        lock.unlock()?;
        result
    }

    // ------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------

    pub fn exercise(&self, id: Uuid) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Exercises keyed by id, as the snapshot builder expects them
    pub fn exercises_by_id(&self) -> HashMap<Uuid, Exercise> {
        self.exercises.iter().map(|e| (e.id, e.clone())).collect()
    }

    /// Find an exercise by title using the stored-column lookup key
    pub fn find_exercise_by_title(&self, query: &str) -> Option<&Exercise> {
        let key = normalize_title_for_db_lookup(query);
        self.exercises
            .iter()
            .find(|e| normalize_title_for_db_lookup(&e.template.title) == key)
    }

    fn duplicate_of(&self, title: &str, except: Option<Uuid>) -> Option<&Exercise> {
        let key = normalize_title(title);
        self.exercises
            .iter()
            .filter(|e| Some(e.id) != except)
            .find(|e| normalize_title(&e.template.title) == key)
    }

    /// Validate and add a new exercise
    pub fn add_exercise(&mut self, draft: ExerciseDraft, now: DateTime<Utc>) -> Result<&Exercise> {
        let errors = validate_exercise_draft(&draft);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        if let Some(existing) = self.duplicate_of(&draft.title, None) {
            return Err(Error::DuplicateTitle(existing.template.title.clone()));
        }

        let exercise = Exercise {
            id: Uuid::new_v4(),
            template: draft.into_template(),
            created_at: now,
            updated_at: now,
        };
        tracing::info!(
            "Added exercise '{}' ({})",
            exercise.template.title,
            exercise.id
        );

        self.exercises.push(exercise);
        Ok(&self.exercises[self.exercises.len() - 1])
    }

    /// Apply a patch to an exercise and validate the merged result
    ///
    /// Existing session snapshots are never touched.
    pub fn update_exercise(
        &mut self,
        id: Uuid,
        patch: &ExercisePatch,
        now: DateTime<Utc>,
    ) -> Result<&Exercise> {
        let index = self
            .exercises
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("exercise {}", id)))?;

        let mut template = self.exercises[index].template.clone();
        template.apply_patch(patch);
        template.title = template.title.trim().to_string();

        let errors = validate_exercise_template(&template);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        if let Some(existing) = self.duplicate_of(&template.title, Some(id)) {
            return Err(Error::DuplicateTitle(existing.template.title.clone()));
        }

        let exercise = &mut self.exercises[index];
        exercise.template = template;
        exercise.updated_at = now;
        tracing::info!("Updated exercise '{}' ({})", exercise.template.title, id);
        Ok(&*exercise)
    }

    /// Remove an exercise that no plan references
    pub fn remove_exercise(&mut self, id: Uuid) -> Result<Exercise> {
        let index = self
            .exercises
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("exercise {}", id)))?;

        if let Some(plan) = self
            .plans
            .iter()
            .find(|p| p.exercises.iter().any(|pe| pe.exercise_id() == Some(id)))
        {
            tracing::warn!(
                "Refusing to remove exercise {}: used by plan '{}'",
                id,
                plan.name
            );
            return Err(Error::ExerciseInUse(
                self.exercises[index].template.title.clone(),
            ));
        }

        let removed = self.exercises.remove(index);
        tracing::info!("Removed exercise '{}' ({})", removed.template.title, id);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Plans
    // ------------------------------------------------------------------

    pub fn plan(&self, id: Uuid) -> Option<&WorkoutPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Validate and add a new plan
    pub fn add_plan(&mut self, draft: PlanDraft, now: DateTime<Utc>) -> Result<&WorkoutPlan> {
        let errors = validate_plan_draft(&draft, |id| self.exercise(id).is_some());
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let plan = WorkoutPlan {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            part: draft.part,
            exercises: draft.exercises,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(
            "Added plan '{}' ({}) with {} exercises",
            plan.name,
            plan.id,
            plan.exercises.len()
        );

        self.plans.push(plan);
        Ok(&self.plans[self.plans.len() - 1])
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Start a session from a plan unless one is already in progress
    pub fn start_session(&mut self, plan_id: Uuid, now: DateTime<Utc>) -> Result<&WorkoutSession> {
        if let Some(active) = &self.active_session {
            return Err(Error::SessionInProgress(active.id));
        }

        let plan = self
            .plan(plan_id)
            .ok_or_else(|| Error::NotFound(format!("plan {}", plan_id)))?;

        let session = start_session(plan, &self.exercises_by_id(), now)?;
        Ok(&*self.active_session.insert(session))
    }

    /// Complete the active session and hand it back for archiving
    pub fn complete_active_session(&mut self, now: DateTime<Utc>) -> Result<WorkoutSession> {
        let mut session = self.active_session.take().ok_or(Error::NoActiveSession)?;
        session.complete(now)?;
        Ok(session)
    }
}
