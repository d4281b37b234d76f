use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;
use workout_core::config::DataConfig;
use workout_core::*;

#[derive(Parser)]
#[command(name = "liftplan")]
#[command(about = "Workout plan builder and session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the exercise library
    Exercise {
        #[command(subcommand)]
        action: ExerciseCommand,
    },

    /// Manage workout plans
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },

    /// Start, inspect and complete workout sessions
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Roll up the session log to CSV
    Rollup {
        /// Clean up processed session logs after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add an exercise from a JSON file
    Add {
        #[arg(long)]
        file: PathBuf,
    },
    /// Apply a JSON patch to an exercise
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        file: PathBuf,
    },
    /// Remove an exercise no plan uses
    Remove {
        #[arg(long)]
        id: Uuid,
    },
    /// List all exercises
    List,
    /// Validate an exercise JSON file without saving it
    Check {
        #[arg(long)]
        file: PathBuf,
    },
    /// Find an exercise by title
    Find { title: String },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Add a plan from a JSON file
    Add {
        #[arg(long)]
        file: PathBuf,
    },
    /// List all plans
    List,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Start a session from a plan
    Start {
        #[arg(long)]
        plan: Uuid,
    },
    /// Show the session in progress
    Show,
    /// Complete the session in progress and log it
    Complete,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Validation(messages)) => {
            eprintln!("Validation failed:");
            for message in messages {
                eprintln!("  - {}", message);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    workout_core::logging::init_with_level(&config.logging.level);

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Exercise { action } => cmd_exercise(&data_dir, action),
        Commands::Plan { action } => cmd_plan(&data_dir, action),
        Commands::Session { action } => cmd_session(&data_dir, action, &config),
        Commands::Rollup { cleanup } => cmd_rollup(&data_dir, cleanup),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn cmd_exercise(data_dir: &Path, action: ExerciseCommand) -> Result<()> {
    let library_path = DataConfig::library_path(data_dir);
    let now = chrono::Utc::now();

    match action {
        ExerciseCommand::Add { file } => {
            let draft: ExerciseDraft = read_json(&file)?;
            let (id, title) = Library::update(&library_path, |library| {
                let exercise = library.add_exercise(draft, now)?;
                Ok((exercise.id, exercise.template.title.clone()))
            })?;
            println!("✓ Added exercise '{}' ({})", title, id);
        }

        ExerciseCommand::Update { id, file } => {
            let patch: ExercisePatch = read_json(&file)?;
            let title = Library::update(&library_path, |library| {
                Ok(library.update_exercise(id, &patch, now)?.template.title.clone())
            })?;
            println!("✓ Updated exercise '{}' ({})", title, id);
        }

        ExerciseCommand::Remove { id } => {
            let removed = Library::update(&library_path, |library| library.remove_exercise(id))?;
            println!("✓ Removed exercise '{}'", removed.template.title);
        }

        ExerciseCommand::List => {
            let library = Library::load(&library_path)?;
            if library.exercises.is_empty() {
                println!("No exercises yet.");
            }
            for exercise in &library.exercises {
                display_exercise(exercise);
            }
        }

        ExerciseCommand::Check { file } => {
            let draft: ExerciseDraft = read_json(&file)?;
            let errors = validate_exercise_draft(&draft);
            if !errors.is_empty() {
                return Err(Error::Validation(errors));
            }
            println!("✓ Exercise is valid");
        }

        ExerciseCommand::Find { title } => {
            let library = Library::load(&library_path)?;
            match library.find_exercise_by_title(&title) {
                Some(exercise) => display_exercise(exercise),
                None => return Err(Error::NotFound(format!("exercise titled '{}'", title))),
            }
        }
    }

    Ok(())
}

fn cmd_plan(data_dir: &Path, action: PlanCommand) -> Result<()> {
    let library_path = DataConfig::library_path(data_dir);

    match action {
        PlanCommand::Add { file } => {
            let draft: PlanDraft = read_json(&file)?;
            let now = chrono::Utc::now();
            let (id, name) = Library::update(&library_path, |library| {
                let plan = library.add_plan(draft, now)?;
                Ok((plan.id, plan.name.clone()))
            })?;
            println!("✓ Added plan '{}' ({})", name, id);
        }

        PlanCommand::List => {
            let library = Library::load(&library_path)?;
            if library.plans.is_empty() {
                println!("No plans yet.");
            }
            for plan in &library.plans {
                println!(
                    "{}  {}  ({} exercises)",
                    plan.id,
                    plan.name,
                    plan.exercises.len()
                );
            }
        }
    }

    Ok(())
}

fn cmd_session(data_dir: &Path, action: SessionCommand, config: &Config) -> Result<()> {
    let library_path = DataConfig::library_path(data_dir);
    let now = chrono::Utc::now();

    match action {
        SessionCommand::Start { plan } => {
            let session = Library::update(&library_path, |library| {
                Ok(library.start_session(plan, now)?.clone())
            })?;
            display_session(&session);
        }

        SessionCommand::Show => {
            let library = Library::load(&library_path)?;
            let session = library.active_session.as_ref().ok_or(Error::NoActiveSession)?;
            display_session(session);
        }

        SessionCommand::Complete => {
            // Log before the library is saved: a failed append keeps the
            // session active instead of dropping it
            let wal_path = DataConfig::session_log_path(data_dir);
            let session = Library::update(&library_path, |library| {
                let session = library.complete_active_session(now)?;
                JsonlSink::new(&wal_path).append(&session)?;
                Ok(session)
            })?;

            println!(
                "✓ Session '{}' completed ({} exercises)",
                session.plan_name_at_time,
                session.exercises.len()
            );

            if config.session.rollup_on_complete {
                cmd_rollup(data_dir, false)?;
            }
        }
    }

    Ok(())
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let wal_path = DataConfig::session_log_path(data_dir);
    let csv_path = DataConfig::history_csv_path(data_dir);

    if !wal_path.exists() {
        println!("No session log found - nothing to roll up.");
        return Ok(());
    }

    let count = workout_core::rollup::wal_to_csv_and_archive(&wal_path, &csv_path)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        if let Some(wal_dir) = wal_path.parent() {
            let cleaned = workout_core::rollup::cleanup_processed_wals(wal_dir)?;
            if cleaned > 0 {
                println!("✓ Cleaned up {} processed session logs", cleaned);
            }
        }
    }

    Ok(())
}

fn display_exercise(exercise: &Exercise) {
    let t = &exercise.template;
    let volume = match (t.reps, t.duration_seconds) {
        (Some(reps), _) => format!("{} reps", reps),
        (None, Some(seconds)) => format!("{}s", seconds),
        (None, None) => "-".into(),
    };
    println!(
        "{}  {}  [{} / {}]  {} x {}",
        exercise.id,
        t.title,
        t.exercise_type,
        t.part,
        t.series.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
        volume
    );
}

fn display_session(session: &WorkoutSession) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", session.plan_name_at_time);
    println!("╰─────────────────────────────────────────╯");
    println!("  Session: {}", session.id);
    println!("  Started: {}", session.started_at.to_rfc3339());

    let estimate = session.estimated_duration_seconds();
    if estimate > 0 {
        println!("  Estimated: ~{} min", (estimate + 59) / 60);
    }
    println!();

    let mut current_section = None;
    for e in &session.exercises {
        if current_section != Some(e.section_type) {
            println!("  {}", e.section_type);
            current_section = Some(e.section_type);
        }

        let mut parts = Vec::new();
        if let Some(sets) = e.planned_sets {
            parts.push(format!("{} sets", sets));
        }
        if let Some(reps) = e.planned_reps {
            parts.push(format!("{} reps", reps));
        }
        if let Some(seconds) = e.planned_duration_seconds {
            parts.push(format!("{}s", seconds));
        }
        if let Some(rest) = e.planned_rest_seconds {
            parts.push(format!("rest {}s", rest));
        }

        println!(
            "    {}. {}  {}",
            e.position,
            e.exercise_title_at_time,
            parts.join(", ")
        );
    }

    println!();
}
