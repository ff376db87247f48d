//! GradePal - personal grade tracking
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gradepal::cli::{
    format_output, CommandOutput, CourseCommand, GradeCommand, OutputOptions, PredictCommand,
    SummaryCommand,
};
use gradepal::config::{crash_log_path, Config};
use gradepal::core::GradeUpdate;
use gradepal::error::{exit_codes, GradepalError};
use gradepal::predict::ConfiguredPredictor;
use gradepal::storage::FileKeyValueStore;
use gradepal::store::CourseStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// GradePal - track courses, grades and GPA
#[derive(Parser)]
#[command(name = "gradepal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseAction,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },

    /// Manage grades within a course
    Grade {
        #[command(subcommand)]
        action: GradeAction,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },

    /// Show every course with its grade and the overall GPA
    Summary {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Predict the final grade of a course under two scenarios
    Predict {
        /// Course ID
        course_id: String,
        /// Optimistic effort scenario
        #[arg(long)]
        optimistic: Option<String>,
        /// Pessimistic effort scenario
        #[arg(long)]
        pessimistic: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Subcommand)]
enum CourseAction {
    /// Add a course
    Add {
        /// Course name
        name: String,
        /// Credit hours (0-10)
        #[arg(long, allow_negative_numbers = true)]
        credits: f64,
    },
    /// List courses
    List,
    /// Show a course and its grades
    Show {
        /// Course ID
        id: String,
    },
    /// Update a course
    Update {
        /// Course ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New credit hours
        #[arg(long, allow_negative_numbers = true)]
        credits: Option<f64>,
    },
    /// Delete a course and its grades
    Delete {
        /// Course ID
        id: String,
    },
}

#[derive(Subcommand)]
enum GradeAction {
    /// Add a grade to a course
    Add {
        /// Course ID
        course_id: String,
        /// Assignment name
        name: String,
        /// Score in percent (0-120)
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
        /// Weight in percent of the course (0-100)
        #[arg(long, allow_negative_numbers = true)]
        weight: f64,
    },
    /// Update a grade
    Update {
        /// Course ID
        course_id: String,
        /// Grade ID
        grade_id: String,
        /// New assignment name
        #[arg(long)]
        name: Option<String>,
        /// New score
        #[arg(long, allow_negative_numbers = true)]
        score: Option<f64>,
        /// New weight
        #[arg(long, allow_negative_numbers = true)]
        weight: Option<f64>,
    },
    /// Delete a grade
    Delete {
        /// Course ID
        course_id: String,
        /// Grade ID
        grade_id: String,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("gradepal error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.gradepal/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("gradepal panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Course {
            action,
            json,
            quiet,
        } => run_course(action, OutputOptions { json, quiet }, &config),
        Commands::Grade {
            action,
            json,
            quiet,
        } => run_grade(action, OutputOptions { json, quiet }, &config),
        Commands::Summary { json, quiet } => run_summary(OutputOptions { json, quiet }, &config),
        Commands::Predict {
            course_id,
            optimistic,
            pessimistic,
            json,
            quiet,
        } => run_predict(
            &course_id,
            optimistic.as_deref(),
            pessimistic.as_deref(),
            OutputOptions { json, quiet },
            &config,
        ),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Open the course store configured by `config`.
fn open_store(config: &Config) -> Result<CourseStore<FileKeyValueStore>, GradepalError> {
    let dir = config.storage.resolve_data_dir().ok_or_else(|| {
        GradepalError::config("Could not determine data directory (no home directory)")
    })?;
    let storage = FileKeyValueStore::with_dir(dir)?;
    Ok(CourseStore::open(storage, config.storage.key.clone()))
}

/// Print a command's output and convert its outcome to an exit code.
fn finish<O: CommandOutput>(output: &O, options: &OutputOptions) -> ExitCode {
    let formatted = format_output(output, options);
    if !formatted.is_empty() {
        print!("{}", formatted);
        if options.json {
            println!();
        }
    }
    success_to_exit_code(output.is_success())
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn run_course(
    action: CourseAction,
    options: OutputOptions,
    config: &Config,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut store = open_store(config)?;
    let mut cmd = CourseCommand::new(&mut store);

    let output = match action {
        CourseAction::Add { name, credits } => cmd.add(&name, credits),
        CourseAction::List => cmd.list(),
        CourseAction::Show { id } => cmd.show(&id),
        CourseAction::Update { id, name, credits } => cmd.update(&id, name.as_deref(), credits),
        CourseAction::Delete { id } => cmd.delete(&id),
    };

    Ok(finish(&output, &options))
}

fn run_grade(
    action: GradeAction,
    options: OutputOptions,
    config: &Config,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut store = open_store(config)?;
    let mut cmd = GradeCommand::new(&mut store);

    let output = match action {
        GradeAction::Add {
            course_id,
            name,
            score,
            weight,
        } => cmd.add(&course_id, &name, score, weight),
        GradeAction::Update {
            course_id,
            grade_id,
            name,
            score,
            weight,
        } => cmd.update(
            &course_id,
            &grade_id,
            GradeUpdate {
                name,
                score,
                weight,
            },
        ),
        GradeAction::Delete {
            course_id,
            grade_id,
        } => cmd.delete(&course_id, &grade_id),
    };

    Ok(finish(&output, &options))
}

fn run_summary(
    options: OutputOptions,
    config: &Config,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let output = SummaryCommand::new(&store).run();
    Ok(finish(&output, &options))
}

fn run_predict(
    course_id: &str,
    optimistic: Option<&str>,
    pessimistic: Option<&str>,
    options: OutputOptions,
    config: &Config,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let predictor = ConfiguredPredictor::new(config.prediction.clone());

    let output = PredictCommand::new(&store, predictor).run(course_id, optimistic, pessimistic);
    Ok(finish(&output, &options))
}
