use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use plansync_core::connect::{self, CalendarQuery};
use plansync_core::*;
use serde_json::json;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "plansync")]
#[command(
    about = "Compile structured workouts and schedule training plans on Garmin Connect",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule every session of a training plan
    Schedule {
        /// Plan file (.json or .toml)
        plan: PathBuf,

        /// Preview without touching the calendar
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Write a JSON report of the run
        #[arg(long)]
        report: Option<PathBuf>,

        /// Move the plan so its first session falls on this date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Print the upload payload for a workout file
    Compile {
        /// Workout file (.json or .toml)
        workout: PathBuf,
    },

    /// Upload a workout, optionally scheduling it
    Upload {
        workout: PathBuf,

        /// Schedule on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Show the calendar for a month, or the week around a day
    Calendar {
        #[arg(long)]
        year: i32,

        /// Month (1-12)
        #[arg(long)]
        month: u32,

        /// Day of month; selects the week view
        #[arg(long)]
        day: Option<u32>,

        /// First day of the week view (0 = Sunday, 1 = Monday, ...)
        #[arg(long, default_value_t = 1)]
        start: u32,
    },

    /// Manage workouts in the library
    Workouts {
        #[command(subcommand)]
        action: WorkoutAction,
    },
}

#[derive(Subcommand)]
enum WorkoutAction {
    /// List all workouts
    List,
    /// Show one workout
    Get { id: String },
    /// Delete a workout
    Delete { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        plansync_core::logging::init_with_level("debug");
    } else {
        plansync_core::logging::init();
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let errors = get_default_catalog().validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid catalog".into()));
    }

    match cli.command {
        Commands::Schedule {
            plan,
            dry_run,
            yes,
            report,
            start_date,
        } => cmd_schedule(&config, &plan, dry_run, yes, report.as_deref(), start_date),
        Commands::Compile { workout } => cmd_compile(&workout),
        Commands::Upload {
            workout,
            date,
            dry_run,
        } => cmd_upload(&config, &workout, date, dry_run),
        Commands::Calendar {
            year,
            month,
            day,
            start,
        } => {
            let query = match day {
                Some(day) => CalendarQuery::week(year, month, day, start),
                None => CalendarQuery::month(year, month),
            };
            cmd_calendar(&config, query)
        }
        Commands::Workouts { action } => cmd_workouts(&config, action),
    }
}

fn cmd_schedule(
    config: &Config,
    plan_path: &Path,
    dry_run: bool,
    yes: bool,
    report_path: Option<&Path>,
    start_date: Option<NaiveDate>,
) -> Result<ExitCode> {
    let mut plan = TrainingPlan::load(plan_path)?;
    if let Some(start) = start_date {
        plan.shift_to(start);
    }

    display_plan(&plan);

    if plan.sessions.is_empty() {
        println!("\nNo sessions to schedule.");
        return Ok(ExitCode::SUCCESS);
    }

    if dry_run {
        println!("\nDRY RUN MODE - No workouts will be scheduled\n");
    } else if !yes && !confirm("Do you want to schedule these workouts to Garmin Connect?")? {
        println!("Cancelled");
        return Ok(ExitCode::SUCCESS);
    }

    let dry = DryRunApi;
    let http;
    let api: &dyn RemoteApi = if dry_run {
        &dry
    } else {
        http = remote_api(config)?;
        &http
    };

    let clock = SystemClock;
    let scheduler = Scheduler::new(api, &StructuredInterpreter, &clock)
        .with_options(config.scheduler.options());

    println!("Scheduling workouts...\n");
    let mut results = scheduler.schedule_plan(&plan);
    for result in &results {
        display_result(result);
    }

    if !dry_run {
        println!("\nValidating scheduled workouts...\n");
        scheduler.validate_results(&plan, &mut results);
        for result in results.iter().filter(|r| !r.is_rest_day()) {
            match &result.validation_status {
                Some(status) if status.is_valid() => {
                    println!("✓ Validated {}: {}", result.date, result.session_name)
                }
                Some(status) => println!("✗ Validation failed {}: {}", result.date, status),
                None => {}
            }
        }
    }

    let report = PlanReport::new(&plan, dry_run, results);
    display_summary(&report.summary, dry_run);

    if let Some(path) = report_path {
        report.write_to(path)?;
        println!("\nReport written to {}", path.display());
    }

    if report.summary.has_failures() {
        println!("\nSome workouts failed to schedule or validate. Check the logs for details.");
        Ok(ExitCode::FAILURE)
    } else {
        println!("\n✓ All workouts processed successfully!");
        Ok(ExitCode::SUCCESS)
    }
}

fn cmd_compile(workout_path: &Path) -> Result<ExitCode> {
    let spec = WorkoutSpec::load(workout_path)?;
    let compiled = compile_spec(&spec)?;
    println!("{}", serde_json::to_string_pretty(&compiled)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_upload(
    config: &Config,
    workout_path: &Path,
    date: Option<NaiveDate>,
    dry_run: bool,
) -> Result<ExitCode> {
    let spec = WorkoutSpec::load(workout_path)?;
    let compiled = compile_spec(&spec)?;

    let dry = DryRunApi;
    let http;
    let api: &dyn RemoteApi = if dry_run {
        &dry
    } else {
        http = remote_api(config)?;
        &http
    };

    let workout_id = connect::create_workout(api, &compiled)?;
    println!("✓ Uploaded '{}' as workout {}", compiled.workout_name, workout_id);
    println!(
        "  Estimated duration: {} min",
        compiled.estimated_duration_in_secs / 60
    );

    if let Some(date) = date {
        let schedule_id = connect::schedule_workout(api, &workout_id, date)?;
        println!("✓ Scheduled on {} (schedule {})", date, schedule_id);
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_calendar(config: &Config, query: CalendarQuery) -> Result<ExitCode> {
    query.validate()?;

    let api = remote_api(config)?;
    let calendar = connect::calendar(&api, &query)?;

    let output = json!({
        "calendar": calendar,
        "view_type": query.view_type(),
        "period": {
            "year": query.year,
            "month": query.month,
            "day": query.day,
            "start": query.day.map(|_| query.start),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_workouts(config: &Config, action: WorkoutAction) -> Result<ExitCode> {
    let api = remote_api(config)?;

    match action {
        WorkoutAction::List => {
            let workouts = connect::list_workouts(&api)?;
            println!("{}", serde_json::to_string_pretty(&workouts)?);
        }
        WorkoutAction::Get { id } => {
            let workout = connect::get_workout_json(&api, &id)?;
            println!("{}", serde_json::to_string_pretty(&workout)?);
        }
        WorkoutAction::Delete { id } => {
            connect::delete_workout(&api, &id)?;
            println!("✓ Deleted workout {}", id);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn remote_api(config: &Config) -> Result<HttpRemoteApi> {
    let api = HttpRemoteApi::from_config(&config.remote)?;
    tracing::debug!("Remote base URL: {}", api.base_url());
    Ok(api)
}

fn display_plan(plan: &TrainingPlan) {
    let date_or_dash = |date: Option<NaiveDate>| {
        date.map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TRAINING PLAN");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Title:          {}", plan.title);
    println!("  Start Date:     {}", date_or_dash(plan.start_date()));
    println!("  End Date:       {}", date_or_dash(plan.end_date()));
    println!("  Total Weeks:    {}", plan.weeks().len());
    println!("  Total Sessions: {}", plan.sessions.len());
}

fn display_result(result: &ScheduleResult) {
    if result.is_rest_day() {
        println!("○ Skipped {}: Rest day", result.date);
    } else if result.skipped {
        println!("⟳ Exists {}: {} (matched)", result.date, result.session_name);
    } else if result.success {
        println!("✓ Scheduled {}: {}", result.date, result.session_name);
    } else {
        println!(
            "✗ Failed {}: {}",
            result.date,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}

fn display_summary(summary: &PlanSummary, dry_run: bool) {
    println!("\nScheduling Summary:");
    println!("  ✓ Newly scheduled: {}", summary.newly_scheduled);
    println!("  ⟳ Already existed (matched): {}", summary.already_matching);
    println!("  ○ Rest days: {}", summary.rest_days);
    println!("  ✗ Failed: {}", summary.failed);

    if !dry_run {
        println!("\nValidation Summary:");
        println!("  ✓ Validated: {}", summary.validated);
        println!("  ✗ Validation failed: {}", summary.validation_failed);
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
