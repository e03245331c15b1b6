//! Idempotent scheduling engine.
//!
//! Each session goes through:
//! 1. Interpretation (rest days stop here, with no network calls)
//! 2. Compilation (errors fail the session without retrying)
//! 3. One retried unit of work: probe the calendar for a matching workout,
//!    clear stale entries, upload, schedule
//!
//! A separate validation pass re-reads the calendar after a whole plan has
//! been attempted and annotates the results.

use crate::clock::Clock;
use crate::compiler::compile_spec;
use crate::connect::{self, RemoteWorkout};
use crate::interpreter::{Interpretation, SessionInterpreter};
use crate::payload::CompiledWorkout;
use crate::remote::RemoteApi;
use crate::{Result, ScheduleResult, TrainingPlan, TrainingSession, ValidationStatus};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pacing and retry knobs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub retry_attempts: u32,
    /// Wait after failed attempt `n` is `n * backoff_step`
    pub backoff_step: Duration,
    pub session_delay: Duration,
    pub validation_delay: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            backoff_step: Duration::from_secs(2),
            session_delay: Duration::from_millis(500),
            validation_delay: Duration::from_millis(200),
        }
    }
}

pub struct Scheduler<'a> {
    api: &'a dyn RemoteApi,
    interpreter: &'a dyn SessionInterpreter,
    clock: &'a dyn Clock,
    options: SchedulerOptions,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        api: &'a dyn RemoteApi,
        interpreter: &'a dyn SessionInterpreter,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            api,
            interpreter,
            clock,
            options: SchedulerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn is_dry_run(&self) -> bool {
        self.api.is_dry_run()
    }

    /// Schedule every session of a plan, in order
    pub fn schedule_plan(&self, plan: &TrainingPlan) -> Vec<ScheduleResult> {
        info!(
            "Scheduling {} sessions from '{}'{}",
            plan.sessions.len(),
            plan.title,
            if self.is_dry_run() { " (dry run)" } else { "" }
        );

        let mut results = Vec::with_capacity(plan.sessions.len());
        for (index, session) in plan.sessions.iter().enumerate() {
            if index > 0 && !self.is_dry_run() {
                self.clock.sleep(self.options.session_delay);
            }

            let result = self.schedule_session(session);
            log_outcome(&result);
            results.push(result);
        }
        results
    }

    /// Schedule one session; every failure ends up in the returned result
    pub fn schedule_session(&self, session: &TrainingSession) -> ScheduleResult {
        let spec = match self.interpreter.interpret(session) {
            Ok(Interpretation::Workout(spec)) => spec,
            Ok(Interpretation::RestDay) => return ScheduleResult::rest_day(session),
            Err(e) => return ScheduleResult::failed(session, e.to_string()),
        };

        let compiled = match compile_spec(&spec) {
            Ok(compiled) => compiled,
            Err(e) => return ScheduleResult::failed(session, e.to_string()),
        };

        let attempts = self.options.retry_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.attempt(session, &compiled) {
                Ok(result) => return result,
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < attempts {
                        let wait = self.options.backoff_step * attempt;
                        warn!(
                            "Attempt {} failed for {}: {}. Retrying in {:?}",
                            attempt, session.date, last_error, wait
                        );
                        self.clock.sleep(wait);
                    }
                }
            }
        }

        ScheduleResult::failed(session, last_error)
    }

    /// Probe, clean up, upload, schedule
    fn attempt(
        &self,
        session: &TrainingSession,
        compiled: &CompiledWorkout,
    ) -> Result<ScheduleResult> {
        let date = session.date;
        let mut stale = Vec::new();

        if let Some(snapshot) = connect::calendar_for_date(self.api, date)? {
            for item in snapshot.workouts_on(date) {
                if let Some(workout_id) = &item.workout_id {
                    let existing = match connect::get_workout(self.api, workout_id) {
                        Ok(existing) => Some(existing),
                        Err(e) => {
                            warn!("Could not fetch workout {} on {}: {}", workout_id, date, e);
                            None
                        }
                    };
                    if existing.is_some_and(|existing| workouts_match(&existing, compiled)) {
                        info!("Workout on {} already matches '{}'", date, compiled.workout_name);
                        return Ok(ScheduleResult {
                            date,
                            session_name: session.session.clone(),
                            workout_id: Some(workout_id.clone()),
                            schedule_id: item.id.clone(),
                            success: true,
                            skipped: true,
                            error: None,
                            validation_status: None,
                        });
                    }
                }
                if let Some(schedule_id) = &item.id {
                    stale.push(schedule_id.clone());
                }
            }
        }

        for schedule_id in stale {
            info!("Removing non-matching workout {} on {}", schedule_id, date);
            if let Err(e) = connect::delete_schedule(self.api, &schedule_id) {
                warn!("Failed to delete scheduled workout {}: {}", schedule_id, e);
            }
        }

        let workout_id = connect::create_workout(self.api, compiled)?;
        let schedule_id = connect::schedule_workout(self.api, &workout_id, date)?;

        Ok(ScheduleResult {
            date,
            session_name: session.session.clone(),
            workout_id: Some(workout_id),
            schedule_id: Some(schedule_id),
            success: true,
            skipped: false,
            error: None,
            validation_status: None,
        })
    }

    /// Annotate results with what the calendar now shows
    ///
    /// `results` must line up with `plan.sessions`.
    pub fn validate_results(&self, plan: &TrainingPlan, results: &mut [ScheduleResult]) {
        let mut checked = 0;

        for (session, result) in plan.sessions.iter().zip(results.iter_mut()) {
            if result.is_rest_day() {
                result.validation_status = Some(ValidationStatus::RestDay);
                continue;
            }

            if checked > 0 && !self.is_dry_run() {
                self.clock.sleep(self.options.validation_delay);
            }
            checked += 1;

            let status = self.validate_session(session);
            if status.is_valid() {
                info!("Validated {}: {}", session.date, session.session);
            } else {
                warn!("Validation failed {}: {}", session.date, status);
            }
            result.validation_status = Some(status);
        }
    }

    /// Check that a workout with a name is on the calendar for the session date
    pub fn validate_session(&self, session: &TrainingSession) -> ValidationStatus {
        if self.is_dry_run() {
            return ValidationStatus::ValidDryRun;
        }

        let snapshot = match connect::calendar_for_date(self.api, session.date) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return ValidationStatus::NoCalendarData,
            Err(e) => return ValidationStatus::Error(e.to_string()),
        };

        let Some(item) = snapshot.workouts_on(session.date).next() else {
            return ValidationStatus::NoWorkoutOnDate;
        };
        let Some(workout_id) = &item.workout_id else {
            return ValidationStatus::MissingWorkoutId;
        };

        match connect::get_workout(self.api, workout_id) {
            Ok(workout) if !workout.name().trim().is_empty() => ValidationStatus::Valid,
            Ok(_) => ValidationStatus::MissingWorkoutName,
            Err(e) => {
                debug!("Could not fetch workout {}: {}", workout_id, e);
                ValidationStatus::DetailsUnavailable
            }
        }
    }
}

/// Whether a workout already on the calendar is the one being scheduled
///
/// Sport and total node count must agree, and one name must contain the
/// other (ignoring case).
pub fn workouts_match(existing: &RemoteWorkout, planned: &CompiledWorkout) -> bool {
    if existing.sport_key() != Some(planned.sport_type.sport_type_key) {
        return false;
    }
    if existing.workout_segments.is_empty() {
        return false;
    }
    if existing.step_count() != planned.flatten().len() {
        return false;
    }

    let existing_name = existing.name().trim().to_lowercase();
    let planned_name = planned.workout_name.trim().to_lowercase();
    if existing_name.is_empty() || planned_name.is_empty() {
        return false;
    }

    existing_name == planned_name
        || existing_name.contains(&planned_name)
        || planned_name.contains(&existing_name)
}

fn log_outcome(result: &ScheduleResult) {
    if result.is_rest_day() {
        info!("Skipped {}: rest day", result.date);
    } else if result.skipped {
        info!("Exists {}: {} (matched)", result.date, result.session_name);
    } else if result.success {
        info!("Scheduled {}: {}", result.date, result.session_name);
    } else {
        warn!(
            "Failed {}: {}",
            result.date,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}
