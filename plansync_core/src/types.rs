//! Core domain types for plansync.
//!
//! This module defines the fundamental types used throughout the system:
//! - Authored workout descriptions (`WorkoutSpec`, `StepSpec`)
//! - The validated workout tree (`WorkoutStep`, `Target`)
//! - Training plans and their sessions
//! - Scheduling results and validation outcomes

use crate::catalog::{DistanceUnit, StepType, TargetKind, TargetType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Authored Workout Types
// ============================================================================

/// A workout as authored by a coach or produced by a session interpreter
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub sport: String,
    pub steps: Vec<StepSpec>,
}

/// A single authored step, either executable or a repeat container
///
/// Field names follow the authoring format accepted by the platform tooling,
/// so JSON produced for the upload tool deserializes without mapping.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_condition_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_iterations: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepSpec>>,
}

impl StepSpec {
    /// Name used when reporting problems with this step
    pub fn display_name(&self) -> &str {
        match self.step_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Unnamed Step",
        }
    }
}

/// Authored target: a kind plus either a single value or an explicit range
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TargetSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<TargetValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Target value as authored
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TargetValue {
    Range([f64; 2]),
    Single(f64),
}

// ============================================================================
// Validated Workout Tree
// ============================================================================

/// How an executable step ends
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EndCondition {
    /// Duration in seconds
    Time(f64),
    /// Distance in meters, plus the unit it was authored in
    Distance { meters: f64, unit: &'static DistanceUnit },
}

/// Physiological target with bounds in the platform's native unit
/// (m/s for pace and speed, raw otherwise)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub target_type: &'static TargetType,
    /// `(low, high)` with `low <= high`; `None` when only the kind was given
    pub range: Option<(f64, f64)>,
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        self.target_type.kind
    }
}

/// A step in the validated workout tree
#[derive(Clone, Debug, PartialEq)]
pub enum WorkoutStep {
    Executable {
        name: Option<String>,
        step_type: &'static StepType,
        end_condition: EndCondition,
        target: Option<Target>,
        description: String,
    },
    RepeatGroup {
        name: Option<String>,
        iterations: u32,
        children: Vec<WorkoutStep>,
    },
}

// ============================================================================
// Training Plan Types
// ============================================================================

/// One calendar day of a training plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingSession {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    pub session: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout: Option<WorkoutSpec>,
}

/// A complete training plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    #[serde(default = "default_plan_title")]
    pub title: String,
    #[serde(default)]
    pub sessions: Vec<TrainingSession>,
}

fn default_plan_title() -> String {
    "Training Plan".into()
}

/// A block of sessions spanning at most seven days
#[derive(Clone, Debug)]
pub struct TrainingWeek<'a> {
    pub number: u32,
    pub sessions: Vec<&'a TrainingSession>,
}

// ============================================================================
// Scheduling Results
// ============================================================================

/// Error text recorded for sessions the interpreter reports as rest days
pub const REST_DAY: &str = "Rest day - skipped";

/// Outcome of the post-scheduling validation pass for one session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationStatus {
    Valid,
    ValidDryRun,
    RestDay,
    NoCalendarData,
    NoWorkoutOnDate,
    MissingWorkoutId,
    MissingWorkoutName,
    DetailsUnavailable,
    Error(String),
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid | ValidationStatus::ValidDryRun)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Valid => f.write_str("Valid"),
            ValidationStatus::ValidDryRun => f.write_str("Valid (dry-run)"),
            ValidationStatus::RestDay => f.write_str(REST_DAY),
            ValidationStatus::NoCalendarData => f.write_str("No calendar data found"),
            ValidationStatus::NoWorkoutOnDate => f.write_str("No workout found on this date"),
            ValidationStatus::MissingWorkoutId => f.write_str("Scheduled but no workout ID"),
            ValidationStatus::MissingWorkoutName => f.write_str("Workout exists but has no name"),
            ValidationStatus::DetailsUnavailable => {
                f.write_str("Could not retrieve workout details")
            }
            ValidationStatus::Error(message) => write!(f, "Validation error: {}", message),
        }
    }
}

impl Serialize for ValidationStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Result of scheduling one session
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScheduleResult {
    pub date: NaiveDate,
    pub session_name: String,
    pub workout_id: Option<String>,
    pub schedule_id: Option<String>,
    pub success: bool,
    /// True when a matching workout was already on the calendar
    pub skipped: bool,
    pub error: Option<String>,
    pub validation_status: Option<ValidationStatus>,
}

impl ScheduleResult {
    pub fn rest_day(session: &TrainingSession) -> Self {
        Self {
            date: session.date,
            session_name: session.session.clone(),
            workout_id: None,
            schedule_id: None,
            success: true,
            skipped: false,
            error: Some(REST_DAY.into()),
            validation_status: None,
        }
    }

    pub fn failed(session: &TrainingSession, error: impl Into<String>) -> Self {
        Self {
            date: session.date,
            session_name: session.session.clone(),
            workout_id: None,
            schedule_id: None,
            success: false,
            skipped: false,
            error: Some(error.into()),
            validation_status: None,
        }
    }

    pub fn is_rest_day(&self) -> bool {
        self.error.as_deref() == Some(REST_DAY)
    }
}
