//! Typed wrappers around the platform's workout and calendar endpoints.
//!
//! Responses are read through lenient views: unknown fields are ignored and
//! identifiers that arrive as numbers or strings are normalized to strings.

use crate::payload::CompiledWorkout;
use crate::remote::RemoteApi;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

pub const LIST_WORKOUTS_ENDPOINT: &str = "/workout-service/workouts";
pub const CREATE_WORKOUT_ENDPOINT: &str = "/workout-service/workout";

pub fn workout_endpoint(workout_id: &str) -> String {
    format!("/workout-service/workout/{}", workout_id)
}

pub fn schedule_endpoint(id: &str) -> String {
    format!("/workout-service/schedule/{}", id)
}

// ============================================================================
// Response views
// ============================================================================

/// One entry of a calendar response
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarItem {
    /// Schedule entry id for workout items
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    pub item_type: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_id")]
    pub workout_id: Option<String>,
    pub title: Option<String>,
}

impl CalendarItem {
    pub fn is_workout_on(&self, date: NaiveDate) -> bool {
        self.item_type.as_deref() == Some("workout")
            && self.date.as_deref() == Some(date.to_string().as_str())
    }
}

/// Calendar response for a week or month
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarSnapshot {
    pub calendar_items: Vec<CalendarItem>,
}

impl CalendarSnapshot {
    /// Workout items scheduled on exactly `date`
    pub fn workouts_on(&self, date: NaiveDate) -> impl Iterator<Item = &CalendarItem> + '_ {
        self.calendar_items
            .iter()
            .filter(move |item| item.is_workout_on(date))
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSportType {
    pub sport_type_key: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteStep {
    pub workout_steps: Vec<RemoteStep>,
}

impl RemoteStep {
    fn node_count(&self) -> usize {
        1 + self.workout_steps.iter().map(RemoteStep::node_count).sum::<usize>()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSegment {
    pub workout_steps: Vec<RemoteStep>,
}

/// Workout detail as returned by the platform
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteWorkout {
    #[serde(deserialize_with = "lenient_id")]
    pub workout_id: Option<String>,
    pub workout_name: Option<String>,
    pub sport_type: Option<RemoteSportType>,
    pub workout_segments: Vec<RemoteSegment>,
}

impl RemoteWorkout {
    pub fn sport_key(&self) -> Option<&str> {
        self.sport_type.as_ref()?.sport_type_key.as_deref()
    }

    pub fn name(&self) -> &str {
        self.workout_name.as_deref().unwrap_or("")
    }

    /// Every step node across all segments, repeat containers included
    pub fn step_count(&self) -> usize {
        self.workout_segments
            .iter()
            .flat_map(|segment| segment.workout_steps.iter())
            .map(RemoteStep::node_count)
            .sum()
    }
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| id_string(&v)))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_id(response: &Value, field: &str, context: &str) -> Result<String> {
    response
        .get(field)
        .and_then(id_string)
        .ok_or_else(|| Error::Remote(format!("{}: {}", context, response)))
}

// ============================================================================
// Workouts
// ============================================================================

pub fn list_workouts(api: &dyn RemoteApi) -> Result<Value> {
    api.get(LIST_WORKOUTS_ENDPOINT, &[])
}

/// Raw workout detail
pub fn get_workout_json(api: &dyn RemoteApi, workout_id: &str) -> Result<Value> {
    let value = api.get(&workout_endpoint(workout_id), &[])?;
    if value.is_null() {
        return Err(Error::Remote(format!("Workout {} not found", workout_id)));
    }
    Ok(value)
}

pub fn get_workout(api: &dyn RemoteApi, workout_id: &str) -> Result<RemoteWorkout> {
    Ok(serde_json::from_value(get_workout_json(api, workout_id)?)?)
}

/// Upload a compiled workout and return its new id
pub fn create_workout(api: &dyn RemoteApi, workout: &CompiledWorkout) -> Result<String> {
    let payload = workout.to_json()?;
    tracing::debug!("Uploading payload: {}", payload);

    let response = api.post(CREATE_WORKOUT_ENDPOINT, &payload)?;
    required_id(&response, "workoutId", "No workout ID returned")
}

pub fn delete_workout(api: &dyn RemoteApi, workout_id: &str) -> Result<()> {
    api.delete(&workout_endpoint(workout_id))?;
    Ok(())
}

// ============================================================================
// Schedule
// ============================================================================

/// Put a workout on the calendar and return the schedule entry id
pub fn schedule_workout(api: &dyn RemoteApi, workout_id: &str, date: NaiveDate) -> Result<String> {
    let body = json!({ "date": date.to_string() });
    let response = api.post(&schedule_endpoint(workout_id), &body)?;
    required_id(&response, "workoutScheduleId", "Scheduling failed")
}

pub fn delete_schedule(api: &dyn RemoteApi, schedule_id: &str) -> Result<()> {
    api.delete(&schedule_endpoint(schedule_id))?;
    Ok(())
}

// ============================================================================
// Calendar
// ============================================================================

/// Calendar request with a one-based month
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
    /// Set for the week view containing this day; `None` for the month view
    pub day: Option<u32>,
    /// First weekday of the week view (0 = Sunday, 1 = Monday, ...)
    pub start: u32,
}

impl CalendarQuery {
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            day: None,
            start: 1,
        }
    }

    pub fn week(year: i32, month: u32, day: u32, start: u32) -> Self {
        Self {
            year,
            month,
            day: Some(day),
            start,
        }
    }

    /// Week view starting Monday around `date`
    pub fn for_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::week(date.year(), date.month(), date.day(), 1)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1900..=2100).contains(&self.year) {
            return Err(Error::InvalidDate(format!(
                "Year must be between 1900 and 2100, got {}",
                self.year
            )));
        }
        if !(1..=12).contains(&self.month) {
            return Err(Error::InvalidDate(format!(
                "Month must be between 1 and 12, got {}",
                self.month
            )));
        }
        if let Some(day) = self.day {
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidDate(format!(
                    "Day must be between 1 and 31, got {}",
                    day
                )));
            }
        }
        Ok(())
    }

    /// Endpoint path; the platform counts months from zero
    pub fn endpoint(&self) -> Result<String> {
        self.validate()?;
        let month = self.month - 1;
        Ok(match self.day {
            Some(day) => format!(
                "/calendar-service/year/{}/month/{}/day/{}/start/{}",
                self.year, month, day, self.start
            ),
            None => format!("/calendar-service/year/{}/month/{}", self.year, month),
        })
    }

    pub fn view_type(&self) -> &'static str {
        if self.day.is_some() {
            "week"
        } else {
            "month"
        }
    }
}

/// Raw calendar response
pub fn calendar(api: &dyn RemoteApi, query: &CalendarQuery) -> Result<Value> {
    api.get(&query.endpoint()?, &[])
}

/// Week view around `date`; `None` when the platform returned nothing
pub fn calendar_for_date(api: &dyn RemoteApi, date: NaiveDate) -> Result<Option<CalendarSnapshot>> {
    let value = calendar(api, &CalendarQuery::for_date(date))?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}
