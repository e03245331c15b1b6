//! End-to-end plan scheduling against an in-memory platform.

use chrono::NaiveDate;
use plansync_core::*;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

struct Call {
    method: Method,
    endpoint: String,
    body: Option<Value>,
}

/// Stateful stand-in for the workout library and calendar
#[derive(Default)]
struct FakePlatform {
    workouts: RefCell<HashMap<String, Value>>,
    calendar: RefCell<Vec<Value>>,
    next_id: Cell<u64>,
    failing_schedules: Cell<u32>,
    calls: RefCell<Vec<Call>>,
}

impl FakePlatform {
    fn new_id(&self) -> u64 {
        self.next_id.set(self.next_id.get() + 1);
        self.next_id.get()
    }

    fn count(&self, method: Method, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.method == method && c.endpoint.starts_with(prefix))
            .count()
    }

    /// Calls that concern `date`: calendar reads for that day or schedule posts for it
    fn calls_for(&self, date: NaiveDate) -> usize {
        let calendar_path = format!(
            "/calendar-service/year/{}/month/{}/day/{}/",
            date.format("%Y"),
            date.format("%m").to_string().parse::<u32>().unwrap() - 1,
            date.format("%d").to_string().parse::<u32>().unwrap()
        );
        let iso = date.to_string();

        self.calls
            .borrow()
            .iter()
            .filter(|c| {
                c.endpoint.starts_with(&calendar_path)
                    || c.body.as_ref().and_then(|b| b.get("date")) == Some(&json!(iso))
            })
            .count()
    }
}

impl RemoteApi for FakePlatform {
    fn call(
        &self,
        method: Method,
        endpoint: &str,
        _params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        self.calls.borrow_mut().push(Call {
            method,
            endpoint: endpoint.to_string(),
            body: body.cloned(),
        });

        match method {
            Method::Get if endpoint.starts_with("/calendar-service/") => {
                Ok(json!({ "calendarItems": self.calendar.borrow().clone() }))
            }
            Method::Get => {
                let id = endpoint.rsplit('/').next().unwrap_or_default();
                self.workouts
                    .borrow()
                    .get(id)
                    .cloned()
                    .ok_or_else(|| Error::Remote(format!("workout {} not found", id)))
            }
            Method::Post if endpoint == "/workout-service/workout" => {
                let id = self.new_id();
                let mut workout = body.cloned().unwrap_or_default();
                workout["workoutId"] = json!(id);
                self.workouts.borrow_mut().insert(id.to_string(), workout);
                Ok(json!({ "workoutId": id }))
            }
            Method::Post => {
                if self.failing_schedules.get() > 0 {
                    self.failing_schedules.set(self.failing_schedules.get() - 1);
                    return Err(Error::Remote("connection reset".into()));
                }
                let workout_id = endpoint.rsplit('/').next().unwrap_or_default();
                let id = self.new_id();
                self.calendar.borrow_mut().push(json!({
                    "id": id,
                    "itemType": "workout",
                    "date": body.and_then(|b| b.get("date")).cloned(),
                    "workoutId": workout_id,
                }));
                Ok(json!({ "workoutScheduleId": id }))
            }
            Method::Delete => {
                let id = endpoint.rsplit('/').next().unwrap_or_default();
                self.calendar
                    .borrow_mut()
                    .retain(|item| item["id"].to_string() != id);
                Ok(Value::Null)
            }
        }
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

fn timed(step_type: &str, seconds: f64) -> StepSpec {
    StepSpec {
        step_type: Some(step_type.into()),
        end_condition_type: Some("time".into()),
        step_duration: Some(seconds),
        ..Default::default()
    }
}

fn workout_session(day: u32, name: &str, sport: &str) -> TrainingSession {
    TrainingSession {
        date: date(day),
        day: None,
        session: name.into(),
        description: String::new(),
        distance: None,
        heart_rate_target: None,
        workout: Some(WorkoutSpec {
            name: String::new(),
            sport: sport.into(),
            steps: vec![
                timed("warmup", 600.0),
                StepSpec {
                    step_type: Some("repeat".into()),
                    number_of_iterations: Some(day as i64 % 3 + 2),
                    steps: Some(vec![timed("interval", 120.0), timed("recovery", 60.0)]),
                    ..Default::default()
                },
                timed("cooldown", 300.0),
            ],
        }),
    }
}

/// Eight sessions on consecutive days, the fourth one a rest day
fn eight_session_plan() -> TrainingPlan {
    let mut rest = workout_session(9, "Rest", "running");
    rest.workout = None;
    rest.description = "Rest day".into();

    TrainingPlan {
        title: "Build Week".into(),
        sessions: vec![
            workout_session(6, "Easy Run", "running"),
            workout_session(7, "Threshold", "running"),
            workout_session(8, "Endurance Ride", "cycling"),
            rest,
            workout_session(10, "Hill Repeats", "running"),
            workout_session(11, "Swim Drills", "swimming"),
            workout_session(12, "Long Run", "running"),
            workout_session(13, "Recovery Spin", "cycling"),
        ],
    }
}

#[test]
fn eight_session_week_with_rest_day() {
    logging::init_test();
    let api = FakePlatform::default();
    let clock = RecordingClock::new();
    let scheduler = Scheduler::new(&api, &StructuredInterpreter, &clock);
    let plan = eight_session_plan();

    let mut results = scheduler.schedule_plan(&plan);
    scheduler.validate_results(&plan, &mut results);

    assert_eq!(results.len(), 8);
    let dates: Vec<_> = results.iter().map(|r| r.date).collect();
    assert_eq!(dates, (6..=13).map(date).collect::<Vec<_>>());

    let rest: Vec<_> = results
        .iter()
        .filter(|r| r.error.as_deref() == Some(REST_DAY))
        .collect();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].date, date(9));
    assert_eq!(api.calls_for(date(9)), 0);

    assert_eq!(api.count(Method::Post, "/workout-service/workout"), 7);
    assert_eq!(api.count(Method::Post, "/workout-service/schedule/"), 7);

    let summary = PlanSummary::from_results(&results);
    assert_eq!(summary.newly_scheduled, 7);
    assert_eq!(summary.rest_days, 1);
    assert_eq!(summary.validated, 7);
    assert!(!summary.has_failures());

    // Seven gaps between sessions, six between validation checks
    let sleeps = clock.sleeps();
    assert_eq!(sleeps.len(), 13);
    assert_eq!(clock.total(), Duration::from_millis(7 * 500 + 6 * 200));
}

#[test]
fn rerunning_a_plan_is_idempotent() {
    let api = FakePlatform::default();
    let clock = NoopClock;
    let scheduler = Scheduler::new(&api, &StructuredInterpreter, &clock);
    let plan = eight_session_plan();

    let first = scheduler.schedule_plan(&plan);
    let uploads = api.count(Method::Post, "/workout-service/");

    let second = scheduler.schedule_plan(&plan);
    assert_eq!(api.count(Method::Post, "/workout-service/"), uploads);
    assert_eq!(api.count(Method::Delete, "/"), 0);

    for (before, after) in first.iter().zip(&second) {
        if before.is_rest_day() {
            assert!(after.is_rest_day());
            continue;
        }
        assert!(after.skipped, "{} should match", after.session_name);
        assert_eq!(after.workout_id, before.workout_id);
        assert_eq!(after.schedule_id, before.schedule_id);
    }

    let summary = PlanSummary::from_results(&second);
    assert_eq!(summary.already_matching, 7);
    assert_eq!(summary.newly_scheduled, 0);
}

#[test]
fn changed_session_replaces_calendar_entry() {
    let api = FakePlatform::default();
    let clock = NoopClock;
    let scheduler = Scheduler::new(&api, &StructuredInterpreter, &clock);
    let mut plan = eight_session_plan();
    scheduler.schedule_plan(&plan);

    plan.sessions[0].session = "Progression Run".into();
    let result = scheduler.schedule_session(&plan.sessions[0]);

    assert!(result.success && !result.skipped);
    assert_eq!(api.count(Method::Delete, "/workout-service/schedule/"), 1);
    let on_day: Vec<_> = api
        .calendar
        .borrow()
        .iter()
        .filter(|item| item["date"] == json!("2025-01-06"))
        .cloned()
        .collect();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0]["id"].to_string(), result.schedule_id.unwrap());
}

#[test]
fn transient_schedule_failures_are_retried() {
    let api = FakePlatform::default();
    api.failing_schedules.set(2);
    let clock = RecordingClock::new();
    let scheduler = Scheduler::new(&api, &StructuredInterpreter, &clock);
    let plan = eight_session_plan();

    let result = scheduler.schedule_session(&plan.sessions[0]);

    assert!(result.success);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(2), Duration::from_secs(4)]);
    // Each failed attempt uploaded a workout before scheduling broke
    assert_eq!(api.count(Method::Post, "/workout-service/workout"), 3);
}

#[test]
fn custom_options_change_pacing() {
    let api = FakePlatform::default();
    let clock = RecordingClock::new();
    let options = SchedulerOptions {
        retry_attempts: 1,
        backoff_step: Duration::from_secs(10),
        session_delay: Duration::from_secs(1),
        validation_delay: Duration::ZERO,
    };
    let scheduler = Scheduler::new(&api, &StructuredInterpreter, &clock).with_options(options);
    let plan = eight_session_plan();

    api.failing_schedules.set(1);
    let results = scheduler.schedule_plan(&plan);

    assert!(!results[0].success);
    assert_eq!(results[0].error.as_deref(), Some("connection reset"));
    assert!(results[1..].iter().all(|r| r.success));
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 7]);
}
