//! Remote API seam.
//!
//! The scheduling engine and the endpoint wrappers only ever talk to a
//! `RemoteApi`. Live runs use `HttpRemoteApi`; dry runs swap in `DryRunApi`,
//! which answers every call with synthetic values and never leaves the
//! process.

use crate::Result;
use serde_json::{json, Value};
use std::fmt;

/// HTTP verbs the platform endpoints use
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON-speaking remote platform
pub trait RemoteApi {
    /// Issue one request and return the decoded JSON body (`Null` when empty)
    fn call(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value>;

    /// True when calls are answered synthetically
    fn is_dry_run(&self) -> bool {
        false
    }

    fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        self.call(Method::Get, endpoint, params, None)
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.call(Method::Post, endpoint, &[], Some(body))
    }

    fn delete(&self, endpoint: &str) -> Result<Value> {
        self.call(Method::Delete, endpoint, &[], None)
    }
}

impl<T: RemoteApi + ?Sized> RemoteApi for &T {
    fn call(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        (**self).call(method, endpoint, params, body)
    }

    fn is_dry_run(&self) -> bool {
        (**self).is_dry_run()
    }
}

pub const DRY_RUN_WORKOUT_ID: &str = "dry-run-workout-id";
pub const DRY_RUN_SCHEDULE_ID: &str = "dry-run-schedule-id";

/// Synthetic remote used for dry runs
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunApi;

impl RemoteApi for DryRunApi {
    fn call(
        &self,
        method: Method,
        endpoint: &str,
        _params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("[dry-run] {} {}", method, endpoint);
        if let Some(body) = body {
            tracing::debug!("[dry-run] body: {}", body);
        }

        let response = match method {
            Method::Post if endpoint.starts_with("/workout-service/schedule/") => {
                json!({ "workoutScheduleId": DRY_RUN_SCHEDULE_ID })
            }
            Method::Post if endpoint.starts_with("/workout-service/workout") => {
                json!({ "workoutId": DRY_RUN_WORKOUT_ID })
            }
            Method::Get if endpoint.starts_with("/calendar-service/") => {
                json!({ "calendarItems": [] })
            }
            Method::Get if endpoint == "/workout-service/workouts" => json!([]),
            _ => Value::Null,
        };
        Ok(response)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_synthesizes_ids() {
        let api = DryRunApi;
        let created = api.post("/workout-service/workout", &json!({})).unwrap();
        assert_eq!(created["workoutId"], DRY_RUN_WORKOUT_ID);

        let scheduled = api
            .post("/workout-service/schedule/42", &json!({"date": "2025-01-06"}))
            .unwrap();
        assert_eq!(scheduled["workoutScheduleId"], DRY_RUN_SCHEDULE_ID);
    }

    #[test]
    fn test_dry_run_calendar_is_empty() {
        let api = DryRunApi;
        let calendar = api
            .get("/calendar-service/year/2025/month/0/day/6/start/1", &[])
            .unwrap();
        assert_eq!(calendar, json!({"calendarItems": []}));
        assert!(api.is_dry_run());
        assert_eq!(api.delete("/workout-service/schedule/1").unwrap(), Value::Null);
    }

    #[test]
    fn test_reference_forwards_dry_run_flag() {
        let api = DryRunApi;
        let by_ref: &dyn RemoteApi = &api;
        assert!((&by_ref).is_dry_run());
    }
}
