#![forbid(unsafe_code)]

//! Core library for plansync: compiles structured workouts for the Garmin
//! Connect workout service and schedules training plans onto its calendar.
//!
//! This crate provides:
//! - Domain types (authored workouts, the validated step tree, plans, results)
//! - The platform catalog and the workout tree compiler
//! - The remote API seam, HTTP transport and typed endpoints
//! - The idempotent scheduling engine and run reports

pub mod types;
pub mod error;
pub mod catalog;
pub mod payload;
pub mod estimate;
pub mod compiler;
pub mod clock;
pub mod remote;
pub mod http;
pub mod connect;
pub mod interpreter;
pub mod plan;
pub mod scheduler;
pub mod report;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::get_default_catalog;
pub use compiler::{compile, compile_spec};
pub use payload::CompiledWorkout;
pub use clock::{Clock, NoopClock, RecordingClock, SystemClock};
pub use remote::{DryRunApi, Method, RemoteApi};
pub use http::HttpRemoteApi;
pub use interpreter::{Interpretation, SessionInterpreter, StructuredInterpreter};
pub use scheduler::{Scheduler, SchedulerOptions};
pub use report::{PlanReport, PlanSummary};
pub use config::Config;
