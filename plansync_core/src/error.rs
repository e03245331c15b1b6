//! Error types for the plansync_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for plansync_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Transport failure talking to the remote platform
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote platform answered, but not with what we needed
    #[error("{0}")]
    Remote(String),

    // ------------------------------------------------------------------
    // Workout compilation
    // ------------------------------------------------------------------
    #[error("Unsupported sport type: {0}")]
    InvalidSportType(String),

    #[error("Unsupported step type '{step_type}' for step: {step}")]
    InvalidStepType { step: String, step_type: String },

    #[error("Missing stepType for step: {step}")]
    MissingStepType { step: String },

    #[error("Invalid or missing stepDuration for step: {step}")]
    MissingEndCondition { step: String },

    #[error("Invalid or missing numberOfIterations for repeat step: {step}")]
    InvalidIterationCount { step: String },

    #[error("Unsupported target type: {0}")]
    UnsupportedTargetType(String),

    #[error("Unsupported distance unit: {0}")]
    UnsupportedDistanceUnit(String),

    #[error("Invalid target value {value} for step: {step}")]
    InvalidTargetValue { step: String, value: f64 },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Training plan could not be loaded
    #[error("Plan error: {0}")]
    Plan(String),

    /// Session description could not be turned into a workout
    #[error("{0}")]
    Interpretation(String),

    /// Calendar date parameters out of range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
