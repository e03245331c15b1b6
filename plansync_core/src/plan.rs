//! Training plan and workout file loading.
//!
//! Plans are JSON or TOML files (chosen by extension) holding a title and a
//! list of dated sessions. Sessions are kept in date order; sessions sharing
//! a date keep the order they were written in.

use crate::{Error, Result, TrainingPlan, TrainingWeek, WorkoutSpec};
use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

fn file_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        other => Err(Error::Plan(format!(
            "Unsupported file format {:?} for {:?} (expected .json or .toml)",
            other.unwrap_or(""),
            path
        ))),
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = file_format(path)?;
    let contents = std::fs::read_to_string(path)?;
    Ok(match format {
        FileFormat::Json => serde_json::from_str(&contents)?,
        FileFormat::Toml => toml::from_str(&contents)?,
    })
}

impl WorkoutSpec {
    /// Load a single authored workout from a JSON or TOML file
    pub fn load(path: &Path) -> Result<Self> {
        read_file(path)
    }
}

impl TrainingPlan {
    /// Load a plan file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let mut plan: TrainingPlan = read_file(path)?;
        plan.sort_sessions();

        tracing::info!(
            "Loaded plan '{}' with {} sessions from {:?}",
            plan.title,
            plan.sessions.len(),
            path
        );
        Ok(plan)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let mut plan: TrainingPlan = serde_json::from_str(contents)?;
        plan.sort_sessions();
        Ok(plan)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut plan: TrainingPlan = toml::from_str(contents)?;
        plan.sort_sessions();
        Ok(plan)
    }

    fn sort_sessions(&mut self) {
        self.sessions.sort_by_key(|s| s.date);
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.sessions.first().map(|s| s.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.sessions.last().map(|s| s.date)
    }

    /// Move every session so the plan begins on `start`, keeping the spacing
    pub fn shift_to(&mut self, start: NaiveDate) {
        let Some(current) = self.start_date() else {
            return;
        };
        let offset = start - current;
        for session in &mut self.sessions {
            session.date += offset;
        }
    }

    /// Group sessions into blocks of at most seven days
    pub fn weeks(&self) -> Vec<TrainingWeek<'_>> {
        let mut weeks: Vec<TrainingWeek<'_>> = Vec::new();
        let mut anchor: Option<NaiveDate> = None;

        for session in &self.sessions {
            match anchor {
                Some(first) if session.date - first < Duration::days(7) => {
                    if let Some(week) = weeks.last_mut() {
                        week.sessions.push(session);
                    }
                }
                _ => {
                    anchor = Some(session.date);
                    weeks.push(TrainingWeek {
                        number: weeks.len() as u32 + 1,
                        sessions: vec![session],
                    });
                }
            }
        }

        weeks
    }
}
