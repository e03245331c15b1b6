//! Consolidated outcome of a plan run.

use crate::{Error, Result, ScheduleResult, TrainingPlan, ValidationStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Counts over a run's results
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct PlanSummary {
    pub newly_scheduled: usize,
    pub already_matching: usize,
    pub rest_days: usize,
    pub failed: usize,
    pub validated: usize,
    pub validation_failed: usize,
}

impl PlanSummary {
    pub fn from_results(results: &[ScheduleResult]) -> Self {
        let mut summary = Self::default();

        for result in results {
            let rest = result.is_rest_day();
            if rest {
                summary.rest_days += 1;
            } else if result.skipped {
                summary.already_matching += 1;
            } else if result.success {
                summary.newly_scheduled += 1;
            } else {
                summary.failed += 1;
            }

            match &result.validation_status {
                Some(status) if status.is_valid() => summary.validated += 1,
                Some(ValidationStatus::RestDay) | None => {}
                Some(_) => summary.validation_failed += 1,
            }
        }

        summary
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.validation_failed > 0
    }
}

/// Serializable record of one run
#[derive(Clone, Debug, Serialize)]
pub struct PlanReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub title: String,
    pub dry_run: bool,
    pub results: Vec<ScheduleResult>,
    pub summary: PlanSummary,
}

impl PlanReport {
    pub fn new(plan: &TrainingPlan, dry_run: bool, results: Vec<ScheduleResult>) -> Self {
        let summary = PlanSummary::from_results(&results);
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            title: plan.title.clone(),
            dry_run,
            results,
            summary,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_json_pretty()?.as_bytes())?;
        tracing::info!("Wrote report to {:?}", path);
        Ok(())
    }
}

/// Write through a temp file in the target directory, then rename over `path`
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
