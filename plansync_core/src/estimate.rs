//! Duration estimation for compiled workouts.
//!
//! Time steps contribute their duration. Distance steps are converted to
//! seconds using the step's pace or speed range when one is set, and the
//! sport's default pace otherwise. Each contribution is truncated to whole
//! seconds before summing, and totals saturate at `u64::MAX`.

use crate::catalog::{SportType, TargetKind, END_DISTANCE};
use crate::payload::{CompiledStep, ExecutableStep};

/// Estimated total duration in seconds for a list of compiled steps
pub fn estimate_duration(steps: &[CompiledStep], sport: &SportType) -> u64 {
    steps
        .iter()
        .map(|step| match step {
            CompiledStep::Executable(step) => estimate_step(step, sport),
            CompiledStep::RepeatGroup(group) => u64::from(group.number_of_iterations)
                .saturating_mul(estimate_duration(&group.workout_steps, sport)),
        })
        .fold(0, u64::saturating_add)
}

/// Estimated duration of one executable step, truncated to whole seconds
pub fn estimate_step(step: &ExecutableStep, sport: &SportType) -> u64 {
    if step.end_condition.condition_type_key == END_DISTANCE {
        truncate(step.end_condition_value * seconds_per_meter(step, sport))
    } else {
        truncate(step.end_condition_value)
    }
}

fn seconds_per_meter(step: &ExecutableStep, sport: &SportType) -> f64 {
    let bounds = match (step.target_value_one, step.target_value_two) {
        (Some(low), Some(high)) if low != 0.0 && high != 0.0 => Some((low, high)),
        _ => None,
    };

    match (step.target_type.kind, bounds) {
        // Bounds are m/s; averaging the two paces
        (TargetKind::Pace, Some((low, high))) => 2.0 / (low + high),
        (TargetKind::Speed, Some((low, high))) => 1.0 / ((low + high) / 2.0),
        _ => sport.default_seconds_per_meter,
    }
}

fn truncate(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    }
}
