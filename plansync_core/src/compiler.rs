//! Workout tree compiler.
//!
//! Turns an authored, nested step description into the platform's payload:
//! 1. Resolve every `StepSpec` into the typed `WorkoutStep` tree, rejecting
//!    malformed input with an error naming the step
//! 2. Lower the tree to wire steps, numbering nodes in pre-order
//! 3. Estimate the total duration

use crate::catalog::{
    get_default_catalog, Catalog, SportType, TargetKind, END_DISTANCE, END_ITERATIONS, END_TIME,
    NO_TARGET, REPEAT_STEP,
};
use crate::estimate::estimate_duration;
use crate::payload::{
    CompiledStep, CompiledWorkout, EstimatedDistanceUnit, ExecutableStep, RepeatGroupStep,
    WorkoutSegment,
};
use crate::{
    EndCondition, Error, Result, StepSpec, Target, TargetSpec, TargetValue, WorkoutSpec,
    WorkoutStep,
};

const PACE_UNIT: &str = "min_per_km";

/// Half-width of a derived pace range: ten seconds, in minutes
const PACE_HALF_RANGE_MINUTES: f64 = 10.0 / 60.0;

/// Relative half-width of derived ranges for every other target kind
const RANGE_TOLERANCE: f64 = 0.05;

/// Compile an authored workout
pub fn compile_spec(spec: &WorkoutSpec) -> Result<CompiledWorkout> {
    compile(&spec.name, &spec.sport, &spec.steps)
}

/// Compile a workout name, sport and authored step tree into a payload
pub fn compile(
    workout_name: &str,
    sport_type: &str,
    root_steps: &[StepSpec],
) -> Result<CompiledWorkout> {
    let catalog = get_default_catalog();
    let sport = catalog
        .sport(sport_type)
        .ok_or_else(|| Error::InvalidSportType(sport_type.to_string()))?;

    let tree = resolve_steps(root_steps)?;
    compile_tree(workout_name, sport, &tree)
}

/// Lower an already validated tree to the wire payload
pub fn compile_tree(
    workout_name: &str,
    sport: &SportType,
    tree: &[WorkoutStep],
) -> Result<CompiledWorkout> {
    let catalog = get_default_catalog();
    let mut next_order = 1;
    let workout_steps = lower_steps(catalog, tree, &mut next_order)?;
    let estimated = estimate_duration(&workout_steps, sport);

    tracing::debug!(
        "Compiled workout '{}' ({} nodes, ~{}s)",
        workout_name,
        next_order - 1,
        estimated
    );

    Ok(CompiledWorkout {
        sport_type: sport.clone(),
        sub_sport_type: None,
        workout_name: workout_name.to_string(),
        estimated_distance_unit: EstimatedDistanceUnit::default(),
        workout_segments: vec![WorkoutSegment {
            segment_order: 1,
            sport_type: sport.clone(),
            workout_steps,
        }],
        avg_training_speed: None,
        estimated_duration_in_secs: estimated,
        estimated_distance_in_meters: 0,
        estimate_type: None,
    })
}

// ============================================================================
// Resolution: StepSpec -> WorkoutStep
// ============================================================================

/// Validate authored steps and build the typed tree
pub fn resolve_steps(specs: &[StepSpec]) -> Result<Vec<WorkoutStep>> {
    let catalog = get_default_catalog();
    specs.iter().map(|spec| resolve_step(catalog, spec)).collect()
}

fn resolve_step(catalog: &'static Catalog, spec: &StepSpec) -> Result<WorkoutStep> {
    let children = spec.steps.as_deref().unwrap_or(&[]);
    let declares_repeat = spec
        .step_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case(REPEAT_STEP));

    match spec.number_of_iterations {
        Some(n) if n > 0 && !children.is_empty() => {
            let iterations = u32::try_from(n).map_err(|_| Error::InvalidIterationCount {
                step: spec.display_name().to_string(),
            })?;
            return Ok(WorkoutStep::RepeatGroup {
                name: spec.step_name.clone(),
                iterations,
                children: children
                    .iter()
                    .map(|child| resolve_step(catalog, child))
                    .collect::<Result<_>>()?,
            });
        }
        Some(_) if !children.is_empty() => {
            return Err(Error::InvalidIterationCount {
                step: spec.display_name().to_string(),
            })
        }
        _ if declares_repeat => {
            return Err(Error::InvalidIterationCount {
                step: spec.display_name().to_string(),
            })
        }
        _ => {}
    }

    let step_type = match spec.step_type.as_deref() {
        Some(name) if !name.trim().is_empty() => {
            catalog
                .step_type(name)
                .ok_or_else(|| Error::InvalidStepType {
                    step: spec.display_name().to_string(),
                    step_type: name.to_string(),
                })?
        }
        _ => {
            return Err(Error::MissingStepType {
                step: spec.display_name().to_string(),
            })
        }
    };

    let end_condition = resolve_end_condition(catalog, spec)?;
    let target = spec
        .target
        .as_ref()
        .map(|target| resolve_target(catalog, target, spec.display_name()))
        .transpose()?;

    Ok(WorkoutStep::Executable {
        name: spec.step_name.clone(),
        step_type,
        end_condition,
        target,
        description: spec.step_description.clone().unwrap_or_default(),
    })
}

fn resolve_end_condition(catalog: &'static Catalog, spec: &StepSpec) -> Result<EndCondition> {
    let wants_distance = spec
        .end_condition_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case(END_DISTANCE));

    if let (true, Some(distance)) = (wants_distance, spec.step_distance) {
        let unit_name = spec.distance_unit.as_deref().unwrap_or("none");
        let unit = catalog
            .distance_unit(unit_name)
            .ok_or_else(|| Error::UnsupportedDistanceUnit(unit_name.to_string()))?;

        if !(distance.is_finite() && distance > 0.0) {
            return Err(Error::MissingEndCondition {
                step: spec.display_name().to_string(),
            });
        }

        let mut meters = distance * unit.factor;
        if unit.unit_key == "km" && meters >= 1000.0 {
            // Keep round-number kilometre authoring exact
            meters = meters.round();
        }

        return Ok(EndCondition::Distance { meters, unit });
    }

    match spec.step_duration {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(EndCondition::Time(seconds)),
        _ => Err(Error::MissingEndCondition {
            step: spec.display_name().to_string(),
        }),
    }
}

fn resolve_target(catalog: &'static Catalog, spec: &TargetSpec, step: &str) -> Result<Target> {
    let target_type = catalog
        .target_type(&spec.kind)
        .ok_or_else(|| Error::UnsupportedTargetType(spec.kind.clone()))?;

    if target_type.kind == TargetKind::NoTarget {
        return Ok(Target {
            target_type,
            range: None,
        });
    }

    let authored = match spec.value {
        None => None,
        Some(TargetValue::Single(value)) if value == 0.0 => None,
        Some(TargetValue::Range([low, high])) => Some((low, high)),
        Some(TargetValue::Single(value)) => Some(derive_range(value, target_type.kind)),
    };

    let range = match authored {
        None => None,
        Some((low, high)) => {
            let unit = spec.unit.as_deref();
            let low = convert_value(low, unit, step)?;
            let high = convert_value(high, unit, step)?;
            // min/km -> m/s inverts the ordering
            Some(if low > high { (high, low) } else { (low, high) })
        }
    };

    Ok(Target { target_type, range })
}

/// Range around a single authored value
pub fn derive_range(value: f64, kind: TargetKind) -> (f64, f64) {
    match kind {
        TargetKind::Pace => (value - PACE_HALF_RANGE_MINUTES, value + PACE_HALF_RANGE_MINUTES),
        _ => (value * (1.0 - RANGE_TOLERANCE), value * (1.0 + RANGE_TOLERANCE)),
    }
}

fn convert_value(value: f64, unit: Option<&str>, step: &str) -> Result<f64> {
    let converted = match unit {
        Some(unit) if unit.trim().eq_ignore_ascii_case(PACE_UNIT) => {
            if value <= 0.0 {
                return Err(Error::InvalidTargetValue {
                    step: step.to_string(),
                    value,
                });
            }
            1000.0 / (value * 60.0)
        }
        _ => value,
    };

    if converted.is_finite() {
        Ok(converted)
    } else {
        Err(Error::InvalidTargetValue {
            step: step.to_string(),
            value,
        })
    }
}

// ============================================================================
// Lowering: WorkoutStep -> CompiledStep
// ============================================================================

fn lower_steps(
    catalog: &Catalog,
    steps: &[WorkoutStep],
    next_order: &mut u32,
) -> Result<Vec<CompiledStep>> {
    steps
        .iter()
        .map(|step| lower_step(catalog, step, next_order))
        .collect()
}

fn lower_step(catalog: &Catalog, step: &WorkoutStep, next_order: &mut u32) -> Result<CompiledStep> {
    let order = *next_order;
    *next_order += 1;

    match step {
        WorkoutStep::Executable {
            step_type,
            end_condition,
            target,
            description,
            ..
        } => {
            let (condition_key, value) = match end_condition {
                EndCondition::Time(seconds) => (END_TIME, *seconds),
                EndCondition::Distance { meters, .. } => (END_DISTANCE, *meters),
            };

            let no_target = lookup(catalog.target_type(NO_TARGET), NO_TARGET)?;
            let (target_type, range) = match target {
                Some(target) => (target.target_type, target.range),
                None => (no_target, None),
            };
            let real_target = target_type.kind != TargetKind::NoTarget;

            Ok(CompiledStep::Executable(ExecutableStep {
                step_id: order,
                step_order: order,
                step_type: (*step_type).clone(),
                description: description.clone(),
                step_audio_note: None,
                end_condition: lookup(catalog.end_condition(condition_key), condition_key)?.clone(),
                end_condition_value: value,
                target_type: target_type.clone(),
                target_value_unit: real_target.then_some(None),
                target_value_one: range.filter(|_| real_target).map(|(low, _)| low),
                target_value_two: range.filter(|_| real_target).map(|(_, high)| high),
            }))
        }
        WorkoutStep::RepeatGroup {
            iterations,
            children,
            ..
        } => {
            let step_type = lookup(catalog.step_type(REPEAT_STEP), REPEAT_STEP)?.clone();
            let end_condition =
                lookup(catalog.end_condition(END_ITERATIONS), END_ITERATIONS)?.clone();
            let workout_steps = lower_steps(catalog, children, next_order)?;

            Ok(CompiledStep::RepeatGroup(RepeatGroupStep {
                step_id: order,
                step_order: order,
                step_type,
                number_of_iterations: *iterations,
                smart_repeat: false,
                end_condition,
                workout_steps,
            }))
        }
    }
}

fn lookup<T>(entry: Option<T>, key: &str) -> Result<T> {
    entry.ok_or_else(|| Error::Other(format!("Catalog has no '{}' entry", key)))
}
