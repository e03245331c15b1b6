//! Static lookup tables for the workout platform.
//!
//! Sport types, step types, target types, distance units and end
//! conditions, keyed by the names used in authored workouts. The records
//! serialize to exactly the objects the platform expects in a payload.

use serde::Serialize;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

// ============================================================================
// Records
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportType {
    pub sport_type_id: u32,
    pub sport_type_key: &'static str,
    pub display_order: u32,
    /// Pace used to estimate distance steps that carry no pace/speed target
    #[serde(skip)]
    pub default_seconds_per_meter: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepType {
    pub step_type_id: u32,
    pub step_type_key: &'static str,
    pub display_order: u32,
}

/// Target kinds the compiler knows how to handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    NoTarget,
    Power,
    Cadence,
    HeartRate,
    Speed,
    Pace,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetType {
    pub workout_target_type_id: u32,
    pub workout_target_type_key: &'static str,
    pub display_order: u32,
    #[serde(skip)]
    pub kind: TargetKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistanceUnit {
    pub unit_id: u32,
    pub unit_key: &'static str,
    /// Meters per unit
    pub factor: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndConditionType {
    pub condition_type_id: u32,
    pub condition_type_key: &'static str,
    pub display_order: u32,
    pub displayable: bool,
}

// ============================================================================
// Catalog
// ============================================================================

/// All lookup tables, keyed by lowercase authoring name
#[derive(Clone, Debug)]
pub struct Catalog {
    pub sports: HashMap<&'static str, SportType>,
    pub step_types: HashMap<&'static str, StepType>,
    pub target_types: HashMap<&'static str, TargetType>,
    pub distance_units: HashMap<&'static str, DistanceUnit>,
    pub end_conditions: HashMap<&'static str, EndConditionType>,
}

pub const REPEAT_STEP: &str = "repeat";
pub const NO_TARGET: &str = "no target";
pub const END_TIME: &str = "time";
pub const END_DISTANCE: &str = "distance";
pub const END_ITERATIONS: &str = "iterations";

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    let mut sports = HashMap::new();
    for (name, id, key, order, pace) in [
        ("running", 1, "running", 1, 0.36),
        ("cycling", 2, "cycling", 2, 0.05),
        ("swimming", 4, "swimming", 5, 0.5),
        ("strength", 5, "strength_training", 9, 0.36),
        ("cardio", 6, "cardio_training", 8, 0.36),
    ] {
        sports.insert(
            name,
            SportType {
                sport_type_id: id,
                sport_type_key: key,
                display_order: order,
                default_seconds_per_meter: pace,
            },
        );
    }

    let mut step_types = HashMap::new();
    for (id, key) in [
        (1, "warmup"),
        (2, "cooldown"),
        (3, "interval"),
        (4, "recovery"),
        (5, "rest"),
        (6, REPEAT_STEP),
    ] {
        step_types.insert(
            key,
            StepType {
                step_type_id: id,
                step_type_key: key,
                display_order: id,
            },
        );
    }

    let mut target_types = HashMap::new();
    for (name, id, key, kind) in [
        (NO_TARGET, 1, "no.target", TargetKind::NoTarget),
        ("power", 2, "power.zone", TargetKind::Power),
        ("cadence", 3, "cadence.zone", TargetKind::Cadence),
        ("heart rate", 4, "heart.rate.zone", TargetKind::HeartRate),
        ("speed", 5, "speed.zone", TargetKind::Speed),
        ("pace", 6, "pace.zone", TargetKind::Pace),
    ] {
        target_types.insert(
            name,
            TargetType {
                workout_target_type_id: id,
                workout_target_type_key: key,
                display_order: id,
                kind,
            },
        );
    }

    let mut distance_units = HashMap::new();
    for (id, key, factor) in [(2, "m", 1.0), (3, "km", 1000.0), (4, "mile", 1609.344)] {
        distance_units.insert(
            key,
            DistanceUnit {
                unit_id: id,
                unit_key: key,
                factor,
            },
        );
    }

    let mut end_conditions = HashMap::new();
    for (id, key, displayable) in [
        (1, "lap.button", true),
        (2, END_TIME, true),
        (3, END_DISTANCE, true),
        (7, END_ITERATIONS, false),
    ] {
        end_conditions.insert(
            key,
            EndConditionType {
                condition_type_id: id,
                condition_type_key: key,
                display_order: id,
                displayable,
            },
        );
    }

    Catalog {
        sports,
        step_types,
        target_types,
        distance_units,
        end_conditions,
    }
}

impl Catalog {
    /// Case-insensitive sport lookup
    pub fn sport(&self, name: &str) -> Option<&SportType> {
        self.sports.get(name.trim().to_lowercase().as_str())
    }

    pub fn step_type(&self, name: &str) -> Option<&StepType> {
        self.step_types.get(name.trim().to_lowercase().as_str())
    }

    pub fn target_type(&self, name: &str) -> Option<&TargetType> {
        self.target_types.get(name.trim().to_lowercase().as_str())
    }

    pub fn distance_unit(&self, name: &str) -> Option<&DistanceUnit> {
        self.distance_units.get(name.trim().to_lowercase().as_str())
    }

    pub fn end_condition(&self, key: &str) -> Option<&EndConditionType> {
        self.end_conditions.get(key)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut ids = HashSet::new();
        for (name, sport) in &self.sports {
            if !ids.insert(sport.sport_type_id) {
                errors.push(format!("Duplicate sport type id {}", sport.sport_type_id));
            }
            if sport.default_seconds_per_meter <= 0.0 {
                errors.push(format!("Sport '{}' has non-positive default pace", name));
            }
        }

        let mut ids = HashSet::new();
        for step in self.step_types.values() {
            if !ids.insert(step.step_type_id) {
                errors.push(format!("Duplicate step type id {}", step.step_type_id));
            }
        }
        if !self.step_types.contains_key(REPEAT_STEP) {
            errors.push("Catalog has no repeat step type".to_string());
        }

        let mut ids = HashSet::new();
        for target in self.target_types.values() {
            if !ids.insert(target.workout_target_type_id) {
                errors.push(format!(
                    "Duplicate target type id {}",
                    target.workout_target_type_id
                ));
            }
        }
        if !self.target_types.contains_key(NO_TARGET) {
            errors.push("Catalog has no 'no target' entry".to_string());
        }

        for (name, unit) in &self.distance_units {
            if unit.factor <= 0.0 {
                errors.push(format!("Distance unit '{}' has non-positive factor", name));
            }
        }

        for key in [END_TIME, END_DISTANCE, END_ITERATIONS] {
            if !self.end_conditions.contains_key(key) {
                errors.push(format!("Catalog has no '{}' end condition", key));
            }
        }

        errors
    }
}
