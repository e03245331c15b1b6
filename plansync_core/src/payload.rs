//! Wire payload produced by the workout compiler.
//!
//! The structs serialize to the exact object layout the platform accepts
//! when creating a workout, including the explicit `null` fields.

use crate::catalog::{EndConditionType, SportType, StepType, TargetType};
use serde::{Serialize, Serializer};

/// A compiled workout, ready for upload
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompiledWorkout {
    pub sport_type: SportType,
    pub sub_sport_type: Option<String>,
    pub workout_name: String,
    pub estimated_distance_unit: EstimatedDistanceUnit,
    pub workout_segments: Vec<WorkoutSegment>,
    pub avg_training_speed: Option<f64>,
    pub estimated_duration_in_secs: u64,
    pub estimated_distance_in_meters: u64,
    pub estimate_type: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedDistanceUnit {
    pub unit_key: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSegment {
    pub segment_order: u32,
    pub sport_type: SportType,
    pub workout_steps: Vec<CompiledStep>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum CompiledStep {
    #[serde(rename = "ExecutableStepDTO")]
    Executable(ExecutableStep),
    #[serde(rename = "RepeatGroupDTO")]
    RepeatGroup(RepeatGroupStep),
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableStep {
    pub step_id: u32,
    pub step_order: u32,
    pub step_type: StepType,
    pub description: String,
    pub step_audio_note: Option<String>,
    pub end_condition: EndConditionType,
    #[serde(serialize_with = "whole_number")]
    pub end_condition_value: f64,
    pub target_type: TargetType,
    /// Present (as `null`) only when a real target is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value_unit: Option<Option<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_whole_number"
    )]
    pub target_value_one: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_whole_number"
    )]
    pub target_value_two: Option<f64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepeatGroupStep {
    pub step_id: u32,
    pub step_order: u32,
    pub step_type: StepType,
    pub number_of_iterations: u32,
    pub smart_repeat: bool,
    pub end_condition: EndConditionType,
    pub workout_steps: Vec<CompiledStep>,
}

impl CompiledStep {
    pub fn step_order(&self) -> u32 {
        match self {
            CompiledStep::Executable(step) => step.step_order,
            CompiledStep::RepeatGroup(group) => group.step_order,
        }
    }
}

impl CompiledWorkout {
    /// Top-level steps of the (single) segment
    pub fn steps(&self) -> &[CompiledStep] {
        self.workout_segments
            .first()
            .map(|segment| segment.workout_steps.as_slice())
            .unwrap_or(&[])
    }

    /// Every step in pre-order, repeat containers before their children
    pub fn flatten(&self) -> Vec<&CompiledStep> {
        fn walk<'a>(steps: &'a [CompiledStep], out: &mut Vec<&'a CompiledStep>) {
            for step in steps {
                out.push(step);
                if let CompiledStep::RepeatGroup(group) = step {
                    walk(&group.workout_steps, out);
                }
            }
        }

        let mut out = Vec::new();
        for segment in &self.workout_segments {
            walk(&segment.workout_steps, &mut out);
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Whole numbers go out as JSON integers, like the platform's own payloads
fn whole_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn optional_whole_number<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => whole_number(v, serializer),
        None => serializer.serialize_none(),
    }
}
