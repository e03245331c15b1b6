//! Session interpretation: turning a plan session into a workout tree.

use crate::{Error, Result, TrainingSession, WorkoutSpec};

/// What a session asks for
#[derive(Clone, Debug, PartialEq)]
pub enum Interpretation {
    Workout(WorkoutSpec),
    RestDay,
}

/// Decides what workout, if any, a session describes
pub trait SessionInterpreter {
    fn interpret(&self, session: &TrainingSession) -> Result<Interpretation>;
}

/// Uses the workout tree embedded in the plan
///
/// Sessions without an embedded tree are rest days when their description
/// says so; anything else cannot be interpreted.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredInterpreter;

impl SessionInterpreter for StructuredInterpreter {
    fn interpret(&self, session: &TrainingSession) -> Result<Interpretation> {
        if let Some(workout) = &session.workout {
            let mut workout = workout.clone();
            if workout.name.trim().is_empty() {
                workout.name = session.session.clone();
            }
            return Ok(Interpretation::Workout(workout));
        }

        if is_rest_description(&session.description) {
            return Ok(Interpretation::RestDay);
        }

        Err(Error::Interpretation(
            "Could not parse workout description".to_string(),
        ))
    }
}

fn is_rest_description(description: &str) -> bool {
    let description = description.trim().to_lowercase();
    description == "-" || description == "rest" || description.contains("rest day")
}
