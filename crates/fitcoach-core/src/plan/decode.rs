//! Provider response decoding with validation.
//!
//! Decodes the free text returned by the text-generation provider into a
//! [`Plan`] and validates:
//! - The document is a JSON object with `summary`, `workouts` and `meals`.
//! - Every workout has a name and positive sets and reps.
//! - Every meal has a label.

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Meal, Plan, Workout};

/// Errors that can occur while decoding a generated plan.
#[derive(Debug, Error)]
pub enum PlanDecodeError {
    #[error("provider returned an empty response")]
    Empty,

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workout {index} has an empty name")]
    EmptyWorkoutName { index: usize },

    #[error("workout {name:?} has zero sets")]
    ZeroSets { name: String },

    #[error("workout {name:?} has zero reps")]
    ZeroReps { name: String },

    #[error("meal {index} has an empty label")]
    EmptyMealLabel { index: usize },
}

/// The shape the provider is asked to produce. `name` is never trusted from
/// the provider; it is merged in from the caller's profile.
#[derive(Debug, Deserialize)]
struct GeneratedPlan {
    summary: String,
    workouts: Vec<Workout>,
    meals: Vec<Meal>,
}

/// Remove markdown code-fence markers (```` ```json ```` and ```` ``` ````)
/// anywhere in the text, then trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Strip fences, decode and validate a provider response.
///
/// The returned plan has `name == None`.
pub fn decode_plan(text: &str) -> Result<Plan, PlanDecodeError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(PlanDecodeError::Empty);
    }
    let generated: GeneratedPlan = serde_json::from_str(&cleaned)?;
    let plan = Plan {
        name: None,
        summary: generated.summary,
        workouts: generated.workouts,
        meals: generated.meals,
    };
    validate_plan(&plan)?;
    Ok(plan)
}

/// Check the invariants every active plan must hold: named workouts with
/// positive sets and reps, and labelled meals.
pub fn validate_plan(plan: &Plan) -> Result<(), PlanDecodeError> {
    for (index, workout) in plan.workouts.iter().enumerate() {
        if workout.name.trim().is_empty() {
            return Err(PlanDecodeError::EmptyWorkoutName { index });
        }
        if workout.sets == 0 {
            return Err(PlanDecodeError::ZeroSets {
                name: workout.name.clone(),
            });
        }
        if workout.reps == 0 {
            return Err(PlanDecodeError::ZeroReps {
                name: workout.name.clone(),
            });
        }
    }

    for (index, meal) in plan.meals.iter().enumerate() {
        if meal.meal.trim().is_empty() {
            return Err(PlanDecodeError::EmptyMealLabel { index });
        }
    }

    Ok(())
}
