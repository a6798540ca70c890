//! Form validation and plan prompt construction.
//!
//! Turns raw form input into a [`UserProfile`] and the profile into the
//! instruction string sent to the text-generation provider. Pure logic, no
//! I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Gender, Goal, UserProfile};

// ---------------------------------------------------------------------------
// Form input
// ---------------------------------------------------------------------------

/// Raw form fields, exactly as typed. Every field may be blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub name: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub gender: String,
    pub goal: String,
}

/// Validation failures for [`FormInput`]. None of these ever reach the network.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid age {0:?} (expected a positive whole number)")]
    InvalidAge(String),

    #[error("invalid goal {0:?} (expected muscle gain, fat loss, or general fitness)")]
    InvalidGoal(String),

    #[error("invalid {field} {value:?} (expected a positive number)")]
    InvalidMeasurement { field: &'static str, value: String },

    #[error("invalid gender {0:?} (expected male or female)")]
    InvalidGender(String),
}

impl UserProfile {
    /// Validate form input.
    ///
    /// Name, age and goal are required; height, weight and gender are
    /// optional and blank values become `None` / [`Gender::Unspecified`].
    pub fn from_form(form: &FormInput) -> Result<Self, FormError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingField("name"));
        }
        let age = form.age.trim();
        if age.is_empty() {
            return Err(FormError::MissingField("age"));
        }
        let goal = form.goal.trim();
        if goal.is_empty() {
            return Err(FormError::MissingField("goal"));
        }

        let age = age
            .parse::<u32>()
            .ok()
            .filter(|a| *a > 0)
            .ok_or_else(|| FormError::InvalidAge(form.age.clone()))?;
        let goal = goal
            .parse::<Goal>()
            .map_err(|_| FormError::InvalidGoal(form.goal.clone()))?;
        let gender = form
            .gender
            .parse::<Gender>()
            .map_err(|_| FormError::InvalidGender(form.gender.clone()))?;

        Ok(Self {
            name: name.to_string(),
            age,
            height: parse_measurement("height", &form.height)?,
            weight: parse_measurement("weight", &form.weight)?,
            gender,
            goal,
        })
    }
}

fn parse_measurement(field: &'static str, raw: &str) -> Result<Option<f64>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(Some(v)),
        _ => Err(FormError::InvalidMeasurement {
            field,
            value: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Response contract appended to every plan prompt.
const RESPONSE_FORMAT: &str = r#"Include:
- Short summary paragraph
- Workout array (name, sets, reps, rest)
- Meal array (meal name and food items)
Return JSON format only — no markdown, no extra text.
Example:
{
  "summary": "...",
  "workouts": [{ "name": "...", "sets": 3, "reps": 12, "rest": "60s" }],
  "meals": [{ "meal": "Breakfast", "items": ["Oats", "Eggs", "Banana"] }]
}"#;

/// Build the plan instruction for a profile.
///
/// Only name, age and goal are embedded; the remaining profile fields are
/// carried for callers but do not change the prompt.
pub fn build_plan_prompt(profile: &UserProfile) -> String {
    let mut prompt = String::with_capacity(512);
    prompt.push_str(&format!(
        "Create a 7-day personalized {} fitness plan for {}, aged {}.\n",
        profile.goal, profile.name, profile.age
    ));
    prompt.push_str(RESPONSE_FORMAT);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, age: &str, goal: &str) -> FormInput {
        FormInput {
            name: name.into(),
            age: age.into(),
            goal: goal.into(),
            ..FormInput::default()
        }
    }

    #[test]
    fn valid_form_builds_profile() {
        let profile = UserProfile::from_form(&form(" Ana ", "29", "fat loss")).unwrap();
        assert_eq!(profile.name, "Ana");
        assert_eq!(profile.age, 29);
        assert_eq!(profile.goal, Goal::FatLoss);
        assert_eq!(profile.gender, Gender::Unspecified);
        assert_eq!(profile.height, None);
    }

    #[test]
    fn missing_fields_are_reported_in_form_order() {
        assert_eq!(
            UserProfile::from_form(&form("", "", "")),
            Err(FormError::MissingField("name"))
        );
        assert_eq!(
            UserProfile::from_form(&form("Ana", " ", "fat loss")),
            Err(FormError::MissingField("age"))
        );
        assert_eq!(
            UserProfile::from_form(&form("Ana", "30", "")),
            Err(FormError::MissingField("goal"))
        );
    }

    #[test]
    fn non_numeric_or_zero_age_is_rejected() {
        assert!(matches!(
            UserProfile::from_form(&form("Ana", "thirty", "fat loss")),
            Err(FormError::InvalidAge(_))
        ));
        assert!(matches!(
            UserProfile::from_form(&form("Ana", "0", "fat loss")),
            Err(FormError::InvalidAge(_))
        ));
    }

    #[test]
    fn unknown_goal_is_rejected() {
        assert!(matches!(
            UserProfile::from_form(&form("Ana", "30", "bulk")),
            Err(FormError::InvalidGoal(_))
        ));
    }

    #[test]
    fn optional_measurements_pass_through() {
        let mut input = form("Ana", "30", "muscle gain");
        input.height = "172.5".into();
        input.weight = "64".into();
        input.gender = "female".into();
        let profile = UserProfile::from_form(&input).unwrap();
        assert_eq!(profile.height, Some(172.5));
        assert_eq!(profile.weight, Some(64.0));
        assert_eq!(profile.gender, Gender::Female);

        input.weight = "-3".into();
        assert!(matches!(
            UserProfile::from_form(&input),
            Err(FormError::InvalidMeasurement { field: "weight", .. })
        ));
    }

    #[test]
    fn prompt_embeds_required_fields_and_contract() {
        let profile = UserProfile::from_form(&form("Ana", "29", "general fitness")).unwrap();
        let prompt = build_plan_prompt(&profile);
        assert!(prompt.starts_with("Create a 7-day personalized general fitness fitness plan for Ana, aged 29."));
        assert!(prompt.contains("\"workouts\""));
        assert!(prompt.contains("\"meals\""));
        assert!(prompt.contains("no markdown"));
    }
}
