use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Training goal selected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "muscle gain")]
    MuscleGain,
    #[serde(rename = "fat loss")]
    FatLoss,
    #[serde(rename = "general fitness")]
    GeneralFitness,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MuscleGain => "muscle gain",
            Self::FatLoss => "fat loss",
            Self::GeneralFitness => "general fitness",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = GoalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "muscle gain" | "muscle_gain" => Ok(Self::MuscleGain),
            "fat loss" | "fat_loss" => Ok(Self::FatLoss),
            "general fitness" | "general_fitness" => Ok(Self::GeneralFitness),
            _ => Err(GoalParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Goal`] string.
#[derive(Debug, Clone)]
pub struct GoalParseError(pub String);

impl fmt::Display for GoalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid goal: {:?} (expected muscle gain, fat loss, or general fitness)",
            self.0
        )
    }
}

impl std::error::Error for GoalParseError {}

// ---------------------------------------------------------------------------

/// Gender selected on the form. Blank input maps to `Unspecified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "" | "unspecified" => Ok(Self::Unspecified),
            _ => Err(GenderParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Gender`] string.
#[derive(Debug, Clone)]
pub struct GenderParseError(pub String);

impl fmt::Display for GenderParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid gender: {:?}", self.0)
    }
}

impl std::error::Error for GenderParseError {}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Attributes collected from the user for one generation request.
///
/// Transient: built from form input, handed to the prompt formatter, then
/// dropped. Only `name` survives, denormalized onto the resulting [`Plan`].
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    /// Height in centimetres.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    pub gender: Gender,
    pub goal: Goal,
}

/// A single exercise entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// Rest between sets, free text such as `"60s"`.
    pub rest: String,
}

/// A meal with its ordered food items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Label such as `"Breakfast"`.
    pub meal: String,
    pub items: Vec<String>,
}

/// A generated fitness plan.
///
/// Always produced whole by one generation call and replaced whole on the
/// next one; there is no partial update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub summary: String,
    pub workouts: Vec<Workout>,
    pub meals: Vec<Meal>,
}

impl Plan {
    /// Display name with surrounding whitespace removed, `None` when blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

impl Meal {
    /// Items joined the way every surface renders them.
    pub fn items_joined(&self) -> String {
        self.items.join(", ")
    }
}
