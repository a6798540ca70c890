//! `fitcoach image`: open an illustration for a workout or meal of the active plan.

use anyhow::{Context, Result, bail};

use fitcoach_core::Plan;
use fitcoach_core::image::{ImageDispatcher, SystemOpener, meal_label, workout_label};

use crate::api_client::ApiClient;
use crate::config::FitcoachConfig;
use crate::plan_cmds::open_store;

/// What to illustrate. Indices are 1-based, as printed by `fitcoach plan show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTarget {
    Workout(usize),
    Meal(usize),
}

pub async fn run_image(config: &FitcoachConfig, target: ImageTarget) -> Result<()> {
    let store = open_store(config);
    let Some(plan) = store.get() else {
        bail!("No plan yet. Run `fitcoach plan generate` first.");
    };
    let label = image_label(plan, &target)?;

    let client = ApiClient::new(&config.api_url)?;
    let opener = SystemOpener;
    let url = ImageDispatcher::new(&client, &opener)
        .dispatch(&label)
        .await
        .context("Image generation failed")?;
    println!("{url}");
    Ok(())
}

/// The prompt label for `target` within `plan`.
pub fn image_label(plan: &Plan, target: &ImageTarget) -> Result<String> {
    match *target {
        ImageTarget::Workout(n) => n
            .checked_sub(1)
            .and_then(|i| plan.workouts.get(i))
            .map(workout_label)
            .with_context(|| {
                format!("no workout #{n} (plan has {})", plan.workouts.len())
            }),
        ImageTarget::Meal(n) => n
            .checked_sub(1)
            .and_then(|i| plan.meals.get(i))
            .map(meal_label)
            .with_context(|| format!("no meal #{n} (plan has {})", plan.meals.len())),
    }
}
