//! CLI handlers for `fitcoach plan` subcommands.
//!
//! Implements:
//! - `fitcoach plan generate ...` -- validate the form, request a plan, store it
//! - `fitcoach plan show`         -- print the active plan
//! - `fitcoach plan clear`        -- forget the active plan

use std::fmt::Write as _;

use anyhow::{Context, Result};

use fitcoach_core::Plan;
use fitcoach_core::client::submit_form;
use fitcoach_core::plan::FormInput;
use fitcoach_core::store::{FileStorage, PlanStore};

use crate::PlanCommands;
use crate::api_client::ApiClient;
use crate::config::FitcoachConfig;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, config: &FitcoachConfig) -> Result<()> {
    let mut store = open_store(config);
    match command {
        PlanCommands::Generate {
            name,
            age,
            goal,
            height,
            weight,
            gender,
        } => {
            let form = FormInput {
                name,
                age,
                height: height.unwrap_or_default(),
                weight: weight.unwrap_or_default(),
                gender: gender.unwrap_or_default(),
                goal,
            };
            cmd_generate(config, &mut store, &form).await
        }
        PlanCommands::Show => {
            cmd_show(&store);
            Ok(())
        }
        PlanCommands::Clear => cmd_clear(&mut store),
    }
}

/// Open the plan store in the configured data directory.
pub fn open_store(config: &FitcoachConfig) -> PlanStore<FileStorage> {
    PlanStore::load(FileStorage::new(&config.data_dir))
}

// -----------------------------------------------------------------------
// fitcoach plan generate
// -----------------------------------------------------------------------

async fn cmd_generate(
    config: &FitcoachConfig,
    store: &mut PlanStore<FileStorage>,
    form: &FormInput,
) -> Result<()> {
    let client = ApiClient::new(&config.api_url)?;

    println!("Generating your plan...");
    submit_form(&client, store, form)
        .await
        .context("could not generate a plan")?;

    if let Some(plan) = store.get() {
        print!("{}", render_plan(plan));
    }
    Ok(())
}

// -----------------------------------------------------------------------
// fitcoach plan show / clear
// -----------------------------------------------------------------------

fn cmd_show(store: &PlanStore<FileStorage>) {
    match store.get() {
        Some(plan) => print!("{}", render_plan(plan)),
        None => println!("No plan yet. Run `fitcoach plan generate` to create one."),
    }
}

fn cmd_clear(store: &mut PlanStore<FileStorage>) -> Result<()> {
    if store.get().is_none() {
        println!("No plan to clear.");
        return Ok(());
    }
    store.clear().context("failed to clear the stored plan")?;
    println!("Plan cleared.");
    Ok(())
}

/// Human-readable plan listing. Workouts and meals are numbered from 1, the
/// same numbering `fitcoach image` accepts.
pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Personalized Fitness Plan for {}",
        plan.display_name().unwrap_or("User")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", plan.summary);
    let _ = writeln!(out);
    let _ = writeln!(out, "Workouts:");
    for (i, w) in plan.workouts.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {} — {} sets × {} reps ({} rest)",
            i + 1,
            w.name,
            w.sets,
            w.reps,
            w.rest
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Meals:");
    for (i, m) in plan.meals.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {}: {}", i + 1, m.meal, m.items_joined());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcoach_core::{Meal, Workout};

    fn plan() -> Plan {
        Plan {
            name: Some("Ana".into()),
            summary: "Build strength.".into(),
            workouts: vec![Workout {
                name: "Pushups".into(),
                sets: 3,
                reps: 12,
                rest: "60s".into(),
            }],
            meals: vec![Meal {
                meal: "Breakfast".into(),
                items: vec!["Oats".into(), "Eggs".into()],
            }],
        }
    }

    #[test]
    fn render_lists_numbered_workouts_and_meals() {
        let text = render_plan(&plan());
        assert!(text.starts_with("Personalized Fitness Plan for Ana\n"));
        assert!(text.contains("   1. Pushups — 3 sets × 12 reps (60s rest)\n"), "got:\n{text}");
        assert!(text.contains("   1. Breakfast: Oats, Eggs\n"), "got:\n{text}");
    }

    #[test]
    fn render_without_name_uses_user() {
        let mut p = plan();
        p.name = None;
        assert!(render_plan(&p).starts_with("Personalized Fitness Plan for User\n"));
    }
}
