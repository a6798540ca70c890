use std::path::{Path, PathBuf};

use anyhow::Context;

use fitcoach_core::export::export_plan;

use crate::config::FitcoachConfig;
use crate::plan_cmds::open_store;

/// Write the active plan as a PDF into `dir` (default: current directory).
pub fn run_export(config: &FitcoachConfig, dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let store = open_store(config);
    let path = export_plan(store.get(), &dir)?;
    println!("Exported plan to {}", path.display());
    Ok(path)
}
