//! Plan export: layout, PDF rendering, file naming.

pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::Plan;

pub use layout::{
    Document, FontWeight, HelveticaMetrics, Page, PageSetup, TextLine, TextMeasure, layout_plan,
    wrap_text,
};
pub use pdf::render_pdf;

/// Filename stem used when the plan has no usable display name.
pub const DEFAULT_FILE_STEM: &str = "fitness";

/// Errors from [`export_plan`].
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no plan available to export")]
    NoPlan,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// `"{name}_plan.pdf"` with the name reduced to `[A-Za-z0-9_-]`.
///
/// A blank or absent name, or one with nothing usable left after
/// sanitizing, falls back to [`DEFAULT_FILE_STEM`].
pub fn export_filename(plan: &Plan) -> String {
    let stem: String = plan
        .display_name()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.chars().all(|c| c == '_') {
        DEFAULT_FILE_STEM
    } else {
        stem.as_str()
    };
    format!("{stem}_plan.pdf")
}

/// Lay out, render and write the active plan into `dir`.
///
/// Fails with [`ExportError::NoPlan`] (and writes nothing) when no plan is
/// active. Returns the path of the written file.
pub fn export_plan(plan: Option<&Plan>, dir: &Path) -> Result<PathBuf, ExportError> {
    let plan = plan.ok_or(ExportError::NoPlan)?;

    let doc = layout_plan(plan, &PageSetup::default(), &HelveticaMetrics);
    let bytes = render_pdf(&doc);

    let path = dir.join(export_filename(plan));
    std::fs::write(&path, &bytes).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), pages = doc.pages.len(), "plan exported");
    Ok(path)
}
