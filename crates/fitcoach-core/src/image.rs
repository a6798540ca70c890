//! Image prompt dispatch.
//!
//! Server side, [`PlaceholderImages`] turns a label into a placeholder image
//! URL. Client side, [`ImageDispatcher`] asks the image API for a URL and
//! opens it.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Meal, Workout};
use crate::provider::{ImageGenerator, ProviderError};

/// Default placeholder image service.
pub const PLACEHOLDER_BASE_URL: &str = "https://placehold.co";

/// Default placeholder image size.
pub const PLACEHOLDER_SIZE: &str = "1024x768";

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Image label for a workout: its name.
pub fn workout_label(workout: &Workout) -> String {
    workout.name.clone()
}

/// Image label for a meal: `"{label} meal with {item, item}"`.
pub fn meal_label(meal: &Meal) -> String {
    format!("{} meal with {}", meal.meal, meal.items_joined())
}

// ---------------------------------------------------------------------------
// Placeholder generator
// ---------------------------------------------------------------------------

/// Free placeholder image service: no API key, no billing.
#[derive(Debug, Clone)]
pub struct PlaceholderImages {
    base_url: String,
    size: String,
}

impl Default for PlaceholderImages {
    fn default() -> Self {
        Self::new(PLACEHOLDER_BASE_URL, PLACEHOLDER_SIZE)
    }
}

impl PlaceholderImages {
    pub fn new(base_url: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            size: size.into(),
        }
    }

    /// `{base}/{size}?text={urlencoded prompt}`.
    pub fn url_for(&self, prompt: &str) -> String {
        format!(
            "{}/{}?text={}",
            self.base_url,
            self.size,
            urlencoding::encode(prompt)
        )
    }
}

#[async_trait]
impl ImageGenerator for PlaceholderImages {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(self.url_for(prompt))
    }
}

// ---------------------------------------------------------------------------
// Client-side dispatch
// ---------------------------------------------------------------------------

/// Failures surfaced to the user when requesting an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Request(String),

    #[error("image response did not contain a URL")]
    MissingUrl,

    #[error("failed to open {url}: {source}")]
    Open {
        url: String,
        source: std::io::Error,
    },
}

/// The image endpoint as seen by the client.
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Request an image for `prompt`; `Ok(None)` when the answer has no URL.
    async fn request_image(&self, prompt: &str) -> Result<Option<String>, ImageError>;
}

/// Opens a resource locator in a new browsing context.
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<(), ImageError>;
}

/// Opens URLs with the desktop's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), ImageError> {
        let mut command = if cfg!(target_os = "macos") {
            std::process::Command::new("open")
        } else if cfg!(windows) {
            let mut c = std::process::Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            std::process::Command::new("xdg-open")
        };
        command
            .arg(url)
            .spawn()
            .map(|_| ())
            .map_err(|source| ImageError::Open {
                url: url.to_string(),
                source,
            })
    }
}

/// Requests an image for a label and opens the result. No retry.
pub struct ImageDispatcher<'a> {
    api: &'a dyn ImageApi,
    opener: &'a dyn UrlOpener,
}

impl<'a> ImageDispatcher<'a> {
    pub fn new(api: &'a dyn ImageApi, opener: &'a dyn UrlOpener) -> Self {
        Self { api, opener }
    }

    /// Returns the URL that was opened.
    pub async fn dispatch(&self, label: &str) -> Result<String, ImageError> {
        let url = self
            .api
            .request_image(label)
            .await?
            .filter(|u| !u.is_empty())
            .ok_or(ImageError::MissingUrl)?;
        tracing::info!(%url, "opening image");
        self.opener.open(&url)?;
        Ok(url)
    }
}
