//! Replicate pose estimation (`catid/pose-resnet`, latest version).
//!
//! A prediction is created with `Prefer: wait`; if Replicate answers before
//! the model finishes, the prediction's `urls.get` is polled until it
//! reaches a terminal status.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use fitcoach_core::provider::{PoseAnalyzer, ProviderError};

use crate::http;

const PROVIDER: &str = "replicate";

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com";
pub const POSE_MODEL: &str = "catid/pose-resnet";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_POLLS: u32 = 300;

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }
}

#[derive(Debug, Clone)]
pub struct ReplicatePose {
    client: reqwest::Client,
    token: String,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl ReplicatePose {
    pub fn new(token: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_client(PROVIDER)?,
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    async fn fetch(&self, url: &str) -> Result<Prediction, ProviderError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| http::transport(PROVIDER, e))?;
        let response = http::check_status(PROVIDER, response).await?;
        response
            .json()
            .await
            .map_err(|e| http::invalid(PROVIDER, e.to_string()))
    }
}

#[async_trait]
impl PoseAnalyzer for ReplicatePose {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn analyze(&self, video_url: &Value) -> Result<Value, ProviderError> {
        let url = http::join_url(
            &self.base_url,
            &format!("v1/models/{POSE_MODEL}/predictions"),
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Prefer", "wait")
            .json(&json!({ "input": { "video": video_url } }))
            .send()
            .await
            .map_err(|e| http::transport(PROVIDER, e))?;
        let response = http::check_status(PROVIDER, response).await?;
        let mut prediction: Prediction = response
            .json()
            .await
            .map_err(|e| http::invalid(PROVIDER, e.to_string()))?;

        let mut polls = 0;
        while !prediction.is_terminal() {
            let Some(get_url) = prediction.urls.as_ref().and_then(|u| u.get.clone()) else {
                return Err(http::invalid(
                    PROVIDER,
                    format!("prediction is {:?} with no polling URL", prediction.status),
                ));
            };
            if polls >= self.max_polls {
                return Err(http::invalid(
                    PROVIDER,
                    format!("prediction still {:?} after {polls} polls", prediction.status),
                ));
            }
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.fetch(&get_url).await?;
        }

        match prediction.status.as_str() {
            "succeeded" => {
                tracing::debug!(polls, "pose prediction succeeded");
                Ok(prediction.output)
            }
            status => Err(http::invalid(
                PROVIDER,
                format!("prediction {status}: {}", prediction.error),
            )),
        }
    }
}
