//! HTTP client for a running `fitcoach serve` instance.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use fitcoach_core::Plan;
use fitcoach_core::client::{PlanApi, RequestError};
use fitcoach_core::image::{ImageApi, ImageError};
use fitcoach_core::plan::{FormInput, validate_plan};

/// Shown when the service gives no usable error of its own.
const GENERIC_FAILURE: &str = "Something went wrong! Try again.";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct PlanBody {
    plan: Plan,
}

#[derive(Debug, Deserialize)]
struct ImageBody {
    #[serde(default)]
    url: Option<String>,
}

/// Answer of `GET /api/test`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvStatus {
    pub message: String,
    #[serde(default)]
    pub openai: Option<bool>,
    #[serde(default)]
    pub elevenlabs: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> reqwest::Result<reqwest::Response> {
        self.http.post(self.url(path)).json(body).send().await
    }

    /// Synthesize `text` through `POST /api/tts`. Returns MP3 bytes.
    pub async fn tts_audio(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .post_json("/api/tts", &json!({ "text": text }))
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        if !response.status().is_success() {
            bail!("speech request failed: {}", error_message(response).await);
        }
        let audio = response.bytes().await.context("failed to read audio")?;
        Ok(audio.to_vec())
    }

    /// Query `GET /api/test`.
    pub async fn env_status(&self) -> Result<EnvStatus> {
        let response = self
            .http
            .get(self.url("/api/test"))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        if !response.status().is_success() {
            bail!("environment check failed: {}", error_message(response).await);
        }
        response
            .json()
            .await
            .context("unexpected environment check response")
    }
}

/// The `{"error"}` message of a failed response, or a generic one.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) if !body.error.is_empty() => body.error,
        _ => {
            tracing::debug!(%status, "error response without message");
            GENERIC_FAILURE.to_string()
        }
    }
}

#[async_trait]
impl PlanApi for ApiClient {
    async fn request_plan(&self, form: &FormInput) -> Result<Plan, RequestError> {
        let body = serde_json::to_value(form).map_err(|e| RequestError(e.to_string()))?;
        let response = self
            .post_json("/api/generate-plan", &body)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "plan request failed");
                RequestError(GENERIC_FAILURE.to_string())
            })?;
        if !response.status().is_success() {
            return Err(RequestError(error_message(response).await));
        }
        let body: PlanBody = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "plan response did not decode");
            RequestError(GENERIC_FAILURE.to_string())
        })?;
        validate_plan(&body.plan).map_err(|e| {
            tracing::warn!(error = %e, "plan response is invalid");
            RequestError(GENERIC_FAILURE.to_string())
        })?;
        Ok(body.plan)
    }
}

#[async_trait]
impl ImageApi for ApiClient {
    async fn request_image(&self, prompt: &str) -> Result<Option<String>, ImageError> {
        let response = self
            .post_json("/api/imageGen", &json!({ "prompt": prompt }))
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ImageError::Request(error_message(response).await));
        }
        let body: ImageBody = response
            .json()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;
        Ok(body.url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fitcoach_core::client::{SubmitError, submit_form};
    use fitcoach_core::image::ImageApi;
    use fitcoach_core::store::{MemoryStorage, PlanStore};
    use fitcoach_test_utils::{ScriptedGenerator, ScriptedSpeech, form, sample_plan_response};

    use super::*;
    use crate::serve_cmd::{AppState, build_router};

    /// Serve `state` on an ephemeral port and return its base URL.
    async fn spawn_server(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn submit_form_round_trip_through_server() {
        let generator = Arc::new(ScriptedGenerator::replying(sample_plan_response()));
        let url = spawn_server(AppState::default().with_text(generator.clone())).await;
        let client = ApiClient::new(&url).unwrap();
        let mut store = PlanStore::load(MemoryStorage::new());

        submit_form(&client, &mut store, &form("Ana", "29", "fat loss"))
            .await
            .unwrap();

        assert_eq!(generator.calls(), 1);
        let plan = store.get().unwrap();
        assert_eq!(plan.name.as_deref(), Some("Ana"));
        assert_eq!(plan.workouts.len(), 2);
    }

    #[tokio::test]
    async fn server_error_message_reaches_client() {
        let url = spawn_server(AppState::default()).await;
        let client = ApiClient::new(&url).unwrap();
        let mut store = PlanStore::load(MemoryStorage::new());

        let err = submit_form(&client, &mut store, &form("Ana", "29", "fat loss"))
            .await
            .unwrap_err();
        match err {
            SubmitError::Request(RequestError(msg)) => assert_eq!(msg, "Missing OpenAI API key"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn invalid_plan_from_service_is_rejected() {
        let app = axum::Router::new().route(
            "/api/generate-plan",
            axum::routing::post(|| async {
                axum::Json(json!({ "plan": {
                    "summary": "s",
                    "workouts": [{ "name": "", "sets": 0, "reps": 0, "rest": "" }],
                    "meals": [{ "meal": "", "items": [] }]
                }}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = ApiClient::new(&format!("http://{addr}")).unwrap();
        let mut store = PlanStore::load(MemoryStorage::new());
        let err = submit_form(&client, &mut store, &form("Ana", "29", "fat loss"))
            .await
            .unwrap_err();
        match err {
            SubmitError::Request(RequestError(msg)) => assert_eq!(msg, GENERIC_FAILURE),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn unreachable_server_is_generic_failure() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .request_plan(&form("Ana", "29", "fat loss"))
            .await
            .unwrap_err();
        assert_eq!(err.0, GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn image_request_returns_url() {
        let url = spawn_server(AppState::default()).await;
        let client = ApiClient::new(&url).unwrap();

        let image = client.request_image("Pushups").await.unwrap();
        assert_eq!(
            image.as_deref(),
            Some("https://placehold.co/1024x768?text=Pushups")
        );

        let err = client.request_image(" ").await.unwrap_err();
        assert!(matches!(err, ImageError::Request(ref m) if m == "Prompt required"));
    }

    #[tokio::test]
    async fn tts_audio_and_env_status() {
        let state = AppState::default().with_speech(Arc::new(ScriptedSpeech::returning(b"mp3")));
        let url = spawn_server(state).await;
        let client = ApiClient::new(&format!("{url}/")).unwrap();

        assert_eq!(client.tts_audio("hi").await.unwrap(), b"mp3".to_vec());

        let status = client.env_status().await.unwrap();
        assert_eq!(status.openai, Some(false));
        assert_eq!(status.elevenlabs, Some(true));

        let err = client.tts_audio("").await.unwrap_err();
        assert!(err.to_string().contains("No text provided"), "got: {err}");
    }
}
