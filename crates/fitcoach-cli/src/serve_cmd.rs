use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use fitcoach_core::UserProfile;
use fitcoach_core::image::PlaceholderImages;
use fitcoach_core::plan::{FormInput, GenerateError, coach_reply, generate_plan};
use fitcoach_core::provider::{
    ImageGenerator, PoseAnalyzer, ProviderError, SpeechSynthesizer, TextGenerator,
};
use fitcoach_providers::{ElevenLabsSpeech, ElevenLabsStreamingSpeech, OpenAiChat, ReplicatePose};

use crate::config::ProviderKeys;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Every handler failure, mapped to a status and a `{"error": ...}` body.
///
/// Upstream and decode details are logged and never sent to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Missing {0}")]
    MissingCredential(&'static str),
    #[error("Use POST method only")]
    MethodNotAllowed,
    #[error("{message}")]
    Upstream {
        message: &'static str,
        detail: String,
    },
    #[error("{message}")]
    Decode {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    fn upstream(message: &'static str) -> impl FnOnce(ProviderError) -> Self {
        move |err| Self::Upstream {
            message,
            detail: err.to_string(),
        }
    }

    fn generation(message: &'static str) -> impl FnOnce(GenerateError) -> Self {
        move |err| match err {
            GenerateError::Provider(e) => Self::Upstream {
                message,
                detail: e.to_string(),
            },
            GenerateError::Decode(e) => Self::Decode {
                message,
                detail: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential(_) => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream { message, detail } => {
                tracing::error!(%detail, "{message}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Decode { message, detail } => {
                tracing::error!(%detail, "{message}: undecodable provider response");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Parse a JSON request body, turning any failure into a 400.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting request body");
        ApiError::Validation("Invalid JSON body".to_string())
    })
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Provider clients, built once at startup. `None` means no credential.
#[derive(Clone)]
pub struct AppState {
    pub text: Option<Arc<dyn TextGenerator>>,
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub streaming_speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub pose: Option<Arc<dyn PoseAnalyzer>>,
    pub images: Arc<dyn ImageGenerator>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            text: None,
            speech: None,
            streaming_speech: None,
            pose: None,
            images: Arc::new(PlaceholderImages::default()),
        }
    }
}

impl AppState {
    /// Build the real provider clients for every key that is present.
    pub fn from_keys(keys: &ProviderKeys) -> Result<Self> {
        let mut state = Self::default();
        if let Some(key) = &keys.openai {
            state.text = Some(Arc::new(OpenAiChat::new(key.as_str())?));
        }
        if let Some(key) = &keys.elevenlabs {
            state.speech = Some(Arc::new(ElevenLabsSpeech::new(key.as_str())?));
            state.streaming_speech = Some(Arc::new(ElevenLabsStreamingSpeech::new(key.as_str())?));
        }
        if let Some(token) = &keys.replicate {
            state.pose = Some(Arc::new(ReplicatePose::new(token.as_str())?));
        }
        Ok(state)
    }

    pub fn with_text(mut self, text: Arc<dyn TextGenerator>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_streaming_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.streaming_speech = Some(speech);
        self
    }

    pub fn with_pose(mut self, pose: Arc<dyn PoseAnalyzer>) -> Self {
        self.pose = Some(pose);
        self
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// A form value sent either as a JSON string or a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Text(String),
    Number(serde_json::Number),
}

fn field_text(value: Option<FieldValue>) -> String {
    match value {
        Some(FieldValue::Text(s)) => s,
        Some(FieldValue::Number(n)) => n.to_string(),
        None => String::new(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratePlanBody {
    name: Option<String>,
    age: Option<FieldValue>,
    goal: Option<String>,
    height: Option<FieldValue>,
    weight: Option<FieldValue>,
    gender: Option<String>,
}

impl GeneratePlanBody {
    fn into_form(self) -> FormInput {
        FormInput {
            name: self.name.unwrap_or_default(),
            age: field_text(self.age),
            height: field_text(self.height),
            weight: field_text(self.weight),
            gender: self.gender.unwrap_or_default(),
            goal: self.goal.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PromptBody {
    prompt: Option<FieldValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextBody {
    text: Option<String>,
}

impl TextBody {
    fn required_text(self) -> Result<String, ApiError> {
        self.text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("No text provided".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoBody {
    #[serde(rename = "videoUrl")]
    video_url: Value,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-plan", post(generate_plan_handler))
        .route("/api/fitness", post(fitness_handler))
        .route("/api/imageGen", post(image_handler).get(post_only))
        .route("/api/tts", post(tts_handler).get(post_only))
        .route("/api/voice", post(voice_handler))
        .route("/api/video", post(video_handler))
        .route("/api/test", get(env_test_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let listener = bind_listener(bind, port).await?;
    tracing::info!("fitcoach serve listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("fitcoach serve shut down");
    Ok(())
}

/// Bind `bind` (a host name or IP literal, IPv6 without brackets) on `port`.
async fn bind_listener(bind: &str, port: u16) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((bind, port))
        .await
        .with_context(|| format!("failed to bind {bind} port {port}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler; running until killed");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn post_only() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn generate_plan_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let form = parse_body::<GeneratePlanBody>(&body)?.into_form();
    let profile =
        UserProfile::from_form(&form).map_err(|e| ApiError::Validation(e.to_string()))?;
    let generator = state
        .text
        .as_ref()
        .ok_or(ApiError::MissingCredential("OpenAI API key"))?;

    let plan = generate_plan(generator.as_ref(), &profile)
        .await
        .map_err(ApiError::generation("Failed to generate plan"))?;
    Ok(Json(json!({ "plan": plan })))
}

async fn fitness_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let prompt = field_text(parse_body::<PromptBody>(&body)?.prompt);
    let generator = state
        .text
        .as_ref()
        .ok_or(ApiError::MissingCredential("OpenAI API key"))?;

    let message = coach_reply(generator.as_ref(), &prompt)
        .await
        .map_err(ApiError::upstream("Error generating fitness plan."))?;
    Ok(Json(json!({ "message": message })))
}

async fn image_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let prompt = field_text(parse_body::<PromptBody>(&body)?.prompt);
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::Validation("Prompt required".to_string()));
    }

    let url = state
        .images
        .generate(prompt)
        .await
        .map_err(ApiError::upstream("Failed to generate image"))?;
    Ok(Json(json!({ "url": url })))
}

fn audio_response(audio: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response()
}

async fn tts_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let text = parse_body::<TextBody>(&body)?.required_text()?;
    let speech = state
        .speech
        .as_ref()
        .ok_or(ApiError::MissingCredential("ElevenLabs API key"))?;

    let audio = speech
        .synthesize(&text)
        .await
        .map_err(ApiError::upstream("TTS API failed"))?;
    Ok(audio_response(audio))
}

async fn voice_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let text = parse_body::<TextBody>(&body)?.required_text()?;
    let speech = state
        .streaming_speech
        .as_ref()
        .ok_or(ApiError::MissingCredential("ElevenLabs API key"))?;

    let audio = speech
        .synthesize(&text)
        .await
        .map_err(ApiError::upstream("Error generating voice"))?;
    Ok(audio_response(audio))
}

async fn video_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body: VideoBody = parse_body(&body)?;
    let pose = state
        .pose
        .as_ref()
        .ok_or(ApiError::MissingCredential("Replicate API token"))?;

    let analysis = pose
        .analyze(&body.video_url)
        .await
        .map_err(ApiError::upstream("Pose analysis failed"))?;
    Ok(Json(json!({ "analysis": analysis })))
}

async fn env_test_handler(State(state): State<AppState>) -> Json<Value> {
    let openai = state.text.is_some();
    let elevenlabs = state.speech.is_some();
    if openai && elevenlabs {
        Json(json!({ "message": "✅ Environment variables found!" }))
    } else {
        Json(json!({
            "message": "❌ Missing environment variables",
            "openai": openai,
            "elevenlabs": elevenlabs,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
