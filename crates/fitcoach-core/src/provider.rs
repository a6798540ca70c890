//! Provider traits -- the adapter interfaces for external AI services.
//!
//! Each concrete provider (OpenAI, ElevenLabs, Replicate, the placeholder
//! image service) implements one of these traits. All of them are
//! object-safe so the server can hold them as `Arc<dyn ...>` built once from
//! configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure talking to an external provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unexpected response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Text generation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One non-streaming chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A chat-completion style text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Run one completion and return the first choice's content.
    ///
    /// `Ok(None)` means the provider answered but produced no content.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Speech, images, pose analysis
// ---------------------------------------------------------------------------

/// Text-to-speech synthesis returning encoded audio (MP3).
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Turns a free-text prompt into a resource URL for an image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Video pose analysis. The output is passed through untouched.
#[async_trait]
pub trait PoseAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, video_url: &serde_json::Value)
    -> Result<serde_json::Value, ProviderError>;
}

// Compile-time assertion: every provider trait must be usable as `dyn`.
const _: () = {
    fn _assert_object_safe(
        _: &dyn TextGenerator,
        _: &dyn SpeechSynthesizer,
        _: &dyn ImageGenerator,
        _: &dyn PoseAnalyzer,
    ) {
    }
};
