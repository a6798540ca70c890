//! ElevenLabs text-to-speech.
//!
//! Two flavours are kept: a direct request with explicit voice settings,
//! and a streamed conversion that is collected into one buffer before it
//! is returned. Both answer MP3 audio.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;

use fitcoach_core::provider::{ProviderError, SpeechSynthesizer};

use crate::http;

const PROVIDER: &str = "elevenlabs";

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Voice used by the direct client.
pub const DIRECT_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB";
/// Voice used by the streaming client.
pub const STREAMING_VOICE_ID: &str = "pMsXgVXv3BLzUgSXRplE";
pub const STREAMING_MODEL_ID: &str = "eleven_multilingual_v2";
pub const STREAMING_OUTPUT_FORMAT: &str = "mp3_44100_128";

#[derive(Debug, Clone, Copy, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

const DIRECT_VOICE_SETTINGS: VoiceSettings = VoiceSettings {
    stability: 0.3,
    similarity_boost: 0.75,
};

#[derive(Debug, Serialize)]
struct DirectRequest<'a> {
    text: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct StreamingRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

fn speech_url(base: &str, voice_id: &str) -> String {
    http::join_url(base, &format!("v1/text-to-speech/{voice_id}"))
}

// ---------------------------------------------------------------------------
// Direct
// ---------------------------------------------------------------------------

/// One-shot TTS request returning the full response body.
#[derive(Debug, Clone)]
pub struct ElevenLabsSpeech {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_client(PROVIDER)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .post(speech_url(&self.base_url, DIRECT_VOICE_ID))
            .header("xi-api-key", &self.api_key)
            .json(&DirectRequest {
                text,
                voice_settings: DIRECT_VOICE_SETTINGS,
            })
            .send()
            .await
            .map_err(|e| http::transport(PROVIDER, e))?;
        let response = http::check_status(PROVIDER, response).await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| http::transport(PROVIDER, e))?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

/// Streamed conversion, collected chunk by chunk into one buffer.
#[derive(Debug, Clone)]
pub struct ElevenLabsStreamingSpeech {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsStreamingSpeech {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_client(PROVIDER)?,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsStreamingSpeech {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .post(speech_url(&self.base_url, STREAMING_VOICE_ID))
            .query(&[("output_format", STREAMING_OUTPUT_FORMAT)])
            .header("xi-api-key", &self.api_key)
            .json(&StreamingRequest {
                text,
                model_id: STREAMING_MODEL_ID,
            })
            .send()
            .await
            .map_err(|e| http::transport(PROVIDER, e))?;
        let response = http::check_status(PROVIDER, response).await?;

        let mut audio = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| http::transport(PROVIDER, e))?;
            audio.extend_from_slice(&chunk);
        }
        tracing::debug!(bytes = audio.len(), "streamed speech collected");
        Ok(audio)
    }
}
