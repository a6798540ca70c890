//! HTTP adapters for the external AI services behind the fitness coach.
//!
//! Each client implements one of the provider traits from
//! `fitcoach_core::provider` and takes an overridable base URL so tests can
//! point it at a local mock server.

pub mod elevenlabs;
mod http;
pub mod openai;
pub mod replicate;

pub use elevenlabs::{ElevenLabsSpeech, ElevenLabsStreamingSpeech};
pub use openai::OpenAiChat;
pub use replicate::ReplicatePose;
