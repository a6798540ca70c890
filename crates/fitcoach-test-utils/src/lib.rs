//! Shared test utilities for fitcoach tests.
//!
//! Provides sample plans and scripted stand-ins for every external
//! collaborator: text, speech, and pose providers, the plan and image
//! endpoints, the speech engine, and the URL opener. Every fake records
//! what it was asked so tests can assert on call counts.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use fitcoach_core::client::{PlanApi, RequestError};
use fitcoach_core::image::{ImageApi, ImageError, UrlOpener};
use fitcoach_core::plan::FormInput;
use fitcoach_core::provider::{
    CompletionRequest, PoseAnalyzer, ProviderError, SpeechSynthesizer, TextGenerator,
};
use fitcoach_core::voice::{SpeechEngine, SpeechError};
use fitcoach_core::{Meal, Plan, Workout};

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

/// A small complete plan named `name`.
pub fn sample_plan(name: &str) -> Plan {
    Plan {
        name: Some(name.to_string()),
        summary: "A 7-day plan mixing strength and conditioning.".to_string(),
        workouts: vec![
            Workout {
                name: "Pushups".to_string(),
                sets: 3,
                reps: 12,
                rest: "60s".to_string(),
            },
            Workout {
                name: "Goblet Squat".to_string(),
                sets: 4,
                reps: 10,
                rest: "90s".to_string(),
            },
        ],
        meals: vec![
            Meal {
                meal: "Breakfast".to_string(),
                items: vec!["Oats".to_string(), "Eggs".to_string(), "Banana".to_string()],
            },
            Meal {
                meal: "Dinner".to_string(),
                items: vec!["Salmon".to_string(), "Rice".to_string()],
            },
        ],
    }
}

/// The provider-side JSON for [`sample_plan`] (no `name`), wrapped in a
/// markdown fence the way chat models often answer.
pub fn sample_plan_response() -> String {
    let plan = sample_plan("ignored");
    let body = serde_json::json!({
        "summary": plan.summary,
        "workouts": plan.workouts,
        "meals": plan.meals,
    });
    format!("```json\n{body}\n```")
}

/// Raw form input with the three required fields set.
pub fn form(name: &str, age: &str, goal: &str) -> FormInput {
    FormInput {
        name: name.to_string(),
        age: age.to_string(),
        goal: goal.to_string(),
        ..FormInput::default()
    }
}

fn scripted_failure(provider: &'static str) -> ProviderError {
    ProviderError::Status {
        provider,
        status: 500,
        body: "scripted failure".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Text generator returning a fixed reply (or failing) and recording requests.
pub struct ScriptedGenerator {
    reply: Option<Option<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(Some(text.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers successfully but without content.
    pub fn empty() -> Self {
        Self {
            reply: Some(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().ok_or_else(|| scripted_failure("scripted"))
    }
}

/// Speech synthesizer returning fixed audio bytes (or failing).
pub struct ScriptedSpeech {
    audio: Option<Vec<u8>>,
    texts: Mutex<Vec<String>>,
}

impl ScriptedSpeech {
    pub fn returning(audio: &[u8]) -> Self {
        Self {
            audio: Some(audio.to_vec()),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            audio: None,
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSpeech {
    fn name(&self) -> &str {
        "scripted-speech"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        self.texts.lock().unwrap().push(text.to_string());
        self.audio
            .clone()
            .ok_or_else(|| scripted_failure("scripted-speech"))
    }
}

/// Pose analyzer echoing its input inside a fixed envelope.
#[derive(Default)]
pub struct EchoPoseAnalyzer;

#[async_trait]
impl PoseAnalyzer for EchoPoseAnalyzer {
    fn name(&self) -> &str {
        "echo-pose"
    }

    async fn analyze(
        &self,
        video_url: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        Ok(serde_json::json!({ "video": video_url, "keypoints": [] }))
    }
}

// ---------------------------------------------------------------------------
// Client-side endpoints
// ---------------------------------------------------------------------------

/// Plan endpoint returning a fixed plan (or failing) and counting calls.
pub struct CountingPlanApi {
    plan: Option<Plan>,
    calls: AtomicUsize,
}

impl CountingPlanApi {
    pub fn returning(plan: Plan) -> Self {
        Self {
            plan: Some(plan),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            plan: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanApi for CountingPlanApi {
    async fn request_plan(&self, _form: &FormInput) -> Result<Plan, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.plan
            .clone()
            .ok_or_else(|| RequestError("Something went wrong! Try again.".to_string()))
    }
}

/// Image endpoint answering with a fixed URL (or none).
pub struct FixedImageApi {
    url: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FixedImageApi {
    pub fn new(url: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageApi for FixedImageApi {
    async fn request_image(&self, prompt: &str) -> Result<Option<String>, ImageError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.url.clone())
    }
}

/// URL opener that only records.
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), ImageError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Speech engine that records scripts and cancellations.
#[derive(Debug, Default)]
pub struct RecordingSpeechEngine {
    pub scripts: Vec<String>,
    pub cancels: usize,
    pub fail_start: bool,
}

impl SpeechEngine for RecordingSpeechEngine {
    fn start(&mut self, script: &str) -> Result<(), SpeechError> {
        if self.fail_start {
            return Err(SpeechError::Engine("scripted start failure".to_string()));
        }
        self.scripts.push(script.to_string());
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}
