//! Voice playback: narration script and the speaking session.
//!
//! The controller is a two-state machine (`Idle`, `Speaking`) wrapped around
//! a [`SpeechEngine`]. At most one utterance is active: starting a new read
//! while speaking cancels the previous one first. Engine failures return the
//! controller to `Idle` and are only logged.

pub mod command;

use thiserror::Error;

use crate::model::Plan;

pub use command::CommandSpeechEngine;

/// Failures reported by a speech engine.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to start speech engine {program:?}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("speech engine exited with {0}")]
    Exited(String),

    #[error("speech engine failed: {0}")]
    Engine(String),
}

/// Build the narration script for a plan.
///
/// Summary first, then workouts as `"name, N sets of M reps"`, then meals as
/// `"label: item, item"`, all in stored order.
pub fn narration_script(plan: &Plan) -> String {
    let workouts = plan
        .workouts
        .iter()
        .map(|w| format!("{}, {} sets of {} reps", w.name, w.sets, w.reps))
        .collect::<Vec<_>>()
        .join(", ");
    let meals = plan
        .meals
        .iter()
        .map(|m| format!("{}: {}", m.meal, m.items_joined()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}. Workouts include {workouts}. Meals include {meals}.",
        plan.summary
    )
}

/// A speech backend able to start and cancel one utterance.
pub trait SpeechEngine {
    /// Begin speaking `script`. Returns once the utterance has started.
    fn start(&mut self, script: &str) -> Result<(), SpeechError>;

    /// Cancel the current utterance, if any.
    fn cancel(&mut self);
}

/// Playback session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking,
}

/// Drives a [`SpeechEngine`] from user actions and engine callbacks.
#[derive(Debug)]
pub struct VoicePlayback<E: SpeechEngine> {
    engine: E,
    state: PlaybackState,
}

impl<E: SpeechEngine> VoicePlayback<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_speaking(&self) -> bool {
        self.state == PlaybackState::Speaking
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Read `plan` aloud. Returns whether an utterance is now active.
    ///
    /// Without a plan nothing happens and the session stays as it was.
    pub fn read(&mut self, plan: Option<&Plan>) -> bool {
        let Some(plan) = plan else {
            return false;
        };

        if self.is_speaking() {
            self.engine.cancel();
            self.state = PlaybackState::Idle;
        }

        let script = narration_script(plan);
        match self.engine.start(&script) {
            Ok(()) => {
                self.state = PlaybackState::Speaking;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "speech synthesis failed to start");
                self.state = PlaybackState::Idle;
                false
            }
        }
    }

    /// Explicit stop.
    pub fn stop(&mut self) {
        if self.is_speaking() {
            self.engine.cancel();
        }
        self.state = PlaybackState::Idle;
    }

    /// The engine finished the utterance.
    pub fn on_finished(&mut self) {
        self.state = PlaybackState::Idle;
    }

    /// The engine reported a failure mid-utterance.
    pub fn on_error(&mut self, err: SpeechError) {
        tracing::warn!(error = %err, "speech synthesis failed");
        self.state = PlaybackState::Idle;
    }
}
