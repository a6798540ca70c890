//! `fitcoach read`: narrate the active plan.
//!
//! Speaks through a local TTS command by default; `--audio` saves the
//! service-synthesized MP3 instead and `--script` only prints the text.

use std::path::Path;

use anyhow::{Context, Result, bail};

use fitcoach_core::Plan;
use fitcoach_core::voice::{CommandSpeechEngine, SpeechError, VoicePlayback, narration_script};

use crate::api_client::ApiClient;
use crate::config::FitcoachConfig;
use crate::plan_cmds::open_store;

pub async fn run_read(config: &FitcoachConfig, audio: Option<&Path>, script_only: bool) -> Result<()> {
    let store = open_store(config);
    let Some(plan) = store.get() else {
        bail!("No plan available to read. Run `fitcoach plan generate` first.");
    };

    if script_only {
        println!("{}", narration_script(plan));
        return Ok(());
    }

    if let Some(path) = audio {
        let client = ApiClient::new(&config.api_url)?;
        let bytes = client.tts_audio(&narration_script(plan)).await?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved narration to {}", path.display());
        return Ok(());
    }

    play(plan, speech_engine(config)).await
}

/// The configured TTS command, or the platform default.
fn speech_engine(config: &FitcoachConfig) -> CommandSpeechEngine {
    config
        .speech_command
        .as_deref()
        .and_then(CommandSpeechEngine::from_command_line)
        .unwrap_or_else(CommandSpeechEngine::platform_default)
}

enum Outcome {
    Finished(Result<(), SpeechError>),
    Interrupted,
}

/// Speak `plan` until the engine finishes or Ctrl+C stops it.
async fn play(plan: &Plan, engine: CommandSpeechEngine) -> Result<()> {
    let program = engine.program().to_string();
    let mut playback = VoicePlayback::new(engine);
    if !playback.read(Some(plan)) {
        println!("Could not start speech command `{program}`; set FITCOACH_SPEECH_COMMAND.");
        return Ok(());
    }
    println!("Reading your plan (Ctrl+C to stop)...");

    let outcome = tokio::select! {
        result = playback.engine_mut().wait() => Outcome::Finished(result),
        _ = tokio::signal::ctrl_c() => Outcome::Interrupted,
    };

    match outcome {
        Outcome::Finished(Ok(())) => playback.on_finished(),
        Outcome::Finished(Err(e)) => playback.on_error(e),
        Outcome::Interrupted => {
            playback.stop();
            println!("Stopped.");
        }
    }
    Ok(())
}
