//! Speech engine backed by a local TTS command (`espeak`, `say`, ...).

use tokio::process::{Child, Command};

use super::{SpeechEngine, SpeechError};

/// Spawns `program args... <script>` per utterance. Cancel kills the child.
#[derive(Debug)]
pub struct CommandSpeechEngine {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandSpeechEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// Parse a whitespace-separated command line such as `"espeak -s 150"`.
    ///
    /// Returns `None` for a blank command line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    /// Platform default: `say` on macOS, `espeak` elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("say", Vec::new())
        } else {
            Self::new("espeak", Vec::new())
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Wait for the current utterance to end.
    ///
    /// Returns immediately when nothing is playing. A non-zero exit status
    /// is reported as [`SpeechError::Exited`].
    pub async fn wait(&mut self) -> Result<(), SpeechError> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        let status = child
            .wait()
            .await
            .map_err(|e| SpeechError::Engine(e.to_string()))?;
        self.child = None;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Exited(status.to_string()))
        }
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn start(&mut self, script: &str) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(script)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(program = %self.program, pid = ?child.id(), "speech started");
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "speech process already gone");
            }
        }
    }
}
