//! Integration tests for the `fitcoach` binary's offline commands.
//!
//! Each test runs the built binary with an isolated config and data
//! directory, so nothing touches the user's real plan or config file.

use std::path::Path;
use std::process::{Command, Output};

use fitcoach_core::store::{FileStorage, PlanStore};
use fitcoach_test_utils::sample_plan;

struct Sandbox {
    config: tempfile::TempDir,
    data: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            config: tempfile::TempDir::new().unwrap(),
            data: tempfile::TempDir::new().unwrap(),
        }
    }

    fn with_plan(name: &str) -> Self {
        let sandbox = Self::new();
        PlanStore::load(FileStorage::new(sandbox.data.path()))
            .set(sample_plan(name))
            .unwrap();
        sandbox
    }

    fn run(&self, args: &[&str], cwd: &Path) -> Output {
        self.run_with_env(args, cwd, &[])
    }

    fn run_with_env(&self, args: &[&str], cwd: &Path, env: &[(&str, &str)]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_fitcoach"))
            .args(args)
            .current_dir(cwd)
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("FITCOACH_DATA_DIR", self.data.path())
            // Nothing listens here; commands that need the service fail fast.
            .env("FITCOACH_API_URL", "http://127.0.0.1:1")
            .env_remove("OPENAI_API_KEY")
            .env_remove("ELEVENLABS_API_KEY")
            .env_remove("REPLICATE_API_TOKEN")
            .env_remove("FITCOACH_SPEECH_COMMAND")
            .env("RUST_LOG", "warn")
            .envs(env.iter().copied())
            .output()
            .expect("failed to run fitcoach binary")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn show_without_plan() {
    let sandbox = Sandbox::new();
    let out = sandbox.run(&["plan", "show"], sandbox.data.path());
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("No plan yet"));
}

#[test]
fn show_lists_stored_plan() {
    let sandbox = Sandbox::with_plan("Ana");
    let out = sandbox.run(&["plan", "show"], sandbox.data.path());
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Personalized Fitness Plan for Ana"), "got: {text}");
    assert!(text.contains("Goblet Squat — 4 sets × 10 reps (90s rest)"), "got: {text}");
}

#[test]
fn clear_removes_plan_across_runs() {
    let sandbox = Sandbox::with_plan("Ana");
    let out = sandbox.run(&["plan", "clear"], sandbox.data.path());
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = sandbox.run(&["plan", "show"], sandbox.data.path());
    assert!(stdout(&out).contains("No plan yet"));
}

#[test]
fn generate_with_blank_field_never_contacts_service() {
    let sandbox = Sandbox::new();
    let out = sandbox.run(
        &["plan", "generate", "--name", " ", "--age", "29", "--goal", "fat loss"],
        sandbox.data.path(),
    );
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("missing required field: name"), "got: {err}");
    assert!(!err.contains("Something went wrong"), "got: {err}");
}

#[test]
fn failed_generation_keeps_previous_plan() {
    let sandbox = Sandbox::with_plan("Old");
    let out = sandbox.run(
        &["plan", "generate", "--name", "Ana", "--age", "29", "--goal", "fat loss"],
        sandbox.data.path(),
    );
    assert!(!out.status.success());

    let out = sandbox.run(&["plan", "show"], sandbox.data.path());
    assert!(stdout(&out).contains("Personalized Fitness Plan for Old"));
}

#[test]
fn export_writes_named_pdf() {
    let sandbox = Sandbox::with_plan("Ana");
    let out_dir = tempfile::TempDir::new().unwrap();
    let out = sandbox.run(
        &["export", "--dir", out_dir.path().to_str().unwrap()],
        sandbox.data.path(),
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let pdf = std::fs::read(out_dir.path().join("Ana_plan.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
}

#[test]
fn export_without_plan_fails() {
    let sandbox = Sandbox::new();
    let out = sandbox.run(&["export"], sandbox.data.path());
    assert!(!out.status.success());
    assert!(stderr(&out).contains("no plan available to export"));
}

#[test]
fn read_script_prints_narration() {
    let sandbox = Sandbox::with_plan("Ana");
    let out = sandbox.run(&["read", "--script"], sandbox.data.path());
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Pushups, 3 sets of 12 reps"));
}

#[test]
fn read_with_unavailable_speech_command_still_succeeds() {
    let sandbox = Sandbox::with_plan("Ana");
    let out = sandbox.run_with_env(
        &["read"],
        sandbox.data.path(),
        &[("FITCOACH_SPEECH_COMMAND", "fitcoach-no-such-tts-program")],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Could not start speech command"));
}

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let sandbox = Sandbox::new();
    let out = sandbox.run(
        &["init", "--openai-key", "sk-test-1234567890"],
        sandbox.data.path(),
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("sk-t...7890"));
    assert!(!stdout(&out).contains("sk-test-1234567890"));

    let written =
        std::fs::read_to_string(sandbox.config.path().join("fitcoach/config.toml")).unwrap();
    assert!(written.contains("openai_api_key = \"sk-test-1234567890\""));

    let out = sandbox.run(&["init"], sandbox.data.path());
    assert!(!out.status.success());
    assert!(stderr(&out).contains("already exists"));
}
