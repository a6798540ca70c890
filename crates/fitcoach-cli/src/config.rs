//! Configuration file management for fitcoach.
//!
//! Provides a TOML-based config file at `~/.config/fitcoach/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use fitcoach_core::store::FileStorage;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub providers: ProvidersSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub client: ClientSection,
}

/// Provider credentials. Absent keys disable the matching routes (401).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProvidersSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevenlabs_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicate_api_token: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClientSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Local TTS command line, e.g. `"espeak -s 150"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the fitcoach config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/fitcoach` or `~/.config/fitcoach`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("fitcoach");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fitcoach")
}

/// Return the path to the fitcoach config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it may hold API keys.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Provider credentials handed to the server at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
    pub replicate: Option<String>,
}

/// Values given on the command line; each one wins over everything else.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct FitcoachConfig {
    pub keys: ProviderKeys,
    pub api_url: String,
    pub bind: String,
    pub port: u16,
    pub speech_command: Option<String>,
    pub data_dir: PathBuf,
}

/// Non-blank env var value.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

impl FitcoachConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Provider keys: `OPENAI_API_KEY` / `ELEVENLABS_API_KEY` /
    ///   `REPLICATE_API_TOKEN` env > `[providers]` > absent
    /// - API URL: `--api-url` > `FITCOACH_API_URL` > `client.api_url` > `http://127.0.0.1:3000`
    /// - Bind/port: `--bind`/`--port` > `FITCOACH_BIND`/`FITCOACH_PORT` > `[server]` > `127.0.0.1:3000`
    /// - Speech command: `FITCOACH_SPEECH_COMMAND` > `client.speech_command` > platform default
    /// - Data dir: `--data-dir` > `FITCOACH_DATA_DIR` > `client.data_dir` > platform data dir
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file = load_config().unwrap_or_default();

        let keys = ProviderKeys {
            openai: env_value("OPENAI_API_KEY").or_else(|| non_blank(&file.providers.openai_api_key)),
            elevenlabs: env_value("ELEVENLABS_API_KEY")
                .or_else(|| non_blank(&file.providers.elevenlabs_api_key)),
            replicate: env_value("REPLICATE_API_TOKEN")
                .or_else(|| non_blank(&file.providers.replicate_api_token)),
        };

        let api_url = cli
            .api_url
            .clone()
            .or_else(|| env_value("FITCOACH_API_URL"))
            .or_else(|| non_blank(&file.client.api_url))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let bind = cli
            .bind
            .clone()
            .or_else(|| env_value("FITCOACH_BIND"))
            .or_else(|| non_blank(&file.server.bind))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = if let Some(port) = cli.port {
            port
        } else if let Some(raw) = env_value("FITCOACH_PORT") {
            match raw.trim().parse() {
                Ok(port) => port,
                Err(_) => bail!("FITCOACH_PORT is not a valid port number: {raw}"),
            }
        } else {
            file.server.port.unwrap_or(DEFAULT_PORT)
        };

        let speech_command =
            env_value("FITCOACH_SPEECH_COMMAND").or_else(|| non_blank(&file.client.speech_command));

        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| env_value("FITCOACH_DATA_DIR").map(PathBuf::from))
            .or(file.client.data_dir)
            .unwrap_or_else(FileStorage::default_dir);

        Ok(Self {
            keys,
            api_url,
            bind,
            port,
            speech_command,
            data_dir,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
