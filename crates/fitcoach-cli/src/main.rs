mod api_client;
mod config;
mod export_cmd;
mod image_cmd;
mod plan_cmds;
mod read_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::{CliOverrides, FitcoachConfig};

#[derive(Parser)]
#[command(name = "fitcoach", about = "AI fitness coach: personalized workout and meal plans")]
struct Cli {
    /// Base URL of the fitcoach service (overrides FITCOACH_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the active plan (overrides FITCOACH_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fitcoach config file
    Init {
        /// OpenAI API key (plan generation, coaching)
        #[arg(long)]
        openai_key: Option<String>,
        /// ElevenLabs API key (speech synthesis)
        #[arg(long)]
        elevenlabs_key: Option<String>,
        /// Replicate API token (video pose analysis)
        #[arg(long)]
        replicate_token: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP service
    Serve {
        /// Address to bind (overrides FITCOACH_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides FITCOACH_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Read the active plan aloud
    Read {
        /// Save service-synthesized MP3 audio to this file instead of speaking
        #[arg(long)]
        audio: Option<PathBuf>,
        /// Print the narration text only
        #[arg(long, conflicts_with = "audio")]
        script: bool,
    },
    /// Export the active plan as a PDF
    Export {
        /// Output directory (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Open an illustration for a workout or meal of the active plan
    Image {
        /// Workout number, as listed by `fitcoach plan show`
        #[arg(long, conflicts_with = "meal", required_unless_present = "meal")]
        workout: Option<usize>,
        /// Meal number, as listed by `fitcoach plan show`
        #[arg(long)]
        meal: Option<usize>,
    },
    /// Ask the service which provider keys it has
    EnvCheck,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate a new plan and make it the active one
    Generate {
        #[arg(long)]
        name: String,
        /// Age in years
        #[arg(long)]
        age: String,
        /// muscle gain, fat loss, or general fitness
        #[arg(long)]
        goal: String,
        /// Height in cm
        #[arg(long)]
        height: Option<String>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<String>,
        /// male or female
        #[arg(long)]
        gender: Option<String>,
    },
    /// Show the active plan
    Show,
    /// Forget the active plan
    Clear,
}

/// Show the first and last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Execute the `fitcoach init` command: write config file.
fn cmd_init(
    openai_key: Option<String>,
    elevenlabs_key: Option<String>,
    replicate_token: Option<String>,
    api_url: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        providers: config::ProvidersSection {
            openai_api_key: openai_key,
            elevenlabs_api_key: elevenlabs_key,
            replicate_api_token: replicate_token,
        },
        server: config::ServerSection::default(),
        client: config::ClientSection {
            api_url,
            ..config::ClientSection::default()
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    for (label, value) in [
        ("providers.openai_api_key", &cfg.providers.openai_api_key),
        ("providers.elevenlabs_api_key", &cfg.providers.elevenlabs_api_key),
        ("providers.replicate_api_token", &cfg.providers.replicate_api_token),
    ] {
        match value {
            Some(v) => println!("  {label} = {}", mask(v)),
            None => println!("  {label} (not set)"),
        }
    }
    println!();
    println!("Next: run `fitcoach serve`, then `fitcoach plan generate`.");

    Ok(())
}

/// Execute the `fitcoach env-check` command.
async fn cmd_env_check(config: &FitcoachConfig) -> anyhow::Result<()> {
    let client = api_client::ApiClient::new(&config.api_url)?;
    let status = client.env_status().await?;
    println!("{} ({})", status.message, client.base_url());
    for (label, present) in [("openai", status.openai), ("elevenlabs", status.elevenlabs)] {
        if let Some(present) = present {
            println!("  {label}: {}", if present { "found" } else { "missing" });
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut overrides = CliOverrides {
        api_url: cli.api_url,
        data_dir: cli.data_dir,
        ..CliOverrides::default()
    };

    match cli.command {
        Commands::Init {
            openai_key,
            elevenlabs_key,
            replicate_token,
            force,
        } => {
            cmd_init(
                openai_key,
                elevenlabs_key,
                replicate_token,
                overrides.api_url,
                force,
            )?;
        }
        Commands::Serve { bind, port } => {
            overrides.bind = bind;
            overrides.port = port;
            let resolved = FitcoachConfig::resolve(&overrides)?;
            let state = serve_cmd::AppState::from_keys(&resolved.keys)?;
            serve_cmd::run_serve(state, &resolved.bind, resolved.port).await?;
        }
        Commands::Plan { command } => {
            let resolved = FitcoachConfig::resolve(&overrides)?;
            plan_cmds::run_plan_command(command, &resolved).await?;
        }
        Commands::Read { audio, script } => {
            let resolved = FitcoachConfig::resolve(&overrides)?;
            read_cmd::run_read(&resolved, audio.as_deref(), script).await?;
        }
        Commands::Export { dir } => {
            let resolved = FitcoachConfig::resolve(&overrides)?;
            export_cmd::run_export(&resolved, dir.as_deref())?;
        }
        Commands::Image { workout, meal } => {
            let resolved = FitcoachConfig::resolve(&overrides)?;
            let target = match (workout, meal) {
                (Some(n), _) => image_cmd::ImageTarget::Workout(n),
                (None, Some(n)) => image_cmd::ImageTarget::Meal(n),
                (None, None) => anyhow::bail!("pass --workout <N> or --meal <N>"),
            };
            image_cmd::run_image(&resolved, target).await?;
        }
        Commands::EnvCheck => {
            let resolved = FitcoachConfig::resolve(&overrides)?;
            cmd_env_check(&resolved).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn mask_hides_middle_of_secret() {
        assert_eq!(mask("sk-abcdefghijkl"), "sk-a...ijkl");
        assert_eq!(mask("short"), "*****");
    }

    #[test]
    fn image_requires_a_target() {
        assert!(Cli::try_parse_from(["fitcoach", "image"]).is_err());
        assert!(Cli::try_parse_from(["fitcoach", "image", "--workout", "1", "--meal", "2"]).is_err());
        assert!(Cli::try_parse_from(["fitcoach", "image", "--meal", "2"]).is_ok());
    }

    #[test]
    fn plan_generate_requires_form_fields() {
        assert!(Cli::try_parse_from(["fitcoach", "plan", "generate", "--name", "Ana"]).is_err());
        assert!(
            Cli::try_parse_from([
                "fitcoach", "plan", "generate", "--name", "Ana", "--age", "29", "--goal",
                "fat loss"
            ])
            .is_ok()
        );
    }
}
