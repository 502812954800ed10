use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "decoy")]
#[command(about = "Decoy CLI - conversation intelligence and lifecycle engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON transcript through the engine
    Replay {
        /// Path to the transcript file
        transcript: PathBuf,

        /// Engine configuration (TOML); defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON advisory endpoint to consult
        #[arg(long, conflicts_with = "claude")]
        advisory_url: Option<String>,

        /// Use the Claude advisory agent (reads ANTHROPIC_API_KEY)
        #[arg(long)]
        claude: bool,

        /// Seed for the per-session completeness threshold
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the default engine configuration as TOML
    Defaults,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            transcript,
            config,
            advisory_url,
            claude,
            seed,
        } => {
            let options = commands::replay::ReplayOptions {
                transcript,
                config,
                advisory: match (advisory_url, claude) {
                    (Some(url), _) => commands::replay::AdvisoryChoice::Http(url),
                    (None, true) => commands::replay::AdvisoryChoice::Claude,
                    (None, false) => commands::replay::AdvisoryChoice::None,
                },
                seed,
            };
            commands::replay::run(options).await?
        }
        Commands::Defaults => commands::defaults::print()?,
    }

    Ok(())
}
