mod interactive;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voxsh_config::AppConfig;
use voxsh_runtime::{Outcome, Pipeline};

#[derive(Debug, Parser)]
#[command(
    name = "voxsh",
    version,
    about = "Natural-language shell with safety-gated execution"
)]
struct Cli {
    /// Path to the config file.
    #[arg(long, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive session: type utterances, get spoken-style feedback.
    Run,
    /// Resolve, check and execute a single utterance, then exit.
    Once {
        /// The utterance, e.g. "建立一個叫做 test 的資料夾".
        utterance: String,
    },
    /// List the catalogued intent templates.
    Templates,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level)),
        )
        .init();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => interactive::run_session(&config).await,
        Commands::Once { utterance } => run_once(&config, &utterance).await,
        Commands::Templates => {
            let pipeline = Pipeline::from_config(&config);
            for (key, description) in pipeline.matcher().supported_templates() {
                println!("{:<20} {}", key.as_str(), description);
            }
            Ok(())
        }
    }
}

async fn run_once(config: &AppConfig, utterance: &str) -> Result<()> {
    let mut pipeline = Pipeline::from_config(config);
    let outcome = pipeline.handle(utterance).await;

    match &outcome {
        Outcome::Done { result, .. } | Outcome::Failed { result, .. } => {
            if !result.stdout.is_empty() {
                println!("{}", result.stdout);
            }
        }
        _ => {}
    }
    eprintln!("{}", outcome.message());

    if matches!(outcome, Outcome::Done { .. }) {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
