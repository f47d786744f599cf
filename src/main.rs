//! Migration Pathways Agent - main entry point

use clap::{Parser, Subcommand};
use migration_agent::config::AgentConfig;
use migration_agent::llm::provider::LlmProvider;
use migration_agent::llm::providers::GeminiProvider;
use migration_agent::observability::init_default_logging;
use migration_agent::pathways::LlmPathwayGenerator;
use migration_agent::protocol::{AgentCard, Dispatcher};
use migration_agent::server::{self, AppState};
use migration_agent::task::{TaskProcessor, TaskStore};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A2A agent recommending migration pathways
#[derive(Parser)]
#[command(name = "migration-agent")]
#[command(about = "A2A JSON-RPC agent that recommends migration pathways")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (sets LOG_LEVEL=DEBUG unless already set)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the agent over HTTP (default)
    Run,
    /// Validate configuration
    Config {
        /// Print the effective configuration as TOML
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    // Existing environment variables win over .env entries
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let cli = Cli::parse();
    if cli.verbose > 0 && std::env::var_os("LOG_LEVEL").is_none() {
        std::env::set_var("LOG_LEVEL", if cli.verbose > 1 { "TRACE" } else { "DEBUG" });
    }
    init_default_logging();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv_loaded, "Starting Migration Pathways Agent"
    );

    let config = match AgentConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_agent(config).await,
        Commands::Config { show } => handle_config_command(&config, show),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        process::exit(1);
    }

    info!("Application shutdown complete");
}

async fn run_agent(config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = config.api_key();
    if api_key.is_none() {
        warn!(
            api_key_env = %config.llm.api_key_env,
            "API key environment variable not set; requests will fail until it is provided. \
             Get a key at https://aistudio.google.com/app/apikey"
        );
    }

    let provider = Arc::new(GeminiProvider::new(config.gemini_config(api_key))?);
    let llm_configured = provider.is_configured();
    let generator = Arc::new(LlmPathwayGenerator::new(provider, config.llm.model.clone()));

    let processor = Arc::new(TaskProcessor::new(TaskStore::new(), generator));
    let dispatcher = Dispatcher::new(processor);
    let card = AgentCard::from_config(&config.agent);
    let state = Arc::new(AppState::new(dispatcher, card, llm_configured));

    let addr = config.bind_address()?;
    info!(
        agent = %config.agent.name,
        model = %config.llm.model,
        "Using Gemini for migration pathway generation"
    );

    server::serve(state, addr, server::shutdown_signal()).await?;
    Ok(())
}

fn handle_config_command(config: &AgentConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("{}", config.to_toml()?);
    }

    info!("Configuration validation complete");
    Ok(())
}
