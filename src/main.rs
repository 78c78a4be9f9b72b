use clap::{Parser, Subcommand};
use std::sync::Arc;

mod domain;
mod application;
mod infrastructure;

use application::errors::BotError;
use application::messaging::{HissBot, ScaleBot};
use application::services::MessageService;
use domain::traits::{Bot, Responder, Store};
use infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use infrastructure::config::{BotConfig, BotKind, TransportKind};
use infrastructure::storage::KvStore;

#[derive(Parser)]
#[command(name = "scale-bot")]
#[command(about = "A chat bot with hot-reloadable Lua commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path; repeat to run several bots
    #[arg(short, long = "config", default_value = "bot.cfg")]
    config: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bots
    Run,
    /// Show version
    Version,
    /// Print a template config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bots(cli.config),
        Commands::Version => {
            println!("scale-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            print!("{}", BotConfig::template());
            println!("\nSave this to bot.cfg and adjust as needed.");
        }
    }
}

fn run_bots(config_paths: Vec<String>) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    // Load every config up front so a bad one stops startup
    let mut services = Vec::new();
    for path in &config_paths {
        match build_service(path) {
            Ok(service) => services.push(service),
            Err(e) => {
                tracing::error!("Failed to load bot from {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }

    rt.block_on(async {
        let mut handles = Vec::new();
        for service in services {
            handles.push(tokio::spawn(service.run()));
        }
        tracing::info!("Running {} bot(s)", handles.len());

        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Bot stopped: {}", e),
                Err(e) => tracing::error!("Bot task failed: {}", e),
            }
        }
    });
}

fn build_service(config_path: &str) -> Result<Arc<MessageService>, BotError> {
    let store: Arc<dyn Store> = Arc::new(KvStore::open(config_path));
    let config = BotConfig::load(store.as_ref())?;
    tracing::info!("Loaded {:?}", config);

    let responder: Arc<dyn Responder> = match config.kind {
        BotKind::Scales => Arc::new(ScaleBot::from_config(&config, store)?),
        BotKind::Hiss => Arc::new(HissBot::new(config.name.clone(), config.indicator.clone())),
    };

    let bot: Arc<dyn Bot> = match config.transport {
        TransportKind::Telegram => Arc::new(TelegramAdapter::new(config.token.clone(), config.name.clone())),
        TransportKind::Console => Arc::new(ConsoleAdapter::new(config.name.clone())),
    };

    Ok(Arc::new(MessageService::new(bot, responder, config.pacing)))
}
