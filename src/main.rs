//! Binary entrypoint for the Void Artifact Trader.
//!
//! Commands:
//! - `play` (default) - start or continue a game
//! - `init [--force]` - write a starter `config.toml`, the prompt library, and data directories
//! - `status` - summarize the saved game without contacting the generator
//! - `market` - print the saved market report
//!
//! See the library crate docs for module-level details: `voidtrader::`.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use voidtrader::config::Config;
use voidtrader::economy::ArtifactMarket;
use voidtrader::game::{play, Console, SavedGame};
use voidtrader::storage::GameStorage;
use voidtrader::void::PromptLibrary;

#[derive(Parser)]
#[command(name = "voidtrader")]
#[command(about = "The Void Artifact Trader - Collect, Trade, Discover")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game or continue the saved one
    Play {
        /// Override the generator provider ("openai" or "anthropic")
        #[arg(long)]
        provider: Option<String>,

        /// Override the API key (otherwise config, then environment)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Write a default configuration and prompt library
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Summarize the saved game
    Status,
    /// Show saved market conditions
    Market,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Play {
        provider: None,
        api_key: None,
    });

    if let Commands::Init { force } = command {
        init_logging(&None, cli.verbose);
        return init(&cli.config, force).await;
    }

    let config = Config::load_or_default(&cli.config).await?;
    init_logging(&Some(config.clone()), cli.verbose);
    let storage = GameStorage::new(&config.storage);

    match command {
        Commands::Play { provider, api_key } => {
            let mut config = config;
            if let Some(provider) = provider {
                config.generator.provider = provider;
            }
            if let Some(api_key) = api_key {
                config.generator.api_key = api_key;
            }
            info!("Starting Voidtrader v{}", env!("CARGO_PKG_VERSION"));
            println!("=== THE VOID ARTIFACT TRADER ===\n");
            println!("Initializing game components...");
            run_game(&config, storage).await?;
        }
        Commands::Status => {
            match SavedGame::load(&storage, config.game.starting_credits)? {
                Some(saved) => {
                    println!("Saved game in {}\n", storage.save_dir().display());
                    println!("{}", saved.summary());
                }
                None => println!("No saved game found in {}", storage.save_dir().display()),
            }
        }
        Commands::Market => {
            let mut market = ArtifactMarket::new(storage.clone());
            if market.load()? {
                println!("{}", market.report());
            } else {
                println!("No saved market found in {}", storage.save_dir().display());
            }
        }
        Commands::Init { .. } => {}
    }

    Ok(())
}

#[cfg(feature = "llm")]
async fn run_game(config: &Config, storage: GameStorage) -> Result<()> {
    let source = voidtrader::void::DeepVoid::from_config(config)
        .context("the Deep Void could not be reached")?;
    let mut console = Console::new(std::io::stdin().lock(), std::io::stdout());
    play(&config.game, storage, source, &mut console).await?;
    Ok(())
}

#[cfg(not(feature = "llm"))]
async fn run_game(_config: &Config, _storage: GameStorage) -> Result<()> {
    anyhow::bail!("this build has no artifact generator; rebuild with `--features llm`")
}

async fn init(config_path: &str, force: bool) -> Result<()> {
    info!("Initializing new Voidtrader configuration");
    let exists = tokio::fs::try_exists(config_path).await.unwrap_or(false);
    if exists && !force {
        warn!("{} already exists; keeping it (use --force to overwrite)", config_path);
    } else {
        Config::create_default(config_path).await?;
        info!("Configuration file created at {}", config_path);
    }

    let config = Config::load(config_path).await?;
    for dir in [
        &config.storage.save_dir,
        &config.storage.output_dir,
        &config.storage.config_dir,
    ] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir))?;
    }
    PromptLibrary::load_or_create(std::path::Path::new(&config.storage.config_dir))?;
    info!(
        "Prompt library ready in {}; saves go to {}",
        config.storage.config_dir, config.storage.save_dir
    );
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // The game owns the terminal; echo log lines there only when asked to with -v
        let echo = verbosity > 0 && atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if echo {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
