mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jackpot")]
#[command(about = "Tiered single-round lottery simulator")]
#[command(version)]
struct Cli {
    /// Game configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one full round: ticket sales, draw and results
    Play {
        /// Number of players, overrides the configuration
        #[arg(short, long)]
        players: Option<u32>,
        /// Seed for a reproducible game
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the prize distribution for a given revenue and ticket count
    Distribution {
        /// Total revenue
        #[arg(short, long)]
        revenue: String,
        /// Number of tickets sold
        #[arg(short, long)]
        tickets: usize,
    },
    /// Configuration commands
    #[command(subcommand)]
    Config(commands::ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging, stdout is reserved for results
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "jackpot={},jackpot_lottery={}",
            log_level, log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Play {
            players,
            seed,
            json,
        } => commands::play(config_path, players, seed, json),
        Commands::Distribution { revenue, tickets } => {
            commands::show_distribution(config_path, &revenue, tickets)
        }
        Commands::Config(cmd) => commands::handle_config_command(cmd, config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
