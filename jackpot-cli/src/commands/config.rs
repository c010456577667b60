use super::load_config;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use jackpot_lottery::{ConfigLoader, GameConfig};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Write the default configuration to a file
    Init {
        /// Destination path
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn handle_config_command(cmd: ConfigCommands, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            let content =
                toml::to_string_pretty(&config).context("failed to serialize configuration")?;
            println!("{}", content);
        }

        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists, use --force to overwrite", path.display());
            }

            ConfigLoader::save(&GameConfig::default(), &path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}
