//! Game and prize configuration
//!
//! Values come from defaults, an optional TOML file and `JACKPOT_*`
//! environment overrides, in that order, and are validated last.

use crate::{LotteryError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Allowed drift when checking that tier percentages add up to one.
pub const PERCENTAGE_SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Revenue split and winner-count policy for the three prize tiers.
///
/// All values are fractions of one, so `0.50` means half of the revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeConfig {
    pub grand_prize_percentage: Decimal,
    pub second_tier_percentage: Decimal,
    pub third_tier_percentage: Decimal,
    pub house_percentage: Decimal,
    /// Share of sold tickets that win a second-tier prize
    pub second_tier_winner_percentage: Decimal,
    /// Share of sold tickets that win a third-tier prize
    pub third_tier_winner_percentage: Decimal,
}

impl Default for PrizeConfig {
    fn default() -> Self {
        Self {
            grand_prize_percentage: Decimal::new(50, 2),
            second_tier_percentage: Decimal::new(30, 2),
            third_tier_percentage: Decimal::new(10, 2),
            house_percentage: Decimal::new(10, 2),
            second_tier_winner_percentage: Decimal::new(10, 2),
            third_tier_winner_percentage: Decimal::new(20, 2),
        }
    }
}

impl PrizeConfig {
    pub fn validate(&self) -> Result<()> {
        let tiers = [
            ("grand_prize_percentage", self.grand_prize_percentage),
            ("second_tier_percentage", self.second_tier_percentage),
            ("third_tier_percentage", self.third_tier_percentage),
            ("house_percentage", self.house_percentage),
        ];

        for (field, value) in tiers {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(LotteryError::invalid_config(format!(
                    "{} must be between 0 and 1, got {}",
                    field, value
                )));
            }
        }

        let sum: Decimal = tiers.iter().map(|(_, value)| *value).sum();
        if (sum - Decimal::ONE).abs() > PERCENTAGE_SUM_TOLERANCE {
            return Err(LotteryError::invalid_config(format!(
                "tier percentages must sum to 1, got {}",
                sum
            )));
        }

        let fractions = [
            (
                "second_tier_winner_percentage",
                self.second_tier_winner_percentage,
            ),
            (
                "third_tier_winner_percentage",
                self.third_tier_winner_percentage,
            ),
        ];

        for (field, value) in fractions {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(LotteryError::invalid_config(format!(
                    "{} must be in (0, 1], got {}",
                    field, value
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub ticket_price: Decimal,
    pub player_count: u32,
    pub starting_balance: Decimal,
    pub max_tickets_per_player: u32,
    pub prizes: PrizeConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticket_price: Decimal::ONE,
            player_count: 10,
            starting_balance: Decimal::TEN,
            max_tickets_per_player: 10,
            prizes: PrizeConfig::default(),
        }
    }
}

impl GameConfig {
    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<()> {
        if self.ticket_price <= Decimal::ZERO {
            return Err(LotteryError::invalid_config(format!(
                "ticket_price must be > 0, got {}",
                self.ticket_price
            )));
        }

        if self.player_count == 0 {
            return Err(LotteryError::invalid_config("player_count must be > 0"));
        }

        if self.starting_balance < Decimal::ZERO {
            return Err(LotteryError::invalid_config(format!(
                "starting_balance must not be negative, got {}",
                self.starting_balance
            )));
        }

        if self.max_tickets_per_player == 0 {
            return Err(LotteryError::invalid_config(
                "max_tickets_per_player must be > 0",
            ));
        }

        self.prizes.validate()
    }
}

/// Loads a [`GameConfig`] from file and environment
#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> Result<GameConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigLoader::load`] but reads overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<GameConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config_path {
            Some(path) => Self::load_from_file(path)?,
            None => GameConfig::default(),
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;

        tracing::debug!("Loaded game configuration: {:?}", config);
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<GameConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LotteryError::ConfigLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| LotteryError::ConfigLoad(format!("Failed to parse TOML: {}", e)))
    }

    /// Save configuration to file
    pub fn save(config: &GameConfig, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| LotteryError::internal(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            LotteryError::ConfigLoad(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

fn apply_overrides<F>(config: &mut GameConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("JACKPOT_TICKET_PRICE") {
        config.ticket_price = parse_override("JACKPOT_TICKET_PRICE", &value)?;
    }
    if let Some(value) = lookup("JACKPOT_PLAYER_COUNT") {
        config.player_count = parse_override("JACKPOT_PLAYER_COUNT", &value)?;
    }
    if let Some(value) = lookup("JACKPOT_STARTING_BALANCE") {
        config.starting_balance = parse_override("JACKPOT_STARTING_BALANCE", &value)?;
    }
    if let Some(value) = lookup("JACKPOT_MAX_TICKETS_PER_PLAYER") {
        config.max_tickets_per_player = parse_override("JACKPOT_MAX_TICKETS_PER_PLAYER", &value)?;
    }
    Ok(())
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LotteryError::invalid_config(format!("{}: cannot parse '{}'", key, value)))
}
