//! Tiered prize distribution
//!
//! Turns total revenue and ticket count into absolute tier amounts and winner
//! counts. Amounts are plain proportional shares of the revenue; per-winner
//! amounts use the decimal type's own division and no remainder is moved
//! between winners.

use crate::{LotteryError, PrizeConfig, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeDistribution {
    pub grand_prize_amount: Decimal,
    pub second_tier_total_amount: Decimal,
    pub second_tier_prize_per_winner: Decimal,
    pub third_tier_total_amount: Decimal,
    pub third_tier_prize_per_winner: Decimal,
    pub second_tier_winner_count: usize,
    pub third_tier_winner_count: usize,
    /// Derived from percentages only. The draw's realized profit is authoritative.
    pub expected_house_profit: Decimal,
}

impl PrizeDistribution {
    /// Sum of the three configured prize pools
    pub fn total_prize_pool(&self) -> Decimal {
        self.grand_prize_amount + self.second_tier_total_amount + self.third_tier_total_amount
    }

    /// Most winners a draw can produce with this distribution
    pub fn max_winners(&self) -> usize {
        1 + self.second_tier_winner_count + self.third_tier_winner_count
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrizeDistributionCalculator {
    config: PrizeConfig,
}

impl PrizeDistributionCalculator {
    pub fn new(config: PrizeConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        total_revenue: Decimal,
        total_ticket_count: usize,
    ) -> Result<PrizeDistribution> {
        calculate_distribution(total_revenue, total_ticket_count, &self.config)
    }
}

/// Compute the prize distribution for one game.
///
/// The configuration is trusted; only the revenue and ticket count are checked.
pub fn calculate_distribution(
    total_revenue: Decimal,
    total_ticket_count: usize,
    config: &PrizeConfig,
) -> Result<PrizeDistribution> {
    if total_revenue <= Decimal::ZERO {
        return Err(LotteryError::invalid_argument(format!(
            "total revenue must be positive, got {}",
            total_revenue
        )));
    }
    if total_ticket_count == 0 {
        return Err(LotteryError::invalid_argument(
            "total ticket count must be positive",
        ));
    }

    let grand_prize_amount = total_revenue * config.grand_prize_percentage;
    let second_tier_total_amount = total_revenue * config.second_tier_percentage;
    let third_tier_total_amount = total_revenue * config.third_tier_percentage;

    let second_tier_winner_count =
        winner_count(total_ticket_count, config.second_tier_winner_percentage)?;
    let third_tier_winner_count =
        winner_count(total_ticket_count, config.third_tier_winner_percentage)?;

    let second_tier_prize_per_winner =
        second_tier_total_amount / Decimal::from(second_tier_winner_count);
    let third_tier_prize_per_winner =
        third_tier_total_amount / Decimal::from(third_tier_winner_count);

    let expected_house_profit = total_revenue
        - (grand_prize_amount + second_tier_total_amount + third_tier_total_amount);

    Ok(PrizeDistribution {
        grand_prize_amount,
        second_tier_total_amount,
        second_tier_prize_per_winner,
        third_tier_total_amount,
        third_tier_prize_per_winner,
        second_tier_winner_count,
        third_tier_winner_count,
        expected_house_profit,
    })
}

/// `max(1, round_half_even(tickets * fraction))`
fn winner_count(total_ticket_count: usize, fraction: Decimal) -> Result<usize> {
    let raw = Decimal::from(total_ticket_count) * fraction;
    let rounded = raw.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let count = rounded.to_usize().ok_or_else(|| {
        LotteryError::invalid_argument(format!("winner count out of range: {}", rounded))
    })?;
    Ok(count.max(1))
}
