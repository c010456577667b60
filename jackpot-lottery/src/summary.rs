use crate::{GameSession, LotteryError, PrizeDistribution, PrizeTier, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One winning ticket as shown to players
#[derive(Debug, Clone, Serialize)]
pub struct WinnerLine {
    pub tier: PrizeTier,
    pub ticket_id: u64,
    pub player_id: Uuid,
    pub player_name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStanding {
    pub player_id: Uuid,
    pub name: String,
    pub tickets: u32,
    pub spent: Decimal,
    pub won: Decimal,
    pub net: Decimal,
    pub balance: Decimal,
}

/// Final report of a completed game
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: Uuid,
    pub drawn_at: DateTime<Utc>,
    pub ticket_count: usize,
    pub total_revenue: Decimal,
    pub distribution: PrizeDistribution,
    pub winners: Vec<WinnerLine>,
    /// Sum over winning tickets. Adding up `standings[].won` instead can differ
    /// in the 28th significant digit, since per-winner amounts are full-precision quotients.
    pub total_paid: Decimal,
    pub house_profit: Decimal,
    pub expected_house_profit: Decimal,
    /// Realized minus expected profit; positive when a tier fell short of winners
    pub profit_variance: Decimal,
    pub standings: Vec<PlayerStanding>,
}

impl GameSummary {
    pub fn from_session(game: &GameSession) -> Result<Self> {
        let (Some(results), Some(distribution), Some(drawn_at)) =
            (game.results(), game.distribution(), game.drawn_at())
        else {
            return Err(LotteryError::invalid_state("Draw has not been completed"));
        };

        let players = game.players();
        let mut winners = Vec::with_capacity(results.winner_count());
        for tier in PrizeTier::ALL {
            for ticket in results.winners(tier) {
                let player = players
                    .get(ticket.owner())
                    .ok_or(LotteryError::PlayerNotFound(ticket.owner()))?;
                winners.push(WinnerLine {
                    tier,
                    ticket_id: ticket.id().value(),
                    player_id: player.id(),
                    player_name: player.name().to_string(),
                    amount: ticket.win_amount(),
                });
            }
        }

        let standings = players
            .iter()
            .map(|p| PlayerStanding {
                player_id: p.id(),
                name: p.name().to_string(),
                tickets: p.tickets_bought(),
                spent: p.total_spent(),
                won: p.total_winnings(),
                net: p.net(),
                balance: p.balance(),
            })
            .collect();

        Ok(Self {
            game_id: game.id(),
            drawn_at,
            ticket_count: game.tickets().len(),
            total_revenue: results.total_revenue,
            distribution: distribution.clone(),
            winners,
            total_paid: results.total_paid(),
            house_profit: results.house_profit,
            expected_house_profit: distribution.expected_house_profit,
            profit_variance: results.house_profit - distribution.expected_house_profit,
            standings,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
