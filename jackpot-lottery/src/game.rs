use crate::{
    DrawEngine, GameConfig, GameSummary, LotteryError, LotteryResults, PlayerRegistry,
    PrizeDistribution, PrizeDistributionCalculator, RandomSource, Result, TicketBook, TicketId,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    Initialized,
    TicketsPurchased,
    DrawCompleted,
}

/// One round of the lottery: players, their tickets and the draw.
#[derive(Debug)]
pub struct GameSession {
    id: Uuid,
    config: GameConfig,
    state: GameState,
    players: PlayerRegistry,
    tickets: TicketBook,
    distribution: Option<PrizeDistribution>,
    results: Option<LotteryResults>,
    drawn_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            config,
            state: GameState::NotStarted,
            players: PlayerRegistry::new(),
            tickets: TicketBook::new(),
            distribution: None,
            results: None,
            drawn_at: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn tickets(&self) -> &TicketBook {
        &self.tickets
    }

    pub fn distribution(&self) -> Option<&PrizeDistribution> {
        self.distribution.as_ref()
    }

    pub fn results(&self) -> Option<&LotteryResults> {
        self.results.as_ref()
    }

    pub fn drawn_at(&self) -> Option<DateTime<Utc>> {
        self.drawn_at
    }

    /// Ticket sales so far
    pub fn total_revenue(&self) -> Decimal {
        self.config.ticket_price * Decimal::from(self.tickets.len())
    }

    /// Register the configured number of players
    pub fn initialize(&mut self) -> Result<()> {
        if self.state != GameState::NotStarted {
            return Err(LotteryError::invalid_state("Game already initialized"));
        }

        for n in 1..=self.config.player_count {
            self.players
                .register(format!("Player {}", n), self.config.starting_balance);
        }

        self.state = GameState::Initialized;
        tracing::info!(
            "Game {} initialized with {} players",
            self.id,
            self.players.len()
        );
        Ok(())
    }

    /// Buy `count` tickets for a player
    pub fn purchase_tickets(&mut self, player_id: Uuid, count: u32) -> Result<Vec<TicketId>> {
        if !matches!(
            self.state,
            GameState::Initialized | GameState::TicketsPurchased
        ) {
            return Err(LotteryError::invalid_state("Game not accepting purchases"));
        }

        if count == 0 {
            return Err(LotteryError::invalid_argument(
                "ticket count must be at least 1",
            ));
        }

        let limit = self.config.max_tickets_per_player;
        let cost = self.config.ticket_price * Decimal::from(count);
        let player = self.players.get_mut(player_id)?;

        if player.tickets_bought().saturating_add(count) > limit {
            return Err(LotteryError::TicketLimitExceeded {
                player: player_id,
                limit,
            });
        }

        player.pay_for_tickets(count, cost)?;
        let name = player.name().to_string();

        let ids: Vec<TicketId> = (0..count).map(|_| self.tickets.issue(player_id)).collect();
        self.state = GameState::TicketsPurchased;

        tracing::info!("{} bought {} tickets for {}", name, count, cost);
        Ok(ids)
    }

    /// Every player buys a random number of tickets they can afford
    pub fn auto_purchase<R: RandomSource>(&mut self, rng: &mut R) -> Result<usize> {
        let mut total = 0usize;

        for player_id in self.players.ids() {
            let affordable = self.affordable_tickets(player_id)?;
            if affordable == 0 {
                tracing::debug!("Player {} cannot afford a ticket", player_id);
                continue;
            }

            let count = rng.next_index(affordable as usize) as u32 + 1;
            self.purchase_tickets(player_id, count)?;
            total += count as usize;
        }

        tracing::info!("Auto purchase sold {} tickets", total);
        Ok(total)
    }

    /// Tickets the player may still buy, bounded by balance and the per-player limit
    pub fn affordable_tickets(&self, player_id: Uuid) -> Result<u32> {
        let player = self
            .players
            .get(player_id)
            .ok_or(LotteryError::PlayerNotFound(player_id))?;

        let remaining = self
            .config
            .max_tickets_per_player
            .saturating_sub(player.tickets_bought());
        let by_balance = player
            .balance()
            .checked_div(self.config.ticket_price)
            .and_then(|n| n.floor().to_u32())
            .unwrap_or(u32::MAX);

        Ok(remaining.min(by_balance))
    }

    /// Compute the distribution, draw the winners and pay them
    pub fn run_draw<R: RandomSource>(&mut self, rng: &mut R) -> Result<&LotteryResults> {
        if self.state != GameState::TicketsPurchased {
            return Err(LotteryError::invalid_state(format!(
                "Cannot draw from state {:?}",
                self.state
            )));
        }

        let calculator = PrizeDistributionCalculator::new(self.config.prizes.clone());
        let distribution = calculator.calculate(self.total_revenue(), self.tickets.len())?;

        let mut engine = DrawEngine::new(self.config.ticket_price, rng);
        let results = engine.conduct_draw(
            self.tickets.tickets_mut(),
            Some(&distribution),
            &mut self.players,
        )?;

        self.distribution = Some(distribution);
        self.drawn_at = Some(Utc::now());
        self.state = GameState::DrawCompleted;

        tracing::info!("Game {} draw completed", self.id);
        Ok(&*self.results.insert(results))
    }

    pub fn summary(&self) -> Result<GameSummary> {
        GameSummary::from_session(self)
    }
}
