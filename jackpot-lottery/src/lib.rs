//! Tiered single-round lottery
//!
//! Players buy tickets, the pooled revenue is split into Grand, Second and
//! Third tier prizes, and winners are drawn without replacement in that order.
//! Whatever is not paid out stays with the house.

pub mod config;
pub mod distribution;
pub mod draw;
pub mod error;
pub mod game;
pub mod player;
pub mod random;
pub mod summary;
pub mod ticket;

pub use config::{ConfigLoader, GameConfig, PrizeConfig};
pub use distribution::{calculate_distribution, PrizeDistribution, PrizeDistributionCalculator};
pub use draw::{DrawEngine, LotteryResults};
pub use error::{LotteryError, Result};
pub use game::{GameSession, GameState};
pub use player::{Player, PlayerRegistry, PrizeLedger};
pub use random::{RandomSource, RngSource, ScriptedRandom};
pub use summary::{GameSummary, PlayerStanding, WinnerLine};
pub use ticket::{PrizeTier, Ticket, TicketBook, TicketId};

/// Create and initialize a game with its players registered
pub fn create_game(config: GameConfig) -> Result<GameSession> {
    let mut game = GameSession::new(config)?;
    game.initialize()?;
    Ok(game)
}

/// Play a full round: every player buys tickets, then the draw runs
pub fn play_round<R: RandomSource>(config: GameConfig, rng: &mut R) -> Result<GameSession> {
    let mut game = create_game(config)?;
    let sold = game.auto_purchase(rng)?;
    if sold == 0 {
        return Err(LotteryError::invalid_argument(
            "no player could afford a ticket",
        ));
    }
    game.run_draw(rng)?;
    Ok(game)
}
