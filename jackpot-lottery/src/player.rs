use crate::{LotteryError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Receives prize payouts from the draw
pub trait PrizeLedger {
    fn has_account(&self, owner: Uuid) -> bool;

    fn credit(&mut self, owner: Uuid, amount: Decimal) -> Result<()>;
}

/// player in the lottery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    id: Uuid,
    name: String,
    balance: Decimal,
    tickets_bought: u32,
    total_spent: Decimal,
    total_winnings: Decimal,
}

impl Player {
    pub fn new(name: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            balance,
            tickets_bought: 0,
            total_spent: Decimal::ZERO,
            total_winnings: Decimal::ZERO,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn tickets_bought(&self) -> u32 {
        self.tickets_bought
    }

    pub fn total_spent(&self) -> Decimal {
        self.total_spent
    }

    pub fn total_winnings(&self) -> Decimal {
        self.total_winnings
    }

    /// Winnings minus spend
    pub fn net(&self) -> Decimal {
        self.total_winnings - self.total_spent
    }

    pub fn can_afford(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Charge the player for `count` tickets costing `cost` in total
    pub(crate) fn pay_for_tickets(&mut self, count: u32, cost: Decimal) -> Result<()> {
        if !self.can_afford(cost) {
            return Err(LotteryError::InsufficientBalance {
                need: cost,
                available: self.balance,
            });
        }

        self.balance -= cost;
        self.total_spent += cost;
        self.tickets_bought += count;
        Ok(())
    }

    pub(crate) fn add_winnings(&mut self, amount: Decimal) {
        self.balance += amount;
        self.total_winnings += amount;
    }
}

/// Players of one game, kept in registration order
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, balance: Decimal) -> Uuid {
        let player = Player::new(name, balance);
        let id = player.id();
        tracing::debug!("Registered player {} ({})", player.name(), id);
        self.players.push(player);
        id
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LotteryError::PlayerNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.players.iter().map(Player::id).collect()
    }
}

impl PrizeLedger for PlayerRegistry {
    fn has_account(&self, owner: Uuid) -> bool {
        self.get(owner).is_some()
    }

    fn credit(&mut self, owner: Uuid, amount: Decimal) -> Result<()> {
        let player = self.get_mut(owner)?;
        player.add_winnings(amount);
        tracing::debug!("Credited {} to {}", amount, player.name());
        Ok(())
    }
}
