use crate::{LotteryError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketId(u64);

impl TicketId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Prize tiers, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrizeTier {
    Grand,
    Second,
    Third,
}

impl PrizeTier {
    pub const ALL: [PrizeTier; 3] = [PrizeTier::Grand, PrizeTier::Second, PrizeTier::Third];
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrizeTier::Grand => "Grand",
            PrizeTier::Second => "Second",
            PrizeTier::Third => "Third",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    owner: Uuid,
    tier: Option<PrizeTier>,
    win_amount: Decimal,
}

impl Ticket {
    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn is_winner(&self) -> bool {
        self.tier.is_some()
    }

    pub fn tier(&self) -> Option<PrizeTier> {
        self.tier
    }

    pub fn win_amount(&self) -> Decimal {
        self.win_amount
    }

    /// A ticket can only win once
    pub(crate) fn mark_winner(&mut self, tier: PrizeTier, amount: Decimal) -> Result<()> {
        if let Some(existing) = self.tier {
            return Err(LotteryError::internal(format!(
                "ticket {} already won a {} prize",
                self.id, existing
            )));
        }
        if amount < Decimal::ZERO {
            return Err(LotteryError::invalid_argument(format!(
                "negative win amount {} for ticket {}",
                amount, self.id
            )));
        }

        self.tier = Some(tier);
        self.win_amount = amount;
        Ok(())
    }
}

/// Ticket storage for one game. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Default)]
pub struct TicketBook {
    tickets: Vec<Ticket>,
    next_id: u64,
}

impl TicketBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh ticket for `owner`
    pub fn issue(&mut self, owner: Uuid) -> TicketId {
        self.next_id += 1;
        let id = TicketId(self.next_id);
        self.tickets.push(Ticket {
            id,
            owner,
            tier: None,
            win_amount: Decimal::ZERO,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: TicketId) -> Option<&Ticket> {
        // ids are dense and issued in order
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.tickets.get(index)
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn tickets_mut(&mut self) -> &mut [Ticket] {
        &mut self.tickets
    }

    #[cfg(test)]
    pub(crate) fn owned_by(&self, owner: Uuid) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(move |t| t.owner == owner)
    }
}
