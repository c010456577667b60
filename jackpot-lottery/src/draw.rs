use crate::{
    LotteryError, PrizeDistribution, PrizeLedger, PrizeTier, RandomSource, Result, Ticket,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryResults {
    pub grand_winners: Vec<Ticket>,
    pub second_tier_winners: Vec<Ticket>,
    pub third_tier_winners: Vec<Ticket>,
    pub total_revenue: Decimal,
    /// Revenue minus what was actually paid out
    pub house_profit: Decimal,
}

impl LotteryResults {
    pub fn winners(&self, tier: PrizeTier) -> &[Ticket] {
        match tier {
            PrizeTier::Grand => &self.grand_winners,
            PrizeTier::Second => &self.second_tier_winners,
            PrizeTier::Third => &self.third_tier_winners,
        }
    }

    pub fn all_winners(&self) -> impl Iterator<Item = &Ticket> {
        self.grand_winners
            .iter()
            .chain(&self.second_tier_winners)
            .chain(&self.third_tier_winners)
    }

    pub fn winner_count(&self) -> usize {
        self.grand_winners.len() + self.second_tier_winners.len() + self.third_tier_winners.len()
    }

    pub fn total_paid(&self) -> Decimal {
        self.all_winners().map(Ticket::win_amount).sum()
    }
}

/// Draws Grand, Second and Third tier winners without replacement.
///
/// Holds no state between draws apart from the random source.
#[derive(Debug)]
pub struct DrawEngine<R> {
    ticket_price: Decimal,
    rng: R,
}

impl<R: RandomSource> DrawEngine<R> {
    pub fn new(ticket_price: Decimal, rng: R) -> Self {
        Self { ticket_price, rng }
    }

    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Select winners from `tickets`, mark them and credit their owners.
    ///
    /// Inputs are checked before anything is mutated. A tier that asks for
    /// more winners than there are tickets left is paid to whoever remains.
    pub fn conduct_draw<L: PrizeLedger + ?Sized>(
        &mut self,
        tickets: &mut [Ticket],
        distribution: Option<&PrizeDistribution>,
        ledger: &mut L,
    ) -> Result<LotteryResults> {
        if tickets.is_empty() {
            return Err(LotteryError::invalid_argument("ticket pool is empty"));
        }
        let distribution = distribution
            .ok_or_else(|| LotteryError::invalid_argument("prize distribution is missing"))?;
        if let Some(ticket) = tickets.iter().find(|t| t.is_winner()) {
            return Err(LotteryError::invalid_argument(format!(
                "ticket {} has already been drawn",
                ticket.id()
            )));
        }
        if let Some(ticket) = tickets.iter().find(|t| !ledger.has_account(t.owner())) {
            return Err(LotteryError::invalid_argument(format!(
                "ticket {} belongs to unknown player {}",
                ticket.id(),
                ticket.owner()
            )));
        }

        let total_revenue = self.ticket_price * Decimal::from(tickets.len());
        let mut available: Vec<usize> = (0..tickets.len()).collect();

        tracing::info!(
            "Drawing from {} tickets (revenue {})",
            tickets.len(),
            total_revenue
        );

        let grand_winners = self.draw_tier(
            PrizeTier::Grand,
            1,
            distribution.grand_prize_amount,
            tickets,
            &mut available,
            ledger,
        )?;
        let second_tier_winners = self.draw_tier(
            PrizeTier::Second,
            distribution.second_tier_winner_count,
            distribution.second_tier_prize_per_winner,
            tickets,
            &mut available,
            ledger,
        )?;
        let third_tier_winners = self.draw_tier(
            PrizeTier::Third,
            distribution.third_tier_winner_count,
            distribution.third_tier_prize_per_winner,
            tickets,
            &mut available,
            ledger,
        )?;

        let mut results = LotteryResults {
            grand_winners,
            second_tier_winners,
            third_tier_winners,
            total_revenue,
            house_profit: Decimal::ZERO,
        };
        results.house_profit = total_revenue - results.total_paid();

        tracing::info!(
            "Draw complete: {} winners, paid {}, house profit {} (expected {})",
            results.winner_count(),
            results.total_paid(),
            results.house_profit,
            distribution.expected_house_profit
        );

        Ok(results)
    }

    /// Draw up to `count` tickets from `available`, shrinking it as it goes.
    fn draw_tier<L: PrizeLedger + ?Sized>(
        &mut self,
        tier: PrizeTier,
        count: usize,
        amount: Decimal,
        tickets: &mut [Ticket],
        available: &mut Vec<usize>,
        ledger: &mut L,
    ) -> Result<Vec<Ticket>> {
        let to_draw = count.min(available.len());
        if to_draw < count {
            tracing::warn!(
                "{} tier wants {} winners but only {} tickets remain",
                tier,
                count,
                available.len()
            );
        }

        let mut winners = Vec::with_capacity(to_draw);
        for _ in 0..to_draw {
            let pick = self.rng.next_index(available.len());
            if pick >= available.len() {
                return Err(LotteryError::internal(format!(
                    "random source returned {} for {} candidates",
                    pick,
                    available.len()
                )));
            }

            // swap the drawn slot to the end and drop it
            let index = available.swap_remove(pick);
            let ticket = &mut tickets[index];
            ticket.mark_winner(tier, amount)?;
            ledger.credit(ticket.owner(), amount)?;

            tracing::debug!("{} tier winner: ticket {} ({})", tier, ticket.id(), amount);
            winners.push(ticket.clone());
        }

        Ok(winners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calculate_distribution, PlayerRegistry, PrizeConfig, RngSource, ScriptedRandom,
        TicketBook, TicketId,
    };
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};
    use uuid::Uuid;

    struct Fixture {
        players: PlayerRegistry,
        book: TicketBook,
    }

    /// `tickets` tickets spread round-robin over `player_count` players
    fn fixture(player_count: usize, tickets: usize) -> Fixture {
        let mut players = PlayerRegistry::new();
        let ids: Vec<Uuid> = (0..player_count)
            .map(|n| players.register(format!("Player {}", n + 1), Decimal::ZERO))
            .collect();

        let mut book = TicketBook::new();
        for n in 0..tickets {
            book.issue(ids[n % ids.len()]);
        }
        Fixture { players, book }
    }

    /// Ids of every winning ticket, in draw order
    fn winning_ids(results: &LotteryResults) -> Vec<TicketId> {
        results.all_winners().map(Ticket::id).collect()
    }

    fn distribution_for(tickets: usize) -> PrizeDistribution {
        calculate_distribution(Decimal::from(tickets), tickets, &PrizeConfig::default()).unwrap()
    }

    fn assert_disjoint(results: &LotteryResults) {
        let ids = winning_ids(results);
        let unique: HashSet<TicketId> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len(), "winner lists overlap: {:?}", ids);
    }

    #[test]
    fn test_fifty_ticket_game() {
        let mut fx = fixture(10, 50);
        // 50 tickets at 2.00
        let dist = calculate_distribution(dec!(100), 50, &PrizeConfig::default()).unwrap();
        let mut engine = DrawEngine::new(dec!(2), RngSource::seeded(7));

        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        assert_eq!(results.grand_winners.len(), 1);
        assert_eq!(results.second_tier_winners.len(), 5);
        assert_eq!(results.third_tier_winners.len(), 10);
        assert_disjoint(&results);

        assert_eq!(results.grand_winners[0].win_amount(), dec!(50));
        assert!(results
            .second_tier_winners
            .iter()
            .all(|t| t.win_amount() == dec!(6)));
        assert!(results
            .third_tier_winners
            .iter()
            .all(|t| t.win_amount() == dec!(1)));

        assert_eq!(results.total_revenue, dec!(100));
        assert_eq!(results.total_paid(), dec!(90));
        assert_eq!(results.house_profit, dec!(10));
        assert_eq!(results.house_profit, dist.expected_house_profit);
    }

    #[test]
    fn test_single_ticket_only_grand_winner() {
        let mut fx = fixture(1, 1);
        let dist = distribution_for(1);
        let mut engine = DrawEngine::new(Decimal::ONE, RngSource::seeded(1));

        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        assert_eq!(results.grand_winners.len(), 1);
        assert!(results.second_tier_winners.is_empty());
        assert!(results.third_tier_winners.is_empty());
        assert_eq!(results.grand_winners[0].win_amount(), dec!(0.50));

        // second and third pools stay with the house
        assert_eq!(results.house_profit, dec!(0.50));
        assert_eq!(dist.expected_house_profit, dec!(0.10));

        let player = fx.players.iter().next().unwrap();
        assert_eq!(player.total_winnings(), dec!(0.50));
    }

    #[test]
    fn test_ten_ticket_game() {
        let mut fx = fixture(4, 10);
        let dist = distribution_for(10);
        let mut engine = DrawEngine::new(Decimal::ONE, RngSource::seeded(99));

        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        assert_eq!(results.grand_winners.len(), 1);
        assert_eq!(results.second_tier_winners.len(), 1);
        assert_eq!(results.third_tier_winners.len(), 2);
        assert_disjoint(&results);
        // 10 - (5 + 3 + 2 * 0.5)
        assert_eq!(results.house_profit, dec!(1));
    }

    #[test]
    fn test_third_tier_shortfall_is_silent() {
        let mut fx = fixture(2, 2);
        let dist = distribution_for(2);
        assert_eq!(dist.second_tier_winner_count, 1);
        assert_eq!(dist.third_tier_winner_count, 1);

        let mut engine = DrawEngine::new(Decimal::ONE, RngSource::seeded(3));
        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        assert_eq!(results.grand_winners.len(), 1);
        assert_eq!(results.second_tier_winners.len(), 1);
        assert!(results.third_tier_winners.is_empty());
        // 2 - (1.00 + 0.60); the unpaid third pool is house profit
        assert_eq!(results.house_profit, dec!(0.40));
        assert_eq!(dist.expected_house_profit, dec!(0.20));
    }

    #[test]
    fn test_second_tier_partially_filled() {
        let mut fx = fixture(3, 3);
        let config = PrizeConfig {
            second_tier_winner_percentage: Decimal::ONE,
            ..PrizeConfig::default()
        };
        let dist = calculate_distribution(dec!(3), 3, &config).unwrap();
        assert_eq!(dist.second_tier_winner_count, 3);
        assert_eq!(dist.third_tier_winner_count, 1);

        let mut engine = DrawEngine::new(Decimal::ONE, ScriptedRandom::new(vec![1, 0, 0]));
        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        // three configured second-tier winners, two tickets left after the grand draw
        assert_eq!(results.grand_winners.len(), 1);
        assert_eq!(results.second_tier_winners.len(), 2);
        assert!(results.third_tier_winners.is_empty());
        assert_disjoint(&results);

        let per_winner = dist.second_tier_total_amount / dec!(3);
        assert!(results
            .second_tier_winners
            .iter()
            .all(|t| t.win_amount() == per_winner));

        assert_eq!(results.total_paid(), dec!(1.50) + per_winner + per_winner);
        assert_eq!(
            results.house_profit,
            results.total_revenue - results.total_paid()
        );
        assert_eq!(results.house_profit, dec!(0.90));
    }

    #[test]
    fn test_scripted_draw_is_exact() {
        let mut fx = fixture(5, 5);
        let dist = distribution_for(5);
        assert_eq!(dist.second_tier_winner_count, 1);
        assert_eq!(dist.third_tier_winner_count, 1);

        let mut engine = DrawEngine::new(Decimal::ONE, ScriptedRandom::new(vec![4, 0, 0]));
        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        // 4 takes ticket 5, 0 takes ticket 1 and moves ticket 4 into slot 0, 0 takes ticket 4
        let ids: Vec<u64> = winning_ids(&results).iter().map(|id| id.value()).collect();
        assert_eq!(ids, vec![5, 1, 4]);
        assert_eq!(engine.into_rng().consumed(), 3);

        let book = &fx.book;
        assert_eq!(book.tickets()[4].tier(), Some(PrizeTier::Grand));
        assert_eq!(book.tickets()[0].tier(), Some(PrizeTier::Second));
        assert_eq!(book.tickets()[3].tier(), Some(PrizeTier::Third));
        assert!(!book.tickets()[1].is_winner());
        assert!(!book.tickets()[2].is_winner());
    }

    #[test]
    fn test_same_seed_same_winners() {
        let dist = distribution_for(40);
        let draw = |seed| {
            let mut fx = fixture(6, 40);
            let mut engine = DrawEngine::new(Decimal::ONE, RngSource::seeded(seed));
            let results = engine
                .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
                .unwrap();
            winning_ids(&results)
        };

        assert_eq!(draw(11), draw(11));
    }

    #[test]
    fn test_winnings_credited_once_per_ticket() {
        let mut fx = fixture(7, 60);
        let dist = distribution_for(60);
        let mut engine = DrawEngine::new(Decimal::ONE, RngSource::seeded(2024));

        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        let mut expected: HashMap<Uuid, Decimal> = HashMap::new();
        for ticket in results.all_winners() {
            *expected.entry(ticket.owner()).or_default() += ticket.win_amount();
        }

        for player in fx.players.iter() {
            let won = expected.get(&player.id()).copied().unwrap_or_default();
            assert_eq!(player.total_winnings(), won, "{}", player.name());
            assert_eq!(player.balance(), won);
        }

        let credited: Decimal = fx.players.iter().map(|p| p.total_winnings()).sum();
        assert_eq!(credited, results.total_paid());
    }

    #[test]
    fn test_invariants_across_pool_sizes() {
        for pool in [1usize, 2, 3, 4, 9, 10, 11, 25, 37, 100] {
            for seed in 0..5u64 {
                let mut fx = fixture(3, pool);
                let dist = distribution_for(pool);
                let mut engine = DrawEngine::new(Decimal::ONE, RngSource::seeded(seed));

                let results = engine
                    .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
                    .unwrap();

                assert_eq!(results.grand_winners.len(), 1);
                assert_disjoint(&results);
                assert!(results.winner_count() <= pool.min(dist.max_winners()));
                assert_eq!(
                    results.house_profit,
                    results.total_revenue - results.total_paid()
                );

                let pool_ids: HashSet<TicketId> =
                    fx.book.tickets().iter().map(Ticket::id).collect();
                assert!(winning_ids(&results).iter().all(|id| pool_ids.contains(id)));

                let marked = fx.book.tickets().iter().filter(|t| t.is_winner()).count();
                assert_eq!(marked, results.winner_count());
            }
        }
    }

    #[test]
    fn test_uneven_split_profit_absorbs_residue() {
        // 100 tickets at 0.10, third pool of 0.70 split three ways
        let mut fx = fixture(5, 100);
        let config = PrizeConfig {
            third_tier_percentage: dec!(0.07),
            house_percentage: dec!(0.13),
            third_tier_winner_percentage: dec!(0.03),
            ..PrizeConfig::default()
        };
        let dist = calculate_distribution(dec!(10), 100, &config).unwrap();
        assert_eq!(dist.third_tier_winner_count, 3);

        let mut engine = DrawEngine::new(dec!(0.10), RngSource::seeded(5));
        let results = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();

        assert_eq!(
            results.third_tier_winners[0].win_amount(),
            dec!(0.70) / dec!(3)
        );
        assert_eq!(results.total_revenue, dec!(10.00));
        assert_eq!(
            results.house_profit,
            results.total_revenue - results.total_paid()
        );
    }

    #[test]
    fn test_rejects_bad_input_without_mutation() {
        let mut fx = fixture(2, 4);
        let dist = distribution_for(4);
        let mut engine = DrawEngine::new(Decimal::ONE, ScriptedRandom::default());

        let err = engine
            .conduct_draw(&mut [], Some(&dist), &mut fx.players)
            .unwrap_err();
        assert!(matches!(err, LotteryError::InvalidArgument(_)));

        let err = engine
            .conduct_draw(fx.book.tickets_mut(), None, &mut fx.players)
            .unwrap_err();
        assert!(matches!(err, LotteryError::InvalidArgument(_)));

        // tickets owned by players the ledger does not know
        let mut strangers = PlayerRegistry::new();
        let err = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut strangers)
            .unwrap_err();
        assert!(matches!(err, LotteryError::InvalidArgument(_)));

        assert!(fx.book.tickets().iter().all(|t| !t.is_winner()));
        assert!(fx.players.iter().all(|p| p.total_winnings() == Decimal::ZERO));
        assert_eq!(engine.into_rng().consumed(), 0);
    }

    #[test]
    fn test_pool_cannot_be_drawn_twice() {
        let mut fx = fixture(2, 6);
        let dist = distribution_for(6);
        let mut engine = DrawEngine::new(Decimal::ONE, RngSource::seeded(8));

        engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap();
        let err = engine
            .conduct_draw(fx.book.tickets_mut(), Some(&dist), &mut fx.players)
            .unwrap_err();
        assert!(matches!(err, LotteryError::InvalidArgument(_)));
    }
}
