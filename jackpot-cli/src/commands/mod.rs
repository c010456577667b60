mod config;

pub use config::{handle_config_command, ConfigCommands};

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use jackpot_lottery::{
    calculate_distribution, play_round, ConfigLoader, GameConfig, GameSummary,
    PrizeDistribution, RandomSource, RngSource,
};
use rust_decimal::Decimal;
use std::path::Path;

pub(crate) fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let loader = match path {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    loader.load().context("failed to load game configuration")
}

pub fn play(
    config_path: Option<&Path>,
    players: Option<u32>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(players) = players {
        config.player_count = players;
    }

    let summary = match seed {
        Some(seed) => {
            tracing::info!("Using seed {}", seed);
            run_round(config, &mut RngSource::seeded(seed))?
        }
        None => run_round(config, &mut RngSource::thread())?,
    };

    if json {
        println!("{}", summary.to_json()?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn run_round<R: RandomSource>(config: GameConfig, rng: &mut R) -> Result<GameSummary> {
    let game = play_round(config, rng)?;
    Ok(game.summary()?)
}

pub fn show_distribution(config_path: Option<&Path>, revenue: &str, tickets: usize) -> Result<()> {
    let config = load_config(config_path)?;
    let revenue: Decimal = revenue
        .parse()
        .with_context(|| format!("invalid revenue '{}'", revenue))?;

    let distribution = calculate_distribution(revenue, tickets, &config.prizes)?;

    println!("Prize distribution for revenue {} over {} tickets:", revenue, tickets);
    print_distribution(&distribution);
    Ok(())
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn print_distribution(distribution: &PrizeDistribution) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Tier", "Pool", "Winners", "Per Winner"]);

    table.add_row(vec![
        "Grand".to_string(),
        money(distribution.grand_prize_amount),
        "1".to_string(),
        money(distribution.grand_prize_amount),
    ]);
    table.add_row(vec![
        "Second".to_string(),
        money(distribution.second_tier_total_amount),
        distribution.second_tier_winner_count.to_string(),
        money(distribution.second_tier_prize_per_winner),
    ]);
    table.add_row(vec![
        "Third".to_string(),
        money(distribution.third_tier_total_amount),
        distribution.third_tier_winner_count.to_string(),
        money(distribution.third_tier_prize_per_winner),
    ]);
    table.add_row(vec![
        "House (expected)".to_string(),
        money(distribution.expected_house_profit),
        "-".to_string(),
        "-".to_string(),
    ]);

    println!("{}", table);
}

fn print_summary(summary: &GameSummary) {
    println!("------ DRAW COMPLETED ------");
    println!("Game ID: {}", summary.game_id);
    println!("Drawn at: {}", summary.drawn_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Tickets sold: {}", summary.ticket_count);
    println!("Total revenue: {}", money(summary.total_revenue));
    println!();

    print_distribution(&summary.distribution);
    println!();

    let mut winners = Table::new();
    winners.load_preset(UTF8_FULL);
    winners.set_header(vec!["Tier", "Ticket", "Player", "Prize"]);
    for line in &summary.winners {
        winners.add_row(vec![
            line.tier.to_string(),
            format!("#{}", line.ticket_id),
            line.player_name.clone(),
            money(line.amount),
        ]);
    }
    println!("Winners:");
    println!("{}", winners);
    println!();

    let mut standings = Table::new();
    standings.load_preset(UTF8_FULL);
    standings.set_header(vec!["Player", "Tickets", "Spent", "Won", "Net", "Balance"]);
    for standing in &summary.standings {
        standings.add_row(vec![
            standing.name.clone(),
            standing.tickets.to_string(),
            money(standing.spent),
            money(standing.won),
            money(standing.net),
            money(standing.balance),
        ]);
    }
    println!("Players:");
    println!("{}", standings);
    println!();

    println!("Total paid: {}", money(summary.total_paid));
    println!("House profit: {}", money(summary.house_profit));
    println!(
        "Expected house profit: {} (variance {})",
        money(summary.expected_house_profit),
        money(summary.profit_variance)
    );
}
