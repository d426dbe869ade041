//! Vendor Cash-Flow CLI
//!
//! Drives a market of vendors through simulated time and inspects saved
//! markets.
//!
//! Usage:
//!   vendor-cashflow simulate --vendors 5 --days 10 --seed 42 --checkpoint market.json
//!   vendor-cashflow inspect --checkpoint market.json --vendor <ID> --at 2024-01-05T12:00:00Z

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use tracing::{info, warn};
use vendor_cashflow_core_rs::{
    Clock, LedgerConfig, ManualClock, Market, MarketError, RngManager, Timestamp,
};

#[derive(Parser, Debug)]
#[command(name = "vendor-cashflow")]
#[command(about = "Simulate and inspect vendor cash ledgers")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a market forward hour by hour with random player trades
    Simulate {
        /// Number of vendors to spawn
        #[arg(long, default_value = "3")]
        vendors: usize,

        /// Days of game time to simulate
        #[arg(long, default_value = "7")]
        days: i64,

        /// Market seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Path to a JSON ledger config (defaults otherwise)
        #[arg(long)]
        config: Option<String>,

        /// Chance per vendor per hour that a player trades
        #[arg(long, default_value = "0.1")]
        trade_chance: f64,

        /// Game time the simulation starts at (RFC3339)
        #[arg(long, default_value = "2024-01-01T00:00:00Z")]
        start: String,

        /// Write the final market snapshot here
        #[arg(long)]
        checkpoint: Option<String>,
    },

    /// Print the ledgers of a saved market
    Inspect {
        /// Snapshot written by `simulate`
        #[arg(long)]
        checkpoint: String,

        /// Config the snapshot was taken with (defaults otherwise)
        #[arg(long)]
        config: Option<String>,

        /// Only this vendor
        #[arg(long)]
        vendor: Option<String>,

        /// Also report cash on hand at this instant (RFC3339)
        #[arg(long)]
        at: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vendor_cashflow_core_rs=info,vendor_cashflow=info".into()),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Simulate {
            vendors,
            days,
            seed,
            config,
            trade_chance,
            start,
            checkpoint,
        } => simulate(
            vendors,
            days,
            seed,
            load_config(config.as_deref())?,
            trade_chance,
            parse_time(&start)?,
            checkpoint.as_deref(),
        ),
        Command::Inspect {
            checkpoint,
            config,
            vendor,
            at,
        } => inspect(
            &checkpoint,
            load_config(config.as_deref())?,
            vendor.as_deref(),
            at.as_deref().map(parse_time).transpose()?,
        ),
    }
}

fn load_config(path: Option<&str>) -> Result<LedgerConfig> {
    let Some(path) = path else {
        return Ok(LedgerConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
    let config = LedgerConfig::from_json_str(&json)?;
    Ok(config)
}

fn parse_time(s: &str) -> Result<Timestamp> {
    let t = DateTime::parse_from_rfc3339(s).with_context(|| format!("Invalid RFC3339 time: {}", s))?;
    Ok(t.with_timezone(&Utc))
}

fn simulate(
    num_vendors: usize,
    days: i64,
    seed: u64,
    config: LedgerConfig,
    trade_chance: f64,
    start: Timestamp,
    checkpoint: Option<&str>,
) -> Result<()> {
    if !(0.0..=1.0).contains(&trade_chance) {
        bail!("--trade-chance must be within [0, 1], got {}", trade_chance);
    }

    let mut market = Market::new(config, seed)?;
    let vendor_ids = (0..num_vendors)
        .map(|_| market.spawn_vendor())
        .collect::<Result<Vec<_>, _>>()?;
    info!(vendors = num_vendors, days, seed, "market opened");

    // Player behaviour gets its own stream so it never perturbs vendor seeds.
    let mut players = RngManager::new(seed ^ 0x9E37_79B9_7F4A_7C15);
    let mut clock = ManualClock::new(start);

    println!("=== Vendor Cash-Flow Simulation ===");
    println!("Start: {}  Days: {}  Seed: {}", start.to_rfc3339(), days, seed);
    println!();

    for day in 1..=days {
        let mut sales = 0usize;
        let mut purchases = 0usize;
        let mut refused = 0usize;

        for _ in 0..24 {
            clock.advance(Duration::hours(1));
            let now = clock.now();

            for vendor_id in &vendor_ids {
                if players.next_f64() >= trade_chance {
                    continue;
                }
                let price = players.range(10, 500);
                let player = format!("player_{}", players.range(1, 100));

                if players.next_f64() < 0.5 {
                    market.record_sale(vendor_id, &player, price, now)?;
                    sales += 1;
                } else {
                    match market.record_purchase(vendor_id, &player, price, now) {
                        Ok(_) => purchases += 1,
                        Err(MarketError::InsufficientCash { available, .. }) => {
                            warn!(vendor = %vendor_id, price, available, "purchase refused");
                            refused += 1;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        let now = clock.now();
        println!("--- Day {} ({}) ---", day, now.format("%Y-%m-%d %H:%M"));
        println!("  trades: {} sales, {} purchases, {} refused", sales, purchases, refused);
        for vendor_id in &vendor_ids {
            let cash = market.cash_on_hand(vendor_id, now)?;
            let max_cash = market
                .vendor(vendor_id)
                .map(|ledger| ledger.current_max_cash())
                .unwrap_or_default();
            println!("  {}: {:>7} on hand (ceiling {})", vendor_id, cash, max_cash);
        }
    }

    if let Some(path) = checkpoint {
        let json = market.to_json()?;
        fs::write(path, json).with_context(|| format!("Failed to write checkpoint {}", path))?;
        info!(path, "checkpoint written");
    }

    println!();
    println!("=== Simulation Complete ===");
    Ok(())
}

fn inspect(
    checkpoint: &str,
    config: LedgerConfig,
    vendor_filter: Option<&str>,
    at: Option<Timestamp>,
) -> Result<()> {
    let json = fs::read_to_string(checkpoint)
        .with_context(|| format!("Failed to read checkpoint {}", checkpoint))?;
    let mut market = Market::from_json(&json, config)?;

    let vendor_ids: Vec<String> = match vendor_filter {
        Some(id) if market.vendor(id).is_none() => bail!("Vendor {} not in checkpoint", id),
        Some(id) => vec![id.to_string()],
        None => market.vendor_ids().map(str::to_string).collect(),
    };

    println!("=== Market Checkpoint ===");
    println!("File: {}  Vendors: {}", checkpoint, market.num_vendors());
    println!();

    for vendor_id in &vendor_ids {
        if let Some(ledger) = market.vendor(vendor_id) {
            println!("--- {} ---", vendor_id);
            for page in ledger.to_display_pages() {
                println!("{}", page);
            }
        }
        if let Some(t) = at {
            let cash = market.cash_on_hand(vendor_id, t)?;
            println!("Cash on hand at {}: {}", t.to_rfc3339(), cash);
        }
        println!();
    }
    Ok(())
}
