//! Orderbook Engine - Binary Entry Point
//!
//! Runs a short trading session against the in-memory ledger and prints
//! the resulting books, balances and state root.
//!
//! Configuration is read from an optional `orderbook.{toml,json,yaml}` in the
//! working directory, overridden by `ORDERBOOK_*` environment variables.

use std::process::ExitCode;

use orderbook_engine::config::EngineConfig;
use orderbook_engine::engine::MatchingEngine;
use orderbook_engine::error::EngineError;
use orderbook_engine::events::TracingSink;
use orderbook_engine::logging::init_logging;
use orderbook_engine::settlement::{Asset, InMemoryLedger};
use orderbook_engine::types::{AccountId, Order, Side};
use tracing::error;

const OWNER: AccountId = 1;
const TRADER: AccountId = 2;

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("failed to initialise logging: {e}");
    }

    let config = match EngineConfig::from_file("orderbook") {
        Ok(config) => config,
        Err(e) => {
            error!(target: "engine", error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: "engine", error = %e, "session failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: EngineConfig) -> Result<(), EngineError> {
    println!("===========================================");
    println!("  Orderbook Engine {}/{}", config.base_symbol, config.quote_symbol);
    println!("  pricing: {:?}, funding: {:?}", config.pricing, config.funding);
    println!("===========================================");
    println!();

    let mut ledger = InMemoryLedger::from_config(&config);
    for (account, amount) in [(OWNER, 9_900), (TRADER, 100)] {
        ledger.deposit(account, Asset::Base, amount)?;
        ledger.deposit(account, Asset::Quote, amount)?;
    }

    let mut engine = MatchingEngine::new(config, ledger, TracingSink);

    engine.place_sell_order(OWNER, 10, 2)?;
    engine.place_sell_order(OWNER, 11, 3)?;
    engine.place_buy_order(OWNER, 8, 4)?;

    let outcome = engine.place_buy_order(TRADER, 11, 4)?;
    println!(
        "Buy 4 @ 11 filled {} in {} trade(s), average price {}",
        outcome.filled_quantity(),
        outcome.trades.len(),
        outcome
            .average_price()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    if let Err(e) = engine.place_sell_order(TRADER, 8, 1_000) {
        println!("Sell 1000 @ 8 rejected: {e}");
    }
    println!();

    print_side("Bids", &engine.buy_orders());
    print_side("Asks", &engine.sell_orders());

    let base = engine.config().base_symbol.clone();
    let quote = engine.config().quote_symbol.clone();
    println!("Balances:");
    for account in [OWNER, TRADER] {
        let ledger = engine.settlement();
        println!(
            "  account {account}: {} {base} ({} escrowed), {} {quote} ({} escrowed)",
            ledger.balance_of(account, Asset::Base),
            ledger.escrowed(account, Asset::Base),
            ledger.balance_of(account, Asset::Quote),
            ledger.escrowed(account, Asset::Quote),
        );
    }
    println!();

    println!("State root: 0x{}", hex::encode(engine.state_root()?));
    if let Some(spread) = engine.spread() {
        println!("Spread: {spread}");
    }
    for (price, qty) in engine.depth(Side::Buy, 3) {
        println!("  bid level {price}: {qty}");
    }

    Ok(())
}

fn print_side(label: &str, orders: &[Order]) {
    println!("{label}:");
    if orders.is_empty() {
        println!("  (empty)");
    }
    for order in orders {
        println!(
            "  #{:<4} maker {:<3} {:>3} @ {:<4} next {}",
            order.id, order.maker, order.amount, order.price, order.next
        );
    }
    println!();
}
