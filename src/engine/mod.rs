//! Matching engine module.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: same sequence of requests, same books and balances
//! 2. **Integer Math**: no floating-point operations on the accounting path
//! 3. **Synchronous Execution**: single writer, no async in the hot path
//! 4. **Price-Time Priority**: best price first, then FIFO
//! 5. **All-or-Nothing**: settlement commits before the book is touched
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - **Partial fills** are supported
//! - **Unfilled quantity** rests on the book under the placement's id
//!
//! ## Example
//!
//! ```
//! use orderbook_engine::config::EngineConfig;
//! use orderbook_engine::engine::MatchingEngine;
//! use orderbook_engine::events::RecordingSink;
//! use orderbook_engine::settlement::{Asset, InMemoryLedger};
//!
//! let mut ledger = InMemoryLedger::new("TKA", "TKB");
//! ledger.deposit(1, Asset::Quote, 1_000).unwrap();
//! ledger.deposit(2, Asset::Base, 10).unwrap();
//!
//! let mut engine = MatchingEngine::new(EngineConfig::default(), ledger, RecordingSink::new());
//! engine.place_buy_order(1, 12, 3).unwrap();
//! engine.place_buy_order(1, 10, 2).unwrap();
//!
//! // Sell 5 @ 9 sweeps both bids at their own prices
//! let outcome = engine.place_sell_order(2, 9, 5).unwrap();
//! assert_eq!(outcome.trades.len(), 2);
//! assert_eq!(outcome.quote_volume(), 56);
//! assert!(engine.buy_orders().is_empty());
//! ```

pub mod crossing;
mod matcher;

pub use crossing::crosses;
pub use matcher::{MatchingEngine, PlaceOrder};
