//! # Orderbook Engine
//!
//! Escrowed limit order book for a single base/quote trading pair.
//!
//! ## Architecture
//!
//! - **Types**: core data structures (Order, Trade, PlacementOutcome)
//! - **OrderBook**: two price-sorted linked lists over slab-backed storage
//! - **Engine**: price-time priority matching with transactional settlement
//! - **Settlement**: escrow and transfer interface, plus an in-memory ledger
//! - **Events**: observational sinks for placements, trades and cancellations
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical requests produce identical books and state roots
//! 2. **No Floating Point**: integer prices and amounts, `u128` quote values
//! 3. **Escrow at Placement**: a resting order's value is locked when it is placed
//! 4. **Atomic Placement**: a failed settlement leaves no trace in the book

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Trade, PlacementOutcome
pub mod types;

/// Order book: slab-backed sorted lists with sentinels
pub mod orderbook;

/// Matching engine: crossing, fills and residuals
pub mod engine;

/// Settlement interface and in-memory ledger
pub mod settlement;

/// Engine events and sinks
pub mod events;

/// Engine and settlement errors
pub mod error;

/// Configuration loading
pub mod config;

/// Subscriber setup for binaries
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{EngineConfig, FundingMode};
pub use engine::{MatchingEngine, PlaceOrder};
pub use error::{EngineError, SettlementError};
pub use events::{EventSink, NoopSink, RecordingSink, TracingSink};
pub use orderbook::OrderStore;
pub use settlement::{Asset, Funding, InMemoryLedger, Settlement};
pub use types::{Order, PlacementOutcome, PricingRule, Side, Trade};
