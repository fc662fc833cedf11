//! Core data types for the order book engine
//!
//! ## Types
//!
//! - [`Order`]: A limit order (or sentinel record) in the book
//! - [`Side`]: Buy or Sell
//! - [`Trade`]: One matched leg between a taker and a resting order
//! - [`PlacementOutcome`]: Everything a single placement produced
//!
//! ## Integer Arithmetic
//!
//! Prices and amounts are plain `u64` integers; quote values are `u128`.
//! See [`price`] for the helpers and the execution pricing rule.

mod order;
mod outcome;
mod trade;
pub mod price;

pub use order::{AccountId, Order, Side, ASK_SENTINEL_ID, BID_SENTINEL_ID, FIRST_ORDER_ID};
pub use outcome::PlacementOutcome;
pub use price::PricingRule;
pub use trade::Trade;
