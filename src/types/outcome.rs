//! Result of a single placement.

use rust_decimal::Decimal;

use super::order::{Order, Side};
use super::price;
use super::trade::Trade;

/// What happened to one incoming order.
///
/// `trades` lists the matched legs in execution order (best resting price
/// first). `residual` is the order that now rests in the book, if any
/// quantity was left after crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// Id assigned to the incoming order
    pub order_id: u64,

    /// Side of the incoming order
    pub side: Side,

    /// Quantity requested
    pub requested: u64,

    /// Matched legs
    pub trades: Vec<Trade>,

    /// Remainder inserted into the same-side book
    pub residual: Option<Order>,
}

impl PlacementOutcome {
    /// Total base quantity matched immediately
    pub fn filled_quantity(&self) -> u64 {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    /// Total quote value exchanged across all legs
    pub fn quote_volume(&self) -> u128 {
        self.trades.iter().map(Trade::quote_amount).sum()
    }

    /// True if nothing is left resting
    pub fn is_fully_filled(&self) -> bool {
        self.residual.is_none()
    }

    /// True if some, but not all, of the order matched
    pub fn is_partially_filled(&self) -> bool {
        !self.trades.is_empty() && self.residual.is_some()
    }

    /// Volume-weighted average execution price, `None` if nothing matched
    pub fn average_price(&self) -> Option<Decimal> {
        price::average_price(self.quote_volume(), self.filled_quantity())
    }
}
