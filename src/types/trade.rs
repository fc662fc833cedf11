//! Trade type representing one matched leg between a taker and a resting order.

use super::order::{AccountId, Side};

/// A single leg of a match between the incoming (taker) order and one
/// resting (maker) order.
///
/// ## Terminology
///
/// - **Maker**: the resting order that was already in the book
/// - **Taker**: the incoming order that crossed it
///
/// The execution price is chosen by the engine's pricing rule; with the
/// default rule it is always the maker's price, so any price improvement
/// accrues to the taker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    /// Id of the buy-side order of this leg
    pub buy_order_id: u64,

    /// Id of the sell-side order of this leg
    pub sell_order_id: u64,

    /// Owner of the resting order
    pub maker: AccountId,

    /// Owner of the incoming order
    pub taker: AccountId,

    /// Side of the incoming order
    pub taker_side: Side,

    /// Execution price (quote units per base unit)
    pub price: u64,

    /// Executed base quantity
    pub quantity: u64,
}

impl Trade {
    /// Id of the resting order of this leg
    pub fn maker_order_id(&self) -> u64 {
        match self.taker_side {
            Side::Buy => self.sell_order_id,
            Side::Sell => self.buy_order_id,
        }
    }

    /// Id of the incoming order of this leg
    pub fn taker_order_id(&self) -> u64 {
        match self.taker_side {
            Side::Buy => self.buy_order_id,
            Side::Sell => self.sell_order_id,
        }
    }

    /// Quote value exchanged (price * quantity), widened so it cannot overflow
    pub fn quote_amount(&self) -> u128 {
        (self.price as u128) * (self.quantity as u128)
    }
}
