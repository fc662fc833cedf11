//! Settlement interface between the engine and the asset ledger.
//!
//! ## Escrow Model
//!
//! Value is locked when an order is placed, not when it matches:
//!
//! - A **buy** locks `price * amount` of the quote asset
//! - A **sell** locks `amount` of the base asset
//!
//! Because a resting order's backing value is already held, a match never
//! needs to re-check the maker's solvency. Each matched leg only moves
//! value out of escrow.
//!
//! ## Transactions
//!
//! The engine brackets every placement with [`Settlement::begin`] and either
//! [`Settlement::commit`] or [`Settlement::rollback`]. The book is mutated
//! only after the commit succeeded, so a failed reservation or leg leaves
//! both the ledger and the book exactly as they were.

mod ledger;

pub use ledger::InMemoryLedger;

use crate::error::SettlementError;
use crate::types::{AccountId, Side};

/// The two assets of the trading pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Asset being bought and sold (`amount` is denominated in it)
    Base,
    /// Asset prices are quoted in
    Quote,
}

impl Asset {
    /// Asset a placement on `side` must lock
    #[inline]
    pub fn committed_by(side: Side) -> Self {
        match side {
            Side::Buy => Asset::Quote,
            Side::Sell => Asset::Base,
        }
    }
}

/// How a reservation is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Funding {
    /// Drawn from the party's pre-approved ledger balance
    #[default]
    Approved,
    /// Supplied with the call; must cover the reservation, the excess is
    /// credited back to the caller
    Attached(u128),
}

/// Value movement for one matched leg.
///
/// `quote_qty` goes from the buyer's escrow to the seller and `base_qty`
/// from the seller's escrow to the buyer. `buyer_refund` is the part of the
/// buyer's escrow freed because the leg executed below the buyer's limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementLeg {
    pub maker: AccountId,
    pub taker: AccountId,
    pub taker_side: Side,
    pub base_qty: u64,
    pub quote_qty: u128,
    pub buyer_refund: u128,
}

impl SettlementLeg {
    pub fn buyer(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.taker,
            Side::Sell => self.maker,
        }
    }

    pub fn seller(&self) -> AccountId {
        match self.taker_side {
            Side::Buy => self.maker,
            Side::Sell => self.taker,
        }
    }

    /// Quote value released from the buyer's escrow by this leg
    pub fn buyer_escrow_released(&self) -> u128 {
        self.quote_qty + self.buyer_refund
    }
}

/// The ledger collaborator the engine reserves and moves value through.
///
/// Implementations must make the calls between `begin` and `rollback`
/// disappear without trace.
pub trait Settlement {
    /// Open a transaction for one placement
    fn begin(&mut self);

    /// Make every call since `begin` permanent
    fn commit(&mut self) -> Result<(), SettlementError>;

    /// Undo every call since `begin`
    fn rollback(&mut self) -> Result<(), SettlementError>;

    /// Lock `qty` of `asset` for `party`
    fn reserve(
        &mut self,
        party: AccountId,
        asset: Asset,
        qty: u128,
        funding: Funding,
    ) -> Result<(), SettlementError>;

    /// Move value for one matched leg out of escrow
    fn settle_leg(&mut self, leg: &SettlementLeg) -> Result<(), SettlementError>;

    /// Return locked value to `party` (cancellation)
    fn release(&mut self, party: AccountId, asset: Asset, qty: u128) -> Result<(), SettlementError>;
}
