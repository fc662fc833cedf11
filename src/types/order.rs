//! Order types for the order book engine.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so that the contents of both
//! books can be hashed into a deterministic state root. Enum-valued fields are
//! stored as `u8` for SSZ compatibility, with typed accessors.
//!
//! ## Sentinels
//!
//! Each side of the book owns a permanent zero-amount record:
//! - id 0 terminates the bid list
//! - id 1 terminates the ask list
//!
//! Real orders are numbered from [`FIRST_ORDER_ID`] upward.

use ssz_rs::prelude::*;

/// Id of the bid-side sentinel record.
pub const BID_SENTINEL_ID: u64 = 0;

/// Id of the ask-side sentinel record.
pub const ASK_SENTINEL_ID: u64 = 1;

/// First id handed out to a real order.
pub const FIRST_ORDER_ID: u64 = 2;

/// Account identifier of an order owner.
pub type AccountId = u64;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy order (bid) - pays quote asset, receives base asset
    #[default]
    Buy,
    /// Sell order (ask) - pays base asset, receives quote asset
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Id of the sentinel record terminating this side's list
    #[inline]
    pub fn sentinel_id(self) -> u64 {
        match self {
            Side::Buy => BID_SENTINEL_ID,
            Side::Sell => ASK_SENTINEL_ID,
        }
    }

    /// Maps the `isBuy` flag of the external interface onto a side
    #[inline]
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    #[inline]
    pub fn is_buy(self) -> bool {
        self == Side::Buy
    }

    /// True if `price` sorts strictly ahead of `other` on this side.
    ///
    /// Bids rank higher prices first, asks rank lower prices first.
    #[inline]
    pub fn ranks_ahead(self, price: u64, other: u64) -> bool {
        match self {
            Side::Buy => price > other,
            Side::Sell => price < other,
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order resting in (or passing through) the book.
///
/// `amount` is the only field that changes while the order is live; it
/// shrinks as the order is matched and the order leaves the book when it
/// reaches zero. `next` links the order to its successor in the side list.
///
/// ## Example
///
/// ```
/// use orderbook_engine::types::{Order, Side, ASK_SENTINEL_ID};
///
/// let order = Order::new(2, 7, Side::Sell, 10, 2);
/// assert_eq!(order.next, ASK_SENTINEL_ID);
/// assert!(!order.is_sentinel());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier (assigned by the engine, never reused)
    pub id: u64,

    /// Owner of the order
    pub maker: AccountId,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Limit price in quote units per base unit
    pub price: u64,

    /// Size originally requested by the placement
    pub quantity: u64,

    /// Remaining quantity
    pub amount: u64,

    /// Id of the next order in the side list (sentinel id at the tail)
    pub next: u64,
}

impl Order {
    /// Create a new unlinked order pointing at its side's sentinel
    pub fn new(id: u64, maker: AccountId, side: Side, price: u64, amount: u64) -> Self {
        Self {
            id,
            maker,
            side_raw: side.to_u8(),
            price,
            quantity: amount,
            amount,
            next: side.sentinel_id(),
        }
    }

    /// The permanent zero-amount record terminating `side`'s list
    pub fn sentinel(side: Side) -> Self {
        Self {
            id: side.sentinel_id(),
            maker: 0,
            side_raw: side.to_u8(),
            price: 0,
            quantity: 0,
            amount: 0,
            next: side.sentinel_id(),
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Sentinels are the only records with zero amount reachable from a head
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.id < FIRST_ORDER_ID
    }

    /// Check if the order has nothing left to match
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.amount == 0
    }

    /// Quantity matched so far
    pub fn filled_quantity(&self) -> u64 {
        self.quantity.saturating_sub(self.amount)
    }

    /// Fill a portion of this order
    ///
    /// # Returns
    ///
    /// The actual quantity filled (may be less if the order doesn't have enough remaining)
    pub fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual_fill = fill_qty.min(self.amount);
        self.amount -= actual_fill;
        actual_fill
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
