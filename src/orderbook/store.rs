//! Order storage and the two price-sorted book lists.
//!
//! ## Architecture
//!
//! - **Slab**: arena holding every live order record plus the two sentinels
//! - **HashMap**: order id to slab key, so links can be plain order ids
//! - **Heads**: one id per side pointing at the best order (or the sentinel)
//!
//! Each side is a singly-linked list threaded through `Order::next`:
//!
//! ```text
//! bid_head -> [12 x3] -> [11 x1] -> [10 x2] -> sentinel(0)
//! ask_head -> sentinel(1)
//! ```
//!
//! ## Invariants
//!
//! 1. Bids strictly descend by price, asks strictly ascend; equal prices keep
//!    arrival (id) order.
//! 2. Every non-sentinel node reachable from a head has `amount > 0`.
//! 3. No id appears twice in a list and no list has a cycle.
//! 4. Ids come from a single counter and are never handed out twice.
//!
//! ## Example
//!
//! ```
//! use orderbook_engine::orderbook::OrderStore;
//! use orderbook_engine::types::{Order, Side};
//!
//! let mut store = OrderStore::new();
//! for price in [10, 12, 11] {
//!     let id = store.allocate_id();
//!     store.insert(Order::new(id, 1, Side::Buy, price, 1));
//! }
//!
//! let prices: Vec<u64> = store.iter(Side::Buy).map(|o| o.price).collect();
//! assert_eq!(prices, vec![12, 11, 10]);
//! ```

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;
use thiserror::Error;

use crate::error::EngineError;
use crate::orderbook::BookIter;
use crate::types::{Order, Side, ASK_SENTINEL_ID, BID_SENTINEL_ID, FIRST_ORDER_ID};

/// A broken book invariant, reported by [`OrderStore::check_invariants`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{side:?} list out of order at order {id}")]
    OutOfOrder { side: Side, id: u64 },

    #[error("order {id} is linked with zero amount")]
    EmptyOrder { id: u64 },

    #[error("order {id} is linked into the {side:?} list but belongs to the other side")]
    WrongSide { side: Side, id: u64 },

    #[error("{side:?} list links to unknown order {id}")]
    DanglingLink { side: Side, id: u64 },

    #[error("{side:?} list revisits order {id}")]
    Cycle { side: Side, id: u64 },

    #[error("{side:?} count is {counted} but {linked} orders are linked")]
    CountMismatch { side: Side, counted: usize, linked: usize },
}

/// Owner of all order records and of both book lists.
#[derive(Debug)]
pub struct OrderStore {
    /// Order records, sentinels included
    orders: Slab<Order>,

    /// Order id to slab key
    index: HashMap<u64, usize>,

    /// Best bid id (bid sentinel when empty)
    bid_head: u64,

    /// Best ask id (ask sentinel when empty)
    ask_head: u64,

    /// Next id to hand out, shared by both sides
    next_order_id: u64,

    /// Number of live bid orders
    bid_count: usize,

    /// Number of live ask orders
    ask_count: usize,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    /// Create an empty store holding only the two sentinels
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with room for `order_capacity` live orders
    pub fn with_capacity(order_capacity: usize) -> Self {
        let mut store = Self {
            orders: Slab::with_capacity(order_capacity + 2),
            index: HashMap::with_capacity(order_capacity + 2),
            bid_head: BID_SENTINEL_ID,
            ask_head: ASK_SENTINEL_ID,
            next_order_id: FIRST_ORDER_ID,
            bid_count: 0,
            ask_count: 0,
        };
        for side in [Side::Buy, Side::Sell] {
            let sentinel = Order::sentinel(side);
            let id = sentinel.id;
            let key = store.orders.insert(sentinel);
            store.index.insert(id, key);
        }
        store
    }

    // ========================================================================
    // Ids
    // ========================================================================

    /// Hand out the next order id
    #[inline]
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    /// The id the next placement will receive (without consuming it)
    #[inline]
    pub fn peek_next_order_id(&self) -> u64 {
        self.next_order_id
    }

    // ========================================================================
    // Size
    // ========================================================================

    /// Number of live orders on `side`
    #[inline]
    pub fn len(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bid_count,
            Side::Sell => self.ask_count,
        }
    }

    /// Number of live orders on both sides
    #[inline]
    pub fn order_count(&self) -> usize {
        self.bid_count + self.ask_count
    }

    #[inline]
    pub fn is_empty(&self, side: Side) -> bool {
        self.len(side) == 0
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Id at the head of `side` (the sentinel id when the side is empty)
    #[inline]
    pub fn head(&self, side: Side) -> u64 {
        match side {
            Side::Buy => self.bid_head,
            Side::Sell => self.ask_head,
        }
    }

    fn set_head(&mut self, side: Side, id: u64) {
        match side {
            Side::Buy => self.bid_head = id,
            Side::Sell => self.ask_head = id,
        }
    }

    /// The record at the head of `side` (possibly the sentinel)
    pub fn head_order(&self, side: Side) -> &Order {
        let key = self.index[&self.head(side)];
        &self.orders[key]
    }

    /// Stored record for `id`, sentinels included.
    ///
    /// Returns `None` for ids that were never assigned or whose order has
    /// already left the book.
    #[inline]
    pub fn get_by_id(&self, id: u64) -> Option<&Order> {
        self.index.get(&id).map(|&key| &self.orders[key])
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Order> {
        let key = *self.index.get(&id)?;
        self.orders.get_mut(key)
    }

    /// Check if a live (non-sentinel) order exists
    #[inline]
    pub fn contains_order(&self, id: u64) -> bool {
        id >= FIRST_ORDER_ID && self.index.contains_key(&id)
    }

    /// Best price on `side`, `None` if the side is empty
    pub fn best_price(&self, side: Side) -> Option<u64> {
        let head = self.head_order(side);
        (!head.is_sentinel()).then_some(head.price)
    }

    /// Walk `side` from best to worst
    pub fn iter(&self, side: Side) -> BookIter<'_> {
        BookIter::new(self, self.head(side))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Splice `order` into its side's list.
    ///
    /// The order lands immediately before the first node with a strictly
    /// worse price, so it queues behind every existing order at the same
    /// price. O(depth).
    ///
    /// The caller supplies a fresh id from [`allocate_id`](Self::allocate_id)
    /// and a positive amount.
    pub fn insert(&mut self, mut order: Order) -> u64 {
        debug_assert!(!order.is_sentinel(), "sentinels are never inserted");
        debug_assert!(order.amount > 0, "empty orders never rest");
        debug_assert!(!self.index.contains_key(&order.id), "order ids are unique");

        let side = order.side();
        let mut prev: Option<u64> = None;
        let mut cursor = self.head(side);

        loop {
            let node = &self.orders[self.index[&cursor]];
            if node.is_sentinel() || side.ranks_ahead(order.price, node.price) {
                break;
            }
            prev = Some(cursor);
            cursor = node.next;
        }

        let id = order.id;
        order.next = cursor;
        let key = self.orders.insert(order);
        self.index.insert(id, key);

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.get_mut(prev_id) {
                    prev_node.next = id;
                }
            }
            None => self.set_head(side, id),
        }

        match side {
            Side::Buy => self.bid_count += 1,
            Side::Sell => self.ask_count += 1,
        }

        id
    }

    /// Detach the head of `side`.
    ///
    /// Returns the head record. For a real order the head advances to its
    /// successor and the record leaves the store; the sentinel is returned
    /// as a copy and stays in place.
    pub fn pop_head(&mut self, side: Side) -> Order {
        let head_id = self.head(side);
        if head_id == side.sentinel_id() {
            return Order::sentinel(side);
        }

        let key = self.index[&head_id];
        let order = self.orders.remove(key);
        self.index.remove(&head_id);
        self.set_head(side, order.next);
        self.decrement(side);
        order
    }

    /// Consume `qty` from the head of `side`.
    ///
    /// A partial fill reduces `amount` in place without relinking; a full
    /// fill detaches the head. Returns the head's remaining amount.
    pub fn consume_head(&mut self, side: Side, qty: u64) -> u64 {
        let head_id = self.head(side);
        let remaining = match self.get_mut(head_id) {
            Some(head) if !head.is_sentinel() => {
                head.fill(qty);
                head.amount
            }
            _ => return 0,
        };

        if remaining == 0 {
            self.pop_head(side);
        }
        remaining
    }

    /// Remove an arbitrary live order from `side`'s list. O(depth).
    pub fn unlink(&mut self, side: Side, id: u64) -> Option<Order> {
        if !self.contains_order(id) {
            return None;
        }
        if self.head(side) == id {
            return Some(self.pop_head(side));
        }

        let mut prev = self.head(side);
        loop {
            let node = self.get_by_id(prev)?;
            if node.is_sentinel() {
                return None;
            }
            if node.next == id {
                break;
            }
            prev = node.next;
        }

        let key = self.index.remove(&id)?;
        let order = self.orders.remove(key);
        if let Some(prev_node) = self.get_mut(prev) {
            prev_node.next = order.next;
        }
        self.decrement(side);
        Some(order)
    }

    fn decrement(&mut self, side: Side) {
        match side {
            Side::Buy => self.bid_count = self.bid_count.saturating_sub(1),
            Side::Sell => self.ask_count = self.ask_count.saturating_sub(1),
        }
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Walk both lists and verify the book invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for side in [Side::Buy, Side::Sell] {
            let mut seen = std::collections::HashSet::new();
            let mut prev: Option<&Order> = None;
            let mut cursor = self.head(side);

            loop {
                let node = self
                    .get_by_id(cursor)
                    .ok_or(InvariantViolation::DanglingLink { side, id: cursor })?;
                if node.is_sentinel() {
                    if node.id != side.sentinel_id() {
                        return Err(InvariantViolation::WrongSide { side, id: node.id });
                    }
                    break;
                }
                if !seen.insert(node.id) {
                    return Err(InvariantViolation::Cycle { side, id: node.id });
                }
                if node.amount == 0 {
                    return Err(InvariantViolation::EmptyOrder { id: node.id });
                }
                if node.side() != side {
                    return Err(InvariantViolation::WrongSide { side, id: node.id });
                }
                if let Some(p) = prev {
                    let ordered = side.ranks_ahead(p.price, node.price)
                        || (p.price == node.price && p.id < node.id);
                    if !ordered {
                        return Err(InvariantViolation::OutOfOrder { side, id: node.id });
                    }
                }
                prev = Some(node);
                cursor = node.next;
            }

            if seen.len() != self.len(side) {
                return Err(InvariantViolation::CountMismatch {
                    side,
                    counted: self.len(side),
                    linked: seen.len(),
                });
            }
        }
        Ok(())
    }

    /// SHA-256 over the SSZ encoding of every live order, bids then asks,
    /// each in book order.
    pub fn compute_state_root(&self) -> Result<[u8; 32], EngineError> {
        let mut hasher = Sha256::new();
        for side in [Side::Buy, Side::Sell] {
            hasher.update([side.to_u8()]);
            for order in self.iter(side) {
                let bytes = ssz_rs::serialize(order)
                    .map_err(|e| EngineError::Encoding(format!("{e:?}")))?;
                hasher.update(&bytes);
            }
        }
        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
