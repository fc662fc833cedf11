//! The matching engine: placement, crossing and cancellation.
//!
//! ## Placement
//!
//! 1. Validate the request and resolve its funding
//! 2. Plan fills against the opposite side (read-only)
//! 3. Inside a settlement transaction: reserve the taker's commitment, then
//!    settle one leg per planned fill
//! 4. Commit, then apply the plan: consume resting orders, insert the residual
//! 5. Emit trade events in execution order, then the order-placed event
//!
//! Any failure in step 3 rolls the transaction back and returns the error
//! with the book, the id counter and the sink untouched.

use tracing::{debug, error, warn};

use super::crossing::{plan_fills, PlannedFill, Taker};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{EventSink, OrderCancelled, OrderPlaced, TradeExecuted};
use crate::orderbook::{depth, InvariantViolation, OrderStore};
use crate::settlement::{Asset, Funding, Settlement};
use crate::types::price::commitment;
use crate::types::{AccountId, Order, PlacementOutcome, Side};

/// A limit order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOrder {
    pub side: Side,
    pub maker: AccountId,
    pub price: u64,
    pub amount: u64,
    /// Value supplied with the request (attached funding mode only)
    pub attached_value: Option<u128>,
}

impl PlaceOrder {
    pub fn new(side: Side, maker: AccountId, price: u64, amount: u64) -> Self {
        Self {
            side,
            maker,
            price,
            amount,
            attached_value: None,
        }
    }

    pub fn buy(maker: AccountId, price: u64, amount: u64) -> Self {
        Self::new(Side::Buy, maker, price, amount)
    }

    pub fn sell(maker: AccountId, price: u64, amount: u64) -> Self {
        Self::new(Side::Sell, maker, price, amount)
    }

    /// Attach `value` to the request
    pub fn with_value(mut self, value: u128) -> Self {
        self.attached_value = Some(value);
        self
    }
}

/// Single-pair limit order book engine.
///
/// Generic over the ledger it settles through and the sink it reports to.
/// All operations take `&mut self` and run to completion, so a host sharing
/// the engine across threads wraps it in a lock.
///
/// ## Example
///
/// ```
/// use orderbook_engine::config::EngineConfig;
/// use orderbook_engine::engine::MatchingEngine;
/// use orderbook_engine::events::NoopSink;
/// use orderbook_engine::settlement::{Asset, InMemoryLedger};
///
/// let mut ledger = InMemoryLedger::new("TKA", "TKB");
/// ledger.deposit(1, Asset::Base, 10).unwrap();
/// ledger.deposit(2, Asset::Quote, 100).unwrap();
///
/// let mut engine = MatchingEngine::new(EngineConfig::default(), ledger, NoopSink);
/// engine.place_sell_order(1, 10, 2).unwrap();
/// let outcome = engine.place_buy_order(2, 12, 2).unwrap();
///
/// assert!(outcome.is_fully_filled());
/// assert_eq!(outcome.trades[0].price, 10);
/// ```
#[derive(Debug)]
pub struct MatchingEngine<S: Settlement, E: EventSink> {
    store: OrderStore,
    settlement: S,
    sink: E,
    config: EngineConfig,
}

impl<S: Settlement, E: EventSink> MatchingEngine<S, E> {
    pub fn new(config: EngineConfig, settlement: S, sink: E) -> Self {
        Self {
            store: OrderStore::with_capacity(config.order_capacity),
            settlement,
            sink,
            config,
        }
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Place a limit order funded per the configured mode (no attached value)
    pub fn place_order(
        &mut self,
        side: Side,
        maker: AccountId,
        price: u64,
        amount: u64,
    ) -> Result<PlacementOutcome, EngineError> {
        self.place(PlaceOrder::new(side, maker, price, amount))
    }

    pub fn place_buy_order(
        &mut self,
        maker: AccountId,
        price: u64,
        amount: u64,
    ) -> Result<PlacementOutcome, EngineError> {
        self.place_order(Side::Buy, maker, price, amount)
    }

    pub fn place_sell_order(
        &mut self,
        maker: AccountId,
        price: u64,
        amount: u64,
    ) -> Result<PlacementOutcome, EngineError> {
        self.place_order(Side::Sell, maker, price, amount)
    }

    /// `place_order` keyed by an `is_buy` flag
    pub fn place_order_is_buy(
        &mut self,
        is_buy: bool,
        maker: AccountId,
        price: u64,
        amount: u64,
    ) -> Result<PlacementOutcome, EngineError> {
        self.place_order(Side::from_is_buy(is_buy), maker, price, amount)
    }

    /// Match `request` against the book and rest any remainder.
    ///
    /// # Errors
    ///
    /// - `InvalidOrder` for a zero price or amount, or value attached where
    ///   the funding mode accepts none
    /// - `InsufficientFunds` if the commitment cannot be reserved
    /// - `SettlementFailure` if any leg fails
    ///
    /// On error nothing has changed.
    pub fn place(&mut self, request: PlaceOrder) -> Result<PlacementOutcome, EngineError> {
        let funding = self.validate(&request).inspect_err(|err| {
            warn!(target: "engine", maker = request.maker, error = %err, "order rejected");
        })?;

        let taker = Taker {
            account: request.maker,
            side: request.side,
            price: request.price,
        };
        let fills = plan_fills(&self.store, taker, request.amount, self.config.pricing);

        self.settlement.begin();
        let settled = self
            .settle(&request, funding, taker, &fills)
            .and_then(|()| self.settlement.commit().map_err(EngineError::from));
        if let Err(err) = settled {
            if let Err(rollback_err) = self.settlement.rollback() {
                error!(target: "engine", error = %rollback_err, "settlement rollback failed");
            }
            warn!(
                target: "engine",
                maker = request.maker,
                side = ?request.side,
                price = request.price,
                amount = request.amount,
                error = %err,
                "placement aborted"
            );
            return Err(err);
        }

        let outcome = self.apply(&request, taker, &fills);
        self.publish(&request, &outcome);
        debug_assert!(self.store.check_invariants().is_ok());

        Ok(outcome)
    }

    fn validate(&self, request: &PlaceOrder) -> Result<Funding, EngineError> {
        if request.price == 0 {
            return Err(EngineError::InvalidOrder("price must be positive".to_string()));
        }
        if request.amount == 0 {
            return Err(EngineError::InvalidOrder("amount must be positive".to_string()));
        }
        self.config
            .funding
            .funding_for(request.side, request.attached_value)
            .ok_or_else(|| {
                EngineError::InvalidOrder(format!(
                    "{:?} order does not accept attached value in {:?} mode",
                    request.side, self.config.funding
                ))
            })
    }

    /// Reserve the commitment and settle every planned leg
    fn settle(
        &mut self,
        request: &PlaceOrder,
        funding: Funding,
        taker: Taker,
        fills: &[PlannedFill],
    ) -> Result<(), EngineError> {
        self.settlement.reserve(
            request.maker,
            Asset::committed_by(request.side),
            commitment(request.side, request.price, request.amount),
            funding,
        )?;
        for fill in fills {
            self.settlement.settle_leg(&fill.leg(taker))?;
        }
        Ok(())
    }

    /// Apply a settled plan to the book
    fn apply(&mut self, request: &PlaceOrder, taker: Taker, fills: &[PlannedFill]) -> PlacementOutcome {
        let order_id = self.store.allocate_id();
        let resting_side = request.side.opposite();
        let mut remaining = request.amount;
        let mut trades = Vec::with_capacity(fills.len());

        for fill in fills {
            debug_assert_eq!(self.store.head(resting_side), fill.maker_order_id);
            self.store.consume_head(resting_side, fill.qty);
            remaining -= fill.qty;

            let trade = fill.trade(taker, order_id);
            debug!(
                target: "engine",
                buy_order_id = trade.buy_order_id,
                sell_order_id = trade.sell_order_id,
                price = trade.price,
                qty = trade.quantity,
                "matched"
            );
            trades.push(trade);
        }

        let residual = (remaining > 0).then(|| {
            let mut order = Order::new(order_id, request.maker, request.side, request.price, remaining);
            // Original size, so the residual reports what filled on arrival
            order.quantity = request.amount;
            self.store.insert(order.clone());
            self.store.get_by_id(order_id).cloned().unwrap_or(order)
        });

        debug!(
            target: "engine",
            order_id,
            side = ?request.side,
            price = request.price,
            filled = request.amount - remaining,
            resting = remaining,
            "order placed"
        );

        PlacementOutcome {
            order_id,
            side: request.side,
            requested: request.amount,
            trades,
            residual,
        }
    }

    fn publish(&mut self, request: &PlaceOrder, outcome: &PlacementOutcome) {
        for trade in &outcome.trades {
            self.sink.on_trade(&TradeExecuted {
                buy_order_id: trade.buy_order_id,
                sell_order_id: trade.sell_order_id,
                price: trade.price,
                qty: trade.quantity,
            });
        }
        self.sink.on_order_placed(&OrderPlaced {
            id: outcome.order_id,
            side: request.side,
            maker: request.maker,
            price: request.price,
            amount: request.amount,
        });
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Withdraw a resting order and release its remaining escrow.
    ///
    /// Only the order's maker may cancel it. Returns the removed order.
    pub fn cancel_order(&mut self, caller: AccountId, id: u64) -> Result<Order, EngineError> {
        let order = self.try_get_order(id)?.clone();
        if order.maker != caller {
            warn!(target: "engine", id, caller, "cancel by non-owner rejected");
            return Err(EngineError::NotOwner { id });
        }

        let side = order.side();
        self.settlement.begin();
        let released = self
            .settlement
            .release(
                order.maker,
                Asset::committed_by(side),
                commitment(side, order.price, order.amount),
            )
            .and_then(|()| self.settlement.commit());
        if let Err(err) = released {
            if let Err(rollback_err) = self.settlement.rollback() {
                error!(target: "engine", error = %rollback_err, "settlement rollback failed");
            }
            return Err(err.into());
        }

        let removed = self.store.unlink(side, id).unwrap_or(order);
        debug!(target: "engine", id, amount = removed.amount, "order cancelled");
        self.sink.on_order_cancelled(&OrderCancelled {
            id,
            side,
            maker: removed.maker,
            amount: removed.amount,
        });
        Ok(removed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Stored record for `id`.
    ///
    /// Never fails: unknown and terminal ids yield a zero record (the bid
    /// sentinel), as does id 0 itself.
    pub fn get_order_by_id(&self, id: u64) -> Order {
        self.store
            .get_by_id(id)
            .cloned()
            .unwrap_or_else(|| Order::sentinel(Side::Buy))
    }

    /// Live order `id`, or `NotFound` for sentinels and unknown/terminal ids
    pub fn try_get_order(&self, id: u64) -> Result<&Order, EngineError> {
        if !self.store.contains_order(id) {
            return Err(EngineError::NotFound(id));
        }
        self.store.get_by_id(id).ok_or(EngineError::NotFound(id))
    }

    /// Head of the bid list (0 when empty)
    pub fn highest_buy_order_id(&self) -> u64 {
        self.store.head(Side::Buy)
    }

    /// Head of the ask list (1 when empty)
    pub fn lowest_sell_order_id(&self) -> u64 {
        self.store.head(Side::Sell)
    }

    /// Bids, best first
    pub fn buy_orders(&self) -> Vec<Order> {
        self.store.iter(Side::Buy).cloned().collect()
    }

    /// Asks, best first
    pub fn sell_orders(&self) -> Vec<Order> {
        self.store.iter(Side::Sell).cloned().collect()
    }

    pub fn best_bid(&self) -> Option<u64> {
        self.store.best_price(Side::Buy)
    }

    pub fn best_ask(&self) -> Option<u64> {
        self.store.best_price(Side::Sell)
    }

    /// Best ask minus best bid, `None` unless both sides are populated
    pub fn spread(&self) -> Option<u64> {
        self.best_ask()?.checked_sub(self.best_bid()?)
    }

    /// Aggregated `(price, quantity)` levels of `side`, best first
    pub fn depth(&self, side: Side, levels: usize) -> Vec<(u64, u128)> {
        depth(self.store.iter(side), levels)
    }

    /// Id the next accepted placement will receive
    pub fn next_order_id(&self) -> u64 {
        self.store.peek_next_order_id()
    }

    /// Digest of both books (see [`OrderStore::compute_state_root`])
    pub fn state_root(&self) -> Result<[u8; 32], EngineError> {
        self.store.compute_state_root()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.store.check_invariants()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn settlement(&self) -> &S {
        &self.settlement
    }

    pub fn settlement_mut(&mut self) -> &mut S {
        &mut self.settlement
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
