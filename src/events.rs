//! Facts reported by the engine after a placement or cancellation commits.
//!
//! Sinks are purely observational: they return nothing and cannot fail or
//! alter the operation that produced the event. Trade facts for a placement
//! are delivered in execution order, followed by its `OrderPlaced` fact.

use tracing::info;

use crate::types::{AccountId, Side};

/// A placement was accepted. Carries the request as submitted, not the residual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlaced {
    pub id: u64,
    pub side: Side,
    pub maker: AccountId,
    pub price: u64,
    pub amount: u64,
}

impl OrderPlaced {
    #[inline]
    pub fn is_buy(&self) -> bool {
        self.side.is_buy()
    }
}

/// One matched leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeExecuted {
    pub buy_order_id: u64,
    pub sell_order_id: u64,
    pub price: u64,
    pub qty: u64,
}

/// A resting order was withdrawn by its maker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCancelled {
    pub id: u64,
    pub side: Side,
    pub maker: AccountId,
    /// Quantity that was still resting
    pub amount: u64,
}

/// Receiver of engine events.
pub trait EventSink {
    fn on_order_placed(&mut self, event: &OrderPlaced);

    fn on_trade(&mut self, event: &TradeExecuted);

    fn on_order_cancelled(&mut self, _event: &OrderCancelled) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_order_placed(&mut self, _event: &OrderPlaced) {}

    fn on_trade(&mut self, _event: &TradeExecuted) {}
}

/// Any event the engine can emit, in the order it was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    OrderPlaced(OrderPlaced),
    TradeExecuted(TradeExecuted),
    OrderCancelled(OrderCancelled),
}

/// Keeps an in-memory log of every event.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<EngineEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events, oldest first
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn placements(&self) -> impl Iterator<Item = &OrderPlaced> {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::OrderPlaced(p) => Some(p),
            _ => None,
        })
    }

    pub fn trades(&self) -> impl Iterator<Item = &TradeExecuted> {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::TradeExecuted(t) => Some(t),
            _ => None,
        })
    }

    pub fn cancellations(&self) -> impl Iterator<Item = &OrderCancelled> {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::OrderCancelled(c) => Some(c),
            _ => None,
        })
    }

    /// Drop everything recorded so far
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn on_order_placed(&mut self, event: &OrderPlaced) {
        self.events.push(EngineEvent::OrderPlaced(event.clone()));
    }

    fn on_trade(&mut self, event: &TradeExecuted) {
        self.events.push(EngineEvent::TradeExecuted(event.clone()));
    }

    fn on_order_cancelled(&mut self, event: &OrderCancelled) {
        self.events.push(EngineEvent::OrderCancelled(event.clone()));
    }
}

/// Emits one structured log line per event under the `events` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_order_placed(&mut self, event: &OrderPlaced) {
        info!(
            target: "events",
            id = event.id,
            is_buy = event.is_buy(),
            maker = event.maker,
            price = event.price,
            amount = event.amount,
            "order placed"
        );
    }

    fn on_trade(&mut self, event: &TradeExecuted) {
        info!(
            target: "events",
            buy_order_id = event.buy_order_id,
            sell_order_id = event.sell_order_id,
            price = event.price,
            qty = event.qty,
            "trade"
        );
    }

    fn on_order_cancelled(&mut self, event: &OrderCancelled) {
        info!(
            target: "events",
            id = event.id,
            side = ?event.side,
            maker = event.maker,
            amount = event.amount,
            "order cancelled"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.on_trade(&TradeExecuted {
            buy_order_id: 3,
            sell_order_id: 2,
            price: 10,
            qty: 1,
        });
        sink.on_order_placed(&OrderPlaced {
            id: 3,
            side: Side::Buy,
            maker: 7,
            price: 12,
            amount: 1,
        });

        assert!(matches!(sink.events()[0], EngineEvent::TradeExecuted(_)));
        assert!(matches!(sink.events()[1], EngineEvent::OrderPlaced(_)));
        assert_eq!(sink.trades().count(), 1);
        assert!(sink.placements().all(OrderPlaced::is_buy));
        assert_eq!(sink.cancellations().count(), 0);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_noop_sink_ignores_cancellations() {
        let mut sink = NoopSink;
        sink.on_order_cancelled(&OrderCancelled {
            id: 2,
            side: Side::Sell,
            maker: 1,
            amount: 4,
        });
    }
}
