//! Crossing detection and fill planning.
//!
//! Planning is read-only: it walks the opposite side from its head and
//! decides which resting orders the incoming order consumes, at what price
//! and quantity. The engine settles the plan first and applies it to the
//! book only once settlement has committed.

use crate::orderbook::OrderStore;
use crate::settlement::SettlementLeg;
use crate::types::price::notional;
use crate::types::{AccountId, PricingRule, Side, Trade};

/// Check if an incoming order crosses a resting order on the opposite side
///
/// - Buy crosses an ask priced at or below its limit
/// - Sell crosses a bid priced at or above its limit
#[inline]
pub fn crosses(incoming_side: Side, incoming_price: u64, resting_price: u64) -> bool {
    match incoming_side {
        Side::Buy => resting_price <= incoming_price,
        Side::Sell => resting_price >= incoming_price,
    }
}

/// One resting order the incoming order will consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedFill {
    pub maker_order_id: u64,
    pub maker: AccountId,
    pub maker_price: u64,
    /// Execution price
    pub price: u64,
    pub qty: u64,
}

/// The incoming side of a placement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Taker {
    pub account: AccountId,
    pub side: Side,
    pub price: u64,
}

impl PlannedFill {
    /// Value movement for this fill.
    ///
    /// The buyer escrowed at its own limit, so any gap between that limit
    /// and the execution price comes back as a refund.
    pub fn leg(&self, taker: Taker) -> SettlementLeg {
        let buyer_limit = match taker.side {
            Side::Buy => taker.price,
            Side::Sell => self.maker_price,
        };
        SettlementLeg {
            maker: self.maker,
            taker: taker.account,
            taker_side: taker.side,
            base_qty: self.qty,
            quote_qty: notional(self.price, self.qty),
            buyer_refund: notional(buyer_limit.saturating_sub(self.price), self.qty),
        }
    }

    pub fn trade(&self, taker: Taker, taker_order_id: u64) -> Trade {
        let (buy_order_id, sell_order_id) = match taker.side {
            Side::Buy => (taker_order_id, self.maker_order_id),
            Side::Sell => (self.maker_order_id, taker_order_id),
        };
        Trade {
            buy_order_id,
            sell_order_id,
            maker: self.maker,
            taker: taker.account,
            taker_side: taker.side,
            price: self.price,
            quantity: self.qty,
        }
    }
}

/// Resting orders consumed by `amount` at `price`, best first.
///
/// Stops when the amount is exhausted, the opposite side runs out, or the
/// next resting order no longer crosses. Only the last fill can be partial.
pub(crate) fn plan_fills(
    store: &OrderStore,
    taker: Taker,
    amount: u64,
    pricing: PricingRule,
) -> Vec<PlannedFill> {
    let mut remaining = amount;
    let mut fills = Vec::new();

    for resting in store.iter(taker.side.opposite()) {
        if remaining == 0 || !crosses(taker.side, taker.price, resting.price) {
            break;
        }
        let qty = remaining.min(resting.amount);
        fills.push(PlannedFill {
            maker_order_id: resting.id,
            maker: resting.maker,
            maker_price: resting.price,
            price: pricing.execution_price(resting.price, taker.price),
            qty,
        });
        remaining -= qty;
    }

    fills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Order;

    fn book(side: Side, levels: &[(u64, u64)]) -> OrderStore {
        let mut store = OrderStore::new();
        for &(price, amount) in levels {
            let id = store.allocate_id();
            store.insert(Order::new(id, 50, side, price, amount));
        }
        store
    }

    fn taker(side: Side, price: u64) -> Taker {
        Taker {
            account: 60,
            side,
            price,
        }
    }

    #[test]
    fn test_crosses() {
        assert!(crosses(Side::Buy, 12, 10));
        assert!(crosses(Side::Buy, 10, 10));
        assert!(!crosses(Side::Buy, 9, 10));

        assert!(crosses(Side::Sell, 9, 12));
        assert!(crosses(Side::Sell, 12, 12));
        assert!(!crosses(Side::Sell, 13, 12));
    }

    #[test]
    fn test_plan_walks_best_first() {
        // Bids 12 x3, 10 x2; sell 5 @ 9 takes both
        let store = book(Side::Buy, &[(12, 3), (10, 2)]);
        let fills = plan_fills(&store, taker(Side::Sell, 9), 5, PricingRule::Maker);

        assert_eq!(fills.len(), 2);
        assert_eq!((fills[0].price, fills[0].qty), (12, 3));
        assert_eq!((fills[1].price, fills[1].qty), (10, 2));
    }

    #[test]
    fn test_plan_stops_at_non_crossing() {
        let store = book(Side::Sell, &[(10, 2), (14, 5)]);
        let fills = plan_fills(&store, taker(Side::Buy, 13), 5, PricingRule::Maker);

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].qty, 2);
    }

    #[test]
    fn test_plan_partial_last_fill() {
        let store = book(Side::Sell, &[(10, 2), (11, 5)]);
        let fills = plan_fills(&store, taker(Side::Buy, 11), 4, PricingRule::Maker);

        assert_eq!(fills.iter().map(|f| f.qty).collect::<Vec<_>>(), vec![2, 2]);
        // Planning never touches the book
        assert_eq!(store.iter(Side::Sell).map(|o| o.amount).sum::<u64>(), 7);
    }

    #[test]
    fn test_plan_empty_book() {
        let store = OrderStore::new();
        assert!(plan_fills(&store, taker(Side::Buy, 100), 1, PricingRule::Maker).is_empty());
    }

    #[test]
    fn test_leg_refunds_taker_buyer() {
        let store = book(Side::Sell, &[(10, 2)]);
        let buy = taker(Side::Buy, 13);
        let fills = plan_fills(&store, buy, 2, PricingRule::Maker);
        let leg = fills[0].leg(buy);

        assert_eq!(leg.quote_qty, 20);
        assert_eq!(leg.buyer_refund, 6);
        assert_eq!(leg.buyer(), 60);
        assert_eq!(leg.seller(), 50);
    }

    #[test]
    fn test_leg_midpoint_refunds_maker_buyer() {
        let store = book(Side::Buy, &[(12, 2)]);
        let sell = taker(Side::Sell, 9);
        let fills = plan_fills(&store, sell, 2, PricingRule::Midpoint);
        let leg = fills[0].leg(sell);

        assert_eq!(fills[0].price, 10);
        assert_eq!(leg.quote_qty, 20);
        assert_eq!(leg.buyer_refund, 4);
        assert_eq!(leg.buyer(), 50);
    }

    #[test]
    fn test_trade_ids_by_taker_side() {
        let store = book(Side::Buy, &[(12, 1)]);
        let sell = taker(Side::Sell, 12);
        let fills = plan_fills(&store, sell, 1, PricingRule::Maker);
        let trade = fills[0].trade(sell, 9);

        assert_eq!(trade.buy_order_id, 2);
        assert_eq!(trade.sell_order_id, 9);
        assert_eq!(trade.maker_order_id(), 2);
    }
}
