//! Traversal of one side of the book.

use crate::orderbook::OrderStore;
use crate::types::Order;

/// Iterator over a side list, best order first.
///
/// Stops at the first record with zero amount, which is always the side's
/// sentinel.
pub struct BookIter<'a> {
    store: &'a OrderStore,
    cursor: u64,
}

impl<'a> BookIter<'a> {
    pub(crate) fn new(store: &'a OrderStore, head: u64) -> Self {
        Self { store, cursor: head }
    }
}

impl<'a> Iterator for BookIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let order = self.store.get_by_id(self.cursor)?;
        if order.amount == 0 {
            return None;
        }
        self.cursor = order.next;
        Some(order)
    }
}

/// Aggregated quantity per price, best price first.
///
/// Consecutive orders at the same price collapse into one level, which is
/// what an order list display needs. Level totals are widened to `u128`
/// since several `u64` amounts can share a price.
pub fn depth(iter: BookIter<'_>, levels: usize) -> Vec<(u64, u128)> {
    let mut out: Vec<(u64, u128)> = Vec::new();
    for order in iter {
        match out.last_mut() {
            Some((price, qty)) if *price == order.price => *qty += order.amount as u128,
            _ => {
                if out.len() == levels {
                    break;
                }
                out.push((order.price, order.amount as u128));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    #[test]
    fn test_iter_empty_side() {
        let store = OrderStore::new();
        assert_eq!(store.iter(Side::Buy).count(), 0);
        assert_eq!(store.iter(Side::Sell).count(), 0);
    }

    #[test]
    fn test_depth_aggregates_levels() {
        let mut store = OrderStore::new();
        for (price, amount) in [(10, 1), (11, 2), (10, 3), (12, 4)] {
            let id = store.allocate_id();
            store.insert(Order::new(id, 1, Side::Sell, price, amount));
        }

        assert_eq!(
            depth(store.iter(Side::Sell), 10),
            vec![(10, 4), (11, 2), (12, 4)]
        );
        assert_eq!(depth(store.iter(Side::Sell), 2), vec![(10, 4), (11, 2)]);
        assert!(depth(store.iter(Side::Buy), 5).is_empty());
    }

    #[test]
    fn test_depth_level_exceeding_u64() {
        let mut store = OrderStore::new();
        for amount in [u64::MAX, u64::MAX, 5] {
            let id = store.allocate_id();
            store.insert(Order::new(id, 1, Side::Sell, 10, amount));
        }

        let expected = 2 * u64::MAX as u128 + 5;
        assert_eq!(depth(store.iter(Side::Sell), 1), vec![(10, expected)]);
    }
}
