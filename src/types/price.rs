//! Price and quantity arithmetic.
//!
//! ## Overview
//!
//! Prices are integers expressed in quote units per base unit and amounts
//! are integers in base units. Quote values (`price * amount`) are computed
//! in `u128`, which cannot overflow for any pair of `u64` operands.
//!
//! Averages are reported as [`Decimal`] so that no floating point ever
//! enters the accounting path.
//!
//! ## Examples
//!
//! ```
//! use orderbook_engine::types::price::{notional, PricingRule};
//!
//! assert_eq!(notional(12, 2), 24);
//! assert_eq!(PricingRule::Maker.execution_price(12, 10), 12);
//! assert_eq!(PricingRule::Midpoint.execution_price(12, 9), 10);
//! ```

use rust_decimal::Decimal;
use serde::Deserialize;

use super::order::Side;

// ============================================================================
// Pricing rule
// ============================================================================

/// How the execution price of a matched leg is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingRule {
    /// The resting order's price; price improvement accrues to the taker
    #[default]
    Maker,
    /// Floor of the mean of maker and taker prices; improvement is shared
    Midpoint,
}

impl PricingRule {
    /// Execution price for a leg between a resting and an incoming order.
    ///
    /// Callers only invoke this for crossing prices, so the result always lies
    /// between the two limits (inclusive).
    #[inline]
    pub fn execution_price(self, maker_price: u64, taker_price: u64) -> u64 {
        match self {
            PricingRule::Maker => maker_price,
            PricingRule::Midpoint => midpoint(maker_price, taker_price),
        }
    }
}

// ============================================================================
// Arithmetic Functions
// ============================================================================

/// Quote value of `amount` base units at `price`
#[inline]
pub fn notional(price: u64, amount: u64) -> u128 {
    (price as u128) * (amount as u128)
}

/// Value a placement must lock up front.
///
/// - Buy: `price * amount` of the quote asset
/// - Sell: `amount` of the base asset
#[inline]
pub fn commitment(side: Side, price: u64, amount: u64) -> u128 {
    match side {
        Side::Buy => notional(price, amount),
        Side::Sell => amount as u128,
    }
}

/// `floor((a + b) / 2)` without intermediate overflow
#[inline]
pub fn midpoint(a: u64, b: u64) -> u64 {
    (a & b) + ((a ^ b) >> 1)
}

/// Volume-weighted average price of a set of fills.
///
/// # Returns
///
/// * `Some(Decimal)` - `quote_total / base_total`
/// * `None` - If nothing was filled or the values do not fit a Decimal
pub fn average_price(quote_total: u128, base_total: u64) -> Option<Decimal> {
    if base_total == 0 {
        return None;
    }
    let quote = Decimal::try_from_i128_with_scale(i128::try_from(quote_total).ok()?, 0).ok()?;
    quote.checked_div(Decimal::from(base_total))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_notional() {
        assert_eq!(notional(10, 2), 20);
        assert_eq!(notional(0, 5), 0);
        assert_eq!(
            notional(u64::MAX, 2),
            (u64::MAX as u128) * 2,
            "quote values must not wrap"
        );
    }

    #[test]
    fn test_commitment_by_side() {
        assert_eq!(commitment(Side::Buy, 12, 2), 24);
        assert_eq!(commitment(Side::Sell, 12, 2), 2);
    }

    #[test]
    fn test_midpoint_floors() {
        assert_eq!(midpoint(12, 10), 11);
        assert_eq!(midpoint(12, 9), 10);
        assert_eq!(midpoint(9, 10), 9);
        assert_eq!(midpoint(7, 7), 7);
        assert_eq!(midpoint(u64::MAX, u64::MAX - 1), u64::MAX - 1);
    }

    #[test]
    fn test_pricing_rules() {
        // Resting buy at 12, incoming sell at 10
        assert_eq!(PricingRule::Maker.execution_price(12, 10), 12);
        assert_eq!(PricingRule::Midpoint.execution_price(12, 10), 11);

        // Resting sell at 10, incoming buy at 13
        assert_eq!(PricingRule::Maker.execution_price(10, 13), 10);
        assert_eq!(PricingRule::Midpoint.execution_price(10, 13), 11);
    }

    #[test]
    fn test_average_price() {
        assert_eq!(average_price(0, 0), None);
        assert_eq!(average_price(48, 5), Some(Decimal::from_str("9.6").unwrap()));
        assert_eq!(average_price(24, 2), Some(Decimal::from(12)));
    }
}
