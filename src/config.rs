//! Engine configuration.
//!
//! Every field has a default, so an empty source yields
//! [`EngineConfig::default`]. Environment variables use the `ORDERBOOK_`
//! prefix, e.g. `ORDERBOOK_PRICING=midpoint`.

use serde::Deserialize;

use crate::settlement::Funding;
use crate::types::{PricingRule, Side};

const ENV_PREFIX: &str = "ORDERBOOK";

/// How placements pay for their escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingMode {
    /// Escrow is drawn from a pre-approved ledger balance
    #[default]
    Approved,
    /// Value is attached to each buy placement
    Attached,
}

impl FundingMode {
    /// Funding for a `side` request carrying `attached` value.
    ///
    /// Sells always escrow base from the approved balance. Returns `None`
    /// when value is attached where none is accepted: any request in
    /// approved mode, or a sell in attached mode. A buy without value in
    /// attached mode is funded with zero.
    pub fn funding_for(self, side: Side, attached: Option<u128>) -> Option<Funding> {
        match (self, side, attached) {
            (FundingMode::Attached, Side::Buy, value) => {
                Some(Funding::Attached(value.unwrap_or(0)))
            }
            (_, _, None) => Some(Funding::Approved),
            _ => None,
        }
    }
}

/// Matching engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Symbol of the traded asset (see [`crate::settlement::InMemoryLedger::from_config`])
    pub base_symbol: String,
    /// Symbol prices are quoted in
    pub quote_symbol: String,
    /// Execution price rule for matched legs
    pub pricing: PricingRule,
    /// Funding mode for the quote side
    pub funding: FundingMode,
    /// Initial order store capacity
    pub order_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_symbol: "TKA".to_string(),
            quote_symbol: "TKB".to_string(),
            pricing: PricingRule::Maker,
            funding: FundingMode::Approved,
            order_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        cfg.try_deserialize()
    }

    /// Load configuration from file, overridden by environment variables
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        cfg.try_deserialize()
    }

    pub fn with_pricing(mut self, pricing: PricingRule) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn with_funding(mut self, funding: FundingMode) -> Self {
        self.funding = funding;
        self
    }

    pub fn with_symbols(mut self, base: impl Into<String>, quote: impl Into<String>) -> Self {
        self.base_symbol = base.into();
        self.quote_symbol = quote.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.base_symbol, "TKA");
        assert_eq!(cfg.quote_symbol, "TKB");
        assert_eq!(cfg.pricing, PricingRule::Maker);
        assert_eq!(cfg.funding, FundingMode::Approved);
        assert_eq!(cfg.order_capacity, 1024);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let cfg: EngineConfig = config::Config::builder()
            .set_override("pricing", "midpoint")
            .unwrap()
            .set_override("quote_symbol", "ETH")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.pricing, PricingRule::Midpoint);
        assert_eq!(cfg.quote_symbol, "ETH");
        assert_eq!(cfg.base_symbol, "TKA");
        assert_eq!(cfg.funding, FundingMode::Approved);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = EngineConfig::from_file("does-not-exist/orderbook").unwrap();
        assert_eq!(cfg.order_capacity, EngineConfig::default().order_capacity);
    }

    #[test]
    fn test_funding_for_request() {
        use FundingMode::{Approved, Attached};

        assert_eq!(Approved.funding_for(Side::Buy, None), Some(Funding::Approved));
        assert_eq!(Approved.funding_for(Side::Sell, None), Some(Funding::Approved));
        assert_eq!(Approved.funding_for(Side::Buy, Some(5)), None);

        assert_eq!(Attached.funding_for(Side::Buy, Some(5)), Some(Funding::Attached(5)));
        assert_eq!(Attached.funding_for(Side::Buy, None), Some(Funding::Attached(0)));
        assert_eq!(Attached.funding_for(Side::Sell, None), Some(Funding::Approved));
        assert_eq!(Attached.funding_for(Side::Sell, Some(5)), None);
    }
}
