//! In-memory ledger implementing [`Settlement`].
//!
//! Tracks, per account and asset, an available balance and an escrowed
//! balance. Placements move value from available to escrow; matched legs
//! move it out of escrow to the counterparty.
//!
//! Writes made inside a transaction are journaled with the balance they
//! replaced, so a rollback restores the exact prior state.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{Asset, Funding, Settlement, SettlementLeg};
use crate::config::EngineConfig;
use crate::error::SettlementError;
use crate::types::AccountId;

/// Available and locked value of one asset for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Balance {
    available: u128,
    escrowed: u128,
}

/// Balance sheet for both assets of a trading pair.
#[derive(Debug)]
pub struct InMemoryLedger {
    /// Balances: account -> (asset -> balance)
    balances: HashMap<AccountId, HashMap<Asset, Balance>>,
    base_symbol: String,
    quote_symbol: String,
    /// Prior balances touched inside the open transaction
    journal: Option<Vec<(AccountId, Asset, Balance)>>,
    /// Fault injection: legs left before `settle_leg` starts failing
    legs_until_failure: Option<usize>,
}

impl InMemoryLedger {
    /// Create an empty ledger for a base/quote pair
    pub fn new(base_symbol: impl Into<String>, quote_symbol: impl Into<String>) -> Self {
        Self {
            balances: HashMap::new(),
            base_symbol: base_symbol.into(),
            quote_symbol: quote_symbol.into(),
            journal: None,
            legs_until_failure: None,
        }
    }

    /// Empty ledger for the pair named in `config`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.base_symbol.as_str(), config.quote_symbol.as_str())
    }

    /// Display symbol of `asset`
    pub fn symbol(&self, asset: Asset) -> &str {
        match asset {
            Asset::Base => &self.base_symbol,
            Asset::Quote => &self.quote_symbol,
        }
    }

    /// Credit `amount` of `asset` to `account`'s available balance
    pub fn deposit(&mut self, account: AccountId, asset: Asset, amount: u128) -> Result<(), SettlementError> {
        let balance = self.balance_mut(account, asset);
        balance.available = balance
            .available
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        Ok(())
    }

    /// Available (unlocked) balance
    pub fn balance_of(&self, account: AccountId, asset: Asset) -> u128 {
        self.balance(account, asset).available
    }

    /// Balance locked behind `account`'s resting orders
    pub fn escrowed(&self, account: AccountId, asset: Asset) -> u128 {
        self.balance(account, asset).escrowed
    }

    /// Value of `asset` held in escrow across all accounts
    pub fn total_escrowed(&self, asset: Asset) -> u128 {
        self.balances
            .values()
            .filter_map(|assets| assets.get(&asset))
            .map(|b| b.escrowed)
            .sum()
    }

    /// Make every `settle_leg` call fail once `legs` more legs have settled
    pub fn fail_legs_after(&mut self, legs: usize) {
        self.legs_until_failure = Some(legs);
    }

    /// Stop injecting settlement failures
    pub fn clear_fault(&mut self) {
        self.legs_until_failure = None;
    }

    /// True between `begin` and `commit`/`rollback`
    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    fn balance(&self, account: AccountId, asset: Asset) -> Balance {
        self.balances
            .get(&account)
            .and_then(|assets| assets.get(&asset))
            .copied()
            .unwrap_or_default()
    }

    fn balance_mut(&mut self, account: AccountId, asset: Asset) -> &mut Balance {
        let balance = self
            .balances
            .entry(account)
            .or_default()
            .entry(asset)
            .or_default();
        if let Some(journal) = self.journal.as_mut() {
            journal.push((account, asset, *balance));
        }
        balance
    }

    fn insufficient(&self, asset: Asset) -> SettlementError {
        SettlementError::InsufficientFunds {
            asset: self.symbol(asset).to_string(),
        }
    }
}

impl Settlement for InMemoryLedger {
    fn begin(&mut self) {
        if self.journal.is_some() {
            warn!(target: "ledger", "begin called inside an open transaction");
            return;
        }
        self.journal = Some(Vec::new());
    }

    fn commit(&mut self) -> Result<(), SettlementError> {
        self.journal.take().ok_or(SettlementError::NoTransaction)?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SettlementError> {
        let journal = self.journal.take().ok_or(SettlementError::NoTransaction)?;
        debug!(target: "ledger", writes = journal.len(), "rolling back settlement transaction");
        for (account, asset, prior) in journal.into_iter().rev() {
            self.balances.entry(account).or_default().insert(asset, prior);
        }
        Ok(())
    }

    fn reserve(
        &mut self,
        party: AccountId,
        asset: Asset,
        qty: u128,
        funding: Funding,
    ) -> Result<(), SettlementError> {
        let current = self.balance(party, asset);
        let credit = match funding {
            Funding::Approved => {
                if current.available < qty {
                    return Err(self.insufficient(asset));
                }
                0
            }
            Funding::Attached(value) => {
                if value < qty {
                    return Err(self.insufficient(asset));
                }
                value
            }
        };

        let available = current
            .available
            .checked_add(credit)
            .ok_or(SettlementError::Overflow)?
            - qty;
        let escrowed = current
            .escrowed
            .checked_add(qty)
            .ok_or(SettlementError::Overflow)?;

        let balance = self.balance_mut(party, asset);
        balance.available = available;
        balance.escrowed = escrowed;
        debug!(target: "ledger", party, ?asset, qty = %qty, "reserved");
        Ok(())
    }

    fn settle_leg(&mut self, leg: &SettlementLeg) -> Result<(), SettlementError> {
        if let Some(remaining) = self.legs_until_failure {
            if remaining == 0 {
                return Err(SettlementError::Failure("injected settlement fault".to_string()));
            }
            self.legs_until_failure = Some(remaining - 1);
        }

        let buyer = leg.buyer();
        let seller = leg.seller();
        let base_qty = leg.base_qty as u128;
        let released = leg.buyer_escrow_released();

        if self.balance(seller, Asset::Base).escrowed < base_qty {
            return Err(SettlementError::Failure(format!(
                "seller {seller} has less than {base_qty} {} in escrow",
                self.base_symbol
            )));
        }
        if self.balance(buyer, Asset::Quote).escrowed < released {
            return Err(SettlementError::Failure(format!(
                "buyer {buyer} has less than {released} {} in escrow",
                self.quote_symbol
            )));
        }

        self.balance_mut(seller, Asset::Base).escrowed -= base_qty;
        self.balance_mut(buyer, Asset::Quote).escrowed -= released;
        self.deposit(buyer, Asset::Base, base_qty)?;
        self.deposit(seller, Asset::Quote, leg.quote_qty)?;
        self.deposit(buyer, Asset::Quote, leg.buyer_refund)?;

        debug!(
            target: "ledger",
            buyer,
            seller,
            base = leg.base_qty,
            quote = %leg.quote_qty,
            refund = %leg.buyer_refund,
            "leg settled"
        );
        Ok(())
    }

    fn release(&mut self, party: AccountId, asset: Asset, qty: u128) -> Result<(), SettlementError> {
        if self.balance(party, asset).escrowed < qty {
            return Err(SettlementError::Failure(format!(
                "account {party} has less than {qty} {} in escrow",
                self.symbol(asset)
            )));
        }
        self.balance_mut(party, asset).escrowed -= qty;
        self.deposit(party, asset, qty)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
