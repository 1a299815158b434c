//! Chip ledger: per-actor wallets, the shared bank float, and the
//! fixed-rate funding conversion.

use std::collections::{BTreeMap, BTreeSet};

use commonware_cryptography::ed25519::PublicKey;
use holecard_types::{CHIPS_PER_FUNDING_UNIT, FREE_CHIP_GRANT};

use crate::Error;

/// Wallet balances, bank float, and one-time promo claims.
///
/// Chips only enter or leave the system through the conversion and bank
/// operations here; everything else (buy-ins, bets, payouts) moves chips
/// between wallets, table stacks, and the bank.
pub struct Ledger {
    wallets: BTreeMap<PublicKey, u64>,
    bank: u64,
    claimed: BTreeSet<PublicKey>,
    /// Mutual exclusion over outbound transfers. Ported guard: calls are
    /// serialized, but conversions must not nest.
    transfer_lock: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            wallets: BTreeMap::new(),
            bank: 0,
            claimed: BTreeSet::new(),
            transfer_lock: false,
        }
    }

    pub fn balance(&self, actor: &PublicKey) -> u64 {
        self.wallets.get(actor).copied().unwrap_or(0)
    }

    pub fn bank(&self) -> u64 {
        self.bank
    }

    pub fn credit(&mut self, actor: &PublicKey, amount: u64) {
        let balance = self.wallets.entry(actor.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn debit(&mut self, actor: &PublicKey, amount: u64) -> Result<(), Error> {
        let balance = self.wallets.entry(actor.clone()).or_insert(0);
        if *balance < amount {
            return Err(Error::InsufficientFunds {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(())
    }

    pub fn credit_bank(&mut self, amount: u64) {
        self.bank = self.bank.saturating_add(amount);
    }

    pub fn debit_bank(&mut self, amount: u64) -> Result<(), Error> {
        if self.bank < amount {
            return Err(Error::BankUnderfunded {
                required: amount,
                available: self.bank,
            });
        }
        self.bank -= amount;
        Ok(())
    }

    /// One-time promotional grant. Returns the granted amount.
    pub fn claim_free_chips(&mut self, actor: &PublicKey) -> Result<u64, Error> {
        if !self.claimed.insert(actor.clone()) {
            return Err(Error::AlreadyClaimed);
        }
        self.credit(actor, FREE_CHIP_GRANT);
        Ok(FREE_CHIP_GRANT)
    }

    /// Convert external funding into chips at the fixed rate. Returns the
    /// chips minted.
    pub fn buy_chips(&mut self, actor: &PublicKey, funding_amount: u64) -> Result<u64, Error> {
        if funding_amount == 0 {
            return Err(Error::ZeroAmount);
        }
        let chips = funding_amount.saturating_mul(CHIPS_PER_FUNDING_UNIT);
        self.credit(actor, chips);
        Ok(chips)
    }

    /// Convert chips back into funding units at the fixed rate. Returns
    /// the funding units released.
    pub fn withdraw_chips(&mut self, actor: &PublicKey, chips: u64) -> Result<u64, Error> {
        if self.transfer_lock {
            return Err(Error::ReentrantTransfer);
        }
        self.transfer_lock = true;
        let result = self.withdraw_chips_locked(actor, chips);
        self.transfer_lock = false;
        result
    }

    fn withdraw_chips_locked(&mut self, actor: &PublicKey, chips: u64) -> Result<u64, Error> {
        if chips == 0 {
            return Err(Error::ZeroAmount);
        }
        if chips % CHIPS_PER_FUNDING_UNIT != 0 {
            return Err(Error::NotConvertible);
        }
        self.debit(actor, chips)?;
        Ok(chips / CHIPS_PER_FUNDING_UNIT)
    }

    pub fn fund_bank(&mut self, amount: u64) -> Result<(), Error> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        self.credit_bank(amount);
        Ok(())
    }

    pub fn defund_bank(&mut self, amount: u64) -> Result<(), Error> {
        if self.transfer_lock {
            return Err(Error::ReentrantTransfer);
        }
        self.transfer_lock = true;
        let result = if amount == 0 {
            Err(Error::ZeroAmount)
        } else {
            self.debit_bank(amount)
        };
        self.transfer_lock = false;
        result
    }

    /// Sum of all wallet balances, for conservation checks.
    pub fn total_wallets(&self) -> u64 {
        self.wallets
            .values()
            .fold(0u64, |acc, balance| acc.saturating_add(*balance))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
