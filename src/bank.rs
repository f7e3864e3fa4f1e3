//! Player bank account
//!
//! The balance moves only through debit on placement, settlement of a spin,
//! refund of cleared wagers and capital injection. Lifetime counters are kept
//! here rather than derived from the bounded ledger, so they survive eviction.

use crate::errors::WagerError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Balance plus lifetime counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    balance: u64,
    capital_injected: u64,
    lifetime_won: u64,
    lifetime_lost: u64,
}

/// All-time figures, independent of ledger retention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeTotals {
    pub spins: u64,
    pub capital_injected: u64,
    pub won: u64,
    pub lost: u64,
    pub profit: i64,
}

impl BankAccount {
    /// Fresh account. The starting balance counts as injected capital.
    pub fn open(starting_balance: u64) -> Self {
        Self {
            balance: starting_balance,
            capital_injected: starting_balance,
            lifetime_won: 0,
            lifetime_lost: 0,
        }
    }

    /// Rebuild an account from persisted counters
    pub fn from_parts(balance: u64, capital_injected: u64, lifetime_won: u64, lifetime_lost: u64) -> Self {
        Self {
            balance,
            capital_injected,
            lifetime_won,
            lifetime_lost,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn capital_injected(&self) -> u64 {
        self.capital_injected
    }

    /// Sum of everything credited by spins
    pub fn lifetime_won(&self) -> u64 {
        self.lifetime_won
    }

    /// Sum of everything staked on resolved spins
    pub fn lifetime_lost(&self) -> u64 {
        self.lifetime_lost
    }

    /// Lifetime winnings minus lifetime stakes
    pub fn profit(&self) -> i64 {
        let profit = i128::from(self.lifetime_won) - i128::from(self.lifetime_lost);
        profit.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        amount <= self.balance
    }

    /// Take a stake from the balance
    pub fn debit(&mut self, amount: u64) -> Result<(), WagerError> {
        if amount > self.balance {
            return Err(WagerError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        debug!(amount, balance = self.balance, "Debited");
        Ok(())
    }

    /// Add to the balance without touching lifetime counters
    pub fn credit(&mut self, amount: u64) -> Result<(), WagerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(WagerError::Overflow("balance"))?;
        Ok(())
    }

    /// Return stakes of wagers cleared before a spin
    pub fn refund(&mut self, amount: u64) -> Result<(), WagerError> {
        self.credit(amount)?;
        debug!(amount, balance = self.balance, "Refunded");
        Ok(())
    }

    /// Administrative top-up; counted as injected capital
    pub fn inject(&mut self, amount: u64) -> Result<(), WagerError> {
        let capital = self
            .capital_injected
            .checked_add(amount)
            .ok_or(WagerError::Overflow("capital injected"))?;
        self.credit(amount)?;
        self.capital_injected = capital;
        info!(amount, balance = self.balance, "Capital injected");
        Ok(())
    }

    /// Check that `settle` would succeed, without changing anything
    pub fn can_settle(&self, staked: u64, won: u64) -> Result<(), WagerError> {
        self.balance
            .checked_add(won)
            .ok_or(WagerError::Overflow("balance"))?;
        self.lifetime_won
            .checked_add(won)
            .ok_or(WagerError::Overflow("lifetime won"))?;
        self.lifetime_lost
            .checked_add(staked)
            .ok_or(WagerError::Overflow("lifetime lost"))?;
        Ok(())
    }

    /// Credit a spin's winnings and advance the lifetime counters. The stakes
    /// were already debited at placement.
    pub fn settle(&mut self, staked: u64, won: u64) -> Result<(), WagerError> {
        self.can_settle(staked, won)?;
        self.balance += won;
        self.lifetime_won += won;
        self.lifetime_lost += staked;
        Ok(())
    }

    pub fn totals(&self, spins: u64) -> LifetimeTotals {
        LifetimeTotals {
            spins,
            capital_injected: self.capital_injected,
            won: self.lifetime_won,
            lost: self.lifetime_lost,
            profit: self.profit(),
        }
    }
}
