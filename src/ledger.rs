//! Bounded wager history
//!
//! Keeps the most recent resolved wagers, evicting the oldest first once the
//! capacity is reached. Statistics fold over the retained entries only, so
//! after eviction they describe a window, not the whole lifetime. All-time
//! figures live on the bank account.

use crate::errors::WagerError;
use crate::games::{BetKind, Outcome, Wager, WagerState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashSet, VecDeque},
    fmt,
};
use tracing::debug;

/// Number of entries kept unless configured otherwise
pub const DEFAULT_LEDGER_CAPACITY: usize = 100;

/// Snapshot of one resolved wager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: BetKind,
    /// Covered outcomes as shown on the table, e.g. "0, 00, 1, 2, 3"
    pub covered: String,
    pub stake: u64,
    pub win_amount: u64,
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
    /// Sequence number of the spin that resolved this wager
    #[serde(default)]
    pub spin: u64,
}

impl LedgerEntry {
    pub fn is_win(&self) -> bool {
        self.win_amount > 0
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} on {} - ",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.covered
        )?;
        if self.is_win() {
            write!(f, "WON {}$", self.win_amount)?;
        } else {
            write!(f, "LOST {}$", self.stake)?;
        }
        write!(f, " (Result: {})", self.outcome)
    }
}

/// Figures folded from the retained entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Distinct spins among retained entries
    pub spins: u64,
    pub wagers: u64,
    pub wins: u64,
    pub losses: u64,
    pub total_wagered: u64,
    pub total_won: u64,
    pub net_profit: i64,
}

/// FIFO history with a fixed capacity
#[derive(Debug, Clone)]
pub struct Ledger {
    entries: VecDeque<LedgerEntry>,
    capacity: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}

impl Ledger {
    /// Empty ledger. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Restore persisted entries (oldest first), keeping the newest `capacity`
    pub fn from_entries(entries: Vec<LedgerEntry>, capacity: usize) -> Self {
        let mut ledger = Self::new(capacity);
        let skip = entries.len().saturating_sub(ledger.capacity);
        ledger.entries.extend(entries.into_iter().skip(skip));
        ledger
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a resolved wager from spin `spin`
    pub fn record(&mut self, wager: &Wager, outcome: Outcome, spin: u64) -> Result<(), WagerError> {
        self.record_at(wager, outcome, spin, Utc::now())
    }

    /// Record with an explicit timestamp
    pub fn record_at(
        &mut self,
        wager: &Wager,
        outcome: Outcome,
        spin: u64,
        timestamp: DateTime<Utc>,
    ) -> Result<(), WagerError> {
        let WagerState::Resolved { win_amount, .. } = wager.state() else {
            return Err(WagerError::UnresolvedWager(wager.id()));
        };
        debug_assert_eq!(wager.resolved_outcome(), Some(outcome));

        self.push(LedgerEntry {
            kind: wager.kind(),
            covered: wager.category().label().to_string(),
            stake: wager.stake(),
            win_amount,
            timestamp,
            outcome,
            spin,
        });
        Ok(())
    }

    /// Record every wager in order. Nothing is recorded if any is still pending.
    pub fn record_all(&mut self, wagers: &[Wager], outcome: Outcome, spin: u64) -> Result<(), WagerError> {
        if let Some(pending) = wagers.iter().find(|wager| !wager.is_resolved()) {
            return Err(WagerError::UnresolvedWager(pending.id()));
        }

        let timestamp = Utc::now();
        for wager in wagers {
            self.record_at(wager, outcome, spin, timestamp)?;
        }
        Ok(())
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&mut self, entry: LedgerEntry) {
        if self.entries.len() == self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(spin = evicted.spin, "Evicted oldest ledger entry");
            }
        }
        self.entries.push_back(entry);
    }

    /// The last `min(n, len)` entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<LedgerEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// All retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    /// Fold the retained entries. Evicted entries are not counted.
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();
        let mut spins = HashSet::new();

        for entry in &self.entries {
            spins.insert(entry.spin);
            stats.wagers += 1;
            stats.total_wagered = stats.total_wagered.saturating_add(entry.stake);
            if entry.is_win() {
                stats.wins += 1;
                stats.total_won = stats.total_won.saturating_add(entry.win_amount);
            } else {
                stats.losses += 1;
            }
        }

        stats.spins = spins.len() as u64;
        let net = i128::from(stats.total_won) - i128::from(stats.total_wagered);
        stats.net_profit = net.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
