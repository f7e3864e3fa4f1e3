//! Table session
//!
//! Owns the catalog, resolution engine, wheel, bank account, ledger and the
//! active wagers of one player, and sequences every spin. Everything is passed
//! in at construction; there is no global table.
//!
//! A spin either runs straight from `spin`, or in two steps: `begin_spin`
//! locks the outcome and `finish_spin` settles it. Between the two the table
//! refuses new wagers, clears, overrides and further spins.

use crate::bank::{BankAccount, LifetimeTotals};
use crate::config::CroupierConfig;
use crate::errors::{CroupierResult, WagerError};
use crate::games::resolution::house_take;
use crate::games::{
    ActiveWagers, BetCatalog, BetSelection, NetOutcome, Outcome, Resolution, ResolutionEngine,
    TablePosition, Wager, WagerReceipt, WagerResult, Wheel,
};
use crate::ledger::{Ledger, LedgerEntry, Statistics};
use crate::storage::PlayerState;
use rand::{rngs::StdRng, Rng};
use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};

/// Whether a spin is between `begin_spin` and `finish_spin`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinPhase {
    Idle,
    Spinning(Outcome),
}

/// What a settled spin did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpinReport {
    /// Sequence number of this spin
    pub spin: u64,
    pub outcome: Outcome,
    pub total_staked: u64,
    pub total_winnings: u64,
    pub net: NetOutcome,
    pub results: Vec<WagerResult>,
    pub balance_after: u64,
}

impl SpinReport {
    fn new(spin: u64, resolution: Resolution, balance_after: u64) -> Self {
        Self {
            spin,
            outcome: resolution.outcome,
            total_staked: resolution.total_staked,
            total_winnings: resolution.total_winnings,
            net: resolution.net,
            results: resolution.results,
            balance_after,
        }
    }

    /// Stakes kept minus winnings paid; negative when the house lost
    pub fn house_take(&self) -> i64 {
        house_take(self.total_staked, self.total_winnings)
    }
}

impl fmt::Display for SpinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.net
            .write_summary(f, self.outcome, self.total_staked, self.total_winnings)
    }
}

/// One player's table
#[derive(Debug)]
pub struct Table<R = StdRng> {
    catalog: Arc<BetCatalog>,
    engine: ResolutionEngine,
    wheel: Wheel<R>,
    bank: BankAccount,
    ledger: Ledger,
    active: ActiveWagers,
    phase: SpinPhase,
    total_spins: u64,
}

impl Table<StdRng> {
    /// Build a table from configuration, resuming `state` when present
    pub fn from_config(config: &CroupierConfig, state: Option<PlayerState>) -> CroupierResult<Self> {
        config.validate()?;
        let catalog = Arc::new(BetCatalog::american()?);
        let wheel = Wheel::from_seed(config.table.rng_seed);

        Ok(match state {
            Some(state) => Self::restore(catalog, wheel, state, config.ledger.capacity),
            None => Self::new(
                catalog,
                wheel,
                BankAccount::open(config.table.starting_balance),
                Ledger::new(config.ledger.capacity),
            ),
        })
    }
}

impl<R: Rng> Table<R> {
    pub fn new(catalog: Arc<BetCatalog>, wheel: Wheel<R>, bank: BankAccount, ledger: Ledger) -> Self {
        Self {
            catalog,
            engine: ResolutionEngine::new(),
            wheel,
            bank,
            ledger,
            active: ActiveWagers::new(),
            phase: SpinPhase::Idle,
            total_spins: 0,
        }
    }

    /// Resume a table from persisted state
    pub fn restore(catalog: Arc<BetCatalog>, wheel: Wheel<R>, state: PlayerState, ledger_capacity: usize) -> Self {
        let bank = BankAccount::from_parts(
            state.balance,
            state.capital_injected,
            state.total_won,
            state.total_lost,
        );
        let ledger = Ledger::from_entries(state.history, ledger_capacity);

        let mut table = Self::new(catalog, wheel, bank, ledger);
        table.total_spins = state.total_spins;
        info!(
            balance = table.bank.balance(),
            spins = table.total_spins,
            entries = table.ledger.len(),
            "Restored table"
        );
        table
    }

    /// State to persist. Wagers still on the table are not saved; their
    /// stakes are counted back into the saved balance.
    pub fn snapshot(&self) -> PlayerState {
        PlayerState {
            balance: self.bank.balance().saturating_add(self.active.total_staked()),
            capital_injected: self.bank.capital_injected(),
            total_won: self.bank.lifetime_won(),
            total_lost: self.bank.lifetime_lost(),
            total_spins: self.total_spins,
            history: self.ledger.entries().cloned().collect(),
        }
    }

    fn ensure_idle(&self) -> Result<(), WagerError> {
        match self.phase {
            SpinPhase::Idle => Ok(()),
            SpinPhase::Spinning(_) => Err(WagerError::SpinInProgress),
        }
    }

    /// Debit `stake` and put a wager on the selected category. The wager stays
    /// with the table; the caller gets a receipt.
    pub fn place_wager(&mut self, selection: &BetSelection, stake: u64) -> Result<WagerReceipt, WagerError> {
        self.ensure_idle()?;
        let category = self.catalog.resolve_selection(selection)?;
        let wager = Wager::new(category, stake)?;
        self.commit(wager)
    }

    /// Same as `place_wager`, remembering where the chip was dropped
    pub fn place_wager_at(
        &mut self,
        selection: &BetSelection,
        stake: u64,
        position: TablePosition,
    ) -> Result<WagerReceipt, WagerError> {
        self.ensure_idle()?;
        let category = self.catalog.resolve_selection(selection)?;
        let wager = Wager::new(category, stake)?.with_position(position);
        self.commit(wager)
    }

    fn commit(&mut self, wager: Wager) -> Result<WagerReceipt, WagerError> {
        self.bank.debit(wager.stake()).map_err(|e| {
            warn!(stake = wager.stake(), balance = self.bank.balance(), "Wager rejected");
            e
        })?;

        debug!(
            wager_id = %wager.id(),
            kind = %wager.kind(),
            covered = wager.category().label(),
            stake = wager.stake(),
            "Wager placed"
        );
        let receipt = wager.receipt();
        self.active.push(wager);
        Ok(receipt)
    }

    /// Locked outcome while spinning, otherwise the wheel's next outcome
    /// (consuming any forced override)
    pub fn current_outcome_or_random(&mut self) -> Outcome {
        match self.phase {
            SpinPhase::Spinning(outcome) => outcome,
            SpinPhase::Idle => self.wheel.next_outcome(),
        }
    }

    pub fn set_forced_outcome(&mut self, value: i32) -> Result<Outcome, WagerError> {
        self.ensure_idle()?;
        self.wheel.set_forced_outcome(value)
    }

    pub fn set_forced_from_str(&mut self, text: &str) -> Result<Outcome, WagerError> {
        self.ensure_idle()?;
        self.wheel.set_forced_from_str(text)
    }

    pub fn clear_forced_outcome(&mut self) -> Result<Option<Outcome>, WagerError> {
        self.ensure_idle()?;
        Ok(self.wheel.clear_forced_outcome())
    }

    pub fn forced_outcome(&self) -> Option<Outcome> {
        self.wheel.forced_outcome()
    }

    /// Pick the outcome and lock the table until `finish_spin`
    pub fn begin_spin(&mut self) -> Result<Outcome, WagerError> {
        self.ensure_idle()?;
        if self.active.is_empty() {
            return Err(WagerError::NoActiveWagers);
        }

        let outcome = self.wheel.next_outcome();
        self.phase = SpinPhase::Spinning(outcome);
        info!(%outcome, wagers = self.active.len(), "Spin started");
        Ok(outcome)
    }

    /// Settle the locked outcome and unlock the table. If settlement fails the
    /// table is unlocked with every wager still active.
    pub fn finish_spin(&mut self) -> Result<SpinReport, WagerError> {
        let SpinPhase::Spinning(outcome) = self.phase else {
            return Err(WagerError::NoSpinInProgress);
        };

        let report = self.settle(outcome);
        self.phase = SpinPhase::Idle;
        report
    }

    /// Resolve every active wager against `value` right away
    pub fn spin(&mut self, value: i32) -> Result<SpinReport, WagerError> {
        self.ensure_idle()?;
        let outcome = Outcome::new(value).map_err(|e| {
            warn!(value, "Rejected spin outcome");
            e
        })?;
        self.settle(outcome)
    }

    /// Resolve every active wager against an already validated outcome
    pub fn spin_outcome(&mut self, outcome: Outcome) -> Result<SpinReport, WagerError> {
        self.ensure_idle()?;
        self.settle(outcome)
    }

    /// All-or-nothing: every check runs before any wager, the bank or the
    /// ledger changes
    fn settle(&mut self, outcome: Outcome) -> Result<SpinReport, WagerError> {
        if self.active.is_empty() {
            return Err(WagerError::NoActiveWagers);
        }

        let resolution = self.engine.evaluate(outcome, self.active.as_slice())?;
        self.bank
            .can_settle(resolution.total_staked, resolution.total_winnings)?;
        let spin = self
            .total_spins
            .checked_add(1)
            .ok_or(WagerError::Overflow("spin counter"))?;

        let mut wagers = self.active.take_all();
        if let Err(e) = self.engine.apply(&resolution, &mut wagers) {
            for wager in wagers {
                self.active.push(wager);
            }
            return Err(e);
        }

        self.bank
            .settle(resolution.total_staked, resolution.total_winnings)?;
        self.ledger.record_all(&wagers, outcome, spin)?;
        self.total_spins = spin;

        info!(
            spin,
            %outcome,
            staked = resolution.total_staked,
            won = resolution.total_winnings,
            net = %resolution.net,
            balance = self.bank.balance(),
            "Spin settled"
        );

        Ok(SpinReport::new(spin, resolution, self.bank.balance()))
    }

    /// Remove every active wager. Stakes are refunded when `return_stakes`,
    /// otherwise they are forfeited and counted as lost. Returns the number
    /// of wagers removed.
    pub fn clear_active_wagers(&mut self, return_stakes: bool) -> Result<usize, WagerError> {
        self.ensure_idle()?;
        let total = self.active.total_staked();

        if return_stakes {
            self.bank.refund(total)?;
        } else {
            self.bank.settle(total, 0)?;
        }

        let cleared = self.active.take_all().len();
        debug!(cleared, total, return_stakes, "Cleared active wagers");
        Ok(cleared)
    }

    /// Up to `max` ledger entries, most recent first
    pub fn history_snapshot(&self, max: usize) -> Vec<LedgerEntry> {
        let mut entries = self.ledger.recent(max);
        entries.reverse();
        entries
    }

    /// Statistics over the retained ledger window
    pub fn statistics_snapshot(&self) -> Statistics {
        self.ledger.statistics()
    }

    /// All-time counters, unaffected by ledger eviction
    pub fn lifetime(&self) -> LifetimeTotals {
        self.bank.totals(self.total_spins)
    }

    pub fn inject(&mut self, amount: u64) -> Result<(), WagerError> {
        self.bank.inject(amount)
    }

    pub fn clear_history(&mut self) {
        self.ledger.clear();
        info!("History cleared");
    }

    pub fn balance(&self) -> u64 {
        self.bank.balance()
    }

    pub fn bank(&self) -> &BankAccount {
        &self.bank
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn catalog(&self) -> &Arc<BetCatalog> {
        &self.catalog
    }

    pub fn active_wagers(&self) -> &ActiveWagers {
        &self.active
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning(_))
    }

    pub fn total_spins(&self) -> u64 {
        self.total_spins
    }
}
