//! A single placed stake and its resolution state

use crate::errors::WagerError;
use crate::games::catalog::BetCategory;
use crate::games::types::{BetKind, Outcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Where the chip was dropped on the table. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TablePosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Resolution state of a wager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WagerState {
    Pending,
    Resolved { outcome: Outcome, win_amount: u64 },
}

/// One stake committed to a bet category. Not `Clone`: a wager exists once,
/// so its resolution state cannot be forked.
#[derive(Debug)]
pub struct Wager {
    id: Uuid,
    category: Arc<BetCategory>,
    stake: u64,
    position: Option<TablePosition>,
    state: WagerState,
}

impl Wager {
    /// Create a pending wager. A zero stake is rejected.
    pub fn new(category: Arc<BetCategory>, stake: u64) -> Result<Self, WagerError> {
        if stake == 0 {
            return Err(WagerError::InvalidStake);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            category,
            stake,
            position: None,
            state: WagerState::Pending,
        })
    }

    pub fn with_position(mut self, position: TablePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category(&self) -> &Arc<BetCategory> {
        &self.category
    }

    pub fn kind(&self) -> BetKind {
        self.category.kind()
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn position(&self) -> Option<TablePosition> {
        self.position
    }

    pub fn state(&self) -> WagerState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, WagerState::Resolved { .. })
    }

    /// Amount credited at resolution, `None` while pending
    pub fn win_amount(&self) -> Option<u64> {
        match self.state {
            WagerState::Pending => None,
            WagerState::Resolved { win_amount, .. } => Some(win_amount),
        }
    }

    pub fn resolved_outcome(&self) -> Option<Outcome> {
        match self.state {
            WagerState::Pending => None,
            WagerState::Resolved { outcome, .. } => Some(outcome),
        }
    }

    /// Stake returned plus net winnings if the wager hits
    pub fn potential_payout(&self) -> Result<u64, WagerError> {
        payout(&self.category, self.stake)
    }

    /// Read-only view handed back to whoever placed the wager
    pub fn receipt(&self) -> WagerReceipt {
        WagerReceipt {
            id: self.id,
            category: Arc::clone(&self.category),
            stake: self.stake,
            position: self.position,
        }
    }

    /// Transition Pending -> Resolved. Never overwrites a previous resolution.
    pub(crate) fn mark_resolved(&mut self, outcome: Outcome, win_amount: u64) -> Result<(), WagerError> {
        if self.is_resolved() {
            return Err(WagerError::DoubleResolution(self.id));
        }
        self.state = WagerState::Resolved { outcome, win_amount };
        Ok(())
    }
}

fn payout(category: &BetCategory, stake: u64) -> Result<u64, WagerError> {
    u64::from(category.payout_ratio())
        .checked_add(1)
        .and_then(|multiplier| stake.checked_mul(multiplier))
        .ok_or(WagerError::Overflow("wager payout"))
}

/// What the table returns for a placed wager. Carries no resolution state
/// and cannot be resolved; the wager itself stays with the table.
#[derive(Debug, Clone, PartialEq)]
pub struct WagerReceipt {
    id: Uuid,
    category: Arc<BetCategory>,
    stake: u64,
    position: Option<TablePosition>,
}

impl WagerReceipt {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category(&self) -> &Arc<BetCategory> {
        &self.category
    }

    pub fn kind(&self) -> BetKind {
        self.category.kind()
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn position(&self) -> Option<TablePosition> {
        self.position
    }

    pub fn potential_payout(&self) -> Result<u64, WagerError> {
        payout(&self.category, self.stake)
    }
}
