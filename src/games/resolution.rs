//! Wager resolution
//!
//! Matches wagers against a winning outcome and computes what each one pays.
//! The engine never touches the bank or the ledger; the caller applies the
//! result.

use crate::errors::WagerError;
use crate::games::types::{BetKind, Outcome};
use crate::games::wager::Wager;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// How a spin went for the player, from total winnings against total staked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetOutcome {
    /// Winnings exceed the amount staked
    Profit,
    /// Winnings equal the amount staked, both positive
    Breakeven,
    /// Something came back, but less than was staked
    PartialReturn,
    /// Nothing came back
    TotalLoss,
    /// No wagers were on the table
    NoAction,
}

impl NetOutcome {
    pub fn classify(total_staked: u64, total_winnings: u64) -> Self {
        if total_staked == 0 && total_winnings == 0 {
            NetOutcome::NoAction
        } else if total_winnings > total_staked {
            NetOutcome::Profit
        } else if total_winnings == total_staked {
            NetOutcome::Breakeven
        } else if total_winnings > 0 {
            NetOutcome::PartialReturn
        } else {
            NetOutcome::TotalLoss
        }
    }

    /// Player-facing summary of a spin with these totals
    pub fn write_summary(
        self,
        f: &mut fmt::Formatter<'_>,
        outcome: Outcome,
        total_staked: u64,
        total_winnings: u64,
    ) -> fmt::Result {
        write!(f, "Result: {}", outcome)?;
        match self {
            NetOutcome::Profit => write!(f, "\nBet: {}$ and Won: {}$ !", total_staked, total_winnings),
            NetOutcome::Breakeven | NetOutcome::PartialReturn => {
                write!(f, "\nBet: {}$ and Won: {}$", total_staked, total_winnings)
            }
            NetOutcome::TotalLoss => write!(f, "\nYou lost {}$ bet", total_staked),
            NetOutcome::NoAction => write!(f, "\nPlace a bet for next spin!"),
        }
    }
}

/// Stakes kept by the house minus winnings paid. Negative when the house loses.
pub(crate) fn house_take(total_staked: u64, total_winnings: u64) -> i64 {
    let take = i128::from(total_staked) - i128::from(total_winnings);
    take.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

impl fmt::Display for NetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NetOutcome::Profit => "profit",
            NetOutcome::Breakeven => "breakeven",
            NetOutcome::PartialReturn => "partial return",
            NetOutcome::TotalLoss => "total loss",
            NetOutcome::NoAction => "no action",
        };
        f.write_str(text)
    }
}

/// Result for one wager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerResult {
    pub wager_id: Uuid,
    pub kind: BetKind,
    pub covered: String,
    pub stake: u64,
    pub win_amount: u64,
}

impl WagerResult {
    pub fn is_win(&self) -> bool {
        self.win_amount > 0
    }
}

/// Outcome of resolving a set of wagers, in wager order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub results: Vec<WagerResult>,
    pub total_staked: u64,
    pub total_winnings: u64,
    pub net: NetOutcome,
}

impl Resolution {
    /// Stakes kept by the house minus winnings paid. Negative when the house loses.
    pub fn house_take(&self) -> i64 {
        house_take(self.total_staked, self.total_winnings)
    }

    pub fn winners(&self) -> impl Iterator<Item = &WagerResult> {
        self.results.iter().filter(|result| result.is_win())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.net
            .write_summary(f, self.outcome, self.total_staked, self.total_winnings)
    }
}

/// Stateless resolver shared by every spin of a table
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionEngine;

impl ResolutionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the resolution without touching any wager.
    ///
    /// Fails with `DoubleResolution` if any wager was already resolved, and
    /// with `Overflow` if a payout or total does not fit in a `u64`.
    pub fn evaluate(&self, outcome: Outcome, wagers: &[Wager]) -> Result<Resolution, WagerError> {
        if let Some(resolved) = wagers.iter().find(|wager| wager.is_resolved()) {
            return Err(WagerError::DoubleResolution(resolved.id()));
        }

        let mut results = Vec::with_capacity(wagers.len());
        let mut total_staked: u64 = 0;
        let mut total_winnings: u64 = 0;

        for wager in wagers {
            let win_amount = if wager.category().covers(outcome) {
                wager.potential_payout()?
            } else {
                0
            };

            total_staked = total_staked
                .checked_add(wager.stake())
                .ok_or(WagerError::Overflow("total staked"))?;
            total_winnings = total_winnings
                .checked_add(win_amount)
                .ok_or(WagerError::Overflow("total winnings"))?;

            debug!(
                wager_id = %wager.id(),
                kind = %wager.kind(),
                stake = wager.stake(),
                win_amount,
                "Resolved wager against {}",
                outcome
            );

            results.push(WagerResult {
                wager_id: wager.id(),
                kind: wager.kind(),
                covered: wager.category().label().to_string(),
                stake: wager.stake(),
                win_amount,
            });
        }

        Ok(Resolution {
            outcome,
            results,
            total_staked,
            total_winnings,
            net: NetOutcome::classify(total_staked, total_winnings),
        })
    }

    /// Mark every wager resolved with the amounts computed by `evaluate`
    pub(crate) fn apply(&self, resolution: &Resolution, wagers: &mut [Wager]) -> Result<(), WagerError> {
        if let Some(resolved) = wagers.iter().find(|wager| wager.is_resolved()) {
            return Err(WagerError::DoubleResolution(resolved.id()));
        }
        debug_assert_eq!(resolution.results.len(), wagers.len());

        for (wager, result) in wagers.iter_mut().zip(&resolution.results) {
            debug_assert_eq!(wager.id(), result.wager_id);
            wager.mark_resolved(resolution.outcome, result.win_amount)?;
        }
        Ok(())
    }

    /// Evaluate and mark every wager resolved. All-or-nothing.
    pub fn resolve(&self, outcome: Outcome, wagers: &mut [Wager]) -> Result<Resolution, WagerError> {
        let resolution = self.evaluate(outcome, wagers)?;
        self.apply(&resolution, wagers)?;
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::catalog::BetCatalog;
    use proptest::prelude::*;

    fn outcome(value: i32) -> Outcome {
        Outcome::new(value).unwrap()
    }

    #[test]
    fn test_straight_win_pays_stake_times_36() {
        let catalog = BetCatalog::american().unwrap();
        let category = catalog.find(BetKind::Straight, &[outcome(17)]).unwrap();
        let mut wagers = vec![Wager::new(category, 50).unwrap()];

        let resolution = ResolutionEngine::new().resolve(outcome(17), &mut wagers).unwrap();

        assert_eq!(resolution.total_winnings, 1800);
        assert_eq!(resolution.results[0].win_amount, 1800);
        assert_eq!(resolution.net, NetOutcome::Profit);
        assert_eq!(resolution.house_take(), -1750);
        assert_eq!(wagers[0].win_amount(), Some(1800));
    }

    #[test]
    fn test_red_and_black_lose_on_zero() {
        let catalog = BetCatalog::american().unwrap();
        let mut wagers = vec![
            Wager::new(catalog.category_for(BetKind::Red).unwrap(), 100).unwrap(),
            Wager::new(catalog.category_for(BetKind::Black).unwrap(), 100).unwrap(),
        ];

        let resolution = ResolutionEngine::new().resolve(Outcome::ZERO, &mut wagers).unwrap();

        assert_eq!(resolution.total_winnings, 0);
        assert_eq!(resolution.total_staked, 200);
        assert_eq!(resolution.net, NetOutcome::TotalLoss);
        assert_eq!(resolution.house_take(), 200);
        assert!(wagers.iter().all(|wager| wager.win_amount() == Some(0)));
    }

    #[test]
    fn test_double_resolution_rejected_without_mutation() {
        let catalog = BetCatalog::american().unwrap();
        let red = catalog.category_for(BetKind::Red).unwrap();
        let mut first = vec![Wager::new(red.clone(), 10).unwrap()];
        let engine = ResolutionEngine::new();
        engine.resolve(outcome(1), &mut first).unwrap();

        let already = first.pop().unwrap();
        let already_id = already.id();
        let mut mixed = vec![Wager::new(red, 10).unwrap(), already];

        let err = engine.resolve(outcome(3), &mut mixed).unwrap_err();
        assert_eq!(err, WagerError::DoubleResolution(already_id));
        assert!(!mixed[0].is_resolved());
        assert_eq!(mixed[1].win_amount(), Some(20));
        assert_eq!(mixed[1].resolved_outcome(), Some(outcome(1)));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let catalog = BetCatalog::american().unwrap();
        let red = catalog.category_for(BetKind::Red).unwrap();
        let mut wagers = vec![
            Wager::new(red.clone(), u64::MAX / 2).unwrap(),
            Wager::new(red, u64::MAX / 2).unwrap(),
        ];

        let err = ResolutionEngine::new().resolve(outcome(1), &mut wagers).unwrap_err();
        assert!(matches!(err, WagerError::Overflow(_)));
        assert!(wagers.iter().all(|wager| !wager.is_resolved()));
    }

    #[test]
    fn test_classify() {
        assert_eq!(NetOutcome::classify(0, 0), NetOutcome::NoAction);
        assert_eq!(NetOutcome::classify(100, 0), NetOutcome::TotalLoss);
        assert_eq!(NetOutcome::classify(100, 60), NetOutcome::PartialReturn);
        assert_eq!(NetOutcome::classify(100, 100), NetOutcome::Breakeven);
        assert_eq!(NetOutcome::classify(100, 360), NetOutcome::Profit);
    }

    #[test]
    fn test_house_take_saturates() {
        assert_eq!(house_take(200, 0), 200);
        assert_eq!(house_take(50, 1800), -1750);
        assert_eq!(house_take(u64::MAX, 0), i64::MAX);
        assert_eq!(house_take(0, u64::MAX), i64::MIN);
    }

    #[test]
    fn test_empty_resolution() {
        let resolution = ResolutionEngine::new().resolve(Outcome::DOUBLE_ZERO, &mut []).unwrap();

        assert_eq!(resolution.net, NetOutcome::NoAction);
        assert_eq!(resolution.to_string(), "Result: 00\nPlace a bet for next spin!");
    }

    #[test]
    fn test_summary_text() {
        let catalog = BetCatalog::american().unwrap();
        let mut wagers = vec![
            Wager::new(catalog.category_for(BetKind::Dozen1).unwrap(), 30).unwrap(),
            Wager::new(catalog.category_for(BetKind::Dozen2).unwrap(), 30).unwrap(),
            Wager::new(catalog.category_for(BetKind::Dozen3).unwrap(), 30).unwrap(),
        ];

        let resolution = ResolutionEngine::new().resolve(outcome(5), &mut wagers).unwrap();
        assert_eq!(resolution.net, NetOutcome::Breakeven);
        assert_eq!(resolution.to_string(), "Result: 5\nBet: 90$ and Won: 90$");
        assert_eq!(resolution.winners().count(), 1);
    }

    proptest! {
        /// Winners are paid stake * (1 + ratio), losers nothing, and the
        /// totals are plain sums.
        #[test]
        fn prop_payout_and_conservation(
            pocket in 0usize..38,
            picks in prop::collection::vec((any::<prop::sample::Index>(), 1u64..1_000_000), 0..20),
        ) {
            let catalog = BetCatalog::american().unwrap();
            let categories: Vec<_> = catalog.iter().cloned().collect();
            let outcome = Outcome::all().nth(pocket).unwrap();

            let mut wagers: Vec<Wager> = picks
                .iter()
                .map(|(index, stake)| Wager::new(index.get(&categories).clone(), *stake).unwrap())
                .collect();

            let resolution = ResolutionEngine::new().resolve(outcome, &mut wagers).unwrap();

            let mut staked = 0u64;
            let mut won = 0u64;
            for (wager, result) in wagers.iter().zip(&resolution.results) {
                let expected = if wager.category().covered().contains(&outcome) {
                    wager.stake() * (1 + u64::from(wager.category().payout_ratio()))
                } else {
                    0
                };
                prop_assert_eq!(result.win_amount, expected);
                prop_assert_eq!(wager.win_amount(), Some(expected));
                staked += wager.stake();
                won += expected;
            }

            prop_assert_eq!(resolution.total_staked, staked);
            prop_assert_eq!(resolution.total_winnings, won);
            prop_assert_eq!(resolution.house_take(), staked as i64 - won as i64);
        }
    }
}
