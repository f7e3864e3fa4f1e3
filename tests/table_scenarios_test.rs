//! End-to-end spins through the public table API

use croupier::{
    games::Wheel, BankAccount, BetCatalog, BetKind, BetSelection, Ledger, NetOutcome, Outcome, Table,
    WagerError,
};
use proptest::prelude::*;
use std::sync::Arc;

fn new_table(balance: u64) -> Table {
    let catalog = Arc::new(BetCatalog::american().unwrap());
    Table::new(catalog, Wheel::seeded(11), BankAccount::open(balance), Ledger::default())
}

#[test]
fn test_straight_bet_on_seventeen() {
    let mut table = new_table(1000);

    let receipt = table.place_wager(&"straight:17".parse().unwrap(), 50).unwrap();
    assert_eq!(receipt.potential_payout().unwrap(), 1800);
    assert_eq!(table.balance(), 950);

    let report = table.spin(17).unwrap();
    assert_eq!(report.results[0].wager_id, receipt.id());
    assert_eq!(report.total_winnings, 1800);
    assert_eq!(report.net, NetOutcome::Profit);
    assert_eq!(table.balance(), 2750);

    let history = table.history_snapshot(10);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].win_amount, 1800);
    assert!(history[0].to_string().ends_with("Straight on 17 - WON 1800$ (Result: 17)"));

    // The wager was consumed by the spin; only the receipt is left
    assert!(!table.active_wagers().contains(receipt.id()));
    assert_eq!(table.spin(17).unwrap_err(), WagerError::NoActiveWagers);
    assert_eq!(table.balance(), 2750);
    assert_eq!(table.lifetime().won, 1800);
}

#[test]
fn test_forced_outcome_used_for_one_spin() {
    let mut table = new_table(1000);
    table.set_forced_from_str("00").unwrap();

    table.place_wager(&"basket".parse().unwrap(), 10).unwrap();
    assert_eq!(table.begin_spin().unwrap(), Outcome::DOUBLE_ZERO);
    let report = table.finish_spin().unwrap();
    assert_eq!(report.total_winnings, 70);
    assert_eq!(table.forced_outcome(), None);

    assert!(table.set_forced_from_str("0x11").is_err());
    assert_eq!(table.forced_outcome(), None);
}

#[test]
fn test_ledger_keeps_last_hundred_wagers() {
    let mut table = new_table(10_000);

    for _ in 0..101 {
        table.place_wager(&BetSelection::outside(BetKind::Even), 1).unwrap();
        table.spin(2).unwrap();
    }

    let history = table.history_snapshot(200);
    assert_eq!(history.len(), 100);
    assert_eq!(history.first().unwrap().spin, 101);
    assert_eq!(history.last().unwrap().spin, 2);

    // The window statistics no longer see spin 1; lifetime counters do
    assert_eq!(table.statistics_snapshot().wagers, 100);
    assert_eq!(table.statistics_snapshot().total_won, 200);
    assert_eq!(table.lifetime().spins, 101);
    assert_eq!(table.lifetime().won, 202);
}

#[test]
fn test_mixed_spin_partial_return() {
    let mut table = new_table(1000);
    table.place_wager(&"dozen1".parse().unwrap(), 100).unwrap();
    table.place_wager(&"dozen2".parse().unwrap(), 100).unwrap();
    table.place_wager(&"dozen3".parse().unwrap(), 100).unwrap();
    table.place_wager(&"straight:0".parse().unwrap(), 100).unwrap();

    let report = table.spin(30).unwrap();

    assert_eq!(report.total_staked, 400);
    assert_eq!(report.total_winnings, 300);
    assert_eq!(report.net, NetOutcome::PartialReturn);
    assert_eq!(report.house_take(), 100);
    assert_eq!(table.balance(), 900);
    assert_eq!(table.statistics_snapshot().wins, 1);
    assert_eq!(table.statistics_snapshot().losses, 3);
}

proptest! {
    /// Balance after a spin equals balance before placement, minus stakes,
    /// plus winnings; the house take is the difference.
    #[test]
    fn prop_balance_conservation(
        pocket in 0usize..38,
        bets in prop::collection::vec((0usize..18, 1u64..500), 1..10),
    ) {
        let mut table = new_table(1_000_000);
        let outcome = Outcome::all().nth(pocket).unwrap();
        let start = table.balance();

        let mut staked = 0;
        for (kind_index, stake) in &bets {
            let kind = BetKind::ALL[*kind_index];
            let selection = if kind.is_positional() {
                BetSelection::straight(outcome)
            } else {
                BetSelection::outside(kind)
            };
            table.place_wager(&selection, *stake).unwrap();
            staked += stake;
        }

        let report = table.spin(outcome.value()).unwrap();
        let won: u64 = report.results.iter().map(|r| r.win_amount).sum();

        prop_assert_eq!(report.total_staked, staked);
        prop_assert_eq!(report.total_winnings, won);
        prop_assert_eq!(table.balance(), start - staked + won);
        prop_assert_eq!(report.house_take(), staked as i64 - won as i64);
        prop_assert!(table.active_wagers().is_empty());
    }
}
