//! Bet catalog
//!
//! Every category the American layout offers, generated once from the 12x3
//! number grid plus the 0 and 00 pockets. Grid column `c` (0-11) holds the
//! street `3c+1, 3c+2, 3c+3`; row `r` (0-2) selects the number within it.

use crate::errors::{ConfigurationError, WagerError};
use crate::games::types::{BetKind, BetSelection, Outcome, RED_NUMBERS};
use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

const GRID_COLUMNS: u8 = 12;
const GRID_ROWS: u8 = 3;

/// One bettable table position: its kind, net odds and covered pockets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetCategory {
    kind: BetKind,
    payout_ratio: u32,
    covered: Vec<Outcome>,
    label: String,
}

impl BetCategory {
    /// Build a category; covered outcomes are sorted in table order and deduplicated
    pub fn new(kind: BetKind, payout_ratio: u32, covered: impl IntoIterator<Item = Outcome>) -> Self {
        let covered: Vec<Outcome> = covered.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let label = covered
            .iter()
            .map(Outcome::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            kind,
            payout_ratio,
            covered,
            label,
        }
    }

    pub fn kind(&self) -> BetKind {
        self.kind
    }

    pub fn payout_ratio(&self) -> u32 {
        self.payout_ratio
    }

    pub fn covered(&self) -> &[Outcome] {
        &self.covered
    }

    /// Covered outcomes as display text, e.g. `0, 00, 1, 2, 3`
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn covers(&self, outcome: Outcome) -> bool {
        self.covered.binary_search(&outcome).is_ok()
    }
}

impl fmt::Display for BetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} ({}:1)", self.kind, self.label, self.payout_ratio)
    }
}

/// Immutable, validated set of bet categories shared by every wager
#[derive(Debug)]
pub struct BetCatalog {
    categories: Vec<Arc<BetCategory>>,
    by_coverage: HashMap<(BetKind, Vec<Outcome>), usize>,
    by_kind: HashMap<BetKind, Vec<usize>>,
}

impl BetCatalog {
    /// The standard American roulette paytable
    pub fn american() -> Result<Self, ConfigurationError> {
        Self::from_categories(american_categories())
    }

    /// Validate and index a set of categories.
    ///
    /// Fails when a kind is missing, a single-position kind appears twice, or
    /// a category's coverage does not match its kind.
    pub fn from_categories(categories: Vec<BetCategory>) -> Result<Self, ConfigurationError> {
        let mut by_coverage = HashMap::with_capacity(categories.len());
        let mut by_kind: HashMap<BetKind, Vec<usize>> = HashMap::new();

        for (index, category) in categories.iter().enumerate() {
            let expected = category.kind.coverage();
            if category.covered.len() != expected {
                return Err(ConfigurationError::CoverageMismatch {
                    category: format!("{} on {}", category.kind, category.label),
                    expected,
                    actual: category.covered.len(),
                });
            }

            let key = (category.kind, category.covered.clone());
            if by_coverage.insert(key, index).is_some() {
                return Err(ConfigurationError::ValidationFailed(format!(
                    "duplicate category {} on {}",
                    category.kind, category.label
                )));
            }
            by_kind.entry(category.kind).or_default().push(index);
        }

        for kind in BetKind::ALL {
            match by_kind.get(&kind).map(Vec::len) {
                None => return Err(ConfigurationError::MissingCategory(kind.to_string())),
                Some(count) if count > 1 && !kind.is_positional() => {
                    return Err(ConfigurationError::ValidationFailed(format!(
                        "{} must have exactly one category, found {}",
                        kind, count
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            categories: categories.into_iter().map(Arc::new).collect(),
            by_coverage,
            by_kind,
        })
    }

    /// The single category of a non-positional kind (Basket and all outside bets)
    pub fn category_for(&self, kind: BetKind) -> Result<Arc<BetCategory>, WagerError> {
        if kind.is_positional() {
            return Err(WagerError::UnknownBet(format!(
                "{} requires the covered numbers",
                kind
            )));
        }

        self.by_kind
            .get(&kind)
            .and_then(|indexes| indexes.first())
            .map(|&index| Arc::clone(&self.categories[index]))
            .ok_or_else(|| WagerError::UnknownBet(kind.to_string()))
    }

    /// Look up a category by kind and covered numbers, in any order
    pub fn find(&self, kind: BetKind, numbers: &[Outcome]) -> Result<Arc<BetCategory>, WagerError> {
        let key: Vec<Outcome> = numbers.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        self.by_coverage
            .get(&(kind, key))
            .map(|&index| Arc::clone(&self.categories[index]))
            .ok_or_else(|| {
                let numbers: Vec<String> = numbers.iter().map(Outcome::to_string).collect();
                WagerError::UnknownBet(format!("{} on {}", kind, numbers.join("-")))
            })
    }

    /// Resolve a parsed selection to its category
    pub fn resolve_selection(&self, selection: &BetSelection) -> Result<Arc<BetCategory>, WagerError> {
        if selection.numbers.is_empty() {
            self.category_for(selection.kind)
        } else {
            self.find(selection.kind, &selection.numbers)
        }
    }

    pub fn categories_of(&self, kind: BetKind) -> impl Iterator<Item = &Arc<BetCategory>> + '_ {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .map(move |&index| &self.categories[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BetCategory>> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn grid_number(column: u8, row: u8) -> Outcome {
    Outcome::from_number(column * GRID_ROWS + row + 1)
}

fn numbers(values: impl IntoIterator<Item = u8>) -> Vec<Outcome> {
    values.into_iter().map(Outcome::from_number).collect()
}

fn category(kind: BetKind, covered: impl IntoIterator<Item = Outcome>) -> BetCategory {
    BetCategory::new(kind, kind.payout_ratio(), covered)
}

/// Generate every American category from the grid
pub fn american_categories() -> Vec<BetCategory> {
    let mut categories = Vec::with_capacity(160);

    // Straights, including both zeros
    categories.extend(Outcome::all().map(|outcome| category(BetKind::Straight, [outcome])));

    // Splits: neighbours along a row, then within a street
    for column in 0..GRID_COLUMNS - 1 {
        for row in 0..GRID_ROWS {
            categories.push(category(
                BetKind::Split,
                [grid_number(column, row), grid_number(column + 1, row)],
            ));
        }
    }
    for column in 0..GRID_COLUMNS {
        for row in 0..GRID_ROWS - 1 {
            categories.push(category(
                BetKind::Split,
                [grid_number(column, row), grid_number(column, row + 1)],
            ));
        }
    }

    for column in 0..GRID_COLUMNS {
        categories.push(category(
            BetKind::Street,
            (0..GRID_ROWS).map(|row| grid_number(column, row)),
        ));
    }

    for column in 0..GRID_COLUMNS - 1 {
        for row in 0..GRID_ROWS - 1 {
            categories.push(category(
                BetKind::Corner,
                [
                    grid_number(column, row),
                    grid_number(column + 1, row),
                    grid_number(column, row + 1),
                    grid_number(column + 1, row + 1),
                ],
            ));
        }
    }

    for column in 0..GRID_COLUMNS - 1 {
        categories.push(category(
            BetKind::SixLine,
            (0..GRID_ROWS).flat_map(|row| [grid_number(column, row), grid_number(column + 1, row)]),
        ));
    }

    categories.push(category(
        BetKind::Basket,
        [Outcome::ZERO, Outcome::DOUBLE_ZERO]
            .into_iter()
            .chain(numbers([1, 2, 3])),
    ));

    categories.push(category(BetKind::Red, numbers(RED_NUMBERS)));
    categories.push(category(
        BetKind::Black,
        numbers((1..=36).filter(|n| !RED_NUMBERS.contains(n))),
    ));
    categories.push(category(BetKind::Even, numbers((1..=36).filter(|n| n % 2 == 0))));
    categories.push(category(BetKind::Odd, numbers((1..=36).filter(|n| n % 2 == 1))));
    categories.push(category(BetKind::Low, numbers(1..=18)));
    categories.push(category(BetKind::High, numbers(19..=36)));

    for (kind, first) in [(BetKind::Dozen1, 1u8), (BetKind::Dozen2, 13), (BetKind::Dozen3, 25)] {
        categories.push(category(kind, numbers(first..first + 12)));
    }

    // Column N holds every third number starting at N, i.e. one grid row
    for (kind, row) in [(BetKind::Column1, 0u8), (BetKind::Column2, 1), (BetKind::Column3, 2)] {
        categories.push(category(
            kind,
            (0..GRID_COLUMNS).map(|column| grid_number(column, row)),
        ));
    }

    categories
}
