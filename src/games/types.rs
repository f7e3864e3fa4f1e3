use crate::errors::WagerError;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Red numbers on an American roulette wheel.
pub const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

/// Number of pockets on an American wheel (0, 00 and 1-36)
pub const POCKET_COUNT: usize = 38;

/// Pockets in the order they sit around the wheel, starting at 0
pub const WHEEL_ORDER: [Outcome; POCKET_COUNT] = {
    const LAYOUT: [i8; POCKET_COUNT] = [
        0, 28, 9, 26, 30, 11, 7, 20, 32, 17, 5, 22, 34, 15, 3, 24, 36, 13, 1, -1, 27, 10, 25, 29,
        12, 8, 19, 31, 18, 6, 21, 33, 16, 4, 23, 35, 14, 2,
    ];
    let mut order = [Outcome(0); POCKET_COUNT];
    let mut i = 0;
    while i < POCKET_COUNT {
        order[i] = Outcome(LAYOUT[i]);
        i += 1;
    }
    order
};

/// A validated wheel pocket. `-1` is the "00" pocket.
///
/// Ordering follows the table: 0, 00, 1, 2, ... 36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Outcome(i8);

impl Outcome {
    pub const ZERO: Outcome = Outcome(0);
    pub const DOUBLE_ZERO: Outcome = Outcome(-1);

    /// Validate a raw pocket value
    pub fn new(value: i32) -> Result<Self, WagerError> {
        if value == -1 || (0..=36).contains(&value) {
            Ok(Outcome(value as i8))
        } else {
            Err(WagerError::InvalidOutcome(value))
        }
    }

    /// Pocket for a layout number known to be in 1-36
    pub(crate) fn from_number(number: u8) -> Self {
        debug_assert!((1..=36).contains(&number));
        Outcome(number as i8)
    }

    /// All 38 pockets in table order
    pub fn all() -> impl Iterator<Item = Outcome> {
        std::iter::once(Outcome::ZERO)
            .chain(std::iter::once(Outcome::DOUBLE_ZERO))
            .chain((1..=36).map(Outcome))
    }

    /// Raw value, `-1` for "00"
    pub fn value(self) -> i32 {
        self.0 as i32
    }

    /// The number printed on the layout, `None` for 0 and 00
    pub fn number(self) -> Option<u8> {
        (self.0 >= 1).then_some(self.0 as u8)
    }

    pub fn is_green(self) -> bool {
        self.0 <= 0
    }

    pub fn color(self) -> PocketColor {
        match self.number() {
            None => PocketColor::Green,
            Some(n) if RED_NUMBERS.contains(&n) => PocketColor::Red,
            Some(_) => PocketColor::Black,
        }
    }

    fn table_rank(self) -> i32 {
        match self.0 {
            0 => 0,
            -1 => 1,
            n => n as i32 + 1,
        }
    }
}

impl Ord for Outcome {
    fn cmp(&self, other: &Self) -> Ordering {
        self.table_rank().cmp(&other.table_rank())
    }
}

impl PartialOrd for Outcome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<i32> for Outcome {
    type Error = WagerError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Outcome::new(value)
    }
}

impl From<Outcome> for i32 {
    fn from(outcome: Outcome) -> Self {
        outcome.value()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == -1 {
            write!(f, "00")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Parses operator text. Only "00" and plain decimal digits are accepted.
impl FromStr for Outcome {
    type Err = WagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text == "00" {
            return Ok(Outcome::DOUBLE_ZERO);
        }
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WagerError::InvalidInput(s.to_string()));
        }
        let value: i32 = text
            .parse()
            .map_err(|_| WagerError::InvalidInput(s.to_string()))?;
        Outcome::new(value)
    }
}

/// Pocket colour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PocketColor {
    Green,
    Red,
    Black,
}

impl fmt::Display for PocketColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PocketColor::Green => write!(f, "green"),
            PocketColor::Red => write!(f, "red"),
            PocketColor::Black => write!(f, "black"),
        }
    }
}

/// Bet kinds of the American paytable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BetKind {
    // Inside bets
    Straight,
    Split,
    Street,
    Corner,
    SixLine,
    Basket,
    // Outside bets
    Red,
    Black,
    Even,
    Odd,
    Low,
    High,
    Dozen1,
    Dozen2,
    Dozen3,
    Column1,
    Column2,
    Column3,
}

impl BetKind {
    pub const ALL: [BetKind; 18] = [
        BetKind::Straight,
        BetKind::Split,
        BetKind::Street,
        BetKind::Corner,
        BetKind::SixLine,
        BetKind::Basket,
        BetKind::Red,
        BetKind::Black,
        BetKind::Even,
        BetKind::Odd,
        BetKind::Low,
        BetKind::High,
        BetKind::Dozen1,
        BetKind::Dozen2,
        BetKind::Dozen3,
        BetKind::Column1,
        BetKind::Column2,
        BetKind::Column3,
    ];

    /// Net odds paid against 1
    pub fn payout_ratio(self) -> u32 {
        match self {
            BetKind::Straight => 35,
            BetKind::Split => 17,
            BetKind::Street => 11,
            BetKind::Corner => 8,
            BetKind::SixLine => 5,
            BetKind::Basket => 6,
            BetKind::Red | BetKind::Black | BetKind::Even | BetKind::Odd | BetKind::Low | BetKind::High => 1,
            BetKind::Dozen1 | BetKind::Dozen2 | BetKind::Dozen3 => 2,
            BetKind::Column1 | BetKind::Column2 | BetKind::Column3 => 2,
        }
    }

    /// Number of outcomes every category of this kind must cover
    pub fn coverage(self) -> usize {
        match self {
            BetKind::Straight => 1,
            BetKind::Split => 2,
            BetKind::Street => 3,
            BetKind::Corner => 4,
            BetKind::Basket => 5,
            BetKind::SixLine => 6,
            BetKind::Dozen1 | BetKind::Dozen2 | BetKind::Dozen3 => 12,
            BetKind::Column1 | BetKind::Column2 | BetKind::Column3 => 12,
            _ => 18,
        }
    }

    /// Inside bets other than the basket exist once per table position
    pub fn is_positional(self) -> bool {
        matches!(
            self,
            BetKind::Straight | BetKind::Split | BetKind::Street | BetKind::Corner | BetKind::SixLine
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            BetKind::Straight => "Straight",
            BetKind::Split => "Split",
            BetKind::Street => "Street",
            BetKind::Corner => "Corner",
            BetKind::SixLine => "SixLine",
            BetKind::Basket => "Basket",
            BetKind::Red => "Red",
            BetKind::Black => "Black",
            BetKind::Even => "Even",
            BetKind::Odd => "Odd",
            BetKind::Low => "Low",
            BetKind::High => "High",
            BetKind::Dozen1 => "Dozen1",
            BetKind::Dozen2 => "Dozen2",
            BetKind::Dozen3 => "Dozen3",
            BetKind::Column1 => "Column1",
            BetKind::Column2 => "Column2",
            BetKind::Column3 => "Column3",
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive; `_` and `-` are ignored so `six_line` and `SixLine` both parse
impl FromStr for BetKind {
    type Err = WagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        BetKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| WagerError::UnknownBet(s.to_string()))
    }
}

/// A bet kind plus the numbers naming its table position, e.g. `split:17-20`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetSelection {
    pub kind: BetKind,
    pub numbers: Vec<Outcome>,
}

impl BetSelection {
    pub fn new(kind: BetKind, numbers: Vec<Outcome>) -> Self {
        Self { kind, numbers }
    }

    /// Selection for kinds with a single table position
    pub fn outside(kind: BetKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn straight(outcome: Outcome) -> Self {
        Self::new(BetKind::Straight, vec![outcome])
    }
}

impl FromStr for BetSelection {
    type Err = WagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind_text, numbers_text) = match s.split_once(':') {
            Some((kind, numbers)) => (kind, Some(numbers)),
            None => (s, None),
        };

        let kind: BetKind = kind_text.parse()?;
        let numbers = match numbers_text {
            Some(text) => text
                .split(['-', ','])
                .map(str::parse::<Outcome>)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self { kind, numbers })
    }
}

impl fmt::Display for BetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name().to_ascii_lowercase())?;
        if !self.numbers.is_empty() {
            let numbers: Vec<String> = self.numbers.iter().map(Outcome::to_string).collect();
            write!(f, ":{}", numbers.join("-"))?;
        }
        Ok(())
    }
}
