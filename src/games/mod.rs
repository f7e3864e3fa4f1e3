pub mod types;
pub mod catalog;
pub mod wager;
pub mod active_wagers;
pub mod resolution;
pub mod wheel;

pub use types::*;
pub use catalog::{BetCatalog, BetCategory};
pub use wager::{TablePosition, Wager, WagerReceipt, WagerState};
pub use active_wagers::ActiveWagers;
pub use resolution::{NetOutcome, Resolution, ResolutionEngine, WagerResult};
pub use wheel::Wheel;
