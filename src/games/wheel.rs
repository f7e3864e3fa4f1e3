//! Outcome source
//!
//! Draws a pocket uniformly from the physical wheel, unless the operator has
//! forced the next result. A forced result is used for exactly one spin.

use crate::errors::WagerError;
use crate::games::types::{Outcome, WHEEL_ORDER};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{info, warn};

/// Position of an outcome around the wheel, 0 being the green zero pocket
pub fn pocket_index(outcome: Outcome) -> usize {
    WHEEL_ORDER
        .iter()
        .position(|pocket| *pocket == outcome)
        .unwrap_or_default()
}

/// Random or operator-forced outcome generator
#[derive(Debug)]
pub struct Wheel<R = StdRng> {
    rng: R,
    forced: Option<Outcome>,
}

impl Wheel<StdRng> {
    /// Wheel seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible wheel for simulations and tests
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl Default for Wheel<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Wheel<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, forced: None }
    }

    /// Uniform draw over the 38 pockets. Ignores any forced outcome.
    pub fn random_outcome(&mut self) -> Outcome {
        WHEEL_ORDER[self.rng.gen_range(0..WHEEL_ORDER.len())]
    }

    /// Force the next outcome. An invalid value leaves any previous override in place.
    pub fn set_forced_outcome(&mut self, value: i32) -> Result<Outcome, WagerError> {
        let outcome = Outcome::new(value).map_err(|e| {
            warn!("Rejected forced outcome {}", value);
            e
        })?;
        self.force(outcome);
        Ok(outcome)
    }

    /// Force the next outcome from operator text such as "00" or "17"
    pub fn set_forced_from_str(&mut self, text: &str) -> Result<Outcome, WagerError> {
        let outcome: Outcome = text.parse().map_err(|e| {
            warn!("Rejected forced outcome input '{}'", text);
            e
        })?;
        self.force(outcome);
        Ok(outcome)
    }

    fn force(&mut self, outcome: Outcome) {
        info!("Next outcome forced to {}", outcome);
        self.forced = Some(outcome);
    }

    /// Drop a pending override, returning it
    pub fn clear_forced_outcome(&mut self) -> Option<Outcome> {
        self.forced.take()
    }

    /// Pending override, if any, without consuming it
    pub fn forced_outcome(&self) -> Option<Outcome> {
        self.forced
    }

    /// The outcome to use for the next spin; consumes a pending override
    pub fn next_outcome(&mut self) -> Outcome {
        match self.forced.take() {
            Some(outcome) => outcome,
            None => self.random_outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use std::collections::HashMap;

    #[test]
    fn test_forced_outcome_used_once() {
        // StepRng(0, 0) always draws index 0, the green zero pocket
        let mut wheel = Wheel::with_rng(StepRng::new(0, 0));

        assert_eq!(wheel.set_forced_outcome(17).unwrap().value(), 17);
        assert_eq!(wheel.next_outcome().value(), 17);
        assert_eq!(wheel.next_outcome(), Outcome::ZERO);
        assert_eq!(wheel.forced_outcome(), None);
    }

    #[test]
    fn test_invalid_force_keeps_state() {
        let mut wheel = Wheel::seeded(7);
        wheel.set_forced_outcome(5).unwrap();

        assert_eq!(wheel.set_forced_outcome(37), Err(WagerError::InvalidOutcome(37)));
        assert_eq!(wheel.set_forced_outcome(-2), Err(WagerError::InvalidOutcome(-2)));
        assert!(wheel.set_forced_from_str("abc").is_err());
        assert_eq!(wheel.forced_outcome().map(Outcome::value), Some(5));
    }

    #[test]
    fn test_forced_from_text() {
        let mut wheel = Wheel::seeded(7);

        assert_eq!(wheel.set_forced_from_str("00").unwrap(), Outcome::DOUBLE_ZERO);
        assert_eq!(wheel.clear_forced_outcome(), Some(Outcome::DOUBLE_ZERO));
        assert_eq!(wheel.forced_outcome(), None);
    }

    #[test]
    fn test_seeded_wheels_agree() {
        let mut a = Wheel::seeded(42);
        let mut b = Wheel::seeded(42);

        for _ in 0..50 {
            assert_eq!(a.random_outcome(), b.random_outcome());
        }
    }

    #[test]
    fn test_draws_cover_every_pocket() {
        let mut wheel = Wheel::seeded(1234);
        let mut counts: HashMap<Outcome, u32> = HashMap::new();

        for _ in 0..38_000 {
            *counts.entry(wheel.random_outcome()).or_default() += 1;
        }

        assert_eq!(counts.len(), 38);
        // Expected 1000 per pocket; a fair draw stays well inside this band
        assert!(counts.values().all(|&count| (800..1200).contains(&count)));
    }

    #[test]
    fn test_pocket_index() {
        assert_eq!(pocket_index(Outcome::ZERO), 0);
        assert_eq!(pocket_index(Outcome::DOUBLE_ZERO), 19);
        assert_eq!(pocket_index(Outcome::new(2).unwrap()), 37);
    }
}
