use crate::games::wager::Wager;
use uuid::Uuid;

/// Wagers placed since the last spin, in placement order
#[derive(Debug, Default)]
pub struct ActiveWagers {
    wagers: Vec<Wager>,
}

impl ActiveWagers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placed wager
    pub fn push(&mut self, wager: Wager) {
        self.wagers.push(wager);
    }

    /// Number of wagers waiting for a spin
    pub fn len(&self) -> usize {
        self.wagers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wagers.is_empty()
    }

    /// Sum of all stakes on the table
    pub fn total_staked(&self) -> u64 {
        self.wagers.iter().map(Wager::stake).sum()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.wagers.iter().any(|wager| wager.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wager> {
        self.wagers.iter()
    }

    pub(crate) fn as_slice(&self) -> &[Wager] {
        &self.wagers
    }

    /// Remove every wager, handing ownership to the caller
    pub fn take_all(&mut self) -> Vec<Wager> {
        std::mem::take(&mut self.wagers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::catalog::BetCatalog;
    use crate::games::types::BetKind;

    #[test]
    fn test_push_and_take() {
        let catalog = BetCatalog::american().unwrap();
        let red = catalog.category_for(BetKind::Red).unwrap();
        let mut active = ActiveWagers::new();

        let first = Wager::new(red.clone(), 100).unwrap();
        let first_id = first.id();
        active.push(first);
        active.push(Wager::new(red, 25).unwrap());

        assert_eq!(active.len(), 2);
        assert_eq!(active.total_staked(), 125);
        assert!(active.contains(first_id));

        let taken = active.take_all();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].id(), first_id);
        assert!(active.is_empty());
        assert_eq!(active.total_staked(), 0);
    }
}
