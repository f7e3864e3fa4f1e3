//! Croupier - American roulette wager resolution
//!
//! Bet catalog generated from the table grid, wager resolution, a bounded
//! history ledger, the player's bank account and a persisted table session.
//! Rendering and input handling are left to callers; they hand the table a
//! validated outcome and consume the spin report.

pub mod bank;
pub mod config;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod storage;
pub mod table;

pub use bank::{BankAccount, LifetimeTotals};
pub use config::{ConfigLoader, CroupierConfig, StorageBackend};
pub use errors::{ConfigurationError, CroupierError, CroupierResult, StorageError, WagerError};
pub use games::{
    BetCatalog, BetCategory, BetKind, BetSelection, NetOutcome, Outcome, Resolution,
    ResolutionEngine, Wager, WagerReceipt, WagerResult, Wheel,
};
pub use ledger::{Ledger, LedgerEntry, Statistics};
pub use storage::{FileStore, MemoryStore, PlayerState, StateStore};
pub use table::{SpinPhase, SpinReport, Table};

use std::sync::Arc;

/// Open the store named by the configuration
pub fn open_store(config: &CroupierConfig) -> CroupierResult<Arc<dyn StateStore>> {
    let store: Arc<dyn StateStore> = match config.storage.backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.storage.path)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        #[cfg(feature = "rocksdb-store")]
        StorageBackend::Rocksdb => Arc::new(storage::RocksDbStore::open(&config.storage.path)?),
        #[cfg(not(feature = "rocksdb-store"))]
        StorageBackend::Rocksdb => {
            return Err(ConfigurationError::InvalidValue {
                field: "storage.backend".to_string(),
                value: "rocksdb".to_string(),
                reason: "built without the rocksdb-store feature".to_string(),
            }
            .into())
        }
    };
    Ok(store)
}

/// Load persisted state and build the table around it
pub fn open_table(config: &CroupierConfig, store: &dyn StateStore) -> CroupierResult<Table> {
    let state = store.load()?;
    Table::from_config(config, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_table_round_trip_through_memory_store() {
        let config = CroupierConfig::testing();
        let store = open_store(&config).unwrap();

        let mut table = open_table(&config, store.as_ref()).unwrap();
        table
            .place_wager(&BetSelection::outside(BetKind::High), 100)
            .unwrap();
        table.spin(20).unwrap();
        store.save(&table.snapshot()).unwrap();

        let reopened = open_table(&config, store.as_ref()).unwrap();
        assert_eq!(reopened.balance(), 1100);
        assert_eq!(reopened.total_spins(), 1);
        assert_eq!(reopened.history_snapshot(10).len(), 1);
    }
}
