//! Persisted player state
//!
//! One versioned record holds the bank counters and the ledger. It is written
//! as a JSON envelope carrying a SHA-256 checksum of the state, and always
//! replaced as a whole.

use crate::errors::StorageError;
use crate::ledger::LedgerEntry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Version written by this build
pub const STATE_VERSION: u32 = 1;

/// Everything that survives a restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub balance: u64,
    pub capital_injected: u64,
    pub total_won: u64,
    pub total_lost: u64,
    pub total_spins: u64,
    /// Ledger entries, oldest first
    pub history: Vec<LedgerEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    checksum: String,
    state: serde_json::Value,
}

fn checksum(state: &serde_json::Value) -> Result<String, StorageError> {
    // Object keys serialize sorted, so the text is stable across writes
    let canonical = serde_json::to_string(state)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Serialize a state into its checksummed envelope
pub fn encode(state: &PlayerState) -> Result<Vec<u8>, StorageError> {
    let value = serde_json::to_value(state)?;
    let envelope = Envelope {
        version: STATE_VERSION,
        checksum: checksum(&value)?,
        state: value,
    };

    serde_json::to_vec_pretty(&envelope).map_err(|e| StorageError::WriteFailed(e.to_string()))
}

/// Parse and verify an envelope
pub fn decode(bytes: &[u8]) -> Result<PlayerState, StorageError> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;

    if envelope.version != STATE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: envelope.version,
            supported: STATE_VERSION,
        });
    }

    let expected = checksum(&envelope.state)?;
    if expected != envelope.checksum {
        return Err(StorageError::CorruptedData(format!(
            "checksum mismatch: stored {}, computed {}",
            envelope.checksum, expected
        )));
    }

    Ok(serde_json::from_value(envelope.state)?)
}

/// Load/save contract for the single state record
pub trait StateStore: Send + Sync {
    /// `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<PlayerState>, StorageError>;

    /// Replace the stored record
    fn save(&self, state: &PlayerState) -> Result<(), StorageError>;
}

/// Store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PlayerState>, StorageError> {
        let record = self
            .record
            .read()
            .map_err(|_| StorageError::ReadFailed("memory store lock poisoned".to_string()))?;

        record.as_deref().map(decode).transpose()
    }

    fn save(&self, state: &PlayerState) -> Result<(), StorageError> {
        let bytes = encode(state)?;
        let mut record = self
            .record
            .write()
            .map_err(|_| StorageError::WriteFailed("memory store lock poisoned".to_string()))?;
        *record = Some(bytes);
        Ok(())
    }
}

/// JSON file replaced atomically: written to a temp file beside the target,
/// synced, then renamed over it
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<PlayerState>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let state = decode(&bytes)?;
        debug!(path = %self.path.display(), entries = state.history.len(), "Loaded player state");
        Ok(Some(state))
    }

    fn save(&self, state: &PlayerState) -> Result<(), StorageError> {
        let bytes = encode(state)?;
        let directory = self.directory();
        fs::create_dir_all(directory)?;

        let mut temp = NamedTempFile::new_in(directory)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| StorageError::WriteFailed(format!("Failed to replace {}: {}", self.path.display(), e)))?;

        info!(path = %self.path.display(), balance = state.balance, "Saved player state");
        Ok(())
    }
}

#[cfg(feature = "rocksdb-store")]
pub use rocks::RocksDbStore;

#[cfg(feature = "rocksdb-store")]
mod rocks {
    use super::{decode, encode, PlayerState, StateStore, StorageError};
    use rocksdb::{Options, DB};
    use std::{path::Path, sync::Arc};

    const STATE_KEY: &[u8] = b"player:state";

    /// The envelope stored under a single key
    #[derive(Clone)]
    pub struct RocksDbStore {
        db: Arc<DB>,
    }

    impl RocksDbStore {
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
            let mut opts = Options::default();
            opts.create_if_missing(true);

            let db = DB::open(&opts, path).map_err(|e| StorageError::ReadFailed(e.to_string()))?;
            Ok(Self { db: Arc::new(db) })
        }
    }

    impl StateStore for RocksDbStore {
        fn load(&self) -> Result<Option<PlayerState>, StorageError> {
            let bytes = self
                .db
                .get(STATE_KEY)
                .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

            bytes.as_deref().map(decode).transpose()
        }

        fn save(&self, state: &PlayerState) -> Result<(), StorageError> {
            let bytes = encode(state)?;
            self.db
                .put(STATE_KEY, bytes)
                .map_err(|e| StorageError::WriteFailed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{BetKind, Outcome};
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_state() -> PlayerState {
        PlayerState {
            balance: 2750,
            capital_injected: 1000,
            total_won: 1800,
            total_lost: 50,
            total_spins: 1,
            history: vec![LedgerEntry {
                kind: BetKind::Straight,
                covered: "17".to_string(),
                stake: 50,
                win_amount: 1800,
                timestamp: Utc::now(),
                outcome: Outcome::new(17).unwrap(),
                spin: 1,
            }],
        }
    }

    #[test]
    fn test_encode_decode() {
        let state = sample_state();
        let bytes = encode(&state).unwrap();
        assert_eq!(decode(&bytes).unwrap(), state);
    }

    #[test]
    fn test_tampered_state_detected() {
        let bytes = encode(&sample_state()).unwrap();
        let mut envelope: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        envelope["state"]["balance"] = serde_json::json!(1_000_000);
        let tampered = serde_json::to_vec(&envelope).unwrap();

        assert!(matches!(decode(&tampered), Err(StorageError::CorruptedData(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let bytes = encode(&sample_state()).unwrap();
        let mut envelope: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        envelope["version"] = serde_json::json!(2);
        let future = serde_json::to_vec(&envelope).unwrap();

        assert!(matches!(
            decode(&future),
            Err(StorageError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn test_garbage_is_corrupted_data() {
        assert!(matches!(decode(b"not json"), Err(StorageError::CorruptedData(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("state.json"));
        assert!(store.load().unwrap().is_none());

        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state.clone()));

        let mut updated = state;
        updated.balance = 10;
        store.save(&updated).unwrap();
        assert_eq!(store.load().unwrap().unwrap().balance, 10);
    }
}
