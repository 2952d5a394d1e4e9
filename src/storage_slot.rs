//! Durable storage slot holding the serialized complaint collection.
//!
//! A slot is a single named location whose whole value is replaced on every
//! write. The store never writes individual records; it serializes the full
//! collection and hands the text to the slot.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info};

use crate::error::SlotError;
use crate::store_config::StoreConfig;

/// Name of the LMDB sub-database the slot lives in.
const SLOT_DB_NAME: &str = "slots";

/// A single named persistence location.
pub trait StorageSlot {
    /// Current contents, or `None` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, SlotError>;

    /// Replaces the contents atomically.
    fn write(&self, contents: &str) -> Result<(), SlotError>;
}

/// Slot backed by one key of an LMDB environment.
///
/// Every write is its own write transaction, so readers in other processes
/// see either the previous collection or the new one, never a mix.
pub struct LmdbSlot {
    env: Environment,
    db: Database,
    key: String,
}

impl LmdbSlot {
    /// Opens (or creates) the environment described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, SlotError> {
        let path = &config.path;
        if !path.exists() {
            info!("Creating storage directory at: {}", path.display());
            fs::create_dir_all(path)?;
        }

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(config.map_size)
            .open(path)?;
        let db = env.create_db(Some(SLOT_DB_NAME), DatabaseFlags::empty())?;

        info!("Opened complaint slot '{}' at {}", config.slot_key, path.display());

        Ok(Self {
            env,
            db,
            key: config.slot_key.clone(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Flushes buffered writes to disk.
    pub fn sync(&self) -> Result<(), SlotError> {
        self.env.sync(true)?;
        Ok(())
    }
}

impl StorageSlot for LmdbSlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        let txn = self.env.begin_ro_txn()?;
        let contents = match txn.get(self.db, &self.key) {
            Ok(bytes) => Some(std::str::from_utf8(bytes)?.to_string()),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.abort();
        Ok(contents)
    }

    fn write(&self, contents: &str) -> Result<(), SlotError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &self.key, &contents, WriteFlags::empty())?;
        txn.commit()?;
        debug!("Wrote {} bytes to slot '{}'", contents.len(), self.key);
        Ok(())
    }
}

/// In-process slot.
///
/// Clones share the same contents, the way two browser tabs share one
/// storage key. Useful for embedders that persist elsewhere and for tests.
#[derive(Clone, Default)]
pub struct MemorySlot {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with raw contents, valid or not.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Rc::new(RefCell::new(Some(contents.into()))),
        }
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<(), SlotError> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}
