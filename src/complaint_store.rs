//! The complaint record store.
//!
//! [`ComplaintStore`] is the single owner of the complaint collection. It
//! validates new complaints, keeps identifiers unique, and is the only path
//! through which a status changes.
//!
//! # Consistency
//!
//! Several portals may share one storage slot. Every operation that acts on
//! the collection reloads it from the slot first and every mutation writes the
//! whole collection back. Two writers whose read-modify-write windows overlap
//! race at collection granularity and the last write wins; no record-level
//! locking or versioning is applied.

use chrono::Local;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::complaint_model::{
    summarize, ComplaintRecord, ComplaintStatus, NewComplaint, RecordStatus, StatusSummary,
    OTHERS_TYPE,
};
use crate::error::{ComplaintError, SlotError};
use crate::storage_slot::{LmdbSlot, StorageSlot};
use crate::store_config::StoreConfig;

/// Format of `created_date`.
pub const CREATED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Store persisted in an LMDB environment.
pub type LmdbComplaintStore = ComplaintStore<LmdbSlot>;

/// One element of the stored array.
#[derive(Clone, Serialize)]
#[serde(untagged)]
enum SlotEntry {
    Record(ComplaintRecord),
    /// Element that does not decode as a complaint. It is written back
    /// untouched so rewriting the collection never loses it.
    Unreadable(Value),
}

impl SlotEntry {
    fn decode(index: usize, value: Value) -> Self {
        match ComplaintRecord::deserialize(&value) {
            Ok(record) => SlotEntry::Record(record),
            Err(e) => {
                warn!("Complaint at index {index} is unreadable, keeping it as is: {e}");
                SlotEntry::Unreadable(value)
            }
        }
    }

    fn record(&self) -> Option<&ComplaintRecord> {
        match self {
            SlotEntry::Record(record) => Some(record),
            SlotEntry::Unreadable(_) => None,
        }
    }

    fn complaint_id(&self) -> Option<&str> {
        match self {
            SlotEntry::Record(record) => Some(&record.complaint_id),
            SlotEntry::Unreadable(value) => value.get("complaint_id").and_then(Value::as_str),
        }
    }
}

fn records_of(entries: &[SlotEntry]) -> Vec<ComplaintRecord> {
    entries.iter().filter_map(SlotEntry::record).cloned().collect()
}

pub struct ComplaintStore<S: StorageSlot> {
    slot: S,
    config: StoreConfig,
    /// Loaded lazily on first access.
    records: Option<Vec<ComplaintRecord>>,
}

impl LmdbComplaintStore {
    /// Opens the LMDB-backed store described by `config`.
    pub fn open(config: StoreConfig) -> Result<Self, ComplaintError> {
        let slot = LmdbSlot::open(&config)?;
        Ok(Self::new(slot, config))
    }

    /// Flushes the environment to disk.
    pub fn sync(&self) -> Result<(), ComplaintError> {
        self.slot.sync()?;
        Ok(())
    }
}

impl<S: StorageSlot> ComplaintStore<S> {
    pub fn new(slot: S, config: StoreConfig) -> Self {
        Self {
            slot,
            config,
            records: None,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Reads the collection from the slot and caches it.
    ///
    /// Missing or unreadable slot contents, and contents that are not a JSON
    /// array, yield an empty collection. Array elements that do not decode as
    /// complaints are skipped here but stay in the slot. This never fails.
    pub fn load_all(&mut self) -> Vec<ComplaintRecord> {
        records_of(&self.reload())
    }

    /// The in-memory collection, loading it on first access only.
    pub fn records(&mut self) -> &[ComplaintRecord] {
        if self.records.is_none() {
            self.records = Some(records_of(&self.read_entries()));
        }
        self.records.as_deref().unwrap_or_default()
    }

    /// Reloads and returns every complaint in insertion order.
    pub fn list_all(&mut self) -> Vec<ComplaintRecord> {
        self.load_all()
    }

    /// Validates `candidate` and appends it as a new open complaint.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// empty id, duplicate id, empty name, mobile number, missing type,
    /// unknown type, missing details for "Others".
    pub fn create(&mut self, candidate: NewComplaint) -> Result<ComplaintRecord, ComplaintError> {
        let mut entries = self.reload();
        let candidate = candidate.trimmed();

        self.validate(&candidate, &entries)?;

        let other_details = if candidate.complaint_type == OTHERS_TYPE {
            candidate.other_details
        } else {
            String::new()
        };

        let record = ComplaintRecord {
            complaint_id: candidate.complaint_id,
            citizen_name: candidate.citizen_name,
            mobile_number: candidate.mobile_number,
            complaint_type: candidate.complaint_type,
            other_details,
            status: RecordStatus::Known(ComplaintStatus::Open),
            created_date: Local::now().format(CREATED_DATE_FORMAT).to_string(),
            extra: Map::new(),
        };

        entries.push(SlotEntry::Record(record.clone()));
        self.persist(entries)?;

        info!("Complaint '{}' created", record.complaint_id);
        Ok(record)
    }

    /// Reloads and returns the complaint with exactly this id.
    pub fn find_by_id(&mut self, id: &str) -> Result<ComplaintRecord, ComplaintError> {
        self.load_all()
            .into_iter()
            .find(|c| c.complaint_id == id)
            .ok_or_else(|| ComplaintError::NotFound(id.to_string()))
    }

    /// Sets the status of an existing complaint. Nothing else changes.
    pub fn update_status(
        &mut self,
        id: &str,
        new_status: ComplaintStatus,
    ) -> Result<ComplaintRecord, ComplaintError> {
        self.apply_status(id, RecordStatus::Known(new_status))
    }

    /// Status update from free text, as received from a form.
    ///
    /// In strict mode the text must be one of the four status labels and is
    /// rejected with [`ComplaintError::InvalidStatus`] before storage is
    /// touched. In permissive mode any text is stored as given.
    pub fn update_status_str(
        &mut self,
        id: &str,
        new_status: &str,
    ) -> Result<ComplaintRecord, ComplaintError> {
        let status = if self.config.strict_status {
            let parsed = new_status
                .parse::<ComplaintStatus>()
                .map_err(|e| ComplaintError::InvalidStatus(e.0))?;
            RecordStatus::Known(parsed)
        } else {
            RecordStatus::from(new_status)
        };
        self.apply_status(id, status)
    }

    /// Reloads and tallies the collection.
    pub fn status_summary(&mut self) -> StatusSummary {
        summarize(&self.load_all())
    }

    fn apply_status(
        &mut self,
        id: &str,
        status: RecordStatus,
    ) -> Result<ComplaintRecord, ComplaintError> {
        let mut entries = self.reload();
        let record = entries
            .iter_mut()
            .find_map(|entry| match entry {
                SlotEntry::Record(record) if record.complaint_id == id => Some(record),
                _ => None,
            })
            .ok_or_else(|| ComplaintError::NotFound(id.to_string()))?;

        let previous = std::mem::replace(&mut record.status, status);
        let updated = record.clone();
        self.persist(entries)?;

        info!(
            "Complaint '{}' status changed from '{}' to '{}'",
            id, previous, updated.status
        );
        Ok(updated)
    }

    /// Unreadable entries count toward uniqueness when they carry a
    /// string `complaint_id`.
    fn validate(
        &self,
        candidate: &NewComplaint,
        existing: &[SlotEntry],
    ) -> Result<(), ComplaintError> {
        if candidate.complaint_id.is_empty() {
            return Err(ComplaintError::EmptyId);
        }
        if existing
            .iter()
            .any(|e| e.complaint_id() == Some(candidate.complaint_id.as_str()))
        {
            return Err(ComplaintError::DuplicateId(candidate.complaint_id.clone()));
        }
        if candidate.citizen_name.is_empty() {
            return Err(ComplaintError::EmptyName);
        }
        if !is_valid_mobile(&candidate.mobile_number) {
            return Err(ComplaintError::InvalidMobile);
        }
        if candidate.complaint_type.is_empty() {
            return Err(ComplaintError::MissingType);
        }
        if !self.config.allows_type(&candidate.complaint_type) {
            return Err(ComplaintError::UnknownType(candidate.complaint_type.clone()));
        }
        if candidate.complaint_type == OTHERS_TYPE && candidate.other_details.is_empty() {
            return Err(ComplaintError::MissingOtherDetails);
        }
        Ok(())
    }

    /// Reads every entry and refreshes the cached records.
    fn reload(&mut self) -> Vec<SlotEntry> {
        let entries = self.read_entries();
        self.records = Some(records_of(&entries));
        entries
    }

    fn read_entries(&self) -> Vec<SlotEntry> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read complaint slot, treating as empty: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => {
                let entries: Vec<SlotEntry> = values
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| SlotEntry::decode(index, value))
                    .collect();
                debug!("Loaded {} slot entries", entries.len());
                entries
            }
            Err(e) => {
                warn!("Complaint slot is corrupt, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Writes every entry back. On failure the cache is dropped so the next
    /// access reflects what durable storage actually holds.
    fn persist(&mut self, entries: Vec<SlotEntry>) -> Result<(), ComplaintError> {
        let json = match serde_json::to_string(&entries) {
            Ok(json) => json,
            Err(e) => {
                self.records = None;
                return Err(SlotError::from(e).into());
            }
        };
        if let Err(e) = self.slot.write(&json) {
            warn!("Failed to write complaint slot: {e}");
            self.records = None;
            return Err(e.into());
        }
        self.records = Some(records_of(&entries));
        Ok(())
    }
}

/// Exactly ten ASCII digits once surrounding whitespace is removed.
pub fn is_valid_mobile(mobile: &str) -> bool {
    let trimmed = mobile.trim();
    trimmed.len() == 10 && trimmed.bytes().all(|b| b.is_ascii_digit())
}
