//! Data model definitions for the complaint store.
//!
//! This module defines the records persisted in the durable storage slot and
//! the candidate shape accepted when a citizen submits a new complaint. The
//! JSON field names are the ones already written by the grievance portal, so
//! an existing slot can be read back without any conversion.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Complaint type that requires a free-text description.
pub const OTHERS_TYPE: &str = "Others";

/// Complaint types offered by the portal when no configuration overrides them.
pub const DEFAULT_COMPLAINT_TYPES: [&str; 4] = ["Water", "Electricity", "Road", OTHERS_TYPE];

/// Lifecycle states a complaint can occupy.
///
/// Serialized with the exact labels shown to citizens and staff
/// (`"Open"`, `"In Progress"`, `"Closed"`, `"Completed"`).
///
/// ```rust
/// use grievance_core::complaint_model::ComplaintStatus;
///
/// let status: ComplaintStatus = "In Progress".parse().unwrap();
/// assert_eq!(status, ComplaintStatus::InProgress);
/// assert_eq!(status.to_string(), "In Progress");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Closed,
    Completed,
}

impl ComplaintStatus {
    /// All statuses in the order summaries list them.
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Open,
        ComplaintStatus::InProgress,
        ComplaintStatus::Closed,
        ComplaintStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "Open",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Closed => "Closed",
            ComplaintStatus::Completed => "Completed",
        }
    }
}

impl Display for ComplaintStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the four status labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl Display for UnknownStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown complaint status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ComplaintStatus {
    type Err = UnknownStatus;

    /// Exact, case-sensitive match on the status label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Status as it was found in durable storage.
///
/// Other writers sharing the slot may have stored a status outside the
/// enumerated set. Such values are kept verbatim so a full-collection rewrite
/// never drops them, and so summaries can count them in the total only.
/// A status that is not text at all (`null`, a number) is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordStatus {
    Known(ComplaintStatus),
    Unrecognized(String),
    NonText(JsonValue),
}

impl RecordStatus {
    /// The enumerated status, if the stored value is one.
    pub fn known(&self) -> Option<ComplaintStatus> {
        match self {
            RecordStatus::Known(status) => Some(*status),
            RecordStatus::Unrecognized(_) | RecordStatus::NonText(_) => None,
        }
    }

    /// Status used when presenting the record.
    ///
    /// Labels are compared case-insensitively and anything unrecognized is
    /// presented as [`ComplaintStatus::Open`].
    pub fn display_status(&self) -> ComplaintStatus {
        match self {
            RecordStatus::Known(status) => *status,
            RecordStatus::Unrecognized(raw) => ComplaintStatus::ALL
                .into_iter()
                .find(|status| status.as_str().eq_ignore_ascii_case(raw.trim()))
                .unwrap_or(ComplaintStatus::Open),
            RecordStatus::NonText(_) => ComplaintStatus::Open,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::Known(status) => status.as_str(),
            RecordStatus::Unrecognized(raw) => raw,
            RecordStatus::NonText(_) => "",
        }
    }
}

impl From<ComplaintStatus> for RecordStatus {
    fn from(status: ComplaintStatus) -> Self {
        RecordStatus::Known(status)
    }
}

impl From<&str> for RecordStatus {
    fn from(raw: &str) -> Self {
        match raw.parse::<ComplaintStatus>() {
            Ok(status) => RecordStatus::Known(status),
            Err(_) => RecordStatus::Unrecognized(raw.to_string()),
        }
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        RecordStatus::Known(ComplaintStatus::Open)
    }
}

impl Display for RecordStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complaint as persisted in the storage slot.
///
/// Records are only ever produced by [`ComplaintStore::create`] and only
/// `status` changes afterwards, through [`ComplaintStore::update_status`].
///
/// # Examples
///
/// ```rust
/// use grievance_core::complaint_model::{ComplaintRecord, ComplaintStatus};
///
/// let json = r#"{
///     "complaint_id": "C1",
///     "citizen_name": "Asha",
///     "mobile_number": "9876543210",
///     "complaint_type": "Water",
///     "other_details": "",
///     "status": "Open",
///     "created_date": "2024-01-15 10:30:00"
/// }"#;
///
/// let record: ComplaintRecord = serde_json::from_str(json)?;
/// assert_eq!(record.status.known(), Some(ComplaintStatus::Open));
/// # Ok::<(), serde_json::Error>(())
/// ```
///
/// # Older records
///
/// Slots written before `other_details` existed, or without a creation
/// timestamp, still load; the missing fields come back as empty strings.
/// Keys this model does not know about are kept in `extra` and written back
/// unchanged.
///
/// [`ComplaintStore::create`]: crate::complaint_store::ComplaintStore::create
/// [`ComplaintStore::update_status`]: crate::complaint_store::ComplaintStore::update_status
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ComplaintRecord {
    /// Citizen-chosen identifier, unique within the store.
    pub complaint_id: String,

    pub citizen_name: String,

    /// Exactly ten ASCII digits.
    pub mobile_number: String,

    pub complaint_type: String,

    /// Free-text description, non-empty only for the "Others" type.
    #[serde(default)]
    pub other_details: String,

    #[serde(default)]
    pub status: RecordStatus,

    /// Local time at creation, formatted `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub created_date: String,

    /// Fields stored by other writers.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Fields a citizen supplies when submitting a complaint.
///
/// Values are taken as typed into the form; surrounding whitespace is trimmed
/// from the text fields by the store before validation. `complaint_type`
/// comes from a fixed list and is used as given.
///
/// ```rust
/// use grievance_core::complaint_model::NewComplaint;
///
/// let candidate: NewComplaint = serde_json::from_str(
///     r#"{"complaint_id":"C7","citizen_name":"Ravi","mobile_number":"9123456780","complaint_type":"Road"}"#,
/// )?;
/// assert!(candidate.other_details.is_empty());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct NewComplaint {
    #[serde(default)]
    pub complaint_id: String,
    #[serde(default)]
    pub citizen_name: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub complaint_type: String,
    #[serde(default)]
    pub other_details: String,
}

impl NewComplaint {
    pub fn new(
        complaint_id: impl Into<String>,
        citizen_name: impl Into<String>,
        mobile_number: impl Into<String>,
        complaint_type: impl Into<String>,
    ) -> Self {
        Self {
            complaint_id: complaint_id.into(),
            citizen_name: citizen_name.into(),
            mobile_number: mobile_number.into(),
            complaint_type: complaint_type.into(),
            other_details: String::new(),
        }
    }

    pub fn with_other_details(mut self, details: impl Into<String>) -> Self {
        self.other_details = details.into();
        self
    }

    /// Copy of the candidate with surrounding whitespace removed from the
    /// typed-in fields.
    pub fn trimmed(&self) -> Self {
        Self {
            complaint_id: self.complaint_id.trim().to_string(),
            citizen_name: self.citizen_name.trim().to_string(),
            mobile_number: self.mobile_number.trim().to_string(),
            complaint_type: self.complaint_type.clone(),
            other_details: self.other_details.trim().to_string(),
        }
    }
}

/// Per-status complaint counts.
///
/// Only the four enumerated statuses are tallied. Records carrying any other
/// stored status are counted in `total` and nowhere else, so the per-status
/// counts may sum to less than `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    #[serde(rename = "Open")]
    pub open: usize,
    #[serde(rename = "In Progress")]
    pub in_progress: usize,
    #[serde(rename = "Closed")]
    pub closed: usize,
    #[serde(rename = "Completed")]
    pub completed: usize,
    #[serde(rename = "Total")]
    pub total: usize,
}

impl StatusSummary {
    pub fn count(&self, status: ComplaintStatus) -> usize {
        match status {
            ComplaintStatus::Open => self.open,
            ComplaintStatus::InProgress => self.in_progress,
            ComplaintStatus::Closed => self.closed,
            ComplaintStatus::Completed => self.completed,
        }
    }

    fn increment(&mut self, status: ComplaintStatus) {
        match status {
            ComplaintStatus::Open => self.open += 1,
            ComplaintStatus::InProgress => self.in_progress += 1,
            ComplaintStatus::Closed => self.closed += 1,
            ComplaintStatus::Completed => self.completed += 1,
        }
    }
}

/// Tallies records per status.
///
/// Pure aggregation over whatever collection the caller hands in.
pub fn summarize(complaints: &[ComplaintRecord]) -> StatusSummary {
    let mut summary = StatusSummary {
        total: complaints.len(),
        ..StatusSummary::default()
    };
    for status in complaints.iter().filter_map(|c| c.status.known()) {
        summary.increment(status);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: RecordStatus) -> ComplaintRecord {
        ComplaintRecord {
            complaint_id: id.to_string(),
            citizen_name: "Asha".to_string(),
            mobile_number: "9876543210".to_string(),
            complaint_type: "Water".to_string(),
            other_details: String::new(),
            status,
            created_date: "2024-01-15 10:30:00".to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn status_labels_parse_exactly() {
        assert_eq!("Open".parse::<ComplaintStatus>(), Ok(ComplaintStatus::Open));
        assert_eq!("Completed".parse::<ComplaintStatus>(), Ok(ComplaintStatus::Completed));
        assert!("open".parse::<ComplaintStatus>().is_err());
        assert!("InProgress".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn unknown_stored_status_survives_serialization() {
        let json = r#"{"complaint_id":"C1","citizen_name":"Asha","mobile_number":"9876543210","complaint_type":"Water","status":"Pending"}"#;
        let parsed: ComplaintRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, RecordStatus::Unrecognized("Pending".to_string()));
        assert_eq!(parsed.other_details, "");
        assert_eq!(parsed.created_date, "");

        let written = serde_json::to_value(&parsed).unwrap();
        assert_eq!(written["status"], "Pending");
    }

    #[test]
    fn known_status_serializes_with_label() {
        let value = serde_json::to_value(record("C1", ComplaintStatus::InProgress.into())).unwrap();
        assert_eq!(value["status"], "In Progress");
    }

    #[test]
    fn display_status_is_case_insensitive_and_defaults_to_open() {
        assert_eq!(RecordStatus::from("closed").display_status(), ComplaintStatus::Closed);
        assert_eq!(RecordStatus::from("IN PROGRESS").display_status(), ComplaintStatus::InProgress);
        assert_eq!(RecordStatus::from("Pending").display_status(), ComplaintStatus::Open);
        assert_eq!(RecordStatus::from("").display_status(), ComplaintStatus::Open);
    }

    #[test]
    fn summarize_counts_known_statuses() {
        let complaints = vec![
            record("C1", ComplaintStatus::Open.into()),
            record("C2", ComplaintStatus::Open.into()),
            record("C3", ComplaintStatus::Closed.into()),
            record("C4", ComplaintStatus::Open.into()),
        ];
        let summary = summarize(&complaints);
        assert_eq!(summary.open, 3);
        assert_eq!(summary.in_progress, 0);
        assert_eq!(summary.closed, 1);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn summarize_excludes_unrecognized_from_breakdown() {
        let complaints = vec![
            record("C1", "Pending".into()),
            record("C2", ComplaintStatus::Completed.into()),
        ];
        let summary = summarize(&complaints);
        let tallied: usize = ComplaintStatus::ALL.iter().map(|s| summary.count(*s)).sum();
        assert_eq!(tallied, 1);
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn summary_serializes_with_status_labels() {
        let value = serde_json::to_value(summarize(&[])).unwrap();
        assert_eq!(value["In Progress"], 0);
        assert_eq!(value["Total"], 0);
    }

    #[test]
    fn candidate_trims_typed_fields_only() {
        let candidate = NewComplaint::new("  C1 ", " Asha", "9876543210  ", " Others ")
            .with_other_details("  broken bench ");
        let trimmed = candidate.trimmed();
        assert_eq!(trimmed.complaint_id, "C1");
        assert_eq!(trimmed.citizen_name, "Asha");
        assert_eq!(trimmed.mobile_number, "9876543210");
        assert_eq!(trimmed.complaint_type, " Others ");
        assert_eq!(trimmed.other_details, "broken bench");
    }

    #[test]
    fn non_text_status_is_kept_as_raw_json() {
        let json = r#"{"complaint_id":"C2","citizen_name":"Ravi","mobile_number":"9123456780","complaint_type":"Road","status":null}"#;
        let parsed: ComplaintRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, RecordStatus::NonText(JsonValue::Null));
        assert_eq!(parsed.status.known(), None);
        assert_eq!(parsed.status.display_status(), ComplaintStatus::Open);

        let numeric: ComplaintRecord =
            serde_json::from_str(&json.replace("null", "3")).unwrap();
        assert_eq!(numeric.status, RecordStatus::NonText(serde_json::json!(3)));

        let written = serde_json::to_value(&parsed).unwrap();
        assert!(written["status"].is_null());
    }

    #[test]
    fn extra_fields_survive_serialization() {
        let json = r#"{"complaint_id":"C1","citizen_name":"Asha","mobile_number":"9876543210","complaint_type":"Water","status":"Open","ward":"12","geo":{"lat":12.9}}"#;
        let parsed: ComplaintRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.extra.get("ward"), Some(&serde_json::json!("12")));

        let written = serde_json::to_value(&parsed).unwrap();
        assert_eq!(written["ward"], "12");
        assert_eq!(written["geo"]["lat"], 12.9);
        assert!(written.get("extra").is_none());
    }
}
