//! Error types for the complaint store and its storage slot.
//!
//! Display strings are the messages shown to citizens and staff; the FFI
//! layer forwards them untouched inside an [`AppResponse`](crate::app_response::AppResponse).

use thiserror::Error;

/// Failures reading or writing the durable storage slot.
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("LMDB error: {0}")]
    Lmdb(#[from] lmdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("could not serialize complaints: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of a rejected store operation.
///
/// Validation variants are checked in declaration order by
/// [`ComplaintStore::create`](crate::complaint_store::ComplaintStore::create)
/// and the first failure wins. None of them leaves a partial record behind.
#[derive(Debug, Error)]
pub enum ComplaintError {
    #[error("Complaint ID cannot be empty.")]
    EmptyId,

    #[error("Complaint ID already exists. Please use a different ID.")]
    DuplicateId(String),

    #[error("Citizen Name cannot be empty.")]
    EmptyName,

    #[error("Invalid mobile number. Please enter exactly 10 digits.")]
    InvalidMobile,

    #[error("Please select your complaint type.")]
    MissingType,

    #[error("Unknown complaint type '{0}'.")]
    UnknownType(String),

    #[error("Please describe your complaint.")]
    MissingOtherDetails,

    #[error("Complaint not found for ID '{0}'.")]
    NotFound(String),

    #[error("Invalid status '{0}'. Expected one of: Open, In Progress, Closed, Completed.")]
    InvalidStatus(String),

    #[error("Could not save complaints: {0}")]
    Storage(#[from] SlotError),
}
