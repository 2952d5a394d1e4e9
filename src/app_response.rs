use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::error::{ComplaintError, SlotError};

/// Envelope returned across the FFI boundary.
///
/// Every outcome, including rejected input, is serialized into one of these
/// variants so the portal can render the message without handling faults.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<ComplaintError> for AppResponse {
    fn from(err: ComplaintError) -> Self {
        let message = err.to_string();
        match err {
            ComplaintError::NotFound(_) => AppResponse::NotFound(message),
            ComplaintError::Storage(slot_err) => AppResponse::from(slot_err),
            _ => AppResponse::ValidationError(message),
        }
    }
}

impl From<SlotError> for AppResponse {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::Serialization(e) => AppResponse::from(e),
            other => AppResponse::DatabaseError(other.to_string()),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Serializes `value` into an `Ok` envelope.
    pub fn ok_json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_not_found() {
        let response = AppResponse::from(ComplaintError::NotFound("C9".into()));
        assert_eq!(response, AppResponse::NotFound("Complaint not found for ID 'C9'.".into()));
    }

    #[test]
    fn validation_failures_keep_their_message() {
        let response = AppResponse::from(ComplaintError::EmptyName);
        assert_eq!(response, AppResponse::ValidationError("Citizen Name cannot be empty.".into()));
    }

    #[test]
    fn storage_failures_map_to_database_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let response = AppResponse::from(ComplaintError::Storage(SlotError::Io(io)));
        assert!(matches!(response, AppResponse::DatabaseError(msg) if msg.contains("disk full")));
    }

    #[test]
    fn display_prefixes_variant() {
        let response = AppResponse::BadRequest("Please enter a Complaint ID.".into());
        assert_eq!(response.to_string(), "Bad Request: Please enter a Complaint ID.");
    }

    #[test]
    fn envelope_serializes_externally_tagged() {
        let json = serde_json::to_string(&AppResponse::success("done")).unwrap();
        assert_eq!(json, r#"{"Ok":"done"}"#);
    }
}
