//! Store configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration and embedders only spell out what they change.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::complaint_model::DEFAULT_COMPLAINT_TYPES;

/// Key of the slot shared by the citizen and admin portals.
pub const DEFAULT_SLOT_KEY: &str = "cgms_complaints";

/// 10 MiB is far beyond what a linear-scan complaint list will ever hold.
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory of the LMDB environment. Created if missing.
    pub path: PathBuf,

    /// Key under which the serialized collection is stored.
    pub slot_key: String,

    /// LMDB map size in bytes.
    pub map_size: usize,

    /// Complaint types accepted at creation.
    pub complaint_types: Vec<String>,

    /// When true, status updates outside the four enumerated values are
    /// rejected. When false they are stored verbatim.
    pub strict_status: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("grievance_store.lmdb"),
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            map_size: DEFAULT_MAP_SIZE,
            complaint_types: DEFAULT_COMPLAINT_TYPES.iter().map(|t| t.to_string()).collect(),
            strict_status: true,
        }
    }
}

impl StoreConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn allows_type(&self, complaint_type: &str) -> bool {
        self.complaint_types.iter().any(|t| t == complaint_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = StoreConfig::from_json("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.slot_key, "cgms_complaints");
        assert!(config.strict_status);
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = StoreConfig::from_json(
            r#"{"path":"/tmp/portal","strict_status":false,"complaint_types":["Water","Sewage"]}"#,
        )
        .unwrap();
        assert_eq!(config.path, PathBuf::from("/tmp/portal"));
        assert!(!config.strict_status);
        assert!(config.allows_type("Sewage"));
        assert!(!config.allows_type("Road"));
        assert_eq!(config.map_size, DEFAULT_MAP_SIZE);
    }

    #[test]
    fn default_types_are_the_portal_options() {
        let config = StoreConfig::default();
        for t in ["Water", "Electricity", "Road", "Others"] {
            assert!(config.allows_type(t), "{t} should be allowed");
        }
    }
}
