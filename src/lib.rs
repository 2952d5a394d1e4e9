//! # Grievance Core
//!
//! Complaint record store for citizen grievance portals. Citizens submit
//! complaints and track them by identifier; staff list complaints, update
//! their status and review status counts. All portals share one durable
//! storage slot.
//!
//! ## Features
//!
//! - **Validated intake**: identifiers are unique, mobile numbers are ten
//!   digits, complaint types come from a fixed set
//! - **Single-slot persistence**: the whole collection is one JSON array
//!   stored under one key of an LMDB environment
//! - **Reload before acting**: every operation re-reads the slot so changes
//!   made by another portal are visible
//! - **FFI-friendly**: every call returns a JSON [`AppResponse`] envelope;
//!   errors never cross the boundary as faults
//!
//! ## Quick Start
//!
//! ```no_run
//! use grievance_core::complaint_model::{ComplaintStatus, NewComplaint};
//! use grievance_core::complaint_store::LmdbComplaintStore;
//! use grievance_core::store_config::StoreConfig;
//!
//! let mut store = LmdbComplaintStore::open(StoreConfig::at("portal.lmdb"))?;
//! store.create(NewComplaint::new("C1", "Asha", "9876543210", "Water"))?;
//! store.update_status("C1", ComplaintStatus::Completed)?;
//! assert_eq!(store.status_summary().completed, 1);
//! # Ok::<(), grievance_core::error::ComplaintError>(())
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] / [`create_store_with_config`] - Open a store instance
//! - [`submit_complaint`] - Validate and record a new complaint
//! - [`lookup_complaint`] - Find a complaint by ID
//! - [`list_complaints`] - All complaints in submission order
//! - [`update_complaint_status`] - Change a complaint's status
//! - [`status_summary`] - Counts per status plus total
//! - [`admin_dashboard`] - Complaint list and summary in one call
//! - [`close_store`] - Flush and release a store instance
//! - [`free_response`] - Release a string returned by any function above

pub mod app_response;
pub mod complaint_model;
pub mod complaint_store;
pub mod error;
pub mod storage_slot;
pub mod store_config;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::complaint_model::{summarize, ComplaintRecord, NewComplaint, StatusSummary};
use crate::complaint_store::LmdbComplaintStore;
use crate::store_config::StoreConfig;

const MISSING_ID_MESSAGE: &str = "Please enter a Complaint ID.";

/// Combined payload for the staff overview screen.
#[derive(Debug, Serialize)]
struct AdminDashboard {
    complaints: Vec<ComplaintRecord>,
    summary: StatusSummary,
}

/// Opens a store whose LMDB environment lives at `path`, with default settings.
///
/// # Returns
///
/// A pointer to the store, or null on failure. Release it with [`close_store`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use grievance_core::create_store;
///
/// let path = CString::new("portal.lmdb").unwrap();
/// let store = create_store(path.as_ptr());
/// assert!(!store.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(path: *const c_char) -> *mut LmdbComplaintStore {
    let path = match c_ptr_to_str(path) {
        Some(p) => p,
        None => {
            warn!("Invalid path passed to create_store");
            return std::ptr::null_mut();
        }
    };
    open_store(StoreConfig::at(path))
}

/// Opens a store from a JSON [`StoreConfig`]. Missing fields take defaults.
///
/// # JSON Format
///
/// ```json
/// {
///   "path": "portal.lmdb",
///   "slot_key": "cgms_complaints",
///   "complaint_types": ["Water", "Electricity", "Road", "Others"],
///   "strict_status": true
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store_with_config(config_json: *const c_char) -> *mut LmdbComplaintStore {
    let json = match c_ptr_to_str(config_json) {
        Some(j) => j,
        None => {
            warn!("Invalid config pointer passed to create_store_with_config");
            return std::ptr::null_mut();
        }
    };
    match StoreConfig::from_json(&json) {
        Ok(config) => open_store(config),
        Err(e) => {
            warn!("Invalid store configuration: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_store(config: StoreConfig) -> *mut LmdbComplaintStore {
    let path = config.path.display().to_string();
    match LmdbComplaintStore::open(config) {
        Ok(store) => {
            info!("Complaint store opened at {path}");
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("Failed to open complaint store at {path}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Validates and records a new complaint.
///
/// # JSON Format
///
/// ```json
/// {
///   "complaint_id": "C1",
///   "citizen_name": "Asha",
///   "mobile_number": "9876543210",
///   "complaint_type": "Others",
///   "other_details": "Broken street light"
/// }
/// ```
///
/// Returns `Ok` with the stored record, or `ValidationError` with the first
/// rule the submission broke.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn submit_complaint(store: *mut LmdbComplaintStore, json_ptr: *const c_char) -> *const c_char {
    let store = match store_mut(store) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let json = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(j) => j,
        Err(e) => return e,
    };
    let candidate: NewComplaint = match serde_json::from_str(&json) {
        Ok(c) => c,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let response = match store.create(candidate) {
        Ok(record) => AppResponse::ok_json(&record),
        Err(e) => AppResponse::from(e),
    };
    response_to_c_string(&response)
}

/// Looks a complaint up by its exact ID.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn lookup_complaint(store: *mut LmdbComplaintStore, id: *const c_char) -> *const c_char {
    let store = match store_mut(store) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let id = match required_id(id) {
        Ok(id) => id,
        Err(e) => return e,
    };

    let response = match store.find_by_id(&id) {
        Ok(record) => AppResponse::ok_json(&record),
        Err(e) => AppResponse::from(e),
    };
    response_to_c_string(&response)
}

/// Returns every complaint, in submission order, as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_complaints(store: *mut LmdbComplaintStore) -> *const c_char {
    let store = match store_mut(store) {
        Ok(s) => s,
        Err(e) => return e,
    };
    response_to_c_string(&AppResponse::ok_json(&store.list_all()))
}

/// Changes the status of a complaint.
///
/// `status` is one of `Open`, `In Progress`, `Closed`, `Completed`. Other
/// values are rejected unless the store was opened with `strict_status`
/// disabled.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_complaint_status(
    store: *mut LmdbComplaintStore,
    id: *const c_char,
    status: *const c_char,
) -> *const c_char {
    let store = match store_mut(store) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let id = match required_id(id) {
        Ok(id) => id,
        Err(e) => return e,
    };
    let status = match c_ptr_to_string(status, "status") {
        Ok(s) => s,
        Err(e) => return e,
    };

    let response = match store.update_status_str(&id, &status) {
        Ok(record) => AppResponse::ok_json(&record),
        Err(e) => AppResponse::from(e),
    };
    response_to_c_string(&response)
}

/// Counts complaints per status, plus the total.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn status_summary(store: *mut LmdbComplaintStore) -> *const c_char {
    let store = match store_mut(store) {
        Ok(s) => s,
        Err(e) => return e,
    };
    response_to_c_string(&AppResponse::ok_json(&store.status_summary()))
}

/// Complaint list and status summary taken from a single reload.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn admin_dashboard(store: *mut LmdbComplaintStore) -> *const c_char {
    let store = match store_mut(store) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let complaints = store.list_all();
    let summary = summarize(&complaints);
    response_to_c_string(&AppResponse::ok_json(&AdminDashboard { complaints, summary }))
}

/// Flushes and releases a store created by [`create_store`].
///
/// The pointer must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(store: *mut LmdbComplaintStore) -> *const c_char {
    if store.is_null() {
        let error = AppResponse::BadRequest("Null store pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let store = unsafe { Box::from_raw(store) };
    let response = match store.sync() {
        Ok(_) => AppResponse::success("Complaint store closed successfully"),
        Err(e) => AppResponse::from(e),
    };
    drop(store);
    response_to_c_string(&response)
}

/// Releases a string returned by any function of this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr as *mut c_char));
    }
}

fn store_mut<'a>(store: *mut LmdbComplaintStore) -> Result<&'a mut LmdbComplaintStore, *const c_char> {
    match unsafe { store.as_mut() } {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest("Null store pointer".to_string());
            Err(response_to_c_string(&error))
        }
    }
}

/// Reads an ID argument, rejecting blank input the way the portal forms do.
fn required_id(ptr: *const c_char) -> Result<String, *const c_char> {
    let id = c_ptr_to_string(ptr, "id")?;
    let id = id.trim();
    if id.is_empty() {
        let error = AppResponse::BadRequest(MISSING_ID_MESSAGE.to_string());
        return Err(response_to_c_string(&error));
    }
    Ok(id.to_string())
}

/// Serializes a response into a heap C string owned by the caller.
///
/// Returns null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    if !matches!(response, AppResponse::Ok(_)) {
        info!("{response}");
    }

    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust String.
///
/// # Returns
///
/// * `Ok(String)` - If conversion was successful
/// * `Err(*const c_char)` - Serialized `BadRequest` naming `field_name`
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn c_ptr_to_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(str::to_string) }
}
