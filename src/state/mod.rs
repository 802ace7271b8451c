//! Status document persistence
//!
//! Handles durable storage of per-project `status.yaml` documents,
//! including:
//! - Whole-document load and save
//! - Optimistic concurrency via a revision counter
//! - Atomic replace-on-save
//! - Project discovery

mod store;

pub use store::{validate_project_name, validate_version_id, StatusStore, STATUS_FILE};
