pub mod status;

pub use status::{ChangeLogEntry, StageRecord, StatusDocument, VersionRecord, VersionStatus};
